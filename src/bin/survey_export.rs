//! Survey export command line interface
//!
//! Validates persisted survey documents and writes them out as FRCS,
//! Compass or Walls files.
//!
//! # Usage
//!
//! ```bash
//! # Check a saved document
//! survey_export validate --file trip.json
//!
//! # Export in the document's own format
//! cat trip.json | survey_export export > trip.fr
//!
//! # Export as Walls even though the document selects FRCS
//! survey_export export --file trip.json --format walls --out trip.srv
//!
//! # Explain an issue path
//! survey_export locate pages.0.tables.0.shots.3.frontsightAzimuth --file trip.json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use cave_survey_data::{
    classify, render_issue, validate_with, Diagnostic, IssuePath, OutputFormat, Pipeline,
    PipelineError, RawValues, Settings, SettingsLoader, Severity, Values,
};

#[derive(Parser)]
#[command(name = "survey_export")]
#[command(version = "0.1.0")]
#[command(about = "Validate cave survey documents and export FRCS, Compass or Walls files")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Report style: json, text, or pretty (default)
    #[arg(long, short = 'o', global = true, default_value = "pretty", value_enum)]
    output: ReportStyle,

    /// Settings file (defaults to ./survey-export.yaml when present)
    #[arg(long, global = true, env = "SURVEY_EXPORT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportStyle {
    Json,
    Text,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a document
    Validate {
        /// Input file (reads stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Validate, then write the survey in a legacy format
    Export {
        /// Input file (reads stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Target format: frcs, compass, or walls (defaults to the document's)
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Write here instead of stdout
        #[arg(long = "out")]
        out_file: Option<PathBuf>,

        /// Export even when validation finds errors
        #[arg(long)]
        best_effort: bool,
    },

    /// Describe where an issue path points
    Locate {
        /// Dotted issue path, e.g. pages.0.tables.0.shots.3.distance
        path: String,

        /// Document used for station names
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = load_settings(cli.config).and_then(|settings| match cli.command {
        Commands::Validate { file } => cmd_validate(file, &settings, cli.output),
        Commands::Export {
            file,
            format,
            out_file,
            best_effort,
        } => {
            let settings = Settings {
                export_with_errors: settings.export_with_errors || best_effort,
                ..settings
            };
            cmd_export(file, format, out_file, settings, cli.output)
        }
        Commands::Locate { path, file } => cmd_locate(&path, file, &settings, cli.output),
    });

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.output == ReportStyle::Json {
                println!("{}", serde_json::json!({ "error": e }));
            } else {
                eprintln!("{}: {}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

fn load_settings(config: Option<PathBuf>) -> Result<Settings, String> {
    let loader = match config {
        Some(path) => SettingsLoader::new(path),
        None => SettingsLoader::from_env(),
    };
    loader.load().map_err(|e| format!("{:#}", e))
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn cmd_validate(file: Option<PathBuf>, settings: &Settings, style: ReportStyle) -> Result<(), String> {
    let raw = read_document(file)?;
    let report = validate_with(&raw, settings);

    match style {
        ReportStyle::Json => {
            let output = serde_json::json!({
                "valid": !report.has_errors(),
                "errors": report.errors().count(),
                "warnings": report.warnings().count(),
                "shots": report.values.shot_count(),
                "diagnostics": diagnostics_json(&report.diagnostics, &report.values),
            });
            print_json(&output)?;
        }
        ReportStyle::Text | ReportStyle::Pretty => {
            if report.diagnostics.is_empty() {
                println!(
                    "{} Validation passed ({} shots)",
                    "OK".green().bold(),
                    report.values.shot_count()
                );
            } else {
                print_diagnostics(&report.diagnostics, &report.values, style);
            }
        }
    }

    if report.has_errors() {
        Err("Validation failed".to_string())
    } else {
        Ok(())
    }
}

fn cmd_export(
    file: Option<PathBuf>,
    format: Option<OutputFormat>,
    out_file: Option<PathBuf>,
    settings: Settings,
    style: ReportStyle,
) -> Result<(), String> {
    let raw = read_document(file)?;
    let pipeline = Pipeline::new(settings);

    let output = match pipeline.export_as(&raw, format) {
        Ok(output) => output,
        Err(PipelineError::Rejected { errors, report }) => {
            print_diagnostics(&report.diagnostics, &report.values, style);
            return Err(format!(
                "{} validation error(s); use --best-effort to export anyway",
                errors
            ));
        }
        Err(e) => return Err(e.to_string()),
    };

    // Report goes to stderr so stdout stays a clean survey file
    if style != ReportStyle::Json {
        for diag in &output.diagnostics {
            eprintln!("{}", styled_issue(diag, &output.values, style));
        }
    }

    match out_file {
        Some(path) => {
            std::fs::write(&path, &output.text)
                .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
            if style == ReportStyle::Json {
                print_json(&serde_json::json!({
                    "format": output.format.to_string(),
                    "path": path.display().to_string(),
                    "bytes": output.text.len(),
                    "diagnostics": diagnostics_json(&output.diagnostics, &output.values),
                }))?;
            } else {
                eprintln!(
                    "{} Wrote {} file {}",
                    "OK".green().bold(),
                    output.format,
                    path.display()
                );
            }
        }
        None => print!("{}", output.text),
    }
    Ok(())
}

fn cmd_locate(
    path: &str,
    file: Option<PathBuf>,
    settings: &Settings,
    style: ReportStyle,
) -> Result<(), String> {
    let path: IssuePath = path.parse()?;
    let values = match file {
        Some(file) => validate_with(&read_document(Some(file))?, settings).values,
        None => Values::default(),
    };
    let location = classify(&path).ok_or_else(|| format!("'{}' is not a recognised issue path", path))?;
    let description = location.describe(&values);

    match style {
        ReportStyle::Json => print_json(&serde_json::json!({
            "path": path.to_string(),
            "location": description,
        }))?,
        ReportStyle::Text | ReportStyle::Pretty => println!("{}", description),
    }
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

fn print_diagnostics(diagnostics: &[Diagnostic], values: &Values, style: ReportStyle) {
    if style == ReportStyle::Json {
        let output = serde_json::json!({ "diagnostics": diagnostics_json(diagnostics, values) });
        println!("{}", output);
        return;
    }
    for diag in diagnostics {
        println!("{}", styled_issue(diag, values, style));
    }
}

fn styled_issue(diag: &Diagnostic, values: &Values, style: ReportStyle) -> String {
    let text = render_issue(diag, values);
    let label = match diag.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    };
    match (style, diag.severity) {
        (ReportStyle::Pretty, Severity::Error) => {
            format!("{}[{}]: {}", label.red().bold(), diag.code.as_str(), text)
        }
        (ReportStyle::Pretty, Severity::Warning) => {
            format!("{}[{}]: {}", label.yellow().bold(), diag.code.as_str(), text)
        }
        _ => format!("{}[{}]: {}", label, diag.code.as_str(), text),
    }
}

fn diagnostics_json(diagnostics: &[Diagnostic], values: &Values) -> Vec<serde_json::Value> {
    diagnostics
        .iter()
        .map(|d| {
            serde_json::json!({
                "severity": format!("{:?}", d.severity),
                "code": d.code.as_str(),
                "message": d.message,
                "path": d.path.to_string(),
                "location": render_issue(d, values),
            })
        })
        .collect()
}

fn print_json(value: &serde_json::Value) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("JSON serialization failed: {}", e))?;
    println!("{}", text);
    Ok(())
}

fn read_document(file: Option<PathBuf>) -> Result<RawValues, String> {
    let source = read_input(file)?;
    RawValues::from_json(&source).map_err(|e| format!("Invalid survey document: {}", e))
}

fn read_input(file: Option<PathBuf>) -> Result<String, String> {
    match file {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read '{}': {}", path.display(), e)),
        None => {
            if atty::is(atty::Stream::Stdin) {
                return Err("No input provided. Use --file or pipe input via stdin.".to_string());
            }
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            Ok(buffer)
        }
    }
}

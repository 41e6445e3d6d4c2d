//! Validate-then-export pipeline
//!
//! A document that fails validation is not exported unless the settings ask
//! for best-effort output, in which case exporters see whatever parsed and
//! skip the incomplete rows as usual.

use thiserror::Error;
use tracing::{info, warn};

use crate::config::Settings;
use crate::diagnostics::Diagnostic;
use crate::document::RawValues;
use crate::export::FormatError;
use crate::model::{OutputFormat, Values};
use crate::validator::{validate_with, ValidationReport};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("survey has {errors} validation error(s)")]
    Rejected {
        errors: usize,
        report: Box<ValidationReport>,
    },

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Exported text plus the issues that did not block it
#[derive(Debug, Clone)]
pub struct ExportOutput {
    pub format: OutputFormat,
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
    /// The tree that was exported, for rendering the diagnostics
    pub values: Values,
}

pub struct Pipeline {
    settings: Settings,
}

impl Pipeline {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn validate(&self, raw: &RawValues) -> ValidationReport {
        validate_with(raw, &self.settings)
    }

    /// Export in the document's own format
    pub fn export(&self, raw: &RawValues) -> Result<ExportOutput, PipelineError> {
        self.export_as(raw, None)
    }

    /// Export, optionally overriding the document's format selection.
    /// The override also selects which format's station rules apply.
    pub fn export_as(
        &self,
        raw: &RawValues,
        format: Option<OutputFormat>,
    ) -> Result<ExportOutput, PipelineError> {
        let report = match format {
            Some(format) => {
                let mut raw = raw.clone();
                raw.output_format = Some(format.to_string());
                self.validate(&raw)
            }
            None => self.validate(raw),
        };

        let errors = report.errors().count();
        if errors > 0 {
            if !self.settings.export_with_errors {
                return Err(PipelineError::Rejected {
                    errors,
                    report: Box::new(report),
                });
            }
            warn!(errors, "exporting survey with validation errors");
        }

        let format = report.values.output_format;
        let text = format.export(&report.values)?;
        info!(
            %format,
            shots = report.values.shot_count(),
            issues = report.diagnostics.len(),
            "exported survey"
        );
        Ok(ExportOutput {
            format,
            text,
            diagnostics: report.diagnostics,
            values: report.values,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticCode;

    const GOOD: &str = r#"{
        "outputFormat": "FRCS",
        "tripHeader": { "tripName": "Entrance", "distanceUnit": "ft", "angleUnit": "deg" },
        "pages": [{ "tables": [{ "shots": [
            { "from": { "station": "A1" }, "distance": "10", "frontsightAzimuth": "90", "backsightAzimuth": "91" },
            { "from": { "station": "A2" } }
        ]}]}]
    }"#;

    const DISAGREEING: &str = r#"{
        "pages": [{ "tables": [{ "shots": [
            { "from": { "station": "A1" }, "distance": "10", "frontsightAzimuth": "90", "backsightAzimuth": "100" },
            { "from": { "station": "A2" } }
        ]}]}]
    }"#;

    #[test]
    fn test_export_clean_document() {
        let raw = RawValues::from_json(GOOD).unwrap();
        let out = Pipeline::default().export(&raw).unwrap();
        assert_eq!(out.format, OutputFormat::Frcs);
        assert!(out.diagnostics.is_empty());
        assert!(out.text.contains("   A2   A1 10.00    90.0  91.0"));
    }

    #[test]
    fn test_rejects_invalid_document() {
        let raw = RawValues::from_json(DISAGREEING).unwrap();
        let err = Pipeline::default().export(&raw).unwrap_err();
        match err {
            PipelineError::Rejected { errors, report } => {
                assert_eq!(errors, 2);
                assert!(report
                    .diagnostics
                    .iter()
                    .all(|d| d.code == DiagnosticCode::BacksightDisagreement));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_best_effort_export() {
        let raw = RawValues::from_json(DISAGREEING).unwrap();
        let pipeline = Pipeline::new(Settings {
            export_with_errors: true,
            ..Settings::default()
        });
        let out = pipeline.export(&raw).unwrap();
        assert_eq!(out.diagnostics.len(), 2);
        assert!(out.text.contains("A1"));
    }

    #[test]
    fn test_format_override_applies_rules() {
        let raw = RawValues::from_json(GOOD).unwrap();
        let out = Pipeline::default()
            .export_as(&raw, Some(OutputFormat::Compass))
            .unwrap();
        assert_eq!(out.format, OutputFormat::Compass);
        assert!(out.text.contains("SURVEY NAME: Entrance"));
        assert!(out
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::MissingDate && d.is_warning()));
    }
}

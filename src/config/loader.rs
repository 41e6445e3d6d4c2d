//! Settings loader
//!
//! Loads and validates the YAML settings file.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::types::Settings;

pub const CONFIG_ENV_VAR: &str = "SURVEY_EXPORT_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "survey-export.yaml";

pub struct SettingsLoader {
    path: Option<PathBuf>,
}

impl SettingsLoader {
    /// Load from an explicit file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Built-in defaults only
    pub fn defaults() -> Self {
        Self { path: None }
    }

    /// Resolve the settings file
    ///
    /// Path resolution order:
    /// 1. SURVEY_EXPORT_CONFIG environment variable (explicit override)
    /// 2. `survey-export.yaml` in the working directory
    /// 3. Built-in defaults
    pub fn from_env() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::new(path);
        }
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::new(DEFAULT_CONFIG_FILE);
        }
        Self::defaults()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load(&self) -> Result<Settings> {
        let Some(path) = &self.path else {
            debug!("No settings file, using defaults");
            return Ok(Settings::default());
        };
        info!("Loading settings from {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Self::validate(&settings).with_context(|| format!("Invalid settings in {}", path.display()))?;
        Ok(settings)
    }

    fn validate(settings: &Settings) -> Result<()> {
        let tolerance = settings.default_backsight_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            bail!(
                "default_backsight_tolerance must be a finite number of at least 0, got {}",
                tolerance
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OutputFormat;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let settings = SettingsLoader::defaults().load().unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_format: Compass").unwrap();
        writeln!(file, "default_backsight_tolerance: 1.5").unwrap();
        writeln!(file, "export_with_errors: true").unwrap();

        let settings = SettingsLoader::new(file.path()).load().unwrap();
        assert_eq!(settings.default_format, OutputFormat::Compass);
        assert_eq!(settings.default_backsight_tolerance, 1.5);
        assert!(settings.export_with_errors);
    }

    #[test]
    fn test_rejects_negative_tolerance() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_backsight_tolerance: -2").unwrap();

        let err = SettingsLoader::new(file.path()).load().unwrap_err();
        assert!(format!("{:#}", err).contains("default_backsight_tolerance"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SettingsLoader::new(dir.path().join("absent.yaml")).load().unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}

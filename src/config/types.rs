//! Settings types

use serde::{Deserialize, Serialize};

use crate::model::OutputFormat;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Used when a document has no `outputFormat`
    pub default_format: OutputFormat,
    /// Degrees; used when the trip header has no tolerance
    pub default_backsight_tolerance: f64,
    /// Produce output from whatever parsed even when validation found errors
    pub export_with_errors: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::Frcs,
            default_backsight_tolerance: 2.0,
            export_with_errors: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings: Settings = serde_yaml::from_str("default_format: Walls\n").unwrap();
        assert_eq!(settings.default_format, OutputFormat::Walls);
        assert_eq!(settings.default_backsight_tolerance, 2.0);
        assert!(!settings.export_with_errors);
    }
}

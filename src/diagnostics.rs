//! Unified Diagnostics Module
//!
//! Single issue type shared by the field parse, the cross-field validator and
//! the per-format station rules. Every issue is anchored to a path into the
//! persisted document so the form can highlight the offending cell.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Diagnostic severity level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

/// Diagnostic codes for categorizing issues
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // =========================================================================
    // Field errors
    // =========================================================================
    InvalidNumber,
    OutOfRange,
    InvalidUnit,
    InvalidDate,
    InvalidOutputFormat,

    // =========================================================================
    // Cross-field errors
    // =========================================================================
    BacksightDisagreement,
    MissingSplitStation,

    // =========================================================================
    // Output format rules
    // =========================================================================
    StationNameTooLong,
    InvalidStationName,
    MissingDate,
    ExclusionNotExported,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::InvalidNumber => "invalid-number",
            DiagnosticCode::OutOfRange => "out-of-range",
            DiagnosticCode::InvalidUnit => "invalid-unit",
            DiagnosticCode::InvalidDate => "invalid-date",
            DiagnosticCode::InvalidOutputFormat => "invalid-output-format",
            DiagnosticCode::BacksightDisagreement => "backsight-disagreement",
            DiagnosticCode::MissingSplitStation => "missing-split-station",
            DiagnosticCode::StationNameTooLong => "station-name-too-long",
            DiagnosticCode::InvalidStationName => "invalid-station-name",
            DiagnosticCode::MissingDate => "missing-date",
            DiagnosticCode::ExclusionNotExported => "exclusion-not-exported",
        }
    }
}

// =============================================================================
// Issue paths
// =============================================================================

/// One step into the persisted document
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "{}", i),
            PathSegment::Key(k) => f.write_str(k),
        }
    }
}

/// Location of an issue, e.g. `pages.0.tables.0.shots.3.frontsightAzimuth`
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssuePath(Vec<PathSegment>);

impl IssuePath {
    pub fn root() -> Self {
        Self(vec![])
    }

    pub fn trip_header(field: &str) -> Self {
        Self::root().key("tripHeader").key(field)
    }

    pub fn table(page: usize, table: usize) -> Self {
        Self::root().key("pages").index(page).key("tables").index(table)
    }

    pub fn shot(page: usize, table: usize, shot: usize) -> Self {
        Self::table(page, table).key("shots").index(shot)
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.0.push(PathSegment::Key(key.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.0.push(PathSegment::Index(index));
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for IssuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for IssuePath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::root());
        }
        s.split('.')
            .map(|part| match part.parse::<usize>() {
                Ok(i) => Ok(PathSegment::Index(i)),
                Err(_) if part.is_empty() => Err(format!("empty segment in path '{}'", s)),
                Err(_) => Ok(PathSegment::Key(part.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

// =============================================================================
// Diagnostic
// =============================================================================

/// A structured, path-addressed issue
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    pub path: IssuePath,
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(code: DiagnosticCode, path: IssuePath, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            path,
        }
    }

    /// Create a warning diagnostic
    pub fn warning(code: DiagnosticCode, path: IssuePath, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            path,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning)
    }
}

pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

// =============================================================================
// Convenience Builders
// =============================================================================

pub fn invalid_number_error(path: IssuePath, detail: impl fmt::Display) -> Diagnostic {
    Diagnostic::error(DiagnosticCode::InvalidNumber, path, detail.to_string())
}

pub fn out_of_range_error(path: IssuePath, message: impl Into<String>) -> Diagnostic {
    Diagnostic::error(DiagnosticCode::OutOfRange, path, message)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let diag = Diagnostic::error(
            DiagnosticCode::InvalidNumber,
            IssuePath::shot(0, 0, 1).key("distance"),
            "not a number",
        );
        assert!(diag.is_error());
        assert!(!diag.is_warning());
        assert_eq!(diag.path.to_string(), "pages.0.tables.0.shots.1.distance");
    }

    #[test]
    fn test_warning_not_error() {
        let diag = Diagnostic::warning(
            DiagnosticCode::MissingDate,
            IssuePath::trip_header("date"),
            "no date",
        );
        assert!(!diag.is_error());
        assert!(!has_errors(&[diag]));
    }

    #[test]
    fn test_path_parse_round_trip() {
        let path: IssuePath = "pages.2.tables.0.shots.11.to.left".parse().unwrap();
        assert_eq!(path, IssuePath::shot(2, 0, 11).key("to").key("left"));
        assert_eq!(path.to_string(), "pages.2.tables.0.shots.11.to.left");
        assert!("pages..0".parse::<IssuePath>().is_err());
        assert_eq!("".parse::<IssuePath>().unwrap(), IssuePath::root());
    }

    #[test]
    fn test_path_serializes_as_array() {
        let path = IssuePath::shot(0, 1, 2).key("distance");
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"["pages",0,"tables",1,"shots",2,"distance"]"#);
        let back: IssuePath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }

    #[test]
    fn test_code_names() {
        assert_eq!(DiagnosticCode::BacksightDisagreement.as_str(), "backsight-disagreement");
    }
}

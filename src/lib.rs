//! cave-survey-data: survey data model, validation and legacy exporters
//!
//! This crate contains the pure survey logic with NO UI or storage concerns:
//! - Unit-tagged lengths and angles (feet/meters, degrees/gradians/mils)
//! - Nom-based numeric field parsing, including `*` excluded distances
//! - Persisted document types and the typed Values tree
//! - Field parsing and cross-field validation (frontsight/backsight agreement)
//! - FRCS, Compass and Walls exporters over a shared shot walk
//! - Human-readable issue locations
//! - YAML settings types and loader
//!
//! The data-entry form and image store live elsewhere; they hand this crate
//! the persisted JSON document and get text or diagnostics back.

pub mod config;
pub mod diagnostics;
pub mod document;
pub mod error_paths;
pub mod export;
pub mod model;
pub mod number;
pub mod pipeline;
pub mod schema;
pub mod units;
pub mod validator;

// Re-export commonly used types
pub use config::{Settings, SettingsLoader};
pub use diagnostics::{Diagnostic, DiagnosticCode, IssuePath, PathSegment, Severity};
pub use document::RawValues;
pub use error_paths::{classify, render_issue, IssueLocation};
pub use export::{resolve_shot_endpoint, FormatError, StationNameProblem};
pub use model::{
    Distance, LayoutVariant, LrudDirection, Lruds, OutputFormat, Page, Shot, StationAndLruds,
    StationSide, Table, TableBounds, TripHeader, Values,
};
pub use pipeline::{ExportOutput, Pipeline, PipelineError};
pub use schema::{parse_values, parse_values_with, ParsedDocument};
pub use units::{Angle, AngleUnit, Length, LengthUnit, UnitError, UnitizedNumber};
pub use validator::{validate, validate_with, ValidationReport};

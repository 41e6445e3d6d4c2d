//! Legacy format exporters
//!
//! Three independent writers share one signature, `(&Values) -> Result<String,
//! FormatError>`, and one shot walk ([`legs`]). [`OutputFormat::export`] is
//! the single dispatch point. Exporters hold no state and never mutate the
//! tree, so the same snapshot always produces the same text.
//!
//! `FormatError` means the tree contains something validation should have
//! rejected; it is an integration fault, not a user error.

pub mod compass;
pub mod frcs;
pub mod legs;
pub mod walls;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{OutputFormat, Values};

pub use compass::generate_compass_output;
pub use frcs::generate_frcs_output;
pub use legs::{legs, resolve_shot_endpoint, Leg, ShotEndpoint};
pub use walls::generate_walls_output;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormatError {
    #[error("station '{station}' cannot be written to {format}: {problem}")]
    StationName {
        format: OutputFormat,
        station: String,
        problem: StationNameProblem,
    },

    #[error("{field} {value} does not fit the {width}-character {format} column")]
    ValueTooWide {
        format: OutputFormat,
        field: &'static str,
        value: f64,
        width: usize,
    },
}

/// Why a station name does not fit a format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StationNameProblem {
    TooLong { max: usize },
    InvalidChar(char),
}

impl fmt::Display for StationNameProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationNameProblem::TooLong { max } => write!(f, "longer than {} characters", max),
            StationNameProblem::InvalidChar(c) if c.is_whitespace() => f.write_str("contains whitespace"),
            StationNameProblem::InvalidChar(c) => write!(f, "contains '{}'", c),
        }
    }
}

impl OutputFormat {
    pub fn export(&self, values: &Values) -> Result<String, FormatError> {
        match self {
            OutputFormat::Frcs => generate_frcs_output(values),
            OutputFormat::Compass => generate_compass_output(values),
            OutputFormat::Walls => generate_walls_output(values),
        }
    }

    pub fn station_name_problem(&self, station: &str) -> Option<StationNameProblem> {
        match self {
            OutputFormat::Frcs => frcs::station_name_problem(station),
            OutputFormat::Compass => compass::station_name_problem(station),
            OutputFormat::Walls => walls::station_name_problem(station),
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            OutputFormat::Frcs => "fr",
            OutputFormat::Compass => "dat",
            OutputFormat::Walls => "srv",
        }
    }
}

/// Export with the document's own format selection
pub fn export(values: &Values) -> Result<String, FormatError> {
    values.output_format.export(values)
}

pub(crate) fn check_station(format: OutputFormat, station: &str) -> Result<(), FormatError> {
    match format.station_name_problem(station) {
        None => Ok(()),
        Some(problem) => Err(FormatError::StationName {
            format,
            station: station.to_string(),
            problem,
        }),
    }
}

/// Notes are single-line in every target format
pub(crate) fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

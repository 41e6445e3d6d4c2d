//! Issue locations for people
//!
//! Turns an [`IssuePath`] such as `pages.0.tables.0.shots.3.frontsightAzimuth`
//! into text a surveyor recognises, e.g. "Frontsight azimuth from A3 to A4
//! (page 1)". Station names are read from the current tree, so renaming a
//! station changes the description of an existing issue.

use crate::diagnostics::{Diagnostic, IssuePath, PathSegment};
use crate::export::resolve_shot_endpoint;
use crate::model::{LrudDirection, StationSide, Values};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeasurementField {
    Distance,
    FrontsightAzimuth,
    BacksightAzimuth,
    FrontsightInclination,
    BacksightInclination,
}

impl MeasurementField {
    pub fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "distance" => MeasurementField::Distance,
            "frontsightAzimuth" => MeasurementField::FrontsightAzimuth,
            "backsightAzimuth" => MeasurementField::BacksightAzimuth,
            "frontsightInclination" => MeasurementField::FrontsightInclination,
            "backsightInclination" => MeasurementField::BacksightInclination,
            _ => return None,
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            MeasurementField::Distance => "Distance",
            MeasurementField::FrontsightAzimuth => "Frontsight azimuth",
            MeasurementField::BacksightAzimuth => "Backsight azimuth",
            MeasurementField::FrontsightInclination => "Frontsight inclination",
            MeasurementField::BacksightInclination => "Backsight inclination",
        }
    }
}

/// What an issue path points at
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IssueLocation {
    OutputFormat,
    TripHeaderField {
        field: String,
    },
    Station {
        page: usize,
        table: usize,
        shot: usize,
        side: StationSide,
    },
    Lrud {
        page: usize,
        table: usize,
        shot: usize,
        side: StationSide,
        direction: LrudDirection,
    },
    Measurement {
        page: usize,
        table: usize,
        shot: usize,
        field: MeasurementField,
    },
    Notes {
        page: usize,
        table: usize,
        shot: usize,
    },
}

/// Recognise the path shapes produced by parsing and validation
pub fn classify(path: &IssuePath) -> Option<IssueLocation> {
    use PathSegment::{Index, Key};

    match path.segments() {
        [Key(root)] if root == "outputFormat" => Some(IssueLocation::OutputFormat),
        [Key(root), Key(field)] if root == "tripHeader" => Some(IssueLocation::TripHeaderField {
            field: field.clone(),
        }),
        [Key(pages), Index(page), Key(tables), Index(table), Key(shots), Index(shot), rest @ ..]
            if pages == "pages" && tables == "tables" && shots == "shots" =>
        {
            let (page, table, shot) = (*page, *table, *shot);
            match rest {
                [field] => match key(field)? {
                    "notes" => Some(IssueLocation::Notes { page, table, shot }),
                    other => MeasurementField::from_key(other)
                        .map(|field| IssueLocation::Measurement { page, table, shot, field }),
                },
                [side, leaf] => {
                    let side = match key(side)? {
                        "from" => StationSide::From,
                        "to" => StationSide::To,
                        _ => return None,
                    };
                    let leaf = key(leaf)?;
                    if leaf == "station" {
                        return Some(IssueLocation::Station { page, table, shot, side });
                    }
                    LrudDirection::ALL
                        .into_iter()
                        .find(|d| d.key() == leaf)
                        .map(|direction| IssueLocation::Lrud {
                            page,
                            table,
                            shot,
                            side,
                            direction,
                        })
                }
                _ => None,
            }
        }
        _ => None,
    }
}

impl IssueLocation {
    pub fn describe(&self, values: &Values) -> String {
        match self {
            IssueLocation::OutputFormat => "Output format".to_string(),
            IssueLocation::TripHeaderField { field } => trip_header_label(field),
            IssueLocation::Station { page, table, shot, side } => {
                let name = station_name(values, *page, *table, *shot, *side);
                match name {
                    Some(name) => format!("Station {}{}", name, sheet(*page, *table)),
                    None => format!(
                        "{} station of shot {}{}",
                        side_label(*side),
                        shot + 1,
                        sheet(*page, *table)
                    ),
                }
            }
            IssueLocation::Lrud {
                page,
                table,
                shot,
                side,
                direction,
            } => {
                let label = direction_label(*direction);
                match station_name(values, *page, *table, *shot, *side) {
                    Some(name) => format!("{} at station {}{}", label, name, sheet(*page, *table)),
                    None => format!("{} on row {}{}", label, shot + 1, sheet(*page, *table)),
                }
            }
            IssueLocation::Measurement {
                page,
                table,
                shot,
                field,
            } => {
                let shots = values.shots(*page, *table).unwrap_or_default();
                let from = shots.get(*shot).map(|s| s.from.station.as_str()).unwrap_or_default();
                let to = resolve_shot_endpoint(shots, *shot)
                    .map(|end| end.station)
                    .unwrap_or_default();
                if from.is_empty() || to.is_empty() {
                    format!("{} of shot {}{}", field.label(), shot + 1, sheet(*page, *table))
                } else {
                    format!("{} from {} to {}{}", field.label(), from, to, sheet(*page, *table))
                }
            }
            IssueLocation::Notes { page, table, shot } => {
                format!("Notes of shot {}{}", shot + 1, sheet(*page, *table))
            }
        }
    }
}

/// `"{location}: {message}"`, falling back to the raw path
pub fn render_issue(diagnostic: &Diagnostic, values: &Values) -> String {
    let location = match classify(&diagnostic.path) {
        Some(location) => location.describe(values),
        None if diagnostic.path.segments().is_empty() => return diagnostic.message.clone(),
        None => diagnostic.path.to_string(),
    };
    format!("{}: {}", location, diagnostic.message)
}

fn key(segment: &PathSegment) -> Option<&str> {
    match segment {
        PathSegment::Key(k) => Some(k.as_str()),
        PathSegment::Index(_) => None,
    }
}

fn station_name(values: &Values, page: usize, table: usize, shot: usize, side: StationSide) -> Option<String> {
    values
        .shot(page, table, shot)?
        .side(side)
        .map(|s| s.station.clone())
        .filter(|s| !s.is_empty())
}

fn sheet(page: usize, table: usize) -> String {
    if table == 0 {
        format!(" (page {})", page + 1)
    } else {
        format!(" (page {}, table {})", page + 1, table + 1)
    }
}

fn trip_header_label(field: &str) -> String {
    match field {
        "caveName" => "Cave name",
        "tripName" => "Trip name",
        "team" => "Team",
        "date" => "Date",
        "distanceUnit" => "Distance unit",
        "angleUnit" => "Angle unit",
        "backsightTolerance" => "Backsight tolerance",
        "backsightAzimuthCorrected" => "Backsight azimuth correction",
        "backsightInclinationCorrected" => "Backsight inclination correction",
        other => return format!("Trip header {}", other),
    }
    .to_string()
}

fn side_label(side: StationSide) -> &'static str {
    match side {
        StationSide::From => "From",
        StationSide::To => "To",
    }
}

fn direction_label(direction: LrudDirection) -> &'static str {
    match direction {
        LrudDirection::Left => "Left",
        LrudDirection::Right => "Right",
        LrudDirection::Up => "Up",
        LrudDirection::Down => "Down",
    }
}

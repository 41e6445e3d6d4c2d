//! Cross-field validation
//!
//! Runs over the whole typed tree after the structural parse:
//!
//! - frontsight/backsight agreement within the trip's tolerance, honouring
//!   the backsight correction flags (always reported as a pair, one issue
//!   per sight, so either reading can be fixed)
//! - split rows must name their own to-station
//! - station-name and header rules of the selected output format
//!
//! # Usage
//!
//! ```
//! use cave_survey_data::document::RawValues;
//! use cave_survey_data::validator::validate;
//!
//! let raw = RawValues::from_json(r#"{ "pages": [] }"#).unwrap();
//! let report = validate(&raw);
//! assert!(!report.has_errors());
//! ```

use std::cmp::Ordering;

use tracing::debug;

use crate::config::Settings;
use crate::diagnostics::{has_errors, Diagnostic, DiagnosticCode, IssuePath};
use crate::document::RawValues;
use crate::export::StationNameProblem;
use crate::model::{OutputFormat, Shot, StationSide, TripHeader, Values};
use crate::schema::parse_values_with;
use crate::units::Angle;

// =============================================================================
// VALIDATION REPORT
// =============================================================================

/// Typed tree plus every field, cross-field and format issue
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub values: Values,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        has_errors(&self.diagnostics)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }
}

// =============================================================================
// VALIDATOR
// =============================================================================

/// Parse and validate a persisted document with built-in defaults
pub fn validate(raw: &RawValues) -> ValidationReport {
    validate_with(raw, &Settings::default())
}

pub fn validate_with(raw: &RawValues, settings: &Settings) -> ValidationReport {
    let parsed = parse_values_with(raw, settings);
    let mut diagnostics = parsed.diagnostics;
    diagnostics.extend(check_backsights(&parsed.values));
    diagnostics.extend(check_split_stations(&parsed.values));
    diagnostics.extend(check_output_format(&parsed.values));
    ValidationReport {
        values: parsed.values,
        diagnostics,
    }
}

/// Frontsight/backsight agreement for every shot in the tree
pub fn check_backsights(values: &Values) -> Vec<Diagnostic> {
    let header = &values.trip_header;
    let mut diagnostics = vec![];
    for (page_index, page) in values.pages.iter().enumerate() {
        for (table_index, table) in page.tables.iter().enumerate() {
            for (shot_index, shot) in table.shots.iter().enumerate() {
                let path = IssuePath::shot(page_index, table_index, shot_index);
                check_azimuths(shot, &path, header, &mut diagnostics);
                check_inclinations(shot, &path, header, &mut diagnostics);
            }
        }
    }
    debug!(issues = diagnostics.len(), "checked backsight agreement");
    diagnostics
}

fn check_azimuths(shot: &Shot, path: &IssuePath, header: &TripHeader, out: &mut Vec<Diagnostic>) {
    let (Some(fs), Some(bs)) = (shot.frontsight_azimuth, shot.backsight_azimuth) else {
        return;
    };
    let unit = header.angle_unit;
    let fs = fs.in_unit(unit);
    let mut bs = bs.in_unit(unit);
    if !header.backsight_azimuth_corrected {
        bs = bs.opposite();
    }
    let mut diff = (fs - bs).abs();
    let half_turn = Angle::new(unit.half_turn(), unit);
    if diff.compare(&half_turn) != Ordering::Less {
        diff = Angle::new(unit.full_turn(), unit) - diff;
    }
    push_disagreement(
        diff,
        header.backsight_tolerance,
        path,
        ("frontsightAzimuth", "backsightAzimuth"),
        "azimuth",
        out,
    );
}

fn check_inclinations(shot: &Shot, path: &IssuePath, header: &TripHeader, out: &mut Vec<Diagnostic>) {
    let (Some(fs), Some(bs)) = (shot.frontsight_inclination, shot.backsight_inclination) else {
        return;
    };
    let unit = header.angle_unit;
    let fs = fs.in_unit(unit);
    let mut bs = bs.in_unit(unit);
    if !header.backsight_inclination_corrected {
        bs = -bs;
    }
    push_disagreement(
        (fs - bs).abs(),
        header.backsight_tolerance,
        path,
        ("frontsightInclination", "backsightInclination"),
        "inclination",
        out,
    );
}

fn push_disagreement(
    diff: Angle,
    tolerance: Angle,
    path: &IssuePath,
    (fs_key, bs_key): (&str, &str),
    measurement: &str,
    out: &mut Vec<Diagnostic>,
) {
    if diff.compare(&tolerance) != Ordering::Greater {
        return;
    }
    out.push(Diagnostic::error(
        DiagnosticCode::BacksightDisagreement,
        path.clone().key(fs_key),
        format!(
            "frontsight {} must be within {} of the backsight (off by {})",
            measurement, tolerance, diff
        ),
    ));
    out.push(Diagnostic::error(
        DiagnosticCode::BacksightDisagreement,
        path.clone().key(bs_key),
        format!(
            "backsight {} must be within {} of the frontsight (off by {})",
            measurement, tolerance, diff
        ),
    ));
}

/// A split row replaces the previous shot's far end with its own `to`,
/// so that station cannot be left blank
pub fn check_split_stations(values: &Values) -> Vec<Diagnostic> {
    let mut diagnostics = vec![];
    for (page_index, page) in values.pages.iter().enumerate() {
        for (table_index, table) in page.tables.iter().enumerate() {
            for (shot_index, shot) in table.shots.iter().enumerate() {
                let named = shot.to.as_ref().is_some_and(|to| !to.station.is_empty());
                if shot.is_split && !named {
                    diagnostics.push(Diagnostic::error(
                        DiagnosticCode::MissingSplitStation,
                        IssuePath::shot(page_index, table_index, shot_index)
                            .key("to")
                            .key("station"),
                        "a split row must name its to station",
                    ));
                }
            }
        }
    }
    diagnostics
}

// =============================================================================
// OUTPUT FORMAT RULES
// =============================================================================

/// Rules the selected output format imposes beyond the field domains
pub fn check_output_format(values: &Values) -> Vec<Diagnostic> {
    let format = values.output_format;
    let mut diagnostics = vec![];

    if format == OutputFormat::Compass && values.trip_header.date.is_none() {
        diagnostics.push(Diagnostic::warning(
            DiagnosticCode::MissingDate,
            IssuePath::trip_header("date"),
            "Compass requires a survey date; 1 1 1970 will be written",
        ));
    }

    for (page_index, page) in values.pages.iter().enumerate() {
        for (table_index, table) in page.tables.iter().enumerate() {
            for (shot_index, shot) in table.shots.iter().enumerate() {
                let path = IssuePath::shot(page_index, table_index, shot_index);
                for side in [StationSide::From, StationSide::To] {
                    let Some(station) = shot.side(side) else { continue };
                    if let Some(problem) = format.station_name_problem(&station.station) {
                        diagnostics.push(station_name_error(
                            format,
                            &station.station,
                            problem,
                            path.clone().key(side.key()).key("station"),
                        ));
                    }
                }
                let excluded = shot.distance.map(|d| d.excluded).unwrap_or(false);
                if excluded && format != OutputFormat::Frcs {
                    diagnostics.push(Diagnostic::warning(
                        DiagnosticCode::ExclusionNotExported,
                        path.key("distance"),
                        format!("{} output does not mark excluded distances", format),
                    ));
                }
            }
        }
    }
    debug!(%format, issues = diagnostics.len(), "checked output format rules");
    diagnostics
}

fn station_name_error(
    format: OutputFormat,
    station: &str,
    problem: StationNameProblem,
    path: IssuePath,
) -> Diagnostic {
    let code = match problem {
        StationNameProblem::TooLong { .. } => DiagnosticCode::StationNameTooLong,
        StationNameProblem::InvalidChar(_) => DiagnosticCode::InvalidStationName,
    };
    Diagnostic::error(
        code,
        path,
        format!("station '{}' cannot be written to {}: {}", station, format, problem),
    )
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Page, Table};
    use crate::units::AngleUnit;

    fn values_with(header: TripHeader, shots: Vec<Shot>) -> Values {
        Values {
            output_format: OutputFormat::Frcs,
            trip_header: header,
            pages: vec![Page {
                image: None,
                tables: vec![Table {
                    shots,
                    ..Table::default()
                }],
            }],
        }
    }

    fn azimuth_shot(fs: f64, bs: f64) -> Shot {
        Shot {
            frontsight_azimuth: Some(Angle::degrees(fs)),
            backsight_azimuth: Some(Angle::degrees(bs)),
            ..Shot::from_station("A1")
        }
    }

    fn inclination_shot(fs: f64, bs: f64) -> Shot {
        Shot {
            frontsight_inclination: Some(Angle::degrees(fs)),
            backsight_inclination: Some(Angle::degrees(bs)),
            ..Shot::from_station("A1")
        }
    }

    fn header(azimuth_corrected: bool, inclination_corrected: bool) -> TripHeader {
        TripHeader {
            backsight_azimuth_corrected: azimuth_corrected,
            backsight_inclination_corrected: inclination_corrected,
            ..TripHeader::default()
        }
    }

    fn check(header: TripHeader, shot: Shot) -> Vec<Diagnostic> {
        check_backsights(&values_with(header, vec![shot, Shot::from_station("A2")]))
    }

    #[test]
    fn test_uncorrected_backsight_is_reversed() {
        assert!(check(header(false, true), azimuth_shot(90.0, 270.0)).is_empty());
        assert_eq!(check(header(true, true), azimuth_shot(90.0, 270.0)).len(), 2);
    }

    #[test]
    fn test_corrected_backsight_within_tolerance() {
        assert!(check(header(true, true), azimuth_shot(90.0, 91.0)).is_empty());
        assert!(check(header(true, true), azimuth_shot(90.0, 92.0)).is_empty());
    }

    #[test]
    fn test_disagreement_reported_on_both_sights() {
        let issues = check(header(true, true), azimuth_shot(90.0, 85.0));
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].path.to_string(), "pages.0.tables.0.shots.0.frontsightAzimuth");
        assert_eq!(issues[1].path.to_string(), "pages.0.tables.0.shots.0.backsightAzimuth");
        for issue in &issues {
            assert!(issue.is_error());
            assert_eq!(issue.code, DiagnosticCode::BacksightDisagreement);
            assert!(issue.message.contains("within 2 degrees"), "{}", issue.message);
            assert!(issue.message.contains("off by 5 degrees"), "{}", issue.message);
        }
    }

    #[test]
    fn test_azimuth_wraparound() {
        assert!(check(header(true, true), azimuth_shot(359.0, 1.0)).is_empty());
        assert_eq!(check(header(true, true), azimuth_shot(359.0, 2.0)).len(), 2);
        assert!(check(header(false, true), azimuth_shot(1.0, 179.0)).is_empty());
    }

    #[test]
    fn test_inclination_sign_flip() {
        assert!(check(header(true, false), inclination_shot(-5.0, 5.0)).is_empty());
        let issues = check(header(true, true), inclination_shot(-5.0, 5.0));
        assert_eq!(issues.len(), 2);
        assert!(issues[0].path.to_string().ends_with("frontsightInclination"));
        assert!(issues[1].path.to_string().ends_with("backsightInclination"));
    }

    #[test]
    fn test_single_sight_is_valid() {
        let shot = Shot {
            frontsight_azimuth: Some(Angle::degrees(10.0)),
            backsight_inclination: Some(Angle::degrees(45.0)),
            ..Shot::from_station("A1")
        };
        assert!(check(header(true, true), shot).is_empty());
    }

    #[test]
    fn test_tolerance_in_trip_units() {
        let mut h = header(true, true);
        h.angle_unit = AngleUnit::Gradians;
        h.backsight_tolerance = Angle::gradians(5.0);
        let shot = Shot {
            frontsight_azimuth: Some(Angle::gradians(100.0)),
            backsight_azimuth: Some(Angle::gradians(104.0)),
            ..Shot::from_station("A1")
        };
        assert!(check(h.clone(), shot).is_empty());

        h.backsight_tolerance = Angle::gradians(3.0);
        let shot = Shot {
            frontsight_azimuth: Some(Angle::gradians(100.0)),
            backsight_azimuth: Some(Angle::gradians(104.0)),
            ..Shot::from_station("A1")
        };
        let issues = check(h, shot);
        assert!(issues[0].message.contains("3 gradians"));
    }

    #[test]
    fn test_split_row_needs_to_station() {
        let shots = vec![
            Shot {
                distance: Some(crate::model::Distance::new(crate::units::Length::feet(10.0))),
                ..Shot::from_station("A1")
            },
            Shot {
                is_split: true,
                ..Shot::from_station("A2")
            },
            Shot {
                is_split: true,
                to: Some(crate::model::StationAndLruds::named("")),
                ..Shot::from_station("A3")
            },
            Shot {
                is_split: true,
                to: Some(crate::model::StationAndLruds::named("A4s")),
                ..Shot::from_station("A4")
            },
        ];
        let issues = check_split_stations(&values_with(TripHeader::default(), shots));
        let paths: Vec<_> = issues.iter().map(|d| d.path.to_string()).collect();
        assert_eq!(
            paths,
            vec!["pages.0.tables.0.shots.1.to.station", "pages.0.tables.0.shots.2.to.station"]
        );
        assert!(issues
            .iter()
            .all(|d| d.is_error() && d.code == DiagnosticCode::MissingSplitStation));
    }

    #[test]
    fn test_split_row_without_to_blocks_export() {
        let raw = RawValues::from_json(
            r#"{ "pages": [ { "tables": [ { "shots": [
                { "from": { "station": "A1" }, "distance": "10" },
                { "from": { "station": "A2" }, "isSplit": true }
            ] } ] } ] }"#,
        )
        .unwrap();
        let report = validate(&raw);
        let errors: Vec<_> = report.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path.to_string(), "pages.0.tables.0.shots.1.to.station");
        assert_eq!(
            crate::error_paths::render_issue(errors[0], &report.values),
            "To station of shot 2 (page 1): a split row must name its to station"
        );
    }

    #[test]
    fn test_format_station_rules() {
        let shots = vec![Shot::from_station("A12345"), Shot::from_station("B 1")];
        let mut values = values_with(TripHeader::default(), shots);

        let frcs = check_output_format(&values);
        assert_eq!(frcs.len(), 1);
        assert_eq!(frcs[0].code, DiagnosticCode::StationNameTooLong);
        assert_eq!(frcs[0].path.to_string(), "pages.0.tables.0.shots.0.from.station");

        values.output_format = OutputFormat::Walls;
        let walls = check_output_format(&values);
        assert_eq!(walls.len(), 1);
        assert_eq!(walls[0].code, DiagnosticCode::InvalidStationName);
        assert_eq!(walls[0].path.to_string(), "pages.0.tables.0.shots.1.from.station");
    }

    #[test]
    fn test_compass_warnings() {
        let mut values = values_with(
            TripHeader::default(),
            vec![
                Shot {
                    distance: Some(crate::model::Distance::excluded(crate::units::Length::feet(3.0))),
                    ..Shot::from_station("A1")
                },
                Shot::from_station("A2"),
            ],
        );
        values.output_format = OutputFormat::Compass;
        let issues = check_output_format(&values);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(Diagnostic::is_warning));
        assert_eq!(issues[0].code, DiagnosticCode::MissingDate);
        assert_eq!(issues[1].path.to_string(), "pages.0.tables.0.shots.0.distance");
    }

    #[test]
    fn test_validate_runs_all_phases() {
        let raw = RawValues::from_json(
            r#"{ "pages": [ { "tables": [ { "shots": [
                { "from": { "station": "A1" }, "distance": "x", "frontsightAzimuth": "10", "backsightAzimuth": "20" },
                { "from": { "station": "A2" } }
            ] } ] } ] }"#,
        )
        .unwrap();
        let report = validate(&raw);
        assert!(report.has_errors());
        let codes: Vec<_> = report.errors().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![
                DiagnosticCode::InvalidNumber,
                DiagnosticCode::BacksightDisagreement,
                DiagnosticCode::BacksightDisagreement,
            ]
        );
        assert_eq!(report.warnings().count(), 0);
    }
}

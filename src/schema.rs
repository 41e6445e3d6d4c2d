//! Structural parse: persisted document → typed survey tree
//!
//! Each field is parsed on its own. A field that fails to parse (or falls
//! outside its domain) becomes `None` in the typed tree and yields one
//! diagnostic at that field's path, so the rest of the document is still
//! usable. Null rows become empty rows to keep indices aligned with the
//! persisted arrays.

use chrono::NaiveDate;
use tracing::debug;

use crate::config::Settings;
use crate::diagnostics::{
    invalid_number_error, out_of_range_error, Diagnostic, DiagnosticCode, IssuePath,
};
use crate::document::{RawPage, RawShot, RawStationAndLruds, RawTable, RawTripHeader, RawValues};
use crate::model::{
    Distance, LrudDirection, Lruds, OutputFormat, Page, Shot, StationAndLruds, Table, TripHeader,
    Values,
};
use crate::number::{parse_distance_field, parse_numeric_field};
use crate::units::{format_trimmed, Angle, AngleUnit, Length, LengthUnit};

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Typed tree plus every field-level issue found while building it
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub values: Values,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse with built-in defaults
pub fn parse_values(raw: &RawValues) -> ParsedDocument {
    parse_values_with(raw, &Settings::default())
}

pub fn parse_values_with(raw: &RawValues, settings: &Settings) -> ParsedDocument {
    let mut parser = FieldParser::default();

    let output_format = parser.output_format(raw.output_format.as_deref(), settings);
    let empty_header = RawTripHeader::default();
    let trip_header = parser.trip_header(raw.trip_header.as_ref().unwrap_or(&empty_header), settings);

    let pages = raw
        .pages
        .iter()
        .enumerate()
        .map(|(page_index, page)| match page {
            Some(page) => parser.page(page, page_index, &trip_header),
            None => Page::default(),
        })
        .collect();

    let values = Values {
        output_format,
        trip_header,
        pages,
    };
    debug!(
        shots = values.shot_count(),
        issues = parser.diagnostics.len(),
        "parsed survey document"
    );
    ParsedDocument {
        values,
        diagnostics: parser.diagnostics,
    }
}

/// Domain a length field must fall in
#[derive(Clone, Copy)]
enum LengthDomain {
    Positive,
    NonNegative,
}

#[derive(Default)]
struct FieldParser {
    diagnostics: Vec<Diagnostic>,
}

impl FieldParser {
    // =========================================================================
    // Header
    // =========================================================================

    fn output_format(&mut self, raw: Option<&str>, settings: &Settings) -> OutputFormat {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => settings.default_format,
            Some(text) => match text.parse() {
                Ok(format) => format,
                Err(message) => {
                    self.diagnostics.push(Diagnostic::error(
                        DiagnosticCode::InvalidOutputFormat,
                        IssuePath::root().key("outputFormat"),
                        message,
                    ));
                    settings.default_format
                }
            },
        }
    }

    fn trip_header(&mut self, raw: &RawTripHeader, settings: &Settings) -> TripHeader {
        let defaults = TripHeader::default();

        let distance_unit: LengthUnit =
            self.unit(raw.distance_unit.as_deref(), "distanceUnit", defaults.distance_unit);
        let angle_unit: AngleUnit =
            self.unit(raw.angle_unit.as_deref(), "angleUnit", defaults.angle_unit);

        let tolerance_path = IssuePath::trip_header("backsightTolerance");
        let default_tolerance =
            Angle::degrees(settings.default_backsight_tolerance).in_unit(angle_unit);
        let backsight_tolerance = match parse_numeric_field(raw.backsight_tolerance.as_deref().unwrap_or("")) {
            Ok(None) => default_tolerance,
            Ok(Some(value)) if value.is_finite() && value >= 0.0 => Angle::new(value, angle_unit),
            Ok(Some(_)) => {
                self.diagnostics.push(out_of_range_error(
                    tolerance_path,
                    "backsight tolerance must be a finite number of at least 0",
                ));
                default_tolerance
            }
            Err(e) => {
                self.diagnostics.push(invalid_number_error(tolerance_path, e));
                default_tolerance
            }
        };

        TripHeader {
            cave_name: trimmed(raw.cave_name.as_deref()),
            trip_name: trimmed(raw.trip_name.as_deref()),
            team: split_team(raw.team.as_deref().unwrap_or("")),
            date: self.date(raw.date.as_deref()),
            distance_unit,
            angle_unit,
            backsight_azimuth_corrected: raw
                .backsight_azimuth_corrected
                .unwrap_or(defaults.backsight_azimuth_corrected),
            backsight_inclination_corrected: raw
                .backsight_inclination_corrected
                .unwrap_or(defaults.backsight_inclination_corrected),
            backsight_tolerance,
        }
    }

    fn unit<U>(&mut self, raw: Option<&str>, field: &str, fallback: U) -> U
    where
        U: std::str::FromStr<Err = crate::units::UnitError>,
    {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => fallback,
            Some(text) => text.parse().unwrap_or_else(|e: crate::units::UnitError| {
                self.diagnostics.push(Diagnostic::error(
                    DiagnosticCode::InvalidUnit,
                    IssuePath::trip_header(field),
                    e.to_string(),
                ));
                fallback
            }),
        }
    }

    fn date(&mut self, raw: Option<&str>) -> Option<NaiveDate> {
        let text = raw.map(str::trim).filter(|s| !s.is_empty())?;
        let parsed = DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok());
        if parsed.is_none() {
            self.diagnostics.push(Diagnostic::error(
                DiagnosticCode::InvalidDate,
                IssuePath::trip_header("date"),
                format!("'{}' is not a valid date (expected YYYY-MM-DD or M/D/YYYY)", text),
            ));
        }
        parsed
    }

    // =========================================================================
    // Tree
    // =========================================================================

    fn page(&mut self, raw: &RawPage, page_index: usize, header: &TripHeader) -> Page {
        let tables = raw
            .tables
            .iter()
            .enumerate()
            .map(|(table_index, table)| match table {
                Some(table) => self.table(table, page_index, table_index, header),
                None => Table::default(),
            })
            .collect();
        Page {
            image: raw.image.clone(),
            tables,
        }
    }

    fn table(&mut self, raw: &RawTable, page: usize, table: usize, header: &TripHeader) -> Table {
        let shots = raw
            .shots
            .iter()
            .enumerate()
            .map(|(shot_index, shot)| match shot {
                Some(shot) => self.shot(shot, IssuePath::shot(page, table, shot_index), header),
                None => Shot::default(),
            })
            .collect();
        Table {
            layout_variant: raw.layout_variant,
            bounds: raw.bounds,
            shots,
        }
    }

    fn shot(&mut self, raw: &RawShot, path: IssuePath, header: &TripHeader) -> Shot {
        let empty = RawStationAndLruds::default();
        let from = self.station(raw.from.as_ref().unwrap_or(&empty), path.clone().key("from"), header);
        let to = raw
            .to
            .as_ref()
            .map(|to| self.station(to, path.clone().key("to"), header));

        Shot {
            from,
            to,
            is_split: raw.is_split.unwrap_or(false),
            distance: self.distance(raw.distance.as_deref(), path.clone().key("distance"), header),
            frontsight_azimuth: self.azimuth(
                raw.frontsight_azimuth.as_deref(),
                path.clone().key("frontsightAzimuth"),
                "frontsight azimuth",
                header,
            ),
            backsight_azimuth: self.azimuth(
                raw.backsight_azimuth.as_deref(),
                path.clone().key("backsightAzimuth"),
                "backsight azimuth",
                header,
            ),
            frontsight_inclination: self.inclination(
                raw.frontsight_inclination.as_deref(),
                path.clone().key("frontsightInclination"),
                "frontsight inclination",
                header,
            ),
            backsight_inclination: self.inclination(
                raw.backsight_inclination.as_deref(),
                path.key("backsightInclination"),
                "backsight inclination",
                header,
            ),
            notes: trimmed(raw.notes.as_deref()),
        }
    }

    fn station(&mut self, raw: &RawStationAndLruds, path: IssuePath, header: &TripHeader) -> StationAndLruds {
        let mut lruds = Lruds::default();
        for direction in LrudDirection::ALL {
            let text = match direction {
                LrudDirection::Left => raw.left.as_deref(),
                LrudDirection::Right => raw.right.as_deref(),
                LrudDirection::Up => raw.up.as_deref(),
                LrudDirection::Down => raw.down.as_deref(),
            };
            let value = self.length(
                text,
                path.clone().key(direction.key()),
                direction.key(),
                LengthDomain::NonNegative,
                header.distance_unit,
            );
            lruds.set(direction, value);
        }
        StationAndLruds {
            station: trimmed(raw.station.as_deref()),
            lruds,
        }
    }

    // =========================================================================
    // Measurements
    // =========================================================================

    fn length(
        &mut self,
        raw: Option<&str>,
        path: IssuePath,
        label: &str,
        domain: LengthDomain,
        unit: LengthUnit,
    ) -> Option<Length> {
        let value = match parse_numeric_field(raw.unwrap_or("")) {
            Ok(value) => value?,
            Err(e) => {
                self.diagnostics.push(invalid_number_error(path, e));
                return None;
            }
        };
        self.check_length(value, path, label, domain).map(|v| Length::new(v, unit))
    }

    fn check_length(&mut self, value: f64, path: IssuePath, label: &str, domain: LengthDomain) -> Option<f64> {
        let ok = value.is_finite()
            && match domain {
                LengthDomain::Positive => value > 0.0,
                LengthDomain::NonNegative => value >= 0.0,
            };
        if ok {
            return Some(value);
        }
        let bound = match domain {
            LengthDomain::Positive => "greater than 0",
            LengthDomain::NonNegative => "at least 0",
        };
        self.diagnostics
            .push(out_of_range_error(path, format!("{} must be {}", label, bound)));
        None
    }

    fn distance(&mut self, raw: Option<&str>, path: IssuePath, header: &TripHeader) -> Option<Distance> {
        let parsed = match parse_distance_field(raw.unwrap_or("")) {
            Ok(parsed) => parsed?,
            Err(e) => {
                self.diagnostics.push(invalid_number_error(path, e));
                return None;
            }
        };
        let value = self.check_length(parsed.value, path, "distance", LengthDomain::Positive)?;
        Some(Distance {
            length: Length::new(value, header.distance_unit),
            excluded: parsed.excluded,
        })
    }

    fn angle(&mut self, raw: Option<&str>, path: &IssuePath) -> Option<f64> {
        match parse_numeric_field(raw.unwrap_or("")) {
            Ok(value) => value,
            Err(e) => {
                self.diagnostics.push(invalid_number_error(path.clone(), e));
                None
            }
        }
    }

    fn azimuth(&mut self, raw: Option<&str>, path: IssuePath, label: &str, header: &TripHeader) -> Option<Angle> {
        let value = self.angle(raw, &path)?;
        let unit = header.angle_unit;
        if value.is_finite() && value >= 0.0 && value < unit.full_turn() {
            return Some(Angle::new(value, unit));
        }
        self.diagnostics.push(out_of_range_error(
            path,
            format!(
                "{} must be at least 0 and less than {} {}",
                label,
                format_trimmed(unit.full_turn(), 2),
                unit
            ),
        ));
        None
    }

    fn inclination(&mut self, raw: Option<&str>, path: IssuePath, label: &str, header: &TripHeader) -> Option<Angle> {
        let value = self.angle(raw, &path)?;
        let unit = header.angle_unit;
        let limit = unit.quarter_turn();
        if value.is_finite() && (-limit..=limit).contains(&value) {
            return Some(Angle::new(value, unit));
        }
        self.diagnostics.push(out_of_range_error(
            path,
            format!(
                "{} must be between -{} and {} {}",
                label,
                format_trimmed(limit, 2),
                format_trimmed(limit, 2),
                unit
            ),
        ));
        None
    }
}

fn trimmed(raw: Option<&str>) -> String {
    raw.map(str::trim).unwrap_or_default().to_string()
}

fn split_team(raw: &str) -> Vec<String> {
    raw.split([';', ','])
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

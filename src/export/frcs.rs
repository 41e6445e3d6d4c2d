//! FRCS survey file writer
//!
//! Fixed-column text, one shot per line, values in the trip's own units.
//! The header is four lines: cave name (or ` *` when the trip stands alone),
//! trip name, team and date, and a units line such as `FT CC DD`.
//!
//! Shot columns:
//!
//! | cols  | field                               |
//! |-------|-------------------------------------|
//! | 1-5   | to station                          |
//! | 6-10  | from station                        |
//! | 11-16 | distance                            |
//! | 17    | shot kind (blank, compass and tape) |
//! | 18    | `*` when excluded from length       |
//! | 19-24 | frontsight azimuth                  |
//! | 25-30 | backsight azimuth                   |
//! | 31-35 | frontsight inclination              |
//! | 36-40 | backsight inclination               |
//! | 41-52 | left, right, up, down at to station |
//!
//! followed by the notes of the far-end row. A value too wide for its
//! column at the usual precision is written with fewer decimals; one that
//! does not fit even as a whole number is a [`FormatError::ValueTooWide`].

use chrono::Datelike;

use super::legs::{legs, Leg};
use super::{check_station, single_line, FormatError, StationNameProblem};
use crate::model::{LrudDirection, OutputFormat, TripHeader, Values};
use crate::units::{Angle, AngleUnit, LengthUnit};

pub const MAX_STATION_LEN: usize = 5;

pub fn station_name_problem(station: &str) -> Option<StationNameProblem> {
    if station.chars().count() > MAX_STATION_LEN {
        Some(StationNameProblem::TooLong { max: MAX_STATION_LEN })
    } else {
        None
    }
}

pub fn generate_frcs_output(values: &Values) -> Result<String, FormatError> {
    if values.pages.is_empty() {
        return Ok(String::new());
    }
    let header = &values.trip_header;
    let mut lines = header_lines(header);
    for leg in legs(values) {
        check_station(OutputFormat::Frcs, leg.from)?;
        check_station(OutputFormat::Frcs, leg.to)?;
        lines.push(shot_line(&leg, header)?);
    }

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

fn header_lines(header: &TripHeader) -> Vec<String> {
    let cave = if header.cave_name.is_empty() {
        " *".to_string()
    } else {
        header.cave_name.clone()
    };

    let mut team = header.team.join(", ");
    if let Some(date) = header.date {
        team.push_str(&format!(
            "   -  {:>2}-{:02}-{:02}",
            date.month(),
            date.day(),
            date.year().rem_euclid(100)
        ));
    }

    vec![cave, header.trip_name.clone(), team, units_line(header)]
}

fn units_line(header: &TripHeader) -> String {
    let distance = match header.distance_unit {
        LengthUnit::Feet => "FT",
        LengthUnit::Meters => "M ",
    };
    let correction = |corrected: bool| if corrected { 'C' } else { 'U' };
    let angle = match header.angle_unit {
        AngleUnit::Degrees => 'D',
        AngleUnit::Gradians => 'G',
        AngleUnit::Mils => 'M',
    };
    format!(
        "{} {}{} {}{}",
        distance,
        correction(header.backsight_azimuth_corrected),
        correction(header.backsight_inclination_corrected),
        angle,
        angle
    )
}

fn shot_line(leg: &Leg<'_>, header: &TripHeader) -> Result<String, FormatError> {
    let angle = |a: Option<Angle>| a.map(|a| a.get(header.angle_unit));

    let mut line = format!(
        "{:>5}{:>5}{} {}{}{}{}{}",
        leg.to,
        leg.from,
        column("distance", Some(leg.distance.length.get(header.distance_unit)), 6, 2)?,
        if leg.distance.excluded { '*' } else { ' ' },
        column("frontsight azimuth", angle(leg.frontsight_azimuth), 6, 1)?,
        column("backsight azimuth", angle(leg.backsight_azimuth), 6, 1)?,
        column("frontsight inclination", angle(leg.frontsight_inclination), 5, 1)?,
        column("backsight inclination", angle(leg.backsight_inclination), 5, 1)?,
    );
    for direction in LrudDirection::ALL {
        let value = leg.lruds.get(direction).map(|l| l.get(header.distance_unit));
        line.push_str(&column(direction.key(), value, 3, 0)?);
    }
    if !leg.comment.is_empty() {
        line.push(' ');
        line.push_str(&single_line(leg.comment));
    }
    Ok(line.trim_end().to_string())
}

/// Right-aligned field of exactly `width` characters; blank when missing.
/// Decimals are dropped one at a time until the value fits.
fn column(
    field: &'static str,
    value: Option<f64>,
    width: usize,
    decimals: usize,
) -> Result<String, FormatError> {
    let Some(v) = value else {
        return Ok(" ".repeat(width));
    };
    for precision in (0..=decimals).rev() {
        let text = format!("{:>width$.precision$}", v, width = width, precision = precision);
        if text.len() == width {
            return Ok(text);
        }
    }
    Err(FormatError::ValueTooWide {
        format: OutputFormat::Frcs,
        field,
        value: v,
        width,
    })
}

//! Compass `.DAT` survey writer
//!
//! Compass stores every measurement in decimal feet and degrees whatever the
//! display units, so lengths and angles are converted on the way out. The
//! `FORMAT:` code tells Compass how to show them again. Backsights are
//! written already corrected. The survey ends with a form-feed line.

use chrono::Datelike;

use super::legs::{legs, Leg};
use super::{check_station, single_line, FormatError, StationNameProblem};
use crate::model::{LrudDirection, OutputFormat, TripHeader, Values};
use crate::units::{Angle, AngleUnit, Length, LengthUnit};

pub const MAX_STATION_LEN: usize = 12;

const LINE_ENDING: &str = "\r\n";
const SURVEY_END: &str = "\x0c";
const MISSING_ANGLE: f64 = -999.0;
const MISSING_LRUD: f64 = -9.9;
const LRUD_ORDER: [LrudDirection; 4] = [
    LrudDirection::Left,
    LrudDirection::Up,
    LrudDirection::Down,
    LrudDirection::Right,
];

pub fn station_name_problem(station: &str) -> Option<StationNameProblem> {
    if let Some(c) = station.chars().find(|c| c.is_whitespace()) {
        return Some(StationNameProblem::InvalidChar(c));
    }
    if station.chars().count() > MAX_STATION_LEN {
        return Some(StationNameProblem::TooLong { max: MAX_STATION_LEN });
    }
    None
}

pub fn generate_compass_output(values: &Values) -> Result<String, FormatError> {
    if values.pages.is_empty() {
        return Ok(String::new());
    }
    let header = &values.trip_header;
    let mut lines = header_lines(header);
    for leg in legs(values).filter(|leg| !leg.to.is_empty()) {
        check_station(OutputFormat::Compass, leg.from)?;
        check_station(OutputFormat::Compass, leg.to)?;
        lines.push(shot_line(&leg, header));
    }
    lines.push(SURVEY_END.to_string());

    let mut out = lines.join(LINE_ENDING);
    out.push_str(LINE_ENDING);
    Ok(out)
}

fn header_lines(header: &TripHeader) -> Vec<String> {
    let date = match header.date {
        Some(d) => format!("{} {} {}", d.month(), d.day(), d.year()),
        None => "1 1 1970".to_string(),
    };
    let name = if header.trip_name.is_empty() {
        "Trip"
    } else {
        header.trip_name.as_str()
    };
    vec![
        header.cave_name.clone(),
        format!("SURVEY NAME: {}", name),
        format!("SURVEY DATE: {}", date),
        "SURVEY TEAM:".to_string(),
        header.team.join(", "),
        format!("DECLINATION: {:>7.2}  FORMAT: {}", 0.0, format_code(header)),
        String::new(),
        format!(
            "{:>12} {:>12} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} FLAGS  COMMENTS",
            "FROM", "TO", "LENGTH", "BEARING", "INC", "LEFT", "UP", "DOWN", "RIGHT", "AZM2", "INC2"
        ),
        String::new(),
    ]
}

/// Display units, LRUD order, shot item order, backsights, LRUD association
fn format_code(header: &TripHeader) -> String {
    let angle = match header.angle_unit {
        AngleUnit::Gradians => 'R',
        AngleUnit::Degrees | AngleUnit::Mils => 'D',
    };
    let length = match header.distance_unit {
        LengthUnit::Feet => 'D',
        LengthUnit::Meters => 'M',
    };
    format!("{angle}{length}{length}{angle}LUDRLAaDdBT")
}

fn shot_line(leg: &Leg<'_>, header: &TripHeader) -> String {
    let mut backsight_azimuth = leg.backsight_azimuth;
    if !header.backsight_azimuth_corrected {
        backsight_azimuth = backsight_azimuth.map(Angle::opposite);
    }
    let mut backsight_inclination = leg.backsight_inclination;
    if !header.backsight_inclination_corrected {
        backsight_inclination = backsight_inclination.map(|a| -a);
    }

    let lrud = |d: LrudDirection| feet(leg.lruds.get(d), MISSING_LRUD);
    let [left, up, down, right] = LRUD_ORDER.map(lrud);

    let mut line = format!(
        "{:>12} {:>12} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2}",
        leg.from,
        leg.to,
        leg.distance.length.get(LengthUnit::Feet),
        degrees(leg.frontsight_azimuth),
        degrees(leg.frontsight_inclination),
        left,
        up,
        down,
        right,
        degrees(backsight_azimuth),
        degrees(backsight_inclination),
    );
    if !leg.comment.is_empty() {
        line.push(' ');
        line.push_str(&single_line(leg.comment));
    }
    line
}

fn degrees(angle: Option<Angle>) -> f64 {
    angle.map_or(MISSING_ANGLE, |a| unsigned_zero(a.get(AngleUnit::Degrees)))
}

fn feet(length: Option<Length>, missing: f64) -> f64 {
    length.map_or(missing, |l| unsigned_zero(l.get(LengthUnit::Feet)))
}

/// A negated level backsight must print as `0.00`, not `-0.00`
fn unsigned_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

//! Walls `.SRV` survey writer
//!
//! Values stay in the trip's units; a single `#Units` directive declares
//! them along with the backsight conventions. Shot lines are tab separated
//! with inline LRUDs at the to-station.

use super::legs::{legs, Leg};
use super::{check_station, single_line, FormatError, StationNameProblem};
use crate::model::{LrudDirection, OutputFormat, TripHeader, Values};
use crate::units::{format_trimmed, Angle, AngleUnit, LengthUnit};

const LINE_ENDING: &str = "\r\n";
const MISSING: &str = "--";

pub fn station_name_problem(station: &str) -> Option<StationNameProblem> {
    station
        .chars()
        .find(|c| c.is_whitespace() || *c == ';')
        .map(StationNameProblem::InvalidChar)
}

pub fn generate_walls_output(values: &Values) -> Result<String, FormatError> {
    if values.pages.is_empty() {
        return Ok(String::new());
    }
    let header = &values.trip_header;
    let mut lines = header_lines(header);
    for leg in legs(values).filter(|leg| !leg.to.is_empty()) {
        check_station(OutputFormat::Walls, leg.from)?;
        check_station(OutputFormat::Walls, leg.to)?;
        lines.push(shot_line(&leg, header));
    }

    let mut out = lines.join(LINE_ENDING);
    out.push_str(LINE_ENDING);
    Ok(out)
}

fn header_lines(header: &TripHeader) -> Vec<String> {
    let mut lines = vec![];
    if !header.cave_name.is_empty() {
        lines.push(format!(";Cave: {}", header.cave_name));
    }
    if !header.trip_name.is_empty() {
        lines.push(format!(";Trip: {}", header.trip_name));
    }
    if !header.team.is_empty() {
        lines.push(format!(";Team: {}", header.team.join(", ")));
    }
    if let Some(date) = header.date {
        lines.push(format!("#Date {}", date.format("%Y-%m-%d")));
    }
    lines.push(units_directive(header));
    lines
}

fn units_directive(header: &TripHeader) -> String {
    let distance = match header.distance_unit {
        LengthUnit::Feet => "Feet",
        LengthUnit::Meters => "Meters",
    };
    let angle = match header.angle_unit {
        AngleUnit::Degrees => "Degrees",
        AngleUnit::Gradians => "Grads",
        AngleUnit::Mils => "Mills",
    };
    let tolerance = format_trimmed(header.backsight_tolerance.get(AngleUnit::Degrees), 2);
    let kind = |corrected: bool| if corrected { 'C' } else { 'N' };
    format!(
        "#Units D={d} A={a} V={a} Order=DAV LRUD=TB:LRUD TypeAB={ab},{t} TypeVB={vb},{t}",
        d = distance,
        a = angle,
        ab = kind(header.backsight_azimuth_corrected),
        vb = kind(header.backsight_inclination_corrected),
        t = tolerance,
    )
}

fn shot_line(leg: &Leg<'_>, header: &TripHeader) -> String {
    let angle = |a: Option<Angle>| a.map(|a| format_trimmed(a.get(header.angle_unit), 2));

    let mut fields = vec![
        leg.from.to_string(),
        leg.to.to_string(),
        format_trimmed(leg.distance.length.get(header.distance_unit), 2),
        sight_pair(angle(leg.frontsight_azimuth), angle(leg.backsight_azimuth)),
        sight_pair(angle(leg.frontsight_inclination), angle(leg.backsight_inclination)),
    ];
    if !leg.lruds.is_empty() {
        let lruds: Vec<String> = LrudDirection::ALL
            .iter()
            .map(|d| {
                leg.lruds
                    .get(*d)
                    .map(|l| format_trimmed(l.get(header.distance_unit), 2))
                    .unwrap_or_else(|| MISSING.to_string())
            })
            .collect();
        fields.push(format!("<{}>", lruds.join(",")));
    }
    if !leg.comment.is_empty() {
        fields.push(format!(";{}", single_line(leg.comment)));
    }
    fields.join("\t")
}

/// `fs/bs`, with `--` standing in for a missing side
fn sight_pair(frontsight: Option<String>, backsight: Option<String>) -> String {
    match (frontsight, backsight) {
        (Some(fs), None) => fs,
        (None, None) => MISSING.to_string(),
        (fs, Some(bs)) => format!("{}/{}", fs.as_deref().unwrap_or(MISSING), bs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Distance, Page, Shot, StationAndLruds, Table};
    use crate::units::Length;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn doc(trip_header: TripHeader, shots: Vec<Shot>) -> Values {
        Values {
            output_format: OutputFormat::Walls,
            trip_header,
            pages: vec![Page {
                image: None,
                tables: vec![Table {
                    shots,
                    ..Table::default()
                }],
            }],
        }
    }

    #[test]
    fn test_full_document() {
        let header = TripHeader {
            cave_name: "Fisher Ridge".to_string(),
            trip_name: "Entrance".to_string(),
            team: vec!["Andy".to_string(), "Bob".to_string()],
            date: NaiveDate::from_ymd_opt(2021, 7, 10),
            ..TripHeader::default()
        };
        let shots = vec![
            Shot {
                distance: Some(Distance::new(Length::feet(10.5))),
                frontsight_azimuth: Some(Angle::degrees(90.0)),
                backsight_azimuth: Some(Angle::degrees(90.5)),
                frontsight_inclination: Some(Angle::degrees(-5.0)),
                ..Shot::from_station("A1")
            },
            Shot {
                from: StationAndLruds::named("A2")
                    .with_lrud(LrudDirection::Left, Length::feet(1.0))
                    .with_lrud(LrudDirection::Down, Length::feet(2.25)),
                notes: "lead".to_string(),
                ..Shot::default()
            },
        ];
        let out = generate_walls_output(&doc(header, shots)).unwrap();
        assert_eq!(
            out,
            ";Cave: Fisher Ridge\r\n\
             ;Trip: Entrance\r\n\
             ;Team: Andy, Bob\r\n\
             #Date 2021-07-10\r\n\
             #Units D=Feet A=Degrees V=Degrees Order=DAV LRUD=TB:LRUD TypeAB=C,2 TypeVB=C,2\r\n\
             A1\tA2\t10.5\t90/90.5\t-5\t<1,--,--,2.25>\t;lead\r\n"
        );
    }

    #[test]
    fn test_units_directive_variants() {
        let header = TripHeader {
            distance_unit: LengthUnit::Meters,
            angle_unit: AngleUnit::Gradians,
            backsight_inclination_corrected: false,
            backsight_tolerance: Angle::gradians(5.0),
            ..TripHeader::default()
        };
        assert_eq!(
            units_directive(&header),
            "#Units D=Meters A=Grads V=Grads Order=DAV LRUD=TB:LRUD TypeAB=C,4.5 TypeVB=N,4.5"
        );
    }

    #[test]
    fn test_backsight_only_and_missing_pairs() {
        assert_eq!(sight_pair(None, Some("270".to_string())), "--/270");
        assert_eq!(sight_pair(None, None), "--");
        assert_eq!(sight_pair(Some("1".to_string()), None), "1");
    }

    #[test]
    fn test_skips_blank_to_and_blank_from() {
        let shots = vec![
            Shot {
                distance: Some(Distance::new(Length::feet(10.0))),
                ..Shot::from_station("A1")
            },
            Shot {
                distance: Some(Distance::new(Length::feet(4.0))),
                ..Shot::default()
            },
            Shot::from_station("A3"),
        ];
        let out = generate_walls_output(&doc(TripHeader::default(), shots)).unwrap();
        assert_eq!(
            out,
            "#Units D=Feet A=Degrees V=Degrees Order=DAV LRUD=TB:LRUD TypeAB=C,2 TypeVB=C,2\r\n"
        );
    }

    #[test]
    fn test_rejects_semicolon_station() {
        let shots = vec![
            Shot {
                distance: Some(Distance::new(Length::feet(10.0))),
                ..Shot::from_station("A;1")
            },
            Shot::from_station("A2"),
        ];
        let err = generate_walls_output(&doc(TripHeader::default(), shots)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "station 'A;1' cannot be written to Walls: contains ';'"
        );
    }
}

//! Shot walk shared by every exporter
//!
//! Each table row's from-station doubles as the previous row's to-station,
//! unless that later row is split and names its own to-station. The LRUDs
//! and notes recorded at the far end of a leg follow the same rule. The last
//! row of a table only ever supplies a far end.

use crate::model::{Distance, Lruds, Shot, Values};
use crate::units::Angle;

static NO_LRUDS: Lruds = Lruds {
    left: None,
    right: None,
    up: None,
    down: None,
};

/// Far end of the leg measured on row `i`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotEndpoint<'a> {
    /// Empty when not entered
    pub station: &'a str,
    pub lruds: &'a Lruds,
}

/// Resolve the to-station (and its LRUDs) of `shots[i]` from `shots[i + 1]`
pub fn resolve_shot_endpoint(shots: &[Shot], i: usize) -> Option<ShotEndpoint<'_>> {
    let next = shots.get(i.checked_add(1)?)?;
    if !next.is_split {
        return Some(ShotEndpoint {
            station: &next.from.station,
            lruds: &next.from.lruds,
        });
    }
    Some(match &next.to {
        Some(to) => ShotEndpoint {
            station: &to.station,
            lruds: &to.lruds,
        },
        None => ShotEndpoint {
            station: "",
            lruds: &NO_LRUDS,
        },
    })
}

/// One exportable survey leg
#[derive(Debug, Clone, PartialEq)]
pub struct Leg<'a> {
    pub page: usize,
    pub table: usize,
    pub shot: usize,
    pub from: &'a str,
    /// May be empty; FRCS writes it blank, Compass and Walls skip the leg
    pub to: &'a str,
    pub distance: Distance,
    pub frontsight_azimuth: Option<Angle>,
    pub backsight_azimuth: Option<Angle>,
    pub frontsight_inclination: Option<Angle>,
    pub backsight_inclination: Option<Angle>,
    /// LRUDs at the to-station
    pub lruds: &'a Lruds,
    /// Notes of the following row
    pub comment: &'a str,
}

/// Every leg with a from-station and a usable distance, in survey order
pub fn legs(values: &Values) -> impl Iterator<Item = Leg<'_>> {
    values
        .pages
        .iter()
        .enumerate()
        .flat_map(|(page_index, page)| {
            page.tables
                .iter()
                .enumerate()
                .map(move |(table_index, table)| (page_index, table_index, table.shots.as_slice()))
        })
        .flat_map(|(page, table, shots)| {
            (0..shots.len().saturating_sub(1)).filter_map(move |i| leg_at(page, table, shots, i))
        })
}

fn leg_at(page: usize, table: usize, shots: &[Shot], i: usize) -> Option<Leg<'_>> {
    let shot = shots.get(i)?;
    if shot.from.station.is_empty() {
        return None;
    }
    let endpoint = resolve_shot_endpoint(shots, i)?;
    let distance = shot.distance.filter(|d| {
        let value = d.length.value();
        value.is_finite() && value > 0.0
    })?;
    Some(Leg {
        page,
        table,
        shot: i,
        from: &shot.from.station,
        to: endpoint.station,
        distance,
        frontsight_azimuth: shot.frontsight_azimuth,
        backsight_azimuth: shot.backsight_azimuth,
        frontsight_inclination: shot.frontsight_inclination,
        backsight_inclination: shot.backsight_inclination,
        lruds: endpoint.lruds,
        comment: &shots[i + 1].notes,
    })
}

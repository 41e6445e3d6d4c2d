//! Typed survey tree
//!
//! Values → pages → tables → shots. Every measurement is unit-tagged with
//! the trip header's units, and anything the user has not entered yet is
//! `None`. Exporters read this tree and never mutate it.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::units::{Angle, AngleUnit, Length, LengthUnit};

// =============================================================================
// ROOT
// =============================================================================

/// Legacy interchange format a document is exported to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    #[serde(rename = "FRCS")]
    Frcs,
    Compass,
    Walls,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Frcs, OutputFormat::Compass, OutputFormat::Walls];
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Frcs => f.write_str("FRCS"),
            OutputFormat::Compass => f.write_str("Compass"),
            OutputFormat::Walls => f.write_str("Walls"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "frcs" => Ok(OutputFormat::Frcs),
            "compass" | "dat" => Ok(OutputFormat::Compass),
            "walls" | "srv" => Ok(OutputFormat::Walls),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Values {
    pub output_format: OutputFormat,
    pub trip_header: TripHeader,
    pub pages: Vec<Page>,
}

impl Values {
    pub fn shots(&self, page: usize, table: usize) -> Option<&[Shot]> {
        self.pages
            .get(page)?
            .tables
            .get(table)
            .map(|t| t.shots.as_slice())
    }

    pub fn shot(&self, page: usize, table: usize, shot: usize) -> Option<&Shot> {
        self.shots(page, table)?.get(shot)
    }

    pub fn shot_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| &p.tables)
            .map(|t| t.shots.len())
            .sum()
    }
}

// =============================================================================
// TRIP HEADER
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripHeader {
    pub cave_name: String,
    pub trip_name: String,
    pub team: Vec<String>,
    pub date: Option<NaiveDate>,
    pub distance_unit: LengthUnit,
    pub angle_unit: AngleUnit,
    /// Backsight azimuths were read as if sighting forward
    pub backsight_azimuth_corrected: bool,
    /// Backsight inclinations were read as if sighting forward
    pub backsight_inclination_corrected: bool,
    pub backsight_tolerance: Angle,
}

impl Default for TripHeader {
    fn default() -> Self {
        Self {
            cave_name: String::new(),
            trip_name: String::new(),
            team: vec![],
            date: None,
            distance_unit: LengthUnit::Feet,
            angle_unit: AngleUnit::Degrees,
            backsight_azimuth_corrected: true,
            backsight_inclination_corrected: true,
            backsight_tolerance: Angle::degrees(2.0),
        }
    }
}

// =============================================================================
// PAGES AND TABLES
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Opaque key into the external image store
    pub image: Option<String>,
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub layout_variant: Option<LayoutVariant>,
    pub bounds: Option<TableBounds>,
    /// Survey order
    pub shots: Vec<Shot>,
}

/// Physical survey sheet layouts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutVariant {
    #[serde(rename = "IMO")]
    Imo,
    Lech,
    #[serde(rename = "X-38")]
    X38,
    #[serde(rename = "X-39")]
    X39,
    FromStaDisAzIncLrUd,
    ToStaDisAzIncLrUd,
}

impl LayoutVariant {
    pub fn row_count(self) -> usize {
        match self {
            LayoutVariant::Imo | LayoutVariant::Lech => 11,
            LayoutVariant::X38 | LayoutVariant::X39 => 10,
            LayoutVariant::FromStaDisAzIncLrUd | LayoutVariant::ToStaDisAzIncLrUd => 26,
        }
    }

    /// Staggered sheets put station rows between shot rows
    pub fn is_staggered(self) -> bool {
        !matches!(
            self,
            LayoutVariant::FromStaDisAzIncLrUd | LayoutVariant::ToStaDisAzIncLrUd
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Pixel corners of a table on its page image
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableBounds {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_left: Point,
    pub bottom_right: Point,
}

impl TableBounds {
    pub fn from_rect(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top_left: Point { x: left, y: top },
            top_right: Point { x: left + width, y: top },
            bottom_left: Point { x: left, y: top + height },
            bottom_right: Point { x: left + width, y: top + height },
        }
    }
}

// =============================================================================
// SHOTS
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StationSide {
    From,
    To,
}

impl StationSide {
    pub fn key(self) -> &'static str {
        match self {
            StationSide::From => "from",
            StationSide::To => "to",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LrudDirection {
    Left,
    Right,
    Up,
    Down,
}

impl LrudDirection {
    pub const ALL: [LrudDirection; 4] = [
        LrudDirection::Left,
        LrudDirection::Right,
        LrudDirection::Up,
        LrudDirection::Down,
    ];

    pub fn key(self) -> &'static str {
        match self {
            LrudDirection::Left => "left",
            LrudDirection::Right => "right",
            LrudDirection::Up => "up",
            LrudDirection::Down => "down",
        }
    }
}

/// Wall clearances at a station
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Lruds {
    pub left: Option<Length>,
    pub right: Option<Length>,
    pub up: Option<Length>,
    pub down: Option<Length>,
}

impl Lruds {
    pub fn get(&self, direction: LrudDirection) -> Option<Length> {
        match direction {
            LrudDirection::Left => self.left,
            LrudDirection::Right => self.right,
            LrudDirection::Up => self.up,
            LrudDirection::Down => self.down,
        }
    }

    pub fn set(&mut self, direction: LrudDirection, value: Option<Length>) {
        match direction {
            LrudDirection::Left => self.left = value,
            LrudDirection::Right => self.right = value,
            LrudDirection::Up => self.up = value,
            LrudDirection::Down => self.down = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        LrudDirection::ALL.iter().all(|d| self.get(*d).is_none())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationAndLruds {
    /// Trimmed; empty when not entered
    pub station: String,
    pub lruds: Lruds,
}

impl StationAndLruds {
    pub fn named(station: impl Into<String>) -> Self {
        Self {
            station: station.into(),
            lruds: Lruds::default(),
        }
    }

    pub fn with_lrud(mut self, direction: LrudDirection, value: Length) -> Self {
        self.lruds.set(direction, Some(value));
        self
    }
}

/// Shot length, optionally excluded from length totals (`*` on the sheet)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub length: Length,
    pub excluded: bool,
}

impl Distance {
    pub fn new(length: Length) -> Self {
        Self {
            length,
            excluded: false,
        }
    }

    pub fn excluded(length: Length) -> Self {
        Self {
            length,
            excluded: true,
        }
    }
}

/// One row of a survey table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shot {
    pub from: StationAndLruds,
    pub to: Option<StationAndLruds>,
    /// This row records its own to-station instead of leaving the previous
    /// row's far end to this row's from-station
    pub is_split: bool,
    pub distance: Option<Distance>,
    pub frontsight_azimuth: Option<Angle>,
    pub backsight_azimuth: Option<Angle>,
    pub frontsight_inclination: Option<Angle>,
    pub backsight_inclination: Option<Angle>,
    /// Trimmed; empty when not entered
    pub notes: String,
}

impl Shot {
    pub fn from_station(station: impl Into<String>) -> Self {
        Self {
            from: StationAndLruds::named(station),
            ..Self::default()
        }
    }

    pub fn side(&self, side: StationSide) -> Option<&StationAndLruds> {
        match side {
            StationSide::From => Some(&self.from),
            StationSide::To => self.to.as_ref(),
        }
    }
}

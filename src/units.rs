//! Unit-tagged quantities
//!
//! Every distance and angle in the survey tree carries its unit. Quantities
//! of one dimension can be subtracted or compared across units: the
//! right-hand side is converted into the left-hand side's unit first.
//!
//! The dimension is part of the type (`Length` vs `Angle`), so combining a
//! distance with an angle does not compile. The runtime form of that
//! mistake is naming a unit of the wrong dimension, e.g. `"degrees"` for a
//! distance unit, which parses to [`UnitError::Mismatch`].

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Neg, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// DIMENSIONS AND ERRORS
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Length,
    Angle,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Length => f.write_str("length"),
            Dimension::Angle => f.write_str("angle"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error("unknown unit '{0}'")]
    Unknown(String),

    #[error("'{name}' is a unit of {found}, expected a unit of {expected}")]
    Mismatch {
        name: String,
        expected: Dimension,
        found: Dimension,
    },
}

/// A closed set of units for one dimension
pub trait Unit:
    Copy + Eq + fmt::Debug + fmt::Display + FromStr<Err = UnitError> + 'static
{
    const DIMENSION: Dimension;

    /// Convert `value` expressed in `from` into `to`
    fn convert(value: f64, from: Self, to: Self) -> f64;

    /// The magnitude pointing the other way (half-turn for angles, sign flip for lengths)
    fn opposite(value: f64, unit: Self) -> f64;
}

// =============================================================================
// LENGTH
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Feet,
    Meters,
}

impl LengthUnit {
    /// Exact size of one unit in meters (international foot)
    fn meters(self) -> f64 {
        match self {
            LengthUnit::Feet => 0.3048,
            LengthUnit::Meters => 1.0,
        }
    }
}

impl Unit for LengthUnit {
    const DIMENSION: Dimension = Dimension::Length;

    fn convert(value: f64, from: Self, to: Self) -> f64 {
        if from == to {
            return value;
        }
        value * from.meters() / to.meters()
    }

    fn opposite(value: f64, _unit: Self) -> f64 {
        -value
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthUnit::Feet => f.write_str("feet"),
            LengthUnit::Meters => f.write_str("meters"),
        }
    }
}

fn length_alias(name: &str) -> Option<LengthUnit> {
    match name.to_ascii_lowercase().as_str() {
        "ft" | "foot" | "feet" => Some(LengthUnit::Feet),
        "m" | "meter" | "meters" | "metre" | "metres" => Some(LengthUnit::Meters),
        _ => None,
    }
}

impl FromStr for LengthUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if let Some(unit) = length_alias(name) {
            return Ok(unit);
        }
        if angle_alias(name).is_some() {
            return Err(UnitError::Mismatch {
                name: name.to_string(),
                expected: Dimension::Length,
                found: Dimension::Angle,
            });
        }
        Err(UnitError::Unknown(name.to_string()))
    }
}

// =============================================================================
// ANGLE
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    Degrees,
    Gradians,
    Mils,
}

impl AngleUnit {
    /// Units in a full circle: 360° = 400 grad = 6400 mil
    pub fn full_turn(self) -> f64 {
        match self {
            AngleUnit::Degrees => 360.0,
            AngleUnit::Gradians => 400.0,
            AngleUnit::Mils => 6400.0,
        }
    }

    pub fn half_turn(self) -> f64 {
        self.full_turn() / 2.0
    }

    pub fn quarter_turn(self) -> f64 {
        self.full_turn() / 4.0
    }
}

impl Unit for AngleUnit {
    const DIMENSION: Dimension = Dimension::Angle;

    fn convert(value: f64, from: Self, to: Self) -> f64 {
        if from == to {
            return value;
        }
        // multiply first so whole-number ratios (90° -> 100 grad) stay exact
        value * to.full_turn() / from.full_turn()
    }

    fn opposite(value: f64, unit: Self) -> f64 {
        (value + unit.half_turn()).rem_euclid(unit.full_turn())
    }
}

impl fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AngleUnit::Degrees => f.write_str("degrees"),
            AngleUnit::Gradians => f.write_str("gradians"),
            AngleUnit::Mils => f.write_str("mils"),
        }
    }
}

fn angle_alias(name: &str) -> Option<AngleUnit> {
    match name.to_ascii_lowercase().as_str() {
        "deg" | "degree" | "degrees" => Some(AngleUnit::Degrees),
        "grad" | "grads" | "gradian" | "gradians" | "gon" => Some(AngleUnit::Gradians),
        "mil" | "mils" => Some(AngleUnit::Mils),
        _ => None,
    }
}

impl FromStr for AngleUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if let Some(unit) = angle_alias(name) {
            return Ok(unit);
        }
        if length_alias(name).is_some() {
            return Err(UnitError::Mismatch {
                name: name.to_string(),
                expected: Dimension::Angle,
                found: Dimension::Length,
            });
        }
        Err(UnitError::Unknown(name.to_string()))
    }
}

// =============================================================================
// UNITIZED NUMBER
// =============================================================================

/// A magnitude tagged with its unit
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct UnitizedNumber<U> {
    value: f64,
    unit: U,
}

pub type Length = UnitizedNumber<LengthUnit>;
pub type Angle = UnitizedNumber<AngleUnit>;

impl<U: Unit> UnitizedNumber<U> {
    pub fn new(value: f64, unit: U) -> Self {
        Self { value, unit }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> U {
        self.unit
    }

    /// Magnitude expressed in `unit`
    pub fn get(&self, unit: U) -> f64 {
        U::convert(self.value, self.unit, unit)
    }

    pub fn in_unit(&self, unit: U) -> Self {
        Self::new(self.get(unit), unit)
    }

    pub fn abs(self) -> Self {
        Self::new(self.value.abs(), self.unit)
    }

    pub fn opposite(self) -> Self {
        Self::new(U::opposite(self.value, self.unit), self.unit)
    }

    /// Three-way comparison after converting `other` into this unit.
    /// NaN sorts by IEEE total order so the result is always defined.
    pub fn compare(&self, other: &Self) -> Ordering {
        let rhs = other.get(self.unit);
        self.value
            .partial_cmp(&rhs)
            .unwrap_or_else(|| self.value.total_cmp(&rhs))
    }
}

impl UnitizedNumber<LengthUnit> {
    pub fn feet(value: f64) -> Self {
        Self::new(value, LengthUnit::Feet)
    }

    pub fn meters(value: f64) -> Self {
        Self::new(value, LengthUnit::Meters)
    }
}

impl UnitizedNumber<AngleUnit> {
    pub fn degrees(value: f64) -> Self {
        Self::new(value, AngleUnit::Degrees)
    }

    pub fn gradians(value: f64) -> Self {
        Self::new(value, AngleUnit::Gradians)
    }

    pub fn mils(value: f64) -> Self {
        Self::new(value, AngleUnit::Mils)
    }
}

impl<U: Unit> Sub for UnitizedNumber<U> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.value - rhs.get(self.unit), self.unit)
    }
}

impl<U: Unit> Neg for UnitizedNumber<U> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.value, self.unit)
    }
}

impl<U: Unit> PartialEq for UnitizedNumber<U> {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl<U: Unit> PartialOrd for UnitizedNumber<U> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl<U: Unit> fmt::Display for UnitizedNumber<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", format_trimmed(self.value, 2), self.unit)
    }
}

/// Fixed-point rendering with trailing zeros (and a bare `.`) removed
pub fn format_trimmed(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value);
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    };
    if text == "-0" {
        "0".to_string()
    } else {
        text
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ANGLE_UNITS: [AngleUnit; 3] = [AngleUnit::Degrees, AngleUnit::Gradians, AngleUnit::Mils];

    #[test]
    fn test_full_turn_equivalence() {
        assert_eq!(Angle::degrees(360.0).get(AngleUnit::Gradians), 400.0);
        assert_eq!(Angle::degrees(360.0).get(AngleUnit::Mils), 6400.0);
        assert_eq!(Angle::gradians(100.0).get(AngleUnit::Degrees), 90.0);
        assert_eq!(Angle::mils(1600.0).get(AngleUnit::Degrees), 90.0);
    }

    #[test]
    fn test_opposite_twice_is_identity() {
        for unit in ANGLE_UNITS {
            for fraction in [0.0, 0.125, 0.25, 0.5, 0.75, 0.9375] {
                let a = Angle::new(unit.full_turn() * fraction, unit);
                let back = a.opposite().opposite();
                assert_eq!(back.value(), a.value(), "{unit}: {a} -> {back}");
                assert_eq!(a.compare(&back), Ordering::Equal);
            }
        }
    }

    #[test]
    fn test_opposite_wraps_into_turn() {
        assert_eq!(Angle::degrees(270.0).opposite().value(), 90.0);
        assert_eq!(Angle::degrees(90.0).opposite().value(), 270.0);
        assert_eq!(Angle::gradians(350.0).opposite().value(), 150.0);
        assert_eq!(Angle::mils(100.0).opposite().value(), 3300.0);
    }

    #[test]
    fn test_length_opposite_negates() {
        assert_eq!(Length::feet(3.0).opposite().value(), -3.0);
    }

    #[test]
    fn test_compare_converts_units() {
        assert_eq!(Angle::degrees(90.0).compare(&Angle::gradians(100.0)), Ordering::Equal);
        assert_eq!(Angle::degrees(1.0).compare(&Angle::mils(10.0)), Ordering::Greater);
        assert_eq!(Length::meters(1.0).compare(&Length::feet(3.0)), Ordering::Greater);
        assert_eq!(Length::feet(0.0).compare(&Length::feet(-0.0)), Ordering::Equal);
    }

    #[test]
    fn test_sub_uses_left_hand_unit() {
        let diff = Angle::degrees(180.0) - Angle::gradians(100.0);
        assert_eq!(diff.unit(), AngleUnit::Degrees);
        assert_eq!(diff.value(), 90.0);
        assert_eq!((-diff).abs().value(), 90.0);
    }

    #[test]
    fn test_feet_meters_round_trip() {
        let ft = Length::meters(0.3048).get(LengthUnit::Feet);
        assert!((ft - 1.0).abs() < 1e-12);
        assert!((Length::feet(10.0).get(LengthUnit::Meters) - 3.048).abs() < 1e-12);
    }

    #[test]
    fn test_unit_names() {
        assert_eq!("ft".parse::<LengthUnit>(), Ok(LengthUnit::Feet));
        assert_eq!(" Meters ".parse::<LengthUnit>(), Ok(LengthUnit::Meters));
        assert_eq!("grads".parse::<AngleUnit>(), Ok(AngleUnit::Gradians));
        assert_eq!("MIL".parse::<AngleUnit>(), Ok(AngleUnit::Mils));
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = "degrees".parse::<LengthUnit>().unwrap_err();
        assert_eq!(
            err,
            UnitError::Mismatch {
                name: "degrees".to_string(),
                expected: Dimension::Length,
                found: Dimension::Angle,
            }
        );
        assert!(matches!("feet".parse::<AngleUnit>(), Err(UnitError::Mismatch { .. })));
        assert!(matches!("furlongs".parse::<LengthUnit>(), Err(UnitError::Unknown(_))));
    }

    #[test]
    fn test_display() {
        assert_eq!(Angle::degrees(2.0).to_string(), "2 degrees");
        assert_eq!(Length::meters(1.25).to_string(), "1.25 meters");
        assert_eq!(format_trimmed(-0.001, 2), "0");
        assert_eq!(format_trimmed(10.50, 2), "10.5");
        assert_eq!(format_trimmed(300.0, 2), "300");
    }
}

//! Persisted survey document
//!
//! This is the shape the data-entry form stores: every leaf optional, every
//! measurement still the text the user typed, and array slots possibly
//! `null` for rows that were never touched. [`crate::schema`] turns it into
//! the typed [`crate::model::Values`] tree.

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::{LayoutVariant, TableBounds};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_header: Option<RawTripHeader>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pages: Vec<Option<RawPage>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTripHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cave_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_name: Option<String>,
    /// Surveyor names separated by `;` or `,`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backsight_azimuth_corrected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backsight_inclination_corrected: Option<bool>,
    /// Older documents store a bare JSON number here
    #[serde(
        default,
        deserialize_with = "number_or_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub backsight_tolerance: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPage {
    /// Opaque key into the external image store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tables: Vec<Option<RawTable>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_variant: Option<LayoutVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<TableBounds>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub shots: Vec<Option<RawShot>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawShot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<RawStationAndLruds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<RawStationAndLruds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_split: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontsight_azimuth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backsight_azimuth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontsight_inclination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backsight_inclination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStationAndLruds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down: Option<String>,
}

impl RawValues {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// A `null` list is an untouched list
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn number_or_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberOrText>::deserialize(deserializer)?.map(|value| match value {
        NumberOrText::Number(n) => n.to_string(),
        NumberOrText::Text(text) => text,
    }))
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Europeana record types.
//!
//! The search API returns most item fields wrapped in single-element
//! arrays (`"country": ["france"]`), but not consistently. [`RawItem`]
//! keeps each of those fields as an explicit [`FieldValue`] so the
//! normalizer can unwrap them deliberately, producing a flat
//! [`NormalizedRecord`] with scalar-typed fields.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::{AsRefStr, Display};

/// Location label for records that have no coordinates or whose point
/// falls outside every reference polygon.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// A single item field as delivered by the search API: either a bare
/// scalar or an ordered sequence of scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// JSON array, e.g. `["48.8566"]`.
    Sequence(Vec<serde_json::Value>),
    /// Any non-array JSON value.
    Single(serde_json::Value),
}

impl FieldValue {
    /// Returns the value this field stands for.
    ///
    /// Sequences yield their first element (the API sends at most one
    /// for the fields we read). Empty sequences and `null` are missing.
    #[must_use]
    pub fn extract_single(&self) -> Option<&serde_json::Value> {
        let value = match self {
            Self::Sequence(values) => values.first()?,
            Self::Single(value) => value,
        };

        if value.is_null() { None } else { Some(value) }
    }

    /// Extracts the field as text. Numbers and booleans are rendered with
    /// their JSON representation.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self.extract_single()? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Extracts the field as a coordinate.
    ///
    /// Strings are trimmed and parsed as `f64`. Anything that does not
    /// yield a finite number is missing rather than zero.
    #[must_use]
    pub fn as_coordinate(&self) -> Option<f64> {
        let parsed = match self.extract_single()? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;

        parsed.is_finite().then_some(parsed)
    }
}

/// One item from a search response, before normalization.
///
/// Only the fields the explorer uses are kept; everything else in the
/// payload is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    #[serde(default)]
    pub edm_place_latitude: Option<FieldValue>,
    #[serde(default)]
    pub edm_place_longitude: Option<FieldValue>,
    /// Europeana record identifier (e.g. `"/2048128/618580"`).
    #[serde(default)]
    pub id: Option<FieldValue>,
    #[serde(default)]
    pub country: Option<FieldValue>,
    #[serde(default)]
    pub data_provider: Option<FieldValue>,
    #[serde(default)]
    pub dc_creator: Option<FieldValue>,
}

/// Country label assigned to a record by the spatial aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectLocation {
    /// Name of the first reference polygon containing the record.
    Country(String),
    /// No coordinates, or no polygon contains the point.
    Unknown,
}

impl ObjectLocation {
    /// The label as displayed and exported.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Country(name) => name,
            Self::Unknown => UNKNOWN_LOCATION,
        }
    }

    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ObjectLocation {
    fn from(value: &str) -> Self {
        if value == UNKNOWN_LOCATION {
            Self::Unknown
        } else {
            Self::Country(value.to_string())
        }
    }
}

impl Serialize for ObjectLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ObjectLocation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from(value.as_str()))
    }
}

/// A flattened search result row.
///
/// Coordinates are WGS84 degrees and are either finite numbers or
/// `None`. `object_location` stays `None` until the record has been
/// through spatial aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub id: String,
    pub country: Option<String>,
    pub data_provider: Option<String>,
    pub creator: Option<String>,
    pub object_location: Option<ObjectLocation>,
}

impl NormalizedRecord {
    /// Returns `(longitude, latitude)` when both coordinates are present,
    /// in the axis order used by the polygon geometries.
    #[must_use]
    pub const fn lng_lat(&self) -> Option<(f64, f64)> {
        match (self.longitude, self.latitude) {
            (Some(lng), Some(lat)) => Some((lng, lat)),
            _ => None,
        }
    }

    /// Resolved location label. Records that were never aggregated count
    /// as [`UNKNOWN_LOCATION`].
    #[must_use]
    pub fn location_label(&self) -> &str {
        self.object_location
            .as_ref()
            .map_or(UNKNOWN_LOCATION, ObjectLocation::as_str)
    }

    /// Renders one cell of the tabular export. Missing values are empty.
    #[must_use]
    pub fn cell(&self, column: RecordColumn) -> String {
        match column {
            RecordColumn::Latitude => self.latitude.map(|v| v.to_string()).unwrap_or_default(),
            RecordColumn::Longitude => self.longitude.map(|v| v.to_string()).unwrap_or_default(),
            RecordColumn::Id => self.id.clone(),
            RecordColumn::Country => self.country.clone().unwrap_or_default(),
            RecordColumn::DataProvider => self.data_provider.clone().unwrap_or_default(),
            RecordColumn::Creator => self.creator.clone().unwrap_or_default(),
            RecordColumn::ObjectLocation => self.location_label().to_string(),
        }
    }
}

/// Columns of the tabular record export, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum RecordColumn {
    Latitude,
    Longitude,
    Id,
    Country,
    DataProvider,
    Creator,
    ObjectLocation,
}

impl RecordColumn {
    /// Every column, in export order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Latitude,
            Self::Longitude,
            Self::Id,
            Self::Country,
            Self::DataProvider,
            Self::Creator,
            Self::ObjectLocation,
        ]
    }
}

/// Number of records resolved to one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationCount {
    pub location: String,
    pub count: u64,
}

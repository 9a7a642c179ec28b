//! Loads the reference country polygons from a `GeoJSON`
//! `FeatureCollection` (e.g. Natural Earth admin-0 countries).

use std::path::Path;

use geo::MultiPolygon;
use geojson::{Feature, GeoJson};
use heritage_map_record_models::UNKNOWN_LOCATION;

use crate::{CountryPolygon, SpatialError};

/// Feature properties tried, in order, when no name property is given.
pub const DEFAULT_NAME_PROPERTIES: &[&str] = &["name", "NAME", "ADMIN", "name_long"];

/// Reads and parses a country dataset file.
///
/// # Errors
///
/// Returns [`SpatialError`] if the file cannot be read or is not a
/// `GeoJSON` `FeatureCollection`.
pub fn load_countries(
    path: &Path,
    name_property: Option<&str>,
) -> Result<Vec<CountryPolygon>, SpatialError> {
    let contents = std::fs::read_to_string(path)?;
    let countries = parse_countries(&contents, name_property)?;
    log::info!(
        "Loaded {} country polygons from {}",
        countries.len(),
        path.display()
    );
    Ok(countries)
}

/// Parses a `GeoJSON` `FeatureCollection` into country polygons, keeping
/// feature order.
///
/// Features without a name or without polygonal geometry are skipped
/// with a warning, as is a feature named `"Unknown"`, which would be
/// indistinguishable from unmatched records.
///
/// # Errors
///
/// Returns [`SpatialError`] if the text is not `GeoJSON` or not a
/// `FeatureCollection`.
pub fn parse_countries(
    geojson_str: &str,
    name_property: Option<&str>,
) -> Result<Vec<CountryPolygon>, SpatialError> {
    let GeoJson::FeatureCollection(collection) = geojson_str.parse::<GeoJson>()? else {
        return Err(SpatialError::InvalidDataset {
            message: "expected a FeatureCollection".to_string(),
        });
    };

    let mut countries = Vec::with_capacity(collection.features.len());
    for (i, feature) in collection.features.iter().enumerate() {
        let Some(name) = feature_name(feature, name_property) else {
            log::warn!("Skipping country feature {i}: no name property");
            continue;
        };

        if name == UNKNOWN_LOCATION {
            log::warn!(
                "Skipping country feature {i}: '{UNKNOWN_LOCATION}' is reserved for unmatched records"
            );
            continue;
        }

        let Some(geometry) = feature_multipolygon(feature) else {
            log::warn!("Skipping country '{name}': geometry is missing or not polygonal");
            continue;
        };

        countries.push(CountryPolygon::new(name, geometry));
    }

    Ok(countries)
}

fn feature_name(feature: &Feature, name_property: Option<&str>) -> Option<String> {
    let candidates: Vec<&str> =
        name_property.map_or_else(|| DEFAULT_NAME_PROPERTIES.to_vec(), |p| vec![p]);

    candidates
        .iter()
        .filter_map(|key| feature.property(key))
        .filter_map(serde_json::Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn feature_multipolygon(feature: &Feature) -> Option<MultiPolygon<f64>> {
    let geometry = feature.geometry.clone()?;
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

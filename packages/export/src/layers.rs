//! `GeoJSON` map layers.
//!
//! [`points_layer`] has one marker per located record; [`countries_layer`]
//! carries each reference country with its record count for choropleth
//! shading.

use std::io::{BufWriter, Write as _};
use std::path::Path;

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};
use heritage_map_record_models::NormalizedRecord;
use heritage_map_spatial::CountryPolygon;

use crate::ExportError;

/// Suffix of the point-marker layer file.
pub const POINTS_SUFFIX: &str = "_points.geojson";
/// Suffix of the country-count layer file.
pub const COUNTRIES_SUFFIX: &str = "_countries.geojson";

/// Builds a marker for every record with both coordinates. Records
/// without coordinates are left off the map.
#[must_use]
pub fn points_layer(records: &[NormalizedRecord]) -> FeatureCollection {
    let features: Vec<Feature> = records
        .iter()
        .filter_map(|record| {
            let (lng, lat) = record.lng_lat()?;

            let mut properties = JsonObject::new();
            properties.insert("id".to_string(), JsonValue::from(record.id.as_str()));
            properties.insert("creator".to_string(), optional(record.creator.as_deref()));
            properties.insert("country".to_string(), optional(record.country.as_deref()));
            properties.insert(
                "dataProvider".to_string(),
                optional(record.data_provider.as_deref()),
            );
            properties.insert(
                "objectLocation".to_string(),
                JsonValue::from(record.location_label()),
            );
            properties.insert("popup".to_string(), JsonValue::from(popup(record)));

            Some(Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::Point(vec![lng, lat]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            })
        })
        .collect();

    collection(features)
}

/// Builds one feature per reference country, in reference order, with
/// `name` and `objectCount` properties.
#[must_use]
pub fn countries_layer(countries: &[CountryPolygon]) -> FeatureCollection {
    let features: Vec<Feature> = countries
        .iter()
        .map(|country| {
            let mut properties = JsonObject::new();
            properties.insert("name".to_string(), JsonValue::from(country.name.as_str()));
            properties.insert(
                "objectCount".to_string(),
                JsonValue::from(country.object_count),
            );

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(&country.geometry))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    collection(features)
}

/// HTML popup text for a marker.
#[must_use]
pub fn popup(record: &NormalizedRecord) -> String {
    format!(
        "ID: {}<br>Creator: {}<br>Country: {}",
        record.id,
        record.creator.as_deref().unwrap_or_default(),
        record.country.as_deref().unwrap_or_default()
    )
}

/// Serializes a layer to `path`.
///
/// # Errors
///
/// Returns [`ExportError`] if the file cannot be written.
pub fn write_layer(path: &Path, layer: &FeatureCollection) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, layer)?;
    writer.flush()?;

    log::info!(
        "Wrote {} features to {}",
        layer.features.len(),
        path.display()
    );
    Ok(())
}

fn optional(value: Option<&str>) -> JsonValue {
    value.map_or(JsonValue::Null, JsonValue::from)
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use geo::{MultiPolygon, Rect};
    use heritage_map_record_models::ObjectLocation;

    use super::*;

    fn record(id: &str, lat: Option<f64>, lng: Option<f64>) -> NormalizedRecord {
        NormalizedRecord {
            latitude: lat,
            longitude: lng,
            id: id.to_string(),
            country: Some("france".to_string()),
            data_provider: None,
            creator: Some("Monet".to_string()),
            object_location: Some(ObjectLocation::Country("France".to_string())),
        }
    }

    #[test]
    fn places_markers_for_located_records_only() {
        let layer = points_layer(&[
            record("/1/a", Some(48.85), Some(2.35)),
            record("/1/b", None, Some(2.35)),
        ]);

        assert_eq!(layer.features.len(), 1);
        let feature = &layer.features[0];
        assert_eq!(
            feature.geometry.as_ref().map(|g| &g.value),
            Some(&geojson::Value::Point(vec![2.35, 48.85]))
        );
        assert_eq!(feature.property("id"), Some(&JsonValue::from("/1/a")));
        assert_eq!(feature.property("dataProvider"), Some(&JsonValue::Null));
        assert_eq!(
            feature.property("popup"),
            Some(&JsonValue::from("ID: /1/a<br>Creator: Monet<br>Country: france"))
        );
    }

    #[test]
    fn country_layer_carries_counts_in_order() {
        let square = MultiPolygon(vec![Rect::new((0.0, 0.0), (1.0, 1.0)).to_polygon()]);
        let countries = vec![
            CountryPolygon {
                object_count: 3,
                ..CountryPolygon::new("A", square.clone())
            },
            CountryPolygon::new("B", square),
        ];

        let layer = countries_layer(&countries);
        let counts: Vec<Option<&JsonValue>> = layer
            .features
            .iter()
            .map(|f| f.property("objectCount"))
            .collect();
        assert_eq!(
            counts,
            [Some(&JsonValue::from(3_u64)), Some(&JsonValue::from(0_u64))]
        );
        assert!(matches!(
            layer.features[0].geometry.as_ref().map(|g| &g.value),
            Some(geojson::Value::MultiPolygon(_))
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn write_layer_reports_a_failed_flush() {
        let result = write_layer(Path::new("/dev/full"), &points_layer(&[]));
        assert!(matches!(result, Err(ExportError::Io(_))));
    }

    #[test]
    fn layers_serialize_as_feature_collections() {
        let layer = points_layer(&[record("/1/a", Some(1.0), Some(2.0))]);
        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"][0]["geometry"]["coordinates"][0], 2.0);
    }
}

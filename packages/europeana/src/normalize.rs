//! Flattens raw search items into [`NormalizedRecord`] rows.

use heritage_map_record_models::{FieldValue, NormalizedRecord, RawItem};

/// Normalizes every item, preserving order. Items are never dropped;
/// unusable coordinates become `None`.
#[must_use]
pub fn normalize_items(items: &[RawItem]) -> Vec<NormalizedRecord> {
    let records: Vec<NormalizedRecord> = items.iter().map(normalize_item).collect();

    let without_coordinates = records.iter().filter(|r| r.lng_lat().is_none()).count();
    if without_coordinates > 0 {
        log::debug!(
            "{without_coordinates} of {} records have no usable coordinates",
            records.len()
        );
    }

    records
}

/// Normalizes a single item.
#[must_use]
pub fn normalize_item(item: &RawItem) -> NormalizedRecord {
    NormalizedRecord {
        latitude: coordinate(item.edm_place_latitude.as_ref()),
        longitude: coordinate(item.edm_place_longitude.as_ref()),
        id: text(item.id.as_ref()).unwrap_or_default(),
        country: text(item.country.as_ref()),
        data_provider: text(item.data_provider.as_ref()),
        creator: text(item.dc_creator.as_ref()),
        object_location: None,
    }
}

fn text(field: Option<&FieldValue>) -> Option<String> {
    field.and_then(FieldValue::as_text)
}

fn coordinate(field: Option<&FieldValue>) -> Option<f64> {
    field.and_then(FieldValue::as_coordinate)
}

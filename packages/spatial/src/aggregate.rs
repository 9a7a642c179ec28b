//! Spatial join of records onto country polygons, plus per-location
//! summaries.

use std::collections::BTreeMap;

use heritage_map_record_models::{LocationCount, NormalizedRecord, ObjectLocation};
use serde::{Deserialize, Serialize};

use crate::{CountryIndex, CountryPolygon};

/// Output of a spatial join.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// Input records in input order, each with `object_location` set.
    pub records: Vec<NormalizedRecord>,
    /// Reference polygons in reference order, each with `object_count`.
    pub countries: Vec<CountryPolygon>,
}

impl CountryIndex {
    /// Labels every record with its containing country and counts
    /// records per country.
    ///
    /// Records without both coordinates, and points outside every
    /// polygon, are labelled [`ObjectLocation::Unknown`]. Countries with
    /// no records are kept with a count of zero. A polygon named
    /// `"Unknown"` would collide with that label; [`crate::parse_countries`]
    /// never yields one.
    #[must_use]
    pub fn aggregate(&self, records: &[NormalizedRecord]) -> Aggregation {
        let records: Vec<NormalizedRecord> = records
            .iter()
            .map(|record| {
                let location = record
                    .lng_lat()
                    .and_then(|(lng, lat)| self.locate(lng, lat))
                    .map_or(ObjectLocation::Unknown, |country| {
                        ObjectLocation::Country(country.name.clone())
                    });

                NormalizedRecord {
                    object_location: Some(location),
                    ..record.clone()
                }
            })
            .collect();

        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        for record in &records {
            if let Some(ObjectLocation::Country(name)) = &record.object_location {
                *counts.entry(name.as_str()).or_default() += 1;
            }
        }

        let countries = self
            .countries()
            .iter()
            .map(|country| CountryPolygon {
                object_count: counts.get(country.name.as_str()).copied().unwrap_or(0),
                ..country.clone()
            })
            .collect();

        let unknown = records
            .iter()
            .filter(|r| matches!(r.object_location, Some(ObjectLocation::Unknown)))
            .count();
        log::info!(
            "Attributed {} of {} records to {} countries ({unknown} unknown)",
            records.len() - unknown,
            records.len(),
            counts.len()
        );

        Aggregation { records, countries }
    }
}

/// Joins `records` onto `polygons`.
///
/// Convenience wrapper that builds a throwaway [`CountryIndex`]; callers
/// aggregating repeatedly against the same reference set should keep an
/// index instead.
#[must_use]
pub fn aggregate(
    records: &[NormalizedRecord],
    polygons: &[CountryPolygon],
) -> (Vec<NormalizedRecord>, Vec<CountryPolygon>) {
    let Aggregation { records, countries } =
        CountryIndex::new(polygons.to_vec()).aggregate(records);
    (records, countries)
}

/// Counts records per resolved location.
///
/// Sorted by count descending; equal counts keep the order in which the
/// location was first seen. Records that were never aggregated count as
/// `"Unknown"`.
#[must_use]
pub fn count_by_location(records: &[NormalizedRecord]) -> Vec<LocationCount> {
    let mut positions: BTreeMap<&str, usize> = BTreeMap::new();
    let mut counts: Vec<LocationCount> = Vec::new();

    for record in records {
        let label = record.location_label();
        let position = *positions.entry(label).or_insert_with(|| {
            counts.push(LocationCount {
                location: label.to_string(),
                count: 0,
            });
            counts.len() - 1
        });
        counts[position].count += 1;
    }

    // Stable sort keeps first-seen order among ties.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Centre point for a map of the records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapCenter {
    pub latitude: f64,
    pub longitude: f64,
}

/// Mean position of all records with both coordinates, or `None` when
/// no record has any.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn map_center(records: &[NormalizedRecord]) -> Option<MapCenter> {
    let (count, lat_sum, lng_sum) = records
        .iter()
        .filter_map(NormalizedRecord::lng_lat)
        .fold((0_usize, 0.0, 0.0), |(n, lat_sum, lng_sum), (lng, lat)| {
            (n + 1, lat_sum + lat, lng_sum + lng)
        });

    (count > 0).then(|| MapCenter {
        latitude: lat_sum / count as f64,
        longitude: lng_sum / count as f64,
    })
}

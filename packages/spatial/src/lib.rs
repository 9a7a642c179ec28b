#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Country attribution for normalized records.
//!
//! Loads a reference set of country polygons, builds an R-tree over their
//! bounding boxes, and answers point-in-polygon lookups. The aggregator
//! labels every record with the country that contains it (or
//! `"Unknown"`) and counts records per country.

pub mod aggregate;
pub mod countries;

pub use aggregate::{Aggregation, MapCenter, aggregate, count_by_location, map_center};
pub use countries::{load_countries, parse_countries};

use geo::{BoundingRect, Contains, MultiPolygon};
use rstar::{AABB, RTree, RTreeObject};
use thiserror::Error;

/// Errors from loading the reference polygons.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// Reading the dataset file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The dataset is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The dataset parsed but has the wrong shape.
    #[error("Invalid country dataset: {message}")]
    InvalidDataset {
        /// Description of what went wrong.
        message: String,
    },
}

/// A named country boundary from the reference dataset.
///
/// `object_count` is zero in the reference set and filled in by
/// [`aggregate`].
#[derive(Debug, Clone, PartialEq)]
pub struct CountryPolygon {
    pub name: String,
    /// Boundary in WGS84 longitude/latitude. Single polygons are stored
    /// as one-element multipolygons.
    pub geometry: MultiPolygon<f64>,
    pub object_count: u64,
}

impl CountryPolygon {
    #[must_use]
    pub fn new(name: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        Self {
            name: name.into(),
            geometry,
            object_count: 0,
        }
    }
}

/// Bounding box of one reference polygon, keyed by its position in the
/// reference order.
struct IndexEntry {
    position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Reference country polygons with an R-tree over their bounding boxes.
///
/// Built once and reused for every aggregation.
pub struct CountryIndex {
    countries: Vec<CountryPolygon>,
    tree: RTree<IndexEntry>,
}

impl CountryIndex {
    /// Builds the index. Polygons with no extent stay in the reference
    /// set but can never match.
    #[must_use]
    pub fn new(countries: Vec<CountryPolygon>) -> Self {
        let entries = countries
            .iter()
            .enumerate()
            .filter_map(|(position, country)| {
                compute_envelope(&country.geometry).map(|envelope| IndexEntry { position, envelope })
            })
            .collect();

        let tree = RTree::bulk_load(entries);
        log::debug!(
            "Indexed {} of {} country polygons",
            tree.size(),
            countries.len()
        );

        Self { countries, tree }
    }

    /// Reference polygons in their original order.
    #[must_use]
    pub fn countries(&self) -> &[CountryPolygon] {
        &self.countries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Returns the country containing the point.
    ///
    /// Points on a boundary are not contained. If polygons overlap, the
    /// one earliest in the reference order wins.
    #[must_use]
    pub fn locate(&self, lng: f64, lat: f64) -> Option<&CountryPolygon> {
        let point = geo::Point::new(lng, lat);
        let query_env = AABB::from_point([lng, lat]);

        self.tree
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| self.countries[entry.position].geometry.contains(&point))
            .map(|entry| entry.position)
            .min()
            .map(|position| &self.countries[position])
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> Option<AABB<[f64; 2]>> {
    mp.bounding_rect()
        .map(|rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]))
}

#[cfg(test)]
pub(crate) mod test_support {
    use geo::{MultiPolygon, Rect};

    use crate::CountryPolygon;

    /// Axis-aligned country box spanning the given longitudes/latitudes.
    pub fn country_box(name: &str, lng: (f64, f64), lat: (f64, f64)) -> CountryPolygon {
        let rect = Rect::new((lng.0, lat.0), (lng.1, lat.1));
        CountryPolygon::new(name, MultiPolygon(vec![rect.to_polygon()]))
    }
}

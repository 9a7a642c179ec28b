#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fetch-and-attribute pipeline for the heritage map explorer.
//!
//! An [`Explorer`] pairs a Europeana client with the country index,
//! both built once at startup. Each [`Explorer::explore`] call fetches
//! one provider's records, attributes them to countries, and returns an
//! [`Exploration`] ready for display and export.

pub mod settings;

use std::path::PathBuf;

use heritage_map_europeana::{EuropeanaClient, EuropeanaError};
use heritage_map_export::ExportError;
use heritage_map_record_models::{LocationCount, NormalizedRecord};
use heritage_map_spatial::{
    CountryIndex, CountryPolygon, MapCenter, SpatialError, count_by_location, load_countries,
    map_center,
};
use serde::Serialize;
use thiserror::Error;

pub use settings::ExplorerSettings;

/// Number of rows shown in a preview.
pub const PREVIEW_ROWS: usize = 5;

/// Errors from the explorer pipeline.
#[derive(Debug, Error)]
pub enum ExploreError {
    /// Configuration, validation, or fetch failure.
    #[error(transparent)]
    Europeana(#[from] EuropeanaError),

    /// The country dataset could not be loaded.
    #[error("Country dataset error: {0}")]
    Spatial(#[from] SpatialError),

    /// Writing an export failed.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// The settings file could not be read or parsed.
    #[error("Settings error: {message}")]
    Settings {
        /// Description of what went wrong.
        message: String,
    },
}

/// Search client plus reference countries.
pub struct Explorer {
    client: EuropeanaClient,
    index: CountryIndex,
}

impl Explorer {
    #[must_use]
    pub const fn new(client: EuropeanaClient, index: CountryIndex) -> Self {
        Self { client, index }
    }

    /// Builds the client and loads the country dataset named in
    /// `settings`.
    ///
    /// Without a dataset every record resolves to `"Unknown"`.
    ///
    /// # Errors
    ///
    /// Returns [`ExploreError::Europeana`] when the API key is missing or
    /// the API settings are invalid, and [`ExploreError::Spatial`] when
    /// the country dataset cannot be loaded.
    pub fn from_settings(settings: &ExplorerSettings) -> Result<Self, ExploreError> {
        let client = EuropeanaClient::new(settings.api_config()?)?;

        let countries = match &settings.countries_path {
            Some(path) => load_countries(path, settings.country_name_property.as_deref())?,
            None => {
                log::warn!(
                    "No country dataset configured; every record will be attributed to Unknown"
                );
                Vec::new()
            }
        };

        Ok(Self::new(client, CountryIndex::new(countries)))
    }

    #[must_use]
    pub const fn index(&self) -> &CountryIndex {
        &self.index
    }

    /// Fetches up to `rows` records for `provider_name` and attributes
    /// them to countries.
    ///
    /// # Errors
    ///
    /// Returns [`ExploreError::Europeana`] for an empty provider name or
    /// a failed fetch. Records without coordinates are never an error.
    pub async fn explore(&self, provider_name: &str, rows: u32) -> Result<Exploration, ExploreError> {
        let records = self.client.fetch(provider_name, rows).await?;
        Ok(Exploration::new(provider_name.trim(), &records, &self.index))
    }
}

/// Result of one explore run.
#[derive(Debug, Clone, PartialEq)]
pub struct Exploration {
    pub provider_name: String,
    /// Records in API order, each with its resolved location.
    pub records: Vec<NormalizedRecord>,
    /// Reference countries in reference order with their record counts.
    pub countries: Vec<CountryPolygon>,
    /// Observed locations, most frequent first.
    pub location_counts: Vec<LocationCount>,
    /// Mean position of located records.
    pub map_center: Option<MapCenter>,
}

impl Exploration {
    /// Attributes already-fetched `records` using `index`.
    #[must_use]
    pub fn new(provider_name: &str, records: &[NormalizedRecord], index: &CountryIndex) -> Self {
        let aggregation = index.aggregate(records);
        let location_counts = count_by_location(&aggregation.records);
        let map_center = map_center(&aggregation.records);

        Self {
            provider_name: provider_name.to_string(),
            records: aggregation.records,
            countries: aggregation.countries,
            location_counts,
            map_center,
        }
    }

    /// First [`PREVIEW_ROWS`] records.
    #[must_use]
    pub fn head(&self) -> &[NormalizedRecord] {
        &self.records[..self.records.len().min(PREVIEW_ROWS)]
    }

    /// Countries with at least one record, in reference order.
    pub fn located_countries(&self) -> impl Iterator<Item = &CountryPolygon> {
        self.countries.iter().filter(|c| c.object_count > 0)
    }

    /// Geometry-free view for JSON responses.
    #[must_use]
    pub fn summary(&self) -> ExplorationSummary<'_> {
        ExplorationSummary {
            provider_name: &self.provider_name,
            item_count: self.records.len(),
            records: &self.records,
            countries: self
                .countries
                .iter()
                .map(|c| CountryCount {
                    name: &c.name,
                    object_count: c.object_count,
                })
                .collect(),
            location_counts: &self.location_counts,
            map_center: self.map_center,
        }
    }

    /// Writes the CSV table and both `GeoJSON` layers into `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ExploreError::Export`] if any file cannot be written.
    pub fn write_exports(&self, dir: &std::path::Path) -> Result<Vec<PathBuf>, ExploreError> {
        use heritage_map_export::{export_path, layers, table};

        let csv_path = table::write_csv_file(dir, &self.provider_name, &self.records)?;

        let points_path = export_path(dir, &self.provider_name, layers::POINTS_SUFFIX);
        layers::write_layer(&points_path, &layers::points_layer(&self.records))?;

        let countries_path = export_path(dir, &self.provider_name, layers::COUNTRIES_SUFFIX);
        layers::write_layer(&countries_path, &layers::countries_layer(&self.countries))?;

        Ok(vec![csv_path, points_path, countries_path])
    }
}

/// Serializable summary of an [`Exploration`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorationSummary<'a> {
    pub provider_name: &'a str,
    pub item_count: usize,
    pub records: &'a [NormalizedRecord],
    pub countries: Vec<CountryCount<'a>>,
    pub location_counts: &'a [LocationCount],
    pub map_center: Option<MapCenter>,
}

/// Per-country count without geometry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryCount<'a> {
    pub name: &'a str,
    pub object_count: u64,
}

#[cfg(test)]
mod tests {
    use geo::{MultiPolygon, Rect};
    use heritage_map_europeana::ApiConfig;
    use heritage_map_record_models::ObjectLocation;

    use super::*;

    fn country(name: &str, lng: (f64, f64), lat: (f64, f64)) -> CountryPolygon {
        let rect = Rect::new((lng.0, lat.0), (lng.1, lat.1));
        CountryPolygon::new(name, MultiPolygon(vec![rect.to_polygon()]))
    }

    fn record(id: &str, lat: Option<f64>, lng: Option<f64>) -> NormalizedRecord {
        NormalizedRecord {
            latitude: lat,
            longitude: lng,
            id: id.to_string(),
            country: None,
            data_provider: None,
            creator: None,
            object_location: None,
        }
    }

    fn index() -> CountryIndex {
        CountryIndex::new(vec![
            country("France", (-5.0, 8.0), (42.0, 51.0)),
            country("Germany", (8.0, 15.0), (47.0, 55.0)),
        ])
    }

    #[test]
    fn builds_exploration_from_records() {
        let records = vec![
            record("/1/paris", Some(48.85), Some(2.35)),
            record("/1/none", None, None),
            record("/1/lyon", Some(45.76), Some(4.84)),
        ];
        let exploration = Exploration::new("Louvre", &records, &index());

        assert_eq!(exploration.records.len(), 3);
        assert_eq!(
            exploration.records[1].object_location,
            Some(ObjectLocation::Unknown)
        );
        assert_eq!(exploration.location_counts[0].location, "France");
        assert_eq!(exploration.location_counts[0].count, 2);
        assert_eq!(
            exploration
                .located_countries()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>(),
            ["France"]
        );
        assert!(exploration.map_center.is_some());
    }

    #[test]
    fn head_is_capped() {
        let records: Vec<NormalizedRecord> = (0..8)
            .map(|i| record(&format!("/1/{i}"), None, None))
            .collect();
        let exploration = Exploration::new("P", &records, &index());
        assert_eq!(exploration.head().len(), PREVIEW_ROWS);
        assert_eq!(exploration.head()[0].id, "/1/0");
    }

    #[test]
    fn summary_omits_geometry() {
        let exploration = Exploration::new(
            "Louvre",
            &[record("/1/paris", Some(48.85), Some(2.35))],
            &index(),
        );
        let json = serde_json::to_value(exploration.summary()).unwrap();

        assert_eq!(json["providerName"], "Louvre");
        assert_eq!(json["itemCount"], 1);
        assert_eq!(json["countries"][0]["name"], "France");
        assert_eq!(json["countries"][0]["objectCount"], 1);
        assert_eq!(json["countries"][1]["objectCount"], 0);
        assert!(json["countries"][0].get("geometry").is_none());
        assert_eq!(json["records"][0]["objectLocation"], "France");
    }

    #[tokio::test]
    async fn empty_provider_is_rejected() {
        let client = EuropeanaClient::new(
            ApiConfig::new("key")
                .with_base_url("http://127.0.0.1:9")
                .with_timeout_secs(5),
        )
        .unwrap();
        let explorer = Explorer::new(client, index());

        let err = explorer.explore("  ", 10).await.unwrap_err();
        assert!(matches!(
            err,
            ExploreError::Europeana(EuropeanaError::EmptyProviderName)
        ));
    }
}

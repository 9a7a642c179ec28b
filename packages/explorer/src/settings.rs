//! Explorer settings, read from an optional TOML file.
//!
//! ```toml
//! countries_path = "data/countries.geojson"
//! country_name_property = "ADMIN"
//! rows = 500
//! output_dir = "data/exports"
//!
//! [api]
//! base_url = "https://api.europeana.eu/record/v2"
//! timeout_secs = 60
//! ```
//!
//! The API key is never read from the file; it comes from
//! `EUROPEANA_API_KEY`. Environment variables take precedence over file
//! values.

use std::path::{Path, PathBuf};

use heritage_map_europeana::config::{API_URL_VAR, TIMEOUT_VAR};
use heritage_map_europeana::{ApiConfig, DEFAULT_ROWS, EuropeanaError};
use serde::Deserialize;

use crate::ExploreError;

/// Default directory for CSV and `GeoJSON` exports.
pub const DEFAULT_OUTPUT_DIR: &str = "data/exports";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExplorerSettings {
    /// `GeoJSON` `FeatureCollection` of country polygons.
    #[serde(default)]
    pub countries_path: Option<PathBuf>,
    /// Feature property holding the country name.
    #[serde(default)]
    pub country_name_property: Option<String>,
    /// Rows requested per fetch.
    #[serde(default = "default_rows")]
    pub rows: u32,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub api: ApiSettings,
}

/// Non-secret API overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSettings {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

const fn default_rows() -> u32 {
    DEFAULT_ROWS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            countries_path: None,
            country_name_property: None,
            rows: DEFAULT_ROWS,
            output_dir: default_output_dir(),
            api: ApiSettings::default(),
        }
    }
}

impl ExplorerSettings {
    /// Loads settings from `path`, or returns the defaults when no path is
    /// given.
    ///
    /// # Errors
    ///
    /// Returns [`ExploreError::Settings`] if the file cannot be read or
    /// parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ExploreError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = std::fs::read_to_string(path).map_err(|e| ExploreError::Settings {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        let settings = Self::parse(&contents).map_err(|e| ExploreError::Settings {
            message: format!("{}: {e}", path.display()),
        })?;

        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the TOML error for malformed or unknown keys.
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Builds the validated API configuration from the process
    /// environment layered over these settings.
    ///
    /// # Errors
    ///
    /// Returns [`EuropeanaError::MissingApiKey`] when no key is set, or
    /// another configuration error for invalid values.
    pub fn api_config(&self) -> Result<ApiConfig, EuropeanaError> {
        self.api_config_from(|name| std::env::var(name).ok())
    }

    /// Same as [`Self::api_config`] with an explicit variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::api_config`].
    pub fn api_config_from(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<ApiConfig, EuropeanaError> {
        ApiConfig::from_lookup(|name| lookup(name).or_else(|| self.file_value(name)))
    }

    fn file_value(&self, name: &str) -> Option<String> {
        match name {
            API_URL_VAR => self.api.base_url.clone(),
            TIMEOUT_VAR => self.api.timeout_secs.map(|secs| secs.to_string()),
            _ => None,
        }
    }
}

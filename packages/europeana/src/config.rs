//! Client configuration.
//!
//! The API key is read once at startup and validated before a client is
//! constructed, so a missing key stops the program before any request.

use std::fmt;

use crate::EuropeanaError;

/// Default Europeana Search API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.europeana.eu/record/v2";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable holding the API key (`wskey`).
pub const API_KEY_VAR: &str = "EUROPEANA_API_KEY";
/// Environment variable overriding [`DEFAULT_BASE_URL`].
pub const API_URL_VAR: &str = "EUROPEANA_API_URL";
/// Environment variable overriding [`DEFAULT_TIMEOUT_SECS`].
pub const TIMEOUT_VAR: &str = "EUROPEANA_TIMEOUT_SECS";

/// Settings for [`EuropeanaClient`](crate::EuropeanaClient).
#[derive(Clone)]
pub struct ApiConfig {
    /// Europeana API key, sent as `wskey`.
    pub api_key: String,
    /// Base URL up to (not including) `/search.json`.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Creates a configuration with default URL and timeout.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub const fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`EuropeanaError::MissingApiKey`] if `EUROPEANA_API_KEY` is
    /// unset or blank, or [`EuropeanaError::InvalidConfig`] if the timeout
    /// is not a number or the configuration fails [`Self::validate`].
    pub fn from_env() -> Result<Self, EuropeanaError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, EuropeanaError> {
        let api_key = lookup(API_KEY_VAR).ok_or(EuropeanaError::MissingApiKey)?;
        let mut config = Self::new(api_key);

        if let Some(url) = lookup(API_URL_VAR).filter(|u| !u.trim().is_empty()) {
            config.base_url = url;
        }

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            config.timeout_secs =
                raw.trim()
                    .parse()
                    .map_err(|e| EuropeanaError::InvalidConfig {
                        message: format!("{TIMEOUT_VAR}='{raw}' is not a number of seconds: {e}"),
                    })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration can be used to issue requests.
    ///
    /// # Errors
    ///
    /// Returns [`EuropeanaError::MissingApiKey`] for a blank key and
    /// [`EuropeanaError::InvalidConfig`] for an unparseable base URL or a
    /// zero timeout.
    pub fn validate(&self) -> Result<(), EuropeanaError> {
        if self.api_key.trim().is_empty() {
            return Err(EuropeanaError::MissingApiKey);
        }

        let url =
            reqwest::Url::parse(&self.base_url).map_err(|e| EuropeanaError::InvalidConfig {
                message: format!("base URL '{}' is invalid: {e}", self.base_url),
            })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(EuropeanaError::InvalidConfig {
                message: format!("base URL '{}' must be http or https", self.base_url),
            });
        }

        if self.timeout_secs == 0 {
            return Err(EuropeanaError::InvalidConfig {
                message: "timeout must be at least one second".to_string(),
            });
        }

        Ok(())
    }

    /// Full URL of the search endpoint.
    #[must_use]
    pub fn search_url(&self) -> String {
        format!("{}/search.json", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

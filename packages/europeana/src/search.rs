//! Search query construction and response parsing.
//!
//! See <https://europeana.atlassian.net/wiki/spaces/EF/pages/2385739812/Search+API+Documentation>

use heritage_map_record_models::RawItem;

use crate::EuropeanaError;

/// Default number of rows requested per fetch.
pub const DEFAULT_ROWS: u32 = 1000;

/// Restricts results to records that have a place latitude.
const HAS_LATITUDE_QUERY: &str = "pl_wgs84_pos_lat:(*)";

/// A validated single-request search for one data provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    provider_name: String,
    rows: u32,
}

impl SearchQuery {
    /// Builds a query for records of `provider_name`.
    ///
    /// The name is trimmed; it must still be non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`EuropeanaError::EmptyProviderName`] for an empty name and
    /// [`EuropeanaError::InvalidRowLimit`] when `rows` is zero.
    pub fn for_provider(provider_name: &str, rows: u32) -> Result<Self, EuropeanaError> {
        let provider_name = provider_name.trim();
        if provider_name.is_empty() {
            return Err(EuropeanaError::EmptyProviderName);
        }
        if rows == 0 {
            return Err(EuropeanaError::InvalidRowLimit);
        }

        Ok(Self {
            provider_name: provider_name.to_string(),
            rows,
        })
    }

    #[must_use]
    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Query filter matching the provider name exactly.
    #[must_use]
    pub fn provider_filter(&self) -> String {
        let escaped = self.provider_name.replace('\\', "\\\\").replace('"', "\\\"");
        format!("DATA_PROVIDER:\"{escaped}\"")
    }

    /// Query-string parameters, excluding the API key.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("query", HAS_LATITUDE_QUERY.to_string()),
            ("qf", self.provider_filter()),
            ("rows", self.rows.to_string()),
        ]
    }
}

/// Extracts the raw items from a search response body.
///
/// A successful response without an `items` array has zero results.
///
/// # Errors
///
/// Returns [`EuropeanaError::Api`] when the body reports
/// `"success": false`, and [`EuropeanaError::Payload`] when the body is
/// not a search response.
pub fn parse_search_response(body: &serde_json::Value) -> Result<Vec<RawItem>, EuropeanaError> {
    if !body.is_object() {
        return Err(EuropeanaError::Payload {
            message: "search response is not a JSON object".to_string(),
        });
    }

    if let Some(message) = api_error_message(body) {
        return Err(EuropeanaError::Api { message });
    }

    let Some(items) = body.get("items") else {
        return Ok(Vec::new());
    };

    let items = items.as_array().ok_or_else(|| EuropeanaError::Payload {
        message: "`items` is not an array".to_string(),
    })?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item.clone()).map_err(|e| EuropeanaError::Payload {
                message: format!("item {i} could not be read: {e}"),
            })
        })
        .collect()
}

/// Returns the API's error message when the body reports a failure.
pub(crate) fn api_error_message(body: &serde_json::Value) -> Option<String> {
    if body.get("success").and_then(serde_json::Value::as_bool) != Some(false) {
        return None;
    }

    Some(
        body.get("error")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown error")
            .to_string(),
    )
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Europeana search API client and record normalization.
//!
//! A [`EuropeanaClient`] is built once from a validated [`ApiConfig`] and
//! issues a single bounded search per [`EuropeanaClient::fetch`] call:
//! every record of one data provider that carries a place latitude.
//! The raw items are flattened by [`normalize`] into
//! [`NormalizedRecord`](heritage_map_record_models::NormalizedRecord)s
//! with numeric (or missing) coordinates.

pub mod client;
pub mod config;
pub mod normalize;
pub mod search;

pub use client::EuropeanaClient;
pub use config::ApiConfig;
pub use search::{DEFAULT_ROWS, SearchQuery};

use thiserror::Error;

/// How an error should be presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required configuration is absent. Nothing can be fetched until the
    /// process is restarted with it.
    Configuration,
    /// User input was rejected before any request was made.
    Validation,
    /// The request or its response failed. The user may try again.
    Fetch,
}

/// Errors from configuring the client or fetching records.
#[derive(Debug, Error)]
pub enum EuropeanaError {
    /// No API key was supplied.
    #[error(
        "EUROPEANA_API_KEY is not set in the environment variables. Please set it and restart."
    )]
    MissingApiKey,

    /// A configuration value is present but unusable.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the bad value.
        message: String,
    },

    /// The provider name was empty.
    #[error("Please enter a provider name.")]
    EmptyProviderName,

    /// The row limit was zero.
    #[error("Row limit must be a positive integer")]
    InvalidRowLimit,

    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status and no error message.
    #[error("Europeana request failed with status {status}")]
    Status {
        /// Response status code.
        status: reqwest::StatusCode,
    },

    /// The API reported a failure in its response body.
    #[error("Europeana API error: {message}")]
    Api {
        /// Message returned by the API.
        message: String,
    },

    /// The response body was not a search response.
    #[error("Malformed search response: {message}")]
    Payload {
        /// Description of what was wrong with the payload.
        message: String,
    },
}

impl EuropeanaError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingApiKey | Self::InvalidConfig { .. } => ErrorKind::Configuration,
            Self::EmptyProviderName | Self::InvalidRowLimit => ErrorKind::Validation,
            Self::Http(_) | Self::Status { .. } | Self::Api { .. } | Self::Payload { .. } => {
                ErrorKind::Fetch
            }
        }
    }
}

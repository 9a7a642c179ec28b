#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Exports of aggregated records.
//!
//! * [`table`]: the flat CSV download with a fixed column order.
//! * [`layers`]: `GeoJSON` point markers and a per-country choropleth
//!   for map rendering.

pub mod layers;
pub mod table;

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from writing exports.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Writing CSV failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing `GeoJSON` failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Turns a provider name into a safe file name stem.
///
/// Path separators and other characters that are unsafe in file names
/// become `_`. An empty result falls back to `"export"`.
#[must_use]
pub fn file_stem(provider_name: &str) -> String {
    let stem: String = provider_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    let stem = stem.trim_matches('.');
    if stem.is_empty() {
        "export".to_string()
    } else {
        stem.to_string()
    }
}

/// Path of an export file for `provider_name` inside `dir`, e.g.
/// `out/Rijksmuseum_data.csv`.
#[must_use]
pub fn export_path(dir: &Path, provider_name: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{}{suffix}", file_stem(provider_name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_ordinary_names() {
        assert_eq!(file_stem("Museo del Prado"), "Museo del Prado");
    }

    #[test]
    fn replaces_path_characters() {
        assert_eq!(file_stem("a/b\\c:d"), "a_b_c_d");
        assert_eq!(file_stem("../etc"), "_etc");
    }

    #[test]
    fn empty_names_fall_back() {
        assert_eq!(file_stem("  "), "export");
        assert_eq!(file_stem(".."), "export");
    }

    #[test]
    fn builds_export_path() {
        assert_eq!(
            export_path(Path::new("out"), "Rijksmuseum", "_data.csv"),
            PathBuf::from("out/Rijksmuseum_data.csv")
        );
    }
}

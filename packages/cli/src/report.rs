//! Plain-text rendering of explore results and errors.

use std::fmt::Write as _;

use heritage_map_europeana::ErrorKind;
use heritage_map_explorer::{ExploreError, Exploration};
use heritage_map_record_models::RecordColumn;

/// How prominently an error is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The user can correct the input or try again.
    Warning,
    /// Nothing can proceed until the configuration is fixed.
    Blocking,
}

/// Classifies an error for display.
#[must_use]
pub const fn severity(err: &ExploreError) -> Severity {
    match err {
        ExploreError::Europeana(e) => match e.kind() {
            ErrorKind::Configuration => Severity::Blocking,
            ErrorKind::Validation | ErrorKind::Fetch => Severity::Warning,
        },
        ExploreError::Spatial(_) | ExploreError::Settings { .. } => Severity::Blocking,
        ExploreError::Export(_) => Severity::Warning,
    }
}

/// One-line user-facing message for an error.
#[must_use]
pub fn render_error(err: &ExploreError) -> String {
    match severity(err) {
        Severity::Warning => format!("Warning: {err}"),
        Severity::Blocking => format!("Error: {err}"),
    }
}

/// Full report: headline, preview rows, per-location counts, map centre.
#[must_use]
pub fn render_exploration(exploration: &Exploration) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Data from {}", exploration.provider_name);
    let _ = writeln!(
        out,
        "Number of items retrieved: {}",
        exploration.records.len()
    );

    if exploration.records.is_empty() {
        return out;
    }

    out.push('\n');
    out.push_str("First few rows of data:\n");
    out.push_str(&render_preview(exploration));

    out.push('\n');
    out.push_str("Objects per location:\n");
    let rows: Vec<Vec<String>> = exploration
        .location_counts
        .iter()
        .map(|c| vec![c.location.clone(), c.count.to_string()])
        .collect();
    out.push_str(&render_table(&["objectLocation", "count"], &rows));

    out.push('\n');
    match exploration.map_center {
        Some(center) => {
            let _ = writeln!(
                out,
                "Map centre: {:.4}, {:.4}",
                center.latitude, center.longitude
            );
        }
        None => out.push_str("Warning: No valid coordinates found in the data.\n"),
    }

    out
}

fn render_preview(exploration: &Exploration) -> String {
    let headers: Vec<String> = RecordColumn::all().iter().map(ToString::to_string).collect();
    let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
    let rows: Vec<Vec<String>> = exploration
        .head()
        .iter()
        .map(|record| RecordColumn::all().iter().map(|c| record.cell(*c)).collect())
        .collect();

    render_table(&headers, &rows)
}

/// Left-aligned table with a header rule. Column widths fit the widest
/// cell, counted in characters.
#[must_use]
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    write_row(&mut out, headers.iter().copied(), &widths);
    write_row(
        &mut out,
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().iter().map(String::as_str),
        &widths,
    );
    for row in rows {
        write_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn write_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use geo::{MultiPolygon, Rect};
    use heritage_map_europeana::EuropeanaError;
    use heritage_map_record_models::NormalizedRecord;
    use heritage_map_spatial::{CountryIndex, CountryPolygon};

    use super::*;

    fn exploration(records: &[NormalizedRecord]) -> Exploration {
        let france = CountryPolygon::new(
            "France",
            MultiPolygon(vec![Rect::new((-5.0, 42.0), (8.0, 51.0)).to_polygon()]),
        );
        Exploration::new("Louvre", records, &CountryIndex::new(vec![france]))
    }

    fn record(id: &str, lat: Option<f64>, lng: Option<f64>) -> NormalizedRecord {
        NormalizedRecord {
            latitude: lat,
            longitude: lng,
            id: id.to_string(),
            country: Some("france".to_string()),
            data_provider: Some("Louvre".to_string()),
            creator: None,
            object_location: None,
        }
    }

    #[test]
    fn pads_columns_to_widest_cell() {
        let table = render_table(
            &["location", "count"],
            &[
                vec!["France".to_string(), "12".to_string()],
                vec!["Unknown".to_string(), "3".to_string()],
            ],
        );
        assert_eq!(
            table,
            "location  count\n--------  -----\nFrance    12\nUnknown   3\n"
        );
    }

    #[test]
    fn reports_counts_and_centre() {
        let text = exploration(&[
            record("/1/paris", Some(48.85), Some(2.35)),
            record("/1/none", None, None),
        ]);
        let text = render_exploration(&text);

        assert!(text.starts_with("Data from Louvre\nNumber of items retrieved: 2\n"));
        assert!(text.contains("France          1"));
        assert!(text.contains("Unknown         1"));
        assert!(text.contains("Map centre: 48.8500, 2.3500"));
    }

    #[test]
    fn warns_when_nothing_is_located() {
        let text = render_exploration(&exploration(&[record("/1/none", None, None)]));
        assert!(text.contains("Warning: No valid coordinates found in the data."));
    }

    #[test]
    fn empty_result_has_only_headline() {
        let text = render_exploration(&exploration(&[]));
        assert_eq!(text, "Data from Louvre\nNumber of items retrieved: 0\n");
    }

    #[test]
    fn classifies_errors() {
        let missing_key = ExploreError::Europeana(EuropeanaError::MissingApiKey);
        assert_eq!(severity(&missing_key), Severity::Blocking);
        assert!(render_error(&missing_key).starts_with("Error: EUROPEANA_API_KEY"));

        let empty = ExploreError::Europeana(EuropeanaError::EmptyProviderName);
        assert_eq!(
            render_error(&empty),
            "Warning: Please enter a provider name."
        );
    }
}

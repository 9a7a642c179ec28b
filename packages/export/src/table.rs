//! CSV export of the record table.
//!
//! Columns are always `latitude, longitude, id, country, dataProvider,
//! creator, objectLocation`; missing values are empty cells.

use std::io::Write;
use std::path::{Path, PathBuf};

use heritage_map_record_models::{NormalizedRecord, RecordColumn};

use crate::{ExportError, export_path};

/// Suffix appended to the provider name for the download file.
pub const CSV_SUFFIX: &str = "_data.csv";

/// Writes the header and one row per record.
///
/// # Errors
///
/// Returns [`ExportError`] if writing fails.
pub fn write_records_csv<W: Write>(
    writer: W,
    records: &[NormalizedRecord],
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(RecordColumn::all().iter().map(AsRef::<str>::as_ref))?;
    for record in records {
        csv_writer.write_record(RecordColumn::all().iter().map(|column| record.cell(*column)))?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Renders the records as a CSV document.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization fails.
pub fn records_to_csv(records: &[NormalizedRecord]) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_records_csv(&mut buf, records)?;
    String::from_utf8(buf).map_err(|e| {
        ExportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

/// Writes `<provider>_data.csv` into `dir`, creating the directory.
///
/// # Errors
///
/// Returns [`ExportError`] if the directory or file cannot be written.
pub fn write_csv_file(
    dir: &Path,
    provider_name: &str,
    records: &[NormalizedRecord],
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = export_path(dir, provider_name, CSV_SUFFIX);

    let file = std::fs::File::create(&path)?;
    write_records_csv(std::io::BufWriter::new(file), records)?;

    log::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(path)
}

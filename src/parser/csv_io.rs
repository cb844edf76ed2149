//! CSV read/write at the file boundary.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use tracing::debug;

use crate::error::SeedError;

/// Read every row of a headed CSV file into typed records.
///
/// Columns are matched by header name; absent columns take the record's
/// default and extra columns are ignored.
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = open_input(path)?;
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);

    let mut rows = Vec::new();
    for (line, result) in reader.deserialize().enumerate() {
        let row: T = result.with_context(|| {
            // +2: one for the header, one for 1-based numbering
            format!("Failed to parse {:?} at line {}", path, line + 2)
        })?;
        rows.push(row);
    }

    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Write records under a fixed header; the header is written even for an
/// empty table.
pub fn write_rows<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create: {:?}", path))?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    writer
        .write_record(header)
        .with_context(|| format!("Failed to write header to {:?}", path))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write row to {:?}", path))?;
    }
    writer.flush().with_context(|| format!("Failed to flush: {:?}", path))?;

    debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Open a file for reading, reporting a missing file as `SeedError::MissingInput`
pub fn open_input(path: &Path) -> Result<File> {
    if !path.exists() {
        return Err(SeedError::MissingInput(path.to_path_buf()).into());
    }
    File::open(path).with_context(|| format!("Failed to open: {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
    #[serde(default)]
    struct Row {
        id: String,
        label: Option<String>,
    }

    #[test]
    fn test_empty_table_still_has_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        write_rows::<Row>(&path, &["id", "label"], &[]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), "id,label");
    }

    #[test]
    fn test_missing_columns_take_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.csv");
        std::fs::write(&path, "id,extra\n#001,ignored\n").unwrap();

        let rows: Vec<Row> = read_rows(&path).unwrap();
        assert_eq!(
            rows,
            vec![Row {
                id: "#001".to_string(),
                label: None
            }]
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = read_rows::<Row>(&dir.path().join("nope.csv")).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SeedError>(),
            Some(SeedError::MissingInput(_))
        ));
    }
}

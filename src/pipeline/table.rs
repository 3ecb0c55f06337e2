//! Metadata table I/O.
//!
//! The table is CSV with a header row whose columns follow the field order of
//! [`MetadataRecord`]. Writes go to a sibling `.tmp` file that is renamed into
//! place, so an interrupted run never leaves a truncated table behind.

use crate::error::ScrapeError;
use crate::output::MetadataRecord;
use std::path::Path;
use tracing::debug;

/// Column names, in order.
pub const TABLE_HEADER: [&str; 8] = [
    "decision_id",
    "location",
    "title",
    "date",
    "company",
    "decision",
    "extras",
    "tag",
];

/// Encode records as CSV with a header row.
pub fn encode_table(records: &[MetadataRecord], path: &Path) -> Result<Vec<u8>, ScrapeError> {
    let table_err = |source: csv::Error| ScrapeError::Table {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record).map_err(table_err)?;
    }
    writer
        .into_inner()
        .map_err(|e| table_err(csv::Error::from(e.into_error())))
}

/// Write `records` to `path` atomically.
pub async fn write_table(records: &[MetadataRecord], path: &Path) -> Result<(), ScrapeError> {
    let bytes = encode_table(records, path)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ScrapeError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension("csv.tmp");
    tokio::fs::write(&tmp_path, &bytes)
        .await
        .map_err(|e| ScrapeError::FileSystem {
            path: tmp_path.clone(),
            source: e,
        })?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| ScrapeError::FileSystem {
            path: path.to_path_buf(),
            source: e,
        })?;

    debug!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

/// Decode CSV bytes into records. Columns are matched by header name.
pub fn decode_table(bytes: &[u8], path: &Path) -> Result<Vec<MetadataRecord>, ScrapeError> {
    csv::Reader::from_reader(bytes)
        .deserialize()
        .collect::<Result<Vec<MetadataRecord>, csv::Error>>()
        .map_err(|source| ScrapeError::Table {
            path: path.to_path_buf(),
            source,
        })
}

/// Read every row of the table at `path`, in file order.
pub async fn read_table(path: &Path) -> Result<Vec<MetadataRecord>, ScrapeError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ScrapeError::FileSystem {
            path: path.to_path_buf(),
            source: e,
        })?;
    decode_table(&bytes, path)
}

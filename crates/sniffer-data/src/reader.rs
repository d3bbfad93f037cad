//! Delimited file discovery and reading.
//!
//! Turns a CSV export into a [`RawTable`] of string cells, applies a
//! [`ColumnMapping`] to its headers and projects it onto the canonical
//! columns.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use sniffer_core::models::{ColumnMapping, CANONICAL_COLUMNS};
use sniffer_core::{Result, SnifferError};
use tracing::{debug, warn};

// ── Discovery ─────────────────────────────────────────────────────────────────

/// Find all `.csv` files recursively under `dir`, sorted by path.
pub fn find_csv_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Data path does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

// ── RawTable ──────────────────────────────────────────────────────────────────

/// Header row plus string records of a delimited file.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<StringRecord>,
}

/// The two cells of a row that survive projection.
///
/// `entity` and `source` are projected too, but their values are replaced by
/// the load call's labels, so only their presence matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRow {
    pub date: String,
    pub text: String,
}

/// Read a delimited file with a header row.
pub fn read_delimited(path: &Path, sep: u8) -> Result<RawTable> {
    let file = File::open(path).map_err(|source| SnifferError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let csv_err = |source: csv::Error| SnifferError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(sep)
        .has_headers(true)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let rows = reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(csv_err)?;

    debug!("Read {} rows from {}", rows.len(), path.display());

    Ok(RawTable { headers, rows })
}

impl RawTable {
    /// Rename headers through `mapping`. Keys that match no header are ignored.
    pub fn rename(&mut self, mapping: &ColumnMapping) {
        for header in &mut self.headers {
            let renamed = mapping.rename(header);
            if renamed != header.as_str() {
                *header = renamed.to_string();
            }
        }
    }

    /// Index of the first column called `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Project every row onto the canonical columns.
    ///
    /// Fails with [`SnifferError::MissingColumn`] listing every canonical
    /// column the headers lack.
    pub fn project(&self) -> Result<Vec<CanonicalRow>> {
        let missing: Vec<String> = CANONICAL_COLUMNS
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SnifferError::MissingColumn(missing));
        }

        let (Some(date_idx), Some(text_idx)) =
            (self.column_index("date"), self.column_index("text"))
        else {
            return Err(SnifferError::MissingColumn(vec![
                "date".to_string(),
                "text".to_string(),
            ]));
        };

        Ok(self
            .rows
            .iter()
            .map(|row| CanonicalRow {
                date: row.get(date_idx).unwrap_or_default().to_string(),
                text: row.get(text_idx).unwrap_or_default().to_string(),
            })
            .collect())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

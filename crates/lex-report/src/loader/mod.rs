//! Data loading module.
//!
//! This module provides functionality for:
//! - Locating the input file when none is given
//! - Reading delimited text files and spreadsheet workbooks into a typed [`Table`]
//! - Validating the header row
//! - Inferring column types from cell values

mod type_inference;
mod workbook;

pub use type_inference::parse_datetime;
pub use workbook::WORKBOOK_EXTENSIONS;

use crate::error::{AnalysisError, Result};
use crate::table::{ColumnSchema, Table};
use crate::utils::is_missing_marker;
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::collections::HashSet;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use type_inference::infer_series;

/// Extensions the loader accepts, lowercase. Workbooks last.
pub const SUPPORTED_EXTENSIONS: [&str; 8] = [
    "csv", "tsv", "tab", "txt", "xlsx", "xlsm", "xls", "ods",
];

/// `3,5` or `1.234,5`: a number written with a decimal comma.
static DECIMAL_COMMA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d{1,3}(\.\d{3})+|\d+)(,\d+)?$").expect("Invalid regex: decimal comma")
});

/// Delimiters to try when sniffing a `.txt` file.
const SNIFF_DELIMITERS: [u8; 4] = [b'\t', b',', b';', b'|'];

/// Loader for tabular input files.
pub struct DataLoader;

impl DataLoader {
    /// Load a delimited file or the first sheet of a workbook into a typed
    /// table.
    ///
    /// Every cell is read as a string and column kinds are inferred from the
    /// values. An empty file yields an empty table.
    pub fn load(path: impl AsRef<Path>) -> Result<Table> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(AnalysisError::FileNotFound(path.to_path_buf()));
        }

        let extension = Self::extension_of(path);
        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AnalysisError::UnsupportedFormat {
                path: path.to_path_buf(),
                reason: format!(
                    "extension '{}' is not supported (expected one of: {})",
                    extension,
                    SUPPORTED_EXTENSIONS.join(", ")
                ),
            });
        }

        if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
            let frame = workbook::read_first_sheet(path)?;
            let table = Self::from_frame(&frame)?;
            info!(
                "Loaded {} rows x {} columns from workbook {}",
                table.height(),
                table.width(),
                path.display()
            );
            return Ok(table);
        }

        let bytes = std::fs::read(path)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            warn!("Input file {} is empty", path.display());
            return Ok(Table::empty());
        }

        let separator = match extension.as_str() {
            "csv" => b',',
            "tsv" | "tab" => b'\t',
            _ => sniff_delimiter(&bytes),
        };
        debug!("Using separator {:?}", separator as char);

        validate_header(path, &bytes, separator)?;

        let mut frame = read_all_strings(&bytes, separator).map_err(|e| {
            AnalysisError::UnsupportedFormat {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        if separator == b';' {
            frame = normalize_decimal_commas(frame)?;
        }

        let table = Self::from_frame(&frame)?;
        info!(
            "Loaded {} rows x {} columns from {}",
            table.height(),
            table.width(),
            path.display()
        );
        Ok(table)
    }

    /// Build a typed table from an existing frame, inferring column kinds.
    pub fn from_frame(frame: &DataFrame) -> Result<Table> {
        let mut columns = Vec::with_capacity(frame.width());
        let mut schema = Vec::with_capacity(frame.width());

        for col in frame.get_columns() {
            let series = col.as_materialized_series();
            let inferred = infer_series(series).map_err(|e| {
                AnalysisError::Schema(format!("column '{}': {}", series.name(), e))
            })?;
            debug!("Column '{}' inferred as {}", series.name(), inferred.kind);
            schema.push(ColumnSchema {
                name: series.name().to_string(),
                kind: inferred.kind,
            });
            columns.push(Column::from(inferred.series));
        }

        if columns.is_empty() {
            return Ok(Table::empty());
        }

        let frame = DataFrame::new(columns)?;
        Table::from_parts(frame, schema)
    }

    /// Find the input file in a directory.
    ///
    /// Picks the first file, by name, with a supported extension.
    pub fn discover_input(dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir)
            .map_err(|_| AnalysisError::FileNotFound(dir.to_path_buf()))?;

        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .filter(|p| SUPPORTED_EXTENSIONS.contains(&Self::extension_of(p).as_str()))
            .collect();
        candidates.sort();

        match candidates.into_iter().next() {
            Some(path) => {
                info!("Discovered input file: {}", path.display());
                Ok(path)
            }
            None => Err(AnalysisError::FileNotFound(dir.to_path_buf())),
        }
    }

    fn extension_of(path: &Path) -> String {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default()
    }
}

/// Pick the delimiter that occurs most often in the first line.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|&b| b == b'\n').next().unwrap_or_default();
    SNIFF_DELIMITERS
        .iter()
        .copied()
        .max_by_key(|d| {
            // ties go to the earlier delimiter
            let count = first_line.iter().filter(|&&b| b == *d).count();
            (count, std::cmp::Reverse(SNIFF_DELIMITERS.iter().position(|x| x == d)))
        })
        .unwrap_or(b',')
}

/// Reject duplicate and blank header names.
fn validate_header(path: &Path, bytes: &[u8], separator: u8) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(separator)
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| AnalysisError::UnsupportedFormat {
            path: path.to_path_buf(),
            reason: format!("unreadable header row: {}", e),
        })?;

    check_header_names(headers.iter())
}

/// Reject duplicate and blank names, in header order.
pub(crate) fn check_header_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for (idx, name) in names.into_iter().enumerate() {
        if name.trim().is_empty() {
            return Err(AnalysisError::Schema(format!(
                "column {} has an empty name",
                idx + 1
            )));
        }
        if !seen.insert(name) {
            return Err(AnalysisError::Schema(format!(
                "duplicate column name '{}'",
                name
            )));
        }
    }

    Ok(())
}

/// Rewrite decimal-comma numbers (`3,5`, `1.234,5`) to `3.5`, `1234.5`.
///
/// A column is rewritten only when every present cell has that shape and at
/// least one has a comma, so `;` files written with decimal points are left
/// alone.
fn normalize_decimal_commas(frame: DataFrame) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(frame.width());
    for col in frame.get_columns() {
        let cells: Vec<Option<&str>> = col.as_materialized_series().str()?.into_iter().collect();
        let present: Vec<&str> = cells
            .iter()
            .flatten()
            .map(|c| c.trim())
            .filter(|c| !is_missing_marker(c))
            .collect();

        let rewrite = present.iter().any(|c| c.contains(','))
            && present.iter().all(|c| DECIMAL_COMMA.is_match(c));
        if !rewrite {
            columns.push(col.clone());
            continue;
        }

        debug!("Column '{}' uses decimal commas", col.name());
        let values: Vec<Option<String>> = cells
            .iter()
            .map(|cell| {
                cell.map(|c| {
                    let c = c.trim();
                    if DECIMAL_COMMA.is_match(c) {
                        c.replace('.', "").replace(',', ".")
                    } else {
                        c.to_string()
                    }
                })
            })
            .collect();
        columns.push(Column::new(col.name().clone(), values));
    }
    Ok(DataFrame::new(columns)?)
}

/// Read delimited bytes with every column as `String`.
fn read_all_strings(bytes: &[u8], separator: u8) -> PolarsResult<DataFrame> {
    // Strategy 1: Standard loading with quote handling
    match CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(separator)
                .with_quote_char(Some(b'"')),
        )
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    // Strategy 2: Drop blank lines and retry
    let content = String::from_utf8_lossy(bytes);
    let cleaned = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(separator)
                .with_quote_char(Some(b'"')),
        )
        .into_reader_with_file_handle(Cursor::new(cleaned))
        .finish()
}

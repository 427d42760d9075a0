//! Spreadsheet input.
//!
//! The first sheet of a workbook is read into an all-string frame, the same
//! shape the delimited reader produces, so kind inference is shared.

use super::check_header_names;
use crate::error::{AnalysisError, Result, ResultExt};
use calamine::{Data, DataType as _, Reader, open_workbook_auto};
use chrono::NaiveDateTime;
use polars::prelude::*;
use std::path::Path;
use tracing::debug;

/// Extensions routed to the workbook reader, lowercase.
pub const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

/// Read the first sheet of a workbook. The first row is the header.
pub(crate) fn read_first_sheet(path: &Path) -> Result<DataFrame> {
    let unreadable = |reason: String| AnalysisError::UnsupportedFormat {
        path: path.to_path_buf(),
        reason,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| unreadable(e.to_string()))?;
    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Err(unreadable("workbook has no sheets".to_string()));
    };
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| unreadable(format!("sheet '{sheet}': {e}")))?;
    debug!("Reading sheet '{}' ({} x {})", sheet, range.height(), range.width());

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };
    let names: Vec<String> = header
        .iter()
        .map(|cell| cell_text(cell).unwrap_or_default())
        .collect();
    check_header_names(names.iter().map(String::as_str))?;

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (idx, values) in cells.iter_mut().enumerate() {
            values.push(row.get(idx).and_then(cell_text));
        }
    }

    let columns: Vec<Column> = names
        .iter()
        .zip(cells)
        .map(|(name, values)| Column::new(name.as_str().into(), values))
        .collect();
    DataFrame::new(columns).context(format!("sheet '{sheet}'"))
}

/// Text of one cell as the delimited reader would have seen it.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(_) => cell.as_datetime().map(|dt| format_datetime(&dt)),
    }
}

/// Dates without a time part print as `%Y-%m-%d`.
fn format_datetime(dt: &NaiveDateTime) -> String {
    if dt.time() == chrono::NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

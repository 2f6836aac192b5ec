use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};

use super::{Columns, SourceError};
use crate::domain::{RawCode, RawRecord, RawTable};

/// Reads the first worksheet of a spreadsheet.
///
/// The first row holds the column headers. Rows with no populated cells are
/// skipped.
pub(super) fn read(path: &Path) -> Result<RawTable, SourceError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SourceError::NoWorksheet(path.to_path_buf()))??;

    from_range(&range)
}

fn from_range(range: &Range<Data>) -> Result<RawTable, SourceError> {
    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(header_text).collect())
        .unwrap_or_default();
    let columns = Columns::locate(header.iter().map(String::as_str))?;

    Ok(rows
        .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
        .map(|row| RawRecord {
            code: code_cell(row.get(columns.code)),
            title: text_cell(row.get(columns.title)),
            description: text_cell(row.get(columns.description)),
        })
        .collect())
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(text) => text.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Numeric cells come through as floats; whole numbers are kept as integers
/// and everything else is passed on as text for the normalizer to judge.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn code_cell(cell: Option<&Data>) -> RawCode {
    match cell {
        Some(Data::Int(value)) => RawCode::Integer(*value),
        Some(Data::Float(value))
            if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 =>
        {
            RawCode::Integer(*value as i64)
        }
        Some(Data::String(text)) => RawCode::Text(text.clone()),
        Some(Data::Empty) | None => RawCode::Text(String::new()),
        Some(other) => RawCode::Text(other.to_string()),
    }
}

fn text_cell(cell: Option<&Data>) -> Option<String> {
    match cell? {
        Data::Empty => None,
        Data::String(text) if text.is_empty() => None,
        Data::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

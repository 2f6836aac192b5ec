use std::io;

use csv::{ReaderBuilder, Trim};

use super::{Columns, SourceError};
use crate::domain::RawTable;

/// Reads a comma-separated table with a header row.
///
/// Rows may be ragged; cells beyond the end of a short row are treated as
/// missing. Rows with no populated cells are skipped.
pub(super) fn read(reader: impl io::Read) -> Result<RawTable, SourceError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::locate(reader.headers()?.iter())?;

    reader
        .records()
        .filter_map(|record| match record {
            Ok(record) if record.iter().all(str::is_empty) => None,
            Ok(record) => Some(Ok(columns.text_record(|index| record.get(index)))),
            Err(error) => Some(Err(error.into())),
        })
        .collect()
}

use std::io;

use super::SourceError;
use crate::domain::RawTable;

/// Reads a JSON array of objects with `Code`, `Title` and `Description`
/// keys.
///
/// `Code` may be a number or a string; `Title` and `Description` may be
/// `null` or absent.
pub(super) fn read(reader: impl io::Read) -> Result<RawTable, SourceError> {
    Ok(serde_json::from_reader(reader)?)
}

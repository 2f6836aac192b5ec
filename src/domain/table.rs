//! Raw and normalized classification tables.
//!
//! A [`RawTable`] is whatever a source hands over: codes may be integers or
//! text and titles may be missing. [`RawTable::normalize`] turns it into a
//! [`Table`] of typed [`Record`]s, which is what the rest of the crate works
//! with.

use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::domain::code::{Code, MalformedCodeError};

/// A value from the `Code` column before normalization.
///
/// Spreadsheets produce a mix of numeric cells and text cells (the composite
/// sector labels), so both are accepted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCode {
    /// A numeric cell.
    Integer(i64),
    /// A text cell.
    Text(String),
}

impl RawCode {
    /// Parses the cell as a record code.
    ///
    /// Code 0 is reserved for the synthetic root and is rejected: a row with
    /// that code would be its own child.
    fn to_code(&self) -> Result<Code, MalformedCodeError> {
        let code = match self {
            Self::Integer(value) => Code::try_from(*value)?,
            Self::Text(text) => text.parse()?,
        };
        if code.is_root() {
            return Err(MalformedCodeError(self.to_string()));
        }
        Ok(code)
    }
}

impl fmt::Display for RawCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for RawCode {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for RawCode {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// One row of the source table, as read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// The classification code.
    #[serde(rename = "Code")]
    pub code: RawCode,

    /// The short title, if present.
    #[serde(rename = "Title", default)]
    pub title: Option<String>,

    /// The long-form description, if present.
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
}

impl RawRecord {
    /// Creates a row with every column populated.
    #[must_use]
    pub fn new(
        code: impl Into<RawCode>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            title: Some(title.into()),
            description: Some(description.into()),
        }
    }
}

/// An un-normalized table with the columns `Code`, `Title` and
/// `Description`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTable {
    rows: Vec<RawRecord>,
}

impl RawTable {
    /// Creates a table from its rows.
    #[must_use]
    pub const fn new(rows: Vec<RawRecord>) -> Self {
        Self { rows }
    }

    /// The rows, in source order.
    #[must_use]
    pub fn rows(&self) -> &[RawRecord] {
        &self.rows
    }

    /// The number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// A SHA-256 digest of the rows, as a hex string.
    ///
    /// Tables with the same rows in the same order share a fingerprint.
    /// Integer and text codes are told apart.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        fn field(hasher: &mut Sha256, tag: u8, bytes: &[u8]) {
            hasher.update([tag]);
            hasher.update(bytes.len().to_le_bytes());
            hasher.update(bytes);
        }

        let mut hasher = Sha256::new();
        for row in &self.rows {
            match &row.code {
                RawCode::Integer(value) => field(&mut hasher, 1, &value.to_le_bytes()),
                RawCode::Text(text) => field(&mut hasher, 2, text.as_bytes()),
            }
            for cell in [&row.title, &row.description] {
                match cell {
                    Some(text) => field(&mut hasher, 2, text.as_bytes()),
                    None => field(&mut hasher, 0, &[]),
                }
            }
        }

        format!("{:x}", hasher.finalize())
    }

    /// Cleans the table into canonical form.
    ///
    /// For every row:
    /// 1. the composite sector labels `31-33`, `44-45` and `48-49` collapse to
    ///    `31`, `44` and `48`;
    /// 2. the code is parsed as a positive integer;
    /// 3. every trailing `T` is stripped from the title.
    ///
    /// Missing titles and descriptions become empty strings. `self` is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedCodeError`] for the first code that cannot be
    /// parsed. No partial table is returned.
    pub fn normalize(&self) -> Result<Table, MalformedCodeError> {
        let records = self
            .rows
            .iter()
            .map(|row| {
                Ok(Record {
                    code: row.code.to_code()?,
                    title: strip_title(row.title.as_deref().unwrap_or_default()),
                    description: row.description.clone().unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, MalformedCodeError>>()?;

        let table = Table { records };
        table.warn_on_duplicates();
        Ok(table)
    }
}

impl FromIterator<RawRecord> for RawTable {
    fn from_iter<I: IntoIterator<Item = RawRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl From<&Table> for RawTable {
    fn from(table: &Table) -> Self {
        table
            .records
            .iter()
            .map(|record| RawRecord {
                code: i64::try_from(record.code.get())
                    .map_or_else(|_| RawCode::Text(record.code.to_string()), RawCode::Integer),
                title: Some(record.title.clone()),
                description: Some(record.description.clone()),
            })
            .collect()
    }
}

/// Titles in the published table carry a trailing `T` footnote marker.
///
/// All trailing `T`s are removed, not just one.
fn strip_title(title: &str) -> String {
    title.trim_end_matches('T').to_string()
}

/// One normalized row of the classification table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// The classification code.
    #[serde(rename = "Code")]
    pub code: Code,

    /// The short title.
    #[serde(rename = "Title")]
    pub title: String,

    /// The long-form description.
    #[serde(rename = "Description")]
    pub description: String,
}

/// A normalized classification table.
///
/// Rows keep the order they had in the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    /// Creates a table from already-normalized records.
    #[must_use]
    pub const fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// The records, in source order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Iterates over the records in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// The number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the table has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up the record with the given code.
    #[must_use]
    pub fn get(&self, code: Code) -> Option<&Record> {
        self.records.iter().find(|record| record.code == code)
    }

    /// The direct children of `parent`, in table order.
    ///
    /// Each child's title is rewritten as `"{code}: {title}"`.
    #[must_use]
    pub fn children(&self, parent: Code) -> Self {
        self.records
            .iter()
            .filter(|record| parent.is_parent_of(record.code))
            .map(|record| Record {
                code: record.code,
                title: format!("{}: {}", record.code, record.title),
                description: record.description.clone(),
            })
            .collect()
    }

    /// The codes of the direct children of `parent`, in table order.
    #[must_use]
    pub fn child_keys(&self, parent: Code) -> Vec<Code> {
        self.records
            .iter()
            .map(|record| record.code)
            .filter(|code| parent.is_parent_of(*code))
            .collect()
    }

    fn warn_on_duplicates(&self) {
        let mut seen = HashSet::with_capacity(self.records.len());
        for record in &self.records {
            if !seen.insert(record.code) {
                warn!(code = %record.code, "duplicate classification code");
            }
        }
    }
}

impl FromIterator<Record> for Table {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for Table {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

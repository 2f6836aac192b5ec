//! Data sources for the classification table.
//!
//! A [`TableSource`] hands over a [`RawTable`] with the columns `Code`,
//! `Title` and `Description`. Where the table comes from is the source's
//! business; the rest of the crate only sees the raw rows.

use std::{
    fmt, io,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument};

use crate::domain::{RawCode, RawRecord, RawTable};

mod cache;
mod delimited;
mod json;
mod workbook;

pub use cache::{Cached, SourceCache};

/// Column headers every source must provide.
pub const COLUMNS: [&str; 3] = ["Code", "Title", "Description"];

/// Something that can produce a raw classification table.
pub trait TableSource {
    /// A stable identifier for this source, used as a cache key.
    fn id(&self) -> String;

    /// Reads the raw table.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying data cannot be read or does not have
    /// the expected columns.
    fn load(&self) -> Result<RawTable, SourceError>;
}

impl<S: TableSource + ?Sized> TableSource for &S {
    fn id(&self) -> String {
        (**self).id()
    }

    fn load(&self) -> Result<RawTable, SourceError> {
        (**self).load()
    }
}

impl<S: TableSource + ?Sized> TableSource for Box<S> {
    fn id(&self) -> String {
        (**self).id()
    }

    fn load(&self) -> Result<RawTable, SourceError> {
        (**self).load()
    }
}

/// An in-memory table is its own source, identified by its content.
impl TableSource for RawTable {
    fn id(&self) -> String {
        format!("memory:{}", self.fingerprint())
    }

    fn load(&self) -> Result<RawTable, SourceError> {
        Ok(self.clone())
    }
}

/// Errors that can occur while reading a classification table.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The file could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The spreadsheet could not be parsed.
    #[error(transparent)]
    Workbook(#[from] calamine::Error),

    /// The spreadsheet has no worksheets.
    #[error("workbook {} contains no worksheets", .0.display())]
    NoWorksheet(PathBuf),

    /// The CSV data could not be parsed.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// The JSON data could not be parsed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A required column header is missing.
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    /// The file extension does not identify a supported format.
    #[error("cannot infer table format from {}: expected .xlsx, .xls, .ods, .csv or .json", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// On-disk formats a [`FileSource`] can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// An Excel or `OpenDocument` spreadsheet; the first worksheet is read.
    Workbook,
    /// Comma-separated values with a header row.
    Csv,
    /// A JSON array of row objects.
    Json,
}

impl Format {
    /// Infers the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Self::Workbook),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workbook => write!(f, "workbook"),
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// A classification table stored in a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    path: PathBuf,
    format: Format,
}

impl FileSource {
    /// Creates a source for `path`, inferring the format from its extension.
    ///
    /// The file is not opened until [`TableSource::load`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::UnsupportedFormat`] if the extension is not
    /// recognised.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let path = path.into();
        let format =
            Format::from_path(&path).ok_or_else(|| SourceError::UnsupportedFormat(path.clone()))?;
        Ok(Self { path, format })
    }

    /// Creates a source for `path` with an explicit format.
    #[must_use]
    pub fn with_format(path: impl Into<PathBuf>, format: Format) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// The path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The format the file is read as.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    fn open_file(&self) -> Result<io::BufReader<std::fs::File>, SourceError> {
        std::fs::File::open(&self.path)
            .map(io::BufReader::new)
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

impl TableSource for FileSource {
    fn id(&self) -> String {
        self.path.display().to_string()
    }

    #[instrument(level = "debug", skip(self), fields(path = %self.path.display(), format = %self.format))]
    fn load(&self) -> Result<RawTable, SourceError> {
        let table = match self.format {
            Format::Workbook => workbook::read(&self.path)?,
            Format::Csv => delimited::read(self.open_file()?)?,
            Format::Json => json::read(self.open_file()?)?,
        };
        debug!(rows = table.len(), "loaded table");
        Ok(table)
    }
}

/// Positions of the required columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    code: usize,
    title: usize,
    description: usize,
}

impl Columns {
    /// Finds the required columns in a header row.
    ///
    /// Header names are matched exactly, ignoring surrounding whitespace.
    fn locate<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<Self, SourceError> {
        let headers: Vec<&str> = headers.into_iter().map(str::trim).collect();
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|header| *header == name)
                .ok_or(SourceError::MissingColumn(name))
        };

        Ok(Self {
            code: find(COLUMNS[0])?,
            title: find(COLUMNS[1])?,
            description: find(COLUMNS[2])?,
        })
    }

    /// Builds a row from text cells. Empty title and description cells are
    /// treated as missing.
    fn text_record<'a>(self, cell: impl Fn(usize) -> Option<&'a str>) -> RawRecord {
        let text = |index: usize| {
            cell(index)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        RawRecord {
            code: RawCode::Text(cell(self.code).unwrap_or_default().to_string()),
            title: text(self.title),
            description: text(self.description),
        }
    }
}

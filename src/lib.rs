//! NAICS classification hierarchy
//!
//! Industry classification codes nest one decimal digit per level. This crate
//! reads the published classification table, cleans it, and derives the
//! hierarchy as a tree of nodes ready for a UI tree widget.

pub mod domain;
pub use domain::{
    Code, Config, MalformedCodeError, Node, RawCode, RawRecord, RawTable, Record, Table,
    build_tree,
};

/// Data sources for the raw classification table.
pub mod source;
pub use source::{Cached, FileSource, Format, SourceCache, SourceError, TableSource};

pub mod accessor;
pub use accessor::{Error, TreeAccessor};

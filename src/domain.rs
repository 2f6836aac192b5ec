//! Domain models for the classification hierarchy.
//!
//! This module contains the classification [`Code`], the raw and normalized
//! tables, the tree derived from them, and configuration.

/// Classification codes and their child ranges.
pub mod code;
pub use code::{Code, MalformedCodeError};

/// Raw and normalized classification tables.
pub mod table;
pub use table::{RawCode, RawRecord, RawTable, Record, Table};

/// The classification tree.
pub mod tree;
pub use tree::{Node, build_tree};

/// Configuration file handling.
pub mod config;
pub use config::Config;

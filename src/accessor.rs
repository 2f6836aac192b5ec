//! Single entry point from a data source to a classification tree.
//!
//! The [`TreeAccessor`] is the only part of the crate that touches a
//! [`TableSource`]; normalization and tree building are pure functions over
//! in-memory tables.

use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
    domain::{Code, Config, MalformedCodeError, Node, Table, build_tree},
    source::{SourceError, TableSource},
};

/// Errors that can occur while producing a table or tree.
#[derive(Debug, Error)]
pub enum Error {
    /// The source could not be read.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The table contains a code that cannot be normalized.
    #[error(transparent)]
    MalformedCode(#[from] MalformedCodeError),

    /// A subtree was requested for a code that is not in the table.
    #[error("classification code {0} not found")]
    UnknownCode(Code),
}

/// Loads, cleans and builds classification trees from a source.
///
/// Every call reads the source afresh; wrap the source in
/// [`Cached`](crate::source::Cached) to memoize it.
#[derive(Debug, Clone)]
pub struct TreeAccessor<S> {
    source: S,
    root_label: String,
    root_description: String,
}

impl<S: TableSource> TreeAccessor<S> {
    /// Creates an accessor with the default NAICS 2022 root node.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::from_config(source, &Config::default())
    }

    /// Creates an accessor whose root node is taken from `config`.
    #[must_use]
    pub fn from_config(source: S, config: &Config) -> Self {
        Self {
            source,
            root_label: config.root_label().to_string(),
            root_description: config.root_description().to_string(),
        }
    }

    /// Replaces the label and description of the synthetic root node.
    #[must_use]
    pub fn with_root(mut self, label: impl Into<String>, description: impl Into<String>) -> Self {
        self.root_label = label.into();
        self.root_description = description.into();
        self
    }

    /// The underlying source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// A fresh synthetic root node, without children.
    #[must_use]
    pub fn root(&self) -> Node {
        Node::root(&self.root_label, &self.root_description)
    }

    /// Reads and normalizes the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or if it contains a
    /// malformed code.
    #[instrument(level = "debug", skip(self), fields(source = %self.source.id()))]
    pub fn table(&self) -> Result<Table, Error> {
        let table = self.source.load()?.normalize()?;
        debug!(records = table.len(), "normalized table");
        Ok(table)
    }

    /// Builds the full tree below the synthetic root, at most `max_depth`
    /// edges deep.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or if it contains a
    /// malformed code. No partial tree is returned.
    #[instrument(level = "debug", skip(self), fields(source = %self.source.id()))]
    pub fn get_tree(&self, max_depth: usize) -> Result<Node, Error> {
        let table = self.table()?;
        Ok(build_tree(&table, self.root(), max_depth))
    }

    /// Builds the tree below the record with the given code, at most
    /// `max_depth` edges deep.
    ///
    /// The root of the returned tree is labelled like any other child
    /// (`"{code}: {title}"`). [`Code::ROOT`] yields the same tree as
    /// [`get_tree`](Self::get_tree).
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read, if it contains a
    /// malformed code, or if no record has the given code.
    #[instrument(level = "debug", skip(self), fields(source = %self.source.id()))]
    pub fn subtree(&self, code: Code, max_depth: usize) -> Result<Node, Error> {
        let table = self.table()?;
        let root = if code.is_root() {
            self.root()
        } else {
            let record = table.get(code).ok_or(Error::UnknownCode(code))?;
            Node::new(
                record.code,
                format!("{}: {}", record.code, record.title),
                record.description.clone(),
            )
        };
        Ok(build_tree(&table, root, max_depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{RawRecord, RawTable},
        source::{Cached, SourceCache},
    };

    fn raw() -> RawTable {
        RawTable::new(vec![
            RawRecord::new("31-33", "Manufacturing", "d1"),
            RawRecord::new("311", "Food MfgT", "d2"),
            RawRecord::new("312", "Beverage Mfg", "d3"),
        ])
    }

    #[test]
    fn get_tree_end_to_end() {
        let tree = TreeAccessor::new(raw()).get_tree(5).unwrap();

        assert_eq!(tree.value, Code::ROOT);
        assert_eq!(tree.label, "NAICS 2022");
        assert_eq!(
            tree.description,
            "Categorisation tree for NAICS 2022 industry classifications"
        );

        let sector = &tree.children[0];
        assert_eq!(tree.children.len(), 1);
        assert_eq!(sector.value, Code::new(31));
        assert_eq!(sector.label, "31: Manufacturing");

        let labels: Vec<&str> = sector.children.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["311: Food Mfg", "312: Beverage Mfg"]);
        assert!(sector.children.iter().all(Node::is_leaf));
    }

    #[test]
    fn root_is_fresh_on_every_call() {
        let accessor = TreeAccessor::new(raw());
        let first = accessor.get_tree(5).unwrap();
        let shallow = accessor.get_tree(0).unwrap();
        let again = accessor.get_tree(5).unwrap();

        assert!(shallow.is_leaf());
        assert_eq!(first, again);
        assert!(accessor.root().is_leaf());
    }

    #[test]
    fn custom_root() {
        let tree = TreeAccessor::new(raw())
            .with_root("Industries", "All of them")
            .get_tree(1)
            .unwrap();

        assert_eq!(tree.label, "Industries");
        assert_eq!(tree.description, "All of them");
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn root_from_config() {
        let mut config = Config::default();
        config.set_root("NAICS 2017", "older");
        let accessor = TreeAccessor::from_config(raw(), &config);
        assert_eq!(accessor.root(), Node::root("NAICS 2017", "older"));
    }

    #[test]
    fn malformed_code_fails_without_partial_tree() {
        let mut rows = raw().rows().to_vec();
        rows.push(RawRecord::new("31-39", "Broken", ""));

        let error = TreeAccessor::new(RawTable::new(rows))
            .get_tree(5)
            .unwrap_err();
        assert!(matches!(error, Error::MalformedCode(ref e) if e.value() == "31-39"));
    }

    #[test]
    fn source_errors_pass_through() {
        struct Failing;

        impl TableSource for Failing {
            fn id(&self) -> String {
                "failing".to_string()
            }

            fn load(&self) -> Result<RawTable, SourceError> {
                Err(SourceError::MissingColumn("Title"))
            }
        }

        let error = TreeAccessor::new(Failing).get_tree(5).unwrap_err();
        assert_eq!(error.to_string(), "missing required column 'Title'");
        assert!(matches!(
            error,
            Error::Source(SourceError::MissingColumn("Title"))
        ));
    }

    #[test]
    fn table_is_normalized() {
        let table = TreeAccessor::new(raw()).table().unwrap();
        let titles: Vec<&str> = table.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Manufacturing", "Food Mfg", "Beverage Mfg"]);
    }

    #[test]
    fn subtree_from_sector() {
        let tree = TreeAccessor::new(raw())
            .subtree(Code::new(31), 5)
            .unwrap();

        assert_eq!(tree.label, "31: Manufacturing");
        assert_eq!(tree.children.len(), 2);
    }

    #[test]
    fn subtree_of_root_matches_full_tree() {
        let accessor = TreeAccessor::new(raw());
        assert_eq!(
            accessor.subtree(Code::ROOT, 5).unwrap(),
            accessor.get_tree(5).unwrap()
        );
    }

    #[test]
    fn subtree_of_unknown_code() {
        let error = TreeAccessor::new(raw())
            .subtree(Code::new(99), 5)
            .unwrap_err();
        assert!(matches!(error, Error::UnknownCode(code) if code == Code::new(99)));
    }

    #[test]
    fn distinct_tables_in_one_cache_build_their_own_trees() {
        let cache = std::sync::Arc::new(SourceCache::new());
        let agriculture = RawTable::new(vec![RawRecord::new("11", "Agriculture", "")]);
        let utilities = RawTable::new(vec![RawRecord::new("22", "Utilities", "")]);

        let first = TreeAccessor::new(Cached::new(agriculture, std::sync::Arc::clone(&cache)))
            .get_tree(5)
            .unwrap();
        let second = TreeAccessor::new(Cached::new(utilities, std::sync::Arc::clone(&cache)))
            .get_tree(5)
            .unwrap();

        assert_eq!(first.children[0].label, "11: Agriculture");
        assert_eq!(second.children[0].label, "22: Utilities");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn cached_source_is_read_once() {
        let cache = std::sync::Arc::new(SourceCache::new());
        let accessor = TreeAccessor::new(Cached::new(raw(), std::sync::Arc::clone(&cache)));

        accessor.get_tree(5).unwrap();
        accessor.get_tree(2).unwrap();

        assert!(cache.contains(&raw().id()));
        assert_eq!(cache.len(), 1);
    }
}

//! Explicit memoization of raw tables.
//!
//! Nothing is cached unless the caller asks for it: wrap a source in
//! [`Cached`] with a [`SourceCache`] the caller owns, and invalidate entries
//! when the underlying data changes.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tracing::debug;

use super::{SourceError, TableSource};
use crate::domain::RawTable;

/// Raw tables keyed by [`TableSource::id`].
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: Mutex<HashMap<String, Arc<RawTable>>>,
}

impl SourceCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached table for `source`, loading it on a miss.
    ///
    /// The lock is not held while loading, so two callers missing on the same
    /// source at once may both load it; the last one wins.
    ///
    /// # Errors
    ///
    /// Returns the source's error on a miss that fails to load. Failures are
    /// not cached.
    pub fn get_or_load<S: TableSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<Arc<RawTable>, SourceError> {
        let id = source.id();
        if let Some(table) = self.entries().get(&id) {
            debug!(%id, "source cache hit");
            return Ok(Arc::clone(table));
        }

        debug!(%id, "source cache miss");
        let table = Arc::new(source.load()?);
        self.entries().insert(id, Arc::clone(&table));
        Ok(table)
    }

    /// Drops the cached table for `id`. Returns `true` if there was one.
    pub fn invalidate(&self, id: &str) -> bool {
        self.entries().remove(id).is_some()
    }

    /// Drops every cached table.
    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Returns `true` if a table is cached for `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries().contains_key(id)
    }

    /// The number of cached tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<RawTable>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A source whose tables are memoized in a shared [`SourceCache`].
#[derive(Debug, Clone)]
pub struct Cached<S> {
    inner: S,
    cache: Arc<SourceCache>,
}

impl<S: TableSource> Cached<S> {
    /// Wraps `inner`, memoizing its table in `cache`.
    #[must_use]
    pub const fn new(inner: S, cache: Arc<SourceCache>) -> Self {
        Self { inner, cache }
    }

    /// The wrapped source.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// The cache tables are stored in.
    #[must_use]
    pub const fn cache(&self) -> &Arc<SourceCache> {
        &self.cache
    }

    /// Drops the cached table for this source.
    pub fn invalidate(&self) -> bool {
        self.cache.invalidate(&self.inner.id())
    }
}

impl<S: TableSource> TableSource for Cached<S> {
    fn id(&self) -> String {
        self.inner.id()
    }

    fn load(&self) -> Result<RawTable, SourceError> {
        self.cache
            .get_or_load(&self.inner)
            .map(|table| RawTable::clone(&table))
    }
}

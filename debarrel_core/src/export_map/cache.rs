use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use once_cell::sync::Lazy;

use super::ExportMap;

/// Outcome of building one entry file, fixed once written.
#[derive(Debug, Clone)]
pub enum CacheEntry {
    Ready(Arc<ExportMap>),
    Unusable,
}

impl CacheEntry {
    pub fn export_map(&self) -> Option<Arc<ExportMap>> {
        match self {
            CacheEntry::Ready(map) => Some(Arc::clone(map)),
            CacheEntry::Unusable => None,
        }
    }

    pub fn is_unusable(&self) -> bool {
        matches!(self, CacheEntry::Unusable)
    }
}

/// Memo table from resolved entry path to its export map.
///
/// Each key owns a `OnceLock` cell. The cell is cloned out of the shard before
/// building, so a slow build only blocks callers asking for the same path.
#[derive(Debug, Default)]
pub struct ExportMapCache {
    entries: DashMap<PathBuf, Arc<OnceLock<CacheEntry>>>,
}

static GLOBAL_CACHE: Lazy<Arc<ExportMapCache>> = Lazy::new(|| Arc::new(ExportMapCache::new()));

impl ExportMapCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by every rewriter in this process unless one is given
    /// its own.
    pub fn global() -> Arc<ExportMapCache> {
        Arc::clone(&GLOBAL_CACHE)
    }

    pub fn get_or_build(&self, entry_path: &Path, build: impl FnOnce() -> CacheEntry) -> CacheEntry {
        let cell = self
            .entries
            .entry(entry_path.to_path_buf())
            .or_insert_with(|| Arc::new(OnceLock::new()))
            .value()
            .clone();
        cell.get_or_init(build).clone()
    }

    /// Finished entry for `entry_path`, if any. Never waits on a build in progress.
    pub fn get(&self, entry_path: &Path) -> Option<CacheEntry> {
        self.entries
            .get(entry_path)
            .and_then(|cell| cell.value().get().cloned())
    }

    /// Drops the entry so the next request rebuilds it. Builds already in
    /// flight for the old entry still complete and hand out their result.
    pub fn invalidate(&self, entry_path: &Path) -> bool {
        self.entries.remove(entry_path).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn cached_paths(&self) -> Vec<PathBuf> {
        let mut paths = self
            .entries
            .iter()
            .map(|entry| entry.key().clone())
            .collect::<Vec<_>>();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

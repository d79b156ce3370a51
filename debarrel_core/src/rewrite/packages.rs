use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use aho_corasick::AhoCorasick;
use indexmap::IndexSet;

#[derive(Debug, Default)]
struct PackageSet {
    names: IndexSet<String>,
    matcher: Option<Arc<AhoCorasick>>,
}

/// Package names whose imports may be rewritten. Names can be added while the
/// host runs, never removed.
#[derive(Debug, Default)]
pub struct BarrelPackages {
    inner: RwLock<PackageSet>,
}

impl BarrelPackages {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let packages = Self::default();
        packages.extend(names);
        packages
    }

    pub fn insert(&self, name: impl Into<String>) -> bool {
        self.extend([name]) > 0
    }

    /// Adds every new name and returns how many were actually added.
    pub fn extend<I, S>(&self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = self.write();
        let added = names
            .into_iter()
            .map(Into::into)
            .map(|name: String| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .filter(|name| set.names.insert(name.clone()))
            .count();
        if added > 0 {
            set.matcher = AhoCorasick::new(set.names.iter()).ok().map(Arc::new);
        }
        added
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().names.contains(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.read().names.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cheap substring scan run before any parsing: false means the text
    /// cannot import any configured package.
    pub fn mentioned_in(&self, source_text: &str) -> bool {
        let matcher = self.read().matcher.clone();
        matcher.is_some_and(|matcher| matcher.is_match(source_text))
    }

    // A panic while holding the lock leaves the set consistent: names are only
    // ever inserted and the matcher is rebuilt after the last insert.
    fn read(&self) -> RwLockReadGuard<'_, PackageSet> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PackageSet> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

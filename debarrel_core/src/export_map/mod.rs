use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;

mod builder;
mod cache;
mod statements;

#[cfg(test)]
mod cache_test;

pub use builder::{ReadSource, ResolveEntry, assemble_export_map, build_export_map};
pub use cache::{CacheEntry, ExportMapCache};
pub use statements::{ImportedName, ModuleStatement, parse_module_statements, source_type_for_path};
pub(crate) use statements::module_export_name_as_str;

/// Name under which a module's default export is re-exported.
pub const DEFAULT_EXPORT: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "originalName", rename_all = "camelCase")]
pub enum BindingKind {
    Namespace,
    Named(String),
}

/// Where one exported name of a barrel module really comes from.
///
/// `source` is the specifier exactly as written in the barrel; it is never
/// resolved further.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBinding {
    pub source: String,
    #[serde(flatten)]
    pub kind: BindingKind,
}

impl ExportBinding {
    pub fn namespace(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            kind: BindingKind::Namespace,
        }
    }

    pub fn named(source: impl Into<String>, original_name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            kind: BindingKind::Named(original_name.into()),
        }
    }

    pub fn is_namespace(&self) -> bool {
        matches!(self.kind, BindingKind::Namespace)
    }

    pub fn original_name(&self) -> Option<&str> {
        match &self.kind {
            BindingKind::Namespace => None,
            BindingKind::Named(name) => Some(name.as_str()),
        }
    }
}

/// Exported name -> binding for one barrel entry file, in declaration order.
///
/// Relative `source`s are relative to [`ExportMap::entry_path`], which is set
/// when the map was built from a resolved file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExportMap {
    entries: IndexMap<String, ExportBinding>,
    #[serde(skip)]
    entry_path: Option<PathBuf>,
}

impl ExportMap {
    pub fn with_entry_path(mut self, entry_path: impl Into<PathBuf>) -> Self {
        self.entry_path = Some(entry_path.into());
        self
    }

    pub fn entry_path(&self) -> Option<&Path> {
        self.entry_path.as_deref()
    }

    pub fn get(&self, exported_name: &str) -> Option<&ExportBinding> {
        self.entries.get(exported_name)
    }

    pub fn contains(&self, exported_name: &str) -> bool {
        self.entries.contains_key(exported_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExportBinding)> {
        self.entries.iter().map(|(name, binding)| (name.as_str(), binding))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    // Later declarations of the same name replace earlier ones but keep the
    // first declaration's position.
    pub(crate) fn insert(&mut self, exported_name: String, binding: ExportBinding) {
        self.entries.insert(exported_name, binding);
    }
}

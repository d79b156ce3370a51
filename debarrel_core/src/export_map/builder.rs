use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::cache::{CacheEntry, ExportMapCache};
use super::statements::{ImportedName, ModuleStatement, parse_module_statements, source_type_for_path};
use super::{DEFAULT_EXPORT, ExportBinding, ExportMap};
use crate::diagnostics;
use crate::error::DebarrelError;

/// Locates the entry file a package exposes to importers.
///
/// `None` means the package cannot be optimized and is skipped silently.
pub trait ResolveEntry: Send + Sync {
    fn resolve_entry(&self, package_name: &str) -> Option<PathBuf>;
}

impl<F> ResolveEntry for F
where
    F: Fn(&str) -> Option<PathBuf> + Send + Sync,
{
    fn resolve_entry(&self, package_name: &str) -> Option<PathBuf> {
        self(package_name)
    }
}

/// Reads a resolved entry file. `None` means unreadable, not fatal.
pub trait ReadSource: Send + Sync {
    fn read_source(&self, path: &Path) -> Option<String>;
}

impl<F> ReadSource for F
where
    F: Fn(&Path) -> Option<String> + Send + Sync,
{
    fn read_source(&self, path: &Path) -> Option<String> {
        self(path)
    }
}

/// Returns the export map of `package_name`'s entry file, building it at most
/// once per resolved entry path.
///
/// Resolution failures are not cached: without a resolved path there is no
/// stable key.
pub fn build_export_map(
    package_name: &str,
    resolver: &dyn ResolveEntry,
    reader: &dyn ReadSource,
    cache: &ExportMapCache,
) -> Option<Arc<ExportMap>> {
    let Some(entry_path) = resolver.resolve_entry(package_name) else {
        diagnostics::debug(|| format!("skipping {package_name}: entry file not resolved"));
        return None;
    };
    cache
        .get_or_build(&entry_path, || load_entry(package_name, &entry_path, reader))
        .export_map()
}

fn load_entry(package_name: &str, entry_path: &Path, reader: &dyn ReadSource) -> CacheEntry {
    match read_and_assemble(entry_path, reader) {
        Ok(map) => CacheEntry::Ready(Arc::new(map)),
        Err(err) => {
            diagnostics::debug(|| format!("skipping {package_name}: {err}"));
            CacheEntry::Unusable
        }
    }
}

fn read_and_assemble(entry_path: &Path, reader: &dyn ReadSource) -> Result<ExportMap, DebarrelError> {
    let source_text = reader
        .read_source(entry_path)
        .ok_or_else(|| DebarrelError::Unreadable {
            path: entry_path.to_path_buf(),
        })?;
    let statements = parse_module_statements(&source_text, source_type_for_path(entry_path))
        .map_err(|message| DebarrelError::Parse {
            path: entry_path.to_path_buf(),
            message,
        })?;
    Ok(assemble_export_map(&statements).with_entry_path(entry_path))
}

/// Folds classified statements into an export map.
///
/// Imports are hoisted, so every import binding is known before any
/// `export { local }` is resolved. Exports are then applied in source order.
pub fn assemble_export_map(statements: &[ModuleStatement]) -> ExportMap {
    let imports: HashMap<&str, (&str, &ImportedName)> = statements
        .iter()
        .filter_map(|statement| match statement {
            ModuleStatement::Import {
                local,
                imported,
                source,
            } => Some((local.as_str(), (source.as_str(), imported))),
            _ => None,
        })
        .collect();

    let mut map = ExportMap::default();
    for statement in statements {
        match statement {
            ModuleStatement::NamespaceReexport { exported, source } => {
                map.insert(exported.clone(), ExportBinding::namespace(source.as_str()));
            }
            ModuleStatement::NamedReexport {
                exported,
                imported,
                source,
            } => {
                map.insert(
                    exported.clone(),
                    ExportBinding::named(source.as_str(), imported.as_str()),
                );
            }
            ModuleStatement::LocalExport { local, exported } => {
                let Some((source, imported)) = imports.get(local.as_str()) else {
                    continue;
                };
                map.insert(exported.clone(), binding_from_import(source, imported));
            }
            ModuleStatement::WildcardReexport { .. }
            | ModuleStatement::Import { .. }
            | ModuleStatement::Other => {}
        }
    }
    map
}

fn binding_from_import(source: &str, imported: &ImportedName) -> ExportBinding {
    match imported {
        ImportedName::Namespace => ExportBinding::namespace(source),
        ImportedName::Default => ExportBinding::named(source, DEFAULT_EXPORT),
        ImportedName::Named(name) => ExportBinding::named(source, name.as_str()),
    }
}

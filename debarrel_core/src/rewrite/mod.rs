use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::diagnostics;
use crate::export_map::{ExportMap, ExportMapCache, ReadSource, ResolveEntry, build_export_map, source_type_for_path};
use crate::sourcemap::{SourceMap, SourceSplicer};

mod emit;
mod imports;
mod packages;
mod specifier;

#[cfg(test)]
mod packages_test;

pub use packages::BarrelPackages;

/// Module ids starting with this byte belong to synthetic modules that have
/// no file behind them.
pub const VIRTUAL_MODULE_PREFIX: char = '\0';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    pub code: String,
    pub map: SourceMap,
}

/// Rewrites imports of configured barrel packages into imports of the
/// modules that actually define each binding.
///
/// Safe to share across threads; the export map cache is the only shared
/// mutable state.
pub struct BarrelRewriter {
    packages: Arc<BarrelPackages>,
    resolver: Arc<dyn ResolveEntry>,
    reader: Arc<dyn ReadSource>,
    cache: Arc<ExportMapCache>,
}

impl std::fmt::Debug for BarrelRewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarrelRewriter")
            .field("packages", &self.packages)
            .field("cached_entries", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl BarrelRewriter {
    pub fn new(
        packages: Arc<BarrelPackages>,
        resolver: impl ResolveEntry + 'static,
        reader: impl ReadSource + 'static,
    ) -> Self {
        Self::from_shared(packages, Arc::new(resolver), Arc::new(reader))
    }

    /// Like [`BarrelRewriter::new`] for a resolver or reader the caller keeps
    /// a handle to.
    pub fn from_shared(
        packages: Arc<BarrelPackages>,
        resolver: Arc<dyn ResolveEntry>,
        reader: Arc<dyn ReadSource>,
    ) -> Self {
        Self {
            packages,
            resolver,
            reader,
            cache: ExportMapCache::global(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<ExportMapCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn packages(&self) -> &BarrelPackages {
        &self.packages
    }

    pub fn cache(&self) -> &Arc<ExportMapCache> {
        &self.cache
    }

    /// Export map of one configured package, through the cache.
    pub fn export_map(&self, package_name: &str) -> Option<Arc<ExportMap>> {
        build_export_map(
            package_name,
            self.resolver.as_ref(),
            self.reader.as_ref(),
            &self.cache,
        )
    }

    /// Returns the rewritten module, or `None` when nothing changed.
    ///
    /// Never fails: virtual modules, modules without barrel imports, consumer
    /// syntax errors and unusable barrels all come back as `None`.
    pub fn transform(&self, source_text: &str, module_path: &str) -> Option<TransformOutput> {
        let importer_dir = Path::new(strip_query(module_path)).parent();
        self.transform_into(source_text, module_path, importer_dir)
    }

    /// [`BarrelRewriter::transform`] for code that will be written to
    /// `output_path` instead of back to `module_path`. Rebased sources are
    /// made relative to the output location.
    pub fn transform_for_output(
        &self,
        source_text: &str,
        module_path: &str,
        output_path: &Path,
    ) -> Option<TransformOutput> {
        self.transform_into(source_text, module_path, output_path.parent())
    }

    fn transform_into(
        &self,
        source_text: &str,
        module_path: &str,
        importer_dir: Option<&Path>,
    ) -> Option<TransformOutput> {
        if is_virtual_module(module_path) {
            return None;
        }
        if !self.packages.mentioned_in(source_text) {
            return None;
        }

        let source_type = source_type_for_path(Path::new(strip_query(module_path)));
        let barrel_imports =
            match imports::collect_barrel_imports(source_text, source_type, &self.packages) {
                Ok(found) => found,
                Err(message) => {
                    diagnostics::debug(|| format!("leaving {module_path} as is: {message}"));
                    return None;
                }
            };
        if barrel_imports.is_empty() {
            return None;
        }

        let mut maps: IndexMap<&str, Option<Arc<ExportMap>>> = IndexMap::new();
        for import in &barrel_imports {
            maps.entry(import.package.as_str())
                .or_insert_with(|| self.export_map(&import.package));
        }

        let mut splicer = SourceSplicer::new(source_text);
        for import in &barrel_imports {
            let Some(Some(map)) = maps.get(import.package.as_str()) else {
                continue;
            };
            if let Some(replacement) = emit::rewrite_import(import, map, importer_dir) {
                splicer.overwrite(import.start, import.end, replacement);
            }
        }
        if !splicer.has_edits() {
            return None;
        }

        let (code, map) = splicer.generate(strip_query(module_path));
        Some(TransformOutput { code, map })
    }
}

fn is_virtual_module(module_path: &str) -> bool {
    module_path.starts_with(VIRTUAL_MODULE_PREFIX)
}

fn strip_query(module_path: &str) -> &str {
    module_path
        .split_once('?')
        .map(|(path, _)| path)
        .unwrap_or(module_path)
}

use std::path::{Path, PathBuf};

use debarrel_core::{ReadSource, ResolveEntry, diagnostics};
use oxc_resolver::{ResolveOptions, Resolver};

/// Resolves a package's entry file the way a bundler would from `project_root`.
pub struct NodeEntryResolver {
    project_root: PathBuf,
    resolver: Resolver,
}

impl std::fmt::Debug for NodeEntryResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeEntryResolver")
            .field("project_root", &self.project_root)
            .finish_non_exhaustive()
    }
}

impl NodeEntryResolver {
    pub fn new(project_root: &Path, condition_names: &[String], main_fields: &[String]) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            resolver: build_resolver(condition_names, main_fields),
        }
    }

    /// Drops cached package.json and directory lookups, e.g. after an install.
    pub fn clear_cache(&self) {
        self.resolver.clear_cache();
    }
}

impl ResolveEntry for NodeEntryResolver {
    fn resolve_entry(&self, package_name: &str) -> Option<PathBuf> {
        match self.resolver.resolve(&self.project_root, package_name) {
            Ok(resolution) => {
                let full = resolution.full_path();
                Some(dunce::canonicalize(&full).unwrap_or(full))
            }
            Err(err) => {
                diagnostics::debug(|| format!("cannot resolve {package_name}: {err}"));
                None
            }
        }
    }
}

fn build_resolver(condition_names: &[String], main_fields: &[String]) -> Resolver {
    let extensions = [".mjs", ".js", ".mts", ".ts", ".tsx", ".jsx", ".cjs", ".cts"]
        .into_iter()
        .map(|ext| ext.to_string())
        .collect::<Vec<_>>();
    Resolver::new(ResolveOptions {
        extensions,
        condition_names: condition_names.to_vec(),
        main_fields: main_fields.to_vec(),
        ..Default::default()
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FsSourceReader;

impl ReadSource for FsSourceReader {
    fn read_source(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path)
            .map_err(|err| {
                diagnostics::debug(|| format!("cannot read {}: {err}", path.display()));
            })
            .ok()
    }
}

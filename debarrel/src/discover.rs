use std::path::{Path, PathBuf};

use debarrel_core::error::DebarrelError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use path_slash::PathExt;

const SOURCE_EXTENSIONS: [&str; 8] = ["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts"];

const IGNORED_COMPONENTS: [&str; 6] = [".git", "node_modules", "dist", "build", "coverage", "target"];

pub fn looks_like_source_file(path: &Path) -> bool {
    let is_declaration = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.contains(".d.") && name.ends_with("ts"));
    !is_declaration
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Include/exclude globs matched against paths relative to the project root.
#[derive(Debug, Clone)]
pub struct SourceFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl SourceFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, DebarrelError> {
        Ok(Self {
            include: build_globset(include)?,
            exclude: build_globset(exclude)?,
        })
    }

    pub fn accepts(&self, project_root: &Path, path: &Path) -> bool {
        let rel = path.strip_prefix(project_root).unwrap_or(path);
        let rel_slash = rel.to_slash_lossy();
        let included = self
            .include
            .as_ref()
            .is_none_or(|set| set.is_match(&*rel_slash));
        let excluded = self
            .exclude
            .as_ref()
            .is_some_and(|set| set.is_match(&*rel_slash));
        included && !excluded
    }
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>, DebarrelError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|err| DebarrelError::InvalidGlob {
            pattern: pattern.clone(),
            message: err.to_string(),
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map(Some)
        .map_err(|err| DebarrelError::InvalidGlob {
            pattern: patterns.join(","),
            message: err.to_string(),
        })
}

/// Source files under `scan_roots` (files are taken as given), sorted and
/// deduplicated. Honors `.gitignore` and skips dependency and output folders.
pub fn discover_source_files(
    project_root: &Path,
    scan_roots: &[PathBuf],
    filter: &SourceFilter,
    skip_dir: Option<&Path>,
) -> Vec<PathBuf> {
    let mut files = scan_roots
        .iter()
        .flat_map(|root| walk_sources(root, skip_dir))
        .filter(|path| filter.accepts(project_root, path))
        .collect::<Vec<_>>();
    files.sort();
    files.dedup();
    files
}

fn walk_sources(root: &Path, skip_dir: Option<&Path>) -> Vec<PathBuf> {
    if root.is_file() {
        return looks_like_source_file(root)
            .then(|| root.to_path_buf())
            .into_iter()
            .collect();
    }
    let skip_dir = skip_dir.map(Path::to_path_buf);
    WalkBuilder::new(root)
        .standard_filters(true)
        .hidden(false)
        .follow_links(false)
        .filter_entry(move |entry| {
            let path = entry.path();
            if entry.depth() == 0 {
                return true;
            }
            !is_ignored_path(path)
                && skip_dir
                    .as_deref()
                    .is_none_or(|skip| !path.starts_with(skip))
        })
        .build()
        .filter_map(|result| result.ok())
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| looks_like_source_file(path))
        .collect()
}

fn is_ignored_path(candidate: &Path) -> bool {
    candidate
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|segment| IGNORED_COMPONENTS.contains(&segment))
}

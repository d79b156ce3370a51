use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::Duration;

use debarrel_core::ExportMapCache;

use crate::run::RunContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchDecision {
    Rerun,
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FileStamp {
    len: u64,
    modified_nanos: u128,
}

fn stamp_of(path: &Path) -> Option<FileStamp> {
    let metadata = std::fs::metadata(path).ok()?;
    let modified_nanos = metadata
        .modified()
        .ok()
        .and_then(|modified| modified.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|duration| duration.as_nanos())
        .unwrap_or(0);
    Some(FileStamp {
        len: metadata.len(),
        modified_nanos,
    })
}

/// Remembers the stamp of every barrel entry file in the cache and drops
/// cache entries whose file changed since the last look.
#[derive(Debug, Default)]
pub struct EntryWatcher {
    stamps: HashMap<PathBuf, Option<FileStamp>>,
}

impl EntryWatcher {
    /// Returns the entry paths that were invalidated.
    pub fn refresh(&mut self, cache: &ExportMapCache) -> Vec<PathBuf> {
        let mut invalidated: Vec<PathBuf> = vec![];
        let mut next: HashMap<PathBuf, Option<FileStamp>> = HashMap::new();
        for entry_path in cache.cached_paths() {
            let current = stamp_of(&entry_path);
            let changed = self
                .stamps
                .get(&entry_path)
                .is_some_and(|previous| *previous != current);
            if changed {
                cache.invalidate(&entry_path);
                invalidated.push(entry_path);
            } else {
                next.insert(entry_path, current);
            }
        }
        self.stamps = next;
        invalidated
    }
}

/// Files whose change means installed packages may differ from the last run.
pub const PACKAGE_MANIFESTS: [&str; 6] = [
    "package.json",
    "package-lock.json",
    "npm-shrinkwrap.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lock",
];

/// Stamps of the project's package manifest and lockfiles.
#[derive(Debug)]
pub struct ManifestWatcher {
    project_root: PathBuf,
    stamps: Vec<Option<FileStamp>>,
}

impl ManifestWatcher {
    pub fn new(project_root: &Path) -> Self {
        let project_root = project_root.to_path_buf();
        let stamps = manifest_stamps(&project_root);
        Self {
            project_root,
            stamps,
        }
    }

    /// True once per change to any manifest, including creation and removal.
    pub fn changed(&mut self) -> bool {
        let current = manifest_stamps(&self.project_root);
        if current == self.stamps {
            return false;
        }
        self.stamps = current;
        true
    }
}

fn manifest_stamps(project_root: &Path) -> Vec<Option<FileStamp>> {
    PACKAGE_MANIFESTS
        .iter()
        .map(|name| stamp_of(&project_root.join(name)))
        .collect()
}

pub fn run_polling_watch_loop(
    ctx: &RunContext,
    poll_interval: Duration,
    mut run_once: impl FnMut() -> i32,
) -> i32 {
    let _initial_exit_code = run_once();
    let mut entries = EntryWatcher::default();
    entries.refresh(ctx.rewriter.cache());
    let mut manifests = ManifestWatcher::new(&ctx.project_root);
    let mut last_fingerprint = compute_inputs_fingerprint(ctx);
    loop {
        std::thread::sleep(poll_interval);
        let invalidated = entries.refresh(ctx.rewriter.cache());
        let manifests_changed = manifests.changed();
        let decision = watch_decision(ctx, &mut last_fingerprint);
        if invalidated.is_empty() && !manifests_changed && decision == WatchDecision::Continue {
            continue;
        }
        if ctx.args.verbose {
            eprintln!(
                "debarrel: watch detected changes ({} barrel entries invalidated, manifests changed: {manifests_changed}), re-running",
                invalidated.len()
            );
        }
        ctx.reset_resolution(manifests_changed);
        let _ = run_once();
        entries.refresh(ctx.rewriter.cache());
        last_fingerprint = compute_inputs_fingerprint(ctx);
    }
}

fn watch_decision(ctx: &RunContext, last_fingerprint: &mut u64) -> WatchDecision {
    let next = compute_inputs_fingerprint(ctx);
    if next == *last_fingerprint {
        WatchDecision::Continue
    } else {
        *last_fingerprint = next;
        WatchDecision::Rerun
    }
}

fn compute_inputs_fingerprint(ctx: &RunContext) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    ctx.discover().iter().for_each(|candidate| {
        let rel = candidate
            .strip_prefix(&ctx.project_root)
            .unwrap_or(candidate);
        rel.hash(&mut hasher);
        stamp_of(candidate).hash(&mut hasher);
    });
    hasher.finish()
}

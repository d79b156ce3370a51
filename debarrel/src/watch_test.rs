use std::fs;
use std::sync::Arc;

use debarrel_core::config::DebarrelConfig;
use debarrel_core::{CacheEntry, ExportMap, ExportMapCache};

use crate::args::derive_args;
use crate::run::RunContext;
use crate::watch::{EntryWatcher, ManifestWatcher};

#[test]
fn changed_entry_files_are_invalidated_once() {
    let dir = tempfile::tempdir().unwrap();
    let entry = dir.path().join("index.mjs");
    fs::write(&entry, "export { a } from './a';\n").unwrap();

    let cache = ExportMapCache::new();
    cache.get_or_build(&entry, || CacheEntry::Ready(Arc::new(ExportMap::default())));

    let mut watcher = EntryWatcher::default();
    assert!(watcher.refresh(&cache).is_empty());
    assert!(watcher.refresh(&cache).is_empty());

    fs::write(&entry, "export { a } from './a';\nexport { b } from './b';\n").unwrap();
    assert_eq!(watcher.refresh(&cache), vec![entry.clone()]);
    assert!(cache.get(&entry).is_none());
    assert!(watcher.refresh(&cache).is_empty());
}

#[test]
fn deleted_entry_files_count_as_changed() {
    let dir = tempfile::tempdir().unwrap();
    let entry = dir.path().join("index.mjs");
    fs::write(&entry, "export {};\n").unwrap();

    let cache = ExportMapCache::new();
    cache.get_or_build(&entry, || CacheEntry::Unusable);
    let mut watcher = EntryWatcher::default();
    watcher.refresh(&cache);

    fs::remove_file(&entry).unwrap();
    assert_eq!(watcher.refresh(&cache), vec![entry]);
    assert!(cache.is_empty());
}

#[test]
fn manifest_and_lockfile_edits_are_reported_once() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("package.json"), "{}\n").unwrap();

    let mut manifests = ManifestWatcher::new(dir.path());
    assert!(!manifests.changed());

    fs::write(dir.path().join("pnpm-lock.yaml"), "lockfileVersion: '9.0'\n").unwrap();
    assert!(manifests.changed());
    assert!(!manifests.changed());

    fs::write(
        dir.path().join("package.json"),
        "{ \"dependencies\": { \"@acme/ui\": \"1.0.0\" } }\n",
    )
    .unwrap();
    assert!(manifests.changed());
}

#[test]
fn packages_installed_while_watching_resolve_after_a_reset() {
    let dir = tempfile::tempdir().unwrap();
    let root = dunce::canonicalize(dir.path()).unwrap();
    fs::write(root.join("package.json"), "{ \"name\": \"app\" }\n").unwrap();
    let args = derive_args(&[], &["--package=@acme/ui".to_string()]).unwrap();
    let ctx = RunContext::new(&root, &root, &DebarrelConfig::default(), args).unwrap();

    assert!(ctx.rewriter.export_map("@acme/ui").is_none());

    let package_dir = root.join("node_modules").join("@acme").join("ui");
    fs::create_dir_all(&package_dir).unwrap();
    fs::write(
        package_dir.join("package.json"),
        "{ \"name\": \"@acme/ui\", \"module\": \"./index.mjs\" }\n",
    )
    .unwrap();
    fs::write(package_dir.join("index.mjs"), "export { Button } from './button';\n").unwrap();

    ctx.reset_resolution(false);
    let map = ctx.rewriter.export_map("@acme/ui").unwrap();
    assert!(map.contains("Button"));
    assert_eq!(ctx.rewriter.cache().len(), 1);

    ctx.reset_resolution(true);
    assert!(ctx.rewriter.cache().is_empty());
}

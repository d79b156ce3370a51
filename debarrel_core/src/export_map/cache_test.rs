use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;

use super::{CacheEntry, ExportMap, ExportMapCache, build_export_map};

#[test]
fn concurrent_first_requests_build_once_and_share_identity() {
    let cache = ExportMapCache::new();
    let reads = AtomicUsize::new(0);
    let thread_count = 8;
    let barrier = Barrier::new(thread_count);
    let reader = |_: &Path| {
        reads.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(20));
        Some("export * as Slot from '@x/slot';".to_string())
    };
    let resolver = |_: &str| Some(PathBuf::from("/node_modules/x/index.js"));

    let maps = std::thread::scope(|scope| {
        let handles = (0..thread_count)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    build_export_map("@x/ui", &resolver, &reader, &cache).unwrap()
                })
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    });

    assert_eq!(reads.load(Ordering::SeqCst), 1);
    assert!(maps.iter().all(|map| Arc::ptr_eq(map, &maps[0])));
}

#[test]
fn different_keys_do_not_wait_on_each_other() {
    let cache = ExportMapCache::new();
    let slow_started = Barrier::new(2);
    let slow_path = Path::new("/slow/index.js");
    let fast_path = Path::new("/fast/index.js");

    std::thread::scope(|scope| {
        let slow = scope.spawn(|| {
            cache.get_or_build(slow_path, || {
                slow_started.wait();
                std::thread::sleep(Duration::from_millis(200));
                CacheEntry::Unusable
            })
        });
        slow_started.wait();
        let started = std::time::Instant::now();
        let fast = cache.get_or_build(fast_path, || CacheEntry::Ready(Arc::new(ExportMap::default())));
        assert!(started.elapsed() < Duration::from_millis(200));
        assert!(fast.export_map().is_some());
        assert!(slow.join().unwrap().is_unusable());
    });
}

#[test]
fn invalidate_forces_rebuild() {
    let cache = ExportMapCache::new();
    let path = Path::new("/pkg/index.js");
    let builds = AtomicUsize::new(0);
    let build = || {
        builds.fetch_add(1, Ordering::SeqCst);
        CacheEntry::Ready(Arc::new(ExportMap::default()))
    };
    let first = cache.get_or_build(path, build).export_map().unwrap();
    assert!(cache.invalidate(path));
    assert!(cache.get(path).is_none());
    let second = cache.get_or_build(path, build).export_map().unwrap();
    assert_eq!(builds.load(Ordering::SeqCst), 2);
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(cache.cached_paths(), vec![PathBuf::from("/pkg/index.js")]);
}

#[test]
fn global_cache_is_one_instance() {
    assert!(Arc::ptr_eq(&ExportMapCache::global(), &ExportMapCache::global()));
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;

use debarrel::parallel_stride::map_parallel_stride;

#[test]
fn map_parallel_stride_runs_all_items_once_in_order() {
    let items = (0usize..17).collect::<Vec<_>>();
    let seen = Arc::new(
        (0..items.len())
            .map(|_| AtomicUsize::new(0))
            .collect::<Vec<_>>(),
    );

    let out = map_parallel_stride(&items, 3, |value, _index| {
        let slot = &seen[*value];
        slot.fetch_add(1, Ordering::SeqCst);
        *value * 10
    });

    assert_eq!(out, items.iter().map(|v| v * 10).collect::<Vec<_>>());
    for slot in &*seen {
        assert_eq!(slot.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn map_parallel_stride_keeps_going_after_failures() {
    let items = (0usize..6).collect::<Vec<_>>();
    let out = map_parallel_stride(&items, 2, |value, _index| {
        if value % 2 == 0 {
            Err(format!("item {value}"))
        } else {
            Ok(*value)
        }
    });
    assert_eq!(out.len(), 6);
    assert_eq!(out.iter().filter(|r| r.is_err()).count(), 3);
    assert_eq!(out[5], Ok(5));
}

#[test]
fn map_parallel_stride_respects_concurrency_upper_bound() {
    let items = (0usize..9).collect::<Vec<_>>();
    let worker_count = 3usize;

    let barrier = Arc::new(Barrier::new(worker_count));
    let in_flight = Arc::new(AtomicUsize::new(0));
    let max_in_flight = Arc::new(AtomicUsize::new(0));

    let _ = map_parallel_stride(&items, worker_count, |_value, index| {
        if index < worker_count {
            barrier.wait();
        }
        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        max_in_flight.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(30));
        in_flight.fetch_sub(1, Ordering::SeqCst);
    });

    let observed = max_in_flight.load(Ordering::SeqCst);
    assert!(
        observed <= worker_count,
        "observed={observed} worker_count={worker_count}"
    );
}

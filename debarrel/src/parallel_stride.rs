use std::sync::Mutex;

/// Runs `run` over `items` on up to `concurrency` scoped threads, worker `k`
/// taking items `k, k + workers, ...`. Results come back in item order.
///
/// Every item runs; failures are ordinary results.
pub fn map_parallel_stride<T, R, F>(items: &[T], concurrency: usize, run: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T, usize) -> R + Sync,
{
    let total = items.len();
    if total == 0 {
        return vec![];
    }
    let worker_count = std::cmp::max(1, std::cmp::min(concurrency, total));
    if worker_count == 1 {
        return items
            .iter()
            .enumerate()
            .map(|(index, item)| run(item, index))
            .collect();
    }

    let results_by_index: Vec<Mutex<Option<R>>> = (0..total).map(|_| Mutex::new(None)).collect();

    std::thread::scope(|scope| {
        let run_ref = &run;
        let results_ref = &results_by_index;
        for start_index in 0..worker_count {
            scope.spawn(move || {
                let mut index = start_index;
                while index < total {
                    let value = run_ref(&items[index], index);
                    if let Ok(mut slot) = results_ref[index].lock() {
                        *slot = Some(value);
                    }
                    index += worker_count;
                }
            });
        }
    });

    results_by_index
        .into_iter()
        .filter_map(|slot| slot.into_inner().ok().flatten())
        .collect()
}

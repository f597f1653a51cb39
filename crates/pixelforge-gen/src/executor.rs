//! Bounded worker pool
//!
//! A fixed number of scoped threads drain a shared, ordered queue. The queue
//! head is an atomic index, so each item is claimed by exactly one worker.
//! Results are streamed back to the calling thread in completion order.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

pub const DEFAULT_CONCURRENCY: usize = 4;

/// Effective worker count: `max(1, min(configured, task_count))`
pub fn clamp_workers(configured: usize, task_count: usize) -> usize {
    configured.min(task_count).max(1)
}

/// Run `work` on every item with at most `workers` running at once.
///
/// `on_done` is called on the calling thread as each result arrives. Returns
/// once every item has been processed. `work` must not panic; per-item
/// errors belong in `R`.
pub fn run_pool<T, R, W, C>(items: &[T], workers: usize, work: W, mut on_done: C)
where
    T: Sync,
    R: Send,
    W: Fn(&T) -> R + Sync,
    C: FnMut(R),
{
    if items.is_empty() {
        return;
    }

    let workers = clamp_workers(workers, items.len());
    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel();

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            let work = &work;
            scope.spawn(move || loop {
                let index = next.fetch_add(1, Ordering::SeqCst);
                let Some(item) = items.get(index) else {
                    break;
                };
                if tx.send(work(item)).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        for result in rx {
            on_done(result);
        }
    });
}

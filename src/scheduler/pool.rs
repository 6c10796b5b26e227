// src/scheduler/pool.rs
// =============================================================================
// This module runs a per-URL task over a whole batch with a fixed number of
// workers.
//
// How it works:
// 1. Start min(concurrency, number of URLs) workers
// 2. Each worker repeatedly CLAIMS the next unprocessed URL from a shared
//    cursor (an atomic counter), runs the task on it and stores the result
// 3. When the cursor runs past the end, the worker stops
// 4. When every worker has stopped, the result map is handed back
//
// Why pull work instead of splitting the list up front?
// - Page load times vary wildly (50ms to 30s)
// - With a fixed split, one slow page holds up its whole slice
// - With a shared cursor, idle workers just take the next URL
//
// Rust concepts:
// - AtomicUsize: A counter many tasks can bump without a lock
// - Mutex: Protects the result map during the (tiny) insert
// - join_all: Runs all worker futures concurrently and waits for all of them
// =============================================================================

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use futures::future::join_all;
use tracing::debug;

use crate::checker::ValidationOutcome;

// Shared state for one run. Workers only ever:
// - claim() an index, which hands each URL to exactly one worker
// - publish() their own outcome under that URL
// so no two workers ever touch the same map key.
struct BatchState<'a> {
    urls: &'a [String],
    cursor: AtomicUsize,
    results: Mutex<HashMap<String, ValidationOutcome>>,
}

impl<'a> BatchState<'a> {
    fn new(urls: &'a [String]) -> Self {
        Self {
            urls,
            cursor: AtomicUsize::new(0),
            results: Mutex::new(HashMap::with_capacity(urls.len())),
        }
    }

    // fetch_add returns the old value, so every caller gets a unique index.
    fn claim(&self) -> Option<&'a String> {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.urls.get(index)
    }

    fn publish(&self, url: &str, outcome: ValidationOutcome) {
        // The lock is never held across an await, so poisoning can only come
        // from a panic mid-insert; the map is still usable in that case.
        let mut results = self.results.lock().unwrap_or_else(PoisonError::into_inner);
        results.insert(url.to_string(), outcome);
    }

    fn into_results(self) -> HashMap<String, ValidationOutcome> {
        self.results.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs `task` once for every URL, at most `concurrency` at a time.
///
/// `urls` must be distinct. `on_outcome` is called as each outcome is
/// produced, in completion order; it runs inline on the worker, so it must
/// return promptly (logging or a progress line is fine).
pub async fn run<F, Fut>(
    urls: &[String],
    concurrency: usize,
    task: F,
    on_outcome: Option<&dyn Fn(&ValidationOutcome)>,
) -> HashMap<String, ValidationOutcome>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = ValidationOutcome>,
{
    if urls.is_empty() {
        return HashMap::new();
    }

    let workers = concurrency.clamp(1, urls.len());
    debug!(urls = urls.len(), workers, "starting worker pool");

    let state = BatchState::new(urls);

    let pool = (0..workers).map(|id| worker(id, &state, &task, on_outcome));
    join_all(pool).await;

    state.into_results()
}

async fn worker<F, Fut>(
    id: usize,
    state: &BatchState<'_>,
    task: &F,
    on_outcome: Option<&dyn Fn(&ValidationOutcome)>,
) where
    F: Fn(String) -> Fut,
    Fut: Future<Output = ValidationOutcome>,
{
    let mut processed = 0usize;

    while let Some(url) = state.claim() {
        let outcome = task(url.clone()).await;

        if let Some(callback) = on_outcome {
            callback(&outcome);
        }

        state.publish(url, outcome);
        processed += 1;
    }

    debug!(worker = id, processed, "worker finished");
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why no tokio::spawn?
//    - join_all drives every worker future inside the current task
//    - Workers still overlap: whenever one awaits a network call, another runs
//    - Because nothing is spawned, workers can BORROW the state (&BatchState)
//      instead of needing Arc and 'static data
//
// 2. Why is Ordering::Relaxed enough for the cursor?
//    - We only need each fetch_add to return a different number
//    - Atomic read-modify-write operations guarantee that at any ordering
//
// 3. Why does the map still have a Mutex if keys never collide?
//    - A HashMap insert can reallocate the whole table
//    - Two inserts at once (even for different keys) would corrupt it
//    - The lock is held only for the insert itself, never across an .await
//
// 4. What is clamp(1, len)?
//    - Keeps the worker count between 1 and the number of URLs
//    - No point starting 8 workers for 3 URLs
// -----------------------------------------------------------------------------

//! Shared utilities: the crate-global worker pool.

use once_cell::sync::Lazy;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Pool used for batched catalog lookups. Thread count defaults to the
/// number of cores and can be overridden with `VARPRISM_NUM_THREADS`.
pub static THREAD_POOL: Lazy<ThreadPool> = Lazy::new(|| {
    let num_threads: Option<usize> = std::env::var("VARPRISM_NUM_THREADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok());
    ThreadPoolBuilder::new()
        .num_threads(num_threads.unwrap_or(0))
        .build()
        .expect("Failed to create thread pool")
});

pub fn n_threads() -> usize {
    THREAD_POOL.current_num_threads()
}

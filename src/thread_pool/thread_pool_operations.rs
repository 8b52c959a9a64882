//! Async Pool Operations

use std::sync::atomic::{AtomicU64, Ordering};

use super::thread_pool_data::{AsyncPool, AsyncPoolConfig};

pub fn create_async_pool(config: AsyncPoolConfig) -> Result<AsyncPool, rayon::ThreadPoolBuildError> {
    let prefix = config.thread_name_prefix.clone();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_count)
        .thread_name(move |index| format!("{}-{}", prefix, index))
        .build()?;

    log::info!(
        "[create_async_pool] Started {} worker(s)",
        pool.current_num_threads()
    );

    Ok(AsyncPool {
        worker_count: pool.current_num_threads(),
        pool,
        submitted: AtomicU64::new(0),
    })
}

/// Run `task` on a pool worker
pub fn submit<F: FnOnce() + Send + 'static>(pool: &AsyncPool, task: F) {
    pool.submitted.fetch_add(1, Ordering::Relaxed);
    pool.pool.spawn(task);
}

pub fn submitted_count(pool: &AsyncPool) -> u64 {
    pool.submitted.load(Ordering::Relaxed)
}

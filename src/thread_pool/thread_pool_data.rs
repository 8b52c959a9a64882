//! Async Pool Data
//!
//! Worker pool handle shared by every world. Operations live in
//! thread_pool_operations.rs.

use std::sync::atomic::AtomicU64;

/// Async pool configuration
#[derive(Clone, Debug)]
pub struct AsyncPoolConfig {
    pub worker_count: usize,
    pub thread_name_prefix: String,
}

impl Default for AsyncPoolConfig {
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get(),
            thread_name_prefix: "imaginary-async".to_string(),
        }
    }
}

/// Background workers worlds submit tasks to
pub struct AsyncPool {
    pub(crate) pool: rayon::ThreadPool,
    pub worker_count: usize,
    pub(crate) submitted: AtomicU64,
}

impl std::fmt::Debug for AsyncPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncPool")
            .field("worker_count", &self.worker_count)
            .field("submitted", &self.submitted)
            .finish()
    }
}

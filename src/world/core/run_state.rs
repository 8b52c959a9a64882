//! Host run state
//!
//! Shared flag telling storage whether the host is still running. Once the
//! host starts shutting down, closing an imaginary world releases its backing
//! store even if other clones still reference it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct RunState {
    running: Arc<AtomicBool>,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Mark the host as shutting down. Irreversible.
    pub fn begin_shutdown(&self) {
        self.running.store(false, Ordering::Release);
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

//! Async worker pool handed to every world

pub mod thread_pool_data;
pub mod thread_pool_operations;

pub use thread_pool_data::{AsyncPool, AsyncPoolConfig};
pub use thread_pool_operations::{create_async_pool, submit, submitted_count};

//! Logging for imaginary worlds
//!
//! Every world reports through a [`WorldLogger`]. The default
//! [`PrefixedLogger`] forwards to the `log` facade with the world's prefix so
//! messages from many clones of one template stay distinguishable.

use std::sync::Arc;

/// Log sink handed to storage providers and metadata records
pub trait WorldLogger: Send + Sync {
    fn debug(&self, message: &str);
    fn warning(&self, message: &str);
}

/// Forwards to the `log` facade, prefixing every message
#[derive(Debug, Clone)]
pub struct PrefixedLogger {
    prefix: String,
}

impl PrefixedLogger {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Logger used by a world that was not given one explicitly
    pub fn for_world(display_name: &str) -> Arc<dyn WorldLogger> {
        Arc::new(Self::new(format!("'{}'", display_name)))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl WorldLogger for PrefixedLogger {
    fn debug(&self, message: &str) {
        log::debug!("[{}] {}", self.prefix, message);
    }

    fn warning(&self, message: &str) {
        log::warn!("[{}] {}", self.prefix, message);
    }
}

/// Initialise `env_logger` with an `info` default filter.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_from_env() {
    let env = env_logger::Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("[logging::init_from_env] Logger already initialised");
    }
}

// Imaginary Worlds
//
// Worlds whose storage is never written. A void world has no storage at all;
// a templated world reads terrain from an existing world folder and keeps
// every change in memory. Templated worlds made from one folder share a
// single real provider, closed when the last of them closes.
//
// Entry points:
// - world::management::create_void / create_templated
// - world::management::WorldManager as a reference host
// - ImaginaryConfig for the behaviour switches

pub mod error;
pub mod logging;
pub mod thread_pool;
pub mod world;

#[cfg(test)]
mod test_support;

use std::path::{Path, PathBuf};

use serde::Deserialize;

// Re-export commonly used types
pub use error::{ImaginaryError, ImaginaryResult, OptionExt};
pub use logging::{PrefixedLogger, WorldLogger};
pub use thread_pool::{AsyncPool, AsyncPoolConfig};
pub use world::management::{
    create_templated, create_void, World, WorldHost, WorldId, WorldManager,
};
pub use world::metadata::{ChangeLog, ChangeValue, ImaginaryWorldData, WorldData};
pub use world::storage::{
    ChunkData, ImaginaryWorldProvider, LoadedChunkData, ProviderFactory, StorageError,
    StorageResult, WorldProvider,
};
pub use world::{ChunkPos, RunState, SpawnPoint};

/// Main imaginary world configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImaginaryConfig {
    /// Directory under the host data path holding world folders
    pub worlds_dir: PathBuf,
    /// Report metadata changes when an imaginary world saves
    pub log_metadata_changes: bool,
    /// Warn whenever a templated world is asked for its path
    pub warn_on_path_access: bool,
    /// Log every close of a templated world with the references left
    pub log_on_close: bool,
    /// Workers in the async pool shared by all worlds
    pub async_workers: usize,
}

impl Default for ImaginaryConfig {
    fn default() -> Self {
        Self {
            worlds_dir: PathBuf::from("worlds"),
            log_metadata_changes: true,
            warn_on_path_access: false,
            log_on_close: false,
            async_workers: num_cpus::get(),
        }
    }
}

impl ImaginaryConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> ImaginaryResult<()> {
        if self.worlds_dir.as_os_str().is_empty() {
            return Err(ImaginaryError::InvalidConfig {
                field: "worlds_dir".to_string(),
                value: String::new(),
                reason: "cannot be empty".to_string(),
            });
        }

        // Joined onto the host data path, so it must stay relative
        if self.worlds_dir.is_absolute() {
            return Err(ImaginaryError::InvalidConfig {
                field: "worlds_dir".to_string(),
                value: self.worlds_dir.display().to_string(),
                reason: "must be relative to the data path".to_string(),
            });
        }

        if self.async_workers == 0 {
            return Err(ImaginaryError::InvalidConfig {
                field: "async_workers".to_string(),
                value: "0".to_string(),
                reason: "at least one worker is required".to_string(),
            });
        }

        log::debug!("[ImaginaryConfig] Configuration validated successfully");
        Ok(())
    }

    /// Parse and validate a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> ImaginaryResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> ImaginaryResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ImaginaryError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        log::info!("[ImaginaryConfig] Loading configuration from {}", path.display());
        Self::from_toml_str(&source)
    }
}

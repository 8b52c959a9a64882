//! World storage
//!
//! [`WorldProvider`] is the storage-provider contract every world is backed
//! by. [`ImaginaryWorldProvider`] implements it on top of an optional shared
//! real provider, delegating reads and suppressing chunk writes.

mod chunk_data;
mod imaginary_provider;
mod shared_provider;

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use chunk_data::{dirty_flags, ChunkData, LoadedChunkData};
pub use imaginary_provider::{ImaginaryWorldProvider, ProviderOptions, ProviderState};
pub use shared_provider::{BackingStore, ProviderRefCount, SharedProvider};

use crate::logging::WorldLogger;
use crate::world::core::ChunkPos;
use crate::world::metadata::WorldData;

pub type StorageResult<T> = Result<T, StorageError>;

/// Stored chunks, produced lazily by the provider
pub type ChunkIter = Box<dyn Iterator<Item = StorageResult<(ChunkPos, LoadedChunkData)>> + Send>;

/// Storage system errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("path() called on void imaginary world '{name}'")]
    NoPath { name: String },

    #[error("Imaginary world '{name}' has no backing store to enumerate chunks from")]
    NoBackingStore { name: String },

    #[error("{operation}() called on closed world provider '{name}'")]
    Closed {
        name: String,
        operation: &'static str,
    },

    #[error("Backing store has already been released")]
    BackingStoreReleased,

    #[error("Corrupted chunk at {pos}: {reason}")]
    CorruptedChunk { pos: ChunkPos, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage-provider capability set
pub trait WorldProvider: Send {
    fn world_min_y(&self) -> i32;
    fn world_max_y(&self) -> i32;

    fn path(&self) -> StorageResult<PathBuf>;

    fn load_chunk(&mut self, x: i32, z: i32) -> StorageResult<Option<LoadedChunkData>>;
    fn save_chunk(&mut self, x: i32, z: i32, data: &ChunkData, dirty_flags: u32) -> StorageResult<()>;

    fn do_garbage_collection(&mut self) -> StorageResult<()>;
    fn calculate_chunk_count(&mut self) -> StorageResult<u64>;

    /// Every stored chunk. Each call starts a fresh sequence.
    fn all_chunks(
        &mut self,
        skip_corrupted: bool,
        logger: Option<Arc<dyn WorldLogger>>,
    ) -> StorageResult<ChunkIter>;

    fn world_data(&self) -> &dyn WorldData;
    fn world_data_mut(&mut self) -> &mut dyn WorldData;

    fn close(&mut self) -> StorageResult<()>;

    /// Downcast for providers that are imaginary worlds themselves
    fn as_imaginary(&self) -> Option<&ImaginaryWorldProvider> {
        None
    }
}

/// A storage format the host knows how to open
pub trait ProviderFactory: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the folder at `path` is stored in this format
    fn is_valid(&self, path: &Path) -> bool;

    fn from_path(
        &self,
        path: &Path,
        logger: Arc<dyn WorldLogger>,
    ) -> StorageResult<Box<dyn WorldProvider>>;
}

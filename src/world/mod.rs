//! Imaginary World Module
//!
//! Worlds whose changes are never persisted.
//!
//! # Architecture Overview
//!
//! - **Core**: Fundamental data types (chunk position, spawn point, run state)
//! - **Metadata**: In-memory world metadata with a change log
//! - **Storage**: The storage proxy and the shared real provider behind it
//! - **Management**: World objects, the host interface and the lifecycle factory
//!
//! # Data Flow
//!
//! 1. The factory builds a metadata record, then the storage proxy around it
//! 2. The proxy is wrapped in a [`World`] and registered with the host
//! 3. Reads go to the real provider; writes stop at the proxy

pub mod core;
pub mod management;
pub mod metadata;
pub mod storage;

// Re-export core types for convenience
pub use core::{ChunkPos, RunState, SpawnPoint, DEFAULT_SPAWN};

// Re-export metadata
pub use metadata::{ChangeLog, ChangeValue, ImaginaryWorldData, MetadataField, WorldData};

// Re-export storage systems
pub use storage::{
    dirty_flags, BackingStore, ChunkData, ImaginaryWorldProvider, LoadedChunkData,
    ProviderFactory, ProviderOptions, ProviderRefCount, StorageError, StorageResult,
    WorldProvider,
};

// Re-export management
pub use management::{create_templated, create_void, World, WorldHost, WorldId, WorldManager};

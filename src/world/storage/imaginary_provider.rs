//! Imaginary world provider
//!
//! Storage proxy behind every imaginary world. Reads and maintenance go to the
//! shared real provider when there is one; chunk writes never do. Metadata is
//! served by an [`ImaginaryWorldData`] owned by the proxy.
//!
//! A proxy is `Open` from construction until `close()`, then `Closed` for
//! good. Closing gives back the proxy's reference to the backing store; the
//! proxy that takes the count to zero closes the real provider.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use super::shared_provider::{BackingStore, ProviderRefCount};
use super::{ChunkData, ChunkIter, LoadedChunkData, StorageError, StorageResult, WorldProvider};
use crate::logging::{PrefixedLogger, WorldLogger};
use crate::world::core::RunState;
use crate::world::metadata::{ImaginaryWorldData, WorldData};

/// Lifecycle of a single proxy instance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderState {
    Open,
    Closed,
}

/// Behaviour switches for an imaginary provider
#[derive(Clone, Copy, Debug)]
pub struct ProviderOptions {
    /// Warn whenever something asks for the storage path
    pub warn_on_path_access: bool,
    /// Log every close, not only the one that releases the backing store
    pub log_on_close: bool,
    /// Report the metadata change log on save
    pub log_metadata_changes: bool,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            warn_on_path_access: false,
            log_on_close: false,
            log_metadata_changes: true,
        }
    }
}

/// Storage provider for an imaginary world
pub struct ImaginaryWorldProvider {
    backing: BackingStore,
    ref_count: ProviderRefCount,
    name: String,
    path: Option<PathBuf>,
    logger: Arc<dyn WorldLogger>,
    run_state: RunState,
    options: ProviderOptions,
    world_data: ImaginaryWorldData,
    state: ProviderState,
}

impl ImaginaryWorldProvider {
    /// Wrap `backing`, taking one reference on `ref_count`.
    ///
    /// The reference is taken for void worlds as well, though only shared
    /// backing stores ever give it back.
    pub fn new(
        backing: BackingStore,
        ref_count: ProviderRefCount,
        name: impl Into<String>,
        path: Option<PathBuf>,
        logger: Option<Arc<dyn WorldLogger>>,
        run_state: RunState,
        options: ProviderOptions,
    ) -> Self {
        let name = name.into();
        let references = ref_count.acquire();
        let logger = logger.unwrap_or_else(|| PrefixedLogger::for_world(&name));

        let source = match &backing {
            BackingStore::Void => None,
            BackingStore::Shared(shared) => {
                let snapshot = shared.metadata_snapshot();
                if snapshot.is_none() {
                    logger.warning("Backing store already released, using default metadata");
                }
                snapshot
            }
        };
        let world_data = ImaginaryWorldData::new(
            name.clone(),
            source.as_ref(),
            Arc::clone(&logger),
            options.log_metadata_changes,
        );

        log::debug!(
            "[ImaginaryWorldProvider::new] '{}' created ({}), {} reference(s) to backing store",
            name,
            if backing.is_void() { "void" } else { "templated" },
            references
        );

        Self {
            backing,
            ref_count,
            name,
            path,
            logger,
            run_state,
            options,
            world_data,
            state: ProviderState::Open,
        }
    }

    /// New provider over the same backing store and reference count, with
    /// fresh metadata named `display_name`
    pub fn clone_with(&self, display_name: impl Into<String>) -> StorageResult<Self> {
        self.ensure_open("clone_with")?;
        if let Some(shared) = self.backing.shared() {
            if shared.is_released() {
                return Err(StorageError::BackingStoreReleased);
            }
        }

        Ok(Self::new(
            self.backing.clone(),
            self.ref_count.clone(),
            display_name,
            self.path.clone(),
            None,
            self.run_state.clone(),
            ProviderOptions {
                warn_on_path_access: false,
                log_on_close: false,
                log_metadata_changes: self.options.log_metadata_changes,
            },
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ProviderState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == ProviderState::Closed
    }

    pub fn backing_store(&self) -> &BackingStore {
        &self.backing
    }

    pub fn ref_count(&self) -> &ProviderRefCount {
        &self.ref_count
    }

    pub fn options(&self) -> ProviderOptions {
        self.options
    }

    /// The metadata record, with its change log
    pub fn imaginary_data(&self) -> &ImaginaryWorldData {
        &self.world_data
    }

    fn ensure_open(&self, operation: &'static str) -> StorageResult<()> {
        match self.state {
            ProviderState::Open => Ok(()),
            ProviderState::Closed => Err(StorageError::Closed {
                name: self.name.clone(),
                operation,
            }),
        }
    }
}

impl fmt::Debug for ImaginaryWorldProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImaginaryWorldProvider")
            .field("name", &self.name)
            .field("backing", &self.backing)
            .field("references", &self.ref_count.count())
            .field("path", &self.path)
            .field("options", &self.options)
            .field("state", &self.state)
            .finish()
    }
}

impl WorldProvider for ImaginaryWorldProvider {
    fn world_min_y(&self) -> i32 {
        match &self.backing {
            BackingStore::Void => 0,
            BackingStore::Shared(shared) => shared.world_min_y(),
        }
    }

    fn world_max_y(&self) -> i32 {
        match &self.backing {
            BackingStore::Void => 0,
            BackingStore::Shared(shared) => shared.world_max_y(),
        }
    }

    fn path(&self) -> StorageResult<PathBuf> {
        let path = match &self.backing {
            BackingStore::Shared(shared) => match shared.with_provider(|provider| provider.path()) {
                Err(StorageError::BackingStoreReleased) => shared
                    .cached_path()
                    .ok_or(StorageError::BackingStoreReleased)?,
                other => other?,
            },
            BackingStore::Void => self.path.clone().ok_or_else(|| StorageError::NoPath {
                name: self.name.clone(),
            })?,
        };

        if self.options.warn_on_path_access {
            self.logger.warning(&format!(
                "path() called on imaginary world provider: {}",
                path.display()
            ));
        }
        Ok(path)
    }

    fn load_chunk(&mut self, x: i32, z: i32) -> StorageResult<Option<LoadedChunkData>> {
        self.ensure_open("load_chunk")?;
        match &self.backing {
            BackingStore::Void => Ok(None),
            BackingStore::Shared(shared) => shared.with_provider(|provider| provider.load_chunk(x, z)),
        }
    }

    /// Discards the write. Dirty flags are currently inert.
    fn save_chunk(&mut self, x: i32, z: i32, _data: &ChunkData, dirty_flags: u32) -> StorageResult<()> {
        self.ensure_open("save_chunk")?;
        log::trace!(
            "[ImaginaryWorldProvider::save_chunk] '{}' discarded chunk ({}, {}) flags={:#x}",
            self.name,
            x,
            z,
            dirty_flags
        );
        Ok(())
    }

    fn do_garbage_collection(&mut self) -> StorageResult<()> {
        self.ensure_open("do_garbage_collection")?;
        match &self.backing {
            BackingStore::Void => Ok(()),
            BackingStore::Shared(shared) => {
                shared.with_provider(|provider| provider.do_garbage_collection())
            }
        }
    }

    fn calculate_chunk_count(&mut self) -> StorageResult<u64> {
        self.ensure_open("calculate_chunk_count")?;
        match &self.backing {
            BackingStore::Void => Ok(0),
            BackingStore::Shared(shared) => {
                shared.with_provider(|provider| provider.calculate_chunk_count())
            }
        }
    }

    fn all_chunks(
        &mut self,
        skip_corrupted: bool,
        logger: Option<Arc<dyn WorldLogger>>,
    ) -> StorageResult<ChunkIter> {
        self.ensure_open("all_chunks")?;
        match &self.backing {
            BackingStore::Void => Err(StorageError::NoBackingStore {
                name: self.name.clone(),
            }),
            BackingStore::Shared(shared) => {
                shared.with_provider(|provider| provider.all_chunks(skip_corrupted, logger))
            }
        }
    }

    fn world_data(&self) -> &dyn WorldData {
        &self.world_data
    }

    fn world_data_mut(&mut self) -> &mut dyn WorldData {
        &mut self.world_data
    }

    /// Give back this proxy's reference to the backing store.
    ///
    /// Closing twice is a no-op. The real provider is closed by whichever
    /// proxy drops the count below one, or by any close once the host is
    /// shutting down.
    fn close(&mut self) -> StorageResult<()> {
        if self.state == ProviderState::Closed {
            self.logger
                .debug("close() called on an already closed imaginary world provider");
            return Ok(());
        }
        self.state = ProviderState::Closed;

        let shared = match &self.backing {
            BackingStore::Void => return Ok(()),
            BackingStore::Shared(shared) => Arc::clone(shared),
        };

        let remaining = match self.ref_count.release() {
            Some(remaining) => remaining,
            None => {
                self.logger
                    .warning("Backing store reference count was already zero on close");
                0
            }
        };
        let forced = !self.run_state.is_running();

        if self.options.log_on_close {
            self.logger.debug(&format!(
                "Closed imaginary world provider, {} reference(s) to original remain",
                remaining
            ));
        }

        if remaining < 1 || forced {
            self.logger.debug(&format!(
                "Closing {}original world provider: {}",
                if forced { "(force) " } else { "" },
                shared.display_path()
            ));
            shared.release()?;
        }
        Ok(())
    }

    fn as_imaginary(&self) -> Option<&ImaginaryWorldProvider> {
        Some(self)
    }
}

impl Drop for ImaginaryWorldProvider {
    fn drop(&mut self) {
        if self.state == ProviderState::Closed || self.backing.is_void() {
            return;
        }
        log::warn!(
            "[ImaginaryWorldProvider::drop] '{}' dropped without close(), closing now",
            self.name
        );
        if let Err(e) = self.close() {
            log::error!(
                "[ImaginaryWorldProvider::drop] Failed to close '{}': {}",
                self.name,
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryProvider, RecordingLogger};
    use crate::world::core::ChunkPos;
    use crate::world::metadata::{ChangeValue, MetadataField, WorldMetadataSnapshot};
    use crate::world::storage::dirty_flags;
    use cgmath::Point3;

    fn void_provider(path: Option<PathBuf>, logger: Arc<RecordingLogger>) -> ImaginaryWorldProvider {
        ImaginaryWorldProvider::new(
            BackingStore::Void,
            ProviderRefCount::new(),
            "lobby",
            path,
            Some(logger),
            RunState::new(),
            ProviderOptions::default(),
        )
    }

    fn arena_store() -> (BackingStore, crate::test_support::Counter) {
        let provider = MemoryProvider::new("/data/worlds/arena")
            .with_bounds(-64, 320)
            .with_chunk(ChunkPos::new(0, 0), ChunkData::new(vec![1, 2, 3], true))
            .with_chunk(ChunkPos::new(1, -1), ChunkData::new(vec![4], true))
            .with_metadata(WorldMetadataSnapshot {
                name: "arena".to_string(),
                seed: 99,
                time: 1200,
                spawn: Point3::new(4.0, 70.0, 4.0),
                difficulty: 1,
                ..WorldMetadataSnapshot::default()
            });
        let closes = provider.close_counter();
        (BackingStore::from_provider(Box::new(provider)), closes)
    }

    fn templated(
        backing: BackingStore,
        ref_count: ProviderRefCount,
        run_state: RunState,
        options: ProviderOptions,
        logger: Arc<RecordingLogger>,
    ) -> ImaginaryWorldProvider {
        ImaginaryWorldProvider::new(
            backing,
            ref_count,
            "arena_copy1",
            Some(PathBuf::from("/data/worlds/arena")),
            Some(logger),
            run_state,
            options,
        )
    }

    #[test]
    fn test_void_world_reads_degrade_to_empty() {
        let mut provider = void_provider(None, Arc::new(RecordingLogger::default()));

        assert_eq!(provider.world_min_y(), 0);
        assert_eq!(provider.world_max_y(), 0);
        assert_eq!(
            provider.load_chunk(0, 0).expect("Void load should succeed"),
            None
        );
        assert_eq!(
            provider
                .calculate_chunk_count()
                .expect("Void count should succeed"),
            0
        );
        provider
            .do_garbage_collection()
            .expect("Void gc should succeed");
    }

    #[test]
    fn test_void_world_without_path_fails_loudly() {
        let provider = void_provider(None, Arc::new(RecordingLogger::default()));
        assert!(matches!(provider.path(), Err(StorageError::NoPath { .. })));
    }

    #[test]
    fn test_void_world_uses_explicit_path() {
        let provider = void_provider(
            Some(PathBuf::from("/tmp/lobby")),
            Arc::new(RecordingLogger::default()),
        );
        assert_eq!(
            provider.path().expect("Explicit path should be returned"),
            PathBuf::from("/tmp/lobby")
        );
    }

    #[test]
    fn test_void_world_cannot_enumerate_chunks() {
        let mut provider = void_provider(None, Arc::new(RecordingLogger::default()));
        assert!(matches!(
            provider.all_chunks(false, None),
            Err(StorageError::NoBackingStore { .. })
        ));
    }

    #[test]
    fn test_void_world_save_is_discarded() {
        let mut provider = void_provider(None, Arc::new(RecordingLogger::default()));
        provider
            .save_chunk(0, 0, &ChunkData::new(vec![9; 16], true), dirty_flags::ALL)
            .expect("Save should be accepted");
        assert_eq!(provider.load_chunk(0, 0).expect("Load should succeed"), None);
    }

    #[test]
    fn test_void_world_close_is_noop() {
        let ref_count = ProviderRefCount::new();
        let mut provider = ImaginaryWorldProvider::new(
            BackingStore::Void,
            ref_count.clone(),
            "lobby",
            None,
            None,
            RunState::new(),
            ProviderOptions::default(),
        );
        assert_eq!(ref_count.count(), 1);

        provider.close().expect("Void close should succeed");
        assert!(provider.is_closed());
        assert_eq!(ref_count.count(), 1);
    }

    #[test]
    fn test_templated_world_delegates_reads() {
        let (backing, _) = arena_store();
        let mut provider = templated(
            backing,
            ProviderRefCount::new(),
            RunState::new(),
            ProviderOptions::default(),
            Arc::new(RecordingLogger::default()),
        );

        assert_eq!(provider.world_min_y(), -64);
        assert_eq!(provider.world_max_y(), 320);
        assert_eq!(
            provider.calculate_chunk_count().expect("Count should succeed"),
            2
        );
        let loaded = provider
            .load_chunk(0, 0)
            .expect("Load should succeed")
            .expect("Chunk should exist in the template");
        assert_eq!(loaded.data.payload, vec![1, 2, 3]);

        let chunks: Vec<_> = provider
            .all_chunks(false, None)
            .expect("Enumeration should succeed")
            .collect::<StorageResult<_>>()
            .expect("Chunks should not be corrupted");
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn test_templated_world_never_forwards_writes() {
        let provider = MemoryProvider::new("/data/worlds/arena")
            .with_chunk(ChunkPos::new(0, 0), ChunkData::new(vec![1, 2, 3], true));
        let saves = provider.save_counter();
        let mut proxy = templated(
            BackingStore::from_provider(Box::new(provider)),
            ProviderRefCount::new(),
            RunState::new(),
            ProviderOptions::default(),
            Arc::new(RecordingLogger::default()),
        );

        for flags in [0, dirty_flags::TERRAIN, dirty_flags::ALL] {
            proxy
                .save_chunk(0, 0, &ChunkData::new(vec![7; 4], false), flags)
                .expect("Save should be accepted");
            proxy
                .save_chunk(5, 5, &ChunkData::new(vec![7; 4], false), flags)
                .expect("Save should be accepted");
        }

        let loaded = proxy
            .load_chunk(0, 0)
            .expect("Load should succeed")
            .expect("Template chunk should still exist");
        assert_eq!(loaded.data.payload, vec![1, 2, 3]);
        assert_eq!(proxy.load_chunk(5, 5).expect("Load should succeed"), None);
        assert_eq!(saves.get(), 0);
    }

    #[test]
    fn test_garbage_collection_reaches_real_provider() {
        let provider = MemoryProvider::new("/data/worlds/arena");
        let gc_runs = provider.gc_counter();
        let mut proxy = templated(
            BackingStore::from_provider(Box::new(provider)),
            ProviderRefCount::new(),
            RunState::new(),
            ProviderOptions::default(),
            Arc::new(RecordingLogger::default()),
        );

        proxy.do_garbage_collection().expect("GC should succeed");
        proxy.do_garbage_collection().expect("GC should succeed");
        assert_eq!(gc_runs.get(), 2);
        proxy.close().expect("Close should succeed");
    }

    #[test]
    fn test_metadata_copied_from_template_except_name() {
        let (backing, _) = arena_store();
        let provider = templated(
            backing,
            ProviderRefCount::new(),
            RunState::new(),
            ProviderOptions::default(),
            Arc::new(RecordingLogger::default()),
        );
        let data = provider.world_data();
        assert_eq!(data.name(), "arena_copy1");
        assert_eq!(data.seed(), 99);
        assert_eq!(data.time(), 1200);
        assert_eq!(data.spawn(), Point3::new(4.0, 70.0, 4.0));
        assert_eq!(data.difficulty(), 1);
        assert_eq!(data.generator(), "flat");
    }

    #[test]
    fn test_metadata_writes_stay_in_memory() {
        let (backing, _) = arena_store();
        let mut proxy = templated(
            backing,
            ProviderRefCount::new(),
            RunState::new(),
            ProviderOptions::default(),
            Arc::new(RecordingLogger::default()),
        );

        proxy.world_data_mut().set_time(5);
        proxy.world_data_mut().set_time(9);
        proxy
            .world_data_mut()
            .save()
            .expect("Imaginary save should succeed");

        assert_eq!(proxy.world_data().time(), 9);
        assert_eq!(
            proxy.imaginary_data().changes().get(MetadataField::Time),
            Some(&ChangeValue::Integer(9))
        );
        let source = proxy
            .backing_store()
            .shared()
            .expect("Templated provider should have a backing store")
            .metadata_snapshot()
            .expect("Backing store should still be open");
        assert_eq!(source.time, 1200);

        let sibling = proxy.clone_with("sibling").expect("Clone should succeed");
        assert_eq!(sibling.world_data().time(), 1200);
        assert!(sibling.imaginary_data().changes().is_empty());
    }

    #[test]
    fn test_clone_with_shares_store_and_count() {
        let (backing, _) = arena_store();
        let ref_count = ProviderRefCount::new();
        let original = templated(
            backing,
            ref_count.clone(),
            RunState::new(),
            ProviderOptions::default(),
            Arc::new(RecordingLogger::default()),
        );

        let copy = original
            .clone_with("arena_copy2")
            .expect("Clone of an open provider should succeed");

        assert_eq!(ref_count.count(), 2);
        assert!(copy.ref_count().shares_cell_with(&ref_count));
        assert_eq!(copy.world_data().name(), "arena_copy2");
        assert_eq!(copy.world_data().seed(), 99);
        match (original.backing_store(), copy.backing_store()) {
            (BackingStore::Shared(a), BackingStore::Shared(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("Both providers should share the backing store"),
        }
    }

    #[test]
    fn test_clone_with_does_not_inherit_path_warning() {
        let (backing, _) = arena_store();
        let original = templated(
            backing,
            ProviderRefCount::new(),
            RunState::new(),
            ProviderOptions {
                warn_on_path_access: true,
                log_on_close: true,
                log_metadata_changes: false,
            },
            Arc::new(RecordingLogger::default()),
        );
        let copy = original.clone_with("arena_copy2").expect("Clone should succeed");
        assert!(!copy.options().warn_on_path_access);
        assert!(!copy.options().log_on_close);
        assert!(!copy.options().log_metadata_changes);
    }

    #[test]
    fn test_family_releases_real_provider_once_on_last_close() {
        let (backing, closes) = arena_store();
        let ref_count = ProviderRefCount::new();
        let mut first = templated(
            backing,
            ref_count.clone(),
            RunState::new(),
            ProviderOptions::default(),
            Arc::new(RecordingLogger::default()),
        );

        let mut family: Vec<_> = (0..3)
            .map(|i| {
                first
                    .clone_with(format!("arena_copy{}", i + 2))
                    .expect("Clone should succeed")
            })
            .collect();
        assert_eq!(ref_count.count(), 4);

        first.close().expect("Close should succeed");
        for provider in family.iter_mut() {
            assert_eq!(closes.get(), 0);
            provider.close().expect("Close should succeed");
        }

        assert_eq!(closes.get(), 1);
        assert_eq!(ref_count.count(), 0);
        assert_eq!(
            first.path().expect("Path should outlive the backing store"),
            PathBuf::from("/data/worlds/arena")
        );
    }

    #[test]
    fn test_concurrent_closes_release_once() {
        let (backing, closes) = arena_store();
        let ref_count = ProviderRefCount::new();
        let first = templated(
            backing,
            ref_count.clone(),
            RunState::new(),
            ProviderOptions::default(),
            Arc::new(RecordingLogger::default()),
        );

        let mut family: Vec<_> = (0..31)
            .map(|i| {
                first
                    .clone_with(format!("arena_copy{}", i + 2))
                    .expect("Clone should succeed")
            })
            .collect();
        family.push(first);
        assert_eq!(ref_count.count(), 32);

        let handles: Vec<_> = family
            .into_iter()
            .map(|mut provider| {
                std::thread::spawn(move || provider.close().expect("Close should succeed"))
            })
            .collect();
        for handle in handles {
            handle.join().expect("Closing thread panicked");
        }

        assert_eq!(closes.get(), 1);
        assert_eq!(ref_count.count(), 0);
    }

    #[test]
    fn test_concurrent_clone_and_close_keep_store_alive() {
        let (backing, closes) = arena_store();
        let ref_count = ProviderRefCount::new();
        let mut first = templated(
            backing,
            ref_count.clone(),
            RunState::new(),
            ProviderOptions::default(),
            Arc::new(RecordingLogger::default()),
        );

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let first = &first;
                scope.spawn(move || {
                    for round in 0..50 {
                        let mut copy = first
                            .clone_with(format!("arena_{}_{}", worker, round))
                            .expect("Clone should succeed while the first copy is open");
                        copy.close().expect("Close should succeed");
                    }
                });
            }
        });

        assert_eq!(closes.get(), 0);
        assert_eq!(ref_count.count(), 1);
        first.close().expect("Close should succeed");
        assert_eq!(closes.get(), 1);
        assert_eq!(ref_count.count(), 0);
    }

    #[test]
    fn test_double_close_does_not_double_release() {
        let (backing, closes) = arena_store();
        let ref_count = ProviderRefCount::new();
        let mut first = templated(
            backing,
            ref_count.clone(),
            RunState::new(),
            ProviderOptions::default(),
            Arc::new(RecordingLogger::default()),
        );
        let mut second = first.clone_with("arena_copy2").expect("Clone should succeed");

        first.close().expect("Close should succeed");
        first.close().expect("Second close should be a no-op");
        assert_eq!(ref_count.count(), 1);
        assert_eq!(closes.get(), 0);

        second.close().expect("Close should succeed");
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_forced_close_releases_during_shutdown() {
        let (backing, closes) = arena_store();
        let run_state = RunState::new();
        let logger = Arc::new(RecordingLogger::default());
        let mut first = templated(
            backing,
            ProviderRefCount::new(),
            run_state.clone(),
            ProviderOptions::default(),
            logger.clone(),
        );
        let mut second = first.clone_with("arena_copy2").expect("Clone should succeed");

        run_state.begin_shutdown();
        first.close().expect("Forced close should succeed");
        assert_eq!(closes.get(), 1);
        assert!(logger
            .debug_messages()
            .iter()
            .any(|message| message.contains("(force)")));

        assert!(matches!(
            second.load_chunk(0, 0),
            Err(StorageError::BackingStoreReleased)
        ));
        second.close().expect("Close after forced release should succeed");
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_closed_provider_rejects_storage_calls() {
        let (backing, _) = arena_store();
        let mut provider = templated(
            backing,
            ProviderRefCount::new(),
            RunState::new(),
            ProviderOptions::default(),
            Arc::new(RecordingLogger::default()),
        );
        provider.close().expect("Close should succeed");

        assert_eq!(provider.state(), ProviderState::Closed);
        assert!(matches!(
            provider.load_chunk(0, 0),
            Err(StorageError::Closed { operation: "load_chunk", .. })
        ));
        assert!(matches!(
            provider.save_chunk(0, 0, &ChunkData::default(), 0),
            Err(StorageError::Closed { .. })
        ));
        assert!(matches!(
            provider.clone_with("late"),
            Err(StorageError::Closed { .. })
        ));
        assert_eq!(provider.world_min_y(), -64);
        assert_eq!(provider.world_data().name(), "arena_copy1");
    }

    #[test]
    fn test_path_warning_gate() {
        let (backing, _) = arena_store();
        let quiet_logger = Arc::new(RecordingLogger::default());
        let quiet = templated(
            backing.clone(),
            ProviderRefCount::new(),
            RunState::new(),
            ProviderOptions::default(),
            quiet_logger.clone(),
        );
        for _ in 0..3 {
            assert_eq!(
                quiet.path().expect("Templated path should resolve"),
                PathBuf::from("/data/worlds/arena")
            );
        }
        assert_eq!(quiet_logger.warning_count(), 0);

        let loud_logger = Arc::new(RecordingLogger::default());
        let loud = templated(
            backing,
            ProviderRefCount::new(),
            RunState::new(),
            ProviderOptions {
                warn_on_path_access: true,
                ..ProviderOptions::default()
            },
            loud_logger.clone(),
        );
        for expected in 1..=3 {
            loud.path().expect("Templated path should resolve");
            assert_eq!(loud_logger.warning_count(), expected);
        }
    }

    #[test]
    fn test_log_on_close_reports_remaining_references() {
        let (backing, _) = arena_store();
        let logger = Arc::new(RecordingLogger::default());
        let mut first = templated(
            backing,
            ProviderRefCount::new(),
            RunState::new(),
            ProviderOptions {
                log_on_close: true,
                ..ProviderOptions::default()
            },
            logger.clone(),
        );
        let mut second = first.clone_with("arena_copy2").expect("Clone should succeed");

        first.close().expect("Close should succeed");
        assert!(logger
            .debug_messages()
            .iter()
            .any(|message| message.contains("1 reference(s)")));
        second.close().expect("Close should succeed");
    }

    #[test]
    fn test_drop_without_close_gives_back_reference() {
        let (backing, closes) = arena_store();
        let ref_count = ProviderRefCount::new();
        let first = templated(
            backing,
            ref_count.clone(),
            RunState::new(),
            ProviderOptions::default(),
            Arc::new(RecordingLogger::default()),
        );
        let copy = first.clone_with("arena_copy2").expect("Clone should succeed");
        drop(copy);
        assert_eq!(ref_count.count(), 1);

        drop(first);
        assert_eq!(ref_count.count(), 0);
        assert_eq!(closes.get(), 1);
    }
}

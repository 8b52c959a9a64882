//! Shared ownership of a real provider
//!
//! Template clones all point at one real provider. [`SharedProvider`] owns it
//! behind a lock and releases it at most once; [`ProviderRefCount`] counts the
//! imaginary providers that still hold it.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{StorageError, StorageResult, WorldProvider};
use crate::world::metadata::WorldMetadataSnapshot;

/// Number of live imaginary providers pointing at one backing store.
///
/// Clones share the same counter cell.
#[derive(Debug, Clone, Default)]
pub struct ProviderRefCount {
    count: Arc<AtomicUsize>,
}

impl ProviderRefCount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a reference, returning the new count
    pub fn acquire(&self) -> usize {
        self.count.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Drop a reference, returning the new count.
    ///
    /// Returns `None` without touching the counter if it is already zero.
    pub fn release(&self) -> Option<usize> {
        self.count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                count.checked_sub(1)
            })
            .ok()
            .map(|previous| previous - 1)
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub fn shares_cell_with(&self, other: &ProviderRefCount) -> bool {
        Arc::ptr_eq(&self.count, &other.count)
    }
}

/// Real provider shared between template clones
pub struct SharedProvider {
    provider: Mutex<Box<dyn WorldProvider>>,
    released: AtomicBool,
    min_y: i32,
    max_y: i32,
    path: Option<PathBuf>,
}

impl SharedProvider {
    pub fn new(provider: Box<dyn WorldProvider>) -> Arc<Self> {
        Arc::new(Self {
            min_y: provider.world_min_y(),
            max_y: provider.world_max_y(),
            path: provider.path().ok(),
            provider: Mutex::new(provider),
            released: AtomicBool::new(false),
        })
    }

    /// Run `f` against the real provider unless it has been released
    pub fn with_provider<R>(
        &self,
        f: impl FnOnce(&mut dyn WorldProvider) -> StorageResult<R>,
    ) -> StorageResult<R> {
        let mut provider = self.provider.lock();
        if self.released.load(Ordering::Acquire) {
            return Err(StorageError::BackingStoreReleased);
        }
        f(&mut **provider)
    }

    /// Current metadata of the real provider, `None` once released
    pub fn metadata_snapshot(&self) -> Option<WorldMetadataSnapshot> {
        self.with_provider(|provider| Ok(WorldMetadataSnapshot::capture(provider.world_data())))
            .ok()
    }

    pub fn world_min_y(&self) -> i32 {
        self.min_y
    }

    pub fn world_max_y(&self) -> i32 {
        self.max_y
    }

    /// Path reported by the real provider when it was shared
    pub fn cached_path(&self) -> Option<PathBuf> {
        self.path.clone()
    }

    /// Path for log messages
    pub fn display_path(&self) -> String {
        self.path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<unknown>".to_string())
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Close the real provider.
    ///
    /// Returns `Ok(false)` if it had already been released.
    pub fn release(&self) -> StorageResult<bool> {
        let mut provider = self.provider.lock();
        if self.released.swap(true, Ordering::AcqRel) {
            return Ok(false);
        }
        provider.close()?;
        Ok(true)
    }
}

impl fmt::Debug for SharedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedProvider")
            .field("path", &self.path)
            .field("min_y", &self.min_y)
            .field("max_y", &self.max_y)
            .field("released", &self.is_released())
            .finish()
    }
}

/// What an imaginary provider stores into
#[derive(Debug, Clone)]
pub enum BackingStore {
    /// Nothing: a void world
    Void,
    /// A real provider, possibly shared with other clones
    Shared(Arc<SharedProvider>),
}

impl BackingStore {
    pub fn from_provider(provider: Box<dyn WorldProvider>) -> Self {
        BackingStore::Shared(SharedProvider::new(provider))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, BackingStore::Void)
    }

    pub fn shared(&self) -> Option<&Arc<SharedProvider>> {
        match self {
            BackingStore::Void => None,
            BackingStore::Shared(shared) => Some(shared),
        }
    }
}

//! World object
//!
//! Associates an id and display name with the storage provider backing the
//! world and the async pool it submits background work to.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::thread_pool::{self, AsyncPool};
use crate::world::storage::{ImaginaryWorldProvider, StorageResult, WorldProvider};

/// Numeric world identifier allocated by the host
pub type WorldId = u32;

pub struct World {
    id: WorldId,
    /// Storage folder the world was opened from; template folder for clones
    folder_name: String,
    display_name: String,
    provider: Mutex<Box<dyn WorldProvider>>,
    async_pool: Arc<AsyncPool>,
    closed: AtomicBool,
}

impl World {
    pub fn new(
        id: WorldId,
        folder_name: impl Into<String>,
        display_name: impl Into<String>,
        provider: Box<dyn WorldProvider>,
        async_pool: Arc<AsyncPool>,
    ) -> Self {
        Self {
            id,
            folder_name: folder_name.into(),
            display_name: display_name.into(),
            provider: Mutex::new(provider),
            async_pool,
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> WorldId {
        self.id
    }

    pub fn folder_name(&self) -> &str {
        &self.folder_name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn async_pool(&self) -> &Arc<AsyncPool> {
        &self.async_pool
    }

    /// Whether the world is backed by an imaginary provider
    pub fn is_imaginary(&self) -> bool {
        self.provider.lock().as_imaginary().is_some()
    }

    /// Whether the world can still serve storage calls.
    ///
    /// False once the world is closed, or once the real provider behind an
    /// imaginary world has been released.
    pub fn is_open(&self) -> bool {
        if self.closed.load(Ordering::Acquire) {
            return false;
        }
        let provider = self.provider.lock();
        match provider.as_imaginary() {
            Some(imaginary) => {
                !imaginary.is_closed()
                    && !imaginary
                        .backing_store()
                        .shared()
                        .map_or(false, |shared| shared.is_released())
            }
            None => true,
        }
    }

    /// Run `f` with exclusive access to the storage provider
    pub fn with_provider<R>(&self, f: impl FnOnce(&mut dyn WorldProvider) -> R) -> R {
        let mut provider = self.provider.lock();
        f(&mut **provider)
    }

    /// Clone the imaginary provider behind this world.
    ///
    /// `None` if the world is backed by a real provider.
    pub fn clone_imaginary(
        &self,
        display_name: &str,
    ) -> Option<StorageResult<ImaginaryWorldProvider>> {
        let provider = self.provider.lock();
        provider
            .as_imaginary()
            .map(|imaginary| imaginary.clone_with(display_name))
    }

    pub fn save_metadata(&self) -> StorageResult<()> {
        self.with_provider(|provider| provider.world_data_mut().save())
    }

    pub fn close(&self) -> StorageResult<()> {
        log::debug!("[World::close] Closing world {} '{}'", self.id, self.display_name);
        self.closed.store(true, Ordering::Release);
        self.with_provider(|provider| provider.close())
    }

    /// Queue background work on the world's async pool
    pub fn submit_task<F: FnOnce() + Send + 'static>(&self, task: F) {
        thread_pool::submit(&self.async_pool, task);
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("id", &self.id)
            .field("folder_name", &self.folder_name)
            .field("display_name", &self.display_name)
            .field("closed", &self.closed.load(Ordering::Acquire))
            // None while the provider is borrowed, e.g. from inside with_provider
            .field(
                "imaginary",
                &self
                    .provider
                    .try_lock()
                    .map(|provider| provider.as_imaginary().is_some()),
            )
            .finish()
    }
}

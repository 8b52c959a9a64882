//! World management
//!
//! [`WorldHost`] is everything imaginary worlds need from the host: the
//! generation check, provider matching, the live-world registry and id
//! allocation. [`WorldManager`] is an in-memory host implementing it.

pub mod imaginary_world;
mod world;
mod world_manager;

use std::path::Path;
use std::sync::Arc;

use parking_lot::MutexGuard;

pub use imaginary_world::{create_templated, create_void};
pub use world::{World, WorldId};
pub use world_manager::WorldManager;

use crate::thread_pool::AsyncPool;
use crate::world::core::RunState;
use crate::world::storage::ProviderFactory;
use crate::ImaginaryConfig;

/// Host services consumed by the imaginary world factory
pub trait WorldHost: Send + Sync {
    fn data_path(&self) -> &Path;
    fn config(&self) -> &ImaginaryConfig;
    fn run_state(&self) -> RunState;

    /// Whether storage for `folder` exists
    fn is_world_generated(&self, folder: &str) -> bool;

    /// Open world registered under `name`. Closed worlds and worlds whose
    /// backing store was released do not count.
    fn world_by_name(&self, name: &str) -> Option<Arc<World>>;

    /// Provider implementations able to open the folder at `path`
    fn matching_providers(&self, path: &Path) -> Vec<Arc<dyn ProviderFactory>>;

    fn allocate_world_id(&self) -> WorldId;
    fn register_world(&self, world: Arc<World>);

    /// Held from the registry lookup until the new world is registered, so
    /// concurrent creations of one folder share a single real provider
    fn lock_world_creation(&self) -> MutexGuard<'_, ()>;

    fn async_pool(&self) -> Arc<AsyncPool>;
}

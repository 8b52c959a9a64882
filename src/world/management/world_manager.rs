//! World Manager - reference host
//!
//! Keeps the registry of live worlds, the provider factories that can open
//! world folders and the async pool every world shares.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RwLock};

use super::{World, WorldHost, WorldId};
use crate::error::{ImaginaryError, ImaginaryResult, OptionExt};
use crate::logging::{PrefixedLogger, WorldLogger};
use crate::thread_pool::{create_async_pool, AsyncPool, AsyncPoolConfig};
use crate::world::core::RunState;
use crate::world::storage::ProviderFactory;
use crate::ImaginaryConfig;

pub struct WorldManager {
    data_path: PathBuf,
    config: ImaginaryConfig,
    run_state: RunState,
    factories: RwLock<Vec<Arc<dyn ProviderFactory>>>,
    worlds: RwLock<HashMap<WorldId, Arc<World>>>,
    next_world_id: AtomicU32,
    creation: Mutex<()>,
    async_pool: Arc<AsyncPool>,
}

impl WorldManager {
    pub fn new(data_path: impl Into<PathBuf>, config: ImaginaryConfig) -> ImaginaryResult<Self> {
        config.validate()?;

        let pool_config = AsyncPoolConfig {
            worker_count: config.async_workers,
            ..AsyncPoolConfig::default()
        };
        let async_pool = create_async_pool(pool_config).map_err(|e| ImaginaryError::InvalidConfig {
            field: "async_workers".to_string(),
            value: config.async_workers.to_string(),
            reason: e.to_string(),
        })?;

        let data_path = data_path.into();
        log::info!(
            "[WorldManager::new] Hosting worlds under {}",
            data_path.join(&config.worlds_dir).display()
        );

        Ok(Self {
            data_path,
            config,
            run_state: RunState::new(),
            factories: RwLock::new(Vec::new()),
            worlds: RwLock::new(HashMap::new()),
            next_world_id: AtomicU32::new(1),
            creation: Mutex::new(()),
            async_pool: Arc::new(async_pool),
        })
    }

    /// Make a provider implementation available for opening world folders
    pub fn register_factory(&self, factory: Arc<dyn ProviderFactory>) {
        log::debug!("[WorldManager::register_factory] Registered '{}'", factory.name());
        self.factories.write().push(factory);
    }

    pub fn world_path(&self, folder: &str) -> PathBuf {
        self.data_path.join(&self.config.worlds_dir).join(folder)
    }

    pub fn world(&self, id: WorldId) -> Option<Arc<World>> {
        self.worlds.read().get(&id).cloned()
    }

    /// Live worlds, ordered by id
    pub fn worlds(&self) -> Vec<Arc<World>> {
        let mut worlds: Vec<_> = self.worlds.read().values().cloned().collect();
        worlds.sort_by_key(|world| world.id());
        worlds
    }

    /// Open `folder` as an ordinary writable world.
    ///
    /// Returns the live world if the folder is already loaded as one.
    pub fn load_world(&self, folder: &str) -> ImaginaryResult<Arc<World>> {
        let _creation = self.lock_world_creation();
        if let Some(loaded) = self.world_by_name(folder) {
            if loaded.is_imaginary() {
                return Err(ImaginaryError::AlreadyWritable {
                    folder: folder.to_string(),
                });
            }
            return Ok(loaded);
        }
        if !self.is_world_generated(folder) {
            return Err(ImaginaryError::UnknownTemplate {
                folder: folder.to_string(),
            });
        }

        let path = self.world_path(folder);
        let factory = self
            .matching_providers(&path)
            .into_iter()
            .next()
            .ok_or_imaginary(|| ImaginaryError::NoMatchingProvider { path: path.clone() })?;
        let logger: Arc<dyn WorldLogger> =
            Arc::new(PrefixedLogger::new(format!("World Provider: {}", folder)));
        let provider = factory.from_path(&path, logger)?;

        let world = Arc::new(World::new(
            self.allocate_world_id(),
            folder,
            folder,
            provider,
            Arc::clone(&self.async_pool),
        ));
        self.register_world(Arc::clone(&world));
        log::info!("[WorldManager::load_world] Loaded world {} '{}'", world.id(), folder);
        Ok(world)
    }

    /// Unregister world `id` and close it
    pub fn unload_world(&self, id: WorldId) -> ImaginaryResult<()> {
        let world = self
            .worlds
            .write()
            .remove(&id)
            .ok_or_imaginary(|| ImaginaryError::WorldNotFound { id })?;
        log::info!(
            "[WorldManager::unload_world] Unloading world {} '{}'",
            id,
            world.display_name()
        );
        world.close()?;
        Ok(())
    }

    /// Stop the host and close every registered world.
    ///
    /// Every world is closed even if some fail; the first failure is returned.
    pub fn shutdown(&self) -> ImaginaryResult<()> {
        self.run_state.begin_shutdown();

        let mut worlds: Vec<_> = self.worlds.write().drain().map(|(_, world)| world).collect();
        worlds.sort_by_key(|world| world.id());
        log::info!("[WorldManager::shutdown] Closing {} world(s)", worlds.len());

        let mut first_error = None;
        for world in worlds {
            if let Err(e) = world.close() {
                log::error!(
                    "[WorldManager::shutdown] Failed to close world {} '{}': {}",
                    world.id(),
                    world.display_name(),
                    e
                );
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

impl WorldHost for WorldManager {
    fn data_path(&self) -> &Path {
        &self.data_path
    }

    fn config(&self) -> &ImaginaryConfig {
        &self.config
    }

    fn run_state(&self) -> RunState {
        self.run_state.clone()
    }

    fn is_world_generated(&self, folder: &str) -> bool {
        !folder.is_empty() && self.world_path(folder).is_dir()
    }

    /// Lowest-id open world opened from `name`
    fn world_by_name(&self, name: &str) -> Option<Arc<World>> {
        // Registry lock is released before any provider lock is taken
        let candidates: Vec<_> = self
            .worlds
            .read()
            .values()
            .filter(|world| world.folder_name() == name)
            .cloned()
            .collect();
        candidates
            .into_iter()
            .filter(|world| world.is_open())
            .min_by_key(|world| world.id())
    }

    fn matching_providers(&self, path: &Path) -> Vec<Arc<dyn ProviderFactory>> {
        self.factories
            .read()
            .iter()
            .filter(|factory| factory.is_valid(path))
            .cloned()
            .collect()
    }

    fn allocate_world_id(&self) -> WorldId {
        self.next_world_id.fetch_add(1, Ordering::Relaxed)
    }

    fn register_world(&self, world: Arc<World>) {
        log::debug!(
            "[WorldManager::register_world] Registered world {} '{}'",
            world.id(),
            world.display_name()
        );
        self.worlds.write().insert(world.id(), world);
    }

    fn lock_world_creation(&self) -> MutexGuard<'_, ()> {
        self.creation.lock()
    }

    fn async_pool(&self) -> Arc<AsyncPool> {
        Arc::clone(&self.async_pool)
    }
}

impl std::fmt::Debug for WorldManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldManager")
            .field("data_path", &self.data_path)
            .field("config", &self.config)
            .field("running", &self.run_state.is_running())
            .field("worlds", &self.worlds.read().len())
            .finish()
    }
}

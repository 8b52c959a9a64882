//! Imaginary world lifecycle
//!
//! Two ways to get a world whose changes are never written anywhere:
//!
//! - [`create_void`] builds an empty world with no backing storage at all.
//! - [`create_templated`] builds a world that reads its terrain from an
//!   existing world folder. Every templated world made from the same folder
//!   shares one real provider; the last one to close closes it.

use std::path::PathBuf;
use std::sync::Arc;

use super::{World, WorldHost};
use crate::error::{ImaginaryError, ImaginaryResult, OptionExt};
use crate::logging::{PrefixedLogger, WorldLogger};
use crate::world::storage::{
    BackingStore, ImaginaryWorldProvider, ProviderOptions, ProviderRefCount,
};

/// Create an empty world with no backing storage.
///
/// The world is not registered with the host: it has nothing to close and may
/// have no path. The caller owns it.
pub fn create_void(host: &dyn WorldHost, display_name: &str, path: Option<PathBuf>) -> World {
    let options = ProviderOptions {
        warn_on_path_access: false,
        log_on_close: false,
        log_metadata_changes: host.config().log_metadata_changes,
    };
    let provider = ImaginaryWorldProvider::new(
        BackingStore::Void,
        ProviderRefCount::new(),
        display_name,
        path,
        None,
        host.run_state(),
        options,
    );

    let id = host.allocate_world_id();
    log::info!("[create_void] Created void world {} '{}'", id, display_name);
    World::new(
        id,
        display_name,
        display_name,
        Box::new(provider),
        host.async_pool(),
    )
}

/// Create a world that reads from the world folder `folder` and discards
/// everything written to it, then register it with the host.
///
/// Fails with [`ImaginaryError::UnknownTemplate`] if the folder holds no
/// world, [`ImaginaryError::NoMatchingProvider`] if no provider can open it
/// and [`ImaginaryError::AlreadyWritable`] if it is loaded as an ordinary
/// world.
///
/// Creation holds the host's creation lock, so concurrent calls for one
/// folder open the real provider once and share it.
pub fn create_templated(
    host: &dyn WorldHost,
    folder: &str,
    display_name: &str,
) -> ImaginaryResult<Arc<World>> {
    if !host.is_world_generated(folder) {
        return Err(ImaginaryError::UnknownTemplate {
            folder: folder.to_string(),
        });
    }

    let _creation = host.lock_world_creation();
    let config = host.config();
    let path = host.data_path().join(&config.worlds_dir).join(folder);
    let factory = host
        .matching_providers(&path)
        .into_iter()
        .next()
        .ok_or_imaginary(|| ImaginaryError::NoMatchingProvider { path: path.clone() })?;

    let provider = match host.world_by_name(folder) {
        Some(loaded) => match loaded.clone_imaginary(display_name) {
            Some(clone) => {
                log::debug!(
                    "[create_templated] '{}' shares the backing store of world {} '{}'",
                    display_name,
                    loaded.id(),
                    loaded.display_name()
                );
                clone?
            }
            None => {
                return Err(ImaginaryError::AlreadyWritable {
                    folder: folder.to_string(),
                })
            }
        },
        None => {
            let logger: Arc<dyn WorldLogger> =
                Arc::new(PrefixedLogger::new(format!("World Provider: {}", folder)));
            let real = factory.from_path(&path, logger)?;
            log::debug!(
                "[create_templated] Opened {} provider for {}",
                factory.name(),
                path.display()
            );

            ImaginaryWorldProvider::new(
                BackingStore::from_provider(real),
                ProviderRefCount::new(),
                display_name,
                Some(path),
                None,
                host.run_state(),
                ProviderOptions {
                    warn_on_path_access: config.warn_on_path_access,
                    log_on_close: config.log_on_close,
                    log_metadata_changes: config.log_metadata_changes,
                },
            )
        }
    };

    let id = host.allocate_world_id();
    let world = Arc::new(World::new(
        id,
        folder,
        display_name,
        Box::new(provider),
        host.async_pool(),
    ));
    host.register_world(Arc::clone(&world));

    log::info!(
        "[create_templated] Created world {} '{}' from template '{}'",
        id,
        display_name,
        folder
    );
    Ok(world)
}

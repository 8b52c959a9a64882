//! Void lobby
//!
//! Creates a void world, changes its metadata and shows that nothing is
//! stored anywhere: chunks stay empty and the changes live only in the
//! metadata change log.

use anyhow::Result;
use cgmath::Point3;
use imaginary_world::{
    create_void, ChunkData, ImaginaryConfig, WorldData, WorldManager, WorldProvider,
};

fn main() -> Result<()> {
    imaginary_world::logging::init_from_env();

    let data_dir = tempfile::tempdir()?;
    let manager = WorldManager::new(data_dir.path(), ImaginaryConfig::default())?;

    println!("Void Lobby Example");
    println!("==================");

    let lobby = create_void(&manager, "lobby", None);
    println!("Created world {} '{}'", lobby.id(), lobby.display_name());

    lobby.with_provider(|provider| -> Result<()> {
        println!(
            "Height range: {}..{}",
            provider.world_min_y(),
            provider.world_max_y()
        );

        provider.save_chunk(0, 0, &ChunkData::new(vec![1; 16], true), 0)?;
        let loaded = provider.load_chunk(0, 0)?;
        println!("Chunk (0, 0) after save: {:?}", loaded.map(|chunk| chunk.data.payload));

        match provider.path() {
            Ok(path) => println!("Path: {}", path.display()),
            Err(e) => println!("Path: {}", e),
        }

        let metadata = provider.world_data_mut();
        metadata.set_time(6000);
        metadata.set_spawn(Point3::new(0.5, 65.0, 0.5));
        metadata.set_rain_level(0.0);
        Ok(())
    })?;

    lobby.save_metadata()?;

    let changes = lobby.with_provider(|provider| {
        provider
            .as_imaginary()
            .map(|imaginary| imaginary.imaginary_data().changes().to_json())
    });
    if let Some(json) = changes {
        println!("Metadata changes: {}", json?);
    }

    lobby.close()?;
    println!("Lobby closed, nothing was written to {}", data_dir.path().display());
    Ok(())
}

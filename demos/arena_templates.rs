//! Arena templates
//!
//! Builds a tiny on-disk "arena" world, then plays two matches in imaginary
//! copies of it. Both copies read the arena's chunks through one shared
//! provider, neither can change the files, and the provider is closed once
//! when the second copy closes.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use imaginary_world::world::storage::ChunkIter;
use imaginary_world::{
    create_templated, ChunkData, ChunkPos, ImaginaryConfig, ImaginaryWorldData, LoadedChunkData,
    ProviderFactory, StorageError, StorageResult, WorldData, WorldHost, WorldLogger, WorldManager,
    WorldProvider,
};

const LEVEL_MARKER: &str = "level.dat";
const CHUNK_EXTENSION: &str = "chunk";

/// Reads and writes one file per chunk
struct DirectoryProvider {
    path: PathBuf,
    metadata: ImaginaryWorldData,
    logger: Arc<dyn WorldLogger>,
}

impl DirectoryProvider {
    fn chunk_path(&self, x: i32, z: i32) -> PathBuf {
        self.path.join(format!("{}_{}.{}", x, z, CHUNK_EXTENSION))
    }

    fn parse_chunk_name(path: &Path) -> Option<ChunkPos> {
        if path.extension()? != CHUNK_EXTENSION {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let (x, z) = stem.split_once('_')?;
        Some(ChunkPos::new(x.parse().ok()?, z.parse().ok()?))
    }
}

impl WorldProvider for DirectoryProvider {
    fn world_min_y(&self) -> i32 {
        -64
    }

    fn world_max_y(&self) -> i32 {
        320
    }

    fn path(&self) -> StorageResult<PathBuf> {
        Ok(self.path.clone())
    }

    fn load_chunk(&mut self, x: i32, z: i32) -> StorageResult<Option<LoadedChunkData>> {
        let path = self.chunk_path(x, z);
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(LoadedChunkData {
            data: ChunkData::new(fs::read(path)?, true),
            upgraded: false,
        }))
    }

    fn save_chunk(&mut self, x: i32, z: i32, data: &ChunkData, _dirty_flags: u32) -> StorageResult<()> {
        fs::write(self.chunk_path(x, z), &data.payload)?;
        Ok(())
    }

    fn do_garbage_collection(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn calculate_chunk_count(&mut self) -> StorageResult<u64> {
        let mut count = 0;
        for entry in fs::read_dir(&self.path)? {
            if Self::parse_chunk_name(&entry?.path()).is_some() {
                count += 1;
            }
        }
        Ok(count)
    }

    fn all_chunks(
        &mut self,
        skip_corrupted: bool,
        logger: Option<Arc<dyn WorldLogger>>,
    ) -> StorageResult<ChunkIter> {
        let mut chunks = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let path = entry?.path();
            let Some(pos) = Self::parse_chunk_name(&path) else {
                continue;
            };
            match fs::read(&path) {
                Ok(payload) => chunks.push(Ok((
                    pos,
                    LoadedChunkData {
                        data: ChunkData::new(payload, true),
                        upgraded: false,
                    },
                ))),
                Err(e) if skip_corrupted => {
                    if let Some(logger) = &logger {
                        logger.warning(&format!("Skipping unreadable chunk {}: {}", pos, e));
                    }
                }
                Err(e) => chunks.push(Err(StorageError::CorruptedChunk {
                    pos,
                    reason: e.to_string(),
                })),
            }
        }
        Ok(Box::new(chunks.into_iter()))
    }

    fn world_data(&self) -> &dyn WorldData {
        &self.metadata
    }

    fn world_data_mut(&mut self) -> &mut dyn WorldData {
        &mut self.metadata
    }

    fn close(&mut self) -> StorageResult<()> {
        self.logger
            .debug(&format!("Closed directory provider for {}", self.path.display()));
        Ok(())
    }
}

struct DirectoryProviderFactory;

impl ProviderFactory for DirectoryProviderFactory {
    fn name(&self) -> &str {
        "directory"
    }

    fn is_valid(&self, path: &Path) -> bool {
        path.join(LEVEL_MARKER).is_file()
    }

    fn from_path(
        &self,
        path: &Path,
        logger: Arc<dyn WorldLogger>,
    ) -> StorageResult<Box<dyn WorldProvider>> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Box::new(DirectoryProvider {
            path: path.to_path_buf(),
            metadata: ImaginaryWorldData::new(name, None, Arc::clone(&logger), false),
            logger,
        }))
    }
}

fn build_arena(worlds_dir: &Path) -> Result<PathBuf> {
    let arena = worlds_dir.join("arena");
    fs::create_dir_all(&arena)?;
    fs::write(arena.join(LEVEL_MARKER), b"arena")?;
    for (x, z) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
        fs::write(arena.join(format!("{}_{}.{}", x, z, CHUNK_EXTENSION)), [7u8; 32])?;
    }
    Ok(arena)
}

fn main() -> Result<()> {
    imaginary_world::logging::init_from_env();

    println!("Arena Templates Example");
    println!("=======================");

    let data_dir = tempfile::tempdir()?;
    let config = ImaginaryConfig {
        log_on_close: true,
        ..ImaginaryConfig::default()
    };
    let arena = build_arena(&data_dir.path().join(&config.worlds_dir))?;

    let manager = WorldManager::new(data_dir.path(), config)?;
    manager.register_factory(Arc::new(DirectoryProviderFactory));

    let first = create_templated(&manager, "arena", "arena_match1")?;
    let second = create_templated(&manager, "arena", "arena_match2")?;
    println!(
        "Created '{}' (id {}) and '{}' (id {})",
        first.display_name(),
        first.id(),
        second.display_name(),
        second.id()
    );

    first.with_provider(|provider| -> Result<()> {
        println!("Chunks in template: {}", provider.calculate_chunk_count()?);
        // Blow a hole in the arena floor
        provider.save_chunk(0, 0, &ChunkData::new(vec![0; 32], true), 0)?;
        provider.world_data_mut().set_time(18000);
        Ok(())
    })?;

    second.with_provider(|provider| -> Result<()> {
        let chunk = provider.load_chunk(0, 0)?;
        println!(
            "Second match still sees the untouched floor: {}",
            chunk.map_or(false, |chunk| chunk.data.payload == vec![7u8; 32])
        );
        println!("Second match time: {}", provider.world_data().time());
        Ok(())
    })?;

    first.save_metadata()?;
    println!(
        "Arena floor on disk untouched: {}",
        fs::read(arena.join(format!("0_0.{}", CHUNK_EXTENSION)))? == vec![7u8; 32]
    );

    manager.unload_world(first.id())?;
    println!("Unloaded '{}'", first.display_name());
    println!(
        "'{}' still shares the provider: {}",
        second.display_name(),
        manager.world_by_name("arena").is_some()
    );

    manager.shutdown()?;
    println!("Host shut down, arena provider closed once");
    Ok(())
}

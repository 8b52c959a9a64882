//! Test doubles for the host side of storage

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::logging::WorldLogger;
use crate::world::core::{ChunkPos, SpawnPoint};
use crate::world::metadata::{WorldData, WorldMetadataSnapshot};
use crate::world::storage::{
    ChunkData, ChunkIter, LoadedChunkData, ProviderFactory, StorageResult, WorldProvider,
};

/// File whose presence marks a folder as a [`MemoryProvider`] world
pub const MEMORY_MARKER: &str = "level.mem";

/// Shared call counter
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Metadata that writes straight into a snapshot
pub struct MemoryWorldData(pub WorldMetadataSnapshot);

impl WorldData for MemoryWorldData {
    fn name(&self) -> &str {
        &self.0.name
    }
    fn set_name(&mut self, value: String) {
        self.0.name = value;
    }
    fn generator(&self) -> &str {
        "normal"
    }
    fn generator_options(&self) -> &str {
        "preset=classic"
    }
    fn seed(&self) -> i64 {
        self.0.seed
    }
    fn time(&self) -> i64 {
        self.0.time
    }
    fn set_time(&mut self, value: i64) {
        self.0.time = value;
    }
    fn spawn(&self) -> SpawnPoint {
        self.0.spawn
    }
    fn set_spawn(&mut self, pos: SpawnPoint) {
        self.0.spawn = pos;
    }
    fn difficulty(&self) -> i32 {
        self.0.difficulty
    }
    fn set_difficulty(&mut self, difficulty: i32) {
        self.0.difficulty = difficulty;
    }
    fn rain_time(&self) -> i32 {
        self.0.rain_time
    }
    fn set_rain_time(&mut self, ticks: i32) {
        self.0.rain_time = ticks;
    }
    fn rain_level(&self) -> f32 {
        self.0.rain_level
    }
    fn set_rain_level(&mut self, level: f32) {
        self.0.rain_level = level;
    }
    fn lightning_time(&self) -> i32 {
        self.0.lightning_time
    }
    fn set_lightning_time(&mut self, ticks: i32) {
        self.0.lightning_time = ticks;
    }
    fn lightning_level(&self) -> f32 {
        self.0.lightning_level
    }
    fn set_lightning_level(&mut self, level: f32) {
        self.0.lightning_level = level;
    }
    fn save(&mut self) -> StorageResult<()> {
        Ok(())
    }
}

/// Real provider kept entirely in memory, counting what reaches it
pub struct MemoryProvider {
    path: PathBuf,
    min_y: i32,
    max_y: i32,
    chunks: BTreeMap<ChunkPos, ChunkData>,
    metadata: MemoryWorldData,
    closes: Counter,
    saves: Counter,
    gc_runs: Counter,
}

impl MemoryProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            min_y: 0,
            max_y: 256,
            chunks: BTreeMap::new(),
            metadata: MemoryWorldData(WorldMetadataSnapshot::default()),
            closes: Counter::default(),
            saves: Counter::default(),
            gc_runs: Counter::default(),
        }
    }

    pub fn with_bounds(mut self, min_y: i32, max_y: i32) -> Self {
        self.min_y = min_y;
        self.max_y = max_y;
        self
    }

    pub fn with_chunk(mut self, pos: ChunkPos, data: ChunkData) -> Self {
        self.chunks.insert(pos, data);
        self
    }

    pub fn with_metadata(mut self, metadata: WorldMetadataSnapshot) -> Self {
        self.metadata = MemoryWorldData(metadata);
        self
    }

    pub fn with_close_counter(mut self, closes: Counter) -> Self {
        self.closes = closes;
        self
    }

    pub fn close_counter(&self) -> Counter {
        self.closes.clone()
    }

    pub fn save_counter(&self) -> Counter {
        self.saves.clone()
    }

    pub fn gc_counter(&self) -> Counter {
        self.gc_runs.clone()
    }
}

impl WorldProvider for MemoryProvider {
    fn world_min_y(&self) -> i32 {
        self.min_y
    }

    fn world_max_y(&self) -> i32 {
        self.max_y
    }

    fn path(&self) -> StorageResult<PathBuf> {
        Ok(self.path.clone())
    }

    fn load_chunk(&mut self, x: i32, z: i32) -> StorageResult<Option<LoadedChunkData>> {
        Ok(self
            .chunks
            .get(&ChunkPos::new(x, z))
            .cloned()
            .map(|data| LoadedChunkData {
                data,
                upgraded: false,
            }))
    }

    fn save_chunk(&mut self, x: i32, z: i32, data: &ChunkData, _dirty_flags: u32) -> StorageResult<()> {
        self.saves.bump();
        self.chunks.insert(ChunkPos::new(x, z), data.clone());
        Ok(())
    }

    fn do_garbage_collection(&mut self) -> StorageResult<()> {
        self.gc_runs.bump();
        Ok(())
    }

    fn calculate_chunk_count(&mut self) -> StorageResult<u64> {
        Ok(self.chunks.len() as u64)
    }

    fn all_chunks(
        &mut self,
        _skip_corrupted: bool,
        _logger: Option<Arc<dyn WorldLogger>>,
    ) -> StorageResult<ChunkIter> {
        let chunks: Vec<_> = self
            .chunks
            .iter()
            .map(|(pos, data)| {
                Ok((
                    *pos,
                    LoadedChunkData {
                        data: data.clone(),
                        upgraded: false,
                    },
                ))
            })
            .collect();
        Ok(Box::new(chunks.into_iter()))
    }

    fn world_data(&self) -> &dyn WorldData {
        &self.metadata
    }

    fn world_data_mut(&mut self) -> &mut dyn WorldData {
        &mut self.metadata
    }

    fn close(&mut self) -> StorageResult<()> {
        self.closes.bump();
        Ok(())
    }
}

/// Opens [`MemoryProvider`]s for folders holding [`MEMORY_MARKER`]
#[derive(Default)]
pub struct MemoryProviderFactory {
    pub opened: Counter,
    pub closes: Counter,
}

impl ProviderFactory for MemoryProviderFactory {
    fn name(&self) -> &str {
        "memory"
    }

    fn is_valid(&self, path: &Path) -> bool {
        path.join(MEMORY_MARKER).is_file()
    }

    fn from_path(
        &self,
        path: &Path,
        _logger: Arc<dyn WorldLogger>,
    ) -> StorageResult<Box<dyn WorldProvider>> {
        self.opened.bump();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let provider = MemoryProvider::new(path)
            .with_chunk(ChunkPos::new(0, 0), ChunkData::new(vec![0xAB; 8], true))
            .with_metadata(WorldMetadataSnapshot {
                name,
                seed: 7,
                time: 100,
                ..WorldMetadataSnapshot::default()
            })
            .with_close_counter(self.closes.clone());
        Ok(Box::new(provider))
    }
}

/// Logger that remembers what it was told
#[derive(Default)]
pub struct RecordingLogger {
    debug: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub fn debug_messages(&self) -> Vec<String> {
        self.debug.lock().clone()
    }

    pub fn debug_count(&self) -> usize {
        self.debug.lock().len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.lock().len()
    }
}

impl WorldLogger for RecordingLogger {
    fn debug(&self, message: &str) {
        self.debug.lock().push(message.to_string());
    }

    fn warning(&self, message: &str) {
        self.warnings.lock().push(message.to_string());
    }
}

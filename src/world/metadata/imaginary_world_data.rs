//! Metadata record of an imaginary world
//!
//! Mirrors a real world's metadata at construction (or starts from the
//! baseline) and from then on keeps every write in memory.

use std::fmt;
use std::sync::Arc;

use super::metadata_data::{
    ChangeLog, ChangeValue, MetadataField, WorldMetadataSnapshot, DEFAULT_GENERATOR_OPTIONS,
    FLAT_GENERATOR,
};
use super::WorldData;
use crate::logging::WorldLogger;
use crate::world::core::SpawnPoint;
use crate::world::storage::StorageResult;

/// Metadata that records writes instead of persisting them
pub struct ImaginaryWorldData {
    name: String,
    seed: i64,
    time: i64,
    spawn: SpawnPoint,
    difficulty: i32,
    rain_time: i32,
    rain_level: f32,
    lightning_time: i32,
    lightning_level: f32,

    changes: ChangeLog,
    logger: Arc<dyn WorldLogger>,
    log_changes: bool,
}

impl ImaginaryWorldData {
    /// Build a record from `source`, or from the baseline when there is none.
    ///
    /// The name always comes from `name`, never from `source`.
    pub fn new(
        name: impl Into<String>,
        source: Option<&WorldMetadataSnapshot>,
        logger: Arc<dyn WorldLogger>,
        log_changes: bool,
    ) -> Self {
        let baseline;
        let source = match source {
            Some(snapshot) => snapshot,
            None => {
                baseline = WorldMetadataSnapshot::default();
                &baseline
            }
        };

        Self {
            name: name.into(),
            seed: source.seed,
            time: source.time,
            spawn: source.spawn,
            difficulty: source.difficulty,
            rain_time: source.rain_time,
            rain_level: source.rain_level,
            lightning_time: source.lightning_time,
            lightning_level: source.lightning_level,
            changes: ChangeLog::new(),
            logger,
            log_changes,
        }
    }

    /// Every write made since construction
    pub fn changes(&self) -> &ChangeLog {
        &self.changes
    }

    pub fn log_changes(&self) -> bool {
        self.log_changes
    }

    pub fn set_log_changes(&mut self, enabled: bool) {
        self.log_changes = enabled;
    }
}

impl fmt::Debug for ImaginaryWorldData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImaginaryWorldData")
            .field("name", &self.name)
            .field("seed", &self.seed)
            .field("time", &self.time)
            .field("spawn", &self.spawn)
            .field("difficulty", &self.difficulty)
            .field("rain_time", &self.rain_time)
            .field("rain_level", &self.rain_level)
            .field("lightning_time", &self.lightning_time)
            .field("lightning_level", &self.lightning_level)
            .field("changes", &self.changes)
            .field("log_changes", &self.log_changes)
            .finish()
    }
}

impl WorldData for ImaginaryWorldData {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, value: String) {
        self.changes
            .record(MetadataField::Name, ChangeValue::Text(value.clone()));
        self.name = value;
    }

    fn generator(&self) -> &str {
        FLAT_GENERATOR
    }

    fn generator_options(&self) -> &str {
        DEFAULT_GENERATOR_OPTIONS
    }

    fn seed(&self) -> i64 {
        self.seed
    }

    fn time(&self) -> i64 {
        self.time
    }

    fn set_time(&mut self, value: i64) {
        self.time = value;
        self.changes
            .record(MetadataField::Time, ChangeValue::Integer(value));
    }

    fn spawn(&self) -> SpawnPoint {
        self.spawn
    }

    fn set_spawn(&mut self, pos: SpawnPoint) {
        self.spawn = pos;
        self.changes.record(MetadataField::Spawn, pos.into());
    }

    fn difficulty(&self) -> i32 {
        self.difficulty
    }

    fn set_difficulty(&mut self, difficulty: i32) {
        self.difficulty = difficulty;
        self.changes.record(
            MetadataField::Difficulty,
            ChangeValue::Integer(i64::from(difficulty)),
        );
    }

    fn rain_time(&self) -> i32 {
        self.rain_time
    }

    fn set_rain_time(&mut self, ticks: i32) {
        self.rain_time = ticks;
        self.changes
            .record(MetadataField::RainTime, ChangeValue::Integer(i64::from(ticks)));
    }

    fn rain_level(&self) -> f32 {
        self.rain_level
    }

    fn set_rain_level(&mut self, level: f32) {
        self.rain_level = level;
        self.changes
            .record(MetadataField::RainLevel, ChangeValue::Float(level));
    }

    fn lightning_time(&self) -> i32 {
        self.lightning_time
    }

    fn set_lightning_time(&mut self, ticks: i32) {
        self.lightning_time = ticks;
        self.changes.record(
            MetadataField::LightningTime,
            ChangeValue::Integer(i64::from(ticks)),
        );
    }

    fn lightning_level(&self) -> f32 {
        self.lightning_level
    }

    fn set_lightning_level(&mut self, level: f32) {
        self.lightning_level = level;
        self.changes.record(
            MetadataField::LightningLevel,
            ChangeValue::Float(level),
        );
    }

    /// Reports the change log when enabled. Nothing is persisted and the log
    /// is kept.
    fn save(&mut self) -> StorageResult<()> {
        if !self.log_changes {
            return Ok(());
        }

        let changes = self
            .changes
            .to_json()
            .unwrap_or_else(|e| format!("<unserializable change log: {}>", e));
        self.logger.debug(&format!(
            "save() called on imaginary world data: {}",
            changes
        ));
        Ok(())
    }
}

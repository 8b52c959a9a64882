//! World metadata
//!
//! The [`WorldData`] trait is the metadata capability set every storage
//! provider exposes. Imaginary worlds answer it from an
//! [`ImaginaryWorldData`] record that never writes through.

mod imaginary_world_data;
mod metadata_data;

pub use imaginary_world_data::ImaginaryWorldData;
pub use metadata_data::{
    ChangeLog, ChangeValue, MetadataField, WorldMetadataSnapshot, DEFAULT_GENERATOR_OPTIONS,
    FLAT_GENERATOR,
};

use crate::world::core::SpawnPoint;
use crate::world::storage::StorageResult;

/// Descriptive state of a world: name, clock, spawn, difficulty and weather
pub trait WorldData: Send {
    fn name(&self) -> &str;
    fn set_name(&mut self, value: String);

    fn generator(&self) -> &str;
    fn generator_options(&self) -> &str;

    fn seed(&self) -> i64;

    fn time(&self) -> i64;
    fn set_time(&mut self, value: i64);

    fn spawn(&self) -> SpawnPoint;
    fn set_spawn(&mut self, pos: SpawnPoint);

    fn difficulty(&self) -> i32;
    fn set_difficulty(&mut self, difficulty: i32);

    fn rain_time(&self) -> i32;
    fn set_rain_time(&mut self, ticks: i32);
    fn rain_level(&self) -> f32;
    fn set_rain_level(&mut self, level: f32);

    fn lightning_time(&self) -> i32;
    fn set_lightning_time(&mut self, ticks: i32);
    fn lightning_level(&self) -> f32;
    fn set_lightning_level(&mut self, level: f32);

    /// Flush metadata to wherever the implementation keeps it
    fn save(&mut self) -> StorageResult<()>;
}

//! Metadata Data - plain records
//!
//! Snapshots copied out of a real provider and the change log an imaginary
//! record accumulates. Behaviour lives in imaginary_world_data.rs.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::WorldData;
use crate::world::core::{SpawnPoint, DEFAULT_SPAWN};

/// Generator reported by every imaginary world
pub const FLAT_GENERATOR: &str = "flat";
pub const DEFAULT_GENERATOR_OPTIONS: &str = "";

/// Point-in-time copy of a world's metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldMetadataSnapshot {
    pub name: String,
    pub seed: i64,
    pub time: i64,
    pub spawn: SpawnPoint,
    pub difficulty: i32,
    pub rain_time: i32,
    pub rain_level: f32,
    pub lightning_time: i32,
    pub lightning_level: f32,
}

impl Default for WorldMetadataSnapshot {
    fn default() -> Self {
        Self {
            name: String::new(),
            seed: 0,
            time: 0,
            spawn: DEFAULT_SPAWN,
            difficulty: 0,
            rain_time: 0,
            rain_level: 0.0,
            lightning_time: 0,
            lightning_level: 0.0,
        }
    }
}

impl WorldMetadataSnapshot {
    /// Copy every field out of a live metadata source
    pub fn capture(data: &dyn WorldData) -> Self {
        Self {
            name: data.name().to_string(),
            seed: data.seed(),
            time: data.time(),
            spawn: data.spawn(),
            difficulty: data.difficulty(),
            rain_time: data.rain_time(),
            rain_level: data.rain_level(),
            lightning_time: data.lightning_time(),
            lightning_level: data.lightning_level(),
        }
    }
}

/// Metadata fields that can be written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    Name,
    Time,
    Spawn,
    Difficulty,
    RainTime,
    RainLevel,
    LightningTime,
    LightningLevel,
}

impl MetadataField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataField::Name => "name",
            MetadataField::Time => "time",
            MetadataField::Spawn => "spawn",
            MetadataField::Difficulty => "difficulty",
            MetadataField::RainTime => "rain_time",
            MetadataField::RainLevel => "rain_level",
            MetadataField::LightningTime => "lightning_time",
            MetadataField::LightningLevel => "lightning_level",
        }
    }
}

/// Last value written to a field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChangeValue {
    Text(String),
    Integer(i64),
    Float(f32),
    Position([f64; 3]),
}

impl From<SpawnPoint> for ChangeValue {
    fn from(pos: SpawnPoint) -> Self {
        ChangeValue::Position([pos.x, pos.y, pos.z])
    }
}

/// Field name to last-written value, kept in first-write order.
///
/// Entries are never removed for the lifetime of the owning record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeLog {
    entries: Vec<(MetadataField, ChangeValue)>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a write; a later write to the same field replaces its value in place
    pub fn record(&mut self, field: MetadataField, value: ChangeValue) {
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field, value)),
        }
    }

    pub fn get(&self, field: MetadataField) -> Option<&ChangeValue> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetadataField, &ChangeValue)> {
        self.entries.iter().map(|(field, value)| (*field, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Serialize for ChangeLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, value) in &self.entries {
            map.serialize_entry(field.as_str(), value)?;
        }
        map.end()
    }
}

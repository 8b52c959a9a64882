//! Positions used by world storage

use cgmath::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column position of a chunk in chunk coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// World spawn point in block coordinates
pub type SpawnPoint = Point3<f64>;

/// Canonical spawn: the origin, one block above ground
pub const DEFAULT_SPAWN: SpawnPoint = Point3 {
    x: 0.0,
    y: 1.0,
    z: 0.0,
};

//! Core world data types
//!
//! Positions shared by metadata and chunk storage, plus the host run state
//! storage consults when closing.

mod position;
mod run_state;

pub use position::{ChunkPos, SpawnPoint, DEFAULT_SPAWN};
pub use run_state::RunState;

//! Chunk Data - opaque chunk payloads
//!
//! The on-disk chunk format belongs to the real provider. Storage here only
//! moves payloads around, it never looks inside them.

/// Serialized contents of one chunk column
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkData {
    /// Encoded terrain, entities and tiles, as produced by the real provider
    pub payload: Vec<u8>,
    pub populated: bool,
}

impl ChunkData {
    pub fn new(payload: Vec<u8>, populated: bool) -> Self {
        Self { payload, populated }
    }
}

/// Chunk as returned from storage
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedChunkData {
    pub data: ChunkData,
    /// Set when the provider converted the chunk from an older format
    pub upgraded: bool,
}

/// Parts of a chunk that changed since the last save
pub mod dirty_flags {
    pub const TERRAIN: u32 = 1 << 0;
    pub const ENTITIES: u32 = 1 << 1;
    pub const TILES: u32 = 1 << 2;
    pub const ALL: u32 = TERRAIN | ENTITIES | TILES;
}

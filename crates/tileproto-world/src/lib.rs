//! GPU-free core of tileproto: chunk coordinates, block grids, world
//! generation, visible-rectangle math, and the chunk residency manager.
//!
//! The residency manager decides which chunks are live each frame. It is
//! generic over the [`ChunkBaker`] trait, so every policy in this crate is
//! testable with a counting fake; the real baker (an offscreen render pass)
//! lives in the render crate.

pub mod block;
pub mod coords;
pub mod residency;
pub mod source;
pub mod view;

pub use block::{BLOCK_PIXELS, BLOCK_TYPES, BlockGrid, BlockId, CHUNK_AREA, CHUNK_PIXELS,
    CHUNK_SIZE};
pub use coords::ChunkCoord;
pub use residency::{ChunkBaker, ChunkResidency, ResidencyTickResult};
pub use source::{SeededWorld, UniformRandomWorld, WorldSource, chunk_rng, derive_chunk_seed};
pub use view::ViewRect;

//! Sources of block data, queried once per chunk at bake time.

use std::hash::{DefaultHasher, Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::block::{BLOCK_TYPES, BlockGrid, BlockId};
use crate::coords::ChunkCoord;

/// Provider of block grids for arbitrary chunks.
///
/// Queries take `&mut self` because generators may advance internal RNG
/// state. A chunk is queried exactly once per bake; the result is never
/// cached on the CPU side.
pub trait WorldSource {
    fn query(&mut self, coord: ChunkCoord) -> BlockGrid;
}

/// Derive a deterministic per-chunk seed from the world seed and the
/// chunk's address.
pub fn derive_chunk_seed(world_seed: u64, coord: ChunkCoord) -> u64 {
    let mut hasher = DefaultHasher::new();
    world_seed.hash(&mut hasher);
    coord.cx.hash(&mut hasher);
    coord.cy.hash(&mut hasher);
    hasher.finish()
}

/// RNG for one chunk, reproducible across runs and query order.
pub fn chunk_rng(world_seed: u64, coord: ChunkCoord) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_chunk_seed(world_seed, coord))
}

/// Deterministic world: each chunk's contents depend only on the world
/// seed and the chunk address, so revisiting a chunk after it was evicted
/// reproduces it exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeededWorld {
    world_seed: u64,
}

impl SeededWorld {
    pub fn new(world_seed: u64) -> Self {
        Self { world_seed }
    }
}

impl WorldSource for SeededWorld {
    fn query(&mut self, coord: ChunkCoord) -> BlockGrid {
        let mut rng = chunk_rng(self.world_seed, coord);
        BlockGrid::from_fn(|_, _| BlockId(rng.random_range(0..BLOCK_TYPES)))
    }
}

/// Non-deterministic world: one RNG stream shared by all chunks, so the
/// same chunk queried twice yields different contents. Useful for eyeballing
/// cache behavior, since a re-baked chunk visibly changes.
#[derive(Debug, Clone)]
pub struct UniformRandomWorld {
    rng: ChaCha8Rng,
}

impl UniformRandomWorld {
    pub fn new() -> Self {
        Self { rng: ChaCha8Rng::from_os_rng() }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }
}

impl Default for UniformRandomWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldSource for UniformRandomWorld {
    fn query(&mut self, _coord: ChunkCoord) -> BlockGrid {
        BlockGrid::from_fn(|_, _| BlockId(self.rng.random_range(0..BLOCK_TYPES)))
    }
}

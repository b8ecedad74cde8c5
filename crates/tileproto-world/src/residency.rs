//! Chunk residency: which chunks currently exist as baked textures.
//!
//! Admission and eviction are driven purely by the camera's visible
//! rectangle. Every overlapping chunk is baked the tick it first enters the
//! view; every resident chunk that no longer overlaps is freed the tick it
//! leaves. There is no spatial prefetch margin and no free-list hysteresis:
//! steady scrolling bakes a fresh row or column of chunks as it crosses
//! each chunk boundary and frees the opposite row or column the same tick.

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::coords::ChunkCoord;
use crate::view::ViewRect;

/// Turns a chunk address into a resident chunk, typically by rendering the
/// chunk's blocks into a texture.
///
/// Baking is fallible; the GPU implementation surfaces render-target and
/// allocation errors here. A failed bake leaves no trace in the residency
/// collection, so the chunk is retried on the next tick it is still
/// visible.
pub trait ChunkBaker {
    type Chunk;
    type Error: std::error::Error;

    fn bake(&mut self, coord: ChunkCoord) -> Result<Self::Chunk, Self::Error>;
}

/// Counts of what one residency tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResidencyTickResult {
    /// Chunks baked and admitted this tick.
    pub compiled: u32,
    /// Chunks evicted this tick.
    pub freed: u32,
    /// Bake attempts that failed this tick.
    pub failed: u32,
}

/// The set of resident chunks, keyed by chunk address.
///
/// `T` is whatever a bake produces; the GPU renderer stores a texture and
/// its bind group, tests store fakes. Dropping an entry releases the
/// chunk's resources.
pub struct ChunkResidency<T> {
    resident: FxHashMap<ChunkCoord, T>,
}

impl<T> ChunkResidency<T> {
    pub fn new() -> Self {
        Self { resident: FxHashMap::default() }
    }

    pub fn is_resident(&self, coord: ChunkCoord) -> bool {
        self.resident.contains_key(&coord)
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&T> {
        self.resident.get(&coord)
    }

    pub fn resident_count(&self) -> usize {
        self.resident.len()
    }

    /// Iterate resident chunks in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkCoord, &T)> {
        self.resident.iter().map(|(&coord, chunk)| (coord, chunk))
    }

    /// Bake and admit `coord` unless it is already resident.
    ///
    /// Returns `Ok(true)` if a bake happened, `Ok(false)` if the chunk was
    /// already resident.
    pub fn request<B>(&mut self, coord: ChunkCoord, baker: &mut B) -> Result<bool, B::Error>
    where
        B: ChunkBaker<Chunk = T>,
    {
        if self.resident.contains_key(&coord) {
            return Ok(false);
        }
        let chunk = baker.bake(coord)?;
        self.resident.insert(coord, chunk);
        Ok(true)
    }

    /// Drop every resident chunk whose footprint no longer overlaps `view`.
    pub fn evict_outside(&mut self, view: &ViewRect) -> u32 {
        let before = self.resident.len();
        self.resident.retain(|&coord, _| view.intersects_chunk(coord));
        (before - self.resident.len()) as u32
    }

    /// One residency tick: admit everything the view now overlaps, then
    /// evict everything it no longer does.
    ///
    /// Admission runs first so a chunk entering the view this tick is
    /// drawable this same frame. Bake failures are logged and skipped; the
    /// chunk stays non-resident and is retried next tick.
    pub fn tick<B>(&mut self, view: &ViewRect, baker: &mut B) -> ResidencyTickResult
    where
        B: ChunkBaker<Chunk = T>,
    {
        let mut result = ResidencyTickResult::default();
        for coord in view.visible_chunks() {
            match self.request(coord, baker) {
                Ok(true) => result.compiled += 1,
                Ok(false) => {}
                Err(err) => {
                    warn!(chunk = %coord, error = %err, "chunk bake failed; will retry next tick");
                    result.failed += 1;
                }
            }
        }
        result.freed = self.evict_outside(view);
        result
    }
}

impl<T> Default for ChunkResidency<T> {
    fn default() -> Self {
        Self::new()
    }
}

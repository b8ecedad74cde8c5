//! Chunk coordinates in the infinite 2D world.

use std::fmt;

use glam::Vec2;

use crate::block::CHUNK_SIZE;

/// Address of a chunk on the world grid.
///
/// Chunk `(0, 0)` spans world units `[0, CHUNK_SIZE)` on both axes; chunk
/// `(-1, 0)` spans `[-CHUNK_SIZE, 0)` on x. Addresses are integers so they
/// can key hash maps without epsilon trouble.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
}

impl ChunkCoord {
    pub const fn new(cx: i32, cy: i32) -> Self {
        Self { cx, cy }
    }

    /// Chunk containing the given world-space point.
    ///
    /// Uses floor division, so points with negative coordinates land in the
    /// correct negative chunk rather than being pulled toward zero.
    pub fn containing(point: Vec2) -> Self {
        let scaled = point / CHUNK_SIZE as f32;
        Self::new(scaled.x.floor() as i32, scaled.y.floor() as i32)
    }

    /// World-space position of this chunk's minimum (bottom-left) corner.
    pub fn min_corner(self) -> Vec2 {
        Vec2::new(
            (self.cx * CHUNK_SIZE) as f32,
            (self.cy * CHUNK_SIZE) as f32,
        )
    }

    /// World-space position of this chunk's maximum (top-right) corner.
    pub fn max_corner(self) -> Vec2 {
        self.min_corner() + Vec2::splat(CHUNK_SIZE as f32)
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.cx, self.cy)
    }
}

//! The camera's visible rectangle and its mapping onto the chunk grid.

use glam::Vec2;

use crate::block::CHUNK_SIZE;
use crate::coords::ChunkCoord;

/// Axis-aligned view rectangle in world units.
///
/// `pos` is the bottom-left corner; the rectangle covers
/// `[pos, pos + size)` on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl ViewRect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// Top-right corner.
    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }

    /// Whether the chunk's footprint overlaps this rectangle.
    ///
    /// The test is open on both ends: a chunk that merely shares an edge
    /// with the view contributes no visible pixels and does not count.
    pub fn intersects_chunk(&self, coord: ChunkCoord) -> bool {
        let min = coord.min_corner();
        let max = coord.max_corner();
        let view_max = self.max();
        min.x < view_max.x && max.x > self.pos.x && min.y < view_max.y && max.y > self.pos.y
    }

    /// All chunks whose footprint overlaps the rectangle, scanned row by
    /// row from the bottom-left.
    ///
    /// The corner chunks are found by flooring the view's extreme points
    /// onto the chunk grid, so a rectangle that only partially covers a
    /// chunk still yields it, on both the negative and positive sides.
    pub fn visible_chunks(self) -> impl Iterator<Item = ChunkCoord> {
        let first = ChunkCoord::containing(self.pos);
        let last = ChunkCoord::containing(self.max());
        (first.cy..=last.cy)
            .flat_map(move |cy| (first.cx..=last.cx).map(move |cx| ChunkCoord::new(cx, cy)))
    }

    /// View width and height measured in chunks, for logging.
    pub fn chunk_extent(&self) -> (i32, i32) {
        let first = ChunkCoord::containing(self.pos);
        let last = ChunkCoord::containing(self.max());
        (last.cx - first.cx + 1, last.cy - first.cy + 1)
    }
}

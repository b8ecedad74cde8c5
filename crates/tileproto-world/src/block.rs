//! Block identifiers and the dense per-chunk block grid.

use std::fmt;

/// Side length of a chunk, in blocks.
pub const CHUNK_SIZE: i32 = 32;

/// Number of blocks in one chunk.
pub const CHUNK_AREA: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;

/// Side length of one block in the baked chunk texture, in pixels.
pub const BLOCK_PIXELS: u32 = 16;

/// Side length of a baked chunk texture, in pixels.
pub const CHUNK_PIXELS: u32 = CHUNK_SIZE as u32 * BLOCK_PIXELS;

/// Number of distinct block types, the empty block included.
pub const BLOCK_TYPES: u8 = 4;

/// Identifier for a block type.
///
/// Empty is always ID 0; the remaining IDs index the block atlas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BlockId(pub u8);

impl BlockId {
    /// The empty block. Nothing is drawn for it.
    pub const EMPTY: BlockId = BlockId(0);

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dense `CHUNK_SIZE` x `CHUNK_SIZE` grid of block IDs, row-major with
/// `y` outermost.
#[derive(Clone, PartialEq, Eq)]
pub struct BlockGrid {
    cells: [BlockId; CHUNK_AREA],
}

impl BlockGrid {
    /// Grid with every cell set to `id`.
    pub fn filled(id: BlockId) -> Self {
        Self { cells: [id; CHUNK_AREA] }
    }

    /// Build a grid by evaluating `f` once per cell, in storage order
    /// (`y` outer, `x` inner).
    pub fn from_fn(mut f: impl FnMut(i32, i32) -> BlockId) -> Self {
        let mut grid = Self::default();
        for y in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                grid.set(x, y, f(x, y));
            }
        }
        grid
    }

    pub fn get(&self, x: i32, y: i32) -> BlockId {
        assert!(
            (0..CHUNK_SIZE).contains(&x) && (0..CHUNK_SIZE).contains(&y),
            "block position ({}, {}) out of chunk bounds",
            x,
            y
        );
        self.cells[(y * CHUNK_SIZE + x) as usize]
    }

    pub fn set(&mut self, x: i32, y: i32, id: BlockId) {
        assert!(
            (0..CHUNK_SIZE).contains(&x) && (0..CHUNK_SIZE).contains(&y),
            "block position ({}, {}) out of chunk bounds",
            x,
            y
        );
        self.cells[(y * CHUNK_SIZE + x) as usize] = id;
    }

    /// Iterate all cells as `(x, y, id)`, `x` fastest.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, BlockId)> + '_ {
        self.cells.iter().enumerate().map(|(i, &id)| {
            let i = i as i32;
            (i % CHUNK_SIZE, i / CHUNK_SIZE, id)
        })
    }

    pub fn non_empty_count(&self) -> usize {
        self.cells.iter().filter(|id| !id.is_empty()).count()
    }
}

impl Default for BlockGrid {
    fn default() -> Self {
        Self::filled(BlockId::EMPTY)
    }
}

impl fmt::Debug for BlockGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockGrid")
            .field("non_empty", &self.non_empty_count())
            .finish()
    }
}

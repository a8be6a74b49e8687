//! Block-pooled cell storage
//!
//! Committed cells live in fixed-size blocks that never move once
//! allocated, so a `u32` arena index stays valid for the whole
//! rasterization epoch. A growable `Vec<Cell>` would not give that
//! guarantee: the sorted view built by the sort stage keeps indexes into
//! the arena across its own allocations.

use crate::CoverageCell;

/// log2 of the cells per block
pub const CELL_BLOCK_SHIFT : u32 = 12;
/// Cells per block
pub const CELL_BLOCK_SIZE  : u32 = 1 << CELL_BLOCK_SHIFT;
/// Mask selecting the slot within a block
pub const CELL_BLOCK_MASK  : u32 = CELL_BLOCK_SIZE - 1;
/// Block directory growth increment
pub const CELL_BLOCK_POOL  : usize = 256;
/// Hard ceiling on blocks in use; beyond it cells are silently dropped
pub const CELL_BLOCK_LIMIT : usize = 1024;

/// Arena of coverage cells in insertion order
///
/// The write cursor is implicit in the committed count: block
/// `len >> CELL_BLOCK_SHIFT`, slot `len & CELL_BLOCK_MASK`. `reset`
/// rewinds the cursor and keeps every allocated block for reuse, so a
/// long-lived rasterizer stops allocating once it has seen its largest
/// path. Blocks are only freed on drop.
pub struct CellArena<C> {
    blocks: Vec<Box<[C]>>,
    used: u32,
}

impl<C: CoverageCell> CellArena<C> {
    pub fn new() -> Self {
        CellArena { blocks: Vec::new(), used: 0 }
    }

    /// Cells committed this epoch
    pub fn len(&self) -> u32 {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Rewind the write cursor, keeping allocated blocks
    pub fn reset(&mut self) {
        self.used = 0;
    }

    /// Commit a cell
    ///
    /// Returns `false` when the block ceiling is reached; the cell is
    /// dropped and the arena is unchanged. Saturation, not an error.
    pub fn push(&mut self, cell: C) -> bool {
        let block = (self.used >> CELL_BLOCK_SHIFT) as usize;
        let slot = (self.used & CELL_BLOCK_MASK) as usize;
        if slot == 0 && !self.open_block(block) {
            return false;
        }
        self.blocks[block][slot] = cell;
        self.used += 1;
        true
    }

    /// Cell at an arena index previously handed out by `iter`
    #[inline]
    pub fn at(&self, index: u32) -> &C {
        &self.blocks[(index >> CELL_BLOCK_SHIFT) as usize]
                    [(index & CELL_BLOCK_MASK) as usize]
    }

    /// Committed cells in insertion order: full blocks, then the partial
    /// tail
    pub fn iter(&self) -> impl Iterator<Item = &C> {
        self.blocks
            .iter()
            .flat_map(|block| block.iter())
            .take(self.used as usize)
    }

    // Make `block` the current write block, allocating it if it has never
    // existed. The directory grows in CELL_BLOCK_POOL chunks.
    fn open_block(&mut self, block: usize) -> bool {
        if block >= CELL_BLOCK_LIMIT {
            return false;
        }
        if block == self.blocks.len() {
            if self.blocks.len() == self.blocks.capacity() {
                self.blocks.reserve_exact(CELL_BLOCK_POOL);
            }
            let fresh = vec![C::default(); CELL_BLOCK_SIZE as usize];
            self.blocks.push(fresh.into_boxed_slice());
        }
        true
    }
}

impl<C: CoverageCell> Default for CellArena<C> {
    fn default() -> Self {
        CellArena::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    fn cell(x: i32, y: i32) -> Cell {
        Cell { x, y, cover: 1, area: 1 }
    }

    #[test]
    fn push_crosses_block_boundary() {
        let mut arena = CellArena::new();
        for i in 0..(CELL_BLOCK_SIZE + 10) as i32 {
            assert!(arena.push(cell(i, 0)));
        }
        assert_eq!(arena.len(), CELL_BLOCK_SIZE + 10);
        assert_eq!(arena.at(0).x, 0);
        assert_eq!(arena.at(CELL_BLOCK_SIZE).x, CELL_BLOCK_SIZE as i32);
    }

    #[test]
    fn iter_walks_insertion_order() {
        let mut arena = CellArena::new();
        let n = CELL_BLOCK_SIZE as i32 + 7;
        for i in 0..n {
            arena.push(cell(i, i));
        }
        let xs: Vec<i32> = arena.iter().map(|c| c.x).collect();
        assert_eq!(xs.len(), n as usize);
        assert!(xs.iter().enumerate().all(|(i, &x)| x == i as i32));
    }

    #[test]
    fn is_empty_tracks_the_write_cursor() {
        let mut arena = CellArena::new();
        assert!(arena.is_empty());
        arena.push(cell(1, 1));
        assert!(!arena.is_empty());
        arena.reset();
        assert!(arena.is_empty());
    }

    #[test]
    fn reset_reuses_blocks() {
        let mut arena = CellArena::new();
        for i in 0..100 {
            arena.push(cell(i, 0));
        }
        arena.reset();
        assert_eq!(arena.len(), 0);
        assert!(arena.push(cell(7, 7)));
        assert_eq!(arena.at(0).x, 7);
    }

    #[test]
    fn saturates_at_block_limit() {
        let limit = CELL_BLOCK_LIMIT as u32 * CELL_BLOCK_SIZE;
        let mut arena = CellArena::new();
        let mut accepted = 0u32;
        for i in 0..limit + 3 {
            if arena.push(cell(i as i32, 0)) {
                accepted += 1;
            }
        }
        assert_eq!(accepted, limit);
        assert_eq!(arena.len(), limit);

        // a saturated arena is back in service after reset
        arena.reset();
        assert!(arena.push(cell(1, 2)));
        assert_eq!(arena.len(), 1);
    }
}

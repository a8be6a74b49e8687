//! The default coverage cell

use crate::CoverageCell;

/// A per-pixel coverage record
///
/// `cover` is the sum of the subpixel y extents of every segment piece
/// crossing this pixel, positive for pieces with increasing y. `area` is
/// twice the signed area between those pieces and the pixel's left edge,
/// offset so that `cover * 2 * POLY_SUBPIXEL_SCALE - area` is the pixel's
/// analytical alpha numerator.
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    pub cover: i32,
    pub area: i32,
}

impl Cell {
    pub fn new() -> Self {
        Cell { x: i32::MAX,
               y: i32::MAX,
               cover: 0,
               area: 0,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::new()
    }
}

impl CoverageCell for Cell {
    fn initial(&mut self) {
        *self = Cell::new();
    }
    fn x(&self) -> i32 {
        self.x
    }
    fn y(&self) -> i32 {
        self.y
    }
    fn cover(&self) -> i32 {
        self.cover
    }
    fn area(&self) -> i32 {
        self.area
    }
    fn set_pos(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }
    fn set_coverage(&mut self, cover: i32, area: i32) {
        self.cover = cover;
        self.area = area;
    }
    fn add_coverage(&mut self, cover: i32, area: i32) {
        self.cover += cover;
        self.area += area;
    }
}

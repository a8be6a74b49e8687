//! Helpers shared by the scenario tests

#![allow(dead_code)]

use std::collections::HashMap;

use polycell::{Cell, RasterizerCells};

/// All committed cells, row by row in sorted order. Requires a prior sort.
pub fn collect(ras: &RasterizerCells) -> Vec<Cell> {
    let mut cells = vec![];
    if ras.total_cells() == 0 {
        return cells;
    }
    for y in ras.min_y()..=ras.max_y() {
        for cell in ras.scanline_cells(y) {
            cells.push(*cell);
        }
    }
    cells
}

/// Per-pixel (cover, area) sums, the quantity the scanline stage consumes.
pub fn pixel_sums(ras: &RasterizerCells) -> HashMap<(i32, i32), (i64, i64)> {
    let mut sums = HashMap::new();
    for cell in collect(ras) {
        let entry = sums.entry((cell.x, cell.y)).or_insert((0i64, 0i64));
        entry.0 += cell.cover as i64;
        entry.1 += cell.area as i64;
    }
    sums
}

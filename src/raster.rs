//! Line-to-cell decomposition and the two-phase cell sort
//!
//! [`RasterizerCells`] walks each input segment with an integer DDA,
//! splitting it at every pixel boundary it crosses in y and then in x, and
//! accumulates the per-pixel coverage into a single current cell. The cell
//! is committed to the arena whenever the walk enters a different pixel.
//! `sort_cells` then builds the scanline-indexed view: a y histogram
//! bucket pass followed by a per-row quicksort on x.

use crate::arena::CellArena;
use crate::cell::Cell;
use crate::sort::{sort_cells_by_x, SortedY};
use crate::CoverageCell;
use crate::{POLY_SUBPIXEL_MASK, POLY_SUBPIXEL_SCALE, POLY_SUBPIXEL_SHIFT};

/// Segment dx beyond which a line is split at its midpoint, keeping every
/// DDA product inside i32
const DX_LIMIT: i32 = 16384 << POLY_SUBPIXEL_SHIFT;

/// Converts subpixel line segments into scanline-sorted coverage cells
///
/// Feed it a path with [`move_to`] / [`line_to`], call [`sort_cells`],
/// then read rows back with [`scanline_cells`]. All input coordinates are
/// subpixel fixed-point (see [`POLY_SUBPIXEL_SHIFT`]).
///
/// [`move_to`]: #method.move_to
/// [`line_to`]: #method.line_to
/// [`sort_cells`]: #method.sort_cells
/// [`scanline_cells`]: #method.scanline_cells
pub struct RasterizerCells<C: CoverageCell = Cell> {
    cells: CellArena<C>,
    curr_cell: C,
    seed_cell: C,
    sorted_cells: Vec<u32>,
    sorted_y: Vec<SortedY>,
    curr_x: i32,
    curr_y: i32,
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
    sorted: bool,
}

impl<C: CoverageCell> RasterizerCells<C> {
    pub fn new() -> Self {
        let mut seed = C::default();
        seed.initial();
        Self {
            cells: CellArena::new(),
            curr_cell: seed,
            seed_cell: seed,
            sorted_cells: Vec::new(),
            sorted_y: Vec::new(),
            curr_x: 0,
            curr_y: 0,
            min_x: i32::MAX,
            min_y: i32::MAX,
            max_x: i32::MIN,
            max_y: i32::MIN,
            sorted: false,
        }
    }

    /// Logically empty the rasterizer, keeping allocated storage
    pub fn reset(&mut self) {
        self.cells.reset();
        self.curr_cell = self.seed_cell;
        self.sorted = false;
        self.min_x = i32::MAX;
        self.min_y = i32::MAX;
        self.max_x = i32::MIN;
        self.max_y = i32::MIN;
    }

    /// Install the cell copied into the accumulator on every reset
    ///
    /// This is how embedder-defined auxiliary cell state enters the
    /// pipeline; the default seed is the sentinel cell.
    pub fn seed_cell(&mut self, seed: C) {
        self.seed_cell = seed;
    }

    /// Start a new subpath at subpixel position `(x, y)`
    pub fn move_to(&mut self, x: i32, y: i32) {
        if self.sorted {
            self.reset();
        }
        let ex = x >> POLY_SUBPIXEL_SHIFT;
        let ey = y >> POLY_SUBPIXEL_SHIFT;
        if self.curr_cell.x() != ex
            || self.curr_cell.y() != ey
            || self.curr_cell != self.seed_cell
        {
            self.add_curr_cell();
            self.curr_cell = self.seed_cell;
            self.curr_cell.set_pos(ex, ey);
            self.curr_cell.set_coverage(0, 0);
        }
        self.curr_x = x;
        self.curr_y = y;
    }

    /// Emit cells for the segment from the current position to `(x, y)`
    pub fn line_to(&mut self, x: i32, y: i32) {
        self.render_line(self.curr_x, self.curr_y, x, y);
        self.curr_x = x;
        self.curr_y = y;
        self.sorted = false;
    }

    /// Minimum pixel x over committed cells
    pub fn min_x(&self) -> i32 {
        self.min_x
    }
    /// Minimum pixel y over committed cells
    pub fn min_y(&self) -> i32 {
        self.min_y
    }
    /// Maximum pixel x over committed cells
    pub fn max_x(&self) -> i32 {
        self.max_x
    }
    /// Maximum pixel y over committed cells
    pub fn max_y(&self) -> i32 {
        self.max_y
    }

    /// Count of committed cells
    pub fn total_cells(&self) -> u32 {
        self.cells.len()
    }

    /// Whether the sorted view is current
    pub fn sorted(&self) -> bool {
        self.sorted
    }

    /// Number of cells on row `y`
    ///
    /// Requires a prior [`sort_cells`] and `y` within the bounding box.
    ///
    /// [`sort_cells`]: #method.sort_cells
    pub fn scanline_num_cells(&self, y: i32) -> u32 {
        debug_assert!(self.sorted, "scanline queries need sort_cells first");
        self.sorted_y[(y - self.min_y) as usize].num
    }

    /// The cells on row `y`, in ascending x
    ///
    /// Requires a prior [`sort_cells`] and `y` within the bounding box.
    ///
    /// [`sort_cells`]: #method.sort_cells
    pub fn scanline_cells(&self, y: i32) -> ScanlineCells<'_, C> {
        debug_assert!(self.sorted, "scanline queries need sort_cells first");
        let row = self.sorted_y[(y - self.min_y) as usize];
        let start = row.start as usize;
        ScanlineCells {
            cells: &self.cells,
            indexes: self.sorted_cells[start..start + row.num as usize].iter(),
        }
    }

    /// Build the scanline-indexed view of the committed cells
    ///
    /// Idempotent until the next mutating call. An empty rasterizer sorts
    /// to an empty view and still sets the sorted flag.
    pub fn sort_cells(&mut self) {
        if self.sorted {
            return;
        }

        self.add_curr_cell();

        let num_cells = self.cells.len();
        if num_cells == 0 {
            self.sorted = true;
            return;
        }

        tracing::trace!(
            "sorting {} cells across {} scanlines",
            num_cells,
            self.max_y - self.min_y + 1
        );

        self.sorted_cells.clear();
        self.sorted_cells.resize(num_cells as usize, 0);

        let rows = (self.max_y - self.min_y + 1) as usize;
        self.sorted_y.clear();
        self.sorted_y.resize(rows, SortedY::default());

        // y histogram
        let min_y = self.min_y;
        for cell in self.cells.iter() {
            self.sorted_y[(cell.y() - min_y) as usize].start += 1;
        }

        // counts to starting offsets
        let mut start = 0u32;
        for row in self.sorted_y.iter_mut() {
            let count = row.start;
            row.start = start;
            start += count;
        }

        // scatter the cell indexes into their row buckets
        for (index, cell) in self.cells.iter().enumerate() {
            let row = &mut self.sorted_y[(cell.y() - min_y) as usize];
            self.sorted_cells[(row.start + row.num) as usize] = index as u32;
            row.num += 1;
        }

        // ascending x within each row
        let cells = &self.cells;
        for row in self.sorted_y.iter() {
            if row.num > 0 {
                let start = row.start as usize;
                let run = &mut self.sorted_cells[start..start + row.num as usize];
                sort_cells_by_x(run, |index| cells.at(index).x());
            }
        }

        self.sorted = true;
    }

    // Commit the accumulator if it holds any coverage. Cells beyond the
    // arena's block ceiling are dropped.
    fn add_curr_cell(&mut self) {
        if self.curr_cell.area() | self.curr_cell.cover() != 0 {
            if !self.cells.push(self.curr_cell) {
                return;
            }
            let x = self.curr_cell.x();
            let y = self.curr_cell.y();
            if x < self.min_x {
                self.min_x = x;
            }
            if x > self.max_x {
                self.max_x = x;
            }
            if y < self.min_y {
                self.min_y = y;
            }
            if y > self.max_y {
                self.max_y = y;
            }
        }
    }

    // Re-anchor the accumulator to pixel (x, y), flushing it first if the
    // pixel changes.
    fn set_curr_cell(&mut self, x: i32, y: i32) {
        if self.curr_cell.x() != x || self.curr_cell.y() != y {
            self.add_curr_cell();
            self.curr_cell = self.seed_cell;
            self.curr_cell.set_pos(x, y);
            self.curr_cell.set_coverage(0, 0);
        }
    }

    // One segment restricted to scanline `ey`: x1..x2 subpixel, y1..y2 the
    // fractional y extent within the row. The x-axis twin of render_line.
    fn render_hline(&mut self, ey: i32, x1: i32, y1: i32, x2: i32, y2: i32) {
        let ex1 = x1 >> POLY_SUBPIXEL_SHIFT;
        let ex2 = x2 >> POLY_SUBPIXEL_SHIFT;
        let fx1 = x1 & POLY_SUBPIXEL_MASK;
        let fx2 = x2 & POLY_SUBPIXEL_MASK;

        // no vertical motion, just re-anchor
        if y1 == y2 {
            self.set_curr_cell(ex2, ey);
            return;
        }

        // the whole extent stays inside one cell
        if ex1 == ex2 {
            let delta = y2 - y1;
            self.curr_cell.add_coverage(delta, (fx1 + fx2) * delta);
            return;
        }

        // a run of adjacent cells on this scanline
        let (mut p, first, incr, dx) = if x2 - x1 < 0 {
            (fx1 * (y2 - y1), 0, -1, x1 - x2)
        } else {
            ((POLY_SUBPIXEL_SCALE - fx1) * (y2 - y1), POLY_SUBPIXEL_SCALE, 1, x2 - x1)
        };
        let mut delta = p / dx;
        let mut xmod = p % dx;
        if xmod < 0 {
            delta -= 1;
            xmod += dx;
        }

        self.curr_cell.add_coverage(delta, (fx1 + first) * delta);

        let mut ex1 = ex1 + incr;
        self.set_curr_cell(ex1, ey);
        let mut y1 = y1 + delta;

        if ex1 != ex2 {
            p = POLY_SUBPIXEL_SCALE * (y2 - y1 + delta);
            let mut lift = p / dx;
            let mut rem = p % dx;
            if rem < 0 {
                lift -= 1;
                rem += dx;
            }
            xmod -= dx;

            while ex1 != ex2 {
                delta = lift;
                xmod += rem;
                if xmod >= 0 {
                    xmod -= dx;
                    delta += 1;
                }

                self.curr_cell.add_coverage(delta, POLY_SUBPIXEL_SCALE * delta);
                y1 += delta;
                ex1 += incr;
                self.set_curr_cell(ex1, ey);
            }
        }
        let delta = y2 - y1;
        self.curr_cell
            .add_coverage(delta, (fx2 + POLY_SUBPIXEL_SCALE - first) * delta);
    }

    // Decompose one segment into cells, walking scanline by scanline.
    fn render_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let dx = x2 - x1;

        // long segments split at the midpoint so every product below
        // stays inside i32
        if dx >= DX_LIMIT || dx <= -DX_LIMIT {
            let cx = (x1 + x2) >> 1;
            let cy = (y1 + y2) >> 1;
            self.render_line(x1, y1, cx, cy);
            self.render_line(cx, cy, x2, y2);
            return;
        }

        let dy = y2 - y1;
        let ey1 = y1 >> POLY_SUBPIXEL_SHIFT;
        let ey2 = y2 >> POLY_SUBPIXEL_SHIFT;
        let fy1 = y1 & POLY_SUBPIXEL_MASK;
        let fy2 = y2 & POLY_SUBPIXEL_MASK;

        // everything on a single scanline
        if ey1 == ey2 {
            self.render_hline(ey1, x1, fy1, x2, fy2);
            return;
        }

        // vertical segment: one column, so the start and end cells plus a
        // uniform interior run, no render_hline needed
        if dx == 0 {
            let ex = x1 >> POLY_SUBPIXEL_SHIFT;
            let two_fx = (x1 - (ex << POLY_SUBPIXEL_SHIFT)) << 1;

            let (first, incr) = if dy < 0 { (0, -1) } else { (POLY_SUBPIXEL_SCALE, 1) };

            let delta = first - fy1;
            self.curr_cell.add_coverage(delta, two_fx * delta);

            let mut ey1 = ey1 + incr;
            self.set_curr_cell(ex, ey1);

            let delta = first + first - POLY_SUBPIXEL_SCALE;
            let area = two_fx * delta;
            while ey1 != ey2 {
                // overwrite, not accumulate: set_curr_cell has just
                // flushed and zeroed this cell, and the whole-pixel
                // contribution is constant down the run
                self.curr_cell.set_coverage(delta, area);
                ey1 += incr;
                self.set_curr_cell(ex, ey1);
            }
            let delta = fy2 - POLY_SUBPIXEL_SCALE + first;
            self.curr_cell.add_coverage(delta, two_fx * delta);
            return;
        }

        // general case: several scanlines, one hline per row crossed
        let (p, first, incr, dy) = if dy < 0 {
            (fy1 * dx, 0, -1, -dy)
        } else {
            ((POLY_SUBPIXEL_SCALE - fy1) * dx, POLY_SUBPIXEL_SCALE, 1, dy)
        };
        let mut delta = p / dy;
        let mut ymod = p % dy;
        if ymod < 0 {
            delta -= 1;
            ymod += dy;
        }

        let mut x_from = x1 + delta;
        self.render_hline(ey1, x1, fy1, x_from, first);

        let mut ey1 = ey1 + incr;
        self.set_curr_cell(x_from >> POLY_SUBPIXEL_SHIFT, ey1);

        if ey1 != ey2 {
            let p = POLY_SUBPIXEL_SCALE * dx;
            let mut lift = p / dy;
            let mut rem = p % dy;
            if rem < 0 {
                lift -= 1;
                rem += dy;
            }
            ymod -= dy;

            while ey1 != ey2 {
                delta = lift;
                ymod += rem;
                if ymod >= 0 {
                    ymod -= dy;
                    delta += 1;
                }

                let x_to = x_from + delta;
                self.render_hline(ey1, x_from, POLY_SUBPIXEL_SCALE - first, x_to, first);
                x_from = x_to;

                ey1 += incr;
                self.set_curr_cell(x_from >> POLY_SUBPIXEL_SHIFT, ey1);
            }
        }
        self.render_hline(ey1, x_from, POLY_SUBPIXEL_SCALE - first, x2, fy2);
    }
}

impl<C: CoverageCell> Default for RasterizerCells<C> {
    fn default() -> Self {
        RasterizerCells::new()
    }
}

/// Iterator over one scanline's cells, ascending in x
///
/// Returned by [`RasterizerCells::scanline_cells`].
///
/// [`RasterizerCells::scanline_cells`]: struct.RasterizerCells.html#method.scanline_cells
pub struct ScanlineCells<'a, C: CoverageCell> {
    cells: &'a CellArena<C>,
    indexes: std::slice::Iter<'a, u32>,
}

impl<'a, C: CoverageCell> Iterator for ScanlineCells<'a, C> {
    type Item = &'a C;

    fn next(&mut self) -> Option<&'a C> {
        self.indexes.next().map(|&index| self.cells.at(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indexes.size_hint()
    }
}

impl<C: CoverageCell> ExactSizeIterator for ScanlineCells<'_, C> {}

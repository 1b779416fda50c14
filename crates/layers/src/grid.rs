//! Dense per-pixel hit counters.
//!
//! Columns are cyclic (longitude wraps), rows are not: a write to a row
//! outside the grid is dropped.

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    /// Exclusive.
    pub x1: u32,
    /// Exclusive.
    pub y1: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DensityGrid {
    width: u32,
    height: u32,
    cells: Vec<u32>,
}

impl DensityGrid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if self.width == 0 || y < 0 || y >= self.height as i64 {
            return None;
        }
        let x = x.rem_euclid(self.width as i64);
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Count at `(x, y)`; `x` wraps, an out-of-range `y` reads as zero.
    pub fn get(&self, x: i64, y: i64) -> u32 {
        self.index(x, y).map_or(0, |i| self.cells[i])
    }

    /// Returns false when the row is off the grid.
    pub fn increment(&mut self, x: i64, y: i64) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = self.cells[i].saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Adds one to every cell of `[x0, x1) x [y0, y1)`, wrapping columns.
    pub fn stamp(&mut self, x0: i64, x1: i64, y0: i64, y1: i64) {
        // A stamp wider than the grid would count some columns twice.
        let x1 = x1.min(x0 + self.width as i64);
        for y in y0..y1 {
            for x in x0..x1 {
                self.increment(x, y);
            }
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    pub fn max_in(&self, rect: PixelRect) -> u32 {
        let mut best = 0;
        for y in rect.y0..rect.y1.min(self.height) {
            let row = y as usize * self.width as usize;
            for x in rect.x0..rect.x1.min(self.width) {
                best = best.max(self.cells[row + x as usize]);
            }
        }
        best
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().map(|c| *c as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::{DensityGrid, PixelRect};

    fn whole(g: &DensityGrid) -> PixelRect {
        PixelRect {
            x0: 0,
            y0: 0,
            x1: g.width(),
            y1: g.height(),
        }
    }

    #[test]
    fn columns_wrap_rows_do_not() {
        let mut g = DensityGrid::new(10, 5);
        assert!(g.increment(-1, 2));
        assert_eq!(g.get(9, 2), 1);
        assert_eq!(g.get(-1, 2), 1);

        assert!(!g.increment(3, 5));
        assert!(!g.increment(3, -1));
        assert_eq!(g.total(), 1);
    }

    #[test]
    fn stamp_straddling_the_seam_lands_on_both_sides() {
        let mut g = DensityGrid::new(10, 5);
        g.stamp(-1, 1, 0, 1);
        assert_eq!(g.get(9, 0), 1);
        assert_eq!(g.get(0, 0), 1);
        assert_eq!(g.total(), 2);
    }

    #[test]
    fn oversized_stamp_counts_each_column_once() {
        let mut g = DensityGrid::new(4, 2);
        g.stamp(-10, 10, 0, 1);
        assert_eq!(g.max_in(whole(&g)), 1);
        assert_eq!(g.total(), 4);
    }

    #[test]
    fn max_in_respects_the_rect() {
        let mut g = DensityGrid::new(8, 8);
        g.increment(1, 1);
        g.increment(1, 1);
        g.increment(6, 6);
        let rect = PixelRect {
            x0: 4,
            y0: 4,
            x1: 8,
            y1: 8,
        };
        assert_eq!(g.max_in(rect), 1);
        assert_eq!(g.max_in(whole(&g)), 2);
    }
}

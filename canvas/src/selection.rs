#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use crate::doc::{Cell, CellDelta};

/// Inclusive rectangular block of cells.
///
/// Always normalized: `x0 <= x1` and `y0 <= y1`. The only constructors are
/// [`SelectionBox::from_corners`] and [`SelectionBox::single`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionBox {
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
}

impl SelectionBox {
    /// Box spanning two arbitrary corner cells.
    #[must_use]
    pub fn from_corners(a: Cell, b: Cell) -> Self {
        Self { x0: a.x.min(b.x), y0: a.y.min(b.y), x1: a.x.max(b.x), y1: a.y.max(b.y) }
    }

    /// 1×1 box covering `cell`.
    #[must_use]
    pub fn single(cell: Cell) -> Self {
        Self::from_corners(cell, cell)
    }

    #[must_use]
    pub fn min(&self) -> Cell {
        Cell::new(self.x0, self.y0)
    }

    #[must_use]
    pub fn max(&self) -> Cell {
        Cell::new(self.x1, self.y1)
    }

    /// Width in cells (at least 1).
    #[must_use]
    pub fn width(&self) -> i32 {
        self.x1 - self.x0 + 1
    }

    /// Height in cells (at least 1).
    #[must_use]
    pub fn height(&self) -> i32 {
        self.y1 - self.y0 + 1
    }

    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.x0 && cell.x <= self.x1 && cell.y >= self.y0 && cell.y <= self.y1
    }

    /// The same box shifted by `delta`.
    #[must_use]
    pub fn translated(&self, delta: CellDelta) -> Self {
        Self::from_corners(self.min() + delta, self.max() + delta)
    }
}

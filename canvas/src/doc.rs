//! Document model: grid cells, the floor layer, and furniture placements.
//!
//! The editor's document is two stores. [`TileSet`] is the floor layer, a set
//! of occupied cells where a cell is either floor or empty. [`FurnitureStore`]
//! is an ordered list of catalog sprites bound to cells; order is draw order,
//! so later placements cover earlier ones on a shared cell.
//!
//! Both stores are mutated only by the input engine (`engine`) and read by the
//! live scene (`render`) and the exporter (`export`).

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::BTreeSet;
use std::ops::{Add, Sub};

use uuid::Uuid;

use crate::selection::SelectionBox;

/// Integer grid address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Translation between two cells, in whole cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellDelta {
    pub dx: i32,
    pub dy: i32,
}

impl CellDelta {
    pub const ZERO: Self = Self { dx: 0, dy: 0 };

    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

/// Saturates at the edge of the grid.
impl Add<CellDelta> for Cell {
    type Output = Cell;

    fn add(self, delta: CellDelta) -> Cell {
        Cell::new(self.x.saturating_add(delta.dx), self.y.saturating_add(delta.dy))
    }
}

/// Saturates when the distance does not fit in `i32`.
impl Sub for Cell {
    type Output = CellDelta;

    fn sub(self, other: Cell) -> CellDelta {
        CellDelta::new(self.x.saturating_sub(other.x), self.y.saturating_sub(other.y))
    }
}

// =============================================================
// Floor layer
// =============================================================

/// The floor layer: a set of occupied cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileSet {
    cells: BTreeSet<Cell>,
}

impl TileSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `cell` as floor. Returns `false` if it already was.
    pub fn add(&mut self, cell: Cell) -> bool {
        self.cells.insert(cell)
    }

    /// Clear `cell`. Returns `false` if it was already empty.
    pub fn remove(&mut self, cell: Cell) -> bool {
        self.cells.remove(&cell)
    }

    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// Move every cell matching `predicate` by `delta`.
    ///
    /// All matching cells are lifted first and then dropped at their new
    /// positions. A destination that is already floor (moved or not) absorbs
    /// the incoming cell, so the tile count can shrink. Returns how many cells
    /// were lifted.
    pub fn translate_subset(&mut self, predicate: impl Fn(Cell) -> bool, delta: CellDelta) -> usize {
        let lifted: Vec<Cell> = self.cells.iter().copied().filter(|c| predicate(*c)).collect();
        for cell in &lifted {
            self.cells.remove(cell);
        }
        for cell in &lifted {
            self.cells.insert(*cell + delta);
        }
        lifted.len()
    }

    /// Occupied cells in `(x, y)` order.
    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<Cell> for TileSet {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self { cells: iter.into_iter().collect() }
    }
}

// =============================================================
// Furniture layer
// =============================================================

/// One catalog sprite placed on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FurniturePlacement {
    /// Unique within the editing session.
    pub id: String,
    /// Catalog item id. May not resolve; unresolved items are kept but never drawn.
    pub item_id: String,
    pub cell: Cell,
    /// Always 0 for placements made in the editor.
    pub rotation: i32,
}

impl FurniturePlacement {
    /// A fresh placement with a random id and no rotation.
    #[must_use]
    pub fn new(item_id: impl Into<String>, cell: Cell) -> Self {
        Self { id: Uuid::new_v4().to_string(), item_id: item_id.into(), cell, rotation: 0 }
    }
}

/// Ordered furniture placements. Index order is draw order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FurnitureStore {
    placements: Vec<FurniturePlacement>,
}

impl FurnitureStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a placement on top of everything already placed.
    pub fn push(&mut self, placement: FurniturePlacement) {
        self.placements.push(placement);
    }

    /// Whether any placement sits on `cell`.
    #[must_use]
    pub fn any_at(&self, cell: Cell) -> bool {
        self.placements.iter().any(|p| p.cell == cell)
    }

    /// Remove every placement on `cell`, returning how many were removed.
    pub fn remove_at(&mut self, cell: Cell) -> usize {
        let before = self.placements.len();
        self.placements.retain(|p| p.cell != cell);
        before - self.placements.len()
    }

    /// Shift every placement inside `bounds` by `delta`. Placements never
    /// merge; several may end up sharing a cell. Returns how many moved.
    pub fn translate_within(&mut self, bounds: &SelectionBox, delta: CellDelta) -> usize {
        let mut moved = 0;
        for placement in self.placements.iter_mut().filter(|p| bounds.contains(p.cell)) {
            placement.cell = placement.cell + delta;
            moved += 1;
        }
        moved
    }

    /// Placements in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &FurniturePlacement> + '_ {
        self.placements.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

impl FromIterator<FurniturePlacement> for FurnitureStore {
    fn from_iter<I: IntoIterator<Item = FurniturePlacement>>(iter: I) -> Self {
        Self { placements: iter.into_iter().collect() }
    }
}

// =============================================================
// Demo layout
// =============================================================

/// The floor plan shown when no saved map is loaded: two rooms joined by a
/// corridor, a stub corridor heading north, and a loop into a small closet.
#[must_use]
pub fn demo_tiles() -> TileSet {
    let mut tiles = TileSet::new();
    add_rect(&mut tiles, 2, 3, 4, 4);
    add_line(&mut tiles, Cell::new(3, 0), Cell::new(3, 3));
    add_line(&mut tiles, Cell::new(6, 4), Cell::new(9, 4));
    add_rect(&mut tiles, 10, 3, 4, 4);
    add_line(&mut tiles, Cell::new(12, 6), Cell::new(12, 9));
    add_line(&mut tiles, Cell::new(12, 9), Cell::new(15, 9));
    add_line(&mut tiles, Cell::new(15, 9), Cell::new(15, 6));
    add_line(&mut tiles, Cell::new(15, 6), Cell::new(16, 6));
    add_rect(&mut tiles, 16, 6, 2, 2);
    tiles
}

fn add_rect(tiles: &mut TileSet, x0: i32, y0: i32, w: i32, h: i32) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            tiles.add(Cell::new(x, y));
        }
    }
}

/// Axis-aligned lines only; diagonal endpoints add nothing.
fn add_line(tiles: &mut TileSet, a: Cell, b: Cell) {
    if a.x == b.x {
        for y in a.y.min(b.y)..=a.y.max(b.y) {
            tiles.add(Cell::new(a.x, y));
        }
    }
    if a.y == b.y {
        for x in a.x.min(b.x)..=a.x.max(b.x) {
            tiles.add(Cell::new(x, a.y));
        }
    }
}

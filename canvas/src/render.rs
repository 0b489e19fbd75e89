//! Live scene: positions every visual for the current state and camera.
//!
//! The host draws a container carrying [`SceneTransform`] and places each
//! visual inside it at world-pixel coordinates, so panning and zooming only
//! change the transform. Nothing here mutates application state.
//!
//! Furniture whose item id is missing from the catalog is skipped.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::camera::{Camera, cell_to_world};
use crate::catalog;
use crate::consts::CELL_SIZE;
use crate::doc::{Cell, CellDelta, FurnitureStore, TileSet};
use crate::selection::SelectionBox;

/// Translate-then-scale applied to the whole scene container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl SceneTransform {
    /// CSS `transform` value, for a container with `transform-origin: 0 0`.
    #[must_use]
    pub fn css(&self) -> String {
        format!("translate({}px, {}px) scale({})", self.translate_x, self.translate_y, self.scale)
    }
}

/// One floor tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileVisual {
    pub cell: Cell,
    pub left: f64,
    pub top: f64,
    pub size: f64,
}

/// One furniture sprite.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteVisual {
    pub placement_id: String,
    pub item_id: &'static str,
    pub name: &'static str,
    pub asset: &'static str,
    pub left: f64,
    pub top: f64,
    pub size: f64,
}

/// The highlighted selection rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionVisual {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Everything the host needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub transform: SceneTransform,
    pub tiles: Vec<TileVisual>,
    /// Draw order; later sprites cover earlier ones.
    pub sprites: Vec<SpriteVisual>,
    pub selection: Option<SelectionVisual>,
}

/// Project stores, selection and camera into positioned visuals.
///
/// The selection rectangle is drawn offset by `pending`, so it follows an
/// uncommitted drag while the stores stay where they are.
#[must_use]
pub fn build_scene(
    tiles: &TileSet,
    furniture: &FurnitureStore,
    selection: Option<SelectionBox>,
    pending: CellDelta,
    camera: &Camera,
) -> Scene {
    let transform = SceneTransform { translate_x: camera.pan_x, translate_y: camera.pan_y, scale: camera.zoom };

    let tiles = tiles
        .iter()
        .map(|cell| {
            let origin = cell_to_world(cell);
            TileVisual { cell, left: origin.x, top: origin.y, size: CELL_SIZE }
        })
        .collect();

    let sprites = furniture
        .iter()
        .filter_map(|placement| {
            let item = catalog::lookup(&placement.item_id)?;
            let origin = cell_to_world(placement.cell);
            Some(SpriteVisual {
                placement_id: placement.id.clone(),
                item_id: item.id,
                name: item.name,
                asset: item.asset,
                left: origin.x,
                top: origin.y,
                size: CELL_SIZE,
            })
        })
        .collect();

    let selection = selection.map(|sel| {
        let origin = cell_to_world(sel.min() + pending);
        SelectionVisual {
            left: origin.x,
            top: origin.y,
            width: f64::from(sel.width()) * CELL_SIZE,
            height: f64::from(sel.height()) * CELL_SIZE,
        }
    });

    Scene { transform, tiles, sprites, selection }
}

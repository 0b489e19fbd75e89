#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::consts::{CELL_SIZE, WHEEL_ZOOM_STEP, ZOOM_DECIMALS, ZOOM_MAX, ZOOM_MIN};
use crate::doc::Cell;

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Viewport transform over the infinite grid.
///
/// `pan_x` / `pan_y` are the screen-pixel offset of world origin.
/// `zoom` is a scale factor in `[ZOOM_MIN, ZOOM_MAX]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Convert a screen-space point to world pixels.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan_x) / self.zoom,
            y: (screen.y - self.pan_y) / self.zoom,
        }
    }

    /// Convert a world-space point to screen pixels.
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.zoom + self.pan_x,
            y: world.y * self.zoom + self.pan_y,
        }
    }

    /// The grid cell under a screen-space point.
    #[must_use]
    pub fn screen_to_cell(&self, screen: Point) -> Cell {
        world_to_cell(self.screen_to_world(screen))
    }

    /// Current pan offset as a point.
    #[must_use]
    pub fn pan(&self) -> Point {
        Point::new(self.pan_x, self.pan_y)
    }

    /// Set the pan offset so the world stays glued to the pointer during a drag.
    pub fn drag_pan(&mut self, start_pan: Point, start_screen: Point, current_screen: Point) {
        self.pan_x = start_pan.x + (current_screen.x - start_screen.x);
        self.pan_y = start_pan.y + (current_screen.y - start_screen.y);
    }

    /// Multiply zoom by `factor`, keeping the world point under `screen` fixed.
    ///
    /// Returns `false` and leaves the camera untouched when the clamped zoom
    /// equals the current one, or when `factor` is not a finite positive number.
    #[allow(clippy::float_cmp)]
    pub fn zoom_at(&mut self, screen: Point, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let old_zoom = self.zoom;
        let new_zoom = round_zoom(clamp_zoom(old_zoom * factor));
        if new_zoom == old_zoom {
            return false;
        }

        let anchor = self.screen_to_world(screen);
        self.zoom = new_zoom;
        self.pan_x = screen.x - anchor.x * new_zoom;
        self.pan_y = screen.y - anchor.y * new_zoom;
        true
    }
}

/// The grid cell containing a world-space point.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn world_to_cell(world: Point) -> Cell {
    Cell::new((world.x / CELL_SIZE).floor() as i32, (world.y / CELL_SIZE).floor() as i32)
}

/// Top-left corner of a cell in world pixels.
#[must_use]
pub fn cell_to_world(cell: Cell) -> Point {
    Point::new(f64::from(cell.x) * CELL_SIZE, f64::from(cell.y) * CELL_SIZE)
}

/// Zoom factor for one wheel event: scrolling down zooms out, anything else zooms in.
#[must_use]
pub fn wheel_zoom_factor(delta_y: f64) -> f64 {
    if delta_y > 0.0 { 1.0 / WHEEL_ZOOM_STEP } else { WHEEL_ZOOM_STEP }
}

#[must_use]
pub fn clamp_zoom(zoom: f64) -> f64 {
    zoom.clamp(ZOOM_MIN, ZOOM_MAX)
}

fn round_zoom(zoom: f64) -> f64 {
    let scale = 10_f64.powi(ZOOM_DECIMALS);
    (zoom * scale).round() / scale
}

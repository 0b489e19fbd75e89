//! Shared numeric constants for the canvas crate.

// ── Grid ────────────────────────────────────────────────────────

/// Edge length of one grid cell in world pixels.
pub const CELL_SIZE: f64 = 64.0;

// ── Camera ──────────────────────────────────────────────────────

/// Smallest allowed zoom factor.
pub const ZOOM_MIN: f64 = 0.4;

/// Largest allowed zoom factor.
pub const ZOOM_MAX: f64 = 2.5;

/// Zoom multiplier applied per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 1.1;

/// Zoom values are rounded to this many decimal places after each change.
pub const ZOOM_DECIMALS: i32 = 3;

// ── Export ──────────────────────────────────────────────────────

/// Empty cells added around the content on every side of an export.
pub const EXPORT_PADDING_CELLS: i32 = 1;

/// Upper bound on the device pixel multiplier used for exports.
pub const EXPORT_MAX_DPR: f64 = 2.0;

/// Largest exported image side, in device pixels.
pub const EXPORT_MAX_SIDE_PX: u32 = 16_384;

/// Spacing of the dotted accent pattern, in world pixels.
pub const DOT_STEP_PX: f64 = 14.0;

/// Radius of each accent dot, in world pixels.
pub const DOT_RADIUS_PX: f64 = 1.2;

/// Outline width of an exported tile, in world pixels.
pub const TILE_STROKE_PX: f64 = 3.0;

/// Export background (`#f2f2f2`).
pub const BACKGROUND_RGBA: [u8; 4] = [0xf2, 0xf2, 0xf2, 0xff];

/// Accent color for dots and tile outlines (`#eda031`).
pub const ACCENT_RGBA: [u8; 4] = [0xed, 0xa0, 0x31, 0xff];

/// Tile fill (`#d9d9d9`).
pub const TILE_RGBA: [u8; 4] = [0xd9, 0xd9, 0xd9, 0xff];

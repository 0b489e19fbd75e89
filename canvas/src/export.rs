//! Offscreen PNG export of the whole map.
//!
//! DESIGN
//! ======
//! Export ignores the live camera. The surface covers the bounding box of all
//! tiles and furniture plus one empty cell on every side. Sprites for every
//! distinct catalog item in use are fetched concurrently and the raster pass
//! only starts once all of them are in hand; it is synchronous and pure.
//!
//! ERROR HANDLING
//! ==============
//! An empty map is rejected before anything is allocated, and so is a map
//! whose padded bounds leave the `i32` grid or whose image would exceed
//! `EXPORT_MAX_SIDE_PX`. A single sprite that fails to load fails the whole
//! export; no partial image is produced.
//! Nothing is cached between exports.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;
use std::path::PathBuf;

use async_trait::async_trait;
use futures::future::try_join_all;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tracing::{info, warn};

use crate::catalog::{self, CatalogItem};
use crate::consts::{
    ACCENT_RGBA, BACKGROUND_RGBA, CELL_SIZE, DOT_RADIUS_PX, DOT_STEP_PX, EXPORT_MAX_DPR, EXPORT_MAX_SIDE_PX,
    EXPORT_PADDING_CELLS, TILE_RGBA, TILE_STROKE_PX,
};
use crate::doc::{Cell, FurnitureStore, TileSet};

/// File name of every exported image.
pub const EXPORT_FILE_NAME: &str = "map.png";

/// Why a sprite could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum SpriteError {
    #[error("failed to read sprite: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode sprite: {0}")]
    Decode(#[from] image::ImageError),
}

/// Why an export produced no file.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Nothing to draw. The message is shown to the user as-is.
    #[error("No tiles or furniture for export")]
    Empty,
    /// Padding would push the bounds past the edge of the grid.
    #[error("Map extends past the edge of the grid")]
    OutOfRange,
    #[error("Map is too large to export ({width}x{height} px)")]
    TooLarge { width: u64, height: u64 },
    #[error("failed to load sprite for `{item_id}`: {source}")]
    SpriteLoad {
        item_id: &'static str,
        #[source]
        source: SpriteError,
    },
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Where sprite images come from.
#[async_trait]
pub trait SpriteSource: Send + Sync {
    /// Load and decode the sprite for `item`.
    async fn load(&self, item: &'static CatalogItem) -> Result<DynamicImage, SpriteError>;
}

/// Reads sprites from `<root>/<asset file name>`.
#[derive(Debug, Clone)]
pub struct DirSpriteSource {
    root: PathBuf,
}

impl DirSpriteSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SpriteSource for DirSpriteSource {
    async fn load(&self, item: &'static CatalogItem) -> Result<DynamicImage, SpriteError> {
        let bytes = tokio::fs::read(self.root.join(item.asset)).await?;
        Ok(image::load_from_memory(&bytes)?)
    }
}

/// Inclusive cell range covered by an export, padding included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportBounds {
    pub min: Cell,
    pub max: Cell,
}

impl ExportBounds {
    /// Bounds over every tile and placement, padded on all sides.
    ///
    /// # Errors
    ///
    /// [`ExportError::Empty`] when both stores are empty,
    /// [`ExportError::OutOfRange`] when a padded edge does not fit in `i32`.
    pub fn compute(tiles: &TileSet, furniture: &FurnitureStore) -> Result<Self, ExportError> {
        let mut cells = tiles.iter().chain(furniture.iter().map(|p| p.cell));
        let first = cells.next().ok_or(ExportError::Empty)?;
        let (min, max) = cells.fold((first, first), |(min, max), c| {
            (Cell::new(min.x.min(c.x), min.y.min(c.y)), Cell::new(max.x.max(c.x), max.y.max(c.y)))
        });

        let pad = EXPORT_PADDING_CELLS;
        let padded = |v: i32, by: i32| v.checked_add(by).ok_or(ExportError::OutOfRange);
        Ok(Self {
            min: Cell::new(padded(min.x, -pad)?, padded(min.y, -pad)?),
            max: Cell::new(padded(max.x, pad)?, padded(max.y, pad)?),
        })
    }

    #[must_use]
    pub fn width_cells(&self) -> i64 {
        i64::from(self.max.x) - i64::from(self.min.x) + 1
    }

    #[must_use]
    pub fn height_cells(&self) -> i64 {
        i64::from(self.max.y) - i64::from(self.min.y) + 1
    }

    /// Image size in device pixels at `dpr`.
    ///
    /// # Errors
    ///
    /// [`ExportError::TooLarge`] when either side exceeds `EXPORT_MAX_SIDE_PX`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn pixel_size(&self, dpr: f64) -> Result<(u32, u32), ExportError> {
        let scale = effective_dpr(dpr);
        let side = |cells: i64| (cells as f64 * CELL_SIZE * scale).floor() as u64;
        let (width, height) = (side(self.width_cells()), side(self.height_cells()));
        if width > u64::from(EXPORT_MAX_SIDE_PX) || height > u64::from(EXPORT_MAX_SIDE_PX) {
            return Err(ExportError::TooLarge { width, height });
        }
        Ok((width as u32, height as u32))
    }

    /// Top-left of `cell` on the unscaled surface.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn local_origin(&self, cell: Cell) -> (f64, f64) {
        let dx = i64::from(cell.x) - i64::from(self.min.x);
        let dy = i64::from(cell.y) - i64::from(self.min.y);
        (dx as f64 * CELL_SIZE, dy as f64 * CELL_SIZE)
    }
}

/// The finished image, ready to be written under [`EXPORT_FILE_NAME`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: &'static str,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// Device pixel multiplier actually used: non-positive or non-finite input
/// means 1, anything above the cap is clamped.
#[must_use]
pub fn effective_dpr(dpr: f64) -> f64 {
    if dpr.is_finite() && dpr > 0.0 { dpr.min(EXPORT_MAX_DPR) } else { 1.0 }
}

/// Fetch every distinct sprite used by `furniture`, all at once.
///
/// # Errors
///
/// Returns [`ExportError::SpriteLoad`] for the first sprite that fails.
pub async fn load_sprites(
    furniture: &FurnitureStore,
    source: &dyn SpriteSource,
) -> Result<HashMap<&'static str, DynamicImage>, ExportError> {
    let distinct: BTreeMap<&'static str, &'static CatalogItem> = furniture
        .iter()
        .filter_map(|p| catalog::lookup(&p.item_id))
        .map(|item| (item.id, item))
        .collect();

    let loads = distinct.into_values().map(|item| async move {
        match source.load(item).await {
            Ok(image) => Ok((item.id, image)),
            Err(err) => {
                warn!(item_id = item.id, error = %err, "sprite load failed");
                Err(ExportError::SpriteLoad { item_id: item.id, source: err })
            }
        }
    });

    Ok(try_join_all(loads).await?.into_iter().collect())
}

/// Draw the map onto a fresh surface.
///
/// Layers, bottom first: background, dot pattern, tiles with outlines,
/// furniture in store order. Callers check [`ExportBounds::pixel_size`] first;
/// [`export_png`] does.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
#[must_use]
pub fn rasterize(
    tiles: &TileSet,
    furniture: &FurnitureStore,
    bounds: ExportBounds,
    sprites: &HashMap<&'static str, DynamicImage>,
    dpr: f64,
) -> RgbaImage {
    let scale = effective_dpr(dpr);
    let logical_w = bounds.width_cells() as f64 * CELL_SIZE;
    let logical_h = bounds.height_cells() as f64 * CELL_SIZE;
    let mut surface = Surface {
        image: RgbaImage::from_pixel(
            (logical_w * scale).floor() as u32,
            (logical_h * scale).floor() as u32,
            Rgba(BACKGROUND_RGBA),
        ),
        scale,
    };

    surface.dot_pattern(logical_w, logical_h);

    let half = TILE_STROKE_PX / 2.0;
    for cell in tiles.iter() {
        let (x, y) = bounds.local_origin(cell);
        surface.fill_rect(x, y, CELL_SIZE, CELL_SIZE, TILE_RGBA);
        surface.fill_rect(x - half, y - half, CELL_SIZE + TILE_STROKE_PX, TILE_STROKE_PX, ACCENT_RGBA);
        surface.fill_rect(x - half, y + CELL_SIZE - half, CELL_SIZE + TILE_STROKE_PX, TILE_STROKE_PX, ACCENT_RGBA);
        surface.fill_rect(x - half, y - half, TILE_STROKE_PX, CELL_SIZE + TILE_STROKE_PX, ACCENT_RGBA);
        surface.fill_rect(x + CELL_SIZE - half, y - half, TILE_STROKE_PX, CELL_SIZE + TILE_STROKE_PX, ACCENT_RGBA);
    }

    let sprite_px = (CELL_SIZE * scale).round() as u32;
    for placement in furniture.iter() {
        let Some(sprite) = sprites.get(placement.item_id.as_str()) else {
            continue;
        };
        let resized = imageops::resize(&sprite.to_rgba8(), sprite_px, sprite_px, FilterType::Nearest);
        let (x, y) = bounds.local_origin(placement.cell);
        imageops::overlay(&mut surface.image, &resized, (x * scale).round() as i64, (y * scale).round() as i64);
    }

    surface.image
}

/// Encode a surface as PNG bytes.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if the encoder fails.
pub fn encode_png(image: RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Full export: validate, fetch sprites, rasterize, encode.
///
/// # Errors
///
/// [`ExportError::Empty`] when there is nothing to draw,
/// [`ExportError::OutOfRange`] or [`ExportError::TooLarge`] when the map
/// cannot fit in an image, otherwise whatever sprite loading or encoding
/// reports.
pub async fn export_png(
    tiles: &TileSet,
    furniture: &FurnitureStore,
    source: &dyn SpriteSource,
    dpr: f64,
) -> Result<ExportArtifact, ExportError> {
    let bounds = match ExportBounds::compute(tiles, furniture).and_then(|b| b.pixel_size(dpr).map(|_| b)) {
        Ok(bounds) => bounds,
        Err(err) => {
            warn!(error = %err, "export rejected before rasterizing");
            return Err(err);
        }
    };

    let sprites = load_sprites(furniture, source).await?;
    let image = rasterize(tiles, furniture, bounds, &sprites, dpr);
    let (width, height) = image.dimensions();
    let bytes = encode_png(image)?;

    info!(width, height, tiles = tiles.len(), furniture = furniture.len(), "map exported");
    Ok(ExportArtifact { file_name: EXPORT_FILE_NAME, width, height, bytes })
}

/// Raster target addressed in unscaled (world-pixel) coordinates.
struct Surface {
    image: RgbaImage,
    scale: f64,
}

impl Surface {
    /// Fill every pixel whose center lies inside the rectangle. No blending.
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: [u8; 4]) {
        let (px0, px1) = self.pixel_span(x, x + w, self.image.width());
        let (py0, py1) = self.pixel_span(y, y + h, self.image.height());
        for py in py0..py1 {
            for px in px0..px1 {
                self.image.put_pixel(px, py, Rgba(color));
            }
        }
    }

    /// Tile the dot pattern from the surface origin: one dot centered in every
    /// `DOT_STEP_PX` square.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn dot_pattern(&mut self, logical_w: f64, logical_h: f64) {
        let cols = (logical_w / DOT_STEP_PX).ceil() as u32;
        let rows = (logical_h / DOT_STEP_PX).ceil() as u32;
        for row in 0..rows {
            for col in 0..cols {
                let cx = (f64::from(col) + 0.5) * DOT_STEP_PX;
                let cy = (f64::from(row) + 0.5) * DOT_STEP_PX;
                self.fill_circle(cx, cy, DOT_RADIUS_PX, ACCENT_RGBA);
            }
        }
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: [u8; 4]) {
        let (px0, px1) = self.pixel_span(cx - r, cx + r, self.image.width());
        let (py0, py1) = self.pixel_span(cy - r, cy + r, self.image.height());
        let (scx, scy, sr) = (cx * self.scale, cy * self.scale, r * self.scale);
        for py in py0..py1 {
            for px in px0..px1 {
                let dx = f64::from(px) + 0.5 - scx;
                let dy = f64::from(py) + 0.5 - scy;
                if dx * dx + dy * dy <= sr * sr {
                    self.image.put_pixel(px, py, Rgba(color));
                }
            }
        }
    }

    /// Pixel indices `[start, end)` whose centers fall in `[from, to)` once
    /// scaled, clipped to `[0, limit)`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn pixel_span(&self, from: f64, to: f64, limit: u32) -> (u32, u32) {
        let clip = |v: f64| (v * self.scale - 0.5).ceil().clamp(0.0, f64::from(limit)) as u32;
        (clip(from), clip(to))
    }
}

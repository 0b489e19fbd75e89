#![allow(clippy::float_cmp)]

use std::sync::Mutex;

use super::*;
use crate::doc::FurniturePlacement;

const RED: [u8; 4] = [0xff, 0x00, 0x00, 0xff];
const BLUE: [u8; 4] = [0x00, 0x00, 0xff, 0xff];

// =============================================================
// Helpers
// =============================================================

struct FakeSprites {
    colors: HashMap<&'static str, [u8; 4]>,
    fail: Option<&'static str>,
    loaded: Mutex<Vec<&'static str>>,
}

impl FakeSprites {
    fn new() -> Self {
        let colors = HashMap::from([("shell1", RED), ("boxes", BLUE)]);
        Self { colors, fail: None, loaded: Mutex::new(Vec::new()) }
    }

    fn failing(item_id: &'static str) -> Self {
        Self { fail: Some(item_id), ..Self::new() }
    }

    fn loaded(&self) -> Vec<&'static str> {
        let mut ids = self.loaded.lock().expect("lock").clone();
        ids.sort_unstable();
        ids
    }
}

#[async_trait]
impl SpriteSource for FakeSprites {
    async fn load(&self, item: &'static CatalogItem) -> Result<DynamicImage, SpriteError> {
        self.loaded.lock().expect("lock").push(item.id);
        if self.fail == Some(item.id) {
            return Err(SpriteError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "missing sprite")));
        }
        let color = self.colors.get(item.id).copied().unwrap_or([0, 0, 0, 0xff]);
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba(color))))
    }
}

fn tiles(cells: &[(i32, i32)]) -> TileSet {
    cells.iter().map(|&(x, y)| Cell::new(x, y)).collect()
}

fn furniture(items: &[(&str, i32, i32)]) -> FurnitureStore {
    items
        .iter()
        .map(|&(id, x, y)| FurniturePlacement::new(id, Cell::new(x, y)))
        .collect()
}

fn pixel(image: &RgbaImage, x: u32, y: u32) -> [u8; 4] {
    image.get_pixel(x, y).0
}

// =============================================================
// Bounds
// =============================================================

#[test]
fn bounds_pad_one_cell_on_every_side() {
    let bounds = ExportBounds::compute(&tiles(&[(0, 0), (2, 2)]), &FurnitureStore::new()).expect("bounds");
    assert_eq!(bounds.min, Cell::new(-1, -1));
    assert_eq!(bounds.max, Cell::new(3, 3));
    assert_eq!(bounds.width_cells(), 5);
    assert_eq!(bounds.height_cells(), 5);
}

#[test]
fn bounds_include_furniture_cells() {
    let bounds =
        ExportBounds::compute(&tiles(&[(0, 0)]), &furniture(&[("shell1", -4, 6)])).expect("bounds");
    assert_eq!(bounds.min, Cell::new(-5, -1));
    assert_eq!(bounds.max, Cell::new(1, 7));
}

#[test]
fn bounds_from_furniture_only() {
    let bounds = ExportBounds::compute(&TileSet::new(), &furniture(&[("ghost", 3, 3)])).expect("bounds");
    assert_eq!(bounds.min, Cell::new(2, 2));
    assert_eq!(bounds.max, Cell::new(4, 4));
}

#[test]
fn bounds_empty_map_is_empty_error() {
    let err = ExportBounds::compute(&TileSet::new(), &FurnitureStore::new()).expect_err("empty");
    assert!(matches!(err, ExportError::Empty));
}

#[test]
fn bounds_at_grid_edge_are_out_of_range() {
    for cell in [(i32::MIN, 0), (i32::MAX, 0), (0, i32::MIN), (0, i32::MAX)] {
        let err = ExportBounds::compute(&tiles(&[cell]), &FurnitureStore::new()).expect_err("edge");
        assert!(matches!(err, ExportError::OutOfRange), "{cell:?}");
    }
    let err = ExportBounds::compute(&TileSet::new(), &furniture(&[("boxes", i32::MIN, i32::MAX)]))
        .expect_err("edge");
    assert!(matches!(err, ExportError::OutOfRange));
}

#[test]
fn bounds_spanning_the_grid_measure_in_i64() {
    let bounds = ExportBounds::compute(&tiles(&[(i32::MIN + 1, 0), (i32::MAX - 1, 0)]), &FurnitureStore::new())
        .expect("bounds");
    assert_eq!(bounds.width_cells(), i64::from(u32::MAX) + 1);
    assert_eq!(bounds.height_cells(), 3);
    assert_eq!(bounds.local_origin(Cell::new(i32::MAX, 0)).0, f64::from(u32::MAX) * CELL_SIZE);
}

#[test]
fn pixel_size_scales_with_dpr() {
    let bounds = ExportBounds { min: Cell::new(-1, -1), max: Cell::new(3, 1) };
    assert_eq!(bounds.pixel_size(1.0).expect("size"), (320, 192));
    assert_eq!(bounds.pixel_size(2.0).expect("size"), (640, 384));
}

#[test]
fn pixel_size_rejects_oversized_maps() {
    let bounds = ExportBounds { min: Cell::new(i32::MIN, 0), max: Cell::new(i32::MAX, 0) };
    let err = bounds.pixel_size(1.0).expect_err("too large");
    assert!(matches!(err, ExportError::TooLarge { height: 64, .. }));
}

#[test]
fn local_origin_is_offset_from_padded_min() {
    let bounds = ExportBounds { min: Cell::new(-1, -1), max: Cell::new(3, 3) };
    assert_eq!(bounds.local_origin(Cell::new(0, 0)), (64.0, 64.0));
    assert_eq!(bounds.local_origin(Cell::new(2, 2)), (192.0, 192.0));
}

// =============================================================
// Device pixel ratio
// =============================================================

#[test]
fn effective_dpr_is_capped_and_defaulted() {
    assert!((effective_dpr(1.5) - 1.5).abs() < f64::EPSILON);
    assert!((effective_dpr(3.0) - 2.0).abs() < f64::EPSILON);
    assert!((effective_dpr(0.0) - 1.0).abs() < f64::EPSILON);
    assert!((effective_dpr(f64::NAN) - 1.0).abs() < f64::EPSILON);
}

// =============================================================
// Raster
// =============================================================

#[test]
fn surface_size_is_cells_times_cell_size_times_dpr() {
    let t = tiles(&[(0, 0)]);
    let f = FurnitureStore::new();
    let bounds = ExportBounds::compute(&t, &f).expect("bounds");
    let sprites = HashMap::new();

    assert_eq!(rasterize(&t, &f, bounds, &sprites, 1.0).dimensions(), (192, 192));
    assert_eq!(rasterize(&t, &f, bounds, &sprites, 2.0).dimensions(), (384, 384));
    assert_eq!(rasterize(&t, &f, bounds, &sprites, 4.0).dimensions(), (384, 384));
    assert_eq!(rasterize(&t, &f, bounds, &sprites, 1.25).dimensions(), (240, 240));
}

#[test]
fn raster_layers_background_dots_tiles_and_outline() {
    let t = tiles(&[(0, 0)]);
    let f = FurnitureStore::new();
    let bounds = ExportBounds::compute(&t, &f).expect("bounds");
    let image = rasterize(&t, &f, bounds, &HashMap::new(), 1.0);

    assert_eq!(pixel(&image, 0, 0), BACKGROUND_RGBA);
    assert_eq!(pixel(&image, 6, 6), ACCENT_RGBA, "first dot centered at (7, 7)");
    assert_eq!(pixel(&image, 100, 100), TILE_RGBA);
    assert_eq!(pixel(&image, 64, 100), ACCENT_RGBA, "left outline");
    assert_eq!(pixel(&image, 62, 100), ACCENT_RGBA, "outline straddles the edge");
    assert_eq!(pixel(&image, 128, 100), ACCENT_RGBA, "right outline");
    assert_eq!(pixel(&image, 100, 61), BACKGROUND_RGBA);
}

#[test]
fn later_furniture_overdraws_earlier_on_shared_cell() {
    let t = tiles(&[(0, 0)]);
    let f = furniture(&[("shell1", 0, 0), ("boxes", 0, 0)]);
    let bounds = ExportBounds::compute(&t, &f).expect("bounds");
    let sprites = HashMap::from([
        ("shell1", DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba(RED)))),
        ("boxes", DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba(BLUE)))),
    ]);
    let image = rasterize(&t, &f, bounds, &sprites, 1.0);
    assert_eq!(pixel(&image, 96, 96), BLUE);
    assert_eq!(pixel(&image, 64, 64), BLUE, "sprite scaled to the full cell");

    let f = furniture(&[("boxes", 0, 0), ("shell1", 0, 0)]);
    let image = rasterize(&t, &f, bounds, &sprites, 1.0);
    assert_eq!(pixel(&image, 96, 96), RED);
}

#[test]
fn unresolved_furniture_is_skipped() {
    let t = tiles(&[(0, 0)]);
    let f = furniture(&[("ghost", 0, 0)]);
    let bounds = ExportBounds::compute(&t, &f).expect("bounds");
    let image = rasterize(&t, &f, bounds, &HashMap::new(), 1.0);
    assert_eq!(pixel(&image, 100, 100), TILE_RGBA);
}

// =============================================================
// Sprite loading
// =============================================================

#[tokio::test]
async fn load_sprites_fetches_each_distinct_item_once() {
    let source = FakeSprites::new();
    let f = furniture(&[("shell1", 0, 0), ("boxes", 1, 0), ("shell1", 2, 0), ("ghost", 3, 0)]);
    let sprites = load_sprites(&f, &source).await.expect("sprites");
    assert_eq!(sprites.len(), 2);
    assert_eq!(source.loaded(), vec!["boxes", "shell1"]);
}

#[tokio::test]
async fn load_sprites_fails_if_any_sprite_fails() {
    let source = FakeSprites::failing("boxes");
    let f = furniture(&[("shell1", 0, 0), ("boxes", 1, 0)]);
    let err = load_sprites(&f, &source).await.expect_err("should fail");
    assert!(matches!(err, ExportError::SpriteLoad { item_id: "boxes", .. }));
}

#[tokio::test]
async fn dir_sprite_source_reads_and_decodes_png() {
    let dir = tempfile::tempdir().expect("tempdir");
    let item = catalog::lookup("shell1").expect("catalog item");
    RgbaImage::from_pixel(4, 4, Rgba(RED)).save(dir.path().join(item.asset)).expect("write sprite");

    let source = DirSpriteSource::new(dir.path());
    let sprite = source.load(item).await.expect("load");
    assert_eq!(sprite.to_rgba8().get_pixel(0, 0).0, RED);

    let missing = catalog::lookup("shield").expect("catalog item");
    assert!(matches!(source.load(missing).await, Err(SpriteError::Io(_))));
}

// =============================================================
// export_png
// =============================================================

#[tokio::test]
async fn export_empty_map_is_rejected_without_loading() {
    let source = FakeSprites::new();
    let err = export_png(&TileSet::new(), &FurnitureStore::new(), &source, 1.0)
        .await
        .expect_err("empty");
    assert!(matches!(err, ExportError::Empty));
    assert_eq!(err.to_string(), "No tiles or furniture for export");
    assert!(source.loaded().is_empty());
}

#[tokio::test]
async fn export_produces_named_png() {
    let source = FakeSprites::new();
    let t = tiles(&[(0, 0), (2, 2)]);
    let f = furniture(&[("shell1", 1, 1)]);
    let artifact = export_png(&t, &f, &source, 1.0).await.expect("export");

    assert_eq!(artifact.file_name, "map.png");
    assert_eq!((artifact.width, artifact.height), (320, 320));
    let decoded = image::load_from_memory(&artifact.bytes).expect("valid png").to_rgba8();
    assert_eq!(decoded.dimensions(), (320, 320));
    assert_eq!(decoded.get_pixel(160, 160).0, RED);
}

#[tokio::test]
async fn export_fails_atomically_on_sprite_error() {
    let source = FakeSprites::failing("shell1");
    let err = export_png(&tiles(&[(0, 0)]), &furniture(&[("shell1", 0, 0)]), &source, 2.0)
        .await
        .expect_err("sprite failure");
    assert!(matches!(err, ExportError::SpriteLoad { item_id: "shell1", .. }));
}

#[tokio::test]
async fn export_at_extreme_coordinates_is_rejected_without_loading() {
    let source = FakeSprites::new();
    let err = export_png(&tiles(&[(i32::MIN, 0)]), &furniture(&[("shell1", 0, 0)]), &source, 1.0)
        .await
        .expect_err("out of range");
    assert!(matches!(err, ExportError::OutOfRange));

    let err = export_png(&tiles(&[(-1_000_000, 0), (1_000_000, 0)]), &FurnitureStore::new(), &source, 1.0)
        .await
        .expect_err("too large");
    assert!(matches!(err, ExportError::TooLarge { .. }));
    assert!(source.loaded().is_empty());
}

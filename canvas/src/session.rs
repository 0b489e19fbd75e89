//! Map session: ties the editor stores to a persisted map record.
//!
//! DESIGN
//! ======
//! The session remembers which stored map (if any) the editor is showing,
//! its name and version, and the last user-visible error. Load and save go
//! through the [`MapStore`] collaborator; nothing retries, and a failure
//! leaves the editor stores untouched.
//!
//! The initial load is fire-and-forget from the host's point of view. A
//! [`ViewLiveness`] token lets the host drop the result if the view was torn
//! down while the read was in flight.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use maps::{FurnitureDto, MapId, MapRecord, MapStore, SaveMapRequest, StoreError, TileDto, TileKind};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::doc::{Cell, FurniturePlacement, FurnitureStore, TileSet};
use crate::engine::EngineCore;

/// Name used when the user leaves the name blank.
pub const DEFAULT_MAP_NAME: &str = "Untitled map";

/// Persistence state of the map being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSession {
    /// `None` until the map has been created in the store.
    pub map_id: Option<MapId>,
    pub name: String,
    pub version: i64,
    /// Last load/save failure, shown to the user as-is.
    pub error: Option<String>,
    /// True while a save is in flight.
    pub saving: bool,
}

impl Default for MapSession {
    fn default() -> Self {
        Self { map_id: None, name: DEFAULT_MAP_NAME.to_owned(), version: 1, error: None, saving: false }
    }
}

impl MapSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the editor layout with `record` and adopt its identity.
    pub fn apply_record(&mut self, core: &mut EngineCore, record: &MapRecord) {
        let tiles: TileSet = record.tiles.iter().map(|t| Cell::new(t.x, t.y)).collect();
        let furniture: FurnitureStore = record
            .furniture
            .iter()
            .map(|f| FurniturePlacement {
                id: f.id.map_or_else(|| Uuid::new_v4().to_string(), |id| id.to_string()),
                item_id: f.item_id.clone(),
                cell: Cell::new(f.x, f.y),
                rotation: f.rotation,
            })
            .collect();

        info!(map_id = record.id, tiles = tiles.len(), furniture = furniture.len(), "map loaded");
        core.replace_layout(tiles, furniture);
        self.map_id = Some(record.id);
        self.name.clone_from(&record.name);
        self.version = record.version;
        self.error = None;
    }

    /// Payload for the next create/update.
    ///
    /// Furniture is sent without storage ids; the service assigns them.
    #[must_use]
    pub fn save_request(&self, core: &EngineCore, name_override: Option<&str>) -> SaveMapRequest {
        let name = name_override.unwrap_or(self.name.as_str()).trim();
        let name = if name.is_empty() { DEFAULT_MAP_NAME } else { name };

        SaveMapRequest {
            name: name.to_owned(),
            version: self.version,
            tiles: core.tiles.iter().map(|c| TileDto { x: c.x, y: c.y, kind: TileKind::Floor }).collect(),
            furniture: core
                .furniture
                .iter()
                .map(|p| FurnitureDto { id: None, item_id: p.item_id.clone(), x: p.cell.x, y: p.cell.y, rotation: 0 })
                .collect(),
        }
    }

    /// Create the map if it has no id yet, otherwise overwrite it.
    ///
    /// Concurrent saves are not serialized; whichever response arrives last
    /// wins the session's id and version.
    ///
    /// # Errors
    ///
    /// Returns the store error after recording its message in [`Self::error`].
    pub async fn save(
        &mut self,
        store: &dyn MapStore,
        core: &EngineCore,
        name_override: Option<&str>,
    ) -> Result<MapRecord, StoreError> {
        let req = self.save_request(core, name_override);
        self.saving = true;
        self.error = None;

        let result = match self.map_id {
            None => store.create(&req).await,
            Some(id) => store.update(id, &req).await,
        };
        self.saving = false;

        match result {
            Ok(record) => {
                info!(map_id = record.id, version = record.version, "map saved");
                self.map_id = Some(record.id);
                self.version = record.version;
                self.name.clone_from(&record.name);
                Ok(record)
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Record a store failure for display.
    pub fn fail(&mut self, err: &StoreError) {
        warn!(error = %err, "map store request failed");
        self.error = Some(err.to_string());
    }
}

/// Shared flag telling in-flight work whether its view still exists.
#[derive(Debug, Clone)]
pub struct ViewLiveness(Arc<AtomicBool>);

impl Default for ViewLiveness {
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}

impl ViewLiveness {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the view gone. Every clone observes it.
    pub fn dispose(&self) {
        self.0.store(false, Ordering::Release);
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Read the map named at editor start.
///
/// Returns `Ok(None)` when the view was disposed before the read finished,
/// whatever the outcome of the read.
///
/// # Errors
///
/// Returns the store error if the read failed and the view is still alive.
pub async fn load_initial(
    store: &dyn MapStore,
    id: MapId,
    liveness: &ViewLiveness,
) -> Result<Option<MapRecord>, StoreError> {
    let result = store.read(id).await;
    if !liveness.is_alive() {
        debug!(map_id = id, "view disposed before load finished");
        return Ok(None);
    }
    result.map(Some)
}

/// Extract `mapId` from a URL query string such as `?mapId=12&x=1`.
#[must_use]
pub fn map_id_from_query(query: &str) -> Option<MapId> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let (_, value) = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "mapId")?;
    match value.parse::<MapId>() {
        Ok(id) => Some(id),
        Err(err) => {
            debug!(value, error = %err, "ignoring non-numeric map id");
            None
        }
    }
}

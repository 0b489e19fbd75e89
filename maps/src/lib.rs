//! Persisted map model and the storage collaborator contract.
//!
//! This crate owns the wire representation shared by the editor engine
//! (`canvas`), the REST implementation (`client`) and the `mapmaker` CLI.
//! The storage service itself lives elsewhere; everything here describes what
//! the editor sends and expects back.


use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Server-assigned map identifier.
pub type MapId = i64;

/// Error returned by every [`MapStore`] operation.
///
/// The `Display` output is the message shown to the user verbatim.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("{0}")]
    Transport(String),
    /// The service answered with a non-success status.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body text, or `HTTP <status>` when the body was empty.
        message: String,
    },
    /// The response body could not be decoded into the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl StoreError {
    /// Build a status error, preferring the response body text as the message.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() { format!("HTTP {status}") } else { body.to_owned() };
        Self::Status { status, message }
    }
}

/// Kind of a persisted tile. Only floor tiles exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TileKind {
    #[default]
    Floor,
}

/// One occupied grid cell on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDto {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type", default)]
    pub kind: TileKind,
}

/// One furniture placement on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FurnitureDto {
    /// Storage-side id; `None` for placements the service has not seen yet.
    pub id: Option<i64>,
    /// Catalog item id.
    pub item_id: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub rotation: i32,
}

/// Payload for `create` and `update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMapRequest {
    pub name: String,
    /// Version the editor believes it is editing.
    pub version: i64,
    pub tiles: Vec<TileDto>,
    pub furniture: Vec<FurnitureDto>,
}

/// A full map record as returned by `create`, `read` and `update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRecord {
    pub id: MapId,
    pub name: String,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub tiles: Vec<TileDto>,
    #[serde(default)]
    pub furniture: Vec<FurnitureDto>,
}

/// Summary row returned by `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapListItem {
    pub id: MapId,
    pub name: String,
    pub version: i64,
    pub updated_at: String,
}

/// The external map storage service.
///
/// Calls are independent: nothing serializes two concurrent `update`s for the
/// same map, and their responses may arrive in either order.
#[async_trait]
pub trait MapStore: Send + Sync {
    /// Persist a new map and return it with its assigned id and version.
    async fn create(&self, req: &SaveMapRequest) -> Result<MapRecord, StoreError>;

    /// Fetch a single map.
    async fn read(&self, id: MapId) -> Result<MapRecord, StoreError>;

    /// Overwrite an existing map and return the confirmed record.
    async fn update(&self, id: MapId, req: &SaveMapRequest) -> Result<MapRecord, StoreError>;

    /// List the caller's maps.
    async fn list(&self) -> Result<Vec<MapListItem>, StoreError>;
}

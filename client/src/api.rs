//! HTTP transport for the map storage service.
//!
//! ERROR HANDLING
//! ==============
//! Every failure collapses into a [`StoreError`] whose `Display` text is fit
//! for the user: the response body when the service sent one, otherwise
//! `HTTP <status>`. Nothing is retried here; callers decide what to show.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use async_trait::async_trait;
use maps::{MapId, MapListItem, MapRecord, MapStore, SaveMapRequest, StoreError};
use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;

fn maps_endpoint(base_url: &str) -> String {
    format!("{base_url}/maps")
}

fn map_endpoint(base_url: &str, id: MapId) -> String {
    format!("{base_url}/maps/{id}")
}

/// [`MapStore`] backed by the storage service's REST API.
#[derive(Debug, Clone)]
pub struct HttpMapStore {
    http: reqwest::Client,
    base_url: String,
}

impl HttpMapStore {
    /// Build a store from config.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Transport`] if the cookie is not a valid header
    /// value or the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(cookie).map_err(|e| StoreError::Transport(e.to_string()))?;
            headers.insert(COOKIE, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(Self { http, base_url: config.base_url.clone() })
    }

    /// The service root this store talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, StoreError> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "map service unreachable");
            StoreError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "map service returned error status");
            return Err(StoreError::from_status(status.as_u16(), &body));
        }

        response.json::<T>().await.map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl MapStore for HttpMapStore {
    async fn create(&self, req: &SaveMapRequest) -> Result<MapRecord, StoreError> {
        debug!(name = %req.name, tiles = req.tiles.len(), "creating map");
        self.send(self.http.post(maps_endpoint(&self.base_url)).json(req))
            .await
    }

    async fn read(&self, id: MapId) -> Result<MapRecord, StoreError> {
        debug!(id, "reading map");
        self.send(self.http.get(map_endpoint(&self.base_url, id))).await
    }

    async fn update(&self, id: MapId, req: &SaveMapRequest) -> Result<MapRecord, StoreError> {
        debug!(id, version = req.version, tiles = req.tiles.len(), "updating map");
        self.send(self.http.put(map_endpoint(&self.base_url, id)).json(req))
            .await
    }

    async fn list(&self) -> Result<Vec<MapListItem>, StoreError> {
        self.send(self.http.get(maps_endpoint(&self.base_url))).await
    }
}

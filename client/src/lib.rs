//! REST implementation of the map storage collaborator.
//!
//! [`HttpMapStore`] speaks the storage service's JSON API (`/maps`,
//! `/maps/{id}`) and implements [`maps::MapStore`], so the editor engine never
//! sees HTTP. [`ClientConfig`] carries the base URL and timeouts, read from the
//! environment.

pub mod api;
pub mod config;

pub use api::HttpMapStore;
pub use config::ClientConfig;

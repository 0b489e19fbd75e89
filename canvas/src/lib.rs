//! Interaction engine for the grid map editor.
//!
//! The crate owns everything between raw pointer input and pixels: the
//! screen/world/cell transform, the tile and furniture stores, the tool state
//! machine with box-select and move, the live scene description and the
//! offscreen PNG export. Hosts feed input events in client coordinates and
//! redraw from [`engine::EngineCore::scene`] whenever an
//! [`engine::Action::RenderNeeded`] comes back.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::EngineCore`]: the single state aggregate and its event handlers |
//! | [`doc`] | Cells, the tile set and the furniture store |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`input`] | Tools, gesture phases and serializable input events |
//! | [`selection`] | Normalized inclusive selection rectangle |
//! | [`catalog`] | Static furniture catalog |
//! | [`render`] | Positioned visuals for the live view |
//! | [`export`] | Offscreen rasterization to `map.png` |
//! | [`session`] | Load/save against the map store |
//! | [`consts`] | Grid size, zoom limits and export styling |

pub mod camera;
pub mod catalog;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod export;
pub mod input;
pub mod render;
pub mod selection;
pub mod session;

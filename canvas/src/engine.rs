//! Editor engine: one state aggregate advanced by pointer, wheel and toolbar events.
//!
//! DESIGN
//! ======
//! All interaction state lives in [`EngineCore`]: both stores, the camera, the
//! committed selection and the gesture in progress. Each handler is a single
//! `match` over `(tool, gesture)` and runs to completion, so a move commit
//! updates tiles, furniture and the selection box in one step.
//!
//! Handlers return [`Action`]s describing what changed so a host can redraw
//! or mark the map dirty; the engine itself never touches the network.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::mem;

use tracing::debug;

use crate::camera::{Camera, Point, wheel_zoom_factor};
use crate::doc::{Cell, CellDelta, FurniturePlacement, FurnitureStore, TileSet, demo_tiles};
use crate::input::{InputEvent, InputState, Tool, UiState, WheelDelta};
use crate::render::{self, Scene};
use crate::selection::SelectionBox;

/// What an input handler changed.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    TileAdded(Cell),
    TileRemoved(Cell),
    FurniturePlaced(FurniturePlacement),
    FurnitureRemoved { cell: Cell, count: usize },
    /// A selection move was committed.
    SelectionMoved { selection: SelectionBox, delta: CellDelta, tiles: usize, furniture: usize },
    ToolChanged(Tool),
    RenderNeeded,
}

/// Position and size of the viewport element in client pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewportRect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }
}

/// Complete editor state.
#[derive(Debug, Clone, Default)]
pub struct EngineCore {
    pub tiles: TileSet,
    pub furniture: FurnitureStore,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    /// `None` until the host mounts a viewport; pointer input is ignored meanwhile.
    pub viewport: Option<ViewportRect>,
}

impl EngineCore {
    /// Empty map, pan tool, identity camera, no viewport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Editor seeded with the built-in demo floor plan.
    #[must_use]
    pub fn with_demo_layout() -> Self {
        Self { tiles: demo_tiles(), ..Self::default() }
    }

    // --- Data inputs ---

    /// Replace both stores, e.g. after loading a saved map.
    pub fn replace_layout(&mut self, tiles: TileSet, furniture: FurnitureStore) {
        self.tiles = tiles;
        self.furniture = furniture;
    }

    // --- Viewport ---

    pub fn mount_viewport(&mut self, rect: ViewportRect) {
        self.viewport = Some(rect);
    }

    pub fn unmount_viewport(&mut self) {
        self.viewport = None;
    }

    /// Client point relative to the mounted viewport.
    #[must_use]
    pub fn to_screen(&self, client: Point) -> Option<Point> {
        self.viewport.map(|vp| Point::new(client.x - vp.left, client.y - vp.top))
    }

    /// Grid cell under a client point, or `None` without a mounted viewport.
    #[must_use]
    pub fn cell_at(&self, client: Point) -> Option<Cell> {
        self.to_screen(client).map(|screen| self.camera.screen_to_cell(screen))
    }

    // --- Tools ---

    /// Switch tool from the toolbar. Drops the selection and any gesture.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        self.ui.selection = None;
        self.input = InputState::Idle;
        self.ui.tool = tool.clone();
        debug!(?tool, "tool changed");
        vec![Action::ToolChanged(tool), Action::RenderNeeded]
    }

    /// Pick a catalog item; the next click places it once.
    pub fn pick_furniture(&mut self, item_id: &str) -> Vec<Action> {
        self.set_tool(Tool::FurniturePending(item_id.to_owned()))
    }

    // --- Pointer ---

    pub fn on_pointer_down(&mut self, client: Point) -> Vec<Action> {
        let (Some(screen), Some(cell)) = (self.to_screen(client), self.cell_at(client)) else {
            return Vec::new();
        };
        if !self.input.is_idle() {
            return Vec::new();
        }

        match &self.ui.tool {
            Tool::Pan => {
                self.input = InputState::Panning { start_screen: screen, start_pan: self.camera.pan() };
                Vec::new()
            }
            Tool::Select => match self.ui.selection {
                Some(selection) if selection.contains(cell) => {
                    self.input =
                        InputState::MovingSelection { start_cell: cell, snapshot: selection, delta: CellDelta::ZERO };
                    Vec::new()
                }
                _ => {
                    self.input = InputState::BoxSelecting { start_cell: cell };
                    self.ui.selection = Some(SelectionBox::single(cell));
                    vec![Action::RenderNeeded]
                }
            },
            Tool::Draw | Tool::Erase | Tool::FurniturePending(_) => Vec::new(),
        }
    }

    pub fn on_pointer_move(&mut self, client: Point) -> Vec<Action> {
        let (Some(screen), Some(cell)) = (self.to_screen(client), self.cell_at(client)) else {
            return Vec::new();
        };

        match &mut self.input {
            InputState::Idle => Vec::new(),
            InputState::Panning { start_screen, start_pan } => {
                self.camera.drag_pan(*start_pan, *start_screen, screen);
                vec![Action::RenderNeeded]
            }
            InputState::BoxSelecting { start_cell } => {
                let next = SelectionBox::from_corners(*start_cell, cell);
                if self.ui.selection == Some(next) {
                    return Vec::new();
                }
                self.ui.selection = Some(next);
                vec![Action::RenderNeeded]
            }
            InputState::MovingSelection { start_cell, delta, .. } => {
                let next = cell - *start_cell;
                if *delta == next {
                    return Vec::new();
                }
                *delta = next;
                vec![Action::RenderNeeded]
            }
        }
    }

    /// End the current gesture. A selection drag with a non-zero offset is
    /// committed here; everything else just returns to idle.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        match mem::take(&mut self.input) {
            InputState::Idle | InputState::Panning { .. } | InputState::BoxSelecting { .. } => Vec::new(),
            InputState::MovingSelection { snapshot, delta, .. } => {
                if delta.is_zero() {
                    return Vec::new();
                }
                self.commit_move(snapshot, delta)
            }
        }
    }

    /// A click that did not turn into a drag.
    pub fn on_click(&mut self, client: Point) -> Vec<Action> {
        if !self.input.is_idle() {
            return Vec::new();
        }
        let Some(cell) = self.cell_at(client) else {
            return Vec::new();
        };

        match &self.ui.tool {
            Tool::Pan | Tool::Select => Vec::new(),
            Tool::FurniturePending(item_id) => {
                let placement = FurniturePlacement::new(item_id.clone(), cell);
                self.furniture.push(placement.clone());
                self.ui.tool = Tool::Draw;
                debug!(item_id = %placement.item_id, x = cell.x, y = cell.y, "furniture placed");
                vec![Action::FurniturePlaced(placement), Action::ToolChanged(Tool::Draw), Action::RenderNeeded]
            }
            Tool::Draw => {
                if self.tiles.add(cell) {
                    vec![Action::TileAdded(cell), Action::RenderNeeded]
                } else {
                    Vec::new()
                }
            }
            Tool::Erase => {
                let count = self.furniture.remove_at(cell);
                if count > 0 {
                    vec![Action::FurnitureRemoved { cell, count }, Action::RenderNeeded]
                } else if self.tiles.remove(cell) {
                    vec![Action::TileRemoved(cell), Action::RenderNeeded]
                } else {
                    Vec::new()
                }
            }
        }
    }

    // --- Zoom ---

    pub fn on_wheel(&mut self, client: Point, delta: WheelDelta) -> Vec<Action> {
        self.zoom_at(client, wheel_zoom_factor(delta.dy))
    }

    /// Zoom by `factor` around a client point.
    pub fn zoom_at(&mut self, client: Point, factor: f64) -> Vec<Action> {
        let Some(screen) = self.to_screen(client) else {
            return Vec::new();
        };
        if self.camera.zoom_at(screen, factor) {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    // --- Replay ---

    /// Route one serialized event to its handler.
    pub fn dispatch(&mut self, event: &InputEvent) -> Vec<Action> {
        match event {
            InputEvent::PointerDown { x, y } => self.on_pointer_down(Point::new(*x, *y)),
            InputEvent::PointerMove { x, y } => self.on_pointer_move(Point::new(*x, *y)),
            InputEvent::PointerUp => self.on_pointer_up(),
            InputEvent::Click { x, y } => self.on_click(Point::new(*x, *y)),
            InputEvent::Wheel { x, y, dy } => self.on_wheel(Point::new(*x, *y), WheelDelta { dx: 0.0, dy: *dy }),
            InputEvent::Zoom { x, y, factor } => self.zoom_at(Point::new(*x, *y), *factor),
            InputEvent::SetTool { tool } => self.set_tool(tool.clone()),
            InputEvent::PickFurniture { item_id } => self.pick_furniture(item_id),
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> Option<SelectionBox> {
        self.ui.selection
    }

    #[must_use]
    pub fn pending_delta(&self) -> CellDelta {
        self.input.pending_delta()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Positioned visuals for the current state.
    #[must_use]
    pub fn scene(&self) -> Scene {
        render::build_scene(&self.tiles, &self.furniture, self.ui.selection, self.pending_delta(), &self.camera)
    }

    fn commit_move(&mut self, snapshot: SelectionBox, delta: CellDelta) -> Vec<Action> {
        let tiles = self.tiles.translate_subset(|c| snapshot.contains(c), delta);
        let furniture = self.furniture.translate_within(&snapshot, delta);
        let selection = snapshot.translated(delta);
        self.ui.selection = Some(selection);
        debug!(dx = delta.dx, dy = delta.dy, tiles, furniture, "selection move committed");
        vec![Action::SelectionMoved { selection, delta, tiles, furniture }, Action::RenderNeeded]
    }
}

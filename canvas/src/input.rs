//! Input model: tools, pointer events, and the gesture state machine.
//!
//! `Tool` captures what the user picked in the toolbar. `InputState` is the
//! gesture being tracked between pointer-down and pointer-up, carrying the
//! anchors needed to compute incremental updates and the final move commit.
//! `InputEvent` is the serializable form of every event the engine accepts,
//! used to replay recorded gesture scripts.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::doc::{Cell, CellDelta};
use crate::selection::SelectionBox;

/// Which tool is currently active.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Drag to move the viewport (default).
    #[default]
    Pan,
    /// Click to add floor tiles.
    Draw,
    /// Click to remove furniture, or the tile when no furniture is there.
    Erase,
    /// Drag to box-select; drag inside the box to move it.
    Select,
    /// A catalog item was picked; the next click places it once.
    FurniturePending(String),
}

impl Tool {
    /// Catalog item waiting to be placed, if any.
    #[must_use]
    pub fn pending_item(&self) -> Option<&str> {
        match self {
            Self::FurniturePending(item_id) => Some(item_id),
            _ => None,
        }
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelDelta {
    pub dx: f64,
    /// Positive = scroll down.
    pub dy: f64,
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub tool: Tool,
    /// Committed selection. Stays put while a move is pending; the pending
    /// offset lives in [`InputState::MovingSelection`].
    pub selection: Option<SelectionBox>,
}

/// Gesture in progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No gesture; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging the viewport with the pan tool.
    Panning {
        /// Screen position at pointer-down.
        start_screen: Point,
        /// Camera pan at pointer-down.
        start_pan: Point,
    },
    /// Rubber-banding a new selection.
    BoxSelecting {
        /// Cell under the pointer at pointer-down; one corner of the box.
        start_cell: Cell,
    },
    /// Dragging an existing selection. Nothing is mutated until pointer-up.
    MovingSelection {
        /// Cell under the pointer at pointer-down.
        start_cell: Cell,
        /// Selection as it was at pointer-down; this, not the live box,
        /// decides what moves on commit.
        snapshot: SelectionBox,
        /// Offset from `start_cell` to the cell currently under the pointer.
        delta: CellDelta,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Uncommitted move offset; zero unless a selection is being dragged.
    #[must_use]
    pub fn pending_delta(&self) -> CellDelta {
        match self {
            Self::MovingSelection { delta, .. } => *delta,
            _ => CellDelta::ZERO,
        }
    }
}

/// Every event the engine consumes, in serializable form.
///
/// Coordinates are client pixels, i.e. relative to the page rather than the
/// viewport; the engine subtracts the mounted viewport's origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    Click { x: f64, y: f64 },
    Wheel { x: f64, y: f64, dy: f64 },
    /// Zoom by an arbitrary factor (pinch, keyboard shortcut, ...).
    Zoom { x: f64, y: f64, factor: f64 },
    SetTool { tool: Tool },
    PickFurniture { item_id: String },
}

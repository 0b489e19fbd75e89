use super::*;

// =============================================================
// Tool
// =============================================================

#[test]
fn tool_default_is_pan() {
    assert_eq!(Tool::default(), Tool::Pan);
}

#[test]
fn pending_item_only_for_furniture_tool() {
    assert_eq!(Tool::FurniturePending("boxes".to_owned()).pending_item(), Some("boxes"));
    assert_eq!(Tool::Draw.pending_item(), None);
}

// =============================================================
// InputState
// =============================================================

#[test]
fn input_state_default_is_idle() {
    assert!(InputState::default().is_idle());
}

#[test]
fn pending_delta_zero_outside_move() {
    let state = InputState::BoxSelecting { start_cell: Cell::new(1, 1) };
    assert_eq!(state.pending_delta(), CellDelta::ZERO);
    assert!(!state.is_idle());
}

#[test]
fn pending_delta_reports_move_offset() {
    let state = InputState::MovingSelection {
        start_cell: Cell::new(0, 0),
        snapshot: SelectionBox::single(Cell::new(0, 0)),
        delta: CellDelta::new(3, -1),
    };
    assert_eq!(state.pending_delta(), CellDelta::new(3, -1));
}

#[test]
fn ui_state_default_has_no_selection() {
    let ui = UiState::default();
    assert_eq!(ui.tool, Tool::Pan);
    assert!(ui.selection.is_none());
}

// =============================================================
// InputEvent wire form
// =============================================================

#[test]
fn input_event_parses_pointer_events() {
    let ev: InputEvent = serde_json::from_str(r#"{"type":"pointer_down","x":10.5,"y":-3}"#).expect("parse");
    assert_eq!(ev, InputEvent::PointerDown { x: 10.5, y: -3.0 });

    let ev: InputEvent = serde_json::from_str(r#"{"type":"pointer_up"}"#).expect("parse");
    assert_eq!(ev, InputEvent::PointerUp);
}

#[test]
fn input_event_parses_tools() {
    let ev: InputEvent = serde_json::from_str(r#"{"type":"set_tool","tool":"select"}"#).expect("parse");
    assert_eq!(ev, InputEvent::SetTool { tool: Tool::Select });

    let ev: InputEvent =
        serde_json::from_str(r#"{"type":"set_tool","tool":{"furniture_pending":"shield"}}"#).expect("parse");
    assert_eq!(ev, InputEvent::SetTool { tool: Tool::FurniturePending("shield".to_owned()) });
}

#[test]
fn input_event_parses_pick_and_wheel() {
    let ev: InputEvent = serde_json::from_str(r#"{"type":"pick_furniture","item_id":"shell2"}"#).expect("parse");
    assert_eq!(ev, InputEvent::PickFurniture { item_id: "shell2".to_owned() });

    let ev: InputEvent = serde_json::from_str(r#"{"type":"wheel","x":1,"y":2,"dy":-120}"#).expect("parse");
    assert_eq!(ev, InputEvent::Wheel { x: 1.0, y: 2.0, dy: -120.0 });
}

#[test]
fn input_event_rejects_unknown_type() {
    assert!(serde_json::from_str::<InputEvent>(r#"{"type":"teleport"}"#).is_err());
}

//! Pointer-drag state machine for nodes.
//!
//! Idle → dragging → idle. Screen-pixel deltas are divided by the current
//! zoom to become plane deltas, so a node tracks the pointer exactly at any
//! scale. The façade owns the gating (`draggable` flag, engine-wide
//! `nodes_draggable`) and applies the resulting positions; the host keeps
//! move/up listeners scoped to the whole input surface so a drag survives the
//! pointer leaving the node's visual bounds.

use crate::geometry::XYPosition;

enum DragState {
    Idle,
    Dragging {
        node_id: String,
        start_screen: XYPosition,
        start_position: XYPosition,
    },
}

pub struct DragController {
    state: DragState,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    pub fn new() -> Self {
        Self { state: DragState::Idle }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Identifier of the node currently being dragged.
    pub fn dragged_node(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { node_id, .. } => Some(node_id),
            DragState::Idle => None,
        }
    }

    /// Enter the dragging state, capturing the pointer's screen position and
    /// the node's plane position. Ignored (returns `false`) while a drag is
    /// already active.
    pub fn begin(&mut self, node_id: &str, screen: XYPosition, position: XYPosition) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.state = DragState::Dragging {
            node_id: node_id.to_string(),
            start_screen: screen,
            start_position: position,
        };
        true
    }

    /// Translate the pointer's new screen position into the node's new plane
    /// position. Returns `None` while idle.
    pub fn update(&mut self, screen: XYPosition, zoom: f32) -> Option<(String, XYPosition)> {
        let DragState::Dragging { node_id, start_screen, start_position } = &self.state else {
            return None;
        };
        let z = if zoom > 0.0 { zoom } else { 1.0 };
        let position = XYPosition::new(
            start_position.x + (screen.x - start_screen.x) / z,
            start_position.y + (screen.y - start_screen.y) / z,
        );
        Some((node_id.clone(), position))
    }

    /// Return to idle. Returns whether a drag was active.
    pub fn end(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.state = DragState::Idle;
        was_dragging
    }
}

//! Input model: editor mode, pointer identity, and the gesture state machine.
//!
//! `UiState` is the persistent view state the renderer and toolbar read.
//! `InputState` is the active gesture tracked between pointer-down and
//! pointer-up. Every drag variant holds only a *preview* of the value being
//! edited; the model is touched on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::hit::ZoneHandle;
use crate::transform::Point;
use crate::zone::{Zone, ZoneSlot};

/// Whether the card is showing zones or editing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Read-only view; only the toolbar responds to the pointer.
    #[default]
    View,
    /// Zones and pose handles are interactive.
    Edit,
}

/// Browser pointer id (`PointerEvent.pointerId`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerId(pub i32);

/// Persistent UI state visible to the renderer.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone)]
pub struct UiState {
    pub mode: Mode,
    /// Zone whose handles are shown and which `delete` removes.
    pub selected: Option<ZoneSlot>,
    /// Zone outlined at the host's request, in any mode.
    pub highlighted: Option<ZoneSlot>,
    /// Angle handle drawn and hit-testable while editing.
    pub show_angle_handle: bool,
    /// Range ruler drawn and hit-testable while editing.
    pub show_range_handle: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self { mode: Mode::View, selected: None, highlighted: None, show_angle_handle: true, show_range_handle: true }
    }
}

impl UiState {
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.mode == Mode::Edit
    }

    /// Switch to edit mode with both pose handles visible.
    pub fn enter_edit(&mut self) {
        if self.mode != Mode::Edit {
            self.mode = Mode::Edit;
            self.show_angle_handle = true;
            self.show_range_handle = true;
        }
    }

    /// Back to view mode; the selection does not survive.
    pub fn leave_edit(&mut self) {
        self.mode = Mode::View;
        self.selected = None;
    }
}

/// Internal state for the pointer state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging the installation-angle handle along the top edge.
    DraggingAngle {
        pointer: PointerId,
        /// Angle in degrees shown while dragging.
        preview_deg: f64,
    },
    /// Dragging the range handle along the ruler.
    DraggingRange {
        pointer: PointerId,
        /// Range in metres shown while dragging.
        preview_m: f64,
    },
    /// Moving or resizing one zone.
    DraggingZone {
        pointer: PointerId,
        slot: ZoneSlot,
        handle: ZoneHandle,
        /// Room position of the pointer at drag start, in metres.
        start_room: Point,
        /// Normalized zone at drag start; every move is applied to this.
        original: Zone,
        /// Zone drawn in place of the stored one until release.
        preview: Zone,
    },
}

impl InputState {
    /// Pointer that owns the current gesture, if any.
    #[must_use]
    pub fn pointer(&self) -> Option<PointerId> {
        match self {
            Self::Idle => None,
            Self::DraggingAngle { pointer, .. }
            | Self::DraggingRange { pointer, .. }
            | Self::DraggingZone { pointer, .. } => Some(*pointer),
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The in-flight zone preview, if a zone drag is active.
    #[must_use]
    pub fn preview_zone(&self) -> Option<&Zone> {
        match self {
            Self::DraggingZone { preview, .. } => Some(preview),
            _ => None,
        }
    }
}

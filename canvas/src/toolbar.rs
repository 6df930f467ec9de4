//! Toolbar buttons under the room: which are visible and where they sit.

#[cfg(test)]
#[path = "toolbar_test.rs"]
mod toolbar_test;

use crate::consts::{BUTTON_GAP_PX, BUTTON_SIZE_PX};
use crate::input::Mode;
use crate::transform::{Point, Room};

/// Toolbar buttons, in left-to-right order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolbarButton {
    Add,
    Edit,
    Save,
    Discard,
    Angle,
    Range,
    Delete,
}

impl ToolbarButton {
    pub const ALL: [ToolbarButton; 7] =
        [Self::Add, Self::Edit, Self::Save, Self::Discard, Self::Angle, Self::Range, Self::Delete];

    /// Caption drawn under the tile.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Edit => "edit",
            Self::Save => "save",
            Self::Discard => "disregard",
            Self::Angle => "angle edit",
            Self::Range => "range",
            Self::Delete => "delete zone",
        }
    }

    /// Tiles for actions that touch the host are tinted.
    #[must_use]
    pub fn is_highlighted(self) -> bool {
        matches!(self, Self::Save | Self::Delete)
    }

    /// Visibility as a pure function of mode and selection.
    #[must_use]
    pub fn is_visible(self, mode: Mode, has_selection: bool) -> bool {
        match self {
            Self::Add => true,
            Self::Edit => mode == Mode::View,
            Self::Save | Self::Discard | Self::Angle | Self::Range => mode == Mode::Edit,
            Self::Delete => mode == Mode::Edit && has_selection,
        }
    }
}

/// A laid-out toolbar tile in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonRect {
    pub button: ToolbarButton,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl ButtonRect {
    /// Edges inclusive.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }
}

/// Visible buttons centred in a row one gap below the room.
#[must_use]
pub fn layout_buttons(room: Room, mode: Mode, has_selection: bool) -> Vec<ButtonRect> {
    let visible: Vec<ToolbarButton> =
        ToolbarButton::ALL.into_iter().filter(|b| b.is_visible(mode, has_selection)).collect();
    if visible.is_empty() {
        return Vec::new();
    }

    #[allow(clippy::cast_precision_loss)]
    let count = visible.len() as f64;
    let total = count * BUTTON_SIZE_PX + (count - 1.0) * BUTTON_GAP_PX;
    let mut x = room.x + (room.size - total) * 0.5;
    let y = room.y + room.size + BUTTON_GAP_PX;

    visible
        .into_iter()
        .map(|button| {
            let rect = ButtonRect { button, x, y, w: BUTTON_SIZE_PX, h: BUTTON_SIZE_PX };
            x += BUTTON_SIZE_PX + BUTTON_GAP_PX;
            rect
        })
        .collect()
}

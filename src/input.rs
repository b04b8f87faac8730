//! Input model: modifier keys, mouse buttons, cursors, and the gesture state machine.
//!
//! This module defines the types consumed by the interaction handlers in
//! [`crate::engine`]. `Modifiers` and `Button` capture the user's intent at the
//! time of a pointer event. `InputState` is the active gesture tracked between
//! pointer-down and pointer-up; because it is a single enum, dragging and
//! marquee selection can never be active together.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::Serialize;

use crate::camera::Point;
use crate::schedule::TimerId;
use crate::slot::{Slot, SlotId};

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Whether the marquee-selection modifier (Ctrl or Cmd) is held.
    #[must_use]
    pub fn selecting(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// Pointer affordance shown over the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cursor {
    #[default]
    Default,
    /// Over a slot.
    Pointer,
    /// Over empty pannable space.
    Grab,
    /// While drag-panning.
    Grabbing,
    /// While the selection modifier is held.
    Crosshair,
}

impl Cursor {
    /// CSS `cursor` value.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Pointer => "pointer",
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
            Self::Crosshair => "crosshair",
        }
    }
}

/// A single-click waiting out the double-click window.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingClick {
    /// Slot pressed.
    pub id: SlotId,
    /// Timer that promotes the press to a click.
    pub timer: TimerId,
}

/// Engine-owned view state visible to the renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    /// Slot under the pointer, if any.
    pub hover_id: Option<SlotId>,
    /// Slot chosen by the last single click, if any.
    pub selected_id: Option<SlotId>,
    /// Pointer affordance last reported to the host.
    pub cursor: Cursor,
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is panning the surface by dragging empty space.
    Dragging {
        /// Screen-space position of the pointer-down.
        start: Point,
        /// Camera offset at the pointer-down.
        start_offset: Point,
    },
    /// The user is dragging a selection marquee.
    MarqueeSelecting,
}

/// Context menu opened on a slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    /// Menu origin in container pixels.
    pub x: f64,
    pub y: f64,
    /// Pointer position that opened the menu.
    pub click: Point,
    /// Slot the menu acts on, captured when it opened.
    pub slot: Slot,
}

impl ContextMenu {
    /// Keep a measured menu inside its container.
    ///
    /// Flips above the click point when the bottom would clip, and to the left
    /// when the right would clip. If a flip leaves the container, the menu is
    /// pinned near the opposite edge instead.
    pub fn place(&mut self, menu_w: f64, menu_h: f64, container_w: f64, container_h: f64) {
        use crate::consts::MENU_EDGE_INSET_PX;

        if self.click.y + menu_h > container_h {
            self.y = self.click.y - menu_h;
            if self.y < 0.0 {
                self.y = container_h - menu_h - MENU_EDGE_INSET_PX;
            }
        }
        if self.click.x + menu_w > container_w {
            self.x = self.click.x - menu_w;
            if self.x < 0.0 {
                self.x = MENU_EDGE_INSET_PX;
            }
        }
    }
}

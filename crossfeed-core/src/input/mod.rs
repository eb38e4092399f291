//! Input adapters translating touch and keyboard events into engine actions.

pub mod gesture;
pub mod keyboard;

use serde::Serialize;

pub use gesture::{SwipeDecoder, TouchPoint};
pub use keyboard::{Key, decode_key};

use crate::adjacency::Direction;
use crate::navigation::Overlay;

/// Abstract user intent consumed by the navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum InputAction {
    /// Move to the neighbor in a direction (swipe, arrow key or click)
    Navigate(Direction),
    TogglePlay,
    ToggleMute,
    /// Open the overlay, or close it when it is already on top
    ToggleOverlay(Overlay),
    /// Close the topmost overlay
    CloseOverlay,
}

impl From<Direction> for InputAction {
    fn from(direction: Direction) -> Self {
        InputAction::Navigate(direction)
    }
}

impl std::fmt::Display for InputAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputAction::Navigate(direction) => write!(f, "navigate {direction}"),
            InputAction::TogglePlay => write!(f, "toggle play"),
            InputAction::ToggleMute => write!(f, "toggle mute"),
            InputAction::ToggleOverlay(overlay) => write!(f, "toggle {overlay}"),
            InputAction::CloseOverlay => write!(f, "close overlay"),
        }
    }
}

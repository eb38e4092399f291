//! Keyboard shortcuts.

use super::InputAction;
use crate::adjacency::Direction;
use crate::navigation::Overlay;

/// Keys the feed reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    Escape,
    Char(char),
}

impl Key {
    /// Parses a key name as written in scripts and on the command line.
    ///
    /// Accepts `up`/`arrowup` style names, `space`, `escape`/`esc`, and any
    /// single character.
    pub fn parse(name: &str) -> Option<Key> {
        let lowered = name.trim().to_lowercase();
        let key = match lowered.as_str() {
            "up" | "arrowup" => Key::ArrowUp,
            "down" | "arrowdown" => Key::ArrowDown,
            "left" | "arrowleft" => Key::ArrowLeft,
            "right" | "arrowright" => Key::ArrowRight,
            "space" => Key::Space,
            "escape" | "esc" => Key::Escape,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

impl std::str::FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::parse(s).ok_or_else(|| format!("Unknown key: {s}"))
    }
}

/// Maps a key press to an action. Unbound keys yield `None`.
pub fn decode_key(key: Key) -> Option<InputAction> {
    let action = match key {
        Key::ArrowUp => InputAction::Navigate(Direction::Up),
        Key::ArrowDown => InputAction::Navigate(Direction::Down),
        Key::ArrowLeft => InputAction::Navigate(Direction::Left),
        Key::ArrowRight => InputAction::Navigate(Direction::Right),
        Key::Space => InputAction::TogglePlay,
        Key::Escape => InputAction::CloseOverlay,
        Key::Char(c) => match c.to_ascii_lowercase() {
            'm' => InputAction::ToggleMute,
            'i' => InputAction::ToggleOverlay(Overlay::Info),
            'w' => InputAction::ToggleOverlay(Overlay::WhatIf),
            '?' => InputAction::ToggleOverlay(Overlay::Help),
            _ => return None,
        },
    };
    Some(action)
}

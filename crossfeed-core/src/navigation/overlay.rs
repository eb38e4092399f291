//! Overlays layered above the feed.
//!
//! Overlays form a stack. While any overlay is open, directional input closes
//! the topmost one instead of navigating.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Panels that can be opened over the playing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overlay {
    /// Item details
    Info,
    /// Alternate-scenario panel
    WhatIf,
    /// Keyboard and gesture help
    Help,
    /// Discussion thread (rendered by an external collaborator)
    Discussion,
}

impl fmt::Display for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Overlay::Info => write!(f, "info"),
            Overlay::WhatIf => write!(f, "what-if"),
            Overlay::Help => write!(f, "help"),
            Overlay::Discussion => write!(f, "discussion"),
        }
    }
}

/// Effect of toggling an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayChange {
    Opened(Overlay),
    Closed(Overlay),
}

/// Open overlays, bottom first.
#[derive(Debug, Clone, Default)]
pub struct OverlayStack {
    open: Vec<Overlay>,
}

impl OverlayStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closes `overlay` if it is open anywhere in the stack, otherwise opens it on top.
    pub fn toggle(&mut self, overlay: Overlay) -> OverlayChange {
        match self.open.iter().position(|open| *open == overlay) {
            Some(index) => {
                self.open.remove(index);
                OverlayChange::Closed(overlay)
            }
            None => {
                self.open.push(overlay);
                OverlayChange::Opened(overlay)
            }
        }
    }

    pub fn close_top(&mut self) -> Option<Overlay> {
        self.open.pop()
    }

    /// Closes everything, returning the closed overlays topmost first.
    pub fn close_all(&mut self) -> Vec<Overlay> {
        let mut closed = std::mem::take(&mut self.open);
        closed.reverse();
        closed
    }

    pub fn top(&self) -> Option<Overlay> {
        self.open.last().copied()
    }

    pub fn is_open(&self, overlay: Overlay) -> bool {
        self.open.contains(&overlay)
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn as_slice(&self) -> &[Overlay] {
        &self.open
    }
}

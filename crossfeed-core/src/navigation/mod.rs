//! Session navigation: the transition state machine and its actor.
//!
//! One navigator per viewing session. Callers talk to it through a
//! `NavigatorHandle`; the actor task owns all session state, so inputs,
//! settle timers and media readiness are processed strictly one at a time.

pub mod actor;
pub mod commands;
pub mod handle;
pub mod navigator;
pub mod overlay;

pub use actor::{spawn_navigator, spawn_navigator_subscribed};
pub use commands::{IgnoreReason, InputOutcome, NavigatorEvent, SessionSnapshot};
pub use handle::NavigatorHandle;
pub use navigator::{Navigator, Phase};
pub use overlay::{Overlay, OverlayChange, OverlayStack};

use crate::catalog::ContentId;

/// Errors from the navigation layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("Unknown content item: {id}")]
    UnknownItem { id: ContentId },

    #[error("Navigator has shut down")]
    EngineShutdown,
}

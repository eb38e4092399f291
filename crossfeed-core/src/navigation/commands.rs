//! Command and message definitions for the navigator actor.

use serde::Serialize;
use tokio::sync::oneshot;

use super::NavigationError;
use super::overlay::Overlay;
use crate::adjacency::{Direction, NeighborSet};
use crate::catalog::ContentId;
use crate::input::InputAction;
use crate::media::CacheStatistics;
use crate::playback::{PlaybackSnapshot, PlaybackState, PlaybackTicket};

/// Commands that can be sent to the navigator actor.
///
/// Each command carries a response channel where the caller needs an answer.
/// The actor handles them one at a time, so session state is never shared.
pub enum NavigatorCommand {
    /// Apply one user input.
    Dispatch {
        action: InputAction,
        responder: oneshot::Sender<InputOutcome>,
    },
    /// Get a read-only view of the session.
    Snapshot {
        responder: oneshot::Sender<SessionSnapshot>,
    },
    /// Playback position reported by the media surface.
    ReportTime {
        ticket: PlaybackTicket,
        position_seconds: f64,
    },
    /// Re-activate the current item from its original source.
    Retry {
        responder: oneshot::Sender<Result<PlaybackState, NavigationError>>,
    },
    /// Get media cache statistics.
    CacheStatistics {
        responder: oneshot::Sender<CacheStatistics>,
    },
    /// Stop the actor and release every cached element.
    Shutdown { responder: oneshot::Sender<()> },
}

/// Signals the navigator sends itself from background tasks.
#[derive(Debug, Clone)]
pub(crate) enum NavigatorSignal {
    /// The handle behind a buffering activation left `Pending`.
    MediaSettled { ticket: PlaybackTicket },
}

/// Why an input had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Nothing lies in the requested direction
    NoNeighbor,
    /// A transition is in flight
    Transitioning,
    /// Close requested with no overlay open
    NoOverlay,
}

/// Immediate effect of a dispatched input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InputOutcome {
    Ignored { reason: IgnoreReason },
    OverlayOpened { overlay: Overlay },
    OverlayClosed { overlay: Overlay },
    TransitionStarted { direction: Direction, target: ContentId },
    PlaybackToggled { state: PlaybackState },
    MuteToggled { muted: bool },
}

impl InputOutcome {
    pub fn ignored(reason: IgnoreReason) -> Self {
        InputOutcome::Ignored { reason }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, InputOutcome::Ignored { .. })
    }
}

/// Read-only view of a navigation session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    /// Item currently on screen (the outgoing item while transitioning)
    pub current_item_id: ContentId,
    pub neighbors: NeighborSet,
    /// Direction of the most recent transition
    pub transition_direction: Option<Direction>,
    pub is_transitioning: bool,
    /// Item being transitioned to, if any
    pub transition_target: Option<ContentId>,
    pub playback: PlaybackSnapshot,
    /// Open overlays, bottom first
    pub overlays: Vec<Overlay>,
}

/// Notifications broadcast to session subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NavigatorEvent {
    TransitionStarted {
        direction: Direction,
        target: ContentId,
    },
    /// Emitted once per completed transition, after the current item changed
    ItemChanged {
        id: ContentId,
        direction: Direction,
    },
    OverlayOpened {
        overlay: Overlay,
        item_id: ContentId,
    },
    OverlayClosed {
        overlay: Overlay,
        item_id: ContentId,
    },
    /// Playback of an activation started (or is ready while paused)
    PlaybackStarted {
        ticket: PlaybackTicket,
        using_fallback: bool,
    },
    PlaybackCompleted {
        id: ContentId,
    },
    /// Both the item's source and the fallback failed
    PlaybackFailed {
        id: ContentId,
        reason: String,
    },
    MuteChanged {
        muted: bool,
    },
    PlayStateChanged {
        state: PlaybackState,
    },
}

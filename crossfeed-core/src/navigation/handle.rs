//! Handle for communicating with the navigator actor.

use tokio::sync::{broadcast, mpsc, oneshot};

use super::NavigationError;
use super::commands::{InputOutcome, NavigatorCommand, NavigatorEvent, SessionSnapshot};
use crate::adjacency::Direction;
use crate::input::InputAction;
use crate::media::CacheStatistics;
use crate::playback::{PlaybackState, PlaybackTicket};

/// Handle for communicating with the navigator actor.
///
/// Provides an async API over the actor's command channel. It can be cloned
/// and shared across tasks; every clone drives the same session.
#[derive(Clone)]
pub struct NavigatorHandle {
    sender: mpsc::Sender<NavigatorCommand>,
    events: broadcast::Sender<NavigatorEvent>,
}

impl NavigatorHandle {
    pub(crate) fn new(
        sender: mpsc::Sender<NavigatorCommand>,
        events: broadcast::Sender<NavigatorEvent>,
    ) -> Self {
        Self { sender, events }
    }

    /// Applies one user input and returns its immediate effect.
    ///
    /// A directional input that starts a transition returns
    /// `InputOutcome::TransitionStarted`; the current item changes once the
    /// settle delay has elapsed, announced by `NavigatorEvent::ItemChanged`.
    ///
    /// # Errors
    /// - `NavigationError::EngineShutdown` - Actor is no longer running
    pub async fn dispatch(&self, action: InputAction) -> Result<InputOutcome, NavigationError> {
        let (responder, rx) = oneshot::channel();
        let cmd = NavigatorCommand::Dispatch { action, responder };

        self.sender
            .send(cmd)
            .await
            .map_err(|_| NavigationError::EngineShutdown)?;

        rx.await.map_err(|_| NavigationError::EngineShutdown)
    }

    /// Shorthand for dispatching `InputAction::Navigate`.
    ///
    /// # Errors
    /// - `NavigationError::EngineShutdown` - Actor is no longer running
    pub async fn navigate(&self, direction: Direction) -> Result<InputOutcome, NavigationError> {
        self.dispatch(InputAction::Navigate(direction)).await
    }

    /// Gets a read-only view of the session.
    ///
    /// # Errors
    /// - `NavigationError::EngineShutdown` - Actor is no longer running
    pub async fn snapshot(&self) -> Result<SessionSnapshot, NavigationError> {
        let (responder, rx) = oneshot::channel();
        let cmd = NavigatorCommand::Snapshot { responder };

        self.sender
            .send(cmd)
            .await
            .map_err(|_| NavigationError::EngineShutdown)?;

        rx.await.map_err(|_| NavigationError::EngineShutdown)
    }

    /// Reports the playback position of the element activated under `ticket`.
    ///
    /// Updates are applied in the order they are sent. Updates for a ticket
    /// that is no longer active are dropped by the actor.
    ///
    /// # Errors
    /// - `NavigationError::EngineShutdown` - Actor is no longer running
    pub async fn report_time(
        &self,
        ticket: PlaybackTicket,
        position_seconds: f64,
    ) -> Result<(), NavigationError> {
        let cmd = NavigatorCommand::ReportTime {
            ticket,
            position_seconds,
        };

        self.sender
            .send(cmd)
            .await
            .map_err(|_| NavigationError::EngineShutdown)
    }

    /// Retries playback of the current item from its original source.
    ///
    /// # Errors
    /// - `NavigationError::EngineShutdown` - Actor is no longer running
    /// - `NavigationError::UnknownItem` - Current item vanished from the catalog
    pub async fn retry(&self) -> Result<PlaybackState, NavigationError> {
        let (responder, rx) = oneshot::channel();
        let cmd = NavigatorCommand::Retry { responder };

        self.sender
            .send(cmd)
            .await
            .map_err(|_| NavigationError::EngineShutdown)?;

        rx.await.map_err(|_| NavigationError::EngineShutdown)?
    }

    /// Gets media cache statistics for the session.
    ///
    /// # Errors
    /// - `NavigationError::EngineShutdown` - Actor is no longer running
    pub async fn cache_statistics(&self) -> Result<CacheStatistics, NavigationError> {
        let (responder, rx) = oneshot::channel();
        let cmd = NavigatorCommand::CacheStatistics { responder };

        self.sender
            .send(cmd)
            .await
            .map_err(|_| NavigationError::EngineShutdown)?;

        rx.await.map_err(|_| NavigationError::EngineShutdown)
    }

    /// Subscribes to session events.
    ///
    /// Only events sent after this call are received.
    pub fn subscribe(&self) -> broadcast::Receiver<NavigatorEvent> {
        self.events.subscribe()
    }

    /// Shuts down the navigator actor gracefully.
    ///
    /// Releases every cached media element. After this call, all subsequent
    /// operations return `NavigationError::EngineShutdown`.
    ///
    /// # Errors
    /// - `NavigationError::EngineShutdown` - Actor was already stopped
    pub async fn shutdown(&self) -> Result<(), NavigationError> {
        let (responder, rx) = oneshot::channel();
        let cmd = NavigatorCommand::Shutdown { responder };

        self.sender
            .send(cmd)
            .await
            .map_err(|_| NavigationError::EngineShutdown)?;

        rx.await.map_err(|_| NavigationError::EngineShutdown)
    }

    /// Checks if the navigator actor is still running.
    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }
}

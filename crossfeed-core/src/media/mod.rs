//! Media elements, preload handles and the bounded media cache.
//!
//! A `MediaBackend` turns a source URL into a `MediaElement` (the platform's
//! video element, a decoder, or a simulation). The cache wraps each element in
//! a `MediaHandle` whose readiness is published on a watch channel, so any
//! reader can check the state at call time instead of trusting an old future.

pub mod cache;
#[cfg(feature = "simulation")]
pub mod simulated;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

pub use cache::{CacheStatistics, MediaCache, WarmPriority};
#[cfg(feature = "simulation")]
pub use simulated::{SimulatedBackend, SimulatedBackendConfig};

use crate::catalog::ContentId;

/// Errors produced by media elements.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MediaError {
    #[error("Failed to load {source_url}: {reason}")]
    LoadFailed { source_url: String, reason: String },

    #[error("Playback rejected: {reason}")]
    PlaybackRejected { reason: String },

    #[error("Media element was released")]
    Released,
}

/// A single loadable, playable media element.
///
/// Implementations must tolerate `release` being called while a `load` is
/// still in flight; the pending load should then resolve with
/// `MediaError::Released` or simply never be observed.
#[async_trait]
pub trait MediaElement: Send + Sync + fmt::Debug {
    /// Source URL this element is bound to.
    fn source_url(&self) -> &str;

    /// Resolves once enough data is buffered to start playback without stalling.
    ///
    /// # Errors
    ///
    /// - `MediaError::LoadFailed` - Source could not be fetched or decoded
    async fn load(&self) -> Result<(), MediaError>;

    /// Starts or resumes playback.
    ///
    /// # Errors
    ///
    /// - `MediaError::PlaybackRejected` - Platform refused to start playback
    /// - `MediaError::Released` - Element was already released
    async fn play(&self) -> Result<(), MediaError>;

    fn pause(&self);

    fn set_muted(&self, muted: bool);

    /// Detaches the source and cancels pending network activity.
    fn release(&self);
}

/// Factory for media elements.
pub trait MediaBackend: Send + Sync + fmt::Debug {
    /// Creates an element bound to `source_url`. No I/O happens until `load`.
    fn create_element(&self, id: &ContentId, source_url: &str) -> Arc<dyn MediaElement>;
}

/// Readiness of a cached media handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Load (and prime, for high priority warms) still in flight
    Pending,
    /// Buffered enough for instant start
    Ready,
    /// Load failed; the handle is unusable until its source is replaced
    Failed { reason: String },
}

impl LoadState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, LoadState::Pending)
    }
}

/// Shared view of a cached element and its readiness.
///
/// Cloning is cheap; all clones observe the same element and state.
#[derive(Clone)]
pub struct MediaHandle {
    id: ContentId,
    element: Arc<dyn MediaElement>,
    state: watch::Receiver<LoadState>,
}

impl MediaHandle {
    pub(crate) fn new(
        id: ContentId,
        element: Arc<dyn MediaElement>,
        state: watch::Receiver<LoadState>,
    ) -> Self {
        Self { id, element, state }
    }

    pub fn id(&self) -> &ContentId {
        &self.id
    }

    pub fn source_url(&self) -> &str {
        self.element.source_url()
    }

    pub fn element(&self) -> &Arc<dyn MediaElement> {
        &self.element
    }

    /// Current readiness, read at call time.
    pub fn load_state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), LoadState::Ready)
    }

    /// Waits until the handle leaves `Pending` and returns the settled state.
    ///
    /// If the loader task disappears (the entry was evicted), the handle is
    /// reported as failed.
    pub async fn wait_until_settled(&self) -> LoadState {
        let mut state = self.state.clone();
        match state.wait_for(LoadState::is_settled).await {
            Ok(settled) => settled.clone(),
            Err(_) => LoadState::Failed {
                reason: MediaError::Released.to_string(),
            },
        }
    }
}

impl fmt::Debug for MediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaHandle")
            .field("id", &self.id)
            .field("source_url", &self.element.source_url())
            .field("state", &*self.state.borrow())
            .finish()
    }
}

//! Playback of the single active media element.
//!
//! Every activation gets a fresh `PlaybackTicket`. Time updates and readiness
//! signals carry the ticket they were issued for, and anything that does not
//! match the active ticket is dropped, so a just-replaced element can never
//! move the progress of its successor.

use serde::Serialize;

use crate::catalog::{ContentId, ContentItem};
use crate::config::PlaybackConfig;
use crate::media::{LoadState, MediaCache, MediaHandle};

/// Identifies one activation of one item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PlaybackTicket {
    pub id: ContentId,
    pub generation: u64,
}

/// Playback state of the active item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlaybackState {
    /// Nothing is active (between items, or before mount)
    Idle,
    /// Waiting for the element to buffer enough to start
    Buffering,
    Playing,
    Paused,
    /// Both the item's source and the fallback failed
    Failed { reason: String },
}

/// Result of activating an item or settling a pending activation.
#[derive(Debug, Clone)]
pub enum Activation {
    /// Ready and started (or left paused when the user paused playback)
    Started(PlaybackTicket),
    /// Still loading; call `on_ready` with the settled state of `handle`
    Buffering {
        ticket: PlaybackTicket,
        handle: MediaHandle,
    },
    /// Terminal failure for this activation
    Failed {
        ticket: PlaybackTicket,
        reason: String,
    },
}

impl Activation {
    pub fn ticket(&self) -> &PlaybackTicket {
        match self {
            Activation::Started(ticket)
            | Activation::Buffering { ticket, .. }
            | Activation::Failed { ticket, .. } => ticket,
        }
    }
}

/// Notifications derived from time updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackNotice {
    /// Position crossed the completion threshold; fires once per activation
    Completed(ContentId),
}

/// Read-only view of the controller for snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub ticket: Option<PlaybackTicket>,
    pub state: PlaybackState,
    pub muted: bool,
    pub progress_fraction: f64,
    pub completed: bool,
    pub using_fallback: bool,
}

#[derive(Debug)]
struct ActivePlayback {
    ticket: PlaybackTicket,
    handle: MediaHandle,
    duration_seconds: f64,
    position_seconds: f64,
    completed: bool,
    used_fallback: bool,
    state: PlaybackState,
}

/// Owner of the active media element.
#[derive(Debug)]
pub struct PlaybackController {
    config: PlaybackConfig,
    active: Option<ActivePlayback>,
    generation: u64,
    muted: bool,
    wants_playing: bool,
}

impl PlaybackController {
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            muted: config.start_muted,
            config,
            active: None,
            generation: 0,
            wants_playing: true,
        }
    }

    /// Makes `item` the active item and starts it as soon as it is playable.
    ///
    /// Cache hits that are already buffered start immediately. Pending
    /// handles come back as `Activation::Buffering`. Misses are loaded
    /// straight from the item's source through the cache. Every activation
    /// starts from the item's own source with one fallback attempt, even if an
    /// earlier visit ended on the fallback.
    pub async fn activate(&mut self, item: &ContentItem, cache: &mut MediaCache) -> Activation {
        self.suspend();
        self.wants_playing = true;

        let handle = cache.load_direct(item);
        self.start_activation(item, handle, cache).await
    }

    /// Activates `item` again from its original source with a fresh fallback budget.
    pub async fn retry(&mut self, item: &ContentItem, cache: &mut MediaCache) -> Activation {
        self.suspend();
        self.wants_playing = true;

        tracing::info!("Retrying playback of {}", item.id);
        let handle = cache.replace_source(&item.id, &item.media_url);
        self.start_activation(item, handle, cache).await
    }

    /// Continues a `Buffering` activation once its handle has settled.
    ///
    /// Returns `None` when `ticket` is no longer the active one.
    pub async fn on_ready(
        &mut self,
        ticket: &PlaybackTicket,
        cache: &mut MediaCache,
    ) -> Option<Activation> {
        let active = self.active.as_mut().filter(|active| &active.ticket == ticket);
        let Some(active) = active else {
            tracing::trace!("Dropping readiness for stale ticket {:?}", ticket);
            return None;
        };

        Some(
            settle(
                active,
                cache,
                self.muted,
                self.wants_playing,
                &self.config.fallback_media_url,
            )
            .await,
        )
    }

    /// Pauses the active element and stops accepting its time updates.
    ///
    /// The element stays in the cache; only interest in it ends.
    pub fn suspend(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!("Suspending playback of {}", active.ticket.id);
            active.handle.element().pause();
        }
    }

    /// Applies a time update. Updates for stale tickets are discarded.
    pub fn record_time(
        &mut self,
        ticket: &PlaybackTicket,
        position_seconds: f64,
    ) -> Option<PlaybackNotice> {
        let threshold = self.config.completion_threshold;
        let Some(active) = self.active.as_mut().filter(|active| &active.ticket == ticket) else {
            tracing::trace!("Dropping time update for stale ticket {:?}", ticket);
            return None;
        };

        active.position_seconds = position_seconds.max(0.0);

        let crossed = active.duration_seconds > 0.0
            && active.position_seconds >= active.duration_seconds * threshold;
        if crossed && !active.completed {
            active.completed = true;
            tracing::debug!("Playback of {} passed completion threshold", active.ticket.id);
            return Some(PlaybackNotice::Completed(active.ticket.id.clone()));
        }
        None
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if let Some(active) = &self.active {
            active.handle.element().set_muted(muted);
        }
    }

    /// Starts or pauses the active element. While buffering only the intent is stored.
    pub async fn set_playing(&mut self, playing: bool) -> PlaybackState {
        self.wants_playing = playing;
        let Some(active) = self.active.as_mut() else {
            return PlaybackState::Idle;
        };

        match (&active.state, playing) {
            (PlaybackState::Paused, true) => match active.handle.element().play().await {
                Ok(()) => active.state = PlaybackState::Playing,
                Err(e) => tracing::warn!("Resuming {} failed: {}", active.ticket.id, e),
            },
            (PlaybackState::Playing, false) => {
                active.handle.element().pause();
                active.state = PlaybackState::Paused;
            }
            _ => {}
        }
        active.state.clone()
    }

    /// Flips the play/pause intent.
    pub async fn toggle_playing(&mut self) -> PlaybackState {
        self.set_playing(!self.wants_playing).await
    }

    /// Flips mute and returns the new value.
    pub fn toggle_muted(&mut self) -> bool {
        self.set_muted(!self.muted);
        self.muted
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Whether the user wants the active item playing, regardless of buffering.
    pub fn wants_playing(&self) -> bool {
        self.wants_playing
    }

    pub fn state(&self) -> PlaybackState {
        self.active
            .as_ref()
            .map_or(PlaybackState::Idle, |active| active.state.clone())
    }

    pub fn ticket(&self) -> Option<&PlaybackTicket> {
        self.active.as_ref().map(|active| &active.ticket)
    }

    /// Playback position as a fraction of the item's duration, in `[0, 1]`.
    pub fn progress_fraction(&self) -> f64 {
        match &self.active {
            Some(active) if active.duration_seconds > 0.0 => {
                (active.position_seconds / active.duration_seconds).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            ticket: self.ticket().cloned(),
            state: self.state(),
            muted: self.muted,
            progress_fraction: self.progress_fraction(),
            completed: self.active.as_ref().is_some_and(|active| active.completed),
            using_fallback: self.active.as_ref().is_some_and(|active| active.used_fallback),
        }
    }

    async fn start_activation(
        &mut self,
        item: &ContentItem,
        handle: MediaHandle,
        cache: &mut MediaCache,
    ) -> Activation {
        self.generation += 1;
        let ticket = PlaybackTicket {
            id: item.id.clone(),
            generation: self.generation,
        };
        tracing::debug!(
            "Activating {} (generation {}, {:?})",
            ticket.id,
            ticket.generation,
            handle.load_state()
        );

        let active = self.active.insert(ActivePlayback {
            ticket,
            handle,
            duration_seconds: item.duration_seconds,
            position_seconds: 0.0,
            completed: false,
            used_fallback: false,
            state: PlaybackState::Buffering,
        });

        settle(
            active,
            cache,
            self.muted,
            self.wants_playing,
            &self.config.fallback_media_url,
        )
        .await
    }
}

/// Drives an activation forward from the handle's current load state.
///
/// Each failure consumes the single fallback attempt; a second failure is
/// terminal for this activation.
async fn settle(
    active: &mut ActivePlayback,
    cache: &mut MediaCache,
    muted: bool,
    wants_playing: bool,
    fallback_media_url: &str,
) -> Activation {
    loop {
        let failure = match active.handle.load_state() {
            LoadState::Pending => {
                active.state = PlaybackState::Buffering;
                return Activation::Buffering {
                    ticket: active.ticket.clone(),
                    handle: active.handle.clone(),
                };
            }
            LoadState::Ready => {
                let element = active.handle.element();
                element.set_muted(muted);
                if !wants_playing {
                    active.state = PlaybackState::Paused;
                    return Activation::Started(active.ticket.clone());
                }
                match element.play().await {
                    Ok(()) => {
                        active.state = PlaybackState::Playing;
                        return Activation::Started(active.ticket.clone());
                    }
                    Err(e) => e.to_string(),
                }
            }
            LoadState::Failed { reason } => reason,
        };

        if active.used_fallback {
            tracing::warn!(
                "Playback of {} failed on fallback source: {}",
                active.ticket.id,
                failure
            );
            active.state = PlaybackState::Failed {
                reason: failure.clone(),
            };
            return Activation::Failed {
                ticket: active.ticket.clone(),
                reason: failure,
            };
        }

        tracing::warn!(
            "Playback of {} failed ({}), switching to fallback source",
            active.ticket.id,
            failure
        );
        active.used_fallback = true;
        active.handle = cache.replace_source(&active.ticket.id, fallback_media_url);
    }
}

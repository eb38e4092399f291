//! Navigation state machine for one viewing session.
//!
//! The navigator owns the media cache and the playback controller. It is
//! driven by the actor loop in `actor.rs`: inputs arrive as commands, the
//! settle timer fires `complete_transition`, and background readiness
//! waiters report back through the signal channel.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

use super::NavigationError;
use super::commands::{IgnoreReason, InputOutcome, NavigatorEvent, NavigatorSignal, SessionSnapshot};
use super::overlay::{Overlay, OverlayChange, OverlayStack};
use crate::adjacency::{Direction, NeighborSet, resolve_neighbors};
use crate::catalog::{CatalogIndex, ContentId, ContentItem};
use crate::config::{CrossfeedConfig, NavigationConfig};
use crate::input::InputAction;
use crate::media::{CacheStatistics, MediaBackend, MediaCache, WarmPriority};
use crate::playback::{
    Activation, PlaybackController, PlaybackNotice, PlaybackState, PlaybackTicket,
};

/// Machine phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Transitioning {
        direction: Direction,
        target: ContentId,
        settle_deadline: Instant,
    },
}

/// All state of a navigation session.
#[derive(Debug)]
pub struct Navigator {
    config: NavigationConfig,
    catalog: Arc<CatalogIndex>,
    cache: MediaCache,
    playback: PlaybackController,
    current: ContentId,
    neighbors: NeighborSet,
    phase: Phase,
    last_direction: Option<Direction>,
    overlays: OverlayStack,
    events: broadcast::Sender<NavigatorEvent>,
    signals: mpsc::UnboundedSender<NavigatorSignal>,
}

impl Navigator {
    /// Creates a session positioned on `initial`. Nothing loads until `mount`.
    ///
    /// # Errors
    /// - `NavigationError::UnknownItem` - `initial` is not in the catalog
    pub(crate) fn new(
        config: &CrossfeedConfig,
        catalog: Arc<CatalogIndex>,
        backend: Arc<dyn MediaBackend>,
        initial: ContentId,
        events: broadcast::Sender<NavigatorEvent>,
        signals: mpsc::UnboundedSender<NavigatorSignal>,
    ) -> Result<Self, NavigationError> {
        if !catalog.contains(&initial) {
            return Err(NavigationError::UnknownItem { id: initial });
        }

        Ok(Self {
            config: config.navigation.clone(),
            catalog,
            cache: MediaCache::new(backend, config.cache.capacity),
            playback: PlaybackController::new(config.playback.clone()),
            current: initial,
            neighbors: NeighborSet::default(),
            phase: Phase::Idle,
            last_direction: None,
            overlays: OverlayStack::new(),
            events,
            signals,
        })
    }

    /// Pins and activates the initial item and warms its neighbors.
    pub async fn mount(&mut self) {
        let catalog = Arc::clone(&self.catalog);
        let Ok(item) = catalog.find_by_id(&self.current) else {
            tracing::error!("Initial item {} vanished from the catalog", self.current);
            return;
        };

        tracing::info!("Mounting navigation session at {}", item.id);
        let activation = self.enter_item(item, &catalog).await;
        self.handle_activation(activation);
    }

    /// Applies one input according to the current phase.
    pub async fn dispatch(&mut self, action: InputAction) -> InputOutcome {
        if self.is_transitioning() {
            if action == InputAction::CloseOverlay {
                return self.close_top_overlay();
            }
            tracing::debug!("Dropping {} during transition", action);
            return InputOutcome::ignored(IgnoreReason::Transitioning);
        }

        match action {
            InputAction::Navigate(direction) => {
                if let Some(overlay) = self.overlays.close_top() {
                    tracing::debug!("{} closed {} overlay instead of navigating", direction, overlay);
                    self.emit_overlay_closed(overlay);
                    return InputOutcome::OverlayClosed { overlay };
                }
                self.begin_transition(direction)
            }
            InputAction::TogglePlay => {
                let state = self.playback.toggle_playing().await;
                self.emit(NavigatorEvent::PlayStateChanged {
                    state: state.clone(),
                });
                InputOutcome::PlaybackToggled { state }
            }
            InputAction::ToggleMute => {
                let muted = self.playback.toggle_muted();
                self.emit(NavigatorEvent::MuteChanged { muted });
                InputOutcome::MuteToggled { muted }
            }
            InputAction::ToggleOverlay(overlay) => match self.overlays.toggle(overlay) {
                OverlayChange::Opened(overlay) => {
                    self.emit(NavigatorEvent::OverlayOpened {
                        overlay,
                        item_id: self.current.clone(),
                    });
                    InputOutcome::OverlayOpened { overlay }
                }
                OverlayChange::Closed(overlay) => {
                    self.emit_overlay_closed(overlay);
                    InputOutcome::OverlayClosed { overlay }
                }
            },
            InputAction::CloseOverlay => self.close_top_overlay(),
        }
    }

    /// Finishes the transition in flight: swaps the current item, warms the
    /// new neighborhood and activates playback. No-op while idle.
    pub async fn complete_transition(&mut self) {
        let Phase::Transitioning {
            direction, target, ..
        } = std::mem::replace(&mut self.phase, Phase::Idle)
        else {
            return;
        };

        let catalog = Arc::clone(&self.catalog);
        let Ok(item) = catalog.find_by_id(&target) else {
            tracing::warn!("Transition target {} is not in the catalog", target);
            return;
        };

        let activation = self.enter_item(item, &catalog).await;
        tracing::info!("Now showing {} (moved {})", self.current, direction);
        self.emit(NavigatorEvent::ItemChanged {
            id: self.current.clone(),
            direction,
        });
        self.handle_activation(activation);
    }

    pub(crate) async fn handle_signal(&mut self, signal: NavigatorSignal) {
        match signal {
            NavigatorSignal::MediaSettled { ticket } => {
                if let Some(activation) = self.playback.on_ready(&ticket, &mut self.cache).await {
                    self.handle_activation(activation);
                }
            }
        }
    }

    /// Applies a playback position update for `ticket`.
    pub fn record_time(&mut self, ticket: &PlaybackTicket, position_seconds: f64) {
        if let Some(PlaybackNotice::Completed(id)) =
            self.playback.record_time(ticket, position_seconds)
        {
            self.emit(NavigatorEvent::PlaybackCompleted { id });
        }
    }

    /// Re-activates the current item from its original source.
    ///
    /// Ignored while a transition is in flight; the incoming item gets a
    /// fresh activation anyway.
    ///
    /// # Errors
    /// - `NavigationError::UnknownItem` - Current item is not in the catalog
    pub async fn retry(&mut self) -> Result<PlaybackState, NavigationError> {
        if self.is_transitioning() {
            tracing::debug!("Ignoring retry during transition");
            return Ok(self.playback.state());
        }

        let catalog = Arc::clone(&self.catalog);
        let item = catalog
            .find_by_id(&self.current)
            .map_err(|_| NavigationError::UnknownItem {
                id: self.current.clone(),
            })?;

        let activation = self.playback.retry(item, &mut self.cache).await;
        self.handle_activation(activation);
        Ok(self.playback.state())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let transition_target = match &self.phase {
            Phase::Transitioning { target, .. } => Some(target.clone()),
            Phase::Idle => None,
        };

        SessionSnapshot {
            current_item_id: self.current.clone(),
            neighbors: self.neighbors.clone(),
            transition_direction: self.last_direction,
            is_transitioning: self.is_transitioning(),
            transition_target,
            playback: self.playback.snapshot(),
            overlays: self.overlays.as_slice().to_vec(),
        }
    }

    pub fn cache_statistics(&self) -> CacheStatistics {
        self.cache.statistics()
    }

    pub fn current(&self) -> &ContentId {
        &self.current
    }

    pub fn neighbors(&self) -> &NeighborSet {
        &self.neighbors
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, Phase::Transitioning { .. })
    }

    /// When the transition in flight should complete.
    pub fn settle_deadline(&self) -> Option<Instant> {
        match &self.phase {
            Phase::Transitioning {
                settle_deadline, ..
            } => Some(*settle_deadline),
            Phase::Idle => None,
        }
    }

    pub fn cache(&self) -> &MediaCache {
        &self.cache
    }

    /// Stops playback and releases every cached element.
    pub fn shutdown(&mut self) {
        tracing::info!("Shutting down navigation session at {}", self.current);
        self.playback.suspend();
        self.cache.dispose();
    }

    fn begin_transition(&mut self, direction: Direction) -> InputOutcome {
        let Some(target) = self.neighbors.get(direction).cloned() else {
            tracing::debug!("No {} neighbor for {}", direction, self.current);
            return InputOutcome::ignored(IgnoreReason::NoNeighbor);
        };

        self.last_direction = Some(direction);
        for overlay in self.overlays.close_all() {
            self.emit_overlay_closed(overlay);
        }
        self.playback.suspend();

        tracing::info!("Transition {} -> {} ({})", self.current, target, direction);
        self.phase = Phase::Transitioning {
            direction,
            target: target.clone(),
            settle_deadline: Instant::now() + self.config.settle_delay,
        };
        self.emit(NavigatorEvent::TransitionStarted {
            direction,
            target: target.clone(),
        });

        InputOutcome::TransitionStarted { direction, target }
    }

    /// Makes `item` current, rebuilds its neighborhood and activates it.
    async fn enter_item(&mut self, item: &ContentItem, catalog: &CatalogIndex) -> Activation {
        self.current = item.id.clone();
        self.cache.set_current(Some(item.id.clone()));
        self.neighbors = resolve_neighbors(item, catalog);
        self.warm_neighbors(catalog);

        self.playback.activate(item, &mut self.cache).await
    }

    fn warm_neighbors(&mut self, catalog: &CatalogIndex) {
        for (direction, id) in self.neighbors.iter() {
            let Ok(neighbor) = catalog.find_by_id(id) else {
                continue;
            };
            let priority = match direction {
                Direction::Up => WarmPriority::High,
                _ => WarmPriority::Low,
            };
            self.cache.warm(neighbor, priority);
        }
    }

    fn handle_activation(&mut self, activation: Activation) {
        match activation {
            Activation::Started(ticket) => {
                let snapshot = self.playback.snapshot();
                self.emit(NavigatorEvent::PlaybackStarted {
                    ticket,
                    using_fallback: snapshot.using_fallback,
                });
            }
            Activation::Buffering { ticket, handle } => {
                let signals = self.signals.clone();
                tokio::spawn(async move {
                    handle.wait_until_settled().await;
                    let _ = signals.send(NavigatorSignal::MediaSettled { ticket });
                });
            }
            Activation::Failed { ticket, reason } => {
                self.emit(NavigatorEvent::PlaybackFailed {
                    id: ticket.id,
                    reason,
                });
            }
        }
    }

    fn close_top_overlay(&mut self) -> InputOutcome {
        match self.overlays.close_top() {
            Some(overlay) => {
                self.emit_overlay_closed(overlay);
                InputOutcome::OverlayClosed { overlay }
            }
            None => InputOutcome::ignored(IgnoreReason::NoOverlay),
        }
    }

    fn emit_overlay_closed(&self, overlay: Overlay) {
        self.emit(NavigatorEvent::OverlayClosed {
            overlay,
            item_id: self.current.clone(),
        });
    }

    fn emit(&self, event: NavigatorEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::catalog::test_fixtures::{ItemBuilder, mixed_catalog, physics_catalog};
    use crate::media::simulated::{ElementEvent, SimulatedBackend, SimulatedBackendConfig};

    struct NavigatorFixture {
        navigator: Navigator,
        backend: Arc<SimulatedBackend>,
        events: broadcast::Receiver<NavigatorEvent>,
        signals: mpsc::UnboundedReceiver<NavigatorSignal>,
    }

    impl NavigatorFixture {
        async fn mounted(catalog: CatalogIndex, start: &str) -> Self {
            Self::mounted_with(catalog, start, CrossfeedConfig::for_testing()).await
        }

        async fn mounted_with(catalog: CatalogIndex, start: &str, config: CrossfeedConfig) -> Self {
            let backend = Arc::new(SimulatedBackend::new(SimulatedBackendConfig::instant()));
            Self::mounted_on(catalog, start, config, backend).await
        }

        /// Mounts on a backend the test has already configured.
        async fn mounted_on(
            catalog: CatalogIndex,
            start: &str,
            config: CrossfeedConfig,
            backend: Arc<SimulatedBackend>,
        ) -> Self {
            let (event_sender, events) = broadcast::channel(64);
            let (signal_sender, signals) = mpsc::unbounded_channel();
            let mut navigator = Navigator::new(
                &config,
                Arc::new(catalog),
                backend.clone(),
                ContentId::new(start),
                event_sender,
                signal_sender,
            )
            .unwrap();
            navigator.mount().await;

            let mut fixture = Self {
                navigator,
                backend,
                events,
                signals,
            };
            fixture.drain_signals().await;
            fixture
        }

        /// Delivers readiness signals until playback leaves `Buffering`.
        async fn drain_signals(&mut self) {
            while self.navigator.playback.state() == PlaybackState::Buffering {
                let signal = self.signals.recv().await.unwrap();
                self.navigator.handle_signal(signal).await;
            }
        }

        async fn go(&mut self, direction: Direction) -> InputOutcome {
            let outcome = self.navigator.dispatch(InputAction::Navigate(direction)).await;
            self.navigator.complete_transition().await;
            self.drain_signals().await;
            outcome
        }

        fn current(&self) -> &str {
            self.navigator.current().as_str()
        }

        fn received(&mut self) -> Vec<NavigatorEvent> {
            let mut received = Vec::new();
            while let Ok(event) = self.events.try_recv() {
                received.push(event);
            }
            received
        }

        fn ticket(&self) -> PlaybackTicket {
            self.navigator.playback.ticket().cloned().unwrap()
        }
    }

    #[tokio::test]
    async fn test_mount_plays_initial_item() {
        let mut fixture = NavigatorFixture::mounted(physics_catalog(), "phys-1").await;

        assert_eq!(fixture.current(), "phys-1");
        assert_eq!(fixture.navigator.playback.state(), PlaybackState::Playing);
        assert!(
            fixture
                .received()
                .iter()
                .any(|event| matches!(event, NavigatorEvent::PlaybackStarted { .. }))
        );
    }

    #[tokio::test]
    async fn test_physics_scenario_neighbors() {
        let fixture = NavigatorFixture::mounted(physics_catalog(), "phys-1").await;
        let neighbors = fixture.navigator.neighbors();

        assert_eq!(neighbors.up, Some(ContentId::new("phys-2")));
        assert_eq!(neighbors.down, Some(ContentId::new("phys-3")));
        assert_eq!(neighbors.right, Some(ContentId::new("Q")));
        assert_eq!(neighbors.left, None);
    }

    #[tokio::test]
    async fn test_navigate_up_changes_item_after_settle() {
        let mut fixture = NavigatorFixture::mounted(physics_catalog(), "phys-1").await;

        let outcome = fixture
            .navigator
            .dispatch(InputAction::Navigate(Direction::Up))
            .await;
        assert_eq!(
            outcome,
            InputOutcome::TransitionStarted {
                direction: Direction::Up,
                target: ContentId::new("phys-2")
            }
        );
        assert!(fixture.navigator.is_transitioning());
        assert_eq!(fixture.current(), "phys-1");

        fixture.navigator.complete_transition().await;

        assert_eq!(fixture.current(), "phys-2");
        assert_eq!(fixture.navigator.phase(), &Phase::Idle);
        assert_eq!(fixture.navigator.cache().current(), Some(&ContentId::new("phys-2")));
        assert_eq!(
            fixture.navigator.snapshot().transition_direction,
            Some(Direction::Up)
        );
    }

    #[tokio::test]
    async fn test_item_changed_emitted_once_after_update() {
        let mut fixture = NavigatorFixture::mounted(physics_catalog(), "phys-1").await;
        fixture.received();

        fixture.go(Direction::Up).await;

        let changes: Vec<_> = fixture
            .received()
            .into_iter()
            .filter(|event| matches!(event, NavigatorEvent::ItemChanged { .. }))
            .collect();
        assert_eq!(
            changes,
            vec![NavigatorEvent::ItemChanged {
                id: ContentId::new("phys-2"),
                direction: Direction::Up
            }]
        );
    }

    #[tokio::test]
    async fn test_inputs_during_transition_are_dropped() {
        let mut fixture = NavigatorFixture::mounted(physics_catalog(), "phys-1").await;

        fixture
            .navigator
            .dispatch(InputAction::Navigate(Direction::Up))
            .await;
        let second = fixture
            .navigator
            .dispatch(InputAction::Navigate(Direction::Up))
            .await;
        let toggle = fixture.navigator.dispatch(InputAction::TogglePlay).await;

        assert_eq!(second, InputOutcome::ignored(IgnoreReason::Transitioning));
        assert_eq!(toggle, InputOutcome::ignored(IgnoreReason::Transitioning));

        fixture.navigator.complete_transition().await;
        assert_eq!(fixture.current(), "phys-2");
    }

    #[tokio::test]
    async fn test_absent_neighbor_is_noop() {
        let mut fixture = NavigatorFixture::mounted(physics_catalog(), "phys-1").await;

        let outcome = fixture
            .navigator
            .dispatch(InputAction::Navigate(Direction::Left))
            .await;

        assert_eq!(outcome, InputOutcome::ignored(IgnoreReason::NoNeighbor));
        assert!(!fixture.navigator.is_transitioning());
        assert_eq!(fixture.navigator.playback.state(), PlaybackState::Playing);
    }

    #[tokio::test]
    async fn test_overlay_intercepts_navigation() {
        let mut fixture = NavigatorFixture::mounted(physics_catalog(), "phys-1").await;

        assert_eq!(
            fixture
                .navigator
                .dispatch(InputAction::ToggleOverlay(Overlay::Info))
                .await,
            InputOutcome::OverlayOpened {
                overlay: Overlay::Info
            }
        );
        let outcome = fixture
            .navigator
            .dispatch(InputAction::Navigate(Direction::Up))
            .await;

        assert_eq!(
            outcome,
            InputOutcome::OverlayClosed {
                overlay: Overlay::Info
            }
        );
        assert!(!fixture.navigator.is_transitioning());
        assert_eq!(fixture.current(), "phys-1");
    }

    #[tokio::test]
    async fn test_close_overlay_without_overlay() {
        let mut fixture = NavigatorFixture::mounted(physics_catalog(), "phys-1").await;

        assert_eq!(
            fixture.navigator.dispatch(InputAction::CloseOverlay).await,
            InputOutcome::ignored(IgnoreReason::NoOverlay)
        );
    }

    #[tokio::test]
    async fn test_transition_pauses_outgoing_item() {
        let mut fixture = NavigatorFixture::mounted(physics_catalog(), "phys-1").await;

        fixture
            .navigator
            .dispatch(InputAction::Navigate(Direction::Right))
            .await;

        assert_eq!(fixture.navigator.playback.state(), PlaybackState::Idle);
        let outgoing = "https://cdn.example.com/media/phys-1.mp4";
        assert_eq!(
            fixture.backend.events_for(outgoing).last(),
            Some(&ElementEvent::Paused {
                source_url: outgoing.to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_neighbors_are_warmed_with_up_primed() {
        let fixture = NavigatorFixture::mounted(physics_catalog(), "phys-1").await;
        let cache = fixture.navigator.cache();

        for id in ["phys-1", "phys-2", "phys-3", "Q"] {
            assert!(cache.contains(&ContentId::new(id)), "{id} should be cached");
        }

        cache
            .peek(&ContentId::new("phys-2"))
            .unwrap()
            .wait_until_settled()
            .await;
        let up_events = fixture
            .backend
            .events_for("https://cdn.example.com/media/phys-2.mp4");
        assert!(
            up_events
                .iter()
                .any(|event| matches!(event, ElementEvent::Played { .. }))
        );
    }

    #[tokio::test]
    async fn test_round_trip_keeps_origin_cached() {
        let mut fixture = NavigatorFixture::mounted(mixed_catalog(), "phys-1").await;

        fixture.go(Direction::Right).await;
        let middle = fixture.current().to_string();
        assert_ne!(middle, "phys-1");

        let back = fixture
            .navigator
            .neighbors()
            .iter()
            .find(|(_, id)| id.as_str() == "phys-1")
            .map(|(direction, _)| direction);
        assert_eq!(back, Some(Direction::Left));

        fixture.go(Direction::Left).await;
        assert_eq!(fixture.current(), "phys-1");
        assert!(fixture.navigator.cache().contains(&ContentId::new("phys-1")));
    }

    #[tokio::test]
    async fn test_up_then_down_returns_with_cache_hit() {
        let mut fixture = NavigatorFixture::mounted(physics_catalog(), "phys-1").await;

        fixture.go(Direction::Up).await;
        fixture.go(Direction::Down).await;

        assert_eq!(fixture.current(), "phys-1");
        assert_eq!(
            fixture
                .backend
                .created_count("https://cdn.example.com/media/phys-1.mp4"),
            1
        );
    }

    #[tokio::test]
    async fn test_current_survives_tiny_cache() {
        let mut config = CrossfeedConfig::for_testing();
        config.cache.capacity = 1;
        let mut fixture = NavigatorFixture::mounted_with(physics_catalog(), "phys-1", config).await;

        fixture.go(Direction::Up).await;

        assert!(fixture.navigator.cache().contains(&ContentId::new("phys-2")));
        assert_eq!(fixture.navigator.playback.state(), PlaybackState::Playing);
    }

    #[tokio::test]
    async fn test_stale_time_updates_do_not_complete_new_item() {
        let mut fixture = NavigatorFixture::mounted(physics_catalog(), "phys-1").await;
        let old_ticket = fixture.ticket();

        fixture.go(Direction::Up).await;
        fixture.received();
        fixture.navigator.record_time(&old_ticket, 59.0);

        assert_eq!(fixture.navigator.snapshot().playback.progress_fraction, 0.0);
        assert!(fixture.received().is_empty());
    }

    #[tokio::test]
    async fn test_completion_event_fires_once() {
        let mut fixture = NavigatorFixture::mounted(physics_catalog(), "phys-1").await;
        let ticket = fixture.ticket();
        fixture.received();

        fixture.navigator.record_time(&ticket, 30.0);
        fixture.navigator.record_time(&ticket, 55.0);
        fixture.navigator.record_time(&ticket, 58.0);

        assert_eq!(
            fixture.received(),
            vec![NavigatorEvent::PlaybackCompleted {
                id: ContentId::new("phys-1")
            }]
        );
    }

    #[tokio::test]
    async fn test_revisit_after_fallback_retries_own_source() {
        let broken = "https://cdn.example.com/media/phys-2.mp4";
        let backend = Arc::new(SimulatedBackend::new(SimulatedBackendConfig::instant()));
        backend.fail_source(broken);
        let config = CrossfeedConfig::for_testing();
        let fallback = config.playback.fallback_media_url.clone();
        let mut fixture =
            NavigatorFixture::mounted_on(physics_catalog(), "phys-1", config, backend).await;

        fixture.go(Direction::Up).await;
        assert!(fixture.navigator.snapshot().playback.using_fallback);
        fixture.go(Direction::Down).await;
        fixture.received();
        fixture.go(Direction::Up).await;

        assert_eq!(fixture.current(), "phys-2");
        let playback = fixture.navigator.snapshot().playback;
        assert_eq!(playback.state, PlaybackState::Playing);
        assert!(playback.using_fallback);
        let source = fixture
            .navigator
            .cache()
            .peek(&ContentId::new("phys-2"))
            .unwrap()
            .source_url()
            .to_string();
        assert_eq!(source, fallback);
        assert!(fixture.backend.created_count(broken) >= 2);
        assert!(fixture.received().iter().any(|event| matches!(
            event,
            NavigatorEvent::PlaybackStarted {
                using_fallback: true,
                ..
            }
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_onto_neighbor_still_loading() {
        let backend = Arc::new(SimulatedBackend::new(SimulatedBackendConfig {
            load_latency: Duration::from_millis(500),
            ..SimulatedBackendConfig::instant()
        }));
        let mut fixture = NavigatorFixture::mounted_on(
            mixed_catalog(),
            "phys-1",
            CrossfeedConfig::for_testing(),
            backend,
        )
        .await;
        fixture.go(Direction::Left).await;
        assert_eq!(fixture.current(), "chem-1");
        let chem_2 = "https://cdn.example.com/media/chem-2.mp4";
        assert_eq!(fixture.backend.created_count(chem_2), 1);

        fixture
            .navigator
            .dispatch(InputAction::Navigate(Direction::Up))
            .await;
        fixture.navigator.complete_transition().await;

        assert_eq!(fixture.current(), "chem-2");
        assert_eq!(fixture.navigator.playback.state(), PlaybackState::Buffering);

        fixture.drain_signals().await;
        assert_eq!(fixture.navigator.playback.state(), PlaybackState::Playing);
        assert_eq!(fixture.backend.created_count(chem_2), 1);
    }

    #[tokio::test]
    async fn test_failed_media_and_retry() {
        let catalog = CatalogIndex::new(vec![ItemBuilder::new("solo").build()]).unwrap();
        let backend = Arc::new(SimulatedBackend::new(SimulatedBackendConfig::instant()));
        let config = CrossfeedConfig::for_testing();
        backend.fail_source("https://cdn.example.com/media/solo.mp4");
        backend.fail_source(&config.playback.fallback_media_url);

        let (event_sender, mut events) = broadcast::channel(64);
        let (signal_sender, mut signals) = mpsc::unbounded_channel();
        let mut navigator = Navigator::new(
            &config,
            Arc::new(catalog),
            backend.clone(),
            ContentId::new("solo"),
            event_sender,
            signal_sender,
        )
        .unwrap();
        navigator.mount().await;
        while navigator.playback.state() == PlaybackState::Buffering {
            let signal = signals.recv().await.unwrap();
            navigator.handle_signal(signal).await;
        }

        assert!(matches!(
            navigator.playback.state(),
            PlaybackState::Failed { .. }
        ));
        let mut failed = false;
        while let Ok(event) = events.try_recv() {
            failed |= matches!(event, NavigatorEvent::PlaybackFailed { .. });
        }
        assert!(failed);

        let state = navigator.retry().await.unwrap();
        assert_eq!(state, PlaybackState::Buffering);
        assert_eq!(navigator.snapshot().playback.ticket.unwrap().generation, 2);
    }

    #[tokio::test]
    async fn test_toggle_play_and_mute() {
        let mut fixture = NavigatorFixture::mounted(physics_catalog(), "phys-1").await;

        assert_eq!(
            fixture.navigator.dispatch(InputAction::TogglePlay).await,
            InputOutcome::PlaybackToggled {
                state: PlaybackState::Paused
            }
        );
        assert_eq!(
            fixture.navigator.dispatch(InputAction::ToggleMute).await,
            InputOutcome::MuteToggled { muted: false }
        );
        assert!(fixture.received().contains(&NavigatorEvent::MuteChanged { muted: false }));
    }

    #[test]
    fn test_unknown_initial_item_is_rejected() {
        let backend = Arc::new(SimulatedBackend::new(SimulatedBackendConfig::instant()));
        let (event_sender, _) = broadcast::channel(4);
        let (signal_sender, _) = mpsc::unbounded_channel();

        let result = Navigator::new(
            &CrossfeedConfig::for_testing(),
            Arc::new(physics_catalog()),
            backend,
            ContentId::new("missing"),
            event_sender,
            signal_sender,
        );

        assert!(matches!(result, Err(NavigationError::UnknownItem { .. })));
    }
}

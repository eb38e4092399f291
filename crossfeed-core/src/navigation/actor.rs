//! Actor implementation for the navigator.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::time::{Instant, sleep_until};

use super::NavigationError;
use super::commands::{NavigatorCommand, NavigatorEvent, NavigatorSignal};
use super::handle::NavigatorHandle;
use super::navigator::Navigator;
use crate::catalog::{CatalogIndex, ContentId};
use crate::config::CrossfeedConfig;
use crate::media::MediaBackend;

/// Spawns a navigator actor positioned on `initial` and returns its handle.
///
/// The initial item is mounted inside the actor before the first command is
/// processed. Must be called from within a tokio runtime.
///
/// # Errors
/// - `NavigationError::UnknownItem` - `initial` is not in the catalog
///
/// # Examples
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() {
/// use std::sync::Arc;
///
/// use crossfeed_core::catalog::{CatalogIndex, ContentId};
/// use crossfeed_core::config::CrossfeedConfig;
/// use crossfeed_core::media::{SimulatedBackend, SimulatedBackendConfig};
/// use crossfeed_core::navigation::spawn_navigator;
///
/// let catalog = CatalogIndex::load("catalog.json".as_ref()).await.unwrap();
/// let backend = Arc::new(SimulatedBackend::new(SimulatedBackendConfig::default()));
/// let handle = spawn_navigator(
///     CrossfeedConfig::default(),
///     Arc::new(catalog),
///     backend,
///     ContentId::new("intro-1"),
/// )
/// .unwrap();
/// # }
/// ```
pub fn spawn_navigator(
    config: CrossfeedConfig,
    catalog: Arc<CatalogIndex>,
    backend: Arc<dyn MediaBackend>,
    initial: ContentId,
) -> Result<NavigatorHandle, NavigationError> {
    spawn_navigator_subscribed(config, catalog, backend, initial).map(|(handle, _)| handle)
}

/// Like [`spawn_navigator`], but also returns an event receiver subscribed
/// before the actor starts, so events of the initial mount are not missed.
///
/// # Errors
/// - `NavigationError::UnknownItem` - `initial` is not in the catalog
pub fn spawn_navigator_subscribed(
    config: CrossfeedConfig,
    catalog: Arc<CatalogIndex>,
    backend: Arc<dyn MediaBackend>,
    initial: ContentId,
) -> Result<(NavigatorHandle, broadcast::Receiver<NavigatorEvent>), NavigationError> {
    let (sender, receiver) = mpsc::channel(config.navigation.command_buffer.max(1));
    let (signal_sender, signal_receiver) = mpsc::unbounded_channel();
    let (event_sender, events) = broadcast::channel(config.navigation.event_buffer.max(1));

    let navigator = Navigator::new(
        &config,
        catalog,
        backend,
        initial,
        event_sender.clone(),
        signal_sender,
    )?;

    tokio::spawn(async move {
        run_actor_loop(navigator, receiver, signal_receiver).await;
    });

    Ok((NavigatorHandle::new(sender, event_sender), events))
}

/// Runs the main actor message processing loop.
///
/// Commands, media readiness signals and the settle timer are awaited
/// together, so inputs arriving mid-transition are seen (and dropped)
/// instead of queueing behind the timer. The loop ends on `Shutdown` or
/// when every handle is dropped.
async fn run_actor_loop(
    mut navigator: Navigator,
    mut receiver: mpsc::Receiver<NavigatorCommand>,
    mut signal_receiver: mpsc::UnboundedReceiver<NavigatorSignal>,
) {
    tracing::debug!("Navigator actor started");
    navigator.mount().await;

    loop {
        let settle_deadline = navigator.settle_deadline();

        tokio::select! {
            command = receiver.recv() => {
                let Some(command) = command else {
                    // Every handle was dropped
                    navigator.shutdown();
                    break;
                };
                if !handle_command(&mut navigator, command).await {
                    break;
                }
            }
            Some(signal) = signal_receiver.recv() => {
                navigator.handle_signal(signal).await;
            }
            () = sleep_until(settle_deadline.unwrap_or_else(Instant::now)), if settle_deadline.is_some() => {
                navigator.complete_transition().await;
            }
        }
    }

    tracing::debug!("Navigator actor stopped");
}

/// Handles a single command for the navigator.
/// Returns true to continue processing, false to shutdown.
async fn handle_command(navigator: &mut Navigator, command: NavigatorCommand) -> bool {
    match command {
        NavigatorCommand::Dispatch { action, responder } => {
            let outcome = navigator.dispatch(action).await;
            let _ = responder.send(outcome);
        }

        NavigatorCommand::Snapshot { responder } => {
            let _ = responder.send(navigator.snapshot());
        }

        NavigatorCommand::ReportTime {
            ticket,
            position_seconds,
        } => {
            navigator.record_time(&ticket, position_seconds);
        }

        NavigatorCommand::Retry { responder } => {
            let result = navigator.retry().await;
            let _ = responder.send(result);
        }

        NavigatorCommand::CacheStatistics { responder } => {
            let _ = responder.send(navigator.cache_statistics());
        }

        NavigatorCommand::Shutdown { responder } => {
            tracing::debug!("Navigator actor shutting down");
            navigator.shutdown();
            let _ = responder.send(());
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::adjacency::Direction;
    use crate::catalog::test_fixtures::physics_catalog;
    use crate::media::simulated::{SimulatedBackend, SimulatedBackendConfig};
    use crate::navigation::{IgnoreReason, InputOutcome, NavigatorEvent};

    fn spawn_physics(start: &str) -> (NavigatorHandle, Arc<SimulatedBackend>) {
        let backend = Arc::new(SimulatedBackend::new(SimulatedBackendConfig {
            load_latency: Duration::from_millis(40),
            ..SimulatedBackendConfig::instant()
        }));
        let handle = spawn_navigator(
            CrossfeedConfig::default(),
            Arc::new(physics_catalog()),
            backend.clone(),
            ContentId::new(start),
        )
        .unwrap();
        (handle, backend)
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_quick_inputs_change_item_once() {
        let (handle, _backend) = spawn_physics("phys-1");
        let mut events = handle.subscribe();

        let first = handle.navigate(Direction::Up).await.unwrap();
        let second = handle.navigate(Direction::Up).await.unwrap();

        assert!(matches!(first, InputOutcome::TransitionStarted { .. }));
        assert_eq!(second, InputOutcome::ignored(IgnoreReason::Transitioning));

        tokio::time::sleep(Duration::from_secs(1)).await;

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.current_item_id, ContentId::new("phys-2"));
        assert!(!snapshot.is_transitioning);

        let mut changes = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, NavigatorEvent::ItemChanged { .. }) {
                changes += 1;
            }
        }
        assert_eq!(changes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_current_item_unchanged_until_settle_delay() {
        let (handle, _backend) = spawn_physics("phys-1");

        handle.navigate(Direction::Down).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        let snapshot = handle.snapshot().await.unwrap();
        assert!(snapshot.is_transitioning);
        assert_eq!(snapshot.current_item_id, ContentId::new("phys-1"));
        assert_eq!(snapshot.transition_target, Some(ContentId::new("phys-3")));

        tokio::time::sleep(Duration::from_millis(250)).await;

        let snapshot = handle.snapshot().await.unwrap();
        assert!(!snapshot.is_transitioning);
        assert_eq!(snapshot.current_item_id, ContentId::new("phys-3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_playback_starts_after_buffering() {
        let (handle, _backend) = spawn_physics("phys-1");
        let mut events = handle.subscribe();

        let started = loop {
            match events.recv().await.unwrap() {
                NavigatorEvent::PlaybackStarted { ticket, .. } => break ticket,
                _ => continue,
            }
        };

        assert_eq!(started.id, ContentId::new("phys-1"));
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.playback.ticket, Some(started));
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_time_emits_completion() {
        let (handle, _backend) = spawn_physics("phys-1");
        tokio::time::sleep(Duration::from_millis(200)).await;
        let ticket = handle.snapshot().await.unwrap().playback.ticket.unwrap();
        let mut events = handle.subscribe();

        handle.report_time(ticket.clone(), 57.0).await.unwrap();

        assert_eq!(
            events.recv().await.unwrap(),
            NavigatorEvent::PlaybackCompleted {
                id: ContentId::new("phys-1")
            }
        );
        let snapshot = handle.snapshot().await.unwrap();
        assert!(snapshot.playback.completed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_subscribed_spawn_sees_initial_mount() {
        let backend = Arc::new(SimulatedBackend::new(SimulatedBackendConfig::instant()));
        let (handle, mut events) = spawn_navigator_subscribed(
            CrossfeedConfig::for_testing(),
            Arc::new(physics_catalog()),
            backend,
            ContentId::new("phys-1"),
        )
        .unwrap();

        let started = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let NavigatorEvent::PlaybackStarted { ticket, .. } = events.recv().await.unwrap() {
                    break ticket;
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(started.id, ContentId::new("phys-1"));
        assert_eq!(started.generation, 1);
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_stops_actor() {
        let (handle, _backend) = spawn_physics("phys-1");

        handle.shutdown().await.unwrap();

        assert_eq!(
            handle.snapshot().await,
            Err(NavigationError::EngineShutdown)
        );
        assert!(!handle.is_running());
    }

    #[tokio::test]
    async fn test_cache_statistics_reflect_warming() {
        let (handle, _backend) = spawn_physics("phys-1");

        let stats = handle.cache_statistics().await.unwrap();

        assert_eq!(stats.entries, 4);
        assert_eq!(stats.capacity, 10);
    }

    #[tokio::test]
    async fn test_unknown_start_is_rejected() {
        let backend = Arc::new(SimulatedBackend::new(SimulatedBackendConfig::instant()));
        let result = spawn_navigator(
            CrossfeedConfig::default(),
            Arc::new(physics_catalog()),
            backend,
            ContentId::new("nope"),
        );

        assert!(matches!(result, Err(NavigationError::UnknownItem { .. })));
    }
}

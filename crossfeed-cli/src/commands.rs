//! CLI command implementations

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use crossfeed_core::adjacency::resolve_neighbors;
use crossfeed_core::catalog::{CatalogIndex, ContentId};
use crossfeed_core::config::CrossfeedConfig;
use crossfeed_core::input::{InputAction, Key, decode_key};
use crossfeed_core::media::{SimulatedBackend, SimulatedBackendConfig};
use crossfeed_core::navigation::{
    InputOutcome, NavigatorEvent, NavigatorHandle, spawn_navigator_subscribed,
};
use crossfeed_core::{CrossfeedError, Direction, Result};
use tokio::sync::broadcast;
use tokio::time::timeout;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Load and validate a catalog file
    Validate {
        /// Path to the catalog JSON file
        catalog: PathBuf,
    },
    /// Print the four neighbors of an item
    Neighbors {
        /// Path to the catalog JSON file
        catalog: PathBuf,
        /// Item id
        id: String,
    },
    /// Drive a simulated viewing session from a list of inputs
    Simulate {
        /// Path to the catalog JSON file
        catalog: PathBuf,
        /// Item the session starts on
        #[arg(long)]
        start: String,
        /// Comma separated inputs: directions or key names (space, m, i, w, ?, escape)
        #[arg(long, value_delimiter = ',')]
        inputs: Vec<String>,
        /// Simulated media load latency in milliseconds
        #[arg(long, default_value = "120")]
        latency_ms: u64,
        /// Media URL that should fail to load (repeatable)
        #[arg(long)]
        fail_source: Vec<String>,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Validate { catalog } => validate_catalog(&catalog).await,
        Commands::Neighbors { catalog, id } => show_neighbors(&catalog, id).await,
        Commands::Simulate {
            catalog,
            start,
            inputs,
            latency_ms,
            fail_source,
        } => {
            run_simulation(
                &catalog,
                start,
                &inputs,
                Duration::from_millis(latency_ms),
                &fail_source,
            )
            .await
        }
    }
}

/// Load a catalog and print a summary of its structure
///
/// # Errors
/// - `CrossfeedError::Catalog` - File missing, malformed or violating catalog invariants
pub async fn validate_catalog(path: &Path) -> Result<()> {
    let catalog = CatalogIndex::load(path).await?;

    println!("Catalog OK: {}", path.display());
    println!("{:-<60}", "");
    println!("Items: {}", catalog.len());

    let mut series_ids = catalog.series_ids();
    series_ids.sort();
    println!("Series: {}", series_ids.len());
    for series in series_ids {
        println!(
            "  {:<30} {} episodes",
            series.as_str(),
            catalog.items_in_series(series).count()
        );
    }

    let alternates = catalog
        .items()
        .iter()
        .filter(|item| item.alternate_version_ids.is_some())
        .count();
    let standalone = catalog
        .items()
        .iter()
        .filter(|item| item.series_id.is_none() && item.alternate_version_ids.is_none())
        .count();
    println!("Items with alternate versions: {alternates}");
    println!("Standalone items: {standalone}");

    Ok(())
}

/// Print what lies in each direction from one item
///
/// # Errors
/// - `CrossfeedError::Catalog` - Catalog invalid or item not found
pub async fn show_neighbors(path: &Path, id: String) -> Result<()> {
    let catalog = CatalogIndex::load(path).await?;
    let item = catalog.find_by_id(&ContentId::new(id))?;
    let neighbors = resolve_neighbors(item, &catalog);

    println!("Neighbors of {} ({})", item.id, item.title);
    println!("{:-<60}", "");
    for direction in Direction::ALL {
        match neighbors.get(direction) {
            Some(neighbor) => println!("  {:<6} {neighbor}", direction.to_string()),
            None => println!("  {:<6} -", direction.to_string()),
        }
    }

    Ok(())
}

/// Run a scripted session against the simulated media backend
///
/// # Errors
/// - `CrossfeedError::Catalog` - Catalog invalid
/// - `CrossfeedError::Navigation` - Unknown start item or session ended early
/// - `CrossfeedError::Configuration` - An input could not be parsed
pub async fn run_simulation(
    path: &Path,
    start: String,
    inputs: &[String],
    latency: Duration,
    fail_sources: &[String],
) -> Result<()> {
    let actions = inputs
        .iter()
        .map(|input| parse_input(input))
        .collect::<Result<Vec<_>>>()?;

    let catalog = CatalogIndex::load(path).await?;
    let mut config = CrossfeedConfig::from_env();
    config.simulation.load_latency = latency;

    let backend = Arc::new(SimulatedBackend::new(SimulatedBackendConfig {
        load_latency: config.simulation.load_latency,
        failure_rate: config.simulation.failure_rate,
        seed: config.simulation.seed,
    }));
    for source in fail_sources {
        backend.fail_source(source);
    }

    let settle_budget = config.navigation.settle_delay + latency * 4;
    let (handle, mut events) = spawn_navigator_subscribed(
        config,
        Arc::new(catalog),
        backend,
        ContentId::new(start),
    )?;

    println!("Simulated session");
    println!("{:-<60}", "");
    settle(&mut events, latency * 3).await;

    for action in actions {
        let outcome = handle.dispatch(action).await?;
        println!("> {action}: {}", describe_outcome(&outcome));

        if let InputOutcome::TransitionStarted { target, .. } = &outcome {
            wait_for_item(&mut events, target, settle_budget).await?;
        }
        settle(&mut events, latency * 3).await;
    }

    print_summary(&handle).await
}

fn parse_input(input: &str) -> Result<InputAction> {
    if let Ok(direction) = input.parse::<Direction>() {
        return Ok(InputAction::Navigate(direction));
    }

    Key::parse(input)
        .and_then(decode_key)
        .ok_or_else(|| CrossfeedError::Configuration {
            reason: format!("unrecognized input '{input}'"),
        })
}

/// Prints events until the session shows `target`.
async fn wait_for_item(
    events: &mut broadcast::Receiver<NavigatorEvent>,
    target: &ContentId,
    budget: Duration,
) -> Result<()> {
    let waited = timeout(budget, async {
        loop {
            match events.recv().await {
                Ok(event) => {
                    print_event(&event);
                    if matches!(&event, NavigatorEvent::ItemChanged { id, .. } if id == target) {
                        return Ok(());
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Skipped {} session events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(crossfeed_core::NavigationError::EngineShutdown);
                }
            }
        }
    })
    .await;

    match waited {
        Ok(result) => Ok(result?),
        Err(_) => {
            tracing::warn!("Transition to {} did not settle within {:?}", target, budget);
            Ok(())
        }
    }
}

/// Prints whatever events arrive within `window`.
async fn settle(events: &mut broadcast::Receiver<NavigatorEvent>, window: Duration) {
    let _ = timeout(window, async {
        while let Ok(event) = events.recv().await {
            print_event(&event);
        }
    })
    .await;
}

async fn print_summary(handle: &NavigatorHandle) -> Result<()> {
    let snapshot = handle.snapshot().await?;
    let stats = handle.cache_statistics().await?;

    println!("{:-<60}", "");
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::warn!("Could not render snapshot: {}", e),
    }
    println!(
        "Cache: {}/{} entries, {} hits, {} misses, {} evictions ({:.0}% hit rate)",
        stats.entries,
        stats.capacity,
        stats.hit_count,
        stats.miss_count,
        stats.eviction_count,
        stats.hit_rate * 100.0
    );

    handle.shutdown().await?;
    Ok(())
}

fn describe_outcome(outcome: &InputOutcome) -> String {
    match outcome {
        InputOutcome::Ignored { reason } => format!("ignored ({reason:?})"),
        InputOutcome::OverlayOpened { overlay } => format!("opened {overlay}"),
        InputOutcome::OverlayClosed { overlay } => format!("closed {overlay}"),
        InputOutcome::TransitionStarted { direction, target } => {
            format!("moving {direction} to {target}")
        }
        InputOutcome::PlaybackToggled { state } => format!("playback {state:?}"),
        InputOutcome::MuteToggled { muted } => {
            if *muted {
                "muted".to_string()
            } else {
                "unmuted".to_string()
            }
        }
    }
}

fn print_event(event: &NavigatorEvent) {
    match event {
        NavigatorEvent::TransitionStarted { direction, target } => {
            println!("  transition {direction} -> {target}");
        }
        NavigatorEvent::ItemChanged { id, .. } => println!("  now showing {id}"),
        NavigatorEvent::OverlayOpened { overlay, item_id } => {
            println!("  {overlay} overlay opened on {item_id}");
        }
        NavigatorEvent::OverlayClosed { overlay, item_id } => {
            println!("  {overlay} overlay closed on {item_id}");
        }
        NavigatorEvent::PlaybackStarted {
            ticket,
            using_fallback,
        } => {
            let source = if *using_fallback { " (fallback)" } else { "" };
            println!(
                "  playing {} generation {}{source}",
                ticket.id, ticket.generation
            );
        }
        NavigatorEvent::PlaybackCompleted { id } => println!("  completed {id}"),
        NavigatorEvent::PlaybackFailed { id, reason } => println!("  failed {id}: {reason}"),
        NavigatorEvent::MuteChanged { muted } => println!("  muted={muted}"),
        NavigatorEvent::PlayStateChanged { state } => println!("  play state {state:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossfeed_core::navigation::Overlay;

    #[test]
    fn test_parse_input() {
        assert_eq!(
            parse_input("up").unwrap(),
            InputAction::Navigate(Direction::Up)
        );
        assert_eq!(parse_input("space").unwrap(), InputAction::TogglePlay);
        assert_eq!(
            parse_input("i").unwrap(),
            InputAction::ToggleOverlay(Overlay::Info)
        );
        assert_eq!(parse_input("escape").unwrap(), InputAction::CloseOverlay);
        assert!(parse_input("jump").is_err());
    }
}

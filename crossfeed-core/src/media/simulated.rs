//! Deterministic in-process media backend.
//!
//! Stands in for a platform video element in tests and in the CLI's
//! simulated sessions. Load latency, failing sources and a seeded random
//! failure rate are configurable; every element operation is appended to a
//! shared journal so tests can assert on what the engine actually did.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{MediaBackend, MediaElement, MediaError};
use crate::catalog::ContentId;

/// Simulation parameters for `SimulatedBackend`.
#[derive(Debug, Clone)]
pub struct SimulatedBackendConfig {
    /// Time each `load` takes before resolving
    pub load_latency: Duration,
    /// Probability (0.0 to 1.0) that a freshly created element fails to load
    pub failure_rate: f64,
    /// Seed for the failure-rate generator
    pub seed: u64,
}

impl SimulatedBackendConfig {
    /// Zero latency, no random failures.
    pub fn instant() -> Self {
        Self {
            load_latency: Duration::ZERO,
            failure_rate: 0.0,
            seed: 42,
        }
    }
}

impl Default for SimulatedBackendConfig {
    fn default() -> Self {
        Self {
            load_latency: Duration::from_millis(120),
            failure_rate: 0.0,
            seed: 42,
        }
    }
}

/// Operation recorded by a simulated element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementEvent {
    Created { id: ContentId, source_url: String },
    Loaded { source_url: String },
    LoadFailed { source_url: String },
    Played { source_url: String },
    Paused { source_url: String },
    Muted { source_url: String, muted: bool },
    Released { source_url: String },
}

impl ElementEvent {
    pub fn source_url(&self) -> &str {
        match self {
            ElementEvent::Created { source_url, .. }
            | ElementEvent::Loaded { source_url }
            | ElementEvent::LoadFailed { source_url }
            | ElementEvent::Played { source_url }
            | ElementEvent::Paused { source_url }
            | ElementEvent::Muted { source_url, .. }
            | ElementEvent::Released { source_url } => source_url,
        }
    }
}

type Journal = Arc<Mutex<Vec<ElementEvent>>>;

/// Media backend producing simulated elements.
#[derive(Debug)]
pub struct SimulatedBackend {
    config: SimulatedBackendConfig,
    rng: Mutex<ChaCha8Rng>,
    failing_sources: Mutex<HashSet<String>>,
    rejecting_sources: Mutex<HashSet<String>>,
    journal: Journal,
}

impl SimulatedBackend {
    pub fn new(config: SimulatedBackendConfig) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(config.seed)),
            config,
            failing_sources: Mutex::new(HashSet::new()),
            rejecting_sources: Mutex::new(HashSet::new()),
            journal: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Makes every element created for `source_url` from now on fail to load.
    pub fn fail_source(&self, source_url: &str) {
        self.failing_sources.lock().insert(source_url.to_string());
    }

    /// Makes `play` on elements for `source_url` return `PlaybackRejected`.
    pub fn reject_play(&self, source_url: &str) {
        self.rejecting_sources.lock().insert(source_url.to_string());
    }

    /// Snapshot of every recorded element operation, in order.
    pub fn events(&self) -> Vec<ElementEvent> {
        self.journal.lock().clone()
    }

    /// Recorded operations for elements bound to `source_url`.
    pub fn events_for(&self, source_url: &str) -> Vec<ElementEvent> {
        self.journal
            .lock()
            .iter()
            .filter(|event| event.source_url() == source_url)
            .cloned()
            .collect()
    }

    /// Number of elements created for `source_url`.
    pub fn created_count(&self, source_url: &str) -> usize {
        self.journal
            .lock()
            .iter()
            .filter(|event| {
                matches!(event, ElementEvent::Created { .. }) && event.source_url() == source_url
            })
            .count()
    }

    fn should_fail(&self, source_url: &str) -> bool {
        if self.failing_sources.lock().contains(source_url) {
            return true;
        }
        let rate = self.config.failure_rate.clamp(0.0, 1.0);
        rate > 0.0 && self.rng.lock().random_bool(rate)
    }
}

impl MediaBackend for SimulatedBackend {
    fn create_element(&self, id: &ContentId, source_url: &str) -> Arc<dyn MediaElement> {
        self.journal.lock().push(ElementEvent::Created {
            id: id.clone(),
            source_url: source_url.to_string(),
        });

        Arc::new(SimulatedElement {
            source_url: source_url.to_string(),
            load_latency: self.config.load_latency,
            fails_to_load: self.should_fail(source_url),
            rejects_play: self.rejecting_sources.lock().contains(source_url),
            released: AtomicBool::new(false),
            journal: Arc::clone(&self.journal),
        })
    }
}

#[derive(Debug)]
struct SimulatedElement {
    source_url: String,
    load_latency: Duration,
    fails_to_load: bool,
    rejects_play: bool,
    released: AtomicBool,
    journal: Journal,
}

impl SimulatedElement {
    fn record(&self, event: ElementEvent) {
        self.journal.lock().push(event);
    }

    fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

#[async_trait]
impl MediaElement for SimulatedElement {
    fn source_url(&self) -> &str {
        &self.source_url
    }

    async fn load(&self) -> Result<(), MediaError> {
        tokio::time::sleep(self.load_latency).await;

        if self.is_released() {
            return Err(MediaError::Released);
        }

        if self.fails_to_load {
            self.record(ElementEvent::LoadFailed {
                source_url: self.source_url.clone(),
            });
            return Err(MediaError::LoadFailed {
                source_url: self.source_url.clone(),
                reason: "simulated network failure".to_string(),
            });
        }

        self.record(ElementEvent::Loaded {
            source_url: self.source_url.clone(),
        });
        Ok(())
    }

    async fn play(&self) -> Result<(), MediaError> {
        if self.is_released() {
            return Err(MediaError::Released);
        }
        if self.rejects_play {
            return Err(MediaError::PlaybackRejected {
                reason: "simulated autoplay restriction".to_string(),
            });
        }

        self.record(ElementEvent::Played {
            source_url: self.source_url.clone(),
        });
        Ok(())
    }

    fn pause(&self) {
        if !self.is_released() {
            self.record(ElementEvent::Paused {
                source_url: self.source_url.clone(),
            });
        }
    }

    fn set_muted(&self, muted: bool) {
        if !self.is_released() {
            self.record(ElementEvent::Muted {
                source_url: self.source_url.clone(),
                muted,
            });
        }
    }

    fn release(&self) {
        if !self.released.swap(true, Ordering::AcqRel) {
            self.record(ElementEvent::Released {
                source_url: self.source_url.clone(),
            });
        }
    }
}

//! Centralized configuration for Crossfeed.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::time::Duration;

/// Central configuration for all Crossfeed components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct CrossfeedConfig {
    pub cache: CacheConfig,
    pub navigation: NavigationConfig,
    pub gesture: GestureConfig,
    pub playback: PlaybackConfig,
    pub simulation: SimulationConfig,
}

/// Media preload cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached media handles
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 10 }
    }
}

/// Navigation state machine timing.
#[derive(Debug, Clone)]
pub struct NavigationConfig {
    /// Delay between choosing a direction and swapping the current item,
    /// covering the exit animation
    pub settle_delay: Duration,
    /// Capacity of the navigator's command channel
    pub command_buffer: usize,
    /// Capacity of the outbound event broadcast channel
    pub event_buffer: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(300),
            command_buffer: 100,
            event_buffer: 256,
        }
    }
}

/// Swipe gesture recognition thresholds.
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Minimum travel along the dominant axis, in pixels
    pub min_distance_px: f32,
    /// Maximum time between touch start and touch end
    pub max_duration: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_distance_px: 25.0,
            max_duration: Duration::from_millis(800),
        }
    }
}

/// Playback controller behavior.
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Fraction of the duration after which an item counts as completed
    pub completion_threshold: f64,
    /// Source played when an item's own media fails to load
    pub fallback_media_url: String,
    /// Whether sessions start muted (autoplay policies usually require it)
    pub start_muted: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            completion_threshold: 0.9,
            fallback_media_url: "https://cdn.crossfeed.invalid/media/fallback.mp4".to_string(),
            start_muted: true,
        }
    }
}

/// Simulated media backend configuration for testing and development.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Simulated load latency per element
    pub load_latency: Duration,
    /// Probability (0.0 to 1.0) that an element fails to load
    pub failure_rate: f64,
    /// Deterministic seed for reproducible failures
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            load_latency: Duration::from_millis(120),
            failure_rate: 0.0,
            seed: 42,
        }
    }
}

impl SimulationConfig {
    /// Creates a configuration for deterministic testing.
    pub fn deterministic_testing() -> Self {
        Self {
            load_latency: Duration::ZERO, // No latency for fast tests
            failure_rate: 0.0,
            seed: 42,
        }
    }
}

impl CrossfeedConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(capacity) = std::env::var("CROSSFEED_CACHE_CAPACITY")
            && let Ok(count) = capacity.parse::<usize>()
        {
            config.cache.capacity = count;
        }

        if let Ok(delay) = std::env::var("CROSSFEED_SETTLE_DELAY_MS")
            && let Ok(millis) = delay.parse::<u64>()
        {
            config.navigation.settle_delay = Duration::from_millis(millis);
        }

        if let Ok(distance) = std::env::var("CROSSFEED_SWIPE_MIN_DISTANCE_PX")
            && let Ok(pixels) = distance.parse::<f32>()
        {
            config.gesture.min_distance_px = pixels;
        }

        if let Ok(duration) = std::env::var("CROSSFEED_SWIPE_MAX_DURATION_MS")
            && let Ok(millis) = duration.parse::<u64>()
        {
            config.gesture.max_duration = Duration::from_millis(millis);
        }

        if let Ok(url) = std::env::var("CROSSFEED_FALLBACK_MEDIA_URL")
            && !url.trim().is_empty()
        {
            config.playback.fallback_media_url = url;
        }

        if let Ok(muted) = std::env::var("CROSSFEED_START_MUTED") {
            config.playback.start_muted = muted.parse().unwrap_or(true);
        }

        if let Ok(seed) = std::env::var("CROSSFEED_SIMULATION_SEED")
            && let Ok(seed_value) = seed.parse::<u64>()
        {
            config.simulation.seed = seed_value;
        }

        config
    }

    /// Creates a configuration optimized for testing.
    pub fn for_testing() -> Self {
        Self {
            navigation: NavigationConfig {
                settle_delay: Duration::from_millis(50),
                ..Default::default()
            },
            simulation: SimulationConfig::deterministic_testing(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = CrossfeedConfig::default();

        assert_eq!(config.cache.capacity, 10);
        assert_eq!(config.navigation.settle_delay, Duration::from_millis(300));
        assert_eq!(config.gesture.min_distance_px, 25.0);
        assert_eq!(config.gesture.max_duration, Duration::from_millis(800));
        assert_eq!(config.playback.completion_threshold, 0.9);
        assert!(config.playback.start_muted);
        assert_eq!(config.simulation.failure_rate, 0.0);
    }

    #[test]
    fn test_config_presets() {
        let testing_config = CrossfeedConfig::for_testing();
        assert_eq!(testing_config.simulation.load_latency, Duration::ZERO);
        assert_eq!(
            testing_config.navigation.settle_delay,
            Duration::from_millis(50)
        );
        assert_eq!(testing_config.cache.capacity, 10);
    }

    #[test]
    fn test_env_override() {
        unsafe {
            std::env::set_var("CROSSFEED_CACHE_CAPACITY", "4");
            std::env::set_var("CROSSFEED_SETTLE_DELAY_MS", "120");
            std::env::set_var("CROSSFEED_SWIPE_MIN_DISTANCE_PX", "40");
            std::env::set_var("CROSSFEED_SWIPE_MAX_DURATION_MS", "500");
            std::env::set_var("CROSSFEED_FALLBACK_MEDIA_URL", "https://example.com/f.mp4");
            std::env::set_var("CROSSFEED_START_MUTED", "false");
            std::env::set_var("CROSSFEED_SIMULATION_SEED", "12345");
        }

        let config = CrossfeedConfig::from_env();

        assert_eq!(config.cache.capacity, 4);
        assert_eq!(config.navigation.settle_delay, Duration::from_millis(120));
        assert_eq!(config.gesture.min_distance_px, 40.0);
        assert_eq!(config.gesture.max_duration, Duration::from_millis(500));
        assert_eq!(
            config.playback.fallback_media_url,
            "https://example.com/f.mp4"
        );
        assert!(!config.playback.start_muted);
        assert_eq!(config.simulation.seed, 12345);

        // Cleanup
        unsafe {
            std::env::remove_var("CROSSFEED_CACHE_CAPACITY");
            std::env::remove_var("CROSSFEED_SETTLE_DELAY_MS");
            std::env::remove_var("CROSSFEED_SWIPE_MIN_DISTANCE_PX");
            std::env::remove_var("CROSSFEED_SWIPE_MAX_DURATION_MS");
            std::env::remove_var("CROSSFEED_FALLBACK_MEDIA_URL");
            std::env::remove_var("CROSSFEED_START_MUTED");
            std::env::remove_var("CROSSFEED_SIMULATION_SEED");
        }
    }
}

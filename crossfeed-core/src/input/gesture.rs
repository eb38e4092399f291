//! Swipe recognition for touch input.
//!
//! Coordinates are screen pixels with `y` growing downward. A finger moving
//! up the screen asks for the next episode (`Up`); a finger moving left asks
//! for the `Left` neighbor.

use std::time::Instant;

use crate::adjacency::Direction;
use crate::config::GestureConfig;

/// Position of a touch in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub x: f32,
    pub y: f32,
}

impl TouchPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy)]
struct TouchStart {
    point: TouchPoint,
    at: Instant,
}

/// Turns a touch start/end pair into at most one direction.
#[derive(Debug, Clone)]
pub struct SwipeDecoder {
    config: GestureConfig,
    start: Option<TouchStart>,
}

impl SwipeDecoder {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            start: None,
        }
    }

    /// Records the start of a touch. A second `begin` restarts the gesture.
    pub fn begin(&mut self, point: TouchPoint, at: Instant) {
        self.start = Some(TouchStart { point, at });
    }

    /// Completes the gesture started by `begin`.
    ///
    /// Returns `None` when no gesture is in progress, when the travel along
    /// the dominant axis is shorter than the minimum distance, or when the
    /// touch lasted longer than the maximum duration.
    pub fn end(&mut self, point: TouchPoint, at: Instant) -> Option<Direction> {
        let start = self.start.take()?;

        let elapsed = at.saturating_duration_since(start.at);
        if elapsed > self.config.max_duration {
            tracing::trace!("Swipe rejected: took {:?}", elapsed);
            return None;
        }

        let dx = point.x - start.point.x;
        let dy = point.y - start.point.y;
        let horizontal = dx.abs() > dy.abs();
        let travel = if horizontal { dx.abs() } else { dy.abs() };
        if travel < self.config.min_distance_px {
            tracing::trace!("Swipe rejected: travelled {}px", travel);
            return None;
        }

        let direction = match (horizontal, dx < 0.0, dy < 0.0) {
            (true, true, _) => Direction::Left,
            (true, false, _) => Direction::Right,
            (false, _, true) => Direction::Up,
            (false, _, false) => Direction::Down,
        };
        Some(direction)
    }

    /// Abandons the gesture in progress (touch cancelled by the platform).
    pub fn cancel(&mut self) {
        self.start = None;
    }

    pub fn is_tracking(&self) -> bool {
        self.start.is_some()
    }
}

impl Default for SwipeDecoder {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

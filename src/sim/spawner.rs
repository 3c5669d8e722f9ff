//! Time-based obstacle spawning
//!
//! Cadence follows the simulation clock, not the frame count, so the spawn
//! rate does not depend on how fast frames are drawn.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::Obstacle;
use crate::tuning::Tuning;

/// Tracks when the last obstacle pair went out
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObstacleSpawner {
    last_spawn_ms: f64,
}

impl ObstacleSpawner {
    /// Restart the cadence from `now_ms` (the first pair arrives one interval later)
    pub fn reset(&mut self, now_ms: f64) {
        self.last_spawn_ms = now_ms;
    }

    /// True once at least `interval_ms` has elapsed since the last spawn
    pub fn is_due(&self, now_ms: f64, interval_ms: f32) -> bool {
        now_ms - self.last_spawn_ms >= interval_ms as f64
    }

    /// Check the cadence and, when due, mark a spawn at `now_ms`
    pub fn poll(&mut self, now_ms: f64, interval_ms: f32) -> bool {
        if self.is_due(now_ms, interval_ms) {
            self.last_spawn_ms = now_ms;
            true
        } else {
            false
        }
    }
}

/// Inclusive range of allowed gap centers
pub fn gap_center_range(tuning: &Tuning) -> (f32, f32) {
    let half_gap = tuning.gap_size / 2.0;
    let min = tuning.min_gap_margin + half_gap;
    let max = (tuning.field_height - tuning.min_gap_margin - half_gap).max(min);
    (min, max)
}

/// Build a new obstacle pair at the right edge with a random gap position
pub fn spawn_pair<R: Rng>(rng: &mut R, id: u32, tuning: &Tuning) -> Obstacle {
    let (min, max) = gap_center_range(tuning);
    let gap_center = if max > min {
        rng.random_range(min..=max)
    } else {
        min
    };

    Obstacle {
        id,
        x: tuning.obstacle_spawn_x,
        gap_center,
        gap: tuning.gap_size,
        width: tuning.obstacle_width,
        height: tuning.obstacle_height,
        passed: false,
    }
}

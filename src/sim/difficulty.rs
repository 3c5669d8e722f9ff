//! Difficulty as a pure function of score

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Speed and cadence derived from the current score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// `floor(score / speed_increase_interval)`
    pub level: u32,
    pub speed_multiplier: f32,
    /// Horizontal obstacle speed per step (negative = leftward)
    pub scroll_speed: f32,
    /// Time between obstacle spawns
    pub spawn_interval_ms: f32,
}

impl Difficulty {
    /// Compute difficulty for a score. Holds no state; same score, same result.
    pub fn for_score(score: f32, tuning: &Tuning) -> Self {
        let level = (score.max(0.0) / tuning.speed_increase_interval).floor() as u32;
        let speed_multiplier = 1.0 + level as f32 * tuning.speed_increment;

        // Speeds are negative, so `max` against the more negative cap bounds the magnitude
        let scroll_speed = tuning
            .max_scroll_speed
            .max(tuning.base_scroll_speed * speed_multiplier);
        let spawn_interval_ms = tuning
            .min_spawn_interval_ms
            .max(tuning.base_spawn_interval_ms / speed_multiplier);

        Self {
            level,
            speed_multiplier,
            scroll_speed,
            spawn_interval_ms,
        }
    }

    /// Level-0 values
    pub fn base(tuning: &Tuning) -> Self {
        Self::for_score(0.0, tuning)
    }
}

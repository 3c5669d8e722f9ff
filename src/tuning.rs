//! Data-driven game balance
//!
//! Every gameplay constant lives in [`crate::consts`]; `Tuning` carries a
//! runtime copy so a level designer can override values from JSON without a
//! rebuild. The simulation only ever reads from a `Tuning`.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Invalid tuning values
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TuningError {
    #[error("{0} must be positive, got {1}")]
    NotPositive(&'static str, f32),

    #[error("{0} must not be negative, got {1}")]
    Negative(&'static str, f32),

    #[error("impulse velocity must point up (negative), got {0}")]
    ImpulseNotUpward(f32),

    #[error("fallback gravity factor must be in [0, 1], got {0}")]
    FallbackGravityOutOfRange(f32),

    #[error("tracked start deadband must be in [0, 0.5), got {0}")]
    DeadbandOutOfRange(f32),

    #[error("smoothing factor must be in (0, 1], got {0}")]
    SmoothingOutOfRange(f32),

    #[error("gap of {gap} with margin {margin} does not fit a field of height {field}")]
    GapDoesNotFit { gap: f32, margin: f32, field: f32 },

    #[error("minimum spawn interval {min} exceeds base interval {base}")]
    SpawnIntervalInverted { min: f32, base: f32 },

    #[error("speed cap {cap} is weaker than base speed {base} (both must be leftward)")]
    SpeedCapInverted { cap: f32, base: f32 },

    #[error("malformed tuning JSON: {0}")]
    Json(String),
}

/// Runtime game balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub field_width: f32,
    pub field_height: f32,

    pub entity_width: f32,
    pub entity_height: f32,
    pub entity_x: f32,
    pub entity_start_y: f32,

    pub gravity: f32,
    pub impulse_velocity: f32,
    pub fallback_gravity_factor: f32,

    pub base_scroll_speed: f32,
    pub max_scroll_speed: f32,
    pub base_spawn_interval_ms: f32,
    pub min_spawn_interval_ms: f32,
    pub speed_increase_interval: f32,
    pub speed_increment: f32,

    pub obstacle_width: f32,
    pub obstacle_height: f32,
    pub obstacle_spawn_x: f32,
    pub prune_margin: f32,
    pub gap_size: f32,
    pub min_gap_margin: f32,

    pub smoothing_factor: f32,
    pub tracked_start_deadband: f32,

    pub score_unit: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,

            entity_width: ENTITY_WIDTH,
            entity_height: ENTITY_HEIGHT,
            entity_x: ENTITY_X,
            entity_start_y: ENTITY_START_Y,

            gravity: GRAVITY,
            impulse_velocity: IMPULSE_VELOCITY,
            fallback_gravity_factor: FALLBACK_GRAVITY_FACTOR,

            base_scroll_speed: BASE_SCROLL_SPEED,
            max_scroll_speed: MAX_SCROLL_SPEED,
            base_spawn_interval_ms: BASE_SPAWN_INTERVAL_MS,
            min_spawn_interval_ms: MIN_SPAWN_INTERVAL_MS,
            speed_increase_interval: SPEED_INCREASE_INTERVAL,
            speed_increment: SPEED_INCREMENT,

            obstacle_width: OBSTACLE_WIDTH,
            obstacle_height: OBSTACLE_HEIGHT,
            obstacle_spawn_x: OBSTACLE_SPAWN_X,
            prune_margin: PRUNE_MARGIN,
            gap_size: GAP_SIZE,
            min_gap_margin: MIN_GAP_MARGIN,

            smoothing_factor: SMOOTHING_FACTOR,
            tracked_start_deadband: TRACKED_START_DEADBAND,

            score_unit: SCORE_UNIT,
        }
    }
}

impl Tuning {
    /// Parse and validate a tuning override. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning =
            serde_json::from_str(json).map_err(|e| TuningError::Json(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check that the values describe a playable game
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("field_width", self.field_width),
            ("field_height", self.field_height),
            ("entity_width", self.entity_width),
            ("entity_height", self.entity_height),
            ("obstacle_width", self.obstacle_width),
            ("obstacle_height", self.obstacle_height),
            ("gap_size", self.gap_size),
            ("base_spawn_interval_ms", self.base_spawn_interval_ms),
            ("min_spawn_interval_ms", self.min_spawn_interval_ms),
            ("speed_increase_interval", self.speed_increase_interval),
            ("score_unit", self.score_unit),
            ("gravity", self.gravity),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::NotPositive(name, value));
            }
        }

        // A negative increment would slow the scroll and eventually reverse it
        let non_negative = [
            ("speed_increment", self.speed_increment),
            ("prune_margin", self.prune_margin),
            ("min_gap_margin", self.min_gap_margin),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(TuningError::Negative(name, value));
            }
        }

        if !(self.impulse_velocity < 0.0) {
            return Err(TuningError::ImpulseNotUpward(self.impulse_velocity));
        }

        if !(0.0..=1.0).contains(&self.fallback_gravity_factor) {
            return Err(TuningError::FallbackGravityOutOfRange(
                self.fallback_gravity_factor,
            ));
        }

        if !(0.0..0.5).contains(&self.tracked_start_deadband) {
            return Err(TuningError::DeadbandOutOfRange(self.tracked_start_deadband));
        }

        if !(self.smoothing_factor > 0.0 && self.smoothing_factor <= 1.0) {
            return Err(TuningError::SmoothingOutOfRange(self.smoothing_factor));
        }

        if self.gap_size + 2.0 * self.min_gap_margin > self.field_height {
            return Err(TuningError::GapDoesNotFit {
                gap: self.gap_size,
                margin: self.min_gap_margin,
                field: self.field_height,
            });
        }

        if self.min_spawn_interval_ms > self.base_spawn_interval_ms {
            return Err(TuningError::SpawnIntervalInverted {
                min: self.min_spawn_interval_ms,
                base: self.base_spawn_interval_ms,
            });
        }

        if self.base_scroll_speed >= 0.0 || self.max_scroll_speed > self.base_scroll_speed {
            return Err(TuningError::SpeedCapInverted {
                cap: self.max_scroll_speed,
                base: self.base_scroll_speed,
            });
        }

        Ok(())
    }

    /// Vertical travel available to the entity (field height minus entity height)
    pub fn tracked_y_range(&self) -> f32 {
        (self.field_height - self.entity_height).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(Tuning::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "smoothing_factor": 0.5 }"#).unwrap();
        assert!((tuning.smoothing_factor - 0.5).abs() < f32::EPSILON);
        assert!((tuning.gravity - GRAVITY).abs() < f32::EPSILON);
        assert!((tuning.field_height - FIELD_HEIGHT).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rejects_bad_smoothing() {
        let tuning = Tuning {
            smoothing_factor: 0.0,
            ..Default::default()
        };
        assert_eq!(
            tuning.validate(),
            Err(TuningError::SmoothingOutOfRange(0.0))
        );
    }

    #[test]
    fn test_rejects_gap_that_does_not_fit() {
        let tuning = Tuning {
            gap_size: 600.0,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::GapDoesNotFit { .. })
        ));
    }

    #[test]
    fn test_rejects_inverted_speed_cap() {
        let tuning = Tuning {
            max_scroll_speed: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::SpeedCapInverted { .. })
        ));
    }

    #[test]
    fn test_rejects_negative_speed_increment() {
        let tuning = Tuning {
            speed_increment: -0.5,
            ..Default::default()
        };
        assert_eq!(
            tuning.validate(),
            Err(TuningError::Negative("speed_increment", -0.5))
        );
        // Would otherwise load from a stored override
        assert!(Tuning::from_json(r#"{ "speed_increment": -0.5 }"#).is_err());
    }

    #[test]
    fn test_rejects_wrong_way_physics() {
        let up_gravity = Tuning {
            gravity: -0.4,
            ..Default::default()
        };
        assert_eq!(
            up_gravity.validate(),
            Err(TuningError::NotPositive("gravity", -0.4))
        );

        let down_flap = Tuning {
            impulse_velocity: 6.0,
            ..Default::default()
        };
        assert_eq!(
            down_flap.validate(),
            Err(TuningError::ImpulseNotUpward(6.0))
        );
    }

    #[test]
    fn test_rejects_out_of_range_factors() {
        let fallback = Tuning {
            fallback_gravity_factor: 1.5,
            ..Default::default()
        };
        assert_eq!(
            fallback.validate(),
            Err(TuningError::FallbackGravityOutOfRange(1.5))
        );

        let deadband = Tuning {
            tracked_start_deadband: 0.5,
            ..Default::default()
        };
        assert_eq!(
            deadband.validate(),
            Err(TuningError::DeadbandOutOfRange(0.5))
        );

        let prune = Tuning {
            prune_margin: -1.0,
            ..Default::default()
        };
        assert_eq!(
            prune.validate(),
            Err(TuningError::Negative("prune_margin", -1.0))
        );
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Json(_))
        ));
    }
}

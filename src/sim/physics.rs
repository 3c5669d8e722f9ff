//! Vertical motion of the entity
//!
//! Exactly one motion model applies per step: gravity with impulses, or a
//! direct position mapping from the tracked signal. Gravity is only used in
//! tracked mode as a gentle fallback while no sample exists yet.

use super::state::Entity;
use crate::tuning::Tuning;

/// Per-step control for the integrator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    /// Gravity plus an optional flap this step
    Impulse { flap: bool },
    /// Smoothed normalized signal in [0, 1], `None` before the first sample
    Tracked { signal: Option<f32> },
}

/// Which motion model was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Full gravity integration
    Gravity,
    /// Tracking enabled but no sample yet: reduced gravity
    FallbackGravity,
    /// Position set from the tracked signal, velocity zeroed
    Direct,
}

/// Advance the entity by one step
pub fn integrate(entity: &mut Entity, control: Control, tuning: &Tuning) -> Motion {
    match control {
        Control::Impulse { flap } => {
            if flap {
                entity.vel_y = tuning.impulse_velocity;
            }
            apply_gravity(entity, tuning.gravity);
            Motion::Gravity
        }
        Control::Tracked {
            signal: Some(signal),
        } => {
            let range = tuning.tracked_y_range();
            entity.pos.y = (signal * range).clamp(0.0, range);
            entity.vel_y = 0.0;
            Motion::Direct
        }
        Control::Tracked { signal: None } => {
            apply_gravity(entity, tuning.gravity * tuning.fallback_gravity_factor);
            Motion::FallbackGravity
        }
    }
}

/// Accelerate downward and move; the top of the field is a hard ceiling, the bottom is not
fn apply_gravity(entity: &mut Entity, gravity: f32) {
    entity.vel_y += gravity;
    entity.pos.y = (entity.pos.y + entity.vel_y).max(0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    fn entity() -> Entity {
        Entity::new(&Tuning::default())
    }

    #[test]
    fn test_gravity_pulls_down() {
        let mut e = entity();
        let motion = integrate(&mut e, Control::Impulse { flap: false }, &Tuning::default());
        assert_eq!(motion, Motion::Gravity);
        assert!((e.vel_y - GRAVITY).abs() < f32::EPSILON);
        assert!((e.pos.y - (ENTITY_START_Y + GRAVITY)).abs() < 0.001);
    }

    #[test]
    fn test_flap_sets_velocity_not_adds() {
        let mut e = entity();
        e.vel_y = 8.0;
        integrate(&mut e, Control::Impulse { flap: true }, &Tuning::default());
        assert!((e.vel_y - (IMPULSE_VELOCITY + GRAVITY)).abs() < 0.001);
        assert!(e.pos.y < ENTITY_START_Y);
    }

    #[test]
    fn test_ceiling_clamp() {
        let mut e = entity();
        e.pos.y = 2.0;
        integrate(&mut e, Control::Impulse { flap: true }, &Tuning::default());
        assert_eq!(e.pos.y, 0.0);
    }

    #[test]
    fn test_no_floor_clamp() {
        let mut e = entity();
        e.pos.y = FIELD_HEIGHT;
        e.vel_y = 5.0;
        integrate(&mut e, Control::Impulse { flap: false }, &Tuning::default());
        assert!(e.pos.y > FIELD_HEIGHT);
    }

    #[test]
    fn test_tracked_maps_position_directly() {
        let tuning = Tuning::default();
        let range = FIELD_HEIGHT - ENTITY_HEIGHT;

        let mut e = entity();
        e.vel_y = 3.0;
        let motion = integrate(&mut e, Control::Tracked { signal: Some(0.5) }, &tuning);
        assert_eq!(motion, Motion::Direct);
        assert!((e.pos.y - range * 0.5).abs() < 0.001);
        assert_eq!(e.vel_y, 0.0);

        integrate(&mut e, Control::Tracked { signal: Some(0.0) }, &tuning);
        assert_eq!(e.pos.y, 0.0);

        integrate(&mut e, Control::Tracked { signal: Some(1.0) }, &tuning);
        assert!((e.pos.y - range).abs() < 0.001);
    }

    #[test]
    fn test_tracked_signal_is_clamped() {
        let tuning = Tuning::default();
        let mut e = entity();
        integrate(&mut e, Control::Tracked { signal: Some(1.7) }, &tuning);
        assert!((e.pos.y - tuning.tracked_y_range()).abs() < 0.001);
        integrate(&mut e, Control::Tracked { signal: Some(-0.3) }, &tuning);
        assert_eq!(e.pos.y, 0.0);
    }

    #[test]
    fn test_tracked_without_sample_drifts_at_half_gravity() {
        let mut e = entity();
        let motion = integrate(&mut e, Control::Tracked { signal: None }, &Tuning::default());
        assert_eq!(motion, Motion::FallbackGravity);
        assert!((e.vel_y - GRAVITY * 0.5).abs() < f32::EPSILON);
        assert!(e.pos.y > ENTITY_START_Y);
    }
}

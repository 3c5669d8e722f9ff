//! Fixed timestep simulation tick
//!
//! One call advances the game by one step:
//! integrate physics -> spawn check and scroll -> collisions and scoring -> prune.

use super::collision::{check_frame, prune_offscreen};
use super::lifecycle::is_start_gesture;
use super::physics::{Control, Motion, integrate};
use super::spawner::spawn_pair;
use super::state::{ControlMode, EndCause, GameEvent, GamePhase, GameState};

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// The discrete user action (click/tap/key) fired since the last tick
    pub trigger: bool,
    /// Latest smoothed tracked signal in [0, 1], if tracking has produced one
    pub signal: Option<f32>,
}

/// Advance the game state by one fixed timestep. Returns the motion model
/// used, or `None` when the entity did not move.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Option<Motion> {
    state.clock_ms += dt as f64 * 1000.0;

    let mut flap = input.trigger && state.trigger();

    if state.phase == GamePhase::Idle && state.mode == ControlMode::Tracked {
        if let Some(signal) = input.signal {
            if is_start_gesture(signal, state.tuning.tracked_start_deadband) {
                state.start_run();
                flap = false;
            }
        }
    }

    // Idle and Ended are frozen
    if state.phase != GamePhase::Running {
        return None;
    }

    state.time_ticks += 1;

    // Physics
    let control = match state.mode {
        ControlMode::Impulse => Control::Impulse { flap },
        ControlMode::Tracked => Control::Tracked {
            signal: input.signal,
        },
    };
    if flap {
        state.events.push(GameEvent::Flap);
    }
    let motion = integrate(&mut state.entity, control, &state.tuning);

    // Spawn on the clock, then scroll everything at the current speed
    if state
        .spawner
        .poll(state.clock_ms, state.difficulty.spawn_interval_ms)
    {
        let id = state.next_obstacle_id();
        let obstacle = spawn_pair(&mut state.rng, id, &state.tuning);
        state.obstacles.push(obstacle);
    }
    let scroll = state.difficulty.scroll_speed;
    for obstacle in &mut state.obstacles {
        obstacle.x += scroll;
    }

    // Collisions and scoring
    let result = check_frame(&state.entity, &mut state.obstacles, &state.tuning);
    state.add_passes(result.passed);
    if result.hit {
        state.end_run(EndCause::Collision);
    } else if result.fell_out {
        state.end_run(EndCause::FellOut);
    }

    prune_offscreen(&mut state.obstacles, &state.tuning);

    Some(motion)
}

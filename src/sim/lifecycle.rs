//! Run lifecycle: Idle -> Running -> Ended -> Idle
//!
//! Transitions are methods on [`GameState`]; the tick decides when to call
//! them. Every entry into Running restarts difficulty from level 0.

use super::difficulty::Difficulty;
use super::state::{ControlMode, EndCause, GameEvent, GamePhase, GameState};

impl GameState {
    /// Idle -> Running. Resets velocity, score, spawn cadence and difficulty.
    pub fn start_run(&mut self) -> bool {
        if self.phase != GamePhase::Idle {
            return false;
        }

        self.entity.vel_y = 0.0;
        self.score = 0.0;
        self.difficulty = Difficulty::base(&self.tuning);
        self.spawner.reset(self.clock_ms);
        self.phase = GamePhase::Running;
        self.events.push(GameEvent::RunStarted);

        log::info!("Run started ({:?} mode, seed {})", self.mode, self.seed);
        true
    }

    /// Running -> Ended. Entity and obstacles freeze where they are.
    pub fn end_run(&mut self, cause: EndCause) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }

        self.phase = GamePhase::Ended;
        self.events.push(GameEvent::RunEnded(cause));

        log::info!(
            "Run ended by {:?} with score {} after {} ticks",
            cause,
            self.display_score(),
            self.time_ticks
        );
        true
    }

    /// Ended -> Idle. Clears obstacles and resets score, entity and difficulty.
    pub fn restart(&mut self) -> bool {
        if self.phase != GamePhase::Ended {
            return false;
        }

        self.obstacles.clear();
        self.score = 0.0;
        self.entity.reset(&self.tuning);
        self.difficulty = Difficulty::base(&self.tuning);
        self.spawner.reset(self.clock_ms);
        self.phase = GamePhase::Idle;
        self.events.push(GameEvent::Reset);
        true
    }

    /// Interpret the single discrete user action for the current phase.
    /// Returns true when the action should also flap the entity this step.
    pub fn trigger(&mut self) -> bool {
        match self.phase {
            GamePhase::Idle => {
                self.start_run();
                self.mode == ControlMode::Impulse
            }
            GamePhase::Running => self.mode == ControlMode::Impulse,
            GamePhase::Ended => {
                self.restart();
                false
            }
        }
    }

    /// Add score for passed pairs, recomputing difficulty when it moves
    pub fn add_passes(&mut self, passed: u32) {
        if passed == 0 {
            return;
        }

        for _ in 0..passed {
            self.score += self.tuning.score_unit;
            self.events.push(GameEvent::ObstaclePassed);
        }

        let previous = self.difficulty.level;
        self.difficulty = Difficulty::for_score(self.score, &self.tuning);
        if self.difficulty.level != previous {
            log::info!(
                "Speed level {}: scroll speed {:.2}, spawn interval {:.0}ms",
                self.difficulty.level,
                self.difficulty.scroll_speed,
                self.difficulty.spawn_interval_ms
            );
            self.events.push(GameEvent::DifficultyChanged {
                level: self.difficulty.level,
            });
        }
    }
}

/// Tracked runs start once the head moves this far from the vertical center
pub fn is_start_gesture(signal: f32, deadband: f32) -> bool {
    (signal - 0.5).abs() > deadband
}

//! Game state and core simulation types
//!
//! One `GameState` aggregate owns everything a run touches. The frame loop
//! hands it to [`super::tick`] by `&mut` and nothing else mutates it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::Difficulty;
use super::geom::Rect;
use super::spawner::ObstacleSpawner;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Entity parked at its start position, waiting for a start trigger
    Idle,
    /// Physics, spawning and collisions active
    Running,
    /// Run over; everything frozen until restart
    Ended,
}

/// How the entity is steered. Chosen once per game, never mixed within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlMode {
    /// Discrete flaps against constant gravity
    #[default]
    Impulse,
    /// Vertical position follows a continuous tracked signal
    Tracked,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCause {
    /// Entity overlapped an obstacle
    Collision,
    /// Entity fell below the bottom of the field
    FellOut,
}

/// Things that happened during a tick, drained by the frame driver (audio, logging)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    RunStarted,
    Flap,
    ObstaclePassed,
    DifficultyChanged { level: u32 },
    RunEnded(EndCause),
    /// Back to the start screen after a run
    Reset,
}

/// The player-controlled entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Top-left corner; x never changes during a run
    pub pos: Vec2,
    /// Vertical velocity (positive = downward), only meaningful in impulse mode
    pub vel_y: f32,
    pub size: Vec2,
}

impl Entity {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(tuning.entity_x, tuning.entity_start_y),
            vel_y: 0.0,
            size: Vec2::new(tuning.entity_width, tuning.entity_height),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    /// Put the entity back at its start position, at rest
    pub fn reset(&mut self, tuning: &Tuning) {
        *self = Self::new(tuning);
    }
}

/// An upper/lower obstacle pair sharing one x position and one gap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Left edge of both rectangles
    pub x: f32,
    /// Vertical midpoint of the opening
    pub gap_center: f32,
    pub gap: f32,
    pub width: f32,
    pub height: f32,
    /// Entity has cleared this pair (scored at most once)
    pub passed: bool,
}

impl Obstacle {
    /// Rectangle hanging down from above, its bottom edge at the top of the gap
    pub fn upper_rect(&self) -> Rect {
        let bottom = self.gap_center - self.gap / 2.0;
        Rect::new(self.x, bottom - self.height, self.width, self.height)
    }

    /// Rectangle rising from below, its top edge at the bottom of the gap
    pub fn lower_rect(&self) -> Rect {
        let top = self.gap_center + self.gap / 2.0;
        Rect::new(self.x, top, self.width, self.height)
    }

    #[inline]
    pub fn right_edge(&self) -> f32 {
        self.x + self.width
    }
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub mode: ControlMode,
    pub phase: GamePhase,
    pub entity: Entity,
    /// Live obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Never decreases within a run
    pub score: f32,
    /// Cached `Difficulty::for_score(score)`
    pub difficulty: Difficulty,
    pub spawner: ObstacleSpawner,
    /// Simulation clock in milliseconds, advanced by every tick
    pub clock_ms: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new game in the Idle phase
    pub fn new(seed: u64, tuning: Tuning, mode: ControlMode) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            entity: Entity::new(&tuning),
            difficulty: Difficulty::for_score(0.0, &tuning),
            tuning,
            mode,
            phase: GamePhase::Idle,
            obstacles: Vec::new(),
            score: 0.0,
            spawner: ObstacleSpawner::default(),
            clock_ms: 0.0,
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new obstacle ID
    pub fn next_obstacle_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Score as shown to the player
    pub fn display_score(&self) -> u32 {
        self.score.floor() as u32
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

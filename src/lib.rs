//! Head Flap - a side-scrolling avoidance game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, game state)
//! - `input`: Control input strategies, smoothing and the tracking loop
//! - `renderer`: Render step and the WebGPU backend
//! - `audio`: Fire-and-forget sound effects
//! - `platform`: Clock and fixed-step frame pacing
//! - `tuning`: Data-driven game balance
//! - `app`: Per-frame driver tying the pieces together

pub mod app;
pub mod audio;
pub mod input;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use app::Game;
pub use settings::{ControlMode, Mapping, Settings};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one step = one frame of the physics model)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta accepted before clamping (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Field dimensions (logical units)
    pub const FIELD_WIDTH: f32 = 360.0;
    pub const FIELD_HEIGHT: f32 = 640.0;

    /// Entity defaults
    pub const ENTITY_WIDTH: f32 = 34.0;
    pub const ENTITY_HEIGHT: f32 = 24.0;
    pub const ENTITY_X: f32 = FIELD_WIDTH / 8.0;
    pub const ENTITY_START_Y: f32 = FIELD_HEIGHT / 2.0;

    /// Downward acceleration per step
    pub const GRAVITY: f32 = 0.4;
    /// Velocity set by a flap (negative = upward)
    pub const IMPULSE_VELOCITY: f32 = -6.0;
    /// Gravity scale while tracking is on but no sample has arrived yet
    pub const FALLBACK_GRAVITY_FACTOR: f32 = 0.5;

    /// Horizontal scroll speed per step (negative = leftward)
    pub const BASE_SCROLL_SPEED: f32 = -2.0;
    /// Most negative scroll speed allowed
    pub const MAX_SCROLL_SPEED: f32 = -5.0;

    /// Spawn cadence (milliseconds)
    pub const BASE_SPAWN_INTERVAL_MS: f32 = 2000.0;
    pub const MIN_SPAWN_INTERVAL_MS: f32 = 800.0;

    /// Score needed per difficulty level
    pub const SPEED_INCREASE_INTERVAL: f32 = 5.0;
    /// Speed multiplier added per level (15%)
    pub const SPEED_INCREMENT: f32 = 0.15;

    /// Obstacle geometry
    pub const OBSTACLE_WIDTH: f32 = 64.0;
    pub const OBSTACLE_HEIGHT: f32 = 512.0;
    pub const OBSTACLE_SPAWN_X: f32 = FIELD_WIDTH;
    /// Obstacles are pruned once `x < -OBSTACLE_WIDTH - PRUNE_MARGIN`
    pub const PRUNE_MARGIN: f32 = 50.0;
    /// Vertical opening between an upper and a lower obstacle
    pub const GAP_SIZE: f32 = FIELD_HEIGHT / 4.0;
    /// Minimum distance from the field edges to the gap
    pub const MIN_GAP_MARGIN: f32 = 80.0;

    /// Exponential moving average factor for tracked input
    pub const SMOOTHING_FACTOR: f32 = 0.3;
    /// Distance from the vertical center (normalized) that starts a tracked run
    pub const TRACKED_START_DEADBAND: f32 = 0.05;
    /// Default gain for relative head mapping
    pub const RELATIVE_SENSITIVITY: f32 = 2.0;

    /// Score added per obstacle pair passed
    pub const SCORE_UNIT: f32 = 0.5;
}

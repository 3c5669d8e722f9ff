//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Obstacles kept in spawn order
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod geom;
pub mod lifecycle;
pub mod physics;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{CollisionResult, check_frame, entity_hits_obstacle, prune_offscreen};
pub use difficulty::Difficulty;
pub use geom::Rect;
pub use physics::{Control, Motion, integrate};
pub use spawner::{ObstacleSpawner, gap_center_range, spawn_pair};
pub use state::{ControlMode, EndCause, Entity, GameEvent, GamePhase, GameState, Obstacle};
pub use tick::{TickInput, tick};

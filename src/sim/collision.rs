//! Collision detection, pass scoring and pruning
//!
//! All tests are order-independent over the obstacle list; only pruning
//! changes its contents.

use super::geom::Rect;
use super::state::{Entity, Obstacle};
use crate::tuning::Tuning;

/// Result of checking one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionResult {
    /// Pairs newly marked passed this frame
    pub passed: u32,
    /// Entity overlapped an obstacle
    pub hit: bool,
    /// Entity dropped below the field
    pub fell_out: bool,
}

impl CollisionResult {
    pub fn is_terminal(&self) -> bool {
        self.hit || self.fell_out
    }
}

/// Strict overlap with either rectangle of the pair
pub fn entity_hits_obstacle(entity: &Rect, obstacle: &Obstacle) -> bool {
    entity.overlaps(&obstacle.upper_rect()) || entity.overlaps(&obstacle.lower_rect())
}

/// Entity's x has moved beyond the pair's trailing edge
pub fn has_cleared(entity: &Entity, obstacle: &Obstacle) -> bool {
    entity.pos.x > obstacle.right_edge()
}

/// Entity position is below the bottom of the field
pub fn fell_out(entity: &Entity, tuning: &Tuning) -> bool {
    entity.pos.y > tuning.field_height
}

/// Mark newly cleared pairs as passed and test every pair for overlap
pub fn check_frame(entity: &Entity, obstacles: &mut [Obstacle], tuning: &Tuning) -> CollisionResult {
    let rect = entity.rect();
    let mut result = CollisionResult {
        fell_out: fell_out(entity, tuning),
        ..Default::default()
    };

    for obstacle in obstacles.iter_mut() {
        if !obstacle.passed && has_cleared(entity, obstacle) {
            obstacle.passed = true;
            result.passed += 1;
        }
        if entity_hits_obstacle(&rect, obstacle) {
            result.hit = true;
        }
    }

    result
}

/// Drop pairs that have scrolled fully past the left edge
pub fn prune_offscreen(obstacles: &mut Vec<Obstacle>, tuning: &Tuning) {
    let limit = -tuning.obstacle_width - tuning.prune_margin;
    obstacles.retain(|o| o.x >= limit);
}

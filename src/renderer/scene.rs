//! Frame composition
//!
//! Turns a [`GameState`] into a list of draw calls on a [`RenderSurface`].
//! The surface decides what a sprite looks like; this module only decides
//! where things go and in which order.

use crate::sim::{GamePhase, GameState, Rect};

/// HUD score anchor and size in field pixels
pub const SCORE_POS: (f32, f32) = (5.0, 45.0);
pub const SCORE_SIZE_PX: f32 = 45.0;

/// Drawable images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sprite {
    Entity,
    UpperObstacle,
    LowerObstacle,
}

impl Sprite {
    fn index(self) -> usize {
        match self {
            Sprite::Entity => 0,
            Sprite::UpperObstacle => 1,
            Sprite::LowerObstacle => 2,
        }
    }
}

/// Minimal drawing surface the scene is composed onto
pub trait RenderSurface {
    /// Start a new frame
    fn clear(&mut self);

    fn draw_image(&mut self, sprite: Sprite, rect: Rect);

    fn fill_text(&mut self, text: &str, x: f32, y: f32, size_px: f32);
}

/// Which sprites have finished loading. Unloaded sprites are skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpriteSet {
    loaded: [bool; 3],
}

impl SpriteSet {
    /// Every sprite ready (procedural backends)
    pub fn all() -> Self {
        Self { loaded: [true; 3] }
    }

    pub fn mark_loaded(&mut self, sprite: Sprite) {
        self.loaded[sprite.index()] = true;
    }

    pub fn is_loaded(&self, sprite: Sprite) -> bool {
        self.loaded[sprite.index()]
    }
}

/// Compose one frame. Safe to call at any rate; reads state only.
pub fn draw_frame<S: RenderSurface + ?Sized>(
    surface: &mut S,
    state: &GameState,
    sprites: &SpriteSet,
) {
    surface.clear();

    let blit = |surface: &mut S, sprite: Sprite, rect: Rect| {
        if sprites.is_loaded(sprite) {
            surface.draw_image(sprite, rect);
        }
    };

    blit(surface, Sprite::Entity, state.entity.rect());

    for obstacle in &state.obstacles {
        blit(surface, Sprite::UpperObstacle, obstacle.upper_rect());
        blit(surface, Sprite::LowerObstacle, obstacle.lower_rect());
    }

    let (x, y) = SCORE_POS;
    surface.fill_text(&state.display_score().to_string(), x, y, SCORE_SIZE_PX);
}

/// Text for the end-of-run screen, if one should be shown
pub fn final_score_text(state: &GameState) -> Option<String> {
    (state.phase == GamePhase::Ended).then(|| format!("Final Score: {}", state.display_score()))
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear,
    Image(Sprite, Rect),
    Text {
        text: String,
        x: f32,
        y: f32,
        size_px: f32,
    },
}

/// Surface that records draw calls instead of drawing (headless runs, tests)
#[derive(Debug, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCmd>,
}

impl DrawList {
    pub fn images(&self) -> impl Iterator<Item = (Sprite, Rect)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCmd::Image(sprite, rect) => Some((*sprite, *rect)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCmd::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl RenderSurface for DrawList {
    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCmd::Clear);
    }

    fn draw_image(&mut self, sprite: Sprite, rect: Rect) {
        self.commands.push(DrawCmd::Image(sprite, rect));
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, size_px: f32) {
        self.commands.push(DrawCmd::Text {
            text: text.to_string(),
            x,
            y,
            size_px,
        });
    }
}

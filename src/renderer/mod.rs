//! Rendering
//!
//! `scene` composes a frame from game state; `sdf_pipeline` is the WebGPU
//! surface that draws it with signed distance fields in the fragment shader.

pub mod scene;
pub mod sdf_pipeline;

pub use scene::{DrawCmd, DrawList, RenderSurface, Sprite, SpriteSet, draw_frame, final_score_text};
pub use sdf_pipeline::{HudText, RenderInitError, SdfRenderState};

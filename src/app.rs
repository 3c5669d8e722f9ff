//! Per-frame driver
//!
//! Owns the game state and the pluggable input and audio strategies. Each
//! display frame runs however many fixed steps the clock grants, feeds
//! simulation events to audio and input, and leaves the state ready to draw.

use crate::audio::{AudioSink, SoundEffect, sound_for};
use crate::consts::SIM_DT;
use crate::input::InputSource;
use crate::platform::FrameClock;
use crate::renderer::{RenderSurface, SpriteSet, draw_frame};
use crate::sim::{ControlMode, GameEvent, GameState, Motion, TickInput, tick};
use crate::tuning::Tuning;

pub struct Game {
    pub state: GameState,
    input: Box<dyn InputSource>,
    audio: Box<dyn AudioSink>,
    clock: FrameClock,
    last_motion: Option<Motion>,
}

impl Game {
    /// The control mode comes from the input source
    pub fn new(
        seed: u64,
        tuning: Tuning,
        input: Box<dyn InputSource>,
        audio: Box<dyn AudioSink>,
    ) -> Self {
        let mode = input.mode();
        Self {
            state: GameState::new(seed, tuning, mode),
            input,
            audio,
            clock: FrameClock::new(),
            last_motion: None,
        }
    }

    pub fn mode(&self) -> ControlMode {
        self.state.mode
    }

    /// Motion model used by the most recent step that moved the entity
    pub fn last_motion(&self) -> Option<Motion> {
        self.last_motion
    }

    pub fn audio_mut(&mut self) -> &mut dyn AudioSink {
        self.audio.as_mut()
    }

    /// Menu to game transition
    pub fn enter(&mut self) {
        self.audio.play(SoundEffect::Swoosh);
    }

    /// The discrete user action (click, tap, key press)
    pub fn trigger(&mut self) {
        self.input.trigger();
    }

    /// Advance by one display frame at `time_ms`. Returns the number of
    /// fixed steps taken.
    pub fn frame(&mut self, time_ms: f64) -> u32 {
        let steps = self.clock.advance(time_ms);
        for _ in 0..steps {
            let input = self.input.poll();
            self.step(&input);
        }
        steps
    }

    /// One fixed step with explicit input
    pub fn step(&mut self, input: &TickInput) {
        if let Some(motion) = tick(&mut self.state, input, SIM_DT) {
            self.last_motion = Some(motion);
        }
        self.dispatch_events();
    }

    pub fn render<S: RenderSurface + ?Sized>(&self, surface: &mut S, sprites: &SpriteSet) {
        draw_frame(surface, &self.state, sprites);
    }

    fn dispatch_events(&mut self) {
        for event in self.state.drain_events() {
            if let Some(effect) = sound_for(event) {
                self.audio.play(effect);
            }
            match event {
                GameEvent::RunStarted => self.input.on_run_start(),
                GameEvent::RunEnded(_) => self.input.on_run_end(),
                _ => {}
            }
        }
    }
}

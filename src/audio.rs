//! Sound effects
//!
//! Procedurally generated with the Web Audio API on the web; no sound files
//! are shipped. Playback is fire-and-forget and never blocks a frame.

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Entity flaps
    Flap,
    /// Obstacle pair passed
    Pass,
    /// Run ended
    Death,
    /// Menu transition (game load, restart)
    Swoosh,
}

/// Sound played for a simulation event, if any
pub fn sound_for(event: GameEvent) -> Option<SoundEffect> {
    match event {
        GameEvent::Flap => Some(SoundEffect::Flap),
        GameEvent::ObstaclePassed => Some(SoundEffect::Pass),
        GameEvent::RunEnded(_) => Some(SoundEffect::Death),
        GameEvent::Reset => Some(SoundEffect::Swoosh),
        GameEvent::RunStarted | GameEvent::DifficultyChanged { .. } => None,
    }
}

/// Anything that can play a sound effect
pub trait AudioSink {
    fn play(&self, effect: SoundEffect);

    /// Pick up volume and mute changes
    fn apply_settings(&mut self, _settings: &Settings) {}
}

/// Discards everything. Used on native and when audio cannot start.
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&self, effect: SoundEffect) {
        log::debug!("(silent) {:?}", effect);
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{AudioSink, SoundEffect};
    use crate::settings::Settings;
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    /// Web Audio backed sink
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl WebAudio {
        pub fn new(settings: &Settings) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: settings.effective_volume(),
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Flap - quick upward chirp
        fn play_flap(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.frequency().set_value_at_time(300.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(700.0, t + 0.08)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }

        /// Pass - two-note ding
        fn play_pass(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [880.0, 1320.0].iter().enumerate() {
                let delay = i as f64 * 0.07;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.25, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.18)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.2).ok();
                }
            }
        }

        /// Death - hit thump then a falling tone
        fn play_death(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((osc, gain)) = self.create_osc(ctx, 150.0, OscillatorType::Square) {
                gain.gain().set_value_at_time(vol * 0.4, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                    .ok();
                osc.frequency().set_value_at_time(150.0, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(50.0, t + 0.1)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.15).ok();
            }

            if let Some((osc, gain)) = self.create_osc(ctx, 500.0, OscillatorType::Sine) {
                let start = t + 0.15;
                gain.gain().set_value_at_time(vol * 0.3, start).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, start + 0.5)
                    .ok();
                osc.frequency().set_value_at_time(500.0, start).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(80.0, start + 0.5)
                    .ok();
                osc.start_with_when(start).ok();
                osc.stop_with_when(start + 0.55).ok();
            }
        }

        /// Swoosh - swelling downward sweep
        fn play_swoosh(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 900.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(0.01, t).ok();
            gain.gain()
                .linear_ramp_to_value_at_time(vol * 0.15, t + 0.1)
                .ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.35)
                .ok();
            osc.frequency().set_value_at_time(900.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(200.0, t + 0.35)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.4).ok();
        }
    }

    impl AudioSink for WebAudio {
        fn play(&self, effect: SoundEffect) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Flap => self.play_flap(ctx, vol),
                SoundEffect::Pass => self.play_pass(ctx, vol),
                SoundEffect::Death => self.play_death(ctx, vol),
                SoundEffect::Swoosh => self.play_swoosh(ctx, vol),
            }
        }

        fn apply_settings(&mut self, settings: &Settings) {
            self.volume = settings.effective_volume();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::EndCause;

    #[test]
    fn test_event_sounds() {
        assert_eq!(sound_for(GameEvent::Flap), Some(SoundEffect::Flap));
        assert_eq!(sound_for(GameEvent::ObstaclePassed), Some(SoundEffect::Pass));
        assert_eq!(
            sound_for(GameEvent::RunEnded(EndCause::FellOut)),
            Some(SoundEffect::Death)
        );
        assert_eq!(sound_for(GameEvent::Reset), Some(SoundEffect::Swoosh));
        assert_eq!(sound_for(GameEvent::RunStarted), None);
        assert_eq!(sound_for(GameEvent::DifficultyChanged { level: 2 }), None);
    }
}

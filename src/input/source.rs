//! Control strategies feeding the fixed-step simulation
//!
//! The frame driver only talks to [`InputSource`]; which strategy is behind
//! it is decided once at startup by [`select_source`].

use super::mailbox::SampleReader;
use super::tracker::{TrackingControl, TrackingError};
use crate::settings::{Mapping, Settings};
use crate::sim::{ControlMode, TickInput};

pub trait InputSource {
    fn mode(&self) -> ControlMode;

    /// Queue the discrete user action (click, tap, key)
    fn trigger(&mut self);

    /// Input for the next fixed step. A queued trigger is consumed here.
    fn poll(&mut self) -> TickInput;

    fn on_run_start(&mut self) {}

    fn on_run_end(&mut self) {}
}

/// Discrete flaps only
#[derive(Debug, Default)]
pub struct ImpulseInput {
    pending: bool,
}

impl InputSource for ImpulseInput {
    fn mode(&self) -> ControlMode {
        ControlMode::Impulse
    }

    fn trigger(&mut self) {
        self.pending = true;
    }

    fn poll(&mut self) -> TickInput {
        TickInput {
            trigger: std::mem::take(&mut self.pending),
            signal: None,
        }
    }
}

/// Reader half of a running tracking loop
#[derive(Debug, Clone)]
pub struct TrackerHandle {
    pub reader: SampleReader,
    pub control: TrackingControl,
}

/// Continuous head position read from the tracking mailbox
#[derive(Debug)]
pub struct TrackedInput {
    reader: SampleReader,
    control: TrackingControl,
    mapping: Mapping,
    baseline: Option<f32>,
    /// Samples from an older reset generation predate the last run boundary
    generation: u64,
    pending: bool,
}

impl TrackedInput {
    pub fn new(handle: TrackerHandle, mapping: Mapping) -> Self {
        Self {
            reader: handle.reader,
            control: handle.control,
            mapping,
            baseline: None,
            generation: 0,
            pending: false,
        }
    }

    pub fn mapping(&self) -> Mapping {
        self.mapping
    }

    pub fn baseline(&self) -> Option<f32> {
        self.baseline
    }

    fn fresh_sample(&self) -> Option<f32> {
        self.reader
            .latest_sample()
            .filter(|s| s.generation >= self.generation)
            .map(|s| s.value)
    }

    /// Relative mapping restarts from a clean filter and a new baseline
    fn run_boundary(&mut self) {
        if !self.mapping.is_relative() {
            return;
        }
        self.generation = self.control.request_reset();
        self.baseline = None;
    }
}

impl InputSource for TrackedInput {
    fn mode(&self) -> ControlMode {
        ControlMode::Tracked
    }

    fn trigger(&mut self) {
        self.pending = true;
    }

    fn poll(&mut self) -> TickInput {
        let sample = self.fresh_sample();
        if self.mapping.is_relative() && self.baseline.is_none() {
            self.baseline = sample;
        }

        TickInput {
            trigger: std::mem::take(&mut self.pending),
            signal: sample.map(|v| self.mapping.apply(v, self.baseline)),
        }
    }

    fn on_run_start(&mut self) {
        self.run_boundary();
    }

    fn on_run_end(&mut self) {
        self.run_boundary();
    }
}

impl Drop for TrackedInput {
    fn drop(&mut self) {
        self.control.disable();
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error("head tracking is required but could not start: {0}")]
    TrackingRequired(#[source] TrackingError),
}

/// Pick the control strategy for this session.
///
/// `tracker` is the outcome of starting the tracking loop, or `None` when it
/// was never attempted. Tracking failures degrade to impulse control unless
/// the settings require tracking.
pub fn select_source(
    settings: &Settings,
    tracker: Option<Result<TrackerHandle, TrackingError>>,
) -> Result<Box<dyn InputSource>, StartError> {
    if settings.control_mode == ControlMode::Impulse {
        if let Some(Ok(handle)) = tracker {
            handle.control.disable();
        }
        return Ok(Box::new(ImpulseInput::default()));
    }

    let tracker =
        tracker.unwrap_or_else(|| Err(TrackingError::Unavailable("tracking not started".into())));

    match tracker {
        Ok(handle) => {
            log::info!("Using head tracking ({:?} mapping)", settings.mapping);
            Ok(Box::new(TrackedInput::new(handle, settings.mapping)))
        }
        Err(e) if settings.tracking_required => Err(StartError::TrackingRequired(e)),
        Err(e) => {
            log::warn!("Head tracking unavailable ({e}), falling back to impulse control");
            Ok(Box::new(ImpulseInput::default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::mailbox::{SampleWriter, mailbox};

    fn tracked(mapping: Mapping) -> (SampleWriter, TrackingControl, TrackedInput) {
        let (writer, reader) = mailbox();
        let control = TrackingControl::default();
        let input = TrackedInput::new(
            TrackerHandle {
                reader,
                control: control.clone(),
            },
            mapping,
        );
        (writer, control, input)
    }

    #[test]
    fn test_impulse_trigger_consumed_once() {
        let mut input = ImpulseInput::default();
        input.trigger();
        input.trigger();
        assert!(input.poll().trigger);
        assert!(!input.poll().trigger);
        assert_eq!(input.poll().signal, None);
    }

    #[test]
    fn test_tracked_absolute_passes_sample() {
        let (mut writer, _control, mut input) = tracked(Mapping::Absolute);
        assert_eq!(input.poll().signal, None);
        writer.publish(0.25);
        assert_eq!(input.poll().signal, Some(0.25));
        // Repeated polls keep reading the same latest value
        assert_eq!(input.poll().signal, Some(0.25));
    }

    #[test]
    fn test_absolute_mapping_never_resets() {
        let (mut writer, control, mut input) = tracked(Mapping::Absolute);
        writer.publish(0.3);
        input.on_run_start();
        assert_eq!(input.poll().signal, Some(0.3));
        // No reset requested: the next tracking step would not clear the filter
        drop(input);
        assert!(!control.is_enabled());
    }

    #[test]
    fn test_relative_baseline_from_first_sample_after_start() {
        let (mut writer, _control, mut input) = tracked(Mapping::Relative { sensitivity: 2.0 });
        writer.publish(0.7);
        input.on_run_start();
        // Pre-start sample is stale
        assert_eq!(input.poll().signal, None);
        assert_eq!(input.baseline(), None);

        // Published before the tracker applied the reset: still stale
        writer.publish(0.45);
        assert_eq!(input.poll().signal, None);

        writer.start_generation(1);
        writer.publish(0.4);
        assert_eq!(input.poll().signal, Some(0.5));
        assert_eq!(input.baseline(), Some(0.4));

        writer.publish(0.5);
        let signal = input.poll().signal.unwrap();
        assert!((signal - 0.7).abs() < 0.0001);
    }

    #[test]
    fn test_tracked_trigger_still_reported() {
        let (_writer, _control, mut input) = tracked(Mapping::Absolute);
        input.trigger();
        assert!(input.poll().trigger);
        assert!(!input.poll().trigger);
    }

    #[test]
    fn test_select_degrades_without_tracking() {
        let settings = Settings::default();
        let source = select_source(
            &settings,
            Some(Err(TrackingError::PermissionDenied)),
        )
        .unwrap();
        assert_eq!(source.mode(), ControlMode::Impulse);

        let source = select_source(&settings, None).unwrap();
        assert_eq!(source.mode(), ControlMode::Impulse);
    }

    #[test]
    fn test_select_refuses_when_tracking_required() {
        let settings = Settings {
            tracking_required: true,
            ..Settings::default()
        };
        let result = select_source(&settings, Some(Err(TrackingError::PermissionDenied)));
        assert!(matches!(
            result,
            Err(StartError::TrackingRequired(TrackingError::PermissionDenied))
        ));
    }

    #[test]
    fn test_select_uses_tracker() {
        let (_writer, reader) = mailbox();
        let control = TrackingControl::default();
        let settings = Settings::default();
        let source = select_source(
            &settings,
            Some(Ok(TrackerHandle {
                reader,
                control: control.clone(),
            })),
        )
        .unwrap();
        assert_eq!(source.mode(), ControlMode::Tracked);
        assert!(control.is_enabled());
    }

    #[test]
    fn test_impulse_setting_stops_unused_tracker() {
        let (_writer, reader) = mailbox();
        let control = TrackingControl::default();
        let settings = Settings {
            control_mode: ControlMode::Impulse,
            ..Settings::default()
        };
        let source = select_source(
            &settings,
            Some(Ok(TrackerHandle {
                reader,
                control: control.clone(),
            })),
        )
        .unwrap();
        assert_eq!(source.mode(), ControlMode::Impulse);
        assert!(!control.is_enabled());
    }
}

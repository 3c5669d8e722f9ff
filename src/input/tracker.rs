//! Head tracking loop
//!
//! Runs independently of the frame loop. Each iteration asks the keypoint
//! provider for the latest face position, normalizes it against the frame
//! height the provider reports in, smooths it and overwrites the mailbox.
//! Provider failures are logged and the loop keeps going.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::mailbox::SampleWriter;
use super::smoothing::SmoothingFilter;

/// A face keypoint in provider frame coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("tracking unavailable: {0}")]
    Unavailable(String),
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("invalid frame height {0}")]
    InvalidFrameHeight(f32),
}

/// Source of face keypoints (camera plus landmark model)
pub trait KeypointProvider {
    /// Latest tracked keypoint, `None` when no face is in view
    fn latest_keypoint(&mut self) -> Result<Option<Keypoint>, TrackingError>;

    /// Height of the frame `latest_keypoint` coordinates are expressed in
    fn frame_height(&self) -> f32;
}

/// Shared switches between the frame loop and the tracking loop
#[derive(Debug, Clone)]
pub struct TrackingControl {
    flags: Arc<Flags>,
}

#[derive(Debug)]
struct Flags {
    enabled: AtomicBool,
    generation: AtomicU64,
}

impl Default for TrackingControl {
    fn default() -> Self {
        Self {
            flags: Arc::new(Flags {
                enabled: AtomicBool::new(true),
                generation: AtomicU64::new(0),
            }),
        }
    }
}

impl TrackingControl {
    pub fn is_enabled(&self) -> bool {
        self.flags.enabled.load(Ordering::Acquire)
    }

    /// Stop the tracking loop at its next iteration
    pub fn disable(&self) {
        self.flags.enabled.store(false, Ordering::Release);
    }

    /// Ask the tracking loop to clear its smoothing history. Returns the new
    /// reset generation; samples stamped with an older one predate the reset.
    pub fn request_reset(&self) -> u64 {
        self.flags.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn generation(&self) -> u64 {
        self.flags.generation.load(Ordering::Acquire)
    }
}

/// Outcome of one tracking iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackStep {
    /// A new smoothed sample was published
    Published(f32),
    /// Provider saw no face; the mailbox keeps its last value
    NoFace,
    /// Provider failed this iteration; the loop continues
    Failed,
    /// Disabled, or nobody is reading anymore
    Stopped,
}

pub struct TrackingLoop<P> {
    provider: P,
    filter: SmoothingFilter,
    writer: SampleWriter,
    control: TrackingControl,
    generation: u64,
    first_logged: bool,
}

impl<P: KeypointProvider> TrackingLoop<P> {
    pub fn new(provider: P, smoothing: f32, writer: SampleWriter, control: TrackingControl) -> Self {
        Self {
            provider,
            filter: SmoothingFilter::new(smoothing),
            writer,
            control,
            generation: 0,
            first_logged: false,
        }
    }

    pub fn control(&self) -> &TrackingControl {
        &self.control
    }

    /// Run one iteration. Callers schedule the next one unless this returns
    /// [`TrackStep::Stopped`].
    pub fn step(&mut self) -> TrackStep {
        if !self.control.is_enabled() || self.writer.is_closed() {
            return TrackStep::Stopped;
        }

        let requested = self.control.generation();
        if requested != self.generation {
            self.generation = requested;
            self.filter.reset();
            self.writer.start_generation(requested);
            log::debug!("Tracking smoothing reset (generation {requested})");
        }

        let keypoint = match self.provider.latest_keypoint() {
            Ok(Some(kp)) => kp,
            Ok(None) => return TrackStep::NoFace,
            Err(e) => {
                log::warn!("Tracking iteration failed: {e}");
                return TrackStep::Failed;
            }
        };

        let raw = match normalize(keypoint.y, self.provider.frame_height()) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Tracking iteration failed: {e}");
                return TrackStep::Failed;
            }
        };

        let smoothed = self.filter.push(raw);
        self.writer.publish(smoothed);

        if !self.first_logged {
            self.first_logged = true;
            log::info!("First tracked sample: {smoothed:.3}");
        }

        TrackStep::Published(smoothed)
    }
}

/// Map a keypoint row to [0, 1] of the reporting frame height
pub fn normalize(y: f32, frame_height: f32) -> Result<f32, TrackingError> {
    if !frame_height.is_finite() || frame_height <= 0.0 {
        return Err(TrackingError::InvalidFrameHeight(frame_height));
    }
    Ok((y / frame_height).clamp(0.0, 1.0))
}

/// Drive a tracking loop on a dedicated thread until it stops
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_thread<P>(
    mut tracking: TrackingLoop<P>,
    period: std::time::Duration,
) -> std::thread::JoinHandle<()>
where
    P: KeypointProvider + Send + 'static,
{
    std::thread::spawn(move || {
        while tracking.step() != TrackStep::Stopped {
            std::thread::sleep(period);
        }
        log::info!("Tracking loop stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::mailbox::mailbox;
    use std::collections::VecDeque;

    /// Replays a fixed script of provider results
    struct Scripted {
        frames: VecDeque<Result<Option<Keypoint>, TrackingError>>,
        height: f32,
    }

    impl Scripted {
        fn new(height: f32, frames: Vec<Result<Option<Keypoint>, TrackingError>>) -> Self {
            Self {
                frames: frames.into(),
                height,
            }
        }
    }

    impl KeypointProvider for Scripted {
        fn latest_keypoint(&mut self) -> Result<Option<Keypoint>, TrackingError> {
            self.frames.pop_front().unwrap_or(Ok(None))
        }

        fn frame_height(&self) -> f32 {
            self.height
        }
    }

    fn at(y: f32) -> Result<Option<Keypoint>, TrackingError> {
        Ok(Some(Keypoint { x: 0.0, y }))
    }

    #[test]
    fn test_publishes_normalized_sample() {
        let (writer, reader) = mailbox();
        let provider = Scripted::new(480.0, vec![at(240.0)]);
        let mut tracking = TrackingLoop::new(provider, 0.3, writer, TrackingControl::default());

        assert_eq!(tracking.step(), TrackStep::Published(0.5));
        assert_eq!(reader.latest(), Some(0.5));
    }

    #[test]
    fn test_smooths_successive_samples() {
        let (writer, reader) = mailbox();
        let provider = Scripted::new(100.0, vec![at(0.0), at(100.0)]);
        let mut tracking = TrackingLoop::new(provider, 0.3, writer, TrackingControl::default());

        tracking.step();
        tracking.step();
        assert!((reader.latest().unwrap() - 0.3).abs() < 0.0001);
    }

    #[test]
    fn test_failure_is_not_fatal() {
        let (writer, reader) = mailbox();
        let provider = Scripted::new(
            100.0,
            vec![
                at(20.0),
                Err(TrackingError::Inference("model hiccup".into())),
                Ok(None),
                at(20.0),
            ],
        );
        let mut tracking = TrackingLoop::new(provider, 1.0, writer, TrackingControl::default());

        assert_eq!(tracking.step(), TrackStep::Published(0.2));
        assert_eq!(tracking.step(), TrackStep::Failed);
        // Last good value is still readable
        assert_eq!(reader.latest(), Some(0.2));
        assert_eq!(tracking.step(), TrackStep::NoFace);
        assert_eq!(tracking.step(), TrackStep::Published(0.2));
    }

    #[test]
    fn test_reset_clears_history_and_slot() {
        let (writer, reader) = mailbox();
        let provider = Scripted::new(100.0, vec![at(90.0), Ok(None), at(10.0)]);
        let control = TrackingControl::default();
        let mut tracking = TrackingLoop::new(provider, 0.3, writer, control.clone());

        tracking.step();
        control.request_reset();
        assert_eq!(tracking.step(), TrackStep::NoFace);
        assert_eq!(reader.latest(), None);
        // First sample after reset is not blended with the old history
        assert_eq!(tracking.step(), TrackStep::Published(0.1));
        assert_eq!(reader.latest_sample().unwrap().generation, 1);
    }

    #[test]
    fn test_reset_during_iteration_stamps_old_generation() {
        let (writer, reader) = mailbox();
        let control = TrackingControl::default();

        // Provider that lands a reset request mid-iteration, after the loop
        // has already checked for one
        struct ResetMidway {
            control: TrackingControl,
            calls: u32,
        }
        impl KeypointProvider for ResetMidway {
            fn latest_keypoint(&mut self) -> Result<Option<Keypoint>, TrackingError> {
                self.calls += 1;
                if self.calls == 2 {
                    self.control.request_reset();
                }
                Ok(Some(Keypoint {
                    x: 0.0,
                    y: if self.calls == 1 { 90.0 } else { 10.0 },
                }))
            }

            fn frame_height(&self) -> f32 {
                100.0
            }
        }

        let provider = ResetMidway {
            control: control.clone(),
            calls: 0,
        };
        let mut tracking = TrackingLoop::new(provider, 0.5, writer, control.clone());

        tracking.step();
        // Blended with the pre-reset history, so it carries the old generation
        assert_eq!(tracking.step(), TrackStep::Published(0.5));
        assert_eq!(reader.latest_sample().unwrap().generation, 0);
        assert_eq!(control.generation(), 1);

        // Next iteration applies the reset before sampling
        assert_eq!(tracking.step(), TrackStep::Published(0.1));
        assert_eq!(reader.latest_sample().unwrap().generation, 1);
    }

    #[test]
    fn test_disable_stops_loop() {
        let (writer, _reader) = mailbox();
        let provider = Scripted::new(100.0, vec![at(50.0)]);
        let control = TrackingControl::default();
        let mut tracking = TrackingLoop::new(provider, 0.3, writer, control.clone());

        control.disable();
        assert_eq!(tracking.step(), TrackStep::Stopped);
    }

    #[test]
    fn test_stops_when_reader_dropped() {
        let (writer, reader) = mailbox();
        let provider = Scripted::new(100.0, vec![at(50.0)]);
        let mut tracking = TrackingLoop::new(provider, 0.3, writer, TrackingControl::default());
        drop(reader);
        assert_eq!(tracking.step(), TrackStep::Stopped);
    }

    #[test]
    fn test_normalize_rejects_bad_height() {
        assert!(matches!(
            normalize(10.0, 0.0),
            Err(TrackingError::InvalidFrameHeight(_))
        ));
        assert!(normalize(10.0, f32::NAN).is_err());
        assert_eq!(normalize(-5.0, 100.0).unwrap(), 0.0);
        assert_eq!(normalize(500.0, 100.0).unwrap(), 1.0);
    }
}

//! Player input: discrete flaps and head tracking
//!
//! The tracking loop and the frame loop share nothing but a latest-value
//! mailbox and a pair of flags, so either can run at its own rate.

pub mod mailbox;
pub mod smoothing;
pub mod source;
pub mod tracker;

pub use mailbox::{SampleReader, SampleWriter, TrackedSample, mailbox};
pub use smoothing::SmoothingFilter;
pub use source::{ImpulseInput, InputSource, StartError, TrackedInput, TrackerHandle, select_source};
pub use tracker::{
    Keypoint, KeypointProvider, TrackStep, TrackingControl, TrackingError, TrackingLoop, normalize,
};

#[cfg(not(target_arch = "wasm32"))]
pub use tracker::spawn_thread;

/// Wire a tracking loop to a fresh mailbox. Returns the loop (to be driven
/// by the caller's scheduler) and the handle the frame loop reads from.
pub fn start_tracking<P: KeypointProvider>(
    provider: P,
    smoothing: f32,
) -> (TrackingLoop<P>, TrackerHandle) {
    let (writer, reader) = mailbox();
    let control = TrackingControl::default();
    let tracking = TrackingLoop::new(provider, smoothing, writer, control.clone());
    (tracking, TrackerHandle { reader, control })
}

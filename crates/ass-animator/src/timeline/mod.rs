//! Playback-synchronised drawing of precomputed bundles
//!
//! The host owns the video element and the animation-frame loop. It reports
//! playback time through [`VideoClock`], forwards media notifications as
//! [`PlaybackEvent`]s and calls [`TimelineDriver::tick`] whenever a frame it
//! requested through [`FrameRequester`] fires.

mod driver;

pub use driver::{DriverState, TimelineDriver};

/// Source of the current playback position
pub trait VideoClock {
    /// Playback position in seconds
    fn current_time(&self) -> f64;
}

impl<F: Fn() -> f64> VideoClock for F {
    fn current_time(&self) -> f64 {
        self()
    }
}

/// Handle of a pending animation-frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host facility scheduling the next tick
pub trait FrameRequester {
    /// Ask for one tick on the next display frame
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a request that has not fired yet
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Media notification forwarded by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackEvent {
    /// Current time advanced during playback
    TimeUpdate,
    /// Playback started or resumed
    Play,
    /// Playback paused
    Pause,
    /// Current time jumped
    Seeked,
    /// Media reached its end
    Ended,
    /// Playback rate changed to the given factor
    RateChange(f64),
}

impl PlaybackEvent {
    /// Check if the event breaks frame-index continuity
    pub fn interrupts_playback(self) -> bool {
        matches!(self, Self::Seeked | Self::Pause | Self::Ended)
    }
}

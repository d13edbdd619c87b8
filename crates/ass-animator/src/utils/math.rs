//! Interpolation helpers shared by the appliers

/// Linear interpolation
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Progress of `x` through `[start, end]`, clamped to 0.0..=1.0
///
/// A window with no width is a step: 0.0 before `start`, 1.0 from `start` on.
pub fn window_progress(x: f64, start: f64, end: f64) -> f64 {
    if x < start {
        return 0.0;
    }
    if end <= start || x >= end {
        return 1.0;
    }
    (x - start) / (end - start)
}

/// Convert a millisecond offset to a (fractional) frame position
pub fn ms_to_frames(ms: f64, fps: f64) -> f64 {
    ms * fps / 1000.0
}

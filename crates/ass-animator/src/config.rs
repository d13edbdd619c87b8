//! Timeline configuration

use crate::layout::WrapStyle;
use crate::utils::AnimatorError;
use serde::{Deserialize, Serialize};

/// Nominal frame rate bundles are precomputed at
pub const DEFAULT_FPS: f64 = 60.0;

/// Default number of bundles kept in the cache
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Configuration shared by the bundle builder and the timeline driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Frames per second of the precomputed frame arrays
    pub fps: f64,
    /// Upper bound of cached bundles
    pub cache_capacity: usize,
    /// Canvas used when the render target has no matching layer
    pub default_canvas: (f32, f32),
    /// Line wrapping mode for layout
    pub wrap_style: WrapStyle,
}

impl TimelineConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, AnimatorError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the precomputation frame rate
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    /// Set the bundle cache bound
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set the fallback canvas size
    pub fn with_default_canvas(mut self, width: f32, height: f32) -> Self {
        self.default_canvas = (width, height);
        self
    }

    /// Set the wrap style
    pub fn with_wrap_style(mut self, wrap_style: WrapStyle) -> Self {
        self.wrap_style = wrap_style;
        self
    }

    /// Duration of one precomputed frame in milliseconds
    pub fn frame_duration_ms(&self) -> f64 {
        1000.0 / self.fps
    }

    /// Reject values the timeline cannot work with
    pub fn validate(&self) -> Result<(), AnimatorError> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(AnimatorError::InvalidConfig(format!(
                "fps must be positive, got {}",
                self.fps
            )));
        }
        if self.cache_capacity == 0 {
            return Err(AnimatorError::InvalidConfig(
                "cache_capacity must be at least 1".into(),
            ));
        }
        let (width, height) = self.default_canvas;
        if !(width > 0.0 && height > 0.0) {
            return Err(AnimatorError::InvalidConfig(format!(
                "default canvas must be non-empty, got {width}x{height}"
            )));
        }
        Ok(())
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            default_canvas: (1920.0, 1080.0),
            wrap_style: WrapStyle::Smart,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = TimelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fps, 60.0);
        assert!((config.frame_duration_ms() - 16.666_666).abs() < 1e-3);
    }

    #[test]
    fn json_fills_missing_fields() {
        let config = TimelineConfig::from_json(r#"{"fps": 30, "wrap_style": "no_wrap"}"#).unwrap();
        assert_eq!(config.fps, 30.0);
        assert_eq!(config.wrap_style, WrapStyle::NoWrap);
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(TimelineConfig::new().with_fps(0.0).validate().is_err());
        assert!(TimelineConfig::new().with_fps(f64::NAN).validate().is_err());
        assert!(TimelineConfig::new().with_cache_capacity(0).validate().is_err());
        assert!(TimelineConfig::from_json(r#"{"fps": -1}"#).is_err());
        assert!(TimelineConfig::from_json("not json").is_err());
    }
}

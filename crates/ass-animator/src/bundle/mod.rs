//! Precomputed per-frame animation data for dialogue events
//!
//! A [`Bundle`] owns one [`FrameRenderState`] per video frame of its event:
//! the pure layout is cloned for every frame and the event's animations are
//! baked into the copies. Bundles are addressed by a content hash of the
//! event so identical events share one bundle.

mod cache;

pub use cache::{BundleCache, CacheStats};

use crate::animation::{parse_animations, Animation, AnimationList};
use crate::config::TimelineConfig;
use crate::event::{DialogueEvent, RawAnimation, StyleTable};
use crate::layout::{self, Canvas, LayoutEnv, TextMeasurer, WrapStyle};
use crate::renderer::FrameRenderState;
use crate::scheduler::TaskId;
use crate::utils::AnimatorError;
use ahash::RandomState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

/// Content hash of a dialogue event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BundleKey(u64);

impl BundleKey {
    /// Hash the serialized event with fixed seeds
    ///
    /// The key only depends on the event's content, so it is stable across
    /// runs and identical events always map to the same bundle.
    pub fn of(event: &DialogueEvent) -> Result<Self, AnimatorError> {
        let bytes = serde_json::to_vec(event)?;
        let mut hasher =
            RandomState::with_seeds(0x1234_5678_9abc_def0, 0xfedc_ba98_7654_3210, 0, 0)
                .build_hasher();
        hasher.write(&bytes);
        Ok(Self(hasher.finish()))
    }

    /// Raw hash value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BundleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Frames and scheduling state of one event
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    /// Content hash of the source event
    pub key: BundleKey,
    /// Event start in seconds
    pub start: f64,
    /// Event end in seconds
    pub end: f64,
    /// Render layer of the event
    pub layer: u32,
    /// Animations in application order
    pub animations: AnimationList,
    /// One state per frame, never resized after build
    pub frames: Box<[FrameRenderState]>,
    /// Whether the last tick found playback inside the event
    pub active: bool,
    /// Scheduler task while scheduled
    pub task_id: Option<TaskId>,
}

impl Bundle {
    /// Check whether `time_ms` lies inside the event window
    pub fn contains_ms(&self, time_ms: f64) -> bool {
        self.start * 1000.0 <= time_ms && time_ms <= self.end * 1000.0
    }

    /// Frame index for playback time `time_ms`
    pub fn frame_index(&self, time_ms: f64, fps: f64) -> usize {
        let elapsed = (time_ms - self.start * 1000.0).max(0.0);
        (elapsed * fps / 1000.0).floor() as usize
    }

    /// Frame for playback time `time_ms`, if one was precomputed
    pub fn frame_at(&self, time_ms: f64, fps: f64) -> Option<&FrameRenderState> {
        self.frames.get(self.frame_index(time_ms, fps))
    }

    /// Check if the bundle is registered with a scheduler
    pub fn is_scheduled(&self) -> bool {
        self.task_id.is_some()
    }

    /// Number of precomputed frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Builds bundles for one render layer
pub struct BundleBuilder<'a> {
    styles: &'a StyleTable,
    env: LayoutEnv<'a>,
    fps: f64,
}

impl<'a> BundleBuilder<'a> {
    /// Create a builder laying out on `canvas`
    pub fn new(
        config: &TimelineConfig,
        styles: &'a StyleTable,
        measurer: &'a dyn TextMeasurer,
        canvas: Canvas,
    ) -> Self {
        let mut env = LayoutEnv::new(measurer, canvas.width, canvas.height);
        env.wrap_style = config.wrap_style;
        Self {
            styles,
            env,
            fps: config.fps,
        }
    }

    /// Override the wrap style
    pub fn with_wrap_style(mut self, wrap_style: WrapStyle) -> Self {
        self.env.wrap_style = wrap_style;
        self
    }

    /// Build the bundle of `event`
    pub fn build(&self, event: &DialogueEvent) -> Result<Bundle, AnimatorError> {
        let key = BundleKey::of(event)?;
        Ok(self.build_with_key(event, key))
    }

    pub(crate) fn build_with_key(&self, event: &DialogueEvent, key: BundleKey) -> Bundle {
        let animations = self.animations(event);

        let anchor = event.pos.or_else(|| event.movement.map(|m| m.start()));
        let pure = layout::layout(event, self.styles, &self.env, anchor);

        let duration = event.duration();
        let count = (duration * self.fps).round() as usize;
        let mut frames: Box<[FrameRenderState]> = (0..count)
            .map(|i| {
                let mut frame = pure.clone();
                frame.timestamp_ms = i as f64 * 1000.0 / self.fps;
                frame
            })
            .collect();

        for animation in &animations {
            animation.apply(&mut frames, duration, self.fps);
        }

        log::debug!(
            "built bundle {key}: {} frames, {} animations, layer {}",
            frames.len(),
            animations.len(),
            event.layer
        );

        Bundle {
            key,
            start: event.start,
            end: event.end,
            layer: event.layer,
            animations,
            frames,
            active: false,
            task_id: None,
        }
    }

    /// Parsed animations plus the movement implied by the event's `\move`
    fn animations(&self, event: &DialogueEvent) -> AnimationList {
        let mut animations = parse_animations(&event.animations);
        if let Some(movement) = event.movement {
            if !animations.iter().any(Animation::is_move) {
                match Animation::try_from(&RawAnimation::new("move", movement.values())) {
                    Ok(animation) => animations.push(animation),
                    Err(err) => log::warn!("ignoring event movement: {err}"),
                }
            }
        }
        animations
    }
}

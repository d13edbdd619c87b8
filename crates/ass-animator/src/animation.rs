//! Animation kinds and the appliers that bake them into frame arrays
//!
//! Appliers are pure transforms over a precomputed slice of
//! [`FrameRenderState`]s: they overwrite opacity, the animation offset or the
//! rotation origin of every frame and never change the slice length. They are
//! applied one after another, so the last writer wins.

use crate::event::{Point, RawAnimation};
use crate::renderer::FrameRenderState;
use crate::utils::{alpha_to_opacity, lerp, ms_to_frames, window_progress, AnimatorError};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Animation list of one event
pub type AnimationList = SmallVec<[Animation; 4]>;

/// Parsed animation tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Animation {
    /// `\fad(in,out)` in milliseconds
    FadeSimple {
        /// Fade-in length
        fade_in_ms: f64,
        /// Fade-out length
        fade_out_ms: f64,
    },
    /// `\fade(a1,a2,a3,t1,t2,t3,t4)`, alpha bytes 0 (opaque) to 255
    FadeComplex {
        /// Alpha before `t1`
        a1: f64,
        /// Alpha between `t2` and `t3`
        a2: f64,
        /// Alpha after `t4`
        a3: f64,
        /// Fade-in start
        t1: f64,
        /// Fade-in end
        t2: f64,
        /// Fade-out start
        t3: f64,
        /// Fade-out end
        t4: f64,
    },
    /// `\move(x1,y1,x2,y2[,t1,t2])`, window in milliseconds
    Move {
        /// Start x
        x1: f64,
        /// Start y
        y1: f64,
        /// End x
        x2: f64,
        /// End y
        y2: f64,
        /// Movement window `(t1, t2)`, whole event when absent
        window: Option<(f64, f64)>,
    },
    /// `\org(x,y)`
    RotateOrigin {
        /// Origin x
        x: f64,
        /// Origin y
        y: f64,
    },
}

impl Animation {
    /// Tag name of this animation kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FadeSimple { .. } => "fad",
            Self::FadeComplex { .. } => "fade",
            Self::Move { .. } => "move",
            Self::RotateOrigin { .. } => "org",
        }
    }

    /// Check if this is a movement
    pub fn is_move(&self) -> bool {
        matches!(self, Self::Move { .. })
    }

    /// Bake this animation into `frames`
    pub fn apply(&self, frames: &mut [FrameRenderState], duration_s: f64, fps: f64) {
        match *self {
            Self::FadeSimple {
                fade_in_ms,
                fade_out_ms,
            } => apply_fade(frames, fade_in_ms, fade_out_ms, duration_s, fps),
            Self::FadeComplex {
                a1,
                a2,
                a3,
                t1,
                t2,
                t3,
                t4,
            } => apply_complex_fade(frames, [a1, a2, a3], [t1, t2, t3, t4], fps),
            Self::Move {
                x1,
                y1,
                x2,
                y2,
                window,
            } => apply_move(frames, (x1, y1), (x2, y2), window, duration_s, fps),
            Self::RotateOrigin { x, y } => apply_rotate_origin(frames, x, y),
        }
    }
}

impl TryFrom<&RawAnimation> for Animation {
    type Error = AnimatorError;

    fn try_from(raw: &RawAnimation) -> Result<Self, Self::Error> {
        let name = raw.name.trim_start_matches('\\');
        let v = raw.values.as_slice();

        let (kind, expected): (&'static str, &'static str) = match name {
            "fad" => ("fad", "2"),
            "fade" => ("fade", "2 or 7"),
            "move" => ("move", "4 or 6"),
            "org" => ("org", "2"),
            _ => return Err(AnimatorError::UnknownAnimation(raw.name.clone())),
        };
        if let Some(&value) = v.iter().find(|value| !value.is_finite()) {
            return Err(AnimatorError::InvalidParameter { kind, value });
        }

        match (kind, v) {
            ("fad" | "fade", &[fade_in_ms, fade_out_ms]) => Ok(Self::FadeSimple {
                fade_in_ms,
                fade_out_ms,
            }),
            ("fade", &[a1, a2, a3, t1, t2, t3, t4]) => Ok(Self::FadeComplex {
                a1,
                a2,
                a3,
                t1,
                t2,
                t3,
                t4,
            }),
            ("move", &[x1, y1, x2, y2]) => Ok(Self::Move {
                x1,
                y1,
                x2,
                y2,
                window: None,
            }),
            ("move", &[x1, y1, x2, y2, t1, t2]) => Ok(Self::Move {
                x1,
                y1,
                x2,
                y2,
                window: Some((t1, t2)),
            }),
            ("org", &[x, y]) => Ok(Self::RotateOrigin { x, y }),
            _ => Err(AnimatorError::InvalidArity {
                kind,
                expected,
                actual: v.len(),
            }),
        }
    }
}

/// Parse raw tags, skipping (and logging) the ones that do not validate
pub fn parse_animations(raw: &[RawAnimation]) -> AnimationList {
    raw.iter()
        .filter_map(|tag| match Animation::try_from(tag) {
            Ok(animation) => Some(animation),
            Err(err) => {
                log::warn!("skipping animation \\{}: {err}", tag.name);
                None
            }
        })
        .collect()
}

/// `\fad`: linear fade in over the first frames, fade out over the last ones
///
/// A zero-length window disables that edge.
pub fn apply_fade(
    frames: &mut [FrameRenderState],
    fade_in_ms: f64,
    fade_out_ms: f64,
    duration_s: f64,
    fps: f64,
) {
    let total = duration_s * fps;
    let fade_in = ms_to_frames(fade_in_ms.max(0.0), fps);
    let fade_out = ms_to_frames(fade_out_ms.max(0.0), fps);

    for (i, frame) in frames.iter_mut().enumerate() {
        let i = i as f64;
        let opacity = if fade_in > 0.0 && i < fade_in {
            i / fade_in
        } else if fade_out > 0.0 && i > total - fade_out {
            (total - i) / fade_out
        } else {
            1.0
        };
        frame.set_opacity(opacity.clamp(0.0, 1.0) as f32);
    }
}

/// `\fade`: five-phase alpha envelope, alpha bytes inverted into opacity
pub fn apply_complex_fade(
    frames: &mut [FrameRenderState],
    alphas: [f64; 3],
    times_ms: [f64; 4],
    fps: f64,
) {
    let [a1, a2, a3] = alphas;
    let [f1, f2, f3, f4] = times_ms.map(|t| ms_to_frames(t, fps));

    for (i, frame) in frames.iter_mut().enumerate() {
        let i = i as f64;
        let alpha = if i < f1 {
            a1
        } else if i < f2 {
            lerp(a1, a2, window_progress(i, f1, f2))
        } else if i < f3 {
            a2
        } else if i < f4 {
            lerp(a2, a3, window_progress(i, f3, f4))
        } else {
            a3
        };
        frame.set_opacity(alpha_to_opacity(alpha));
    }
}

/// `\move`: translate from the start point towards the end point
///
/// Layout already anchors the pure state at the start point, so the written
/// offset is the distance travelled: `(0, 0)` on the first frame and
/// `(x2 - x1, y2 - y1)` once the movement is complete. Without a window the
/// movement spans every frame; with one it is confined to `[t1, t2]` ms, and
/// `t1 <= 0 && t2 <= 0` selects the whole event.
pub fn apply_move(
    frames: &mut [FrameRenderState],
    from: (f64, f64),
    to: (f64, f64),
    window: Option<(f64, f64)>,
    duration_s: f64,
    fps: f64,
) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let last = frames.len().saturating_sub(1);
    let window = window.map(|(t1, t2)| {
        if t1 <= 0.0 && t2 <= 0.0 {
            (0.0, duration_s * 1000.0)
        } else {
            (t1, t2)
        }
    });

    for (i, frame) in frames.iter_mut().enumerate() {
        let progress = match window {
            None if last == 0 => 0.0,
            None => i as f64 / last as f64,
            Some((t1, t2)) => window_progress(i as f64 * 1000.0 / fps, t1, t2),
        };
        frame.offset = Point::new((dx * progress) as f32, (dy * progress) as f32);
    }
}

/// `\org`: record the rotation origin, geometry is left untouched
pub fn apply_rotate_origin(frames: &mut [FrameRenderState], x: f64, y: f64) {
    let origin = Point::new(x as f32, y as f32);
    for frame in frames.iter_mut() {
        frame.origin = Some(origin);
    }
}

//! Utility types and helper functions

pub mod color;
mod errors;
mod math;

pub use color::{alpha_to_opacity, opacity_to_alpha, parse_ass_alpha, parse_ass_color, Rgba};
pub use errors::AnimatorError;
pub use math::{lerp, ms_to_frames, window_progress};

//! Color conversions between ASS, RGBA and CSS encodings
//!
//! ASS stores colors as `&HAABBGGRR&` where the alpha byte is an
//! *invisibility* value (`00` opaque, `FF` invisible). Everything in this
//! crate past the parsing boundary works with visibility, so the inversion
//! happens exactly once, in [`alpha_to_opacity`].

use crate::utils::AnimatorError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Straight (non-premultiplied) RGBA color, alpha as visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel, 255 = fully visible
    pub a: u8,
}

impl Rgba {
    /// Opaque white, the ASS default primary colour
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Create a color from channels
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Alpha as a 0.0..=1.0 opacity
    pub fn opacity(&self) -> f32 {
        f32::from(self.a) / 255.0
    }

    /// Copy of this color with a different alpha channel
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Copy of this color with alpha taken from an opacity
    pub fn with_opacity(self, opacity: f32) -> Self {
        self.with_alpha(opacity_to_alpha_byte(opacity))
    }

    /// Encode as an ASS `&HAABBGGRR&` literal
    pub fn to_ass(&self) -> String {
        format!(
            "&H{:02X}{:02X}{:02X}{:02X}&",
            255 - self.a,
            self.b,
            self.g,
            self.r
        )
    }

    /// Encode as a CSS `rgba()` string
    pub fn to_css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.r,
            self.g,
            self.b,
            trim_float(self.opacity())
        )
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Parse an ASS color literal (`&HBBGGRR&` or `&HAABBGGRR&`)
pub fn parse_ass_color(color_str: &str) -> Result<Rgba, AnimatorError> {
    let cleaned = strip_ass_hex(color_str);
    let value = u32::from_str_radix(cleaned, 16)
        .map_err(|_| AnimatorError::InvalidColor(color_str.to_string()))?;

    match cleaned.len() {
        1..=6 => {
            let [r, g, b, _] = value.to_le_bytes();
            Ok(Rgba::new(r, g, b, 255))
        }
        7 | 8 => {
            let [r, g, b, a] = value.to_le_bytes();
            Ok(Rgba::new(r, g, b, 255 - a))
        }
        _ => Err(AnimatorError::InvalidColor(color_str.to_string())),
    }
}

/// Parse an ASS alpha literal (`&HXX&`) into the raw invisibility byte
pub fn parse_ass_alpha(alpha_str: &str) -> Result<u8, AnimatorError> {
    let cleaned = strip_ass_hex(alpha_str);
    if cleaned.is_empty() || cleaned.len() > 2 {
        return Err(AnimatorError::InvalidColor(alpha_str.to_string()));
    }
    u8::from_str_radix(cleaned, 16).map_err(|_| AnimatorError::InvalidColor(alpha_str.to_string()))
}

/// Convert an ASS alpha byte (0 = opaque) into an opacity (1.0 = visible)
pub fn alpha_to_opacity(alpha: f64) -> f32 {
    (1.0 - alpha.clamp(0.0, 255.0) / 255.0) as f32
}

/// Convert an opacity (1.0 = visible) into an ASS alpha byte (0 = opaque)
pub fn opacity_to_alpha(opacity: f32) -> u8 {
    255 - opacity_to_alpha_byte(opacity)
}

fn opacity_to_alpha_byte(opacity: f32) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn strip_ass_hex(s: &str) -> &str {
    let s = s.trim().trim_end_matches('&');
    let s = s.trim_start_matches('&');
    s.strip_prefix('H')
        .or_else(|| s.strip_prefix('h'))
        .unwrap_or(s)
}

fn trim_float(value: f32) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let text = format!("{rounded:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

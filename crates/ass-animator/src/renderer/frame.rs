//! Per-frame render state produced by layout and mutated by the appliers

use crate::event::Point;
use crate::utils::Rgba;
use serde::{Deserialize, Serialize};

/// Fully resolved font for one word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontDescriptor {
    /// Font family
    pub family: String,
    /// Font size in pixels
    pub size: f32,
    /// Bold weight
    pub bold: bool,
    /// Italic slant
    pub italic: bool,
    /// Underline decoration
    pub underline: bool,
    /// Strikeout decoration
    pub strikeout: bool,
    /// Fill color, alpha from style and `\alpha` overrides
    pub color: Rgba,
    /// Animated opacity (1.0 = visible), written by fades
    pub opacity: f32,
}

impl FontDescriptor {
    /// Create a regular-weight descriptor
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
            italic: false,
            underline: false,
            strikeout: false,
            color: Rgba::WHITE,
            opacity: 1.0,
        }
    }

    /// CSS-like shorthand (`italic bold 20px Arial`)
    pub fn css_font(&self) -> String {
        let mut font = String::new();
        if self.italic {
            font.push_str("italic ");
        }
        if self.bold {
            font.push_str("bold ");
        }
        font.push_str(&format!("{}px {}", self.size, self.family));
        font
    }

    /// Fill color with the animated opacity folded into its alpha
    pub fn effective_color(&self) -> Rgba {
        self.color
            .with_opacity(self.color.opacity() * self.opacity.clamp(0.0, 1.0))
    }
}

/// A renderable text run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Text of the run, spaces included
    pub text: String,
    /// Resolved font of the run
    pub font: FontDescriptor,
    /// Style the run originated from
    pub style: String,
    /// Left edge relative to the layout origin
    pub x: f32,
    /// Line top relative to the layout origin
    pub y: f32,
    /// Measured advance width
    pub width: f32,
    /// Measured line height
    pub height: f32,
}

/// Snapshot of one event at one video frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRenderState {
    /// Layout origin x (left of the text block)
    pub x: f32,
    /// Layout origin y (top of the text block)
    pub y: f32,
    /// Text block width
    pub width: f32,
    /// Text block height
    pub height: f32,
    /// Canvas width the layout was computed for
    pub canvas_width: f32,
    /// Canvas height the layout was computed for
    pub canvas_height: f32,
    /// Milliseconds since event start
    pub timestamp_ms: f64,
    /// Animated translation added on top of the pure layout
    pub offset: Point,
    /// Rotation origin from `\org`
    pub origin: Option<Point>,
    /// Positioned text runs
    pub words: Vec<Word>,
}

impl FrameRenderState {
    /// Empty state on a canvas
    pub fn empty(canvas_width: f32, canvas_height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            canvas_width,
            canvas_height,
            timestamp_ms: 0.0,
            offset: Point::default(),
            origin: None,
            words: Vec::new(),
        }
    }

    /// Absolute canvas position of a word, animation offset included
    pub fn word_position(&self, word: &Word) -> Point {
        Point::new(
            self.x + word.x + self.offset.x,
            self.y + word.y + self.offset.y,
        )
    }

    /// Set the animated opacity of every word
    pub fn set_opacity(&mut self, opacity: f32) {
        for word in &mut self.words {
            word.font.opacity = opacity;
        }
    }

    /// Opacity of the first word, 1.0 for an empty frame
    pub fn opacity(&self) -> f32 {
        self.words.first().map_or(1.0, |word| word.font.opacity)
    }

    /// Check if the frame draws nothing
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, x: f32) -> Word {
        Word {
            text: text.into(),
            font: FontDescriptor::new("Arial", 20.0),
            style: "Default".into(),
            x,
            y: 0.0,
            width: 10.0,
            height: 20.0,
        }
    }

    #[test]
    fn word_position_includes_offset() {
        let mut frame = FrameRenderState::empty(640.0, 480.0);
        frame.x = 100.0;
        frame.y = 50.0;
        frame.offset = Point::new(5.0, -5.0);
        frame.words.push(word("a", 10.0));

        let pos = frame.word_position(&frame.words[0]);
        assert_eq!(pos, Point::new(115.0, 45.0));
    }

    #[test]
    fn clones_do_not_share_fonts() {
        let mut frame = FrameRenderState::empty(640.0, 480.0);
        frame.words.push(word("a", 0.0));
        let mut copy = frame.clone();
        copy.set_opacity(0.25);

        assert_eq!(frame.opacity(), 1.0);
        assert_eq!(copy.opacity(), 0.25);
    }

    #[test]
    fn css_font_shorthand() {
        let mut font = FontDescriptor::new("Open Sans", 32.0);
        font.bold = true;
        font.italic = true;
        assert_eq!(font.css_font(), "italic bold 32px Open Sans");
    }

    #[test]
    fn effective_color_multiplies_opacity() {
        let mut font = FontDescriptor::new("Arial", 20.0);
        font.opacity = 0.5;
        assert_eq!(font.effective_color().a, 128);
    }
}

//! Parsed dialogue events and styles consumed from the subtitle parser
//!
//! These types are the boundary with the external parser. They are plain
//! owned data, (de)serializable with serde so hosts can hand them over as
//! JSON, and never mutated by the timeline.

use crate::utils::{parse_ass_color, Rgba};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A point in script coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Event margins in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Margins {
    /// Left margin
    pub left: f32,
    /// Right margin
    pub right: f32,
    /// Vertical margin (bottom for subtitles, top for toptitles)
    pub vertical: f32,
}

/// `\move` descriptor carried by the event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveDescriptor {
    /// Start x
    pub x1: f32,
    /// Start y
    pub y1: f32,
    /// End x
    pub x2: f32,
    /// End y
    pub y2: f32,
    /// Movement start in ms from event start
    #[serde(default)]
    pub t1: Option<f64>,
    /// Movement end in ms from event start
    #[serde(default)]
    pub t2: Option<f64>,
}

impl MoveDescriptor {
    /// Start point of the movement
    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    /// Parameter tuple in `\move` order
    pub fn values(&self) -> Vec<f64> {
        let mut values = vec![
            f64::from(self.x1),
            f64::from(self.y1),
            f64::from(self.x2),
            f64::from(self.y2),
        ];
        if let (Some(t1), Some(t2)) = (self.t1, self.t2) {
            values.extend([t1, t2]);
        }
        values
    }
}

/// Animation tag as emitted by the parser: a name and its raw numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAnimation {
    /// Tag name without the backslash (`fad`, `fade`, `move`, `org`)
    pub name: String,
    /// Raw parameter tuple
    pub values: Vec<f64>,
}

impl RawAnimation {
    /// Create a raw animation tag
    pub fn new(name: impl Into<String>, values: impl Into<Vec<f64>>) -> Self {
        Self {
            name: name.into(),
            values: values.into(),
        }
    }
}

/// Inline overrides attached to a text fragment
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideTag {
    /// `\fn`
    pub font_name: Option<String>,
    /// `\fs`
    pub font_size: Option<f32>,
    /// `\b`
    pub bold: Option<bool>,
    /// `\i`
    pub italic: Option<bool>,
    /// `\u`
    pub underline: Option<bool>,
    /// `\s`
    pub strikeout: Option<bool>,
    /// `\c` / `\1c` as an ASS color literal
    pub primary_colour: Option<String>,
    /// `\alpha` / `\1a` as an ASS alpha literal
    pub alpha: Option<String>,
}

/// A run of text sharing one set of overrides
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Fragment {
    /// Text, may contain `\N`, `\n` and `\h` escapes
    pub text: String,
    /// Overrides in effect for this run
    #[serde(default)]
    pub tag: OverrideTag,
}

impl Fragment {
    /// Fragment without overrides
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: OverrideTag::default(),
        }
    }
}

/// A group of fragments rendered with one base style
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Slice {
    /// Base style name (after `\r` resets)
    pub style: String,
    /// Fragments in reading order
    pub fragments: Vec<Fragment>,
}

/// One parsed `Dialogue:` line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueEvent {
    /// Layer / render target id
    pub layer: u32,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Numpad alignment 1-9
    pub alignment: u8,
    /// Effective margins
    pub margins: Margins,
    /// Event style name
    pub style: String,
    /// Styled text
    pub slices: Vec<Slice>,
    /// `\pos`
    #[serde(default)]
    pub pos: Option<Point>,
    /// `\move`
    #[serde(default)]
    pub movement: Option<MoveDescriptor>,
    /// Animation tags in source order
    #[serde(default)]
    pub animations: Vec<RawAnimation>,
}

impl DialogueEvent {
    /// Create an event with a single plain slice
    pub fn new(start: f64, end: f64, style: impl Into<String>, text: impl Into<String>) -> Self {
        let style = style.into();
        Self {
            layer: 0,
            start,
            end,
            alignment: 2,
            margins: Margins::default(),
            slices: vec![Slice {
                style: style.clone(),
                fragments: vec![Fragment::plain(text)],
            }],
            style,
            pos: None,
            movement: None,
            animations: Vec::new(),
        }
    }

    /// Event duration in seconds, never negative
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Check whether `time` (seconds) lies inside the event window
    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }

    /// Builder helper: attach an animation tag
    pub fn with_animation(mut self, name: &str, values: &[f64]) -> Self {
        self.animations.push(RawAnimation::new(name, values));
        self
    }
}

/// Resolved style attributes used by layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Style name referenced by events
    pub name: String,
    /// Font family
    pub font_name: String,
    /// Font size in pixels
    pub font_size: f32,
    /// ASS color literal
    pub primary_colour: String,
    /// Bold weight
    pub bold: bool,
    /// Italic slant
    pub italic: bool,
    /// Underline decoration
    pub underline: bool,
    /// Strikeout decoration
    pub strikeout: bool,
    /// Numpad alignment 1..=9
    pub alignment: u8,
    /// Left margin in pixels
    pub margin_l: f32,
    /// Right margin in pixels
    pub margin_r: f32,
    /// Vertical margin in pixels
    pub margin_v: f32,
}

impl Style {
    /// Primary colour, white when the literal does not parse
    pub fn primary(&self) -> Rgba {
        parse_ass_color(&self.primary_colour).unwrap_or_else(|err| {
            log::debug!("style {}: {err}, using white", self.name);
            Rgba::WHITE
        })
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            font_name: "Arial".to_string(),
            font_size: 20.0,
            primary_colour: "&H00FFFFFF".to_string(),
            bold: false,
            italic: false,
            underline: false,
            strikeout: false,
            alignment: 2,
            margin_l: 10.0,
            margin_r: 10.0,
            margin_v: 10.0,
        }
    }
}

/// Style name lookup with a fallback style
#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    styles: AHashMap<String, Style>,
    fallback: Style,
}

impl StyleTable {
    /// Create an empty table falling back to [`Style::default`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a style
    pub fn insert(&mut self, style: Style) {
        self.styles.insert(style.name.clone(), style);
    }

    /// Look up a style, falling back to `Default` and then the built-in style
    pub fn resolve(&self, name: &str) -> &Style {
        if let Some(style) = self.styles.get(name) {
            return style;
        }
        log::debug!("style {name:?} not found, falling back");
        self.styles.get("Default").unwrap_or(&self.fallback)
    }

    /// Number of named styles
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Check if no named styles were registered
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

impl FromIterator<Style> for StyleTable {
    fn from_iter<I: IntoIterator<Item = Style>>(iter: I) -> Self {
        let mut table = Self::new();
        for style in iter {
            table.insert(style);
        }
        table
    }
}

//! Text layout producing the pure (time-zero) render state of an event
//!
//! Layout walks the styled fragments of an event, measures every word with a
//! [`TextMeasurer`], breaks lines on `\N` markers and (optionally) on width,
//! aligns each line inside the block and finally anchors the block on the
//! canvas. Natural flow and explicit positioning share everything except the
//! final anchoring step.

#[cfg(feature = "font-measure")]
pub mod measure;
pub mod positioning;

#[cfg(feature = "font-measure")]
pub use measure::FontMeasurer;
pub use positioning::{anchored_origin, line_offset, natural_origin, BlockSize, Canvas};

use crate::event::{DialogueEvent, Margins, OverrideTag, Point, Style, StyleTable};
use crate::renderer::{FontDescriptor, FrameRenderState, Word};
use crate::utils::{parse_ass_alpha, parse_ass_color, Rgba};
use serde::{Deserialize, Serialize};

/// Alignment types for subtitle positioning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    // ASS alignments (numpad layout)
    /// Bottom left alignment
    BottomLeft = 1,
    /// Bottom center alignment
    BottomCenter = 2,
    /// Bottom right alignment
    BottomRight = 3,
    /// Middle left alignment
    MiddleLeft = 4,
    /// Center alignment
    Center = 5,
    /// Middle right alignment
    MiddleRight = 6,
    /// Top left alignment
    TopLeft = 7,
    /// Top center alignment
    TopCenter = 8,
    /// Top right alignment
    TopRight = 9,
}

/// Horizontal part of an alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAlign {
    /// Flush with the left margin
    Left,
    /// Centred between the margins
    Center,
    /// Flush with the right margin
    Right,
}

/// Vertical part of an alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlign {
    /// Below the top margin
    Top,
    /// Centred on the canvas
    Middle,
    /// Above the bottom margin
    Bottom,
}

impl Alignment {
    /// Convert from numeric alignment value
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::BottomLeft),
            2 => Some(Self::BottomCenter),
            3 => Some(Self::BottomRight),
            4 => Some(Self::MiddleLeft),
            5 => Some(Self::Center),
            6 => Some(Self::MiddleRight),
            7 => Some(Self::TopLeft),
            8 => Some(Self::TopCenter),
            9 => Some(Self::TopRight),
            _ => None,
        }
    }

    /// Column of the numpad layout
    pub fn horizontal(self) -> HorizontalAlign {
        match self as u8 % 3 {
            1 => HorizontalAlign::Left,
            2 => HorizontalAlign::Center,
            _ => HorizontalAlign::Right,
        }
    }

    /// Row of the numpad layout
    pub fn vertical(self) -> VerticalAlign {
        match self as u8 {
            1..=3 => VerticalAlign::Bottom,
            4..=6 => VerticalAlign::Middle,
            _ => VerticalAlign::Top,
        }
    }
}

/// Line wrapping mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapStyle {
    /// Break before a word that would overflow the margins
    #[default]
    Smart,
    /// Break only on `\N` (and `\n`)
    NoWrap,
}

/// Text metrics for layout calculations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Advance width
    pub width: f32,
    /// Line height
    pub height: f32,
    /// Distance from baseline to the top
    pub ascent: f32,
    /// Distance from baseline to the bottom
    pub descent: f32,
    /// Baseline offset from the line top
    pub baseline: f32,
}

impl TextMetrics {
    /// Create with estimated values
    pub fn estimated(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ascent: height * 0.8,
            descent: height * 0.2,
            baseline: height * 0.8,
        }
    }
}

/// Measures text runs for layout
///
/// This is the read-only measurement seam towards the rendering side; layout
/// never draws.
pub trait TextMeasurer {
    /// Measure a single run rendered with `font`
    fn measure(&self, text: &str, font: &FontDescriptor) -> TextMetrics;

    /// Height of an empty line in `font`
    fn line_height(&self, font: &FontDescriptor) -> f32 {
        font.size
    }
}

/// Deterministic measurer based on font size only
#[derive(Debug, Clone, Copy)]
pub struct EstimatedMeasurer {
    /// Average glyph advance as a fraction of the font size
    pub char_width: f32,
}

impl Default for EstimatedMeasurer {
    fn default() -> Self {
        Self { char_width: 0.5 }
    }
}

impl TextMeasurer for EstimatedMeasurer {
    fn measure(&self, text: &str, font: &FontDescriptor) -> TextMetrics {
        let chars = text.chars().count() as f32;
        TextMetrics::estimated(chars * font.size * self.char_width, font.size)
    }
}

/// Everything layout needs besides the event itself
#[derive(Clone, Copy)]
pub struct LayoutEnv<'a> {
    /// Text measurement backend
    pub measurer: &'a dyn TextMeasurer,
    /// Canvas the block is placed on
    pub canvas: Canvas,
    /// Line breaking mode
    pub wrap_style: WrapStyle,
}

impl<'a> LayoutEnv<'a> {
    /// Environment with smart wrapping
    pub fn new(measurer: &'a dyn TextMeasurer, canvas_width: f32, canvas_height: f32) -> Self {
        Self {
            measurer,
            canvas: Canvas {
                width: canvas_width,
                height: canvas_height,
            },
            wrap_style: WrapStyle::Smart,
        }
    }
}

/// Lay out an event, anchored at `fixed_position` when given
pub fn layout(
    event: &DialogueEvent,
    styles: &StyleTable,
    env: &LayoutEnv<'_>,
    fixed_position: Option<Point>,
) -> FrameRenderState {
    match fixed_position {
        Some(point) => layout_at(event, styles, env, point),
        None => layout_natural(event, styles, env),
    }
}

/// Lay out an event in natural flow (relative to the margins)
pub fn layout_natural(
    event: &DialogueEvent,
    styles: &StyleTable,
    env: &LayoutEnv<'_>,
) -> FrameRenderState {
    let style = styles.resolve(&event.style);
    let alignment = resolve_alignment(event, style);
    let margins = resolve_margins(&event.margins, style);
    let block = build_block(event, styles, env, alignment, &margins);
    let origin = natural_origin(alignment, block.size, env.canvas, &margins);
    block.into_state(origin, env.canvas)
}

/// Lay out an event whose alignment point sits on `point` (`\pos`, `\move`)
pub fn layout_at(
    event: &DialogueEvent,
    styles: &StyleTable,
    env: &LayoutEnv<'_>,
    point: Point,
) -> FrameRenderState {
    let style = styles.resolve(&event.style);
    let alignment = resolve_alignment(event, style);
    let margins = resolve_margins(&event.margins, style);
    let block = build_block(event, styles, env, alignment, &margins);
    let origin = anchored_origin(alignment, block.size, point);
    block.into_state(origin, env.canvas)
}

fn resolve_alignment(event: &DialogueEvent, style: &Style) -> Alignment {
    Alignment::from_value(event.alignment)
        .or_else(|| Alignment::from_value(style.alignment))
        // Out-of-range values on both sides: bottom row, left column
        .unwrap_or(Alignment::BottomLeft)
}

/// Event margins override the style's; zero means "use the style value"
fn resolve_margins(margins: &Margins, style: &Style) -> Margins {
    let pick = |event: f32, style: f32| if event != 0.0 { event } else { style };
    Margins {
        left: pick(margins.left, style.margin_l),
        right: pick(margins.right, style.margin_r),
        vertical: pick(margins.vertical, style.margin_v),
    }
}

/// Resolve the font of a fragment from its base style and overrides
pub fn resolve_font(style: &Style, tag: &OverrideTag) -> FontDescriptor {
    let mut font = FontDescriptor::new(
        tag.font_name.as_deref().unwrap_or(&style.font_name),
        tag.font_size.unwrap_or(style.font_size),
    );
    font.bold = tag.bold.unwrap_or(style.bold);
    font.italic = tag.italic.unwrap_or(style.italic);
    font.underline = tag.underline.unwrap_or(style.underline);
    font.strikeout = tag.strikeout.unwrap_or(style.strikeout);

    let base = style.primary();
    let mut color = match tag.primary_colour.as_deref().map(parse_ass_color) {
        // \c only carries BGR, alpha stays with the style
        Some(Ok(c)) => Rgba::new(c.r, c.g, c.b, base.a),
        Some(Err(err)) => {
            log::warn!("ignoring colour override: {err}");
            base
        }
        None => base,
    };
    if let Some(alpha) = tag.alpha.as_deref() {
        match parse_ass_alpha(alpha) {
            Ok(alpha) => color = color.with_alpha(255 - alpha),
            Err(err) => log::warn!("ignoring alpha override: {err}"),
        }
    }
    font.color = color;
    font
}

/// Piece of fragment text after escape processing
#[derive(Debug, PartialEq)]
enum Piece {
    Text(String),
    Break,
}

/// Split fragment text on break markers and expand `\h`
fn split_pieces(text: &str, wrap_style: WrapStyle) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            current.push(ch);
            continue;
        }
        match chars.peek() {
            Some('N') => {
                chars.next();
                flush_text(&mut pieces, &mut current);
                pieces.push(Piece::Break);
            }
            Some('n') => {
                chars.next();
                if wrap_style == WrapStyle::NoWrap {
                    flush_text(&mut pieces, &mut current);
                    pieces.push(Piece::Break);
                } else {
                    current.push(' ');
                }
            }
            Some('h') => {
                chars.next();
                current.push('\u{00A0}');
            }
            _ => current.push(ch),
        }
    }
    flush_text(&mut pieces, &mut current);
    pieces
}

fn flush_text(pieces: &mut Vec<Piece>, current: &mut String) {
    if !current.is_empty() {
        pieces.push(Piece::Text(std::mem::take(current)));
    }
}

/// Split a run into words, trailing spaces stay with their word
fn split_words(text: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    let mut prev_space = false;
    let mut seen_text = false;

    for (idx, ch) in text.char_indices() {
        let is_space = ch == ' ' || ch == '\t';
        if !is_space {
            if prev_space && seen_text {
                words.push(&text[start..idx]);
                start = idx;
            }
            seen_text = true;
        }
        prev_space = is_space;
    }
    if start < text.len() {
        words.push(&text[start..]);
    }
    words
}

#[derive(Debug, Default)]
struct Line {
    words: Vec<Word>,
    width: f32,
    height: f32,
}

/// Laid out words before anchoring
struct Block {
    lines: Vec<Line>,
    size: BlockSize,
}

impl Block {
    fn into_state(self, origin: Point, canvas: Canvas) -> FrameRenderState {
        let mut state = FrameRenderState::empty(canvas.width, canvas.height);
        state.x = origin.x;
        state.y = origin.y;
        state.width = self.size.width;
        state.height = self.size.height;
        state.words = self.lines.into_iter().flat_map(|line| line.words).collect();
        state
    }
}

fn build_block(
    event: &DialogueEvent,
    styles: &StyleTable,
    env: &LayoutEnv<'_>,
    alignment: Alignment,
    margins: &Margins,
) -> Block {
    let max_width = (env.canvas.width - margins.left - margins.right).max(0.0);
    let mut lines = vec![Line::default()];
    let mut word_count = 0usize;

    for slice in &event.slices {
        let style_name = if slice.style.is_empty() {
            &event.style
        } else {
            &slice.style
        };
        let style = styles.resolve(style_name);

        for fragment in &slice.fragments {
            let font = resolve_font(style, &fragment.tag);

            for piece in split_pieces(&fragment.text, env.wrap_style) {
                let text = match piece {
                    Piece::Break => {
                        if let Some(line) = lines.last_mut() {
                            if line.words.is_empty() {
                                line.height = line.height.max(env.measurer.line_height(&font));
                            }
                        }
                        lines.push(Line::default());
                        continue;
                    }
                    Piece::Text(text) => text,
                };

                for word in split_words(&text) {
                    let metrics = env.measurer.measure(word, &font);
                    let overflow = env.wrap_style == WrapStyle::Smart
                        && lines
                            .last()
                            .is_some_and(|line| {
                                !line.words.is_empty() && line.width + metrics.width > max_width
                            });
                    if overflow {
                        lines.push(Line::default());
                    }

                    let Some(line) = lines.last_mut() else {
                        continue;
                    };
                    line.words.push(Word {
                        text: word.to_string(),
                        font: font.clone(),
                        style: style.name.clone(),
                        x: line.width,
                        y: 0.0,
                        width: metrics.width,
                        height: metrics.height,
                    });
                    line.width += metrics.width;
                    line.height = line.height.max(metrics.height);
                    word_count += 1;
                }
            }
        }
    }

    if word_count == 0 {
        return Block {
            lines: Vec::new(),
            size: BlockSize::default(),
        };
    }

    let width = lines.iter().map(|line| line.width).fold(0.0, f32::max);
    let mut top = 0.0;
    for line in &mut lines {
        let offset = line_offset(alignment, width, line.width);
        for word in &mut line.words {
            word.x += offset;
            word.y = top;
        }
        top += line.height;
    }

    Block {
        lines,
        size: BlockSize { width, height: top },
    }
}

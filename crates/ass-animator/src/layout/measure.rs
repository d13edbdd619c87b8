//! Font-backed text measurement using fontdb, rustybuzz and ttf-parser

use super::{EstimatedMeasurer, TextMeasurer, TextMetrics};
use crate::renderer::FontDescriptor;
use crate::utils::AnimatorError;
use ahash::AHashMap;
use fontdb::{Database as FontDatabase, ID as FontId};
use rustybuzz::UnicodeBuffer;
use std::cell::RefCell;

/// Font metrics in font units
#[derive(Debug, Clone, Copy)]
struct FontMetrics {
    ascender: f32,
    descender: f32,
    units_per_em: f32,
}

impl FontMetrics {
    fn from_face(face: &ttf_parser::Face<'_>) -> Self {
        Self {
            ascender: f32::from(face.ascender()),
            descender: f32::from(face.descender()),
            units_per_em: f32::from(face.units_per_em()),
        }
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct MeasureKey {
    text: String,
    family: String,
    size: u32, // Rounded to avoid float comparison issues
    bold: bool,
    italic: bool,
}

/// Measures text by shaping it with the best matching system font
///
/// Results are memoised per (text, font) pair. Text whose font cannot be
/// found or parsed is measured with [`EstimatedMeasurer`].
pub struct FontMeasurer {
    font_database: FontDatabase,
    cache: RefCell<AHashMap<MeasureKey, TextMetrics>>,
    fallback: EstimatedMeasurer,
}

impl FontMeasurer {
    /// Create a measurer over the system fonts
    pub fn new() -> Self {
        let mut font_database = FontDatabase::new();
        font_database.load_system_fonts();
        Self::with_font_database(font_database)
    }

    /// Create a measurer over a custom font database
    pub fn with_font_database(font_database: FontDatabase) -> Self {
        Self {
            font_database,
            cache: RefCell::new(AHashMap::new()),
            fallback: EstimatedMeasurer::default(),
        }
    }

    /// Get mutable font database, e.g. to register embedded fonts
    pub fn font_database_mut(&mut self) -> &mut FontDatabase {
        self.cache.get_mut().clear();
        &mut self.font_database
    }

    /// Number of memoised measurements
    pub fn cached_entries(&self) -> usize {
        self.cache.borrow().len()
    }

    fn shape(&self, text: &str, font: &FontDescriptor) -> Result<TextMetrics, AnimatorError> {
        let font_id = find_font(&self.font_database, &font.family, font.bold, font.italic)?;

        self.font_database
            .with_face_data(font_id, |data, index| {
                let face = rustybuzz::Face::from_slice(data, index)
                    .ok_or_else(|| AnimatorError::FontError("Failed to create font face".into()))?;
                let metrics = FontMetrics::from_face(&face);

                let mut buffer = UnicodeBuffer::new();
                buffer.push_str(text);
                let output = rustybuzz::shape(&face, &[], buffer);

                let scale = font.size / metrics.units_per_em.max(1.0);
                let advance: i32 = output
                    .glyph_positions()
                    .iter()
                    .map(|pos| pos.x_advance)
                    .sum();

                let ascent = metrics.ascender * scale;
                let descent = -metrics.descender * scale;
                Ok(TextMetrics {
                    width: advance as f32 * scale,
                    // libass uses the font size as line height
                    height: font.size,
                    ascent,
                    descent,
                    baseline: ascent,
                })
            })
            .ok_or_else(|| AnimatorError::FontError("Failed to load font data".into()))?
    }
}

impl Default for FontMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasurer for FontMeasurer {
    fn measure(&self, text: &str, font: &FontDescriptor) -> TextMetrics {
        let key = MeasureKey {
            text: text.to_string(),
            family: font.family.clone(),
            size: (font.size * 64.0).round() as u32,
            bold: font.bold,
            italic: font.italic,
        };
        if let Some(metrics) = self.cache.borrow().get(&key) {
            return *metrics;
        }

        let metrics = self.shape(text, font).unwrap_or_else(|err| {
            log::debug!("measuring {:?} with estimate: {err}", font.family);
            self.fallback.measure(text, font)
        });
        self.cache.borrow_mut().insert(key, metrics);
        metrics
    }
}

/// Find matching font in database, falling back to generic families
fn find_font(
    font_database: &FontDatabase,
    family: &str,
    bold: bool,
    italic: bool,
) -> Result<FontId, AnimatorError> {
    let weight = if bold {
        fontdb::Weight::BOLD
    } else {
        fontdb::Weight::NORMAL
    };
    let style = if italic {
        fontdb::Style::Italic
    } else {
        fontdb::Style::Normal
    };

    let query = fontdb::Query {
        families: &[fontdb::Family::Name(family), fontdb::Family::SansSerif],
        weight,
        stretch: fontdb::Stretch::Normal,
        style,
    };
    if let Some(id) = font_database.query(&query) {
        return Ok(id);
    }

    let final_query = fontdb::Query {
        families: &[fontdb::Family::SansSerif, fontdb::Family::Serif],
        weight,
        stretch: fontdb::Stretch::Normal,
        style,
    };
    font_database.query(&final_query).ok_or_else(|| {
        AnimatorError::FontError(format!(
            "Font '{family}' not found and no fallback available"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_database_falls_back_to_estimate() {
        let measurer = FontMeasurer::with_font_database(FontDatabase::new());
        let font = FontDescriptor::new("Nonexistent", 20.0);

        let metrics = measurer.measure("abcd", &font);
        assert_eq!(metrics.width, 40.0);
        assert_eq!(metrics.height, 20.0);
        assert_eq!(measurer.cached_entries(), 1);

        measurer.measure("abcd", &font);
        assert_eq!(measurer.cached_entries(), 1);
    }
}

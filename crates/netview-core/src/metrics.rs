//! Font metrics used to size node labels.
//!
//! Rendering toolkits plug their own text layout in through [`TextMetrics`];
//! [`HeuristicMetrics`] is the toolkit-free fallback used by headless code.

use unicode_width::UnicodeWidthStr;

use crate::font::{Font, FontFamily};
use crate::geometry::Vec2;

pub trait TextMetrics {
    /// Width and height of `text` laid out on a single line.
    fn measure(&self, font: &Font, text: &str) -> Vec2;
}

/// Estimates text extents from display width and font size.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicMetrics {
    pub advance_ratio: f32,
    pub line_height_ratio: f32,
}

impl Default for HeuristicMetrics {
    fn default() -> Self {
        Self {
            advance_ratio: 0.55,
            line_height_ratio: 1.2,
        }
    }
}

impl TextMetrics for HeuristicMetrics {
    fn measure(&self, font: &Font, text: &str) -> Vec2 {
        if text.is_empty() {
            return Vec2::ZERO;
        }
        let advance = match font.family {
            FontFamily::Monospace => 0.6,
            FontFamily::Proportional => self.advance_ratio,
        };
        let bold = if font.bold { 1.08 } else { 1.0 };
        let columns = UnicodeWidthStr::width(text) as f32;
        Vec2::new(
            columns * font.size * advance * bold,
            font.size * self.line_height_ratio,
        )
    }
}

use eframe::egui;
use netview_core::{Font, TextMetrics, Vec2};

use crate::painter::font_id;

/// Measures labels with egui's own font layout so node bounds match what is drawn.
///
/// Fonts are only available once the first frame has started.
pub struct EguiTextMetrics {
    painter: egui::Painter,
}

impl EguiTextMetrics {
    pub fn new(ctx: &egui::Context) -> Self {
        Self {
            painter: egui::Painter::new(ctx.clone(), egui::LayerId::background(), egui::Rect::EVERYTHING),
        }
    }
}

impl TextMetrics for EguiTextMetrics {
    fn measure(&self, font: &Font, text: &str) -> Vec2 {
        if text.is_empty() {
            return Vec2::ZERO;
        }
        let size = self
            .painter
            .layout_no_wrap(text.to_string(), font_id(font, 1.0), egui::Color32::WHITE)
            .size();
        Vec2::new(size.x, size.y)
    }
}

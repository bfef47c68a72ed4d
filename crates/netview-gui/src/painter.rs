//! egui backend for the scene render pipeline.

use eframe::egui::{self, Color32, emath::TSTransform};
use netview_core::{Color, Font, FontFamily, Pen, Rect, Vec2};
use netview_graph::Painter;

/// Labels smaller than this on screen are skipped.
const MIN_TEXT_PX: f32 = 3.0;
/// Arc resolution for pie sectors.
const DEGREES_PER_STEP: f32 = 6.0;

pub fn color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

pub fn font_id(font: &Font, scale: f32) -> egui::FontId {
    let family = match font.family {
        FontFamily::Proportional => egui::FontFamily::Proportional,
        FontFamily::Monospace => egui::FontFamily::Monospace,
    };
    egui::FontId::new(font.size * scale, family)
}

fn stroke(pen: Pen, scale: f32) -> egui::Stroke {
    egui::Stroke::new(pen.width * scale, color32(pen.color))
}

/// Point on the circle at `degrees`, counter-clockwise from three o'clock.
pub fn arc_point(center: egui::Pos2, radius: egui::Vec2, degrees: f32) -> egui::Pos2 {
    let theta = degrees.to_radians();
    egui::pos2(
        center.x + radius.x * theta.cos(),
        center.y - radius.y * theta.sin(),
    )
}

/// Draws scene-space commands onto an egui painter through a pan/zoom transform.
pub struct EguiPainter<'a> {
    painter: &'a egui::Painter,
    transform: TSTransform,
}

impl<'a> EguiPainter<'a> {
    pub fn new(painter: &'a egui::Painter, transform: TSTransform) -> Self {
        Self { painter, transform }
    }

    fn pos(&self, v: Vec2) -> egui::Pos2 {
        self.transform.mul_pos(egui::pos2(v.x, v.y))
    }

    fn rect(&self, rect: Rect) -> egui::Rect {
        egui::Rect::from_min_max(self.pos(rect.min), self.pos(rect.max))
    }

    fn scale(&self) -> f32 {
        self.transform.scaling
    }
}

impl Painter for EguiPainter<'_> {
    fn ellipse(&mut self, rect: Rect, fill: Color, outline: Option<Pen>) {
        let rect = self.rect(rect);
        let stroke = outline.map_or(egui::Stroke::NONE, |pen| stroke(pen, self.scale()));
        if (rect.width() - rect.height()).abs() < 0.5 {
            self.painter
                .circle(rect.center(), rect.width() / 2.0, color32(fill), stroke);
        } else {
            self.painter.add(egui::Shape::Ellipse(egui::epaint::EllipseShape {
                center: rect.center(),
                radius: rect.size() / 2.0,
                fill: color32(fill),
                stroke,
            }));
        }
    }

    fn pie(&mut self, rect: Rect, start: f32, span: f32, fill: Color, outline: Option<Pen>) {
        let rect = self.rect(rect);
        let center = rect.center();
        let radius = rect.size() / 2.0;
        let steps = ((span.abs() / DEGREES_PER_STEP).ceil() as usize).max(2);

        let mut rim = Vec::with_capacity(steps + 1);
        for step in 0..=steps {
            rim.push(arc_point(center, radius, start + span * step as f32 / steps as f32));
        }

        // Sectors wider than 180 degrees are not convex, so fan out from the center.
        let fill = color32(fill);
        let mut mesh = egui::Mesh::default();
        mesh.colored_vertex(center, fill);
        for point in &rim {
            mesh.colored_vertex(*point, fill);
        }
        for i in 1..=steps as u32 {
            mesh.add_triangle(0, i, i + 1);
        }
        self.painter.add(egui::Shape::mesh(mesh));

        if let Some(pen) = outline {
            let mut outline_points = Vec::with_capacity(rim.len() + 1);
            outline_points.push(center);
            outline_points.extend(rim);
            self.painter
                .add(egui::Shape::closed_line(outline_points, stroke(pen, self.scale())));
        }
    }

    fn text(&mut self, rect: Rect, text: &str, font: &Font, color: Color) {
        if text.is_empty() || font.size * self.scale() < MIN_TEXT_PX {
            return;
        }
        self.painter.text(
            self.rect(rect).center(),
            egui::Align2::CENTER_CENTER,
            text,
            font_id(font, self.scale()),
            color32(color),
        );
    }

    fn line(&mut self, from: Vec2, to: Vec2, pen: Pen) {
        self.painter
            .line_segment([self.pos(from), self.pos(to)], stroke(pen, self.scale()));
    }
}

//! Toolkit-independent render pipeline for nodes and edges.
//!
//! Angles are in degrees, zero at three o'clock, increasing counter-clockwise.

use netview_core::{Color, Font, Pen, Rect, STATE_SELECTED, Vec2};
use serde::{Deserialize, Serialize};

use crate::node::Node;
use crate::style::StyleProvider;

/// Drawing capability a rendering backend provides.
pub trait Painter {
    fn ellipse(&mut self, rect: Rect, fill: Color, outline: Option<Pen>);
    fn pie(&mut self, rect: Rect, start: f32, span: f32, fill: Color, outline: Option<Pen>);
    /// Single line of text centered in `rect`.
    fn text(&mut self, rect: Rect, text: &str, font: &Font, color: Color);
    fn line(&mut self, from: Vec2, to: Vec2, pen: Pen);
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Overlay is drawn only above this level of detail.
    pub overlay_min_lod: f32,
    /// Labels are drawn only above this level of detail.
    pub label_min_lod: f32,
    /// Overlay radius relative to the node radius.
    pub overlay_inner_ratio: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            overlay_min_lod: 0.1,
            label_min_lod: 0.4,
            overlay_inner_ratio: 0.85,
        }
    }
}

impl RenderSettings {
    pub fn gate(&self, lod: f32) -> LodGate {
        LodGate {
            overlay: lod > self.overlay_min_lod,
            label: lod > self.label_min_lod,
        }
    }
}

/// Which optional layers a level of detail enables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LodGate {
    pub overlay: bool,
    pub label: bool,
}

/// Per-node, per-frame options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintOption {
    pub selected: bool,
    pub lod: f32,
}

/// Scene-level settings handed to every paint call.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub style: &'a dyn StyleProvider,
    pub overlay_visible: bool,
    pub overlay_palette: &'a [Color],
    pub settings: &'a RenderSettings,
}

impl RenderContext<'_> {
    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn overlay_palette(&self) -> &[Color] {
        self.overlay_palette
    }
}

struct Appearance {
    fill: Color,
    outline: Pen,
    text: Color,
}

fn resolve_appearance(node: &Node, selected: bool, style: &dyn StyleProvider) -> Appearance {
    let own = Appearance {
        fill: node.fill(),
        outline: node.outline(),
        text: node.text_color(),
    };
    if !selected {
        return own;
    }
    match style.state_fill(STATE_SELECTED) {
        Some(fill) => Appearance {
            fill,
            outline: style.state_outline(STATE_SELECTED).unwrap_or(own.outline),
            text: style.state_text_color(STATE_SELECTED).unwrap_or(own.text),
        },
        None => own,
    }
}

pub fn paint_node<P: Painter + ?Sized>(
    node: &Node,
    option: &PaintOption,
    ctx: &RenderContext<'_>,
    painter: &mut P,
) {
    let appearance = resolve_appearance(node, option.selected, ctx.style);
    let rect = node.rect();
    let sweep = node.sweep();

    if sweep.is_full_circle() {
        painter.ellipse(rect, appearance.fill, Some(appearance.outline));
    } else {
        painter.pie(
            rect,
            sweep.start,
            sweep.span,
            appearance.fill,
            Some(appearance.outline),
        );
    }

    let gate = ctx.settings.gate(option.lod);
    let palette = ctx.overlay_palette();
    if ctx.overlay_visible() && gate.overlay && !node.segments().is_empty() && !palette.is_empty()
    {
        let inner = node.radius() * ctx.settings.overlay_inner_ratio;
        let overlay_rect = Rect::from_center_size(rect.center(), Vec2::new(inner * 2.0, inner * 2.0));
        for (i, (start, span)) in node.segments().sweeps().enumerate() {
            painter.pie(overlay_rect, start, span, palette[i % palette.len()], None);
        }
    }

    if gate.label {
        painter.text(
            node.bounding_rect(),
            node.label(),
            node.font(),
            appearance.text,
        );
    }
}

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Ellipse {
        rect: Rect,
        fill: Color,
        outline: Option<Pen>,
    },
    Pie {
        rect: Rect,
        start: f32,
        span: f32,
        fill: Color,
        outline: Option<Pen>,
    },
    Text {
        rect: Rect,
        text: String,
        font: Font,
        color: Color,
    },
    Line {
        from: Vec2,
        to: Vec2,
        pen: Pen,
    },
}

impl DrawCommand {
    pub fn kind(&self) -> &'static str {
        match self {
            DrawCommand::Ellipse { .. } => "ellipse",
            DrawCommand::Pie { .. } => "pie",
            DrawCommand::Text { .. } => "text",
            DrawCommand::Line { .. } => "line",
        }
    }
}

/// Painter that records commands for later replay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    pub commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Replay every command, shifted by `offset`.
    pub fn replay<P: Painter + ?Sized>(&self, painter: &mut P, offset: Vec2) {
        for command in &self.commands {
            match command {
                DrawCommand::Ellipse {
                    rect,
                    fill,
                    outline,
                } => painter.ellipse(rect.translate(offset), *fill, *outline),
                DrawCommand::Pie {
                    rect,
                    start,
                    span,
                    fill,
                    outline,
                } => painter.pie(rect.translate(offset), *start, *span, *fill, *outline),
                DrawCommand::Text {
                    rect,
                    text,
                    font,
                    color,
                } => painter.text(rect.translate(offset), text, font, *color),
                DrawCommand::Line { from, to, pen } => {
                    painter.line(*from + offset, *to + offset, *pen)
                }
            }
        }
    }
}

impl Painter for DisplayList {
    fn ellipse(&mut self, rect: Rect, fill: Color, outline: Option<Pen>) {
        self.commands.push(DrawCommand::Ellipse {
            rect,
            fill,
            outline,
        });
    }

    fn pie(&mut self, rect: Rect, start: f32, span: f32, fill: Color, outline: Option<Pen>) {
        self.commands.push(DrawCommand::Pie {
            rect,
            start,
            span,
            fill,
            outline,
        });
    }

    fn text(&mut self, rect: Rect, text: &str, font: &Font, color: Color) {
        self.commands.push(DrawCommand::Text {
            rect,
            text: text.to_string(),
            font: font.clone(),
            color,
        });
    }

    fn line(&mut self, from: Vec2, to: Vec2, pen: Pen) {
        self.commands.push(DrawCommand::Line { from, to, pen });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{COLOR_SELECTED_FILL, COLOR_SELECTED_TEXT, NetworkStyle, PIE_COLORS};
    use netview_core::NodeId;

    fn render(node: &Node, style: &NetworkStyle, selected: bool, lod: f32, overlay: bool) -> DisplayList {
        let settings = RenderSettings::default();
        let ctx = RenderContext {
            style,
            overlay_visible: overlay,
            overlay_palette: &PIE_COLORS,
            settings: &settings,
        };
        let mut list = DisplayList::new();
        node.paint(&PaintOption { selected, lod }, &ctx, &mut list);
        list
    }

    fn kinds(list: &DisplayList) -> Vec<&'static str> {
        list.commands.iter().map(DrawCommand::kind).collect()
    }

    #[test]
    fn test_lod_gates_overlay_then_label() {
        let mut node = Node::new(NodeId(0), None);
        node.set_segments(&[1.0, 3.0]);
        let style = NetworkStyle::bright();

        assert_eq!(kinds(&render(&node, &style, false, 0.05, true)), vec!["ellipse"]);
        assert_eq!(
            kinds(&render(&node, &style, false, 0.2, true)),
            vec!["ellipse", "pie", "pie"]
        );
        assert_eq!(
            kinds(&render(&node, &style, false, 1.0, true)),
            vec!["ellipse", "pie", "pie", "text"]
        );
        assert_eq!(
            kinds(&render(&node, &style, false, 1.0, false)),
            vec!["ellipse", "text"]
        );
    }

    #[test]
    fn test_overlay_sectors_follow_segments() {
        let mut node = Node::new(NodeId(0), None);
        node.set_radius(20.0);
        node.set_segments(&[1.0, 1.0, 2.0]);
        let list = render(&node, &NetworkStyle::bright(), false, 0.3, true);

        let pies: Vec<_> = list
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Pie {
                    rect,
                    start,
                    span,
                    fill,
                    outline,
                } => Some((*rect, *start, *span, *fill, *outline)),
                _ => None,
            })
            .collect();
        assert_eq!(pies.len(), 3);
        assert_eq!((pies[0].1, pies[0].2), (0.0, 90.0));
        assert_eq!((pies[1].1, pies[1].2), (90.0, 90.0));
        assert_eq!((pies[2].1, pies[2].2), (180.0, 180.0));
        assert_eq!(pies[2].3, PIE_COLORS[2]);
        assert!(pies.iter().all(|p| p.4.is_none()));
        assert!((pies[0].0.width() - 34.0).abs() < 1e-4);
    }

    #[test]
    fn test_palette_shorter_than_segments_cycles() {
        let mut node = Node::new(NodeId(0), None);
        node.set_segments(&[1.0, 1.0, 1.0]);
        let settings = RenderSettings::default();
        let palette = [Color::rgb(1, 1, 1), Color::rgb(2, 2, 2)];
        let style = NetworkStyle::bright();
        let ctx = RenderContext {
            style: &style,
            overlay_visible: true,
            overlay_palette: &palette,
            settings: &settings,
        };
        let mut list = DisplayList::new();
        node.paint(&PaintOption { selected: false, lod: 0.3 }, &ctx, &mut list);
        let fills: Vec<_> = list
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Pie { fill, .. } => Some(*fill),
                _ => None,
            })
            .collect();
        assert_eq!(fills, vec![palette[0], palette[1], palette[0]]);
    }

    #[test]
    fn test_selected_uses_style_state() {
        let node = Node::new(NodeId(0), None);
        let style = NetworkStyle::bright();
        let list = render(&node, &style, true, 1.0, true);
        match &list.commands[0] {
            DrawCommand::Ellipse { fill, outline, .. } => {
                assert_eq!(*fill, COLOR_SELECTED_FILL);
                assert_eq!(*outline, style.state_outline(STATE_SELECTED));
            }
            other => panic!("Expected ellipse, got {:?}", other),
        }
        match list.commands.last() {
            Some(DrawCommand::Text { color, .. }) => assert_eq!(*color, COLOR_SELECTED_TEXT),
            other => panic!("Expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_selected_without_state_falls_back_to_node() {
        let mut node = Node::new(NodeId(0), None);
        node.set_fill(Color::rgb(20, 20, 120));
        let list = render(&node, &NetworkStyle::print(), true, 1.0, true);
        assert_eq!(
            list.commands[0],
            DrawCommand::Ellipse {
                rect: node.rect(),
                fill: node.fill(),
                outline: Some(node.outline()),
            }
        );
        match list.commands.last() {
            Some(DrawCommand::Text { color, .. }) => assert_eq!(*color, Color::WHITE),
            other => panic!("Expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_selected_fill_only_keeps_node_outline_and_text() {
        let mut style = NetworkStyle::bright();
        style.states.insert(
            STATE_SELECTED.to_string(),
            crate::style::StateStyle {
                fill: Some(COLOR_SELECTED_FILL),
                outline: None,
                text: None,
            },
        );
        let mut node = Node::new(NodeId(0), None);
        node.set_outline(Pen::new(Color::rgb(0, 90, 0), 3.0));
        let list = render(&node, &style, true, 1.0, true);
        match &list.commands[0] {
            DrawCommand::Ellipse { fill, outline, .. } => {
                assert_eq!(*fill, COLOR_SELECTED_FILL);
                assert_eq!(*outline, Some(node.outline()));
            }
            other => panic!("Expected ellipse, got {:?}", other),
        }
        match list.commands.last() {
            Some(DrawCommand::Text { color, .. }) => assert_eq!(*color, node.text_color()),
            other => panic!("Expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_sweep_draws_pie_body() {
        let mut node = Node::new(NodeId(0), None);
        node.set_sweep(45.0, 270.0);
        let list = render(&node, &NetworkStyle::bright(), false, 0.0, false);
        assert!(matches!(
            list.commands[0],
            DrawCommand::Pie { start, span, .. } if start == 45.0 && span == 270.0
        ));
    }

    #[test]
    fn test_label_centered_in_bounding_rect() {
        let node = Node::new(NodeId(0), Some("a wide label".into()));
        let list = render(&node, &NetworkStyle::bright(), false, 1.0, false);
        match list.commands.last() {
            Some(DrawCommand::Text { rect, text, .. }) => {
                assert_eq!(*rect, node.bounding_rect());
                assert_eq!(text, "a wide label");
            }
            other => panic!("Expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_replay_applies_offset() {
        let mut list = DisplayList::new();
        list.line(Vec2::ZERO, Vec2::new(1.0, 0.0), Pen::default());
        list.ellipse(Rect::NOTHING, Color::WHITE, None);
        let mut moved = DisplayList::new();
        list.replay(&mut moved, Vec2::new(5.0, 5.0));
        assert_eq!(
            moved.commands[0],
            DrawCommand::Line {
                from: Vec2::new(5.0, 5.0),
                to: Vec2::new(6.0, 5.0),
                pen: Pen::default(),
            }
        );
        assert!(matches!(moved.commands[1], DrawCommand::Ellipse { rect, .. } if rect.min == Vec2::new(5.0, 5.0)));
    }
}

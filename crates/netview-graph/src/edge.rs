use netview_core::{EdgeId, NodeId, Pen, Rect, STATE_SELECTED, Vec2};
use tracing::trace;

use crate::node::Node;
use crate::render::Painter;
use crate::style::StyleProvider;

/// Straight connection between two nodes, trimmed to their circular bodies.
#[derive(Debug, Clone)]
pub struct Edge {
    id: EdgeId,
    source: NodeId,
    target: NodeId,
    width: f32,
    pen: Pen,
    /// Theme pen for the selected state, already scaled by `width`.
    selected_pen: Option<Pen>,
    line: Option<(Vec2, Vec2)>,
    adjust_count: u64,
    selected: bool,
    visible: bool,
}

impl Edge {
    pub fn new(id: EdgeId, source: NodeId, target: NodeId, width: f32) -> Self {
        let width = if width.is_finite() && width > 0.0 { width } else { 1.0 };
        Self {
            id,
            source,
            target,
            width,
            pen: Pen::default(),
            selected_pen: None,
            line: None,
            adjust_count: 0,
            selected: false,
            visible: true,
        }
    }

    pub fn index(&self) -> EdgeId {
        self.id
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn pen(&self) -> Pen {
        self.pen
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }

    /// Pen used for drawing, following the selection state.
    pub fn current_pen(&self) -> Pen {
        match self.selected_pen {
            Some(pen) if self.selected => pen,
            _ => self.pen,
        }
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Theme color with this edge's own width.
    ///
    /// A theme `"selected"` outline, when present, colors the edge while it
    /// is selected.
    pub fn apply_style(&mut self, style: &dyn StyleProvider) {
        let pen = style.edge_pen();
        self.pen = Pen::new(pen.color, pen.width * self.width);
        self.selected_pen = style
            .state_outline(STATE_SELECTED)
            .map(|selected| Pen::new(selected.color, pen.width.max(selected.width) * self.width));
    }

    /// Recompute the visible segment from the endpoints' current geometry.
    ///
    /// The segment runs between the two circle borders; overlapping nodes
    /// leave nothing to draw.
    pub fn adjust(&mut self, source: &Node, target: &Node) {
        self.adjust_count += 1;
        let from = source.pos();
        let to = target.pos();
        let delta = to - from;
        let length = delta.length();
        let reach = source.radius() + target.radius();

        self.line = if length > reach {
            let dir = delta.normalized();
            Some((from + dir * source.radius(), to - dir * target.radius()))
        } else {
            None
        };
        trace!(edge = %self.id, visible = self.line.is_some(), "Adjusted edge");
    }

    pub fn line(&self) -> Option<(Vec2, Vec2)> {
        self.line
    }

    /// Number of `adjust` calls so far.
    pub fn adjust_count(&self) -> u64 {
        self.adjust_count
    }

    pub fn bounding_rect(&self) -> Rect {
        match self.line {
            Some((a, b)) => Rect::from_min_max(
                Vec2::new(a.x.min(b.x), a.y.min(b.y)),
                Vec2::new(a.x.max(b.x), a.y.max(b.y)),
            )
            .expand(self.current_pen().width / 2.0),
            None => Rect::NOTHING,
        }
    }

    /// Distance from `point` to the drawn segment, `None` when nothing is drawn.
    pub fn distance_to(&self, point: Vec2) -> Option<f32> {
        let (a, b) = self.line?;
        Some(segment_distance(point, a, b))
    }

    /// Whether `point` lies on the stroke, widened by `tolerance`.
    pub fn contains(&self, point: Vec2, tolerance: f32) -> bool {
        let reach = tolerance.max(0.0) + self.current_pen().width / 2.0;
        self.distance_to(point).is_some_and(|distance| distance <= reach)
    }

    pub fn paint<P: Painter + ?Sized>(&self, painter: &mut P) {
        if let Some((from, to)) = self.line {
            painter.line(from, to, self.current_pen());
        }
    }
}

fn segment_distance(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let ap = point - a;
    let length_sq = ab.x * ab.x + ab.y * ab.y;
    if length_sq <= f32::EPSILON {
        return ap.length();
    }
    let t = ((ap.x * ab.x + ap.y * ab.y) / length_sq).clamp(0.0, 1.0);
    (point - (a + ab * t)).length()
}

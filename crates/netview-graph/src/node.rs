//! Network node: geometry, label, colors, pie overlay and incident edges.
//!
//! A [`Node`] only holds state. Drawing goes through [`crate::render`], and
//! edges are referenced by handle and adjusted by the owning scene.

use netview_core::{
    Color, EdgeId, Font, HeuristicMetrics, NodeId, Pen, Rect, TextMetrics, Vec2,
};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::adjacency::Adjacency;
use crate::overlay::Segments;
use crate::render::{self, PaintOption, Painter, RenderContext};
use crate::shape::NodeShape;
use crate::style::StyleProvider;

pub const DEFAULT_RADIUS: f32 = 10.0;

/// Font metrics shared by every node of a scene.
pub type SharedMetrics = Arc<dyn TextMetrics + Send + Sync>;

/// Angular extent of the node body, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    pub start: f32,
    pub span: f32,
}

impl Sweep {
    pub const FULL: Sweep = Sweep {
        start: 0.0,
        span: 360.0,
    };

    pub fn is_full_circle(&self) -> bool {
        self.span != 0.0 && (self.span % 360.0).abs() < 1e-3
    }
}

impl Default for Sweep {
    fn default() -> Self {
        Self::FULL
    }
}

/// Changes the host scene must act on.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Invalidation {
    /// Local bounding rectangle before the first pending shape change.
    pub geometry: Option<Rect>,
    pub redraw: bool,
    /// Cached renderings of this node must be discarded.
    pub cache: bool,
}

impl Invalidation {
    pub fn is_clean(&self) -> bool {
        self.geometry.is_none() && !self.redraw && !self.cache
    }
}

/// Notifications raised by the hosting scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemChange {
    /// The node's scene position has been committed.
    ScenePositionHasChanged,
    SelectedChange(bool),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeResponse {
    /// Incident edges that must recompute their geometry.
    pub adjust_edges: Vec<EdgeId>,
    pub invalidate_cache: bool,
}

#[derive(Clone)]
pub struct Node {
    id: NodeId,
    label: String,
    rect: Rect,
    sweep: Sweep,
    pos: Vec2,
    z_value: f32,
    selected: bool,
    visible: bool,
    /// Left out of the layout: not painted, hit, selected or dragged.
    isolated: bool,
    fill: Color,
    outline: Pen,
    text_color: Color,
    font: Font,
    label_rect: Rect,
    segments: Segments,
    edges: Adjacency,
    metrics: SharedMetrics,
    revision: u64,
    pending: Invalidation,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("pos", &self.pos)
            .field("radius", &self.radius())
            .field("selected", &self.selected)
            .field("visible", &self.visible)
            .field("isolated", &self.isolated)
            .field("fill", &self.fill)
            .field("segments", &self.segments)
            .field("edges", &self.edges.len())
            .finish_non_exhaustive()
    }
}

impl Node {
    /// Create a node measured with [`HeuristicMetrics`].
    ///
    /// Without a label the node shows its one-based index.
    pub fn new(id: NodeId, label: Option<String>) -> Self {
        Self::with_metrics(id, label, Arc::new(HeuristicMetrics::default()))
    }

    pub fn with_metrics(id: NodeId, label: Option<String>, metrics: SharedMetrics) -> Self {
        let fill = Color::LIGHT_GRAY;
        let mut node = Self {
            id,
            label: String::new(),
            rect: circle_rect(DEFAULT_RADIUS),
            sweep: Sweep::FULL,
            pos: Vec2::ZERO,
            z_value: 0.0,
            selected: false,
            visible: true,
            isolated: false,
            fill,
            outline: Pen::new(Color::BLACK, 1.0),
            text_color: fill.contrasting_text(),
            font: Font::default(),
            label_rect: Rect::NOTHING,
            segments: Segments::default(),
            edges: Adjacency::default(),
            metrics,
            revision: 0,
            pending: Invalidation::default(),
        };
        node.set_label(label.unwrap_or_else(|| default_label(id)));
        node.pending = Invalidation::default();
        node
    }

    pub fn index(&self) -> NodeId {
        self.id
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    pub fn radius(&self) -> f32 {
        self.rect.width() / 2.0
    }

    /// Replace the circular extent. Zero is allowed and renders as a point.
    pub fn set_radius(&mut self, radius: f32) {
        let radius = radius.max(0.0);
        self.prepare_geometry_change();
        self.rect = circle_rect(radius);
        self.touch();
    }

    /// Circular extent in local coordinates.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn sweep(&self) -> Sweep {
        self.sweep
    }

    /// Draw the body as a pie sector instead of a full circle.
    pub fn set_sweep(&mut self, start: f32, span: f32) {
        self.sweep = Sweep { start, span };
        self.touch();
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    /// Move without notifying edges; the scene raises the position change.
    pub(crate) fn set_pos(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    pub fn z_value(&self) -> f32 {
        self.z_value
    }

    pub fn label_rect(&self) -> Rect {
        self.label_rect
    }

    /// Shape in local coordinates, used for hit testing.
    pub fn shape(&self) -> NodeShape {
        NodeShape {
            center: self.rect.center(),
            radius: self.radius() + self.outline.width / 2.0,
            label: self.label_rect,
        }
    }

    /// Local rectangle covering everything the node paints.
    pub fn bounding_rect(&self) -> Rect {
        self.rect
            .expand(self.outline.width / 2.0)
            .union(&self.label_rect)
    }

    pub fn scene_bounding_rect(&self) -> Rect {
        self.bounding_rect().translate(self.pos)
    }

    /// Record the current bounds before they change.
    fn prepare_geometry_change(&mut self) {
        if self.pending.geometry.is_none() {
            self.pending.geometry = Some(self.bounding_rect());
        }
        self.pending.redraw = true;
    }

    fn invalidate_shape(&mut self) {
        self.prepare_geometry_change();
        self.touch();
    }

    fn update_label_rect(&mut self) {
        self.prepare_geometry_change();
        let size = self.metrics.measure(&self.font, &self.label);
        self.label_rect = Rect::from_center_size(Vec2::ZERO, size);
        self.touch();
    }

    // ------------------------------------------------------------------
    // Label and appearance
    // ------------------------------------------------------------------

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
        self.update_label_rect();
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn set_font(&mut self, font: Font) {
        self.font = font;
        self.update_label_rect();
    }

    pub fn set_metrics(&mut self, metrics: SharedMetrics) {
        self.metrics = metrics;
        self.update_label_rect();
    }

    pub fn fill(&self) -> Color {
        self.fill
    }

    /// Set the fill and derive a readable text color from it.
    pub fn set_fill(&mut self, color: Color) {
        self.set_fill_color(color, true);
    }

    pub fn set_fill_color(&mut self, color: Color, auto_text_color: bool) {
        self.fill = color;
        if auto_text_color {
            self.text_color = color.contrasting_text();
        }
        self.touch();
    }

    pub fn outline(&self) -> Pen {
        self.outline
    }

    pub fn set_outline(&mut self, pen: Pen) {
        self.prepare_geometry_change();
        self.outline = pen;
        self.touch();
    }

    pub fn text_color(&self) -> Color {
        self.text_color
    }

    pub fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
        self.touch();
    }

    /// Adopt a new theme.
    ///
    /// Fill and text color follow the theme only while the fill still equals
    /// the previous theme's default; a customized fill is kept. Outline and
    /// font always follow.
    pub fn apply_style(&mut self, style: &dyn StyleProvider, previous: Option<&dyn StyleProvider>) {
        let customized = previous.is_some_and(|old| self.fill != old.node_fill());
        if !customized {
            self.set_fill_color(style.node_fill(), false);
            self.set_text_color(style.node_text_color());
        }
        self.set_outline(style.node_outline());
        self.set_font(style.node_font());
        self.invalidate_shape();
        debug!(
            node = %self.id,
            style = style.name(),
            kept_fill = customized,
            "Applied style"
        );
    }

    // ------------------------------------------------------------------
    // Overlay
    // ------------------------------------------------------------------

    pub fn segments(&self) -> &Segments {
        &self.segments
    }

    pub fn set_segments(&mut self, values: &[f32]) {
        self.segments = Segments::normalized(values);
        self.touch();
    }

    // ------------------------------------------------------------------
    // Adjacency
    // ------------------------------------------------------------------

    /// Unordered snapshot of incident edges.
    pub fn edges(&self) -> Vec<EdgeId> {
        self.edges.snapshot()
    }

    pub fn has_edge(&self, edge: EdgeId) -> bool {
        self.edges.contains(edge)
    }

    pub fn attach_edge(&mut self, edge: EdgeId) {
        self.edges.attach(edge);
    }

    pub fn detach_edge(&mut self, edge: EdgeId) {
        self.edges.detach(edge);
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Hidden nodes keep their state but are neither painted nor hit.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.pending.redraw = true;
        }
    }

    pub fn is_isolated(&self) -> bool {
        self.isolated
    }

    pub(crate) fn set_isolated(&mut self, isolated: bool) {
        if self.isolated != isolated {
            self.isolated = isolated;
            self.pending.redraw = true;
        }
    }

    /// Whether the node is painted, hit tested and counted in scene bounds.
    pub fn has_contents(&self) -> bool {
        self.visible && !self.isolated
    }

    /// React to a scene notification.
    pub fn item_change(&mut self, change: ItemChange) -> ChangeResponse {
        match change {
            ItemChange::ScenePositionHasChanged => ChangeResponse {
                adjust_edges: self.edges.snapshot(),
                invalidate_cache: false,
            },
            ItemChange::SelectedChange(selected) => {
                self.selected = selected;
                // Selected nodes stack above the rest.
                self.z_value = if selected { 1.0 } else { 0.0 };
                self.pending.cache = true;
                self.pending.redraw = true;
                ChangeResponse {
                    adjust_edges: Vec::new(),
                    invalidate_cache: true,
                }
            }
        }
    }

    pub fn mouse_press(&mut self) {
        self.update();
    }

    pub fn mouse_release(&mut self) {
        self.update();
    }

    /// Request a redraw without changing state.
    pub fn update(&mut self) {
        self.pending.redraw = true;
    }

    /// Bumped by every change that alters the rendered output.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn pending(&self) -> &Invalidation {
        &self.pending
    }

    pub fn take_invalidation(&mut self) -> Invalidation {
        std::mem::take(&mut self.pending)
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.pending.redraw = true;
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    pub fn paint<P: Painter + ?Sized>(
        &self,
        option: &PaintOption,
        ctx: &RenderContext<'_>,
        painter: &mut P,
    ) {
        render::paint_node(self, option, ctx, painter);
    }
}

/// One-based index shown when a node has no label of its own.
pub fn default_label(id: NodeId) -> String {
    (i128::from(id.0) + 1).to_string()
}

fn circle_rect(radius: f32) -> Rect {
    Rect::from_center_size(Vec2::ZERO, Vec2::new(radius * 2.0, radius * 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::NetworkStyle;

    #[test]
    fn test_default_label_is_one_based_index() {
        assert_eq!(Node::new(NodeId(0), None).label(), "1");
        assert_eq!(Node::new(NodeId(41), None).label(), "42");
        assert_eq!(Node::new(NodeId(0), Some("hub".into())).label(), "hub");
    }

    #[test]
    fn test_default_label_at_id_limits() {
        assert_eq!(Node::new(NodeId(i64::MAX), None).label(), "9223372036854775808");
        assert_eq!(Node::new(NodeId(i64::MIN), None).label(), "-9223372036854775807");
        assert_eq!(default_label(NodeId(-1)), "0");
    }

    #[test]
    fn test_new_node_is_clean() {
        let node = Node::new(NodeId(3), None);
        assert!(node.pending().is_clean());
        assert_eq!(node.radius(), DEFAULT_RADIUS);
        assert_eq!(node.fill(), Color::LIGHT_GRAY);
        assert_eq!(node.text_color(), Color::BLACK);
        assert!(node.sweep().is_full_circle());
    }

    #[test]
    fn test_label_rect_tracks_label_and_font() {
        let metrics = HeuristicMetrics::default();
        let mut node = Node::new(NodeId(0), None);

        node.set_label("a longer label");
        let expected = metrics.measure(node.font(), "a longer label");
        assert_eq!(node.label_rect().size(), expected);
        assert_eq!(node.label_rect().center(), Vec2::ZERO);

        node.set_font(Font::monospace(20.0));
        let expected = metrics.measure(&Font::monospace(20.0), "a longer label");
        assert_eq!(node.label_rect().size(), expected);
    }

    #[test]
    fn test_empty_label_has_zero_rect() {
        let mut node = Node::new(NodeId(0), None);
        node.set_label("");
        assert_eq!(node.label_rect(), Rect::NOTHING);
        assert_eq!(node.bounding_rect(), node.rect().expand(0.5));
    }

    #[test]
    fn test_geometry_change_records_old_bounds_first() {
        let mut node = Node::new(NodeId(0), Some(String::new()));
        let before = node.bounding_rect();
        node.set_radius(30.0);
        node.set_radius(40.0);
        let invalidation = node.take_invalidation();
        assert_eq!(invalidation.geometry, Some(before));
        assert!(invalidation.redraw);
        assert!(node.pending().is_clean());
        assert_eq!(node.radius(), 40.0);
    }

    #[test]
    fn test_set_radius_replaces_extent() {
        let mut node = Node::new(NodeId(0), None);
        node.set_radius(5.0);
        node.set_radius(3.0);
        assert_eq!(node.radius(), 3.0);
        node.set_radius(0.0);
        assert_eq!(node.radius(), 0.0);
    }

    #[test]
    fn test_fill_derives_text_color() {
        let mut node = Node::new(NodeId(0), None);
        node.set_fill(Color::BLACK);
        assert_eq!(node.text_color(), Color::WHITE);
        node.set_fill(Color::WHITE);
        assert_eq!(node.text_color(), Color::BLACK);
        node.set_fill(Color::rgba(0, 0, 0, 50));
        assert_eq!(node.text_color(), Color::BLACK);

        node.set_text_color(Color::rgb(1, 2, 3));
        node.set_fill_color(Color::BLACK, false);
        assert_eq!(node.text_color(), Color::rgb(1, 2, 3));
    }

    #[test]
    fn test_apply_style_without_previous_adopts_everything() {
        let dark = NetworkStyle::dark();
        let mut node = Node::new(NodeId(0), None);
        node.set_fill(Color::rgb(10, 200, 10));
        node.apply_style(&dark, None);
        assert_eq!(node.fill(), dark.node.fill);
        assert_eq!(node.text_color(), dark.node.text);
        assert_eq!(node.outline(), dark.node.outline);
        assert_eq!(node.font(), &dark.node.font);
    }

    #[test]
    fn test_apply_style_preserves_customized_fill() {
        let bright = NetworkStyle::bright();
        let dark = NetworkStyle::dark();

        let mut themed = Node::new(NodeId(0), None);
        themed.apply_style(&bright, None);
        themed.apply_style(&dark, Some(&bright));
        assert_eq!(themed.fill(), dark.node.fill);
        assert_eq!(themed.text_color(), dark.node.text);

        let custom = Color::rgb(200, 10, 10);
        let mut customized = Node::new(NodeId(1), None);
        customized.apply_style(&bright, None);
        customized.set_fill(custom);
        let text = customized.text_color();
        customized.apply_style(&dark, Some(&bright));
        assert_eq!(customized.fill(), custom);
        assert_eq!(customized.text_color(), text);
        assert_eq!(customized.outline(), dark.node.outline);
        assert_eq!(customized.font(), &dark.node.font);
    }

    #[test]
    fn test_apply_style_refreshes_label_geometry() {
        let mut style = NetworkStyle::bright();
        style.node.font = Font::proportional(30.0);
        let mut node = Node::new(NodeId(0), Some("label".into()));
        let before = node.label_rect();
        node.take_invalidation();
        node.apply_style(&style, None);
        assert!(node.label_rect().width() > before.width());
        assert!(node.pending().geometry.is_some());
    }

    #[test]
    fn test_selection_change_does_not_touch_colors() {
        let mut node = Node::new(NodeId(0), None);
        node.set_fill(Color::rgb(12, 34, 56));
        let (fill, text, revision) = (node.fill(), node.text_color(), node.revision());

        let response = node.item_change(ItemChange::SelectedChange(true));
        assert!(response.invalidate_cache);
        assert!(node.is_selected());
        assert_eq!(node.z_value(), 1.0);

        node.item_change(ItemChange::SelectedChange(false));
        assert_eq!(node.z_value(), 0.0);
        assert_eq!(node.fill(), fill);
        assert_eq!(node.text_color(), text);
        assert_eq!(node.revision(), revision);
        assert!(node.take_invalidation().cache);
    }

    #[test]
    fn test_position_change_lists_incident_edges() {
        let mut node = Node::new(NodeId(0), None);
        node.attach_edge(EdgeId(1));
        node.attach_edge(EdgeId(2));
        node.attach_edge(EdgeId(1));
        let mut edges = node
            .item_change(ItemChange::ScenePositionHasChanged)
            .adjust_edges;
        edges.sort();
        assert_eq!(edges, vec![EdgeId(1), EdgeId(2)]);

        node.detach_edge(EdgeId(1));
        node.detach_edge(EdgeId(9));
        assert_eq!(node.edges(), vec![EdgeId(2)]);
    }

    #[test]
    fn test_visibility_flags() {
        let mut node = Node::new(NodeId(0), None);
        assert!(node.has_contents());
        let revision = node.revision();

        node.set_visible(false);
        assert!(!node.has_contents());
        assert!(node.pending().redraw);
        assert_eq!(node.revision(), revision);

        node.set_visible(true);
        node.set_isolated(true);
        assert!(node.is_visible() && !node.has_contents());
        node.set_isolated(false);
        assert!(node.has_contents());
    }

    #[test]
    fn test_mouse_events_only_request_redraw() {
        let mut node = Node::new(NodeId(0), None);
        let revision = node.revision();
        node.mouse_press();
        node.mouse_release();
        assert_eq!(node.revision(), revision);
        let invalidation = node.take_invalidation();
        assert!(invalidation.redraw);
        assert!(invalidation.geometry.is_none());
        assert!(!invalidation.cache);
    }

    #[test]
    fn test_segments_do_not_change_geometry() {
        let mut node = Node::new(NodeId(0), None);
        node.set_segments(&[1.0, 1.0, 2.0]);
        assert_eq!(node.segments().values(), &[0.25, 0.25, 0.5]);
        assert!(node.pending().geometry.is_none());
        assert!(node.pending().redraw);
    }

    #[test]
    fn test_partial_sweep() {
        let mut node = Node::new(NodeId(0), None);
        node.set_sweep(90.0, 180.0);
        assert!(!node.sweep().is_full_circle());
        node.set_sweep(0.0, 720.0);
        assert!(node.sweep().is_full_circle());
        node.set_sweep(0.0, 0.0);
        assert!(!node.sweep().is_full_circle());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn color_strategy() -> impl Strategy<Value = Color> {
            (any::<u8>(), any::<u8>(), any::<u8>(), any::<u8>())
                .prop_map(|(r, g, b, a)| Color::rgba(r, g, b, a))
        }

        proptest! {
            #[test]
            fn prop_style_preservation(custom in color_strategy()) {
                let bright = NetworkStyle::bright();
                let dark = NetworkStyle::dark();
                prop_assume!(custom != bright.node.fill);

                let mut node = Node::new(NodeId(0), None);
                node.apply_style(&bright, None);
                node.set_fill(custom);
                node.apply_style(&dark, Some(&bright));
                prop_assert_eq!(node.fill(), custom);
                prop_assert_eq!(node.outline(), dark.node.outline);
            }

            #[test]
            fn prop_label_rect_matches_metrics(label in "[a-zA-Z0-9 ]{0,24}", size in 4.0f32..48.0) {
                let metrics = HeuristicMetrics::default();
                let mut node = Node::new(NodeId(0), None);
                node.set_font(Font::proportional(size));
                node.set_label(label.clone());
                prop_assert_eq!(node.label_rect().size(), metrics.measure(&Font::proportional(size), &label));
            }
        }
    }
}

//! Network Scene
//!
//! Owns every node and edge of a view, keyed by handle, and routes the
//! notifications between them: a committed node move adjusts the incident
//! edges, a theme switch is applied to every item with the old theme as
//! reference, and painting goes through a per-node render cache.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use netview_core::{Color, EdgeId, HeuristicMetrics, NodeId, Rect, Vec2};
use netview_events::{Event, EventBus};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{FrameKey, RenderCache};
use crate::edge::Edge;
use crate::node::{DEFAULT_RADIUS, ItemChange, Node, SharedMetrics, default_label};
use crate::render::{PaintOption, Painter, RenderContext, RenderSettings};
use crate::style::{NetworkStyle, PIE_COLORS, StyleProvider};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SceneError {
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),
    #[error("Unknown edge {0}")]
    UnknownEdge(EdgeId),
    #[error("Node {0} already exists")]
    DuplicateNode(NodeId),
    #[error("Edge {0} already exists")]
    DuplicateEdge(EdgeId),
    #[error("Edge {edge} references missing node {node}")]
    MissingEndpoint { edge: EdgeId, node: NodeId },
    #[error("Pie chart has {needed} segments but only {available} colors are set")]
    PaletteTooShort { needed: usize, available: usize },
}

/// Handle to anything the scene draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneItem {
    Node(NodeId),
    Edge(EdgeId),
}

impl From<NodeId> for SceneItem {
    fn from(id: NodeId) -> Self {
        SceneItem::Node(id)
    }
}

impl From<EdgeId> for SceneItem {
    fn from(id: EdgeId) -> Self {
        SceneItem::Edge(id)
    }
}

/// Everything needed to create one node in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub id: NodeId,
    pub label: Option<String>,
    pub pos: Option<Vec2>,
    /// Overrides the theme fill.
    pub color: Option<Color>,
    /// Ignored unless positive.
    pub radius: Option<f32>,
}

impl NodeSpec {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            label: None,
            pos: None,
            color: None,
            radius: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn pos(mut self, x: f32, y: f32) -> Self {
        self.pos = Some(Vec2::new(x, y));
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }
}

pub struct NetworkScene {
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<EdgeId, Edge>,
    style: NetworkStyle,
    pie_colors: Vec<Color>,
    pie_charts_visible: bool,
    scale: f32,
    locked: bool,
    metrics: SharedMetrics,
    settings: RenderSettings,
    cache: RenderCache,
    /// Bumped whenever scene-wide render inputs change.
    generation: u64,
    /// Notifications are only published once a bus is attached.
    bus: Option<EventBus>,
}

impl Default for NetworkScene {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkScene {
    /// A scene without an event bus; see [`NetworkScene::with_event_bus`].
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            style: NetworkStyle::default(),
            pie_colors: PIE_COLORS.to_vec(),
            pie_charts_visible: true,
            scale: 1.0,
            locked: false,
            metrics: Arc::new(HeuristicMetrics::default()),
            settings: RenderSettings::default(),
            cache: RenderCache::new(),
            generation: 0,
            bus: None,
        }
    }

    /// A scene publishing its notifications on `bus`.
    ///
    /// The bus is unbounded: the owner must drain it (`drain` or
    /// `dispatch_to`) regularly.
    pub fn with_event_bus(bus: EventBus) -> Self {
        let mut scene = Self::new();
        scene.bus = Some(bus);
        scene
    }

    pub fn event_bus(&self) -> Option<&EventBus> {
        self.bus.as_ref()
    }

    /// Attach or detach the bus notifications are published on.
    pub fn set_event_bus(&mut self, bus: Option<EventBus>) {
        self.bus = bus;
    }

    fn emit(&self, event: Event) {
        if let Some(bus) = &self.bus {
            bus.publish(event);
        }
    }

    /// Text measurement used for every node label, present and future.
    pub fn set_metrics(&mut self, metrics: SharedMetrics) {
        for node in self.nodes.values_mut() {
            node.set_metrics(metrics.clone());
        }
        self.metrics = metrics;
    }

    pub fn render_settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn set_render_settings(&mut self, settings: RenderSettings) {
        self.settings = settings;
        self.bump_generation();
    }

    pub fn render_cache(&self) -> &RenderCache {
        &self.cache
    }

    // ========================================================================
    // Structure
    // ========================================================================

    /// Create a node styled with the current theme.
    pub fn add_node(&mut self, id: NodeId, label: Option<String>) -> Result<&mut Node, SceneError> {
        if self.nodes.contains_key(&id) {
            return Err(SceneError::DuplicateNode(id));
        }
        let mut node = Node::with_metrics(id, label, self.metrics.clone());
        node.apply_style(&self.style, None);
        self.emit(Event::NodeAdded { id });
        Ok(self.nodes.entry(id).or_insert(node))
    }

    /// Create several nodes at once. Nothing is added if any id is taken.
    ///
    /// Each node gets the current theme first, then its explicit color, then
    /// its radius when positive.
    pub fn add_nodes<I>(&mut self, specs: I) -> Result<Vec<NodeId>, SceneError>
    where
        I: IntoIterator<Item = NodeSpec>,
    {
        let specs: Vec<NodeSpec> = specs.into_iter().collect();
        let mut seen = HashSet::new();
        for spec in &specs {
            if self.nodes.contains_key(&spec.id) || !seen.insert(spec.id) {
                return Err(SceneError::DuplicateNode(spec.id));
            }
        }

        let mut ids = Vec::with_capacity(specs.len());
        for spec in specs {
            let node = self.add_node(spec.id, spec.label)?;
            if let Some(pos) = spec.pos {
                node.set_pos(pos);
            }
            if let Some(color) = spec.color {
                node.set_fill(color);
            }
            if let Some(radius) = spec.radius.filter(|r| *r > 0.0) {
                node.set_radius(radius);
            }
            ids.push(spec.id);
        }
        info!(count = ids.len(), "Added nodes");
        Ok(ids)
    }

    /// Connect two existing nodes and lay the edge out immediately.
    pub fn add_edge(
        &mut self,
        id: EdgeId,
        source: NodeId,
        target: NodeId,
        width: f32,
    ) -> Result<&Edge, SceneError> {
        if self.edges.contains_key(&id) {
            return Err(SceneError::DuplicateEdge(id));
        }
        for node in [source, target] {
            if !self.nodes.contains_key(&node) {
                warn!(edge = %id, node = %node, "Edge references unknown node");
                return Err(SceneError::MissingEndpoint { edge: id, node });
            }
        }

        let mut edge = Edge::new(id, source, target, width);
        edge.apply_style(&self.style);
        let (Some(from), Some(to)) = (self.nodes.get(&source), self.nodes.get(&target)) else {
            return Err(SceneError::MissingEndpoint { edge: id, node: source });
        };
        edge.adjust(from, to);

        for node in [source, target] {
            if let Some(node) = self.nodes.get_mut(&node) {
                node.attach_edge(id);
            }
        }
        self.emit(Event::EdgeAdded { id, source, target });
        Ok(self.edges.entry(id).or_insert(edge))
    }

    /// Add `(id, source, target, width)` tuples, stopping at the first error.
    pub fn add_edges<I>(&mut self, edges: I) -> Result<Vec<EdgeId>, SceneError>
    where
        I: IntoIterator<Item = (EdgeId, NodeId, NodeId, f32)>,
    {
        let mut ids = Vec::new();
        for (id, source, target, width) in edges {
            self.add_edge(id, source, target, width)?;
            ids.push(id);
        }
        info!(count = ids.len(), "Added edges");
        Ok(ids)
    }

    /// Remove a node together with every edge touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node, SceneError> {
        let incident = self
            .nodes
            .get(&id)
            .ok_or(SceneError::UnknownNode(id))?
            .edges();
        for edge in incident {
            self.remove_edge(edge)?;
        }
        let node = self.nodes.remove(&id).ok_or(SceneError::UnknownNode(id))?;
        self.cache.invalidate(id);
        self.emit(Event::NodeRemoved { id });
        Ok(node)
    }

    /// Detach an edge from both endpoints and drop it.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Edge, SceneError> {
        let edge = self.edges.remove(&id).ok_or(SceneError::UnknownEdge(id))?;
        for node in [edge.source(), edge.target()] {
            if let Some(node) = self.nodes.get_mut(&node) {
                node.detach_edge(id);
            }
        }
        self.emit(Event::EdgeRemoved { id });
        Ok(edge)
    }

    pub fn clear(&mut self) {
        info!(nodes = self.nodes.len(), edges = self.edges.len(), "Clearing scene");
        self.edges.clear();
        self.nodes.clear();
        self.cache.clear();
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Direct access for appearance changes.
    ///
    /// Position changes must go through [`NetworkScene::move_node`]; call
    /// [`NetworkScene::adjust_node_edges`] after changing the radius.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Nodes in index order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    /// Edges in index order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Returns whether the selection state changed. Hidden and isolated
    /// nodes cannot be selected.
    pub fn set_selected(&mut self, id: NodeId, selected: bool) -> Result<bool, SceneError> {
        let node = self.nodes.get_mut(&id).ok_or(SceneError::UnknownNode(id))?;
        if node.is_selected() == selected {
            return Ok(false);
        }
        if selected && !node.has_contents() {
            debug!(node = %id, "Ignoring selection of a node without contents");
            return Ok(false);
        }
        let response = node.item_change(ItemChange::SelectedChange(selected));
        if response.invalidate_cache {
            self.cache.invalidate(id);
        }
        self.emit(Event::SelectionChanged { id, selected });
        Ok(true)
    }

    /// Deselect every node and edge.
    pub fn clear_selection(&mut self) {
        for id in self.selected_nodes() {
            let _ = self.set_selected(id, false);
        }
        for id in self.selected_edges() {
            let _ = self.set_edge_selected(id, false);
        }
    }

    /// Replace the selection. Unknown ids are skipped.
    pub fn set_nodes_selection(&mut self, ids: &[NodeId]) {
        self.clear_selection();
        for &id in ids {
            if self.set_selected(id, true).is_err() {
                warn!(node = %id, "Cannot select unknown node");
            }
        }
    }

    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|node| node.is_selected())
            .map(Node::index)
            .collect()
    }

    /// Returns whether the selection state changed. Hidden edges cannot be
    /// selected.
    pub fn set_edge_selected(&mut self, id: EdgeId, selected: bool) -> Result<bool, SceneError> {
        let edge = self.edges.get_mut(&id).ok_or(SceneError::UnknownEdge(id))?;
        if edge.is_selected() == selected || (selected && !edge.is_visible()) {
            return Ok(false);
        }
        edge.set_selected(selected);
        self.emit(Event::EdgeSelectionChanged { id, selected });
        Ok(true)
    }

    /// Replace the whole selection with these edges. Unknown ids are skipped.
    pub fn set_edges_selection(&mut self, ids: &[EdgeId]) {
        self.clear_selection();
        for &id in ids {
            if self.set_edge_selected(id, true).is_err() {
                warn!(edge = %id, "Cannot select unknown edge");
            }
        }
    }

    pub fn selected_edges(&self) -> Vec<EdgeId> {
        self.edges
            .values()
            .filter(|edge| edge.is_selected())
            .map(Edge::index)
            .collect()
    }

    pub fn selected_nodes_bounding_rect(&self) -> Rect {
        self.nodes
            .values()
            .filter(|node| node.is_selected())
            .fold(Rect::NOTHING, |acc, node| acc.union(&node.scene_bounding_rect()))
    }

    /// Everything painted: shown node bodies and labels, and shown edges.
    /// Hidden and isolated items do not count.
    pub fn items_bounding_rect(&self) -> Rect {
        let nodes = self
            .nodes
            .values()
            .filter(|node| node.has_contents())
            .fold(Rect::NOTHING, |acc, node| acc.union(&node.scene_bounding_rect()));
        self.edges
            .values()
            .filter(|edge| edge.is_visible())
            .fold(nodes, |acc, edge| acc.union(&edge.bounding_rect()))
    }

    // ========================================================================
    // Visibility
    // ========================================================================

    /// Hide nodes and edges. Hidden items lose their selection.
    pub fn hide_items<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = SceneItem>,
    {
        for item in items {
            self.set_item_visible(item, false);
        }
    }

    pub fn show_items<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = SceneItem>,
    {
        for item in items {
            self.set_item_visible(item, true);
        }
    }

    /// Hide whatever is selected, clearing the selection.
    pub fn hide_selected_items(&mut self) {
        let nodes = self.selected_nodes().into_iter().map(SceneItem::Node);
        let edges = self.selected_edges().into_iter().map(SceneItem::Edge);
        let selected: Vec<SceneItem> = nodes.chain(edges).collect();
        self.clear_selection();
        self.hide_items(selected);
    }

    /// Show every node and edge. Isolated nodes stay out of the view.
    pub fn show_all_items(&mut self) {
        let all = self.all_items();
        self.show_items(all);
    }

    pub fn hide_all_items(&mut self) {
        let all = self.all_items();
        self.hide_items(all);
    }

    fn all_items(&self) -> Vec<SceneItem> {
        let nodes = self.nodes.keys().copied().map(SceneItem::Node);
        let edges = self.edges.keys().copied().map(SceneItem::Edge);
        nodes.chain(edges).collect()
    }

    fn set_item_visible(&mut self, item: SceneItem, visible: bool) {
        match item {
            SceneItem::Node(id) => {
                if !visible {
                    let _ = self.set_selected(id, false);
                }
                match self.nodes.get_mut(&id) {
                    Some(node) => node.set_visible(visible),
                    None => warn!(node = %id, "Visibility for unknown node"),
                }
            }
            SceneItem::Edge(id) => {
                if !visible {
                    let _ = self.set_edge_selected(id, false);
                }
                match self.edges.get_mut(&id) {
                    Some(edge) => edge.set_visible(visible),
                    None => warn!(edge = %id, "Visibility for unknown edge"),
                }
            }
        }
    }

    // ========================================================================
    // Positions
    // ========================================================================

    /// Commit a new position and adjust the incident edges before returning.
    ///
    /// Returns the number of edges adjusted.
    pub fn move_node(&mut self, id: NodeId, pos: Vec2) -> Result<usize, SceneError> {
        let node = self.nodes.get_mut(&id).ok_or(SceneError::UnknownNode(id))?;
        node.set_pos(pos);
        let response = node.item_change(ItemChange::ScenePositionHasChanged);
        let adjusted = adjust_edges(&self.nodes, &mut self.edges, response.adjust_edges);
        debug!(node = %id, adjusted, "Moved node");
        self.emit(Event::NodeMoved {
            id,
            x: pos.x,
            y: pos.y,
            adjusted_edges: adjusted,
        });
        Ok(adjusted)
    }

    /// Interactive move by `delta`. Does nothing while the scene is locked
    /// or for hidden and isolated nodes.
    pub fn drag_node(&mut self, id: NodeId, delta: Vec2) -> Result<bool, SceneError> {
        let node = self.nodes.get(&id).ok_or(SceneError::UnknownNode(id))?;
        if self.locked || !node.has_contents() {
            return Ok(false);
        }
        let pos = node.pos();
        self.move_node(id, pos + delta)?;
        Ok(true)
    }

    /// Re-run edge layout for one node, e.g. after a radius change.
    pub fn adjust_node_edges(&mut self, id: NodeId) -> Result<usize, SceneError> {
        let incident = self.nodes.get(&id).ok_or(SceneError::UnknownNode(id))?.edges();
        Ok(adjust_edges(&self.nodes, &mut self.edges, incident))
    }

    /// Place nodes at `positions` multiplied by `scale` (or the current scale),
    /// then adjust every edge once.
    ///
    /// Nodes listed in `isolated` are left out of the view: they keep their
    /// position and cannot be painted, hit, selected or dragged until a
    /// later layout includes them again.
    pub fn set_layout<I>(&mut self, positions: I, scale: Option<f32>, isolated: &[NodeId])
    where
        I: IntoIterator<Item = (NodeId, Vec2)>,
    {
        let scale = scale.unwrap_or(self.scale);
        let isolated: HashSet<NodeId> = isolated.iter().copied().collect();
        let mut deselect = Vec::new();
        for node in self.nodes.values_mut() {
            let alone = isolated.contains(&node.index());
            node.set_isolated(alone);
            if alone && node.is_selected() {
                deselect.push(node.index());
            }
        }
        for id in deselect {
            let _ = self.set_selected(id, false);
        }

        let mut placed = 0;
        for (id, pos) in positions {
            match self.nodes.get_mut(&id) {
                Some(node) if node.is_isolated() => {
                    debug!(node = %id, "Skipping layout position of isolated node");
                }
                Some(node) => {
                    node.set_pos(pos * scale);
                    placed += 1;
                }
                None => warn!(node = %id, "Layout position for unknown node"),
            }
        }
        self.adjust_all_edges();
        info!(placed, isolated = isolated.len(), scale, "Applied layout");
        self.emit(Event::LayoutChanged);
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Rescale all positions relative to the current scale. Non-positive
    /// values reset to 1.
    pub fn set_scale(&mut self, scale: f32) {
        let scale = if scale > 0.0 && scale.is_finite() { scale } else { 1.0 };
        let factor = scale / self.scale;
        for node in self.nodes.values_mut() {
            let pos = node.pos();
            node.set_pos(pos * factor);
        }
        self.adjust_all_edges();
        self.scale = scale;
        self.emit(Event::ScaleChanged(scale));
    }

    fn adjust_all_edges(&mut self) -> usize {
        let all: Vec<EdgeId> = self.edges.keys().copied().collect();
        adjust_edges(&self.nodes, &mut self.edges, all)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Disable interactive dragging.
    pub fn lock(&mut self, locked: bool) {
        self.locked = locked;
        self.emit(Event::Locked(locked));
    }

    pub fn unlock(&mut self) {
        self.lock(false);
    }

    /// Topmost shown node whose body or label contains `point`.
    pub fn node_at(&self, point: Vec2) -> Option<NodeId> {
        self.nodes
            .values()
            .filter(|node| node.has_contents())
            .filter(|node| node.shape().translate(node.pos()).contains(point))
            .max_by(|a, b| stacking_order(a, b))
            .map(Node::index)
    }

    /// Closest shown edge whose stroke passes within `tolerance` of `point`.
    pub fn edge_at(&self, point: Vec2, tolerance: f32) -> Option<EdgeId> {
        self.edges
            .values()
            .filter(|edge| edge.is_visible() && edge.contains(point, tolerance))
            .filter_map(|edge| edge.distance_to(point).map(|d| (d, edge.index())))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(b.1.cmp(&a.1)))
            .map(|(_, id)| id)
    }

    // ========================================================================
    // Style
    // ========================================================================

    pub fn network_style(&self) -> &NetworkStyle {
        &self.style
    }

    /// Switch theme; `None` restores the default. Nodes whose fill was
    /// customized under the old theme keep it.
    pub fn set_network_style(&mut self, style: Option<NetworkStyle>) {
        let style = style.unwrap_or_default();
        for node in self.nodes.values_mut() {
            node.apply_style(&style, Some(&self.style));
        }
        for edge in self.edges.values_mut() {
            edge.apply_style(&style);
        }
        info!(from = self.style.name(), to = style.name(), "Switched network style");
        self.style = style;
        self.bump_generation();
        self.emit(Event::StyleChanged {
            name: self.style.name.clone(),
        });
    }

    /// Fill per node, `None` where it is the theme default.
    pub fn nodes_colors(&self) -> Vec<(NodeId, Option<Color>)> {
        let default = self.style.node_fill();
        self.nodes
            .values()
            .map(|node| (node.index(), Some(node.fill()).filter(|fill| *fill != default)))
            .collect()
    }

    pub fn set_nodes_colors<I>(&mut self, colors: I)
    where
        I: IntoIterator<Item = (NodeId, Color)>,
    {
        for (id, color) in colors {
            match self.nodes.get_mut(&id) {
                Some(node) => node.set_fill(color),
                None => warn!(node = %id, "Color for unknown node"),
            }
        }
    }

    pub fn set_selected_nodes_color(&mut self, color: Color) {
        for node in self.nodes.values_mut().filter(|node| node.is_selected()) {
            node.set_fill(color);
        }
    }

    // ========================================================================
    // Labels and radii
    // ========================================================================

    pub fn set_labels<I, S>(&mut self, labels: I)
    where
        I: IntoIterator<Item = (NodeId, S)>,
        S: Into<String>,
    {
        for (id, label) in labels {
            match self.nodes.get_mut(&id) {
                Some(node) => node.set_label(label),
                None => warn!(node = %id, "Label for unknown node"),
            }
        }
    }

    /// Restore the default `index + 1` labels.
    pub fn reset_labels(&mut self) {
        for node in self.nodes.values_mut() {
            node.set_label(default_label(node.index()));
        }
    }

    /// Radius per node, `None` where it is the default.
    pub fn nodes_radii(&self) -> Vec<(NodeId, Option<f32>)> {
        self.nodes
            .values()
            .map(|node| {
                let radius = node.radius();
                (node.index(), (radius != DEFAULT_RADIUS).then_some(radius))
            })
            .collect()
    }

    pub fn set_nodes_radii<I>(&mut self, radii: I)
    where
        I: IntoIterator<Item = (NodeId, f32)>,
    {
        for (id, radius) in radii {
            match self.nodes.get_mut(&id) {
                Some(node) => {
                    node.set_radius(radius);
                    let incident = node.edges();
                    adjust_edges(&self.nodes, &mut self.edges, incident);
                }
                None => warn!(node = %id, "Radius for unknown node"),
            }
        }
    }

    pub fn set_selected_nodes_radius(&mut self, radius: f32) {
        let selected = self.selected_nodes();
        self.set_nodes_radii(selected.into_iter().map(|id| (id, radius)));
    }

    pub fn reset_nodes_radii(&mut self) {
        for node in self.nodes.values_mut() {
            node.set_radius(DEFAULT_RADIUS);
        }
        self.adjust_all_edges();
    }

    // ========================================================================
    // Pie charts
    // ========================================================================

    pub fn pie_colors(&self) -> &[Color] {
        &self.pie_colors
    }

    pub fn set_pie_colors(&mut self, colors: Vec<Color>) {
        self.pie_colors = colors;
        self.bump_generation();
    }

    /// Set overlay values per node. Rejected as a whole when any node has
    /// more segments than there are pie colors.
    pub fn set_pie_charts<I>(&mut self, values: I) -> Result<(), SceneError>
    where
        I: IntoIterator<Item = (NodeId, Vec<f32>)>,
    {
        let values: Vec<(NodeId, Vec<f32>)> = values.into_iter().collect();
        let needed = values.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
        if needed > self.pie_colors.len() {
            return Err(SceneError::PaletteTooShort {
                needed,
                available: self.pie_colors.len(),
            });
        }
        for (id, segments) in values {
            if segments.iter().any(|v| !v.is_finite()) {
                warn!(node = %id, "Non-finite pie values, clearing overlay");
            }
            match self.nodes.get_mut(&id) {
                Some(node) => node.set_segments(&segments),
                None => warn!(node = %id, "Pie values for unknown node"),
            }
        }
        Ok(())
    }

    pub fn reset_pie_charts(&mut self) {
        for node in self.nodes.values_mut() {
            node.set_segments(&[]);
        }
    }

    pub fn pie_charts_visibility(&self) -> bool {
        self.pie_charts_visible
    }

    /// Emits only when the visibility actually changes.
    pub fn set_pie_charts_visibility(&mut self, visible: bool) {
        if visible != self.pie_charts_visible {
            self.pie_charts_visible = visible;
            self.bump_generation();
            self.emit(Event::PieChartsVisibilityChanged(visible));
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Drain pending node invalidations; returns the scene region to repaint.
    pub fn take_dirty_region(&mut self) -> Option<Rect> {
        let mut region: Option<Rect> = None;
        for node in self.nodes.values_mut() {
            let pending = node.take_invalidation();
            if pending.cache {
                self.cache.invalidate(node.index());
            }
            if pending.is_clean() {
                continue;
            }
            let mut dirty = node.scene_bounding_rect();
            if let Some(old) = pending.geometry {
                dirty = dirty.union(&old.translate(node.pos()));
            }
            region = Some(region.map_or(dirty, |r| r.union(&dirty)));
        }
        region
    }

    /// Draw edges, then nodes in stacking order, at level of detail `lod`.
    pub fn paint<P: Painter + ?Sized>(&mut self, painter: &mut P, lod: f32) {
        for edge in self.edges.values().filter(|edge| edge.is_visible()) {
            edge.paint(painter);
        }

        let mut order: Vec<&Node> = self.nodes.values().filter(|node| node.has_contents()).collect();
        order.sort_by(|a, b| stacking_order(a, b));

        let ctx = RenderContext {
            style: &self.style,
            overlay_visible: self.pie_charts_visible,
            overlay_palette: &self.pie_colors,
            settings: &self.settings,
        };
        let gate = self.settings.gate(lod);
        for node in order {
            let option = PaintOption {
                selected: node.is_selected(),
                lod,
            };
            let key = FrameKey {
                selected: option.selected,
                gate,
                revision: node.revision(),
                scene_generation: self.generation,
            };
            let list = self
                .cache
                .get_or_render(node.index(), key, |list| node.paint(&option, &ctx, list));
            list.replay(painter, node.pos());
        }
    }

    fn bump_generation(&mut self) {
        self.generation += 1;
    }
}

fn stacking_order(a: &Node, b: &Node) -> std::cmp::Ordering {
    a.z_value()
        .total_cmp(&b.z_value())
        .then(a.index().cmp(&b.index()))
}

/// Adjust the given edges against the current node positions.
fn adjust_edges<I>(nodes: &BTreeMap<NodeId, Node>, edges: &mut BTreeMap<EdgeId, Edge>, ids: I) -> usize
where
    I: IntoIterator<Item = EdgeId>,
{
    let mut adjusted = 0;
    for id in ids {
        let Some(edge) = edges.get_mut(&id) else {
            continue;
        };
        if let (Some(source), Some(target)) = (nodes.get(&edge.source()), nodes.get(&edge.target())) {
            edge.adjust(source, target);
            adjusted += 1;
        }
    }
    adjusted
}

//! Interactive view onto a `NetworkScene`.
//!
//! Handles:
//! - Zoom around the pointer and panning by dragging empty space
//! - Dragging nodes (committed through the scene so edges follow)
//! - Click selection of nodes and edges, with Ctrl/Shift toggling
//! - Level of detail: the scene is painted with `lod = zoom`

use eframe::egui::{self, emath::TSTransform};
use netview_core::{EdgeId, NodeId, Rect, Vec2};
use netview_graph::{NetworkScene, StyleProvider};

use crate::painter::{EguiPainter, color32};

/// Screen-space slack for picking an edge.
const EDGE_PICK_PX: f32 = 4.0;

#[derive(Clone, Copy)]
struct DragState {
    start_pan: egui::Vec2,
    start_pos: egui::Pos2,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CanvasOutput {
    pub hovered: Option<NodeId>,
    pub clicked: Option<NodeId>,
    pub clicked_edge: Option<EdgeId>,
}

pub struct GraphCanvas {
    zoom: f32,
    pan: egui::Vec2,
    min_zoom: f32,
    max_zoom: f32,
    drag_state: Option<DragState>,
    dragging_node: Option<NodeId>,
    fit_requested: bool,
}

impl GraphCanvas {
    pub fn new(min_zoom: f32, max_zoom: f32) -> Self {
        Self {
            zoom: 1.0,
            pan: egui::Vec2::ZERO,
            min_zoom,
            max_zoom,
            drag_state: None,
            dragging_node: None,
            fit_requested: true,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom_limits(&mut self, min_zoom: f32, max_zoom: f32) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom.max(min_zoom);
        self.zoom = self.zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Fit the scene on the next frame.
    pub fn request_fit(&mut self) {
        self.fit_requested = true;
    }

    pub fn zoom_to_fit(&mut self, bounds: Rect, viewport: egui::Rect, padding: f32) {
        if bounds.is_empty() {
            return;
        }
        let bounds = to_egui_rect(bounds);
        let padded = bounds.expand(padding);
        let available = viewport.shrink(padding);
        let scale = (available.width() / padded.width())
            .min(available.height() / padded.height())
            .clamp(self.min_zoom, self.max_zoom);
        self.zoom = scale;
        self.pan = -padded.center().to_vec2() * self.zoom;
    }

    pub fn show(&mut self, ui: &mut egui::Ui, scene: &mut NetworkScene) -> CanvasOutput {
        let rect = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, color32(scene.network_style().background()));
        let viewport_center = rect.center();
        let mut output = CanvasOutput::default();

        if self.fit_requested {
            self.zoom_to_fit(scene.items_bounding_rect(), rect, 20.0);
            self.fit_requested = false;
        }

        let zoom_delta = ui.input(|i| i.zoom_delta());
        if response.hovered() && (zoom_delta - 1.0).abs() > f32::EPSILON {
            let prev_zoom = self.zoom;
            let new_zoom = (self.zoom * zoom_delta).clamp(self.min_zoom, self.max_zoom);
            if (new_zoom - prev_zoom).abs() > f32::EPSILON {
                self.zoom = new_zoom;
                if let Some(pointer) = response.hover_pos() {
                    let graph_pos = self.screen_to_graph(pointer, viewport_center, prev_zoom);
                    let new_screen = self.graph_to_screen(graph_pos, viewport_center);
                    self.pan += pointer - new_screen;
                }
            }
        }

        let mut pointer_graph = None;
        if let Some(pointer) = response.hover_pos() {
            let graph_pos = self.screen_to_graph(pointer, viewport_center, self.zoom);
            let graph_pos = Vec2::new(graph_pos.x, graph_pos.y);
            output.hovered = scene.node_at(graph_pos);
            pointer_graph = Some(graph_pos);
        }

        if response.clicked() {
            output.clicked = output.hovered;
            if output.hovered.is_none() {
                output.clicked_edge = pointer_graph
                    .and_then(|pos| scene.edge_at(pos, EDGE_PICK_PX / self.zoom));
            }
            let toggle = ui.input(|i| i.modifiers.command || i.modifiers.shift);
            match (output.hovered, output.clicked_edge) {
                (Some(id), _) if toggle => {
                    let selected = scene.node(id).is_some_and(|node| node.is_selected());
                    let _ = scene.set_selected(id, !selected);
                }
                (Some(id), _) => scene.set_nodes_selection(&[id]),
                (None, Some(edge)) if toggle => {
                    let selected = scene.edge(edge).is_some_and(|e| e.is_selected());
                    let _ = scene.set_edge_selected(edge, !selected);
                }
                (None, Some(edge)) => scene.set_edges_selection(&[edge]),
                (None, None) if !toggle => scene.clear_selection(),
                (None, None) => {}
            }
        }

        if response.drag_started() {
            if let Some(id) = output.hovered.filter(|_| !scene.is_locked()) {
                self.dragging_node = Some(id);
                if let Some(node) = scene.node_mut(id) {
                    node.mouse_press();
                }
            } else if let Some(pointer) = response.interact_pointer_pos() {
                self.drag_state = Some(DragState {
                    start_pan: self.pan,
                    start_pos: pointer,
                });
            }
        }

        if response.dragged() {
            if let Some(id) = self.dragging_node {
                let delta = response.drag_delta() / self.zoom;
                if let Err(e) = scene.drag_node(id, Vec2::new(delta.x, delta.y)) {
                    tracing::warn!("Dropping drag: {}", e);
                    self.dragging_node = None;
                }
            } else if let (Some(state), Some(pointer)) =
                (self.drag_state, response.interact_pointer_pos())
            {
                self.pan = state.start_pan + (pointer - state.start_pos);
            }
        }

        if ui.input(|i| !i.pointer.primary_down()) {
            if let Some(id) = self.dragging_node.take() {
                if let Some(node) = scene.node_mut(id) {
                    node.mouse_release();
                }
            }
            self.drag_state = None;
        }

        if output.hovered.is_some() {
            let icon = if scene.is_locked() {
                egui::CursorIcon::PointingHand
            } else {
                egui::CursorIcon::Grab
            };
            ui.ctx().set_cursor_icon(icon);
        }

        let transform = TSTransform::new(viewport_center.to_vec2() + self.pan, self.zoom);
        let mut scene_painter = EguiPainter::new(&painter, transform);
        scene.paint(&mut scene_painter, self.zoom);

        output
    }

    fn graph_to_screen(&self, graph_pos: egui::Pos2, viewport_center: egui::Pos2) -> egui::Pos2 {
        viewport_center + self.pan + (graph_pos.to_vec2() * self.zoom)
    }

    fn screen_to_graph(
        &self,
        screen_pos: egui::Pos2,
        viewport_center: egui::Pos2,
        zoom: f32,
    ) -> egui::Pos2 {
        let offset = screen_pos - viewport_center - self.pan;
        egui::Pos2::new(offset.x / zoom, offset.y / zoom)
    }
}

fn to_egui_rect(rect: Rect) -> egui::Rect {
    egui::Rect::from_min_max(
        egui::pos2(rect.min.x, rect.min.y),
        egui::pos2(rect.max.x, rect.max.y),
    )
}

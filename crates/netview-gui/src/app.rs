use std::collections::VecDeque;
use std::sync::Arc;

use eframe::egui;
use netview_core::NodeId;
use netview_events::{Event, EventBus, EventListener};
use netview_graph::{NetworkScene, NetworkStyle, demo};

use crate::canvas::GraphCanvas;
use crate::metrics::EguiTextMetrics;
use crate::painter::color32;
use crate::settings::AppSettings;

const STATUS_HISTORY: usize = 32;

/// Recent scene notifications, newest last.
#[derive(Default)]
struct StatusLog {
    entries: VecDeque<String>,
}

impl EventListener for StatusLog {
    fn handle_event(&mut self, event: &Event) {
        let line = match event {
            // Too chatty while dragging.
            Event::NodeMoved { .. } | Event::NodeAdded { .. } | Event::EdgeAdded { .. } => return,
            Event::SelectionChanged { id, selected: true } => format!("Selected node {}", id),
            Event::SelectionChanged { id, selected: false } => format!("Deselected node {}", id),
            Event::NodeRemoved { id } => format!("Removed node {}", id),
            Event::EdgeRemoved { id } => format!("Removed edge {}", id),
            Event::EdgeSelectionChanged { id, selected: true } => format!("Selected edge {}", id),
            Event::EdgeSelectionChanged { id, selected: false } => format!("Deselected edge {}", id),
            Event::StyleChanged { name } => format!("Theme: {}", name),
            Event::PieChartsVisibilityChanged(visible) => {
                format!("Pie charts {}", if *visible { "shown" } else { "hidden" })
            }
            Event::LayoutChanged => "Layout changed".to_string(),
            Event::ScaleChanged(scale) => format!("Scale {:.2}", scale),
            Event::Locked(true) => "Locked".to_string(),
            Event::Locked(false) => "Unlocked".to_string(),
        };
        if self.entries.len() == STATUS_HISTORY {
            self.entries.pop_front();
        }
        self.entries.push_back(line);
    }
}

pub struct NetviewApp {
    settings: AppSettings,
    scene: NetworkScene,
    canvas: GraphCanvas,
    status: StatusLog,
    /// egui fonts only exist once the first frame runs.
    needs_first_frame_setup: bool,
    selected_radius: f32,
    selected_color: egui::Color32,
    hovered: Option<NodeId>,
}

impl NetviewApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let settings = AppSettings::load();
        let mut scene = NetworkScene::with_event_bus(EventBus::new());
        scene.set_render_settings(settings.render);
        scene.set_network_style(Some(settings.network_style()));
        scene.set_pie_charts_visibility(settings.show_pie_charts);
        let canvas = GraphCanvas::new(settings.min_zoom, settings.max_zoom);
        Self {
            settings,
            scene,
            canvas,
            status: StatusLog::default(),
            needs_first_frame_setup: true,
            selected_radius: 15.0,
            selected_color: egui::Color32::from_rgb(255, 127, 14),
            hovered: None,
        }
    }

    fn regenerate(&mut self) {
        if let Err(e) = demo::populate(&mut self.scene, self.settings.demo_nodes) {
            tracing::error!("Failed to build demo network: {}", e);
        }
        self.canvas.request_fit();
    }

    fn apply_visuals(&self, ctx: &egui::Context) {
        let background = self.scene.network_style().background;
        let visuals = if background.luma() < 0.5 {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);
    }

    fn set_theme(&mut self, ctx: &egui::Context, name: &str) {
        match NetworkStyle::from_name(name) {
            Ok(style) => {
                self.settings.theme = name.to_string();
                self.settings.custom_theme = None;
                self.scene.set_network_style(Some(style));
                self.apply_visuals(ctx);
            }
            Err(e) => tracing::warn!("{}", e),
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let current = self.scene.network_style().name.clone();
            egui::ComboBox::from_label("Theme")
                .selected_text(&current)
                .show_ui(ui, |ui| {
                    for name in NetworkStyle::BUILTIN {
                        if ui.selectable_label(current == name, name).clicked() {
                            self.set_theme(ui.ctx(), name);
                        }
                    }
                });

            let mut show_pies = self.scene.pie_charts_visibility();
            if ui.checkbox(&mut show_pies, "Pie charts").changed() {
                self.scene.set_pie_charts_visibility(show_pies);
                self.settings.show_pie_charts = show_pies;
            }

            let mut locked = self.scene.is_locked();
            if ui.checkbox(&mut locked, "Lock").changed() {
                self.scene.lock(locked);
            }

            ui.separator();
            if ui.button("Fit").clicked() {
                self.canvas.request_fit();
            }
            if ui.button("Reset labels").clicked() {
                self.scene.reset_labels();
            }
            if ui.button("Reset radii").clicked() {
                self.scene.reset_nodes_radii();
            }
            if ui.button("Hide selected").clicked() {
                self.scene.hide_selected_items();
            }
            if ui.button("Show all").clicked() {
                self.scene.show_all_items();
            }

            ui.separator();
            ui.add(egui::DragValue::new(&mut self.settings.demo_nodes).range(1..=5000));
            if ui.button("Regenerate").clicked() {
                self.regenerate();
            }
        });

        ui.horizontal(|ui| {
            let has_selection = !self.scene.selected_nodes().is_empty();
            ui.add_enabled_ui(has_selection, |ui| {
                ui.label("Selection:");
                if ui
                    .add(egui::Slider::new(&mut self.selected_radius, 1.0..=60.0).text("radius"))
                    .changed()
                {
                    self.scene.set_selected_nodes_radius(self.selected_radius);
                }
                if ui.color_edit_button_srgba(&mut self.selected_color).changed() {
                    let [r, g, b, a] = self.selected_color.to_srgba_unmultiplied();
                    self.scene
                        .set_selected_nodes_color(netview_core::Color::rgba(r, g, b, a));
                }
            });
        });
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(format!(
                "{} nodes, {} edges, {} selected",
                self.scene.node_count(),
                self.scene.edge_count(),
                self.scene.selected_nodes().len() + self.scene.selected_edges().len()
            ));
            ui.separator();
            ui.label(format!("zoom {:.2}", self.canvas.zoom()));
            ui.separator();
            let cache = self.scene.render_cache();
            ui.label(format!("cache {}/{}", cache.hits(), cache.hits() + cache.misses()));
            if let Some(node) = self.hovered.and_then(|id| self.scene.node(id)) {
                ui.separator();
                ui.colored_label(color32(node.fill()), format!("{} ({})", node.label(), node.index()));
            }
            if let Some(last) = self.status.entries.back() {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(last);
                });
            }
        });
    }
}

impl eframe::App for NetviewApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.settings.save();
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.needs_first_frame_setup {
            tracing::info!("Installing egui text metrics and building demo network");
            self.scene.set_metrics(Arc::new(EguiTextMetrics::new(ctx)));
            self.apply_visuals(ctx);
            self.regenerate();
            self.needs_first_frame_setup = false;
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| self.status_bar(ui));
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let output = self.canvas.show(ui, &mut self.scene);
                self.hovered = output.hovered;
            });

        if let Some(bus) = self.scene.event_bus() {
            bus.dispatch_to(&mut self.status);
        }
        if self.scene.take_dirty_region().is_some() {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_log_skips_moves_and_caps_history() {
        let mut log = StatusLog::default();
        log.handle_event(&Event::NodeMoved {
            id: NodeId(0),
            x: 0.0,
            y: 0.0,
            adjusted_edges: 1,
        });
        assert!(log.entries.is_empty());

        for _ in 0..STATUS_HISTORY + 5 {
            log.handle_event(&Event::LayoutChanged);
        }
        log.handle_event(&Event::EdgeSelectionChanged {
            id: netview_core::EdgeId(3),
            selected: true,
        });
        assert_eq!(log.entries.back().map(String::as_str), Some("Selected edge 3"));
        log.handle_event(&Event::Locked(true));
        assert_eq!(log.entries.len(), STATUS_HISTORY);
        assert_eq!(log.entries.back().map(String::as_str), Some("Locked"));
    }
}

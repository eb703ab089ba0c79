use eframe::egui::{self, Align, Context, Layout};

use crate::market::GraphSource;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source: &GraphSource,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("keyword-graph");
                    ui.separator();
                    if let Some(range) = self.document.date_range_label() {
                        ui.label(range);
                    }
                    ui.label(format!(
                        "companies: {}",
                        self.document.company_nodes.len()
                    ));
                    ui.label(format!("keywords: {}", self.document.keyword_nodes.len()));
                    ui.label(format!("edges: {}", self.adapted.graph.edge_count()));

                    let skipped = self.adapted.skipped_edge_count();
                    if skipped > 0 {
                        ui.colored_label(
                            ui.visuals().warn_fg_color,
                            format!("skipped: {skipped}"),
                        )
                        .on_hover_text("Edges that referenced an unknown vertex.");
                    }

                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload"));
                    if reload_button
                        .on_hover_text(format!("Fetch again from {}", source.describe()))
                        .clicked()
                    {
                        *reload_requested = true;
                    }
                    if is_loading {
                        ui.spinner();
                    }

                    let toggle_text = if self.show_controls {
                        "Hide controls"
                    } else {
                        "Show controls"
                    };
                    if ui.button(toggle_text).clicked() {
                        self.toggle_controls();
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "visible {} edges ({})",
                            self.visible_edges.len(),
                            self.sign_filter.label()
                        ));
                    });
                });
            });

        if self.show_controls {
            egui::SidePanel::left("controls")
                .resizable(true)
                .default_width(320.0)
                .show(ctx, |ui| self.draw_controls(ui));
        }

        if self.selected.is_some() {
            egui::SidePanel::right("inspector")
                .resizable(true)
                .default_width(340.0)
                .show(ctx, |ui| self.draw_inspector(ui));
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }
}

use eframe::egui::{self, Grid, RichText, Ui};

use crate::market::{MarketGraph, Vertex, VertexAttributes};
use crate::util::{format_change, format_price};

use super::super::ViewModel;

/// Label/value pairs shown for a vertex, in display order.
pub(in crate::app) fn inspector_rows(vertex: &Vertex) -> Vec<(&'static str, String)> {
    match &vertex.attributes {
        VertexAttributes::Company(company) => vec![
            ("ISIN", company.isin.clone()),
            ("Start price", format_price(company.price_from, &company.currency)),
            ("End price", format_price(company.price_to, &company.currency)),
            (
                "Price change",
                format!(
                    "{:.4} ({})",
                    company.price_change,
                    format_change(company.price_change)
                ),
            ),
            ("Currency", company.currency.clone()),
            ("Market", company.market.clone()),
            ("Source", company.source.clone()),
        ],
        VertexAttributes::Keyword(keyword) => vec![(
            "Price change",
            format!(
                "{:.4} ({})",
                keyword.price_change,
                format_change(keyword.price_change)
            ),
        )],
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct Connection {
    pub(in crate::app) neighbour: String,
    pub(in crate::app) weight: f64,
    pub(in crate::app) outgoing: bool,
}

/// Visible edges touching `vertex`, strongest first.
pub(in crate::app) fn visible_connections(
    graph: &MarketGraph,
    visible_edges: &[usize],
    vertex: usize,
) -> Vec<Connection> {
    let mut connections = visible_edges
        .iter()
        .filter_map(|&index| graph.edges.get(index))
        .filter_map(|edge| {
            let (other, outgoing) = if edge.source == vertex {
                (edge.target, true)
            } else if edge.target == vertex {
                (edge.source, false)
            } else {
                return None;
            };
            graph.vertices.get(other).map(|neighbour| Connection {
                neighbour: neighbour.label.clone(),
                weight: edge.weight,
                outgoing,
            })
        })
        .collect::<Vec<_>>();
    connections.sort_by(|a, b| b.weight.abs().total_cmp(&a.weight.abs()));
    connections
}

impl ViewModel {
    pub(in crate::app) fn draw_inspector(&mut self, ui: &mut Ui) {
        let Some(vertex) = self.selected_vertex() else {
            ui.heading("Inspector");
            ui.label("Click a vertex to inspect it.");
            return;
        };

        let title = vertex.label.clone();
        let kind = vertex.kind();
        let rows = inspector_rows(vertex);
        let connections = self
            .adapted
            .graph
            .index_by_id
            .get(&vertex.id)
            .map(|&index| visible_connections(&self.adapted.graph, &self.visible_edges, index))
            .unwrap_or_default();

        ui.horizontal(|ui| {
            ui.heading(title);
            ui.label(RichText::new(kind.label()).weak());
        });
        ui.add_space(6.0);

        Grid::new("inspector_rows")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                for (label, value) in &rows {
                    ui.label(*label);
                    ui.label(value.as_str());
                    ui.end_row();
                }
            });

        ui.separator();
        ui.label(RichText::new(format!("Connections ({})", connections.len())).strong());
        if connections.is_empty() {
            ui.label("No visible edges touch this vertex.");
        } else {
            let mut pending_selection = None;
            egui::ScrollArea::vertical()
                .id_salt("inspector_connections")
                .max_height(320.0)
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    for connection in &connections {
                        let arrow = if connection.outgoing { "->" } else { "<-" };
                        let text =
                            format!("{arrow} {}  ({:+.2})", connection.neighbour, connection.weight);
                        if ui.link(text).clicked() {
                            pending_selection = Some(connection.neighbour.clone());
                        }
                    }
                });
            if let Some(neighbour) = pending_selection {
                self.set_selected(Some(neighbour));
            }
        }

        ui.add_space(10.0);
        if ui.button("Dismiss").clicked() {
            self.dismiss_inspector();
        }
    }
}

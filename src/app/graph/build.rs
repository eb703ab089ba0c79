use eframe::egui::{Vec2, vec2};

use crate::market::{MarketGraph, Vertex, VertexKind};

use super::super::render_utils::price_change_color;
use super::{EdgeLine, Scene, ShapeKind, VertexLabel, VertexShape};

const KEYWORD_RADIUS: f32 = 9.0;
const COMPANY_HALF_HEIGHT: f32 = 11.0;

fn shape_kind_for(vertex: &Vertex) -> ShapeKind {
    match vertex.kind() {
        VertexKind::Company => {
            let chars = vertex.label.chars().count() as f32;
            ShapeKind::Rect {
                half_size: vec2((chars * 3.6 + 10.0).clamp(16.0, 72.0), COMPANY_HALF_HEIGHT),
            }
        }
        VertexKind::Keyword => ShapeKind::Circle {
            radius: KEYWORD_RADIUS,
        },
    }
}

impl Scene {
    /// Discards every primitive and rebuilds from `graph`.
    ///
    /// `positions` are the current vertex coordinates, indexed like
    /// `graph.vertices`; missing entries fall back to the origin.
    pub(in crate::app) fn build(
        &mut self,
        graph: &MarketGraph,
        visible_edges: &[usize],
        positions: &[Vec2],
    ) {
        self.shapes.clear();
        self.lines.clear();
        self.labels.clear();

        let position_of = |index: usize| positions.get(index).copied().unwrap_or(Vec2::ZERO);

        for (index, vertex) in graph.vertices.iter().enumerate() {
            let shape = VertexShape {
                vertex: index,
                kind: shape_kind_for(vertex),
                center: position_of(index),
                fill: price_change_color(vertex.price_change()),
            };
            let offset = shape.label_offset();
            self.labels.push(VertexLabel {
                vertex: index,
                text: vertex.label.clone(),
                anchor: shape.center + offset,
                offset,
                centered: matches!(shape.kind, ShapeKind::Rect { .. }),
            });
            self.shapes.push(shape);
        }

        for &edge_index in visible_edges {
            let Some(edge) = graph.edges.get(edge_index) else {
                continue;
            };
            let source = graph.index_by_id.get(&edge.source_id).copied();
            let target = graph.index_by_id.get(&edge.target_id).copied();

            self.lines.push(EdgeLine {
                edge: edge_index,
                source,
                target,
                from: source.map(position_of).unwrap_or(Vec2::ZERO),
                to: target.map(position_of).unwrap_or(Vec2::ZERO),
                weight: edge.weight,
            });
        }
    }

    /// Topmost vertex under `point` (world space).
    pub(in crate::app) fn hit_test(&self, point: Vec2) -> Option<usize> {
        self.shapes
            .iter()
            .rev()
            .find(|shape| shape.contains(point))
            .map(|shape| shape.vertex)
    }

    #[cfg(test)]
    pub(in crate::app) fn shape(&self, vertex: usize) -> Option<&VertexShape> {
        self.shapes.get(vertex).filter(|shape| shape.vertex == vertex)
    }
}

use eframe::egui::Vec2;

use super::super::physics::StepObserver;
use super::Scene;

impl StepObserver for Scene {
    fn on_step(&mut self, positions: &[Vec2]) {
        for shape in &mut self.shapes {
            if let Some(position) = positions.get(shape.vertex) {
                shape.center = *position;
            }
        }

        for line in &mut self.lines {
            let (Some(source), Some(target)) = (line.source, line.target) else {
                continue;
            };
            let (Some(from), Some(to)) = (positions.get(source), positions.get(target)) else {
                continue;
            };
            line.from = *from;
            line.to = *to;
        }

        for label in &mut self.labels {
            if let Some(position) = positions.get(label.vertex) {
                label.anchor = *position + label.offset;
            }
        }
    }
}

impl Scene {
    /// Lines whose two endpoints resolved to live vertices.
    pub(in crate::app) fn drawable_lines(&self) -> impl Iterator<Item = &super::EdgeLine> {
        let vertex_count = self.shapes.len();
        self.lines.iter().filter(move |line| {
            line.source.is_some_and(|index| index < vertex_count)
                && line.target.is_some_and(|index| index < vertex_count)
        })
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::super::EdgeLine;
    use super::*;
    use crate::market::fixtures::two_companies_one_keyword;
    use crate::market::{SignFilter, adapt_document};

    #[test]
    fn step_moves_shapes_lines_and_labels() {
        let graph = adapt_document(&two_companies_one_keyword()).graph;
        let mut scene = Scene::default();
        scene.build(&graph, &graph.visible_edges(SignFilter::Positive), &[]);

        let positions = vec![vec2(1.0, 2.0), vec2(3.0, 4.0), vec2(5.0, 6.0)];
        scene.on_step(&positions);

        for shape in &scene.shapes {
            assert_eq!(shape.center, positions[shape.vertex]);
        }
        for label in &scene.labels {
            assert_eq!(label.anchor, positions[label.vertex] + label.offset);
        }
        let line = &scene.lines[0];
        assert_eq!(line.from, positions[graph.index_by_id["A"]]);
        assert_eq!(line.to, positions[graph.index_by_id["k"]]);
    }

    #[test]
    fn line_with_missing_endpoint_is_skipped() {
        let graph = adapt_document(&two_companies_one_keyword()).graph;
        let mut scene = Scene::default();
        scene.build(&graph, &[], &[]);
        scene.lines.push(EdgeLine {
            edge: 99,
            source: Some(0),
            target: None,
            from: vec2(-1.0, -1.0),
            to: vec2(-1.0, -1.0),
            weight: 0.5,
        });
        scene.lines.push(EdgeLine {
            edge: 100,
            source: Some(0),
            target: Some(42),
            from: vec2(-1.0, -1.0),
            to: vec2(-1.0, -1.0),
            weight: 0.5,
        });

        scene.on_step(&[vec2(1.0, 1.0), vec2(2.0, 2.0), vec2(3.0, 3.0)]);

        assert!(scene.lines.iter().all(|line| line.from == vec2(-1.0, -1.0)));
        assert_eq!(scene.drawable_lines().count(), 0);
    }
}

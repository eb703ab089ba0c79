mod build;
mod interaction;
mod sync;
mod view;

use eframe::egui::{Color32, Vec2};

pub(in crate::app) use interaction::DragMachine;
#[cfg(test)]
pub(in crate::app) use interaction::DragState;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum ShapeKind {
    Rect { half_size: Vec2 },
    Circle { radius: f32 },
}

/// One primitive per vertex, placed in world space.
#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct VertexShape {
    pub(in crate::app) vertex: usize,
    pub(in crate::app) kind: ShapeKind,
    pub(in crate::app) center: Vec2,
    pub(in crate::app) fill: Color32,
}

impl VertexShape {
    pub(in crate::app) fn contains(&self, point: Vec2) -> bool {
        let offset = point - self.center;
        match self.kind {
            ShapeKind::Rect { half_size } => {
                offset.x.abs() <= half_size.x && offset.y.abs() <= half_size.y
            }
            ShapeKind::Circle { radius } => offset.length_sq() <= radius * radius,
        }
    }

    /// Horizontal distance from the center to where a label may start.
    pub(in crate::app) fn label_offset(&self) -> Vec2 {
        match self.kind {
            ShapeKind::Rect { .. } => Vec2::ZERO,
            ShapeKind::Circle { radius } => Vec2::new(radius + 4.0, 0.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct EdgeLine {
    pub(in crate::app) edge: usize,
    pub(in crate::app) source: Option<usize>,
    pub(in crate::app) target: Option<usize>,
    pub(in crate::app) from: Vec2,
    pub(in crate::app) to: Vec2,
    pub(in crate::app) weight: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct VertexLabel {
    pub(in crate::app) vertex: usize,
    pub(in crate::app) text: String,
    pub(in crate::app) anchor: Vec2,
    pub(in crate::app) offset: Vec2,
    pub(in crate::app) centered: bool,
}

/// Retained visual state; rebuilt wholesale by [`Scene::build`] and moved by
/// the render synchronizer after every simulation step.
#[derive(Default)]
pub(in crate::app) struct Scene {
    pub(in crate::app) shapes: Vec<VertexShape>,
    pub(in crate::app) lines: Vec<EdgeLine>,
    pub(in crate::app) labels: Vec<VertexLabel>,
}

use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Stroke, StrokeKind, Ui, vec2};

use crate::util::format_change;

use super::super::ViewModel;
use super::super::render_utils::{blend_color, draw_background, edge_stroke, segment_near};
use super::ShapeKind;

const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, &self.viewport);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pointer(ui, rect, &response);

        let mut scheduler = ui.ctx().clone();
        self.driver.pump(&mut self.scene, &mut scheduler);

        if self.scene.shapes.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "The graph document has no vertices.",
                FontId::proportional(14.0),
                Color32::from_gray(200),
            );
            return;
        }

        let hovered = self.hovered_vertex(rect, ui);
        if self.drag.is_dragging() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::Grabbing);
        } else if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let viewport = self.viewport;
        let zoom = viewport.zoom;

        for line in self.scene.drawable_lines() {
            let start = viewport.world_to_screen(rect, line.from);
            let end = viewport.world_to_screen(rect, line.to);
            if !segment_near(rect, start, end, 4.0) {
                continue;
            }
            painter.line_segment([start, end], edge_stroke(line.weight, zoom));
        }

        let selected = self
            .selected
            .as_deref()
            .and_then(|id| self.adapted.graph.index_by_id.get(id).copied());
        let outline = Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190));
        let highlight = Stroke::new(2.2, SELECTED_COLOR);

        for shape in &self.scene.shapes {
            let center = viewport.world_to_screen(rect, shape.center);
            let fill = if hovered == Some(shape.vertex) {
                blend_color(shape.fill, Color32::WHITE, 0.25)
            } else {
                shape.fill
            };
            let is_selected = selected == Some(shape.vertex);

            match shape.kind {
                ShapeKind::Rect { half_size } => {
                    let screen_rect = Rect::from_center_size(center, half_size * 2.0 * zoom);
                    if !screen_rect.expand(4.0).intersects(rect) {
                        continue;
                    }
                    let rounding = 4.0 * zoom.min(2.0);
                    painter.rect_filled(screen_rect, rounding, fill);
                    painter.rect_stroke(screen_rect, rounding, outline, StrokeKind::Outside);
                    if is_selected {
                        painter.rect_stroke(
                            screen_rect.expand(3.0),
                            rounding + 3.0,
                            highlight,
                            StrokeKind::Outside,
                        );
                    }
                }
                ShapeKind::Circle { radius } => {
                    let radius = radius * zoom;
                    if !Rect::from_center_size(center, vec2(radius, radius) * 2.0)
                        .expand(4.0)
                        .intersects(rect)
                    {
                        continue;
                    }
                    painter.circle_filled(center, radius, fill);
                    painter.circle_stroke(center, radius, outline);
                    if is_selected {
                        painter.circle_stroke(center, radius + 4.0, highlight);
                    }
                }
            }
        }

        let font_size = (12.0 * zoom.sqrt()).clamp(9.0, 18.0);
        for label in &self.scene.labels {
            let emphasized = selected == Some(label.vertex) || hovered == Some(label.vertex);
            if zoom < 0.35 && !emphasized {
                continue;
            }

            let position = viewport.world_to_screen(rect, label.anchor);
            if !rect.expand(80.0).contains(position) {
                continue;
            }
            let align = if label.centered {
                Align2::CENTER_CENTER
            } else {
                Align2::LEFT_CENTER
            };
            let color = if label.centered {
                Color32::from_gray(16)
            } else {
                Color32::from_gray(238)
            };
            painter.text(
                position,
                align,
                label.text.as_str(),
                FontId::proportional(font_size),
                color,
            );
        }

        if let Some(vertex) = hovered.and_then(|index| self.adapted.graph.vertices.get(index)) {
            let panel_text = format!(
                "{}  |  {}  |  change {}",
                vertex.label,
                vertex.kind().label(),
                format_change(vertex.price_change())
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }
}

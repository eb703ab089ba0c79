use eframe::egui::{self, Rect, Ui, Vec2};
use log::debug;

use super::super::ViewModel;
use super::super::physics::{ForceField, Reheat};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(in crate::app) enum DragState {
    #[default]
    Idle,
    Dragging {
        vertex: usize,
    },
}

/// Pin-while-held drag: the grabbed vertex follows the pointer and is released
/// back into free motion on pointer-up.
#[derive(Default)]
pub(in crate::app) struct DragMachine {
    state: DragState,
}

impl DragMachine {
    #[cfg(test)]
    pub(in crate::app) fn state(&self) -> DragState {
        self.state
    }

    pub(in crate::app) fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub(in crate::app) fn pointer_down(&mut self, vertex: usize, field: &mut ForceField) -> Reheat {
        if self.is_dragging() {
            self.pointer_up(field);
        }
        let Some(position) = field.position(vertex) else {
            return Reheat::Ignored;
        };

        debug!("drag start on vertex {vertex}");
        field.pin(vertex, position);
        self.state = DragState::Dragging { vertex };
        field.begin_interaction()
    }

    pub(in crate::app) fn pointer_move(&mut self, pointer: Vec2, field: &mut ForceField) {
        if let DragState::Dragging { vertex } = self.state {
            field.pin(vertex, pointer);
        }
    }

    /// Releases the held vertex, returning it if a drag was active.
    pub(in crate::app) fn pointer_up(&mut self, field: &mut ForceField) -> Option<usize> {
        let DragState::Dragging { vertex } = std::mem::take(&mut self.state) else {
            return None;
        };

        debug!("drag end on vertex {vertex}");
        field.unpin(vertex);
        field.end_interaction();
        Some(vertex)
    }

    /// Forgets the active drag without touching any field (the field is gone).
    pub(in crate::app) fn reset(&mut self) {
        self.state = DragState::Idle;
    }
}

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        self.viewport.zoom_at(rect, pointer, scroll);
    }

    pub(in crate::app) fn handle_graph_pointer(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        let mut scheduler = ui.ctx().clone();
        let pointer_world = response
            .interact_pointer_pos()
            .map(|pointer| self.viewport.screen_to_world(rect, pointer));

        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some(origin) = ui
                .input(|input| input.pointer.press_origin())
                .or(response.interact_pointer_pos())
        {
            let world = self.viewport.screen_to_world(rect, origin);
            match self.scene.hit_test(world) {
                Some(vertex) => self.start_vertex_drag(vertex, &mut scheduler),
                None => self.panning = true,
            }
        }

        if response.dragged_by(egui::PointerButton::Primary) {
            if self.drag.is_dragging() {
                if let Some(world) = pointer_world {
                    self.move_vertex_drag(world);
                }
            } else if self.panning {
                self.viewport.pan_by(response.drag_delta());
            }
        }

        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.viewport.pan_by(response.drag_delta());
        }

        if response.drag_stopped() {
            self.end_vertex_drag();
            self.panning = false;
        }

        if response.clicked_by(egui::PointerButton::Primary)
            && let Some(world) = pointer_world
            && let Some(vertex) = self.scene.hit_test(world)
        {
            let id = self
                .adapted
                .graph
                .vertices
                .get(vertex)
                .map(|vertex| vertex.id.clone());
            self.set_selected(id);
        }
    }

    pub(in crate::app) fn hovered_vertex(&self, rect: Rect, ui: &Ui) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        if !rect.contains(pointer) {
            return None;
        }
        self.scene
            .hit_test(self.viewport.screen_to_world(rect, pointer))
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{Context, Event, Modifiers, PointerButton, Pos2, RawInput, vec2};

    use super::*;
    use crate::app::physics::driver_tests::CountingScheduler;
    use crate::app::physics::{SimParams, StepOutcome, seed_positions};
    use crate::market::SignFilter;
    use crate::market::fixtures::two_companies_one_keyword;

    fn field() -> ForceField {
        ForceField::new(
            seed_positions(3, Vec2::ZERO),
            &[],
            SimParams::default(),
            Vec2::ZERO,
        )
    }

    #[test]
    fn drag_follows_pointer_and_releases_at_last_position() {
        let mut field = field();
        let mut drag = DragMachine::default();

        assert_eq!(drag.pointer_down(0, &mut field), Reheat::Resumed);
        assert_eq!(drag.state(), DragState::Dragging { vertex: 0 });
        assert!(field.is_pinned(0));

        drag.pointer_move(vec2(40.0, 80.0), &mut field);
        field.step();
        assert_eq!(field.position(0), Some(vec2(40.0, 80.0)));

        drag.pointer_move(vec2(100.0, 200.0), &mut field);
        assert_eq!(drag.pointer_up(&mut field), Some(0));

        assert_eq!(drag.state(), DragState::Idle);
        assert!(!field.is_pinned(0));
        assert_eq!(field.position(0), Some(vec2(100.0, 200.0)));

        assert_eq!(field.step(), StepOutcome::Running);
        assert_ne!(field.position(0), Some(vec2(100.0, 200.0)));
    }

    #[test]
    fn drag_reheats_a_settled_field() {
        let mut field = field();
        while field.step() == StepOutcome::Running {}
        assert!(!field.is_running());

        let mut drag = DragMachine::default();
        assert_eq!(drag.pointer_down(1, &mut field), Reheat::Resumed);
        assert!(field.is_running());
        assert!(field.alpha() >= 0.3);
    }

    #[test]
    fn pointer_up_without_drag_is_a_no_op() {
        let mut field = field();
        let mut drag = DragMachine::default();

        assert_eq!(drag.pointer_up(&mut field), None);
        drag.pointer_move(vec2(5.0, 5.0), &mut field);
        assert!(!field.is_pinned(0));
    }

    #[test]
    fn unknown_vertex_does_not_start_a_drag() {
        let mut field = field();
        let mut drag = DragMachine::default();

        assert_eq!(drag.pointer_down(17, &mut field), Reheat::Ignored);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn second_pointer_down_releases_the_first_vertex() {
        let mut field = field();
        let mut drag = DragMachine::default();

        drag.pointer_down(0, &mut field);
        drag.pointer_down(2, &mut field);

        assert!(!field.is_pinned(0));
        assert!(field.is_pinned(2));
        assert_eq!(drag.state(), DragState::Dragging { vertex: 2 });
    }

    fn model() -> ViewModel {
        ViewModel::new(
            two_companies_one_keyword(),
            SimParams::default(),
            SignFilter::Positive,
            &mut CountingScheduler::default(),
        )
    }

    /// Runs one egui pass with the canvas filling the central panel.
    fn frame(ctx: &Context, model: &mut ViewModel, events: Vec<Event>) -> Rect {
        let input = RawInput {
            screen_rect: Some(Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0))),
            events,
            ..Default::default()
        };
        let mut canvas = Rect::NOTHING;
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                let (rect, response) =
                    ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
                model.handle_graph_pointer(ui, rect, &response);
                canvas = rect;
            });
        });
        canvas
    }

    fn button(pos: Pos2, pressed: bool) -> Event {
        Event::PointerButton {
            pos,
            button: PointerButton::Primary,
            pressed,
            modifiers: Modifiers::NONE,
        }
    }

    /// Hover, press, move by `delta`, then release, one pass each.
    fn primary_drag(
        ctx: &Context,
        model: &mut ViewModel,
        start: Pos2,
        delta: Vec2,
        before_release: impl FnOnce(&ViewModel),
    ) {
        frame(ctx, model, vec![Event::PointerMoved(start)]);
        frame(ctx, model, vec![button(start, true)]);
        frame(ctx, model, vec![Event::PointerMoved(start + delta)]);
        before_release(model);
        frame(ctx, model, vec![button(start + delta, false)]);
    }

    fn positions(model: &ViewModel) -> Vec<Vec2> {
        model
            .driver
            .field()
            .map(|field| field.positions().to_vec())
            .unwrap_or_default()
    }

    #[test]
    fn primary_drag_on_empty_canvas_pans_only() {
        let ctx = Context::default();
        let mut model = model();
        let canvas = frame(&ctx, &mut model, Vec::new());
        let start = canvas.min + vec2(20.0, 20.0);
        assert_eq!(
            model
                .scene
                .hit_test(model.viewport.screen_to_world(canvas, start)),
            None
        );
        let before = positions(&model);

        primary_drag(&ctx, &mut model, start, vec2(30.0, 20.0), |model| {
            assert!(model.panning);
            assert!(!model.drag.is_dragging());
        });

        assert_ne!(model.viewport.pan, Vec2::ZERO);
        assert_eq!(model.viewport.zoom, 1.0);
        assert_eq!(positions(&model), before);
        assert!(!model.panning);
    }

    #[test]
    fn primary_drag_on_a_vertex_pins_it_without_panning() {
        let ctx = Context::default();
        let mut model = model();
        let canvas = frame(&ctx, &mut model, Vec::new());
        let anchor = positions(&model)[0];
        let start = model.viewport.world_to_screen(canvas, anchor);
        let Some(grabbed) = model.scene.hit_test(anchor) else {
            panic!("a vertex sits at its own position");
        };

        primary_drag(&ctx, &mut model, start, vec2(30.0, 20.0), |model| {
            assert_eq!(model.drag.state(), DragState::Dragging { vertex: grabbed });
            assert!(
                model
                    .driver
                    .field()
                    .is_some_and(|field| field.is_pinned(grabbed))
            );
        });

        assert_eq!(model.viewport.pan, Vec2::ZERO);
        assert_eq!(model.drag.state(), DragState::Idle);
        assert!(
            model
                .driver
                .field()
                .is_some_and(|field| !field.is_pinned(grabbed))
        );
    }
}

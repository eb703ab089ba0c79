use eframe::egui::Vec2;
use log::{debug, info};

use crate::market::{GraphDocument, SignFilter, Vertex, adapt_document};

use super::graph::{DragMachine, Scene};
use super::physics::{ForceField, SimParams, SimulationDriver, StepScheduler};
use super::viewport::Viewport;
use super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(
        document: GraphDocument,
        params: SimParams,
        sign_filter: SignFilter,
        scheduler: &mut dyn StepScheduler,
    ) -> Self {
        let mut model = Self {
            document: GraphDocument::default(),
            adapted: Default::default(),
            params: params.clamped(),
            sign_filter,
            visible_edges: Vec::new(),
            driver: SimulationDriver::default(),
            scene: Scene::default(),
            viewport: Viewport::default(),
            drag: DragMachine::default(),
            panning: false,
            selected: None,
            show_controls: true,
        };
        model.replace_document(document, scheduler);
        model
    }

    /// Swaps in a new graph: the running field is stopped before the next one
    /// is built, then the scene is rebuilt from scratch.
    pub(in crate::app) fn replace_document(
        &mut self,
        document: GraphDocument,
        scheduler: &mut dyn StepScheduler,
    ) {
        self.driver.shutdown();
        self.drag.reset();
        self.panning = false;

        self.adapted = adapt_document(&document);
        self.document = document;
        self.visible_edges = self.adapted.graph.visible_edges(self.sign_filter);

        if let Some(selected) = &self.selected
            && self.adapted.graph.vertex(selected).is_none()
        {
            debug!("selection {selected:?} dropped with the old graph");
            self.selected = None;
        }

        let field = ForceField::for_graph(&self.adapted.graph, &self.visible_edges, self.params);
        self.scene
            .build(&self.adapted.graph, &self.visible_edges, field.positions());
        self.driver.install(field, scheduler);
        info!(
            "graph ready: {} vertices, {} of {} edges visible ({})",
            self.adapted.graph.vertex_count(),
            self.visible_edges.len(),
            self.adapted.graph.edge_count(),
            self.sign_filter.label()
        );
    }

    #[cfg(test)]
    pub(in crate::app) fn visible_edge_refs(&self) -> Vec<&crate::market::Edge> {
        self.visible_edges
            .iter()
            .filter_map(|&index| self.adapted.graph.edges.get(index))
            .collect()
    }

    /// Pushes clamped parameters into the live field and reheats it.
    pub(in crate::app) fn apply_params(
        &mut self,
        params: SimParams,
        scheduler: &mut dyn StepScheduler,
    ) {
        self.params = params.clamped();
        if let Some(field) = self.driver.field_mut() {
            let reheat = field.set_parameters(self.params);
            self.driver.wake(reheat, scheduler);
        }
    }

    /// Recomputes the visible edge set; the field's link force and the scene
    /// both switch to it without rebuilding the field.
    pub(in crate::app) fn set_sign_filter(
        &mut self,
        filter: SignFilter,
        scheduler: &mut dyn StepScheduler,
    ) {
        if self.sign_filter == filter {
            return;
        }

        self.sign_filter = filter;
        self.visible_edges = self.adapted.graph.visible_edges(filter);
        debug!(
            "sign filter {}: {} visible edges",
            filter.label(),
            self.visible_edges.len()
        );

        let edges = self
            .visible_edges
            .iter()
            .filter_map(|&index| self.adapted.graph.edges.get(index))
            .collect::<Vec<_>>();
        let Some(field) = self.driver.field_mut() else {
            self.scene.build(&self.adapted.graph, &self.visible_edges, &[]);
            return;
        };
        let reheat = field.set_links(&edges);
        self.scene
            .build(&self.adapted.graph, &self.visible_edges, field.positions());
        self.driver.wake(reheat, scheduler);
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        if self.selected != selected {
            debug!("selection changed to {selected:?}");
            self.selected = selected;
        }
    }

    pub(in crate::app) fn dismiss_inspector(&mut self) {
        self.set_selected(None);
    }

    pub(in crate::app) fn toggle_controls(&mut self) {
        self.show_controls = !self.show_controls;
    }

    pub(in crate::app) fn selected_vertex(&self) -> Option<&Vertex> {
        self.selected
            .as_deref()
            .and_then(|id| self.adapted.graph.vertex(id))
    }

    pub(in crate::app) fn start_vertex_drag(
        &mut self,
        vertex: usize,
        scheduler: &mut dyn StepScheduler,
    ) {
        let Some(field) = self.driver.field_mut() else {
            return;
        };
        let reheat = self.drag.pointer_down(vertex, field);
        self.driver.wake(reheat, scheduler);
    }

    pub(in crate::app) fn move_vertex_drag(&mut self, pointer: Vec2) {
        if let Some(field) = self.driver.field_mut() {
            self.drag.pointer_move(pointer, field);
        }
    }

    pub(in crate::app) fn end_vertex_drag(&mut self) {
        match self.driver.field_mut() {
            Some(field) => {
                self.drag.pointer_up(field);
            }
            None => self.drag.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::app::graph::DragState;
    use crate::app::physics::driver_tests::CountingScheduler;
    use crate::app::physics::tests::CountingObserver;
    use crate::market::fixtures::{edge, sample_document, two_companies_one_keyword};

    fn model(scheduler: &mut CountingScheduler) -> ViewModel {
        ViewModel::new(
            two_companies_one_keyword(),
            SimParams::default(),
            SignFilter::Positive,
            scheduler,
        )
    }

    fn link_pairs(model: &ViewModel) -> Vec<(usize, usize)> {
        model
            .driver
            .field()
            .map(|field| field.link_endpoints().collect())
            .unwrap_or_default()
    }

    #[test]
    fn new_model_builds_scene_and_arms_one_loop() {
        let mut scheduler = CountingScheduler::default();
        let model = model(&mut scheduler);

        assert_eq!(model.scene.shapes.len(), 3);
        assert_eq!(model.scene.lines.len(), 1);
        assert_eq!(model.driver.active_loops(), 1);
        assert_eq!(scheduler.scheduled, 1);
    }

    #[test]
    fn replacing_document_while_running_keeps_one_loop() {
        let mut scheduler = CountingScheduler::default();
        let mut model = model(&mut scheduler);
        let mut observer = CountingObserver::new();
        for _ in 0..5 {
            model.driver.pump(&mut observer, &mut scheduler);
        }
        assert!(model.driver.field().is_some_and(|field| field.is_running()));

        let generation = model.driver.generation();
        model.replace_document(sample_document(), &mut scheduler);

        assert_eq!(model.driver.active_loops(), 1);
        assert_eq!(model.driver.generation(), generation + 1);
        assert_eq!(model.scene.shapes.len(), 5);

        let scheduled = scheduler.scheduled;
        model.driver.pump(&mut model.scene, &mut scheduler);
        assert_eq!(scheduler.scheduled, scheduled + 1);
        assert_eq!(model.driver.active_loops(), 1);
    }

    #[test]
    fn sign_filter_toggle_swaps_links_without_new_field() {
        let mut scheduler = CountingScheduler::default();
        let mut model = model(&mut scheduler);
        let graph = &model.adapted.graph;
        let (a, b, k) = (
            graph.index_by_id["A"],
            graph.index_by_id["B"],
            graph.index_by_id["k"],
        );
        let generation = model.driver.generation();
        assert_eq!(link_pairs(&model), vec![(a, k)]);

        model.set_sign_filter(SignFilter::Negative, &mut scheduler);

        assert_eq!(link_pairs(&model), vec![(b, k)]);
        assert_eq!(model.visible_edge_refs().len(), 1);
        assert!(model.visible_edge_refs()[0].weight < 0.0);
        assert_eq!(model.scene.lines.len(), 1);
        assert_eq!(model.driver.generation(), generation);
        assert_eq!(model.driver.active_loops(), 1);
    }

    #[test]
    fn parameter_change_reheats_a_settled_field() {
        let mut scheduler = CountingScheduler::default();
        let mut model = model(&mut scheduler);
        let mut observer = CountingObserver::new();
        while model.driver.pump(&mut observer, &mut scheduler).is_some() {}
        assert_eq!(model.driver.active_loops(), 0);

        let params = SimParams {
            charge: -5000.0,
            ..SimParams::default()
        };
        model.apply_params(params, &mut scheduler);

        assert_eq!(model.params.charge, -1000.0);
        let field = model.driver.field().expect("field installed");
        assert_eq!(field.params().charge, -1000.0);
        assert_eq!(field.alpha(), 1.0);
        assert_eq!(model.driver.active_loops(), 1);
    }

    #[test]
    fn dismiss_clears_only_the_selection() {
        let mut scheduler = CountingScheduler::default();
        let mut model = model(&mut scheduler);
        model.set_selected(Some("A".to_owned()));
        assert_eq!(model.selected_vertex().map(|vertex| vertex.id.as_str()), Some("A"));

        let params = model.params;
        let filter = model.sign_filter;
        model.dismiss_inspector();

        assert!(model.selected.is_none());
        assert!(model.selected_vertex().is_none());
        assert_eq!(model.params, params);
        assert_eq!(model.sign_filter, filter);
        assert!(model.driver.field().is_some());
    }

    #[test]
    fn controls_toggle_has_no_simulation_effect() {
        let mut scheduler = CountingScheduler::default();
        let mut model = model(&mut scheduler);
        let loops = model.driver.active_loops();

        model.toggle_controls();
        assert!(!model.show_controls);
        model.toggle_controls();

        assert!(model.show_controls);
        assert_eq!(model.driver.active_loops(), loops);
        assert_eq!(scheduler.scheduled, 1);
    }

    #[test]
    fn reload_keeps_the_adapter_error_list() {
        let mut scheduler = CountingScheduler::default();
        let mut model = model(&mut scheduler);
        let mut document = two_companies_one_keyword();
        document.edges.push(edge("A", "ghost", 0.4));

        model.replace_document(document, &mut scheduler);

        assert_eq!(model.adapted.errors.len(), 1);
        assert_eq!(model.adapted.skipped_edge_count(), 1);
        assert_eq!(model.visible_edges.len(), 1);
        assert_eq!(model.scene.lines.len(), 1);
    }

    #[test]
    fn selection_survives_reload_only_if_vertex_remains() {
        let mut scheduler = CountingScheduler::default();
        let mut model = model(&mut scheduler);

        model.set_selected(Some("A".to_owned()));
        model.replace_document(two_companies_one_keyword(), &mut scheduler);
        assert_eq!(model.selected.as_deref(), Some("A"));

        model.replace_document(sample_document(), &mut scheduler);
        assert!(model.selected.is_none());
    }

    #[test]
    fn drag_through_the_model_releases_on_reload() {
        let mut scheduler = CountingScheduler::default();
        let mut model = model(&mut scheduler);
        let a = model.adapted.graph.index_by_id["A"];

        model.start_vertex_drag(a, &mut scheduler);
        model.move_vertex_drag(vec2(100.0, 200.0));
        assert_eq!(model.drag.state(), DragState::Dragging { vertex: a });
        assert!(model.driver.field().is_some_and(|field| field.is_pinned(a)));

        model.replace_document(two_companies_one_keyword(), &mut scheduler);

        assert_eq!(model.drag.state(), DragState::Idle);
        assert!(model.driver.field().is_some_and(|field| !field.is_pinned(a)));
    }

    #[test]
    fn viewport_changes_leave_positions_alone() {
        let mut scheduler = CountingScheduler::default();
        let mut model = model(&mut scheduler);
        let before = model
            .driver
            .field()
            .map(|field| field.positions().to_vec())
            .unwrap_or_default();

        model.viewport.pan_by(vec2(50.0, -20.0));
        model.viewport.zoom = 3.0;

        let after = model
            .driver
            .field()
            .map(|field| field.positions().to_vec())
            .unwrap_or_default();
        assert_eq!(before, after);
    }
}

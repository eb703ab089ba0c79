mod driver;
mod forces;
mod params;
mod quadtree;

use eframe::egui::{Vec2, vec2};
use log::debug;

use crate::market::{Edge, MarketGraph};

#[cfg(test)]
pub(in crate::app) use driver::tests as driver_tests;
pub(in crate::app) use driver::{SimulationDriver, StepScheduler};
use forces::{
    Link, apply_axis_gravity, apply_links, center_of_mass_shift, link_biases, repulsion_on,
};
pub(crate) use params::SimParams;
pub(in crate::app) use params::{
    ALPHA_DECAY_RANGE, CHARGE_RANGE, GRAVITY_RANGE, LINK_DISTANCE_RANGE, LINK_STRENGTH_RANGE,
};
use quadtree::Cell;

const BARNES_HUT_THETA: f32 = 0.9;
pub(in crate::app) const ALPHA_MIN: f32 = 0.001;
const VELOCITY_DECAY: f32 = 0.4;
/// Energy kept up while a vertex is being dragged.
pub(in crate::app) const INTERACTION_ALPHA_TARGET: f32 = 0.3;
const INITIAL_RADIUS: f32 = 10.0;

/// Receives vertex positions synchronously after every integration step.
pub(in crate::app) trait StepObserver {
    fn on_step(&mut self, positions: &[Vec2]);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum StepOutcome {
    Running,
    Settled,
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FieldState {
    Running,
    Settled,
    Stopped,
}

/// Result of a live parameter change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum Reheat {
    /// Energy restored; the caller must make sure a step gets scheduled.
    Resumed,
    Ignored,
}

/// Phyllotaxis seed positions around `center`.
pub(in crate::app) fn seed_positions(count: usize, center: Vec2) -> Vec<Vec2> {
    let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
    (0..count)
        .map(|index| {
            let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
            let angle = index as f32 * golden_angle;
            center + vec2(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

/// Force-directed layout over an arena of vertices.
pub(in crate::app) struct ForceField {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    pins: Vec<Option<Vec2>>,
    links: Vec<Link>,
    link_weights: Vec<f64>,
    params: SimParams,
    center: Vec2,
    alpha: f32,
    alpha_target: f32,
    state: FieldState,
    scratch: Vec<Vec2>,
}

impl ForceField {
    pub(in crate::app) fn new(
        positions: Vec<Vec2>,
        edges: &[&Edge],
        params: SimParams,
        center: Vec2,
    ) -> Self {
        let vertex_count = positions.len();
        let mut field = Self {
            positions,
            velocities: vec![Vec2::ZERO; vertex_count],
            pins: vec![None; vertex_count],
            links: Vec::new(),
            link_weights: Vec::new(),
            params: params.clamped(),
            center,
            alpha: 1.0,
            alpha_target: 0.0,
            state: FieldState::Running,
            scratch: Vec::with_capacity(vertex_count),
        };
        center_of_mass_shift(&mut field.positions, center);
        field.replace_links(edges);
        field
    }

    pub(in crate::app) fn for_graph(
        graph: &MarketGraph,
        visible_edges: &[usize],
        params: SimParams,
    ) -> Self {
        let edges = visible_edges
            .iter()
            .filter_map(|&index| graph.edges.get(index))
            .collect::<Vec<_>>();
        Self::new(
            seed_positions(graph.vertex_count(), Vec2::ZERO),
            &edges,
            params,
            Vec2::ZERO,
        )
    }

    fn replace_links(&mut self, edges: &[&Edge]) {
        let vertex_count = self.positions.len();
        self.link_weights.clear();
        self.links.clear();
        for edge in edges {
            if edge.source >= vertex_count || edge.target >= vertex_count {
                continue;
            }
            self.link_weights.push(edge.weight);
            self.links.push(Link {
                source: edge.source,
                target: edge.target,
                strength: self.params.link_strength(edge.weight),
                bias: 0.5,
            });
        }
        link_biases(&mut self.links, vertex_count);
    }

    pub(in crate::app) fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub(in crate::app) fn position(&self, index: usize) -> Option<Vec2> {
        self.positions.get(index).copied()
    }

    #[cfg(test)]
    pub(in crate::app) fn params(&self) -> SimParams {
        self.params
    }

    pub(in crate::app) fn alpha(&self) -> f32 {
        self.alpha
    }

    #[cfg(test)]
    pub(in crate::app) fn link_count(&self) -> usize {
        self.links.len()
    }

    #[cfg(test)]
    pub(in crate::app) fn link_endpoints(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.links.iter().map(|link| (link.source, link.target))
    }

    pub(in crate::app) fn is_running(&self) -> bool {
        self.state == FieldState::Running
    }

    pub(in crate::app) fn is_stopped(&self) -> bool {
        self.state == FieldState::Stopped
    }

    #[cfg(test)]
    pub(in crate::app) fn is_pinned(&self, index: usize) -> bool {
        self.pins.get(index).is_some_and(Option::is_some)
    }

    fn reheat_to(&mut self, alpha: f32) -> Reheat {
        if self.state == FieldState::Stopped {
            debug!("ignoring reheat of a stopped force field");
            return Reheat::Ignored;
        }
        self.alpha = self.alpha.max(alpha);
        self.state = FieldState::Running;
        Reheat::Resumed
    }

    /// Applies new live parameters and reheats to full energy.
    pub(in crate::app) fn set_parameters(&mut self, params: SimParams) -> Reheat {
        if self.state == FieldState::Stopped {
            return Reheat::Ignored;
        }

        self.params = params.clamped();
        for (link, weight) in self.links.iter_mut().zip(&self.link_weights) {
            link.strength = self.params.link_strength(*weight);
        }
        self.alpha = 1.0;
        self.reheat_to(1.0)
    }

    /// Swaps the set of edges the link force acts on.
    pub(in crate::app) fn set_links(&mut self, edges: &[&Edge]) -> Reheat {
        if self.state == FieldState::Stopped {
            return Reheat::Ignored;
        }

        self.replace_links(edges);
        self.alpha = 1.0;
        self.reheat_to(1.0)
    }

    pub(in crate::app) fn pin(&mut self, index: usize, position: Vec2) {
        if let Some(pin) = self.pins.get_mut(index) {
            *pin = Some(position);
            self.positions[index] = position;
            self.velocities[index] = Vec2::ZERO;
        }
    }

    pub(in crate::app) fn unpin(&mut self, index: usize) {
        if let Some(pin) = self.pins.get_mut(index) {
            *pin = None;
        }
    }

    /// Keeps the layout warm while the user holds a vertex.
    pub(in crate::app) fn begin_interaction(&mut self) -> Reheat {
        self.alpha_target = INTERACTION_ALPHA_TARGET;
        self.reheat_to(INTERACTION_ALPHA_TARGET)
    }

    pub(in crate::app) fn end_interaction(&mut self) {
        self.alpha_target = 0.0;
    }

    /// Permanently halts the field; a new one has to be built to resume.
    pub(in crate::app) fn stop(&mut self) {
        if self.state != FieldState::Stopped {
            debug!("force field stopped at alpha {:.4}", self.alpha);
        }
        self.state = FieldState::Stopped;
    }

    /// Advances one integration step without notifying anybody.
    pub(in crate::app) fn step(&mut self) -> StepOutcome {
        match self.state {
            FieldState::Stopped => return StepOutcome::Stopped,
            FieldState::Settled => return StepOutcome::Settled,
            FieldState::Running => {}
        }

        self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;

        let vertex_count = self.positions.len();
        if vertex_count > 1 && self.params.charge != 0.0 {
            let strength_alpha = self.params.charge * self.alpha;
            let theta_sq = BARNES_HUT_THETA * BARNES_HUT_THETA;
            if let Some(root) = Cell::over(&self.positions) {
                self.scratch.clear();
                self.scratch.extend((0..vertex_count).map(|index| {
                    repulsion_on(&root, index, &self.positions, strength_alpha, theta_sq)
                }));
                for (velocity, delta) in self.velocities.iter_mut().zip(&self.scratch) {
                    *velocity += *delta;
                }
            }
        }

        apply_links(
            &self.links,
            &self.positions,
            &mut self.velocities,
            self.params.link_distance,
            self.alpha,
        );
        apply_axis_gravity(
            &self.positions,
            &mut self.velocities,
            self.center,
            vec2(self.params.gravity_x, self.params.gravity_y),
            self.alpha,
        );

        let retain = 1.0 - VELOCITY_DECAY;
        for ((position, velocity), pin) in self
            .positions
            .iter_mut()
            .zip(self.velocities.iter_mut())
            .zip(&self.pins)
        {
            if let Some(pin) = pin {
                *position = *pin;
                *velocity = Vec2::ZERO;
            } else {
                *velocity *= retain;
                *position += *velocity;
            }
        }

        if self.alpha < ALPHA_MIN {
            debug!("force field settled");
            self.state = FieldState::Settled;
            return StepOutcome::Settled;
        }
        StepOutcome::Running
    }

    /// One step followed by a synchronous observer callback.
    pub(in crate::app) fn tick(&mut self, observer: &mut dyn StepObserver) -> StepOutcome {
        let outcome = self.step();
        if outcome != StepOutcome::Stopped {
            observer.on_step(&self.positions);
        }
        outcome
    }
}

#[cfg(test)]
pub(in crate::app) mod tests {
    use super::*;
    use crate::market::{SignFilter, adapt_document};
    use crate::market::fixtures::two_companies_one_keyword;

    pub(in crate::app) struct CountingObserver {
        pub(in crate::app) calls: usize,
        pub(in crate::app) last: Vec<Vec2>,
    }

    impl CountingObserver {
        pub(in crate::app) fn new() -> Self {
            Self {
                calls: 0,
                last: Vec::new(),
            }
        }
    }

    impl StepObserver for CountingObserver {
        fn on_step(&mut self, positions: &[Vec2]) {
            self.calls += 1;
            self.last = positions.to_vec();
        }
    }

    fn edge(source: usize, target: usize, weight: f64) -> Edge {
        Edge {
            source_id: source.to_string(),
            target_id: target.to_string(),
            source,
            target,
            weight,
        }
    }

    fn run_to_rest(field: &mut ForceField, limit: usize) -> usize {
        for step in 0..limit {
            if field.step() != StepOutcome::Running {
                return step + 1;
            }
        }
        limit
    }

    #[test]
    fn construction_centres_the_seed() {
        let positions = vec![vec2(100.0, 100.0), vec2(120.0, 100.0)];
        let field = ForceField::new(positions, &[], SimParams::default(), Vec2::ZERO);

        let centroid = (field.positions()[0] + field.positions()[1]) * 0.5;
        assert!(centroid.length() < 1e-4);
    }

    #[test]
    fn settles_without_coincident_vertices() {
        let edges = [edge(0, 1, 0.9), edge(1, 2, 0.4), edge(2, 3, 0.7)];
        let edge_refs = edges.iter().collect::<Vec<_>>();
        let mut field = ForceField::new(
            seed_positions(12, Vec2::ZERO),
            &edge_refs,
            SimParams::default(),
            Vec2::ZERO,
        );

        let steps = run_to_rest(&mut field, 2_000);
        assert!(steps < 2_000);
        assert!(!field.is_running());

        let positions = field.positions();
        for first in 0..positions.len() {
            for second in (first + 1)..positions.len() {
                assert_ne!(positions[first], positions[second]);
            }
        }
    }

    #[test]
    fn coincident_seed_is_untangled() {
        let mut field = ForceField::new(
            vec![Vec2::ZERO; 5],
            &[],
            SimParams::default(),
            Vec2::ZERO,
        );
        run_to_rest(&mut field, 2_000);

        let positions = field.positions();
        for first in 0..positions.len() {
            for second in (first + 1)..positions.len() {
                assert!((positions[first] - positions[second]).length() > 1.0);
            }
        }
    }

    #[test]
    fn pinned_vertex_holds_position_until_released() {
        let edges = [edge(0, 1, 1.0), edge(0, 2, 1.0)];
        let edge_refs = edges.iter().collect::<Vec<_>>();
        let mut field = ForceField::new(
            seed_positions(4, Vec2::ZERO),
            &edge_refs,
            SimParams::default(),
            Vec2::ZERO,
        );

        let pinned_at = vec2(40.0, -25.0);
        field.pin(0, pinned_at);
        for _ in 0..50 {
            field.step();
            assert_eq!(field.position(0), Some(pinned_at));
        }

        field.unpin(0);
        field.step();
        assert_ne!(field.position(0), Some(pinned_at));
    }

    #[test]
    fn parameter_change_reheats_a_settled_field() {
        let mut field = ForceField::new(
            seed_positions(6, Vec2::ZERO),
            &[],
            SimParams::default(),
            Vec2::ZERO,
        );
        run_to_rest(&mut field, 2_000);
        assert!(!field.is_running());

        let before = field.positions().to_vec();
        let params = SimParams {
            charge: -900.0,
            ..SimParams::default()
        };
        assert_eq!(field.set_parameters(params), Reheat::Resumed);
        assert!(field.is_running());
        assert_eq!(field.alpha(), 1.0);
        assert_eq!(field.params().charge, -900.0);

        assert_eq!(field.step(), StepOutcome::Running);
        assert_ne!(field.positions(), before.as_slice());
    }

    #[test]
    fn parameters_are_clamped_on_entry() {
        let mut field =
            ForceField::new(seed_positions(2, Vec2::ZERO), &[], SimParams::default(), Vec2::ZERO);
        field.set_parameters(SimParams {
            gravity_x: 4.0,
            gravity_y: 0.2,
            ..SimParams::default()
        });
        assert_eq!(field.params().gravity_x, 1.0);
        assert_eq!(field.params().gravity_y, 0.2);
    }

    #[test]
    fn link_strength_follows_multiplier_changes() {
        let edges = [edge(0, 1, 0.4)];
        let edge_refs = edges.iter().collect::<Vec<_>>();
        let mut field = ForceField::new(
            seed_positions(2, Vec2::ZERO),
            &edge_refs,
            SimParams::default(),
            Vec2::ZERO,
        );
        assert!((field.links[0].strength - 0.4).abs() < 1e-6);

        field.set_parameters(SimParams {
            link_strength_scale: 5.0,
            ..SimParams::default()
        });
        assert_eq!(field.links[0].strength, 1.0);
    }

    #[test]
    fn zero_decay_never_settles() {
        let params = SimParams {
            alpha_decay: 0.0,
            ..SimParams::default()
        };
        let mut field = ForceField::new(seed_positions(3, Vec2::ZERO), &[], params, Vec2::ZERO);

        for _ in 0..1_000 {
            assert_eq!(field.step(), StepOutcome::Running);
        }
        assert_eq!(field.alpha(), 1.0);
    }

    #[test]
    fn stopped_field_does_no_work() {
        let mut field =
            ForceField::new(seed_positions(5, Vec2::ZERO), &[], SimParams::default(), Vec2::ZERO);
        field.stop();
        let frozen = field.positions().to_vec();
        let mut observer = CountingObserver::new();

        assert_eq!(field.tick(&mut observer), StepOutcome::Stopped);
        assert_eq!(observer.calls, 0);
        assert_eq!(field.positions(), frozen.as_slice());
        assert_eq!(field.set_parameters(SimParams::default()), Reheat::Ignored);
        assert_eq!(field.begin_interaction(), Reheat::Ignored);
        assert!(field.is_stopped());
    }

    #[test]
    fn observer_sees_every_step() {
        let mut field =
            ForceField::new(seed_positions(3, Vec2::ZERO), &[], SimParams::default(), Vec2::ZERO);
        let mut observer = CountingObserver::new();

        for _ in 0..4 {
            field.tick(&mut observer);
        }

        assert_eq!(observer.calls, 4);
        assert_eq!(observer.last.as_slice(), field.positions());
    }

    #[test]
    fn hidden_edges_exert_no_attraction() {
        let graph = adapt_document(&two_companies_one_keyword()).graph;

        let positive = graph.visible_edges(SignFilter::Positive);
        let mut filtered = ForceField::for_graph(&graph, &positive, SimParams::default());
        let only_a = graph
            .edges
            .iter()
            .filter(|edge| edge.source_id == "A")
            .collect::<Vec<_>>();
        let mut reference = ForceField::new(
            seed_positions(graph.vertex_count(), Vec2::ZERO),
            &only_a,
            SimParams::default(),
            Vec2::ZERO,
        );

        assert_eq!(filtered.link_count(), 1);
        for _ in 0..30 {
            filtered.step();
            reference.step();
        }
        assert_eq!(filtered.positions(), reference.positions());

        let negative = graph.visible_edges(SignFilter::Negative);
        let negative_edges = negative
            .iter()
            .map(|&index| &graph.edges[index])
            .collect::<Vec<_>>();
        filtered.set_links(&negative_edges);
        let endpoints = filtered.link_endpoints().collect::<Vec<_>>();
        assert_eq!(endpoints, vec![(graph.index_by_id["B"], graph.index_by_id["k"])]);
    }

    #[test]
    fn interaction_keeps_energy_up_until_released() {
        let mut field =
            ForceField::new(seed_positions(4, Vec2::ZERO), &[], SimParams::default(), Vec2::ZERO);
        run_to_rest(&mut field, 2_000);

        assert_eq!(field.begin_interaction(), Reheat::Resumed);
        for _ in 0..500 {
            assert_eq!(field.step(), StepOutcome::Running);
        }
        assert!((field.alpha() - INTERACTION_ALPHA_TARGET).abs() < 0.01);

        field.end_interaction();
        let steps = run_to_rest(&mut field, 2_000);
        assert!(steps < 2_000);
    }
}

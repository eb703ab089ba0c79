use eframe::egui::{Vec2, vec2};

use super::quadtree::Cell;

/// Below this squared distance the inverse-square falloff is softened.
const MIN_DISTANCE_SQ: f32 = 1.0;
const JIGGLE: f32 = 1e-3;

#[derive(Clone, Copy, Debug)]
pub(super) struct Link {
    pub(super) source: usize,
    pub(super) target: usize,
    pub(super) strength: f32,
    /// Share of the correction applied to the target end.
    pub(super) bias: f32,
}

/// Deterministic unit-ish offset used when two points coincide. Antisymmetric
/// in `(from, to)` so the pair is pushed apart instead of drifting together.
fn jiggle(from: usize, to: usize) -> Vec2 {
    let (low, high) = if from < to { (from, to) } else { (to, from) };
    let angle = ((low as f32) * 0.618_034 + (high as f32) * 0.414_214) * std::f32::consts::TAU;
    let direction = vec2(angle.cos(), angle.sin()) * JIGGLE;
    if from < to { direction } else { -direction }
}

fn softened(distance_sq: f32) -> f32 {
    if distance_sq < MIN_DISTANCE_SQ {
        (MIN_DISTANCE_SQ * distance_sq).sqrt()
    } else {
        distance_sq
    }
}

/// Many-body velocity change on vertex `index` from everything in `cell`.
///
/// A cell the vertex lies outside of, and whose width is small against its
/// distance (`width² < θ² · d²`), acts as a single charge at its centroid.
pub(super) fn repulsion_on(
    cell: &Cell,
    index: usize,
    positions: &[Vec2],
    strength_alpha: f32,
    theta_sq: f32,
) -> Vec2 {
    if cell.charge <= 0.0 {
        return Vec2::ZERO;
    }
    let point = positions[index];

    if cell.is_leaf() {
        return cell
            .members
            .iter()
            .filter(|&&other| other != index)
            .map(|&other| {
                let mut delta = positions[other] - point;
                if delta.length_sq() == 0.0 {
                    delta = jiggle(other, index);
                }
                delta * (strength_alpha / softened(delta.length_sq()))
            })
            .fold(Vec2::ZERO, |sum, push| sum + push);
    }

    let delta = cell.centroid - point;
    let distance_sq = delta.length_sq();
    let width = cell.square.width();
    if !cell.square.contains(point) && distance_sq > 0.0 && width * width < theta_sq * distance_sq {
        return delta * (strength_alpha * cell.charge / softened(distance_sq));
    }

    cell.children()
        .map(|child| repulsion_on(child, index, positions, strength_alpha, theta_sq))
        .fold(Vec2::ZERO, |sum, push| sum + push)
}

/// Springs toward `distance`; reads positions advanced by the current velocity.
pub(super) fn apply_links(
    links: &[Link],
    positions: &[Vec2],
    velocities: &mut [Vec2],
    distance: f32,
    alpha: f32,
) {
    for link in links {
        let (source, target) = (link.source, link.target);
        if source == target || link.strength <= 0.0 {
            continue;
        }

        let mut delta =
            (positions[target] + velocities[target]) - (positions[source] + velocities[source]);
        if delta.length_sq() == 0.0 {
            delta = jiggle(source, target);
        }

        let length = delta.length();
        let correction = delta * ((length - distance) / length * alpha * link.strength);

        velocities[target] -= correction * link.bias;
        velocities[source] += correction * (1.0 - link.bias);
    }
}

/// Independent pulls toward the vertical (`strength.x`) and horizontal
/// (`strength.y`) midlines through `center`.
pub(super) fn apply_axis_gravity(
    positions: &[Vec2],
    velocities: &mut [Vec2],
    center: Vec2,
    strength: Vec2,
    alpha: f32,
) {
    if strength.x <= 0.0 && strength.y <= 0.0 {
        return;
    }

    let scale = strength * alpha;
    for (position, velocity) in positions.iter().zip(velocities.iter_mut()) {
        velocity.x += (center.x - position.x) * scale.x;
        velocity.y += (center.y - position.y) * scale.y;
    }
}

/// Shifts every point so the centroid lands on `center`.
pub(super) fn center_of_mass_shift(positions: &mut [Vec2], center: Vec2) {
    if positions.is_empty() {
        return;
    }

    let centroid =
        positions.iter().fold(Vec2::ZERO, |sum, point| sum + *point) / positions.len() as f32;
    let shift = center - centroid;
    for position in positions {
        *position += shift;
    }
}

/// Degree-weighted bias: the lower-degree end of a link moves more.
pub(super) fn link_biases(links: &mut [Link], vertex_count: usize) {
    let mut degree = vec![0usize; vertex_count];
    for link in links.iter() {
        degree[link.source] += 1;
        degree[link.target] += 1;
    }

    for link in links.iter_mut() {
        let source = degree[link.source] as f32;
        let target = degree[link.target] as f32;
        link.bias = source / (source + target);
    }
}

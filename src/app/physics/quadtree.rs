use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 12;
const MAX_DEPTH: usize = 10;

/// Axis-aligned square region of the layout plane.
#[derive(Clone, Copy, Debug)]
pub(super) struct Square {
    pub(super) center: Vec2,
    pub(super) half: f32,
}

impl Square {
    /// Smallest padded square around `points`; `None` for no points or any
    /// non-finite coordinate.
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let (min, max) = points.iter().try_fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(min, max), point| {
                (point.x.is_finite() && point.y.is_finite())
                    .then(|| (min.min(*point), max.max(*point)))
            },
        )?;

        let extent = (max - min).max_elem().max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half: extent * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let offset = point - self.center;
        offset.x.abs() <= self.half && offset.y.abs() <= self.half
    }

    pub(super) fn width(self) -> f32 {
        2.0 * self.half
    }

    /// Quadrant index: bit 0 set east of center, bit 1 set south of center.
    fn quadrant_of(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | usize::from(point.y >= self.center.y) << 1
    }

    fn quadrant(self, index: usize) -> Self {
        let half = self.half * 0.5;
        let sign = |bit: usize| if index & bit == 0 { -half } else { half };
        Self {
            center: self.center + vec2(sign(1), sign(2)),
            half,
        }
    }
}

/// Barnes-Hut cell. Vertices carry unit charge, so `charge` counts them.
pub(super) struct Cell {
    pub(super) square: Square,
    pub(super) centroid: Vec2,
    pub(super) charge: f32,
    /// Vertex indices held directly; empty once the cell is split.
    pub(super) members: Vec<usize>,
    pub(super) quadrants: [Option<Box<Cell>>; 4],
}

impl Cell {
    pub(super) fn over(positions: &[Vec2]) -> Option<Self> {
        let square = Square::enclosing(positions)?;
        Some(Self::grow(square, (0..positions.len()).collect(), positions, 0))
    }

    fn grow(square: Square, members: Vec<usize>, positions: &[Vec2], depth: usize) -> Self {
        let charge = members.len() as f32;
        let sum = members
            .iter()
            .fold(Vec2::ZERO, |sum, &member| sum + positions[member]);
        let mut cell = Self {
            square,
            centroid: if charge > 0.0 { sum / charge } else { Vec2::ZERO },
            charge,
            members,
            quadrants: Default::default(),
        };
        if depth >= MAX_DEPTH || cell.members.len() <= LEAF_CAPACITY {
            return cell;
        }

        let mut split: [Vec<usize>; 4] = Default::default();
        for &member in &cell.members {
            split[square.quadrant_of(positions[member])].push(member);
        }
        // all members share one quadrant (coincident points): keep as a leaf
        if split.iter().any(|part| part.len() == cell.members.len()) {
            return cell;
        }

        for (index, part) in split.into_iter().enumerate() {
            if !part.is_empty() {
                cell.quadrants[index] = Some(Box::new(Self::grow(
                    square.quadrant(index),
                    part,
                    positions,
                    depth + 1,
                )));
            }
        }
        cell.members = Vec::new();
        cell
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.quadrants.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = &Cell> {
        self.quadrants.iter().flatten().map(Box::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_loads(cell: &Cell) -> Vec<usize> {
        if cell.is_leaf() {
            return vec![cell.members.len()];
        }
        cell.children().flat_map(leaf_loads).collect()
    }

    #[test]
    fn no_points_means_no_cell() {
        assert!(Cell::over(&[]).is_none());
        assert!(Cell::over(&[vec2(1.0, f32::NAN)]).is_none());
    }

    #[test]
    fn root_aggregates_every_point() {
        let positions = (0..50)
            .map(|index| vec2((index % 10) as f32 * 13.0, (index / 10) as f32 * 7.0))
            .collect::<Vec<_>>();
        let root = Cell::over(&positions).unwrap();

        assert_eq!(root.charge, 50.0);
        let mean = positions.iter().fold(Vec2::ZERO, |sum, point| sum + *point) / 50.0;
        assert!((root.centroid - mean).length() < 1e-3);
        assert!(positions.iter().all(|point| root.square.contains(*point)));

        let loads = leaf_loads(&root);
        assert_eq!(loads.iter().sum::<usize>(), 50);
        assert!(loads.iter().all(|load| *load <= LEAF_CAPACITY));
    }

    #[test]
    fn quadrants_tile_the_parent() {
        let square = Square {
            center: vec2(10.0, 20.0),
            half: 8.0,
        };
        for index in 0..4 {
            let quadrant = square.quadrant(index);
            assert_eq!(quadrant.half, 4.0);
            assert_eq!(square.quadrant_of(quadrant.center), index);
        }
    }

    #[test]
    fn coincident_points_stay_in_one_leaf() {
        let positions = vec![vec2(4.0, 4.0); 30];
        let root = Cell::over(&positions).unwrap();

        assert!(root.is_leaf());
        assert_eq!(root.members.len(), 30);
    }
}

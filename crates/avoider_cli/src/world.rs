//! Demo world backing the oracle traits.
//!
//! A flat square arena with axis-aligned box obstacles. Sight is a
//! first-hit scan of the ray against every box plus the adversary's sphere;
//! reachability is a 4-connected BFS over a walkable grid derived from the
//! obstacle footprints. Good enough to exercise the avoider end to end
//! without an engine.

use avoider_core::{BodyId, BodyLookup, NavQuery, PathStatus, RaycastResult, SightQuery};
use nalgebra::Vector3;
use std::collections::VecDeque;

/// Radius of the adversary's collision sphere.
const ADVERSARY_RADIUS: f32 = 0.5;
/// Walkable-grid cell size in world units.
const NAV_CELL: f32 = 1.0;

#[derive(Debug, Clone, Copy)]
pub struct Obstacle {
    pub body: BodyId,
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

pub struct DemoWorld {
    size: f32,
    cols: usize,
    /// Per-cell walkability, row-major over the arena footprint.
    walkable: Vec<bool>,
    obstacles: Vec<Obstacle>,
    adversary: BodyId,
    adversary_position: Vector3<f32>,
}

impl DemoWorld {
    pub fn new(size: f32, adversary: BodyId, obstacles: Vec<Obstacle>) -> Self {
        let cols = (size / NAV_CELL).ceil().max(1.0) as usize;
        let mut world = Self {
            size,
            cols,
            walkable: vec![true; cols * cols],
            obstacles,
            adversary,
            adversary_position: Vector3::zeros(),
        };
        world.rebuild_walkable();
        world
    }

    pub fn set_adversary_position(&mut self, position: Vector3<f32>) {
        self.adversary_position = position;
    }

    pub fn adversary_position(&self) -> Vector3<f32> {
        self.adversary_position
    }

    /// A cell is walkable when its center is outside every obstacle
    /// footprint (x/z extents; obstacle height is ignored for walkability).
    fn rebuild_walkable(&mut self) {
        for row in 0..self.cols {
            for col in 0..self.cols {
                let x = (col as f32 + 0.5) * NAV_CELL;
                let z = (row as f32 + 0.5) * NAV_CELL;
                let blocked = self.obstacles.iter().any(|o| {
                    x >= o.min.x && x <= o.max.x && z >= o.min.z && z <= o.max.z
                });
                self.walkable[row * self.cols + col] = !blocked;
            }
        }
    }

    fn cell_of(&self, position: Vector3<f32>) -> Option<(usize, usize)> {
        if position.x < 0.0 || position.x >= self.size || position.z < 0.0 || position.z >= self.size
        {
            return None;
        }
        let col = ((position.x / NAV_CELL) as usize).min(self.cols - 1);
        let row = ((position.z / NAV_CELL) as usize).min(self.cols - 1);
        Some((col, row))
    }

    fn is_walkable(&self, col: usize, row: usize) -> bool {
        self.walkable[row * self.cols + col]
    }
}

/// First intersection parameter of `origin + t * direction` with the box,
/// or `None` on a miss. `t` is in units of the (unnormalized) direction.
fn ray_box(origin: Vector3<f32>, direction: Vector3<f32>, o: &Obstacle) -> Option<f32> {
    let mut t_enter = 0.0f32;
    let mut t_exit = f32::INFINITY;
    for axis in 0..3 {
        let start = origin[axis];
        let d = direction[axis];
        if d.abs() < 1e-9 {
            if start < o.min[axis] || start > o.max[axis] {
                return None;
            }
        } else {
            let t1 = (o.min[axis] - start) / d;
            let t2 = (o.max[axis] - start) / d;
            let (lo, hi) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
            t_enter = t_enter.max(lo);
            t_exit = t_exit.min(hi);
            if t_enter > t_exit {
                return None;
            }
        }
    }
    Some(t_enter)
}

/// First intersection parameter with a sphere, same parameterization as
/// [`ray_box`].
fn ray_sphere(
    origin: Vector3<f32>,
    direction: Vector3<f32>,
    center: Vector3<f32>,
    radius: f32,
) -> Option<f32> {
    let a = direction.dot(&direction);
    if a < 1e-12 {
        return None;
    }
    let m = origin - center;
    let b = m.dot(&direction);
    let c = m.dot(&m) - radius * radius;
    if c > 0.0 && b > 0.0 {
        return None;
    }
    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    Some(((-b - discriminant.sqrt()) / a).max(0.0))
}

impl SightQuery for DemoWorld {
    fn raycast(&self, origin: Vector3<f32>, direction: Vector3<f32>) -> RaycastResult {
        let mut first: Option<(f32, BodyId)> = None;

        for obstacle in &self.obstacles {
            if let Some(t) = ray_box(origin, direction, obstacle) {
                if first.map_or(true, |(best, _)| t < best) {
                    first = Some((t, obstacle.body));
                }
            }
        }
        if let Some(t) =
            ray_sphere(origin, direction, self.adversary_position, ADVERSARY_RADIUS)
        {
            if first.map_or(true, |(best, _)| t < best) {
                first = Some((t, self.adversary));
            }
        }

        match first {
            Some((t, body)) => RaycastResult::Hit { body, point: origin + direction * t },
            None => RaycastResult::Miss,
        }
    }
}

impl NavQuery for DemoWorld {
    fn compute_path(&self, from: Vector3<f32>, to: Vector3<f32>) -> PathStatus {
        let (Some(start), Some(goal)) = (self.cell_of(from), self.cell_of(to)) else {
            return PathStatus::Invalid;
        };
        if !self.is_walkable(start.0, start.1) {
            return PathStatus::Invalid;
        }
        if !self.is_walkable(goal.0, goal.1) {
            return PathStatus::Partial;
        }
        if start == goal {
            return PathStatus::Complete;
        }

        let mut visited = vec![false; self.cols * self.cols];
        let mut queue = VecDeque::new();
        visited[start.1 * self.cols + start.0] = true;
        queue.push_back(start);

        while let Some((col, row)) = queue.pop_front() {
            let neighbors = [
                (col.wrapping_sub(1), row),
                (col + 1, row),
                (col, row.wrapping_sub(1)),
                (col, row + 1),
            ];
            for (c, r) in neighbors {
                if c >= self.cols || r >= self.cols {
                    continue;
                }
                if visited[r * self.cols + c] || !self.is_walkable(c, r) {
                    continue;
                }
                if (c, r) == goal {
                    return PathStatus::Complete;
                }
                visited[r * self.cols + c] = true;
                queue.push_back((c, r));
            }
        }
        PathStatus::Partial
    }
}

impl BodyLookup for DemoWorld {
    fn position_of(&self, body: BodyId) -> Option<Vector3<f32>> {
        (body == self.adversary).then_some(self.adversary_position)
    }
}

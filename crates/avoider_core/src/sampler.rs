//! Poisson-disc ("blue noise") sampling over a 2D rectangle.
//!
//! Bridson's algorithm: points cover the region roughly evenly with a
//! guaranteed minimum pairwise separation. A background grid with cell size
//! `min_distance / sqrt(2)` holds at most one point per cell, so a candidate
//! only needs to check the 5x5 cell neighborhood around it.
//!
//! Bounds convention is half-open: every emitted point lies in
//! `[0, width) x [0, height)`.
//!
//! The sampler is lazy and one-shot. Iteration ends when the active list
//! drains; a fresh sampler re-randomizes unless constructed with `with_seed`.

use nalgebra::Vector2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Candidate attempts per active point before the point is retired.
const MAX_ATTEMPTS: u32 = 30;

/// Lazy Poisson-disc point sequence over `[0, width) x [0, height)`.
pub struct PoissonDiscSampler {
    width: f32,
    height: f32,
    min_distance: f32,
    cell_size: f32,
    cols: usize,
    rows: usize,
    /// One point per cell; cell diagonal equals `min_distance`, so two points
    /// in the same cell would violate the separation invariant.
    grid: Vec<Option<Vector2<f32>>>,
    active: Vec<Vector2<f32>>,
    rng: ChaCha8Rng,
    started: bool,
    emitted: usize,
    cap: Option<usize>,
    degenerate: bool,
}

impl PoissonDiscSampler {
    /// Sampler with a fresh entropy seed. No determinism across calls.
    pub fn new(width: f32, height: f32, min_distance: f32) -> Self {
        Self::with_rng(width, height, min_distance, ChaCha8Rng::from_entropy())
    }

    /// Deterministic sampler: the same seed replays the same sequence.
    pub fn with_seed(width: f32, height: f32, min_distance: f32, seed: u64) -> Self {
        Self::with_rng(width, height, min_distance, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(width: f32, height: f32, min_distance: f32, rng: ChaCha8Rng) -> Self {
        let degenerate = !(width > 0.0 && height > 0.0 && min_distance > 0.0)
            || !width.is_finite()
            || !height.is_finite()
            || !min_distance.is_finite();

        let (cell_size, cols, rows) = if degenerate {
            (0.0, 0, 0)
        } else {
            let cell = min_distance / std::f32::consts::SQRT_2;
            let cols = (width / cell).ceil().max(1.0) as usize;
            let rows = (height / cell).ceil().max(1.0) as usize;
            (cell, cols, rows)
        };

        Self {
            width,
            height,
            min_distance,
            cell_size,
            cols,
            rows,
            grid: vec![None; cols * rows],
            active: Vec::new(),
            rng,
            started: false,
            emitted: 0,
            cap: None,
            degenerate,
        }
    }

    /// Cap the sequence at `n` points even while the active list is non-empty.
    /// Host-side cost control; the uncapped sequence is already finite.
    pub fn max_points(mut self, n: usize) -> Self {
        self.cap = Some(n);
        self
    }

    #[inline]
    fn cell_of(&self, point: Vector2<f32>) -> (usize, usize) {
        let col = ((point.x / self.cell_size) as usize).min(self.cols - 1);
        let row = ((point.y / self.cell_size) as usize).min(self.rows - 1);
        (col, row)
    }

    #[inline]
    fn in_bounds(&self, point: Vector2<f32>) -> bool {
        point.x >= 0.0 && point.x < self.width && point.y >= 0.0 && point.y < self.height
    }

    /// True when `candidate` keeps the minimum separation from every stored
    /// point. Only the 5x5 neighborhood can contain a violating point.
    fn far_enough(&self, candidate: Vector2<f32>) -> bool {
        let (col, row) = self.cell_of(candidate);
        let col_lo = col.saturating_sub(2);
        let row_lo = row.saturating_sub(2);
        let col_hi = (col + 2).min(self.cols - 1);
        let row_hi = (row + 2).min(self.rows - 1);

        for r in row_lo..=row_hi {
            for c in col_lo..=col_hi {
                if let Some(stored) = self.grid[r * self.cols + c] {
                    if (stored - candidate).norm() < self.min_distance {
                        return false;
                    }
                }
            }
        }
        true
    }

    fn accept(&mut self, point: Vector2<f32>) {
        let (col, row) = self.cell_of(point);
        self.grid[row * self.cols + col] = Some(point);
        self.active.push(point);
        self.emitted += 1;
    }

    /// Random point in the annulus `[min_distance, 2 * min_distance]` around
    /// `center`.
    fn annulus_candidate(&mut self, center: Vector2<f32>) -> Vector2<f32> {
        let radius = self.rng.gen_range(self.min_distance..=2.0 * self.min_distance);
        let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
        center + Vector2::new(radius * angle.cos(), radius * angle.sin())
    }
}

impl Iterator for PoissonDiscSampler {
    type Item = Vector2<f32>;

    fn next(&mut self) -> Option<Vector2<f32>> {
        if self.degenerate {
            return None;
        }
        if let Some(cap) = self.cap {
            if self.emitted >= cap {
                return None;
            }
        }

        if !self.started {
            self.started = true;
            let seed = Vector2::new(
                self.rng.gen_range(0.0..self.width),
                self.rng.gen_range(0.0..self.height),
            );
            self.accept(seed);
            return Some(seed);
        }

        while !self.active.is_empty() {
            let index = self.rng.gen_range(0..self.active.len());
            let center = self.active[index];

            for _ in 0..MAX_ATTEMPTS {
                let candidate = self.annulus_candidate(center);
                if self.in_bounds(candidate) && self.far_enough(candidate) {
                    self.accept(candidate);
                    return Some(candidate);
                }
            }

            // Retired points stay in the grid (and the output), they just
            // stop spawning candidates. The active list shrinks monotonically
            // between acceptances, so iteration always terminates.
            self.active.swap_remove(index);
        }

        None
    }
}

//! Line-of-sight avoidance behavior.
//!
//! Each tick the avoider checks whether the tracked adversary can see the
//! agent. While hidden it holds position. Once spotted it samples a disc of
//! candidate offsets around the agent (Poisson-disc, so candidates cover the
//! search region evenly), keeps the candidates that break line of sight and
//! are reachable on the navmesh, and moves toward the nearest one.
//!
//! The avoider only ever emits a destination; steering toward it is the
//! host's job.

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::AvoiderError;
use crate::sampler::PoissonDiscSampler;
use crate::world::{BodyId, PathStatus, RaycastResult, SightQuery, WorldServices};

/// Tuning knobs for one avoider instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AvoiderConfig {
    /// Search radius around the agent. The sampled region is the square
    /// `2*range x 2*range` centered on the agent, so corner candidates can
    /// exceed `range` in magnitude. Accepted quirk, kept from the original
    /// behavior.
    pub range: f32,
    /// Minimum separation between candidate spots. Independent of `range`.
    pub sample_spacing: f32,
    /// Gate for the debug snapshot accessor.
    pub show_gizmos: bool,
    /// `Some` makes every run replayable: cycle `n` samples with a seed
    /// derived from this value and `n`. `None` re-randomizes each search.
    pub seed: Option<u64>,
}

impl Default for AvoiderConfig {
    fn default() -> Self {
        Self { range: 4.0, sample_spacing: 5.0, show_gizmos: true, seed: None }
    }
}

impl AvoiderConfig {
    pub fn validate(&self) -> Result<(), AvoiderError> {
        if !(self.range > 0.0 && self.range.is_finite()) {
            return Err(AvoiderError::InvalidRange { value: self.range });
        }
        if !(self.sample_spacing > 0.0 && self.sample_spacing.is_finite()) {
            return Err(AvoiderError::InvalidSpacing { value: self.sample_spacing });
        }
        Ok(())
    }
}

/// Snapshot of the most recent hiding-spot search, for debug overlays.
///
/// Only updated on cycles where the adversary was visible; otherwise the
/// previous snapshot persists unchanged. `cycle` says which evaluation the
/// data belongs to, so a host can tell a fresh search from a stale one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugSnapshot {
    /// Planar candidate offsets, centered on the agent, in sample order.
    pub samples: Vec<Vector2<f32>>,
    /// Best offset found, `None` when no candidate passed the filters.
    pub nearest: Option<Vector3<f32>>,
    /// Evaluation cycle this snapshot was computed on (first cycle is 1).
    pub cycle: u64,
}

/// Hiding-spot selector for a single agent avoiding a single adversary.
pub struct Avoider {
    config: AvoiderConfig,
    adversary: Option<BodyId>,
    cycle: u64,
    nav_warned: bool,
    snapshot: Option<DebugSnapshot>,
}

impl Avoider {
    pub fn new(config: AvoiderConfig, adversary: Option<BodyId>) -> Result<Self, AvoiderError> {
        config.validate()?;
        if adversary.is_none() {
            log::warn!("avoider has no adversary configured; it will hold position");
        }
        Ok(Self { config, adversary, cycle: 0, nav_warned: false, snapshot: None })
    }

    pub fn config(&self) -> &AvoiderConfig {
        &self.config
    }

    pub fn adversary(&self) -> Option<BodyId> {
        self.adversary
    }

    pub fn set_show_gizmos(&mut self, enabled: bool) {
        self.config.show_gizmos = enabled;
    }

    /// Last search snapshot, `None` while gizmos are disabled or before the
    /// first search.
    pub fn debug_snapshot(&self) -> Option<&DebugSnapshot> {
        if self.config.show_gizmos {
            self.snapshot.as_ref()
        } else {
            None
        }
    }

    /// One evaluation cycle. Returns the destination the host should steer
    /// toward; returning `agent_position` means hold.
    ///
    /// Never fails: an absent adversary, an unresolvable adversary body, or a
    /// fruitless search all degrade to hold-position.
    pub fn evaluate(&mut self, agent_position: Vector3<f32>, world: &WorldServices) -> Vector3<f32> {
        self.cycle += 1;

        let Some(adversary) = self.adversary else {
            return agent_position;
        };
        let Some(adversary_position) = world.bodies.position_of(adversary) else {
            log::debug!("adversary body {:?} unresolvable this cycle; holding", adversary);
            return agent_position;
        };

        if !Self::is_visible(world.sight, agent_position, adversary_position, adversary) {
            // Hidden: hold, and leave the previous search snapshot untouched.
            return agent_position;
        }

        log::debug!("cycle {}: in adversary line of sight, searching for cover", self.cycle);
        match self.find_nearest_hiding_spot(agent_position, adversary_position, adversary, world) {
            Some(offset) => agent_position + offset,
            None => agent_position,
        }
    }

    /// Sample candidate offsets around the agent and pick the nearest one
    /// that breaks line of sight and is reachable.
    fn find_nearest_hiding_spot(
        &mut self,
        agent_position: Vector3<f32>,
        adversary_position: Vector3<f32>,
        adversary: BodyId,
        world: &WorldServices,
    ) -> Option<Vector3<f32>> {
        let range = self.config.range;
        let side = 2.0 * range;
        let sampler = match self.config.seed {
            Some(seed) => PoissonDiscSampler::with_seed(
                side,
                side,
                self.config.sample_spacing,
                seed ^ self.cycle,
            ),
            None => PoissonDiscSampler::new(side, side, self.config.sample_spacing),
        };
        // Re-center raw samples so offsets are relative to the agent.
        let offsets: Vec<Vector2<f32>> =
            sampler.map(|sample| sample - Vector2::new(range, range)).collect();

        self.select_nearest(agent_position, adversary_position, adversary, world, offsets)
    }

    /// Scan `offsets` in order, keeping the minimum-magnitude offset whose
    /// spot is hidden from the adversary and reachable. Strict `<` on the
    /// magnitude, so the first minimal candidate in sample order wins.
    /// Records the search snapshot as a side effect.
    fn select_nearest(
        &mut self,
        agent_position: Vector3<f32>,
        adversary_position: Vector3<f32>,
        adversary: BodyId,
        world: &WorldServices,
        offsets: Vec<Vector2<f32>>,
    ) -> Option<Vector3<f32>> {
        let mut nearest: Option<Vector3<f32>> = None;

        for centered in &offsets {
            let offset = Vector3::new(centered.x, 0.0, centered.y);
            let spot = agent_position + offset;

            if !Self::is_visible(world.sight, spot, adversary_position, adversary)
                && self.is_reachable(agent_position, spot, world)
                && offset.norm() < nearest.map_or(f32::INFINITY, |best| best.norm())
            {
                nearest = Some(offset);
            }
        }

        self.snapshot = Some(DebugSnapshot { samples: offsets, nearest, cycle: self.cycle });
        nearest
    }

    /// True when the first thing a ray from `from` toward the adversary hits
    /// is the adversary's own body. A ray that hits nothing at all means not
    /// visible.
    fn is_visible(
        sight: &dyn SightQuery,
        from: Vector3<f32>,
        adversary_position: Vector3<f32>,
        adversary: BodyId,
    ) -> bool {
        match sight.raycast(from, adversary_position - from) {
            RaycastResult::Hit { body, .. } => body == adversary,
            RaycastResult::Miss => false,
        }
    }

    /// True when the navmesh yields a complete path from the agent's current
    /// position to `spot` (agent is the path start, the candidate the
    /// destination). Without a nav capability every spot is unreachable.
    fn is_reachable(
        &mut self,
        agent_position: Vector3<f32>,
        spot: Vector3<f32>,
        world: &WorldServices,
    ) -> bool {
        match world.nav {
            Some(nav) => nav.compute_path(agent_position, spot) == PathStatus::Complete,
            None => {
                if !self.nav_warned {
                    log::warn!(
                        "avoider has no navigation capability; treating all spots as unreachable"
                    );
                    self.nav_warned = true;
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{BodyLookup, NavQuery};
    use std::cell::Cell;

    const ADVERSARY: BodyId = BodyId(7);

    /// Scripted world: the adversary is visible from every origin except the
    /// listed hidden ones, and every destination is reachable except the
    /// listed unreachable ones. Counts oracle calls.
    struct ScriptedWorld {
        adversary_position: Vector3<f32>,
        hidden_from: Vec<Vector3<f32>>,
        unreachable: Vec<Vector3<f32>>,
        raycasts: Cell<usize>,
        paths: Cell<usize>,
    }

    impl ScriptedWorld {
        fn new(adversary_position: Vector3<f32>) -> Self {
            Self {
                adversary_position,
                hidden_from: Vec::new(),
                unreachable: Vec::new(),
                raycasts: Cell::new(0),
                paths: Cell::new(0),
            }
        }

        fn matches(list: &[Vector3<f32>], p: Vector3<f32>) -> bool {
            list.iter().any(|q| (q - p).norm() < 1e-3)
        }
    }

    impl SightQuery for ScriptedWorld {
        fn raycast(&self, origin: Vector3<f32>, _direction: Vector3<f32>) -> RaycastResult {
            self.raycasts.set(self.raycasts.get() + 1);
            if Self::matches(&self.hidden_from, origin) {
                RaycastResult::Miss
            } else {
                RaycastResult::Hit { body: ADVERSARY, point: self.adversary_position }
            }
        }
    }

    impl NavQuery for ScriptedWorld {
        fn compute_path(&self, _from: Vector3<f32>, to: Vector3<f32>) -> PathStatus {
            self.paths.set(self.paths.get() + 1);
            if Self::matches(&self.unreachable, to) {
                PathStatus::Partial
            } else {
                PathStatus::Complete
            }
        }
    }

    impl BodyLookup for ScriptedWorld {
        fn position_of(&self, body: BodyId) -> Option<Vector3<f32>> {
            (body == ADVERSARY).then_some(self.adversary_position)
        }
    }

    fn services(world: &ScriptedWorld) -> WorldServices<'_> {
        WorldServices { sight: world, nav: Some(world), bodies: world }
    }

    fn seeded_avoider(adversary: Option<BodyId>) -> Avoider {
        let config = AvoiderConfig { seed: Some(1234), ..Default::default() };
        Avoider::new(config, adversary).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = AvoiderConfig { range: 0.0, ..Default::default() };
        assert_eq!(
            Avoider::new(bad, Some(ADVERSARY)).err(),
            Some(AvoiderError::InvalidRange { value: 0.0 })
        );
        let bad = AvoiderConfig { sample_spacing: -1.0, ..Default::default() };
        assert!(Avoider::new(bad, Some(ADVERSARY)).is_err());
    }

    #[test]
    fn test_no_adversary_holds_with_zero_oracle_calls() {
        let world = ScriptedWorld::new(Vector3::new(10.0, 0.0, 0.0));
        let mut avoider = seeded_avoider(None);

        let agent = Vector3::new(1.0, 0.0, 2.0);
        assert_eq!(avoider.evaluate(agent, &services(&world)), agent);
        assert_eq!(world.raycasts.get(), 0, "no raycasts without an adversary");
        assert_eq!(world.paths.get(), 0, "no path queries without an adversary");
        assert!(avoider.debug_snapshot().is_none());
    }

    #[test]
    fn test_unresolvable_adversary_holds() {
        let world = ScriptedWorld::new(Vector3::new(10.0, 0.0, 0.0));
        let mut avoider = seeded_avoider(Some(BodyId(99)));

        let agent = Vector3::zeros();
        assert_eq!(avoider.evaluate(agent, &services(&world)), agent);
        assert_eq!(world.raycasts.get(), 0);
    }

    #[test]
    fn test_hidden_agent_holds_and_preserves_snapshot() {
        let adversary_position = Vector3::new(20.0, 0.0, 0.0);
        let mut world = ScriptedWorld::new(adversary_position);
        let mut avoider = seeded_avoider(Some(ADVERSARY));
        let agent = Vector3::zeros();

        // First cycle: visible, runs a search and records a snapshot.
        avoider.evaluate(agent, &services(&world));
        let first = avoider.debug_snapshot().expect("search should record a snapshot").clone();
        assert_eq!(first.cycle, 1);

        // Second cycle: hidden. Hold, snapshot stays exactly the prior one.
        world.hidden_from.push(agent);
        assert_eq!(avoider.evaluate(agent, &services(&world)), agent);
        assert_eq!(avoider.debug_snapshot(), Some(&first), "stale snapshot must persist");
    }

    #[test]
    fn test_no_qualifying_candidate_holds() {
        // Adversary sees everything and nothing is reachable.
        let world = ScriptedWorld {
            unreachable: Vec::new(),
            ..ScriptedWorld::new(Vector3::new(5.0, 0.0, 0.0))
        };
        let mut avoider = seeded_avoider(Some(ADVERSARY));
        let agent = Vector3::zeros();

        let destination = avoider.evaluate(agent, &services(&world));
        assert_eq!(destination, agent, "hold when every candidate stays visible");
        let snapshot = avoider.debug_snapshot().unwrap();
        assert!(snapshot.nearest.is_none());
        assert!(!snapshot.samples.is_empty(), "search should still have sampled");
    }

    #[test]
    fn test_selects_minimum_magnitude_admissible_candidate() {
        let agent = Vector3::zeros();
        let mut world = ScriptedWorld::new(Vector3::new(50.0, 0.0, 0.0));
        // (1,0): still visible. (3,0): hidden and reachable. (2,0): hidden
        // but unreachable. Expected pick: (3,0).
        world.hidden_from.push(Vector3::new(3.0, 0.0, 0.0));
        world.hidden_from.push(Vector3::new(2.0, 0.0, 0.0));
        world.unreachable.push(Vector3::new(2.0, 0.0, 0.0));

        let mut avoider = seeded_avoider(Some(ADVERSARY));
        let offsets =
            vec![Vector2::new(1.0, 0.0), Vector2::new(3.0, 0.0), Vector2::new(2.0, 0.0)];
        let chosen = avoider.select_nearest(
            agent,
            world.adversary_position,
            ADVERSARY,
            &services(&world),
            offsets,
        );

        assert_eq!(chosen, Some(Vector3::new(3.0, 0.0, 0.0)));
        assert_eq!(avoider.debug_snapshot().unwrap().nearest, chosen);
    }

    #[test]
    fn test_first_minimal_candidate_wins_ties() {
        let agent = Vector3::zeros();
        let mut world = ScriptedWorld::new(Vector3::new(50.0, 0.0, 0.0));
        world.hidden_from.push(Vector3::new(2.0, 0.0, 0.0));
        world.hidden_from.push(Vector3::new(0.0, 0.0, 2.0));

        let mut avoider = seeded_avoider(Some(ADVERSARY));
        // Same magnitude; strict `<` keeps the first.
        let offsets = vec![Vector2::new(2.0, 0.0), Vector2::new(0.0, 2.0)];
        let chosen = avoider.select_nearest(
            agent,
            world.adversary_position,
            ADVERSARY,
            &services(&world),
            offsets,
        );
        assert_eq!(chosen, Some(Vector3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_raycast_miss_means_not_visible() {
        struct AlwaysMiss;
        impl SightQuery for AlwaysMiss {
            fn raycast(&self, _: Vector3<f32>, _: Vector3<f32>) -> RaycastResult {
                RaycastResult::Miss
            }
        }
        assert!(!Avoider::is_visible(
            &AlwaysMiss,
            Vector3::zeros(),
            Vector3::new(1.0, 0.0, 0.0),
            ADVERSARY
        ));
    }

    #[test]
    fn test_hit_on_obstacle_means_not_visible() {
        struct WallInTheWay;
        impl SightQuery for WallInTheWay {
            fn raycast(&self, _: Vector3<f32>, _: Vector3<f32>) -> RaycastResult {
                RaycastResult::Hit { body: BodyId(3), point: Vector3::zeros() }
            }
        }
        assert!(!Avoider::is_visible(
            &WallInTheWay,
            Vector3::zeros(),
            Vector3::new(1.0, 0.0, 0.0),
            ADVERSARY
        ));
    }

    #[test]
    fn test_missing_nav_capability_means_unreachable() {
        let world = ScriptedWorld::new(Vector3::new(5.0, 0.0, 0.0));
        let mut avoider = seeded_avoider(Some(ADVERSARY));
        let agent = Vector3::zeros();

        let no_nav = WorldServices { sight: &world, nav: None, bodies: &world };
        let destination = avoider.evaluate(agent, &no_nav);
        assert_eq!(destination, agent, "without nav every spot is unreachable");
        assert_eq!(world.paths.get(), 0);
    }

    #[test]
    fn test_chosen_offset_is_planar() {
        let mut world = ScriptedWorld::new(Vector3::new(5.0, 1.5, 0.0));
        // Hide everywhere except the agent itself so some candidate wins.
        let mut avoider = seeded_avoider(Some(ADVERSARY));
        let agent = Vector3::new(0.0, 1.0, 0.0);

        // Make every candidate hidden by scripting misses from any origin
        // other than the agent.
        world.hidden_from = avoider_sample_spots(&mut seeded_avoider(Some(ADVERSARY)), agent);

        let destination = avoider.evaluate(agent, &services(&world));
        assert!(
            (destination.y - agent.y).abs() < 1e-6,
            "offset must stay planar (y unchanged), got {}",
            destination.y
        );
    }

    #[test]
    fn test_seeded_runs_replay() {
        let world = ScriptedWorld::new(Vector3::new(30.0, 0.0, 0.0));
        let agent = Vector3::zeros();

        let mut a = seeded_avoider(Some(ADVERSARY));
        let mut b = seeded_avoider(Some(ADVERSARY));
        for _ in 0..3 {
            assert_eq!(
                a.evaluate(agent, &services(&world)),
                b.evaluate(agent, &services(&world))
            );
        }
        assert_eq!(a.debug_snapshot(), b.debug_snapshot());
    }

    /// Run one search against an all-visible world just to learn which spots
    /// a seeded avoider will sample on its first cycle.
    fn avoider_sample_spots(probe: &mut Avoider, agent: Vector3<f32>) -> Vec<Vector3<f32>> {
        let world = ScriptedWorld::new(Vector3::new(5.0, 1.5, 0.0));
        probe.evaluate(agent, &services(&world));
        probe
            .debug_snapshot()
            .map(|snap| {
                snap.samples
                    .iter()
                    .map(|s| agent + Vector3::new(s.x, 0.0, s.y))
                    .collect()
            })
            .unwrap_or_default()
    }
}

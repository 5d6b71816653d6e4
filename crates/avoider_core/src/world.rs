//! Narrow interfaces onto the host engine.
//!
//! The avoider never talks to a physics or navigation runtime directly. The
//! host implements these three oracle traits on its world and hands them in
//! per tick via [`WorldServices`], which keeps the core testable with plain
//! mock structs.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Opaque handle to a physics body / agent owned by the host world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Outcome of a scene raycast.
///
/// A miss is a first-class value: visibility logic must pattern-match this
/// and treat `Miss` as "not visible", never read hit data unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RaycastResult {
    Hit { body: BodyId, point: Vector3<f32> },
    Miss,
}

/// Status of a computed navigation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathStatus {
    /// A full path from start to destination exists.
    Complete,
    /// The path ends short of the destination.
    Partial,
    /// No path could be computed (off-mesh endpoints, blocked start, ...).
    Invalid,
}

/// Ray-vs-scene intersection, first hit along the ray.
pub trait SightQuery {
    fn raycast(&self, origin: Vector3<f32>, direction: Vector3<f32>) -> RaycastResult;
}

/// Navmesh pathfinding. `from` is the path start, `to` the destination.
pub trait NavQuery {
    fn compute_path(&self, from: Vector3<f32>, to: Vector3<f32>) -> PathStatus;
}

/// Position lookup for host-owned bodies. Returns `None` when the body does
/// not exist this tick (despawned, not yet spawned).
pub trait BodyLookup {
    fn position_of(&self, body: BodyId) -> Option<Vector3<f32>>;
}

/// Read-only bundle of engine services for one evaluation tick.
///
/// `nav` is optional: an agent without a pathfinding capability attached
/// still evaluates, it just treats every candidate as unreachable.
pub struct WorldServices<'a> {
    pub sight: &'a dyn SightQuery,
    pub nav: Option<&'a dyn NavQuery>,
    pub bodies: &'a dyn BodyLookup,
}

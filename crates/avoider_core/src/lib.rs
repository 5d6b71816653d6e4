//! # avoider_core - Line-of-Sight Avoidance Behavior
//!
//! An agent behavior for 3D simulations: detect whether the agent sits in an
//! adversary's line of sight and, if so, navigate to the nearest reachable
//! point outside that sight line within a bounded search radius.
//!
//! The crate is engine-agnostic. Raycasting and navmesh pathfinding are
//! consumed through narrow oracle traits ([`world::SightQuery`],
//! [`world::NavQuery`], [`world::BodyLookup`]); the host drives
//! [`Avoider::evaluate`] once per simulation tick and steers toward the
//! returned destination.
//!
//! ## Features
//! - Blue-noise candidate generation ([`sampler::PoissonDiscSampler`])
//! - Deterministic replays via an explicit seed
//! - Debug overlay data ([`gizmos`]) with an explicit valid-as-of-cycle marker

pub mod avoider;
pub mod error;
pub mod gizmos;
pub mod sampler;
pub mod world;

pub use avoider::{Avoider, AvoiderConfig, DebugSnapshot};
pub use error::AvoiderError;
pub use gizmos::{Gizmo, GizmoColor};
pub use sampler::PoissonDiscSampler;
pub use world::{BodyId, BodyLookup, NavQuery, PathStatus, RaycastResult, SightQuery, WorldServices};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

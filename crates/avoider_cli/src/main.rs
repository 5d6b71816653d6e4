//! Avoider demo host.
//!
//! Runs the avoider behavior in a small obstacle arena: an adversary patrols
//! the far side, the agent evaluates once per tick and steers toward the
//! emitted destination. `--json` dumps the final debug snapshot and gizmo
//! overlay instead of the per-tick log.

mod world;

use anyhow::Result;
use avoider_core::{gizmos, Avoider, AvoiderConfig, BodyId, RaycastResult, SightQuery, WorldServices};
use clap::Parser;
use nalgebra::Vector3;

use crate::world::{DemoWorld, Obstacle};

const ADVERSARY: BodyId = BodyId(1);
/// Distance the agent covers per tick while steering to a destination.
const AGENT_STEP: f32 = 0.6;

#[derive(Parser)]
#[command(name = "avoider_cli")]
#[command(about = "Run the line-of-sight avoider in a demo arena", long_about = None)]
struct Cli {
    /// Simulation ticks to run
    #[arg(long, default_value_t = 60)]
    ticks: u32,

    /// Seed for deterministic candidate sampling
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Hiding-spot search radius
    #[arg(long, default_value_t = 6.0)]
    range: f32,

    /// Minimum separation between sampled candidates
    #[arg(long, default_value_t = 2.0)]
    spacing: f32,

    /// Emit the final debug snapshot and gizmos as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

/// 20x20 arena: a long wall with a gap on the right, plus a crate to hide
/// behind on the left.
fn build_arena() -> DemoWorld {
    let obstacles = vec![
        Obstacle {
            body: BodyId(2),
            min: Vector3::new(0.0, 0.0, 9.0),
            max: Vector3::new(14.0, 3.0, 11.0),
        },
        Obstacle {
            body: BodyId(3),
            min: Vector3::new(3.0, 0.0, 4.0),
            max: Vector3::new(5.0, 2.0, 6.0),
        },
    ];
    DemoWorld::new(20.0, ADVERSARY, obstacles)
}

/// Adversary patrol: back and forth along the far edge.
fn patrol_position(tick: u32) -> Vector3<f32> {
    let span = 16.0;
    let phase = (tick as f32 * 0.25) % (2.0 * span);
    let x = 2.0 + if phase < span { phase } else { 2.0 * span - phase };
    Vector3::new(x, 1.0, 18.0)
}

/// Bounded step toward the destination; stops on arrival.
fn step_toward(current: Vector3<f32>, destination: Vector3<f32>, max_step: f32) -> Vector3<f32> {
    let to_target = destination - current;
    let distance = to_target.norm();
    if distance <= max_step || distance < 1e-6 {
        destination
    } else {
        current + to_target * (max_step / distance)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AvoiderConfig {
        range: cli.range,
        sample_spacing: cli.spacing,
        show_gizmos: true,
        seed: Some(cli.seed),
    };
    let mut avoider = Avoider::new(config, Some(ADVERSARY))?;

    let mut arena = build_arena();
    let mut agent = Vector3::new(8.0, 1.0, 3.0);

    for tick in 0..cli.ticks {
        arena.set_adversary_position(patrol_position(tick));

        let destination = {
            let services = WorldServices { sight: &arena, nav: Some(&arena), bodies: &arena };
            avoider.evaluate(agent, &services)
        };

        if !cli.json {
            let spotted = matches!(
                arena.raycast(agent, arena.adversary_position() - agent),
                RaycastResult::Hit { body, .. } if body == ADVERSARY
            );
            println!(
                "tick {:3}  agent ({:5.1}, {:5.1})  adversary ({:5.1}, {:5.1})  {}  dest ({:5.1}, {:5.1})",
                tick,
                agent.x,
                agent.z,
                arena.adversary_position().x,
                arena.adversary_position().z,
                if spotted { "SPOTTED" } else { "hidden " },
                destination.x,
                destination.z,
            );
        }

        agent = step_toward(agent, destination, AGENT_STEP);
    }

    if cli.json {
        match avoider.debug_snapshot() {
            Some(snapshot) => {
                let overlay = gizmos::collect(agent, snapshot, cli.range);
                let report = serde_json::json!({
                    "agent": [agent.x, agent.y, agent.z],
                    "snapshot": snapshot,
                    "gizmos": overlay,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            None => println!("{}", serde_json::json!({ "snapshot": null })),
        }
    }

    Ok(())
}

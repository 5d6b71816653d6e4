//! Debug-draw primitives for the hiding-spot search.
//!
//! Pure data: the host decides how (and whether) to render it. Mirrors the
//! usual overlay for this behavior: one red line per sampled candidate, a
//! green line to the chosen spot, and a white circle at the search radius.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::avoider::DebugSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GizmoColor {
    /// Sampled candidate (not the chosen one).
    Red,
    /// Chosen hiding offset.
    Green,
    /// Search-radius outline.
    White,
}

/// A single shape for the host's debug overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gizmo {
    Line { from: Vector3<f32>, to: Vector3<f32>, color: GizmoColor },
    Circle { center: Vector3<f32>, radius: f32, color: GizmoColor },
}

/// Build the overlay for one agent from its last search snapshot.
pub fn collect(agent_position: Vector3<f32>, snapshot: &DebugSnapshot, range: f32) -> Vec<Gizmo> {
    let mut shapes = Vec::with_capacity(snapshot.samples.len() + 2);

    for sample in &snapshot.samples {
        let spot = agent_position + Vector3::new(sample.x, 0.0, sample.y);
        shapes.push(Gizmo::Line { from: agent_position, to: spot, color: GizmoColor::Red });
    }
    if let Some(nearest) = snapshot.nearest {
        shapes.push(Gizmo::Line {
            from: agent_position,
            to: agent_position + nearest,
            color: GizmoColor::Green,
        });
    }
    shapes.push(Gizmo::Circle { center: agent_position, radius: range, color: GizmoColor::White });

    shapes
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;

    #[test]
    fn test_overlay_shapes() {
        let snapshot = DebugSnapshot {
            samples: vec![Vector2::new(1.0, 0.0), Vector2::new(0.0, 2.0)],
            nearest: Some(Vector3::new(0.0, 0.0, 2.0)),
            cycle: 3,
        };
        let agent = Vector3::new(5.0, 0.0, 5.0);
        let shapes = collect(agent, &snapshot, 4.0);

        // Two sample lines, one chosen line, one circle.
        assert_eq!(shapes.len(), 4);
        let greens = shapes
            .iter()
            .filter(|s| matches!(s, Gizmo::Line { color: GizmoColor::Green, .. }))
            .count();
        assert_eq!(greens, 1);
        assert!(matches!(
            shapes.last(),
            Some(Gizmo::Circle { radius, color: GizmoColor::White, .. }) if *radius == 4.0
        ));
    }

    #[test]
    fn test_no_green_line_without_a_chosen_spot() {
        let snapshot =
            DebugSnapshot { samples: vec![Vector2::new(1.0, 1.0)], nearest: None, cycle: 1 };
        let shapes = collect(Vector3::zeros(), &snapshot, 4.0);
        assert!(shapes
            .iter()
            .all(|s| !matches!(s, Gizmo::Line { color: GizmoColor::Green, .. })));
    }

    #[test]
    fn test_overlay_serializes() {
        let snapshot = DebugSnapshot { samples: vec![], nearest: None, cycle: 0 };
        let shapes = collect(Vector3::zeros(), &snapshot, 2.0);
        let json = serde_json::to_string(&shapes).expect("gizmos should serialize");
        assert!(json.contains("Circle"));
    }
}

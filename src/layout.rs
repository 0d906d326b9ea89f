//! Console layout — registration-time placement of the virtual pad's
//! pressable buttons and stick, with the local geometry bounds each entity
//! is registered with.

use nalgebra::Vector3;

use crate::geom::{EntityPose, LocalBounds};
use crate::interaction::aggregator::PadButton;

/// Placement of one pressable button.
#[derive(Debug, Clone)]
pub struct ButtonPlacement {
    pub label: &'static str,
    /// Logical pad button this entity maps to.
    pub pad: PadButton,
    pub pose: EntityPose,
    pub bounds: LocalBounds,
}

/// Placement of the directional stick.
#[derive(Debug, Clone)]
pub struct StickPlacement {
    pub pose: EntityPose,
}

/// The full console layout, read once at registration.
#[derive(Debug, Clone)]
pub struct ConsoleLayout {
    pub buttons: Vec<ButtonPlacement>,
    pub stick: StickPlacement,
}

impl ConsoleLayout {
    /// The standard pad: stick on the left, A/B on the right,
    /// Select/Start in the middle, laid out on a tabletop plane.
    pub fn standard() -> Self {
        let table_y = 0.78;
        // Round action buttons, cap 8 mm above the deck.
        let action = LocalBounds::new(
            Vector3::new(-0.014, 0.0, -0.014),
            Vector3::new(0.014, 0.008, 0.014),
        );
        // Narrow pill buttons for select/start.
        let pill = LocalBounds::new(
            Vector3::new(-0.012, 0.0, -0.006),
            Vector3::new(0.012, 0.005, 0.006),
        );

        let button = |label, pad, x: f32, z: f32, bounds| ButtonPlacement {
            label,
            pad,
            pose: EntityPose::at(Vector3::new(x, table_y, z)),
            bounds,
        };

        Self {
            buttons: vec![
                button("b", PadButton::B, 0.10, -0.30, action),
                button("a", PadButton::A, 0.15, -0.31, action),
                button("select", PadButton::Select, -0.02, -0.29, pill),
                button("start", PadButton::Start, 0.03, -0.29, pill),
            ],
            stick: StickPlacement {
                pose: EntityPose::at(Vector3::new(-0.12, table_y + 0.04, -0.30)),
            },
        }
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_has_all_pad_buttons() {
        let layout = ConsoleLayout::standard();
        for pad in [PadButton::A, PadButton::B, PadButton::Select, PadButton::Start] {
            assert!(
                layout.buttons.iter().any(|b| b.pad == pad),
                "missing {:?}",
                pad
            );
        }
    }

    #[test]
    fn test_placements_do_not_overlap() {
        let layout = ConsoleLayout::standard();
        for (i, a) in layout.buttons.iter().enumerate() {
            for b in layout.buttons.iter().skip(i + 1) {
                let dist = (a.pose.position - b.pose.position).norm();
                assert!(
                    dist > 0.02,
                    "{} and {} are {:.3} m apart",
                    a.label,
                    b.label,
                    dist
                );
            }
        }
    }

    #[test]
    fn test_bounds_have_positive_extent() {
        let layout = ConsoleLayout::standard();
        for b in &layout.buttons {
            assert!(b.bounds.max.x > b.bounds.min.x);
            assert!(b.bounds.max.y > b.bounds.min.y);
            assert!(b.bounds.max.z > b.bounds.min.z);
            assert!(b.bounds.top_surface_y() > 0.0);
        }
    }
}

//! Entity-local geometry — poses, bounding volumes, and the world-to-local
//! transform used for contact testing against pressable entities.

use nalgebra::{UnitQuaternion, Vector3};

/// World-space pose of a registered entity.
#[derive(Debug, Clone)]
pub struct EntityPose {
    /// Position in meters.
    pub position: Vector3<f32>,
    /// Orientation.
    pub orientation: UnitQuaternion<f32>,
}

impl EntityPose {
    /// Pose at a position with identity orientation.
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            orientation: UnitQuaternion::identity(),
        }
    }

    pub fn with_orientation(position: Vector3<f32>, orientation: UnitQuaternion<f32>) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Transform a world-space point into this pose's local frame.
    pub fn to_local(&self, world: &Vector3<f32>) -> Vector3<f32> {
        self.orientation
            .inverse_transform_vector(&(world - self.position))
    }
}

/// Axis-aligned bounding box in entity-local coordinates (meters).
#[derive(Debug, Clone, Copy)]
pub struct LocalBounds {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl LocalBounds {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Box centered on the local origin extending `hy` up and down.
    pub fn centered(hx: f32, hy: f32, hz: f32) -> Self {
        Self {
            min: Vector3::new(-hx, -hy, -hz),
            max: Vector3::new(hx, hy, hz),
        }
    }

    /// Grow the box by `by` on every face.
    pub fn expanded(&self, by: f32) -> Self {
        let pad = Vector3::new(by, by, by);
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    /// Whether a local-space point lies inside the box (inclusive).
    pub fn contains(&self, p: &Vector3<f32>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Local-space Y coordinate of the top surface.
    pub fn top_surface_y(&self) -> f32 {
        self.max.y
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_to_local_translation_only() {
        let pose = EntityPose::at(Vector3::new(1.0, 2.0, 3.0));
        let local = pose.to_local(&Vector3::new(1.5, 2.0, 3.0));
        assert!((local.x - 0.5).abs() < 1e-6);
        assert!(local.y.abs() < 1e-6);
        assert!(local.z.abs() < 1e-6);
    }

    #[test]
    fn test_to_local_with_rotation() {
        // Entity rotated 90 degrees around Y: world +X reads as local +Z.
        let rot = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2);
        let pose = EntityPose::with_orientation(Vector3::zeros(), rot);
        let local = pose.to_local(&Vector3::new(1.0, 0.0, 0.0));
        assert!(local.x.abs() < 1e-5, "local was {:?}", local);
        assert!((local.z - 1.0).abs() < 1e-5, "local was {:?}", local);
    }

    #[test]
    fn test_contains() {
        let b = LocalBounds::centered(0.02, 0.01, 0.02);
        assert!(b.contains(&Vector3::new(0.0, 0.0, 0.0)));
        assert!(b.contains(&Vector3::new(0.02, 0.01, 0.02))); // corner inclusive
        assert!(!b.contains(&Vector3::new(0.03, 0.0, 0.0)));
        assert!(!b.contains(&Vector3::new(0.0, -0.02, 0.0)));
    }

    #[test]
    fn test_expanded() {
        let b = LocalBounds::centered(0.01, 0.01, 0.01).expanded(0.005);
        assert!(b.contains(&Vector3::new(0.014, 0.0, 0.0)));
        assert!(!b.contains(&Vector3::new(0.016, 0.0, 0.0)));
        assert!((b.top_surface_y() - 0.015).abs() < 1e-6);
    }

    #[test]
    fn test_top_surface_y() {
        let b = LocalBounds::new(Vector3::new(-0.02, 0.0, -0.02), Vector3::new(0.02, 0.05, 0.02));
        assert!((b.top_surface_y() - 0.05).abs() < 1e-6);
    }
}

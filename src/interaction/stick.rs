//! Stick axis mapping — turns the owning manipulator's planar displacement
//! from the grab point into a clamped, normalized axis, and animates the
//! stick back to rest with an exponential spring when released.

use nalgebra::Vector3;
use tracing::debug;

use super::grab::{GrabArbiter, StickId};
use crate::tracking::{JointId, TrackingFrame};

// ── Config ─────────────────────────────────────────────────

/// Configuration shared by all mapped sticks.
#[derive(Debug, Clone)]
pub struct StickConfig {
    /// Planar displacement (meters) mapping to full deflection. Copied
    /// onto each stick at registration.
    pub max_radius: f32,
    /// Spring-return rate (fraction of remaining offset per second).
    /// Copied onto each stick at registration.
    pub return_speed: f32,
    /// Magnitude below which a returning stick reads as inactive.
    pub active_epsilon: f32,
    /// Planar distance below which the angle reads as zero.
    pub angle_epsilon: f32,
}

impl Default for StickConfig {
    fn default() -> Self {
        Self {
            max_radius: 0.03,
            return_speed: 8.0,
            active_epsilon: 0.01,
            angle_epsilon: 1e-4,
        }
    }
}

// ── Stick record ───────────────────────────────────────────

/// Per-stick analog state. Written only by `StickMapper::update`.
#[derive(Debug)]
pub struct AnalogStick {
    pub id: StickId,
    /// World-space rest position, captured at registration.
    pub center: Vector3<f32>,
    /// Planar displacement (meters) mapping to full deflection.
    pub max_radius: f32,
    /// Spring-return rate (fraction of remaining offset per second).
    pub return_speed: f32,
    /// Current world-space cap position (center plus clamped deflection).
    pub position: Vector3<f32>,
    pub axis_x: f32,
    pub axis_y: f32,
    /// Deflection direction in radians, 0 when at rest.
    pub angle: f32,
    pub magnitude: f32,
    pub is_active: bool,
    /// Manipulator anchor captured at the attach instant; displacement is
    /// measured from here.
    grab_origin: Option<Vector3<f32>>,
}

// ── Mapper ─────────────────────────────────────────────────

/// Owns every analog stick record; reads grab state, never writes it.
pub struct StickMapper {
    pub config: StickConfig,
    sticks: Vec<AnalogStick>,
}

impl StickMapper {
    pub fn new(config: StickConfig) -> Self {
        Self {
            config,
            sticks: Vec::new(),
        }
    }

    /// Register the analog record for an arbiter-issued stick id, at its
    /// world rest position.
    pub fn register(&mut self, id: StickId, center: Vector3<f32>) {
        debug_assert_eq!(id.0, self.sticks.len(), "register sticks in arbiter order");
        self.sticks.push(AnalogStick {
            id,
            center,
            max_radius: self.config.max_radius,
            return_speed: self.config.return_speed,
            position: center,
            axis_x: 0.0,
            axis_y: 0.0,
            angle: 0.0,
            magnitude: 0.0,
            is_active: false,
            grab_origin: None,
        });
    }

    pub fn get(&self, id: StickId) -> Option<&AnalogStick> {
        self.sticks.get(id.0)
    }

    /// Current world positions, for the arbiter's capture test.
    pub fn positions(&self) -> Vec<(StickId, Vector3<f32>)> {
        self.sticks.iter().map(|s| (s.id, s.position)).collect()
    }

    /// Advance every stick one frame. Must run after the arbiter has
    /// resolved ownership for the same frame.
    pub fn update(&mut self, frame: &TrackingFrame, grabs: &GrabArbiter, dt: f32) {
        for stick in &mut self.sticks {
            let grab = grabs.grab(stick.id);

            if grab.just_attached {
                let anchor = grab
                    .owner
                    .and_then(|hand| frame.get(hand))
                    .and_then(|m| m.joint(JointId::GripAnchor));
                if let Some(anchor) = anchor {
                    stick.grab_origin = Some(anchor);
                    // Visual pose resets to rest at the attach instant.
                    stick.position = stick.center;
                    Self::apply_planar(stick, self.config.angle_epsilon, 0.0, 0.0);
                    stick.is_active = false;
                    debug!("stick {:?} attach: origin captured", stick.id);
                }
                continue;
            }

            if grab.attached {
                let anchor = grab
                    .owner
                    .and_then(|hand| frame.get(hand))
                    .and_then(|m| m.joint(JointId::GripAnchor));
                let (origin, anchor) = match (stick.grab_origin, anchor) {
                    (Some(o), Some(a)) => (o, a),
                    // Anchor untracked this frame: hold the last deflection.
                    _ => continue,
                };
                let dx = anchor.x - origin.x;
                let dz = anchor.z - origin.z;
                Self::apply_planar(stick, self.config.angle_epsilon, dx, dz);
                stick.position = stick.center
                    + Vector3::new(
                        stick.axis_x * stick.max_radius,
                        0.0,
                        stick.axis_y * stick.max_radius,
                    );
                stick.is_active = stick.magnitude > 0.0;
            } else {
                if grab.just_detached {
                    stick.grab_origin = None;
                    debug!("stick {:?} detach: spring return", stick.id);
                }
                // Exponential-style approach toward rest, axis recomputed
                // from the shrinking residual every frame.
                let step = (stick.return_speed * dt).min(1.0);
                stick.position += (stick.center - stick.position) * step;

                let dx = stick.position.x - stick.center.x;
                let dz = stick.position.z - stick.center.z;
                Self::apply_planar(stick, self.config.angle_epsilon, dx, dz);
                stick.is_active = stick.magnitude > self.config.active_epsilon;
                if stick.magnitude < self.config.angle_epsilon {
                    stick.position = stick.center;
                }
            }
        }
    }

    /// Derive axis values from a planar delta, hard-clamped to the radius.
    fn apply_planar(stick: &mut AnalogStick, angle_epsilon: f32, dx: f32, dz: f32) {
        let dist = dx.hypot(dz);
        let (cx, cz) = if dist > stick.max_radius {
            let scale = stick.max_radius / dist;
            (dx * scale, dz * scale)
        } else {
            (dx, dz)
        };
        stick.magnitude = (dist / stick.max_radius).min(1.0);
        stick.axis_x = (cx / stick.max_radius).clamp(-1.0, 1.0);
        stick.axis_y = (cz / stick.max_radius).clamp(-1.0, 1.0);
        stick.angle = if dist < angle_epsilon {
            0.0
        } else {
            dz.atan2(dx)
        };
    }
}

// ── Tests ──────────────────────────────────────────────────

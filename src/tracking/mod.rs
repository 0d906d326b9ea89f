//! Manipulator tracking — data model and the capability interface the
//! interaction core consumes.
//!
//! The core never talks to a tracking runtime directly: a `TrackingSource`
//! produces one `TrackingFrame` per tick, and joint access goes through a
//! single `Manipulator::joint` accessor that returns an optional world
//! position. Backends implement the trait; `NullSource` is the no-runtime
//! fallback.

use nalgebra::{UnitQuaternion, Vector3};
use tracing::info;

pub mod smoothing;
pub mod synthetic;

// ── Hand enum ──────────────────────────────────────────────

/// Handedness identity of a tracked manipulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

// ── Joint identifiers ──────────────────────────────────────

/// Joints the interaction core needs from a manipulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointId {
    /// Primary contact joint used for button collision.
    IndexTip,
    /// Anchor used for grab distance and stick displacement.
    GripAnchor,
}

impl JointId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IndexTip => "index-tip",
            Self::GripAnchor => "grip-anchor",
        }
    }
}

// ── Manipulator ────────────────────────────────────────────

/// One tracked hand/controller proxy for a single frame.
#[derive(Debug, Clone)]
pub struct Manipulator {
    /// Handedness identity.
    pub hand: Hand,
    /// World-space pose position.
    pub position: Vector3<f32>,
    /// World-space pose orientation.
    pub orientation: UnitQuaternion<f32>,
    /// Index fingertip world position, if tracked this frame.
    pub index_tip: Option<Vector3<f32>>,
    /// Grip anchor world position, if tracked this frame.
    pub grip_anchor: Option<Vector3<f32>>,
    /// Whether the select trigger is held this frame.
    pub select_active: bool,
    /// Tracking confidence (0.0-1.0).
    pub confidence: f32,
}

impl Manipulator {
    /// A manipulator at the origin with nothing tracked.
    pub fn new(hand: Hand) -> Self {
        Self {
            hand,
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            index_tip: None,
            grip_anchor: None,
            select_active: false,
            confidence: 1.0,
        }
    }

    /// World position of a joint, or `None` when it is untracked this frame.
    pub fn joint(&self, joint: JointId) -> Option<Vector3<f32>> {
        match joint {
            JointId::IndexTip => self.index_tip,
            JointId::GripAnchor => self.grip_anchor,
        }
    }
}

// ── Tracking frame ─────────────────────────────────────────

/// Per-tick snapshot of all tracked manipulators. May be empty.
#[derive(Debug, Clone)]
pub struct TrackingFrame {
    pub manipulators: Vec<Manipulator>,
    /// Source timestamp in seconds.
    pub timestamp_s: f64,
}

impl TrackingFrame {
    /// A frame with no manipulators.
    pub fn empty(timestamp_s: f64) -> Self {
        Self {
            manipulators: Vec::new(),
            timestamp_s,
        }
    }

    /// The manipulator with the given handedness, if present this frame.
    pub fn get(&self, hand: Hand) -> Option<&Manipulator> {
        self.manipulators.iter().find(|m| m.hand == hand)
    }
}

// ── Capability interface ───────────────────────────────────

/// Produces one tracking frame per tick. Implemented once per backend.
pub trait TrackingSource {
    /// Backend name for logs and status lines.
    fn name(&self) -> &'static str;

    /// Sample the source at time `t` seconds since session start.
    fn sample(&mut self, t: f64) -> TrackingFrame;
}

// ── Null source ────────────────────────────────────────────

/// Source that never reports a manipulator: the degrade path, and the
/// stand-in when no tracking runtime is available.
pub struct NullSource;

impl NullSource {
    pub fn new() -> Self {
        info!("tracking: null source (no manipulators will be reported)");
        Self
    }
}

impl Default for NullSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackingSource for NullSource {
    fn name(&self) -> &'static str {
        "null"
    }

    fn sample(&mut self, t: f64) -> TrackingFrame {
        TrackingFrame::empty(t)
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_accessor() {
        let mut m = Manipulator::new(Hand::Right);
        assert!(m.joint(JointId::IndexTip).is_none());
        assert!(m.joint(JointId::GripAnchor).is_none());

        m.index_tip = Some(Vector3::new(0.1, 0.2, 0.3));
        let tip = m.joint(JointId::IndexTip).unwrap();
        assert!((tip.y - 0.2).abs() < 1e-6);
        assert!(m.joint(JointId::GripAnchor).is_none());
    }

    #[test]
    fn test_frame_get() {
        let mut frame = TrackingFrame::empty(0.0);
        assert!(frame.get(Hand::Left).is_none());

        frame.manipulators.push(Manipulator::new(Hand::Left));
        assert!(frame.get(Hand::Left).is_some());
        assert!(frame.get(Hand::Right).is_none());
    }

    #[test]
    fn test_null_source_always_empty() {
        let mut source = NullSource::new();
        assert_eq!(source.name(), "null");
        for i in 0..5 {
            let frame = source.sample(i as f64);
            assert!(frame.manipulators.is_empty());
        }
    }

    #[test]
    fn test_hand_and_joint_as_str() {
        assert_eq!(Hand::Left.as_str(), "left");
        assert_eq!(Hand::Right.as_str(), "right");
        assert_eq!(JointId::IndexTip.as_str(), "index-tip");
        assert_eq!(JointId::GripAnchor.as_str(), "grip-anchor");
    }
}

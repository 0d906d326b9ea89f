//! Synthetic tracking source — a scripted two-hand routine for demo and
//! soak runs without a tracking runtime: the right hand taps a button, the
//! left hand grabs the stick and sweeps it.

use nalgebra::Vector3;
use tracing::info;

use super::{Hand, Manipulator, TrackingFrame, TrackingSource};

/// Length of one scripted cycle in seconds.
const CYCLE_S: f64 = 6.0;

/// Scripted source aimed at a button top and a stick center.
pub struct SyntheticSource {
    button_top: Vector3<f32>,
    stick_center: Vector3<f32>,
}

impl SyntheticSource {
    pub fn new(button_top: Vector3<f32>, stick_center: Vector3<f32>) -> Self {
        info!(
            "tracking: synthetic source (button at {:.2?}, stick at {:.2?})",
            (button_top.x, button_top.y, button_top.z),
            (stick_center.x, stick_center.y, stick_center.z),
        );
        Self {
            button_top,
            stick_center,
        }
    }

    /// Right hand: hovers over the button, dipping through its travel
    /// during the press window.
    fn right_hand(&self, cycle: f64) -> Manipulator {
        let hover = 0.012;
        let dip = if (0.5..1.5).contains(&cycle) {
            let phase = (cycle - 0.5) as f32;
            (phase * std::f32::consts::PI).sin() * 0.022
        } else {
            0.0
        };
        let tip = self.button_top + Vector3::new(0.0, hover - dip, 0.0);

        let mut m = Manipulator::new(Hand::Right);
        m.position = tip + Vector3::new(0.0, 0.05, 0.08);
        m.index_tip = Some(tip);
        m
    }

    /// Left hand: approaches the stick, squeezes from t=3.0, sweeps the
    /// anchor outward while holding, releases at t=5.0.
    fn left_hand(&self, cycle: f64) -> Manipulator {
        let selecting = (3.0..5.0).contains(&cycle);
        let anchor = if selecting {
            let held = (cycle - 3.0) as f32;
            let radius = (held * 0.04).min(0.03);
            let theta = held * 2.0;
            self.stick_center + Vector3::new(theta.cos() * radius, 0.0, theta.sin() * radius)
        } else {
            self.stick_center
        };

        let mut m = Manipulator::new(Hand::Left);
        m.position = anchor + Vector3::new(0.0, 0.03, 0.06);
        m.grip_anchor = Some(anchor);
        m.select_active = selecting;
        m
    }
}

impl TrackingSource for SyntheticSource {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn sample(&mut self, t: f64) -> TrackingFrame {
        let cycle = t % CYCLE_S;
        TrackingFrame {
            manipulators: vec![self.left_hand(cycle), self.right_hand(cycle)],
            timestamp_s: t,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────

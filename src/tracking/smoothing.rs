//! Input smoothing — exponential blending of manipulator positions across
//! frames, plus a confidence gate that drops poorly tracked manipulators
//! before they reach the interaction state machines.

use nalgebra::Vector3;
use tracing::debug;

use super::{Hand, Manipulator, TrackingFrame};

/// Configuration for the smoothing filter.
#[derive(Debug, Clone)]
pub struct SmoothingConfig {
    /// Enable smoothing (confidence gating applies regardless).
    pub enabled: bool,
    /// Smoothing factor (0.0 = no smoothing, approaching 1.0 = maximum).
    pub alpha: f32,
    /// Minimum confidence (0.0-1.0) for a manipulator to be reported at all.
    pub min_confidence: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            alpha: 0.3,
            min_confidence: 0.5,
        }
    }
}

/// Per-hand retained sample used for blending.
#[derive(Debug, Clone)]
struct PrevSample {
    position: Vector3<f32>,
    index_tip: Option<Vector3<f32>>,
    grip_anchor: Option<Vector3<f32>>,
}

/// Blends each manipulator's positions toward the newest sample.
///
/// The first sample for a hand passes through unchanged; a hand absent for
/// a frame forgets its history so tracking reacquisition does not blend
/// across the gap.
pub struct SmoothingFilter {
    pub config: SmoothingConfig,
    left: Option<PrevSample>,
    right: Option<PrevSample>,
}

impl SmoothingFilter {
    pub fn new(config: SmoothingConfig) -> Self {
        Self {
            config,
            left: None,
            right: None,
        }
    }

    fn prev_mut(&mut self, hand: Hand) -> &mut Option<PrevSample> {
        match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        }
    }

    /// Apply the confidence gate and smoothing to a raw frame.
    pub fn apply(&mut self, frame: &TrackingFrame) -> TrackingFrame {
        let mut out = TrackingFrame::empty(frame.timestamp_s);

        for hand in [Hand::Left, Hand::Right] {
            let manip = frame
                .get(hand)
                .filter(|m| m.confidence >= self.config.min_confidence);

            let manip = match manip {
                Some(m) => m,
                None => {
                    // Absent or gated out this frame: drop history so the
                    // next sample passes through unblended.
                    if frame.get(hand).is_some() {
                        debug!("smoothing: {} below confidence gate", hand.as_str());
                    }
                    *self.prev_mut(hand) = None;
                    continue;
                }
            };

            let mut smoothed = manip.clone();
            let alpha = self.config.alpha;

            if self.config.enabled && alpha > 0.0 {
                if let Some(prev) = self.prev_mut(hand).as_ref() {
                    let t = 1.0 - alpha;
                    smoothed.position = lerp_vec(&prev.position, &manip.position, t);
                    smoothed.index_tip = blend_joint(&prev.index_tip, &manip.index_tip, t);
                    smoothed.grip_anchor = blend_joint(&prev.grip_anchor, &manip.grip_anchor, t);
                }
            }

            *self.prev_mut(hand) = Some(PrevSample {
                position: smoothed.position,
                index_tip: smoothed.index_tip,
                grip_anchor: smoothed.grip_anchor,
            });
            out.manipulators.push(smoothed);
        }

        out
    }

    /// Forget all retained samples.
    pub fn reset(&mut self) {
        self.left = None;
        self.right = None;
    }
}

fn lerp_vec(a: &Vector3<f32>, b: &Vector3<f32>, t: f32) -> Vector3<f32> {
    a + (b - a) * t
}

/// Blend two optional joint positions; a joint only blends when both frames
/// tracked it.
fn blend_joint(
    prev: &Option<Vector3<f32>>,
    new: &Option<Vector3<f32>>,
    t: f32,
) -> Option<Vector3<f32>> {
    match (prev, new) {
        (Some(p), Some(n)) => Some(lerp_vec(p, n, t)),
        _ => *new,
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with(hand: Hand, x: f32, confidence: f32) -> TrackingFrame {
        let mut m = Manipulator::new(hand);
        m.position = Vector3::new(x, 0.0, 0.0);
        m.index_tip = Some(Vector3::new(x, 0.1, 0.0));
        m.confidence = confidence;
        TrackingFrame {
            manipulators: vec![m],
            timestamp_s: 0.0,
        }
    }

    #[test]
    fn test_first_sample_passes_through() {
        let mut filter = SmoothingFilter::new(SmoothingConfig {
            alpha: 0.5,
            ..Default::default()
        });
        let out = filter.apply(&frame_with(Hand::Left, 1.0, 0.9));
        assert!((out.get(Hand::Left).unwrap().position.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_second_sample_blends() {
        let mut filter = SmoothingFilter::new(SmoothingConfig {
            alpha: 0.5,
            ..Default::default()
        });
        filter.apply(&frame_with(Hand::Left, 1.0, 0.9));
        let out = filter.apply(&frame_with(Hand::Left, 2.0, 0.9));
        // lerp(1.0, 2.0, 0.5) = 1.5
        let m = out.get(Hand::Left).unwrap();
        assert!(
            (m.position.x - 1.5).abs() < 1e-6,
            "expected ~1.5, got {}",
            m.position.x
        );
        assert!((m.index_tip.unwrap().x - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_confidence_gate_drops_manipulator() {
        let mut filter = SmoothingFilter::new(SmoothingConfig::default());
        let out = filter.apply(&frame_with(Hand::Right, 1.0, 0.2));
        assert!(out.manipulators.is_empty());
    }

    #[test]
    fn test_gap_resets_history() {
        let mut filter = SmoothingFilter::new(SmoothingConfig {
            alpha: 0.5,
            ..Default::default()
        });
        filter.apply(&frame_with(Hand::Left, 1.0, 0.9));
        filter.apply(&TrackingFrame::empty(0.0));
        // Reacquired sample should pass through, not blend against x=1.0.
        let out = filter.apply(&frame_with(Hand::Left, 5.0, 0.9));
        assert!((out.get(Hand::Left).unwrap().position.x - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_disabled_passes_through() {
        let mut filter = SmoothingFilter::new(SmoothingConfig {
            enabled: false,
            alpha: 0.5,
            ..Default::default()
        });
        filter.apply(&frame_with(Hand::Left, 1.0, 0.9));
        let out = filter.apply(&frame_with(Hand::Left, 2.0, 0.9));
        assert!((out.get(Hand::Left).unwrap().position.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_joint_lost_midstream() {
        let mut filter = SmoothingFilter::new(SmoothingConfig {
            alpha: 0.5,
            ..Default::default()
        });
        filter.apply(&frame_with(Hand::Left, 1.0, 0.9));

        let mut m = Manipulator::new(Hand::Left);
        m.position = Vector3::new(2.0, 0.0, 0.0);
        m.index_tip = None; // fingertip lost this frame
        m.confidence = 0.9;
        let out = filter.apply(&TrackingFrame {
            manipulators: vec![m],
            timestamp_s: 0.0,
        });
        assert!(out.get(Hand::Left).unwrap().index_tip.is_none());
    }
}

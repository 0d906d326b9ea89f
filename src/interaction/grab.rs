//! Grab arbitration — assigns a manipulator to an ungrabbed stick on a
//! rising select-trigger edge and releases it when the trigger drops.
//!
//! The arbiter is the only writer of grab records and owns the
//! previous-trigger table used to derive edges, keyed by handedness.

use nalgebra::Vector3;
use tracing::debug;

use crate::tracking::{Hand, JointId, TrackingFrame};

// ── Identifiers and records ────────────────────────────────

/// Handle for a registered stick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StickId(pub usize);

/// Grab state of a single stick. `just_*` flags are one-frame pulses.
#[derive(Debug, Clone)]
pub struct StickGrab {
    pub attached: bool,
    pub just_attached: bool,
    pub just_detached: bool,
    /// Owning manipulator. A lookup only, never both hands at once.
    pub owner: Option<Hand>,
}

impl StickGrab {
    fn new() -> Self {
        Self {
            attached: false,
            just_attached: false,
            just_detached: false,
            owner: None,
        }
    }
}

/// Events emitted by the arbiter.
#[derive(Debug, Clone, PartialEq)]
pub enum GrabEvent {
    Attached { stick: StickId, hand: Hand },
    Detached { stick: StickId, hand: Hand },
}

// ── Config ─────────────────────────────────────────────────

/// Configuration for grab arbitration.
#[derive(Debug, Clone)]
pub struct GrabConfig {
    /// Maximum anchor-to-stick distance (meters) for a new attach.
    pub capture_radius: f32,
}

impl Default for GrabConfig {
    fn default() -> Self {
        Self {
            capture_radius: 0.10,
        }
    }
}

// ── Arbiter ────────────────────────────────────────────────

/// Resolves stick ownership each frame.
pub struct GrabArbiter {
    pub config: GrabConfig,
    grabs: Vec<StickGrab>,
    /// Previous-frame trigger state per hand; absent hands read as inactive.
    left_prev_select: bool,
    right_prev_select: bool,
}

impl GrabArbiter {
    pub fn new(config: GrabConfig) -> Self {
        Self {
            config,
            grabs: Vec::new(),
            left_prev_select: false,
            right_prev_select: false,
        }
    }

    /// Register a grabbable stick.
    pub fn register(&mut self) -> StickId {
        let id = StickId(self.grabs.len());
        self.grabs.push(StickGrab::new());
        id
    }

    pub fn grab(&self, id: StickId) -> &StickGrab {
        &self.grabs[id.0]
    }

    /// Number of sticks currently attached.
    pub fn attached_count(&self) -> usize {
        self.grabs.iter().filter(|g| g.attached).count()
    }

    fn prev_select(&self, hand: Hand) -> bool {
        match hand {
            Hand::Left => self.left_prev_select,
            Hand::Right => self.right_prev_select,
        }
    }

    fn set_prev_select(&mut self, hand: Hand, value: bool) {
        match hand {
            Hand::Left => self.left_prev_select = value,
            Hand::Right => self.right_prev_select = value,
        }
    }

    /// Resolve ownership for this frame.
    ///
    /// `stick_positions` supplies each stick's current world position for
    /// the capture-radius test. Attach happens only on a rising trigger
    /// edge against the nearest unattached stick in range; a stick detaches
    /// whenever its owner's trigger is no longer read as active (including
    /// when the owning manipulator is absent this frame).
    pub fn update(
        &mut self,
        frame: &TrackingFrame,
        stick_positions: &[(StickId, Vector3<f32>)],
    ) -> Vec<GrabEvent> {
        let mut events = Vec::new();

        // Pulses last exactly one frame.
        for grab in &mut self.grabs {
            grab.just_attached = false;
            grab.just_detached = false;
        }

        // Attach pass: collect every rising-edge manipulator's in-range
        // candidates, then assign nearest pairs first so a contested stick
        // goes to the closest hand. Exact ties resolve to input order (the
        // sort is stable); documented design choice.
        let mut claims: Vec<(usize, StickId, f32)> = Vec::new();
        for (mi, manip) in frame.manipulators.iter().enumerate() {
            let rising = manip.select_active && !self.prev_select(manip.hand);
            if !rising {
                continue;
            }
            let anchor = match manip.joint(JointId::GripAnchor) {
                Some(a) => a,
                None => continue,
            };
            for (id, pos) in stick_positions {
                if self.grabs[id.0].attached {
                    continue;
                }
                let dist = (pos - anchor).norm();
                if dist <= self.config.capture_radius {
                    claims.push((mi, *id, dist));
                }
            }
        }
        claims.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));

        let mut assigned: Vec<Hand> = Vec::new();
        for (mi, id, dist) in claims {
            let hand = frame.manipulators[mi].hand;
            if self.grabs[id.0].attached || assigned.contains(&hand) {
                continue;
            }
            let grab = &mut self.grabs[id.0];
            grab.attached = true;
            grab.just_attached = true;
            grab.owner = Some(hand);
            assigned.push(hand);
            debug!("stick {:?} grabbed by {} at {:.3} m", id, hand.as_str(), dist);
            events.push(GrabEvent::Attached { stick: id, hand });
        }

        // Detach pass: release immediately when the owner's trigger is no
        // longer active. Skips sticks attached this very frame (their owner
        // is by definition selecting).
        for (idx, grab) in self.grabs.iter_mut().enumerate() {
            if !grab.attached || grab.just_attached {
                continue;
            }
            let owner = match grab.owner {
                Some(h) => h,
                None => continue,
            };
            let still_selecting = frame.get(owner).map(|m| m.select_active).unwrap_or(false);
            if !still_selecting {
                grab.attached = false;
                grab.just_detached = true;
                grab.owner = None;
                debug!("stick {:?} released by {}", StickId(idx), owner.as_str());
                events.push(GrabEvent::Detached {
                    stick: StickId(idx),
                    hand: owner,
                });
            }
        }

        // Refresh the previous-trigger table for edge derivation next frame.
        for hand in [Hand::Left, Hand::Right] {
            let select = frame.get(hand).map(|m| m.select_active).unwrap_or(false);
            self.set_prev_select(hand, select);
        }

        events
    }
}

// ── Test helpers ───────────────────────────────────────────

#[cfg(test)]
fn hand_at(hand: Hand, anchor: Vector3<f32>, selecting: bool) -> crate::tracking::Manipulator {
    let mut m = crate::tracking::Manipulator::new(hand);
    m.grip_anchor = Some(anchor);
    m.select_active = selecting;
    m
}

#[cfg(test)]
fn frame_of(manipulators: Vec<crate::tracking::Manipulator>) -> TrackingFrame {
    TrackingFrame {
        manipulators,
        timestamp_s: 0.0,
    }
}

// ── Tests ──────────────────────────────────────────────────

//! Button press detection — per-button depth state machine driven by
//! fingertip intrusion, with recovery animation and edge-triggered actions.
//!
//! Each frame the deepest intrusion among all manipulators inside a
//! button's collision volume drives the button cap offset; the registered
//! action fires exactly once per press cycle, on the transition into
//! `FullyPressed`.

use std::collections::HashMap;

#[cfg(test)]
use nalgebra::Vector3;
use tracing::{debug, info, warn};

use crate::geom::{EntityPose, LocalBounds};
use crate::tracking::{JointId, TrackingFrame};

// ── Press phase ────────────────────────────────────────────

/// Press state of a single button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressPhase {
    /// At rest, nothing touching.
    Resting,
    /// Partially depressed by an intruding manipulator.
    Pressed,
    /// Depressed to the full-press floor.
    FullyPressed,
    /// Returning toward the resting offset after release.
    Recovering,
}

impl PressPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resting => "resting",
            Self::Pressed => "pressed",
            Self::FullyPressed => "fully-pressed",
            Self::Recovering => "recovering",
        }
    }
}

// ── Identifiers and events ─────────────────────────────────

/// Handle for a registered button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonId(pub usize);

/// Events emitted by the button bank.
#[derive(Debug, Clone, PartialEq)]
pub enum ButtonEvent {
    /// A button left rest and is being depressed.
    PressStarted { id: ButtonId },
    /// A button reached the full-press floor; its action fired.
    ActionFired { id: ButtonId },
    /// A button was released and is recovering.
    Released { id: ButtonId },
}

// ── Config ─────────────────────────────────────────────────

/// Configuration shared by all buttons in a bank.
#[derive(Debug, Clone)]
pub struct ButtonConfig {
    /// Expansion of the collision volume on every face, approximating the
    /// fingertip radius (meters).
    pub contact_tolerance: f32,
    /// Intrusion acceptance tolerance (meters): intrusions deeper than
    /// `-intrusion_epsilon` count as pressing. Shallower grazes are ignored.
    pub intrusion_epsilon: f32,
    /// Travel from resting offset to the full-press floor (meters).
    /// Copied onto each button at registration.
    pub full_press_distance: f32,
    /// Cap recovery speed after release (meters/second). Copied onto each
    /// button at registration.
    pub recovery_speed: f32,
    /// Half extents of the fallback collision volume used when an entity
    /// registers without usable geometry (meters).
    pub default_half_extent: f32,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            contact_tolerance: 0.008,
            intrusion_epsilon: 0.002,
            full_press_distance: 0.005,
            recovery_speed: 0.1,
            default_half_extent: 0.02,
        }
    }
}

// ── Button record ──────────────────────────────────────────

/// Per-button state. All fields are written only by `ButtonBank::update`.
#[derive(Debug)]
pub struct Button {
    pub id: ButtonId,
    pub label: String,
    /// World pose of the button entity.
    pub pose: EntityPose,
    /// Unexpanded local collision bounds.
    pub bounds: LocalBounds,
    /// Local-space Y of the pressable top surface.
    pub surface_offset: f32,
    /// Travel from resting offset to the full-press floor (meters).
    pub full_press_distance: f32,
    /// Cap recovery speed after release (meters/second).
    pub recovery_speed: f32,
    /// Cap offset at rest, captured lazily from the first observed offset.
    pub resting_offset: Option<f32>,
    /// Current cap offset along local Y.
    pub current_offset: f32,
    /// Press phase this frame.
    pub phase: PressPhase,
    /// Press phase last frame.
    pub prev_phase: PressPhase,
    /// Whether the action already fired during the current press cycle.
    pub action_fired: bool,
}

impl Button {
    /// Whether the button counts as held down for aggregation.
    pub fn is_down(&self) -> bool {
        matches!(self.phase, PressPhase::Pressed | PressPhase::FullyPressed)
    }
}

// ── Button bank ────────────────────────────────────────────

/// Owns every pressable entity and the action registry.
pub struct ButtonBank {
    pub config: ButtonConfig,
    buttons: Vec<Button>,
    actions: HashMap<ButtonId, Box<dyn FnMut()>>,
}

impl ButtonBank {
    pub fn new(config: ButtonConfig) -> Self {
        Self {
            config,
            buttons: Vec::new(),
            actions: HashMap::new(),
        }
    }

    /// Register a pressable entity. Geometry is read once here; a missing
    /// bounding box falls back to a default volume.
    pub fn register(
        &mut self,
        label: &str,
        pose: EntityPose,
        bounds: Option<LocalBounds>,
    ) -> ButtonId {
        let bounds = bounds.unwrap_or_else(|| {
            warn!("button {}: no geometry bounds, using default volume", label);
            let h = self.config.default_half_extent;
            LocalBounds::centered(h, h / 2.0, h)
        });

        let id = ButtonId(self.buttons.len());
        let surface_offset = bounds.top_surface_y();
        info!(
            "registered button {} ({:?}, surface y {:.3})",
            label, id, surface_offset
        );
        self.buttons.push(Button {
            id,
            label: label.to_string(),
            pose,
            bounds,
            surface_offset,
            full_press_distance: self.config.full_press_distance,
            recovery_speed: self.config.recovery_speed,
            resting_offset: None,
            current_offset: 0.0,
            phase: PressPhase::Resting,
            prev_phase: PressPhase::Resting,
            action_fired: false,
        });
        id
    }

    /// Register the action fired when a button reaches full press. A button
    /// without an action is a silent no-op.
    pub fn set_action(&mut self, id: ButtonId, action: impl FnMut() + 'static) {
        self.actions.insert(id, Box::new(action));
    }

    pub fn get(&self, id: ButtonId) -> Option<&Button> {
        self.buttons.get(id.0)
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    /// Number of buttons currently held down.
    pub fn down_count(&self) -> usize {
        self.buttons.iter().filter(|b| b.is_down()).count()
    }

    /// Advance every button one frame against the manipulators present.
    ///
    /// An empty frame is not an error: every intruded button releases and
    /// recovers toward rest.
    pub fn update(&mut self, frame: &TrackingFrame, dt: f32) -> Vec<ButtonEvent> {
        let mut events = Vec::new();
        let mut fired = Vec::new();

        for button in &mut self.buttons {
            button.prev_phase = button.phase;
            // First observation fixes the resting offset.
            let resting = *button.resting_offset.get_or_insert(button.current_offset);
            let floor = resting - button.full_press_distance;

            let volume = button.bounds.expanded(self.config.contact_tolerance);
            let mut max_intrusion: Option<f32> = None;
            for manip in &frame.manipulators {
                let tip = match manip.joint(JointId::IndexTip) {
                    Some(p) => p,
                    None => continue, // untracked joint reads as no input
                };
                let local = button.pose.to_local(&tip);
                if !volume.contains(&local) {
                    continue;
                }
                let depth = button.surface_offset - local.y;
                if depth > -self.config.intrusion_epsilon {
                    let depth = depth.max(0.0);
                    max_intrusion = Some(max_intrusion.map_or(depth, |d: f32| d.max(depth)));
                }
            }

            match max_intrusion {
                Some(depth) => {
                    button.current_offset = (resting - depth).max(floor);
                    button.phase = if depth >= button.full_press_distance {
                        PressPhase::FullyPressed
                    } else {
                        PressPhase::Pressed
                    };
                }
                None => {
                    if button.current_offset < resting {
                        button.current_offset += button.recovery_speed * dt;
                        if button.current_offset >= resting {
                            button.current_offset = resting;
                            button.phase = PressPhase::Resting;
                        } else {
                            button.phase = PressPhase::Recovering;
                        }
                    } else {
                        button.current_offset = resting;
                        button.phase = PressPhase::Resting;
                    }
                }
            }

            // Offset never leaves [floor, resting].
            button.current_offset = button.current_offset.clamp(floor, resting);

            // Edge bookkeeping.
            let was_down = matches!(
                button.prev_phase,
                PressPhase::Pressed | PressPhase::FullyPressed
            );
            if button.is_down() && !was_down {
                debug!("button {} press started", button.label);
                events.push(ButtonEvent::PressStarted { id: button.id });
            }
            if !button.is_down() && was_down {
                debug!("button {} released", button.label);
                events.push(ButtonEvent::Released { id: button.id });
            }

            if button.phase == PressPhase::FullyPressed {
                if button.prev_phase != PressPhase::FullyPressed && !button.action_fired {
                    button.action_fired = true;
                    debug!("button {} fully pressed, firing action", button.label);
                    events.push(ButtonEvent::ActionFired { id: button.id });
                    fired.push(button.id);
                }
            } else {
                // Gate resets as soon as the button leaves full press.
                button.action_fired = false;
            }
        }

        for id in fired {
            if let Some(action) = self.actions.get_mut(&id) {
                action();
            }
        }

        events
    }
}

// ── Test helpers ───────────────────────────────────────────

#[cfg(test)]
fn press_frame(tip_world: Vector3<f32>) -> TrackingFrame {
    use crate::tracking::{Hand, Manipulator};
    let mut m = Manipulator::new(Hand::Right);
    m.index_tip = Some(tip_world);
    TrackingFrame {
        manipulators: vec![m],
        timestamp_s: 0.0,
    }
}

// ── Tests ──────────────────────────────────────────────────

//! Pad aggregation — translates button and stick state into the fixed
//! discrete/analog signal set the emulation core consumes, once per frame.

use tracing::debug;

use super::button::{ButtonBank, ButtonId};
use super::grab::StickId;
use super::stick::StickMapper;

// ── Logical pad buttons ────────────────────────────────────

/// The logical buttons of the emulated pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadButton {
    A,
    B,
    Select,
    Start,
}

impl PadButton {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::Select => "select",
            Self::Start => "start",
        }
    }
}

// ── Pad state ──────────────────────────────────────────────

/// The full signal set pushed to the emulation core each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PadState {
    pub a: bool,
    pub b: bool,
    pub select: bool,
    pub start: bool,
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Raw axis values for consumers needing continuous input.
    pub axis_x: f32,
    pub axis_y: f32,
    pub magnitude: f32,
    pub angle: f32,
}

impl PadState {
    pub fn neutral() -> Self {
        Self {
            a: false,
            b: false,
            select: false,
            start: false,
            up: false,
            down: false,
            left: false,
            right: false,
            axis_x: 0.0,
            axis_y: 0.0,
            magnitude: 0.0,
            angle: 0.0,
        }
    }

    /// Compact form for status lines, e.g. `[A ][up right] x+0.72`.
    pub fn summary(&self) -> String {
        let mut held = String::new();
        for (down, name) in [
            (self.a, "A"),
            (self.b, "B"),
            (self.select, "Sel"),
            (self.start, "St"),
            (self.up, "up"),
            (self.down, "down"),
            (self.left, "left"),
            (self.right, "right"),
        ] {
            if down {
                if !held.is_empty() {
                    held.push(' ');
                }
                held.push_str(name);
            }
        }
        if held.is_empty() {
            held.push_str("idle");
        }
        format!("[{}] axis ({:+.2}, {:+.2})", held, self.axis_x, self.axis_y)
    }
}

impl Default for PadState {
    fn default() -> Self {
        Self::neutral()
    }
}

// ── Emulator port ──────────────────────────────────────────

/// The external emulation core, reduced to the one call this core makes.
/// Receives the full pad state every frame; pushes are idempotent.
pub trait EmulatorPort {
    fn push(&mut self, state: &PadState);
}

/// Port that logs state changes, standing in when no core is wired up.
pub struct TracingPort {
    last: Option<PadState>,
}

impl TracingPort {
    pub fn new() -> Self {
        Self { last: None }
    }
}

impl Default for TracingPort {
    fn default() -> Self {
        Self::new()
    }
}

impl EmulatorPort for TracingPort {
    fn push(&mut self, state: &PadState) {
        if self.last.as_ref() != Some(state) {
            debug!("pad {}", state.summary());
            self.last = Some(*state);
        }
    }
}

/// Port that records every push, for tests.
#[cfg(test)]
pub struct RecordingPort {
    pub pushes: std::rc::Rc<std::cell::RefCell<Vec<PadState>>>,
}

#[cfg(test)]
impl EmulatorPort for RecordingPort {
    fn push(&mut self, state: &PadState) {
        self.pushes.borrow_mut().push(*state);
    }
}

// ── Config ─────────────────────────────────────────────────

/// Thresholds for deriving directional booleans from the stick.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Minimum magnitude before any direction registers.
    pub deflection_threshold: f32,
    /// Per-axis value beyond which a direction registers.
    pub direction_threshold: f32,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            deflection_threshold: 0.3,
            direction_threshold: 0.5,
        }
    }
}

// ── Aggregator ─────────────────────────────────────────────

/// Maps registered entities to logical pad signals and pushes them to the
/// emulator port every frame.
pub struct PadAggregator {
    pub config: AggregatorConfig,
    bindings: Vec<(ButtonId, PadButton)>,
    dpad_stick: Option<StickId>,
    port: Box<dyn EmulatorPort>,
}

impl PadAggregator {
    pub fn new(config: AggregatorConfig, port: Box<dyn EmulatorPort>) -> Self {
        Self {
            config,
            bindings: Vec::new(),
            dpad_stick: None,
            port,
        }
    }

    /// Bind a registered button to a logical pad button.
    pub fn bind_button(&mut self, id: ButtonId, pad: PadButton) {
        self.bindings.push((id, pad));
    }

    /// Designate the stick that drives the directional signals.
    pub fn set_dpad_stick(&mut self, id: StickId) {
        self.dpad_stick = Some(id);
    }

    /// The button bound to a logical pad button, if any.
    pub fn button_for(&self, pad: PadButton) -> Option<ButtonId> {
        self.bindings
            .iter()
            .find(|(_, p)| *p == pad)
            .map(|(id, _)| *id)
    }

    /// Build this frame's pad state from controller outputs and push it.
    /// Runs after the button, grab, and stick updates of the same frame.
    pub fn update(&mut self, buttons: &ButtonBank, sticks: &StickMapper) -> PadState {
        let mut state = PadState::neutral();

        for (id, pad) in &self.bindings {
            let down = buttons.get(*id).map(|b| b.is_down()).unwrap_or(false);
            match pad {
                PadButton::A => state.a |= down,
                PadButton::B => state.b |= down,
                PadButton::Select => state.select |= down,
                PadButton::Start => state.start |= down,
            }
        }

        if let Some(stick) = self.dpad_stick.and_then(|id| sticks.get(id)) {
            state.axis_x = stick.axis_x;
            state.axis_y = stick.axis_y;
            state.magnitude = stick.magnitude;
            state.angle = stick.angle;

            // Axes evaluated independently so diagonals register.
            let deflected = stick.magnitude > self.config.deflection_threshold;
            let dir = self.config.direction_threshold;
            state.up = deflected && stick.axis_y < -dir;
            state.down = deflected && stick.axis_y > dir;
            state.left = deflected && stick.axis_x < -dir;
            state.right = deflected && stick.axis_x > dir;
        }

        self.port.push(&state);
        state
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{EntityPose, LocalBounds};
    use crate::interaction::button::ButtonConfig;
    use crate::interaction::grab::{GrabArbiter, GrabConfig};
    use crate::interaction::stick::StickConfig;
    use crate::tracking::{Hand, Manipulator, TrackingFrame};
    use nalgebra::Vector3;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Rig {
        buttons: ButtonBank,
        arbiter: GrabArbiter,
        sticks: StickMapper,
        aggregator: PadAggregator,
        pushes: Rc<RefCell<Vec<PadState>>>,
        a: ButtonId,
        stick: StickId,
    }

    fn rig() -> Rig {
        let mut buttons = ButtonBank::new(ButtonConfig {
            full_press_distance: 0.02,
            ..Default::default()
        });
        let bounds = LocalBounds::new(
            Vector3::new(-0.02, 0.0, -0.02),
            Vector3::new(0.02, 0.05, 0.02),
        );
        let a = buttons.register("a", EntityPose::at(Vector3::zeros()), Some(bounds));

        let mut arbiter = GrabArbiter::new(GrabConfig::default());
        let stick = arbiter.register();
        let mut sticks = StickMapper::new(StickConfig::default());
        sticks.register(stick, Vector3::new(0.2, 0.8, 0.0));

        let pushes = Rc::new(RefCell::new(Vec::new()));
        let port = RecordingPort {
            pushes: pushes.clone(),
        };
        let mut aggregator = PadAggregator::new(AggregatorConfig::default(), Box::new(port));
        aggregator.bind_button(a, PadButton::A);
        aggregator.set_dpad_stick(stick);

        Rig {
            buttons,
            arbiter,
            sticks,
            aggregator,
            pushes,
            a,
            stick,
        }
    }

    fn tick(rig: &mut Rig, frame: &TrackingFrame) -> PadState {
        let positions = rig.sticks.positions();
        rig.arbiter.update(frame, &positions);
        rig.sticks.update(frame, &rig.arbiter, 0.016);
        rig.buttons.update(frame, 0.016);
        rig.aggregator.update(&rig.buttons, &rig.sticks)
    }

    fn press_a() -> TrackingFrame {
        let mut m = Manipulator::new(Hand::Right);
        m.index_tip = Some(Vector3::new(0.0, 0.04, 0.0)); // partial press
        TrackingFrame {
            manipulators: vec![m],
            timestamp_s: 0.0,
        }
    }

    fn grab_and_move(offset: Vector3<f32>, first: bool) -> TrackingFrame {
        let base = Vector3::new(0.2, 0.8, 0.0);
        let mut m = Manipulator::new(Hand::Left);
        m.grip_anchor = Some(if first { base } else { base + offset });
        m.select_active = true;
        TrackingFrame {
            manipulators: vec![m],
            timestamp_s: 0.0,
        }
    }

    #[test]
    fn test_partial_and_full_press_both_map_down() {
        let mut r = rig();
        let state = tick(&mut r, &press_a());
        assert!(state.a, "partial press still counts as down");

        let mut m = Manipulator::new(Hand::Right);
        m.index_tip = Some(Vector3::new(0.0, 0.02, 0.0)); // full press
        let state = tick(
            &mut r,
            &TrackingFrame {
                manipulators: vec![m],
                timestamp_s: 0.0,
            },
        );
        assert!(state.a);
    }

    #[test]
    fn test_recovering_maps_up() {
        let mut r = rig();
        tick(&mut r, &press_a());
        let state = tick(&mut r, &TrackingFrame::empty(0.0));
        use crate::interaction::button::PressPhase;
        assert_eq!(r.buttons.get(r.a).unwrap().phase, PressPhase::Recovering);
        assert!(!state.a, "recovering reads as up");
    }

    #[test]
    fn test_direction_thresholds() {
        let mut r = rig();
        tick(&mut r, &grab_and_move(Vector3::zeros(), true));

        // Deflect right beyond both thresholds: radius 0.03 * 0.8 = 0.024.
        let state = tick(&mut r, &grab_and_move(Vector3::new(0.024, 0.0, 0.0), false));
        assert!(state.right);
        assert!(!state.left && !state.up && !state.down);

        // Small deflection below the deflection threshold: nothing.
        let state = tick(&mut r, &grab_and_move(Vector3::new(0.006, 0.0, 0.0), false));
        assert!(!state.right, "magnitude 0.2 is under the 0.3 threshold");
        assert!((state.axis_x - 0.2).abs() < 1e-5, "raw axis still reported");
    }

    #[test]
    fn test_diagonal_registers_both_axes() {
        let mut r = rig();
        tick(&mut r, &grab_and_move(Vector3::zeros(), true));
        // Forward-right past 0.5 on both axes after clamping: use a large
        // diagonal so the clamped components are ~0.707 each.
        let state = tick(
            &mut r,
            &grab_and_move(Vector3::new(0.05, 0.0, -0.05), false),
        );
        assert!(state.right && state.up, "diagonal must set both: {:?}", state);
        assert!(!state.left && !state.down);
    }

    #[test]
    fn test_push_every_frame_and_idempotent_repush() {
        let mut r = rig();
        tick(&mut r, &TrackingFrame::empty(0.0));
        tick(&mut r, &TrackingFrame::empty(0.0));
        tick(&mut r, &TrackingFrame::empty(0.0));
        let pushes = r.pushes.borrow();
        assert_eq!(pushes.len(), 3, "one push per frame, unchanged or not");
        assert_eq!(pushes[0], PadState::neutral());
        assert_eq!(pushes[1], pushes[2]);
    }

    #[test]
    fn test_unbound_stick_reports_neutral_axes() {
        let mut r = rig();
        r.aggregator.dpad_stick = None;
        let state = tick(&mut r, &grab_and_move(Vector3::zeros(), true));
        assert!(state.axis_x.abs() < 1e-6 && state.magnitude.abs() < 1e-6);
    }

    #[test]
    fn test_button_for_lookup() {
        let r = rig();
        assert_eq!(r.aggregator.button_for(PadButton::A), Some(r.a));
        assert_eq!(r.aggregator.button_for(PadButton::Start), None);
        let _ = r.stick;
    }

    #[test]
    fn test_summary_format() {
        let mut state = PadState::neutral();
        assert!(state.summary().contains("idle"));
        state.a = true;
        state.up = true;
        let s = state.summary();
        assert!(s.contains('A') && s.contains("up"), "summary was {}", s);
    }
}

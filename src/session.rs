//! Session wiring — owns the interaction controllers and runs them in the
//! one order that keeps a frame self-consistent: grab arbitration before
//! axis mapping before aggregation, with button detection independent of
//! grabs. A tick never yields; everything the aggregator reads was written
//! earlier in the same tick.

use tracing::info;

use crate::interaction::aggregator::{AggregatorConfig, EmulatorPort, PadAggregator, PadState};
use crate::interaction::button::{ButtonBank, ButtonConfig, ButtonEvent};
use crate::interaction::grab::{GrabArbiter, GrabConfig, GrabEvent, StickId};
use crate::interaction::stick::{StickConfig, StickMapper};
use crate::layout::ConsoleLayout;
use crate::tracking::smoothing::{SmoothingConfig, SmoothingFilter};
use crate::tracking::TrackingFrame;

/// Configuration for a whole session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub button: ButtonConfig,
    pub grab: GrabConfig,
    pub stick: StickConfig,
    pub smoothing: SmoothingConfig,
    pub aggregator: AggregatorConfig,
}

/// Everything one tick produced.
#[derive(Debug, Clone)]
pub struct TickOutput {
    pub pad: PadState,
    pub button_events: Vec<ButtonEvent>,
    pub grab_events: Vec<GrabEvent>,
}

/// The assembled input core.
pub struct Session {
    pub smoothing: SmoothingFilter,
    pub buttons: ButtonBank,
    pub grabs: GrabArbiter,
    pub sticks: StickMapper,
    pub aggregator: PadAggregator,
    dpad_stick: StickId,
    frame_count: u64,
}

impl Session {
    /// Register a console layout's entities and wire the aggregator.
    pub fn new(layout: &ConsoleLayout, config: SessionConfig, port: Box<dyn EmulatorPort>) -> Self {
        let smoothing = SmoothingFilter::new(config.smoothing);
        let mut buttons = ButtonBank::new(config.button);
        let mut grabs = GrabArbiter::new(config.grab);
        let mut sticks = StickMapper::new(config.stick);
        let mut aggregator = PadAggregator::new(config.aggregator, port);

        for placement in &layout.buttons {
            let id = buttons.register(placement.label, placement.pose.clone(), Some(placement.bounds));
            aggregator.bind_button(id, placement.pad);
        }

        let dpad_stick = grabs.register();
        sticks.register(dpad_stick, layout.stick.pose.position);
        aggregator.set_dpad_stick(dpad_stick);

        info!(
            "session ready: {} buttons, 1 stick",
            layout.buttons.len()
        );

        Session {
            smoothing,
            buttons,
            grabs,
            sticks,
            aggregator,
            dpad_stick,
            frame_count: 0,
        }
    }

    /// The directional stick's id.
    pub fn dpad_stick(&self) -> StickId {
        self.dpad_stick
    }

    /// Run one frame. `dt` is the wall-clock step in seconds.
    pub fn tick(&mut self, raw: &TrackingFrame, dt: f32) -> TickOutput {
        let frame = self.smoothing.apply(raw);

        // Ownership resolves first so the axis mapper reads this frame's
        // owner, never last frame's.
        let positions = self.sticks.positions();
        let grab_events = self.grabs.update(&frame, &positions);
        self.sticks.update(&frame, &self.grabs, dt);

        // Button detection is independent of grabs.
        let button_events = self.buttons.update(&frame, dt);

        // Aggregation reads everything written above, then pushes.
        let pad = self.aggregator.update(&self.buttons, &self.sticks);

        self.frame_count += 1;
        TickOutput {
            pad,
            button_events,
            grab_events,
        }
    }

    /// One-line status for periodic logging.
    pub fn status_line(&self) -> String {
        let stick = self.sticks.get(self.dpad_stick);
        let grab = self.grabs.grab(self.dpad_stick);
        format!(
            "frame {}: {} button(s) down, stick {} ({})",
            self.frame_count,
            self.buttons.down_count(),
            if grab.attached { "attached" } else { "free" },
            stick.map(|s| format!("{:+.2}, {:+.2}", s.axis_x, s.axis_y))
                .unwrap_or_else(|| "-".into()),
        )
    }
}

// ── Tests ──────────────────────────────────────────────────

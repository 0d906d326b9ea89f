//! Interaction subsystem — the per-frame state machines that turn tracked
//! manipulator input into pad signals.
//!
//! Provides:
//! - `button`: depth-based press detection with edge-triggered actions
//! - `grab`: trigger-edge grab arbitration, single owner per stick
//! - `stick`: displacement-to-axis mapping with spring return
//! - `aggregator`: translation to the emulator's fixed signal set

pub mod aggregator;
pub mod button;
pub mod grab;
pub mod stick;

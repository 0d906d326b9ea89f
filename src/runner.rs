//! Frame runner — drives the session at a fixed tick rate with graceful
//! signal handling, an optional exit timer for soak/CI runs, and periodic
//! status logging.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use calloop::EventLoop;
use tracing::info;

use crate::frame_stats::FrameStats;
use crate::session::Session;
use crate::tracking::TrackingSource;

/// Global flag set by SIGTERM/SIGINT handlers.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Runner configuration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Tick rate in Hz.
    pub tick_hz: u32,
    /// Exit after N seconds (soak/CI runs).
    pub exit_after: Option<u64>,
    /// Seconds between status log lines.
    pub status_interval_s: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60,
            exit_after: None,
            status_interval_s: 30,
        }
    }
}

/// Install signal handlers for graceful shutdown (SIGTERM, SIGINT).
fn install_signal_handlers() {
    unsafe {
        libc::signal(libc::SIGTERM, signal_handler as libc::sighandler_t);
        libc::signal(libc::SIGINT, signal_handler as libc::sighandler_t);
    }
}

extern "C" fn signal_handler(_sig: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Run the session against a tracking source until shutdown.
///
/// Every iteration samples the source, runs one session tick, then parks
/// in the event loop for the remainder of the tick interval.
pub fn run(
    source: &mut dyn TrackingSource,
    session: &mut Session,
    config: RunnerConfig,
) -> anyhow::Result<()> {
    let mut event_loop = EventLoop::<()>::try_new()?;

    install_signal_handlers();

    let tick_interval = Duration::from_secs_f64(1.0 / config.tick_hz.max(1) as f64);
    let mut stats = FrameStats::new(1000, tick_interval.as_secs_f64() * 1000.0);

    let start = Instant::now();
    let exit_duration = config.exit_after.map(Duration::from_secs);
    let status_interval = Duration::from_secs(config.status_interval_s.max(1));
    let mut last_status = Instant::now();
    let mut last_tick = Instant::now();

    info!(
        "runner: source '{}' at {} Hz, entering frame loop",
        source.name(),
        config.tick_hz
    );

    loop {
        // Check global shutdown flag (set by signal handler).
        if SHUTDOWN_REQUESTED.load(Ordering::SeqCst) {
            info!("shutdown signal received, exiting");
            break;
        }

        // Exit timer for soak/CI runs.
        if let Some(dur) = exit_duration {
            if start.elapsed() >= dur {
                info!("exit timer fired after {}s", dur.as_secs());
                break;
            }
        }

        let now = Instant::now();
        // Cap dt so a stalled process does not snap animations.
        let dt = (now - last_tick).as_secs_f32().min(0.1);
        last_tick = now;

        let frame = source.sample(start.elapsed().as_secs_f64());
        let t0 = Instant::now();
        session.tick(&frame, dt);
        stats.record(t0.elapsed().as_secs_f64() * 1000.0);

        if last_status.elapsed() >= status_interval {
            info!("{}; {}", session.status_line(), stats.summary_line());
            last_status = Instant::now();
        }

        event_loop.dispatch(Some(tick_interval), &mut ())?;
    }

    info!("runner stopped: {}", stats.summary_line());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = RunnerConfig::default();
        assert_eq!(config.tick_hz, 60);
        assert!(config.exit_after.is_none());
    }

    #[test]
    fn test_tick_interval_guards_zero_hz() {
        let config = RunnerConfig {
            tick_hz: 0,
            ..Default::default()
        };
        let interval = Duration::from_secs_f64(1.0 / config.tick_hz.max(1) as f64);
        assert_eq!(interval, Duration::from_secs(1));
    }
}

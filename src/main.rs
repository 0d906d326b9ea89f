//! ghostpad — hand-tracked virtual gamepad for a legacy emulation core.
//!
//! Tracked manipulators press virtual buttons and grab a virtual stick;
//! the resulting pad signals are pushed to the emulator port every frame.

mod frame_stats;
mod geom;
mod interaction;
mod layout;
mod runner;
mod session;
mod tracking;

use anyhow::Context;
use clap::Parser;
use nalgebra::Vector3;
use tracing::info;

use crate::interaction::aggregator::{PadButton, TracingPort};
use crate::layout::ConsoleLayout;
use crate::session::{Session, SessionConfig};
use crate::tracking::synthetic::SyntheticSource;
use crate::tracking::{NullSource, TrackingSource};

#[derive(Parser, Debug)]
#[command(name = "ghostpad", about = "Hand-tracked virtual gamepad")]
struct Cli {
    /// Tracking source: synthetic or null
    #[arg(long, default_value = "synthetic")]
    source: String,

    /// Tick rate in Hz
    #[arg(long, default_value_t = 60)]
    hz: u32,

    /// Exit after N seconds (soak/CI runs)
    #[arg(long)]
    exit_after: Option<u64>,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("ghostpad {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ghostpad=info".into()),
        )
        .init();

    info!("ghostpad v{} starting", env!("CARGO_PKG_VERSION"));

    let layout = ConsoleLayout::standard();

    let mut source: Box<dyn TrackingSource> = match cli.source.as_str() {
        "synthetic" => {
            let a = layout
                .buttons
                .iter()
                .find(|b| b.pad == PadButton::A)
                .context("layout has no A button")?;
            let button_top =
                a.pose.position + Vector3::new(0.0, a.bounds.top_surface_y(), 0.0);
            Box::new(SyntheticSource::new(button_top, layout.stick.pose.position))
        }
        "null" => Box::new(NullSource::new()),
        other => {
            eprintln!("Unknown source: {other}. Use: synthetic or null");
            std::process::exit(1);
        }
    };

    let mut session = Session::new(
        &layout,
        SessionConfig::default(),
        Box::new(TracingPort::new()),
    );

    // Wire a visible action per logical button so full presses show up in
    // the logs even at the default filter level.
    for pad in [PadButton::A, PadButton::B, PadButton::Select, PadButton::Start] {
        if let Some(id) = session.aggregator.button_for(pad) {
            session
                .buttons
                .set_action(id, move || info!("action: {} fully pressed", pad.as_str()));
        }
    }

    runner::run(
        source.as_mut(),
        &mut session,
        runner::RunnerConfig {
            tick_hz: cli.hz,
            exit_after: cli.exit_after,
            ..Default::default()
        },
    )
}

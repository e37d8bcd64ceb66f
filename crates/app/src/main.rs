use std::path::PathBuf;

use clap::{Parser, Subcommand};
use robot_replay_core::{
    Axis, MediaControl, OrderSession, RecordingSurface, ReplayView, TimeValue, ViewerConfig,
};
use tracing_subscriber::EnvFilter;

fn main() -> robot_replay_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { session } => run_inspect(&session),
        Commands::Replay {
            session,
            step,
            seek_at,
        } => run_replay(&session, step, seek_at),
    }
}

fn run_inspect(path: &PathBuf) -> robot_replay_core::Result<()> {
    let session = OrderSession::from_file(path)?;
    println!(
        "order {} ({}), {:.2}s",
        session.id(),
        session.video_filename,
        session.duration()
    );

    let surface = RecordingSurface::new();
    let mut view = ReplayView::new(
        &ViewerConfig::default(),
        Box::new(SimulatedMedia),
        Box::new(surface.clone()),
    );
    view.load_session(session)?;

    for config in surface.full_configs() {
        println!("{} chart:", config.title);
        if let Axis::Categorical { domain } = &config.axis {
            println!("  categories: {}", domain.join(", "));
        }
        for series in &config.series {
            println!(
                "  {} [{}] {} samples",
                series.name,
                series.color,
                series.samples.len()
            );
        }
        if !config.extra_points.is_empty() {
            println!("  {} annotated points", config.extra_points.len());
        }
    }
    Ok(())
}

fn run_replay(
    path: &PathBuf,
    step: f64,
    seek_at: Option<f64>,
) -> robot_replay_core::Result<()> {
    let session = OrderSession::from_file(path)?;
    let duration = session.duration().max(step);

    let surface = RecordingSurface::new();
    let mut view = ReplayView::new(
        &ViewerConfig::default(),
        Box::new(SimulatedMedia),
        Box::new(surface.clone()),
    );
    view.load_session(session)?;
    tracing::info!(charts = view.charts().len(), "session loaded");

    let mut time = 0.0;
    let mut seek_pending = seek_at;
    while time <= duration {
        if let Some(target) = seek_pending {
            if time >= target {
                tracing::info!(target, "simulating chart-originated seek");
                view.on_chart_pointer(target);
                // A real element answers the commanded seek with a native
                // seeking event at the target.
                view.on_media_seeking(target)?;
                seek_pending = None;
            }
        }
        view.on_media_time(time)?;
        view.flush_frame()?;
        time += step;
    }

    println!("replayed {duration:.2}s in steps of {step:.2}s");
    println!(
        "full configurations: {} (structural only)",
        surface.full_configs().len()
    );
    println!("scoped cursor patches: {}", surface.patches().len());
    println!("final canonical time: {:.2}s", view.current_time());
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

/// Media stand-in for the command line harness; a browser embedding would
/// wrap the actual video element instead.
#[derive(Debug, Default)]
struct SimulatedMedia;

impl MediaControl for SimulatedMedia {
    fn pause(&mut self) {
        tracing::debug!("media: pause");
    }

    fn set_position(&mut self, seconds: TimeValue) {
        tracing::debug!(seconds, "media: set position");
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Synchronized robot telemetry replay viewer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a session payload and print the charts it projects into.
    Inspect {
        /// Path to a pre-processed order telemetry JSON file.
        session: PathBuf,
    },
    /// Drive a simulated playback through the engine and report the update
    /// traffic it produced.
    Replay {
        /// Path to a pre-processed order telemetry JSON file.
        session: PathBuf,
        /// Simulated time-advance interval in seconds.
        #[arg(long, default_value_t = 0.25)]
        step: f64,
        /// Inject a chart-originated seek once playback passes this time.
        #[arg(long)]
        seek_at: Option<f64>,
    },
}

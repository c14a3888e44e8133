//! pointer-replay - Command line entry point
//!
//! Lists, inspects and replays trajectories in the exchange directory.
//! Replay runs headless against the system clock and reports positions
//! through the log.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pointer_replay::{
    config::{Config, LoggingSettings, CONFIG_FILE},
    storage::{ExchangeDirectory, TrajectoryStore},
    SystemClock, TrajectoryPlayer,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Pointer trajectory inspection and playback
#[derive(Parser, Debug)]
#[command(name = "pointer-replay")]
#[command(about = "Inspect and replay recorded pointer trajectories", long_about = None)]
struct Args {
    /// Configuration file (defaults to pointer-replay.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Exchange directory, overriding the configuration
    #[arg(short = 'd', long)]
    exchange_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List trajectories in the exchange directory
    List,
    /// Print the metadata of a trajectory
    Inspect {
        /// Row file, or a bare name inside the exchange directory
        file: PathBuf,
    },
    /// Replay a trajectory in real time
    Replay {
        /// Row file, or a bare name inside the exchange directory
        file: PathBuf,

        /// Speed multiplier
        #[arg(short, long)]
        speed: Option<f64>,

        /// Ticks per second (defaults to playback.frame_rate)
        #[arg(long)]
        fps: Option<u32>,
    },
}

fn init_tracing(settings: &LoggingSettings, verbose: bool) -> Option<WorkerGuard> {
    let level = if verbose {
        "debug"
    } else {
        settings.effective_level()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match &settings.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "pointer_replay.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = Config::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            config.apply_env();
            config
        }
        None => Config::load_or_default(Some(Path::new(CONFIG_FILE))),
    };

    if let Some(dir) = &args.exchange_dir {
        config.storage.exchange_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

fn list(store: &ExchangeDirectory) -> Result<()> {
    let files = store.list()?;
    if files.is_empty() {
        println!("No trajectories in {}", store.root().display());
        return Ok(());
    }

    for path in files {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        match store.load(&path) {
            Ok(t) => println!(
                "{}  {} points  {:.3}s  {:.1}px",
                name,
                t.len(),
                t.duration(),
                t.metadata().total_distance
            ),
            Err(e) => println!("{}  unreadable: {}", name, e),
        }
    }
    Ok(())
}

fn inspect(store: &ExchangeDirectory, file: &Path) -> Result<()> {
    let trajectory = store.load(file)?;
    let start = trajectory.start_position();
    let end = trajectory.end_position();

    println!("points:   {}", trajectory.len());
    println!("start:    ({:.2}, {:.2})", start.x, start.y);
    println!("end:      ({:.2}, {:.2})", end.x, end.y);
    println!("duration: {:.4}s", trajectory.duration());
    println!("{}", serde_json::to_string_pretty(trajectory.metadata())?);
    Ok(())
}

fn replay(
    store: &ExchangeDirectory,
    config: &Config,
    file: &Path,
    speed: Option<f64>,
    fps: Option<u32>,
) -> Result<()> {
    let trajectory = store.load(file)?;
    let fps = fps.unwrap_or(config.playback.frame_rate).max(1);
    let frame = Duration::from_secs_f64(1.0 / fps as f64);

    let span = tracing::info_span!("replay", file = %file.display());
    let mut player = TrajectoryPlayer::new(
        trajectory,
        config.playback.clone(),
        Arc::new(SystemClock::new()),
    )
    .with_span(span);

    if let Some(speed) = speed {
        player.set_speed(speed);
    }

    tracing::info!(
        points = player.trajectory().len(),
        duration = player.total_duration(),
        speed = player.speed(),
        fps,
        "Starting replay"
    );

    player.start();
    let mut ticks = 0u64;
    while !player.is_finished() {
        player.advance();
        let position = player.position();
        tracing::debug!(
            x = position.x,
            y = position.y,
            cursor = player.cursor(),
            trail = player.trail().len(),
            "tick"
        );
        ticks += 1;
        std::thread::sleep(frame);
    }

    let end = player.position();
    println!(
        "Replayed {} points in {} ticks, ended at ({:.2}, {:.2})",
        player.trajectory().len(),
        ticks,
        end.x,
        end.y
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    let _guard = init_tracing(&config.logging, args.verbose);

    tracing::debug!(exchange_dir = %config.storage.exchange_dir.display(), "Configuration loaded");

    let store = ExchangeDirectory::open(config.storage.clone())?;

    match &args.command {
        Command::List => list(&store),
        Command::Inspect { file } => inspect(&store, file),
        Command::Replay { file, speed, fps } => replay(&store, &config, file, *speed, *fps),
    }
}

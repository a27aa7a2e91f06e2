//! Headless runner for the simulation core.
//!
//! Usage:
//!   runner-sim run --level levels/first.ron --ticks 600 --seed 7 --record out.json
//!   runner-sim run --level levels/first.ron --realtime --seconds 5
//!   runner-sim verify --level levels/first.ron --replay out.json
//!   runner-sim check --level levels/first.ron

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use runner_core::animation::AnimationLibrary;
use runner_core::config::SimConfig;
use runner_core::input::RandomInput;
use runner_core::level::Level;
use runner_core::logging::{init_tracing, LogLevel, TimingSpan, TracingConfig};
use runner_core::replay::ReplayRecording;
use runner_core::scheduler::GameLoop;
use runner_core::session::Session;

#[derive(Parser)]
#[command(name = "runner-sim")]
#[command(about = "Run, record and verify platformer simulations without a screen")]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Tuning file (RON, or JSON by extension)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a level with seeded random input
    Run {
        #[arg(long)]
        level: PathBuf,
        /// Ticks to simulate headless
        #[arg(long, default_value_t = 600)]
        ticks: u64,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Sprite clips (RON)
        #[arg(long)]
        clips: Option<PathBuf>,
        /// Write a replay of the run here
        #[arg(long)]
        record: Option<PathBuf>,
        /// Drive the session from the wall-clock loop instead of stepping
        #[arg(long)]
        realtime: bool,
        /// Wall-clock limit for --realtime
        #[arg(long, default_value_t = 10)]
        seconds: u64,
    },
    /// Replay a recording and compare the final state digest
    Verify {
        #[arg(long)]
        level: PathBuf,
        #[arg(long)]
        replay: PathBuf,
    },
    /// Validate a level file and print its grid
    Check {
        #[arg(long)]
        level: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&TracingConfig::default().with_level(LogLevel::from_verbosity(cli.verbose)));

    let config = match &cli.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimConfig::default(),
    };

    match cli.command {
        Command::Run {
            level,
            ticks,
            seed,
            clips,
            record,
            realtime,
            seconds,
        } => {
            let level = load_level(&level, &config)?;
            let mut session = Session::try_new(level, config.clone())
                .context("tuning does not fit the level")?
                .with_input(RandomInput::new(seed))
                .record_inputs();
            if let Some(path) = &clips {
                let library = AnimationLibrary::load(path)
                    .with_context(|| format!("loading clips {}", path.display()))?;
                session = session.with_animations(&library);
            }

            let session = if realtime {
                run_realtime(session, &config, Duration::from_secs(seconds))?
            } else {
                let _span = TimingSpan::new("headless_run");
                for _ in 0..ticks {
                    if session.state().is_terminal() {
                        break;
                    }
                    session.tick(config.tick_duration().as_secs_f32());
                }
                session
            };

            println!("{}", session.snapshot().to_json());
            println!("digest: {}", session.digest());

            if let Some(path) = &record {
                let recording = ReplayRecording::capture(&session)?;
                recording
                    .save(path)
                    .with_context(|| format!("writing replay {}", path.display()))?;
                info!(path = %path.display(), ticks = recording.header.ticks, "replay written");
            }
        }
        Command::Verify { level, replay } => {
            let level = load_level(&level, &config)?;
            let recording = ReplayRecording::load(&replay)
                .with_context(|| format!("reading replay {}", replay.display()))?;
            let verdict = recording.verify(&level, &config)?;
            println!(
                "ticks: {}  outcome: {:?}  digest: {}",
                verdict.ticks, verdict.outcome, verdict.digest
            );
            if !verdict.matches {
                bail!(
                    "replay diverged: recorded {:?} / {}",
                    recording.header.outcome,
                    recording.header.final_digest
                );
            }
            println!("replay verified");
        }
        Command::Check { level } => {
            let level = load_level(&level, &config)?;
            println!(
                "level {} \"{}\": {}x{} tiles, {} enemies, {} gold",
                level.id,
                level.name,
                level.grid.width(),
                level.grid.height(),
                level.enemy_spawns.len(),
                level.gold_spawns.len()
            );
            for row in level.grid.rows() {
                println!("  |{row}|");
            }
        }
    }

    Ok(())
}

fn load_level(path: &Path, config: &SimConfig) -> Result<Level> {
    Level::load(path, config.tile_size).with_context(|| format!("loading level {}", path.display()))
}

fn run_realtime(session: Session, config: &SimConfig, limit: Duration) -> Result<Session> {
    let mut game_loop = GameLoop::spawn(session, config)?;
    let deadline = Instant::now() + limit;
    while game_loop.is_running() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(20));
    }
    game_loop
        .stop()
        .context("loop thread ended without returning the session")
}

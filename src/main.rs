use boidsim::{Scenario, ScenarioConfig, ExecutionMode};
use boidsim::{run_benchmark, bench_step_curve, DEFAULT_ITERATIONS};
use boidsim::{TerminalLoop, TerminalSession};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "boidsim", about = "Synchronous 3D boids flocking simulation")]
struct Args {
    /// Scenario YAML; built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Time a fixed number of steps without drawing
    Bench {
        /// Number of steps to run
        #[arg(default_value_t = DEFAULT_ITERATIONS)]
        iterations: u64,

        /// Run both phases on one thread
        #[arg(long)]
        sequential: bool,
    },
    /// Draw the flock as text in the terminal (press q or Escape to quit)
    Ascii {
        /// Stop after this many frames
        #[arg(long)]
        frames: Option<u64>,

        #[arg(long, default_value_t = 50)]
        delay_ms: u64,

        /// Columns; follows the terminal when omitted
        #[arg(long)]
        width: Option<usize>,

        /// Rows; follows the terminal when omitted
        #[arg(long)]
        height: Option<usize>,
    },
    /// Open the 3D viewer (press q or Escape to quit)
    View,
    /// Per-step time across population sizes, CSV on stdout
    Sweep {
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

// load here to keep main clean
fn load_scenario(path: Option<&PathBuf>) -> Result<Scenario> {
    let cfg = match path {
        Some(path) => ScenarioConfig::from_path(path)?,
        None => ScenarioConfig::default(),
    };
    Ok(Scenario::build(cfg)?)
}

fn init_logging() {
    // stderr, so stdout stays clean for timings and frames
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    match args.command {
        Command::Bench { iterations, sequential } => {
            let mut scenario = load_scenario(args.config.as_ref())?;
            if sequential {
                scenario = scenario.with_mode(ExecutionMode::Sequential);
            }
            let mut engine = scenario.into_engine()?;

            println!("Number of iterations {}", iterations);
            let report = run_benchmark(&mut engine, iterations);
            println!("Execution Time: {} ms", report.elapsed_ms);
        }
        Command::Ascii { frames, delay_ms, width, height } => {
            let scenario = load_scenario(args.config.as_ref())?;
            let scale = scenario.flock_params.spatial_scale;
            let mut engine = scenario.into_engine()?;

            let mut terminal = TerminalLoop::new(io::stdout(), scale, Duration::from_millis(delay_ms))
                .with_size(width, height)
                .with_frame_cap(frames)
                .interactive();

            let session = TerminalSession::enter().context("failed to set up the terminal")?;
            let steps = engine.run_until(&mut terminal);
            drop(session);

            if let Some(e) = terminal.take_error() {
                return Err(e).context("terminal loop failed");
            }
            info!(steps, "terminal closed");
        }
        Command::View => {
            let engine = load_scenario(args.config.as_ref())?.into_engine()?;
            run_viewer(engine)?;
        }
        Command::Sweep { seed } => {
            let sizes: Vec<usize> = (50..=2000).step_by(50).collect();
            bench_step_curve(&mut io::stdout().lock(), &sizes, seed)?;
        }
    }

    Ok(())
}

#[cfg(feature = "viewer")]
fn run_viewer(engine: boidsim::StepEngine) -> Result<()> {
    boidsim::run_3d(engine);
    Ok(())
}

#[cfg(not(feature = "viewer"))]
fn run_viewer(_engine: boidsim::StepEngine) -> Result<()> {
    anyhow::bail!("built without the `viewer` feature")
}

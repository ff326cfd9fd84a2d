//! Rescue grid simulation CLI.
//!
//! `rescue-sim run` executes a map; `rescue-sim generate` produces one.

use clap::{Parser, Subcommand};
use rescue_sim::{
    generate, GenParams, KnowledgeMode, MapFile, NullRenderer, Renderer, SimConfig,
    SimOutcome, SimulationDriver, TextRenderer,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Rescue robot simulation: agents explore a partially known grid and
/// clear every reachable target.
#[derive(Parser, Debug)]
#[command(name = "rescue-sim")]
#[command(about = "Run or generate rescue grid simulations", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a simulation from a binary map file
    Run {
        /// Input map file
        #[arg(short, long, default_value = "generated_map.bin")]
        filename: PathBuf,

        /// Master seed for determinism (0 = derive from time)
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Tick cap so unsolvable maps still terminate
        #[arg(long, default_value = "10000")]
        max_ticks: u64,

        /// Knowledge-sharing mode (shared, independent)
        #[arg(short, long, default_value = "shared")]
        mode: String,

        /// Draw an ASCII frame every tick
        #[arg(long)]
        render: bool,

        /// JSON outcome on stdout for CI parsing
        #[arg(long)]
        json: bool,
    },

    /// Generate a random map file
    Generate {
        /// Number of rows
        #[arg(short, long, default_value = "25")]
        rows: usize,

        /// Number of columns
        #[arg(short, long, default_value = "25")]
        cols: usize,

        /// Square map size (overrides rows and cols)
        #[arg(short = 'q', long)]
        square: Option<usize>,

        /// Number of obstacles
        #[arg(short, long, default_value = "100")]
        obstacles: usize,

        /// Number of targets
        #[arg(short, long, default_value = "20")]
        targets: usize,

        /// Number of robot start cells
        #[arg(short = 'b', long, default_value = "5")]
        robots: usize,

        /// Seed for reproducible maps (0 = derive from time)
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Output map file
        #[arg(short, long, default_value = "generated_map.bin")]
        filename: PathBuf,
    },
}

/// Seed 0 means "give me a fresh run": derive one from the clock.
fn resolve_seed(seed: u64) -> u64 {
    if seed != 0 {
        return seed;
    }
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_nanos() as u64
}

fn run_simulation(
    filename: &PathBuf,
    seed: u64,
    max_ticks: u64,
    mode: KnowledgeMode,
    render: bool,
) -> Result<SimOutcome, Box<dyn std::error::Error>> {
    let map = MapFile::load(filename)?;
    let (world, starts) = map.into_world()?;

    let config = SimConfig {
        seed,
        max_ticks,
        knowledge: mode,
    };
    let mut driver = SimulationDriver::new(world, starts, config)?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || stop.store(true, Ordering::Relaxed))?;
    }

    let mut renderer: Box<dyn Renderer> = if render {
        Box::new(TextRenderer::stdout())
    } else {
        Box::new(NullRenderer)
    };

    Ok(driver.run(renderer.as_mut(), &stop)?)
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("failed to set tracing subscriber");

    match cli.command {
        Command::Run {
            filename,
            seed,
            max_ticks,
            mode,
            render,
            json,
        } => {
            let mode: KnowledgeMode = mode.parse().unwrap_or_else(|e| {
                eprintln!("error: {e}");
                eprintln!("available modes: shared, independent");
                std::process::exit(1);
            });
            let seed = resolve_seed(seed);

            match run_simulation(&filename, seed, max_ticks, mode, render) {
                Ok(outcome) => {
                    if json {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&outcome)
                                .expect("outcome serializes")
                        );
                    } else if outcome.completed {
                        info!(
                            ticks = outcome.ticks,
                            rescued = outcome.rescued,
                            "all targets rescued"
                        );
                    } else {
                        error!(
                            ticks = outcome.ticks,
                            rescued = outcome.rescued,
                            unrescued = outcome.unrescued.len(),
                            "run ended with targets remaining"
                        );
                    }
                    if !outcome.completed {
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    error!("simulation failed: {e}");
                    std::process::exit(1);
                }
            }
        }

        Command::Generate {
            rows,
            cols,
            square,
            obstacles,
            targets,
            robots,
            seed,
            filename,
        } => {
            let rows = square.unwrap_or(rows);
            let cols = square.unwrap_or(cols);
            let params = GenParams {
                rows,
                cols,
                obstacles,
                targets,
                robots,
                seed: resolve_seed(seed),
            };

            match generate(&params) {
                Ok(map) => match map.save(&filename) {
                    Ok(()) => {
                        info!(path = %filename.display(), rows, cols, "map generated")
                    }
                    Err(e) => {
                        error!("failed to write map: {e}");
                        std::process::exit(1);
                    }
                },
                Err(e) => {
                    error!("generation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}

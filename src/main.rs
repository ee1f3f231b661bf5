//! Selfish-Altruist - CLI Entry Point
//!
//! Headless runner for the spatial Selfish-Altruist model.

use clap::{Parser, Subcommand};
use selfish_altruist::checkpoint::{Checkpoint, CheckpointManager};
use selfish_altruist::export;
use selfish_altruist::{benchmark, Config, Strategy, World};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "selfish-altruist")]
#[command(version)]
#[command(about = "Spatial Selfish-Altruist evolutionary game on a toroidal grid")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a new simulation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Maximum number of steps (defaults to run.max_steps)
        #[arg(short, long)]
        steps: Option<u64>,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Record and export per-cell fitness and lottery tables
        #[arg(long)]
        tables: bool,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Resume simulation from checkpoint
    Resume {
        /// Checkpoint file to resume from
        #[arg(short, long)]
        checkpoint: PathBuf,

        /// Number of additional steps
        #[arg(short, long, default_value = "200")]
        steps: u64,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of steps
        #[arg(short, long, default_value = "1000")]
        steps: u64,

        /// Grid side length
        #[arg(long, default_value = "100")]
        size: usize,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Analyze a checkpoint file
    Analyze {
        /// Checkpoint file
        checkpoint: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            steps,
            output,
            seed,
            tables,
            quiet,
        } => run_simulation(config, steps, output, seed, tables, quiet),

        Commands::Resume {
            checkpoint,
            steps,
            output,
        } => {
            init_logging("info");
            resume_simulation(checkpoint, steps, output)
        }

        Commands::Benchmark { steps, size } => {
            init_logging("info");
            run_benchmark(steps, size)
        }

        Commands::Init { output } => generate_config(output),

        Commands::Analyze { checkpoint } => analyze_checkpoint(checkpoint),
    }
}

/// RUST_LOG wins over the configured default
fn init_logging(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn run_simulation(
    config_path: PathBuf,
    steps: Option<u64>,
    output: PathBuf,
    seed: Option<u64>,
    tables: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let from_file = config_path.exists();
    let mut config = if from_file {
        Config::from_file(&config_path)?
    } else {
        Config::default()
    };
    init_logging(&config.logging.log_level);
    if from_file {
        log::info!("Loaded config from: {:?}", config_path);
    } else {
        log::info!("Using default configuration");
    }
    if tables {
        config.logging.record_tables = true;
    }
    let max_steps = steps.unwrap_or(config.run.max_steps);

    std::fs::create_dir_all(&output)?;

    let world = match seed {
        Some(s) => World::new_with_seed(config, s)?,
        None => World::new(config)?,
    };

    println!("Starting simulation");
    println!("  Grid: {}x{}", world.config.grid.width, world.config.grid.height);
    println!("  Seed: {}", world.seed());
    println!("  Stop policy: {:?}", world.config.run.stop_policy);
    println!("  Max steps: {}", max_steps);
    println!("{}", world.stats().summary());

    drive(world, max_steps, &output, quiet, false)
}

fn resume_simulation(
    checkpoint_path: PathBuf,
    steps: u64,
    output: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Loading checkpoint: {:?}", checkpoint_path);

    let checkpoint = Checkpoint::load(&checkpoint_path)?;
    let world = World::from_checkpoint(checkpoint)?;

    println!("Resumed at step {}", world.time());
    println!("{}", world.stats().summary());
    if !world.is_running() {
        println!("Run had already stopped; nothing to do");
        return Ok(());
    }

    std::fs::create_dir_all(&output)?;
    drive(world, steps, &output, false, true)
}

/// Step, report, checkpoint and export until stopped or out of steps
fn drive(
    mut world: World,
    max_steps: u64,
    output: &Path,
    quiet: bool,
    resumed: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut checkpoint_mgr = CheckpointManager::new(
        output,
        world.config.logging.checkpoint_interval,
        10, // Keep last 10 checkpoints
    )?;
    let stats_interval = world.config.logging.stats_interval;
    let mut tables = match (world.config.logging.record_tables, resumed) {
        (false, _) => None,
        (true, false) => Some(export::TableWriter::create(output)?),
        (true, true) => Some(export::TableWriter::append_to(output)?),
    };

    let start = Instant::now();
    let mut taken = 0;

    while taken < max_steps && world.is_running() {
        world.step();
        taken += 1;

        // Rows go to disk every step instead of piling up in memory
        if let Some(writer) = tables.as_mut() {
            writer.append(&world.take_audit())?;
        }

        if !quiet && (world.time() % stats_interval == 0 || !world.is_running()) {
            println!("{}", world.stats().summary());
        }

        if checkpoint_mgr.should_save(world.time()) {
            match checkpoint_mgr.save(&world.create_checkpoint()) {
                Ok(path) => log::debug!("Checkpoint saved: {:?}", path),
                Err(e) => log::error!("Checkpoint error: {}", e),
            }
        }
    }
    if !world.is_running() {
        println!("\nStopping condition met at step {}", world.time());
    }

    let elapsed = start.elapsed();

    println!();
    println!("=== Simulation Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Steps: {} (total {})", taken, world.time());
    println!("Speed: {:.1} steps/s", taken as f64 / elapsed.as_secs_f64());
    println!("Selfish: {}", world.stats().n_selfish);
    println!("Altruist: {}", world.stats().n_altruist);
    println!("Void: {}", world.stats().n_void);
    println!("%Altruist: {:.3}", world.stats().percentage_of_altruist);

    let final_path = output.join("final_checkpoint.bin");
    world.create_checkpoint().save(&final_path)?;
    println!("Final checkpoint: {:?}", final_path);

    let history_path = output.join("stats_history.json");
    world.stats_history.save(&history_path.to_string_lossy())?;
    let final_stats_path = output.join("final_stats.json");
    world.stats().save_json(&final_stats_path.to_string_lossy())?;

    let manifest = export::export_run(&world, output)?;
    println!("Time series: {:?}", manifest.stats_file);
    println!("Grid snapshot: {:?}", manifest.grid_file);
    if let Some(writer) = tables {
        let (fitness, lottery) = writer.finish()?;
        println!("Fitness table: {:?}", fitness);
        println!("Lottery table: {:?}", lottery);
    }

    Ok(())
}

fn run_benchmark(steps: u64, size: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Selfish-Altruist Benchmark ===");
    println!("Steps: {}", steps);
    println!("Grid: {}x{}", size, size);
    println!();

    let result = benchmark(steps, size)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}

fn analyze_checkpoint(checkpoint_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Checkpoint Analysis ===");
    println!("File: {:?}", checkpoint_path);
    println!();

    let checkpoint = Checkpoint::load(&checkpoint_path)?;
    let size = checkpoint.size_bytes();
    let world = World::from_checkpoint(checkpoint)?;

    println!("Step: {}", world.time());
    println!("Seed: {}", world.seed());
    println!("Running: {}", world.is_running());
    println!("Grid: {}x{}", world.config.grid.width, world.config.grid.height);
    println!();

    let n_cells = world.cells().len();
    for strategy in Strategy::ALL {
        let members: Vec<f64> = world
            .cells()
            .iter()
            .filter(|c| c.strategy == strategy)
            .map(|c| c.fitness)
            .collect();
        let mean = if members.is_empty() {
            0.0
        } else {
            members.iter().sum::<f64>() / members.len() as f64
        };
        println!(
            "{:>8}: {:5} cells ({:5.1}%), mean fitness {:.3}",
            strategy.label(),
            members.len(),
            100.0 * members.len() as f64 / n_cells as f64,
            mean
        );
    }

    println!();
    println!("Checkpoint size: {:.2} KB", size as f64 / 1_000.0);

    Ok(())
}

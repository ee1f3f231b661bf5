//! # Selfish-Altruist
//!
//! Spatial evolutionary game of selfish and altruistic strategies on a
//! toroidal grid, after Wilensky's NetLogo Selfish-Altruist model.
//!
//! ## Model
//!
//! Every cell holds one of three strategies: Selfish, Altruist or Void. Each
//! step runs three barrier-separated passes over the whole grid:
//!
//! 1. **Fitness** from the share of altruists in the cell's Von-Neumann
//!    neighborhood (radius 1, center included, edges wrapping).
//! 2. **Lottery weights** from the fitness each strategy contributes to that
//!    neighborhood, with a global disease term added to Void.
//! 3. **Replacement**: one uniform draw per cell picks its next strategy.
//!
//! Runs are fully determined by the configuration and the seed.
//!
//! ## Quick Start
//!
//! ```rust
//! use selfish_altruist::{Config, World};
//!
//! let mut config = Config::default();
//! config.grid.width = 20;
//! config.grid.height = 20;
//!
//! let mut world = World::new_with_seed(config, 42).unwrap();
//! world.run(100);
//!
//! let stats = world.stats();
//! assert_eq!(stats.n_selfish + stats.n_altruist + stats.n_void, 400);
//! println!("{}", stats.summary());
//! ```
//!
//! ## Checkpoints
//!
//! ```rust,no_run
//! use selfish_altruist::{Config, World};
//! use selfish_altruist::checkpoint::Checkpoint;
//!
//! let mut world = World::new(Config::default()).unwrap();
//! world.run(50);
//!
//! world.create_checkpoint().save("checkpoint.bin").unwrap();
//!
//! let loaded = Checkpoint::load("checkpoint.bin").unwrap();
//! let restored = World::from_checkpoint(loaded).unwrap();
//! ```

pub mod audit;
pub mod cell;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod export;
pub mod fitness;
pub mod grid;
pub mod lottery;
pub mod stats;
pub mod world;

// Re-export main types
pub use cell::{Cell, Strategy};
pub use config::{Config, StopPolicy};
pub use error::{CheckpointError, ConfigError};
pub use stats::Stats;
pub use world::World;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a fixed number of steps on a square grid and time it.
///
/// The stopping condition is ignored so every run covers the same work.
pub fn benchmark(steps: u64, grid_size: usize) -> Result<BenchmarkResult, ConfigError> {
    use std::time::Instant;

    let mut config = Config::default();
    config.grid.width = grid_size;
    config.grid.height = grid_size;
    config.run.stop_policy = StopPolicy::AltruistShare;
    config.run.altruist_share_threshold = 1.0;

    let mut world = World::new(config)?;

    let start = Instant::now();
    let taken = world.run(steps);
    let elapsed = start.elapsed();

    Ok(BenchmarkResult {
        steps: taken,
        grid_size,
        final_population: world.population(),
        elapsed_secs: elapsed.as_secs_f64(),
        steps_per_second: taken as f64 / elapsed.as_secs_f64(),
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub steps: u64,
    pub grid_size: usize,
    pub final_population: usize,
    pub elapsed_secs: f64,
    pub steps_per_second: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Grid: {0}x{0}", self.grid_size)?;
        writeln!(f, "Steps: {}", self.steps)?;
        writeln!(f, "Final population: {}", self.final_population)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} steps/s", self.steps_per_second)?;
        Ok(())
    }
}

//! Simulation controller - owns the grid and sequences each step.

use crate::audit::AuditLog;
use crate::cell::{Cell, Strategy};
use crate::checkpoint::Checkpoint;
use crate::config::{Config, StopPolicy};
use crate::error::{CheckpointError, ConfigError};
use crate::fitness;
use crate::grid::Grid;
use crate::lottery;
use crate::stats::{Stats, StatsHistory};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// The simulated grid and its run state
pub struct World {
    // Configuration (fixed for the whole run)
    pub config: Config,

    // Cells
    grid: Grid,

    // Run state: counters, step index and running flag
    stats: Stats,
    pub stats_history: StatsHistory,

    // Optional per-cell tables
    audit: AuditLog,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,
}

impl World {
    /// Create a new world with a random seed
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a new world with a specific seed for reproducibility
    pub fn new_with_seed(config: Config, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let p_altruist = config.population.altruistic_probability;
        let p_selfish = config.population.selfish_probability;

        // One shared draw per cell, thresholds checked in a fixed order
        let grid = Grid::populate(config.grid.width, config.grid.height, |_, _| {
            let r: f64 = rng.gen();
            if r < p_altruist {
                Strategy::Altruist
            } else if r < p_altruist + p_selfish {
                Strategy::Selfish
            } else {
                Strategy::Void
            }
        });

        let stats = Stats::from_census(0, &grid.census(), true);
        let mut stats_history = StatsHistory::new(config.logging.stats_interval);
        stats_history.observe(&stats);

        log::info!(
            "World created: {}x{} seed={} selfish={} altruist={} void={}",
            config.grid.width,
            config.grid.height,
            seed,
            stats.n_selfish,
            stats.n_altruist,
            stats.n_void
        );

        Ok(Self {
            config,
            grid,
            stats,
            stats_history,
            audit: AuditLog::new(),
            rng,
            seed,
        })
    }

    /// Restore world from checkpoint
    pub fn from_checkpoint(checkpoint: Checkpoint) -> Result<Self, CheckpointError> {
        checkpoint.config.validate()?;

        let width = checkpoint.config.grid.width;
        let height = checkpoint.config.grid.height;
        let n_cells = checkpoint.cells.len();
        let grid = Grid::try_from_cells(width, height, checkpoint.cells).ok_or_else(|| {
            CheckpointError::InvalidFormat(format!(
                "{} stored cells do not lay out a {}x{} grid",
                n_cells, width, height
            ))
        })?;

        // Counters are rebuilt from the cells rather than trusted
        let stats = Stats::from_census(checkpoint.step, &grid.census(), checkpoint.running);
        let mut stats_history = checkpoint.history;
        stats_history.interval = checkpoint.config.logging.stats_interval;
        if stats_history.last().map(|s| s.step) != Some(stats.step) {
            stats_history.record(stats.clone());
        }

        Ok(Self {
            config: checkpoint.config,
            grid,
            stats,
            stats_history,
            audit: AuditLog::new(),
            rng: checkpoint.rng,
            seed: checkpoint.random_seed,
        })
    }

    /// Create checkpoint of current state
    pub fn create_checkpoint(&self) -> Checkpoint {
        Checkpoint::new(
            self.stats.step,
            self.config.clone(),
            self.grid.cells().to_vec(),
            self.stats.running,
            self.stats_history.clone(),
            self.rng.clone(),
            self.seed,
        )
    }

    /// Advance one generation. Returns whether the world is still running.
    ///
    /// A stopped world is left untouched.
    pub fn step(&mut self) -> bool {
        if !self.stats.running {
            log::warn!("step() called on a stopped world at step {}", self.stats.step);
            return false;
        }

        let step = self.stats.step + 1;
        let record_tables = self.config.logging.record_tables;

        // Phase 1: fitness from neighborhood strategies
        fitness::evaluate(&mut self.grid, &self.config.payoff);
        if record_tables {
            self.audit.record_fitness(step, &self.grid);
        }

        // Phase 2: lottery weights from neighborhood fitness
        lottery::assign_weights(&mut self.grid, self.config.payoff.disease);
        if record_tables {
            self.audit.record_lottery(step, &self.grid);
        }

        // Phase 3: replacement
        self.reproduce();

        // Phase 4: statistics
        self.stats.step = step;
        self.stats.refresh();
        debug_assert!(self.stats.is_conserved());

        // Phase 5: stopping condition
        if self.should_stop() {
            self.stats.running = false;
            log::info!(
                "World stopped at step {} ({:?}): selfish={} altruist={} void={}",
                step,
                self.config.run.stop_policy,
                self.stats.n_selfish,
                self.stats.n_altruist,
                self.stats.n_void
            );
        }

        self.stats_history.observe(&self.stats);
        log::debug!("{}", self.stats.summary());

        self.stats.running
    }

    /// Draw the whole next generation, then apply it
    fn reproduce(&mut self) {
        let next = lottery::next_generation(&self.grid, &mut self.rng);
        let harshness = self.config.payoff.harshness;

        for (cell, strategy) in self.grid.cells_mut().iter_mut().zip(next) {
            self.stats.transition(cell.strategy, strategy);
            match strategy {
                Strategy::Void => cell.clear_to_void(harshness),
                _ => cell.strategy = strategy,
            }
        }
    }

    /// Whether the current counters satisfy the configured stopping policy
    pub fn should_stop(&self) -> bool {
        match self.config.run.stop_policy {
            StopPolicy::AltruistShare => {
                self.stats.percentage_of_altruist > self.config.run.altruist_share_threshold
            }
            StopPolicy::Extinction => self.stats.n_selfish == 0 || self.stats.n_altruist == 0,
        }
    }

    /// Step until stopped or `max_steps` have run. Returns the steps taken.
    pub fn run(&mut self, max_steps: u64) -> u64 {
        let mut taken = 0;
        while taken < max_steps && self.stats.running {
            self.step();
            taken += 1;
        }
        taken
    }

    /// Run simulation with callback for progress updates
    pub fn run_with_callback<F>(&mut self, max_steps: u64, mut callback: F) -> u64
    where
        F: FnMut(&World),
    {
        let mut taken = 0;
        while taken < max_steps && self.stats.running {
            self.step();
            taken += 1;
            callback(self);
        }
        taken
    }

    /// Current model snapshot
    #[inline]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Completed steps
    #[inline]
    pub fn time(&self) -> u64 {
        self.stats.step
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.stats.running
    }

    /// Selfish plus altruist cells
    #[inline]
    pub fn population(&self) -> usize {
        self.stats.population
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        self.grid.cells()
    }

    /// Cell at a coordinate (wraps)
    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        self.grid.get(x, y)
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Hand over the recorded tables, leaving an empty log behind
    pub fn take_audit(&mut self) -> AuditLog {
        std::mem::take(&mut self.audit)
    }

    /// Get seed for reproducibility
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Read-only copy of the model and every cell
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            width: self.config.grid.width,
            height: self.config.grid.height,
            stats: self.stats.clone(),
            cells: self.grid.cells().to_vec(),
        }
    }
}

/// Model and per-cell state for rendering or export
#[derive(Clone, Debug, Serialize)]
pub struct WorldSnapshot {
    pub width: usize,
    pub height: usize,
    pub stats: Stats,
    pub cells: Vec<Cell>,
}

//! Optional per-step fitness and lottery tables.

use crate::cell::Strategy;
use crate::grid::Grid;
use serde::{Deserialize, Serialize};

/// Fitness of one cell after the fitness pass
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitnessRecord {
    pub step: u64,
    pub x: usize,
    pub y: usize,
    pub strategy: Strategy,
    pub fitness: f64,
}

/// Lottery weights of one cell after the lottery pass
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LotteryRecord {
    pub step: u64,
    pub x: usize,
    pub y: usize,
    /// Strategy before reproduction
    pub strategy: Strategy,
    pub p_selfish: f64,
    pub p_altruist: f64,
    pub p_void: f64,
}

/// Accumulated audit tables for a run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AuditLog {
    pub fitness: Vec<FitnessRecord>,
    pub lottery: Vec<LotteryRecord>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one row per cell from the current fitness values
    pub fn record_fitness(&mut self, step: u64, grid: &Grid) {
        self.fitness.extend(grid.cells().iter().map(|cell| FitnessRecord {
            step,
            x: cell.x,
            y: cell.y,
            strategy: cell.strategy,
            fitness: cell.fitness,
        }));
    }

    /// Append one row per cell from the current lottery weights
    pub fn record_lottery(&mut self, step: u64, grid: &Grid) {
        self.lottery.extend(grid.cells().iter().map(|cell| LotteryRecord {
            step,
            x: cell.x,
            y: cell.y,
            strategy: cell.strategy,
            p_selfish: cell.weights.selfish,
            p_altruist: cell.weights.altruist,
            p_void: cell.weights.void,
        }));
    }

    /// Rows recorded for a given step
    pub fn fitness_at(&self, step: u64) -> impl Iterator<Item = &FitnessRecord> {
        self.fitness.iter().filter(move |r| r.step == step)
    }

    pub fn lottery_at(&self, step: u64) -> impl Iterator<Item = &LotteryRecord> {
        self.lottery.iter().filter(move |r| r.step == step)
    }

    pub fn is_empty(&self) -> bool {
        self.fitness.is_empty() && self.lottery.is_empty()
    }
}

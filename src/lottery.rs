//! Lottery weights and the stochastic replacement rule.
//!
//! Every cell holds a lottery among the strategies in its own neighborhood,
//! each strategy weighted by the fitness it brings to that neighborhood.
//! Disease adds a constant stake for Void.

use crate::cell::{FitnessSums, LotteryWeights, Strategy};
use crate::grid::Grid;
use rand::Rng;
use rayon::prelude::*;

/// Normalize neighborhood fitness sums into replacement probabilities.
///
/// Returns the total (sums plus disease) alongside the weights. A total that
/// is not positive yields all-zero weights, which the draw resolves to Void.
pub fn weights(sums: &FitnessSums, disease: f64) -> (f64, LotteryWeights) {
    let total = sums.selfish + sums.altruist + sums.void + disease;
    if total > 0.0 {
        let weights = LotteryWeights {
            selfish: sums.selfish / total,
            altruist: sums.altruist / total,
            void: (sums.void + disease) / total,
        };
        (total, weights)
    } else {
        (total, LotteryWeights::default())
    }
}

/// Ordered stick-breaking draw: Altruist, then Selfish, else Void.
#[inline]
pub fn draw(weights: &LotteryWeights, r: f64) -> Strategy {
    if r < weights.altruist {
        Strategy::Altruist
    } else if r < weights.altruist + weights.selfish {
        Strategy::Selfish
    } else {
        Strategy::Void
    }
}

/// Recompute fitness sums and lottery weights for every cell.
///
/// Must run after the fitness pass; reads neighbor fitness only.
pub fn assign_weights(grid: &mut Grid, disease: f64) {
    let next: Vec<_> = {
        let view = &*grid;
        (0..view.len())
            .into_par_iter()
            .map(|index| {
                let sums = view.sum_neighbor_fitness(index);
                let (total, weights) = weights(&sums, disease);
                (sums, total, weights)
            })
            .collect()
    };

    for (cell, (sums, total, weights)) in grid.cells_mut().iter_mut().zip(next) {
        cell.sums = sums;
        cell.total_fitness = total;
        cell.weights = weights;
    }
}

/// Draw the next generation: one uniform value per cell, in storage order,
/// each judged against that cell's own weights.
pub fn next_generation<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Vec<Strategy> {
    grid.cells()
        .iter()
        .map(|cell| draw(&cell.weights, rng.gen::<f64>()))
        .collect()
}

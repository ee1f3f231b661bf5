//! Payoff equations and the whole-grid fitness pass.

use crate::cell::{NeighborCounts, Strategy};
use crate::config::PayoffConfig;
use crate::grid::Grid;
use rayon::prelude::*;

/// Fitness of a cell with the given strategy and neighborhood composition.
///
/// With `N_A` altruists among `n` neighborhood cells (center included):
/// - Altruist: `1 - c + b * N_A / n`
/// - Selfish:  `1 + b * N_A / n`
/// - Void:     `harshness`
pub fn fitness(strategy: Strategy, counts: &NeighborCounts, payoff: &PayoffConfig) -> f64 {
    match strategy {
        Strategy::Altruist => {
            1.0 - payoff.cost_of_altruism + payoff.benefit_of_altruism * altruist_density(counts)
        }
        Strategy::Selfish => 1.0 + payoff.benefit_of_altruism * altruist_density(counts),
        Strategy::Void => payoff.harshness,
    }
}

#[inline]
fn altruist_density(counts: &NeighborCounts) -> f64 {
    // A neighborhood always holds at least the cell itself
    counts.altruist as f64 / counts.total() as f64
}

/// Recompute counts and fitness for every cell.
///
/// Reads only strategies, so the new values are gathered in parallel and
/// written back afterwards.
pub fn evaluate(grid: &mut Grid, payoff: &PayoffConfig) {
    let next: Vec<_> = {
        let view = &*grid;
        (0..view.len())
            .into_par_iter()
            .map(|index| {
                let counts = view.count_neighbors(index);
                let strategy = view.cells()[index].strategy;
                (counts, fitness(strategy, &counts, payoff))
            })
            .collect()
    };

    for (cell, (counts, fitness)) in grid.cells_mut().iter_mut().zip(next) {
        cell.counts = counts;
        cell.fitness = fitness;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payoff() -> PayoffConfig {
        PayoffConfig {
            cost_of_altruism: 0.13,
            benefit_of_altruism: 0.5,
            disease: 0.0,
            harshness: 0.0,
        }
    }

    fn lone(strategy: Strategy) -> NeighborCounts {
        let mut counts = NeighborCounts {
            selfish: 0,
            altruist: 0,
            void: 4,
        };
        counts.add(strategy);
        counts
    }

    #[test]
    fn test_lone_altruist() {
        let f = fitness(Strategy::Altruist, &lone(Strategy::Altruist), &payoff());
        assert!((f - 0.97).abs() < 1e-12);
    }

    #[test]
    fn test_selfish_beside_one_altruist() {
        let counts = NeighborCounts {
            selfish: 1,
            altruist: 1,
            void: 3,
        };
        let f = fitness(Strategy::Selfish, &counts, &payoff());
        assert!((f - 1.10).abs() < 1e-12);
    }

    #[test]
    fn test_void_ignores_neighbors() {
        let mut p = payoff();
        p.harshness = 0.96;
        let crowded = NeighborCounts {
            selfish: 0,
            altruist: 4,
            void: 1,
        };
        assert_eq!(fitness(Strategy::Void, &crowded, &p), 0.96);
        assert_eq!(fitness(Strategy::Void, &lone(Strategy::Void), &p), 0.96);
    }

    #[test]
    fn test_evaluate_single_altruist_on_grid() {
        let mut grid = Grid::populate(5, 5, |x, y| match (x, y) {
            (2, 2) => Strategy::Altruist,
            (2, 3) => Strategy::Selfish,
            _ => Strategy::Void,
        });

        evaluate(&mut grid, &payoff());

        let altruist = grid.get(2, 2);
        assert_eq!(altruist.n_neighboring_altruists(), 1);
        assert_eq!(altruist.counts.total(), 5);
        assert!((altruist.fitness - 0.97).abs() < 1e-12);

        let selfish = grid.get(2, 3);
        assert!((selfish.fitness - 1.10).abs() < 1e-12);

        let far = grid.get(0, 0);
        assert_eq!(far.fitness, 0.0);
    }

    #[test]
    fn test_evaluate_all_altruists() {
        let mut grid = Grid::populate(4, 4, |_, _| Strategy::Altruist);
        evaluate(&mut grid, &payoff());

        for cell in grid.cells() {
            assert!((cell.fitness - (1.0 - 0.13 + 0.5)).abs() < 1e-12);
        }
    }
}

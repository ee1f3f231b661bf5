//! Grid cell and its per-step derived state.

use serde::{Deserialize, Serialize};

/// Unique cell identifier, assigned once at grid construction
pub type CellId = u64;

/// Strategy occupying a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Selfish,
    Altruist,
    /// Empty role with the fixed "harshness" fitness
    Void,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Selfish, Strategy::Altruist, Strategy::Void];

    /// Lowercase label used in tables and exports
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Selfish => "selfish",
            Strategy::Altruist => "altruist",
            Strategy::Void => "void",
        }
    }

    /// Whether the cell holds a living strategy (Selfish or Altruist)
    #[inline]
    pub fn is_populated(&self) -> bool {
        !matches!(self, Strategy::Void)
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Strategy counts over a neighborhood
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborCounts {
    pub selfish: usize,
    pub altruist: usize,
    pub void: usize,
}

impl NeighborCounts {
    #[inline]
    pub fn add(&mut self, strategy: Strategy) {
        match strategy {
            Strategy::Selfish => self.selfish += 1,
            Strategy::Altruist => self.altruist += 1,
            Strategy::Void => self.void += 1,
        }
    }

    /// Number of cells in the neighborhood
    #[inline]
    pub fn total(&self) -> usize {
        self.selfish + self.altruist + self.void
    }
}

/// Fitness summed per neighbor strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FitnessSums {
    pub selfish: f64,
    pub altruist: f64,
    pub void: f64,
}

impl FitnessSums {
    #[inline]
    pub fn add(&mut self, strategy: Strategy, fitness: f64) {
        match strategy {
            Strategy::Selfish => self.selfish += fitness,
            Strategy::Altruist => self.altruist += fitness,
            Strategy::Void => self.void += fitness,
        }
    }
}

/// Replacement probabilities for a cell's next generation.
///
/// Either all three are zero or they sum to one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LotteryWeights {
    pub selfish: f64,
    pub altruist: f64,
    pub void: f64,
}

impl LotteryWeights {
    #[inline]
    pub fn sum(&self) -> f64 {
        self.selfish + self.altruist + self.void
    }

    /// Degenerate case where nothing in the neighborhood can reproduce
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.selfish == 0.0 && self.altruist == 0.0 && self.void == 0.0
    }
}

/// One grid position
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    // Identity
    pub id: CellId,
    pub x: usize,
    pub y: usize,

    pub strategy: Strategy,

    /// Fitness from the most recent fitness pass
    pub fitness: f64,

    // Neighborhood aggregates (include the cell itself)
    pub counts: NeighborCounts,
    pub sums: FitnessSums,
    /// Neighborhood fitness plus disease
    pub total_fitness: f64,
    pub weights: LotteryWeights,
}

impl Cell {
    pub fn new(id: CellId, x: usize, y: usize, strategy: Strategy) -> Self {
        Self {
            id,
            x,
            y,
            strategy,
            fitness: 0.0,
            counts: NeighborCounts::default(),
            sums: FitnessSums::default(),
            total_fitness: 0.0,
            weights: LotteryWeights::default(),
        }
    }

    /// Altruists in the neighborhood, `N_A`
    #[inline]
    pub fn n_neighboring_altruists(&self) -> usize {
        self.counts.altruist
    }

    /// Turn the cell Void: aggregates and weights cleared, fitness pinned to harshness.
    pub fn clear_to_void(&mut self, harshness: f64) {
        self.strategy = Strategy::Void;
        self.fitness = harshness;
        self.counts = NeighborCounts::default();
        self.sums = FitnessSums::default();
        self.total_fitness = 0.0;
        self.weights = LotteryWeights::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_total() {
        let mut counts = NeighborCounts::default();
        counts.add(Strategy::Altruist);
        counts.add(Strategy::Altruist);
        counts.add(Strategy::Void);
        counts.add(Strategy::Selfish);
        counts.add(Strategy::Selfish);

        assert_eq!(counts.altruist, 2);
        assert_eq!(counts.total(), 5);
    }

    #[test]
    fn test_clear_to_void() {
        let mut cell = Cell::new(1, 2, 3, Strategy::Altruist);
        cell.fitness = 1.2;
        cell.counts.altruist = 2;
        cell.sums.altruist = 3.0;
        cell.total_fitness = 4.0;
        cell.weights = LotteryWeights {
            selfish: 0.25,
            altruist: 0.75,
            void: 0.0,
        };

        cell.clear_to_void(0.96);

        assert_eq!(cell.strategy, Strategy::Void);
        assert_eq!(cell.fitness, 0.96);
        assert_eq!(cell.counts.total(), 0);
        assert_eq!(cell.sums, FitnessSums::default());
        assert_eq!(cell.total_fitness, 0.0);
        assert!(cell.weights.is_zero());
        assert_eq!((cell.id, cell.x, cell.y), (1, 2, 3));
    }

    #[test]
    fn test_strategy_labels() {
        assert_eq!(Strategy::Selfish.to_string(), "selfish");
        assert!(Strategy::Altruist.is_populated());
        assert!(!Strategy::Void.is_populated());
    }
}

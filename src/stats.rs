//! Population statistics and per-run time series.

use crate::cell::{NeighborCounts, Strategy};
use serde::{Deserialize, Serialize};

/// Model-level snapshot after a step
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Completed steps
    pub step: u64,
    pub n_selfish: usize,
    pub n_altruist: usize,
    pub n_void: usize,
    /// Selfish plus altruist
    pub population: usize,
    /// Altruists as a fraction of all cells
    pub percentage_of_altruist: f64,
    pub n_cells: usize,
    pub running: bool,
}

impl Stats {
    /// Build stats from a census of the grid
    pub fn from_census(step: u64, counts: &NeighborCounts, running: bool) -> Self {
        let mut stats = Self {
            step,
            n_selfish: counts.selfish,
            n_altruist: counts.altruist,
            n_void: counts.void,
            n_cells: counts.total(),
            running,
            ..Self::default()
        };
        stats.refresh();
        stats
    }

    /// Record a cell changing strategy
    pub fn transition(&mut self, from: Strategy, to: Strategy) {
        if from == to {
            return;
        }
        *self.counter_mut(from) -= 1;
        *self.counter_mut(to) += 1;
    }

    fn counter_mut(&mut self, strategy: Strategy) -> &mut usize {
        match strategy {
            Strategy::Selfish => &mut self.n_selfish,
            Strategy::Altruist => &mut self.n_altruist,
            Strategy::Void => &mut self.n_void,
        }
    }

    /// Count of cells holding `strategy`
    pub fn count(&self, strategy: Strategy) -> usize {
        match strategy {
            Strategy::Selfish => self.n_selfish,
            Strategy::Altruist => self.n_altruist,
            Strategy::Void => self.n_void,
        }
    }

    /// Recompute derived fields from the counters
    pub fn refresh(&mut self) {
        self.population = self.n_altruist + self.n_selfish;
        self.percentage_of_altruist = if self.n_cells == 0 {
            0.0
        } else {
            self.n_altruist as f64 / self.n_cells as f64
        };
    }

    /// Counters cover every cell exactly once
    pub fn is_conserved(&self) -> bool {
        self.n_selfish + self.n_altruist + self.n_void == self.n_cells
    }

    /// Save stats to JSON file
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "T:{:6} | Selfish:{:5} | Altruist:{:5} | Void:{:5} | %Alt:{:.3}{}",
            self.step,
            self.n_selfish,
            self.n_altruist,
            self.n_void,
            self.percentage_of_altruist,
            if self.running { "" } else { " | stopped" },
        )
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// All recorded stats snapshots
    pub snapshots: Vec<Stats>,
    /// Recording interval
    pub interval: u64,
}

impl StatsHistory {
    /// Create new history with recording interval
    pub fn new(interval: u64) -> Self {
        Self {
            snapshots: Vec::new(),
            interval: interval.max(1),
        }
    }

    /// Record a snapshot if its step falls on the interval or the run has stopped
    pub fn observe(&mut self, stats: &Stats) {
        if stats.step % self.interval == 0 || !stats.running {
            self.record(stats.clone());
        }
    }

    /// Record a stats snapshot
    pub fn record(&mut self, stats: Stats) {
        self.snapshots.push(stats);
    }

    /// Most recent snapshot
    pub fn last(&self) -> Option<&Stats> {
        self.snapshots.last()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Altruist share over time
    pub fn altruist_series(&self) -> Vec<(u64, f64)> {
        self.snapshots
            .iter()
            .map(|s| (s.step, s.percentage_of_altruist))
            .collect()
    }

    /// Living population over time
    pub fn population_series(&self) -> Vec<(u64, usize)> {
        self.snapshots
            .iter()
            .map(|s| (s.step, s.population))
            .collect()
    }

    /// Save history to file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)
    }

    /// Load history from file
    pub fn load(path: &str) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(selfish: usize, altruist: usize, void: usize) -> NeighborCounts {
        NeighborCounts {
            selfish,
            altruist,
            void,
        }
    }

    #[test]
    fn test_from_census() {
        let stats = Stats::from_census(3, &counts(10, 5, 10), true);

        assert_eq!(stats.n_cells, 25);
        assert_eq!(stats.population, 15);
        assert!((stats.percentage_of_altruist - 0.2).abs() < 1e-12);
        assert!(stats.is_conserved());
    }

    #[test]
    fn test_transition_keeps_conservation() {
        let mut stats = Stats::from_census(0, &counts(2, 2, 1), true);

        stats.transition(Strategy::Selfish, Strategy::Altruist);
        stats.transition(Strategy::Void, Strategy::Void);
        stats.transition(Strategy::Altruist, Strategy::Void);
        stats.refresh();

        assert_eq!(stats.count(Strategy::Selfish), 1);
        assert_eq!(stats.count(Strategy::Altruist), 2);
        assert_eq!(stats.count(Strategy::Void), 2);
        assert_eq!(stats.population, 3);
        assert!(stats.is_conserved());
    }

    #[test]
    fn test_history_interval() {
        let mut history = StatsHistory::new(5);

        for step in 0..=20 {
            history.observe(&Stats::from_census(step, &counts(1, 1, 0), true));
        }

        let series = history.population_series();
        assert_eq!(series.len(), 5);
        assert_eq!(series[0].0, 0);
        assert_eq!(history.last().map(|s| s.step), Some(20));

        history.observe(&Stats::from_census(23, &counts(0, 2, 0), false));
        assert_eq!(history.last().map(|s| s.step), Some(23));
    }

    #[test]
    fn test_history_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let path = path.to_str().unwrap();

        let mut history = StatsHistory::new(1);
        history.record(Stats::from_census(0, &counts(4, 3, 2), true));
        history.record(Stats::from_census(1, &counts(3, 4, 2), false));
        history.save(path).unwrap();

        let loaded = StatsHistory::load(path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.snapshots[1].n_altruist, 4);
        assert!(!loaded.snapshots[1].running);
    }

    #[test]
    fn test_summary_marks_stopped() {
        let stats = Stats::from_census(9, &counts(0, 8, 2), false);
        assert!(stats.summary().contains("stopped"));
    }
}

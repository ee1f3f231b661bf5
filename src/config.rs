//! Configuration system for the Selfish-Altruist model.
//!
//! Supports YAML configuration files with the published model defaults.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub population: PopulationConfig,
    #[serde(default)]
    pub payoff: PayoffConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Grid dimensions. The grid always wraps on both axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
}

/// Initial strategy mix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Probability a cell starts as Altruist
    pub altruistic_probability: f64,
    /// Probability a cell starts as Selfish (the remainder start Void)
    pub selfish_probability: f64,
}

/// Payoff and environment parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoffConfig {
    /// Fitness cost paid by an altruist (`c`)
    pub cost_of_altruism: f64,
    /// Fitness benefit scaled by local altruist density (`b`)
    pub benefit_of_altruism: f64,
    /// Constant added to the Void lottery weight of every cell
    pub disease: f64,
    /// Fixed fitness of Void cells
    pub harshness: f64,
}

/// When a run transitions to Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopPolicy {
    /// Stop once the altruist share of all cells exceeds the threshold
    AltruistShare,
    /// Stop once either the selfish or the altruist population is gone
    Extinction,
}

/// Run control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub stop_policy: StopPolicy,
    pub altruist_share_threshold: f64,
    /// Step budget used by the CLI; the library itself steps on demand
    pub max_steps: u64,
}

/// Logging, history and checkpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Steps between stats history samples
    pub stats_interval: u64,
    /// Steps between checkpoints (0 disables them)
    pub checkpoint_interval: u64,
    /// Record per-cell fitness and lottery tables every step
    pub record_tables: bool,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 40,
            height: 40,
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            altruistic_probability: 0.26,
            selfish_probability: 0.26,
        }
    }
}

impl Default for PayoffConfig {
    fn default() -> Self {
        Self {
            cost_of_altruism: 0.13,
            benefit_of_altruism: 0.5,
            disease: 0.0,
            harshness: 0.0,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            stop_policy: StopPolicy::AltruistShare,
            altruist_share_threshold: 0.7,
            max_steps: 200,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 1,
            checkpoint_interval: 0,
            record_tables: false,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Total number of cells on the grid
    pub fn n_cells(&self) -> usize {
        self.grid.width * self.grid.height
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.grid.width,
                height: self.grid.height,
            });
        }

        let p_altruist = self.population.altruistic_probability;
        let p_selfish = self.population.selfish_probability;
        check_probability("altruistic_probability", p_altruist)?;
        check_probability("selfish_probability", p_selfish)?;
        if p_altruist + p_selfish > 1.0 {
            return Err(ConfigError::ProbabilitySum {
                sum: p_altruist + p_selfish,
            });
        }

        let cost = self.payoff.cost_of_altruism;
        if !(0.0..=1.0).contains(&cost) {
            return Err(ConfigError::Cost(cost));
        }
        check_non_negative("benefit_of_altruism", self.payoff.benefit_of_altruism)?;
        check_non_negative("disease", self.payoff.disease)?;
        check_non_negative("harshness", self.payoff.harshness)?;

        let threshold = self.run.altruist_share_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::Threshold(threshold));
        }

        if self.logging.stats_interval == 0 {
            return Err(ConfigError::StatsInterval);
        }

        Ok(())
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { name, value })
    }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.n_cells(), 1600);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "payoff:\n  disease: 0.2\nrun:\n  stop_policy: extinction\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.payoff.disease, 0.2);
        assert_eq!(config.payoff.cost_of_altruism, 0.13);
        assert_eq!(config.run.stop_policy, StopPolicy::Extinction);
        assert_eq!(config.grid.width, 40);
    }

    #[test]
    fn test_rejects_empty_grid() {
        let mut config = Config::default();
        config.grid.height = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyGrid { width: 40, height: 0 })
        ));
    }

    #[test]
    fn test_rejects_probability_sum_above_one() {
        let mut config = Config::default();
        config.population.altruistic_probability = 0.6;
        config.population.selfish_probability = 0.5;
        assert!(matches!(config.validate(), Err(ConfigError::ProbabilitySum { .. })));
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let mut config = Config::default();
        config.population.selfish_probability = -0.1;
        assert!(matches!(config.validate(), Err(ConfigError::Probability { .. })));

        let mut config = Config::default();
        config.payoff.cost_of_altruism = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Cost(_))));

        let mut config = Config::default();
        config.payoff.disease = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Negative { name: "disease", .. })));

        let mut config = Config::default();
        config.run.altruist_share_threshold = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Threshold(_))));

        let mut config = Config::default();
        config.logging.stats_interval = 0;
        assert!(matches!(config.validate(), Err(ConfigError::StatsInterval)));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = Config::default();
        config.grid.width = 12;
        config.payoff.harshness = 0.96;
        config.save(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}

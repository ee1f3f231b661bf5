//! Error types for configuration and persistence.

use thiserror::Error;

/// Invalid or unreadable configuration. Always raised before a run starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid dimensions must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    #[error("{name} must be a probability in [0, 1], got {value}")]
    Probability { name: &'static str, value: f64 },

    #[error("initial probabilities sum to {sum}, which exceeds 1")]
    ProbabilitySum { sum: f64 },

    #[error("cost_of_altruism must lie in [0, 1], got {0}")]
    Cost(f64),

    #[error("{name} must be finite and non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("altruist_share_threshold must lie in (0, 1], got {0}")]
    Threshold(f64),

    #[error("stats_interval must be > 0")]
    StatsInterval,

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors that can occur during checkpoint operations
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("checkpoint carries an invalid config: {0}")]
    Config(#[from] ConfigError),
}

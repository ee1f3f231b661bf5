//! Checkpoint system for saving and loading simulation state.

use crate::cell::Cell;
use crate::config::Config;
use crate::error::CheckpointError;
use crate::stats::StatsHistory;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const MAGIC: &[u8; 4] = b"SALT";

/// Complete run state for checkpointing
#[derive(Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Version for compatibility checking
    pub version: u32,
    /// Completed steps
    pub step: u64,
    /// Configuration
    pub config: Config,
    /// Every cell in storage order
    pub cells: Vec<Cell>,
    /// Whether the run was still going
    pub running: bool,
    /// Time series recorded so far
    pub history: StatsHistory,
    /// Generator state, so a restored run continues the same stream
    pub rng: ChaCha8Rng,
    /// Seed the run started from
    pub random_seed: u64,
}

impl Checkpoint {
    /// Current checkpoint version
    pub const VERSION: u32 = 2;

    /// Create a new checkpoint
    pub fn new(
        step: u64,
        config: Config,
        cells: Vec<Cell>,
        running: bool,
        history: StatsHistory,
        rng: ChaCha8Rng,
        random_seed: u64,
    ) -> Self {
        Self {
            version: Self::VERSION,
            step,
            config,
            cells,
            running,
            history,
            rng,
            random_seed,
        }
    }

    /// Save checkpoint to binary file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CheckpointError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        // Write magic bytes for identification
        writer.write_all(MAGIC)?;

        let encoded = bincode::serialize(self)?;
        writer.write_all(&encoded)?;
        writer.flush()?;

        Ok(())
    }

    /// Load checkpoint from binary file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CheckpointError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(CheckpointError::InvalidFormat("Invalid magic bytes".to_string()));
        }

        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        let checkpoint: Checkpoint = bincode::deserialize(&buffer)?;

        if checkpoint.version != Self::VERSION {
            return Err(CheckpointError::VersionMismatch {
                expected: Self::VERSION,
                found: checkpoint.version,
            });
        }

        Ok(checkpoint)
    }

    /// Get approximate size in bytes
    pub fn size_bytes(&self) -> usize {
        bincode::serialized_size(self).unwrap_or(0) as usize
    }
}

/// Saves checkpoints on a fixed step interval, keeping the newest few
pub struct CheckpointManager {
    /// Base directory for checkpoints
    pub base_dir: PathBuf,
    /// Interval between checkpoints (0 disables)
    pub interval: u64,
    /// Maximum checkpoints to keep
    pub max_checkpoints: usize,
    last_checkpoint: u64,
}

impl CheckpointManager {
    pub fn new<P: Into<PathBuf>>(
        base_dir: P,
        interval: u64,
        max_checkpoints: usize,
    ) -> Result<Self, CheckpointError> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;

        Ok(Self {
            base_dir,
            interval,
            max_checkpoints,
            last_checkpoint: 0,
        })
    }

    /// Check if a checkpoint should be saved
    pub fn should_save(&self, step: u64) -> bool {
        self.interval > 0 && step > 0 && step % self.interval == 0 && step != self.last_checkpoint
    }

    /// Generate checkpoint filename
    pub fn checkpoint_path(&self, step: u64) -> PathBuf {
        self.base_dir.join(format!("checkpoint_{:08}.bin", step))
    }

    /// Save checkpoint and prune old ones
    pub fn save(&mut self, checkpoint: &Checkpoint) -> Result<PathBuf, CheckpointError> {
        let path = self.checkpoint_path(checkpoint.step);
        checkpoint.save(&path)?;
        self.last_checkpoint = checkpoint.step;

        self.cleanup()?;

        Ok(path)
    }

    /// Remove old checkpoints beyond max limit
    fn cleanup(&self) -> Result<(), CheckpointError> {
        let mut checkpoints = self.list()?;

        if checkpoints.len() > self.max_checkpoints {
            // Zero-padded step numbers sort by name
            checkpoints.sort();

            let to_remove = checkpoints.len() - self.max_checkpoints;
            for path in checkpoints.into_iter().take(to_remove) {
                std::fs::remove_file(path)?;
            }
        }

        Ok(())
    }

    fn list(&self) -> Result<Vec<PathBuf>, CheckpointError> {
        Ok(std::fs::read_dir(&self.base_dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with("checkpoint_")
            })
            .map(|entry| entry.path())
            .collect())
    }

    /// Find latest checkpoint in directory
    pub fn find_latest(&self) -> Option<PathBuf> {
        self.list().ok()?.into_iter().max()
    }
}

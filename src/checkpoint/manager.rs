//! Periodic, overwrite-in-place model snapshots.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TrainError};
use crate::schedule::GlobalStep;

/// File name of the single checkpoint kept under the output directory.
pub const CHECKPOINT_FILE: &str = "model.ckpt.json";

/// Full model state plus the step and epoch it was taken at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint<M> {
    pub global_step: GlobalStep,
    pub epoch: usize,
    pub model: M,
}

/// Saves the model every `every` epochs (including epoch 0) to one fixed path.
///
/// There is no rotation and no versioning: each save replaces the last one.
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    path: PathBuf,
    every: usize,
}

impl CheckpointManager {
    /// # Errors
    /// `InvalidConfig` when `every` is zero; `OutputDirMissing` when `dir`
    /// does not exist.
    pub fn new(dir: impl AsRef<Path>, every: usize) -> Result<Self> {
        let dir = dir.as_ref();
        if every == 0 {
            return Err(TrainError::invalid_config("checkpoint_every must be at least 1"));
        }
        if !dir.is_dir() {
            return Err(TrainError::OutputDirMissing { path: dir.to_path_buf() });
        }
        Ok(CheckpointManager {
            path: dir.join(CHECKPOINT_FILE),
            every,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn should_save(&self, epoch: usize) -> bool {
        epoch % self.every == 0
    }

    /// Writes the snapshot, replacing any previous checkpoint.
    pub fn save<M: Serialize + ?Sized>(&self, model: &M, global_step: GlobalStep, epoch: usize) -> Result<&Path> {
        let checkpoint = Checkpoint { global_step, epoch, model };
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer(&mut writer, &checkpoint)?;
        writer.flush()?;
        debug!(path = %self.path.display(), epoch, step = global_step.value(), "checkpoint written");
        Ok(&self.path)
    }

    /// Reads the checkpoint currently on disk.
    pub fn load<M: DeserializeOwned>(&self) -> Result<Checkpoint<M>> {
        let reader = BufReader::new(File::open(&self.path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saves_only_on_multiples_of_every() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path(), 10).unwrap();
        let saved: Vec<usize> = (0..35).filter(|&e| manager.should_save(e)).collect();
        assert_eq!(saved, vec![0, 10, 20, 30]);
    }

    #[test]
    fn later_save_overwrites_earlier() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path(), 1).unwrap();
        manager.save(&vec![1.0, 2.0], GlobalStep::from(3), 0).unwrap();
        manager.save(&vec![5.0], GlobalStep::from(9), 1).unwrap();

        let loaded: Checkpoint<Vec<f64>> = manager.load().unwrap();
        assert_eq!(loaded.model, vec![5.0]);
        assert_eq!(loaded.global_step.value(), 9);
        assert_eq!(loaded.epoch, 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_directory_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let err = CheckpointManager::new(dir.path().join("nope"), 10).unwrap_err();
        assert!(matches!(err, TrainError::OutputDirMissing { .. }));
    }
}

use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};

use crate::error::{Result, TrainError};
use crate::network::spec::ModelSpec;
use crate::optim::optimizer::OptimizerConfig;
use crate::schedule::{BnDecaySchedule, LearningRateSchedule};

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`              — full train+eval cycles to run
/// - `batch_size`          — capacity of the reusable batch buffer
/// - `report_every`        — training batches per console report window
/// - `checkpoint_every`    — save the model when `epoch % checkpoint_every == 0`
/// - `output_dir`          — checkpoint, event streams, config and history land here
/// - `create_output_dir`   — create `output_dir` when missing instead of failing
/// - `eval_applies_update` — run the full optimize step during evaluation,
///                           advancing the global step. Off by default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub num_classes: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub num_point: usize,
    pub report_every: usize,
    pub checkpoint_every: usize,
    pub output_dir: PathBuf,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub shuffle_train: bool,
    pub shuffle_test: bool,
    pub eval_applies_update: bool,
    pub create_output_dir: bool,
    /// Seeds model initialization, shuffling and augmentation.
    pub seed: u64,
    pub learning_rate: LearningRateSchedule,
    pub bn_decay: BnDecaySchedule,
    pub optimizer: OptimizerConfig,
    pub model: ModelSpec,
}

impl TrainConfig {
    /// The fixed configuration the `ferrite-cls` binary runs with:
    /// ModelNet40, 150 epochs of batch 16 over 1024-point clouds.
    pub fn reference() -> Self {
        TrainConfig {
            num_classes: 40,
            epochs: 150,
            batch_size: 16,
            num_point: 1024,
            report_every: 50,
            checkpoint_every: 10,
            output_dir: PathBuf::from("summary"),
            train_path: PathBuf::from("data/modelnet40/train.json"),
            test_path: PathBuf::from("data/modelnet40/test.json"),
            shuffle_train: true,
            shuffle_test: false,
            eval_applies_update: false,
            create_output_dir: true,
            seed: 0,
            learning_rate: LearningRateSchedule::default(),
            bn_decay: BnDecaySchedule::default(),
            optimizer: OptimizerConfig::default(),
            model: ModelSpec::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("num_classes", self.num_classes),
            ("batch_size", self.batch_size),
            ("num_point", self.num_point),
            ("report_every", self.report_every),
            ("checkpoint_every", self.checkpoint_every),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(TrainError::invalid_config(format!("{name} must be at least 1")));
        }
        self.learning_rate.decay.validate("learning_rate")?;
        self.bn_decay.momentum.validate("bn_decay")?;
        if !(self.learning_rate.floor >= 0.0) {
            return Err(TrainError::invalid_config("learning_rate floor must be non-negative"));
        }
        if !(self.bn_decay.clip > 0.0 && self.bn_decay.clip < 1.0) {
            return Err(TrainError::invalid_config("bn_decay clip must be in (0, 1)"));
        }
        Ok(())
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig::reference()
    }
}

use serde::{Serialize, Deserialize};

/// Per-epoch statistics collected by `train_loop`.
///
/// Non-finite values (for example an evaluation average class accuracy with
/// an unseen class) are kept as they are; JSON output writes them as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 0-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Mean training loss per batch over the whole epoch.
    pub train_loss: f64,
    /// Training accuracy over the whole epoch as a fraction in [0, 1].
    pub train_accuracy: f64,
    /// Mean evaluation loss per batch.
    pub val_loss: f64,
    /// Evaluation accuracy as a fraction in [0, 1].
    pub val_accuracy: f64,
    /// Unweighted mean of the per-class evaluation accuracies.
    pub val_avg_class_accuracy: f64,
    /// Global step once the epoch finished.
    pub global_step: u64,
    /// Learning rate used by the epoch's last update.
    pub learning_rate: f64,
    /// Whether a checkpoint was written at the end of this epoch.
    pub checkpointed: bool,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}

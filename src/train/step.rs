use crate::data::batch::BatchBuffer;
use crate::error::Result;
use crate::loss::{cross_entropy::SparseSoftmaxCrossEntropy, registry::LossRegistry};
use crate::metrics::running::count_correct;
use crate::network::classifier::{Classifier, ForwardMode};
use crate::optim::optimizer::Optimizer;
use crate::schedule::GlobalStep;
use crate::train::train_config::TrainConfig;

/// What one step produced.
#[derive(Debug, Clone)]
pub struct StepOutput {
    pub losses: LossRegistry,
    pub total_loss: f64,
    /// Argmax prediction for every buffer slot, stale tail included.
    pub predictions: Vec<usize>,
    pub learning_rate: f64,
    pub bn_decay: f64,
    /// Global step after the update (unchanged when no update was applied).
    pub step: GlobalStep,
    /// Correct predictions over the full buffer capacity.
    pub buffer_accuracy: f64,
}

/// Runs the forward pass over the whole buffer, builds the loss registry and,
/// when `apply_update` is set, backpropagates, applies the optimizer with the
/// scheduled learning rate and advances `step` by one.
///
/// Schedules are evaluated at the step value before the update.
pub fn optimize_step<M: Classifier + ?Sized>(
    model: &mut M,
    optimizer: &mut dyn Optimizer,
    buffer: &BatchBuffer,
    step: &mut GlobalStep,
    config: &TrainConfig,
    is_training: bool,
    apply_update: bool,
) -> Result<StepOutput> {
    let learning_rate = config.learning_rate.at(*step, config.batch_size);
    let bn_decay = config.bn_decay.at(*step, config.batch_size);

    let logits = model.forward(buffer, ForwardMode { is_training, bn_decay })?;
    let labels = buffer.labels();

    let mut losses = LossRegistry::new();
    losses.push("classify_loss", SparseSoftmaxCrossEntropy::loss(&logits, labels)?);
    let total_loss = losses.total();

    if apply_update {
        let grad_logits = SparseSoftmaxCrossEntropy::gradient(&logits, labels)?;
        let grads = model.backward(&grad_logits)?;
        optimizer.step(model.parameters_mut(), &grads, learning_rate)?;
        step.advance();
    }

    let predictions = logits.argmax_rows();
    let buffer_accuracy = count_correct(&predictions, labels) as f64 / buffer.batch_size() as f64;

    Ok(StepOutput {
        losses,
        total_loss,
        predictions,
        learning_rate,
        bn_decay,
        step: *step,
        buffer_accuracy,
    })
}

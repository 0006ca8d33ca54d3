use tracing::debug;

use crate::data::{batch::BatchBuffer, source::DatasetSource};
use crate::error::Result;
use crate::metrics::{aggregator::MetricsAggregator, report::WindowReport};
use crate::network::classifier::Classifier;
use crate::optim::optimizer::Optimizer;
use crate::schedule::GlobalStep;
use crate::train::events::{EventWriter, StepEvent};
use crate::train::step::optimize_step;
use crate::train::train_config::TrainConfig;

/// Which half of an epoch is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Train,
    Eval,
}

impl PhaseKind {
    pub fn augment(self) -> bool {
        self == PhaseKind::Train
    }

    pub fn is_training(self) -> bool {
        self == PhaseKind::Train
    }

    /// Whether this phase applies parameter updates under `config`.
    pub fn apply_update(self, config: &TrainConfig) -> bool {
        match self {
            PhaseKind::Train => true,
            PhaseKind::Eval => config.eval_applies_update,
        }
    }
}

/// Result of draining a source once.
#[derive(Debug, Clone)]
pub struct PhaseOutcome {
    pub metrics: MetricsAggregator,
    pub windows: Vec<WindowReport>,
    /// Learning rate of the last step; `None` when the source was empty.
    pub last_learning_rate: Option<f64>,
}

/// Mutable state one phase works on.
pub struct PhaseContext<'a, M: ?Sized> {
    pub model: &'a mut M,
    pub optimizer: &'a mut dyn Optimizer,
    pub step: &'a mut GlobalStep,
    pub events: Option<&'a mut EventWriter>,
}

/// Drains `source` once, running one step per batch.
///
/// The batch buffer is allocated zeroed at phase start and reused for every
/// batch; metrics only ever look at the valid prefix. The source is not reset
/// here.
pub fn run_phase<M, S>(
    kind: PhaseKind,
    source: &mut S,
    ctx: PhaseContext<'_, M>,
    config: &TrainConfig,
) -> Result<PhaseOutcome>
where
    M: Classifier + ?Sized,
    S: DatasetSource + ?Sized,
{
    let PhaseContext { model, optimizer, step, mut events } = ctx;
    let mut buffer = BatchBuffer::new(config.batch_size, source.num_point(), source.num_channel());
    let mut metrics = match kind {
        PhaseKind::Train => MetricsAggregator::training(config.report_every),
        PhaseKind::Eval => MetricsAggregator::evaluation(config.num_classes),
    };
    let mut windows = Vec::new();
    let mut last_learning_rate = None;
    let apply_update = kind.apply_update(config);

    while source.has_next_batch() {
        let samples = source.next_batch(kind.augment())?;
        buffer.fill(&samples)?;

        let out = optimize_step(
            &mut *model,
            &mut *optimizer,
            &buffer,
            &mut *step,
            config,
            kind.is_training(),
            apply_update,
        )?;

        if let Some(events) = events.as_deref_mut() {
            events.write(&StepEvent {
                step: out.step.value(),
                losses: out.losses.terms(),
                total_loss: out.total_loss,
                accuracy: out.buffer_accuracy,
                learning_rate: out.learning_rate,
                bn_decay: out.bn_decay,
            })?;
        }

        let valid = buffer.valid();
        if let Some(report) = metrics.record_batch(out.total_loss, &out.predictions[..valid], buffer.valid_labels())? {
            report.log();
            windows.push(report);
        }
        last_learning_rate = Some(out.learning_rate);
    }

    if let Some(events) = events {
        events.flush()?;
    }
    debug!(
        phase = ?kind,
        batches = metrics.epoch_totals().batches,
        seen = metrics.epoch_totals().total_seen,
        step = step.value(),
        "phase finished"
    );

    Ok(PhaseOutcome {
        metrics,
        windows,
        last_learning_rate,
    })
}

use std::fs;
use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::checkpoint::CheckpointManager;
use crate::data::source::DatasetSource;
use crate::error::{Result, TrainError};
use crate::network::classifier::Classifier;
use crate::optim::optimizer::Optimizer;
use crate::schedule::GlobalStep;
use crate::train::epoch_stats::EpochStats;
use crate::train::events::EventWriter;
use crate::train::history::{History, HISTORY_FILE};
use crate::train::phase::{run_phase, PhaseContext, PhaseKind};
use crate::train::train_config::TrainConfig;

/// File name of the resolved configuration written at run start.
pub const CONFIG_FILE: &str = "train_config.json";

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `model` for `config.epochs` epochs and returns the per-epoch history.
///
/// Each epoch drains `train` with augmentation and updates, resets it, drains
/// `test` without augmentation, resets it, logs the evaluation report, saves a
/// checkpoint on every `config.checkpoint_every`-th epoch (starting at 0), and
/// rewrites the history table.
///
/// Evaluation only updates parameters, and advances the global step, when
/// `config.eval_applies_update` is set.
///
/// # Errors
/// Any failure (configuration, data, model, I/O) ends the run immediately.
pub fn train_loop<M, Tr, Te>(
    model: &mut M,
    optimizer: &mut dyn Optimizer,
    train: &mut Tr,
    test: &mut Te,
    config: &TrainConfig,
) -> Result<History>
where
    M: Classifier + Serialize + ?Sized,
    Tr: DatasetSource + ?Sized,
    Te: DatasetSource + ?Sized,
{
    config.validate()?;
    check_source("train", &*train, config)?;
    check_source("test", &*test, config)?;
    if model.num_classes() != config.num_classes {
        return Err(TrainError::ShapeMismatch {
            expected: vec![config.num_classes],
            got: vec![model.num_classes()],
        });
    }

    let output_dir = config.output_dir.as_path();
    prepare_output_dir(output_dir, config.create_output_dir)?;
    config.save_json(output_dir.join(CONFIG_FILE))?;

    let mut train_events = EventWriter::create(output_dir.join("train"))?;
    let mut test_events = EventWriter::create(output_dir.join("test"))?;
    let checkpoints = CheckpointManager::new(output_dir, config.checkpoint_every)?;

    let mut step = GlobalStep::new();
    let mut history = History::new();

    info!(
        epochs = config.epochs,
        batch_size = config.batch_size,
        train_samples = train.len(),
        test_samples = test.len(),
        "starting training"
    );

    for epoch in 0..config.epochs {
        info!("**** EPOCH {:03} ****", epoch);
        let t_start = Instant::now();

        // ── Training phase ────────────────────────────────────────────────
        let trained = run_phase(
            PhaseKind::Train,
            &mut *train,
            PhaseContext {
                model: &mut *model,
                optimizer: &mut *optimizer,
                step: &mut step,
                events: Some(&mut train_events),
            },
            config,
        )?;
        train.reset();

        // ── Evaluation phase ──────────────────────────────────────────────
        info!("---- EPOCH {:03} EVALUATION ----", epoch);
        let evaluated = run_phase(
            PhaseKind::Eval,
            &mut *test,
            PhaseContext {
                model: &mut *model,
                optimizer: &mut *optimizer,
                step: &mut step,
                events: Some(&mut test_events),
            },
            config,
        )?;
        test.reset();

        let report = evaluated
            .metrics
            .eval_report()
            .ok_or_else(|| TrainError::invalid_config("evaluation phase produced no report"))?;
        report.log();
        if !report.avg_class_accuracy.is_finite() {
            warn!(epoch, "average class accuracy is not finite: some class had no evaluation samples");
        }

        // ── Checkpointing ─────────────────────────────────────────────────
        let checkpointed = checkpoints.should_save(epoch);
        if checkpointed {
            let path = checkpoints.save(&*model, step, epoch)?;
            info!("Model saved in file: {}", path.display());
        }

        let totals = trained.metrics.epoch_totals();
        history.push(EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss: totals.mean_loss(),
            train_accuracy: totals.accuracy(),
            val_loss: report.mean_loss,
            val_accuracy: report.accuracy,
            val_avg_class_accuracy: report.avg_class_accuracy,
            global_step: step.value(),
            learning_rate: trained.last_learning_rate.unwrap_or_else(|| config.learning_rate.at(step, config.batch_size)),
            checkpointed,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        });
        history.write_table(output_dir.join(HISTORY_FILE))?;
    }

    info!(global_step = step.value(), "training finished");
    Ok(history)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn check_source<S: DatasetSource + ?Sized>(name: &str, source: &S, config: &TrainConfig) -> Result<()> {
    if source.num_point() != config.num_point {
        return Err(TrainError::ShapeMismatch {
            expected: vec![config.num_point, source.num_channel()],
            got: vec![source.num_point(), source.num_channel()],
        });
    }
    if source.is_empty() {
        warn!(source = name, "dataset source is empty");
    }
    Ok(())
}

/// Creates the output directory when allowed; otherwise a missing directory
/// is an error.
fn prepare_output_dir(dir: &Path, create: bool) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    if !create {
        return Err(TrainError::OutputDirMissing { path: dir.to_path_buf() });
    }
    fs::create_dir_all(dir)?;
    info!(path = %dir.display(), "created output directory");
    Ok(())
}

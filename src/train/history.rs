use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::train::epoch_stats::EpochStats;

/// File name of the tab-separated history table under the output directory.
pub const HISTORY_FILE: &str = "result.txt";

/// Ordered per-epoch statistics of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    epochs: Vec<EpochStats>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stats: EpochStats) {
        self.epochs.push(stats);
    }

    pub fn epochs(&self) -> &[EpochStats] {
        &self.epochs
    }

    pub fn last(&self) -> Option<&EpochStats> {
        self.epochs.last()
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// Writes `epoch, loss, acc, val_loss, val_acc` as a tab-separated table,
    /// replacing any previous file.
    pub fn write_table(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "epoch\tloss\tacc\tval_loss\tval_acc")?;
        for stats in &self.epochs {
            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}",
                stats.epoch, stats.train_loss, stats.train_accuracy, stats.val_loss, stats.val_accuracy
            )?;
        }
        out.flush()?;
        Ok(())
    }
}

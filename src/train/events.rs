use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::loss::registry::LossTerm;

/// File name of the event stream inside each phase directory.
pub const EVENTS_FILE: &str = "events.jsonl";

/// Scalars recorded for one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepEvent<'a> {
    pub step: u64,
    pub losses: &'a [LossTerm],
    pub total_loss: f64,
    /// Correct predictions over the full buffer capacity.
    pub accuracy: f64,
    pub learning_rate: f64,
    pub bn_decay: f64,
}

/// Append-only JSON-lines stream of per-step scalars for one phase.
pub struct EventWriter {
    path: PathBuf,
    out: BufWriter<File>,
}

impl EventWriter {
    /// Creates `dir` if needed and starts a fresh stream in it.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(EVENTS_FILE);
        let out = BufWriter::new(File::create(&path)?);
        Ok(EventWriter { path, out })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&mut self, event: &StepEvent<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

use serde::{Serialize, Deserialize};
use tracing::info;

use crate::metrics::{class_accuracy::ClassAccuracy, running::RunningMetrics};

/// Summary of one training reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowReport {
    /// 1-based index of the batch that closed the window.
    pub batch: usize,
    pub mean_loss: f64,
    pub accuracy: f64,
}

impl WindowReport {
    pub fn from_metrics(batch: usize, metrics: &RunningMetrics) -> Self {
        WindowReport {
            batch,
            mean_loss: metrics.mean_loss(),
            accuracy: metrics.accuracy(),
        }
    }

    pub fn log(&self) {
        info!(
            batch = self.batch,
            "---- batch {:03} ---- mean loss: {:.6} accuracy: {:.6}",
            self.batch,
            self.mean_loss,
            self.accuracy
        );
    }
}

/// End-of-evaluation summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    pub mean_loss: f64,
    pub accuracy: f64,
    pub avg_class_accuracy: f64,
}

impl EvalReport {
    pub fn from_metrics(metrics: &RunningMetrics, classes: &ClassAccuracy) -> Self {
        EvalReport {
            mean_loss: metrics.mean_loss(),
            accuracy: metrics.accuracy(),
            avg_class_accuracy: classes.mean_class_accuracy(),
        }
    }

    pub fn log(&self) {
        info!("eval mean loss: {:.6}", self.mean_loss);
        info!("eval accuracy: {:.6}", self.accuracy);
        info!("eval avg class acc: {:.6}", self.avg_class_accuracy);
    }
}

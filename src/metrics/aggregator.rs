use crate::error::Result;
use crate::metrics::class_accuracy::ClassAccuracy;
use crate::metrics::report::{EvalReport, WindowReport};
use crate::metrics::running::{count_correct, RunningMetrics};

/// Metrics bookkeeping for one phase of an epoch.
///
/// In training mode the window counters are reported and zeroed every
/// `report_every` batches. In evaluation mode they accumulate for the whole
/// epoch and per-class counters are kept alongside. Both modes also keep
/// epoch-wide totals that are never reset mid-epoch.
#[derive(Debug, Clone)]
pub struct MetricsAggregator {
    report_every: Option<usize>,
    window: RunningMetrics,
    epoch: RunningMetrics,
    classes: Option<ClassAccuracy>,
}

impl MetricsAggregator {
    pub fn training(report_every: usize) -> Self {
        MetricsAggregator {
            report_every: Some(report_every.max(1)),
            window: RunningMetrics::new(),
            epoch: RunningMetrics::new(),
            classes: None,
        }
    }

    pub fn evaluation(num_classes: usize) -> Self {
        MetricsAggregator {
            report_every: None,
            window: RunningMetrics::new(),
            epoch: RunningMetrics::new(),
            classes: Some(ClassAccuracy::new(num_classes)),
        }
    }

    /// Records one batch. `predictions` and `labels` must already be cut to
    /// the batch's valid length.
    ///
    /// Returns the window report when this batch closes a training window.
    pub fn record_batch(&mut self, loss: f64, predictions: &[usize], labels: &[usize]) -> Result<Option<WindowReport>> {
        let seen = labels.len();
        let correct = count_correct(&predictions[..seen.min(predictions.len())], labels);

        self.window.record(loss, correct, seen);
        self.epoch.record(loss, correct, seen);
        if let Some(classes) = self.classes.as_mut() {
            classes.record_batch(predictions, labels)?;
        }

        match self.report_every {
            Some(every) if self.epoch.batches % every == 0 => {
                let report = WindowReport::from_metrics(self.epoch.batches, &self.window);
                self.window.reset();
                Ok(Some(report))
            }
            _ => Ok(None),
        }
    }

    /// Counters of the current window (the whole epoch in evaluation mode).
    pub fn window(&self) -> &RunningMetrics {
        &self.window
    }

    /// Totals over every batch recorded since the last `reset`.
    pub fn epoch_totals(&self) -> &RunningMetrics {
        &self.epoch
    }

    pub fn classes(&self) -> Option<&ClassAccuracy> {
        self.classes.as_ref()
    }

    /// End-of-epoch evaluation summary; `None` in training mode.
    pub fn eval_report(&self) -> Option<EvalReport> {
        self.classes
            .as_ref()
            .map(|classes| EvalReport::from_metrics(&self.window, classes))
    }

    pub fn reset(&mut self) {
        self.window.reset();
        self.epoch.reset();
        if let Some(classes) = self.classes.as_mut() {
            classes.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn training_window_reports_and_resets_after_fifty_batches() {
        let mut agg = MetricsAggregator::training(50);
        let (mut loss_sum, mut correct, mut seen) = (0.0, 0usize, 0usize);

        for i in 0..50usize {
            let bsize = if i == 49 { 7 } else { 16 };
            let hits = i % 5 + 3;
            let loss = 2.0 - i as f64 * 0.01;
            let labels = vec![1usize; bsize];
            let predictions: Vec<usize> = (0..bsize).map(|k| if k < hits { 1 } else { 0 }).collect();
            loss_sum += loss;
            correct += hits.min(bsize);
            seen += bsize;

            let report = agg.record_batch(loss, &predictions, &labels).unwrap();
            if i < 49 {
                assert!(report.is_none());
                assert_eq!(agg.window().total_seen, seen);
            } else {
                let report = report.expect("50th batch closes the window");
                assert_eq!(report.batch, 50);
                assert_abs_diff_eq!(report.mean_loss, loss_sum / 50.0, epsilon = 1e-12);
                assert_abs_diff_eq!(report.accuracy, correct as f64 / seen as f64, epsilon = 1e-12);
            }
        }

        assert_eq!(*agg.window(), RunningMetrics::default());
        assert_eq!(agg.epoch_totals().total_seen, seen);
        assert_eq!(agg.epoch_totals().batches, 50);
    }

    #[test]
    fn evaluation_accumulates_whole_epoch_with_per_class_counts() {
        let mut agg = MetricsAggregator::evaluation(3);
        for _ in 0..60 {
            assert!(agg.record_batch(1.0, &[0, 1, 1], &[0, 1, 2]).unwrap().is_none());
        }
        assert_eq!(agg.window().total_seen, 180);
        assert_eq!(agg.classes().unwrap().counts(), &[(60, 60), (60, 60), (60, 0)]);

        let report = agg.eval_report().unwrap();
        assert_abs_diff_eq!(report.mean_loss, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(report.accuracy, 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(report.avg_class_accuracy, 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn correct_never_exceeds_seen() {
        let mut agg = MetricsAggregator::training(2);
        // predictions longer than the valid labels: only the valid prefix counts
        agg.record_batch(0.3, &[4, 4, 4, 4], &[4, 4]).unwrap();
        assert_eq!(agg.epoch_totals().total_correct, 2);
        assert!(agg.epoch_totals().total_correct <= agg.epoch_totals().total_seen);
    }

    #[test]
    fn eval_report_with_unseen_class_is_not_finite() {
        let mut agg = MetricsAggregator::evaluation(2);
        agg.record_batch(0.5, &[0, 0, 0, 1, 1], &[0, 0, 0, 0, 0]).unwrap();
        let report = agg.eval_report().unwrap();
        assert_abs_diff_eq!(report.accuracy, 0.6, epsilon = 1e-12);
        assert!(!report.avg_class_accuracy.is_finite());
    }
}

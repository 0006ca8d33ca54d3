use serde::{Serialize, Deserialize};

/// Running loss/accuracy sums over a window of batches.
///
/// Training resets these every reporting window; evaluation resets them once
/// per epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningMetrics {
    pub loss_sum: f64,
    pub total_correct: usize,
    pub total_seen: usize,
    pub batches: usize,
}

impl RunningMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one batch. `seen` is the batch's valid sample count, never the
    /// buffer capacity.
    pub fn record(&mut self, loss: f64, correct: usize, seen: usize) {
        debug_assert!(correct <= seen, "more correct predictions than samples");
        self.loss_sum += loss;
        self.total_correct += correct;
        self.total_seen += seen;
        self.batches += 1;
    }

    /// Mean loss per batch. Non-finite when no batch was recorded.
    pub fn mean_loss(&self) -> f64 {
        self.loss_sum / self.batches as f64
    }

    /// Fraction of seen samples predicted correctly. Non-finite when nothing was seen.
    pub fn accuracy(&self) -> f64 {
        self.total_correct as f64 / self.total_seen as f64
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Number of positions where prediction and label agree.
pub fn count_correct(predictions: &[usize], labels: &[usize]) -> usize {
    predictions.iter().zip(labels.iter()).filter(|(p, l)| p == l).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn reset_zeroes_every_counter() {
        let mut m = RunningMetrics::new();
        m.record(0.5, 3, 4);
        m.record(1.5, 1, 2);
        assert_abs_diff_eq!(m.mean_loss(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.accuracy(), 4.0 / 6.0, epsilon = 1e-12);
        m.reset();
        assert_eq!(m, RunningMetrics::default());
    }

    #[test]
    fn empty_window_is_not_finite() {
        let m = RunningMetrics::new();
        assert!(!m.accuracy().is_finite());
        assert!(!m.mean_loss().is_finite());
    }

    #[test]
    fn count_correct_stops_at_shorter_slice() {
        assert_eq!(count_correct(&[1, 2, 3, 4], &[1, 0, 3]), 2);
    }
}

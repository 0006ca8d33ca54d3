use serde::{Serialize, Deserialize};

use crate::error::{Result, TrainError};

/// Per-class `(seen, correct)` counters indexed by class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassAccuracy {
    counts: Vec<(usize, usize)>,
}

impl ClassAccuracy {
    pub fn new(num_classes: usize) -> Self {
        ClassAccuracy {
            counts: vec![(0, 0); num_classes],
        }
    }

    /// Records one sample of class `label`.
    pub fn record(&mut self, label: usize, correct: bool) -> Result<()> {
        let num_classes = self.counts.len();
        let (seen, hits) = self
            .counts
            .get_mut(label)
            .ok_or(TrainError::LabelOutOfRange { label, num_classes })?;
        *seen += 1;
        if correct {
            *hits += 1;
        }
        Ok(())
    }

    /// Records every `(prediction, label)` pair.
    pub fn record_batch(&mut self, predictions: &[usize], labels: &[usize]) -> Result<()> {
        for (&pred, &label) in predictions.iter().zip(labels.iter()) {
            self.record(label, pred == label)?;
        }
        Ok(())
    }

    pub fn counts(&self) -> &[(usize, usize)] {
        &self.counts
    }

    /// `correct / seen` per class; a class never seen yields NaN.
    pub fn per_class(&self) -> Vec<f64> {
        self.counts
            .iter()
            .map(|&(seen, correct)| correct as f64 / seen as f64)
            .collect()
    }

    /// Unweighted mean of the per-class accuracies.
    ///
    /// An unseen class poisons the mean with NaN instead of being skipped.
    pub fn mean_class_accuracy(&self) -> f64 {
        let per_class = self.per_class();
        per_class.iter().sum::<f64>() / per_class.len() as f64
    }

    pub fn reset(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = (0, 0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn unseen_class_propagates_non_finite_mean() {
        let mut acc = ClassAccuracy::new(2);
        for i in 0..5 {
            acc.record(0, i < 3).unwrap();
        }
        assert_eq!(acc.counts(), &[(5, 3), (0, 0)]);
        let per_class = acc.per_class();
        assert_abs_diff_eq!(per_class[0], 0.6, epsilon = 1e-12);
        assert!(per_class[1].is_nan());
        assert!(!acc.mean_class_accuracy().is_finite());
    }

    #[test]
    fn mean_is_unweighted_across_classes() {
        let mut acc = ClassAccuracy::new(2);
        acc.record_batch(&[0, 0, 0, 0, 1], &[0, 0, 0, 1, 1]).unwrap();
        // class 0: 3/3, class 1: 1/2
        assert_abs_diff_eq!(acc.mean_class_accuracy(), 0.75, epsilon = 1e-12);
        for &(seen, correct) in acc.counts() {
            assert!(correct <= seen);
        }
    }

    #[test]
    fn out_of_range_label_is_an_error() {
        let mut acc = ClassAccuracy::new(3);
        assert!(matches!(
            acc.record(3, true),
            Err(TrainError::LabelOutOfRange { label: 3, num_classes: 3 })
        ));
    }

    #[test]
    fn reset_clears_counts() {
        let mut acc = ClassAccuracy::new(2);
        acc.record(1, true).unwrap();
        acc.reset();
        assert_eq!(acc.counts(), &[(0, 0), (0, 0)]);
    }
}

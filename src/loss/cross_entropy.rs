use crate::math::matrix::Matrix;
use crate::error::{Result, TrainError};

/// Sparse softmax cross-entropy computed directly from logits.
///
/// Labels are class indices, one per logits row. Folding the softmax into the
/// loss keeps it numerically stable (log-sum-exp with the row max subtracted).
pub struct SparseSoftmaxCrossEntropy;

impl SparseSoftmaxCrossEntropy {
    /// Mean loss over all rows:
    ///   L = mean_i( logsumexp(z_i) - z_i[label_i] )
    pub fn loss(logits: &Matrix, labels: &[usize]) -> Result<f64> {
        check(logits, labels)?;
        if logits.rows == 0 {
            return Ok(0.0);
        }
        let total: f64 = logits
            .data
            .iter()
            .zip(labels.iter())
            .map(|(row, &label)| log_sum_exp(row) - row[label])
            .sum();
        Ok(total / logits.rows as f64)
    }

    /// Gradient of the mean loss w.r.t. the logits:
    ///   ∂L/∂z_ij = (softmax(z_i)_j - 1[j == label_i]) / rows
    pub fn gradient(logits: &Matrix, labels: &[usize]) -> Result<Matrix> {
        check(logits, labels)?;
        let inv_n = 1.0 / logits.rows.max(1) as f64;
        let data = logits
            .data
            .iter()
            .zip(labels.iter())
            .map(|(row, &label)| {
                let mut probs = softmax(row);
                probs[label] -= 1.0;
                probs.into_iter().map(|p| p * inv_n).collect()
            })
            .collect();
        Ok(Matrix {
            rows: logits.rows,
            cols: logits.cols,
            data,
        })
    }
}

fn check(logits: &Matrix, labels: &[usize]) -> Result<()> {
    if labels.len() != logits.rows {
        return Err(TrainError::ShapeMismatch {
            expected: vec![logits.rows],
            got: vec![labels.len()],
        });
    }
    if let Some(&label) = labels.iter().find(|&&l| l >= logits.cols) {
        return Err(TrainError::LabelOutOfRange {
            label,
            num_classes: logits.cols,
        });
    }
    Ok(())
}

fn log_sum_exp(row: &[f64]) -> f64 {
    let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    max + row.iter().map(|x| (x - max).exp()).sum::<f64>().ln()
}

fn softmax(row: &[f64]) -> Vec<f64> {
    let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = row.iter().map(|x| (x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn uniform_logits_give_log_num_classes() {
        let logits = Matrix::zeros(2, 4);
        let loss = SparseSoftmaxCrossEntropy::loss(&logits, &[0, 3]).unwrap();
        assert_abs_diff_eq!(loss, (4.0f64).ln(), epsilon = 1e-12);
    }

    #[test]
    fn gradient_matches_finite_difference() {
        let logits = Matrix::from_data(vec![vec![0.3, -1.2, 2.0], vec![1.0, 0.5, -0.5]]);
        let labels = [2, 0];
        let grad = SparseSoftmaxCrossEntropy::gradient(&logits, &labels).unwrap();
        let h = 1e-6;
        for i in 0..2 {
            for j in 0..3 {
                let mut plus = logits.clone();
                plus.data[i][j] += h;
                let mut minus = logits.clone();
                minus.data[i][j] -= h;
                let numeric = (SparseSoftmaxCrossEntropy::loss(&plus, &labels).unwrap()
                    - SparseSoftmaxCrossEntropy::loss(&minus, &labels).unwrap())
                    / (2.0 * h);
                assert_abs_diff_eq!(grad.data[i][j], numeric, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn large_logits_stay_finite() {
        let logits = Matrix::from_data(vec![vec![1000.0, -1000.0]]);
        let loss = SparseSoftmaxCrossEntropy::loss(&logits, &[1]).unwrap();
        assert_abs_diff_eq!(loss, 2000.0, epsilon = 1e-9);
    }

    #[test]
    fn rejects_out_of_range_label() {
        let err = SparseSoftmaxCrossEntropy::loss(&Matrix::zeros(1, 3), &[3]).unwrap_err();
        assert!(matches!(err, TrainError::LabelOutOfRange { label: 3, num_classes: 3 }));
    }
}

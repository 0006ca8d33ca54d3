use serde::{Serialize, Deserialize};

use crate::math::matrix::Matrix;
use crate::error::{Result, TrainError};

const EPS: f64 = 1e-3;

/// Non-affine batch normalization over feature columns.
///
/// In training mode each column is normalized with the statistics of the
/// current batch and the running statistics move toward them:
///   running = decay * running + (1 - decay) * batch
/// In inference mode the running statistics are used and left untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchNorm {
    pub running_mean: Vec<f64>,
    pub running_var: Vec<f64>,
}

impl BatchNorm {
    pub fn new(features: usize) -> BatchNorm {
        BatchNorm {
            running_mean: vec![0.0; features],
            running_var: vec![1.0; features],
        }
    }

    pub fn features(&self) -> usize {
        self.running_mean.len()
    }

    pub fn forward(&mut self, input: &Matrix, is_training: bool, decay: f64) -> Result<Matrix> {
        if input.cols != self.features() {
            return Err(TrainError::ShapeMismatch {
                expected: vec![input.rows, self.features()],
                got: input.shape().to_vec(),
            });
        }

        let (mean, var) = if is_training && input.rows > 0 {
            let (mean, var) = column_moments(input);
            for (r, m) in self.running_mean.iter_mut().zip(mean.iter()) {
                *r = decay * *r + (1.0 - decay) * m;
            }
            for (r, v) in self.running_var.iter_mut().zip(var.iter()) {
                *r = decay * *r + (1.0 - decay) * v;
            }
            (mean, var)
        } else {
            (self.running_mean.clone(), self.running_var.clone())
        };

        let data = input
            .data
            .iter()
            .map(|row| {
                row.iter()
                    .zip(mean.iter().zip(var.iter()))
                    .map(|(x, (m, v))| (x - m) / (v + EPS).sqrt())
                    .collect()
            })
            .collect();
        Ok(Matrix::from_data(data))
    }
}

/// Per-column mean and (biased) variance.
fn column_moments(input: &Matrix) -> (Vec<f64>, Vec<f64>) {
    let n = input.rows as f64;
    let mean: Vec<f64> = input.column_sums().data[0].iter().map(|s| s / n).collect();
    let mut var = vec![0.0; input.cols];
    for row in &input.data {
        for ((v, x), m) in var.iter_mut().zip(row.iter()).zip(mean.iter()) {
            *v += (x - m).powi(2);
        }
    }
    for v in var.iter_mut() {
        *v /= n;
    }
    (mean, var)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn training_mode_updates_running_stats_with_decay() {
        let mut bn = BatchNorm::new(1);
        let x = Matrix::from_data(vec![vec![1.0], vec![3.0]]);
        let out = bn.forward(&x, true, 0.5).unwrap();

        // batch mean 2, var 1
        assert_abs_diff_eq!(bn.running_mean[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(bn.running_var[0], 1.0, epsilon = 1e-12);
        assert!(out.data[0][0] < 0.0 && out.data[1][0] > 0.0);
    }

    #[test]
    fn inference_mode_leaves_running_stats() {
        let mut bn = BatchNorm::new(2);
        let x = Matrix::from_data(vec![vec![5.0, -5.0]]);
        let out = bn.forward(&x, false, 0.9).unwrap();
        assert_eq!(bn.running_mean, vec![0.0, 0.0]);
        assert_abs_diff_eq!(out.data[0][0], 5.0 / (1.0 + EPS).sqrt(), epsilon = 1e-12);
    }
}

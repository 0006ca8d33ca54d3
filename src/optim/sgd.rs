use crate::math::matrix::Matrix;
use crate::error::Result;
use crate::optim::optimizer::{check_shapes, Optimizer};

/// Plain gradient descent: θ ← θ - lr · g
#[derive(Debug, Default)]
pub struct Sgd;

impl Sgd {
    pub fn new() -> Sgd {
        Sgd
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, params: Vec<&mut Matrix>, grads: &[Matrix], learning_rate: f64) -> Result<()> {
        check_shapes(&params, grads)?;
        for (param, grad) in params.into_iter().zip(grads.iter()) {
            for (row, g_row) in param.data.iter_mut().zip(grad.data.iter()) {
                for (x, g) in row.iter_mut().zip(g_row.iter()) {
                    *x -= learning_rate * g;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_against_gradient() {
        let mut w = Matrix::from_data(vec![vec![1.0, -1.0]]);
        let g = Matrix::from_data(vec![vec![0.5, -0.5]]);
        Sgd::new().step(vec![&mut w], &[g], 0.1).unwrap();
        assert_eq!(w.data, vec![vec![0.95, -0.95]]);
    }

    #[test]
    fn rejects_mismatched_gradient() {
        let mut w = Matrix::zeros(2, 2);
        assert!(Sgd::new().step(vec![&mut w], &[Matrix::zeros(1, 2)], 0.1).is_err());
    }
}

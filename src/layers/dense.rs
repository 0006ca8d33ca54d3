use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};
use crate::error::{Result, TrainError};

/// Fully connected layer operating on a whole batch at once (one row per sample).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub size: usize,
    /// Shape (input_size, size).
    pub weights: Matrix,
    /// Shape (1, size).
    pub biases: Matrix,
    pub activator: ActivationFunction,
    // Inputs and pre-activations (z = xW + b) of the last forward pass, kept for backprop.
    #[serde(skip)]
    inputs: Matrix,
    #[serde(skip)]
    pre_neurons: Matrix,
}

impl Layer {
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Layer {
        let weights = if activation.prefers_he_init() {
            Matrix::he(input_size, size, rng)
        } else {
            Matrix::xavier(input_size, size, rng)
        };

        Layer {
            size,
            weights,
            biases: Matrix::zeros(1, size),
            activator: activation,
            inputs: Matrix::default(),
            pre_neurons: Matrix::default(),
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.rows
    }

    /// Forward pass over a (batch, input_size) matrix.
    pub fn feed_from(&mut self, input: Matrix) -> Result<Matrix> {
        if input.cols != self.input_size() {
            return Err(TrainError::ShapeMismatch {
                expected: vec![input.rows, self.input_size()],
                got: input.shape().to_vec(),
            });
        }
        let z = (&input * &self.weights).add_row(&self.biases);
        let activator = self.activator;
        let a = z.map(|x| activator.function(x));
        self.inputs = input;
        self.pre_neurons = z;
        Ok(a)
    }

    /// Backward pass for the last batch seen by `feed_from`.
    ///
    /// `output_grad` is ∂L/∂a with shape (batch, size). Returns
    /// `(weights_grad, biases_grad, input_grad)`.
    pub fn compute_gradients(&self, output_grad: &Matrix) -> Result<(Matrix, Matrix, Matrix)> {
        if output_grad.shape() != self.pre_neurons.shape() {
            return Err(TrainError::ShapeMismatch {
                expected: self.pre_neurons.shape().to_vec(),
                got: output_grad.shape().to_vec(),
            });
        }
        // δ = ∂L/∂a ⊙ σ'(z)
        let activator = self.activator;
        let act_derivative = self.pre_neurons.map(|x| activator.derivative(x));
        let delta = output_grad.hadamard(&act_derivative);

        let weights_grad = &self.inputs.transpose() * &delta;
        let biases_grad = delta.column_sums();
        let input_grad = &delta * &self.weights.transpose();

        Ok((weights_grad, biases_grad, input_grad))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn sum_loss(layer: &mut Layer, x: &Matrix) -> f64 {
        layer.feed_from(x.clone()).unwrap().data.iter().flatten().sum()
    }

    #[test]
    fn weight_gradient_matches_finite_difference() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut layer = Layer::new(3, 2, ActivationFunction::Tanh, &mut rng);
        let x = Matrix::from_data(vec![vec![0.5, -1.0], vec![0.2, 0.4]]);

        let out = layer.feed_from(x.clone()).unwrap();
        let ones = out.map(|_| 1.0);
        let (w_grad, b_grad, _) = layer.compute_gradients(&ones).unwrap();

        let h = 1e-6;
        let original = layer.weights.data[1][2];
        layer.weights.data[1][2] = original + h;
        let plus = sum_loss(&mut layer, &x);
        layer.weights.data[1][2] = original - h;
        let minus = sum_loss(&mut layer, &x);
        layer.weights.data[1][2] = original;
        assert_abs_diff_eq!(w_grad.data[1][2], (plus - minus) / (2.0 * h), epsilon = 1e-5);

        layer.biases.data[0][0] += h;
        let plus = sum_loss(&mut layer, &x);
        layer.biases.data[0][0] -= 2.0 * h;
        let minus = sum_loss(&mut layer, &x);
        assert_abs_diff_eq!(b_grad.data[0][0], (plus - minus) / (2.0 * h), epsilon = 1e-5);
    }

    #[test]
    fn rejects_wrong_input_width() {
        let mut layer = Layer::new(3, 2, ActivationFunction::ReLU, &mut StdRng::seed_from_u64(0));
        let err = layer.feed_from(Matrix::zeros(1, 5)).unwrap_err();
        assert!(matches!(err, TrainError::ShapeMismatch { .. }));
    }
}

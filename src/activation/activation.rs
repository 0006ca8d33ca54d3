use serde::{Serialize, Deserialize};
use std::f64::consts::E;

/// Element-wise activation applied after a dense layer's linear transform.
///
/// There is no softmax variant: the classifier emits raw logits and
/// `SparseSoftmaxCrossEntropy` folds the softmax into the loss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    Sigmoid,
    #[serde(rename = "relu")]
    ReLU,
    Identity,
    Tanh,
    #[serde(rename = "leaky_relu")]
    LeakyReLU { alpha: f64 },
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Identity => x,
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
        }
    }

    /// Derivative with respect to the pre-activation `x`.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            }
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Identity => 1.0,
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { 1.0 } else { *alpha },
        }
    }

    /// Whether He initialization suits this activation better than Xavier.
    pub fn prefers_he_init(&self) -> bool {
        matches!(self, ActivationFunction::ReLU | ActivationFunction::LeakyReLU { .. })
    }
}

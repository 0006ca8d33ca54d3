use serde::{Serialize, Deserialize};

use crate::math::matrix::Matrix;
use crate::error::{Result, TrainError};
use crate::optim::{adam::Adam, sgd::Sgd};

/// Gradient-based parameter update.
///
/// The learning rate is supplied on every call because it comes from a
/// step-indexed schedule rather than living inside the optimizer.
pub trait Optimizer {
    /// Applies one update. `grads[i]` belongs to `params[i]`.
    fn step(&mut self, params: Vec<&mut Matrix>, grads: &[Matrix], learning_rate: f64) -> Result<()>;
}

/// Serializable optimizer selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptimizerConfig {
    Sgd,
    Adam { beta1: f64, beta2: f64, epsilon: f64 },
}

impl OptimizerConfig {
    pub fn build(&self) -> Box<dyn Optimizer> {
        match *self {
            OptimizerConfig::Sgd => Box::new(Sgd::new()),
            OptimizerConfig::Adam { beta1, beta2, epsilon } => Box::new(Adam::new(beta1, beta2, epsilon)),
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig::Adam {
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

/// Checks that every gradient matches its parameter's shape.
pub(crate) fn check_shapes(params: &[&mut Matrix], grads: &[Matrix]) -> Result<()> {
    if params.len() != grads.len() {
        return Err(TrainError::ShapeMismatch {
            expected: vec![params.len()],
            got: vec![grads.len()],
        });
    }
    for (p, g) in params.iter().zip(grads.iter()) {
        if p.shape() != g.shape() {
            return Err(TrainError::ShapeMismatch {
                expected: p.shape().to_vec(),
                got: g.shape().to_vec(),
            });
        }
    }
    Ok(())
}

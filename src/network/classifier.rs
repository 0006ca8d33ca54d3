use crate::data::batch::BatchBuffer;
use crate::error::Result;
use crate::math::matrix::Matrix;

/// How a forward pass should treat normalization layers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardMode {
    /// Batch statistics (and running-statistic updates) when true;
    /// running statistics when false.
    pub is_training: bool,
    /// Decay for running normalization statistics at this step.
    pub bn_decay: f64,
}

/// The classification network as the training loop sees it.
///
/// `forward` maps every slot of a batch buffer to per-class logits, one row
/// per slot. `backward` returns gradients for the last forward pass in the
/// same order as `parameters_mut`.
pub trait Classifier {
    fn num_classes(&self) -> usize;

    fn forward(&mut self, batch: &BatchBuffer, mode: ForwardMode) -> Result<Matrix>;

    fn backward(&mut self, grad_logits: &Matrix) -> Result<Vec<Matrix>>;

    fn parameters_mut(&mut self) -> Vec<&mut Matrix>;
}

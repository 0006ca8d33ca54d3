pub mod cross_entropy;
pub mod registry;

pub use cross_entropy::SparseSoftmaxCrossEntropy;
pub use registry::{LossRegistry, LossTerm};

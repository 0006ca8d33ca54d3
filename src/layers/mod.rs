pub mod dense;
pub mod batch_norm;

pub use dense::Layer;
pub use batch_norm::BatchNorm;

pub mod classifier;
pub mod pooling;
pub mod network;
pub mod spec;

pub use classifier::{Classifier, ForwardMode};
pub use network::PointClassifier;
pub use spec::{ModelSpec, LayerSpec};

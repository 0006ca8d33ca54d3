pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod schedule;
pub mod data;
pub mod metrics;
pub mod checkpoint;
pub mod train;

// Convenience re-exports
pub use error::{Result, TrainError};
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use network::{Classifier, ForwardMode, PointClassifier, ModelSpec};
pub use loss::{LossRegistry, SparseSoftmaxCrossEntropy};
pub use optim::{Adam, Optimizer, OptimizerConfig, Sgd};
pub use schedule::{BnDecaySchedule, GlobalStep, LearningRateSchedule, StaircaseDecay};
pub use data::{BatchBuffer, DatasetSource, PointCloudDataset, Samples};
pub use metrics::{ClassAccuracy, EvalReport, MetricsAggregator, RunningMetrics, WindowReport};
pub use checkpoint::{Checkpoint, CheckpointManager};
pub use train::{train_loop, EpochStats, History, TrainConfig};

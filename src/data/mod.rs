pub mod source;
pub mod dataset;
pub mod augment;
pub mod batch;

pub use source::{DatasetSource, Samples};
pub use dataset::{PointCloudDataset, PointCloudFile, LabeledCloud};
pub use batch::BatchBuffer;

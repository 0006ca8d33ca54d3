use crate::error::Result;

/// Point clouds and labels returned by one `next_batch` call.
///
/// Each cloud is flattened row-major: `num_point * num_channel` values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Samples {
    pub clouds: Vec<Vec<f64>>,
    pub labels: Vec<usize>,
}

impl Samples {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Batch-iteration contract the training loop drives.
///
/// The loop only relies on `has_next_batch` for termination and on the size
/// of what `next_batch` returns; everything else is the source's business.
pub trait DatasetSource {
    fn has_next_batch(&self) -> bool;

    /// Returns up to `batch_size` samples. `augment` enables stochastic data
    /// augmentation. Calling this when `has_next_batch()` is false yields
    /// `TrainError::SourceExhausted`.
    fn next_batch(&mut self, augment: bool) -> Result<Samples>;

    /// Restarts iteration from the beginning of the (possibly reshuffled)
    /// sample order. Always allowed, whatever the iteration state.
    fn reset(&mut self);

    /// Feature width of each point.
    fn num_channel(&self) -> usize;

    /// Points per cloud.
    fn num_point(&self) -> usize;

    /// Total number of samples in one epoch.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

use crate::data::source::Samples;
use crate::error::{Result, TrainError};

/// Fixed-capacity, reusable batch buffer.
///
/// The model always sees all `batch_size` slots. After a short batch only the
/// first `valid` slots hold fresh data; the tail keeps whatever the previous
/// batch left there. Anything that counts samples must stop at `valid`.
#[derive(Debug, Clone)]
pub struct BatchBuffer {
    num_point: usize,
    num_channel: usize,
    clouds: Vec<Vec<f64>>,
    labels: Vec<usize>,
    valid: usize,
}

impl BatchBuffer {
    /// Zero-filled buffer of `batch_size` clouds.
    pub fn new(batch_size: usize, num_point: usize, num_channel: usize) -> Self {
        BatchBuffer {
            num_point,
            num_channel,
            clouds: vec![vec![0.0; num_point * num_channel]; batch_size],
            labels: vec![0; batch_size],
            valid: 0,
        }
    }

    /// Overwrites the first `samples.len()` slots and leaves the rest stale.
    pub fn fill(&mut self, samples: &Samples) -> Result<()> {
        let bsize = samples.len();
        if bsize > self.batch_size() || samples.clouds.len() != bsize {
            return Err(TrainError::ShapeMismatch {
                expected: vec![self.batch_size()],
                got: vec![samples.clouds.len()],
            });
        }
        let width = self.num_point * self.num_channel;
        for (slot, cloud) in self.clouds.iter_mut().zip(samples.clouds.iter()) {
            if cloud.len() != width {
                return Err(TrainError::ShapeMismatch {
                    expected: vec![self.num_point, self.num_channel],
                    got: vec![cloud.len() / self.num_channel.max(1), self.num_channel],
                });
            }
            slot.copy_from_slice(cloud);
        }
        self.labels[..bsize].copy_from_slice(&samples.labels);
        self.valid = bsize;
        Ok(())
    }

    pub fn batch_size(&self) -> usize {
        self.clouds.len()
    }

    pub fn num_point(&self) -> usize {
        self.num_point
    }

    pub fn num_channel(&self) -> usize {
        self.num_channel
    }

    /// Number of slots written by the last `fill`.
    pub fn valid(&self) -> usize {
        self.valid
    }

    /// All slots, stale tail included.
    pub fn clouds(&self) -> &[Vec<f64>] {
        &self.clouds
    }

    /// All labels, stale tail included.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn valid_labels(&self) -> &[usize] {
        &self.labels[..self.valid]
    }
}

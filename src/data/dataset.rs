use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::data::augment::augment_cloud;
use crate::data::source::{DatasetSource, Samples};
use crate::error::{Result, TrainError};

/// One labelled point cloud as stored on disk: a list of points, each
/// `num_channel` values wide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledCloud {
    pub label: usize,
    pub points: Vec<Vec<f64>>,
}

/// On-disk layout of a point-cloud dataset split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloudFile {
    pub num_channel: usize,
    pub samples: Vec<LabeledCloud>,
}

impl PointCloudFile {
    /// Serializes the split to a JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Deserializes a split from a JSON file previously written by `save_json`.
    pub fn load_json(path: impl AsRef<Path>) -> Result<PointCloudFile> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// In-memory dataset source over a fixed set of point clouds.
///
/// Clouds are truncated to their first `num_point` points. With `shuffle`
/// enabled every `reset()` draws a fresh sample order.
pub struct PointCloudDataset {
    clouds: Vec<Vec<f64>>,
    labels: Vec<usize>,
    num_point: usize,
    num_channel: usize,
    batch_size: usize,
    shuffle: bool,
    order: Vec<usize>,
    cursor: usize,
    rng: StdRng,
}

impl PointCloudDataset {
    /// # Errors
    /// `InvalidConfig` for a zero `batch_size` or `num_point`; `ShapeMismatch`
    /// if any cloud has fewer than `num_point` points or a point of the wrong width.
    pub fn new(file: PointCloudFile, batch_size: usize, num_point: usize, shuffle: bool) -> Result<Self> {
        if batch_size == 0 || num_point == 0 {
            return Err(TrainError::invalid_config("batch_size and num_point must be at least 1"));
        }
        let num_channel = file.num_channel;
        let mut clouds = Vec::with_capacity(file.samples.len());
        let mut labels = Vec::with_capacity(file.samples.len());

        for sample in file.samples {
            if sample.points.len() < num_point {
                return Err(TrainError::ShapeMismatch {
                    expected: vec![num_point, num_channel],
                    got: vec![sample.points.len(), num_channel],
                });
            }
            let mut flat = Vec::with_capacity(num_point * num_channel);
            for point in sample.points.into_iter().take(num_point) {
                if point.len() != num_channel {
                    return Err(TrainError::ShapeMismatch {
                        expected: vec![num_channel],
                        got: vec![point.len()],
                    });
                }
                flat.extend(point);
            }
            clouds.push(flat);
            labels.push(sample.label);
        }

        let mut dataset = PointCloudDataset {
            order: (0..clouds.len()).collect(),
            clouds,
            labels,
            num_point,
            num_channel,
            batch_size,
            shuffle,
            cursor: 0,
            rng: StdRng::from_entropy(),
        };
        dataset.reset();
        Ok(dataset)
    }

    /// Loads a split from JSON and wraps it in a dataset.
    pub fn load_json(path: impl AsRef<Path>, batch_size: usize, num_point: usize, shuffle: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = PointCloudFile::load_json(path)?;
        debug!(path = %path.display(), samples = file.samples.len(), "loaded point cloud split");
        Self::new(file, batch_size, num_point, shuffle)
    }

    /// Replaces the shuffle/augmentation RNG with a seeded one and restarts.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.reset();
        self
    }

    /// Labels in their stored (unshuffled) order.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }
}

impl DatasetSource for PointCloudDataset {
    fn has_next_batch(&self) -> bool {
        self.cursor < self.order.len()
    }

    fn next_batch(&mut self, augment: bool) -> Result<Samples> {
        if !self.has_next_batch() {
            return Err(TrainError::SourceExhausted);
        }
        let end = (self.cursor + self.batch_size).min(self.order.len());
        let mut batch = Samples::default();

        for &idx in &self.order[self.cursor..end] {
            let mut cloud = self.clouds[idx].clone();
            if augment {
                augment_cloud(&mut cloud, self.num_channel, &mut self.rng);
            }
            batch.clouds.push(cloud);
            batch.labels.push(self.labels[idx]);
        }

        self.cursor = end;
        Ok(batch)
    }

    fn reset(&mut self) {
        if self.shuffle {
            self.order.shuffle(&mut self.rng);
        }
        self.cursor = 0;
    }

    fn num_channel(&self) -> usize {
        self.num_channel
    }

    fn num_point(&self) -> usize {
        self.num_point
    }

    fn len(&self) -> usize {
        self.clouds.len()
    }
}

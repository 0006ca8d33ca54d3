use std::path::Path;

use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::data::batch::BatchBuffer;
use crate::error::{Result, TrainError};
use crate::layers::{batch_norm::BatchNorm, dense::Layer};
use crate::math::matrix::Matrix;
use crate::network::classifier::{Classifier, ForwardMode};
use crate::network::pooling::{pool_cloud, STATS_PER_CHANNEL};
use crate::network::spec::ModelSpec;

/// Baseline point-cloud classifier.
///
/// Each cloud is reduced to order-invariant per-channel statistics, normalized
/// by a batch-norm stage driven by the scheduled decay, then fed through dense
/// layers ending in identity logits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointClassifier {
    pub num_channel: usize,
    pub norm: BatchNorm,
    pub layers: Vec<Layer>,
}

impl PointClassifier {
    pub fn new<R: Rng + ?Sized>(spec: &ModelSpec, num_channel: usize, num_classes: usize, rng: &mut R) -> Result<Self> {
        if num_channel == 0 || num_classes == 0 {
            return Err(TrainError::invalid_config("num_channel and num_classes must be at least 1"));
        }
        if spec.hidden.iter().any(|l| l.size == 0) {
            return Err(TrainError::invalid_config("hidden layer sizes must be at least 1"));
        }

        let features = num_channel * STATS_PER_CHANNEL;
        let mut layers = Vec::with_capacity(spec.hidden.len() + 1);
        let mut input_size = features;
        for layer in &spec.hidden {
            layers.push(Layer::new(layer.size, input_size, layer.activation, rng));
            input_size = layer.size;
        }
        layers.push(Layer::new(num_classes, input_size, ActivationFunction::Identity, rng));

        Ok(PointClassifier {
            num_channel,
            norm: BatchNorm::new(features),
            layers,
        })
    }

    /// Serializes the classifier to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a classifier from a JSON file previously written by `save_json`.
    pub fn load_json(path: impl AsRef<Path>) -> Result<PointClassifier> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl Classifier for PointClassifier {
    fn num_classes(&self) -> usize {
        self.layers.last().map_or(0, |l| l.size)
    }

    fn forward(&mut self, batch: &BatchBuffer, mode: ForwardMode) -> Result<Matrix> {
        if batch.num_channel() != self.num_channel {
            return Err(TrainError::ShapeMismatch {
                expected: vec![batch.num_point(), self.num_channel],
                got: vec![batch.num_point(), batch.num_channel()],
            });
        }
        let pooled = Matrix::from_data(
            batch
                .clouds()
                .iter()
                .map(|cloud| pool_cloud(cloud, self.num_channel))
                .collect(),
        );
        let mut current = self.norm.forward(&pooled, mode.is_training, mode.bn_decay)?;
        for layer in &mut self.layers {
            current = layer.feed_from(current)?;
        }
        Ok(current)
    }

    fn backward(&mut self, grad_logits: &Matrix) -> Result<Vec<Matrix>> {
        let mut grads = Vec::with_capacity(self.layers.len() * 2);
        let mut delta = grad_logits.clone();

        for layer in self.layers.iter().rev() {
            let (w_grad, b_grad, input_grad) = layer.compute_gradients(&delta)?;
            // Pushed as (biases, weights) so the final reverse yields
            // weights-then-biases per layer, input → output.
            grads.push(b_grad);
            grads.push(w_grad);
            delta = input_grad;
        }

        grads.reverse();
        Ok(grads)
    }

    fn parameters_mut(&mut self) -> Vec<&mut Matrix> {
        self.layers
            .iter_mut()
            .flat_map(|layer| [&mut layer.weights, &mut layer.biases])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::source::Samples;
    use crate::loss::cross_entropy::SparseSoftmaxCrossEntropy;
    use crate::network::spec::LayerSpec;
    use crate::optim::{Optimizer, Sgd};
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, SeedableRng};

    const EVAL: ForwardMode = ForwardMode { is_training: false, bn_decay: 0.5 };

    fn small_spec() -> ModelSpec {
        ModelSpec {
            hidden: vec![LayerSpec { size: 6, activation: ActivationFunction::Tanh }],
        }
    }

    fn buffer() -> BatchBuffer {
        let mut buf = BatchBuffer::new(2, 3, 3);
        buf.fill(&Samples {
            clouds: vec![
                vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8],
                vec![1.0, -1.0, 0.5, -0.5, 0.25, 0.0, 0.9, 0.1, -0.3],
            ],
            labels: vec![0, 2],
        })
        .unwrap();
        buf
    }

    #[test]
    fn logits_have_one_row_per_slot() {
        let mut model = PointClassifier::new(&small_spec(), 3, 4, &mut StdRng::seed_from_u64(1)).unwrap();
        let logits = model.forward(&buffer(), EVAL).unwrap();
        assert_eq!(logits.shape(), [2, 4]);
        assert_eq!(model.num_classes(), 4);
    }

    #[test]
    fn gradients_align_with_parameters() {
        let mut model = PointClassifier::new(&small_spec(), 3, 4, &mut StdRng::seed_from_u64(2)).unwrap();
        let buf = buffer();
        let logits = model.forward(&buf, EVAL).unwrap();
        let grad = SparseSoftmaxCrossEntropy::gradient(&logits, buf.labels()).unwrap();
        let grads = model.backward(&grad).unwrap();
        let shapes: Vec<_> = model.parameters_mut().iter().map(|p| p.shape()).collect();
        assert_eq!(grads.iter().map(Matrix::shape).collect::<Vec<_>>(), shapes);

        // Finite-difference check on one first-layer weight.
        let h = 1e-6;
        let analytic = grads[0].data[2][1];
        let loss_at = |delta: f64, model: &mut PointClassifier| {
            model.layers[0].weights.data[2][1] += delta;
            let l = SparseSoftmaxCrossEntropy::loss(&model.forward(&buf, EVAL).unwrap(), buf.labels()).unwrap();
            model.layers[0].weights.data[2][1] -= delta;
            l
        };
        let numeric = (loss_at(h, &mut model) - loss_at(-h, &mut model)) / (2.0 * h);
        assert_abs_diff_eq!(analytic, numeric, epsilon = 1e-5);
    }

    #[test]
    fn sgd_steps_reduce_loss_on_fixed_batch() {
        let mut model = PointClassifier::new(&small_spec(), 3, 4, &mut StdRng::seed_from_u64(3)).unwrap();
        let buf = buffer();
        let mut sgd = Sgd::new();
        let initial = SparseSoftmaxCrossEntropy::loss(&model.forward(&buf, EVAL).unwrap(), buf.labels()).unwrap();
        for _ in 0..50 {
            let logits = model.forward(&buf, EVAL).unwrap();
            let grad = SparseSoftmaxCrossEntropy::gradient(&logits, buf.labels()).unwrap();
            let grads = model.backward(&grad).unwrap();
            sgd.step(model.parameters_mut(), &grads, 0.1).unwrap();
        }
        let trained = SparseSoftmaxCrossEntropy::loss(&model.forward(&buf, EVAL).unwrap(), buf.labels()).unwrap();
        assert!(trained < initial, "loss went from {initial} to {trained}");
    }

    #[test]
    fn json_round_trip_preserves_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let mut model = PointClassifier::new(&small_spec(), 3, 4, &mut StdRng::seed_from_u64(4)).unwrap();
        model.save_json(&path).unwrap();
        let mut loaded = PointClassifier::load_json(&path).unwrap();
        let buf = buffer();
        assert_eq!(model.forward(&buf, EVAL).unwrap(), loaded.forward(&buf, EVAL).unwrap());
    }

    #[test]
    fn rejects_channel_mismatch() {
        let mut model = PointClassifier::new(&small_spec(), 6, 4, &mut StdRng::seed_from_u64(5)).unwrap();
        assert!(model.forward(&buffer(), EVAL).is_err());
    }
}

use serde::{Serialize, Deserialize};
use crate::activation::activation::ActivationFunction;

/// One hidden layer of the classifier head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub activation: ActivationFunction,
}

/// Serializable description of the baseline classifier head.
///
/// Input width follows from the dataset's channel count and output width from
/// the number of classes, so only the hidden layers are described here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub hidden: Vec<LayerSpec>,
}

impl Default for ModelSpec {
    fn default() -> Self {
        ModelSpec {
            hidden: vec![
                LayerSpec { size: 256, activation: ActivationFunction::ReLU },
                LayerSpec { size: 128, activation: ActivationFunction::ReLU },
            ],
        }
    }
}

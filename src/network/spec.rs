use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;

/// One fully specified layer of a [`Sequential`](super::Sequential) model,
/// tagged by `"type"` in JSON.
///
/// ```json
/// {"type": "linear", "weight": [[1, 0], [0, 1]], "bias": [0, 0]}
/// {"type": "relu"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerSpec {
    Linear {
        weight: Vec<Vec<f64>>,
        bias: Vec<f64>,
    },
    Relu,
    Sigmoid,
    Tanh,
}

/// Architecture entry used to build fresh layers; linear entries carry only
/// their dimensions, weights are drawn at build time.
///
/// ```json
/// {"type": "linear", "in": 2, "out": 3}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ArchitectureSpec {
    Linear {
        #[serde(rename = "in")]
        in_features: usize,
        #[serde(rename = "out")]
        out_features: usize,
    },
    Relu,
    Sigmoid,
    Tanh,
}

impl LayerSpec {
    pub(crate) fn from_activation(activation: ActivationFunction) -> LayerSpec {
        match activation {
            ActivationFunction::ReLU => LayerSpec::Relu,
            ActivationFunction::Sigmoid => LayerSpec::Sigmoid,
            ActivationFunction::Tanh => LayerSpec::Tanh,
        }
    }
}

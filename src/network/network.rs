use log::debug;
use rand::Rng;

use crate::{activation::activation::ActivationFunction, layers::linear::Linear};
use crate::error::Result;
use crate::math::matrix::Matrix;
use crate::network::spec::{ArchitectureSpec, LayerSpec};

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Linear(Linear),
    Activation(ActivationFunction),
}

/// Ordered chain of stages; each output feeds the next input.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequential {
    pub stages: Vec<Stage>,
}

impl Sequential {
    /// Builds a model from fully specified layers, validating every linear stage.
    pub fn from_specs(specs: Vec<LayerSpec>) -> Result<Sequential> {
        let stages = specs.into_iter()
            .map(|spec| -> Result<Stage> {
                Ok(match spec {
                    LayerSpec::Linear { weight, bias } => {
                        Stage::Linear(Linear::new(Matrix::from_data(weight)?, bias)?)
                    }
                    LayerSpec::Relu => Stage::Activation(ActivationFunction::ReLU),
                    LayerSpec::Sigmoid => Stage::Activation(ActivationFunction::Sigmoid),
                    LayerSpec::Tanh => Stage::Activation(ActivationFunction::Tanh),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Sequential { stages })
    }

    /// Draws fresh Kaiming-uniform weights for every linear entry, in order.
    pub fn build<R: Rng + ?Sized>(architecture: &[ArchitectureSpec], rng: &mut R) -> Result<Sequential> {
        let stages = architecture.iter()
            .map(|entry| -> Result<Stage> {
                Ok(match *entry {
                    ArchitectureSpec::Linear { in_features, out_features } => {
                        Stage::Linear(Linear::kaiming_uniform(in_features, out_features, rng)?)
                    }
                    ArchitectureSpec::Relu => Stage::Activation(ActivationFunction::ReLU),
                    ArchitectureSpec::Sigmoid => Stage::Activation(ActivationFunction::Sigmoid),
                    ArchitectureSpec::Tanh => Stage::Activation(ActivationFunction::Tanh),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Sequential { stages })
    }

    pub fn to_specs(&self) -> Vec<LayerSpec> {
        self.stages.iter()
            .map(|stage| match stage {
                Stage::Linear(l) => LayerSpec::Linear { weight: l.weight.data.clone(), bias: l.bias.clone() },
                Stage::Activation(a) => LayerSpec::from_activation(*a),
            })
            .collect()
    }

    pub fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        debug!("sequential forward through {} stages", self.stages.len());
        let mut current = input.to_vec();
        for stage in &self.stages {
            current = match stage {
                Stage::Linear(layer) => layer.forward(&current)?,
                Stage::Activation(a) => a.apply(&current),
            };
        }
        Ok(current)
    }
}

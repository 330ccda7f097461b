use serde::{Serialize, Deserialize};

use crate::error::{KernelError, Result};
use crate::math::taylor::exp_taylor;

/// Sigmoid saturates to exactly 0 or 1 beyond this magnitude.
pub const SIGMOID_BOUND: f64 = 20.0;
/// Tanh saturates to exactly -1 or 1 beyond this magnitude.
pub const TANH_BOUND: f64 = 10.0;

/// Scalar activations applied element-wise.
///
/// Sigmoid and Tanh evaluate their exponentials with the truncated series in
/// [`exp_taylor`] and saturate outside fixed bounds, so results differ from
/// `f64::exp` based formulas in the low-order digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationFunction {
    ReLU,
    Sigmoid,
    Tanh,
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Sigmoid => sigmoid(x),
            ActivationFunction::Tanh => tanh(x),
        }
    }

    pub fn apply(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&v| self.function(v)).collect()
    }
}

fn sigmoid(x: f64) -> f64 {
    if x > SIGMOID_BOUND {
        1.0
    } else if x < -SIGMOID_BOUND {
        0.0
    } else {
        1.0 / (1.0 + exp_taylor(-x))
    }
}

fn tanh(x: f64) -> f64 {
    if x > TANH_BOUND {
        return 1.0;
    }
    if x < -TANH_BOUND {
        return -1.0;
    }

    let exp_x = exp_taylor(x);
    let exp_neg_x = exp_taylor(-x);
    let denom = exp_x + exp_neg_x;
    // The truncated series can go non-positive for large negative arguments.
    if denom > 0.0 {
        (exp_x - exp_neg_x) / denom
    } else {
        0.0
    }
}

/// Max-shifted softmax over a whole vector, using exact `exp`.
pub fn softmax(x: &[f64]) -> Result<Vec<f64>> {
    if x.is_empty() {
        return Err(KernelError::input("softmax of an empty vector"));
    }
    let max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = x.iter().map(|v| (v - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    Ok(exps.into_iter().map(|e| e / total).collect())
}

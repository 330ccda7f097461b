use log::{debug, warn};
use serde::{Serialize, Deserialize};

use crate::error::{KernelError, Result};

pub const DEFAULT_EPS: f64 = 1e-5;

fn default_eps() -> f64 {
    DEFAULT_EPS
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchNormConfig {
    /// Added to the variance before the square root.
    #[serde(default = "default_eps")]
    pub eps: f64,
}

impl Default for BatchNormConfig {
    fn default() -> Self {
        BatchNormConfig { eps: DEFAULT_EPS }
    }
}

/// Batch normalisation over a `[sample][feature]` batch using the biased
/// (population) variance, followed by a per-feature affine rescale.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchNorm1d {
    pub gamma: Vec<f64>,
    pub beta: Vec<f64>,
    pub eps: f64,
}

impl BatchNorm1d {
    pub fn new(gamma: Vec<f64>, beta: Vec<f64>, config: BatchNormConfig) -> Result<BatchNorm1d> {
        if gamma.len() != beta.len() {
            return Err(KernelError::shape(
                format!("beta of length {} to match gamma", gamma.len()),
                format!("length {}", beta.len()),
            ));
        }
        if config.eps.is_nan() || config.eps < 0.0 {
            return Err(KernelError::input(format!("eps must be non-negative, got {}", config.eps)));
        }
        Ok(BatchNorm1d { gamma, beta, eps: config.eps })
    }

    /// Unit scale, zero shift.
    pub fn standard(features: usize) -> BatchNorm1d {
        BatchNorm1d { gamma: vec![1.0; features], beta: vec![0.0; features], eps: DEFAULT_EPS }
    }

    pub fn features(&self) -> usize {
        self.gamma.len()
    }

    pub fn forward(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        if x.is_empty() {
            return Err(KernelError::input("batch norm needs at least one sample"));
        }
        let features = self.features();
        if let Some((i, row)) = x.iter().enumerate().find(|(_, row)| row.len() != features) {
            return Err(KernelError::shape(
                format!("{features} features in every sample"),
                format!("{} in sample {i}", row.len()),
            ));
        }

        let n = x.len() as f64;
        debug!("batchnorm forward: {} samples x {} features", x.len(), features);

        let mean: Vec<f64> = (0..features)
            .map(|j| x.iter().map(|row| row[j]).sum::<f64>() / n)
            .collect();
        let var: Vec<f64> = (0..features)
            .map(|j| x.iter().map(|row| (row[j] - mean[j]).powi(2)).sum::<f64>() / n)
            .collect();

        if self.eps == 0.0 {
            if let Some(j) = var.iter().position(|&v| v == 0.0) {
                // 0/0 would follow; centred values are exactly zero so the shift alone remains.
                warn!("batchnorm: feature {j} has zero variance and eps is 0, emitting beta");
            }
        }

        let inv_std: Vec<f64> = var.iter()
            .map(|&v| {
                let denom = (v + self.eps).sqrt();
                if denom > 0.0 { 1.0 / denom } else { 0.0 }
            })
            .collect();

        Ok(x.iter()
            .map(|row| {
                row.iter().enumerate()
                    .map(|(j, &v)| self.gamma[j] * (v - mean[j]) * inv_std[j] + self.beta[j])
                    .collect()
            })
            .collect())
    }
}

use log::debug;

use crate::error::{KernelError, Result};
use crate::loss::reduction::Reduction;
use crate::math::vector::check_same_len;

pub struct MseLoss;

pub(crate) fn check_pair(predicted: &[f64], expected: &[f64]) -> Result<()> {
    check_same_len(predicted, expected)?;
    if predicted.is_empty() {
        return Err(KernelError::input("loss of empty predictions"));
    }
    Ok(())
}

impl MseLoss {
    /// Scalar MSE: reduce((predicted - expected)²)
    pub fn loss(predicted: &[f64], expected: &[f64], reduction: Reduction) -> Result<f64> {
        check_pair(predicted, expected)?;
        debug!("mse loss over {} elements ({:?})", predicted.len(), reduction);
        Ok(reduction.reduce(
            predicted.iter().zip(expected.iter()).map(|(a, b)| (a - b).powi(2)),
        ))
    }

    /// Gradient of the mean-reduced loss: 2·(predicted - expected) / n
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Result<Vec<f64>> {
        check_pair(predicted, expected)?;
        let n = predicted.len() as f64;
        Ok(predicted.iter().zip(expected.iter())
            .map(|(a, b)| 2.0 * (a - b) / n)
            .collect())
    }
}

use crate::activation::activation::softmax;
use crate::error::{KernelError, Result};

/// Categorical cross-entropy computed straight from raw logits.
pub struct CrossEntropyLoss;

/// Small epsilon added inside log() to prevent log(0) = -inf.
const EPS: f64 = 1e-10;

impl CrossEntropyLoss {
    /// L = -log(softmax(logits)[target] + eps)
    ///
    /// `logits` — unnormalised class scores, shape [n_classes]
    /// `target` — index of the true class
    pub fn loss(logits: &[f64], target: usize) -> Result<f64> {
        if target >= logits.len() {
            return Err(KernelError::input(format!(
                "target class {target} out of range for {} logits", logits.len()
            )));
        }
        let probs = softmax(logits)?;
        Ok(-(probs[target] + EPS).ln())
    }

    /// Gradient w.r.t. the logits: softmax(logits) - onehot(target)
    pub fn derivative(logits: &[f64], target: usize) -> Result<Vec<f64>> {
        if target >= logits.len() {
            return Err(KernelError::input(format!(
                "target class {target} out of range for {} logits", logits.len()
            )));
        }
        let mut grad = softmax(logits)?;
        grad[target] -= 1.0;
        Ok(grad)
    }
}

use crate::error::Result;
use crate::loss::mse::check_pair;
use crate::loss::reduction::Reduction;

/// L1 loss (mean absolute error under the default reduction).
pub struct MaeLoss;

impl MaeLoss {
    /// Scalar L1: reduce(|predicted - expected|)
    pub fn loss(predicted: &[f64], expected: &[f64], reduction: Reduction) -> Result<f64> {
        check_pair(predicted, expected)?;
        Ok(reduction.reduce(
            predicted.iter().zip(expected.iter()).map(|(p, y)| (p - y).abs()),
        ))
    }

    /// Per-output subgradient of the mean: sign(p - y) / n  (0 when equal)
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Result<Vec<f64>> {
        check_pair(predicted, expected)?;
        let n = predicted.len() as f64;
        Ok(predicted.iter().zip(expected.iter())
            .map(|(p, y)| {
                let diff = p - y;
                if diff > 0.0 { 1.0 / n } else if diff < 0.0 { -1.0 / n } else { 0.0 }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l1_reductions() {
        assert_eq!(MaeLoss::loss(&[1.0, 2.0], &[2.0, 4.0], Reduction::Mean).unwrap(), 1.5);
        assert_eq!(MaeLoss::loss(&[1.0, 2.0], &[2.0, 4.0], Reduction::Sum).unwrap(), 3.0);
    }

    #[test]
    fn subgradient_signs() {
        assert_eq!(MaeLoss::derivative(&[3.0, 1.0, 2.0, 0.0], &[1.0, 1.0, 5.0, 0.0]).unwrap(), vec![0.25, 0.0, -0.25, 0.0]);
    }
}

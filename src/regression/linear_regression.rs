use log::{debug, warn};
use serde::{Serialize, Deserialize};

use crate::error::{KernelError, Result};
use crate::math::vector::{check_same_len, mean};

/// Simple (one-feature) least-squares line `y = coef·x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    pub coef: f64,
    pub intercept: f64,
}

impl LinearRegression {
    /// Closed-form fit over paired samples.
    ///
    /// When every `x` is equal the slope is undefined; the fit falls back to a
    /// flat line through the mean of `y`.
    pub fn fit(x: &[f64], y: &[f64]) -> Result<LinearRegression> {
        check_same_len(x, y)?;
        if x.is_empty() {
            return Err(KernelError::input("linear regression needs at least one sample"));
        }

        let n = x.len() as f64;
        let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
        for (&xi, &yi) in x.iter().zip(y) {
            sum_x += xi;
            sum_y += yi;
            sum_xy += xi * yi;
            sum_xx += xi * xi;
        }

        let denom = n * sum_xx - sum_x * sum_x;
        if denom == 0.0 {
            warn!("linear regression: all {} x values are equal, fitting a flat line", x.len());
            return Ok(LinearRegression { coef: 0.0, intercept: sum_y / n });
        }

        let coef = (n * sum_xy - sum_x * sum_y) / denom;
        let intercept = (sum_y - coef * sum_x) / n;
        debug!("linear regression fit over {} samples: coef = {coef}, intercept = {intercept}", x.len());
        Ok(LinearRegression { coef, intercept })
    }

    pub fn predict_one(&self, x: f64) -> f64 {
        self.coef * x + self.intercept
    }

    pub fn predict(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&xi| self.predict_one(xi)).collect()
    }

    /// Coefficient of determination R² = 1 − SS_res / SS_tot.
    ///
    /// A constant target gives 1 for a perfect fit and 0 otherwise.
    pub fn score(&self, x: &[f64], y: &[f64]) -> Result<f64> {
        check_same_len(x, y)?;
        if y.is_empty() {
            return Err(KernelError::input("score needs at least one sample"));
        }
        let y_mean = mean(y);
        let ss_res: f64 = x.iter().zip(y).map(|(&xi, &yi)| (yi - self.predict_one(xi)).powi(2)).sum();
        let ss_tot: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();

        if ss_tot == 0.0 {
            return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
        }
        Ok(1.0 - ss_res / ss_tot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_point_fit_and_predict() {
        let model = LinearRegression::fit(&[0.0, 2.0], &[0.0, 4.0]).unwrap();
        assert_eq!(model, LinearRegression { coef: 2.0, intercept: 0.0 });
        assert_eq!(LinearRegression { coef: 2.0, intercept: 0.0 }.predict_one(5.0), 10.0);
    }

    #[test]
    fn noisy_fit_minimises_squared_error() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.1, 3.9, 6.2, 7.8];
        let model = LinearRegression::fit(&x, &y).unwrap();
        // Hand-computed normal-equation solution.
        assert!((model.coef - 1.94).abs() < 1e-9);
        assert!((model.intercept - 0.15).abs() < 1e-9);
        assert!(model.score(&x, &y).unwrap() > 0.99);
    }

    #[test]
    fn constant_x_falls_back_to_mean() {
        let model = LinearRegression::fit(&[3.0, 3.0, 3.0], &[1.0, 2.0, 6.0]).unwrap();
        assert_eq!(model, LinearRegression { coef: 0.0, intercept: 3.0 });
        assert!(model.coef.is_finite() && model.intercept.is_finite());
    }

    #[test]
    fn single_sample_is_degenerate_not_an_error() {
        let model = LinearRegression::fit(&[7.0], &[4.0]).unwrap();
        assert_eq!(model.predict(&[0.0, 100.0]), vec![4.0, 4.0]);
    }

    #[test]
    fn invalid_inputs() {
        assert!(matches!(LinearRegression::fit(&[], &[]), Err(KernelError::InvalidInput(_))));
        assert!(matches!(LinearRegression::fit(&[1.0], &[1.0, 2.0]), Err(KernelError::InvalidShape { .. })));
    }

    #[test]
    fn score_edge_cases() {
        let flat = LinearRegression { coef: 0.0, intercept: 5.0 };
        assert_eq!(flat.score(&[1.0, 2.0], &[5.0, 5.0]).unwrap(), 1.0);
        assert_eq!(flat.score(&[1.0, 2.0], &[6.0, 6.0]).unwrap(), 0.0);
    }
}

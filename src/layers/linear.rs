use log::debug;
use rand::Rng;
use serde::Serialize;

use crate::error::{KernelError, Result};
use crate::math::matrix::Matrix;

/// Affine layer `y = W·x + b` with `W` shaped `(out_features, in_features)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    pub weight: Matrix,
    pub bias: Vec<f64>,
}

/// Gradients produced by [`Linear::backward`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearGrads {
    /// ∂L/∂x = Wᵗ·dy
    pub dx: Vec<f64>,
    /// ∂L/∂W = dy ⊗ x
    pub dw: Matrix,
    /// ∂L/∂b = dy
    pub db: Vec<f64>,
}

impl Linear {
    pub fn new(weight: Matrix, bias: Vec<f64>) -> Result<Linear> {
        if bias.len() != weight.rows {
            return Err(KernelError::shape(
                format!("bias of length {} (one per output)", weight.rows),
                format!("length {}", bias.len()),
            ));
        }
        Ok(Linear { weight, bias })
    }

    /// Kaiming-uniform initialisation.
    ///
    /// Weights are drawn from `U(-√3·√(2/in), √3·√(2/in))`, biases from
    /// `U(-1/√in, 1/√in)`.
    pub fn kaiming_uniform<R: Rng + ?Sized>(in_features: usize, out_features: usize, rng: &mut R) -> Result<Linear> {
        if in_features == 0 {
            return Err(KernelError::input("in_features must be at least 1"));
        }
        let fan_in = in_features as f64;
        let bound = 3.0_f64.sqrt() * (2.0 / fan_in).sqrt();
        let weight = Matrix::uniform(out_features, in_features, bound, rng);

        let bias_bound = 1.0 / fan_in.sqrt();
        let bias = (0..out_features)
            .map(|_| rng.gen::<f64>() * 2.0 * bias_bound - bias_bound)
            .collect();

        Ok(Linear { weight, bias })
    }

    pub fn in_features(&self) -> usize {
        self.weight.cols
    }

    pub fn out_features(&self) -> usize {
        self.weight.rows
    }

    pub fn forward(&self, x: &[f64]) -> Result<Vec<f64>> {
        debug!("linear forward: {}x{} weight, input len {}", self.weight.rows, self.weight.cols, x.len());
        let wx = self.weight.mat_vec(x)?;
        Ok(wx.iter().zip(&self.bias).map(|(v, b)| v + b).collect())
    }

    /// Applies [`Linear::forward`] to every row of a batch.
    pub fn forward_batch(&self, batch: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        batch.iter().map(|x| self.forward(x)).collect()
    }

    /// Gradients of a scalar objective given `dy = ∂L/∂y` at input `x`.
    pub fn backward(&self, x: &[f64], dy: &[f64]) -> Result<LinearGrads> {
        if x.len() != self.in_features() {
            return Err(KernelError::shape(
                format!("input of length {}", self.in_features()),
                format!("length {}", x.len()),
            ));
        }
        let dx = self.weight.transpose().mat_vec(dy)?;
        let dw = Matrix::outer(dy, x);

        Ok(LinearGrads { dx, dw, db: dy.to_vec() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn identity_layer() -> Linear {
        Linear::new(Matrix::identity(2), vec![0.0, 0.0]).unwrap()
    }

    #[test]
    fn forward_identity_plus_bias() {
        let layer = Linear::new(Matrix::identity(2), vec![0.5, -1.0]).unwrap();
        assert_eq!(layer.forward(&[1.0, 2.0]).unwrap(), vec![1.5, 1.0]);
    }

    #[test]
    fn backward_reference_values() {
        let grads = identity_layer().backward(&[1.0, 2.0], &[1.0, 1.0]).unwrap();
        assert_eq!(grads.dx, vec![1.0, 1.0]);
        assert_eq!(grads.dw.data, vec![vec![1.0, 2.0], vec![1.0, 2.0]]);
        assert_eq!(grads.db, vec![1.0, 1.0]);
    }

    #[test]
    fn backward_matches_finite_differences() {
        let weight = Matrix::from_data(vec![
            vec![0.3, -1.2, 0.7],
            vec![2.0, 0.1, -0.4],
        ]).unwrap();
        let layer = Linear::new(weight, vec![0.05, -0.3]).unwrap();
        let x = vec![0.9, -0.6, 1.4];
        let dy = vec![0.8, -1.1];
        let grads = layer.backward(&x, &dy).unwrap();

        // Objective L = Σ dy_i · y_i, so ∂L/∂y = dy.
        let objective = |l: &Linear, x: &[f64]| -> f64 {
            l.forward(x).unwrap().iter().zip(&dy).map(|(y, g)| y * g).sum()
        };
        let h = 1e-6;

        for j in 0..x.len() {
            let (mut xp, mut xm) = (x.clone(), x.clone());
            xp[j] += h;
            xm[j] -= h;
            let numeric = (objective(&layer, &xp) - objective(&layer, &xm)) / (2.0 * h);
            assert!((numeric - grads.dx[j]).abs() < 1e-6, "dx[{j}]");
        }

        for i in 0..layer.out_features() {
            for j in 0..layer.in_features() {
                let (mut lp, mut lm) = (layer.clone(), layer.clone());
                lp.weight.data[i][j] += h;
                lm.weight.data[i][j] -= h;
                let numeric = (objective(&lp, &x) - objective(&lm, &x)) / (2.0 * h);
                assert!((numeric - grads.dw.data[i][j]).abs() < 1e-6, "dw[{i}][{j}]");
            }

            let (mut lp, mut lm) = (layer.clone(), layer.clone());
            lp.bias[i] += h;
            lm.bias[i] -= h;
            let numeric = (objective(&lp, &x) - objective(&lm, &x)) / (2.0 * h);
            assert!((numeric - grads.db[i]).abs() < 1e-6, "db[{i}]");
        }
    }

    #[test]
    fn shape_mismatches_are_rejected() {
        let layer = identity_layer();
        assert!(matches!(layer.forward(&[1.0]), Err(KernelError::InvalidShape { .. })));
        assert!(layer.backward(&[1.0, 2.0], &[1.0]).is_err());
        assert!(Linear::new(Matrix::identity(2), vec![0.0]).is_err());
    }

    #[test]
    fn batch_forward_maps_rows() {
        let out = identity_layer().forward_batch(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(out, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn kaiming_init_respects_bounds_and_seed() {
        let a = Linear::kaiming_uniform(8, 3, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = Linear::kaiming_uniform(8, 3, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.weight.shape(), [3, 8]);

        let bound = 3.0_f64.sqrt() * (2.0_f64 / 8.0).sqrt();
        assert!(a.weight.data.iter().flatten().all(|w| w.abs() <= bound));
        assert!(a.bias.iter().all(|b| b.abs() <= 1.0 / 8.0_f64.sqrt()));
    }
}

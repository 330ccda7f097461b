use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::error::{KernelError, Result};

fn default_p() -> f64 {
    0.5
}

fn default_training() -> bool {
    true
}

/// Dropout hyper-parameters as they arrive from a caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropoutConfig {
    #[serde(default = "default_p")]
    pub p: f64,
    #[serde(default = "default_training")]
    pub training: bool,
    /// Fixes the draw sequence; `None` seeds from the OS.
    #[serde(default, alias = "random_state")]
    pub seed: Option<u64>,
}

impl Default for DropoutConfig {
    fn default() -> Self {
        DropoutConfig { p: default_p(), training: default_training(), seed: None }
    }
}

/// Inverted dropout: kept elements are scaled by `1/(1-p)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dropout {
    pub p: f64,
    pub training: bool,
}

impl Dropout {
    pub fn new(p: f64, training: bool) -> Result<Dropout> {
        if !(0.0..=1.0).contains(&p) {
            return Err(KernelError::input(format!("dropout probability must be in [0, 1], got {p}")));
        }
        Ok(Dropout { p, training })
    }

    pub fn from_config(config: &DropoutConfig) -> Result<Dropout> {
        Dropout::new(config.p, config.training)
    }

    fn scale(&self) -> f64 {
        if self.p < 1.0 {
            1.0 / (1.0 - self.p)
        } else {
            warn!("dropout with p = 1 zeroes every element");
            0.0
        }
    }

    /// Draws one uniform sample per element from `rng`; elements whose draw
    /// is below `p` are zeroed.
    ///
    /// In evaluation mode the input is returned unchanged and `rng` is untouched.
    pub fn forward<R: Rng + ?Sized>(&self, x: &[f64], rng: &mut R) -> Vec<f64> {
        if !self.training {
            return x.to_vec();
        }
        debug!("dropout forward: {} elements, p = {}", x.len(), self.p);

        let scale = self.scale();
        x.iter()
            .enumerate()
            .map(|(i, &v)| {
                let draw: f64 = rng.gen();
                if draw < self.p {
                    trace!("dropout: element {i} dropped (draw {draw})");
                    0.0
                } else {
                    v * scale
                }
            })
            .collect()
    }

    /// Convenience wrapper seeding a fresh [`StdRng`] for this call only.
    pub fn forward_seeded(&self, x: &[f64], seed: Option<u64>) -> Vec<f64> {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        self.forward(x, &mut rng)
    }
}

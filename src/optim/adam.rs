use log::debug;
use serde::{Serialize, Deserialize};

use crate::error::{KernelError, Result};

fn default_lr() -> f64 { 0.001 }
fn default_beta1() -> f64 { 0.9 }
fn default_beta2() -> f64 { 0.999 }
fn default_eps() -> f64 { 1e-8 }

/// Adam hyper-parameters (Kingma & Ba, 2015).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdamConfig {
    #[serde(default = "default_lr")]
    pub lr: f64,
    #[serde(default = "default_beta1")]
    pub beta1: f64,
    #[serde(default = "default_beta2")]
    pub beta2: f64,
    #[serde(default = "default_eps")]
    pub eps: f64,
}

impl Default for AdamConfig {
    fn default() -> Self {
        AdamConfig { lr: default_lr(), beta1: default_beta1(), beta2: default_beta2(), eps: default_eps() }
    }
}

/// Parameters plus first/second moment estimates after an update.
///
/// `t` is the step count the *next* update should use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdamState {
    pub params: Vec<f64>,
    pub m: Vec<f64>,
    pub v: Vec<f64>,
    pub t: u64,
}

/// Zeroed moment buffers for `n` parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdamMoments {
    pub m: Vec<f64>,
    pub v: Vec<f64>,
    pub t: u64,
}

pub struct Adam {
    pub config: AdamConfig,
}

impl Adam {
    pub fn new(config: AdamConfig) -> Adam {
        Adam { config }
    }

    pub fn init(n_params: usize) -> AdamMoments {
        AdamMoments { m: vec![0.0; n_params], v: vec![0.0; n_params], t: 0 }
    }

    /// One bias-corrected Adam update at step `t` (1-based).
    ///
    /// With `lr == 0` the inputs come back untouched, `t` included.
    pub fn step(&self, params: &[f64], grads: &[f64], m: &[f64], v: &[f64], t: u64) -> Result<AdamState> {
        let n = params.len();
        for (name, len) in [("grads", grads.len()), ("m", m.len()), ("v", v.len())] {
            if len != n {
                return Err(KernelError::shape(
                    format!("{name} of length {n} to match params"),
                    format!("length {len}"),
                ));
            }
        }

        let AdamConfig { lr, beta1, beta2, eps } = self.config;
        if lr == 0.0 {
            return Ok(AdamState { params: params.to_vec(), m: m.to_vec(), v: v.to_vec(), t });
        }
        if t == 0 {
            return Err(KernelError::input("adam step count t must be at least 1"));
        }
        debug!("adam step t = {t} over {n} params, lr = {lr}");

        let exp = i32::try_from(t).unwrap_or(i32::MAX);
        let correction1 = 1.0 - beta1.powi(exp);
        let correction2 = 1.0 - beta2.powi(exp);

        let mut state = AdamState { params: Vec::with_capacity(n), m: Vec::with_capacity(n), v: Vec::with_capacity(n), t: t + 1 };
        for i in 0..n {
            let m_i = beta1 * m[i] + (1.0 - beta1) * grads[i];
            let v_i = beta2 * v[i] + (1.0 - beta2) * grads[i] * grads[i];
            let m_hat = m_i / correction1;
            let v_hat = v_i / correction2;

            state.params.push(params[i] - lr * m_hat / (v_hat.sqrt() + eps));
            state.m.push(m_i);
            state.v.push(v_i);
        }
        Ok(state)
    }
}

//! Fixed-size operators driven entirely by named numeric flags.
//!
//! Each command prints a single space-joined `key=value` record; the 2x2,
//! 2-vector and 4-sample shapes are special cases of the general kernels.

use clap::{Args, ValueEnum};
use ferrite_kernels::{ActivationFunction, Linear, LinearRegression, Matrix, MseLoss, Reduction};

use crate::error::Result;
use crate::format::record;

// ---------------------------------------------------------------------------
// tensor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TensorMode {
    Add,
    Mul,
    Matmul,
}

#[derive(Debug, Args)]
pub struct TensorArgs {
    #[arg(long, value_enum)]
    pub mode: TensorMode,
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub a00: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub a01: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub a10: f64,
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub a11: f64,
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub b00: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub b01: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub b10: f64,
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub b11: f64,
}

pub fn tensor(args: &TensorArgs) -> Result<String> {
    let a = Matrix::from_data(vec![vec![args.a00, args.a01], vec![args.a10, args.a11]])?;
    let b = Matrix::from_data(vec![vec![args.b00, args.b01], vec![args.b10, args.b11]])?;
    let c = match args.mode {
        TensorMode::Add => a.add(&b)?,
        TensorMode::Mul => a.hadamard(&b)?,
        TensorMode::Matmul => a.matmul(&b)?,
    };
    Ok(record(&[
        ("c00", c.data[0][0]),
        ("c01", c.data[0][1]),
        ("c10", c.data[1][0]),
        ("c11", c.data[1][1]),
    ]))
}

// ---------------------------------------------------------------------------
// linear
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LinearMode {
    Forward,
    Backward,
}

#[derive(Debug, Args)]
pub struct LinearArgs {
    #[arg(long, value_enum)]
    pub mode: LinearMode,
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub x0: f64,
    #[arg(long, default_value_t = 2.0, allow_negative_numbers = true)]
    pub x1: f64,
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub w00: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub w01: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub w10: f64,
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub w11: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub b0: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub b1: f64,
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub dy0: f64,
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub dy1: f64,
}

pub fn linear(args: &LinearArgs) -> Result<String> {
    let weight = Matrix::from_data(vec![vec![args.w00, args.w01], vec![args.w10, args.w11]])?;
    let layer = Linear::new(weight, vec![args.b0, args.b1])?;
    let x = [args.x0, args.x1];

    match args.mode {
        LinearMode::Forward => {
            let y = layer.forward(&x)?;
            Ok(record(&[("y0", y[0]), ("y1", y[1])]))
        }
        LinearMode::Backward => {
            let g = layer.backward(&x, &[args.dy0, args.dy1])?;
            Ok(record(&[
                ("dx0", g.dx[0]),
                ("dx1", g.dx[1]),
                ("dw00", g.dw.data[0][0]),
                ("dw01", g.dw.data[0][1]),
                ("dw10", g.dw.data[1][0]),
                ("dw11", g.dw.data[1][1]),
                ("db0", g.db[0]),
                ("db1", g.db[1]),
            ]))
        }
    }
}

// ---------------------------------------------------------------------------
// mse
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MseMode {
    Loss,
    Grad,
}

#[derive(Debug, Args)]
pub struct MseArgs {
    #[arg(long, value_enum)]
    pub mode: MseMode,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub p0: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub p1: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub p2: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub p3: f64,
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub t0: f64,
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub t1: f64,
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub t2: f64,
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub t3: f64,
}

pub fn mse(args: &MseArgs) -> Result<String> {
    let pred = [args.p0, args.p1, args.p2, args.p3];
    let target = [args.t0, args.t1, args.t2, args.t3];

    match args.mode {
        MseMode::Loss => Ok(record(&[("mse", MseLoss::loss(&pred, &target, Reduction::Mean)?)])),
        MseMode::Grad => {
            let g = MseLoss::derivative(&pred, &target)?;
            Ok(record(&[("g0", g[0]), ("g1", g[1]), ("g2", g[2]), ("g3", g[3])]))
        }
    }
}

// ---------------------------------------------------------------------------
// activation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActivationMode {
    Relu,
    Sigmoid,
    Tanh,
}

impl From<ActivationMode> for ActivationFunction {
    fn from(mode: ActivationMode) -> Self {
        match mode {
            ActivationMode::Relu => ActivationFunction::ReLU,
            ActivationMode::Sigmoid => ActivationFunction::Sigmoid,
            ActivationMode::Tanh => ActivationFunction::Tanh,
        }
    }
}

#[derive(Debug, Args)]
pub struct ActivationArgs {
    #[arg(long, value_enum)]
    pub mode: ActivationMode,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub x: f64,
}

pub fn activation(args: &ActivationArgs) -> Result<String> {
    let f = ActivationFunction::from(args.mode);
    Ok(record(&[("y", f.function(args.x))]))
}

// ---------------------------------------------------------------------------
// linreg
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LinregMode {
    Fit,
    Predict,
}

#[derive(Debug, Args)]
pub struct LinregArgs {
    #[arg(long, value_enum)]
    pub mode: LinregMode,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub x1: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub y1: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub x2: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub y2: f64,
    /// Value to predict at.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub x: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub coef: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub intercept: f64,
}

pub fn linreg(args: &LinregArgs) -> Result<String> {
    match args.mode {
        LinregMode::Fit => {
            let model = LinearRegression::fit(&[args.x1, args.x2], &[args.y1, args.y2])?;
            Ok(record(&[("coef", model.coef), ("intercept", model.intercept)]))
        }
        LinregMode::Predict => {
            let model = LinearRegression { coef: args.coef, intercept: args.intercept };
            Ok(record(&[("prediction", model.predict_one(args.x))]))
        }
    }
}

//! Operators driven by a JSON document on stdin; each prints one JSON record.

use clap::ValueEnum;
use ferrite_kernels::loss::reduction::Reduction;
use ferrite_kernels::math::vector;
use ferrite_kernels::optim::AdamState;
use ferrite_kernels::{
    softmax, ActivationFunction, Adam, AdamConfig, ArchitectureSpec, BatchNorm1d, BatchNormConfig,
    Conv2d, CrossEntropyLoss, Dropout, DropoutConfig, Kernel, KernelError, LayerSpec, Linear,
    LinearRegression, MaeLoss, Matrix, MseLoss, Sequential, Volume,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Result;

fn parse<T: DeserializeOwned>(input: &str) -> Result<T> {
    Ok(serde_json::from_str(input)?)
}

fn seeded(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// A rank-1 or rank-2 numeric array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TensorData {
    Vector(Vec<f64>),
    Matrix(Vec<Vec<f64>>),
}

impl TensorData {
    /// Rejects ragged rank-2 data; rank-1 data passes through.
    fn checked(self) -> Result<TensorData> {
        match self {
            TensorData::Matrix(m) => Ok(TensorData::Matrix(Matrix::from_data(m)?.data)),
            vector => Ok(vector),
        }
    }

    fn shape(&self) -> Vec<usize> {
        match self {
            TensorData::Vector(v) => vec![v.len()],
            TensorData::Matrix(m) => vec![m.len(), m.first().map_or(0, |r| r.len())],
        }
    }

    fn into_matrix(self) -> Result<Matrix> {
        match self {
            TensorData::Matrix(m) => Ok(Matrix::from_data(m)?),
            TensorData::Vector(v) => Err(KernelError::shape(
                "a matrix",
                format!("vector of length {}", v.len()),
            ).into()),
        }
    }

    fn flat_values(&self) -> Vec<f64> {
        match self {
            TensorData::Vector(v) => v.clone(),
            TensorData::Matrix(m) => m.iter().flatten().copied().collect(),
        }
    }
}

fn contains_null(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.iter().any(contains_null),
        Value::Object(fields) => fields.values().any(contains_null),
        _ => false,
    }
}

/// Fails when a record holds a NaN or infinite number.
///
/// `serde_json` writes non-finite floats as `null` and no record has a
/// nullable field, so any `null` marks one.
pub fn finite(record: Value) -> Result<Value> {
    if contains_null(&record) {
        return Err(KernelError::input("result contains a non-finite value").into());
    }
    Ok(record)
}

fn default_stride() -> usize {
    1
}

fn default_one() -> usize {
    1
}

// ---------------------------------------------------------------------------
// Single-operation commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ForwardOp {
    Forward,
}

#[derive(Deserialize)]
struct ConvPayload {
    x: Vec<Vec<Vec<f64>>>,
    kernel: Vec<Vec<Vec<Vec<f64>>>>,
    #[serde(default)]
    bias: Option<Vec<f64>>,
    #[serde(default = "default_stride")]
    stride: usize,
    #[serde(default)]
    padding: usize,
}

pub fn conv2d(_op: ForwardOp, input: &str) -> Result<Value> {
    let p: ConvPayload = parse(input)?;
    let conv = Conv2d::new(Kernel::from_nested(p.kernel)?, p.bias, p.stride, p.padding)?;
    let out = conv.forward(&Volume::from_nested(p.x)?)?;
    Ok(json!({ "output": out.to_nested() }))
}

#[derive(Deserialize)]
struct BatchNormPayload {
    x: Vec<Vec<f64>>,
    gamma: Vec<f64>,
    beta: Vec<f64>,
    #[serde(flatten)]
    config: BatchNormConfig,
}

pub fn batchnorm(_op: ForwardOp, input: &str) -> Result<Value> {
    let p: BatchNormPayload = parse(input)?;
    let bn = BatchNorm1d::new(p.gamma, p.beta, p.config)?;
    Ok(json!({ "output": bn.forward(&p.x)? }))
}

#[derive(Deserialize)]
struct DropoutPayload {
    x: Vec<f64>,
    #[serde(flatten)]
    config: DropoutConfig,
}

pub fn dropout(_op: ForwardOp, input: &str) -> Result<Value> {
    let p: DropoutPayload = parse(input)?;
    let layer = Dropout::from_config(&p.config)?;
    Ok(json!({ "output": layer.forward(&p.x, &mut seeded(p.config.seed)) }))
}

// ---------------------------------------------------------------------------
// linear
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LinearOp {
    Forward,
    Init,
}

#[derive(Deserialize)]
struct LinearForwardPayload {
    x: TensorData,
    weight: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

#[derive(Deserialize)]
struct LinearInitPayload {
    #[serde(default = "default_one")]
    in_features: usize,
    #[serde(default = "default_one")]
    out_features: usize,
    #[serde(default, alias = "random_state")]
    seed: Option<u64>,
}

pub fn linear(op: LinearOp, input: &str) -> Result<Value> {
    match op {
        LinearOp::Forward => {
            let p: LinearForwardPayload = parse(input)?;
            let layer = Linear::new(Matrix::from_data(p.weight)?, p.bias)?;
            let output = match p.x {
                TensorData::Vector(x) => json!(layer.forward(&x)?),
                TensorData::Matrix(batch) => json!(layer.forward_batch(&batch)?),
            };
            Ok(json!({ "output": output }))
        }
        LinearOp::Init => {
            let p: LinearInitPayload = parse(input)?;
            let layer = Linear::kaiming_uniform(p.in_features, p.out_features, &mut seeded(p.seed))?;
            Ok(json!({ "weight": layer.weight.data, "bias": layer.bias }))
        }
    }
}

// ---------------------------------------------------------------------------
// loss
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LossOp {
    /// MSE with optional `reduction`.
    Forward,
    /// MSE gradient.
    Backward,
    /// L1 with optional `reduction`.
    L1Forward,
    /// L1 subgradient.
    L1Backward,
    CrossEntropy,
    /// Cross-entropy gradient w.r.t. the logits.
    CrossEntropyBackward,
}

#[derive(Deserialize)]
struct RegressionLossPayload {
    pred: Vec<f64>,
    target: Vec<f64>,
    #[serde(default)]
    reduction: Reduction,
}

#[derive(Deserialize)]
struct CrossEntropyPayload {
    logits: Vec<f64>,
    target: usize,
}

pub fn loss(op: LossOp, input: &str) -> Result<Value> {
    match op {
        LossOp::Forward => {
            let p: RegressionLossPayload = parse(input)?;
            Ok(json!({ "loss": MseLoss::loss(&p.pred, &p.target, p.reduction)? }))
        }
        LossOp::Backward => {
            let p: RegressionLossPayload = parse(input)?;
            Ok(json!({ "grad": MseLoss::derivative(&p.pred, &p.target)? }))
        }
        LossOp::L1Forward => {
            let p: RegressionLossPayload = parse(input)?;
            Ok(json!({ "loss": MaeLoss::loss(&p.pred, &p.target, p.reduction)? }))
        }
        LossOp::L1Backward => {
            let p: RegressionLossPayload = parse(input)?;
            Ok(json!({ "grad": MaeLoss::derivative(&p.pred, &p.target)? }))
        }
        LossOp::CrossEntropy => {
            let p: CrossEntropyPayload = parse(input)?;
            Ok(json!({ "loss": CrossEntropyLoss::loss(&p.logits, p.target)? }))
        }
        LossOp::CrossEntropyBackward => {
            let p: CrossEntropyPayload = parse(input)?;
            Ok(json!({ "grad": CrossEntropyLoss::derivative(&p.logits, p.target)? }))
        }
    }
}

// ---------------------------------------------------------------------------
// activate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActivateOp {
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
}

#[derive(Deserialize)]
struct VectorPayload {
    x: Vec<f64>,
}

pub fn activate(op: ActivateOp, input: &str) -> Result<Value> {
    let p: VectorPayload = parse(input)?;
    let output = match op {
        ActivateOp::Relu => ActivationFunction::ReLU.apply(&p.x),
        ActivateOp::Sigmoid => ActivationFunction::Sigmoid.apply(&p.x),
        ActivateOp::Tanh => ActivationFunction::Tanh.apply(&p.x),
        ActivateOp::Softmax => softmax(&p.x)?,
    };
    Ok(json!({ "output": output }))
}

// ---------------------------------------------------------------------------
// sequential
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SequentialOp {
    Forward,
    Build,
}

#[derive(Deserialize)]
struct SequentialForwardPayload {
    x: Vec<f64>,
    layers: Vec<LayerSpec>,
}

#[derive(Deserialize)]
struct SequentialBuildPayload {
    architecture: Vec<ArchitectureSpec>,
    #[serde(default, alias = "random_state")]
    seed: Option<u64>,
}

pub fn sequential(op: SequentialOp, input: &str) -> Result<Value> {
    match op {
        SequentialOp::Forward => {
            let p: SequentialForwardPayload = parse(input)?;
            let model = Sequential::from_specs(p.layers)?;
            Ok(json!({ "output": model.forward(&p.x)? }))
        }
        SequentialOp::Build => {
            let p: SequentialBuildPayload = parse(input)?;
            let model = Sequential::build(&p.architecture, &mut seeded(p.seed))?;
            Ok(json!({ "layers": model.to_specs() }))
        }
    }
}

// ---------------------------------------------------------------------------
// adam
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AdamOp {
    Step,
    Init,
}

fn default_t() -> u64 {
    1
}

#[derive(Deserialize)]
struct AdamStepPayload {
    params: Vec<f64>,
    grads: Vec<f64>,
    #[serde(default)]
    m: Option<Vec<f64>>,
    #[serde(default)]
    v: Option<Vec<f64>>,
    #[serde(default = "default_t")]
    t: u64,
    #[serde(flatten)]
    config: AdamConfig,
}

#[derive(Deserialize)]
struct AdamInitPayload {
    #[serde(default = "default_one")]
    n_params: usize,
    #[serde(flatten)]
    config: AdamConfig,
}

pub fn adam(op: AdamOp, input: &str) -> Result<Value> {
    match op {
        AdamOp::Step => {
            let p: AdamStepPayload = parse(input)?;
            let n = p.params.len();
            let m = p.m.unwrap_or_else(|| vec![0.0; n]);
            let v = p.v.unwrap_or_else(|| vec![0.0; n]);
            let state: AdamState = Adam::new(p.config).step(&p.params, &p.grads, &m, &v, p.t)?;
            Ok(serde_json::to_value(state)?)
        }
        AdamOp::Init => {
            let p: AdamInitPayload = parse(input)?;
            let moments = Adam::init(p.n_params);
            Ok(json!({ "m": moments.m, "v": moments.v, "t": moments.t, "lr": p.config.lr }))
        }
    }
}

// ---------------------------------------------------------------------------
// tensor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TensorOp {
    Create,
    Zeros,
    Ones,
    Add,
    Mul,
    Matmul,
    Sum,
    Mean,
}

#[derive(Deserialize)]
struct CreatePayload {
    data: TensorData,
}

fn default_shape() -> Vec<usize> {
    vec![1]
}

#[derive(Deserialize)]
struct ShapePayload {
    #[serde(default = "default_shape")]
    shape: Vec<usize>,
}

#[derive(Deserialize)]
struct BinaryPayload {
    a: TensorData,
    b: TensorData,
}

#[derive(Deserialize)]
struct ReducePayload {
    tensor: TensorData,
}

fn filled(shape: &[usize], ones: bool) -> Result<TensorData> {
    shape.iter()
        .try_fold(1usize, |n, &d| n.checked_mul(d))
        .filter(|&n| n <= isize::MAX as usize / std::mem::size_of::<f64>())
        .ok_or_else(|| KernelError::input(format!("shape {shape:?} is too large")))?;

    match *shape {
        [n] => Ok(TensorData::Vector(vec![if ones { 1.0 } else { 0.0 }; n])),
        [rows, cols] => {
            let m = if ones { Matrix::ones(rows, cols) } else { Matrix::zeros(rows, cols) };
            Ok(TensorData::Matrix(m.data))
        }
        _ => Err(KernelError::input(format!("shape must have 1 or 2 dimensions, got {}", shape.len())).into()),
    }
}

fn elementwise(a: TensorData, b: TensorData, op: TensorOp) -> Result<TensorData> {
    match (a, b) {
        (TensorData::Vector(a), TensorData::Vector(b)) => Ok(TensorData::Vector(match op {
            TensorOp::Add => vector::add(&a, &b)?,
            _ => vector::mul(&a, &b)?,
        })),
        (a, b) => {
            let (a, b) = (a.into_matrix()?, b.into_matrix()?);
            let c = match op {
                TensorOp::Add => a.add(&b)?,
                _ => a.hadamard(&b)?,
            };
            Ok(TensorData::Matrix(c.data))
        }
    }
}

pub fn tensor(op: TensorOp, input: &str) -> Result<Value> {
    match op {
        TensorOp::Create => {
            let p: CreatePayload = parse(input)?;
            let data = p.data.checked()?;
            let shape = data.shape();
            Ok(json!({ "tensor": data, "shape": shape }))
        }
        TensorOp::Zeros | TensorOp::Ones => {
            let p: ShapePayload = parse(input)?;
            Ok(json!({ "tensor": filled(&p.shape, op == TensorOp::Ones)?, "shape": p.shape }))
        }
        TensorOp::Add | TensorOp::Mul => {
            let p: BinaryPayload = parse(input)?;
            Ok(json!({ "tensor": elementwise(p.a, p.b, op)? }))
        }
        TensorOp::Matmul => {
            let p: BinaryPayload = parse(input)?;
            let c = p.a.into_matrix()?.matmul(&p.b.into_matrix()?)?;
            Ok(json!({ "tensor": c.data }))
        }
        TensorOp::Sum => {
            let p: ReducePayload = parse(input)?;
            Ok(json!({ "value": vector::sum(&p.tensor.checked()?.flat_values()) }))
        }
        TensorOp::Mean => {
            let p: ReducePayload = parse(input)?;
            Ok(json!({ "value": vector::mean(&p.tensor.checked()?.flat_values()) }))
        }
    }
}

// ---------------------------------------------------------------------------
// regress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RegressOp {
    Fit,
    Predict,
    Score,
}

#[derive(Deserialize)]
struct FitPayload {
    x: Vec<f64>,
    y: Vec<f64>,
}

#[derive(Deserialize)]
struct PredictPayload {
    x: Vec<f64>,
    coef: f64,
    intercept: f64,
}

#[derive(Deserialize)]
struct ScorePayload {
    x: Vec<f64>,
    y: Vec<f64>,
    coef: f64,
    intercept: f64,
}

pub fn regress(op: RegressOp, input: &str) -> Result<Value> {
    match op {
        RegressOp::Fit => {
            let p: FitPayload = parse(input)?;
            Ok(serde_json::to_value(LinearRegression::fit(&p.x, &p.y)?)?)
        }
        RegressOp::Predict => {
            let p: PredictPayload = parse(input)?;
            let model = LinearRegression { coef: p.coef, intercept: p.intercept };
            Ok(json!({ "predictions": model.predict(&p.x) }))
        }
        RegressOp::Score => {
            let p: ScorePayload = parse(input)?;
            let model = LinearRegression { coef: p.coef, intercept: p.intercept };
            Ok(json!({ "r2": model.score(&p.x, &p.y)? }))
        }
    }
}

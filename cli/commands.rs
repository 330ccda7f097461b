use std::io::Read;

use clap::{Parser, Subcommand};
use log::debug;

use crate::error::Result;
use crate::flat::{self, ActivationArgs, LinearArgs, LinregArgs, MseArgs, TensorArgs};
use crate::payload::{
    self, ActivateOp, AdamOp, ForwardOp, LinearOp, LossOp, RegressOp, SequentialOp, TensorOp,
};

/// Reference neural-network operator kernels.
///
/// Flat commands take named numeric flags and print a `key=value` record.
/// JSON commands read one document from stdin and print one JSON object.
#[derive(Debug, Parser)]
#[command(name = "ferrite-kernels", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 2x2 elementwise add/mul or matmul
    Tensor(TensorArgs),
    /// 2-feature linear layer forward/backward
    Linear(LinearArgs),
    /// 4-sample MSE loss or gradient
    Mse(MseArgs),
    /// Scalar ReLU/Sigmoid/Tanh
    Activation(ActivationArgs),
    /// Two-point least-squares fit or single prediction
    Linreg(LinregArgs),

    /// Conv2D forward (JSON: x, kernel, bias?, stride?, padding?)
    Conv2d {
        #[arg(value_enum)]
        op: ForwardOp,
    },
    /// BatchNorm1d forward (JSON: x, gamma, beta, eps?)
    Batchnorm {
        #[arg(value_enum)]
        op: ForwardOp,
    },
    /// Dropout forward (JSON: x, p?, training?, seed?)
    Dropout {
        #[arg(value_enum)]
        op: ForwardOp,
    },
    /// Linear layer on arbitrary shapes (JSON)
    LinearJson {
        #[arg(value_enum)]
        op: LinearOp,
    },
    /// MSE, L1 and cross-entropy losses (JSON)
    Loss {
        #[arg(value_enum)]
        op: LossOp,
    },
    /// Vector activations (JSON: x)
    Activate {
        #[arg(value_enum)]
        op: ActivateOp,
    },
    /// Layer chains (JSON)
    Sequential {
        #[arg(value_enum)]
        op: SequentialOp,
    },
    /// Single Adam update (JSON)
    Adam {
        #[arg(value_enum)]
        op: AdamOp,
    },
    /// Rank-1/rank-2 tensor helpers (JSON)
    TensorJson {
        #[arg(value_enum)]
        op: TensorOp,
    },
    /// Least-squares regression over arrays (JSON)
    Regress {
        #[arg(value_enum)]
        op: RegressOp,
    },
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

/// Runs one command and returns the complete stdout text.
///
/// Nothing is printed here so a failure never leaves partial output behind.
pub fn run(command: Command) -> Result<String> {
    debug!("dispatching {command:?}");
    let json = match command {
        Command::Tensor(args) => return flat::tensor(&args),
        Command::Linear(args) => return flat::linear(&args),
        Command::Mse(args) => return flat::mse(&args),
        Command::Activation(args) => return flat::activation(&args),
        Command::Linreg(args) => return flat::linreg(&args),

        Command::Conv2d { op } => payload::conv2d(op, &read_stdin()?)?,
        Command::Batchnorm { op } => payload::batchnorm(op, &read_stdin()?)?,
        Command::Dropout { op } => payload::dropout(op, &read_stdin()?)?,
        Command::LinearJson { op } => payload::linear(op, &read_stdin()?)?,
        Command::Loss { op } => payload::loss(op, &read_stdin()?)?,
        Command::Activate { op } => payload::activate(op, &read_stdin()?)?,
        Command::Sequential { op } => payload::sequential(op, &read_stdin()?)?,
        Command::Adam { op } => payload::adam(op, &read_stdin()?)?,
        Command::TensorJson { op } => payload::tensor(op, &read_stdin()?)?,
        Command::Regress { op } => payload::regress(op, &read_stdin()?)?,
    };
    Ok(serde_json::to_string(&payload::finite(json)?)?)
}

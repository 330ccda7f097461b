use std::process::ExitCode;

use ferrite_kernels::KernelError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Kernel(#[from] KernelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Shape errors get their own status so scripts can tell them apart.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Kernel(KernelError::InvalidShape { .. }) => ExitCode::from(2),
            _ => ExitCode::from(1),
        }
    }
}

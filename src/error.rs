use thiserror::Error;

/// Result alias used by every fallible operator in the crate.
pub type Result<T> = std::result::Result<T, KernelError>;

/// Errors raised by the operator kernels.
///
/// Degenerate numeric cases (constant-x regression, zero-variance batch
/// norm, `p = 1` dropout) are resolved analytically and never show up here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    /// Tensor, kernel or parameter dimensions disagree.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    InvalidShape { expected: String, actual: String },

    /// Malformed input: empty data, out-of-range hyper-parameter, unknown name.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl KernelError {
    pub fn shape(expected: impl Into<String>, actual: impl Into<String>) -> KernelError {
        KernelError::InvalidShape { expected: expected.into(), actual: actual.into() }
    }

    pub fn input(msg: impl Into<String>) -> KernelError {
        KernelError::InvalidInput(msg.into())
    }
}

pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod regression;

// Convenience re-exports
pub use error::{KernelError, Result};
pub use math::matrix::Matrix;
pub use math::volume::{Kernel, Volume};
pub use activation::activation::{softmax, ActivationFunction};
pub use layers::{BatchNorm1d, BatchNormConfig, Conv2d, Dropout, DropoutConfig, Linear, LinearGrads};
pub use network::{ArchitectureSpec, LayerSpec, Sequential};
pub use loss::{CrossEntropyLoss, MaeLoss, MseLoss, Reduction};
pub use optim::{Adam, AdamConfig};
pub use regression::LinearRegression;

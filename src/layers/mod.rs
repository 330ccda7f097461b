pub mod batchnorm;
pub mod conv2d;
pub mod dropout;
pub mod linear;

pub use batchnorm::{BatchNorm1d, BatchNormConfig};
pub use conv2d::Conv2d;
pub use dropout::{Dropout, DropoutConfig};
pub use linear::{Linear, LinearGrads};

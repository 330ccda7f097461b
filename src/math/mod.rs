pub mod matrix;
pub mod taylor;
pub mod vector;
pub mod volume;

pub use matrix::Matrix;
pub use volume::{Kernel, Volume};

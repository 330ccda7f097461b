pub mod cross_entropy;
pub mod mae;
pub mod mse;
pub mod reduction;

pub use cross_entropy::CrossEntropyLoss;
pub use mae::MaeLoss;
pub use mse::MseLoss;
pub use reduction::Reduction;

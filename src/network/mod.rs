pub mod network;
pub mod spec;

pub use network::{Sequential, Stage};
pub use spec::{ArchitectureSpec, LayerSpec};

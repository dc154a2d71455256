//! Multilayer perceptron implementing [`Network`](crate::Network).
mod base;
mod config;
pub use base::MlpNetwork;
pub use config::{Activation, MlpNetworkConfig};

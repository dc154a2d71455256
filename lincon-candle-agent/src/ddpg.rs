//! Deep deterministic policy gradient with target networks.
mod base;
mod config;
pub use base::Ddpg;
pub use config::{DdpgConfig, TargetUpdate};

//! Learning algorithms built on [`lincon_core`], with networks implemented with
//! [candle](https://crates.io/crates/candle-core).
//!
//! The linear learners ([`TrueOnlineTdLambda`], [`Opdac`], [`QLearning`]) only use
//! the feature maps and approximators of the core crate. [`Ddpg`] learns with any
//! [`Network`]; [`MlpNetwork`] is the candle implementation.
pub mod ddpg;
pub mod mlp;
pub mod network;
pub mod opdac;
pub mod opt;
pub mod q_learning;
pub mod td_lambda;
pub mod util;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

pub use ddpg::{Ddpg, DdpgConfig, TargetUpdate};
pub use mlp::{Activation, MlpNetwork, MlpNetworkConfig};
pub use network::{Minibatch, Network};
pub use opdac::{Opdac, OpdacConfig};
pub use q_learning::{QLearning, QLearningConfig};
pub use td_lambda::{TrueOnlineTdLambda, TrueOnlineTdLambdaConfig};

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The main GPU device.
    Cuda(usize),
}

impl Default for Device {
    fn default() -> Self {
        Self::Cpu
    }
}

impl TryFrom<Device> for candle_core::Device {
    type Error = anyhow::Error;

    fn try_from(device: Device) -> Result<Self> {
        match device {
            Device::Cpu => Ok(candle_core::Device::Cpu),
            Device::Cuda(n) => Ok(candle_core::Device::new_cuda(n)?),
        }
    }
}

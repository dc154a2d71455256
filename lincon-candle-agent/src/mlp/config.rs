use crate::{opt::OptimizerConfig, Device};
use anyhow::Result;
use candle_core::Tensor;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Activation function of the output layer.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
pub enum Activation {
    /// Identity.
    None,

    /// Hyperbolic tangent.
    Tanh,

    /// Rectified linear unit.
    Relu,
}

impl Activation {
    /// Applies the activation function.
    pub fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        Ok(match self {
            Self::None => xs.clone(),
            Self::Tanh => xs.tanh()?,
            Self::Relu => xs.relu()?,
        })
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`MlpNetwork`](super::MlpNetwork).
pub struct MlpNetworkConfig {
    /// Number of state inputs.
    pub state_dim: usize,

    /// Number of action inputs, `0` for actors.
    pub action_dim: usize,

    /// Units of the hidden layers.
    pub units: Vec<usize>,

    /// Number of outputs.
    pub out_dim: usize,

    /// Activation function of the output layer.
    pub activation_out: Activation,

    /// Optimizer.
    pub opt_config: OptimizerConfig,

    /// Device of the parameters.
    pub device: Device,
}

impl Default for MlpNetworkConfig {
    fn default() -> Self {
        Self {
            state_dim: 1,
            action_dim: 0,
            units: vec![64, 64],
            out_dim: 1,
            activation_out: Activation::None,
            opt_config: OptimizerConfig::default(),
            device: Device::Cpu,
        }
    }
}

impl MlpNetworkConfig {
    /// Configuration of a critic `Q(s, a)` with a single output.
    pub fn critic(state_dim: usize, action_dim: usize, units: Vec<usize>) -> Self {
        Self {
            state_dim,
            action_dim,
            units,
            out_dim: 1,
            ..Self::default()
        }
    }

    /// Configuration of an actor `mu(s)` with one output per action variable.
    pub fn actor(state_dim: usize, out_dim: usize, units: Vec<usize>) -> Self {
        Self {
            state_dim,
            action_dim: 0,
            units,
            out_dim,
            activation_out: Activation::Tanh,
            ..Self::default()
        }
    }

    /// Sets the activation function of the output layer.
    pub fn activation_out(mut self, v: Activation) -> Self {
        self.activation_out = v;
        self
    }

    /// Sets the optimizer.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = v;
        self
    }

    /// Number of inputs.
    pub fn in_dim(&self) -> usize {
        self.state_dim + self.action_dim
    }

    /// Constructs [`MlpNetworkConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`MlpNetworkConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

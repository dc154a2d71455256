//! Configuration of DDPG agent.
use anyhow::Result;
use lincon_core::noise::GaussianNoiseConfig;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// How the target critic follows the online critic.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum TargetUpdate {
    /// `target = tau * online + (1 - tau) * target` after every training step.
    Soft,

    /// The target is replaced by a copy of the online critic after the training steps
    /// taken at experiment steps that are multiples of `period`.
    HardRefresh {
        /// Interval in experiment steps.
        period: usize,
    },
}

/// Configuration of [`Ddpg`](super::Ddpg).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DdpgConfig {
    /// State variables fed to the networks.
    pub input_state: Vec<String>,

    /// Action variables written by the actor, also fed to the critic.
    pub output_action: Vec<String>,

    /// Rate of the soft updates.
    pub tau: f64,

    /// Number of replayed tuples per training step.
    pub minibatch_size: usize,

    /// Exploration noise added to the actor output.
    pub noise: GaussianNoiseConfig,

    /// Update rule of the target critic.
    pub critic_target_update: TargetUpdate,
}

impl Default for DdpgConfig {
    fn default() -> Self {
        Self {
            input_state: vec![],
            output_action: vec![],
            tau: 0.001,
            minibatch_size: 32,
            noise: GaussianNoiseConfig::default(),
            critic_target_update: TargetUpdate::Soft,
        }
    }
}

impl DdpgConfig {
    /// Adds a state variable to the inputs.
    pub fn input_state(mut self, v: impl Into<String>) -> Self {
        self.input_state.push(v.into());
        self
    }

    /// Adds an action variable to the outputs.
    pub fn output_action(mut self, v: impl Into<String>) -> Self {
        self.output_action.push(v.into());
        self
    }

    /// Sets the rate of the soft updates.
    pub fn tau(mut self, v: f64) -> Self {
        self.tau = v;
        self
    }

    /// Sets the minibatch size.
    pub fn minibatch_size(mut self, v: usize) -> Self {
        self.minibatch_size = v;
        self
    }

    /// Sets the exploration noise.
    pub fn noise(mut self, v: GaussianNoiseConfig) -> Self {
        self.noise = v;
        self
    }

    /// Sets the update rule of the target critic.
    pub fn critic_target_update(mut self, v: TargetUpdate) -> Self {
        self.critic_target_update = v;
        self
    }

    /// Constructs [`DdpgConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DdpgConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

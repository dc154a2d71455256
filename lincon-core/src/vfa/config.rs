//! Configuration of the linear approximators.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`LinearVfa`](super::LinearVfa) and the approximators built on it.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct LinearVfaConfig {
    /// Initial value of every weight.
    pub init_value: f64,

    /// Period, in experiment steps, of the updates of the frozen weights.
    ///
    /// `0` disables the frozen weights.
    pub target_update_freq: usize,

    /// Whether the owner of the function uses frozen weights at all.
    pub can_be_frozen: bool,

    /// Seed of the random generator used to break ties.
    pub seed: u64,
}

impl Default for LinearVfaConfig {
    fn default() -> Self {
        Self {
            init_value: 0.0,
            target_update_freq: 0,
            can_be_frozen: false,
            seed: 42,
        }
    }
}

impl LinearVfaConfig {
    /// Sets the initial value of the weights.
    pub fn init_value(mut self, v: f64) -> Self {
        self.init_value = v;
        self
    }

    /// Sets the update period of the frozen weights.
    pub fn target_update_freq(mut self, v: usize) -> Self {
        self.target_update_freq = v;
        self
    }

    /// Enables or disables the frozen weights.
    pub fn can_be_frozen(mut self, v: bool) -> Self {
        self.can_be_frozen = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Constructs [`LinearVfaConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`LinearVfaConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

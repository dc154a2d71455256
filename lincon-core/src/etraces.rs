//! Eligibility traces.
use crate::features::{DuplicateMode, FeatureList};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`ETraces`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ETracesConfig {
    /// Decay factor of the traces.
    pub lambda: f64,

    /// Traces below this value are dropped.
    pub threshold: f64,

    /// Replacing traces: activations overwrite the trace instead of accumulating.
    pub replace: bool,
}

impl Default for ETracesConfig {
    fn default() -> Self {
        Self {
            lambda: 0.9,
            threshold: 0.001,
            replace: false,
        }
    }
}

impl ETracesConfig {
    /// Sets lambda.
    pub fn lambda(mut self, v: f64) -> Self {
        self.lambda = v;
        self
    }

    /// Sets the threshold.
    pub fn threshold(mut self, v: f64) -> Self {
        self.threshold = v;
        self
    }

    /// Sets replacing traces.
    pub fn replace(mut self, v: bool) -> Self {
        self.replace = v;
        self
    }

    /// Constructs [`ETracesConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ETracesConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Decaying memory of recently active features, in the feature space of the function
/// it belongs to.
#[derive(Debug, Clone)]
pub struct ETraces {
    traces: FeatureList,
    lambda: f64,
    threshold: f64,
}

impl ETraces {
    /// Creates empty traces.
    pub fn new(config: &ETracesConfig) -> Self {
        let mode = if config.replace {
            DuplicateMode::Replace
        } else {
            DuplicateMode::Merge
        };

        Self {
            traces: FeatureList::new(mode),
            lambda: config.lambda,
            threshold: config.threshold,
        }
    }

    /// Decay factor of the traces.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Decays every trace by `factor * lambda`, usually with `factor = gamma`.
    ///
    /// With `lambda == 0` the traces are cleared.
    pub fn update(&mut self, factor: f64) {
        if self.lambda != 0.0 {
            self.traces.mult(factor * self.lambda);
            self.traces.apply_threshold(self.threshold);
        } else {
            self.traces.clear();
        }
    }

    /// Adds the activations of `features` scaled by `factor`.
    pub fn add_feature_list(&mut self, features: &FeatureList, factor: f64) {
        self.traces.add_feature_list(features, factor);
    }

    /// Inner product of the traces and `features`.
    pub fn inner_product(&self, features: &FeatureList) -> f64 {
        self.traces.inner_product(features)
    }

    /// The traces as a feature list.
    pub fn features(&self) -> &FeatureList {
        &self.traces
    }

    /// Removes every trace.
    pub fn clear(&mut self) {
        self.traces.clear();
    }
}

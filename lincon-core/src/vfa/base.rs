//! Weights of a linear function.
use super::LinearVfaConfig;
use crate::{
    context::LearningContext,
    error::LinconError,
    features::{DuplicateMode, FeatureList},
};
use anyhow::Result;
use log::debug;

/// Weights of a linear function `f(x) = w · phi(x)` over a window of the feature space.
///
/// The window `[min_index, min_index + num_weights)` lets several functions share one
/// feature space. Feature entries outside the window are ignored.
///
/// When freezing is enabled, updates go to the online weights immediately and are
/// logged as pending deltas. Every `target_update_freq` experiment steps, outside of
/// experience replay, the pending deltas are applied to the frozen weights.
#[derive(Debug, Clone)]
pub struct LinearVfa {
    weights: Vec<f64>,
    frozen_weights: Option<Vec<f64>>,
    pending: FeatureList,
    min_index: usize,
    saturation: Option<(f64, f64)>,
    target_update_freq: usize,
}

impl LinearVfa {
    /// Creates `num_weights` weights.
    pub fn new(num_weights: usize, config: &LinearVfaConfig) -> Self {
        let frozen_weights = if config.can_be_frozen {
            Some(vec![config.init_value; num_weights])
        } else {
            None
        };

        Self {
            weights: vec![config.init_value; num_weights],
            frozen_weights,
            pending: FeatureList::new(DuplicateMode::Allow),
            min_index: 0,
            saturation: None,
            target_update_freq: config.target_update_freq,
        }
    }

    /// Number of weights.
    pub fn num_weights(&self) -> usize {
        self.weights.len()
    }

    /// First feature index of the window.
    pub fn min_index(&self) -> usize {
        self.min_index
    }

    /// One past the last feature index of the window.
    pub fn max_index(&self) -> usize {
        self.min_index + self.weights.len()
    }

    /// Moves the window to start at `offset`.
    pub fn set_index_offset(&mut self, offset: usize) {
        self.min_index = offset;
    }

    /// Keeps every weight within `[min, max]` on [`LinearVfa::add`].
    pub fn saturate_output(&mut self, min: f64, max: f64) {
        self.saturation = Some((min, max));
    }

    /// Online weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Frozen weights, if the function can be frozen.
    pub fn frozen_weights(&self) -> Option<&[f64]> {
        self.frozen_weights.as_deref()
    }

    /// Returns `true` if reads with `use_frozen` go to the frozen weights.
    pub fn is_freezing(&self) -> bool {
        self.frozen_weights.is_some() && self.target_update_freq != 0
    }

    fn local_index(&self, index: usize) -> Option<usize> {
        if index >= self.min_index && index < self.max_index() {
            Some(index - self.min_index)
        } else {
            None
        }
    }

    /// Inner product of `features` and the weights.
    ///
    /// The frozen weights are read only if `use_frozen` is set and freezing is enabled.
    pub fn get(&self, features: &FeatureList, use_frozen: bool) -> f64 {
        let weights = match &self.frozen_weights {
            Some(frozen) if use_frozen && self.target_update_freq != 0 => frozen,
            _ => &self.weights,
        };

        features
            .iter()
            .filter_map(|f| self.local_index(f.index).map(|i| weights[i] * f.factor))
            .sum()
    }

    /// Adds `alpha * factor` to the weight of every feature in the window.
    ///
    /// With saturation the new weight is clamped to the output range and the applied
    /// increment is derived from it.
    pub fn add(&mut self, features: &FeatureList, alpha: f64, ctx: &LearningContext) {
        let freezing = self.is_freezing();

        for f in features.iter() {
            let i = match self.local_index(f.index) {
                Some(i) => i,
                None => continue,
            };
            let w = self.weights[i];
            let inc = match self.saturation {
                Some((min, max)) => {
                    let new = (w + alpha * f.factor).max(min).min(max);
                    self.weights[i] = new;
                    new - w
                }
                None => {
                    self.weights[i] += alpha * f.factor;
                    alpha * f.factor
                }
            };
            if freezing {
                self.pending.add(i, inc);
            }
        }

        if freezing
            && !ctx.replaying_experience
            && ctx.experiment_step % self.target_update_freq == 0
        {
            self.flush_pending();
        }
    }

    fn flush_pending(&mut self) {
        if let Some(frozen) = self.frozen_weights.as_mut() {
            debug!(
                "Applying {} pending updates to the frozen weights",
                self.pending.len()
            );
            for f in self.pending.iter() {
                frozen[f.index] += f.factor;
            }
        }
        self.pending.clear();
    }

    /// Number of updates not yet applied to the frozen weights.
    pub fn num_pending_updates(&self) -> usize {
        self.pending.len()
    }

    /// Sets the online weight of a feature in the window.
    pub fn set(&mut self, feature: usize, value: f64) -> Result<()> {
        match self.local_index(feature) {
            Some(i) => {
                self.weights[i] = value;
                Ok(())
            }
            None => Err(LinconError::FeatureIndexOutOfRange {
                index: feature,
                min: self.min_index,
                max: self.max_index(),
            }
            .into()),
        }
    }
}

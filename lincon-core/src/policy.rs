//! Deterministic policies with Gaussian exploration noise.
use crate::{
    context::LearningContext,
    feature_map::FeatureMapConfig,
    features::FeatureList,
    named_var::{Action, State},
    noise::{GaussianNoise, GaussianNoiseConfig},
    vfa::{LinearStateVfa, LinearVfaConfig},
};
use anyhow::Result;
use log::{info, trace};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Lower bound of the deviation used in the parameter gradient.
const MIN_SIGMA: f64 = 0.0000001;

/// Configuration of [`DeterministicPolicyGaussianNoise`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DeterministicPolicyConfig {
    /// Action variable written by the policy.
    pub output_action: String,

    /// Weights of the deterministic output.
    pub vfa: LinearVfaConfig,

    /// State features of the deterministic output.
    pub features: FeatureMapConfig,

    /// Exploration noise.
    pub noise: GaussianNoiseConfig,
}

impl Default for DeterministicPolicyConfig {
    fn default() -> Self {
        Self {
            output_action: String::new(),
            vfa: LinearVfaConfig::default(),
            features: FeatureMapConfig::default(),
            noise: GaussianNoiseConfig::default(),
        }
    }
}

impl DeterministicPolicyConfig {
    /// Sets the output action variable.
    pub fn output_action(mut self, v: impl Into<String>) -> Self {
        self.output_action = v.into();
        self
    }

    /// Sets the configuration of the weights.
    pub fn vfa(mut self, v: LinearVfaConfig) -> Self {
        self.vfa = v;
        self
    }

    /// Sets the feature map.
    pub fn features(mut self, v: FeatureMapConfig) -> Self {
        self.features = v;
        self
    }

    /// Sets the exploration noise.
    pub fn noise(mut self, v: GaussianNoiseConfig) -> Self {
        self.noise = v;
        self
    }

    /// Constructs [`DeterministicPolicyConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DeterministicPolicyConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// A linear deterministic output `mu(s)` for one action variable, plus Gaussian
/// exploration noise in training episodes.
///
/// The weights are saturated to the range of the output action.
#[derive(Debug, Clone)]
pub struct DeterministicPolicyGaussianNoise {
    output_action: String,
    output_index: usize,
    vfa: LinearStateVfa,
    noise: GaussianNoise,
    last_noise: f64,
}

impl DeterministicPolicyGaussianNoise {
    /// Builds the policy.
    pub fn build(config: &DeterministicPolicyConfig, state: &State, action: &Action) -> Result<Self> {
        let output_index = action.index_of(&config.output_action)?;
        let properties = action.properties(&config.output_action)?;
        let mut vfa = LinearStateVfa::build(&config.vfa, &config.features, state, action)?;
        vfa.linear_mut().saturate_output(properties.min, properties.max);
        info!(
            "Deterministic policy for {} in [{}, {}]",
            config.output_action, properties.min, properties.max
        );

        Ok(Self {
            output_action: config.output_action.clone(),
            output_index,
            vfa,
            noise: GaussianNoise::build(&config.noise)?,
            last_noise: 0.0,
        })
    }

    /// Name of the output action variable.
    pub fn output_action(&self) -> &str {
        &self.output_action
    }

    /// The function of the deterministic output.
    pub fn vfa(&self) -> &LinearStateVfa {
        &self.vfa
    }

    /// The function of the deterministic output.
    pub fn vfa_mut(&mut self) -> &mut LinearStateVfa {
        &mut self.vfa
    }

    /// Noise added by the last call of [`DeterministicPolicyGaussianNoise::select_action`].
    pub fn last_noise(&self) -> f64 {
        self.last_noise
    }

    /// Writes `mu(s) + noise` into the output action.
    ///
    /// Returns the probability of the noise sample, or 1 in evaluation episodes, where
    /// no noise is added.
    pub fn select_action(&mut self, s: &State, a: &mut Action, ctx: &LearningContext) -> Result<f64> {
        self.last_noise = if ctx.evaluation_episode {
            0.0
        } else {
            self.noise.sample(ctx)
        };
        let output = self.vfa.evaluate(s)?;
        a.set_at(self.output_index, output + self.last_noise);
        trace!("mu(s) = {}, noise = {}", output, self.last_noise);

        if ctx.evaluation_episode {
            Ok(1.0)
        } else {
            Ok(self.noise.sample_probability(self.last_noise, ctx))
        }
    }

    /// Gradient of `log pi(a|s)` with respect to the weights,
    /// `phi(s) * unscale(a - mu(s)) / sigma^2`.
    pub fn parameter_gradient(
        &mut self,
        s: &State,
        a: &Action,
        out: &mut FeatureList,
        ctx: &LearningContext,
    ) -> Result<()> {
        self.vfa.get_features(s, out)?;
        let sigma = self.noise.variance().max(MIN_SIGMA);
        let noise = a.get_at(self.output_index) - self.vfa.get(out, false);
        let unscaled_noise = self.noise.unscale(noise, ctx);
        out.mult(unscaled_noise / (sigma * sigma));
        Ok(())
    }

    /// State features of the deterministic output.
    pub fn get_features(&mut self, s: &State, out: &mut FeatureList) -> Result<()> {
        self.vfa.get_features(s, out)
    }

    /// Adds `factor * features` to the weights.
    pub fn add_features(&mut self, features: &FeatureList, factor: f64, ctx: &LearningContext) {
        self.vfa.add(features, factor, ctx);
    }

    /// `mu` for the given state features.
    pub fn deterministic_output(&self, features: &FeatureList) -> f64 {
        self.vfa.get(features, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        feature_map::FeatureMapKind,
        named_var::{NamedVarSet, VarProperties},
        schedule::Schedule,
    };

    fn policy(sigma: f64) -> Result<(DeterministicPolicyGaussianNoise, State, Action)> {
        let state = NamedVarSet::new(vec![VarProperties::new("x", 0.0, 1.0)]);
        let action = NamedVarSet::new(vec![VarProperties::new("u", -1.0, 1.0)]);
        let config = DeterministicPolicyConfig::default()
            .output_action("u")
            .features(
                FeatureMapConfig::default()
                    .kind(FeatureMapKind::TileCoding {
                        num_tiles: 1,
                        tile_offset: 0.0,
                    })
                    .state_var("x", 2),
            )
            .noise(
                GaussianNoiseConfig::default()
                    .sigma(sigma)
                    .scale(Schedule::Constant(1.0)),
            );
        let pi = DeterministicPolicyGaussianNoise::build(&config, &state, &action)?;
        Ok((pi, state, action))
    }

    #[test]
    fn test_evaluation_has_no_noise() -> Result<()> {
        let (mut pi, s, mut a) = policy(0.5)?;
        pi.vfa_mut().linear_mut().set(0, 0.25)?;
        let ctx = LearningContext::default().evaluation_episode(true);

        let prob = pi.select_action(&s, &mut a, &ctx)?;
        assert_eq!(prob, 1.0);
        assert_eq!(a.get("u")?, 0.25);
        assert_eq!(pi.last_noise(), 0.0);
        Ok(())
    }

    #[test]
    fn test_weights_saturate_to_action_range() -> Result<()> {
        let (mut pi, s, _) = policy(0.5)?;
        let ctx = LearningContext::default();
        let mut features = FeatureList::default();
        pi.get_features(&s, &mut features)?;
        for _ in 0..10 {
            pi.add_features(&features, 0.7, &ctx);
        }
        assert_eq!(pi.deterministic_output(&features), 1.0);
        Ok(())
    }

    #[test]
    fn test_parameter_gradient() -> Result<()> {
        let (mut pi, s, mut a) = policy(0.5)?;
        pi.vfa_mut().linear_mut().set(0, 0.2)?;
        a.set("u", 0.7)?;
        let mut grad = FeatureList::default();
        pi.parameter_gradient(&s, &a, &mut grad, &LearningContext::default())?;

        // (0.7 - 0.2) / 0.5^2
        assert_eq!(grad.len(), 1);
        assert!((grad.get_factor(0) - 2.0).abs() < 1e-12);
        Ok(())
    }
}

//! Q-learning with a linear action-value function.
use anyhow::Result;
use lincon_core::{
    record::Record, Action, FeatureList, FeatureMapConfig, Learner, LearningContext,
    LinearStateActionVfa, LinearVfaConfig, Schedule, State, Transition,
};
use log::{info, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`QLearning`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct QLearningConfig {
    /// Weights of `Q(s, a)`.
    pub q: LinearVfaConfig,

    /// State features.
    pub state_features: FeatureMapConfig,

    /// Action features. Greedy actions are decoded from them.
    pub action_features: FeatureMapConfig,

    /// Learning gain.
    pub alpha: Schedule,

    /// Probability of a random action in training episodes.
    pub epsilon: Schedule,

    /// Seed of the exploration.
    pub seed: u64,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            q: LinearVfaConfig::default(),
            state_features: FeatureMapConfig::default(),
            action_features: FeatureMapConfig::default(),
            alpha: Schedule::Constant(0.1),
            epsilon: Schedule::Constant(0.1),
            seed: 42,
        }
    }
}

impl QLearningConfig {
    /// Sets the weights of `Q(s, a)`.
    pub fn q(mut self, v: LinearVfaConfig) -> Self {
        self.q = v;
        self
    }

    /// Sets the state features.
    pub fn state_features(mut self, v: FeatureMapConfig) -> Self {
        self.state_features = v;
        self
    }

    /// Sets the action features.
    pub fn action_features(mut self, v: FeatureMapConfig) -> Self {
        self.action_features = v;
        self
    }

    /// Sets the learning gain.
    pub fn alpha(mut self, v: impl Into<Schedule>) -> Self {
        self.alpha = v.into();
        self
    }

    /// Sets the exploration rate.
    pub fn epsilon(mut self, v: impl Into<Schedule>) -> Self {
        self.epsilon = v.into();
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Constructs [`QLearningConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`QLearningConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Epsilon-greedy Q-learning.
///
/// The bootstrapped value `max_a' Q(s', a')` is read from the frozen weights when
/// `Q` is configured with freezing, from the online weights otherwise.
#[derive(Debug, Clone)]
pub struct QLearning {
    q: LinearStateActionVfa,
    alpha: Schedule,
    epsilon: Schedule,
    features: FeatureList,
    rng: StdRng,
}

impl QLearning {
    /// Builds the learner.
    pub fn build(config: &QLearningConfig, state: &State, action: &Action) -> Result<Self> {
        let q = LinearStateActionVfa::build(
            &config.q,
            &config.state_features,
            &config.action_features,
            state,
            action,
        )?;
        info!("Q-learning over {} actions", q.num_action_weights());

        Ok(Self {
            q,
            alpha: config.alpha.clone(),
            epsilon: config.epsilon.clone(),
            features: FeatureList::default(),
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    /// The action-value function.
    pub fn q(&self) -> &LinearStateActionVfa {
        &self.q
    }

    /// The action-value function.
    pub fn q_mut(&mut self) -> &mut LinearStateActionVfa {
        &mut self.q
    }
}

impl Learner for QLearning {
    /// Returns the probability of the selected action under the epsilon-greedy
    /// policy.
    fn select_action(&mut self, s: &State, a: &mut Action, ctx: &LearningContext) -> Result<f64> {
        let epsilon = if ctx.evaluation_episode {
            0.0
        } else {
            self.epsilon.get(ctx)
        };
        let n = self.q.num_action_weights();

        if self.rng.gen::<f64>() < epsilon {
            let j = self.rng.gen_range(0..n);
            let feature = self.q.linear().min_index() + j * self.q.num_state_weights();
            self.q.get_feature_state_action(feature, None, Some(a));
            Ok(epsilon / n as f64)
        } else {
            self.q.arg_max(s, a, true)?;
            Ok(1.0 - epsilon + epsilon / n as f64)
        }
    }

    fn update_with_record(
        &mut self,
        transition: &Transition,
        ctx: &LearningContext,
    ) -> Result<Record> {
        let alpha = self.alpha.get(ctx);
        let q_s_p = self.q.max(transition.s_p, true)?;
        let q_s = self.q.evaluate(transition.s, transition.a)?;
        let td = transition.r + ctx.gamma * q_s_p - q_s;

        self.q
            .get_features(Some(transition.s), Some(transition.a), &mut self.features)?;
        self.q.add(&self.features, alpha * td, ctx);
        trace!("td = {}", td);
        Ok(Record::from_scalar("td_error", td))
    }
}

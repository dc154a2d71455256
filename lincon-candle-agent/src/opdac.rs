//! Off-policy deterministic actor-critic (OPDAC) of Silver et al. (2014).
use anyhow::Result;
use lincon_core::{
    policy::{DeterministicPolicyConfig, DeterministicPolicyGaussianNoise},
    record::Record,
    Action, FeatureList, FeatureMapConfig, Learner, LearningContext, LinearStateActionVfa,
    LinearVfaConfig, Schedule, State, Transition,
};
use log::{info, trace};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Opdac`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct OpdacConfig {
    /// Weights of the critic `Q(s, a)`.
    pub q: LinearVfaConfig,

    /// State features of the critic.
    pub q_state_features: FeatureMapConfig,

    /// Action features of the critic.
    pub q_action_features: FeatureMapConfig,

    /// Learning gain of the critic.
    pub alpha_w: Schedule,

    /// Learning gain of the actor.
    pub alpha_theta: Schedule,

    /// One deterministic policy per action variable.
    pub policies: Vec<DeterministicPolicyConfig>,
}

impl Default for OpdacConfig {
    fn default() -> Self {
        Self {
            q: LinearVfaConfig::default(),
            q_state_features: FeatureMapConfig::default(),
            q_action_features: FeatureMapConfig::default(),
            alpha_w: Schedule::Constant(0.1),
            alpha_theta: Schedule::Constant(0.01),
            policies: vec![],
        }
    }
}

impl OpdacConfig {
    /// Sets the weights of the critic.
    pub fn q(mut self, v: LinearVfaConfig) -> Self {
        self.q = v;
        self
    }

    /// Sets the state features of the critic.
    pub fn q_state_features(mut self, v: FeatureMapConfig) -> Self {
        self.q_state_features = v;
        self
    }

    /// Sets the action features of the critic.
    pub fn q_action_features(mut self, v: FeatureMapConfig) -> Self {
        self.q_action_features = v;
        self
    }

    /// Sets the learning gain of the critic.
    pub fn alpha_w(mut self, v: impl Into<Schedule>) -> Self {
        self.alpha_w = v.into();
        self
    }

    /// Sets the learning gain of the actor.
    pub fn alpha_theta(mut self, v: impl Into<Schedule>) -> Self {
        self.alpha_theta = v.into();
        self
    }

    /// Adds a policy.
    pub fn policy(mut self, v: DeterministicPolicyConfig) -> Self {
        self.policies.push(v);
        self
    }

    /// Constructs [`OpdacConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`OpdacConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Off-policy deterministic actor-critic with a linear critic `Q(s, a)` and one
/// linear deterministic policy per action variable.
///
/// The critic is updated first, with the TD error of the greedy action
/// `a' = mu(s')`. The actor step assumes the critic is compatible with the policies,
/// so the action gradient of `Q` is replaced by the inner product of the parameter
/// gradient of each policy with itself.
#[derive(Debug, Clone)]
pub struct Opdac {
    q: LinearStateActionVfa,
    alpha_w: Schedule,
    alpha_theta: Schedule,
    policies: Vec<DeterministicPolicyGaussianNoise>,
    s_features: FeatureList,
    grad_mu: FeatureList,
    aux: FeatureList,
    a_p: Action,
}

impl Opdac {
    /// Builds the actor-critic.
    pub fn build(config: &OpdacConfig, state: &State, action: &Action) -> Result<Self> {
        let q = LinearStateActionVfa::build(
            &config.q,
            &config.q_state_features,
            &config.q_action_features,
            state,
            action,
        )?;
        let policies = config
            .policies
            .iter()
            .map(|c| DeterministicPolicyGaussianNoise::build(c, state, action))
            .collect::<Result<Vec<_>>>()?;
        info!("OPDAC with {} policies", policies.len());

        Ok(Self {
            q,
            alpha_w: config.alpha_w.clone(),
            alpha_theta: config.alpha_theta.clone(),
            policies,
            s_features: FeatureList::default(),
            grad_mu: FeatureList::default(),
            aux: FeatureList::default(),
            a_p: action.clone(),
        })
    }

    /// The critic.
    pub fn q(&self) -> &LinearStateActionVfa {
        &self.q
    }

    /// The critic.
    pub fn q_mut(&mut self) -> &mut LinearStateActionVfa {
        &mut self.q
    }

    /// The policies.
    pub fn policies(&self) -> &[DeterministicPolicyGaussianNoise] {
        &self.policies
    }

    /// The policies.
    pub fn policies_mut(&mut self) -> &mut [DeterministicPolicyGaussianNoise] {
        &mut self.policies
    }

    fn update_value(&mut self, transition: &Transition, ctx: &LearningContext) -> Result<f64> {
        let alpha_w = self.alpha_w.get(ctx);

        // a' = mu(s')
        self.a_p.clone_from(transition.a);
        for pi in self.policies.iter_mut() {
            pi.get_features(transition.s_p, &mut self.aux)?;
            let mu = pi.deterministic_output(&self.aux);
            self.a_p.set(pi.output_action(), mu)?;
        }

        let q_s_p = self.q.evaluate(transition.s_p, &self.a_p)?;
        let q_s = self.q.evaluate(transition.s, transition.a)?;
        let td = transition.r + ctx.gamma * q_s_p - q_s;

        self.q
            .get_features(Some(transition.s), Some(transition.a), &mut self.s_features)?;
        self.q.add(&self.s_features, alpha_w * td, ctx);
        Ok(td)
    }

    fn update_policy(&mut self, transition: &Transition, ctx: &LearningContext) -> Result<()> {
        let alpha_theta = self.alpha_theta.get(ctx);

        for pi in self.policies.iter_mut() {
            pi.parameter_gradient(transition.s, transition.a, &mut self.grad_mu, ctx)?;
            let grad_prod = self.grad_mu.inner_product(&self.grad_mu);
            pi.add_features(&self.s_features, grad_prod * alpha_theta, ctx);
        }
        Ok(())
    }
}

impl Learner for Opdac {
    fn select_action(&mut self, s: &State, a: &mut Action, ctx: &LearningContext) -> Result<f64> {
        let mut prob = 1.0;
        for pi in self.policies.iter_mut() {
            prob *= pi.select_action(s, a, ctx)?;
        }
        Ok(prob)
    }

    fn update_with_record(
        &mut self,
        transition: &Transition,
        ctx: &LearningContext,
    ) -> Result<Record> {
        let td = self.update_value(transition, ctx)?;
        self.update_policy(transition, ctx)?;
        trace!("td = {}", td);
        Ok(Record::from_scalar("td_error", td))
    }
}

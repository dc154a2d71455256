//! True-online TD(lambda) critic.
use anyhow::Result;
use lincon_core::{
    Action, Critic, ETraces, ETracesConfig, FeatureList, FeatureMapConfig, LearningContext,
    LinearStateVfa, LinearVfaConfig, Schedule, State, Transition,
};
use log::{info, trace};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`TrueOnlineTdLambda`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrueOnlineTdLambdaConfig {
    /// Learning gain.
    pub alpha: Schedule,

    /// Eligibility traces.
    pub e_traces: ETracesConfig,

    /// Weights of the value function.
    pub vfa: LinearVfaConfig,

    /// State features of the value function.
    pub features: FeatureMapConfig,
}

impl Default for TrueOnlineTdLambdaConfig {
    fn default() -> Self {
        Self {
            alpha: Schedule::Constant(0.1),
            e_traces: ETracesConfig::default(),
            vfa: LinearVfaConfig::default(),
            features: FeatureMapConfig::default(),
        }
    }
}

impl TrueOnlineTdLambdaConfig {
    /// Sets the learning gain.
    pub fn alpha(mut self, v: impl Into<Schedule>) -> Self {
        self.alpha = v.into();
        self
    }

    /// Sets the eligibility traces.
    pub fn e_traces(mut self, v: ETracesConfig) -> Self {
        self.e_traces = v;
        self
    }

    /// Sets the weights of the value function.
    pub fn vfa(mut self, v: LinearVfaConfig) -> Self {
        self.vfa = v;
        self
    }

    /// Sets the feature map.
    pub fn features(mut self, v: FeatureMapConfig) -> Self {
        self.features = v;
        self
    }

    /// Constructs [`TrueOnlineTdLambdaConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrueOnlineTdLambdaConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Critic learning `V(s)` with the true-online TD(lambda) rule of van Seijen and
/// Sutton (2014).
///
/// Each update:
///
/// ```text
/// td = r + gamma * V(s') - v_s
/// e  = gamma * lambda * e + alpha * (1 - gamma * lambda * e^T phi(s)) * phi(s)
/// w  = w + td * e + alpha * (v_s - w_old^T phi(s)) * phi(s)
/// v_s = V(s')
/// ```
///
/// `v_s` is read from the function on the first step of an episode.
#[derive(Debug, Clone)]
pub struct TrueOnlineTdLambda {
    v: LinearStateVfa,
    e: ETraces,
    alpha: Schedule,
    aux: FeatureList,
    v_s: f64,
}

impl TrueOnlineTdLambda {
    /// Builds the critic.
    pub fn build(config: &TrueOnlineTdLambdaConfig, state: &State, action: &Action) -> Result<Self> {
        let v = LinearStateVfa::build(&config.vfa, &config.features, state, action)?;
        info!(
            "True-online TD(lambda) critic, lambda = {}",
            config.e_traces.lambda
        );

        Ok(Self {
            v,
            e: ETraces::new(&config.e_traces),
            alpha: config.alpha.clone(),
            aux: FeatureList::default(),
            v_s: 0.0,
        })
    }

    /// The learned value function.
    pub fn value_function(&self) -> &LinearStateVfa {
        &self.v
    }

    /// The learned value function.
    pub fn value_function_mut(&mut self) -> &mut LinearStateVfa {
        &mut self.v
    }

    /// Current eligibility traces.
    pub fn e_traces(&self) -> &ETraces {
        &self.e
    }
}

impl Critic for TrueOnlineTdLambda {
    fn update(&mut self, transition: &Transition, ctx: &LearningContext) -> Result<f64> {
        let alpha = self.alpha.get(ctx);
        if alpha == 0.0 {
            return Ok(0.0);
        }

        if ctx.first_step {
            self.e.clear();
            self.v.get_features(transition.s, &mut self.aux)?;
            self.v_s = self.v.get(&self.aux, false);
        }

        self.v.get_features(transition.s_p, &mut self.aux)?;
        let v_s_p = self.v.get(&self.aux, false);
        let gamma = ctx.gamma;
        let td = transition.r + gamma * v_s_p - self.v_s;

        // aux <- phi(s)
        self.v.get_features(transition.s, &mut self.aux)?;
        let e_t_phi_s = self.e.inner_product(&self.aux);
        self.e.update(gamma);
        let lambda = self.e.lambda();
        self.e
            .add_feature_list(&self.aux, alpha * (1.0 - gamma * lambda * e_t_phi_s));

        let theta_t_phi_s = self.v.get(&self.aux, false);
        self.v.add(self.e.features(), td, ctx);
        self.v.add(&self.aux, alpha * (self.v_s - theta_t_phi_s), ctx);

        trace!("td = {}, v(s) = {}, v(s') = {}", td, self.v_s, v_s_p);
        self.v_s = v_s_p;
        Ok(td)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lincon_core::{FeatureMapKind, NamedVarSet, VarProperties};
    use tempdir::TempDir;
    use test_log::test;

    fn critic(alpha: f64, lambda: f64) -> Result<(TrueOnlineTdLambda, State, Action)> {
        let state = NamedVarSet::new(vec![VarProperties::new("x", 0.0, 1.0)]);
        let action = NamedVarSet::new(vec![]);
        let config = TrueOnlineTdLambdaConfig::default()
            .alpha(alpha)
            .e_traces(ETracesConfig::default().lambda(lambda))
            .features(
                FeatureMapConfig::default()
                    .kind(FeatureMapKind::TileCoding {
                        num_tiles: 1,
                        tile_offset: 0.0,
                    })
                    .state_var("x", 1),
            );
        let critic = TrueOnlineTdLambda::build(&config, &state, &action)?;
        Ok((critic, state, action))
    }

    #[test]
    fn test_td0_single_feature() -> Result<()> {
        let alpha = 0.1;
        let (mut critic, s, a) = critic(alpha, 0.0)?;
        let ctx = LearningContext::default().gamma(0.9).first_step(true);

        let td = critic.update(&Transition::new(&s, &a, &s, 1.0), &ctx)?;
        assert_eq!(td, 1.0);
        let w = critic.value_function().linear().weights()[0];
        assert!((w - alpha * td).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_zero_alpha_is_a_no_op() -> Result<()> {
        let (mut critic, s, a) = critic(0.0, 0.9)?;
        let ctx = LearningContext::default();
        let td = critic.update(&Transition::new(&s, &a, &s, 5.0), &ctx)?;
        assert_eq!(td, 0.0);
        assert_eq!(critic.value_function().linear().weights()[0], 0.0);
        assert!(critic.e_traces().features().is_empty());
        Ok(())
    }

    #[test]
    fn test_converges_to_discounted_return() -> Result<()> {
        // a single state with reward 1 has value 1 / (1 - gamma)
        let (mut critic, s, a) = critic(0.1, 0.5)?;
        let mut ctx = LearningContext::default().gamma(0.5);
        for _ in 0..500 {
            critic.update(&Transition::new(&s, &a, &s, 1.0), &ctx)?;
            ctx.advance();
        }
        let v = critic.value_function_mut().evaluate(&s)?;
        assert!((v - 2.0).abs() < 1e-3, "v = {}", v);
        Ok(())
    }

    #[test]
    fn test_serde_config() -> Result<()> {
        let config = TrueOnlineTdLambdaConfig::default().alpha(Schedule::SimpleLinearDecay {
            start: 0.1,
            end: 0.01,
        });
        let dir = TempDir::new("td_lambda")?;
        let path = dir.path().join("critic.yaml");
        config.save(&path)?;
        assert_eq!(TrueOnlineTdLambdaConfig::load(&path)?, config);
        Ok(())
    }
}

//! DDPG agent.
use super::{DdpgConfig, TargetUpdate};
use crate::network::{Minibatch, Network};
use anyhow::{Context, Result};
use lincon_core::{
    error::LinconError,
    noise::GaussianNoise,
    record::{Record, RecordValue},
    Action, Learner, LearningContext, State, Transition,
};
use log::{debug, info, trace};

/// DDPG agent of Lillicrap et al. (2016) on top of any [`Network`].
///
/// Training is driven by the experience replay of the caller. While
/// [`LearningContext::replaying_experience`] is set, each transition adds a tuple to
/// the critic and actor minibatches:
///
/// * critic: `(s, a, r + gamma * Q'(s', mu'(s')))`,
/// * actor: `(s, mu'(s), -grad_a Q'(s, mu'(s)))`,
///
/// where `Q'` and `mu'` are the target networks. The next direct transition trains
/// the online networks on the full minibatches and updates the targets.
pub struct Ddpg<N: Network> {
    input_state: Vec<usize>,
    output_action: Vec<usize>,
    critic: N,
    critic_target: N,
    actor: N,
    actor_target: N,
    critic_minibatch: Minibatch,
    actor_minibatch: Minibatch,
    critic_target_update: TargetUpdate,
    noise: GaussianNoise,
    a_p: Action,
}

impl<N: Network> Ddpg<N> {
    /// Builds the agent. The target networks are copies of `critic` and `actor`.
    pub fn build(
        config: &DdpgConfig,
        critic: N,
        actor: N,
        state: &State,
        action: &Action,
    ) -> Result<Self> {
        if config.minibatch_size == 0 {
            return Err(LinconError::ExperienceReplayRequired("DDPG".into()).into());
        }
        if let TargetUpdate::HardRefresh { period: 0 } = config.critic_target_update {
            return Err(LinconError::InvalidParameter(
                "the period of the critic target refresh must be positive".into(),
            )
            .into());
        }
        let input_state = config
            .input_state
            .iter()
            .map(|name| state.index_of(name))
            .collect::<Result<Vec<_>>>()?;
        let output_action = config
            .output_action
            .iter()
            .map(|name| action.index_of(name))
            .collect::<Result<Vec<_>>>()?;

        let mut critic_target = critic.clone_network()?;
        critic_target.init_soft_update(config.tau, &critic)?;
        let mut actor_target = actor.clone_network()?;
        actor_target.init_soft_update(config.tau, &actor)?;
        info!(
            "DDPG: {:?} -> {:?}, minibatch size {}, critic target update {:?}",
            config.input_state,
            config.output_action,
            config.minibatch_size,
            config.critic_target_update
        );

        Ok(Self {
            input_state,
            output_action,
            critic,
            critic_target,
            actor,
            actor_target,
            critic_minibatch: Minibatch::new(config.minibatch_size),
            actor_minibatch: Minibatch::new(config.minibatch_size),
            critic_target_update: config.critic_target_update.clone(),
            noise: GaussianNoise::build(&config.noise)?,
            a_p: action.clone(),
        })
    }

    /// The online critic.
    pub fn critic(&self) -> &N {
        &self.critic
    }

    /// The target critic.
    pub fn critic_target(&self) -> &N {
        &self.critic_target
    }

    /// The online actor.
    pub fn actor(&self) -> &N {
        &self.actor
    }

    /// The target actor.
    pub fn actor_target(&self) -> &N {
        &self.actor_target
    }

    /// Tuples waiting for the next training step of the critic.
    pub fn critic_minibatch(&self) -> &Minibatch {
        &self.critic_minibatch
    }

    /// Tuples waiting for the next training step of the actor.
    pub fn actor_minibatch(&self) -> &Minibatch {
        &self.actor_minibatch
    }

    fn state_values(&self, s: &State) -> Vec<f64> {
        self.input_state.iter().map(|&i| s.get_at(i)).collect()
    }

    fn action_values(&self, a: &Action) -> Vec<f64> {
        self.output_action.iter().map(|&i| a.get_at(i)).collect()
    }

    /// `mu'(s)`, bounded to the ranges of the output actions.
    fn target_policy(&mut self, s: &[f64]) -> Result<Vec<f64>> {
        let output = self.actor_target.evaluate(s, &[])?;
        for (k, &i) in self.output_action.iter().enumerate() {
            let v = output.get(k).with_context(|| {
                format!("Actor has {} outputs, {} expected", output.len(), k + 1)
            })?;
            self.a_p.set_at(i, *v);
        }
        Ok(self.action_values(&self.a_p))
    }

    fn update_critic(&mut self, transition: &Transition, ctx: &LearningContext) -> Result<bool> {
        if ctx.replaying_experience {
            if self.critic_minibatch.is_full() {
                trace!("Critic minibatch is full, tuple skipped");
                return Ok(false);
            }
            let s_p = self.state_values(transition.s_p);
            let mu_p = self.target_policy(&s_p)?;
            let q_p = self
                .critic_target
                .evaluate(&s_p, &mu_p)?
                .first()
                .copied()
                .context("Critic has no output")?;
            let target = transition.r + ctx.gamma * q_p;
            let s = self.state_values(transition.s);
            let a = self.action_values(transition.a);
            self.critic_minibatch.add_tuple(&s, &a, &[target])?;
            Ok(false)
        } else if self.critic_minibatch.is_full() {
            self.critic.train(&mut self.critic_minibatch)?;
            match self.critic_target_update {
                TargetUpdate::Soft => self.critic_target.soft_update(&self.critic)?,
                TargetUpdate::HardRefresh { period } => {
                    if ctx.experiment_step % period == 0 {
                        self.critic_target = self.critic.clone_network()?;
                        debug!("Critic target refreshed at step {}", ctx.experiment_step);
                    }
                }
            }
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn update_actor(&mut self, transition: &Transition, ctx: &LearningContext) -> Result<bool> {
        if ctx.replaying_experience {
            if self.actor_minibatch.is_full() {
                trace!("Actor minibatch is full, tuple skipped");
                return Ok(false);
            }
            let s = self.state_values(transition.s);
            let mu = self.target_policy(&s)?;
            let gradient: Vec<f64> = self
                .critic_target
                .gradient_wrt_action(&s, &mu)?
                .into_iter()
                .map(|g| -g)
                .collect();
            self.actor_minibatch.add_tuple(&s, &mu, &gradient)?;
            Ok(false)
        } else if self.actor_minibatch.is_full() {
            self.actor.apply_gradient(&mut self.actor_minibatch)?;
            self.actor_target.soft_update(&self.actor)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

fn flag(v: bool) -> RecordValue {
    RecordValue::Scalar(if v { 1.0 } else { 0.0 })
}

impl<N: Network> Learner for Ddpg<N> {
    /// Writes `mu(s)` plus exploration noise, or `mu(s)` alone in evaluation episodes.
    fn select_action(&mut self, s: &State, a: &mut Action, ctx: &LearningContext) -> Result<f64> {
        let output = self.actor.evaluate(&self.state_values(s), &[])?;
        for (k, &i) in self.output_action.iter().enumerate() {
            let mut v = *output.get(k).with_context(|| {
                format!("Actor has {} outputs, {} expected", output.len(), k + 1)
            })?;
            if !ctx.evaluation_episode {
                v += self.noise.sample(ctx);
            }
            a.set_at(i, v);
        }
        Ok(1.0)
    }

    fn update_with_record(
        &mut self,
        transition: &Transition,
        ctx: &LearningContext,
    ) -> Result<Record> {
        let critic_trained = self.update_critic(transition, ctx)?;
        let actor_trained = self.update_actor(transition, ctx)?;

        Ok(Record::from_slice(&[
            ("critic_trained", flag(critic_trained)),
            ("actor_trained", flag(actor_trained)),
        ]))
    }
}

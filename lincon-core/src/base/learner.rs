//! Learners.
use super::Transition;
use crate::{
    context::LearningContext,
    named_var::{Action, State},
    record::Record,
};
use anyhow::Result;

/// Learns a value function from transitions.
pub trait Critic {
    /// Updates the value function and returns the temporal-difference error.
    fn update(&mut self, transition: &Transition, ctx: &LearningContext) -> Result<f64>;
}

/// Selects actions and learns from the transitions they lead to.
pub trait Learner {
    /// Writes an action for `s` into `a`.
    ///
    /// Returns the probability of the selected action under the learner's policy.
    fn select_action(&mut self, s: &State, a: &mut Action, ctx: &LearningContext)
        -> Result<f64>;

    /// Performs an update.
    fn update(&mut self, transition: &Transition, ctx: &LearningContext) -> Result<()> {
        let _ = self.update_with_record(transition, ctx)?;
        Ok(())
    }

    /// Performs an update and returns some information.
    fn update_with_record(
        &mut self,
        transition: &Transition,
        ctx: &LearningContext,
    ) -> Result<Record>;
}

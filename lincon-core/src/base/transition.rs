//! Transition.
use crate::named_var::{Action, State};

/// A step of experience `(s, a, s', r)`, borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub struct Transition<'a> {
    /// State before the action.
    pub s: &'a State,

    /// Action taken in `s`.
    pub a: &'a Action,

    /// Resulting state.
    pub s_p: &'a State,

    /// Reward.
    pub r: f64,

    /// Probability of `a` under the behavior policy.
    pub behavior_prob: f64,
}

impl<'a> Transition<'a> {
    /// Creates a transition with behavior probability 1.
    pub fn new(s: &'a State, a: &'a Action, s_p: &'a State, r: f64) -> Self {
        Self {
            s,
            a,
            s_p,
            r,
            behavior_prob: 1.0,
        }
    }

    /// Sets the behavior probability.
    pub fn behavior_prob(mut self, v: f64) -> Self {
        self.behavior_prob = v;
        self
    }
}

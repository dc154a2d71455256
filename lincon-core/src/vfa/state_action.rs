//! Linear state-action value function `Q(s, a)`.
use super::{LinearVfa, LinearVfaConfig};
use crate::{
    context::LearningContext,
    error::LinconError,
    feature_map::{FeatureMapConfig, StateActionFeatureMap},
    features::FeatureList,
    named_var::{Action, State},
};
use anyhow::Result;
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Linear function over the cartesian product of a state and an action feature space.
///
/// The weight of the pair of a state feature `i` and an action feature `j` is at index
/// `i + j * num_state_weights`.
#[derive(Debug, Clone)]
pub struct LinearStateActionVfa {
    linear: LinearVfa,
    state_map: StateActionFeatureMap,
    action_map: StateActionFeatureMap,
    num_state_weights: usize,
    num_action_weights: usize,
    aux: FeatureList,
    action_features: FeatureList,
    ties: Vec<usize>,
    rng: StdRng,
}

impl LinearStateActionVfa {
    /// Builds the function from a state feature map and an action feature map.
    pub fn build(
        config: &LinearVfaConfig,
        state_map_config: &FeatureMapConfig,
        action_map_config: &FeatureMapConfig,
        state: &State,
        action: &Action,
    ) -> Result<Self> {
        let state_map = StateActionFeatureMap::build(state_map_config, state, action)?;
        let action_map = StateActionFeatureMap::build(action_map_config, state, action)?;
        let num_state_weights = state_map.total_num_features();
        let num_action_weights = action_map.total_num_features();
        if num_state_weights == 0 || num_action_weights == 0 {
            return Err(LinconError::InvalidParameter(format!(
                "state-action function needs features on both sides, got {} x {}",
                num_state_weights, num_action_weights
            ))
            .into());
        }
        let linear = LinearVfa::new(num_state_weights * num_action_weights, config);
        info!(
            "Linear state-action function with {} x {} weights",
            num_state_weights, num_action_weights
        );

        Ok(Self {
            linear,
            state_map,
            action_map,
            num_state_weights,
            num_action_weights,
            aux: FeatureList::default(),
            action_features: FeatureList::default(),
            ties: Vec::with_capacity(num_action_weights),
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    /// Weights of the function.
    pub fn linear(&self) -> &LinearVfa {
        &self.linear
    }

    /// Weights of the function.
    pub fn linear_mut(&mut self) -> &mut LinearVfa {
        &mut self.linear
    }

    /// Size of the state feature space.
    pub fn num_state_weights(&self) -> usize {
        self.num_state_weights
    }

    /// Size of the action feature space.
    pub fn num_action_weights(&self) -> usize {
        self.num_action_weights
    }

    /// Features of the pair `(s, a)`, offset to the window of the function.
    ///
    /// Without an action only the state features are returned, without offset.
    pub fn get_features(
        &mut self,
        s: Option<&State>,
        a: Option<&Action>,
        out: &mut FeatureList,
    ) -> Result<()> {
        match (s, a) {
            (Some(s), Some(a)) => {
                self.state_map.get_features(Some(s), None, out)?;
                self.action_map
                    .get_features(None, Some(a), &mut self.action_features)?;
                out.spawn(&self.action_features, self.num_state_weights);
                out.offset_indices(self.linear.min_index());
                Ok(())
            }
            (Some(s), None) => self.state_map.get_features(Some(s), None, out),
            (None, Some(_)) => Err(LinconError::MissingInput("state".to_string()).into()),
            (None, None) => Err(LinconError::NoStateNorAction.into()),
        }
    }

    /// Writes the variables represented by `feature` into `s` and `a`.
    pub fn get_feature_state_action(
        &mut self,
        feature: usize,
        s: Option<&mut State>,
        a: Option<&mut Action>,
    ) {
        if feature < self.linear.min_index() || feature >= self.linear.max_index() {
            return;
        }
        let feature = feature - self.linear.min_index();
        if let Some(s) = s {
            self.state_map
                .get_feature_state_action(feature % self.num_state_weights, Some(s), None);
        }
        if let Some(a) = a {
            self.action_map
                .get_feature_state_action(feature / self.num_state_weights, None, Some(a));
        }
    }

    /// See [`LinearVfa::get`].
    pub fn get(&self, features: &FeatureList, use_frozen: bool) -> f64 {
        self.linear.get(features, use_frozen)
    }

    /// See [`LinearVfa::add`].
    pub fn add(&mut self, features: &FeatureList, alpha: f64, ctx: &LearningContext) {
        self.linear.add(features, alpha, ctx);
    }

    /// `Q(s, a)` with the online weights.
    pub fn evaluate(&mut self, s: &State, a: &Action) -> Result<f64> {
        let mut aux = std::mem::take(&mut self.aux);
        let value = self
            .get_features(Some(s), Some(a), &mut aux)
            .map(|_| self.linear.get(&aux, false));
        self.aux = aux;
        value
    }

    /// Fills `self.aux` with the state features of `s`, offset to the first action feature.
    fn load_state_features(&mut self, s: &State) -> Result<()> {
        self.state_map.get_features(Some(s), None, &mut self.aux)?;
        self.aux.offset_indices(self.linear.min_index());
        Ok(())
    }

    /// Writes into `a` the action that maximizes `Q(s, a)` over the action features.
    ///
    /// Values are equal only if they are exactly equal. On ties, the first action
    /// feature wins unless `solve_ties_randomly` is set, in which case one of the tied
    /// features is drawn uniformly.
    pub fn arg_max(&mut self, s: &State, a: &mut Action, solve_ties_randomly: bool) -> Result<()> {
        self.load_state_features(s)?;
        self.ties.clear();

        let mut max_value = f64::MIN;
        for i in 0..self.num_action_weights {
            let value = self.linear.get(&self.aux, false);
            if value > max_value {
                max_value = value;
                self.ties.clear();
                self.ties.push(i);
            } else if value == max_value {
                self.ties.push(i);
            }
            self.aux.offset_indices(self.num_state_weights);
        }

        let arg = match self.ties.len() {
            0 => return Ok(()),
            n if solve_ties_randomly && n > 1 => self.ties[self.rng.gen_range(0..n)],
            _ => self.ties[0],
        };
        self.action_map.get_feature_state_action(arg, None, Some(a));
        Ok(())
    }

    /// Maximum of `Q(s, a)` over the action features.
    pub fn max(&mut self, s: &State, use_frozen: bool) -> Result<f64> {
        self.load_state_features(s)?;

        let mut max_value = f64::MIN;
        for _ in 0..self.num_action_weights {
            max_value = max_value.max(self.linear.get(&self.aux, use_frozen));
            self.aux.offset_indices(self.num_state_weights);
        }
        Ok(max_value)
    }

    /// Writes `Q(s, a_j)` for every action feature `j`, read from the frozen weights.
    pub fn get_action_values(&mut self, s: &State, out: &mut [f64]) -> Result<()> {
        if out.len() != self.num_action_weights {
            return Err(LinconError::ActionValueBuffer {
                given: out.len(),
                expected: self.num_action_weights,
            }
            .into());
        }
        self.load_state_features(s)?;

        for v in out.iter_mut() {
            *v = self.linear.get(&self.aux, true);
            self.aux.offset_indices(self.num_state_weights);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        feature_map::FeatureMapKind,
        named_var::{NamedVarSet, VarProperties},
    };

    fn tiles() -> FeatureMapKind {
        FeatureMapKind::TileCoding {
            num_tiles: 1,
            tile_offset: 0.0,
        }
    }

    fn q() -> Result<(LinearStateActionVfa, State, Action)> {
        let state = NamedVarSet::new(vec![VarProperties::new("x", 0.0, 2.0)]);
        let action = NamedVarSet::new(vec![VarProperties::new("u", -1.0, 1.0)]);
        let q = LinearStateActionVfa::build(
            &LinearVfaConfig::default(),
            &FeatureMapConfig::default().kind(tiles()).state_var("x", 3),
            &FeatureMapConfig::default().kind(tiles()).action_var("u", 5),
            &state,
            &action,
        )?;
        Ok((q, state, action))
    }

    #[test]
    fn test_state_action_indices() -> Result<()> {
        let (mut q, mut s, mut a) = q()?;
        assert_eq!(q.linear().num_weights(), 15);

        s.set("x", 2.0)?;
        a.set("u", 0.5)?;
        let mut features = FeatureList::default();
        q.get_features(Some(&s), Some(&a), &mut features)?;
        // state feature 2, action feature 3
        assert_eq!(features.get(0).index, 2 + 3 * 3);

        let (_, mut s_, mut a_) = self::q()?;
        q.get_feature_state_action(11, Some(&mut s_), Some(&mut a_));
        assert_eq!(s_.get("x")?, 2.0);
        assert_eq!(a_.get("u")?, 0.5);
        Ok(())
    }

    #[test]
    fn test_neither_state_nor_action() -> Result<()> {
        let (mut q, _, _) = q()?;
        let mut features = FeatureList::default();
        let err = q.get_features(None, None, &mut features).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LinconError>(),
            Some(&LinconError::NoStateNorAction)
        );
        Ok(())
    }

    #[test]
    fn test_action_without_state() -> Result<()> {
        let (mut q, _, a) = q()?;
        let mut features = FeatureList::default();
        let err = q.get_features(None, Some(&a), &mut features).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LinconError>(),
            Some(&LinconError::MissingInput("state".to_string()))
        );
        Ok(())
    }

    #[test]
    fn test_no_action_features_rejected() {
        let state = NamedVarSet::new(vec![VarProperties::new("x", 0.0, 2.0)]);
        let action = NamedVarSet::new(vec![VarProperties::new("u", -1.0, 1.0)]);
        let no_tiles = FeatureMapKind::TileCoding {
            num_tiles: 0,
            tile_offset: 0.0,
        };
        let err = LinearStateActionVfa::build(
            &LinearVfaConfig::default(),
            &FeatureMapConfig::default().kind(tiles()).state_var("x", 3),
            &FeatureMapConfig::default().kind(no_tiles).action_var("u", 5),
            &state,
            &action,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LinconError>(),
            Some(LinconError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_arg_max_and_max() -> Result<()> {
        let (mut q, mut s, mut a) = q()?;
        s.set("x", 1.0)?;
        // state feature 1, action feature 4
        q.linear_mut().set(1 + 4 * 3, 3.0)?;
        q.linear_mut().set(1 + 2 * 3, 1.0)?;
        // another state
        q.linear_mut().set(0, 5.0)?;

        q.arg_max(&s, &mut a, false)?;
        assert_eq!(a.get("u")?, 1.0);
        q.arg_max(&s, &mut a, true)?;
        assert_eq!(a.get("u")?, 1.0);
        assert_eq!(q.max(&s, false)?, 3.0);
        assert_eq!(q.evaluate(&s, &a)?, 3.0);

        let mut values = vec![0.0; 5];
        q.get_action_values(&s, &mut values)?;
        assert_eq!(values, vec![0.0, 0.0, 1.0, 0.0, 3.0]);
        Ok(())
    }

    #[test]
    fn test_first_tie_wins_without_random() -> Result<()> {
        let (mut q, s, mut a) = q()?;
        // every action is worth 0 in the initial state
        q.arg_max(&s, &mut a, false)?;
        assert_eq!(a.get("u")?, -1.0);
        Ok(())
    }

    #[test]
    fn test_action_value_buffer_size() -> Result<()> {
        let (mut q, s, _) = q()?;
        let mut values = vec![0.0; 3];
        let err = q.get_action_values(&s, &mut values).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LinconError>(),
            Some(&LinconError::ActionValueBuffer {
                given: 3,
                expected: 5
            })
        );
        Ok(())
    }
}

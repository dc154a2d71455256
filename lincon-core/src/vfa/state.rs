//! Linear state value function `V(s)`.
use super::{LinearVfa, LinearVfaConfig};
use crate::{
    context::LearningContext,
    feature_map::{FeatureMapConfig, StateActionFeatureMap},
    features::FeatureList,
    named_var::{Action, State},
};
use anyhow::Result;
use log::info;

/// Linear function of the features of a state.
#[derive(Debug, Clone)]
pub struct LinearStateVfa {
    linear: LinearVfa,
    state_map: StateActionFeatureMap,
    aux: FeatureList,
}

impl LinearStateVfa {
    /// Builds the function and its feature map.
    pub fn build(
        config: &LinearVfaConfig,
        map_config: &FeatureMapConfig,
        state: &State,
        action: &Action,
    ) -> Result<Self> {
        let state_map = StateActionFeatureMap::build(map_config, state, action)?;
        let linear = LinearVfa::new(state_map.total_num_features(), config);
        info!("Linear state function with {} weights", linear.num_weights());

        Ok(Self {
            linear,
            state_map,
            aux: FeatureList::default(),
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

    /// Features of `s`, offset to the window of the function.
    pub fn get_features(&mut self, s: &State, out: &mut FeatureList) -> Result<()> {
        self.state_map.get_features(Some(s), None, out)?;
        out.offset_indices(self.linear.min_index());
        Ok(())
    }

    /// Writes the state variables represented by `feature` into `s`.
    pub fn get_feature_state(&mut self, feature: usize, s: &mut State) {
        if feature >= self.linear.min_index() && feature < self.linear.max_index() {
            self.state_map
                .get_feature_state_action(feature - self.linear.min_index(), Some(s), None);
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

    /// `V(s)` with the online weights.
    pub fn evaluate(&mut self, s: &State) -> Result<f64> {
        self.state_map.get_features(Some(s), None, &mut self.aux)?;
        self.aux.offset_indices(self.linear.min_index());
        Ok(self.linear.get(&self.aux, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        feature_map::FeatureMapKind,
        named_var::{NamedVarSet, VarProperties},
    };

    #[test]
    fn test_evaluate_with_offset() -> Result<()> {
        let mut state = NamedVarSet::new(vec![VarProperties::new("x", 0.0, 4.0)]);
        let action = NamedVarSet::new(vec![]);
        let map_config = FeatureMapConfig::default()
            .kind(FeatureMapKind::TileCoding {
                num_tiles: 1,
                tile_offset: 0.0,
            })
            .state_var("x", 5);
        let mut v = LinearStateVfa::build(&LinearVfaConfig::default(), &map_config, &state, &action)?;
        v.linear_mut().set_index_offset(100);
        v.linear_mut().set(103, 2.5)?;

        state.set("x", 3.1)?;
        assert_eq!(v.evaluate(&state)?, 2.5);

        let mut decoded = state.clone();
        v.get_feature_state(101, &mut decoded);
        assert_eq!(decoded.get("x")?, 1.0);
        Ok(())
    }
}

//! Feature maps from continuous variables to sparse feature lists.
mod config;
mod rbf_grid;
mod tile_coding;
use crate::{
    error::LinconError,
    features::FeatureList,
    grid::Grid,
    named_var::{Action, State},
};
use anyhow::Result;
pub use config::{FeatureMapConfig, FeatureMapKind};
use log::info;
pub use rbf_grid::{GaussianRbfGrid, ACTIVATION_THRESHOLD};
pub use tile_coding::TileCoding;

/// A feature map over an ordered set of grids.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureMap {
    /// See [`TileCoding`].
    TileCoding(TileCoding),

    /// See [`GaussianRbfGrid`].
    GaussianRbfGrid(GaussianRbfGrid),
}

impl FeatureMap {
    /// Creates a map of the given kind over `grids`.
    pub fn new(kind: &FeatureMapKind, grids: &[Grid]) -> Self {
        match kind {
            FeatureMapKind::TileCoding {
                num_tiles,
                tile_offset,
            } => Self::TileCoding(TileCoding::new(*num_tiles, *tile_offset, grids)),
            FeatureMapKind::GaussianRbfGrid => Self::GaussianRbfGrid(GaussianRbfGrid::new(grids)),
        }
    }

    /// Size of the feature space. Every mapped index is below this value.
    pub fn total_num_features(&self) -> usize {
        match self {
            Self::TileCoding(m) => m.total_num_features(),
            Self::GaussianRbfGrid(m) => m.total_num_features(),
        }
    }

    /// Upper bound of the number of features active at once.
    pub fn max_num_active_features(&self) -> usize {
        match self {
            Self::TileCoding(m) => m.max_num_active_features(),
            Self::GaussianRbfGrid(m) => m.max_num_active_features(),
        }
    }

    /// Maps `values`, one per grid, to the active features.
    pub fn map(
        &self,
        grids: &[Grid],
        values: &[f64],
        out: &mut FeatureList,
        scratch: &mut FeatureList,
    ) {
        match self {
            Self::TileCoding(m) => m.map(grids, values, out),
            Self::GaussianRbfGrid(m) => m.map(grids, values, out, scratch),
        }
    }

    /// Approximate inverse of [`FeatureMap::map`] for a single feature.
    pub fn unmap(&self, feature: usize, grids: &[Grid], out: &mut [f64]) {
        match self {
            Self::TileCoding(m) => m.unmap(feature, grids, out),
            Self::GaussianRbfGrid(m) => m.unmap(feature, grids, out),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Source {
    State(usize),
    Action(usize),
}

/// A [`FeatureMap`] bound to named variables of states and actions.
///
/// Input variables are resolved by name against state and action templates when the
/// map is built; afterwards they are read by position.
#[derive(Debug, Clone)]
pub struct StateActionFeatureMap {
    map: FeatureMap,
    grids: Vec<Grid>,
    sources: Vec<Source>,
    values: Vec<f64>,
    scratch: FeatureList,
}

impl StateActionFeatureMap {
    /// Builds the map, with one grid per configured variable.
    pub fn build(config: &FeatureMapConfig, state: &State, action: &Action) -> Result<Self> {
        if let FeatureMapKind::TileCoding { num_tiles: 0, .. } = config.kind {
            return Err(
                LinconError::InvalidParameter("tile coding needs at least one tile".into()).into(),
            );
        }

        let mut grids = vec![];
        let mut sources = vec![];

        for var in config.state_vars.iter() {
            let i = state.index_of(&var.variable)?;
            grids.push(Grid::from_properties(
                state.properties(&var.variable)?,
                var.num_centers,
            )?);
            sources.push(Source::State(i));
        }
        for var in config.action_vars.iter() {
            let i = action.index_of(&var.variable)?;
            grids.push(Grid::from_properties(
                action.properties(&var.variable)?,
                var.num_centers,
            )?);
            sources.push(Source::Action(i));
        }

        let map = FeatureMap::new(&config.kind, &grids);
        info!(
            "Feature map {:?} over {} variables, {} features",
            config.kind,
            grids.len(),
            map.total_num_features()
        );

        Ok(Self {
            map,
            values: vec![0.0; grids.len()],
            grids,
            sources,
            scratch: FeatureList::default(),
        })
    }

    /// The underlying map.
    pub fn feature_map(&self) -> &FeatureMap {
        &self.map
    }

    /// Grids, state variables first.
    pub fn grids(&self) -> &[Grid] {
        &self.grids
    }

    /// Size of the feature space.
    pub fn total_num_features(&self) -> usize {
        self.map.total_num_features()
    }

    /// Upper bound of the number of features active at once.
    pub fn max_num_active_features(&self) -> usize {
        self.map.max_num_active_features()
    }

    /// Maps the input variables of `state` and `action` to the active features.
    ///
    /// Fails with [`LinconError::MissingInput`] if the map reads variables of a value that
    /// is not given.
    pub fn get_features(
        &mut self,
        state: Option<&State>,
        action: Option<&Action>,
        out: &mut FeatureList,
    ) -> Result<()> {
        for (v, source) in self.values.iter_mut().zip(self.sources.iter()) {
            *v = match (source, state, action) {
                (Source::State(i), Some(s), _) => s.get_at(*i),
                (Source::Action(i), _, Some(a)) => a.get_at(*i),
                (Source::State(_), None, _) => {
                    return Err(LinconError::MissingInput("state".to_string()).into())
                }
                (Source::Action(_), _, None) => {
                    return Err(LinconError::MissingInput("action".to_string()).into())
                }
            };
        }
        self.map
            .map(&self.grids, &self.values, out, &mut self.scratch);
        Ok(())
    }

    /// Writes the variable values represented by `feature` into `state` and `action`.
    ///
    /// Variables of a value that is not given are skipped.
    pub fn get_feature_state_action(
        &mut self,
        feature: usize,
        mut state: Option<&mut State>,
        mut action: Option<&mut Action>,
    ) {
        self.map.unmap(feature, &self.grids, &mut self.values);
        for (v, source) in self.values.iter().zip(self.sources.iter()) {
            match source {
                Source::State(i) => {
                    if let Some(s) = state.as_deref_mut() {
                        s.set_at(*i, *v);
                    }
                }
                Source::Action(i) => {
                    if let Some(a) = action.as_deref_mut() {
                        a.set_at(*i, *v);
                    }
                }
            }
        }
    }
}

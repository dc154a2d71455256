//! Configuration of [`StateActionFeatureMap`](super::StateActionFeatureMap).
use crate::{error::LinconError, grid::GridConfig};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Kind of feature map, with the parameters specific to it.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum FeatureMapKind {
    /// Overlapping shifted grids, one active feature per tile.
    TileCoding {
        /// Number of tiles.
        num_tiles: usize,

        /// Shift of consecutive tiles, as a fraction of each variable's range width.
        tile_offset: f64,
    },

    /// Gaussian radial-basis functions on the grid centers.
    GaussianRbfGrid,
}

impl FeatureMapKind {
    /// Resolves a registered kind name.
    ///
    /// `"tile-coding"` gets 5 tiles shifted by 5% of the range.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "tile-coding" => Ok(Self::TileCoding {
                num_tiles: 5,
                tile_offset: 0.05,
            }),
            "rbf-grid" => Ok(Self::GaussianRbfGrid),
            _ => Err(LinconError::UnknownKind(name.to_string()).into()),
        }
    }
}

/// Configuration of [`StateActionFeatureMap`](super::StateActionFeatureMap).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct FeatureMapConfig {
    /// Kind of the map.
    pub kind: FeatureMapKind,

    /// Grids over state variables.
    pub state_vars: Vec<GridConfig>,

    /// Grids over action variables.
    pub action_vars: Vec<GridConfig>,
}

impl Default for FeatureMapConfig {
    fn default() -> Self {
        Self {
            kind: FeatureMapKind::GaussianRbfGrid,
            state_vars: vec![],
            action_vars: vec![],
        }
    }
}

impl FeatureMapConfig {
    /// Sets the kind of the map.
    pub fn kind(mut self, kind: FeatureMapKind) -> Self {
        self.kind = kind;
        self
    }

    /// Adds a grid with `num_centers` centers over a state variable.
    pub fn state_var(mut self, name: impl Into<String>, num_centers: usize) -> Self {
        self.state_vars.push(GridConfig::new(name, num_centers));
        self
    }

    /// Adds a grid with `num_centers` centers over an action variable.
    pub fn action_var(mut self, name: impl Into<String>, num_centers: usize) -> Self {
        self.action_vars.push(GridConfig::new(name, num_centers));
        self
    }

    /// Constructs [`FeatureMapConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`FeatureMapConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_from_name() -> Result<()> {
        assert_eq!(
            FeatureMapKind::from_name("rbf-grid")?,
            FeatureMapKind::GaussianRbfGrid
        );
        assert!(matches!(
            FeatureMapKind::from_name("tile-coding")?,
            FeatureMapKind::TileCoding { num_tiles: 5, .. }
        ));
        let err = FeatureMapKind::from_name("fourier").unwrap_err();
        assert_eq!(
            err.downcast_ref::<LinconError>(),
            Some(&LinconError::UnknownKind("fourier".to_string()))
        );
        Ok(())
    }

    #[test]
    fn test_serde_feature_map_config() -> Result<()> {
        let config = FeatureMapConfig::default()
            .kind(FeatureMapKind::TileCoding {
                num_tiles: 8,
                tile_offset: 0.1,
            })
            .state_var("position", 11)
            .state_var("velocity", 7)
            .action_var("force", 5);

        let dir = TempDir::new("feature_map_config")?;
        let path = dir.path().join("feature_map.yaml");
        config.save(&path)?;
        let config_ = FeatureMapConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}

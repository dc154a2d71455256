//! Discretization of a single continuous variable.
use crate::{
    error::LinconError,
    named_var::{wrap, VarProperties},
};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Configuration of the grid of one input variable of a feature map.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct GridConfig {
    /// Name of the discretized variable.
    pub variable: String,

    /// Number of centers over the variable's range.
    pub num_centers: usize,
}

impl GridConfig {
    /// Creates a grid configuration.
    pub fn new(variable: impl Into<String>, num_centers: usize) -> Self {
        Self {
            variable: variable.into(),
            num_centers,
        }
    }
}

/// Ordered set of centers over the range `[min, max]` of a variable.
///
/// Immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    centers: Vec<f64>,
    min: f64,
    max: f64,
    circular: bool,
}

impl Grid {
    /// Builds `n` equally spaced centers over `[min, max]`.
    ///
    /// Circular variables do not get a center at `max`, since it coincides with `min`.
    pub fn uniform(min: f64, max: f64, n: usize, circular: bool) -> Result<Self> {
        if n == 0 {
            return Err(LinconError::InvalidGrid("a grid needs at least one center".into()).into());
        }
        if !(max > min) {
            return Err(
                LinconError::InvalidGrid(format!("empty range [{}, {}]", min, max)).into(),
            );
        }
        let centers = if n == 1 {
            vec![min]
        } else {
            let step = if circular {
                (max - min) / n as f64
            } else {
                (max - min) / (n - 1) as f64
            };
            (0..n).map(|i| min + step * i as f64).collect()
        };

        Ok(Self {
            centers,
            min,
            max,
            circular,
        })
    }

    /// Builds a grid from the properties of a variable.
    pub fn from_properties(properties: &VarProperties, n: usize) -> Result<Self> {
        Self::uniform(properties.min, properties.max, n, properties.circular)
    }

    /// Builds a non-circular grid from explicit breakpoints.
    ///
    /// The range of the grid spans from the first to the last center.
    pub fn from_centers(centers: Vec<f64>) -> Result<Self> {
        if centers.is_empty() {
            return Err(LinconError::InvalidGrid("a grid needs at least one center".into()).into());
        }
        if centers.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(
                LinconError::InvalidGrid("centers must be strictly increasing".into()).into(),
            );
        }
        let min = centers[0];
        let max = centers[centers.len() - 1];

        Ok(Self {
            centers,
            min,
            max,
            circular: false,
        })
    }

    /// Number of centers.
    pub fn num_centers(&self) -> usize {
        self.centers.len()
    }

    /// Value of the `i`-th center.
    pub fn value_at(&self, i: usize) -> f64 {
        self.centers[i]
    }

    /// All centers.
    pub fn centers(&self) -> &[f64] {
        &self.centers
    }

    /// Width of the variable's range.
    pub fn range_width(&self) -> f64 {
        self.max - self.min
    }

    /// Returns `true` if the variable wraps around.
    pub fn is_circular(&self) -> bool {
        self.circular
    }

    /// Index of the center nearest to `value`.
    ///
    /// Values outside the range are wrapped for circular grids and clamped otherwise.
    /// On equal distances the lower index wins.
    pub fn closest_feature(&self, value: f64) -> usize {
        let width = self.range_width();
        let value = if self.circular {
            wrap(value, self.min, self.max)
        } else {
            value.max(self.min).min(self.max)
        };

        let mut nearest = 0;
        let mut min_dist = f64::MAX;
        for (i, c) in self.centers.iter().enumerate() {
            let mut dist = (value - c).abs();
            if self.circular {
                dist = dist.min(width - dist);
            }
            if dist < min_dist {
                min_dist = dist;
                nearest = i;
            }
        }
        nearest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_centers() -> Result<()> {
        let grid = Grid::uniform(0.0, 4.0, 5, false)?;
        assert_eq!(grid.centers(), &[0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(grid.range_width(), 4.0);

        let grid = Grid::uniform(0.0, 4.0, 4, true)?;
        assert_eq!(grid.centers(), &[0.0, 1.0, 2.0, 3.0]);
        Ok(())
    }

    #[test]
    fn test_closest_feature() -> Result<()> {
        let grid = Grid::uniform(0.0, 4.0, 5, false)?;
        assert_eq!(grid.closest_feature(2.0), 2);
        assert_eq!(grid.closest_feature(2.4), 2);
        assert_eq!(grid.closest_feature(2.6), 3);
        assert_eq!(grid.closest_feature(-10.0), 0);
        assert_eq!(grid.closest_feature(10.0), 4);
        // ties resolve to the lower index
        assert_eq!(grid.closest_feature(2.5), 2);
        Ok(())
    }

    #[test]
    fn test_closest_feature_circular() -> Result<()> {
        let grid = Grid::uniform(0.0, 4.0, 4, true)?;
        // 3.9 is closer to the center at 0.0 going over the upper limit
        assert_eq!(grid.closest_feature(3.9), 0);
        assert_eq!(grid.closest_feature(5.1), 1);
        assert_eq!(grid.closest_feature(-0.9), 3);
        Ok(())
    }

    #[test]
    fn test_closest_feature_circular_far_values() -> Result<()> {
        let grid = Grid::uniform(0.0, 6.0, 6, true)?;
        // 1e17 = 4 (mod 6)
        assert_eq!(grid.closest_feature(1e17), 4);
        assert_eq!(grid.closest_feature(-1e17), 2);
        assert!(grid.closest_feature(f64::INFINITY) < 6);
        assert!(grid.closest_feature(f64::NEG_INFINITY) < 6);
        assert!(grid.closest_feature(f64::NAN) < 6);
        Ok(())
    }

    #[test]
    fn test_invalid_grids() {
        assert!(Grid::uniform(0.0, 1.0, 0, false).is_err());
        assert!(Grid::uniform(1.0, 1.0, 3, false).is_err());
        assert!(Grid::from_centers(vec![0.0, 1.0, 1.0]).is_err());
        assert!(Grid::from_centers(vec![]).is_err());
    }
}

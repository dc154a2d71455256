use crate::{features::FeatureList, grid::Grid};

/// Activations below this value are dropped before renormalizing.
pub const ACTIVATION_THRESHOLD: f64 = 0.0001;

const MAX_ACTIVE_FEATURES_PER_DIMENSION: usize = 3;

/// Gaussian radial-basis functions centered on the points of the input grids.
///
/// Every dimension activates up to three neighbouring centers; the activations of
/// all dimensions are combined with [`FeatureList::spawn`].
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianRbfGrid {
    total_num_features: usize,
    max_num_active_features: usize,
}

impl GaussianRbfGrid {
    /// Creates the map for the given grids.
    pub fn new(grids: &[Grid]) -> Self {
        Self {
            total_num_features: grids.iter().map(|g| g.num_centers()).product(),
            max_num_active_features: MAX_ACTIVE_FEATURES_PER_DIMENSION.pow(grids.len() as u32),
        }
    }

    /// Product of the numbers of centers.
    pub fn total_num_features(&self) -> usize {
        self.total_num_features
    }

    /// Three activations per dimension.
    pub fn max_num_active_features(&self) -> usize {
        self.max_num_active_features
    }

    /// Maps `values` to their active features.
    ///
    /// `scratch` holds the activations of one dimension at a time.
    pub fn map(
        &self,
        grids: &[Grid],
        values: &[f64],
        out: &mut FeatureList,
        scratch: &mut FeatureList,
    ) {
        out.clear();
        if grids.is_empty() {
            return;
        }

        dimension_features(&grids[0], values[0], out);

        let mut offset = 1;
        for i in 1..grids.len() {
            offset *= grids[i - 1].num_centers();
            dimension_features(&grids[i], values[i], scratch);
            out.spawn(scratch, offset);
        }

        // a single dimension was already thresholded and normalized
        if grids.len() > 1 {
            out.apply_threshold(ACTIVATION_THRESHOLD);
            out.normalize();
        }
    }

    /// Values of the grid centers of `feature`.
    pub fn unmap(&self, feature: usize, grids: &[Grid], out: &mut [f64]) {
        let mut feature = feature;
        for (grid, v) in grids.iter().zip(out.iter_mut()) {
            let n = grid.num_centers();
            *v = grid.value_at(feature % n);
            feature /= n;
        }
    }
}

/// Activations of the centers of a single grid around `value`.
///
/// Near the limits the three outermost centers are used, or the two outermost and
/// the one across the wrap for circular grids. Inside, the two bracketing centers
/// and the neighbour on the side of the smaller gap are used.
fn dimension_features(grid: &Grid, value: f64, out: &mut FeatureList) {
    out.clear();

    let n = grid.num_centers();
    if n <= 2 {
        return;
    }

    let c = grid.centers();
    if value <= c[1] {
        if !grid.is_circular() {
            out.add(0, factor(grid, 0, value));
            out.add(1, factor(grid, 1, value));
            out.add(2, factor(grid, 2, value));
        } else {
            out.add(0, factor(grid, 0, value));
            out.add(1, factor(grid, 1, value));
            out.add(n - 1, factor(grid, n - 1, value + grid.range_width()));
        }
    } else if value >= c[n - 2] {
        if !grid.is_circular() {
            out.add(n - 3, factor(grid, n - 3, value));
            out.add(n - 2, factor(grid, n - 2, value));
            out.add(n - 1, factor(grid, n - 1, value));
        } else {
            out.add(n - 2, factor(grid, n - 2, value));
            out.add(n - 1, factor(grid, n - 1, value));
            out.add(0, factor(grid, 0, value - grid.range_width()));
        }
    } else {
        let mut i = 1;
        while value > c[i + 1] {
            i += 1;
        }

        let u = (value - c[i]) / (c[i + 1] - c[i]);
        if u < 0.5 {
            out.add(i, factor(grid, i, value));
            out.add(i + 1, factor(grid, i + 1, value));
        } else {
            out.add(i + 1, factor(grid, i + 1, value));
            out.add(i, factor(grid, i, value));
        }

        if value - c[i - 1] < c[i + 2] - value {
            out.add(i - 1, factor(grid, i - 1, value));
        } else {
            out.add(i + 2, factor(grid, i + 2, value));
        }
    }

    out.apply_threshold(ACTIVATION_THRESHOLD);
    out.normalize();
}

/// Gaussian activation `exp(-(2 * dist / range)^2)` of the center `feature`.
///
/// `range` is the spacing to the adjacent center on the side of `value`, or the only
/// adjacent spacing at the edges of the grid.
fn factor(grid: &Grid, feature: usize, value: f64) -> f64 {
    let c = grid.centers();
    let last = c.len() - 1;

    let (dist, range) = if value > c[feature] {
        let range = if feature != last {
            c[feature + 1] - c[feature]
        } else {
            c[feature] - c[feature - 1]
        };
        (value - c[feature], range)
    } else {
        let range = if feature != 0 {
            c[feature] - c[feature - 1]
        } else {
            c[1] - c[0]
        };
        (c[feature] - value, range)
    };

    let f = 2.0 * dist / range;
    (-(f * f)).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn sum(list: &FeatureList) -> f64 {
        list.iter().map(|f| f.factor).sum()
    }

    #[test]
    fn test_single_dimension() -> Result<()> {
        let grids = vec![Grid::uniform(0.0, 10.0, 11, false)?];
        let rbf = GaussianRbfGrid::new(&grids);
        let mut out = FeatureList::default();
        let mut scratch = FeatureList::default();

        // exactly on a center: the neighbours are exp(-4) away
        rbf.map(&grids, &[5.0], &mut out, &mut scratch);
        assert_eq!(out.len(), 3);
        assert!((sum(&out) - 1.0).abs() < 1e-12);
        assert_eq!(out.max_factor_index(), Some(5));

        // asymmetric window: 5.2 is closer to 4 than 7 is
        rbf.map(&grids, &[5.2], &mut out, &mut scratch);
        let indices: Vec<usize> = out.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![5, 6, 4]);

        // the lower edge uses the three first centers
        rbf.map(&grids, &[0.8], &mut out, &mut scratch);
        let indices: Vec<usize> = out.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        Ok(())
    }

    #[test]
    fn test_circular_edges_wrap() -> Result<()> {
        let grids = vec![Grid::uniform(0.0, 8.0, 8, true)?];
        let rbf = GaussianRbfGrid::new(&grids);
        let mut out = FeatureList::default();
        let mut scratch = FeatureList::default();

        rbf.map(&grids, &[0.2], &mut out, &mut scratch);
        let indices: Vec<usize> = out.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 1, 7]);

        rbf.map(&grids, &[6.9], &mut out, &mut scratch);
        let indices: Vec<usize> = out.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![6, 7, 0]);
        assert!(out.get_factor(7) > out.get_factor(0));
        Ok(())
    }

    #[test]
    fn test_multi_dimension_normalized_and_in_range() -> Result<()> {
        let grids = vec![
            Grid::uniform(-1.0, 1.0, 5, false)?,
            Grid::uniform(0.0, 3.0, 4, false)?,
            Grid::uniform(0.0, 6.0, 6, true)?,
        ];
        let rbf = GaussianRbfGrid::new(&grids);
        assert_eq!(rbf.total_num_features(), 120);
        assert_eq!(rbf.max_num_active_features(), 27);
        let mut out = FeatureList::default();
        let mut scratch = FeatureList::default();

        for i in 0..40 {
            let t = i as f64 / 39.0;
            let values = [-1.0 + 2.0 * t, 3.0 * (1.0 - t), 6.0 * ((t * 3.0) % 1.0)];
            rbf.map(&grids, &values, &mut out, &mut scratch);
            assert!(!out.is_empty());
            assert!(out.len() <= 27);
            assert!((sum(&out) - 1.0).abs() < 1e-9);
            assert!(out.iter().all(|f| f.index < 120 && f.factor >= ACTIVATION_THRESHOLD));
        }
        Ok(())
    }

    #[test]
    fn test_unmap_returns_centers() -> Result<()> {
        let grids = vec![
            Grid::uniform(0.0, 4.0, 5, false)?,
            Grid::uniform(10.0, 12.0, 3, false)?,
        ];
        let rbf = GaussianRbfGrid::new(&grids);
        let mut out = [0.0; 2];
        // index = 3 + 2 * 5
        rbf.unmap(13, &grids, &mut out);
        assert_eq!(out, [3.0, 12.0]);
        Ok(())
    }

    #[test]
    fn test_small_grids_have_no_activation() -> Result<()> {
        let grids = vec![Grid::uniform(0.0, 1.0, 2, false)?];
        let rbf = GaussianRbfGrid::new(&grids);
        let mut out = FeatureList::default();
        let mut scratch = FeatureList::default();
        rbf.map(&grids, &[0.5], &mut out, &mut scratch);
        assert!(out.is_empty());
        Ok(())
    }
}

use crate::{features::FeatureList, grid::Grid};

/// Tile coding over the cartesian product of the input grids.
///
/// Each of the `num_tiles` layers is shifted by `tile_offset` times the range width
/// of every variable and contributes exactly one active feature.
#[derive(Debug, Clone, PartialEq)]
pub struct TileCoding {
    num_tiles: usize,
    tile_offset: f64,
    num_features_per_tile: usize,
}

impl TileCoding {
    /// Creates the map for the given grids.
    pub fn new(num_tiles: usize, tile_offset: f64, grids: &[Grid]) -> Self {
        let num_features_per_tile = grids.iter().map(|g| g.num_centers()).product();
        Self {
            num_tiles,
            tile_offset,
            num_features_per_tile,
        }
    }

    /// Number of tiles.
    pub fn num_tiles(&self) -> usize {
        self.num_tiles
    }

    /// Product of the numbers of centers.
    pub fn num_features_per_tile(&self) -> usize {
        self.num_features_per_tile
    }

    /// Size of the feature space over all tiles.
    pub fn total_num_features(&self) -> usize {
        self.num_tiles * self.num_features_per_tile
    }

    /// One active feature per tile.
    pub fn max_num_active_features(&self) -> usize {
        self.num_tiles
    }

    /// Writes one feature per tile with factor `1 / num_tiles`.
    pub fn map(&self, grids: &[Grid], values: &[f64], out: &mut FeatureList) {
        out.clear();
        if grids.is_empty() {
            return;
        }

        let mut tile_index_offset = 0;
        for layer in 0..self.num_tiles {
            let mut radix = 1;
            let mut tile_feature = 0;
            for (grid, value) in grids.iter().zip(values.iter()) {
                let shift = grid.range_width() * self.tile_offset * layer as f64;
                tile_feature += radix * grid.closest_feature(value + shift);
                radix *= grid.num_centers();
            }
            out.add(tile_feature + tile_index_offset, 1.0);
            tile_index_offset += self.num_features_per_tile;
        }

        out.normalize();
    }

    /// Values of the centers of `feature` within the first tile.
    ///
    /// The tiles overlap, so this is an approximation: the centers of the other tiles
    /// are not averaged in.
    pub fn unmap(&self, feature: usize, grids: &[Grid], out: &mut [f64]) {
        let mut feature = feature % self.num_features_per_tile;
        for (grid, v) in grids.iter().zip(out.iter_mut()) {
            let n = grid.num_centers();
            *v = grid.value_at(feature % n);
            feature /= n;
        }
    }
}

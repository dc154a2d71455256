use lincon_core::{FeatureList, FeatureMap, FeatureMapKind, Grid};
use rand::{rngs::StdRng, Rng, SeedableRng};
use test_log::test;

fn grids() -> Vec<Grid> {
    vec![
        Grid::uniform(-1.0, 1.0, 9, false).unwrap(),
        Grid::uniform(0.0, 6.28, 12, true).unwrap(),
        Grid::uniform(10.0, 20.0, 5, false).unwrap(),
    ]
}

fn check_map(kind: FeatureMapKind) {
    let grids = grids();
    let map = FeatureMap::new(&kind, &grids);
    let mut out = FeatureList::default();
    let mut scratch = FeatureList::default();
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..2000 {
        let values = [
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(0.0..6.28),
            rng.gen_range(10.0..=20.0),
        ];
        map.map(&grids, &values, &mut out, &mut scratch);

        assert!(!out.is_empty());
        assert!(out.len() <= map.max_num_active_features());
        let sum: f64 = out.iter().map(|f| f.factor).sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum = {}", sum);
        assert!(out.iter().all(|f| f.index < map.total_num_features()));
    }
}

#[test]
fn tile_coding_is_normalized_and_in_range() {
    check_map(FeatureMapKind::TileCoding {
        num_tiles: 6,
        tile_offset: 0.03,
    });
}

#[test]
fn rbf_grid_is_normalized_and_in_range() {
    check_map(FeatureMapKind::GaussianRbfGrid);
}

#[test]
fn tile_coding_unmap_is_within_a_cell() {
    let grids = grids();
    let map = FeatureMap::new(
        &FeatureMapKind::TileCoding {
            num_tiles: 4,
            tile_offset: 0.02,
        },
        &grids,
    );
    let cell = [0.25, 6.28 / 12.0, 2.5];
    let mut out = FeatureList::default();
    let mut scratch = FeatureList::default();
    let mut decoded = [0.0; 3];
    let mut rng = StdRng::seed_from_u64(6);

    for _ in 0..500 {
        let values = [
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(0.5..5.5),
            rng.gen_range(10.0..=20.0),
        ];
        map.map(&grids, &values, &mut out, &mut scratch);
        map.unmap(out.get(0).index, &grids, &mut decoded);
        for d in 0..3 {
            assert!((decoded[d] - values[d]).abs() <= cell[d]);
        }
    }
}

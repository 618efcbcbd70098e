use fnv::FnvHashSet;
use proptest::prelude::*;
use sc2_foreman::*;
use std::collections::VecDeque;

/// Generate a `width x height` layer with cells in `0..=max`.
fn arb_layer(width: usize, height: usize, max: u8) -> impl Strategy<Value = TileGrid> {
    proptest::collection::vec(0..=max, width * height)
        .prop_map(move |data| Grid::from_row_major(width, height, data).unwrap())
}

/// A terrain/pathing pair, a start tile, a distance ceiling and chokepoints.
fn arb_fill_case() -> impl Strategy<Value = (TileGrid, TileGrid, TilePoint, u32, FnvHashSet<TilePoint>)> {
    (4usize..16, 4usize..16).prop_flat_map(|(w, h)| {
        (
            arb_layer(w, h, 2),
            arb_layer(w, h, 1),
            (0..w as i32, 0..h as i32),
            0u32..12,
            proptest::collection::vec((0..w as i32, 0..h as i32), 0..10),
        )
            .prop_map(|(terrain, pathing, (sx, sy), max, chokes)| {
                let chokes: FnvHashSet<TilePoint> =
                    chokes.into_iter().map(TilePoint::from).collect();
                (terrain, pathing, TilePoint::new(sx, sy), max, chokes)
            })
    })
}

/// Creep, placement, pathing and avoidance layers of one size, mostly clear.
fn arb_placement_layers() -> impl Strategy<Value = (TileGrid, TileGrid, TileGrid, TileGrid)> {
    (4usize..14, 4usize..14).prop_flat_map(|(w, h)| {
        let mostly = move |set: bool| {
            proptest::collection::vec(prop::bool::weighted(0.9), w * h).prop_map(move |cells| {
                let data: Vec<u8> = cells.into_iter().map(|c| (c == set) as u8).collect();
                Grid::from_row_major(w, h, data).unwrap()
            })
        };
        (mostly(false), mostly(true), mostly(true), mostly(false))
    })
}

fn tile_ok(
    creep: &TileGrid,
    placement: &TileGrid,
    pathing: &TileGrid,
    avoidance: &TileGrid,
    tile: TilePoint,
    avoid_creep: bool,
) -> bool {
    creep.is_set(tile).unwrap() != avoid_creep
        && placement.is_set(tile).unwrap()
        && pathing.is_set(tile).unwrap()
        && !avoidance.is_set(tile).unwrap()
}

proptest! {
    /// Every region tile is reachable from the start through region tiles,
    /// stays within the distance ceiling, shares the start's terrain class
    /// and is never a chokepoint.
    #[test]
    fn prop_flood_fill_region_is_connected_and_bounded(
        (terrain, pathing, start, max, chokes) in arb_fill_case(),
        require_pathable in any::<bool>(),
    ) {
        let policy = if require_pathable {
            ReachPolicy::RequirePathable
        } else {
            ReachPolicy::TerrainOnly
        };
        let region = FloodFill::new(start, TileDistance(max))
            .with_chokepoints(chokes.iter().copied())
            .with_policy(policy)
            .run(&terrain, &pathing)
            .unwrap();

        if region.is_empty() {
            return Ok(());
        }
        prop_assert!(region.contains(start));

        let class = terrain.get(start).unwrap();
        for p in region.iter() {
            prop_assert!(p.distance_squared(start) <= (max as i64) * (max as i64));
            prop_assert!(!chokes.contains(&p));
            prop_assert_eq!(terrain.get(p).unwrap(), class);
            if require_pathable {
                prop_assert!(pathing.is_set(p).unwrap());
            }
        }

        let mut seen: FnvHashSet<TilePoint> = FnvHashSet::default();
        let mut queue = VecDeque::from([start]);
        seen.insert(start);
        while let Some(p) = queue.pop_front() {
            for next in sc2_foreman::query::neighbors4(p) {
                if region.contains(next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        prop_assert_eq!(seen.len(), region.len());
    }

    /// Every tile of every emitted footprint is clear in all four layers.
    #[test]
    fn prop_placements_are_clear(
        (creep, placement, pathing, avoidance) in arb_placement_layers(),
        fw in 1u32..4,
        fh in 1u32..4,
        x_stride in 1u32..4,
        y_stride in 1u32..4,
        avoid_creep in any::<bool>(),
    ) {
        let bounds = BoundingBox::new(0, placement.width() as i32 - 1, 0, placement.height() as i32 - 1);
        let found = find_placements(
            Footprint::new(fw, fh),
            bounds,
            x_stride,
            y_stride,
            &creep,
            &placement,
            &pathing,
            &avoidance,
            avoid_creep,
        )
        .unwrap();

        for p in &found {
            for tile in p.tiles() {
                prop_assert!(bounds.contains(tile));
                prop_assert!(tile_ok(&creep, &placement, &pathing, &avoidance, tile, avoid_creep));
            }
        }
    }

    /// Within a scan column, no run of four clear stride windows is emitted
    /// in full. With gaps disabled, the result equals a naive window scan.
    #[test]
    fn prop_gap_heuristic_and_naive_agreement(
        (creep, placement, pathing, avoidance) in arb_placement_layers(),
        fw in 1u32..4,
        fh in 1u32..4,
        y_stride in 1u32..3,
    ) {
        let (w, h) = (placement.width() as i32, placement.height() as i32);
        let bounds = BoundingBox::new(0, w - 1, 0, h - 1);
        let grids = sc2_foreman::placement::PlacementGrids {
            creep: &creep,
            placement: &placement,
            pathing: &pathing,
            avoidance: Some(&avoidance),
        };
        let query = PlacementQuery::new(Footprint::new(fw, fh), bounds).with_stride(1, y_stride);

        let clear = |x: i32, y: i32| {
            Placement::new(TilePoint::new(x, y), Footprint::new(fw, fh))
                .tiles()
                .all(|t| tile_ok(&creep, &placement, &pathing, &avoidance, t, true))
        };

        let mut naive = Vec::new();
        for x in 0..=(w - fw as i32) {
            for y in (0..=(h - fh as i32)).step_by(y_stride as usize) {
                if clear(x, y) {
                    naive.push(TilePoint::new(x, y));
                }
            }
        }

        let ungapped: Vec<TilePoint> = query
            .clone()
            .with_gap(GapPolicy::Disabled)
            .run(&grids)
            .unwrap()
            .iter()
            .map(|p| p.origin)
            .collect();
        prop_assert_eq!(&ungapped, &naive);

        let emitted: FnvHashSet<TilePoint> = query
            .run(&grids)
            .unwrap()
            .iter()
            .map(|p| p.origin)
            .collect();
        for x in 0..=(w - fw as i32) {
            let column: Vec<&TilePoint> = naive.iter().filter(|p| p.x() == x).collect();
            for run in column.windows(4) {
                prop_assert!(!run.iter().all(|p| emitted.contains(*p)));
            }
        }
    }

    /// Adding a source never removes coverage.
    #[test]
    fn prop_power_coverage_is_monotonic(
        heights in arb_layer(16, 16, 3),
        sources in proptest::collection::vec((0.0f32..16.0, 0.0f32..16.0, 0.0f32..=1.0, 1.0f32..8.0), 0..5),
        extra in (0.0f32..16.0, 0.0f32..16.0, 1.0f32..10.0),
        px in 0.0f32..16.0,
        py in 0.0f32..16.0,
    ) {
        let position = WorldPosition::new(px, py);
        let mut sources: Vec<PowerSource> = sources
            .into_iter()
            .map(|(x, y, progress, radius)| PowerSource::new(WorldPosition::new(x, y), progress, WorldDistance(radius)))
            .collect();

        let before = is_powered(position, &sources, &heights, 1.0).unwrap();
        sources.push(PowerSource::new(WorldPosition::new(extra.0, extra.1), 1.0, WorldDistance(extra.2)));
        let after = is_powered(position, &sources, &heights, 1.0).unwrap();

        prop_assert!(!before || after);
    }
}

#[test]
fn power_field_scenario() {
    let mut heights = TileGrid::new(32, 32, 5);
    let sources = [PowerSource::new(
        WorldPosition::new(10.5, 10.5),
        1.0,
        WorldDistance(6.5),
    )];

    assert!(is_powered(WorldPosition::new(16.5, 10.5), &sources, &heights, 1.0).unwrap());
    assert!(!is_powered(WorldPosition::new(17.5, 10.5), &sources, &heights, 1.0).unwrap());

    heights.set(TilePoint::new(12, 10), 6).unwrap();
    assert!(!is_powered(WorldPosition::new(12.5, 10.5), &sources, &heights, 1.0).unwrap());
    assert!(!is_powered(WorldPosition::new(12.5, 10.5), &sources, &heights, 0.0).unwrap());
}

#[test]
fn placement_region_pipeline() {
    // A 20x20 plateau split by a wall of chokepoints at x = 10. The region
    // around a base bounds the placement scan, as a placement manager would.
    let terrain = TileGrid::new(20, 20, 1);
    let pathing = TileGrid::new(20, 20, 1);
    let chokes: FnvHashSet<TilePoint> = (0..20).map(|y| TilePoint::new(10, y)).collect();

    let region = flood_fill(TilePoint::new(4, 10), &terrain, &pathing, TileDistance(30), &chokes).unwrap();
    let bounds = region.bounding_box().unwrap();
    assert_eq!(bounds, BoundingBox::new(0, 9, 0, 19));

    let creep = TileGrid::new(20, 20, 0);
    let avoidance = TileGrid::new(20, 20, 0);
    let found = find_placements(
        Footprint::new(3, 3),
        bounds,
        3,
        3,
        &creep,
        &terrain,
        &pathing,
        &avoidance,
        true,
    )
    .unwrap();

    assert!(!found.is_empty());
    for p in &found {
        assert!(p.tiles().all(|t| region.contains(t)));
    }
}

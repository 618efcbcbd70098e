//! Chokepoint-bounded flood fill.
//!
//! A region grows from a start tile across edge-adjacent tiles that share the
//! start tile's terrain class, stay within a squared-distance ceiling and are
//! not chokepoints. Terrain class 0 marks tiles outside the playable area; a
//! start on such a tile yields an empty region.
//!
//! Whether the pathing layer also gates expansion is a single switch,
//! [`ReachPolicy`]. The default, `TerrainOnly`, ignores the pathing layer so
//! that regions span tiles temporarily blocked by destructible rocks or
//! structures.

use crate::budget::*;
use crate::error::*;
use crate::grid::*;
use crate::location::*;
use crate::query::{bounding_box, neighbors4, BoundingBox};
use fnv::FnvHashSet;
use log::*;
use pathfinding::directed::bfs::bfs_reach;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Which layers decide whether a tile can join a region.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReachPolicy {
    /// Only terrain-class equality with the start tile.
    #[default]
    TerrainOnly,
    /// Terrain-class equality and a non-zero pathing cell.
    RequirePathable,
}

/// Set of tiles produced by a flood fill.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    points: FnvHashSet<TilePoint>,
}

impl Region {
    pub fn contains(&self, point: TilePoint) -> bool {
        self.points.contains(&point)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TilePoint> + '_ {
        self.points.iter().copied()
    }

    /// Points ordered by `(x, y)`, for callers that need a stable order.
    pub fn sorted_points(&self) -> Vec<TilePoint> {
        let mut points: Vec<TilePoint> = self.iter().collect();
        points.sort_unstable();
        points
    }

    /// Bounding box of the region. Empty regions have none.
    pub fn bounding_box(&self) -> Result<BoundingBox> {
        bounding_box(self.iter())
    }

    pub fn into_points(self) -> FnvHashSet<TilePoint> {
        self.points
    }
}

/// Flood fill parameters.
///
/// ```ignore
/// let region = FloodFill::new(start, TileDistance(16))
///     .with_chokepoints(chokes.iter().copied())
///     .with_policy(ReachPolicy::RequirePathable)
///     .run(&terrain, &pathing)?;
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FloodFill {
    pub start: TilePoint,
    pub max_distance: TileDistance,
    #[serde(default)]
    pub chokepoints: FnvHashSet<TilePoint>,
    #[serde(default)]
    pub policy: ReachPolicy,
}

impl FloodFill {
    pub fn new(start: TilePoint, max_distance: TileDistance) -> Self {
        FloodFill {
            start,
            max_distance,
            chokepoints: FnvHashSet::default(),
            policy: ReachPolicy::default(),
        }
    }

    pub fn with_chokepoints<I: IntoIterator<Item = TilePoint>>(mut self, chokepoints: I) -> Self {
        self.chokepoints.extend(chokepoints);
        self
    }

    pub fn with_policy(mut self, policy: ReachPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fill the whole region in one call.
    pub fn run(&self, terrain: &TileGrid, pathing: &TileGrid) -> Result<Region> {
        fill(
            self.start,
            terrain,
            pathing,
            self.max_distance,
            &self.chokepoints,
            self.policy,
        )
    }

    /// Start an incremental fill that can be spread over several steps with
    /// [`FloodFillPhase::tick`]. Dropping the phase cancels it.
    pub fn begin(self, terrain: &TileGrid, pathing: &TileGrid) -> Result<FloodFillPhase> {
        terrain.check_dimensions(pathing)?;
        let start_class = terrain.get(self.start)?;

        let mut visited = FnvHashSet::default();
        let mut queue = VecDeque::new();
        {
            let admission = Admission::new(&self, start_class, terrain, pathing);
            if admission.admits(self.start) {
                visited.insert(self.start);
                queue.push_back(self.start);
            }
        }

        Ok(FloodFillPhase {
            fill: self,
            start_class,
            visited,
            queue,
        })
    }
}

/// An in-progress flood fill.
pub struct FloodFillPhase {
    fill: FloodFill,
    start_class: u8,
    visited: FnvHashSet<TilePoint>,
    queue: VecDeque<TilePoint>,
}

impl FloodFillPhase {
    /// Expand tiles until the region is complete or the budget runs out.
    /// The grids must have the dimensions the phase was started with. Once
    /// complete, further ticks return the same region.
    pub fn tick(
        &mut self,
        terrain: &TileGrid,
        pathing: &TileGrid,
        budget: &CpuBudget,
    ) -> Result<PhaseResult<Region>> {
        terrain.check_dimensions(pathing)?;
        terrain.check_bounds(self.fill.start)?;

        let admission = Admission::new(&self.fill, self.start_class, terrain, pathing);

        while let Some(point) = self.queue.pop_front() {
            for next in admission.successors(point) {
                if self.visited.insert(next) {
                    self.queue.push_back(next);
                }
            }
            if !self.queue.is_empty() && !budget.has_budget() {
                return Ok(PhaseResult::Running);
            }
        }

        debug!(
            "Incremental flood fill from ({}, {}) complete: {} tiles",
            self.fill.start.x(),
            self.fill.start.y(),
            self.visited.len()
        );

        Ok(PhaseResult::Complete(Region {
            points: self.visited.clone(),
        }))
    }

    /// Tiles accepted so far.
    pub fn visited(&self) -> usize {
        self.visited.len()
    }
}

/// Fill the region around `start` with the default [`ReachPolicy`].
pub fn flood_fill(
    start: TilePoint,
    terrain: &TileGrid,
    pathing: &TileGrid,
    max_distance: TileDistance,
    chokepoints: &FnvHashSet<TilePoint>,
) -> Result<Region> {
    fill(
        start,
        terrain,
        pathing,
        max_distance,
        chokepoints,
        ReachPolicy::default(),
    )
}

fn fill(
    start: TilePoint,
    terrain: &TileGrid,
    pathing: &TileGrid,
    max_distance: TileDistance,
    chokepoints: &FnvHashSet<TilePoint>,
    policy: ReachPolicy,
) -> Result<Region> {
    terrain.check_dimensions(pathing)?;
    let start_class = terrain.get(start)?;

    let admission = Admission {
        start,
        start_class,
        max_distance_squared: max_distance.squared(),
        chokepoints,
        policy,
        terrain,
        pathing,
    };

    if !admission.admits(start) {
        trace!(
            "Flood fill start ({}, {}) rejected (class {})",
            start.x(),
            start.y(),
            start_class
        );
        return Ok(Region::default());
    }

    let points: FnvHashSet<TilePoint> =
        bfs_reach(start, |p: &TilePoint| admission.successors(*p)).collect();

    debug!(
        "Flood fill from ({}, {}) max_distance={}: {} tiles",
        start.x(),
        start.y(),
        max_distance.0,
        points.len()
    );

    Ok(Region { points })
}

/// The per-tile acceptance test shared by the one-shot and incremental fills.
struct Admission<'a> {
    start: TilePoint,
    start_class: u8,
    max_distance_squared: i64,
    chokepoints: &'a FnvHashSet<TilePoint>,
    policy: ReachPolicy,
    terrain: &'a TileGrid,
    pathing: &'a TileGrid,
}

impl<'a> Admission<'a> {
    fn new(fill: &'a FloodFill, start_class: u8, terrain: &'a TileGrid, pathing: &'a TileGrid) -> Self {
        Admission {
            start: fill.start,
            start_class,
            max_distance_squared: fill.max_distance.squared(),
            chokepoints: &fill.chokepoints,
            policy: fill.policy,
            terrain,
            pathing,
        }
    }

    fn admits(&self, point: TilePoint) -> bool {
        if self.start_class == 0 || !self.terrain.contains(point) {
            return false;
        }
        if point.distance_squared(self.start) > self.max_distance_squared {
            return false;
        }
        if self.chokepoints.contains(&point) {
            return false;
        }
        let (x, y) = (point.x() as usize, point.y() as usize);
        if self.terrain.get_xy(x, y) != self.start_class {
            return false;
        }
        match self.policy {
            ReachPolicy::TerrainOnly => true,
            ReachPolicy::RequirePathable => self.pathing.is_set_xy(x, y),
        }
    }

    fn successors(&self, point: TilePoint) -> impl Iterator<Item = TilePoint> {
        neighbors4(point)
            .map(|next| self.admits(next).then_some(next))
            .into_iter()
            .flatten()
    }
}

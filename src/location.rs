use serde::*;

/// Neighbor offsets for 8-directional adjacency.
pub const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
];

/// Neighbor offsets for 4-directional (cardinal) adjacency.
pub const NEIGHBORS_4: [(i32, i32); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// Integer address of one map tile.
///
/// Coordinates are signed so that offsets around the map border can be
/// expressed; whether a point actually lies on a grid is checked by
/// [`Grid`](crate::grid::Grid) at access time.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct TilePoint {
    x: i32,
    y: i32,
}

impl TilePoint {
    pub const fn new(x: i32, y: i32) -> Self {
        TilePoint { x, y }
    }

    #[inline]
    pub fn x(self) -> i32 {
        self.x
    }

    #[inline]
    pub fn y(self) -> i32 {
        self.y
    }

    /// Squared Euclidean distance in tiles. Used everywhere a radius is
    /// compared so no square root is taken.
    #[inline]
    pub fn distance_squared(self, other: Self) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }
}

impl std::ops::Add<(i32, i32)> for TilePoint {
    type Output = Self;
    fn add(self, other: (i32, i32)) -> Self {
        Self {
            x: self.x + other.0,
            y: self.y + other.1,
        }
    }
}

impl From<(i32, i32)> for TilePoint {
    fn from((x, y): (i32, i32)) -> Self {
        TilePoint::new(x, y)
    }
}

/// Continuous map coordinate, as reported by the game for unit and
/// structure positions. Never used to index a grid directly; convert with
/// [`WorldPosition::tile`].
#[derive(Copy, Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct WorldPosition {
    pub x: f32,
    pub y: f32,
}

impl WorldPosition {
    pub const fn new(x: f32, y: f32) -> Self {
        WorldPosition { x, y }
    }

    /// The tile containing this position (both axes floored).
    pub fn tile(self) -> TilePoint {
        TilePoint::new(self.x.floor() as i32, self.y.floor() as i32)
    }

    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// A distance measured in whole tiles.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileDistance(pub u32);

impl TileDistance {
    #[inline]
    pub fn squared(self) -> i64 {
        let d = self.0 as i64;
        d * d
    }
}

/// A distance in continuous world units.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldDistance(pub f32);

impl WorldDistance {
    #[inline]
    pub fn squared(self) -> f32 {
        self.0 * self.0
    }
}

//! Stateless queries over tile grids and point sequences.
//!
//! The quantifier helpers (`all_points_*`) answer `false` for an empty point
//! sequence. Every helper bounds-checks each point it reads and reports the
//! first offending point as [`GridError::OutOfBounds`].

use crate::error::*;
use crate::grid::*;
use crate::location::*;
use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

/// Inclusive axis-aligned tile rectangle.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl BoundingBox {
    pub fn new(x_min: i32, x_max: i32, y_min: i32, y_max: i32) -> Self {
        BoundingBox {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Number of tile columns covered.
    pub fn width(&self) -> i32 {
        self.x_max - self.x_min + 1
    }

    /// Number of tile rows covered.
    pub fn height(&self) -> i32 {
        self.y_max - self.y_min + 1
    }

    pub fn contains(&self, point: TilePoint) -> bool {
        (self.x_min..=self.x_max).contains(&point.x())
            && (self.y_min..=self.y_max).contains(&point.y())
    }
}

/// Smallest box enclosing every point. An empty input has no box.
pub fn bounding_box<I>(points: I) -> Result<BoundingBox>
where
    I: IntoIterator<Item = TilePoint>,
{
    let points: Vec<TilePoint> = points.into_iter().collect();

    let (x_min, x_max) = match points.iter().map(|p| p.x()).minmax() {
        MinMaxResult::NoElements => return Err(GridError::EmptyInput),
        MinMaxResult::OneElement(x) => (x, x),
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
    };
    let (y_min, y_max) = match points.iter().map(|p| p.y()).minmax() {
        MinMaxResult::NoElements => return Err(GridError::EmptyInput),
        MinMaxResult::OneElement(y) => (y, y),
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
    };

    Ok(BoundingBox::new(x_min, x_max, y_min, y_max))
}

/// The eight tiles surrounding the tile that contains `position`.
pub fn neighbors8(position: WorldPosition) -> [TilePoint; 8] {
    let tile = position.tile();
    NEIGHBORS_8.map(|offset| tile + offset)
}

/// The four edge-adjacent tiles of `point`.
pub fn neighbors4(point: TilePoint) -> [TilePoint; 4] {
    NEIGHBORS_4.map(|offset| point + offset)
}

/// True iff `points` is non-empty and every point's cell equals `value`.
pub fn all_points_have_value(grid: &TileGrid, value: u8, points: &[TilePoint]) -> Result<bool> {
    if points.is_empty() {
        return Ok(false);
    }
    for &point in points {
        if grid.get(point)? != value {
            return Ok(false);
        }
    }
    Ok(true)
}

/// True iff `points` is non-empty and every point's cell is `<= max_value`.
pub fn all_points_at_most(grid: &TileGrid, max_value: u8, points: &[TilePoint]) -> Result<bool> {
    if points.is_empty() {
        return Ok(false);
    }
    for &point in points {
        if grid.get(point)? > max_value {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Index of the last point in the leading run of points whose cell equals
/// `value`. `None` when the sequence is empty or its first point already
/// differs.
pub fn last_index_with_value(
    grid: &TileGrid,
    value: u8,
    points: &[TilePoint],
) -> Result<Option<usize>> {
    let mut last = None;
    for (i, &point) in points.iter().enumerate() {
        if grid.get(point)? != value {
            break;
        }
        last = Some(i);
    }
    Ok(last)
}

/// The points whose cell equals `value`, in input order.
pub fn points_with_value(
    grid: &TileGrid,
    value: u8,
    points: &[TilePoint],
) -> Result<Vec<TilePoint>> {
    let mut found = Vec::new();
    for &point in points {
        if grid.get(point)? == value {
            found.push(point);
        }
    }
    Ok(found)
}

/// Whether the cell at `point` is strictly below `value`.
pub fn point_below_value(grid: &TileGrid, point: TilePoint, value: u8) -> Result<bool> {
    Ok(grid.get(point)? < value)
}

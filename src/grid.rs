//! Dense per-tile map layers.
//!
//! Every grid in the crate is stored **row-major**: the cell for tile
//! `(x, y)` lives at index `y * width + x`. Layers delivered by the game in
//! column-major order (indexed `[x][y]`) are converted once, at the
//! boundary, with [`Grid::from_column_major`]. Nothing past that boundary
//! ever needs to know which orientation the source data had.

use crate::error::*;
use crate::location::*;
use serde::{Deserialize, Serialize};

/// A `width x height` array of per-tile data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid<T: Copy> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

/// Byte layer. Boolean layers (pathing, placement, creep, avoidance) treat
/// any non-zero cell as set; classed layers (terrain height) compare cells
/// for equality.
pub type TileGrid = Grid<u8>;

impl<T: Copy> Grid<T> {
    pub fn new(width: usize, height: usize, initial: T) -> Self {
        Grid {
            width,
            height,
            data: vec![initial; width * height],
        }
    }

    /// Wrap a buffer already laid out row-major.
    pub fn from_row_major(width: usize, height: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != width * height {
            return Err(GridError::InvalidGridData {
                expected: width * height,
                found: data.len(),
            });
        }
        Ok(Grid {
            width,
            height,
            data,
        })
    }

    /// Convert a buffer laid out column-major (cell `(x, y)` at
    /// `x * height + y`) into the canonical row-major order.
    pub fn from_column_major(width: usize, height: usize, data: &[T]) -> Result<Self> {
        if data.len() != width * height {
            return Err(GridError::InvalidGridData {
                expected: width * height,
                found: data.len(),
            });
        }
        let mut out = Vec::with_capacity(data.len());
        for y in 0..height {
            for x in 0..width {
                out.push(data[x * height + y]);
            }
        }
        Ok(Grid {
            width,
            height,
            data: out,
        })
    }

    /// A copy with the axes swapped: cell `(x, y)` of the result is cell
    /// `(y, x)` of `self`.
    pub fn transposed(&self) -> Self {
        let mut out = Vec::with_capacity(self.data.len());
        for y in 0..self.width {
            for x in 0..self.height {
                out.push(self.data[x * self.width + y]);
            }
        }
        Grid {
            width: self.height,
            height: self.width,
            data: out,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn contains(&self, point: TilePoint) -> bool {
        point.x() >= 0
            && point.y() >= 0
            && (point.x() as usize) < self.width
            && (point.y() as usize) < self.height
    }

    pub fn check_bounds(&self, point: TilePoint) -> Result<()> {
        if self.contains(point) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                point,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Fail unless `other` has the same dimensions as this grid.
    pub fn check_dimensions<U: Copy>(&self, other: &Grid<U>) -> Result<()> {
        if self.dimensions() == other.dimensions() {
            Ok(())
        } else {
            Err(GridError::DimensionMismatch {
                expected: self.dimensions(),
                found: other.dimensions(),
            })
        }
    }

    pub fn get(&self, point: TilePoint) -> Result<T> {
        self.check_bounds(point)?;
        Ok(self.data[point.y() as usize * self.width + point.x() as usize])
    }

    /// Direct cell read for coordinates the caller has already validated.
    /// Out-of-range coordinates panic on the slice index rather than read
    /// foreign memory.
    #[inline]
    pub fn get_xy(&self, x: usize, y: usize) -> T {
        self.data[y * self.width + x]
    }

    pub fn set(&mut self, point: TilePoint, value: T) -> Result<()> {
        self.check_bounds(point)?;
        let index = point.y() as usize * self.width + point.x() as usize;
        self.data[index] = value;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (TilePoint, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(i, v)| {
            let x = (i % width) as i32;
            let y = (i / width) as i32;
            (TilePoint::new(x, y), v)
        })
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl Grid<u8> {
    /// Boolean read: any non-zero cell is set.
    pub fn is_set(&self, point: TilePoint) -> Result<bool> {
        self.get(point).map(|v| v != 0)
    }

    #[inline]
    pub fn is_set_xy(&self, x: usize, y: usize) -> bool {
        self.get_xy(x, y) != 0
    }
}

#[derive(Serialize, Deserialize)]
struct GridRepr<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Copy + Serialize> Serialize for Grid<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        GridRepr {
            width: self.width,
            height: self.height,
            data: self.data.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de, T: Copy + Deserialize<'de>> Deserialize<'de> for Grid<T> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let repr = GridRepr::<T>::deserialize(deserializer)?;
        Grid::from_row_major(repr.width, repr.height, repr.data).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_indexing() {
        let grid = Grid::from_row_major(3, 2, vec![0u8, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(grid.get(TilePoint::new(2, 0)).unwrap(), 2);
        assert_eq!(grid.get(TilePoint::new(0, 1)).unwrap(), 3);
        assert_eq!(grid.get_xy(1, 1), 4);
    }

    #[test]
    fn column_major_input_is_normalized() {
        // Column-major 3x2: x=0 -> [a, d], x=1 -> [b, e], x=2 -> [c, f]
        let cols = [10u8, 13, 11, 14, 12, 15];
        let grid = Grid::from_column_major(3, 2, &cols).unwrap();
        assert_eq!(grid.as_slice(), &[10, 11, 12, 13, 14, 15]);
    }

    #[test]
    fn transpose_swaps_axes() {
        let grid = Grid::from_row_major(3, 2, vec![0u8, 1, 2, 3, 4, 5]).unwrap();
        let t = grid.transposed();
        assert_eq!(t.dimensions(), (2, 3));
        for (p, v) in grid.iter() {
            assert_eq!(t.get(TilePoint::new(p.y(), p.x())).unwrap(), *v);
        }
        assert_eq!(t.transposed(), grid);
    }

    #[test]
    fn out_of_bounds_is_reported() {
        let grid = TileGrid::new(4, 4, 1);
        assert_eq!(
            grid.get(TilePoint::new(4, 0)),
            Err(GridError::OutOfBounds {
                point: TilePoint::new(4, 0),
                width: 4,
                height: 4
            })
        );
        assert!(grid.get(TilePoint::new(-1, 2)).is_err());
    }

    #[test]
    fn bad_buffer_length_is_rejected() {
        assert_eq!(
            Grid::from_row_major(2, 2, vec![0u8; 3]),
            Err(GridError::InvalidGridData {
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn serde_checks_length() {
        let grid = Grid::from_row_major(2, 1, vec![7u8, 9]).unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        let back: TileGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);

        let broken = r#"{"width":2,"height":2,"data":[1,2,3]}"#;
        assert!(serde_json::from_str::<TileGrid>(broken).is_err());
    }
}

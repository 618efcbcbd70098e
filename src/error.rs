//! Error types for grid queries.

use crate::location::TilePoint;
use thiserror::Error;

/// Result type alias using [`GridError`].
pub type Result<T> = std::result::Result<T, GridError>;

/// Failures reported by the flood-fill, placement and query functions.
///
/// All of these are local to a single call; nothing in the crate retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// A tile point or window lies outside the grid.
    #[error("tile ({}, {}) is outside the {width}x{height} grid", .point.x(), .point.y())]
    OutOfBounds {
        point: TilePoint,
        width: usize,
        height: usize,
    },

    /// A query that has no meaningful answer for zero points.
    #[error("query requires at least one point")]
    EmptyInput,

    /// A footprint with a zero-sized axis.
    #[error("invalid footprint {width}x{height}")]
    InvalidFootprint { width: u32, height: u32 },

    /// A scan stride of zero on either axis.
    #[error("invalid stride ({x_stride}, {y_stride})")]
    InvalidStride { x_stride: u32, y_stride: u32 },

    /// Two grids that must describe the same map have different dimensions.
    #[error("grid dimensions {found:?} do not match {expected:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// A cell buffer whose length does not match `width * height`.
    #[error("grid buffer holds {found} cells, expected {expected}")]
    InvalidGridData { expected: usize, found: usize },
}

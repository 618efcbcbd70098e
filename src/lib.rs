//! Spatial queries for a real-time strategy bot: chokepoint-bounded flood
//! fill, windowed building placement search and power field coverage over
//! dense per-tile map layers.
//!
//! All layers use one axis convention, see [`grid`].

pub mod budget;
pub mod constants;
pub mod error;
pub mod grid;
pub mod location;
pub mod placement;
pub mod power;
pub mod query;
pub mod region;

pub use error::{GridError, Result};
pub use grid::{Grid, TileGrid};
pub use location::*;
pub use placement::{can_place_structure, find_placements, Footprint, GapPolicy, Placement, PlacementQuery};
pub use power::{is_powered, PowerSource};
pub use query::BoundingBox;
pub use region::{flood_fill, FloodFill, ReachPolicy, Region};

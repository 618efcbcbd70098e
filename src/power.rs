//! Power field coverage.
//!
//! A position is powered when a sufficiently built source is within radius
//! and does not stand on lower ground than the position: power fields never
//! reach up onto a higher plateau.

use crate::constants::*;
use crate::error::*;
use crate::grid::*;
use crate::location::*;
use serde::{Deserialize, Serialize};

/// A structure or unit emitting a power field.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerSource {
    pub position: WorldPosition,
    /// Construction progress in `[0, 1]`.
    pub progress: f32,
    pub radius: WorldDistance,
}

impl PowerSource {
    pub fn new(position: WorldPosition, progress: f32, radius: WorldDistance) -> Self {
        PowerSource {
            position,
            progress,
            radius,
        }
    }

    /// A static power structure.
    pub fn structure(position: WorldPosition, progress: f32) -> Self {
        PowerSource::new(position, progress, STATIC_POWER_RADIUS)
    }

    /// A deployed mobile emitter. Units are always fully built.
    pub fn mobile(position: WorldPosition) -> Self {
        PowerSource::new(position, 1.0, MOBILE_POWER_RADIUS)
    }

    fn covers(
        &self,
        position: WorldPosition,
        position_height: u8,
        height_grid: &TileGrid,
        progress_threshold: f32,
    ) -> bool {
        if self.progress < progress_threshold {
            return false;
        }
        match height_grid.get(self.position.tile()) {
            Ok(height) if height >= position_height => {}
            _ => return false,
        }
        position.distance_squared(self.position) < self.radius.squared()
    }
}

/// Whether any source powers `position`. No sources means unpowered.
///
/// The position must lie on the height grid. Sources off the grid have no
/// known height and never cover anything.
pub fn is_powered(
    position: WorldPosition,
    sources: &[PowerSource],
    height_grid: &TileGrid,
    progress_threshold: f32,
) -> Result<bool> {
    let height = height_grid.get(position.tile())?;
    for source in sources {
        if source.covers(position, height, height_grid, progress_threshold) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// The sources that power `position`, in input order.
pub fn covering_sources<'a>(
    position: WorldPosition,
    sources: &'a [PowerSource],
    height_grid: &TileGrid,
    progress_threshold: f32,
) -> Result<Vec<&'a PowerSource>> {
    let height = height_grid.get(position.tile())?;
    let mut covering = Vec::new();
    for source in sources {
        if source.covers(position, height, height_grid, progress_threshold) {
            covering.push(source);
        }
    }
    Ok(covering)
}

use crate::location::WorldDistance;
use crate::placement::Footprint;
use serde::{Deserialize, Serialize};

/// Power field radius of a static power structure.
pub const STATIC_POWER_RADIUS: WorldDistance = WorldDistance(6.5);

/// Power field radius of a mobile power emitter in its deployed mode.
pub const MOBILE_POWER_RADIUS: WorldDistance = WorldDistance(3.75);

/// Every Nth accepted candidate in a scan column is withheld by default.
pub const DEFAULT_GAP_INTERVAL: u32 = 4;

/// Footprint of the add-on annex built beside a production structure.
pub const ADDON_FOOTPRINT: Footprint = Footprint::new(2, 2);

/// Footprint classes of placeable structures.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingSize {
    TwoByTwo,
    ThreeByThree,
    FiveByFive,
}

impl BuildingSize {
    pub fn footprint(self) -> Footprint {
        match self {
            BuildingSize::TwoByTwo => Footprint::new(2, 2),
            BuildingSize::ThreeByThree => Footprint::new(3, 3),
            BuildingSize::FiveByFive => Footprint::new(5, 5),
        }
    }

    /// Offset from a structure's center to its top-left corner.
    pub fn half_extent(self) -> f32 {
        match self {
            BuildingSize::TwoByTwo => 1.0,
            BuildingSize::ThreeByThree => 1.5,
            BuildingSize::FiveByFive => 2.5,
        }
    }
}

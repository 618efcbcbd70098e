//! Building placement search.
//!
//! The search scans a bounded area of the map for every footprint-sized
//! window whose tiles are all clear in four layers:
//!
//! - **avoidance**: set tiles are reserved by the caller and always block;
//! - **creep**: blocks when the caller avoids creep, and its *absence* blocks
//!   when the structure must stand on creep;
//! - **placement**: the tile must be buildable;
//! - **pathing**: the tile must be walkable.
//!
//! Window clearance comes from a summed-area table over the blocked mask, so
//! each window is tested in constant time regardless of footprint size.
//! Candidate origins are sampled on a stride lattice and thinned by a
//! [`GapPolicy`] that leaves walkable rows between clusters of structures.

use crate::constants::*;
use crate::error::*;
use crate::grid::*;
use crate::location::*;
use crate::query::BoundingBox;
use bitflags::*;
use fnv::FnvHashSet;
use itertools::iproduct;
use log::*;
use serde::{Deserialize, Serialize};

/// Ground coverage of a structure in whole tiles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub width: u32,
    pub height: u32,
}

impl Footprint {
    pub const fn new(width: u32, height: u32) -> Self {
        Footprint { width, height }
    }

    /// Both sides must be non-zero and addressable with `i32` tile offsets.
    pub fn validate(self) -> Result<()> {
        if self.extent().is_none() {
            Err(GridError::InvalidFootprint {
                width: self.width,
                height: self.height,
            })
        } else {
            Ok(())
        }
    }

    /// Width and height as tile offsets, or `None` if either side is zero or
    /// too large for a tile coordinate.
    pub fn extent(self) -> Option<(i32, i32)> {
        let width = i32::try_from(self.width).ok().filter(|w| *w > 0)?;
        let height = i32::try_from(self.height).ok().filter(|h| *h > 0)?;
        Some((width, height))
    }
}

impl From<BuildingSize> for Footprint {
    fn from(size: BuildingSize) -> Self {
        size.footprint()
    }
}

bitflags! {
    /// Why a tile cannot hold part of a structure.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct BlockReason: u8 {
        const NONE = 0;
        const AVOIDED = 1;
        const CREEP = 2;
        const UNBUILDABLE = 4;
        const UNPATHABLE = 8;
    }
}

/// A clear window found by the search.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// Top-left tile of the footprint.
    pub origin: TilePoint,
    pub footprint: Footprint,
}

impl Placement {
    pub fn new(origin: TilePoint, footprint: Footprint) -> Self {
        Placement { origin, footprint }
    }

    /// The placement of a structure of class `size` centered at `center`.
    pub fn from_center(center: WorldPosition, size: BuildingSize) -> Self {
        let offset = size.half_extent();
        let corner = WorldPosition::new(center.x - offset, center.y - offset);
        Placement::new(corner.tile(), size.footprint())
    }

    /// Structure center in world coordinates: origin plus half the footprint.
    pub fn center(&self) -> WorldPosition {
        WorldPosition::new(
            self.origin.x() as f32 + self.footprint.width as f32 / 2.0,
            self.origin.y() as f32 + self.footprint.height as f32 / 2.0,
        )
    }

    /// The tile containing [`Placement::center`].
    pub fn center_tile(&self) -> TilePoint {
        self.origin
            + (
                (self.footprint.width / 2) as i32,
                (self.footprint.height / 2) as i32,
            )
    }

    /// Every tile covered by the footprint. Tiles past `i32::MAX` are cut off.
    pub fn tiles(&self) -> impl Iterator<Item = TilePoint> {
        let (x0, y0) = (self.origin.x(), self.origin.y());
        let (w, h) = self.footprint.extent().unwrap_or((0, 0));
        iproduct!(x0..x0.saturating_add(w), y0..y0.saturating_add(h))
            .map(|(x, y)| TilePoint::new(x, y))
    }

    /// The tile diagonally opposite the origin, if it is representable.
    pub fn far_corner(&self) -> Option<TilePoint> {
        let (w, h) = self.footprint.extent()?;
        let x = self.origin.x().checked_add(w - 1)?;
        let y = self.origin.y().checked_add(h - 1)?;
        Some(TilePoint::new(x, y))
    }

    pub fn overlaps(&self, other: &Placement) -> bool {
        let (ax, ay) = (self.origin.x() as i64, self.origin.y() as i64);
        let (bx, by) = (other.origin.x() as i64, other.origin.y() as i64);
        ax < bx + other.footprint.width as i64
            && bx < ax + self.footprint.width as i64
            && ay < by + other.footprint.height as i64
            && by < ay + self.footprint.height as i64
    }
}

/// Thinning applied to each scan column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GapPolicy {
    /// Emit every clear window on the stride lattice.
    Disabled,
    /// Withhold every Nth accepted candidate of a column. The withheld row
    /// is remembered and skipped in every later column, leaving a walkable
    /// corridor so ground units are never sealed in by a solid block of
    /// structures. `WithholdEvery(0)` behaves like `Disabled`.
    WithholdEvery(u32),
}

impl Default for GapPolicy {
    fn default() -> Self {
        GapPolicy::WithholdEvery(DEFAULT_GAP_INTERVAL)
    }
}

/// The four layers consulted for placement legality.
#[derive(Copy, Clone)]
pub struct PlacementGrids<'a> {
    pub creep: &'a TileGrid,
    pub placement: &'a TileGrid,
    pub pathing: &'a TileGrid,
    /// `None` skips the avoidance test.
    pub avoidance: Option<&'a TileGrid>,
}

impl<'a> PlacementGrids<'a> {
    /// All layers must describe the same map.
    pub fn check(&self) -> Result<()> {
        self.placement.check_dimensions(self.creep)?;
        self.placement.check_dimensions(self.pathing)?;
        if let Some(avoidance) = self.avoidance {
            self.placement.check_dimensions(avoidance)?;
        }
        Ok(())
    }

    /// Block reasons for an on-grid tile.
    pub fn block_reason_xy(&self, x: usize, y: usize, avoid_creep: bool) -> BlockReason {
        let mut reason = BlockReason::NONE;
        if self.avoidance.map(|g| g.is_set_xy(x, y)).unwrap_or(false) {
            reason |= BlockReason::AVOIDED;
        }
        if self.creep.is_set_xy(x, y) == avoid_creep {
            reason |= BlockReason::CREEP;
        }
        if !self.placement.is_set_xy(x, y) {
            reason |= BlockReason::UNBUILDABLE;
        }
        if !self.pathing.is_set_xy(x, y) {
            reason |= BlockReason::UNPATHABLE;
        }
        reason
    }

    /// Whether every tile of the footprint at `origin` lies on the map and
    /// is clear.
    pub fn footprint_clear(&self, origin: TilePoint, footprint: Footprint, avoid_creep: bool) -> bool {
        let placement = Placement::new(origin, footprint);
        let on_map = match placement.far_corner() {
            Some(far) => self.placement.contains(origin) && self.placement.contains(far),
            None => false,
        };
        on_map
            && placement.tiles().all(|tile| {
                self.block_reason_xy(tile.x() as usize, tile.y() as usize, avoid_creep)
                    .is_empty()
            })
    }
}

/// Per-tile block reasons over a bounded area.
pub struct BlockedMask {
    bounds: BoundingBox,
    width: usize,
    height: usize,
    reasons: Vec<BlockReason>,
}

impl BlockedMask {
    /// Build the mask for `bounds`, which must lie on the grids.
    pub fn build(grids: &PlacementGrids, bounds: BoundingBox, avoid_creep: bool) -> Result<Self> {
        grids.check()?;
        for corner in [
            TilePoint::new(bounds.x_min, bounds.y_min),
            TilePoint::new(bounds.x_max, bounds.y_max),
        ] {
            grids.placement.check_bounds(corner)?;
        }

        let width = bounds.width().max(0) as usize;
        let height = bounds.height().max(0) as usize;
        let mut reasons = Vec::with_capacity(width * height);
        for ly in 0..height {
            for lx in 0..width {
                let x = bounds.x_min as usize + lx;
                let y = bounds.y_min as usize + ly;
                reasons.push(grids.block_reason_xy(x, y, avoid_creep));
            }
        }

        Ok(BlockedMask {
            bounds,
            width,
            height,
            reasons,
        })
    }

    /// Block reasons for a map tile, or `None` outside the mask's bounds.
    pub fn reason(&self, point: TilePoint) -> Option<BlockReason> {
        if !self.bounds.contains(point) {
            return None;
        }
        let lx = (point.x() - self.bounds.x_min) as usize;
        let ly = (point.y() - self.bounds.y_min) as usize;
        Some(self.reasons[ly * self.width + lx])
    }

    pub fn blocked_count(&self) -> usize {
        self.reasons.iter().filter(|r| !r.is_empty()).count()
    }
}

/// Summed-area table of blocked tiles. Entry `(x, y)` holds the number of
/// blocked tiles in the local rectangle `[0, x) x [0, y)`.
struct BlockedSums {
    stride: usize,
    sums: Vec<u32>,
}

impl BlockedSums {
    fn new(mask: &BlockedMask) -> Self {
        let stride = mask.width + 1;
        let mut sums = vec![0u32; stride * (mask.height + 1)];
        for y in 0..mask.height {
            let mut row = 0u32;
            for x in 0..mask.width {
                row += !mask.reasons[y * mask.width + x].is_empty() as u32;
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row;
            }
        }
        BlockedSums { stride, sums }
    }

    /// Blocked tiles in the local window with top-left `(x, y)`.
    #[inline]
    fn window(&self, x: usize, y: usize, w: usize, h: usize) -> u32 {
        let at = |x: usize, y: usize| self.sums[y * self.stride + x];
        at(x + w, y + h) + at(x, y) - at(x + w, y) - at(x, y + h)
    }
}

fn default_stride() -> u32 {
    1
}

fn default_avoid_creep() -> bool {
    true
}

/// Placement search parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacementQuery {
    pub footprint: Footprint,
    /// Inclusive area to scan. Footprints never extend past it.
    pub bounds: BoundingBox,
    #[serde(default = "default_stride")]
    pub x_stride: u32,
    #[serde(default = "default_stride")]
    pub y_stride: u32,
    /// `true`: creep blocks. `false`: the structure must stand on creep.
    #[serde(default = "default_avoid_creep")]
    pub avoid_creep: bool,
    #[serde(default)]
    pub gap: GapPolicy,
    /// Reserve each emitted footprint so later candidates cannot overlap it.
    #[serde(default)]
    pub reserve_footprints: bool,
    /// Also clear the add-on annex to the right of each footprint. The scan
    /// window widens by the annex; placements keep the building footprint.
    #[serde(default)]
    pub addon: bool,
}

impl PlacementQuery {
    pub fn new(footprint: Footprint, bounds: BoundingBox) -> Self {
        PlacementQuery {
            footprint,
            bounds,
            x_stride: default_stride(),
            y_stride: default_stride(),
            avoid_creep: default_avoid_creep(),
            gap: GapPolicy::default(),
            reserve_footprints: false,
            addon: false,
        }
    }

    pub fn with_stride(mut self, x_stride: u32, y_stride: u32) -> Self {
        self.x_stride = x_stride;
        self.y_stride = y_stride;
        self
    }

    pub fn with_avoid_creep(mut self, avoid_creep: bool) -> Self {
        self.avoid_creep = avoid_creep;
        self
    }

    pub fn with_gap(mut self, gap: GapPolicy) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_reserved_footprints(mut self, reserve: bool) -> Self {
        self.reserve_footprints = reserve;
        self
    }

    pub fn with_addon(mut self, addon: bool) -> Self {
        self.addon = addon;
        self
    }

    /// Size of the window that must be clear for one candidate.
    fn scan_window(&self) -> (usize, usize) {
        let (fw, fh) = (self.footprint.width as usize, self.footprint.height as usize);
        if self.addon {
            (
                fw + ADDON_FOOTPRINT.width as usize,
                fh.max(ADDON_FOOTPRINT.height as usize),
            )
        } else {
            (fw, fh)
        }
    }

    /// Scan the bounds and return every emitted placement, column by
    /// column (`x` ascending, then `y` ascending).
    pub fn run(&self, grids: &PlacementGrids) -> Result<Vec<Placement>> {
        self.footprint.validate()?;
        if self.x_stride == 0 || self.y_stride == 0 {
            return Err(GridError::InvalidStride {
                x_stride: self.x_stride,
                y_stride: self.y_stride,
            });
        }

        let mask = BlockedMask::build(grids, self.bounds, self.avoid_creep)?;

        let (fw, fh) = self.scan_window();
        if fw > mask.width || fh > mask.height {
            debug!(
                "Placement scan: {}x{} window does not fit {}x{} bounds",
                fw, fh, mask.width, mask.height
            );
            return Ok(Vec::new());
        }

        let sums = BlockedSums::new(&mask);
        let gap_interval = match self.gap {
            GapPolicy::WithholdEvery(n) if n > 0 => Some(n),
            _ => None,
        };

        let mut placements = Vec::new();
        let mut gap_rows: FnvHashSet<usize> = FnvHashSet::default();
        let mut reserved = if self.reserve_footprints {
            vec![false; mask.width * mask.height]
        } else {
            Vec::new()
        };
        let mut withheld = 0usize;

        for lx in (0..=mask.width - fw).step_by(self.x_stride as usize) {
            let mut accepted = 0u32;
            for ly in (0..=mask.height - fh).step_by(self.y_stride as usize) {
                if sums.window(lx, ly, fw, fh) != 0 || gap_rows.contains(&ly) {
                    continue;
                }
                if self.reserve_footprints
                    && iproduct!(lx..lx + fw, ly..ly + fh).any(|(x, y)| reserved[y * mask.width + x])
                {
                    continue;
                }

                accepted += 1;
                if let Some(interval) = gap_interval {
                    if accepted % interval == 0 {
                        trace!(
                            "Placement scan: withholding row {} at column {}",
                            self.bounds.y_min + ly as i32,
                            self.bounds.x_min + lx as i32
                        );
                        gap_rows.insert(ly);
                        withheld += 1;
                        continue;
                    }
                }

                if self.reserve_footprints {
                    for (x, y) in iproduct!(lx..lx + fw, ly..ly + fh) {
                        reserved[y * mask.width + x] = true;
                    }
                }

                let origin = TilePoint::new(self.bounds.x_min + lx as i32, self.bounds.y_min + ly as i32);
                placements.push(Placement::new(origin, self.footprint));
            }
        }

        debug!(
            "Placement scan {}x{} over ({}..={}, {}..={}): {} blocked tiles, {} placements, {} withheld",
            fw,
            fh,
            self.bounds.x_min,
            self.bounds.x_max,
            self.bounds.y_min,
            self.bounds.y_max,
            mask.blocked_count(),
            placements.len(),
            withheld
        );

        Ok(placements)
    }
}

/// Find placements for `footprint` inside `bounds` with the default gap
/// policy. See [`PlacementQuery`] for the remaining knobs.
#[allow(clippy::too_many_arguments)]
pub fn find_placements(
    footprint: Footprint,
    bounds: BoundingBox,
    x_stride: u32,
    y_stride: u32,
    creep: &TileGrid,
    placement: &TileGrid,
    pathing: &TileGrid,
    avoidance: &TileGrid,
    avoid_creep: bool,
) -> Result<Vec<Placement>> {
    let grids = PlacementGrids {
        creep,
        placement,
        pathing,
        avoidance: Some(avoidance),
    };
    PlacementQuery::new(footprint, bounds)
        .with_stride(x_stride, y_stride)
        .with_avoid_creep(avoid_creep)
        .run(&grids)
}

/// Whether a single structure fits with its top-left corner at `origin`.
///
/// The avoidance layer is not consulted: it reserves tiles for the search,
/// not for structures the caller has already decided on. With
/// `include_addon`, the add-on annex to the right of the structure must fit
/// as well. Footprints running off the map do not fit.
pub fn can_place_structure(
    origin: TilePoint,
    footprint: Footprint,
    creep: &TileGrid,
    placement: &TileGrid,
    pathing: &TileGrid,
    avoid_creep: bool,
    include_addon: bool,
) -> Result<bool> {
    footprint.validate()?;
    let grids = PlacementGrids {
        creep,
        placement,
        pathing,
        avoidance: None,
    };
    grids.check()?;

    if !grids.footprint_clear(origin, footprint, avoid_creep) {
        return Ok(false);
    }
    if include_addon {
        let (width, _) = footprint.extent().ok_or(GridError::InvalidFootprint {
            width: footprint.width,
            height: footprint.height,
        })?;
        return Ok(match origin.x().checked_add(width) {
            Some(x) => {
                let addon_origin = TilePoint::new(x, origin.y());
                grids.footprint_clear(addon_origin, ADDON_FOOTPRINT, avoid_creep)
            }
            None => false,
        });
    }
    Ok(true)
}

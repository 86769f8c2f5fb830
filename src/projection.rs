//! Mapping physical pixels onto an effect's logical grid.
//!
//! A projection answers one question for every physical pixel inside a
//! row's bounding box: *which logical pixel of the effect drives it?* The
//! answer is computed during remap, cached in the row's mapping table, and
//! never recomputed per frame.
//!
//! Every projection follows the same pipeline ([`Projection::setup`]):
//!
//! 1. [`adjust`](Projection::adjust) reshapes the [`Geometry`] (tiling,
//!    mirroring, grouping, swapping axes) before anything else sees it.
//! 2. [`logical_size`](Projection::logical_size) fixes the row's logical
//!    grid, once per remap.
//! 3. [`map`](Projection::map) turns the adjusted pixel into a logical
//!    coordinate; [`flatten`] turns that into an index or [`NOT_SHOWN`].
//! 4. [`post_process`](Projection::post_process) may rewrite the index.
//!
//! Steps 2 and 3 default to the dimension-reconciliation table in
//! [`adjust_size_and_pixel`] and [`adjust_mapped`].
//!
//! Projections are zero-sized. Their settings live in the row's projection
//! arena and are read back by positional replay.
#![expect(clippy::arithmetic_side_effects, reason = "logical sizes are bounded by the arena-held settings")]

mod distance;
mod pinwheel;
mod tilt_pan_roll;
mod transforms;

pub use distance::{DistanceFromPointProjection, polar_landing};
pub use pinwheel::{PinwheelProjection, ROTATIONAL_SYMMETRY, petal_for};
pub use tilt_pan_roll::{Rotation, TiltPanRollProjection};
pub use transforms::{
    DefaultProjection, GroupingProjection, MirrorProjection, MultiplyProjection, NoneProjection,
    Preset1Projection, ReverseProjection, TransposeProjection,
};

use crate::arena::{ArenaReader, PROJECTION_ARENA_BYTES, StateArena};
use crate::controls::Controls;
use crate::frame::FrameContext;
use crate::{Coord3D, Dimension, Error, Result};

/// Index meaning "this physical pixel has no logical source" (and the reverse).
pub const NOT_SHOWN: u16 = u16::MAX;

/// Arena reader type projections replay their settings from.
pub type ProjectionState<'a> = ArenaReader<'a, PROJECTION_ARENA_BYTES>;
/// Control builder type projections declare their settings with.
pub type ProjectionControls<'a> = Controls<'a, PROJECTION_ARENA_BYTES>;

/// Declared dimensions of the effect and of the projection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dims {
    /// What the effect was written for.
    pub effect: Dimension,
    /// How many axes of the row's bounding box actually vary.
    pub projection: Dimension,
}

impl Dims {
    /// Pair an effect dimension with a projection dimension.
    #[must_use]
    pub const fn new(effect: Dimension, projection: Dimension) -> Self {
        Self { effect, projection }
    }
}

/// The coordinates one physical pixel is resolved against.
///
/// `size`, `pixel`, and `mid` start out relative to the row's bounding box
/// and are reshaped by [`Projection::adjust`]. `box_size` is never adjusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    /// Extent being mapped.
    pub size: Coord3D,
    /// The physical pixel, relative to the box start.
    pub pixel: Coord3D,
    /// Center used for distance and angle math.
    pub mid: Coord3D,
    /// Unadjusted bounding box extent.
    pub box_size: Coord3D,
}

impl Geometry {
    /// Geometry for `pixel` inside a box of `size` centered on `mid`.
    #[must_use]
    pub fn new(size: Coord3D, pixel: Coord3D, mid: Coord3D) -> Self {
        let size = size.maximum(Coord3D::ONE);
        Self {
            size,
            pixel,
            mid,
            box_size: size,
        }
    }
}

/// A transform applied to logical coordinates every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PixelTransform {
    /// Coordinates pass through.
    #[default]
    Identity,
    /// Rotate about a center (tilt, pan, roll).
    Rotate(Rotation),
}

impl PixelTransform {
    /// Transform one logical coordinate.
    #[must_use]
    pub fn apply(&self, pixel: Coord3D) -> Coord3D {
        match self {
            Self::Identity => pixel,
            Self::Rotate(rotation) => rotation.apply(pixel),
        }
    }

    /// True if coordinates pass through unchanged.
    #[must_use]
    pub const fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }
}

/// A coordinate transform from a row's physical layout to an effect's logical grid.
///
/// Implementors must be zero-sized; everything they remember goes through
/// [`controls`](Self::controls) into the row's projection arena.
pub trait Projection: Sync {
    /// Display name.
    fn name(&self) -> &'static str;

    /// Declare settings. Runs on selection with a freshly zeroed arena.
    ///
    /// # Errors
    ///
    /// Arena or control-list overflow.
    fn controls(&self, _dims: Dims, _controls: &mut ProjectionControls<'_>) -> Result<()> {
        Ok(())
    }

    /// Reshape the geometry before the logical grid is derived.
    ///
    /// # Errors
    ///
    /// Arena overflow while replaying settings.
    fn adjust(
        &self,
        _dims: Dims,
        _geometry: &mut Geometry,
        _state: &mut ProjectionState<'_>,
    ) -> Result<()> {
        Ok(())
    }

    /// The row's logical grid size. Called once per remap.
    ///
    /// # Errors
    ///
    /// Arena overflow while replaying settings.
    fn logical_size(
        &self,
        dims: Dims,
        geometry: &Geometry,
        _state: &mut ProjectionState<'_>,
    ) -> Result<Coord3D> {
        Ok(adjust_size_and_pixel(dims, geometry))
    }

    /// Logical coordinate of the adjusted pixel.
    ///
    /// # Errors
    ///
    /// Arena overflow while replaying settings.
    fn map(
        &self,
        dims: Dims,
        geometry: &Geometry,
        logical_size: Coord3D,
        _state: &mut ProjectionState<'_>,
    ) -> Result<Coord3D> {
        Ok(adjust_mapped(dims, geometry, logical_size))
    }

    /// Rewrite the flattened logical index.
    fn post_process(&self, _dims: Dims, _logical_size: Coord3D, index: u16) -> u16 {
        index
    }

    /// The transform effects' coordinates go through this frame.
    ///
    /// # Errors
    ///
    /// Arena overflow while replaying settings.
    fn frame_transform(
        &self,
        _state: &mut ProjectionState<'_>,
        _frame: &FrameContext,
        _logical_size: Coord3D,
        _fixture_size: Coord3D,
    ) -> Result<PixelTransform> {
        Ok(PixelTransform::Identity)
    }

    /// Resolve one physical pixel to a logical index.
    ///
    /// `row_size` is the row's logical size: `None` on the first pixel of a
    /// remap, after which this fills it in and every later pixel reuses it.
    ///
    /// # Errors
    ///
    /// Arena overflow, or [`Error::LogicalGridTooLarge`] if the grid cannot
    /// be addressed by a `u16` index.
    fn setup(
        &self,
        dims: Dims,
        geometry: Geometry,
        row_size: &mut Option<Coord3D>,
        state: &mut StateArena<PROJECTION_ARENA_BYTES>,
    ) -> Result<u16> {
        let mut geometry = geometry;
        self.adjust(dims, &mut geometry, &mut state.replay())?;
        let logical_size = if let Some(size) = *row_size {
            size
        } else {
            let size = self
                .logical_size(dims, &geometry, &mut state.replay())?
                .maximum(Coord3D::ONE);
            check_grid(size)?;
            *row_size = Some(size);
            size
        };
        let mapped = self.map(dims, &geometry, logical_size, &mut state.replay())?;
        Ok(self.post_process(dims, logical_size, flatten(mapped, logical_size)))
    }
}

fn check_grid(size: Coord3D) -> Result<()> {
    let cells = size.volume();
    if cells >= i64::from(NOT_SHOWN) {
        return Err(Error::LogicalGridTooLarge {
            cells: u32::try_from(cells).unwrap_or(u32::MAX),
        });
    }
    Ok(())
}

/// Row-major index of `mapped` within `size`, or [`NOT_SHOWN`] if outside it.
#[must_use]
pub fn flatten(mapped: Coord3D, size: Coord3D) -> u16 {
    if mapped.is_out_of_bounds(size) {
        return NOT_SHOWN;
    }
    let index = i64::from(mapped.x)
        + i64::from(mapped.y) * i64::from(size.x)
        + i64::from(mapped.z) * i64::from(size.x) * i64::from(size.y);
    u16::try_from(index)
        .ok()
        .filter(|index| *index != NOT_SHOWN)
        .unwrap_or(NOT_SHOWN)
}

/// Inverse of [`flatten`].
#[must_use]
pub fn unflatten(index: u16, size: Coord3D) -> Coord3D {
    let size = size.maximum(Coord3D::ONE);
    let index = i32::from(index);
    Coord3D::new(
        index % size.x,
        (index / size.x) % size.y,
        index / (size.x * size.y),
    )
}

/// Logical grid size for `geometry` under the dimension-reconciliation table.
///
/// | effect | projection | logical size |
/// |---|---|---|
/// | 1D | any | radius from `mid` to the farthest corner, plus one |
/// | 2D | 1D | `isqrt(cells)` × `cells / isqrt(cells)` |
/// | 2D | 2D | the two axes that vary |
/// | 2D | 3D | `(x + y/2, y/2 + z)` |
/// | 3D | 1D | truncated cube root on x and y, the rest stacked on z |
/// | 3D | 2D, 3D | unchanged |
///
/// All arithmetic truncates. Every axis of the result is at least one.
#[must_use]
pub fn adjust_size_and_pixel(dims: Dims, geometry: &Geometry) -> Coord3D {
    let size = geometry.size.maximum(Coord3D::ONE);
    let size = match (dims.effect, dims.projection) {
        (Dimension::D1, _) => Coord3D::new(radius(size, geometry.mid) + 1, 1, 1),
        (Dimension::D2, Dimension::D1) => {
            let cells = size.volume();
            let x = isqrt(cells).max(1);
            Coord3D::new(x, clamp_i32(cells / i64::from(x)), 1)
        }
        (Dimension::D2, Dimension::D2) => {
            if size.x > 1 {
                Coord3D::new(size.x, if size.y > 1 { size.y } else { size.z }, 1)
            } else {
                Coord3D::new(size.y, size.z, 1)
            }
        }
        (Dimension::D2, Dimension::D3) => Coord3D::new(size.x + size.y / 2, size.y / 2 + size.z, 1),
        (Dimension::D3, Dimension::D1) => {
            let cells = size.volume();
            let side = icbrt(cells).max(1);
            let layer = i64::from(side) * i64::from(side);
            Coord3D::new(side, side, clamp_i32((cells + layer - 1) / layer))
        }
        (Dimension::D3, Dimension::D2 | Dimension::D3) => size,
    };
    size.maximum(Coord3D::ONE)
}

/// Logical coordinate of `geometry.pixel` under the dimension-reconciliation table.
#[must_use]
pub fn adjust_mapped(dims: Dims, geometry: &Geometry, logical_size: Coord3D) -> Coord3D {
    let pixel = geometry.pixel;
    let size = geometry.size;
    let logical_size = logical_size.maximum(Coord3D::ONE);
    match (dims.effect, dims.projection) {
        (Dimension::D1, _) => Coord3D::new(isqrt((pixel - geometry.mid).squared_length()), 0, 0),
        (Dimension::D2, Dimension::D1) => {
            let linear = pixel.x + pixel.y + pixel.z;
            Coord3D::new(linear % logical_size.x, linear / logical_size.x, 0)
        }
        (Dimension::D2, Dimension::D2) => {
            if size.x > 1 {
                Coord3D::new(pixel.x, if size.y > 1 { pixel.y } else { pixel.z }, 0)
            } else {
                Coord3D::new(pixel.y, pixel.z, 0)
            }
        }
        (Dimension::D2, Dimension::D3) => {
            Coord3D::new(pixel.x + pixel.y / 2, pixel.y / 2 + pixel.z, 0)
        }
        (Dimension::D3, Dimension::D1) => {
            let linear = pixel.x + pixel.y + pixel.z;
            let side = logical_size.x;
            Coord3D::new(linear % side, (linear / side) % side, linear / (side * side))
        }
        (Dimension::D3, Dimension::D2 | Dimension::D3) => pixel,
    }
}

/// Truncated distance from `mid` to the farthest corner of a box of `size`.
pub(crate) fn radius(size: Coord3D, mid: Coord3D) -> i32 {
    let extent = size - Coord3D::ONE;
    let reach = (extent - mid).maximum(mid);
    isqrt(reach.squared_length())
}

/// Largest `r` with `r * r <= value`.
pub(crate) fn isqrt(value: i64) -> i32 {
    if value <= 0 {
        return 0;
    }
    let mut root = libm::sqrt(value as f64) as i64;
    while root * root > value {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= value {
        root += 1;
    }
    clamp_i32(root)
}

/// Largest `r` with `r * r * r <= value`.
pub(crate) fn icbrt(value: i64) -> i32 {
    if value <= 0 {
        return 0;
    }
    let mut root = libm::cbrt(value as f64) as i64;
    while root * root * root > value {
        root -= 1;
    }
    while (root + 1) * (root + 1) * (root + 1) <= value {
        root += 1;
    }
    clamp_i32(root)
}

fn clamp_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// Every registered projection, by selector index.
pub static PROJECTIONS: [&dyn Projection; 11] = [
    &NoneProjection,
    &DefaultProjection,
    &PinwheelProjection,
    &MultiplyProjection,
    &TiltPanRollProjection,
    &DistanceFromPointProjection,
    &Preset1Projection,
    &ReverseProjection,
    &MirrorProjection,
    &GroupingProjection,
    &TransposeProjection,
];

/// Selector index of the default projection.
pub const DEFAULT_PROJECTION: usize = 1;

/// The projection registered at `index`.
///
/// # Errors
///
/// [`Error::ProjectionIndexOutOfRange`].
pub fn projection(index: usize) -> Result<&'static dyn Projection> {
    PROJECTIONS
        .get(index)
        .copied()
        .ok_or(Error::ProjectionIndexOutOfRange(index))
}

/// Selector index of the projection called `name`.
#[must_use]
pub fn projection_index(name: &str) -> Option<usize> {
    PROJECTIONS.iter().position(|projection| projection.name() == name)
}

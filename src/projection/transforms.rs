//! Projections that reshape the geometry and then defer to the default fold.
#![expect(clippy::arithmetic_side_effects, reason = "grouping and tiling factors are at least one")]

use super::{Dims, Geometry, PixelTransform, Projection, ProjectionControls, ProjectionState};
use super::tilt_pan_roll::{TiltPanRollProjection, TiltPanRollSettings};
use crate::frame::FrameContext;
use crate::{Coord3D, Dimension, Result};

/// Identity: every physical pixel maps to the same coordinate in a grid the
/// size of the bounding box, whatever the effect's dimension.
pub struct NoneProjection;

impl Projection for NoneProjection {
    fn name(&self) -> &'static str {
        "None"
    }

    fn logical_size(
        &self,
        _dims: Dims,
        geometry: &Geometry,
        _state: &mut ProjectionState<'_>,
    ) -> Result<Coord3D> {
        Ok(geometry.size)
    }

    fn map(
        &self,
        _dims: Dims,
        geometry: &Geometry,
        _logical_size: Coord3D,
        _state: &mut ProjectionState<'_>,
    ) -> Result<Coord3D> {
        Ok(geometry.pixel)
    }
}

/// The dimension-reconciliation table on its own.
pub struct DefaultProjection;

impl Projection for DefaultProjection {
    fn name(&self) -> &'static str {
        "Default"
    }
}

/// Tile the effect: shrink the grid by an integer factor per axis and wrap
/// (or mirror) every tile onto the first one.
pub struct MultiplyProjection;

pub(super) struct MultiplySettings {
    factor: Coord3D,
    mirror: bool,
}

impl MultiplySettings {
    pub(super) fn declare(controls: &mut ProjectionControls<'_>) -> Result<()> {
        controls.coord(
            "multiply",
            Coord3D::new(2, 2, 1),
            Coord3D::ZERO,
            Coord3D::splat(10),
        )?;
        controls.checkbox("mirror", false)?;
        Ok(())
    }

    pub(super) fn read(state: &mut ProjectionState<'_>) -> Result<Self> {
        Ok(Self {
            factor: state.read()?,
            mirror: state.read()?,
        })
    }

    pub(super) fn apply(&self, geometry: &mut Geometry) {
        let factor = self.factor.maximum(Coord3D::ONE);
        if factor == Coord3D::ONE {
            return;
        }
        geometry.size = geometry.size.div_ceil(factor);
        geometry.mid = geometry.mid / factor;

        let tiles = geometry.pixel / geometry.size;
        geometry.pixel = geometry.pixel % geometry.size;
        if self.mirror {
            let far = geometry.size - Coord3D::ONE - geometry.pixel;
            if tiles.x % 2 != 0 {
                geometry.pixel.x = far.x;
            }
            if tiles.y % 2 != 0 {
                geometry.pixel.y = far.y;
            }
            if tiles.z % 2 != 0 {
                geometry.pixel.z = far.z;
            }
        }
    }
}

impl Projection for MultiplyProjection {
    fn name(&self) -> &'static str {
        "Multiply"
    }

    fn controls(&self, _dims: Dims, controls: &mut ProjectionControls<'_>) -> Result<()> {
        MultiplySettings::declare(controls)
    }

    fn adjust(
        &self,
        _dims: Dims,
        geometry: &mut Geometry,
        state: &mut ProjectionState<'_>,
    ) -> Result<()> {
        MultiplySettings::read(state)?.apply(geometry);
        Ok(())
    }
}

/// Fold the far half of selected axes onto the near half.
///
/// The halved size is derived from the unadjusted box, so folding is
/// idempotent.
pub struct MirrorProjection;

impl Projection for MirrorProjection {
    fn name(&self) -> &'static str {
        "Mirror"
    }

    fn controls(&self, dims: Dims, controls: &mut ProjectionControls<'_>) -> Result<()> {
        controls.checkbox("mirror x", false)?;
        if dims.projection >= Dimension::D2 {
            controls.checkbox("mirror y", false)?;
        } else {
            controls.state(false)?;
        }
        if dims.projection == Dimension::D3 {
            controls.checkbox("mirror z", false)?;
        } else {
            controls.state(false)?;
        }
        Ok(())
    }

    fn adjust(
        &self,
        _dims: Dims,
        geometry: &mut Geometry,
        state: &mut ProjectionState<'_>,
    ) -> Result<()> {
        let flags: [bool; 3] = [state.read()?, state.read()?, state.read()?];
        let whole = geometry.box_size;
        let axes = [
            (flags[0], whole.x, &mut geometry.pixel.x, &mut geometry.size.x),
            (flags[1], whole.y, &mut geometry.pixel.y, &mut geometry.size.y),
            (flags[2], whole.z, &mut geometry.pixel.z, &mut geometry.size.z),
        ];
        for (enabled, whole, pixel, size) in axes {
            if enabled {
                if *pixel >= whole / 2 {
                    *pixel = whole - 1 - *pixel;
                }
                *size = (whole + 1) / 2;
            }
        }
        Ok(())
    }
}

/// Gang `factor` physical pixels together as one logical pixel per axis.
pub struct GroupingProjection;

impl Projection for GroupingProjection {
    fn name(&self) -> &'static str {
        "Grouping"
    }

    fn controls(&self, _dims: Dims, controls: &mut ProjectionControls<'_>) -> Result<()> {
        controls.coord("grouping", Coord3D::ONE, Coord3D::ZERO, Coord3D::splat(100))?;
        Ok(())
    }

    fn adjust(
        &self,
        _dims: Dims,
        geometry: &mut Geometry,
        state: &mut ProjectionState<'_>,
    ) -> Result<()> {
        let grouping = state.read::<Coord3D>()?.maximum(Coord3D::ONE);
        if grouping == Coord3D::ONE {
            return Ok(());
        }
        geometry.mid = geometry.mid / grouping;
        geometry.pixel = geometry.pixel / grouping;
        geometry.size = geometry.size.div_ceil(grouping);
        Ok(())
    }
}

/// Swap pairs of axes.
pub struct TransposeProjection;

impl Projection for TransposeProjection {
    fn name(&self) -> &'static str {
        "Transpose"
    }

    fn controls(&self, dims: Dims, controls: &mut ProjectionControls<'_>) -> Result<()> {
        controls.checkbox("transpose xy", false)?;
        if dims.effect == Dimension::D3 {
            controls.checkbox("transpose xz", false)?;
            controls.checkbox("transpose yz", false)?;
        } else {
            controls.state(false)?;
            controls.state(false)?;
        }
        Ok(())
    }

    fn adjust(
        &self,
        _dims: Dims,
        geometry: &mut Geometry,
        state: &mut ProjectionState<'_>,
    ) -> Result<()> {
        let (xy, xz, yz): (bool, bool, bool) = (state.read()?, state.read()?, state.read()?);
        for coord in [&mut geometry.pixel, &mut geometry.size, &mut geometry.mid] {
            if xy {
                core::mem::swap(&mut coord.x, &mut coord.y);
            }
            if xz {
                core::mem::swap(&mut coord.x, &mut coord.z);
            }
            if yz {
                core::mem::swap(&mut coord.y, &mut coord.z);
            }
        }
        Ok(())
    }
}

/// Run selected axes backwards.
pub struct ReverseProjection;

impl Projection for ReverseProjection {
    fn name(&self) -> &'static str {
        "Reverse"
    }

    fn controls(&self, dims: Dims, controls: &mut ProjectionControls<'_>) -> Result<()> {
        controls.checkbox("reverse x", false)?;
        if dims.effect >= Dimension::D2 || dims.projection >= Dimension::D2 {
            controls.checkbox("reverse y", false)?;
        } else {
            controls.state(false)?;
        }
        if dims.effect == Dimension::D3 || dims.projection == Dimension::D3 {
            controls.checkbox("reverse z", false)?;
        } else {
            controls.state(false)?;
        }
        Ok(())
    }

    fn adjust(
        &self,
        _dims: Dims,
        geometry: &mut Geometry,
        state: &mut ProjectionState<'_>,
    ) -> Result<()> {
        let (x, y, z): (bool, bool, bool) = (state.read()?, state.read()?, state.read()?);
        let size = geometry.size;
        let pixel = &mut geometry.pixel;
        if x {
            pixel.x = size.x - pixel.x - 1;
        }
        if y {
            pixel.y = size.y - pixel.y - 1;
        }
        if z {
            pixel.z = size.z - pixel.z - 1;
        }
        Ok(())
    }
}

/// Multiply tiling plus tilt/pan/roll animation, under one selector.
pub struct Preset1Projection;

impl Projection for Preset1Projection {
    fn name(&self) -> &'static str {
        "Preset1"
    }

    fn controls(&self, dims: Dims, controls: &mut ProjectionControls<'_>) -> Result<()> {
        MultiplySettings::declare(controls)?;
        TiltPanRollProjection.controls(dims, controls)
    }

    fn adjust(
        &self,
        _dims: Dims,
        geometry: &mut Geometry,
        state: &mut ProjectionState<'_>,
    ) -> Result<()> {
        MultiplySettings::read(state)?.apply(geometry);
        Ok(())
    }

    fn frame_transform(
        &self,
        state: &mut ProjectionState<'_>,
        frame: &FrameContext,
        logical_size: Coord3D,
        fixture_size: Coord3D,
    ) -> Result<PixelTransform> {
        MultiplySettings::read(state)?;
        Ok(TiltPanRollSettings::read(state)?.transform(frame, logical_size, fixture_size))
    }
}

//! Radial "petal" buckets around the row's midpoint.
#![expect(clippy::arithmetic_side_effects, reason = "angles and radii fit in i32")]

use super::{Dims, Geometry, Projection, ProjectionControls, ProjectionState, isqrt, radius};
use crate::{Coord3D, Dimension, Result};

/// Divisors of 360 selectable as rotational symmetry, most to least symmetric.
pub const ROTATIONAL_SYMMETRY: [i32; 23] = [
    360, 180, 120, 90, 72, 60, 45, 40, 36, 30, 24, 20, 18, 15, 12, 10, 9, 8, 6, 5, 4, 3, 2,
];

/// Buckets each pixel's angle around the midpoint into `petals` logical
/// pixels, with optional swirl (angle grows with radius) and z twist.
///
/// A 1D effect sees `petals` pixels. A 2D or 3D effect on a 2D or 3D box
/// also gets the radius as its second axis.
pub struct PinwheelProjection;

struct PinwheelSettings {
    petals: i32,
    swirl: i32,
    reverse: bool,
    symmetry: i32,
    z_twist: i32,
}

impl PinwheelSettings {
    fn read(state: &mut ProjectionState<'_>) -> Result<Self> {
        let petals = i32::from(state.read::<u8>()?.max(1));
        let swirl = i32::from(state.read::<u8>()?) - 30;
        let reverse = state.read()?;
        let symmetry_index = usize::from(state.read::<u8>()?.max(1) - 1);
        let z_twist = i32::from(state.read::<u8>()?);
        Ok(Self {
            petals,
            swirl,
            reverse,
            symmetry: ROTATIONAL_SYMMETRY
                .get(symmetry_index)
                .copied()
                .unwrap_or(ROTATIONAL_SYMMETRY[0]),
            z_twist,
        })
    }

    /// Petal bucket in `0..petals` for a pixel at `delta` from the midpoint.
    fn petal(&self, delta: Coord3D) -> i32 {
        let (dx, dy) = (delta.x as f32, delta.y as f32);
        let swirl_term = if self.swirl == 0 {
            0
        } else {
            (libm::hypotf(dx, dy) * self.swirl.abs() as f32) as i32
        };
        let mut angle = libm::atan2f(dy, dx).to_degrees() as i32 + 180;
        if self.swirl < 0 {
            angle = 360 - angle;
        }
        let value = angle + swirl_term + self.z_twist * delta.z.max(0);
        let petal_width = self.symmetry as f32 / self.petals as f32;
        let bucket = ((value as f32 / petal_width) as i32).rem_euclid(self.petals);
        if self.reverse {
            self.petals - bucket - 1
        } else {
            bucket
        }
    }
}

const fn wants_radius(dims: Dims) -> bool {
    !matches!(dims.projection, Dimension::D1) && !matches!(dims.effect, Dimension::D1)
}

impl Projection for PinwheelProjection {
    fn name(&self) -> &'static str {
        "Pinwheel"
    }

    fn controls(&self, dims: Dims, controls: &mut ProjectionControls<'_>) -> Result<()> {
        controls.slider("petals", 60, 1, 60)?;
        controls.slider("swirl", 30, 0, 60)?;
        controls.checkbox("reverse", false)?;
        controls.slider("symmetry", 1, 1, 23)?;
        if dims.projection == Dimension::D3 {
            controls.slider("z twist", 0, 0, 42)?;
        } else {
            controls.state(0_u8)?;
        }
        Ok(())
    }

    fn logical_size(
        &self,
        dims: Dims,
        geometry: &Geometry,
        state: &mut ProjectionState<'_>,
    ) -> Result<Coord3D> {
        let petals = i32::from(state.read::<u8>()?.max(1));
        if wants_radius(dims) {
            let flat_size = Coord3D::new(geometry.size.x, geometry.size.y, 1);
            let flat_mid = Coord3D::new(geometry.mid.x, geometry.mid.y, 0);
            Ok(Coord3D::new(petals, radius(flat_size, flat_mid) + 1, 1))
        } else {
            Ok(Coord3D::new(petals, 1, 1))
        }
    }

    fn map(
        &self,
        dims: Dims,
        geometry: &Geometry,
        _logical_size: Coord3D,
        state: &mut ProjectionState<'_>,
    ) -> Result<Coord3D> {
        let settings = PinwheelSettings::read(state)?;
        let delta = Coord3D::new(
            geometry.pixel.x - geometry.mid.x,
            geometry.pixel.y - geometry.mid.y,
            geometry.pixel.z,
        );
        let y = if wants_radius(dims) {
            isqrt(Coord3D::new(delta.x, delta.y, 0).squared_length())
        } else {
            0
        };
        Ok(Coord3D::new(settings.petal(delta), y, 0))
    }
}

/// Petal bucket for a pixel at `(dx, dy, z)` from the midpoint, with no
/// arena involved. Exposed for callers that preview settings.
#[must_use]
pub fn petal_for(
    delta: Coord3D,
    petals: u8,
    swirl: i8,
    reverse: bool,
    symmetry: i32,
    z_twist: u8,
) -> i32 {
    PinwheelSettings {
        petals: i32::from(petals.max(1)),
        swirl: i32::from(swirl),
        reverse,
        symmetry: symmetry.max(1),
        z_twist: i32::from(z_twist),
    }
    .petal(delta)
}

//! Polar re-mapping found by inverse search.

use core::f32::consts::TAU;

use super::{Dims, NOT_SHOWN, Projection, flatten};
use crate::{Coord3D, Dimension};

/// Wraps a 2D effect around the midpoint: effect x becomes the angle and
/// effect y the distance inward from the rim.
///
/// Only 2D effects on 2D boxes of at least 2×2 are affected. For each
/// default-mapped index the projection searches the effect grid for the
/// cell whose polar image lands on it; indices nobody lands on are not
/// shown. The search is quadratic and runs only during remap.
pub struct DistanceFromPointProjection;

impl Projection for DistanceFromPointProjection {
    fn name(&self) -> &'static str {
        "DistanceFromPoint"
    }

    fn post_process(&self, dims: Dims, logical_size: Coord3D, index: u16) -> u16 {
        if dims != Dims::new(Dimension::D2, Dimension::D2)
            || logical_size.x < 2
            || logical_size.y < 2
            || index == NOT_SHOWN
        {
            return index;
        }
        inverse_polar(logical_size, index)
    }
}

fn inverse_polar(size: Coord3D, index: u16) -> u16 {
    for x in 0..size.x {
        for y in 0..size.y {
            let cell = Coord3D::new(x, y, 0);
            if flatten(polar_landing(cell, size), size) == index {
                return flatten(cell, size);
            }
        }
    }
    NOT_SHOWN
}

/// Where effect cell `cell` lands once wrapped around the center of a grid of `size`.
///
/// Landings on the far rim fall one past the last column or row; those are
/// off the grid.
#[must_use]
pub fn polar_landing(cell: Coord3D, size: Coord3D) -> Coord3D {
    let (width, height) = (size.x as f32, size.y as f32);
    let turn = cell.x as f32 * TAU / (width - 1.0);
    let inward = 1.0 - cell.y as f32 / (height - 1.0);
    Coord3D::new(
        libm::roundf((inward * (width * libm::sinf(turn)) + width) / 2.0) as i32,
        libm::roundf((inward * (height * libm::cosf(turn)) + height) / 2.0) as i32,
        0,
    )
}

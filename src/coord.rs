//! Integer 3D coordinates shared by layouts, projections, and effects.
#![expect(clippy::arithmetic_side_effects, reason = "fixture coordinates stay far inside i32")]

use core::ops::{Add, Div, Mul, Rem, Sub};

use serde::{Deserialize, Serialize};

/// An integer `(x, y, z)` vector.
///
/// Fixture and projection math assumes non-negative components; only deltas
/// (distances, rotations) go negative.
///
/// Division and remainder are elementwise and treat a zero divisor as `1`,
/// so a degenerate axis never panics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Coord3D {
    /// Horizontal component.
    pub x: i32,
    /// Vertical component.
    pub y: i32,
    /// Depth component.
    pub z: i32,
}

impl Coord3D {
    /// All components zero.
    pub const ZERO: Self = Self::new(0, 0, 0);
    /// All components one.
    pub const ONE: Self = Self::new(1, 1, 1);

    /// Create a coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Same value on every axis.
    #[must_use]
    pub const fn splat(value: i32) -> Self {
        Self::new(value, value, value)
    }

    /// Elementwise minimum.
    #[must_use]
    pub fn minimum(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Elementwise maximum.
    #[must_use]
    pub fn maximum(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// True if any component lies outside `[0, size)`.
    #[must_use]
    pub const fn is_out_of_bounds(self, size: Self) -> bool {
        self.x < 0
            || self.y < 0
            || self.z < 0
            || self.x >= size.x
            || self.y >= size.y
            || self.z >= size.z
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        let delta = self - other;
        libm::sqrtf(delta.squared_length() as f32)
    }

    /// Sum of squared components, in `i64` so large boxes cannot overflow.
    #[must_use]
    pub const fn squared_length(self) -> i64 {
        let (x, y, z) = (self.x as i64, self.y as i64, self.z as i64);
        x * x + y * y + z * z
    }

    /// Number of cells in a box of this size.
    #[must_use]
    pub const fn volume(self) -> i64 {
        self.x as i64 * self.y as i64 * self.z as i64
    }

    /// Number of axes with an extent greater than one.
    #[must_use]
    pub const fn varying_axes(self) -> u8 {
        (self.x > 1) as u8 + (self.y > 1) as u8 + (self.z > 1) as u8
    }

    /// Elementwise division rounding up.
    #[must_use]
    pub fn div_ceil(self, divisor: Self) -> Self {
        let divisor = divisor.maximum(Self::ONE);
        (self + divisor - Self::ONE) / divisor
    }

    fn zip(self, other: Self, op: impl Fn(i32, i32) -> i32) -> Self {
        Self::new(op(self.x, other.x), op(self.y, other.y), op(self.z, other.z))
    }
}

impl From<(i32, i32, i32)> for Coord3D {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

impl Add for Coord3D {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.zip(rhs, i32::wrapping_add)
    }
}

impl Sub for Coord3D {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.zip(rhs, i32::wrapping_sub)
    }
}

impl Mul for Coord3D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.zip(rhs, i32::wrapping_mul)
    }
}

impl Mul<i32> for Coord3D {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self {
        self * Self::splat(rhs)
    }
}

impl Div for Coord3D {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        self.zip(rhs, |lhs, rhs| lhs.wrapping_div(if rhs == 0 { 1 } else { rhs }))
    }
}

impl Div<i32> for Coord3D {
    type Output = Self;

    fn div(self, rhs: i32) -> Self {
        self / Self::splat(rhs)
    }
}

impl Rem for Coord3D {
    type Output = Self;

    fn rem(self, rhs: Self) -> Self {
        self.zip(rhs, |lhs, rhs| lhs.wrapping_rem(if rhs == 0 { 1 } else { rhs }))
    }
}

/// Declared axis count of an effect or projection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dimension {
    /// A line.
    D1,
    /// A plane.
    D2,
    /// A volume.
    D3,
}

impl Dimension {
    /// Every dimension, lowest first.
    pub const ALL: [Self; 3] = [Self::D1, Self::D2, Self::D3];

    /// Dimension of a box: its count of non-degenerate axes, at least one.
    #[must_use]
    pub const fn of_box(size: Coord3D) -> Self {
        match size.varying_axes() {
            0 | 1 => Self::D1,
            2 => Self::D2,
            _ => Self::D3,
        }
    }
}

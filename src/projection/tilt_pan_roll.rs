//! Continuous rotation of the logical grid, driven by the clock or an orientation sensor.
#![expect(clippy::arithmetic_side_effects, reason = "the divisor is at least one")]

use core::f32::consts::TAU;

use super::{Dims, PixelTransform, Projection, ProjectionControls, ProjectionState};
use crate::frame::FrameContext;
use crate::{Coord3D, Result};

/// Rotate effect coordinates about the grid center every frame.
///
/// Each axis has a speed slider (0 stops it). With the `gyro` switch on and
/// an orientation reading in the frame context, the sensor angles are used
/// instead of the clock.
pub struct TiltPanRollProjection;

pub(super) struct TiltPanRollSettings {
    tilt: u8,
    pan: u8,
    roll: u8,
    gyro: bool,
}

impl TiltPanRollSettings {
    pub(super) fn read(state: &mut ProjectionState<'_>) -> Result<Self> {
        Ok(Self {
            tilt: state.read()?,
            pan: state.read()?,
            roll: state.read()?,
            gyro: state.read()?,
        })
    }

    pub(super) fn transform(
        &self,
        frame: &FrameContext,
        logical_size: Coord3D,
        fixture_size: Coord3D,
    ) -> PixelTransform {
        let flatten_z = fixture_size.z <= 1;
        let center = logical_size / 2;
        if self.gyro {
            if let Some(degrees) = frame.orientation {
                let radians = |value: i32| value as f32 * TAU / 360.0;
                return PixelTransform::Rotate(Rotation::new(
                    center,
                    [radians(degrees.x), radians(degrees.y), radians(degrees.z)],
                    flatten_z,
                ));
            }
        }
        if self.tilt == 0 && self.pan == 0 && self.roll == 0 {
            return if flatten_z && logical_size.z > 1 {
                PixelTransform::Rotate(Rotation::new(center, [0.0; 3], true))
            } else {
                PixelTransform::Identity
            };
        }
        let now_ms = frame.now.as_millis();
        let angle = |speed: u8| {
            if speed == 0 {
                0.0
            } else {
                let turns = (now_ms * 5 / u64::from(255 - speed.min(254))) % 256;
                turns as f32 * TAU / 256.0
            }
        };
        PixelTransform::Rotate(Rotation::new(
            center,
            [angle(self.tilt), angle(self.pan), angle(self.roll)],
            flatten_z,
        ))
    }
}

impl Projection for TiltPanRollProjection {
    fn name(&self) -> &'static str {
        "TiltPanRoll"
    }

    fn controls(&self, _dims: Dims, controls: &mut ProjectionControls<'_>) -> Result<()> {
        controls.slider("tilt", 128, 0, 254)?;
        controls.slider("pan", 128, 0, 254)?;
        controls.slider("roll", 128, 0, 254)?;
        controls.checkbox("gyro", false)?;
        Ok(())
    }

    fn frame_transform(
        &self,
        state: &mut ProjectionState<'_>,
        frame: &FrameContext,
        logical_size: Coord3D,
        fixture_size: Coord3D,
    ) -> Result<PixelTransform> {
        Ok(TiltPanRollSettings::read(state)?.transform(frame, logical_size, fixture_size))
    }
}

/// Tilt (about x), then pan (about y), then roll (about z), around `center`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rotation {
    center: Coord3D,
    // (sin, cos) per axis
    tilt: (f32, f32),
    pan: (f32, f32),
    roll: (f32, f32),
    flatten_z: bool,
}

impl Rotation {
    /// Rotation by `[tilt, pan, roll]` radians. `flatten_z` zeroes z afterwards.
    #[must_use]
    pub fn new(center: Coord3D, radians: [f32; 3], flatten_z: bool) -> Self {
        let [tilt, pan, roll] = radians.map(|angle| (libm::sinf(angle), libm::cosf(angle)));
        Self {
            center,
            tilt,
            pan,
            roll,
            flatten_z,
        }
    }

    /// Rotate one coordinate, rounding to the nearest cell.
    #[must_use]
    pub fn apply(&self, pixel: Coord3D) -> Coord3D {
        let offset = pixel - self.center;
        let (mut x, mut y, mut z) = (offset.x as f32, offset.y as f32, offset.z as f32);

        let (sin, cos) = self.tilt;
        (y, z) = (y * cos - z * sin, y * sin + z * cos);
        let (sin, cos) = self.pan;
        (x, z) = (x * cos + z * sin, z * cos - x * sin);
        let (sin, cos) = self.roll;
        (x, y) = (x * cos - y * sin, x * sin + y * cos);

        let rotated = Coord3D::new(
            libm::roundf(x) as i32,
            libm::roundf(y) as i32,
            libm::roundf(z) as i32,
        ) + self.center;
        if self.flatten_z {
            Coord3D::new(rotated.x, rotated.y, 0)
        } else {
            rotated
        }
    }
}

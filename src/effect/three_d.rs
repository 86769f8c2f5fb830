//! Effects written for a volume: they address pixels by `(x, y, z)`.
#![expect(clippy::arithmetic_side_effects, reason = "effect grids are a few hundred cells per side at most")]

use itertools::iproduct;

use crate::color::{self, colors};
use crate::effect::wave::random8_range;
use crate::effect::{Effect, EffectControls, EffectState};
use crate::frame::FrameContext;
use crate::leds::Leds;
use crate::{Coord3D, Dimension, Result};

/// Animation clock shared by the volume effects: slower as `speed` drops.
fn time_interval(ms: u32, speed: u8) -> u32 {
    let divisor = 100 - u32::from(speed.min(99));
    ((ms / divisor) as f32 / 6.4) as u32
}

/// Concentric waves rippling out from the center of the floor.
pub struct RipplesEffect;

impl Effect for RipplesEffect {
    fn name(&self) -> &'static str {
        "Ripples"
    }

    fn dimension(&self) -> Dimension {
        Dimension::D3
    }

    fn controls(&self, controls: &mut EffectControls<'_>) -> Result<()> {
        controls.slider("speed", 50, 0, 99)?;
        controls.slider("interval", 128, 0, 255)?;
        Ok(())
    }

    fn render(&self, leds: &mut Leds<'_>, state: &mut EffectState<'_>, frame: &FrameContext) -> Result<()> {
        let speed = state.read::<u8>()?;
        let interval = state.read::<u8>()?;
        let ripple_interval = (1.3 * (f32::from(interval) / 128.0)).max(f32::EPSILON);

        leds.fill_solid(colors::BLACK);
        let size = leds.size();
        let center_x = (size.x - 1) as f32 / 2.0;
        let center_z = (size.z - 1) as f32 / 2.0;
        let reach = libm::hypotf(center_x, center_z).max(1.0);
        let height = size.y as f32;
        let phase = time_interval(frame.now_ms(), speed) as f32;
        let mut rng = frame.rng(0x41bb);

        for (z_pos, x_pos) in iproduct!(0..size.z, 0..size.x) {
            let distance =
                libm::hypotf(x_pos as f32 - center_x, z_pos as f32 - center_z) / reach * height;
            let wave = libm::sinf(distance / ripple_interval + phase);
            let y_pos = libm::floorf(height / 2.0 + wave * height / 2.0) as i32;
            let hue = frame.hue.wrapping_add(random8_range(&mut rng, 0, 64));
            leds.set_xyz(Coord3D::new(x_pos, y_pos.min(size.y - 1), z_pos), color::hsv(hue, 200, 255));
        }
        Ok(())
    }
}

/// A hollow sphere drifting through the volume.
pub struct SphereMoveEffect;

impl Effect for SphereMoveEffect {
    fn name(&self) -> &'static str {
        "SphereMove"
    }

    fn dimension(&self) -> Dimension {
        Dimension::D3
    }

    fn controls(&self, controls: &mut EffectControls<'_>) -> Result<()> {
        controls.slider("speed", 50, 0, 99)?;
        Ok(())
    }

    fn render(&self, leds: &mut Leds<'_>, state: &mut EffectState<'_>, frame: &FrameContext) -> Result<()> {
        let speed = state.read::<u8>()?;

        leds.fill_solid(colors::BLACK);
        let size = leds.size();
        let phase = time_interval(frame.now_ms(), speed) as f32;
        // Motion is tuned for an 8×8×8 cube and scaled to the actual volume.
        let scale = size.x.max(size.y).max(size.z) as f32 / 8.0;
        let center = |extent: i32| (extent - 1) as f32 / 2.0;
        let origin = (
            center(size.x) + libm::sinf(phase) * 2.5 * scale,
            center(size.y) + libm::cosf(phase) * 2.5 * scale,
            center(size.z) + libm::cosf(phase) * 2.0 * scale,
        );
        let diameter = (2.0 + libm::sinf(phase / 3.0)) * scale;
        let mut rng = frame.rng(0x5f3e);

        for (x_pos, y_pos, z_pos) in iproduct!(0..size.x, 0..size.y, 0..size.z) {
            let (dx, dy, dz) = (
                x_pos as f32 - origin.0,
                y_pos as f32 - origin.1,
                z_pos as f32 - origin.2,
            );
            let distance = libm::floorf(libm::sqrtf(dx * dx + dy * dy + dz * dz));
            if distance > diameter && distance < diameter + 1.0 {
                let hue = frame.hue.wrapping_add(random8_range(&mut rng, 0, 64));
                leds.set_xyz(Coord3D::new(x_pos, y_pos, z_pos), color::hsv(hue, 200, 255));
            }
        }
        Ok(())
    }
}

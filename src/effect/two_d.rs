//! Effects written for a panel: they address pixels by `(x, y)`.
#![expect(clippy::arithmetic_side_effects, reason = "effects use wrapping color math on small grids")]

use crate::color::{self, colors};
use crate::effect::wave::{beat16, beatsin8, map_range};
use crate::effect::{Effect, EffectControls, EffectState};
use crate::frame::FrameContext;
use crate::leds::Leds;
use crate::{Dimension, Result};

/// A line sweeping across the panel once per beat.
pub struct LinesEffect;

impl Effect for LinesEffect {
    fn name(&self) -> &'static str {
        "Lines"
    }

    fn dimension(&self) -> Dimension {
        Dimension::D2
    }

    fn controls(&self, controls: &mut EffectControls<'_>) -> Result<()> {
        controls.slider("bpm", 60, 0, 255)?;
        controls.checkbox("vertical", true)?;
        Ok(())
    }

    fn render(&self, leds: &mut Leds<'_>, state: &mut EffectState<'_>, frame: &FrameContext) -> Result<()> {
        let bpm = u16::from(state.read::<u8>()?);
        let vertical = state.read::<bool>()?;
        leds.fade_to_black_by(100);

        let size = leds.size();
        let beat = u32::from(beat16(bpm, frame.now_ms()));
        let line_color = color::hue(frame.hue);
        if vertical {
            let x_pos = map_range(beat, u32::from(u16::MAX), (size.x - 1) as u32) as i32;
            for y_pos in 0..size.y {
                let index = leds.xy(x_pos, y_pos);
                leds.set_pixel_color(index, line_color);
            }
        } else {
            let y_pos = map_range(beat, u32::from(u16::MAX), (size.y - 1) as u32) as i32;
            for x_pos in 0..size.x {
                let index = leds.xy(x_pos, y_pos);
                leds.set_pixel_color(index, line_color);
            }
        }
        Ok(())
    }
}

/// Stars orbiting a white center, smeared into trails.
pub struct BlackHoleEffect;

fn byte_extent(extent: i32) -> u8 {
    u8::try_from(extent.max(0)).unwrap_or(u8::MAX)
}

impl Effect for BlackHoleEffect {
    fn name(&self) -> &'static str {
        "BlackHole"
    }

    fn dimension(&self) -> Dimension {
        Dimension::D2
    }

    fn controls(&self, controls: &mut EffectControls<'_>) -> Result<()> {
        controls.slider("fade", 16, 0, 32)?;
        controls.slider("out x", 16, 0, 32)?;
        controls.slider("out y", 16, 0, 32)?;
        controls.slider("in x", 16, 0, 32)?;
        controls.slider("in y", 16, 0, 32)?;
        Ok(())
    }

    fn render(&self, leds: &mut Leds<'_>, state: &mut EffectState<'_>, frame: &FrameContext) -> Result<()> {
        let fade = state.read::<u8>()?;
        let outer_x = u16::from(state.read::<u8>()?);
        let outer_y = u16::from(state.read::<u8>()?);
        let inner_x = u16::from(state.read::<u8>()?);
        let inner_y = u16::from(state.read::<u8>()?);

        leds.fade_to_black_by(16_u8.saturating_add(fade));
        let size = leds.size();
        let ms = frame.now_ms();
        let time_base = (ms / 128) as u8;
        let (last_x, last_y) = (byte_extent(size.x - 1), byte_extent(size.y - 1));

        for star in 0_u8..8 {
            let drift = time_base.wrapping_mul(star);
            let (phase_x, phase_y) = if star % 2 == 1 { (128, 192) } else { (0, 64) };
            let x_pos = beatsin8(outer_x, ms, 0, last_x, drift.wrapping_add(phase_x));
            let y_pos = beatsin8(outer_y, ms, 0, last_y, drift.wrapping_add(phase_y));
            let index = leds.xy(i32::from(x_pos), i32::from(y_pos));
            leds.add_pixel_color(index, color::hue(star.wrapping_mul(32)));
        }

        let (margin_x, margin_y) = (byte_extent(size.x / 4), byte_extent(size.y / 4));
        for star in 0_u8..4 {
            let drift = time_base.wrapping_mul(star);
            let (phase_x, phase_y) = if star % 2 == 1 { (128, 192) } else { (0, 64) };
            let x_pos = beatsin8(
                inner_x,
                ms,
                margin_x,
                last_x.saturating_sub(margin_x),
                drift.wrapping_add(phase_x),
            );
            let y_pos = beatsin8(
                inner_y,
                ms,
                margin_y,
                last_y.saturating_sub(margin_y),
                drift.wrapping_add(phase_y),
            );
            let index = leds.xy(i32::from(x_pos), i32::from(y_pos));
            leds.add_pixel_color(index, color::hue(star.wrapping_mul(32)));
        }

        let center = leds.xy(size.x / 2, size.y / 2);
        leds.set_pixel_color(center, colors::WHITE);
        leds.blur2d(16);
        Ok(())
    }
}

//! Effects written for a strip: they address pixels by logical index.
#![expect(clippy::arithmetic_side_effects, reason = "effects use wrapping color math on small grids")]

use crate::arena::ArenaValue;
use crate::color::{self, Palette, RGB8, colors};
use crate::effect::wave::{beat16, beatsin8, beatsin16, map_range, random8, random8_range, random16};
use crate::effect::{Effect, EffectControls, EffectState};
use crate::frame::FrameContext;
use crate::leds::Leds;
use crate::{Dimension, Result};

/// Every pixel one color.
pub struct SolidEffect;

impl Effect for SolidEffect {
    fn name(&self) -> &'static str {
        "Solid"
    }

    fn dimension(&self) -> Dimension {
        Dimension::D1
    }

    fn controls(&self, controls: &mut EffectControls<'_>) -> Result<()> {
        controls.slider("red", 182, 0, 255)?;
        controls.slider("green", 15, 0, 255)?;
        controls.slider("blue", 98, 0, 255)?;
        Ok(())
    }

    fn render(&self, leds: &mut Leds<'_>, state: &mut EffectState<'_>, _frame: &FrameContext) -> Result<()> {
        let red = state.read()?;
        let green = state.read()?;
        let blue = state.read()?;
        leds.fill_solid(RGB8::new(red, green, blue));
        Ok(())
    }
}

/// The hue wheel along the strip, drifting with the shared hue.
pub struct RainbowEffect;

impl Effect for RainbowEffect {
    fn name(&self) -> &'static str {
        "Rainbow"
    }

    fn dimension(&self) -> Dimension {
        Dimension::D1
    }

    fn render(&self, leds: &mut Leds<'_>, _state: &mut EffectState<'_>, frame: &FrameContext) -> Result<()> {
        leds.fill_rainbow(frame.hue, 7);
        Ok(())
    }
}

/// [`RainbowEffect`] with occasional white sparkles.
pub struct RainbowWithGlitterEffect;

const GLITTER_CHANCE: u8 = 80;

impl Effect for RainbowWithGlitterEffect {
    fn name(&self) -> &'static str {
        "Rainbow with glitter"
    }

    fn dimension(&self) -> Dimension {
        Dimension::D1
    }

    fn render(&self, leds: &mut Leds<'_>, state: &mut EffectState<'_>, frame: &FrameContext) -> Result<()> {
        RainbowEffect.render(leds, state, frame)?;
        let mut rng = frame.rng(0x6c17);
        if random8(&mut rng) < GLITTER_CHANCE {
            let index = random16(&mut rng, leds.len());
            leds.add_pixel_color(index, colors::WHITE);
        }
        Ok(())
    }
}

/// A dot sweeping back and forth with a fading trail.
pub struct SinelonEffect;

impl Effect for SinelonEffect {
    fn name(&self) -> &'static str {
        "Sinelon"
    }

    fn dimension(&self) -> Dimension {
        Dimension::D1
    }

    fn controls(&self, controls: &mut EffectControls<'_>) -> Result<()> {
        controls.slider("bpm", 60, 0, 255)?;
        Ok(())
    }

    fn render(&self, leds: &mut Leds<'_>, state: &mut EffectState<'_>, frame: &FrameContext) -> Result<()> {
        let bpm = u16::from(state.read::<u8>()?);
        leds.fade_to_black_by(20);
        let last = leds.len().saturating_sub(1);
        let index = beatsin16(bpm, frame.now_ms(), 0, last, 0);
        leds.add_pixel_color(index, color::hue(frame.hue));
        Ok(())
    }
}

/// Random speckles that blink in and fade out.
pub struct ConfettiEffect;

impl Effect for ConfettiEffect {
    fn name(&self) -> &'static str {
        "Confetti"
    }

    fn dimension(&self) -> Dimension {
        Dimension::D1
    }

    fn render(&self, leds: &mut Leds<'_>, _state: &mut EffectState<'_>, frame: &FrameContext) -> Result<()> {
        leds.fade_to_black_by(10);
        let mut rng = frame.rng(0xc0f3);
        let index = random16(&mut rng, leds.len());
        let hue = frame.hue.wrapping_add(random8_range(&mut rng, 0, 64));
        leds.add_pixel_color(index, color::hsv(hue, 200, 255));
        Ok(())
    }
}

/// Eight dots weaving in and out of sync.
pub struct JuggleEffect;

impl Effect for JuggleEffect {
    fn name(&self) -> &'static str {
        "Juggle"
    }

    fn dimension(&self) -> Dimension {
        Dimension::D1
    }

    fn render(&self, leds: &mut Leds<'_>, _state: &mut EffectState<'_>, frame: &FrameContext) -> Result<()> {
        leds.fade_to_black_by(20);
        let last = leds.len().saturating_sub(1);
        let mut dot_hue = 0_u8;
        for dot in 0..8 {
            let index = beatsin16(dot + 7, frame.now_ms(), 0, last, 0);
            let existing = leds.get_pixel_color(index);
            let dot_color = color::hsv(dot_hue, 200, 255);
            leds.set_pixel_color(
                index,
                RGB8::new(
                    existing.r.max(dot_color.r),
                    existing.g.max(dot_color.g),
                    existing.b.max(dot_color.b),
                ),
            );
            dot_hue = dot_hue.wrapping_add(32);
        }
        Ok(())
    }
}

/// One pixel running down the strip once per beat.
pub struct RunningEffect;

impl Effect for RunningEffect {
    fn name(&self) -> &'static str {
        "Running"
    }

    fn dimension(&self) -> Dimension {
        Dimension::D1
    }

    fn controls(&self, controls: &mut EffectControls<'_>) -> Result<()> {
        controls.slider("bpm", 60, 0, 255)?;
        controls.slider("fade", 128, 0, 255)?;
        Ok(())
    }

    fn render(&self, leds: &mut Leds<'_>, state: &mut EffectState<'_>, frame: &FrameContext) -> Result<()> {
        let bpm = u16::from(state.read::<u8>()?);
        let fade = state.read()?;
        leds.fade_to_black_by(fade);
        let last = u32::from(leds.len().saturating_sub(1));
        let beat = u32::from(beat16(bpm, frame.now_ms()));
        let index = map_range(beat, u32::from(u16::MAX), last) as u16;
        leds.set_pixel_color(index, color::hue(frame.hue));
        Ok(())
    }
}

/// Most rings [`RingRandomFlowEffect`] remembers.
pub const MAX_RINGS: usize = 256;

/// A random hue enters at the center every frame and flows outward.
///
/// Meant for a 1D effect on a ring or 2D box, where each logical pixel is
/// a ring at that distance from the midpoint.
pub struct RingRandomFlowEffect;

impl Effect for RingRandomFlowEffect {
    fn name(&self) -> &'static str {
        "RingRandomFlow"
    }

    fn dimension(&self) -> Dimension {
        Dimension::D1
    }

    fn controls(&self, controls: &mut EffectControls<'_>) -> Result<()> {
        controls.state_array(MAX_RINGS, 0_u8)?;
        Ok(())
    }

    fn render(&self, leds: &mut Leds<'_>, state: &mut EffectState<'_>, frame: &FrameContext) -> Result<()> {
        let hues = state.read_write_array::<u8>(MAX_RINGS)?;
        let rings = usize::from(leds.len()).min(MAX_RINGS);
        let mut rng = frame.rng(0x7219);
        if let Some(center) = hues.slot(0) {
            state.set(center, random8(&mut rng));
        }
        for (ring, slot) in hues.slots().take(rings).enumerate() {
            leds.set_pixel_color(ring as u16, color::hue(state.get(slot)));
        }
        for ring in (1..rings).rev() {
            if let (Some(inner), Some(outer)) = (hues.slot(ring - 1), hues.slot(ring)) {
                let hue = state.get(inner);
                state.set(outer, hue);
            }
        }
        Ok(())
    }
}

/// Most balls [`BouncingBallsEffect`] can juggle.
pub const MAX_BALLS: usize = 16;

const GRAVITY: f32 = -9.81;

/// One ball's bounce state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Ball {
    /// Milliseconds at the last floor contact.
    pub last_bounce: u32,
    /// Upward speed right after that contact.
    pub impact_velocity: f32,
    /// Current height, `0.0..=1.0` of the strip.
    pub height: f32,
}

impl ArenaValue for Ball {
    const SIZE: usize = u32::SIZE + 2 * f32::SIZE;

    fn store(self, bytes: &mut [u8]) {
        let (last_bounce, rest) = bytes.split_at_mut(u32::SIZE);
        let (impact_velocity, height) = rest.split_at_mut(f32::SIZE);
        self.last_bounce.store(last_bounce);
        self.impact_velocity.store(impact_velocity);
        self.height.store(height);
    }

    fn load(bytes: &[u8]) -> Self {
        let (last_bounce, rest) = bytes.split_at(u32::SIZE);
        let (impact_velocity, height) = rest.split_at(f32::SIZE);
        Self {
            last_bounce: u32::load(last_bounce),
            impact_velocity: f32::load(impact_velocity),
            height: f32::load(height),
        }
    }
}

/// Balls dropping under gravity, losing a little energy on each bounce.
pub struct BouncingBallsEffect;

impl Effect for BouncingBallsEffect {
    fn name(&self) -> &'static str {
        "Bouncing Balls"
    }

    fn dimension(&self) -> Dimension {
        Dimension::D1
    }

    fn controls(&self, controls: &mut EffectControls<'_>) -> Result<()> {
        palette_control(controls)?;
        controls.slider("gravity", 128, 0, 255)?;
        controls.slider("balls", 8, 1, MAX_BALLS as u8)?;
        controls.state_array(MAX_BALLS, Ball::default())?;
        Ok(())
    }

    fn render(&self, leds: &mut Leds<'_>, state: &mut EffectState<'_>, frame: &FrameContext) -> Result<()> {
        let palette = Palette::from_index(state.read()?);
        let gravity_setting = state.read::<u8>()?;
        let ball_count = state.read::<u8>()?.clamp(1, MAX_BALLS as u8);
        let balls = state.read_write_array::<Ball>(MAX_BALLS)?;

        leds.fill_solid(colors::BLACK);
        let now = frame.now_ms();
        let slow_down = u32::from((255 - gravity_setting) / 64) + 1;
        let mut rng = frame.rng(0xba11);
        let color_step = (256 / u16::from(ball_count.max(8))) as u8;
        let last = f32::from(leds.len().saturating_sub(1));

        for (index, slot) in balls.slots().take(usize::from(ball_count)).enumerate() {
            let mut ball = state.get(slot);
            let seconds = (now.wrapping_sub(ball.last_bounce) / slow_down) as f32 / 1000.0;
            ball.height = (0.5 * GRAVITY * seconds + ball.impact_velocity) * seconds;

            let visible = if ball.height <= 0.0 {
                ball.height = 0.0;
                let count = f32::from(ball_count);
                let dampening = 0.9 - index as f32 / (count * count);
                ball.impact_velocity *= dampening;
                ball.last_bounce = now;
                if ball.impact_velocity < 0.015 {
                    let kick = f32::from(random8_range(&mut rng, 5, 11)) / 10.0;
                    ball.impact_velocity = libm::sqrtf(-2.0 * GRAVITY) * kick;
                }
                true
            } else {
                ball.height <= 1.0
            };
            state.set(slot, ball);

            if visible {
                let position = libm::roundf(ball.height * last) as u16;
                let color_index = (index as u8).wrapping_mul(color_step);
                leds.set_pixel_color(position, palette.color(color_index, 255));
            }
        }
        Ok(())
    }
}

/// Declare the row's palette selector, defaulting to the hue wheel.
fn palette_control(controls: &mut EffectControls<'_>) -> Result<()> {
    controls.select("palette", Palette::Rainbow as u8, &Palette::NAMES)?;
    Ok(())
}

/// Palette stripes pulsing at 62 beats per minute.
pub struct BeatsPerMinuteEffect;

const BEATS_PER_MINUTE: u16 = 62;

impl Effect for BeatsPerMinuteEffect {
    fn name(&self) -> &'static str {
        "Beats per minute"
    }

    fn dimension(&self) -> Dimension {
        Dimension::D1
    }

    fn controls(&self, controls: &mut EffectControls<'_>) -> Result<()> {
        palette_control(controls)
    }

    fn render(&self, leds: &mut Leds<'_>, state: &mut EffectState<'_>, frame: &FrameContext) -> Result<()> {
        let palette = Palette::from_index(state.read()?);
        let beat = beatsin8(BEATS_PER_MINUTE, frame.now_ms(), 64, 255, 0);
        for index in 0..leds.len() {
            let step = index as u8;
            let color = palette.color(
                frame.hue.wrapping_add(step.wrapping_mul(2)),
                beat.wrapping_sub(frame.hue).wrapping_add(step.wrapping_mul(10)),
            );
            leds.set_pixel_color(index, color);
        }
        Ok(())
    }
}

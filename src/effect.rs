//! Effects: animations written against a 1D, 2D, or 3D logical grid.
//!
//! An effect never sees the fixture. It draws on a [`Leds`] canvas sized to
//! the row's logical grid, and the row's mapping table carries every write
//! to the physical LEDs the projection assigned.
//!
//! Like projections, effects are zero-sized. Settings and animation state
//! live in the row's effect arena: [`Effect::controls`] declares them when
//! the effect is selected, and [`Effect::render`] replays the same sequence
//! every frame.
//!
//! # Example
//!
//! ```
//! use led_projector::effect::{Effect, EffectControls, EffectState};
//! use led_projector::frame::FrameContext;
//! use led_projector::leds::Leds;
//! use led_projector::color::RGB8;
//! use led_projector::{Dimension, Result};
//!
//! struct Blink;
//!
//! impl Effect for Blink {
//!     fn name(&self) -> &'static str {
//!         "Blink"
//!     }
//!
//!     fn dimension(&self) -> Dimension {
//!         Dimension::D1
//!     }
//!
//!     fn controls(&self, controls: &mut EffectControls<'_>) -> Result<()> {
//!         controls.slider("period", 10, 1, 100)?;
//!         Ok(())
//!     }
//!
//!     fn render(&self, leds: &mut Leds<'_>, state: &mut EffectState<'_>, frame: &FrameContext) -> Result<()> {
//!         let period = u32::from(state.read::<u8>()?);
//!         let on = (frame.frame / period) % 2 == 0;
//!         leds.fill_solid(if on { RGB8::new(255, 255, 255) } else { RGB8::default() });
//!         Ok(())
//!     }
//! }
//! ```

mod one_d;
mod three_d;
mod two_d;
pub mod wave;

pub use one_d::{
    Ball, BeatsPerMinuteEffect, BouncingBallsEffect, ConfettiEffect, JuggleEffect, RainbowEffect,
    RainbowWithGlitterEffect, RingRandomFlowEffect, RunningEffect, SinelonEffect, SolidEffect,
};
pub use three_d::{RipplesEffect, SphereMoveEffect};
pub use two_d::{BlackHoleEffect, LinesEffect};

use crate::arena::{ArenaReader, EFFECT_ARENA_BYTES};
use crate::controls::Controls;
use crate::frame::FrameContext;
use crate::leds::Leds;
use crate::{Dimension, Error, Result};

/// Arena reader type effects replay their state from.
pub type EffectState<'a> = ArenaReader<'a, EFFECT_ARENA_BYTES>;
/// Control builder type effects declare their state with.
pub type EffectControls<'a> = Controls<'a, EFFECT_ARENA_BYTES>;

/// An animation over a logical grid.
///
/// Implementors must be zero-sized; per-row state goes through
/// [`controls`](Self::controls) into the row's effect arena.
pub trait Effect: Sync {
    /// Display name.
    fn name(&self) -> &'static str;

    /// Grid dimension the effect is written for.
    fn dimension(&self) -> Dimension;

    /// Declare settings and state. Runs on selection with a freshly zeroed arena.
    ///
    /// # Errors
    ///
    /// Arena or control-list overflow.
    fn controls(&self, _controls: &mut EffectControls<'_>) -> Result<()> {
        Ok(())
    }

    /// Draw one frame. Must replay the arena in declaration order.
    ///
    /// # Errors
    ///
    /// Arena overflow while replaying state.
    fn render(&self, leds: &mut Leds<'_>, state: &mut EffectState<'_>, frame: &FrameContext) -> Result<()>;
}

/// Every registered effect, by selector index.
pub static EFFECTS: [&dyn Effect; 14] = [
    &SolidEffect,
    &RainbowEffect,
    &RainbowWithGlitterEffect,
    &SinelonEffect,
    &ConfettiEffect,
    &JuggleEffect,
    &RunningEffect,
    &RingRandomFlowEffect,
    &BouncingBallsEffect,
    &LinesEffect,
    &BlackHoleEffect,
    &RipplesEffect,
    &SphereMoveEffect,
    &BeatsPerMinuteEffect,
];

/// Selector index of the default effect.
pub const DEFAULT_EFFECT: usize = 0;

/// The effect registered at `index`.
///
/// # Errors
///
/// [`Error::EffectIndexOutOfRange`].
pub fn effect(index: usize) -> Result<&'static dyn Effect> {
    EFFECTS
        .get(index)
        .copied()
        .ok_or(Error::EffectIndexOutOfRange(index))
}

/// Selector index of the effect called `name`.
#[must_use]
pub fn effect_index(name: &str) -> Option<usize> {
    EFFECTS.iter().position(|effect| effect.name() == name)
}

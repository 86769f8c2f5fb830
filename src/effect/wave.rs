//! Beat-synchronized waves and small random helpers.
//!
//! Timing follows the FastLED `lib8tion` conventions: a "beat" is a 16-bit
//! phase that wraps once per beat, and `bpm` values below 256 are whole
//! beats per minute (larger values are Q8.8).
#![expect(clippy::arithmetic_side_effects, reason = "fixed-point wave tables widened before multiplying")]

use rand_xoshiro::rand_core::RngCore;

use crate::color::scale8;

/// 16-bit phase for a Q8.8 `bpm88` tempo at `ms` milliseconds.
#[must_use]
pub const fn beat88(bpm88: u16, ms: u32) -> u16 {
    // 65536 / 60000 * 256 ≈ 280: one full wrap per beat for Q8.8 bpm.
    ((ms as u64 * bpm88 as u64 * 280) >> 16) as u16
}

/// 16-bit phase for `bpm` beats per minute.
#[must_use]
pub const fn beat16(bpm: u16, ms: u32) -> u16 {
    let bpm88 = if bpm < 256 { bpm << 8 } else { bpm };
    beat88(bpm88, ms)
}

/// 8-bit phase for `bpm` beats per minute.
#[must_use]
pub const fn beat8(bpm: u16, ms: u32) -> u8 {
    (beat16(bpm, ms) >> 8) as u8
}

/// Sine over a 16-bit phase, in `-32767..=32767`.
#[must_use]
pub fn sin16(theta: u16) -> i16 {
    let radians = f32::from(theta) / 65536.0 * core::f32::consts::TAU;
    (libm::sinf(radians) * 32767.0) as i16
}

/// Sine over an 8-bit phase, in `0..=255` centered on 128.
#[must_use]
pub fn sin8(theta: u8) -> u8 {
    let radians = f32::from(theta) / 256.0 * core::f32::consts::TAU;
    libm::roundf(libm::sinf(radians) * 127.5 + 127.5).clamp(0.0, 255.0) as u8
}

/// Scale `value` by `scale / 65536`.
#[must_use]
pub const fn scale16(value: u16, scale: u16) -> u16 {
    ((value as u32 * (scale as u32 + 1)) >> 16) as u16
}

/// A value oscillating between `low` and `high` at `bpm`.
#[must_use]
pub fn beatsin16(bpm: u16, ms: u32, low: u16, high: u16, phase: u16) -> u16 {
    let beat = beat16(bpm, ms);
    let wave = (i32::from(sin16(beat.wrapping_add(phase))) + 32768) as u16;
    low + scale16(wave, high.saturating_sub(low))
}

/// 8-bit [`beatsin16`].
#[must_use]
pub fn beatsin8(bpm: u16, ms: u32, low: u8, high: u8, phase: u8) -> u8 {
    let beat = beat8(bpm, ms);
    let wave = sin8(beat.wrapping_add(phase));
    low + scale8(wave, high.saturating_sub(low))
}

/// Linearly rescale `value` from `0..=from_max` into `0..=to_max`.
#[must_use]
pub const fn map_range(value: u32, from_max: u32, to_max: u32) -> u32 {
    if from_max == 0 {
        return 0;
    }
    (value as u64 * to_max as u64 / from_max as u64) as u32
}

/// A uniformly random byte.
pub fn random8(rng: &mut impl RngCore) -> u8 {
    rng.next_u32() as u8
}

/// A random byte in `low..high` (`low` if the range is empty).
pub fn random8_range(rng: &mut impl RngCore, low: u8, high: u8) -> u8 {
    let span = u16::from(high.saturating_sub(low));
    low + ((u16::from(random8(rng)) * span) >> 8) as u8
}

/// A random value in `0..limit` (`0` if `limit` is zero).
pub fn random16(rng: &mut impl RngCore, limit: u16) -> u16 {
    (((rng.next_u32() & 0xFFFF) * u32::from(limit)) >> 16) as u16
}

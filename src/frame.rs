//! Per-frame context handed to every effect and projection.

use embassy_time::Instant;
use rand_xoshiro::SplitMix64;
use rand_xoshiro::rand_core::SeedableRng;

use crate::Coord3D;

/// Milliseconds per step of the shared rotating hue.
pub const HUE_STEP_MS: u64 = 20;

/// Immutable, effect-agnostic animation state for one frame.
///
/// Replaces process-wide counters: the scheduler builds one per frame tick
/// and every row sees the same value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameContext {
    /// Monotonic time of this frame.
    pub now: Instant,
    /// Frames rendered before this one.
    pub frame: u32,
    /// Slowly rotating base hue, one step every [`HUE_STEP_MS`].
    pub hue: u8,
    /// Latest orientation reading in degrees (tilt, pan, roll), if a sensor is attached.
    pub orientation: Option<Coord3D>,
}

impl FrameContext {
    /// Context for frame number `frame` at time `now`.
    #[must_use]
    pub fn new(now: Instant, frame: u32) -> Self {
        Self {
            now,
            frame,
            hue: (now.as_millis() / HUE_STEP_MS) as u8,
            orientation: None,
        }
    }

    /// Attach an orientation reading.
    #[must_use]
    pub const fn with_orientation(mut self, orientation: Option<Coord3D>) -> Self {
        self.orientation = orientation;
        self
    }

    /// Milliseconds since boot, truncated to 32 bits.
    #[must_use]
    pub fn now_ms(&self) -> u32 {
        self.now.as_millis() as u32
    }

    /// A random stream that is fixed for this frame and `salt`.
    ///
    /// Rendering the same frame twice draws the same numbers.
    #[must_use]
    pub fn rng(&self, salt: u64) -> SplitMix64 {
        let seed = (u64::from(self.frame) << 32) ^ self.now.as_ticks() ^ salt.rotate_left(17);
        SplitMix64::seed_from_u64(seed)
    }
}

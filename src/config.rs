//! Runtime knobs, and the persisted form of rows.
//!
//! Rows persist as [`RowConfig`] snapshots encoded with `postcard`, small
//! enough for a flash sector.
#![expect(clippy::arithmetic_side_effects, reason = "fps is clamped to at least one before dividing")]

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

pub use crate::fixture::RowConfig;

/// Default frames per second.
pub const DEFAULT_FPS: u16 = 60;
/// Default minimum time between remaps.
pub const DEFAULT_REMAP_INTERVAL: Duration = Duration::from_millis(1000);

/// Pacing for [`FrameScheduler`](crate::scheduler::FrameScheduler).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SchedulerConfig {
    /// Target frame rate. Zero is treated as one.
    pub fps: u16,
    /// Remaps happen at most this often, however often they are requested.
    #[serde(with = "duration_millis")]
    pub remap_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            remap_interval: DEFAULT_REMAP_INTERVAL,
        }
    }
}

impl SchedulerConfig {
    /// Time between frames.
    #[must_use]
    pub const fn frame_period(&self) -> Duration {
        let fps = if self.fps == 0 { 1 } else { self.fps as u64 };
        Duration::from_micros(1_000_000 / fps)
    }
}

mod duration_millis {
    use embassy_time::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

//! The frame loop: remap when asked (at most once per interval), render at a
//! fixed rate, and hand each finished frame to a [`PixelDriver`].
//!
//! [`FrameScheduler::poll`] does one pass against a caller-supplied clock,
//! so hosts and tests drive it deterministically. [`FrameScheduler::run`]
//! is the same pass in an `embassy` loop that sleeps until the next frame.
//! Coordinate events wait in their mailbox until the next frame tick.
//!
//! # Example
//!
//! ```
//! use embassy_time::{Duration, Instant};
//! use led_projector::color::RGB8;
//! use led_projector::fixture::{Fixture, Layout, OutputRange, RowConfig};
//! use led_projector::scheduler::{FrameScheduler, PixelDriver, SchedulerConfig};
//! use led_projector::Result;
//!
//! #[derive(Default)]
//! struct CountingDriver {
//!     frames: usize,
//! }
//!
//! impl PixelDriver for CountingDriver {
//!     fn bind_outputs(&mut self, _outputs: &[OutputRange]) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn emit(&mut self, _pixels: &[RGB8]) -> Result<()> {
//!         self.frames += 1;
//!         Ok(())
//!     }
//! }
//!
//! let mut fixture = Fixture::<16, 1>::new(Layout::linear_x(16, 0)?)?;
//! fixture.add_row(RowConfig::default())?;
//! let start = Instant::from_millis(0);
//! let mut scheduler =
//!     FrameScheduler::start(fixture, CountingDriver::default(), SchedulerConfig::default(), start)?;
//!
//! for ms in 0..100 {
//!     scheduler.poll(start + Duration::from_millis(ms))?;
//! }
//! assert_eq!(scheduler.driver().frames, 6);
//! # Ok::<(), led_projector::Error>(())
//! ```
#![expect(clippy::arithmetic_side_effects, reason = "instants are monotonic and periods are short")]

use core::convert::Infallible;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};

use crate::color::RGB8;
pub use crate::config::SchedulerConfig;
use crate::fixture::{Fixture, OutputRange, RemapFlag};
use crate::frame::FrameContext;
use crate::{Coord3D, Result};

/// Hardware (or simulated) pixel output.
pub trait PixelDriver {
    /// Route each output range to its line. Called at start and after every remap.
    ///
    /// # Errors
    ///
    /// [`Error::Driver`](crate::Error::Driver) if the ranges cannot be bound.
    fn bind_outputs(&mut self, outputs: &[OutputRange]) -> Result<()>;

    /// Push one frame of the physical buffer.
    ///
    /// # Errors
    ///
    /// [`Error::Driver`](crate::Error::Driver) if the frame cannot be sent.
    fn emit(&mut self, pixels: &[RGB8]) -> Result<()>;
}

/// Which corner of a row's box a [`CoordinateEvent`] moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoordinateTarget {
    /// The box's first corner.
    Start,
    /// The box's second corner.
    End,
}

/// "Move this corner of this row here", from an external coordinate source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CoordinateEvent {
    /// Row to edit.
    pub row: usize,
    /// Corner to move.
    pub target: CoordinateTarget,
    /// New position, in pixels.
    pub position: Coord3D,
}

impl CoordinateEvent {
    /// Parse `"start:140,150,0"` or `"end:…"` for row 0.
    ///
    /// Components are in tenths of a pixel. Missing or non-numeric
    /// components read as zero. Returns `None` for any other target.
    ///
    /// ```
    /// use led_projector::scheduler::{CoordinateEvent, CoordinateTarget};
    /// use led_projector::Coord3D;
    ///
    /// let event = CoordinateEvent::parse("start:140,150").unwrap();
    /// assert_eq!(event.target, CoordinateTarget::Start);
    /// assert_eq!(event.position, Coord3D::new(14, 15, 0));
    /// assert!(CoordinateEvent::parse("middle:1,2,3").is_none());
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let (target, components) = text.split_once(':').unwrap_or((text, ""));
        let target = match target.trim() {
            "start" => CoordinateTarget::Start,
            "end" => CoordinateTarget::End,
            _ => return None,
        };
        let mut parts = components.split(',').map(|part| leading_int(part) / 10);
        let position = Coord3D::new(
            parts.next().unwrap_or(0),
            parts.next().unwrap_or(0),
            parts.next().unwrap_or(0),
        );
        Some(Self {
            row: 0,
            target,
            position,
        })
    }
}

/// The optional sign and leading digits of `text`, or 0.
fn leading_int(text: &str) -> i32 {
    let text = text.trim_start();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_i32, |value, digit| {
            value.saturating_mul(10).saturating_add(i32::from(digit - b'0'))
        });
    if negative { -magnitude } else { magnitude }
}

/// Mailbox for [`CoordinateEvent`]s; only the newest pending event is kept.
pub type CoordinateSignal = Signal<CriticalSectionRawMutex, CoordinateEvent>;

/// What one [`poll`](FrameScheduler::poll) did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tick {
    /// A coordinate event was consumed.
    pub event_applied: bool,
    /// Mapping tables were rebuilt.
    pub remapped: bool,
    /// A frame was rendered and emitted.
    pub rendered: bool,
}

/// Owns a fixture and its driver, and paces remaps and frames.
pub struct FrameScheduler<'a, D, const N: usize, const ROWS: usize> {
    fixture: Fixture<N, ROWS>,
    driver: D,
    config: SchedulerConfig,
    frame_period: Duration,
    last_frame: Option<Instant>,
    last_remap: Instant,
    frame: u32,
    orientation: Option<Coord3D>,
    external_remap: Option<&'a RemapFlag>,
    coordinates: Option<&'a CoordinateSignal>,
}

impl<'a, D: PixelDriver, const N: usize, const ROWS: usize> FrameScheduler<'a, D, N, ROWS> {
    /// Map every row once, bind outputs, and get ready to render.
    ///
    /// The first frame renders on the first [`poll`](Self::poll).
    ///
    /// # Errors
    ///
    /// Any mapping error (these are configuration errors), or a driver failure.
    pub fn start(
        mut fixture: Fixture<N, ROWS>,
        mut driver: D,
        config: SchedulerConfig,
        now: Instant,
    ) -> Result<Self> {
        fixture.take_remap();
        fixture.project_and_map()?;
        driver.bind_outputs(fixture.outputs())?;
        crate::fmt::info!(
            "scheduler started: {=u16} fps, {=usize} outputs",
            config.fps,
            fixture.outputs().len()
        );
        Ok(Self {
            fixture,
            driver,
            frame_period: config.frame_period(),
            config,
            last_frame: None,
            last_remap: now,
            frame: 0,
            orientation: None,
            external_remap: None,
            coordinates: None,
        })
    }

    /// Also remap when `flag` is raised (e.g. by a UI task).
    #[must_use]
    pub fn with_remap_flag(mut self, flag: &'a RemapFlag) -> Self {
        self.external_remap = Some(flag);
        self
    }

    /// Consume coordinate events from `signal`.
    #[must_use]
    pub fn with_coordinates(mut self, signal: &'a CoordinateSignal) -> Self {
        self.coordinates = Some(signal);
        self
    }

    /// Feed the latest orientation reading (degrees) to the next frames.
    pub const fn set_orientation(&mut self, orientation: Option<Coord3D>) {
        self.orientation = orientation;
    }

    /// One scheduler pass at time `now`.
    ///
    /// In order: on a frame tick, consume at most one coordinate event;
    /// remap if a remap is pending and the remap interval has elapsed; on a
    /// frame tick, render and emit. A late frame is not caught up: the next
    /// one is due a full period after this one.
    ///
    /// # Errors
    ///
    /// Mapping, render, or driver errors. All of them indicate a
    /// configuration problem and are not retried.
    pub fn poll(&mut self, now: Instant) -> Result<Tick> {
        let mut tick = Tick::default();
        let due = self
            .last_frame
            .is_none_or(|last| now.saturating_duration_since(last) >= self.frame_period);

        if let Some(event) = self.coordinates.filter(|_| due).and_then(Signal::try_take) {
            tick.event_applied = self.apply_event(event)?;
        }

        if now.saturating_duration_since(self.last_remap) >= self.config.remap_interval {
            let internal = self.fixture.take_remap();
            let external = self.external_remap.is_some_and(RemapFlag::take);
            if internal || external {
                self.last_remap = now;
                self.fixture.project_and_map()?;
                self.driver.bind_outputs(self.fixture.outputs())?;
                tick.remapped = true;
            }
        }

        if due {
            self.last_frame = Some(now);
            let context = FrameContext::new(now, self.frame).with_orientation(self.orientation);
            self.fixture.render(&context)?;
            self.driver.emit(self.fixture.pixels())?;
            self.frame = self.frame.wrapping_add(1);
            tick.rendered = true;
            crate::fmt::trace!("frame {=u32}", context.frame);
        }

        Ok(tick)
    }

    /// Poll forever, sleeping until the next frame.
    ///
    /// # Errors
    ///
    /// The first error [`poll`](Self::poll) returns.
    pub async fn run(mut self) -> Result<Infallible> {
        loop {
            self.poll(Instant::now())?;
            Timer::at(self.next_frame_at()).await;
        }
    }

    /// When the next frame is due.
    #[must_use]
    pub fn next_frame_at(&self) -> Instant {
        self.last_frame
            .map_or(self.last_remap, |last| last + self.frame_period)
    }

    /// Frames rendered so far.
    #[must_use]
    pub const fn frame_count(&self) -> u32 {
        self.frame
    }

    /// The fixture.
    #[must_use]
    pub const fn fixture(&self) -> &Fixture<N, ROWS> {
        &self.fixture
    }

    /// The fixture, for edits between polls.
    pub const fn fixture_mut(&mut self) -> &mut Fixture<N, ROWS> {
        &mut self.fixture
    }

    /// The driver.
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Give back the fixture and driver.
    pub fn into_parts(self) -> (Fixture<N, ROWS>, D) {
        (self.fixture, self.driver)
    }

    fn apply_event(&mut self, event: CoordinateEvent) -> Result<bool> {
        let Ok(row) = self.fixture.row(event.row) else {
            crate::fmt::debug!("coordinate event for missing row {=usize}", event.row);
            return Ok(false);
        };
        let (mut start, mut end) = (row.config().start, row.config().end);
        match event.target {
            CoordinateTarget::Start => start = event.position,
            CoordinateTarget::End => end = event.position,
        }
        self.fixture.set_bounds(event.row, start, end)?;
        Ok(true)
    }
}

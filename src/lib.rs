//! Project generic 1D, 2D, and 3D LED effects onto arbitrary physical fixtures.
//!
//! Effects are written once against an abstract logical grid. A fixture is
//! any set of LEDs with 3D positions: a strip, a serpentine panel, a ring, a
//! cube, or a mix of these on several output lines. Between the two sits a
//! *projection*, which decides for every physical LED which logical pixel
//! drives it.
//!
//! # Glossary
//!
//! - **Fixture:** the physical LEDs ([`fixture::Layout`]) and their color buffer.
//! - **Row:** one effect plus one projection, drawn inside a bounding box of the fixture.
//! - **Logical grid:** the 1D/2D/3D canvas an effect draws on ([`leds::Leds`]).
//! - **Projection:** physical position → logical index, computed on remap and
//!   cached ([`projection`]).
//! - **State arena:** a row's fixed-size scratch memory, recovered every frame
//!   by replaying the same sequence of typed reads ([`arena`]).
//! - **Remap:** rebuilding every row's mapping table; throttled by the
//!   [`scheduler`].
//!
//! # Example
//!
//! ```
//! use led_projector::fixture::{Fixture, Layout, RowConfig};
//! use led_projector::frame::FrameContext;
//! use led_projector::projection::projection_index;
//! use led_projector::effect::effect_index;
//! use led_projector::Coord3D;
//! use embassy_time::Instant;
//!
//! // An 8×8 serpentine panel with one rainbow row over the whole panel.
//! let mut fixture = Fixture::<64, 2>::new(Layout::serpentine_row_major(8, 8, 0)?)?;
//! let rainbow = effect_index("Rainbow").unwrap() as u8;
//! let default = projection_index("Default").unwrap() as u8;
//! fixture.add_row(RowConfig::new(rainbow, default, Coord3D::ZERO, Coord3D::new(7, 7, 0)))?;
//!
//! fixture.project_and_map()?;
//! fixture.render(&FrameContext::new(Instant::from_millis(0), 0))?;
//! assert!(fixture.pixels().iter().any(|pixel| *pixel != Default::default()));
//! # Ok::<(), led_projector::Error>(())
//! ```
#![cfg_attr(not(test), no_std)]

pub mod arena;
pub mod color;
pub mod config;
pub mod controls;
pub mod coord;
pub mod effect;
mod error;
pub mod fixture;
mod fmt;
pub mod frame;
pub mod leds;
pub mod projection;
pub mod scheduler;

pub use crate::coord::{Coord3D, Dimension};
pub use crate::error::{Error, Result};

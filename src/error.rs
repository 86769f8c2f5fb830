//! Crate-wide error type.

use derive_more::{Display, Error};

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors raised while configuring or driving a fixture.
///
/// Everything here is a configuration error: a fixed-size assumption was
/// violated. Pixels that have no logical source are not errors; they are
/// carried as [`NOT_SHOWN`](crate::projection::NOT_SHOWN) and skipped.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A write or read would run past the end of a state arena.
    #[display("state arena overflow: {requested} bytes at offset {offset} exceed capacity {capacity}")]
    ArenaOverflow {
        /// Cursor position when the access was attempted.
        offset: usize,
        /// Bytes the access needed.
        requested: usize,
        /// Fixed arena capacity.
        capacity: usize,
    },

    /// A projected logical grid has more cells than a mapping index can address.
    #[display("logical grid of {cells} cells does not fit the mapping index")]
    LogicalGridTooLarge {
        /// Cells in the offending grid.
        cells: u32,
    },

    /// A mapping entry points outside the fixture's physical buffer.
    #[display("physical index {index} is outside the fixture of {len} pixels")]
    PhysicalIndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Length of the physical buffer.
        len: usize,
    },

    /// No row exists at this index.
    #[display("row {_0} does not exist")]
    RowIndexOutOfRange(#[error(not(source))] usize),

    /// The fixture already holds its maximum number of rows.
    #[display("fixture row capacity reached")]
    RowCapacity,

    /// The layout already holds its maximum number of pixels.
    #[display("layout pixel capacity reached")]
    LayoutCapacity,

    /// The layout holds more distinct output pins than can be bound.
    #[display("output range capacity reached")]
    OutputCapacity,

    /// Pixel positions must be non-negative.
    #[display("pixel position has a negative component")]
    NegativePosition,

    /// No effect is registered at this index.
    #[display("effect {_0} is not registered")]
    EffectIndexOutOfRange(#[error(not(source))] usize),

    /// No projection is registered at this index.
    #[display("projection {_0} is not registered")]
    ProjectionIndexOutOfRange(#[error(not(source))] usize),

    /// No control with this name was declared.
    #[display("unknown control")]
    UnknownControl,

    /// The control exists, but holds a different kind of value.
    #[display("control value does not match the declared control kind")]
    ControlTypeMismatch,

    /// Too many controls were declared for one row.
    #[display("control list capacity reached")]
    ControlCapacity,

    /// The pixel driver rejected a frame or binding.
    #[display("pixel driver failure")]
    Driver,

    /// A row configuration could not be encoded or decoded.
    #[display("row configuration encoding failed")]
    ConfigEncoding,
}

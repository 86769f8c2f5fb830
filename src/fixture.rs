//! A fixture: the physical LEDs, their color buffer, and the rows drawn on them.
//!
//! Rows are remapped as a batch by [`Fixture::project_and_map`]: every
//! layout pixel inside a row's bounding box is pushed through the row's
//! projection and the result cached in the row's [`MappingTable`]. Frames
//! then only read the cache.
//!
//! Rows render in order onto one shared buffer, so where boxes overlap the
//! last row wins.
#![expect(clippy::arithmetic_side_effects, reason = "positions and pixel counts are bounded by N")]

pub mod layout;
pub mod row;

use heapless::Vec;
use portable_atomic::{AtomicBool, Ordering};

pub use layout::{Layout, Pixel};
pub use row::{MapEntry, MappingTable, Row, RowConfig};

use crate::color::{RGB8, colors};
use crate::controls::{ControlTarget, ControlValue};
use crate::effect::effect;
use crate::frame::FrameContext;
use crate::leds::Leds;
use crate::projection::{Geometry, projection};
use crate::{Coord3D, Error, Result};

/// Most output lines a layout may use.
pub const MAX_OUTPUTS: usize = 16;

/// "Remap before the next frame" request, settable from any context.
///
/// ```
/// use led_projector::fixture::RemapFlag;
///
/// static REMAP: RemapFlag = RemapFlag::new();
/// REMAP.request();
/// assert!(REMAP.take());
/// assert!(!REMAP.take());
/// ```
#[derive(Debug, Default)]
pub struct RemapFlag(AtomicBool);

impl RemapFlag {
    /// A flag with no pending request.
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Ask for a remap.
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Consume the pending request, if any.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    /// True if a request is pending.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A contiguous run of the physical buffer wired to one output line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputRange {
    /// Output line.
    pub pin: u8,
    /// First physical index of the run.
    pub start: u16,
    /// Pixels in the run.
    pub len: u16,
}

/// Physical LEDs plus the rows that draw on them.
///
/// `N` is the most LEDs the layout may hold; `ROWS` is the most rows.
pub struct Fixture<const N: usize, const ROWS: usize> {
    layout: Layout<N>,
    buffer: [RGB8; N],
    size: Coord3D,
    rows: Vec<Row<N>, ROWS>,
    remap: RemapFlag,
    outputs: Vec<OutputRange, MAX_OUTPUTS>,
}

impl<const N: usize, const ROWS: usize> Fixture<N, ROWS> {
    /// A fixture with no rows.
    ///
    /// # Errors
    ///
    /// [`Error::OutputCapacity`] if the layout switches output lines more
    /// than [`MAX_OUTPUTS`] times.
    pub fn new(layout: Layout<N>) -> Result<Self> {
        let outputs = output_ranges(&layout)?;
        let size = layout.size();
        crate::fmt::info!(
            "fixture of {=usize} pixels on {=usize} outputs",
            layout.len(),
            outputs.len()
        );
        Ok(Self {
            layout,
            buffer: [colors::BLACK; N],
            size,
            rows: Vec::new(),
            remap: RemapFlag::new(),
            outputs,
        })
    }

    /// Append a row and flag a remap. Returns the row's index.
    ///
    /// # Errors
    ///
    /// [`Error::RowCapacity`], or any error from [`Row::new`].
    pub fn add_row(&mut self, config: RowConfig) -> Result<usize> {
        let row = Row::new(config, self.size)?;
        self.rows.push(row).map_err(|_| Error::RowCapacity)?;
        self.remap.request();
        Ok(self.rows.len() - 1)
    }

    /// Remove a row, blanking the pixels it drew.
    ///
    /// # Errors
    ///
    /// [`Error::RowIndexOutOfRange`].
    pub fn remove_row(&mut self, index: usize) -> Result<()> {
        if index >= self.rows.len() {
            return Err(Error::RowIndexOutOfRange(index));
        }
        self.blank_row(index);
        self.rows.remove(index);
        self.remap.request();
        Ok(())
    }

    /// The row at `index`.
    ///
    /// # Errors
    ///
    /// [`Error::RowIndexOutOfRange`].
    pub fn row(&self, index: usize) -> Result<&Row<N>> {
        self.rows.get(index).ok_or(Error::RowIndexOutOfRange(index))
    }

    /// All rows, in render order.
    #[must_use]
    pub fn rows(&self) -> &[Row<N>] {
        &self.rows
    }

    /// Switch a row's effect. Takes effect next frame.
    ///
    /// # Errors
    ///
    /// Unknown row or effect index.
    pub fn set_effect(&mut self, index: usize, effect_index: usize) -> Result<()> {
        self.row_mut(index)?.set_effect(effect_index)?;
        self.blank_row(index);
        self.remap.request();
        Ok(())
    }

    /// Switch a row's projection and flag a remap.
    ///
    /// # Errors
    ///
    /// Unknown row or projection index.
    pub fn set_projection(&mut self, index: usize, projection_index: usize) -> Result<()> {
        self.row_mut(index)?.set_projection(projection_index)?;
        self.blank_row(index);
        self.remap.request();
        Ok(())
    }

    /// Move a row's bounding box, blanking what it drew before.
    ///
    /// # Errors
    ///
    /// [`Error::RowIndexOutOfRange`].
    pub fn set_bounds(&mut self, index: usize, start: Coord3D, end: Coord3D) -> Result<()> {
        self.row(index)?;
        self.blank_row(index);
        let row = self.row_mut(index)?;
        row.config.start = start;
        row.config.end = end;
        self.remap.request();
        Ok(())
    }

    /// Override (or with `None`, reset) a row's midpoint.
    ///
    /// # Errors
    ///
    /// [`Error::RowIndexOutOfRange`].
    pub fn set_midpoint(&mut self, index: usize, midpoint: Option<Coord3D>) -> Result<()> {
        self.row_mut(index)?.config.midpoint = midpoint;
        self.remap.request();
        Ok(())
    }

    /// Set a named control. Projection edits flag a remap.
    ///
    /// # Errors
    ///
    /// Unknown row or control, or a value of the wrong kind.
    pub fn set_control(
        &mut self,
        index: usize,
        target: ControlTarget,
        name: &str,
        value: ControlValue,
    ) -> Result<()> {
        self.row_mut(index)?.set_control(target, name, value)?;
        if target == ControlTarget::Projection {
            self.blank_row(index);
            self.remap.request();
        }
        Ok(())
    }

    /// Rebuild every row's mapping table.
    ///
    /// A row whose box changed dimension has its projection's named
    /// controls rebuilt; their values are kept.
    ///
    /// # Errors
    ///
    /// Arena overflow or an oversized logical grid. Rows mapped before the
    /// failing one keep their new tables.
    pub fn project_and_map(&mut self) -> Result<()> {
        let fixture_size = self.size;
        for row in &mut self.rows {
            if row.refresh_dimensions(fixture_size) {
                row.redeclare_projection()?;
            }
            let selected = projection(usize::from(row.config.projection))?;
            let dims = row.dims();
            let (start, box_size) = row.bounds(fixture_size);
            let mid = row.midpoint(fixture_size);
            let mut row_size = None;
            row.mapping.clear();
            for (physical, pixel) in self.layout.pixels().iter().enumerate() {
                let relative = pixel.position - start;
                if relative.is_out_of_bounds(box_size) {
                    continue;
                }
                let physical = u16::try_from(physical).map_err(|_| {
                    Error::PhysicalIndexOutOfRange {
                        index: physical,
                        len: self.layout.len(),
                    }
                })?;
                let geometry = Geometry::new(box_size, relative, mid);
                let logical = selected.setup(dims, geometry, &mut row_size, &mut row.projection_state)?;
                row.mapping.insert(logical, physical)?;
            }
            row.mapping.finish();
            row.size = row_size.unwrap_or(Coord3D::ONE);
            crate::fmt::debug!(
                "row mapped: {=usize} pixels onto {=i32}x{=i32}x{=i32}",
                row.mapping.len(),
                row.size.x,
                row.size.y,
                row.size.z
            );
        }
        crate::fmt::info!("remapped {=usize} rows", self.rows.len());
        Ok(())
    }

    /// Run every row's effect once, in row order.
    ///
    /// # Errors
    ///
    /// Arena overflow while an effect or projection replays its state.
    pub fn render(&mut self, frame: &FrameContext) -> Result<()> {
        let fixture_size = self.size;
        let len = self.layout.len();
        let buffer = self.buffer.get_mut(..len).unwrap_or_default();
        for row in &mut self.rows {
            let selected = effect(usize::from(row.config.effect))?;
            let transform = projection(usize::from(row.config.projection))?.frame_transform(
                &mut row.projection_state.replay(),
                frame,
                row.size,
                fixture_size,
            )?;
            let mut leds = Leds::new(&mut *buffer, row.mapping.entries(), row.size, transform);
            selected.render(&mut leds, &mut row.effect_state.replay(), frame)?;
        }
        Ok(())
    }

    /// Take the internal remap request, if any.
    pub fn take_remap(&self) -> bool {
        self.remap.take()
    }

    /// The internal remap flag.
    #[must_use]
    pub const fn remap_flag(&self) -> &RemapFlag {
        &self.remap
    }

    /// Output runs, in physical order.
    #[must_use]
    pub fn outputs(&self) -> &[OutputRange] {
        &self.outputs
    }

    /// The physical color buffer, one entry per layout pixel.
    #[must_use]
    pub fn pixels(&self) -> &[RGB8] {
        self.buffer.get(..self.layout.len()).unwrap_or_default()
    }

    /// Mutable physical color buffer.
    pub fn pixels_mut(&mut self) -> &mut [RGB8] {
        let len = self.layout.len();
        self.buffer.get_mut(..len).unwrap_or_default()
    }

    /// Blank the whole buffer.
    pub fn clear(&mut self) {
        self.buffer.fill(colors::BLACK);
    }

    /// The layout.
    #[must_use]
    pub const fn layout(&self) -> &Layout<N> {
        &self.layout
    }

    /// Bounding size of the layout.
    #[must_use]
    pub const fn size(&self) -> Coord3D {
        self.size
    }

    fn row_mut(&mut self, index: usize) -> Result<&mut Row<N>> {
        self.rows.get_mut(index).ok_or(Error::RowIndexOutOfRange(index))
    }

    fn blank_row(&mut self, index: usize) {
        let Some(row) = self.rows.get(index) else {
            return;
        };
        for entry in row.mapping.entries() {
            if let Some(pixel) = self.buffer.get_mut(usize::from(entry.physical)) {
                *pixel = colors::BLACK;
            }
        }
    }
}

fn output_ranges<const N: usize>(layout: &Layout<N>) -> Result<Vec<OutputRange, MAX_OUTPUTS>> {
    let mut outputs: Vec<OutputRange, MAX_OUTPUTS> = Vec::new();
    for (index, pixel) in layout.pixels().iter().enumerate() {
        match outputs.last_mut() {
            Some(range) if range.pin == pixel.pin => range.len += 1,
            _ => outputs
                .push(OutputRange {
                    pin: pixel.pin,
                    start: u16::try_from(index).map_err(|_| Error::LayoutCapacity)?,
                    len: 1,
                })
                .map_err(|_| Error::OutputCapacity)?,
        }
    }
    Ok(outputs)
}

//! A row binds one effect and one projection to a box of the fixture.
#![expect(clippy::arithmetic_side_effects, reason = "bounds are clamped to the fixture size")]

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::arena::{EFFECT_ARENA_BYTES, PROJECTION_ARENA_BYTES, StateArena};
use crate::controls::{ControlList, ControlTarget, ControlValue, Controls, apply_control, read_control};
use crate::effect::{DEFAULT_EFFECT, effect};
use crate::projection::{DEFAULT_PROJECTION, Dims, NOT_SHOWN, projection};
use crate::{Coord3D, Dimension, Error, Result};

/// One cached mapping: `physical` is driven by logical pixel `logical`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MapEntry {
    /// Index in the effect's logical grid.
    pub logical: u16,
    /// Index in the fixture's physical buffer.
    pub physical: u16,
}

/// Logical → physical lookup for one row, rebuilt on every remap.
///
/// Entries are sorted by logical index, so all physical pixels driven by
/// one logical pixel sit in one run. Physical pixels without a logical
/// source are simply absent.
#[derive(Clone, Debug, Default)]
pub struct MappingTable<const N: usize> {
    entries: Vec<MapEntry, N>,
}

impl<const N: usize> MappingTable<N> {
    /// An empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// All entries, sorted by logical index.
    #[must_use]
    pub fn entries(&self) -> &[MapEntry] {
        &self.entries
    }

    /// Number of mapped physical pixels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no physical pixel is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Physical pixels driven by `logical`.
    pub fn physical(&self, logical: u16) -> impl Iterator<Item = u16> + '_ {
        physical_run(&self.entries, logical).iter().map(|entry| entry.physical)
    }

    /// Logical pixel driving `physical`, or [`NOT_SHOWN`].
    #[must_use]
    pub fn logical(&self, physical: u16) -> u16 {
        self.entries
            .iter()
            .find(|entry| entry.physical == physical)
            .map_or(NOT_SHOWN, |entry| entry.logical)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn insert(&mut self, logical: u16, physical: u16) -> Result<()> {
        if logical == NOT_SHOWN {
            return Ok(());
        }
        self.entries
            .push(MapEntry { logical, physical })
            .map_err(|_| Error::PhysicalIndexOutOfRange {
                index: usize::from(physical),
                len: N,
            })
    }

    pub(crate) fn finish(&mut self) {
        self.entries.sort_unstable();
    }
}

/// The run of entries for `logical` in a table sorted by logical index.
pub(crate) fn physical_run(entries: &[MapEntry], logical: u16) -> &[MapEntry] {
    let start = entries.partition_point(|entry| entry.logical < logical);
    let rest = entries.get(start..).unwrap_or_default();
    let len = rest.partition_point(|entry| entry.logical == logical);
    rest.get(..len).unwrap_or_default()
}

/// Serializable description of a row, for persistence.
///
/// ```
/// use led_projector::fixture::RowConfig;
/// use led_projector::Coord3D;
///
/// let config = RowConfig::new(1, 1, Coord3D::ZERO, Coord3D::new(7, 7, 0));
/// let mut buffer = [0_u8; 64];
/// let bytes = config.to_bytes(&mut buffer)?;
/// assert_eq!(RowConfig::from_bytes(bytes)?, config);
/// # Ok::<(), led_projector::Error>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RowConfig {
    /// Effect selector.
    pub effect: u8,
    /// Projection selector.
    pub projection: u8,
    /// First corner of the bounding box (inclusive).
    pub start: Coord3D,
    /// Second corner of the bounding box (inclusive).
    pub end: Coord3D,
    /// Center for distance/angle math, relative to `start`. `None` uses the box center.
    pub midpoint: Option<Coord3D>,
}

impl Default for RowConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_EFFECT as u8,
            DEFAULT_PROJECTION as u8,
            Coord3D::ZERO,
            Coord3D::splat(i32::from(u16::MAX)),
        )
    }
}

impl RowConfig {
    /// A row over `start..=end`.
    #[must_use]
    pub const fn new(effect: u8, projection: u8, start: Coord3D, end: Coord3D) -> Self {
        Self {
            effect,
            projection,
            start,
            end,
            midpoint: None,
        }
    }

    /// Override the midpoint.
    #[must_use]
    pub const fn with_midpoint(mut self, midpoint: Coord3D) -> Self {
        self.midpoint = Some(midpoint);
        self
    }

    /// Encode with `postcard`.
    ///
    /// # Errors
    ///
    /// [`Error::ConfigEncoding`] if `buffer` is too small.
    pub fn to_bytes<'b>(&self, buffer: &'b mut [u8]) -> Result<&'b mut [u8]> {
        postcard::to_slice(self, buffer).map_err(|_| Error::ConfigEncoding)
    }

    /// Decode from `postcard` bytes.
    ///
    /// # Errors
    ///
    /// [`Error::ConfigEncoding`] if the bytes are not a row configuration.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        postcard::from_bytes(bytes).map_err(|_| Error::ConfigEncoding)
    }
}

/// One effect instance bound to a box of the fixture.
pub struct Row<const N: usize> {
    pub(crate) config: RowConfig,
    pub(crate) effect_dimension: Dimension,
    pub(crate) projection_dimension: Dimension,
    pub(crate) effect_state: StateArena<EFFECT_ARENA_BYTES>,
    pub(crate) effect_controls: ControlList,
    pub(crate) projection_state: StateArena<PROJECTION_ARENA_BYTES>,
    pub(crate) projection_controls: ControlList,
    pub(crate) size: Coord3D,
    pub(crate) mapping: MappingTable<N>,
}

impl<const N: usize> Row<N> {
    /// A row with freshly initialized effect and projection state.
    ///
    /// `fixture_size` clamps the bounding box. The mapping stays empty
    /// until the next remap.
    ///
    /// # Errors
    ///
    /// Unknown selectors or arena overflow while declaring controls.
    pub fn new(config: RowConfig, fixture_size: Coord3D) -> Result<Self> {
        let mut row = Self {
            config,
            effect_dimension: Dimension::D1,
            projection_dimension: Dimension::D1,
            effect_state: StateArena::new(),
            effect_controls: ControlList::new(),
            projection_state: StateArena::new(),
            projection_controls: ControlList::new(),
            size: Coord3D::ONE,
            mapping: MappingTable::new(),
        };
        row.refresh_dimensions(fixture_size);
        row.set_effect(usize::from(config.effect))?;
        row.set_projection(usize::from(config.projection))?;
        Ok(row)
    }

    /// Select an effect, zero its arena, and declare its controls.
    ///
    /// If the effect's dimension differs from the previous one, the
    /// projection's named controls are rebuilt too, keeping their values.
    ///
    /// # Errors
    ///
    /// [`Error::EffectIndexOutOfRange`] or arena overflow.
    pub fn set_effect(&mut self, index: usize) -> Result<()> {
        let selected = effect(index)?;
        self.config.effect = u8::try_from(index).map_err(|_| Error::EffectIndexOutOfRange(index))?;
        let previous = self.effect_dimension;
        self.effect_dimension = selected.dimension();
        let mut controls = Controls::begin(&mut self.effect_state, &mut self.effect_controls);
        selected.controls(&mut controls)?;
        crate::fmt::debug!("row effect {=usize} declared", index);
        if previous != self.effect_dimension {
            self.redeclare_projection()?;
        }
        Ok(())
    }

    /// Select a projection, zero its arena, and declare its controls.
    ///
    /// # Errors
    ///
    /// [`Error::ProjectionIndexOutOfRange`] or arena overflow.
    pub fn set_projection(&mut self, index: usize) -> Result<()> {
        let selected = projection(index)?;
        self.config.projection =
            u8::try_from(index).map_err(|_| Error::ProjectionIndexOutOfRange(index))?;
        let dims = self.dims();
        let mut controls = Controls::begin(&mut self.projection_state, &mut self.projection_controls);
        selected.controls(dims, &mut controls)?;
        crate::fmt::debug!("row projection {=usize} declared", index);
        Ok(())
    }

    /// Rebuild the projection's named controls for the current dimensions,
    /// keeping every value already in its arena.
    ///
    /// # Errors
    ///
    /// [`Error::ProjectionIndexOutOfRange`] or arena overflow.
    pub(crate) fn redeclare_projection(&mut self) -> Result<()> {
        let selected = projection(usize::from(self.config.projection))?;
        let dims = self.dims();
        let mut controls = Controls::redeclare(&mut self.projection_state, &mut self.projection_controls);
        selected.controls(dims, &mut controls)?;
        crate::fmt::debug!("row projection controls redeclared");
        Ok(())
    }

    /// Write a named control of the effect or projection.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownControl`] or [`Error::ControlTypeMismatch`].
    pub fn set_control(&mut self, target: ControlTarget, name: &str, value: ControlValue) -> Result<()> {
        match target {
            ControlTarget::Effect => {
                apply_control(&mut self.effect_state, &self.effect_controls, name, value)
            }
            ControlTarget::Projection => apply_control(
                &mut self.projection_state,
                &self.projection_controls,
                name,
                value,
            ),
        }
    }

    /// Read a named control of the effect or projection.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownControl`].
    pub fn control(&self, target: ControlTarget, name: &str) -> Result<ControlValue> {
        match target {
            ControlTarget::Effect => read_control(&self.effect_state, &self.effect_controls, name),
            ControlTarget::Projection => {
                read_control(&self.projection_state, &self.projection_controls, name)
            }
        }
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &RowConfig {
        &self.config
    }

    /// Effect and projection dimensions.
    #[must_use]
    pub const fn dims(&self) -> Dims {
        Dims::new(self.effect_dimension, self.projection_dimension)
    }

    /// Logical grid size from the latest remap.
    #[must_use]
    pub const fn size(&self) -> Coord3D {
        self.size
    }

    /// Mapping from the latest remap.
    #[must_use]
    pub const fn mapping(&self) -> &MappingTable<N> {
        &self.mapping
    }

    /// Named effect controls.
    #[must_use]
    pub fn effect_controls(&self) -> &ControlList {
        &self.effect_controls
    }

    /// Named projection controls.
    #[must_use]
    pub fn projection_controls(&self) -> &ControlList {
        &self.projection_controls
    }

    /// Bounding box clamped to the fixture: `(start, size)`.
    #[must_use]
    pub fn bounds(&self, fixture_size: Coord3D) -> (Coord3D, Coord3D) {
        let last = fixture_size - Coord3D::ONE;
        let start = self.config.start.maximum(Coord3D::ZERO).minimum(last);
        let end = self.config.end.maximum(Coord3D::ZERO).minimum(last);
        let (low, high) = (start.minimum(end), start.maximum(end));
        (low, high - low + Coord3D::ONE)
    }

    /// Center used for distance/angle math, relative to the box start.
    #[must_use]
    pub fn midpoint(&self, fixture_size: Coord3D) -> Coord3D {
        let (_, size) = self.bounds(fixture_size);
        self.config
            .midpoint
            .unwrap_or((size - Coord3D::ONE) / 2)
    }

    /// Recompute the projection dimension from the clamped box. True if it changed.
    pub(crate) fn refresh_dimensions(&mut self, fixture_size: Coord3D) -> bool {
        let (_, size) = self.bounds(fixture_size);
        let dimension = Dimension::of_box(size);
        let changed = dimension != self.projection_dimension;
        self.projection_dimension = dimension;
        changed
    }
}

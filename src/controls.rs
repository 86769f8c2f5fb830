//! Named controls declared while a component initializes its arena.
//!
//! A control is an ordinary arena value that also gets a name and a range,
//! so a UI layer can later find it (`"petals"`, `"bpm"`) and overwrite it
//! in place without knowing anything about the component's layout.

use heapless::Vec;

use crate::arena::{ArenaValue, ArenaWriter, Slot, SlotArray, StateArena};
use crate::{Coord3D, Error, Result};

/// Most named controls one component may declare.
pub const MAX_CONTROLS: usize = 8;

/// The named controls of one component, in declaration order.
pub type ControlList = Vec<ControlDescriptor, MAX_CONTROLS>;

/// What kind of value a control holds, with its allowed range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlKind {
    /// A byte slider, clamped into `min..=max`.
    Slider {
        /// Smallest accepted value.
        min: u8,
        /// Largest accepted value.
        max: u8,
    },
    /// An on/off switch.
    Checkbox,
    /// One of a fixed list of named options, stored as its index.
    Select {
        /// Option names, by index.
        options: &'static [&'static str],
    },
    /// A 3D coordinate, clamped into `min..=max` per axis.
    Coord {
        /// Smallest accepted value.
        min: Coord3D,
        /// Largest accepted value.
        max: Coord3D,
    },
}

/// Where a named control lives in its arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlDescriptor {
    /// Lookup name.
    pub name: &'static str,
    /// Byte offset of the value.
    pub offset: usize,
    /// Kind and range.
    pub kind: ControlKind,
}

/// A new value for a named control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlValue {
    /// For [`ControlKind::Slider`].
    Slider(u8),
    /// For [`ControlKind::Checkbox`].
    Checkbox(bool),
    /// For [`ControlKind::Select`]: the option index.
    Select(u8),
    /// For [`ControlKind::Coord`].
    Coord(Coord3D),
}

/// Which of a row's two components a control edit targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlTarget {
    /// The effect; edits take effect next frame.
    Effect,
    /// The projection; edits also flag the row for remap.
    Projection,
}

/// Declares state (named or not) during initialization.
pub struct Controls<'a, const CAP: usize> {
    writer: ArenaWriter<'a, CAP>,
    list: &'a mut ControlList,
}

impl<'a, const CAP: usize> Controls<'a, CAP> {
    /// Zero `arena`, clear `list`, and start declaring.
    pub fn begin(arena: &'a mut StateArena<CAP>, list: &'a mut ControlList) -> Self {
        list.clear();
        Self {
            writer: arena.initialize(),
            list,
        }
    }

    /// Clear `list` and declare again over the values already in `arena`.
    ///
    /// Rebuilds names and ranges, e.g. after the row's dimensions change,
    /// without resetting any setting. See [`StateArena::redeclare`].
    pub fn redeclare(arena: &'a mut StateArena<CAP>, list: &'a mut ControlList) -> Self {
        list.clear();
        Self {
            writer: arena.redeclare(),
            list,
        }
    }

    /// A byte slider named `name`.
    ///
    /// # Errors
    ///
    /// Arena overflow or a full control list.
    pub fn slider(&mut self, name: &'static str, initial: u8, min: u8, max: u8) -> Result<Slot<u8>> {
        let slot = self.writer.write(initial.clamp(min, max))?;
        self.record(name, slot.offset(), ControlKind::Slider { min, max })?;
        Ok(slot)
    }

    /// An on/off switch named `name`.
    ///
    /// # Errors
    ///
    /// Arena overflow or a full control list.
    pub fn checkbox(&mut self, name: &'static str, initial: bool) -> Result<Slot<bool>> {
        let slot = self.writer.write(initial)?;
        self.record(name, slot.offset(), ControlKind::Checkbox)?;
        Ok(slot)
    }

    /// A choice among `options` named `name`.
    ///
    /// # Errors
    ///
    /// Arena overflow or a full control list.
    pub fn select(
        &mut self,
        name: &'static str,
        initial: u8,
        options: &'static [&'static str],
    ) -> Result<Slot<u8>> {
        let slot = self.writer.write(initial.min(last_option(options)))?;
        self.record(name, slot.offset(), ControlKind::Select { options })?;
        Ok(slot)
    }

    /// A coordinate named `name`.
    ///
    /// # Errors
    ///
    /// Arena overflow or a full control list.
    pub fn coord(
        &mut self,
        name: &'static str,
        initial: Coord3D,
        min: Coord3D,
        max: Coord3D,
    ) -> Result<Slot<Coord3D>> {
        let slot = self.writer.write(initial.maximum(min).minimum(max))?;
        self.record(name, slot.offset(), ControlKind::Coord { min, max })?;
        Ok(slot)
    }

    /// Unnamed persistent state.
    ///
    /// # Errors
    ///
    /// Arena overflow.
    pub fn state<T: ArenaValue>(&mut self, initial: T) -> Result<Slot<T>> {
        self.writer.write(initial)
    }

    /// Unnamed persistent array.
    ///
    /// # Errors
    ///
    /// Arena overflow.
    pub fn state_array<T: ArenaValue>(&mut self, count: usize, initial: T) -> Result<SlotArray<T>> {
        self.writer.write_array(count, initial)
    }

    /// The controls declared so far.
    #[must_use]
    pub fn declared(&self) -> &[ControlDescriptor] {
        self.list
    }

    fn record(&mut self, name: &'static str, offset: usize, kind: ControlKind) -> Result<()> {
        self.list
            .push(ControlDescriptor { name, offset, kind })
            .map_err(|_| Error::ControlCapacity)
    }
}

/// Write `value` into the control called `name`, clamping it into range.
///
/// # Errors
///
/// [`Error::UnknownControl`] or [`Error::ControlTypeMismatch`].
pub fn apply_control<const CAP: usize>(
    arena: &mut StateArena<CAP>,
    list: &ControlList,
    name: &str,
    value: ControlValue,
) -> Result<()> {
    let descriptor = list
        .iter()
        .find(|descriptor| descriptor.name == name)
        .ok_or(Error::UnknownControl)?;
    match (descriptor.kind, value) {
        (ControlKind::Slider { min, max }, ControlValue::Slider(value)) => {
            arena.set(Slot::<u8>::at(descriptor.offset), value.clamp(min, max));
        }
        (ControlKind::Checkbox, ControlValue::Checkbox(value)) => {
            arena.set(Slot::<bool>::at(descriptor.offset), value);
        }
        (ControlKind::Select { options }, ControlValue::Select(value)) => {
            arena.set(Slot::<u8>::at(descriptor.offset), value.min(last_option(options)));
        }
        (ControlKind::Coord { min, max }, ControlValue::Coord(value)) => {
            arena.set(
                Slot::<Coord3D>::at(descriptor.offset),
                value.maximum(min).minimum(max),
            );
        }
        _ => return Err(Error::ControlTypeMismatch),
    }
    Ok(())
}

/// Current value of the control called `name`.
///
/// # Errors
///
/// [`Error::UnknownControl`].
pub fn read_control<const CAP: usize>(
    arena: &StateArena<CAP>,
    list: &ControlList,
    name: &str,
) -> Result<ControlValue> {
    let descriptor = list
        .iter()
        .find(|descriptor| descriptor.name == name)
        .ok_or(Error::UnknownControl)?;
    Ok(match descriptor.kind {
        ControlKind::Slider { .. } => ControlValue::Slider(arena.get(Slot::at(descriptor.offset))),
        ControlKind::Checkbox => ControlValue::Checkbox(arena.get(Slot::at(descriptor.offset))),
        ControlKind::Select { .. } => ControlValue::Select(arena.get(Slot::at(descriptor.offset))),
        ControlKind::Coord { .. } => ControlValue::Coord(arena.get(Slot::at(descriptor.offset))),
    })
}

fn last_option(options: &[&str]) -> u8 {
    u8::try_from(options.len().saturating_sub(1)).unwrap_or(u8::MAX)
}

//! Per-row persistent scratch storage recovered by positional replay.
//!
//! Effects and projections are zero-sized. Anything they need to remember
//! between frames lives in a [`StateArena`] owned by the row. The protocol
//! has two phases:
//!
//! - **Initialize** ([`StateArena::initialize`]): the buffer is zeroed and the
//!   component declares its state through an [`ArenaWriter`], one
//!   [`write`](ArenaWriter::write) per value, each returning a typed [`Slot`].
//! - **Replay** ([`StateArena::replay`]): every frame (and every remap) the
//!   component walks an [`ArenaReader`] in *exactly* the same order and
//!   sizes, recovering the same offsets.
//!
//! The arena stores no tags: identity is position. Values are encoded
//! little-endian, so no reference into the buffer is ever handed out and
//! nothing is read or written past capacity. Running out of room is a
//! configuration error ([`Error::ArenaOverflow`]).
//!
//! # Example
//!
//! ```
//! use led_projector::arena::StateArena;
//!
//! let mut arena = StateArena::<16>::new();
//! let mut writer = arena.initialize();
//! writer.write(7_u8)?;
//! writer.write(1.5_f32)?;
//!
//! let mut reader = arena.replay();
//! let count: u8 = reader.read()?;
//! let speed = reader.read_write::<f32>()?;
//! let doubled = reader.get(speed) * 2.0;
//! reader.set(speed, doubled);
//! assert_eq!(count, 7);
//!
//! let mut again = arena.replay();
//! again.read::<u8>()?;
//! assert_eq!(again.read::<f32>()?, 3.0);
//! # Ok::<(), led_projector::Error>(())
//! ```
#![expect(clippy::arithmetic_side_effects, reason = "offsets are bounded by the arena capacity")]

use core::marker::PhantomData;

use crate::{Coord3D, Error, Result};

/// Bytes reserved for each row's effect state.
pub const EFFECT_ARENA_BYTES: usize = 1024;
/// Bytes reserved for each row's projection state.
pub const PROJECTION_ARENA_BYTES: usize = 32;

/// A value that can live in a [`StateArena`].
///
/// `SIZE` is the encoded width in bytes; it fixes the cursor advance at
/// compile time. `Default` is what a slot reads as if it does not belong to
/// this arena.
pub trait ArenaValue: Copy + Default {
    /// Encoded width in bytes.
    const SIZE: usize;

    /// Encode into `bytes` (exactly `SIZE` long).
    fn store(self, bytes: &mut [u8]);

    /// Decode from `bytes` (exactly `SIZE` long).
    fn load(bytes: &[u8]) -> Self;
}

macro_rules! arena_value_le {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ArenaValue for $ty {
                const SIZE: usize = size_of::<$ty>();

                fn store(self, bytes: &mut [u8]) {
                    bytes.copy_from_slice(&self.to_le_bytes());
                }

                fn load(bytes: &[u8]) -> Self {
                    let mut raw = [0_u8; size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

arena_value_le!(u8, i8, u16, i16, u32, i32, u64, f32);

impl ArenaValue for bool {
    const SIZE: usize = 1;

    fn store(self, bytes: &mut [u8]) {
        u8::from(self).store(bytes);
    }

    fn load(bytes: &[u8]) -> Self {
        u8::load(bytes) != 0
    }
}

impl ArenaValue for Coord3D {
    const SIZE: usize = 3 * i32::SIZE;

    fn store(self, bytes: &mut [u8]) {
        let (x, rest) = bytes.split_at_mut(i32::SIZE);
        let (y, z) = rest.split_at_mut(i32::SIZE);
        self.x.store(x);
        self.y.store(y);
        self.z.store(z);
    }

    fn load(bytes: &[u8]) -> Self {
        let (x, rest) = bytes.split_at(i32::SIZE);
        let (y, z) = rest.split_at(i32::SIZE);
        Self::new(i32::load(x), i32::load(y), i32::load(z))
    }
}

/// Typed handle to one value at a fixed arena offset.
///
/// Slots carry no borrow; they are only meaningful for the arena (and the
/// initialization sequence) that produced them.
#[derive(Debug, PartialEq, Eq)]
pub struct Slot<T> {
    offset: usize,
    _value: PhantomData<T>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Slot<T> {}

impl<T> Slot<T> {
    pub(crate) const fn at(offset: usize) -> Self {
        Self {
            offset,
            _value: PhantomData,
        }
    }

    /// Byte offset of this slot.
    #[must_use]
    pub const fn offset(self) -> usize {
        self.offset
    }
}

/// Typed handle to a run of `len` values starting at a fixed arena offset.
#[derive(Debug, PartialEq, Eq)]
pub struct SlotArray<T> {
    offset: usize,
    len: usize,
    _value: PhantomData<T>,
}

impl<T> Clone for SlotArray<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SlotArray<T> {}

impl<T: ArenaValue> SlotArray<T> {
    /// Number of elements.
    #[must_use]
    pub const fn len(self) -> usize {
        self.len
    }

    /// True if the array holds no elements.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    /// Slot of element `index`, or `None` past the end.
    #[must_use]
    pub const fn slot(self, index: usize) -> Option<Slot<T>> {
        if index < self.len {
            Some(Slot::at(self.offset + index * T::SIZE))
        } else {
            None
        }
    }

    /// Iterate over the element slots.
    pub fn slots(self) -> impl Iterator<Item = Slot<T>> {
        (0..self.len).map(move |index| Slot::at(self.offset + index * T::SIZE))
    }
}

/// Fixed-capacity byte buffer plus a cursor.
#[derive(Clone, Debug)]
pub struct StateArena<const CAP: usize> {
    bytes: [u8; CAP],
    cursor: usize,
}

impl<const CAP: usize> Default for StateArena<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> StateArena<CAP> {
    /// Fixed capacity in bytes.
    pub const CAPACITY: usize = CAP;

    /// An empty, zeroed arena.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [0; CAP],
            cursor: 0,
        }
    }

    /// Zero the buffer, rewind, and start declaring state.
    ///
    /// Call on first use and whenever the owning effect or projection is
    /// (re)selected.
    pub fn initialize(&mut self) -> ArenaWriter<'_, CAP> {
        self.bytes.fill(0);
        self.cursor = 0;
        ArenaWriter {
            arena: self,
            keep_values: false,
        }
    }

    /// Rewind and declare again over the values already stored.
    ///
    /// The declaration sequence must have the same layout as the one that
    /// initialized the arena. Initial values passed to the writer are
    /// ignored.
    pub fn redeclare(&mut self) -> ArenaWriter<'_, CAP> {
        self.cursor = 0;
        ArenaWriter {
            arena: self,
            keep_values: true,
        }
    }

    /// Rewind and start replaying the declared sequence.
    pub fn replay(&mut self) -> ArenaReader<'_, CAP> {
        self.cursor = 0;
        ArenaReader { arena: self }
    }

    /// Bytes consumed by the most recent initialize or replay pass.
    #[must_use]
    pub const fn used(&self) -> usize {
        self.cursor
    }

    /// Read the value in `slot`.
    #[must_use]
    pub fn get<T: ArenaValue>(&self, slot: Slot<T>) -> T {
        self.bytes
            .get(slot.offset..slot.offset + T::SIZE)
            .map_or_else(T::default, T::load)
    }

    /// Overwrite the value in `slot`.
    pub fn set<T: ArenaValue>(&mut self, slot: Slot<T>, value: T) {
        if let Some(bytes) = self.bytes.get_mut(slot.offset..slot.offset + T::SIZE) {
            value.store(bytes);
        }
    }

    fn reserve(&mut self, requested: usize) -> Result<usize> {
        let offset = self.cursor;
        let end = offset
            .checked_add(requested)
            .filter(|end| *end <= CAP)
            .ok_or(Error::ArenaOverflow {
                offset,
                requested,
                capacity: CAP,
            })?;
        self.cursor = end;
        Ok(offset)
    }
}

/// Declares state during initialization.
pub struct ArenaWriter<'a, const CAP: usize> {
    arena: &'a mut StateArena<CAP>,
    keep_values: bool,
}

impl<const CAP: usize> ArenaWriter<'_, CAP> {
    /// Reserve the next `T::SIZE` bytes and store `initial` there (unless redeclaring).
    ///
    /// # Errors
    ///
    /// [`Error::ArenaOverflow`] if the arena has no room left.
    pub fn write<T: ArenaValue>(&mut self, initial: T) -> Result<Slot<T>> {
        let slot = Slot::at(self.arena.reserve(T::SIZE)?);
        if !self.keep_values {
            self.arena.set(slot, initial);
        }
        Ok(slot)
    }

    /// Reserve `count` consecutive values, each set to `initial`.
    ///
    /// # Errors
    ///
    /// [`Error::ArenaOverflow`] if the arena has no room left.
    pub fn write_array<T: ArenaValue>(&mut self, count: usize, initial: T) -> Result<SlotArray<T>> {
        let requested = count.checked_mul(T::SIZE).ok_or(Error::ArenaOverflow {
            offset: self.arena.cursor,
            requested: usize::MAX,
            capacity: CAP,
        })?;
        let offset = self.arena.reserve(requested)?;
        let array = SlotArray {
            offset,
            len: count,
            _value: PhantomData,
        };
        if !self.keep_values {
            for slot in array.slots() {
                self.arena.set(slot, initial);
            }
        }
        Ok(array)
    }

    /// Read back a slot declared earlier in this pass.
    #[must_use]
    pub fn get<T: ArenaValue>(&self, slot: Slot<T>) -> T {
        self.arena.get(slot)
    }

    /// Overwrite a slot declared earlier in this pass.
    pub fn set<T: ArenaValue>(&mut self, slot: Slot<T>, value: T) {
        self.arena.set(slot, value);
    }

    /// Bytes declared so far.
    #[must_use]
    pub const fn used(&self) -> usize {
        self.arena.cursor
    }
}

/// Walks the declared sequence during per-frame logic.
pub struct ArenaReader<'a, const CAP: usize> {
    arena: &'a mut StateArena<CAP>,
}

impl<const CAP: usize> ArenaReader<'_, CAP> {
    /// Take the next value by copy.
    ///
    /// # Errors
    ///
    /// [`Error::ArenaOverflow`] if the replay runs past capacity.
    pub fn read<T: ArenaValue>(&mut self) -> Result<T> {
        let slot = self.read_write::<T>()?;
        Ok(self.arena.get(slot))
    }

    /// Take a handle to the next value so it can be updated in place.
    ///
    /// # Errors
    ///
    /// [`Error::ArenaOverflow`] if the replay runs past capacity.
    pub fn read_write<T: ArenaValue>(&mut self) -> Result<Slot<T>> {
        Ok(Slot::at(self.arena.reserve(T::SIZE)?))
    }

    /// Take a handle to the next `count` values.
    ///
    /// # Errors
    ///
    /// [`Error::ArenaOverflow`] if the replay runs past capacity.
    pub fn read_write_array<T: ArenaValue>(&mut self, count: usize) -> Result<SlotArray<T>> {
        let requested = count.checked_mul(T::SIZE).ok_or(Error::ArenaOverflow {
            offset: self.arena.cursor,
            requested: usize::MAX,
            capacity: CAP,
        })?;
        Ok(SlotArray {
            offset: self.arena.reserve(requested)?,
            len: count,
            _value: PhantomData,
        })
    }

    /// Current value behind `slot`.
    #[must_use]
    pub fn get<T: ArenaValue>(&self, slot: Slot<T>) -> T {
        self.arena.get(slot)
    }

    /// Persist `value` behind `slot` for the next frame.
    pub fn set<T: ArenaValue>(&mut self, slot: Slot<T>, value: T) {
        self.arena.set(slot, value);
    }

    /// Bytes replayed so far.
    #[must_use]
    pub const fn used(&self) -> usize {
        self.arena.cursor
    }
}

// model = "claude-opus-4-5"
// created = "2026-10-17"
// modified = "2026-10-17"
// driver = "Isaac Clayton"

//! A growable, sparse table of slots.
//!
//! Each occupied slot holds a value and an optional next pointer. The slot
//! id is the physical address and never changes while the slot is occupied;
//! the logical order lives in the next pointers, which the table never
//! interprets. Freed slots are reused by later inserts.
//!
//! Complexity:
//! - add_entry: O(n) scan for a free slot, amortized O(1) growth
//! - add_entry_at, remove_entry, add_to_*: O(1)

use crate::doc::SlotId;
use crate::error::Error;
use crate::error::Result;
use crate::number::Additive;

/// The contents of an occupied slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry<T> {
    pub value: T,
    pub next: Option<T>,
}

/// A growable table of optional entries, doubling when full.
#[derive(Clone, Debug)]
pub struct SlotTable<T> {
    slots: Vec<Option<Entry<T>>>,
}

impl<T> Default for SlotTable<T> {
    fn default() -> Self {
        return Self::with_capacity(0);
    }
}

impl<T> SlotTable<T> {
    /// Create a table with `capacity` empty slots.
    pub fn with_capacity(capacity: usize) -> SlotTable<T> {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        return SlotTable { slots };
    }

    /// Number of slots, occupied or not.
    #[inline]
    pub fn capacity(&self) -> usize {
        return self.slots.len();
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        return self.slots.iter().filter(|s| s.is_some()).count();
    }

    #[inline]
    pub fn is_occupied(&self, slot: SlotId) -> bool {
        return matches!(self.slots.get(slot), Some(Some(_)));
    }

    pub fn get(&self, slot: SlotId) -> Option<&Entry<T>> {
        return self.slots.get(slot).and_then(|s| s.as_ref());
    }

    /// The lowest empty slot, if any.
    pub fn first_free(&self) -> Option<SlotId> {
        return self.slots.iter().position(|s| s.is_none());
    }

    /// Double the capacity, filling the new region with empty slots.
    /// An empty table grows to a single slot. Returns the new capacity.
    pub fn grow(&mut self) -> usize {
        let capacity = (self.slots.len() * 2).max(1);
        self.slots.resize_with(capacity, || None);
        tracing::trace!(capacity, "slot table grew");
        return capacity;
    }

    /// Place an entry in the first free slot, growing if there is none.
    pub fn add_entry(&mut self, value: T, next: Option<T>) -> SlotId {
        let slot = match self.first_free() {
            Some(slot) => slot,
            None => {
                let old = self.slots.len();
                self.grow();
                old
            }
        };
        self.slots[slot] = Some(Entry { value, next });
        return slot;
    }

    /// Place an entry in a specific slot, which must exist and be empty.
    pub fn add_entry_at(&mut self, value: T, next: Option<T>, slot: SlotId) -> Result<()> {
        let capacity = self.slots.len();
        let cell = self.slots.get_mut(slot).ok_or(Error::IndexOutOfRange { slot, capacity })?;
        if cell.is_some() {
            return Err(Error::SlotAlreadyOccupied(slot));
        }
        *cell = Some(Entry { value, next });
        return Ok(());
    }

    /// Empty a slot, returning what it held. Emptying an empty slot is fine.
    pub fn remove_entry(&mut self, slot: SlotId) -> Result<Option<Entry<T>>> {
        let capacity = self.slots.len();
        let cell = self.slots.get_mut(slot).ok_or(Error::IndexOutOfRange { slot, capacity })?;
        return Ok(cell.take());
    }

    /// Read-only copy of every slot as `(value, next)` pairs.
    pub fn as_tuples(&self) -> Vec<Option<(T, Option<T>)>>
    where
        T: Clone,
    {
        return self
            .slots
            .iter()
            .map(|s| s.as_ref().map(|e| (e.value.clone(), e.next.clone())))
            .collect();
    }

    fn entry_mut(&mut self, slot: SlotId) -> Result<&mut Entry<T>> {
        let capacity = self.slots.len();
        return self
            .slots
            .get_mut(slot)
            .and_then(|s| s.as_mut())
            .ok_or(Error::IndexOutOfRange { slot, capacity });
    }
}

impl<T: Additive> SlotTable<T> {
    /// Add `delta` to the value of an occupied slot.
    pub fn add_to_entry_value(&mut self, delta: &T, slot: SlotId) -> Result<&T> {
        let entry = self.entry_mut(slot)?;
        entry.value = entry.value.add(delta)?;
        return Ok(&entry.value);
    }

    /// Add `delta` to the next pointer of an occupied slot. An unset
    /// pointer takes the delta as its first value.
    pub fn add_to_entry_next(&mut self, delta: &T, slot: SlotId) -> Result<&T>
    where
        T: Clone,
    {
        let entry = self.entry_mut(slot)?;
        let next = match &entry.next {
            Some(current) => current.add(delta)?,
            None => delta.clone(),
        };
        return Ok(entry.next.insert(next));
    }
}

// model = "claude-opus-4-5"
// created = "2026-10-17"
// modified = "2026-10-17"
// driver = "Isaac Clayton"

//! Encrypted document storage and the two ways of addressing it.
//!
//! A document is a list of encrypted values. How the list is laid out in
//! memory decides how stale operations are reconciled:
//!
//! - [`Layout::Slotted`] keeps every value in a fixed physical slot and
//!   threads the logical order through encrypted next pointers. Every
//!   repair is a ciphertext addition, so concurrent edits commute and no
//!   index is ever shifted. Structural operations whose links moved under
//!   them are dropped.
//! - [`Layout::Positional`] stores values in logical order, so the slot id
//!   is the position. Stale targets are shifted past concurrent inserts and
//!   removals, the way classic operational transform does it.

pub mod op;
pub mod positional;
pub mod slotted;
pub mod snapshot;
pub mod table;

use num_bigint_dig::BigInt;
use serde::Deserialize;
use serde::Serialize;

use crate::doc::op::Operation;
use crate::doc::positional::Positional;
use crate::doc::slotted::Slotted;
use crate::error::Result;
use crate::number::EncryptedNumber;

/// Physical address of a slot.
pub type SlotId = usize;

/// The plaintext of a next pointer that ends the chain.
pub const TERMINAL: i64 = -1;

/// One slot as seen from outside: `(value, next)` when occupied.
pub type SlotContents = Option<(EncryptedNumber, Option<EncryptedNumber>)>;

/// The plaintext a next pointer holds when it points at `slot`, or at
/// nothing.
pub fn link_value(slot: Option<SlotId>) -> BigInt {
    return match slot {
        Some(slot) => BigInt::from(slot as u64),
        None => BigInt::from(TERMINAL),
    };
}

/// How a document lays out its values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    Slotted,
    Positional,
}

/// A storage regime: how operations are reconciled, validated, and applied.
pub trait Addressing {
    /// Adjust `op` for the operations applied since it was authored, oldest
    /// first. May retarget the primary change or mark the operation ignored.
    fn reconcile(&self, op: &mut Operation, since: &[&Operation]) -> Result<()>;

    /// Verify that every change of `op` can be applied to the current state.
    fn check(&self, op: &Operation) -> Result<()>;

    /// Apply every change of a checked operation, in order.
    fn apply(&mut self, op: &Operation) -> Result<()>;

    /// Number of addressable slots.
    fn capacity(&self) -> usize;

    /// Make room for more entries. Returns the number of addressable slots
    /// afterwards.
    fn grow(&mut self) -> usize;

    fn tuples(&self) -> Vec<SlotContents>;
}

/// The storage of one document, selected by its [`Layout`].
#[derive(Clone, Debug)]
pub enum Storage {
    Slotted(Slotted),
    Positional(Positional),
}

impl Storage {
    pub fn new(layout: Layout, initial_slots: usize) -> Storage {
        return match layout {
            Layout::Slotted => Storage::Slotted(Slotted::with_capacity(initial_slots)),
            Layout::Positional => Storage::Positional(Positional::with_capacity(initial_slots)),
        };
    }

    pub fn layout(&self) -> Layout {
        return match self {
            Storage::Slotted(_) => Layout::Slotted,
            Storage::Positional(_) => Layout::Positional,
        };
    }

    fn inner(&self) -> &dyn Addressing {
        let inner: &dyn Addressing = match self {
            Storage::Slotted(s) => s,
            Storage::Positional(p) => p,
        };
        return inner;
    }

    fn inner_mut(&mut self) -> &mut dyn Addressing {
        let inner: &mut dyn Addressing = match self {
            Storage::Slotted(s) => s,
            Storage::Positional(p) => p,
        };
        return inner;
    }
}

impl Addressing for Storage {
    fn reconcile(&self, op: &mut Operation, since: &[&Operation]) -> Result<()> {
        return self.inner().reconcile(op, since);
    }

    fn check(&self, op: &Operation) -> Result<()> {
        return self.inner().check(op);
    }

    fn apply(&mut self, op: &Operation) -> Result<()> {
        return self.inner_mut().apply(op);
    }

    fn capacity(&self) -> usize {
        return self.inner().capacity();
    }

    fn grow(&mut self) -> usize {
        return self.inner_mut().grow();
    }

    fn tuples(&self) -> Vec<SlotContents> {
        return self.inner().tuples();
    }
}

// model = "claude-opus-4-5"
// created = "2026-10-17"
// modified = "2026-10-17"
// driver = "Isaac Clayton"

//! Operations that collaborators submit to a document.
//!
//! Every edit is one of three kinds, and each kind decomposes into one or
//! two atomic changes that are pure ciphertext deltas:
//!
//! | Kind   | Changes, in order                                        |
//! |--------|----------------------------------------------------------|
//! | Insert | `InsertEntry` + optional `AddToNext` on the predecessor  |
//! | Remove | `RemoveEntry` + optional `AddToNext` on the predecessor  |
//! | Edit   | exactly one `AddToValue`                                 |
//!
//! The predecessor change is absent only when the mutated slot is the head
//! of the document, since there is nothing to repoint.
//!
//! Operations can only be built through the constructors below, which
//! check the shape before returning. Once built, only the engine may touch
//! an operation again (to retarget it or mark it ignored while reconciling).

use smallvec::SmallVec;
use smallvec::smallvec;

use crate::doc::SlotId;
use crate::error::Error;
use crate::error::Result;
use crate::key::PublicKey;
use crate::number::EncryptedNumber;

/// The three families of edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    Insert,
    Remove,
    Edit,
}

/// Which field(s) of which slot an atomic change touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Occupy a slot with a value and an optional next pointer.
    InsertEntry,
    /// Empty a slot.
    RemoveEntry,
    /// Add a delta to a slot's value.
    AddToValue,
    /// Add a delta to a slot's next pointer.
    AddToNext,
}

/// One ciphertext-level change to one slot.
#[derive(Clone, Debug)]
pub struct AtomicChange {
    kind: ChangeKind,
    target: SlotId,
    value: Option<EncryptedNumber>,
    next: Option<EncryptedNumber>,
}

/// The slot whose next pointer has to be repointed, and by how much.
#[derive(Clone, Debug)]
pub struct Predecessor {
    pub slot: SlotId,
    pub next_delta: EncryptedNumber,
}

/// A structural edit in the shape a transport layer would carry.
#[derive(Clone, Debug)]
pub struct InsertOrRemove {
    pub primary: SlotId,
    pub is_insert: bool,
    pub value: Option<EncryptedNumber>,
    pub next: Option<EncryptedNumber>,
    pub predecessor: Option<SlotId>,
    pub predecessor_next_delta: Option<EncryptedNumber>,
    pub authored_at: u64,
}

/// A content edit in the shape a transport layer would carry.
#[derive(Clone, Debug)]
pub struct AdditiveEdit {
    pub target: SlotId,
    pub delta: EncryptedNumber,
    pub authored_at: u64,
}

/// A validated edit, authored against a known revision.
#[derive(Clone, Debug)]
pub struct Operation {
    kind: OpKind,
    authored_at: u64,
    changes: SmallVec<[AtomicChange; 2]>,
    ignore: bool,
}

impl AtomicChange {
    fn insert_entry(target: SlotId, value: EncryptedNumber, next: Option<EncryptedNumber>) -> AtomicChange {
        return AtomicChange { kind: ChangeKind::InsertEntry, target, value: Some(value), next };
    }

    fn remove_entry(target: SlotId) -> AtomicChange {
        return AtomicChange { kind: ChangeKind::RemoveEntry, target, value: None, next: None };
    }

    fn add_to_value(target: SlotId, delta: EncryptedNumber) -> AtomicChange {
        return AtomicChange { kind: ChangeKind::AddToValue, target, value: Some(delta), next: None };
    }

    fn add_to_next(target: SlotId, delta: EncryptedNumber) -> AtomicChange {
        return AtomicChange { kind: ChangeKind::AddToNext, target, value: None, next: Some(delta) };
    }

    pub fn kind(&self) -> ChangeKind {
        return self.kind;
    }

    pub fn target(&self) -> SlotId {
        return self.target;
    }

    /// The value (for inserts) or value delta (for additions).
    pub fn value(&self) -> Option<&EncryptedNumber> {
        return self.value.as_ref();
    }

    /// The next pointer (for inserts) or next-pointer delta.
    pub fn next(&self) -> Option<&EncryptedNumber> {
        return self.next.as_ref();
    }

    pub(crate) fn value_operand(&self) -> Result<&EncryptedNumber> {
        return self.value.as_ref().ok_or(Error::MalformedOperation("change carries no value"));
    }

    pub(crate) fn next_operand(&self) -> Result<&EncryptedNumber> {
        return self.next.as_ref().ok_or(Error::MalformedOperation("change carries no next pointer"));
    }

    pub(crate) fn retarget(&mut self, target: SlotId) {
        self.target = target;
    }

    fn numbers(&self) -> impl Iterator<Item = &EncryptedNumber> {
        return self.value.iter().chain(self.next.iter());
    }

    /// Each change kind carries exactly the operands it needs.
    fn check(&self) -> Result<()> {
        let ok = match self.kind {
            ChangeKind::InsertEntry => self.value.is_some(),
            ChangeKind::RemoveEntry => self.value.is_none() && self.next.is_none(),
            ChangeKind::AddToValue => self.value.is_some() && self.next.is_none(),
            ChangeKind::AddToNext => self.value.is_none() && self.next.is_some(),
        };
        if !ok {
            return Err(Error::MalformedOperation("change operands do not match its kind"));
        }
        return Ok(());
    }
}

impl Operation {
    /// Occupy `slot` with `value`. `next` is the encrypted id of the slot
    /// that follows (or the terminal sentinel); `predecessor` repoints the
    /// slot before it, and is None only for a new head.
    pub fn insert(
        slot: SlotId,
        value: EncryptedNumber,
        next: Option<EncryptedNumber>,
        predecessor: Option<Predecessor>,
        authored_at: u64,
    ) -> Result<Operation> {
        let mut changes: SmallVec<[AtomicChange; 2]> = smallvec![AtomicChange::insert_entry(slot, value, next)];
        if let Some(p) = predecessor {
            changes.push(AtomicChange::add_to_next(p.slot, p.next_delta));
        }
        return Operation::new(OpKind::Insert, changes, authored_at);
    }

    /// Empty `slot`, repointing `predecessor` past it unless it is the head.
    pub fn remove(slot: SlotId, predecessor: Option<Predecessor>, authored_at: u64) -> Result<Operation> {
        let mut changes: SmallVec<[AtomicChange; 2]> = smallvec![AtomicChange::remove_entry(slot)];
        if let Some(p) = predecessor {
            changes.push(AtomicChange::add_to_next(p.slot, p.next_delta));
        }
        return Operation::new(OpKind::Remove, changes, authored_at);
    }

    /// Add `delta` to the value held in `slot`.
    pub fn addition(slot: SlotId, delta: EncryptedNumber, authored_at: u64) -> Result<Operation> {
        let changes: SmallVec<[AtomicChange; 2]> = smallvec![AtomicChange::add_to_value(slot, delta)];
        return Operation::new(OpKind::Edit, changes, authored_at);
    }

    /// Build from the transport shape of a structural edit.
    pub fn insert_or_remove(request: InsertOrRemove) -> Result<Operation> {
        let predecessor = match (request.predecessor, request.predecessor_next_delta) {
            (Some(slot), Some(next_delta)) => Some(Predecessor { slot, next_delta }),
            (None, None) => None,
            _ => return Err(Error::MalformedOperation("predecessor slot and delta must come together")),
        };

        if request.is_insert {
            let value = request.value.ok_or(Error::MalformedOperation("insert carries no value"))?;
            return Operation::insert(request.primary, value, request.next, predecessor, request.authored_at);
        }

        if request.value.is_some() || request.next.is_some() {
            return Err(Error::MalformedOperation("remove carries a value"));
        }
        return Operation::remove(request.primary, predecessor, request.authored_at);
    }

    /// Build from the transport shape of a content edit.
    pub fn additive_edit(request: AdditiveEdit) -> Result<Operation> {
        return Operation::addition(request.target, request.delta, request.authored_at);
    }

    fn new(kind: OpKind, changes: SmallVec<[AtomicChange; 2]>, authored_at: u64) -> Result<Operation> {
        let (first, max) = match kind {
            OpKind::Insert => (ChangeKind::InsertEntry, 2),
            OpKind::Remove => (ChangeKind::RemoveEntry, 2),
            OpKind::Edit => (ChangeKind::AddToValue, 1),
        };

        if changes.is_empty() || changes.len() > max {
            return Err(Error::MalformedOperation("wrong number of changes for operation"));
        }
        if changes[0].kind != first {
            return Err(Error::MalformedOperation("first change does not match operation kind"));
        }
        if let Some(second) = changes.get(1) {
            if second.kind != ChangeKind::AddToNext {
                return Err(Error::MalformedOperation("second change must repoint the predecessor"));
            }
            if second.target == changes[0].target {
                return Err(Error::MalformedOperation("predecessor is the mutated slot"));
            }
        }
        for change in &changes {
            change.check()?;
        }

        {
            let mut keys = changes.iter().flat_map(|c| c.numbers()).map(|n| n.public_key());
            if let Some(key) = keys.next() {
                if keys.any(|other| other != key) {
                    return Err(Error::DifferentPublicKeys);
                }
            }
        }

        return Ok(Operation {
            kind,
            authored_at,
            changes,
            ignore: false,
        });
    }

    pub fn kind(&self) -> OpKind {
        return self.kind;
    }

    /// The revision the author last observed.
    pub fn authored_at(&self) -> u64 {
        return self.authored_at;
    }

    pub fn changes(&self) -> &[AtomicChange] {
        return &self.changes;
    }

    /// The change on the slot being inserted, removed, or edited.
    pub fn primary(&self) -> &AtomicChange {
        return &self.changes[0];
    }

    /// The change repointing the predecessor, if any.
    pub fn predecessor(&self) -> Option<&AtomicChange> {
        return self.changes.get(1);
    }

    /// The key every ciphertext in this operation was produced under.
    /// None for a head removal, which carries no ciphertext at all.
    pub fn public_key(&self) -> Option<&PublicKey> {
        return self.changes.iter().flat_map(|c| c.numbers()).map(|n| n.public_key()).next();
    }

    pub fn is_ignored(&self) -> bool {
        return self.ignore;
    }

    pub(crate) fn mark_ignored(&mut self) {
        self.ignore = true;
    }

    pub(crate) fn primary_mut(&mut self) -> &mut AtomicChange {
        return &mut self.changes[0];
    }
}

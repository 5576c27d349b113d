// model = "claude-opus-4-5"
// created = "2026-10-17"
// modified = "2026-10-17"
// driver = "Isaac Clayton"

//! Slot-addressed storage with an encrypted forward chain.
//!
//! Reconciliation never shifts an index. An insert racing for a slot
//! someone else took fails when checked. Everything else that went stale
//! is dropped, and the author resubmits against a fresh snapshot:
//!
//! - an edit or removal whose target has been removed since the author
//!   last looked;
//! - an insert or removal whose predecessor had its next pointer moved,
//!   or was removed or refilled, since then. Its pointer delta was
//!   computed against a link that no longer holds;
//! - a removal whose target had its next pointer moved since then;
//! - a head insert or head removal racing another change of the head.

use crate::doc::Addressing;
use crate::doc::SlotContents;
use crate::doc::SlotId;
use crate::doc::op::ChangeKind;
use crate::doc::op::OpKind;
use crate::doc::op::Operation;
use crate::doc::table::SlotTable;
use crate::error::Error;
use crate::error::Result;
use crate::number::EncryptedNumber;

#[derive(Clone, Debug, Default)]
pub struct Slotted {
    table: SlotTable<EncryptedNumber>,
}

impl Slotted {
    pub fn with_capacity(capacity: usize) -> Slotted {
        return Slotted { table: SlotTable::with_capacity(capacity) };
    }

    pub fn table(&self) -> &SlotTable<EncryptedNumber> {
        return &self.table;
    }

    fn vanished(&self, slot: SlotId, since: &[&Operation]) -> bool {
        let empty = slot < self.table.capacity() && !self.table.is_occupied(slot);
        return empty
            || since
                .iter()
                .any(|h| h.kind() == OpKind::Remove && h.primary().target() == slot);
    }

    /// Whether an operation in `since` moved the next pointer of `slot`, or
    /// removed or refilled it.
    fn relinked(slot: SlotId, since: &[&Operation]) -> bool {
        return since.iter().any(|h| {
            return h
                .changes()
                .iter()
                .any(|c| c.target() == slot && c.kind() != ChangeKind::AddToValue);
        });
    }

    /// Whether the links a structural operation was computed against have
    /// moved under it.
    fn stale_links(op: &Operation, since: &[&Operation]) -> bool {
        let target = op.primary().target();
        if op.kind() == OpKind::Remove && Slotted::relinked(target, since) {
            return true;
        }
        return match op.predecessor() {
            Some(predecessor) => Slotted::relinked(predecessor.target(), since),
            None => since.iter().any(|h| h.kind() != OpKind::Edit && h.predecessor().is_none()),
        };
    }
}

impl Addressing for Slotted {
    fn reconcile(&self, op: &mut Operation, since: &[&Operation]) -> Result<()> {
        let target = op.primary().target();
        let ignored = match op.kind() {
            // A taken slot is reported by `check`, not dropped.
            OpKind::Insert => !self.table.is_occupied(target) && Slotted::stale_links(op, since),
            OpKind::Remove => self.vanished(target, since) || Slotted::stale_links(op, since),
            OpKind::Edit => self.vanished(target, since),
        };
        if ignored {
            op.mark_ignored();
        }
        return Ok(());
    }

    fn check(&self, op: &Operation) -> Result<()> {
        let capacity = self.table.capacity();
        for change in op.changes() {
            let slot = change.target();
            match change.kind() {
                ChangeKind::InsertEntry => {
                    if slot >= capacity {
                        return Err(Error::IndexOutOfRange { slot, capacity });
                    }
                    if self.table.is_occupied(slot) {
                        return Err(Error::SlotAlreadyOccupied(slot));
                    }
                }
                ChangeKind::RemoveEntry => {
                    if slot >= capacity {
                        return Err(Error::IndexOutOfRange { slot, capacity });
                    }
                }
                ChangeKind::AddToValue | ChangeKind::AddToNext => {
                    if !self.table.is_occupied(slot) {
                        return Err(Error::IndexOutOfRange { slot, capacity });
                    }
                }
            }
        }
        return Ok(());
    }

    fn apply(&mut self, op: &Operation) -> Result<()> {
        for change in op.changes() {
            let slot = change.target();
            match change.kind() {
                ChangeKind::InsertEntry => {
                    let value = change.value_operand()?.clone();
                    self.table.add_entry_at(value, change.next().cloned(), slot)?;
                }
                ChangeKind::RemoveEntry => {
                    self.table.remove_entry(slot)?;
                }
                ChangeKind::AddToValue => {
                    self.table.add_to_entry_value(change.value_operand()?, slot)?;
                }
                ChangeKind::AddToNext => {
                    self.table.add_to_entry_next(change.next_operand()?, slot)?;
                }
            }
        }
        return Ok(());
    }

    fn capacity(&self) -> usize {
        return self.table.capacity();
    }

    fn grow(&mut self) -> usize {
        return self.table.grow();
    }

    fn tuples(&self) -> Vec<SlotContents> {
        return self.table.as_tuples();
    }
}

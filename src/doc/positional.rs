// model = "claude-opus-4-5"
// created = "2026-10-17"
// modified = "2026-10-17"
// driver = "Isaac Clayton"

//! Position-addressed storage: slot id equals logical position.
//!
//! Entries carry no next pointers. A stale operation's target is walked
//! forward through the history applied since its author's revision:
//!
//! - an insert at or before the target shifts it right by one
//! - a removal strictly before the target shifts it left by one
//! - a removal of the target itself drops an incoming edit or removal
//! - an edit of the target drops an incoming edit (drop and resubmit)

use crate::doc::Addressing;
use crate::doc::SlotContents;
use crate::doc::op::ChangeKind;
use crate::doc::op::OpKind;
use crate::doc::op::Operation;
use crate::error::Error;
use crate::error::Result;
use crate::number::EncryptedNumber;

#[derive(Clone, Debug, Default)]
pub struct Positional {
    entries: Vec<EncryptedNumber>,
}

impl Positional {
    pub fn with_capacity(capacity: usize) -> Positional {
        return Positional { entries: Vec::with_capacity(capacity) };
    }

    pub fn len(&self) -> usize {
        return self.entries.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }

    pub fn get(&self, position: usize) -> Option<&EncryptedNumber> {
        return self.entries.get(position);
    }

    /// Positional operations address one entry and never carry pointers.
    fn check_shape(op: &Operation) -> Result<()> {
        if op.predecessor().is_some() {
            return Err(Error::MalformedOperation("positional layout has no predecessor pointers"));
        }
        if op.primary().next().is_some() {
            return Err(Error::MalformedOperation("positional layout has no next pointers"));
        }
        return Ok(());
    }
}

impl Addressing for Positional {
    fn reconcile(&self, op: &mut Operation, since: &[&Operation]) -> Result<()> {
        Positional::check_shape(op)?;

        let kind = op.kind();
        let mut target = op.primary().target();
        for applied in since {
            let at = applied.primary().target();
            match applied.kind() {
                OpKind::Insert => {
                    if at <= target {
                        target += 1;
                    }
                }
                OpKind::Remove => {
                    if at < target {
                        target -= 1;
                    } else if at == target && kind != OpKind::Insert {
                        op.mark_ignored();
                        return Ok(());
                    }
                }
                OpKind::Edit => {
                    if at == target && kind == OpKind::Edit {
                        op.mark_ignored();
                        return Ok(());
                    }
                }
            }
        }

        op.primary_mut().retarget(target);
        return Ok(());
    }

    fn check(&self, op: &Operation) -> Result<()> {
        Positional::check_shape(op)?;

        let slot = op.primary().target();
        let len = self.entries.len();
        match op.primary().kind() {
            ChangeKind::InsertEntry => {
                if slot > len {
                    return Err(Error::IndexOutOfRange { slot, capacity: len });
                }
            }
            ChangeKind::RemoveEntry | ChangeKind::AddToValue => {
                if len == 0 {
                    return Err(Error::EmptyStructure);
                }
                if slot >= len {
                    return Err(Error::IndexOutOfRange { slot, capacity: len });
                }
            }
            ChangeKind::AddToNext => {
                return Err(Error::MalformedOperation("positional layout has no next pointers"));
            }
        }
        return Ok(());
    }

    fn apply(&mut self, op: &Operation) -> Result<()> {
        let change = op.primary();
        let slot = change.target();
        let capacity = self.entries.len();
        match change.kind() {
            ChangeKind::InsertEntry => {
                self.entries.insert(slot, change.value_operand()?.clone());
            }
            ChangeKind::RemoveEntry => {
                self.entries.remove(slot);
            }
            ChangeKind::AddToValue => {
                let entry = self.entries.get_mut(slot).ok_or(Error::IndexOutOfRange { slot, capacity })?;
                *entry = entry.add(change.value_operand()?)?;
            }
            ChangeKind::AddToNext => {
                return Err(Error::MalformedOperation("positional layout has no next pointers"));
            }
        }
        return Ok(());
    }

    fn capacity(&self) -> usize {
        return self.entries.len();
    }

    /// Reserves room only; the addressable range is always the list length.
    fn grow(&mut self) -> usize {
        let additional = self.entries.capacity().max(1);
        self.entries.reserve(additional);
        tracing::trace!(reserved = self.entries.capacity(), "positional storage grew");
        return self.entries.len();
    }

    fn tuples(&self) -> Vec<SlotContents> {
        return self.entries.iter().map(|v| Some((v.clone(), None))).collect();
    }
}

// model = "claude-opus-4-5"
// created = "2026-10-17"
// modified = "2026-10-17"
// driver = "Isaac Clayton"

//! Collaborator-side helper for building operations.
//!
//! An editor holds only the public key, so it never learns what the
//! document says. The caller supplies the logical picture (which slot
//! follows which), and the editor turns it into encrypted values and
//! pointer deltas stamped with the last revision it observed.
//!
//! Pointer arithmetic, with `link(None) = -1`:
//!
//! - inserting `s` after `p`: `p.next += s - link(p.old_next)`
//! - removing `s` after `p`: `p.next += link(s.next) - s`

use num_bigint_dig::BigInt;
use num_bigint_dig::BigUint;
use num_bigint_dig::Sign;

use crate::doc::SlotId;
use crate::doc::link_value;
use crate::doc::op::Operation;
use crate::doc::op::Predecessor;
use crate::document::Outcome;
use crate::error::Result;
use crate::key::PublicKey;
use crate::number::EncryptedNumber;

/// A slot together with the slot that currently follows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighbor {
    pub slot: SlotId,
    pub next: Option<SlotId>,
}

#[derive(Clone, Debug)]
pub struct Editor {
    public_key: PublicKey,
    revision: u64,
}

impl Editor {
    pub fn new(public_key: PublicKey, revision: u64) -> Editor {
        return Editor { public_key, revision };
    }

    pub fn public_key(&self) -> &PublicKey {
        return &self.public_key;
    }

    /// The revision new operations are authored at.
    pub fn revision(&self) -> u64 {
        return self.revision;
    }

    /// Catch up to a revision observed some other way, e.g. a snapshot.
    pub fn sync(&mut self, revision: u64) {
        self.revision = self.revision.max(revision);
    }

    /// Advance past an operation this editor submitted.
    pub fn observe(&mut self, outcome: &Outcome) {
        if let Outcome::Applied { revision } = outcome {
            self.sync(*revision);
        }
    }

    /// Insert `value` at `slot` as the new head, in front of `old_head`.
    pub fn insert_head(&self, slot: SlotId, value: &BigUint, old_head: Option<SlotId>) -> Result<Operation> {
        let next = self.link(old_head)?;
        return Operation::insert(slot, self.public_key.encrypt(value), Some(next), None, self.revision);
    }

    /// Insert `value` at `slot`, right after `predecessor`.
    pub fn insert_after(&self, slot: SlotId, value: &BigUint, predecessor: Neighbor) -> Result<Operation> {
        let next = self.link(predecessor.next)?;
        let delta = link_value(Some(slot)) - link_value(predecessor.next);
        let predecessor = Predecessor {
            slot: predecessor.slot,
            next_delta: self.public_key.encrypt_signed(&delta)?,
        };
        return Operation::insert(slot, self.public_key.encrypt(value), Some(next), Some(predecessor), self.revision);
    }

    /// Remove `target`, repointing `predecessor` past it. Removing the head
    /// takes no predecessor; `target.next` becomes the new head.
    pub fn remove(&self, target: Neighbor, predecessor: Option<SlotId>) -> Result<Operation> {
        let predecessor = match predecessor {
            Some(slot) => {
                let delta = link_value(target.next) - link_value(Some(target.slot));
                Some(Predecessor { slot, next_delta: self.public_key.encrypt_signed(&delta)? })
            }
            None => None,
        };
        return Operation::remove(target.slot, predecessor, self.revision);
    }

    /// Insert at a logical position of a positional document.
    pub fn insert_at(&self, position: usize, value: &BigUint) -> Result<Operation> {
        return Operation::insert(position, self.public_key.encrypt(value), None, None, self.revision);
    }

    /// Remove the entry at a logical position of a positional document.
    pub fn remove_at(&self, position: usize) -> Result<Operation> {
        return Operation::remove(position, None, self.revision);
    }

    /// Turn the value in `slot` from `old` into `new`.
    pub fn replace(&self, slot: SlotId, old: &BigUint, new: &BigUint) -> Result<Operation> {
        let delta = BigInt::from_biguint(Sign::Plus, new.clone()) - BigInt::from_biguint(Sign::Plus, old.clone());
        return self.add(slot, &delta);
    }

    /// Add a signed delta to the value in `slot`.
    pub fn add(&self, slot: SlotId, delta: &BigInt) -> Result<Operation> {
        return Operation::addition(slot, self.public_key.encrypt_signed(delta)?, self.revision);
    }

    fn link(&self, slot: Option<SlotId>) -> Result<EncryptedNumber> {
        return self.public_key.encrypt_signed(&link_value(slot));
    }
}

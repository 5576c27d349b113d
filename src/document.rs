// model = "claude-opus-4-5"
// created = "2026-10-17"
// modified = "2026-10-17"
// driver = "Isaac Clayton"

//! The revision controller: one document's storage and history behind a
//! single lock.
//!
//! Writers are serialized. Each incoming operation is reconciled against
//! what was applied since its author's revision, checked in full against
//! the current storage, and only then applied, so an operation either lands
//! entirely or leaves no trace.
//!
//! ```text
//! authored_at ─► reconcile ─► ignored? ──yes──► Outcome::Ignored
//!                                 │
//!                                 no
//!                                 ▼
//!                    check all ─► apply all ─► revision += 1, archive
//! ```

use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

use crate::config::DocumentConfig;
use crate::doc::Addressing;
use crate::doc::Layout;
use crate::doc::Storage;
use crate::doc::op::Operation;
use crate::doc::snapshot::Snapshot;
use crate::error::Error;
use crate::error::Result;
use crate::key::KeyPair;
use crate::key::PublicKey;
use crate::log::History;

/// What happened to a submitted operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Applied; the document is now at `revision`.
    Applied { revision: u64 },
    /// Dropped during reconciliation; nothing changed.
    Ignored,
}

#[derive(Debug)]
struct State {
    revision: u64,
    storage: Storage,
    history: History,
}

/// A shared encrypted document. Share across threads with `Arc`.
#[derive(Debug)]
pub struct Document {
    public_key: PublicKey,
    state: RwLock<State>,
}

impl Document {
    pub fn new(public_key: PublicKey, config: &DocumentConfig) -> Document {
        return Document {
            public_key,
            state: RwLock::new(State {
                revision: 0,
                storage: Storage::new(config.layout, config.initial_slots),
                history: History::new(),
            }),
        };
    }

    /// Generate a keypair of `config.key_bits` and a document under it.
    pub fn create(config: &DocumentConfig) -> Result<(Document, KeyPair)> {
        let pair = KeyPair::generate(config.key_bits)?;
        let document = Document::new(pair.public_key.clone(), config);
        return Ok((document, pair));
    }

    pub fn public_key(&self) -> &PublicKey {
        return &self.public_key;
    }

    pub fn layout(&self) -> Layout {
        return self.read().storage.layout();
    }

    pub fn revision(&self) -> u64 {
        return self.read().revision;
    }

    /// A consistent copy of every slot, taken under the read lock.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.read();
        return Snapshot {
            layout: state.storage.layout(),
            revision: state.revision,
            slots: state.storage.tuples(),
        };
    }

    /// Every accepted operation as its author sent it, newest first.
    pub fn history(&self) -> Vec<Operation> {
        return self.read().history.iter().map(|r| r.original.clone()).collect();
    }

    /// Make room for more entries without creating a revision.
    pub fn grow(&self) -> usize {
        return self.write().storage.grow();
    }

    /// Reconcile, check, and apply one operation.
    pub fn handle_operation(&self, op: Operation) -> Result<Outcome> {
        let mut guard = self.write();
        let state = &mut *guard;

        if op.authored_at() > state.revision {
            return Err(Error::FutureRevision {
                authored: op.authored_at(),
                current: state.revision,
            });
        }
        if let Some(key) = op.public_key() {
            if key != &self.public_key {
                return Err(Error::DifferentPublicKeys);
            }
        }

        let mut applied = op.clone();
        let since: Vec<&Operation> = state
            .history
            .since(op.authored_at())
            .iter()
            .map(|r| &r.applied)
            .collect();
        state.storage.reconcile(&mut applied, &since)?;

        if applied.is_ignored() {
            tracing::debug!(
                kind = ?op.kind(),
                target = op.primary().target(),
                authored_at = op.authored_at(),
                revision = state.revision,
                "ignored stale operation"
            );
            return Ok(Outcome::Ignored);
        }

        state.storage.check(&applied)?;
        state.storage.apply(&applied)?;

        state.revision += 1;
        tracing::debug!(
            kind = ?applied.kind(),
            target = applied.primary().target(),
            authored_at = op.authored_at(),
            revision = state.revision,
            "applied operation"
        );
        state.history.push(op, applied);
        return Ok(Outcome::Applied { revision: state.revision });
    }

    // State only changes after a full check, so a poisoned lock still
    // guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, State> {
        return self.state.read().unwrap_or_else(PoisonError::into_inner);
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        return self.state.write().unwrap_or_else(PoisonError::into_inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::link_value;
    use crate::doc::op::Predecessor;
    use crate::number::EncryptedNumber;
    use num_bigint_dig::BigInt;
    use num_bigint_dig::BigUint;

    fn pair() -> KeyPair {
        return KeyPair::from_primes(BigUint::from(1_000_003u64), BigUint::from(1_000_033u64)).unwrap();
    }

    fn enc(pair: &KeyPair, value: i64) -> EncryptedNumber {
        return pair.public_key.encrypt_signed(&BigInt::from(value)).unwrap();
    }

    fn config(initial_slots: usize, layout: Layout) -> DocumentConfig {
        return DocumentConfig { initial_slots, key_bits: 64, layout };
    }

    #[test]
    fn new_document_is_empty() {
        let pair = pair();
        let doc = Document::new(pair.public_key.clone(), &config(4, Layout::Slotted));
        assert_eq!(doc.revision(), 0);
        assert!(doc.history().is_empty());
        assert_eq!(doc.snapshot().capacity(), 4);
        assert_eq!(doc.layout(), Layout::Slotted);
    }

    #[test]
    fn layout_follows_storage() {
        let pair = pair();
        let doc = Document::new(pair.public_key.clone(), &config(0, Layout::Positional));
        assert_eq!(doc.layout(), Layout::Positional);
        assert_eq!(doc.snapshot().layout, Layout::Positional);
    }

    #[test]
    fn accepted_operations_advance_revision() {
        let pair = pair();
        let doc = Document::new(pair.public_key.clone(), &config(4, Layout::Slotted));
        let head = Operation::insert(0, enc(&pair, 1), Some(enc(&pair, -1)), None, 0).unwrap();
        assert_eq!(doc.handle_operation(head).unwrap(), Outcome::Applied { revision: 1 });

        let next_delta = pair.public_key.encrypt_signed(&(BigInt::from(2) - link_value(None))).unwrap();
        let tail = Operation::insert(2, enc(&pair, 2), Some(enc(&pair, -1)), Some(Predecessor { slot: 0, next_delta }), 1)
            .unwrap();
        assert_eq!(doc.handle_operation(tail).unwrap(), Outcome::Applied { revision: 2 });
        assert_eq!(doc.history().len(), 2);

        let values = doc.snapshot().read(&pair.private_key, Some(0)).unwrap();
        assert_eq!(values, vec![BigUint::from(1u32), BigUint::from(2u32)]);
    }

    #[test]
    fn future_revision_is_rejected() {
        let pair = pair();
        let doc = Document::new(pair.public_key.clone(), &config(4, Layout::Slotted));
        let op = Operation::insert(0, enc(&pair, 1), None, None, 3).unwrap();
        assert!(matches!(
            doc.handle_operation(op),
            Err(Error::FutureRevision { authored: 3, current: 0 })
        ));
    }

    #[test]
    fn foreign_key_is_rejected() {
        let alice = pair();
        let bob = KeyPair::from_primes(BigUint::from(1_000_037u64), BigUint::from(1_000_039u64)).unwrap();
        let doc = Document::new(alice.public_key.clone(), &config(4, Layout::Slotted));
        let op = Operation::insert(0, enc(&bob, 1), None, None, 0).unwrap();
        assert!(matches!(doc.handle_operation(op), Err(Error::DifferentPublicKeys)));
        assert_eq!(doc.revision(), 0);
    }

    #[test]
    fn history_keeps_originals() {
        let pair = pair();
        let doc = Document::new(pair.public_key.clone(), &config(0, Layout::Positional));
        doc.handle_operation(Operation::insert(0, enc(&pair, 1), None, None, 0).unwrap()).unwrap();
        doc.handle_operation(Operation::insert(0, enc(&pair, 2), None, None, 1).unwrap()).unwrap();
        // Authored before the second insert, so it is shifted from 0 to 1.
        doc.handle_operation(Operation::addition(0, enc(&pair, 5), 1).unwrap()).unwrap();

        let history = doc.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].primary().target(), 0);
        let values = doc.snapshot().read(&pair.private_key, None).unwrap();
        assert_eq!(values, vec![BigUint::from(2u32), BigUint::from(6u32)]);
    }

    #[test]
    fn grow_is_not_a_revision() {
        let pair = pair();
        let doc = Document::new(pair.public_key.clone(), &config(3, Layout::Slotted));
        assert_eq!(doc.grow(), 6);
        assert_eq!(doc.revision(), 0);
        assert_eq!(doc.snapshot().capacity(), 6);
    }

    #[test]
    fn create_generates_matching_keys() {
        let (doc, pair) = Document::create(&config(2, Layout::Slotted)).unwrap();
        assert_eq!(doc.public_key(), &pair.public_key);
        assert_eq!(pair.public_key.bits(), 64);
    }
}

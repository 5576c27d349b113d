// model = "claude-opus-4-5"
// created = "2026-10-17"
// modified = "2026-10-17"
// driver = "Isaac Clayton"

//! Read-only copies of a document's storage, and turning them back into
//! plaintext for whoever holds the private key.

use num_bigint_dig::BigInt;
use num_bigint_dig::BigUint;
use num_traits::ToPrimitive;
use rustc_hash::FxHashSet;

use crate::doc::Layout;
use crate::doc::SlotContents;
use crate::doc::SlotId;
use crate::doc::TERMINAL;
use crate::error::Error;
use crate::error::Result;
use crate::key::PrivateKey;
use crate::number::EncryptedNumber;

/// Every slot of a document as of one revision.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub layout: Layout,
    pub revision: u64,
    pub slots: Vec<SlotContents>,
}

/// A decrypted slot: the value and, if set, the signed next pointer.
pub type PlainSlot = Option<(BigUint, Option<BigInt>)>;

impl Snapshot {
    pub fn capacity(&self) -> usize {
        return self.slots.len();
    }

    /// The `(value, next)` pair of an occupied slot.
    pub fn get(&self, slot: SlotId) -> Option<&(EncryptedNumber, Option<EncryptedNumber>)> {
        return self.slots.get(slot).and_then(|s| s.as_ref());
    }

    /// Decrypt every slot in physical order.
    pub fn decrypt_slots(&self, private_key: &PrivateKey) -> Result<Vec<PlainSlot>> {
        let mut plain = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let decrypted = match slot {
                Some((value, next)) => {
                    let next = match next {
                        Some(next) => Some(private_key.decrypt_signed(next)?),
                        None => None,
                    };
                    Some((private_key.decrypt(value)?, next))
                }
                None => None,
            };
            plain.push(decrypted);
        }
        return Ok(plain);
    }

    /// Slot ids in document order.
    ///
    /// For a slotted document this follows the next pointers from `head`
    /// until the terminal sentinel or an unset pointer. A cycle, or a
    /// pointer to an empty or missing slot, is a [`Error::BrokenChain`]
    /// naming the slot where the walk failed. A positional document is
    /// already in order, so `head` is not consulted.
    pub fn chain(&self, private_key: &PrivateKey, head: Option<SlotId>) -> Result<Vec<SlotId>> {
        if self.layout == Layout::Positional {
            return Ok((0..self.slots.len()).collect());
        }

        let mut order = Vec::new();
        let mut seen = FxHashSet::default();
        let mut cursor = head;
        while let Some(slot) = cursor {
            let (_, next) = self.get(slot).ok_or(Error::BrokenChain(slot))?;
            if !seen.insert(slot) {
                return Err(Error::BrokenChain(slot));
            }
            order.push(slot);

            cursor = match next {
                Some(next) => follow(private_key.decrypt_signed(next)?, slot)?,
                None => None,
            };
        }
        return Ok(order);
    }

    /// Plaintext values in document order.
    pub fn read(&self, private_key: &PrivateKey, head: Option<SlotId>) -> Result<Vec<BigUint>> {
        let mut values = Vec::new();
        for slot in self.chain(private_key, head)? {
            let (value, _) = self.get(slot).ok_or(Error::BrokenChain(slot))?;
            values.push(private_key.decrypt(value)?);
        }
        return Ok(values);
    }
}

fn follow(link: BigInt, from: SlotId) -> Result<Option<SlotId>> {
    if link == BigInt::from(TERMINAL) {
        return Ok(None);
    }
    return link.to_usize().map(Some).ok_or(Error::BrokenChain(from));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyPair;

    fn pair() -> KeyPair {
        return KeyPair::from_primes(BigUint::from(1_000_003u64), BigUint::from(1_000_033u64)).unwrap();
    }

    fn slot(pair: &KeyPair, value: u64, next: Option<i64>) -> SlotContents {
        let value = pair.public_key.encrypt(&BigUint::from(value));
        let next = next.map(|n| pair.public_key.encrypt_signed(&BigInt::from(n)).unwrap());
        return Some((value, next));
    }

    fn snapshot(slots: Vec<SlotContents>) -> Snapshot {
        return Snapshot { layout: Layout::Slotted, revision: 0, slots };
    }

    fn plain(values: &[u64]) -> Vec<BigUint> {
        return values.iter().map(|v| BigUint::from(*v)).collect();
    }

    #[test]
    fn chain_follows_pointers() {
        let pair = pair();
        let snap = snapshot(vec![
            slot(&pair, 30, Some(-1)),
            None,
            slot(&pair, 10, Some(3)),
            slot(&pair, 20, Some(0)),
        ]);
        assert_eq!(snap.chain(&pair.private_key, Some(2)).unwrap(), vec![2, 3, 0]);
        assert_eq!(snap.read(&pair.private_key, Some(2)).unwrap(), plain(&[10, 20, 30]));
    }

    #[test]
    fn unset_pointer_ends_chain() {
        let pair = pair();
        let snap = snapshot(vec![slot(&pair, 5, None), slot(&pair, 6, Some(0))]);
        assert_eq!(snap.read(&pair.private_key, Some(1)).unwrap(), plain(&[6, 5]));
    }

    #[test]
    fn no_head_reads_nothing() {
        let pair = pair();
        let snap = snapshot(vec![None, None]);
        assert!(snap.read(&pair.private_key, None).unwrap().is_empty());
    }

    #[test]
    fn cycle_is_broken_chain() {
        let pair = pair();
        let snap = snapshot(vec![slot(&pair, 1, Some(1)), slot(&pair, 2, Some(0))]);
        assert!(matches!(snap.chain(&pair.private_key, Some(0)), Err(Error::BrokenChain(0))));
    }

    #[test]
    fn dangling_pointer_is_broken_chain() {
        let pair = pair();
        let snap = snapshot(vec![slot(&pair, 1, Some(1)), None, slot(&pair, 3, Some(9))]);
        assert!(matches!(snap.chain(&pair.private_key, Some(0)), Err(Error::BrokenChain(1))));
        assert!(matches!(snap.chain(&pair.private_key, Some(2)), Err(Error::BrokenChain(9))));
        assert!(matches!(snap.chain(&pair.private_key, Some(5)), Err(Error::BrokenChain(5))));
    }

    #[test]
    fn negative_pointer_is_broken_chain() {
        let pair = pair();
        let snap = snapshot(vec![slot(&pair, 1, Some(-7))]);
        assert!(matches!(snap.chain(&pair.private_key, Some(0)), Err(Error::BrokenChain(0))));
    }

    #[test]
    fn positional_reads_in_index_order() {
        let pair = pair();
        let snap = Snapshot {
            layout: Layout::Positional,
            revision: 3,
            slots: vec![slot(&pair, 7, None), slot(&pair, 8, None), slot(&pair, 9, None)],
        };
        assert_eq!(snap.read(&pair.private_key, None).unwrap(), plain(&[7, 8, 9]));
    }

    #[test]
    fn decrypt_slots_keeps_physical_order() {
        let pair = pair();
        let snap = snapshot(vec![None, slot(&pair, 4, Some(-1)), slot(&pair, 5, None)]);
        let slots = snap.decrypt_slots(&pair.private_key).unwrap();
        assert_eq!(slots[0], None);
        assert_eq!(slots[1], Some((BigUint::from(4u32), Some(BigInt::from(-1)))));
        assert_eq!(slots[2], Some((BigUint::from(5u32), None)));
    }

    #[test]
    fn foreign_key_cannot_read() {
        let alice = pair();
        let bob = KeyPair::from_primes(BigUint::from(1_000_037u64), BigUint::from(1_000_039u64)).unwrap();
        let snap = snapshot(vec![slot(&alice, 1, None)]);
        assert!(matches!(snap.read(&bob.private_key, Some(0)), Err(Error::DifferentPublicKeys)));
    }
}

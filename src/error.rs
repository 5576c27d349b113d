// model = "claude-opus-4-5"
// created = "2026-10-17"
// modified = "2026-10-17"
// driver = "Isaac Clayton"

use thiserror::Error;

use crate::doc::SlotId;

/// Everything that can go wrong in the core.
#[derive(Debug, Error)]
pub enum Error {
    /// The primes or modulus handed to a key constructor are unusable.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(&'static str),

    /// Two ciphertexts (or a ciphertext and a key) belong to different keypairs.
    #[error("ciphertexts were produced under different public keys")]
    DifferentPublicKeys,

    /// The slot is beyond the table, or holds nothing to act on.
    #[error("slot {slot} is out of range (capacity {capacity})")]
    IndexOutOfRange { slot: SlotId, capacity: usize },

    /// An insert raced for a slot that is already taken.
    #[error("slot {0} is already occupied")]
    SlotAlreadyOccupied(SlotId),

    /// The operation needs at least one element and there is none.
    #[error("structure is empty")]
    EmptyStructure,

    /// The atomic changes do not fit the declared operation kind.
    #[error("malformed operation: {0}")]
    MalformedOperation(&'static str),

    /// A signed plaintext does not fit in the key's signed range.
    #[error("plaintext overflows the signed range of the key")]
    Overflow,

    /// The author claims a revision the document has not reached.
    #[error("operation authored at revision {authored}, document is at {current}")]
    FutureRevision { authored: u64, current: u64 },

    /// Following next pointers hit a cycle, an empty slot, or a slot out of range.
    #[error("chain is broken at slot {0}")]
    BrokenChain(SlotId),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

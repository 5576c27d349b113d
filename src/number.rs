// model = "claude-opus-4-5"
// created = "2026-10-17"
// modified = "2026-10-17"
// driver = "Isaac Clayton"

//! Ciphertexts and their additive algebra.
//!
//! Multiplying two Paillier ciphertexts modulo n² adds their plaintexts
//! modulo n. Every document mutation is expressed this way, so the server
//! never overwrites a value it cannot read.

use num_bigint_dig::BigUint;

use crate::error::Error;
use crate::error::Result;
use crate::key::PublicKey;

/// Values that support a fallible homomorphic addition.
pub trait Additive: Sized {
    fn add(&self, other: &Self) -> Result<Self>;
}

/// A ciphertext together with the key that produced it.
#[derive(Clone)]
pub struct EncryptedNumber {
    public_key: PublicKey,
    ciphertext: BigUint,
    obfuscated: bool,
}

impl EncryptedNumber {
    /// Wrap a raw ciphertext. The number starts out not obfuscated.
    pub fn new(public_key: PublicKey, ciphertext: BigUint) -> EncryptedNumber {
        return EncryptedNumber {
            public_key,
            ciphertext,
            obfuscated: false,
        };
    }

    pub fn public_key(&self) -> &PublicKey {
        return &self.public_key;
    }

    /// The ciphertext as stored, without touching the obfuscation state.
    pub fn raw_ciphertext(&self) -> &BigUint {
        return &self.ciphertext;
    }

    /// The ciphertext in the form to hand to someone else. With `secure`
    /// set, a number that was never obfuscated is re-randomized first.
    pub fn ciphertext(&mut self, secure: bool) -> &BigUint {
        if secure && !self.obfuscated {
            self.obfuscate();
        }
        return &self.ciphertext;
    }

    pub fn is_obfuscated(&self) -> bool {
        return self.obfuscated;
    }

    /// Re-randomize the ciphertext in place. The plaintext is unchanged.
    pub fn obfuscate(&mut self) {
        let obfuscator = self.public_key.obfuscator();
        self.ciphertext = &self.ciphertext * obfuscator % self.public_key.n_square();
        self.obfuscated = true;
    }

    /// Homomorphic addition. The sum is a fresh, non-obfuscated number.
    pub fn add(&self, other: &EncryptedNumber) -> Result<EncryptedNumber> {
        if self.public_key != other.public_key {
            return Err(Error::DifferentPublicKeys);
        }
        let sum = &self.ciphertext * &other.ciphertext % self.public_key.n_square();
        return Ok(EncryptedNumber::new(self.public_key.clone(), sum));
    }
}

impl Additive for EncryptedNumber {
    fn add(&self, other: &Self) -> Result<Self> {
        return EncryptedNumber::add(self, other);
    }
}

impl PartialEq for EncryptedNumber {
    fn eq(&self, other: &Self) -> bool {
        return self.public_key == other.public_key && self.ciphertext == other.ciphertext;
    }
}

impl Eq for EncryptedNumber {}

impl std::fmt::Debug for EncryptedNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(
            f,
            "EncryptedNumber {{ key: {:?}, bits: {}, obfuscated: {} }}",
            self.public_key.fingerprint(),
            self.ciphertext.bits(),
            self.obfuscated,
        );
    }
}

// model = "claude-opus-4-5"
// created = "2026-01-30"
// modified = "2026-10-17"
// driver = "Isaac Clayton"

//! Paillier keys.
//!
//! The public key is shared by every collaborator and by the server; it is
//! enough to encrypt and to add ciphertexts. The private key stays with
//! whoever is trusted to read plaintext. Decryption uses the CRT form: two
//! partial decryptions modulo p² and q², recombined modulo n.

use std::sync::Arc;

use num_bigint_dig::BigInt;
use num_bigint_dig::BigUint;
use num_bigint_dig::RandBigInt;
use num_bigint_dig::RandPrime;
use num_bigint_dig::Sign;
use num_traits::One;
use num_traits::Zero;
use rand_core::OsRng;

use crate::error::Error;
use crate::error::Result;
use crate::number::EncryptedNumber;

/// Modulus size used when nothing else is configured.
pub const DEFAULT_KEY_BITS: usize = 3072;

/// Smallest modulus `KeyPair::generate` will produce.
pub const MIN_KEY_BITS: usize = 32;

/// A blake3 hash of a public modulus, 32 bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub [u8; 32]);

struct Modulus {
    n: BigUint,
    g: BigUint,
    n_square: BigUint,
    max_int: BigUint,
    fingerprint: Fingerprint,
}

/// A Paillier public key. Cloning is cheap; clones share one modulus.
#[derive(Clone)]
pub struct PublicKey(Arc<Modulus>);

/// A Paillier private key. Always stores p < q.
#[derive(Clone)]
pub struct PrivateKey {
    public_key: PublicKey,
    p: BigUint,
    q: BigUint,
    p_square: BigUint,
    q_square: BigUint,
    p_inverse: BigUint,
    hp: BigUint,
    hq: BigUint,
}

/// A keypair bundles a public and private key together.
#[derive(Clone)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub private_key: PrivateKey,
}

impl PublicKey {
    /// Build a public key around the modulus n, with g = n + 1.
    pub fn new(n: BigUint) -> Result<PublicKey> {
        // Anything smaller leaves no room for a signed range.
        if n < BigUint::from(6u32) {
            return Err(Error::InvalidKeyMaterial("modulus is too small"));
        }
        let g = &n + BigUint::one();
        let n_square = &n * &n;
        let max_int = &n / BigUint::from(3u32) - BigUint::one();
        let fingerprint = Fingerprint(*blake3::hash(&n.to_bytes_be()).as_bytes());
        return Ok(PublicKey(Arc::new(Modulus {
            n,
            g,
            n_square,
            max_int,
            fingerprint,
        })));
    }

    pub fn n(&self) -> &BigUint {
        return &self.0.n;
    }

    pub fn g(&self) -> &BigUint {
        return &self.0.g;
    }

    pub fn n_square(&self) -> &BigUint {
        return &self.0.n_square;
    }

    /// Largest magnitude a signed plaintext may have.
    pub fn max_int(&self) -> &BigUint {
        return &self.0.max_int;
    }

    pub fn fingerprint(&self) -> Fingerprint {
        return self.0.fingerprint;
    }

    /// Bit length of the modulus.
    pub fn bits(&self) -> usize {
        return self.0.n.bits();
    }

    /// Encrypt a plaintext, reduced modulo n.
    pub fn encrypt(&self, plaintext: &BigUint) -> EncryptedNumber {
        let m = plaintext % &self.0.n;
        // g^m mod n² collapses to 1 + n·m because g = n + 1.
        let nude = (&self.0.n * &m + BigUint::one()) % &self.0.n_square;
        let ciphertext = nude * self.obfuscator() % &self.0.n_square;
        return EncryptedNumber::new(self.clone(), ciphertext);
    }

    /// Encode a signed value and encrypt it.
    pub fn encrypt_signed(&self, value: &BigInt) -> Result<EncryptedNumber> {
        let residue = self.encode(value)?;
        return Ok(self.encrypt(&residue));
    }

    /// Map a signed value into the residues modulo n.
    /// Negative values wrap to n - |value|.
    pub fn encode(&self, value: &BigInt) -> Result<BigUint> {
        let negative = value.sign() == Sign::Minus;
        let magnitude = if negative {
            (-value).to_biguint()
        } else {
            value.to_biguint()
        };
        let magnitude = magnitude.ok_or(Error::Overflow)?;
        if magnitude > self.0.max_int {
            return Err(Error::Overflow);
        }
        if negative {
            return Ok(&self.0.n - magnitude);
        }
        return Ok(magnitude);
    }

    /// Inverse of `encode`. Residues between max_int and n - max_int
    /// belong to neither range and fail with `Overflow`.
    pub fn decode(&self, residue: &BigUint) -> Result<BigInt> {
        if residue <= &self.0.max_int {
            return Ok(BigInt::from_biguint(Sign::Plus, residue.clone()));
        }
        if residue >= &self.0.n {
            return Err(Error::Overflow);
        }
        let magnitude = &self.0.n - residue;
        if magnitude > self.0.max_int {
            return Err(Error::Overflow);
        }
        return Ok(BigInt::from_biguint(Sign::Minus, magnitude));
    }

    /// A fresh rⁿ mod n² for uniform r in [1, n).
    pub(crate) fn obfuscator(&self) -> BigUint {
        let r = OsRng.gen_biguint_range(&BigUint::one(), &self.0.n);
        return r.modpow(&self.0.n, &self.0.n_square);
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        return self.0.fingerprint == other.0.fingerprint && self.0.n == other.0.n;
    }
}

impl Eq for PublicKey {}

impl PrivateKey {
    /// Build the private key for `public_key` from its two prime factors.
    pub fn new(public_key: &PublicKey, p: BigUint, q: BigUint) -> Result<PrivateKey> {
        if &p * &q != *public_key.n() {
            return Err(Error::InvalidKeyMaterial("modulus is not the product of p and q"));
        }
        if p == q {
            return Err(Error::InvalidKeyMaterial("p and q are equal"));
        }
        let (p, q) = if q < p { (q, p) } else { (p, q) };

        let p_square = &p * &p;
        let q_square = &q * &q;
        let p_inverse = invert_mod_prime(&p, &q)?;
        let hp = h_function(public_key, &p, &p_square)?;
        let hq = h_function(public_key, &q, &q_square)?;

        return Ok(PrivateKey {
            public_key: public_key.clone(),
            p,
            q,
            p_square,
            q_square,
            p_inverse,
            hp,
            hq,
        });
    }

    pub fn public_key(&self) -> &PublicKey {
        return &self.public_key;
    }

    /// Decrypt to the plaintext residue modulo n.
    pub fn decrypt(&self, number: &EncryptedNumber) -> Result<BigUint> {
        if number.public_key() != &self.public_key {
            return Err(Error::DifferentPublicKeys);
        }
        return Ok(self.raw_decrypt(number.raw_ciphertext()));
    }

    /// Decrypt and decode as a signed value.
    pub fn decrypt_signed(&self, number: &EncryptedNumber) -> Result<BigInt> {
        let residue = self.decrypt(number)?;
        return self.public_key.decode(&residue);
    }

    fn raw_decrypt(&self, ciphertext: &BigUint) -> BigUint {
        let one = BigUint::one();
        let up = ciphertext.modpow(&(&self.p - &one), &self.p_square);
        let mp = l_function(&up, &self.p) * &self.hp % &self.p;
        let uq = ciphertext.modpow(&(&self.q - &one), &self.q_square);
        let mq = l_function(&uq, &self.q) * &self.hq % &self.q;
        return self.crt(&mp, &mq);
    }

    fn crt(&self, mp: &BigUint, mq: &BigUint) -> BigUint {
        // mp < p < q, so adding q keeps the difference non-negative.
        let diff = (mq + &self.q - mp) % &self.q;
        let u = diff * &self.p_inverse % &self.q;
        return mp + u * &self.p;
    }
}

impl KeyPair {
    /// Generate a keypair whose modulus has exactly `bits` bits.
    pub fn generate(bits: usize) -> Result<KeyPair> {
        if bits < MIN_KEY_BITS {
            return Err(Error::InvalidKeyMaterial("key size is below the minimum"));
        }
        if bits % 2 != 0 {
            return Err(Error::InvalidKeyMaterial("key size must be even"));
        }

        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let p = OsRng.gen_prime(bits / 2);
            let mut q = OsRng.gen_prime(bits / 2);
            while q == p {
                q = OsRng.gen_prime(bits / 2);
            }
            let n = &p * &q;
            if n.bits() != bits {
                tracing::trace!(bits, got = n.bits(), "modulus has the wrong size, resampling");
                continue;
            }

            let pair = KeyPair::from_primes(p, q)?;
            tracing::debug!(bits, attempts, fingerprint = ?pair.public_key.fingerprint(), "generated keypair");
            return Ok(pair);
        }
    }

    /// Build a keypair from two known primes.
    pub fn from_primes(p: BigUint, q: BigUint) -> Result<KeyPair> {
        let public_key = PublicKey::new(&p * &q)?;
        let private_key = PrivateKey::new(&public_key, p, q)?;
        return Ok(KeyPair {
            public_key,
            private_key,
        });
    }
}

/// Paillier's L function, L(u) = (u - 1) / x.
fn l_function(u: &BigUint, x: &BigUint) -> BigUint {
    if u.is_zero() {
        return BigUint::zero();
    }
    return (u - BigUint::one()) / x;
}

/// hx = L(g^(x-1) mod x²)⁻¹ mod x.
fn h_function(public_key: &PublicKey, x: &BigUint, x_square: &BigUint) -> Result<BigUint> {
    let u = public_key.g().modpow(&(x - BigUint::one()), x_square);
    return invert_mod_prime(&l_function(&u, x), x);
}

/// Inverse of `a` modulo the prime `m`, via Fermat's little theorem.
/// Fails if the inverse does not check out, which also catches a composite `m`.
fn invert_mod_prime(a: &BigUint, m: &BigUint) -> Result<BigUint> {
    let a = a % m;
    if a.is_zero() || m < &BigUint::from(2u32) {
        return Err(Error::InvalidKeyMaterial("value has no inverse"));
    }
    let inverse = a.modpow(&(m - BigUint::from(2u32)), m);
    if (&a * &inverse) % m != BigUint::one() {
        return Err(Error::InvalidKeyMaterial("factor is not prime"));
    }
    return Ok(inverse);
}

fn hex(bytes: &[u8]) -> String {
    return bytes.iter().map(|b| format!("{:02x}", b)).collect();
}

impl std::fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "Fingerprint({})", hex(&self.0[..8]));
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "PublicKey {{ bits: {}, id: {} }}", self.bits(), hex(&self.0.fingerprint.0[..8]));
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "PrivateKey {{ for: {} }}", hex(&self.public_key.0.fingerprint.0[..8]));
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "KeyPair {{ bits: {}, id: {} }}", self.public_key.bits(), hex(&self.public_key.0.fingerprint.0[..8]));
    }
}

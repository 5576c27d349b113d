// model = "claude-opus-4-5"
// created = "2026-10-17"
// modified = "2026-10-17"
// driver = "Isaac Clayton"

//! Packs UTF-8 text into 64-bit chunks and back.
//!
//! Each chunk holds up to eight bytes of the text in big-endian order, so
//! the first byte of the group lands in the most significant position. The
//! last group is padded with zero bytes. Decoding reverses this and drops
//! every zero byte before validating UTF-8, which means text containing NUL
//! bytes does not survive a round trip.
//!
//! ```
//! let chunks = textchunk::encode("Hello, World!");
//! assert_eq!(chunks.len(), 2);
//! assert_eq!(textchunk::decode(&chunks).unwrap(), "Hello, World!");
//! ```

use thiserror::Error;

/// Number of text bytes carried by one chunk.
pub const CHUNK_BYTES: usize = 8;

/// Error returned when chunks do not decode to valid UTF-8.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("chunks do not hold valid utf-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Pack text into chunks. Empty text yields no chunks.
pub fn encode(text: &str) -> Vec<u64> {
    return text
        .as_bytes()
        .chunks(CHUNK_BYTES)
        .map(pack)
        .collect();
}

/// Pack text that fits in a single chunk.
/// Returns None when the text is longer than `CHUNK_BYTES` bytes.
pub fn encode_one(text: &str) -> Option<u64> {
    if text.len() > CHUNK_BYTES {
        return None;
    }
    return Some(pack(text.as_bytes()));
}

/// Unpack chunks back into text.
pub fn decode(chunks: &[u64]) -> Result<String, DecodeError> {
    let mut bytes = Vec::with_capacity(chunks.len() * CHUNK_BYTES);
    for chunk in chunks {
        bytes.extend(chunk.to_be_bytes().into_iter().filter(|b| *b != 0));
    }
    return Ok(String::from_utf8(bytes)?);
}

/// Unpack a single chunk.
pub fn decode_one(chunk: u64) -> Result<String, DecodeError> {
    return decode(&[chunk]);
}

fn pack(group: &[u8]) -> u64 {
    let mut buf = [0u8; CHUNK_BYTES];
    buf[..group.len()].copy_from_slice(group);
    return u64::from_be_bytes(buf);
}

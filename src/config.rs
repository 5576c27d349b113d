// model = "claude-opus-4-5"
// created = "2026-10-17"
// modified = "2026-10-17"
// driver = "Isaac Clayton"

//! Settings for creating a document.

use serde::Deserialize;
use serde::Serialize;

use crate::doc::Layout;
use crate::error::Result;
use crate::key::DEFAULT_KEY_BITS;

/// Number of empty slots a new document starts with.
pub const DEFAULT_INITIAL_SLOTS: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocumentConfig {
    /// Slots allocated up front. The table doubles when it runs out.
    pub initial_slots: usize,
    /// Modulus size for freshly generated keys.
    pub key_bits: usize,
    pub layout: Layout,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        return DocumentConfig {
            initial_slots: DEFAULT_INITIAL_SLOTS,
            key_bits: DEFAULT_KEY_BITS,
            layout: Layout::default(),
        };
    }
}

impl DocumentConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<DocumentConfig> {
        return Ok(serde_json::from_str(json)?);
    }

    pub fn to_json(&self) -> Result<String> {
        return Ok(serde_json::to_string_pretty(self)?);
    }
}

// model = "claude-opus-4-5"
// created = "2026-01-30"
// modified = "2026-10-17"
// driver = "Isaac Clayton"

//! Sealdoc - collaborative documents that stay encrypted on the server.
//!
//! Every value and every link between values is a Paillier ciphertext. The
//! server applies edits by multiplying ciphertexts, which adds the hidden
//! plaintexts, so it can keep a document consistent without reading it.
//!
//! # Quick Start
//!
//! ```
//! use sealdoc::BigUint;
//! use sealdoc::config::DocumentConfig;
//! use sealdoc::document::Document;
//! use sealdoc::editor::Editor;
//! use sealdoc::editor::Neighbor;
//!
//! let config = DocumentConfig { key_bits: 256, ..DocumentConfig::default() };
//! let (doc, keys) = Document::create(&config).unwrap();
//! let mut editor = Editor::new(doc.public_key().clone(), doc.revision());
//!
//! // Slot 3 becomes the head, slot 5 follows it.
//! let op = editor.insert_head(3, &BigUint::from(1u32), None).unwrap();
//! editor.observe(&doc.handle_operation(op).unwrap());
//! let op = editor.insert_after(5, &BigUint::from(2u32), Neighbor { slot: 3, next: None }).unwrap();
//! editor.observe(&doc.handle_operation(op).unwrap());
//!
//! let values = doc.snapshot().read(&keys.private_key, Some(3)).unwrap();
//! assert_eq!(values, vec![BigUint::from(1u32), BigUint::from(2u32)]);
//! assert_eq!(doc.revision(), 2);
//! ```

pub mod config;
pub mod doc;
pub mod document;
pub mod editor;
pub mod error;
pub mod key;
pub mod log;
pub mod number;

pub use error::Error;
pub use error::Result;
pub use num_bigint_dig::BigInt;
pub use num_bigint_dig::BigUint;

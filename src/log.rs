// model = "claude-opus-4-5"
// created = "2026-01-30"
// modified = "2026-10-17"
// driver = "Isaac Clayton"

//! The append-only revision history of a document.
//!
//! Record `i` is the operation that moved the document from revision `i`
//! to revision `i + 1`, so the history length always equals the current
//! revision. Each record keeps both the operation as its author sent it and
//! the operation as it was applied after reconciliation. Later
//! reconciliation only ever looks at the applied form.

use crate::doc::op::Operation;

/// One accepted operation.
#[derive(Clone, Debug)]
pub struct Record {
    /// As submitted, before reconciliation.
    pub original: Operation,
    /// As applied to storage.
    pub applied: Operation,
}

#[derive(Clone, Debug, Default)]
pub struct History {
    records: Vec<Record>,
}

impl History {
    pub fn new() -> History {
        return History::default();
    }

    /// Number of accepted operations, which is the current revision.
    pub fn len(&self) -> usize {
        return self.records.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.records.is_empty();
    }

    pub fn push(&mut self, original: Operation, applied: Operation) {
        self.records.push(Record { original, applied });
    }

    pub fn newest(&self) -> Option<&Record> {
        return self.records.last();
    }

    /// The record that produced `revision`, which counts from 1.
    pub fn get(&self, revision: u64) -> Option<&Record> {
        let index = usize::try_from(revision).ok()?.checked_sub(1)?;
        return self.records.get(index);
    }

    /// Every record, newest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Record> {
        return self.records.iter().rev();
    }

    /// Records applied after `revision`, oldest first.
    pub fn since(&self, revision: u64) -> &[Record] {
        let start = usize::try_from(revision).unwrap_or(usize::MAX).min(self.records.len());
        return &self.records[start..];
    }
}

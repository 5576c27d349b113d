// model = "claude-opus-4-5"
// created = "2026-01-31"
// modified = "2026-10-17"
// driver = "Isaac Clayton"

//! Property-based tests for the crypto scheme and the document API.

use std::sync::OnceLock;

use num_traits::ToPrimitive;
use proptest::prelude::*;
use sealdoc::BigInt;
use sealdoc::BigUint;
use sealdoc::config::DocumentConfig;
use sealdoc::doc::Layout;
use sealdoc::document::Document;
use sealdoc::document::Outcome;
use sealdoc::editor::Editor;
use sealdoc::editor::Neighbor;
use sealdoc::key::KeyPair;

// =============================================================================
// Test helpers
// =============================================================================

fn keys() -> &'static KeyPair {
    static KEYS: OnceLock<KeyPair> = OnceLock::new();
    return KEYS.get_or_init(|| KeyPair::generate(128).unwrap());
}

/// A random edit against a slotted document, resolved against the
/// document's current plaintext order when applied.
#[derive(Clone, Debug)]
enum EditOp {
    Insert { at_pct: f64, value: u32 },
    Remove { at_pct: f64 },
    Add { at_pct: f64, delta: i32 },
}

fn arbitrary_edit_op() -> impl Strategy<Value = EditOp> {
    prop_oneof![
        (0.0..=1.0f64, any::<u32>()).prop_map(|(at_pct, value)| EditOp::Insert { at_pct, value }),
        (0.0..=1.0f64).prop_map(|at_pct| EditOp::Remove { at_pct }),
        (0.0..=1.0f64, -1000..1000i32).prop_map(|(at_pct, delta)| EditOp::Add { at_pct, delta }),
    ]
}

fn pick(pct: f64, len: usize) -> usize {
    return ((pct * len as f64) as usize).min(len.saturating_sub(1));
}

/// Applies `op` to `doc` and mirrors it on a plain model of the contents.
/// `order` tracks slot ids in document order; `model` their values.
fn apply_edit(doc: &Document, editor: &mut Editor, order: &mut Vec<usize>, model: &mut Vec<i64>, op: &EditOp) {
    let built = match op {
        EditOp::Insert { at_pct, value } => {
            let slot = match doc.snapshot().slots.iter().position(|s| s.is_none()) {
                Some(slot) => slot,
                None => {
                    let old = doc.snapshot().capacity();
                    doc.grow();
                    old
                }
            };
            let at = ((*at_pct * (order.len() + 1) as f64) as usize).min(order.len());
            let value_big = BigUint::from(*value);
            let built = if at == 0 {
                editor.insert_head(slot, &value_big, order.first().copied()).unwrap()
            } else {
                let predecessor = Neighbor { slot: order[at - 1], next: order.get(at).copied() };
                editor.insert_after(slot, &value_big, predecessor).unwrap()
            };
            order.insert(at, slot);
            model.insert(at, *value as i64);
            built
        }
        EditOp::Remove { at_pct } => {
            if order.is_empty() {
                return;
            }
            let at = pick(*at_pct, order.len());
            let target = Neighbor { slot: order[at], next: order.get(at + 1).copied() };
            let predecessor = if at == 0 { None } else { Some(order[at - 1]) };
            let built = editor.remove(target, predecessor).unwrap();
            order.remove(at);
            model.remove(at);
            built
        }
        EditOp::Add { at_pct, delta } => {
            if order.is_empty() {
                return;
            }
            let at = pick(*at_pct, order.len());
            let built = editor.add(order[at], &BigInt::from(*delta)).unwrap();
            model[at] += *delta as i64;
            built
        }
    };
    let outcome = doc.handle_operation(built).unwrap();
    assert!(matches!(outcome, Outcome::Applied { .. }));
    editor.observe(&outcome);
}

fn read_signed(doc: &Document, head: Option<usize>) -> Vec<i64> {
    let snapshot = doc.snapshot();
    let chain = snapshot.chain(&keys().private_key, head).unwrap();
    return chain
        .iter()
        .map(|slot| {
            let (value, _) = snapshot.get(*slot).unwrap();
            let plain = keys().private_key.decrypt_signed(value).unwrap();
            return plain.to_i64().unwrap();
        })
        .collect();
}

// =============================================================================
// Crypto scheme properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn decrypt_inverts_encrypt(m in any::<u64>()) {
        let m = BigUint::from(m);
        let c = keys().public_key.encrypt(&m);
        prop_assert_eq!(keys().private_key.decrypt(&c).unwrap(), m);
    }

    #[test]
    fn addition_is_homomorphic(a in any::<u64>(), b in any::<u64>()) {
        let key = &keys().public_key;
        let sum = key.encrypt(&BigUint::from(a)).add(&key.encrypt(&BigUint::from(b))).unwrap();
        let expected = (BigUint::from(a) + BigUint::from(b)) % key.n();
        prop_assert_eq!(keys().private_key.decrypt(&sum).unwrap(), expected);
    }

    #[test]
    fn signed_values_round_trip(v in any::<i64>()) {
        let c = keys().public_key.encrypt_signed(&BigInt::from(v)).unwrap();
        prop_assert_eq!(keys().private_key.decrypt_signed(&c).unwrap(), BigInt::from(v));
    }

    #[test]
    fn obfuscation_keeps_plaintext(m in any::<u32>()) {
        let mut c = keys().public_key.encrypt(&BigUint::from(m));
        let before = c.raw_ciphertext().clone();
        c.obfuscate();
        prop_assert_ne!(c.raw_ciphertext(), &before);
        prop_assert_eq!(keys().private_key.decrypt(&c).unwrap(), BigUint::from(m));
    }
}

// =============================================================================
// Document properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn chain_matches_model(ops in prop::collection::vec(arbitrary_edit_op(), 1..25)) {
        let config = DocumentConfig { initial_slots: 2, key_bits: 128, layout: Layout::Slotted };
        let doc = Document::new(keys().public_key.clone(), &config);
        let mut editor = Editor::new(doc.public_key().clone(), 0);
        let mut order = Vec::new();
        let mut model = Vec::new();

        for op in &ops {
            apply_edit(&doc, &mut editor, &mut order, &mut model, op);
            prop_assert_eq!(doc.revision(), doc.history().len() as u64);
        }

        prop_assert_eq!(read_signed(&doc, order.first().copied()), model);
    }

    #[test]
    fn concurrent_edits_commute(
        deltas in prop::collection::vec(-10_000..10_000i64, 1..6),
        start in 0..1_000_000u32,
    ) {
        let config = DocumentConfig { initial_slots: 1, key_bits: 128, layout: Layout::Slotted };
        let forward = Document::new(keys().public_key.clone(), &config);
        let backward = Document::new(keys().public_key.clone(), &config);

        let setup = Editor::new(keys().public_key.clone(), 0);
        let head = setup.insert_head(0, &BigUint::from(start), None).unwrap();
        forward.handle_operation(head.clone()).unwrap();
        backward.handle_operation(head).unwrap();

        // Everyone authors against revision 1.
        let stale = Editor::new(keys().public_key.clone(), 1);
        let edits: Vec<_> = deltas.iter().map(|d| stale.add(0, &BigInt::from(*d)).unwrap()).collect();
        for edit in &edits {
            forward.handle_operation(edit.clone()).unwrap();
        }
        for edit in edits.iter().rev() {
            backward.handle_operation(edit.clone()).unwrap();
        }

        let expected = start as i64 + deltas.iter().sum::<i64>();
        prop_assert_eq!(read_signed(&forward, Some(0)), vec![expected]);
        prop_assert_eq!(read_signed(&backward, Some(0)), vec![expected]);
        prop_assert_eq!(forward.revision(), backward.revision());
    }
}

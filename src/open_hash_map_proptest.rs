#![cfg(test)]

// Property tests for OpenHashMap kept inside the crate so they can reach
// the table internals (capacity, cursor) without extra features.

use crate::map::{PrimitiveMap, PrimitiveMapMut};
use crate::open_hash_map::OpenHashMap;
use crate::primitive::Key;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

// Pool-indexed operations: indices shrink to earlier keys, op lists shrink
// in length.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    Take(usize),
    Get(usize),
    Merge(usize, i32),
    ComputeIfPresent(usize, i32),
    RetainEvery(u8),
    CursorRemoveEvery(u8),
    Trim,
    Clear,
    Iterate,
}

fn arb_op(pool_len: usize) -> impl Strategy<Value = Op> {
    let idx = 0..pool_len;
    prop_oneof![
        4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
        2 => idx.clone().prop_map(Op::Take),
        2 => idx.clone().prop_map(Op::Get),
        2 => (idx.clone(), -3..3i32).prop_map(|(i, v)| Op::Merge(i, v)),
        1 => (idx.clone(), -3..3i32).prop_map(|(i, v)| Op::ComputeIfPresent(i, v)),
        1 => (2..5u8).prop_map(Op::RetainEvery),
        1 => (2..5u8).prop_map(Op::CursorRemoveEvery),
        1 => Just(Op::Trim),
        1 => Just(Op::Clear),
        1 => Just(Op::Iterate),
    ]
}

// Keys chosen to stress the zero slot, signed zeros, NaN and clustering.
fn f64_pool() -> Vec<f64> {
    let mut pool = vec![0.0, -0.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY, f64::MIN_POSITIVE];
    pool.extend((1..40).map(|i| i as f64 * 0.5));
    pool
}

fn i32_pool() -> Vec<i32> {
    (-20..200).collect()
}

// Runs `ops` against the map and a model keyed by key bits.
fn run_against_model<K: Key>(pool: &[K], ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut sut: OpenHashMap<K, i32> = OpenHashMap::new();
    let mut model: BTreeMap<u64, i32> = BTreeMap::new();

    for op in ops {
        match op {
            Op::Insert(i, v) => {
                let k = pool[i];
                prop_assert_eq!(sut.insert(k, v), model.insert(k.key_bits(), v));
            }
            Op::Take(i) => {
                let k = pool[i];
                prop_assert_eq!(sut.take(k), model.remove(&k.key_bits()));
            }
            Op::Get(i) => {
                let k = pool[i];
                prop_assert_eq!(sut.lookup(k), model.get(&k.key_bits()));
                prop_assert_eq!(sut.get(k), model.get(&k.key_bits()).copied().unwrap_or(0));
            }
            Op::Merge(i, v) => {
                let k = pool[i];
                let bits = k.key_bits();
                let next = match model.get(&bits) {
                    Some(old) => old.wrapping_add(v),
                    None => v,
                };
                if next == 0 {
                    model.remove(&bits);
                } else {
                    model.insert(bits, next);
                }
                prop_assert_eq!(sut.merge(k, v, |a, b| a.wrapping_add(b)), next);
            }
            Op::ComputeIfPresent(i, v) => {
                let k = pool[i];
                let bits = k.key_bits();
                let expected = match model.get(&bits).copied() {
                    Some(old) => {
                        let next = old.wrapping_mul(v);
                        if next == 0 {
                            model.remove(&bits);
                        } else {
                            model.insert(bits, next);
                        }
                        next
                    }
                    None => 0,
                };
                prop_assert_eq!(sut.compute_if_present(k, |_, old| old.wrapping_mul(v)), expected);
            }
            Op::RetainEvery(m) => {
                let m = m as i32;
                sut.retain(|_, v| v.rem_euclid(m) != 0);
                model.retain(|_, v| v.rem_euclid(m) != 0);
            }
            Op::CursorRemoveEvery(m) => {
                let m = m as i32;
                let mut cur = sut.cursor();
                let mut visited = BTreeSet::new();
                while let Some((k, v)) = cur.next(&sut).map_err(|e| TestCaseError::fail(e.to_string()))? {
                    prop_assert!(visited.insert(k.key_bits()), "cursor visited {:?} twice", k);
                    if v.rem_euclid(m) == 0 {
                        let removed = cur.remove(&mut sut).map_err(|e| TestCaseError::fail(e.to_string()))?;
                        prop_assert_eq!(removed, v);
                    }
                }
                let all: BTreeSet<u64> = model.keys().copied().collect();
                prop_assert_eq!(visited, all);
                model.retain(|_, v| v.rem_euclid(m) != 0);
            }
            Op::Trim => {
                prop_assert!(sut.trim());
            }
            Op::Clear => {
                sut.clear();
                model.clear();
            }
            Op::Iterate => {
                let seen: BTreeMap<u64, i32> = sut.iter().map(|(k, v)| (k.key_bits(), *v)).collect();
                prop_assert_eq!(&seen, &model);
                prop_assert_eq!(sut.iter().count(), model.len());
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert!(sut.len() < sut.capacity(), "table must keep a free slot");
        prop_assert!(sut.capacity().is_power_of_two());
    }

    for (&bits, v) in &model {
        let found = sut.iter().find(|(k, _)| k.key_bits() == bits).map(|(_, v)| *v);
        prop_assert_eq!(found, Some(*v));
    }
    Ok(())
}

// Property: state-machine equivalence against a BTreeMap keyed by key bits.
// Invariants exercised across random operation sequences:
// - insert/take/lookup parity, including the zero key and signed zeros.
// - merge and compute_if_present remove the key when the result is the
//   default return value.
// - retain and cursor removal visit each entry exactly once.
// - len parity; the table always keeps a free slot.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_f64(ops in proptest::collection::vec(arb_op(f64_pool().len()), 1..120)) {
        run_against_model(&f64_pool(), ops)?;
    }

    #[test]
    fn prop_state_machine_i32(ops in proptest::collection::vec(arb_op(i32_pool().len()), 1..400)) {
        run_against_model(&i32_pool(), ops)?;
    }

    // Property: equality and hash code depend only on the entry set, not on
    // insertion order or table size.
    #[test]
    fn prop_equality_ignores_insertion_order(
        entries in proptest::collection::btree_map(-1000i64..1000, any::<i16>(), 0..80),
        extra in 0usize..500,
    ) {
        let forward: OpenHashMap<i64, i16> = entries.iter().map(|(k, v)| (*k, *v)).collect();
        let mut backward: OpenHashMap<i64, i16> = OpenHashMap::with_capacity(extra);
        for (k, v) in entries.iter().rev() {
            backward.insert(*k, *v);
        }
        prop_assert!(forward == backward);
        prop_assert_eq!(forward.hash_code(), backward.hash_code());
        prop_assert_eq!(forward.to_string().len(), backward.to_string().len());
    }
}

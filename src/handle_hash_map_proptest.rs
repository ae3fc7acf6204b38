#![cfg(test)]

// Property tests for HandleHashMap kept inside the crate alongside the
// OpenHashMap ones.

use crate::error::MapError;
use crate::handle_hash_map::{Handle, HandleHashMap};
use crate::open_hash_map::OpenHashMap;
use proptest::prelude::*;
use std::cell::Cell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    TryInsert(usize, i32),
    InsertWith(usize, i32),
    RemoveHandle(usize),
    Take(usize),
    Find(usize),
    Mutate(usize, i32),
    Retain(u8),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<i64>, Vec<OpI>)> {
    proptest::collection::vec(any::<i64>(), 1..=8).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::TryInsert(i, v)),
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::InsertWith(i, v)),
            idx.clone().prop_map(OpI::RemoveHandle),
            idx.clone().prop_map(OpI::Take),
            idx.clone().prop_map(OpI::Find),
            (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            (2..5u8).prop_map(OpI::Retain),
            Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: State-machine equivalence against std::collections::HashMap,
// with an OpenHashMap fed the same operations as a second witness.
// Invariants exercised across random operation sequences:
// - try_insert/insert_with reject duplicates; insert replaces in place and
//   keeps the handle.
// - `find` returns the tracked handle for live keys.
// - `remove_handle` returns the owned `(K, V)` and invalidates the handle.
// - `retain` keeps index and slots consistent.
// - Stale handles never resolve; both maps stay equal to each other.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: HandleHashMap<i64, i32> = HandleHashMap::new();
        let mut twin: OpenHashMap<i64, i32> = OpenHashMap::new();
        let mut model: HashMap<i64, i32> = HashMap::new();
        let mut live: HashMap<i64, Handle> = HashMap::new();
        let mut stale: Vec<Handle> = Vec::new();

        let default_calls = Rc::new(Cell::new(0));
        for op in ops {
            match op {
                OpI::Insert(i, v) => {
                    let k = pool[i];
                    let prev = sut.insert(k, v);
                    prop_assert_eq!(prev, model.insert(k, v));
                    twin.insert(k, v);
                    let h = sut.find(k).expect("inserted key present");
                    if let Some(&lh) = live.get(&k) {
                        prop_assert_eq!(h, lh, "replacement must keep the handle");
                    }
                    live.insert(k, h);
                }
                OpI::TryInsert(i, v) => {
                    let k = pool[i];
                    let already = model.contains_key(&k);
                    match sut.try_insert(k, v) {
                        Ok(h) => {
                            prop_assert!(!already, "try_insert must fail on duplicate");
                            prop_assert!(live.insert(k, h).is_none());
                            model.insert(k, v);
                            twin.insert(k, v);
                        }
                        Err(e) => {
                            prop_assert_eq!(e, MapError::DuplicateKey);
                            prop_assert!(already, "duplicate error only when key exists");
                        }
                    }
                }
                OpI::InsertWith(i, v) => {
                    let k = pool[i];
                    let already = model.contains_key(&k);
                    let counter = default_calls.clone();
                    let before = counter.get();
                    match sut.insert_with(k, move || { counter.set(counter.get() + 1); v }) {
                        Ok(h) => {
                            prop_assert!(!already, "insert_with must fail on duplicate");
                            prop_assert_eq!(default_calls.get(), before + 1, "default must run exactly once on success");
                            prop_assert!(live.insert(k, h).is_none());
                            model.insert(k, v);
                            twin.insert(k, v);
                        }
                        Err(_) => {
                            prop_assert!(already, "duplicate error only when key exists");
                            prop_assert_eq!(default_calls.get(), before, "default must not run on duplicate");
                        }
                    }
                }
                OpI::RemoveHandle(i) => {
                    let k = pool[i];
                    if let Some(h) = live.remove(&k) {
                        let (kk, vv) = sut.remove_handle(h).expect("handle valid for removal");
                        prop_assert_eq!(kk, k);
                        prop_assert_eq!(Some(vv), model.remove(&k));
                        twin.take(k);
                        stale.push(h);
                    } else {
                        prop_assert!(sut.find(k).is_none());
                    }
                }
                OpI::Take(i) => {
                    let k = pool[i];
                    prop_assert_eq!(sut.take(k), model.remove(&k));
                    twin.take(k);
                    if let Some(h) = live.remove(&k) {
                        stale.push(h);
                    }
                }
                OpI::Find(i) => {
                    let k = pool[i];
                    let s = sut.find(k);
                    prop_assert_eq!(s.is_some(), model.contains_key(&k));
                    prop_assert_eq!(s, live.get(&k).copied());
                }
                OpI::Mutate(i, d) => {
                    let k = pool[i];
                    if let Some(&h) = live.get(&k) {
                        match h.value_mut(&mut sut) {
                            Some(vr) => *vr = vr.saturating_add(d),
                            None => prop_assert!(false, "live handle should resolve"),
                        }
                        if let Some(mv) = model.get_mut(&k) {
                            *mv = mv.saturating_add(d);
                        }
                        if let Some(tv) = twin.lookup_mut(k) {
                            *tv = tv.saturating_add(d);
                        }
                    }
                }
                OpI::Retain(m) => {
                    let m = m as i32;
                    sut.retain(|_, v| v.rem_euclid(m) != 0);
                    twin.retain(|_, v| v.rem_euclid(m) != 0);
                    model.retain(|_, v| v.rem_euclid(m) != 0);
                    let gone: Vec<i64> = live.keys().copied().filter(|k| !model.contains_key(k)).collect();
                    for k in gone {
                        if let Some(h) = live.remove(&k) {
                            stale.push(h);
                        }
                    }
                }
                OpI::Iterate => {
                    let s_keys: BTreeSet<i64> = sut.iter().map(|(k, _)| k).collect();
                    let m_keys: BTreeSet<i64> = model.keys().copied().collect();
                    prop_assert_eq!(s_keys, m_keys);
                    let h_keys: BTreeSet<i64> = sut.iter_handles().map(|(h, k, _)| {
                        prop_assert_eq!(h.key(&sut), Some(k));
                        Ok(k)
                    }).collect::<Result<_, TestCaseError>>()?;
                    prop_assert_eq!(h_keys.len(), model.len());
                }
            }

            // Post-conditions after each op
            for &h in &stale {
                prop_assert!(h.value(&sut).is_none());
            }
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            prop_assert!(sut == twin, "representations diverged: {:?} vs {:?}", sut, twin);
        }
    }
}

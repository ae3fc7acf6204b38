//! The abstract map layer.
//!
//! `PrimitiveMap` and `PrimitiveMapMut` carry every derived operation
//! (sentinel lookups, the compute family, merge, replace, equality, hashing,
//! rendering, views) as provided methods over a handful of required
//! primitives. A table implementation supplies only lookup, insertion,
//! removal, iteration and `retain`.
//!
//! Two styles of absence signalling coexist:
//! - the Option API (`lookup`, `insert`, `take`, `compute_with`) says "absent"
//!   with `None`;
//! - the sentinel API (`get`, `put`, `remove`, `compute*`, `merge`, ...) is
//!   written on top of it and answers absence with the map's default return
//!   value. A mapping function that produces the default return value removes
//!   the key, so the sentinel is never stored by the compute family.

use core::fmt;
use core::mem;

use crate::error::{ensure_offset_len, MapError};
use crate::primitive::{Key, Value};
use crate::views::{EntrySet, EntrySetMut, KeySet, KeySetMut, Values, ValuesMut};

/// A mutable view of one live entry. The key is fixed; the value can be read
/// and replaced in place.
pub struct EntryMut<'a, K, V> {
    key: K,
    value: &'a mut V,
}

impl<'a, K: Key, V: Value> EntryMut<'a, K, V> {
    pub(crate) fn new(key: K, value: &'a mut V) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> K {
        self.key
    }

    pub fn value(&self) -> &V {
        self.value
    }

    pub fn value_mut(&mut self) -> &mut V {
        self.value
    }

    /// Replaces the value and returns the previous one.
    pub fn set_value(&mut self, value: V) -> V {
        mem::replace(self.value, value)
    }

    pub fn into_value_mut(self) -> &'a mut V {
        self.value
    }
}

impl<'a, K: Key, V: Value> fmt::Debug for EntryMut<'a, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntryMut").field(&self.key).field(&self.value).finish()
    }
}

/// Read side of a primitive-keyed map.
pub trait PrimitiveMap<K: Key, V: Value> {
    /// Iterator over live entries.
    type Iter<'a>: Iterator<Item = (K, &'a V)>
    where
        Self: 'a;

    fn len(&self) -> usize;

    /// The value the sentinel API returns for absent keys.
    fn default_return_value(&self) -> &V;

    /// Option API lookup.
    fn lookup(&self, key: K) -> Option<&V>;

    fn iter(&self) -> Self::Iter<'_>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value for `key`, or the default return value if absent. Use
    /// `contains_key` or `lookup` when the default could also be stored.
    fn get(&self, key: K) -> V {
        match self.lookup(key) {
            Some(v) => v.clone(),
            None => self.default_return_value().clone(),
        }
    }

    fn contains_key(&self, key: K) -> bool {
        self.lookup(key).is_some()
    }

    fn contains_value(&self, value: &V) -> bool {
        self.iter().any(|(_, v)| v.same_as(value))
    }

    /// Value for `key`, or `default` if absent.
    fn get_or_default(&self, key: K, default: V) -> V {
        match self.lookup(key) {
            Some(v) => v.clone(),
            None => default,
        }
    }

    fn for_each<F>(&self, mut action: F)
    where
        F: FnMut(K, &V),
    {
        for (k, v) in self.iter() {
            action(k, v);
        }
    }

    fn key_set(&self) -> KeySet<'_, K, V, Self> {
        KeySet::new(self)
    }

    fn values(&self) -> Values<'_, K, V, Self> {
        Values::new(self)
    }

    fn entry_set(&self) -> EntrySet<'_, K, V, Self> {
        EntrySet::new(self)
    }

    /// Same size and every entry of `self` is an entry of `other`. Since keys
    /// are unique this makes the entry sets equal, whatever the tables look
    /// like internally.
    fn map_eq<M>(&self, other: &M) -> bool
    where
        M: PrimitiveMap<K, V> + ?Sized,
    {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.lookup(k).map_or(false, |o| o.same_as(v)))
    }

    /// Sum of `key.hash_code() ^ value.hash_code()` over all entries.
    fn hash_code(&self) -> i32 {
        self.iter()
            .fold(0i32, |h, (k, v)| h.wrapping_add(k.hash_code() ^ v.hash_code()))
    }

    /// Renders `{k1=v1, k2=v2}`; an empty map renders `{}`.
    fn fmt_entries(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            k.render(f)?;
            f.write_str("=")?;
            v.render(f)?;
        }
        f.write_str("}")
    }
}

/// Write side of a primitive-keyed map.
pub trait PrimitiveMapMut<K: Key, V: Value>: PrimitiveMap<K, V> {
    /// Iterator over live entries with in-place value access.
    type IterMut<'a>: Iterator<Item = EntryMut<'a, K, V>>
    where
        Self: 'a;

    /// Option API insertion: returns the previous value, if any.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Option API removal: returns the removed value, if any.
    fn take(&mut self, key: K) -> Option<V>;

    fn lookup_mut(&mut self, key: K) -> Option<&mut V>;

    fn clear(&mut self);

    fn set_default_return_value(&mut self, value: V);

    fn iter_mut(&mut self) -> Self::IterMut<'_>;

    /// Keeps the entries for which `keep` returns true, in one pass.
    fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(K, &mut V) -> bool;

    /// Maps `key` to `value`; returns the previous value or the default
    /// return value.
    fn put(&mut self, key: K, value: V) -> V {
        match self.insert(key, value) {
            Some(old) => old,
            None => self.default_return_value().clone(),
        }
    }

    /// Removes `key`; returns its value or the default return value.
    fn remove(&mut self, key: K) -> V {
        match self.take(key) {
            Some(old) => old,
            None => self.default_return_value().clone(),
        }
    }

    /// Inserts only if `key` is absent. Returns the current value, or the
    /// default return value if the insertion happened.
    fn put_if_absent(&mut self, key: K, value: V) -> V {
        if let Some(current) = self.lookup(key) {
            return current.clone();
        }
        self.insert(key, value);
        self.default_return_value().clone()
    }

    /// Removes `key` only if it is mapped to `value`.
    fn remove_if_equal(&mut self, key: K, value: &V) -> bool {
        let matches = self.lookup(key).map_or(false, |cur| cur.same_as(value));
        if matches {
            self.take(key);
        }
        matches
    }

    /// Replaces the value of a present key; absent keys stay absent.
    fn replace(&mut self, key: K, value: V) -> V {
        if let Some(slot) = self.lookup_mut(key) {
            return mem::replace(slot, value);
        }
        self.default_return_value().clone()
    }

    /// Replaces the value of `key` only if it is currently `old`.
    fn replace_if_equal(&mut self, key: K, old: &V, value: V) -> bool {
        if let Some(slot) = self.lookup_mut(key) {
            if slot.same_as(old) {
                *slot = value;
                return true;
            }
        }
        false
    }

    /// Option-based core of the compute family. `remap` sees the current
    /// value (or `None`) and decides the new one; `None` removes the key.
    fn compute_with<F>(&mut self, key: K, remap: F) -> Option<V>
    where
        F: FnOnce(K, Option<V>) -> Option<V>,
    {
        let current = self.lookup(key).cloned();
        match remap(key, current) {
            Some(next) => {
                self.insert(key, next.clone());
                Some(next)
            }
            None => {
                self.take(key);
                None
            }
        }
    }

    /// Returns the present value, or computes, stores and returns one. A
    /// computed default return value is not stored.
    fn compute_if_absent<F>(&mut self, key: K, mapping: F) -> V
    where
        F: FnOnce(K) -> V,
    {
        if let Some(current) = self.lookup(key) {
            return current.clone();
        }
        let sentinel = self.default_return_value().clone();
        let next = mapping(key);
        if next.same_as(&sentinel) {
            return sentinel;
        }
        self.insert(key, next.clone());
        next
    }

    /// Remaps a present value. A result equal to the default return value
    /// removes the key.
    fn compute_if_present<F>(&mut self, key: K, remap: F) -> V
    where
        F: FnOnce(K, V) -> V,
    {
        let sentinel = self.default_return_value().clone();
        if !self.contains_key(key) {
            return sentinel;
        }
        self.compute_with(key, |k, current| {
            current
                .map(|v| remap(k, v))
                .filter(|next| !next.same_as(&sentinel))
        })
        .unwrap_or(sentinel)
    }

    /// Remaps the current value, or the default return value if absent. A
    /// result equal to the default return value removes the key.
    fn compute<F>(&mut self, key: K, remap: F) -> V
    where
        F: FnOnce(K, V) -> V,
    {
        let sentinel = self.default_return_value().clone();
        self.compute_with(key, |k, current| {
            let next = remap(k, current.unwrap_or_else(|| sentinel.clone()));
            if next.same_as(&sentinel) {
                None
            } else {
                Some(next)
            }
        })
        .unwrap_or(sentinel)
    }

    /// Stores `value` if `key` is absent, otherwise `remap(old, value)`. A
    /// resulting default return value removes the key.
    fn merge<F>(&mut self, key: K, value: V, remap: F) -> V
    where
        F: FnOnce(V, V) -> V,
    {
        let sentinel = self.default_return_value().clone();
        self.compute_with(key, |_, current| {
            let next = match current {
                Some(old) => remap(old, value),
                None => value,
            };
            if next.same_as(&sentinel) {
                None
            } else {
                Some(next)
            }
        })
        .unwrap_or(sentinel)
    }

    /// Replaces every value with `f(key, value)` in a single pass.
    fn replace_all<F>(&mut self, mut f: F)
    where
        F: FnMut(K, V) -> V,
    {
        for mut entry in self.iter_mut() {
            let next = f(entry.key(), entry.value().clone());
            entry.set_value(next);
        }
    }

    fn put_all<M>(&mut self, other: &M)
    where
        M: PrimitiveMap<K, V> + ?Sized,
    {
        for (k, v) in other.iter() {
            self.insert(k, v.clone());
        }
    }

    /// Inserts `keys[offset..offset + size]` paired with the same range of
    /// `values`. Both ranges are checked before anything is inserted.
    fn put_all_from_slices(
        &mut self,
        keys: &[K],
        values: &[V],
        offset: usize,
        size: usize,
    ) -> Result<(), MapError> {
        let end = ensure_offset_len(keys.len(), offset, size)?;
        ensure_offset_len(values.len(), offset, size)?;
        for (k, v) in keys[offset..end].iter().zip(&values[offset..end]) {
            self.insert(*k, v.clone());
        }
        Ok(())
    }

    fn key_set_mut(&mut self) -> KeySetMut<'_, K, V, Self> {
        KeySetMut::new(self)
    }

    fn values_mut(&mut self) -> ValuesMut<'_, K, V, Self> {
        ValuesMut::new(self)
    }

    fn entry_set_mut(&mut self) -> EntrySetMut<'_, K, V, Self> {
        EntrySetMut::new(self)
    }
}

//! HandleHashMap: primitive-keyed map with stable, generational entry handles.
//!
//! Entries live in a `SlotMap`; a `hashbrown::HashTable` indexes slot keys by
//! the mixed hash of the primitive key. A `Handle` stays valid until its entry
//! is removed, and a stale handle never resolves to a later entry that reuses
//! the slot.

use core::fmt;
use core::hash::{Hash, Hasher};

use hashbrown::hash_table::Entry as TableEntry;
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};

use crate::error::MapError;
use crate::map::{EntryMut, PrimitiveMap, PrimitiveMapMut};
use crate::primitive::{Key, Value};

/// Stable reference to one entry of a `HandleHashMap`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    pub fn key<K: Key, V: Value>(&self, map: &HandleHashMap<K, V>) -> Option<K> {
        map.slots.get(self.0).map(|e| e.key)
    }

    pub fn value<'a, K: Key, V: Value>(&self, map: &'a HandleHashMap<K, V>) -> Option<&'a V> {
        map.slots.get(self.0).map(|e| &e.value)
    }

    pub fn value_mut<'a, K: Key, V: Value>(
        &self,
        map: &'a mut HandleHashMap<K, V>,
    ) -> Option<&'a mut V> {
        map.slots.get_mut(self.0).map(|e| &mut e.value)
    }
}

#[derive(Clone, Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
}

#[derive(Clone)]
pub struct HandleHashMap<K, V> {
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Entry<K, V>>,
    default_return_value: V,
}

impl<K: Key, V: Value> Default for HandleHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over `(key, &value)` in slot order.
pub struct Iter<'a, K, V> {
    it: slotmap::basic::Iter<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K: Key, V: Value> Iterator for Iter<'a, K, V> {
    type Item = (K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

/// Iterator over `(handle, key, &value)` in slot order.
pub struct HandleIter<'a, K, V> {
    it: slotmap::basic::Iter<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K: Key, V: Value> Iterator for HandleIter<'a, K, V> {
    type Item = (Handle, K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(h, e)| (Handle(h), e.key, &e.value))
    }
}

/// Iterator over mutable entries in slot order.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::IterMut<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K: Key, V: Value> Iterator for IterMut<'a, K, V> {
    type Item = EntryMut<'a, K, V>;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it
            .next()
            .map(|(_, e)| EntryMut::new(e.key, &mut e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K: Key, V: Value> HandleHashMap<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashTable::with_capacity(capacity),
            slots: SlotMap::with_capacity(capacity),
            default_return_value: V::natural_default(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn find(&self, key: K) -> Option<Handle> {
        let slots = &self.slots;
        self.index
            .find(key.mix(), |&h| slots.get(h).map_or(false, |e| e.key.same_key(key)))
            .map(|&h| Handle(h))
    }

    pub fn contains_key(&self, key: K) -> bool {
        self.find(key).is_some()
    }

    pub fn lookup(&self, key: K) -> Option<&V> {
        let h = self.find(key)?;
        self.slots.get(h.0).map(|e| &e.value)
    }

    pub fn lookup_mut(&mut self, key: K) -> Option<&mut V> {
        let h = self.find(key)?;
        self.slots.get_mut(h.0).map(|e| &mut e.value)
    }

    /// Inserts or replaces; returns the previous value. A replaced entry
    /// keeps its handle.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = key.mix();
        let slots = &self.slots;
        match self.index.entry(
            hash,
            |&h| slots.get(h).map_or(false, |e| e.key.same_key(key)),
            |&h| slots.get(h).map_or(0, |e| e.hash),
        ) {
            TableEntry::Occupied(o) => {
                let h = *o.get();
                self.slots
                    .get_mut(h)
                    .map(|e| core::mem::replace(&mut e.value, value))
            }
            TableEntry::Vacant(v) => {
                let h = self.slots.insert(Entry { key, value, hash });
                let _ = v.insert(h);
                None
            }
        }
    }

    /// Inserts a new entry; an existing key is left untouched.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Handle, MapError> {
        self.insert_with(key, || value)
    }

    /// Like `try_insert`, but only builds the value once the key is known to
    /// be absent.
    pub fn insert_with<F>(&mut self, key: K, default: F) -> Result<Handle, MapError>
    where
        F: FnOnce() -> V,
    {
        let hash = key.mix();
        let slots = &self.slots;
        match self.index.entry(
            hash,
            |&h| slots.get(h).map_or(false, |e| e.key.same_key(key)),
            |&h| slots.get(h).map_or(0, |e| e.hash),
        ) {
            TableEntry::Occupied(_) => Err(MapError::DuplicateKey),
            TableEntry::Vacant(v) => {
                let value = default();
                let h = self.slots.insert(Entry { key, value, hash });
                let _ = v.insert(h);
                Ok(Handle(h))
            }
        }
    }

    /// Removes the entry behind `handle`. Stale handles return `None`.
    pub fn remove_handle(&mut self, handle: Handle) -> Option<(K, V)> {
        let entry = self.slots.remove(handle.0)?;
        if let Ok(o) = self.index.find_entry(entry.hash, |&h| h == handle.0) {
            o.remove();
        }
        Some((entry.key, entry.value))
    }

    pub fn take(&mut self, key: K) -> Option<V> {
        let h = self.find(key)?;
        self.remove_handle(h).map(|(_, v)| v)
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(K, &mut V) -> bool,
    {
        self.slots.retain(|_, e| keep(e.key, &mut e.value));
        let slots = &self.slots;
        self.index.retain(|h| slots.contains_key(*h));
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
    }

    pub fn default_return_value(&self) -> &V {
        &self.default_return_value
    }

    pub fn set_default_return_value(&mut self, value: V) {
        self.default_return_value = value;
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.slots.iter(),
        }
    }

    pub fn iter_handles(&self) -> HandleIter<'_, K, V> {
        HandleIter {
            it: self.slots.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.slots.iter_mut(),
        }
    }
}

impl<K: Key, V: Value> PrimitiveMap<K, V> for HandleHashMap<K, V> {
    type Iter<'a> = Iter<'a, K, V>
    where
        Self: 'a;

    fn len(&self) -> usize {
        self.slots.len()
    }

    fn default_return_value(&self) -> &V {
        &self.default_return_value
    }

    fn lookup(&self, key: K) -> Option<&V> {
        Self::lookup(self, key)
    }

    fn iter(&self) -> Iter<'_, K, V> {
        Self::iter(self)
    }
}

impl<K: Key, V: Value> PrimitiveMapMut<K, V> for HandleHashMap<K, V> {
    type IterMut<'a> = IterMut<'a, K, V>
    where
        Self: 'a;

    fn insert(&mut self, key: K, value: V) -> Option<V> {
        Self::insert(self, key, value)
    }

    fn take(&mut self, key: K) -> Option<V> {
        Self::take(self, key)
    }

    fn lookup_mut(&mut self, key: K) -> Option<&mut V> {
        Self::lookup_mut(self, key)
    }

    fn clear(&mut self) {
        Self::clear(self)
    }

    fn set_default_return_value(&mut self, value: V) {
        Self::set_default_return_value(self, value)
    }

    fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        Self::iter_mut(self)
    }

    fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(K, &mut V) -> bool,
    {
        Self::retain(self, keep)
    }
}

impl<K: Key, V: Value> fmt::Display for HandleHashMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_entries(f)
    }
}

impl<K: Key, V: Value> fmt::Debug for HandleHashMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Key, V: Value, M: PrimitiveMap<K, V>> PartialEq<M> for HandleHashMap<K, V> {
    fn eq(&self, other: &M) -> bool {
        self.map_eq(other)
    }
}

impl<K: Key, V: Value> Eq for HandleHashMap<K, V> {}

impl<K: Key, V: Value> Hash for HandleHashMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.hash_code());
    }
}

impl<K: Key, V: Value> Extend<(K, V)> for HandleHashMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Key, V: Value> FromIterator<(K, V)> for HandleHashMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

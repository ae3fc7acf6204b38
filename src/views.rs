//! Key, value and entry views.
//!
//! Views borrow the map (`&M` for read views, `&mut M` for mutable ones) and
//! delegate every operation to it. Nothing is copied, so a removal through a
//! view is a removal from the map.

use core::fmt;
use core::marker::PhantomData;

use crate::map::{EntryMut, PrimitiveMap, PrimitiveMapMut};
use crate::primitive::{Key, Value};

fn fmt_list<I, F>(f: &mut fmt::Formatter<'_>, items: I, mut render: F) -> fmt::Result
where
    I: Iterator,
    F: FnMut(I::Item, &mut fmt::Formatter<'_>) -> fmt::Result,
{
    f.write_str("[")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        render(item, f)?;
    }
    f.write_str("]")
}

/// Read-only view of a map's keys.
pub struct KeySet<'a, K, V, M: ?Sized> {
    map: &'a M,
    _pd: PhantomData<(K, V)>,
}

impl<'a, K, V, M> KeySet<'a, K, V, M>
where
    K: Key,
    V: Value,
    M: PrimitiveMap<K, V> + ?Sized,
{
    pub(crate) fn new(map: &'a M) -> Self {
        Self {
            map,
            _pd: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, key: K) -> bool {
        self.map.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = K> + 'a {
        self.map.iter().map(|(k, _)| k)
    }
}

impl<'a, K, V, M> fmt::Display for KeySet<'a, K, V, M>
where
    K: Key,
    V: Value,
    M: PrimitiveMap<K, V> + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_list(f, self.iter(), |k, f| k.render(f))
    }
}

/// Read-only view of a map's values.
pub struct Values<'a, K, V, M: ?Sized> {
    map: &'a M,
    _pd: PhantomData<(K, V)>,
}

impl<'a, K, V, M> Values<'a, K, V, M>
where
    K: Key,
    V: Value,
    M: PrimitiveMap<K, V> + ?Sized,
{
    pub(crate) fn new(map: &'a M) -> Self {
        Self {
            map,
            _pd: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, value: &V) -> bool {
        self.map.contains_value(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a V> + 'a {
        self.map.iter().map(|(_, v)| v)
    }
}

impl<'a, K, V, M> fmt::Display for Values<'a, K, V, M>
where
    K: Key,
    V: Value,
    M: PrimitiveMap<K, V> + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_list(f, self.iter(), |v, f| v.render(f))
    }
}

/// Read-only view of a map's entries.
pub struct EntrySet<'a, K, V, M: ?Sized> {
    map: &'a M,
    _pd: PhantomData<(K, V)>,
}

impl<'a, K, V, M> EntrySet<'a, K, V, M>
where
    K: Key,
    V: Value,
    M: PrimitiveMap<K, V> + ?Sized,
{
    pub(crate) fn new(map: &'a M) -> Self {
        Self {
            map,
            _pd: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Whether `key` is mapped to exactly `value`.
    pub fn contains(&self, key: K, value: &V) -> bool {
        self.map.lookup(key).map_or(false, |v| v.same_as(value))
    }

    pub fn iter(&self) -> M::Iter<'a> {
        self.map.iter()
    }
}

impl<'a, K, V, M> fmt::Display for EntrySet<'a, K, V, M>
where
    K: Key,
    V: Value,
    M: PrimitiveMap<K, V> + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_list(f, self.iter(), |(k, v), f| {
            k.render(f)?;
            f.write_str("=")?;
            v.render(f)
        })
    }
}

/// Key view that can remove from the backing map.
pub struct KeySetMut<'a, K, V, M: ?Sized> {
    map: &'a mut M,
    _pd: PhantomData<(K, V)>,
}

impl<'a, K, V, M> KeySetMut<'a, K, V, M>
where
    K: Key,
    V: Value,
    M: PrimitiveMapMut<K, V> + ?Sized,
{
    pub(crate) fn new(map: &'a mut M) -> Self {
        Self {
            map,
            _pd: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, key: K) -> bool {
        self.map.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.map.iter().map(|(k, _)| k)
    }

    /// Removes `key` and its value from the map.
    pub fn remove(&mut self, key: K) -> bool {
        self.map.take(key).is_some()
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(K) -> bool,
    {
        self.map.retain(|k, _| keep(k));
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

/// Value view that can remove from and update the backing map.
pub struct ValuesMut<'a, K, V, M: ?Sized> {
    map: &'a mut M,
    _pd: PhantomData<(K, V)>,
}

impl<'a, K, V, M> ValuesMut<'a, K, V, M>
where
    K: Key,
    V: Value,
    M: PrimitiveMapMut<K, V> + ?Sized,
{
    pub(crate) fn new(map: &'a mut M) -> Self {
        Self {
            map,
            _pd: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, value: &V) -> bool {
        self.map.contains_value(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &V> + '_ {
        self.map.iter().map(|(_, v)| v)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.map.iter_mut().map(EntryMut::into_value_mut)
    }

    /// Removes the first entry, in iteration order, whose value is `value`.
    pub fn remove(&mut self, value: &V) -> bool {
        let key = self
            .map
            .iter()
            .find(|(_, v)| v.same_as(value))
            .map(|(k, _)| k);
        match key {
            Some(k) => self.map.take(k).is_some(),
            None => false,
        }
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&V) -> bool,
    {
        self.map.retain(|_, v| keep(v));
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

/// Entry view that can remove from and update the backing map.
pub struct EntrySetMut<'a, K, V, M: ?Sized> {
    map: &'a mut M,
    _pd: PhantomData<(K, V)>,
}

impl<'a, K, V, M> EntrySetMut<'a, K, V, M>
where
    K: Key,
    V: Value,
    M: PrimitiveMapMut<K, V> + ?Sized,
{
    pub(crate) fn new(map: &'a mut M) -> Self {
        Self {
            map,
            _pd: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, key: K, value: &V) -> bool {
        self.map.lookup(key).map_or(false, |v| v.same_as(value))
    }

    pub fn iter(&self) -> M::Iter<'_> {
        self.map.iter()
    }

    pub fn iter_mut(&mut self) -> M::IterMut<'_> {
        self.map.iter_mut()
    }

    /// Removes the entry only if `key` is mapped to exactly `value`.
    pub fn remove(&mut self, key: K, value: &V) -> bool {
        self.map.remove_if_equal(key, value)
    }

    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(K, &mut V) -> bool,
    {
        self.map.retain(keep);
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

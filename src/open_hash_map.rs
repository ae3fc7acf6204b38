//! OpenHashMap: open-addressing table with linear probing.
//!
//! Layout
//! - `keys`/`values` have `n + 1` slots, `n` a power of two. Slots `0..n` form
//!   the probe table; a key with the all-zero bit pattern marks an empty slot.
//! - The key that *is* all zeroes lives out of line in slot `n`, flagged by
//!   `contains_zero_key`.
//!
//! Probing and sizing
//! - Home slot is `mix(key) & (n - 1)`; collisions probe `+1` with wrap.
//! - The table doubles once `len` exceeds `max_fill = min(ceil(n * f), n - 1)`,
//!   so at least one slot is always empty and every probe terminates.
//! - Removal uses backward-shift deletion: the run after the freed slot is
//!   compacted, no tombstones are left behind. A removal that leaves the table
//!   under a quarter of `max_fill` halves it (never below the configured
//!   size).
//!
//! Fail-fast iteration
//! - `mod_count` changes on every structural modification. A `Cursor`
//!   remembers the count it expects and reports
//!   `MapError::ConcurrentModification` if someone else changed the table.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::{FusedIterator, Rev, Zip};
use core::mem;
use core::slice;

use crate::config::{self, MapConfig, DEFAULT_INITIAL_SIZE};
use crate::error::MapError;
use crate::map::{EntryMut, PrimitiveMap, PrimitiveMapMut};
use crate::primitive::{Key, Numeric, Value};

#[inline(always)]
fn take_value<V: Value>(slot: &mut V) -> V {
    mem::replace(slot, V::natural_default())
}

fn fresh_values<V: Value>(len: usize) -> Box<[V]> {
    (0..len).map(|_| V::natural_default()).collect()
}

/// Primitive-keyed hash map with open addressing and a default return value.
#[derive(Clone)]
pub struct OpenHashMap<K, V> {
    keys: Box<[K]>,
    values: Box<[V]>,
    /// Probe table size; also the index of the zero-key slot.
    n: usize,
    mask: usize,
    /// Size below which removals never shrink the table.
    min_n: usize,
    max_fill: usize,
    load_factor: f32,
    contains_zero_key: bool,
    len: usize,
    default_return_value: V,
    mod_count: u64,
}

impl<K: Key, V: Value> OpenHashMap<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_SIZE)
    }

    /// Map sized to hold `expected` elements under the default load factor.
    ///
    /// # Panics
    ///
    /// Panics if the table size overflows, like `Vec::with_capacity`. Use
    /// `with_config` to get the error instead.
    pub fn with_capacity(expected: usize) -> Self {
        match Self::with_config(MapConfig::new().with_expected(expected)) {
            Ok(map) => map,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn with_config(config: MapConfig) -> Result<Self, MapError> {
        let n = config.table_size()?;
        Ok(Self::allocate(n, config.load_factor))
    }

    /// Builds a map from parallel key and value slices. Later duplicates win.
    pub fn from_slices(keys: &[K], values: &[V]) -> Result<Self, MapError> {
        if keys.len() != values.len() {
            return Err(MapError::LengthMismatch {
                keys: keys.len(),
                values: values.len(),
            });
        }
        let mut map = Self::with_config(MapConfig::new().with_expected(keys.len()))?;
        map.put_all_from_slices(keys, values, 0, keys.len())?;
        Ok(map)
    }

    fn allocate(n: usize, load_factor: f32) -> Self {
        Self {
            keys: vec![K::ZERO; n + 1].into_boxed_slice(),
            values: fresh_values(n + 1),
            n,
            mask: n - 1,
            min_n: n,
            max_fill: config::max_fill(n, load_factor),
            load_factor,
            contains_zero_key: false,
            len: 0,
            default_return_value: V::natural_default(),
            mod_count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of probe slots currently allocated.
    pub fn capacity(&self) -> usize {
        self.n
    }

    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    #[inline(always)]
    fn home(&self, key: K) -> usize {
        (key.mix() as usize) & self.mask
    }

    fn find_pos(&self, key: K) -> Option<usize> {
        if key.is_zero() {
            return if self.contains_zero_key { Some(self.n) } else { None };
        }
        let mut pos = self.home(key);
        loop {
            let cur = self.keys[pos];
            if cur.is_zero() {
                return None;
            }
            if cur.same_key(key) {
                return Some(pos);
            }
            pos = (pos + 1) & self.mask;
        }
    }

    /// `Ok(pos)` of the live entry for `key`, or `Err(pos)` of the slot it
    /// would be inserted into.
    fn find_insert_pos(&self, key: K) -> Result<usize, usize> {
        if key.is_zero() {
            return if self.contains_zero_key { Ok(self.n) } else { Err(self.n) };
        }
        let mut pos = self.home(key);
        loop {
            let cur = self.keys[pos];
            if cur.is_zero() {
                return Err(pos);
            }
            if cur.same_key(key) {
                return Ok(pos);
            }
            pos = (pos + 1) & self.mask;
        }
    }

    fn insert_at(&mut self, pos: usize, key: K, value: V) {
        if pos == self.n {
            self.contains_zero_key = true;
        } else {
            self.keys[pos] = key;
        }
        self.values[pos] = value;
        self.len += 1;
        self.mod_count += 1;
        if self.len > self.max_fill {
            let target = config::array_size_saturating(self.len + 1, self.load_factor);
            self.rehash(target);
        }
    }

    pub fn lookup(&self, key: K) -> Option<&V> {
        self.find_pos(key).map(|pos| &self.values[pos])
    }

    pub fn lookup_mut(&mut self, key: K) -> Option<&mut V> {
        let pos = self.find_pos(key)?;
        Some(&mut self.values[pos])
    }

    pub fn contains_key(&self, key: K) -> bool {
        self.find_pos(key).is_some()
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.find_insert_pos(key) {
            Ok(pos) => Some(mem::replace(&mut self.values[pos], value)),
            Err(pos) => {
                self.insert_at(pos, key, value);
                None
            }
        }
    }

    /// Inserts only if `key` is absent.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<(), MapError> {
        match self.find_insert_pos(key) {
            Ok(_) => Err(MapError::DuplicateKey),
            Err(pos) => {
                self.insert_at(pos, key, value);
                Ok(())
            }
        }
    }

    pub fn take(&mut self, key: K) -> Option<V> {
        let pos = self.find_pos(key)?;
        let old = self.remove_at(pos, &mut None);
        self.maybe_shrink();
        Some(old)
    }

    /// Removes the entry in `pos` without resizing. Keys that backward shift
    /// moves from the wrapped-around start of the table to a higher slot are
    /// pushed to `wrapped`, for iterators scanning downward.
    fn remove_at(&mut self, pos: usize, wrapped: &mut Option<&mut Vec<K>>) -> V {
        self.len -= 1;
        self.mod_count += 1;
        if pos == self.n {
            self.contains_zero_key = false;
            return take_value(&mut self.values[pos]);
        }
        let old = take_value(&mut self.values[pos]);
        self.shift_keys(pos, wrapped);
        old
    }

    fn shift_keys(&mut self, mut pos: usize, wrapped: &mut Option<&mut Vec<K>>) {
        loop {
            let last = pos;
            pos = (pos + 1) & self.mask;
            let key = loop {
                let cur = self.keys[pos];
                if cur.is_zero() {
                    self.keys[last] = K::ZERO;
                    return;
                }
                let slot = self.home(cur);
                // `cur` may move to `last` only if `last` lies cyclically
                // within [slot, pos).
                let movable = if last <= pos {
                    last >= slot || slot > pos
                } else {
                    last >= slot && slot > pos
                };
                if movable {
                    break cur;
                }
                pos = (pos + 1) & self.mask;
            };
            if pos < last {
                if let Some(w) = wrapped.as_mut() {
                    w.push(key);
                }
            }
            self.keys[last] = key;
            let moved = take_value(&mut self.values[pos]);
            self.values[last] = moved;
        }
    }

    /// Halves the table while it is under a quarter full, stopping at the
    /// configured size. One step after a single removal; several after
    /// `retain`, collapsed into one rehash.
    fn maybe_shrink(&mut self) {
        let mut target = self.n;
        while target > self.min_n
            && target > DEFAULT_INITIAL_SIZE
            && self.len < config::max_fill(target, self.load_factor) / 4
        {
            target /= 2;
        }
        if target < self.n {
            self.rehash(target);
        }
    }

    /// Moves every entry into a fresh table of `new_n` probe slots.
    fn rehash(&mut self, new_n: usize) {
        log::trace!(
            "rehashing open hash map: {} -> {} slots ({} entries)",
            self.n,
            new_n,
            self.len
        );
        let mask = new_n - 1;
        let mut keys = vec![K::ZERO; new_n + 1].into_boxed_slice();
        let mut values: Box<[V]> = fresh_values(new_n + 1);
        values[new_n] = take_value(&mut self.values[self.n]);
        for i in 0..self.n {
            let k = self.keys[i];
            if k.is_zero() {
                continue;
            }
            let mut pos = (k.mix() as usize) & mask;
            while !keys[pos].is_zero() {
                pos = (pos + 1) & mask;
            }
            keys[pos] = k;
            values[pos] = take_value(&mut self.values[i]);
        }
        self.keys = keys;
        self.values = values;
        self.n = new_n;
        self.mask = mask;
        self.max_fill = config::max_fill(new_n, self.load_factor);
        self.mod_count += 1;
    }

    pub fn clear(&mut self) {
        if self.len == 0 {
            return;
        }
        self.len = 0;
        self.contains_zero_key = false;
        self.keys.fill(K::ZERO);
        for v in self.values.iter_mut() {
            *v = V::natural_default();
        }
        self.mod_count += 1;
    }

    /// Grows the table, if needed, so `capacity` elements fit without
    /// another rehash.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        let needed = config::array_size_saturating(capacity, self.load_factor);
        if needed > self.n {
            self.rehash(needed);
        }
    }

    /// Shrinks the table to the smallest size that holds the current entries.
    pub fn trim(&mut self) -> bool {
        self.trim_to(self.len)
    }

    /// Shrinks the table to the smallest size that holds `expected`
    /// elements, if that is smaller than the current one and the current
    /// entries still fit. Always returns true; the table is left as is when
    /// there is nothing to do.
    pub fn trim_to(&mut self, expected: usize) -> bool {
        let target = config::array_size_saturating(expected, self.load_factor);
        if target >= self.n || self.len > config::max_fill(target, self.load_factor) {
            return true;
        }
        log::debug!("trimming open hash map from {} to {} slots", self.n, target);
        self.rehash(target);
        self.min_n = self.min_n.min(target);
        true
    }

    pub fn default_return_value(&self) -> &V {
        &self.default_return_value
    }

    pub fn set_default_return_value(&mut self, value: V) {
        self.default_return_value = value;
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(K, &mut V) -> bool,
    {
        if self.contains_zero_key && !keep(K::ZERO, &mut self.values[self.n]) {
            self.remove_at(self.n, &mut None);
        }
        let mut wrapped = Vec::new();
        let mut pos = self.n;
        while pos > 0 {
            pos -= 1;
            let k = self.keys[pos];
            if k.is_zero() {
                continue;
            }
            if !keep(k, &mut self.values[pos]) {
                self.remove_at(pos, &mut Some(&mut wrapped));
            }
        }
        for k in wrapped {
            if let Some(pos) = self.find_pos(k) {
                if !keep(k, &mut self.values[pos]) {
                    self.remove_at(pos, &mut None);
                }
            }
        }
        self.maybe_shrink();
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        let (main_values, zero_value) = self.values.split_at(self.n);
        let zero = if self.contains_zero_key {
            zero_value.first()
        } else {
            None
        };
        Iter {
            zero,
            table: self.keys[..self.n].iter().zip(main_values.iter()).rev(),
            remaining: self.len,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let (main_values, zero_value) = self.values.split_at_mut(self.n);
        let zero = if self.contains_zero_key {
            zero_value.first_mut()
        } else {
            None
        };
        IterMut {
            zero,
            table: self.keys[..self.n].iter().zip(main_values.iter_mut()).rev(),
            remaining: self.len,
        }
    }

    /// Starts a detached cursor positioned before the first entry.
    pub fn cursor(&self) -> Cursor<K> {
        Cursor {
            expected_mod_count: self.mod_count,
            table_size: self.n,
            zero_pending: true,
            pos: self.n,
            wrapped: Vec::new(),
            wrapped_next: 0,
            last: None,
        }
    }
}

impl<K: Key, V: Numeric> OpenHashMap<K, V> {
    /// Adds `increment` to the value of `key`. An absent key starts from the
    /// default return value. Returns the previous value or the default return
    /// value.
    pub fn add_to(&mut self, key: K, increment: V) -> V {
        match self.find_insert_pos(key) {
            Ok(pos) => {
                let old = self.values[pos];
                self.values[pos] = old.accumulate(increment);
                old
            }
            Err(pos) => {
                let start = self.default_return_value;
                self.insert_at(pos, key, start.accumulate(increment));
                start
            }
        }
    }
}

impl<K: Key, V: Value> Default for OpenHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, V: Value> PrimitiveMap<K, V> for OpenHashMap<K, V> {
    type Iter<'a> = Iter<'a, K, V>
    where
        Self: 'a;

    fn len(&self) -> usize {
        self.len
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

    fn contains_key(&self, key: K) -> bool {
        Self::contains_key(self, key)
    }
}

impl<K: Key, V: Value> PrimitiveMapMut<K, V> for OpenHashMap<K, V> {
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

    fn put_all_from_slices(
        &mut self,
        keys: &[K],
        values: &[V],
        offset: usize,
        size: usize,
    ) -> Result<(), MapError> {
        let end = crate::error::ensure_offset_len(keys.len(), offset, size)?;
        crate::error::ensure_offset_len(values.len(), offset, size)?;
        self.ensure_capacity(self.len + size);
        for (k, v) in keys[offset..end].iter().zip(&values[offset..end]) {
            Self::insert(self, *k, v.clone());
        }
        Ok(())
    }
}

impl<K: Key, V: Value> fmt::Display for OpenHashMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_entries(f)
    }
}

impl<K: Key, V: Value> fmt::Debug for OpenHashMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Key, V: Value, M: PrimitiveMap<K, V>> PartialEq<M> for OpenHashMap<K, V> {
    fn eq(&self, other: &M) -> bool {
        self.map_eq(other)
    }
}

impl<K: Key, V: Value> Eq for OpenHashMap<K, V> {}

impl<K: Key, V: Value> Hash for OpenHashMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.hash_code());
    }
}

impl<K: Key, V: Value> Extend<(K, V)> for OpenHashMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.ensure_capacity(self.len + lower);
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Key, V: Value> FromIterator<(K, V)> for OpenHashMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

/// Borrowing iterator. Yields the zero key first, then the table from the
/// highest slot down.
pub struct Iter<'a, K, V> {
    zero: Option<&'a V>,
    table: Rev<Zip<slice::Iter<'a, K>, slice::Iter<'a, V>>>,
    remaining: usize,
}

impl<'a, K: Key, V: Value> Iterator for Iter<'a, K, V> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        if let Some(v) = self.zero.take() {
            self.remaining -= 1;
            return Some((K::ZERO, v));
        }
        for (k, v) in self.table.by_ref() {
            if !k.is_zero() {
                self.remaining -= 1;
                return Some((*k, v));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: Key, V: Value> ExactSizeIterator for Iter<'a, K, V> {}
impl<'a, K: Key, V: Value> FusedIterator for Iter<'a, K, V> {}

/// Mutably borrowing iterator yielding entry views.
pub struct IterMut<'a, K, V> {
    zero: Option<&'a mut V>,
    table: Rev<Zip<slice::Iter<'a, K>, slice::IterMut<'a, V>>>,
    remaining: usize,
}

impl<'a, K: Key, V: Value> Iterator for IterMut<'a, K, V> {
    type Item = EntryMut<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        if let Some(v) = self.zero.take() {
            self.remaining -= 1;
            return Some(EntryMut::new(K::ZERO, v));
        }
        for (k, v) in self.table.by_ref() {
            if !k.is_zero() {
                self.remaining -= 1;
                return Some(EntryMut::new(*k, v));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: Key, V: Value> ExactSizeIterator for IterMut<'a, K, V> {}
impl<'a, K: Key, V: Value> FusedIterator for IterMut<'a, K, V> {}

/// Owning iterator.
pub struct IntoIter<K, V> {
    zero: Option<V>,
    table: Rev<Zip<std::vec::IntoIter<K>, std::vec::IntoIter<V>>>,
    remaining: usize,
}

impl<K: Key, V: Value> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        if let Some(v) = self.zero.take() {
            self.remaining -= 1;
            return Some((K::ZERO, v));
        }
        for (k, v) in self.table.by_ref() {
            if !k.is_zero() {
                self.remaining -= 1;
                return Some((k, v));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Key, V: Value> ExactSizeIterator for IntoIter<K, V> {}

impl<K: Key, V: Value> IntoIterator for OpenHashMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        let n = self.n;
        let mut keys = self.keys.into_vec();
        let mut values = self.values.into_vec();
        keys.truncate(n);
        let zero_value = values.pop();
        IntoIter {
            zero: if self.contains_zero_key { zero_value } else { None },
            table: keys.into_iter().zip(values).rev(),
            remaining: self.len,
        }
    }
}

impl<'a, K: Key, V: Value> IntoIterator for &'a OpenHashMap<K, V> {
    type Item = (K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K: Key, V: Value> IntoIterator for &'a mut OpenHashMap<K, V> {
    type Item = EntryMut<'a, K, V>;
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

#[derive(Copy, Clone, Debug)]
enum LastReturned<K> {
    Slot(usize),
    Wrapped(K),
}

/// Detached, fail-fast cursor over an `OpenHashMap`.
///
/// The cursor does not borrow the map; each step takes the map explicitly,
/// so the map may be touched between steps. Any structural change not made
/// through `Cursor::remove` makes the next step fail with
/// `MapError::ConcurrentModification`.
#[derive(Clone, Debug)]
pub struct Cursor<K> {
    expected_mod_count: u64,
    table_size: usize,
    zero_pending: bool,
    /// Next table slot to examine is `pos - 1`.
    pos: usize,
    /// Keys moved past the scan position by backward shifts.
    wrapped: Vec<K>,
    wrapped_next: usize,
    last: Option<LastReturned<K>>,
}

impl<K: Key> Cursor<K> {
    fn check<V: Value>(&self, map: &OpenHashMap<K, V>) -> Result<(), MapError> {
        if map.mod_count != self.expected_mod_count || map.n != self.table_size {
            return Err(MapError::ConcurrentModification);
        }
        Ok(())
    }

    /// Advances to the next entry and returns a copy of it, or `None` once
    /// every entry has been visited.
    pub fn next<V: Value>(&mut self, map: &OpenHashMap<K, V>) -> Result<Option<(K, V)>, MapError> {
        self.check(map)?;
        if self.zero_pending {
            self.zero_pending = false;
            if map.contains_zero_key {
                self.last = Some(LastReturned::Slot(map.n));
                return Ok(Some((K::ZERO, map.values[map.n].clone())));
            }
        }
        while self.pos > 0 {
            self.pos -= 1;
            let k = map.keys[self.pos];
            if !k.is_zero() {
                self.last = Some(LastReturned::Slot(self.pos));
                return Ok(Some((k, map.values[self.pos].clone())));
            }
        }
        if self.wrapped_next < self.wrapped.len() {
            let k = self.wrapped[self.wrapped_next];
            self.wrapped_next += 1;
            let pos = map.find_pos(k).ok_or(MapError::ConcurrentModification)?;
            self.last = Some(LastReturned::Wrapped(k));
            return Ok(Some((k, map.values[pos].clone())));
        }
        self.last = None;
        Ok(None)
    }

    /// Removes the entry most recently returned by `next`.
    ///
    /// The table never shrinks here, since a resize would invalidate the
    /// cursor; the next `take` or `retain` shrinks it if it is sparse.
    pub fn remove<V: Value>(&mut self, map: &mut OpenHashMap<K, V>) -> Result<V, MapError> {
        self.check(map)?;
        let last = self
            .last
            .take()
            .ok_or(MapError::IllegalState("remove called without a current entry"))?;
        let old = match last {
            LastReturned::Slot(pos) => map.remove_at(pos, &mut Some(&mut self.wrapped)),
            LastReturned::Wrapped(k) => {
                let pos = map.find_pos(k).ok_or(MapError::ConcurrentModification)?;
                map.remove_at(pos, &mut None)
            }
        };
        self.expected_mod_count = map.mod_count;
        Ok(old)
    }
}

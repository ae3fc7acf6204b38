//! Read-only wrapper.
//!
//! `Unmodifiable<M>` implements `PrimitiveMap` but not `PrimitiveMapMut`, so
//! every mutating operation is rejected by the type checker instead of failing
//! at run time.

use core::fmt;
use core::hash::{Hash, Hasher};

use crate::map::PrimitiveMap;
use crate::primitive::{Key, Value};

/// A map that only exposes the read side of `M`.
#[derive(Clone)]
pub struct Unmodifiable<M> {
    inner: M,
}

impl<M> Unmodifiable<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &M {
        &self.inner
    }

    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<K, V, M> PrimitiveMap<K, V> for Unmodifiable<M>
where
    K: Key,
    V: Value,
    M: PrimitiveMap<K, V>,
{
    type Iter<'a> = M::Iter<'a>
    where
        Self: 'a;

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn default_return_value(&self) -> &V {
        self.inner.default_return_value()
    }

    fn lookup(&self, key: K) -> Option<&V> {
        self.inner.lookup(key)
    }

    fn iter(&self) -> M::Iter<'_> {
        self.inner.iter()
    }

    fn contains_key(&self, key: K) -> bool {
        self.inner.contains_key(key)
    }
}

impl<M: fmt::Display> fmt::Display for Unmodifiable<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl<M: fmt::Debug> fmt::Debug for Unmodifiable<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Unmodifiable").field(&self.inner).finish()
    }
}

impl<M: PartialEq<O>, O> PartialEq<O> for Unmodifiable<M> {
    fn eq(&self, other: &O) -> bool {
        self.inner == *other
    }
}

impl<M: Eq> Eq for Unmodifiable<M> where Unmodifiable<M>: PartialEq {}

impl<M: Hash> Hash for Unmodifiable<M> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state)
    }
}

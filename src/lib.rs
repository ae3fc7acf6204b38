//! primitive-hashmap: hash maps keyed by primitive values, with a
//! configurable default return value standing in for "absent".
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one generic implementation in place of a family of per-type map
//!   classes. Key and value types are plugged in through the sealed `Key`
//!   trait and the open `Value` trait.
//! - Layers:
//!   - `primitive`: key identity (bitwise), hash mixing, Java-compatible
//!     hash codes and rendering for each primitive.
//!   - `map`: `PrimitiveMap` / `PrimitiveMapMut`. A table supplies lookup,
//!     insertion, removal, iteration and `retain`; every derived operation
//!     (compute family, merge, replace, equality, hash code, rendering,
//!     views) is a provided method on top.
//!   - `views`: key, value and entry views borrowing the map.
//!   - `OpenHashMap`: open addressing with linear probing over parallel key
//!     and value arrays.
//!   - `HandleHashMap`: a `hashbrown` index over `slotmap` storage, for
//!     callers that want stable entry handles.
//!   - `Unmodifiable`: read-only wrapper.
//!
//! Constraints
//! - Keys compare by bit pattern. For floats this makes `-0.0` and `0.0`
//!   distinct keys and lets `NaN` find itself.
//! - Hash codes and rendering match the Java collections the API mirrors, so
//!   two maps with equal entries have equal hash codes whatever their
//!   representation.
//! - Every fallible operation validates before mutating; an `Err` leaves the
//!   map untouched.
//!
//! Absence: Option API vs sentinel API
//! - `lookup`, `insert`, `take` and `compute_with` report absence with
//!   `None`.
//! - `get`, `put`, `remove`, `compute*` and `merge` report absence with the
//!   map's default return value. In the compute family a result equal to the
//!   default return value means "remove", so the sentinel is never stored
//!   there; `put` stores whatever it is given.
//!
//! OpenHashMap layout
//! - `n` probe slots (a power of two) plus one extra slot for the key whose
//!   bits are all zero, since an all-zero key marks an empty slot.
//! - Resize: doubles once the fill exceeds `min(ceil(n * f), n - 1)`, so a
//!   free slot always exists and probing terminates. Halves after removals
//!   leave it under a quarter of that, but never below its configured size.
//! - Deletion: backward shift, no tombstones.
//!
//! Iteration and modification
//! - Borrowing iterators make modification during iteration impossible.
//! - `Cursor` is detached from the borrow checker and fails fast instead:
//!   a structural change it did not make itself yields
//!   `MapError::ConcurrentModification`.
//!
//! Notes and non-goals
//! - Not thread-safe; wrap in a lock to share.
//! - Mutation of an `Unmodifiable` map and null arguments are not run-time
//!   errors here: neither compiles.

pub mod config;
pub mod error;
pub mod handle_hash_map;
mod handle_hash_map_proptest;
pub mod map;
pub mod open_hash_map;
mod open_hash_map_proptest;
pub mod primitive;
pub mod unmodifiable;
pub mod views;

// Public surface
pub use config::MapConfig;
pub use error::MapError;
pub use handle_hash_map::{Handle, HandleHashMap};
pub use map::{EntryMut, PrimitiveMap, PrimitiveMapMut};
pub use open_hash_map::{Cursor, OpenHashMap};
pub use primitive::{Key, Numeric, Value};
pub use unmodifiable::Unmodifiable;

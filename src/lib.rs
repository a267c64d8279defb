//! smap: an insertion-ordered map whose keys compare by SameValueZero, plus
//! derived bulk operations (filter, reject, merge, fetch, invert).
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a map whose key identity handles NaN and signed zero the way a
//!   dynamic host language does, with the bulk helpers layered on a small,
//!   precise core.
//! - Layers:
//!   - EntryList<K, V, S>: structural layer. Generational slots threaded
//!     into a doubly linked insertion order, with a hash index over
//!     canonicalised key hashes. Carries a debug-only reentrancy guard.
//!   - SMap<K, V, S>: the public container. get/set/has/delete/len/clear,
//!     snapshots (`keys`, `values`, `items`, `snapshot`), and the two
//!     traversal primitives `for_each` (borrowing) and `iterate`
//!     (snapshotting, callback may mutate).
//!   - Derived operations (`ops`): filter, reject, merge, fetch, invert,
//!     is_empty. They use only the SMap contract above.
//!   - Host layer (`value`, `host`, `shim`): a dynamic `Value` type, untyped
//!     operations that validate their arguments at run time, and
//!     conditional installation into a host environment.
//!
//! Key identity
//! - `SameValueZero`: equal primitives are equal, NaN equals NaN (whatever
//!   the payload), and +0 equals -0. Hashing canonicalises NaN and zero so
//!   the hash index agrees with equality.
//! - `Value` reference variants (arrays, objects, functions, maps) compare
//!   by identity.
//!
//! Ordering
//! - Iteration order is first-insertion order. `set` on an existing key
//!   overwrites in place; `delete` followed by `set` appends.
//!
//! Traversal stability
//! - `iter`/`for_each` borrow the map, so it cannot change underneath them.
//! - `iterate`, `snapshot` and every host-layer callback run over a copy
//!   taken when the call starts; callbacks may mutate the map freely.
//!
//! Reentrancy policy
//! - `SameValueZero` impls are user code and run while EntryList is
//!   probing or linking. Re-entering the same list from there panics in
//!   debug builds. Upper layers hold no guard of their own.
//!
//! Notes and non-goals
//! - Single-threaded: `Value` is built on `Rc`, and the reentrancy guard
//!   makes every map `!Sync`.
//! - No persistence or I/O.

mod entry_list;
mod error;
pub mod host;
mod map;
mod ops;
mod reentrancy;
mod same_value;
pub mod shim;
mod value;

mod entry_list_proptest;

#[cfg(feature = "bench_internal")]
pub use entry_list::{EntryList, Handle, Upsert};

// Public surface
pub use error::{Error, Result};
pub use map::{Iter, SMap, Snapshot};
pub use same_value::SameValueZero;
pub use value::{Function, MapRef, Value};

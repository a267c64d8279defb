//! Derived bulk operations.
//!
//! Everything here goes through the public contract of [`SMap`]
//! (`iter`, `iterate`, `get`, `has`, `set`, `delete`). Nothing reaches into
//! the entry list.

use crate::map::SMap;
use crate::same_value::SameValueZero;
use core::borrow::Borrow;
use core::hash::BuildHasher;
use tracing::trace;

impl<K, V, S> SMap<K, V, S>
where
    K: SameValueZero,
    S: BuildHasher,
{
    /// True iff the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value at `key`, or `default` when the key is absent.
    ///
    /// Without a default, use [`get`](SMap::get).
    pub fn fetch<'a, Q>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: ?Sized + SameValueZero,
    {
        self.get(key).unwrap_or(default)
    }

    pub fn fetch_or_else<Q, F>(&self, key: &Q, default: F) -> V
    where
        K: Borrow<Q>,
        Q: ?Sized + SameValueZero,
        V: Clone,
        F: FnOnce() -> V,
    {
        match self.get(key) {
            Some(v) => v.clone(),
            None => default(),
        }
    }
}

impl<K, V, S> SMap<K, V, S>
where
    K: SameValueZero + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn empty_like<K2, V2>(&self) -> SMap<K2, V2, S>
    where
        K2: SameValueZero,
    {
        SMap::with_hasher(self.hasher().clone())
    }

    /// New map holding the entries for which `pred(key, value)` holds, in
    /// their original relative order. `self` is not modified.
    pub fn filter<F>(&self, mut pred: F) -> Self
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.filter_indexed(|k, v, _| pred(k, v))
    }

    /// Like [`filter`](SMap::filter), with the entry's ordinal as a third
    /// argument.
    pub fn filter_indexed<F>(&self, mut pred: F) -> Self
    where
        F: FnMut(&K, &V, usize) -> bool,
    {
        let mut out = self.empty_like();
        for (i, (k, v)) in self.iter().enumerate() {
            if pred(k, v, i) {
                out.set(k.clone(), v.clone());
            }
        }
        trace!(from = self.len(), kept = out.len(), "filter");
        out
    }

    /// Deletes from `self` every entry for which `pred(key, value)` holds.
    pub fn reject<F>(&mut self, mut pred: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.reject_indexed(|k, v, _| pred(k, v))
    }

    /// Like [`reject`](SMap::reject), with the entry's ordinal (counted over
    /// the entries present when the call started) as a third argument.
    pub fn reject_indexed<F>(&mut self, mut pred: F)
    where
        F: FnMut(&K, &V, usize) -> bool,
    {
        let before = self.len();
        self.iterate(|map, k, v, i| {
            if pred(k, v, i) {
                map.delete(k);
            }
        });
        trace!(from = before, left = self.len(), "reject");
    }

    /// New map with every entry of `self` followed by every entry of
    /// `other`. On a shared key `other`'s value wins; the key keeps the
    /// position it had in `self`.
    pub fn merge(&self, other: &Self) -> Self {
        let mut out = self.empty_like();
        for (k, v) in self.iter().chain(other.iter()) {
            out.set(k.clone(), v.clone());
        }
        trace!(left = self.len(), right = other.len(), merged = out.len(), "merge");
        out
    }

    /// Sets every entry of `other` into `self`.
    pub fn merge_in_place(&mut self, other: &Self) {
        for (k, v) in other.iter() {
            self.set(k.clone(), v.clone());
        }
    }

    /// New map from values to keys. When several keys share a value (by
    /// SameValueZero) the last one in iteration order wins.
    pub fn invert(&self) -> SMap<V, K, S>
    where
        V: SameValueZero,
    {
        let mut out = self.empty_like();
        for (k, v) in self.iter() {
            out.set(v.clone(), k.clone());
        }
        trace!(from = self.len(), to = out.len(), "invert");
        out
    }
}

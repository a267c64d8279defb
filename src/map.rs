//! SMap: the public container. Wraps `EntryList` and exposes the
//! get/set/has/delete contract, snapshots, and the iteration primitives the
//! derived operations are built on.

use crate::entry_list::{self, EntryList, Upsert};
use crate::same_value::SameValueZero;
use core::borrow::Borrow;
use core::fmt;
use core::hash::BuildHasher;
use std::collections::hash_map::RandomState;

/// An insertion-ordered map whose keys are compared by SameValueZero.
///
/// Overwriting a key keeps its position; deleting and re-setting it moves it
/// to the end.
///
/// ```
/// use smap::SMap;
///
/// let mut m = SMap::new();
/// m.set(f64::NAN, "nan");
/// m.set(-0.0, "zero");
/// assert_eq!(m.get(&f64::NAN), Some(&"nan"));
/// assert_eq!(m.get(&0.0), Some(&"zero"));
/// assert_eq!(m.len(), 2);
/// ```
#[derive(Clone)]
pub struct SMap<K, V, S = RandomState> {
    entries: EntryList<K, V, S>,
}

impl<K, V> SMap<K, V>
where
    K: SameValueZero,
{
    pub fn new() -> Self {
        Self {
            entries: EntryList::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: EntryList::with_capacity(capacity),
        }
    }
}

impl<K, V> Default for SMap<K, V>
where
    K: SameValueZero,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> SMap<K, V, S>
where
    K: SameValueZero,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            entries: EntryList::with_hasher(hasher),
        }
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            entries: EntryList::with_capacity_and_hasher(capacity, hasher),
        }
    }

    pub fn hasher(&self) -> &S {
        self.entries.hasher()
    }

    /// Number of entries.
    #[doc(alias = "size")]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + SameValueZero,
    {
        let h = self.entries.find(key)?;
        self.entries.value(h)
    }

    /// The stored key and its value. The stored key is the one first
    /// inserted, which may differ from `key` (e.g. `-0.0` vs `0.0`).
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + SameValueZero,
    {
        let h = self.entries.find(key)?;
        Some((self.entries.key(h)?, self.entries.value(h)?))
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + SameValueZero,
    {
        let h = self.entries.find(key)?;
        self.entries.value_mut(h)
    }

    /// Sets `key` to `value`, returning the value it replaced. An existing
    /// key keeps its position in iteration order.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        match self.entries.upsert(key, value) {
            Upsert::Appended(_) => None,
            Upsert::Replaced(_, old) => Some(old),
        }
    }

    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + SameValueZero,
    {
        self.entries.find(key).is_some()
    }

    /// Removes `key`. Returns whether an entry was present.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + SameValueZero,
    {
        self.remove_entry(key).is_some()
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + SameValueZero,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + SameValueZero,
    {
        let h = self.entries.find(key)?;
        self.entries.remove(h)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Borrowing iterator in insertion order. Each call starts from the head.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Calls `f(value, key, map)` for every entry in insertion order.
    ///
    /// Any context the callback needs is captured by the closure.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&V, &K, &Self),
    {
        for (k, v) in self.iter() {
            f(v, k, self);
        }
    }

    /// Whether both maps hold the same entries, in any order, with values
    /// also matched by SameValueZero. Unlike `==`, a NaN value matches a
    /// NaN value.
    pub fn same_entries(&self, other: &Self) -> bool
    where
        V: SameValueZero,
    {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|w| v.same_value_zero(w)))
    }
}

impl<K, V, S> SMap<K, V, S>
where
    K: SameValueZero + Clone,
    V: Clone,
    S: BuildHasher,
{
    pub fn keys(&self) -> Vec<K> {
        self.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn values(&self) -> Vec<V> {
        self.iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn items(&self) -> Vec<(K, V)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Owned iterator over a copy of the current entries. Later mutation of
    /// the map does not affect it.
    pub fn snapshot(&self) -> Snapshot<K, V> {
        Snapshot {
            inner: self.items().into_iter(),
        }
    }

    /// Calls `f(map, key, value, index)` once per entry present when the
    /// call starts, in insertion order. The callback may mutate the map;
    /// the traversal runs over a snapshot and is not disturbed.
    pub fn iterate<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Self, &K, &V, usize),
    {
        for (i, (k, v)) in self.snapshot().enumerate() {
            f(self, &k, &v, i);
        }
    }
}

/// Borrowing iterator over `(&K, &V)` in insertion order.
pub struct Iter<'a, K, V> {
    inner: entry_list::Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

/// Owned, finite iterator over a point-in-time copy of a map's entries.
#[derive(Clone, Debug)]
pub struct Snapshot<K, V> {
    inner: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for Snapshot<K, V> {
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Snapshot<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for Snapshot<K, V> {}

impl<K, V, S> fmt::Debug for SMap<K, V, S>
where
    K: SameValueZero + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Maps are equal when they hold the same entries, in any order. Keys match
/// by SameValueZero, values by `PartialEq`, so an `f64` NaN value never
/// compares equal. See [`SMap::same_entries`].
impl<K, V, S> PartialEq for SMap<K, V, S>
where
    K: SameValueZero,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for SMap<K, V, S>
where
    K: SameValueZero,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> FromIterator<(K, V)> for SMap<K, V, S>
where
    K: SameValueZero,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut m = Self::with_capacity_and_hasher(iter.size_hint().0, S::default());
        m.extend(iter);
        m
    }
}

impl<K, V, S> Extend<(K, V)> for SMap<K, V, S>
where
    K: SameValueZero,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for SMap<K, V>
where
    K: SameValueZero,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K, V, S> IntoIterator for SMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(mut self) -> Self::IntoIter {
        self.entries.drain_ordered().into_iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a SMap<K, V, S>
where
    K: SameValueZero,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

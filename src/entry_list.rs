//! EntryList: structural layer. Generational slots threaded into an
//! insertion-ordered doubly linked list, indexed by SameValueZero hash.

use crate::reentrancy::DebugReentrancy;
use crate::same_value::{SameValueHash, SameValueZero};
use core::borrow::Borrow;
use core::hash::BuildHasher;
use hashbrown::hash_table::Entry as TableEntry;
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;

/// Stable reference to a live entry. Stale handles never resolve, even if
/// the slot has been reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    fn raw(self) -> DefaultKey {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    hash: u64,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

#[derive(Clone)]
pub struct EntryList<K, V, S = RandomState> {
    hasher: S,
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Node<K, V>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
    reentrancy: DebugReentrancy,
}

/// Outcome of [`EntryList::upsert`].
#[derive(Debug, PartialEq, Eq)]
pub enum Upsert<V> {
    Appended(Handle),
    Replaced(Handle, V),
}

impl<K, V> EntryList<K, V>
where
    K: SameValueZero,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }
}

impl<K, V> Default for EntryList<K, V>
where
    K: SameValueZero,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over entries in insertion order.
pub struct Iter<'a, K, V> {
    slots: &'a SlotMap<DefaultKey, Node<K, V>>,
    cursor: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (Handle, &'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.cursor?;
        let node = self.slots.get(k)?;
        self.cursor = node.next;
        self.remaining -= 1;
        Some((Handle(k), &node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            slots: self.slots,
            cursor: self.cursor,
            remaining: self.remaining,
        }
    }
}

impl<K, V, S> EntryList<K, V, S>
where
    K: SameValueZero,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(0, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            hasher,
            index: HashTable::with_capacity(capacity),
            slots: SlotMap::with_capacity_and_key(capacity),
            head: None,
            tail: None,
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + SameValueZero,
    {
        self.hasher.hash_one(SameValueHash(q))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[cfg(any(test, feature = "bench_internal"))]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn find<Q>(&self, q: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + SameValueZero,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        self.index
            .find(hash, |&k| {
                self.slots
                    .get(k)
                    .map(|n| Q::same_value_zero(n.key.borrow(), q))
                    .unwrap_or(false)
            })
            .map(|&k| Handle(k))
    }

    /// Overwrites the value of an equal key in place, or appends at the tail.
    pub fn upsert(&mut self, key: K, value: V) -> Upsert<V> {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(&key);
        let slots = &mut self.slots;
        match self.index.entry(
            hash,
            |&k| slots.get(k).map(|n| n.key.same_value_zero(&key)).unwrap_or(false),
            |&k| slots.get(k).map(|n| n.hash).unwrap_or(0),
        ) {
            TableEntry::Occupied(o) => {
                let k = *o.get();
                match slots.get_mut(k) {
                    Some(node) => Upsert::Replaced(Handle(k), core::mem::replace(&mut node.value, value)),
                    None => unreachable!("index points at a live slot"),
                }
            }
            TableEntry::Vacant(v) => {
                let prev = self.tail;
                let k = slots.insert(Node {
                    key,
                    value,
                    hash,
                    prev,
                    next: None,
                });
                let _ = v.insert(k);
                match prev.and_then(|p| slots.get_mut(p)) {
                    Some(tail) => tail.next = Some(k),
                    None => self.head = Some(k),
                }
                self.tail = Some(k);
                Upsert::Appended(Handle(k))
            }
        }
    }

    /// Unlinks the entry and returns it. Returns `None` for stale handles.
    pub fn remove(&mut self, handle: Handle) -> Option<(K, V)> {
        let _g = self.reentrancy.enter();
        let k = handle.raw();
        let node = self.slots.remove(k)?;

        if let Ok(entry) = self.index.find_entry(node.hash, |&kk| kk == k) {
            let _ = entry.remove();
        }

        match node.prev.and_then(|p| self.slots.get_mut(p)) {
            Some(prev) => prev.next = node.next,
            None => self.head = node.next,
        }
        match node.next.and_then(|n| self.slots.get_mut(n)) {
            Some(next) => next.prev = node.prev,
            None => self.tail = node.prev,
        }

        Some((node.key, node.value))
    }

    pub fn clear(&mut self) {
        let _g = self.reentrancy.enter();
        self.index.clear();
        self.slots.clear();
        self.head = None;
        self.tail = None;
    }

    pub fn key(&self, h: Handle) -> Option<&K> {
        self.slots.get(h.raw()).map(|n| &n.key)
    }

    pub fn value(&self, h: Handle) -> Option<&V> {
        self.slots.get(h.raw()).map(|n| &n.value)
    }

    pub fn value_mut(&mut self, h: Handle) -> Option<&mut V> {
        self.slots.get_mut(h.raw()).map(|n| &mut n.value)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.slots,
            cursor: self.head,
            remaining: self.slots.len(),
        }
    }
}

impl<K, V, S> EntryList<K, V, S> {
    /// Moves every entry out in insertion order, leaving the list empty.
    pub fn drain_ordered(&mut self) -> Vec<(K, V)> {
        let mut out = Vec::with_capacity(self.slots.len());
        let mut cursor = self.head.take();
        self.tail = None;
        self.index.clear();
        while let Some(k) = cursor {
            match self.slots.remove(k) {
                Some(node) => {
                    cursor = node.next;
                    out.push((node.key, node.value));
                }
                None => break,
            }
        }
        debug_assert!(self.slots.is_empty());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::hash::Hasher;

    fn keys<S: BuildHasher>(m: &EntryList<String, i32, S>) -> Vec<String> {
        m.iter().map(|(_, k, _)| k.clone()).collect()
    }

    #[derive(Clone, Default)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0
        }
    }

    /// Invariant: upsert on an existing key replaces the value and keeps its position.
    #[test]
    fn upsert_replaces_in_place() {
        let mut m: EntryList<String, i32> = EntryList::new();
        let ha = match m.upsert("a".to_string(), 1) {
            Upsert::Appended(h) => h,
            other => panic!("unexpected result: {:?}", other),
        };
        m.upsert("b".to_string(), 2);
        match m.upsert("a".to_string(), 3) {
            Upsert::Replaced(h, old) => {
                assert_eq!(h, ha);
                assert_eq!(old, 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(keys(&m), ["a", "b"]);
        assert_eq!(m.value(ha), Some(&3));
        assert_eq!(m.len(), 2);
    }

    /// Invariant: borrowed lookup works (store `String`, query with `&str`).
    #[test]
    fn borrowed_lookup_with_str() {
        let mut m: EntryList<String, i32> = EntryList::new();
        m.upsert("hello".to_string(), 1);
        assert!(m.find("hello").is_some());
        assert!(m.find("world").is_none());
    }

    /// Invariant: removal from head, middle and tail keeps the remaining order intact.
    #[test]
    fn remove_relinks_neighbours() {
        let mut m: EntryList<String, i32> = EntryList::new();
        for (i, k) in ["a", "b", "c", "d"].iter().enumerate() {
            m.upsert((*k).to_string(), i as i32);
        }
        let hb = m.find("b").unwrap();
        assert_eq!(m.remove(hb), Some(("b".to_string(), 1)));
        assert_eq!(keys(&m), ["a", "c", "d"]);

        let ha = m.find("a").unwrap();
        m.remove(ha);
        assert_eq!(keys(&m), ["c", "d"]);

        let hd = m.find("d").unwrap();
        m.remove(hd);
        assert_eq!(keys(&m), ["c"]);

        m.upsert("e".to_string(), 9);
        assert_eq!(keys(&m), ["c", "e"]);
        assert_links_consistent(&m);
    }

    // `prev` links mirror `next` links, and `tail` is the last node.
    fn assert_links_consistent<K, V, S>(m: &EntryList<K, V, S>) {
        let mut prev = None;
        let mut cursor = m.head;
        let mut seen = 0;
        while let Some(k) = cursor {
            let node = m.slots.get(k).expect("linked slot is live");
            assert_eq!(node.prev, prev);
            prev = Some(k);
            cursor = node.next;
            seen += 1;
        }
        assert_eq!(m.tail, prev);
        assert_eq!(seen, m.slots.len());
    }

    /// Invariant: a stale handle never resolves, even after its slot is reused.
    #[test]
    fn stale_handle_does_not_alias_new_entry() {
        let mut m: EntryList<String, i32> = EntryList::new();
        m.upsert("old".to_string(), 1);
        let h1 = m.find("old").unwrap();
        m.remove(h1).unwrap();
        let h2 = match m.upsert("new".to_string(), 2) {
            Upsert::Appended(h) => h,
            other => panic!("unexpected result: {:?}", other),
        };
        assert_ne!(h1, h2);
        assert!(m.value(h1).is_none());
        assert!(m.remove(h1).is_none());
        assert_eq!(m.len(), 1);
    }

    /// Invariant: NaN and signed-zero keys collapse onto a single entry.
    #[test]
    fn float_keys_use_same_value_zero() {
        let mut m: EntryList<f64, &str> = EntryList::new();
        m.upsert(f64::NAN, "nan");
        m.upsert(0.0, "zero");
        assert!(matches!(m.upsert(f64::from_bits(0xfff8_0000_0000_0001), "nan2"), Upsert::Replaced(_, "nan")));
        assert!(matches!(m.upsert(-0.0, "negzero"), Upsert::Replaced(_, "zero")));
        assert_eq!(m.len(), 2);
        let h = m.find(&f64::NAN).expect("nan present");
        assert_eq!(m.value(h), Some(&"nan2"));
    }

    /// Invariant: lookups and removal resolve correctly when every key collides.
    #[test]
    fn collision_handling_with_const_hasher() {
        let mut m: EntryList<String, i32, ConstBuildHasher> = EntryList::with_hasher(ConstBuildHasher);
        m.upsert("a".to_string(), 1);
        m.upsert("b".to_string(), 2);
        m.upsert("c".to_string(), 3);
        let hb = m.find("b").unwrap();
        assert_eq!(m.key(hb), Some(&"b".to_string()));
        m.remove(hb);
        assert!(m.find("b").is_none());
        assert_eq!(m.value(m.find("c").unwrap()), Some(&3));
        assert_eq!(keys(&m), ["a", "c"]);
    }

    #[test]
    fn clear_and_drain() {
        let mut m: EntryList<String, i32> = EntryList::with_capacity(4);
        m.upsert("a".to_string(), 1);
        m.upsert("b".to_string(), 2);
        assert_eq!(
            m.drain_ordered(),
            vec![("a".to_string(), 1), ("b".to_string(), 2)]
        );
        assert!(m.is_empty());
        assert!(m.find("a").is_none());

        m.upsert("c".to_string(), 3);
        m.clear();
        assert!(m.is_empty());
        assert_eq!(m.iter().count(), 0);
        m.upsert("d".to_string(), 4);
        assert_eq!(keys(&m), ["d"]);
    }

    #[test]
    fn value_mut_updates_in_place() {
        let mut m: EntryList<String, i32> = EntryList::new();
        m.upsert("k".to_string(), 10);
        let h = m.find("k").unwrap();
        *m.value_mut(h).unwrap() += 5;
        assert_eq!(m.value(h), Some(&15));
    }

    /// Invariant (debug-only): re-entering the list from `SameValueZero` panics.
    #[cfg(debug_assertions)]
    #[test]
    fn reentrancy_panics_from_key_comparison() {
        use std::cell::Cell;

        struct ReentryKey {
            id: u32,
            map: Cell<*const EntryList<ReentryKey, i32, ConstBuildHasher>>,
        }
        impl SameValueZero for ReentryKey {
            fn same_value_zero(&self, other: &Self) -> bool {
                let m = other.map.get();
                if !m.is_null() {
                    // Attempt to re-enter the same list during probing.
                    unsafe {
                        let _ = (*m).len();
                        let _ = (*m).find(self);
                    }
                }
                self.id == other.id
            }
            fn hash_same_value<H: Hasher>(&self, state: &mut H) {
                state.write_u32(self.id);
            }
        }

        let mut m: EntryList<ReentryKey, i32, ConstBuildHasher> = EntryList::with_hasher(ConstBuildHasher);
        m.upsert(
            ReentryKey {
                id: 1,
                map: Cell::new(core::ptr::null()),
            },
            1,
        );
        let query = ReentryKey {
            id: 2,
            map: Cell::new(&m as *const _),
        };
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = m.find(&query);
        }));
        assert!(res.is_err(), "expected reentrancy to panic in debug builds");
    }
}

#![cfg(test)]

// Property tests for EntryList kept inside the crate so they do not
// require feature gates to access internal modules.

use crate::entry_list::{EntryList, Handle, Upsert};
use crate::same_value::SameValueZero;
use proptest::prelude::*;
use std::hash::{BuildHasher, Hasher};

// Float keys chosen to collide under SameValueZero but not under bitwise
// equality: two NaN payloads, both zeros.
const POOL_LEN: usize = 7;

fn pool() -> [f64; POOL_LEN] {
    [
        f64::NAN,
        0.0,
        -0.0,
        1.5,
        -1.5,
        f64::INFINITY,
        // Negative quiet NaN with a payload.
        f64::from_bits(0xfff8_0000_0000_0abc),
    ]
}

#[derive(Clone, Debug)]
enum Op {
    Upsert(usize, i32),
    Remove(usize),
    Find(usize),
    Clear,
    Iterate,
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let idx = 0..POOL_LEN;
    let op = prop_oneof![
        4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Upsert(i, v)),
        2 => idx.clone().prop_map(Op::Remove),
        2 => idx.prop_map(Op::Find),
        1 => Just(Op::Clear),
        1 => Just(Op::Iterate),
    ];
    proptest::collection::vec(op, 1..60)
}

// Ordered model: a Vec with linear SameValueZero lookup.
#[derive(Default)]
struct Model {
    entries: Vec<(f64, i32, Handle)>,
}

impl Model {
    fn position(&self, k: f64) -> Option<usize> {
        self.entries.iter().position(|(mk, _, _)| mk.same_value_zero(&k))
    }
}

fn run<S: BuildHasher>(mut sut: EntryList<f64, i32, S>, ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut model = Model::default();
    let mut stale: Vec<Handle> = Vec::new();

    for op in ops {
        match op {
            Op::Upsert(i, v) => {
                let k = pool()[i];
                match (sut.upsert(k, v), model.position(k)) {
                    (Upsert::Appended(h), None) => model.entries.push((k, v, h)),
                    (Upsert::Replaced(h, old), Some(p)) => {
                        let (_, mv, mh) = &mut model.entries[p];
                        prop_assert_eq!(old, *mv);
                        prop_assert_eq!(h, *mh, "overwrite keeps the handle");
                        *mv = v;
                    }
                    (got, expected) => {
                        prop_assert!(false, "upsert {:?} disagreed with model position {:?}", got, expected);
                    }
                }
            }
            Op::Remove(i) => {
                let k = pool()[i];
                match model.position(k) {
                    Some(p) => {
                        let (_, mv, mh) = model.entries.remove(p);
                        let h = sut.find(&k).expect("present in model");
                        prop_assert_eq!(h, mh);
                        let (_, v) = sut.remove(h).expect("handle valid for removal");
                        prop_assert_eq!(v, mv);
                        stale.push(h);
                    }
                    None => prop_assert!(sut.find(&k).is_none()),
                }
            }
            Op::Find(i) => {
                let k = pool()[i];
                let found = sut.find(&k);
                prop_assert_eq!(found.is_some(), model.position(k).is_some());
                if let (Some(h), Some(p)) = (found, model.position(k)) {
                    prop_assert_eq!(sut.value(h), Some(&model.entries[p].1));
                }
            }
            Op::Clear => {
                stale.extend(model.entries.drain(..).map(|(_, _, h)| h));
                sut.clear();
            }
            Op::Iterate => {
                let got: Vec<(u64, i32)> = sut.iter().map(|(_, k, v)| (k.to_bits(), *v)).collect();
                let want: Vec<(u64, i32)> = model.entries.iter().map(|(k, v, _)| (k.to_bits(), *v)).collect();
                prop_assert_eq!(got, want, "iteration follows first-insertion order");
            }
        }

        for &h in &stale {
            prop_assert!(sut.value(h).is_none(), "stale handle must not resolve");
        }
        prop_assert_eq!(sut.len(), model.entries.len());
        prop_assert_eq!(sut.is_empty(), model.entries.is_empty());
        prop_assert_eq!(sut.iter().count(), model.entries.len());
    }
    Ok(())
}

// Property: State-machine equivalence against an ordered linear-scan model.
// - Upsert appends new keys and overwrites equal keys in place.
// - NaN payloads and signed zeros resolve to a single entry.
// - Removal returns the model's value; stale handles never resolve.
// - Iteration order equals first-insertion order of live keys.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(ops in arb_ops()) {
        run(EntryList::new(), ops)?;
    }
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

// Property: Same invariants under worst-case collisions, so every lookup
// is resolved by SameValueZero probing alone.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions(ops in arb_ops()) {
        run(EntryList::with_hasher(ConstBuildHasher), ops)?;
    }
}

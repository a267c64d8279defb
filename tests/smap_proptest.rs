// SMap property tests.
//
// Property 1: SMap agrees with an ordered linear-scan model under random
//  set/delete/clear sequences.
//  - Model: Vec<(key, value)>, SameValueZero lookup, append on new key.
//  - Invariant: keys()/values() equal the model's, in order; get/has agree.
//
// Property 2: derived operations.
//  - filter never changes its source and keeps matching entries in order.
//  - merge: every key of either side is present, and `other` wins.
//  - invert twice is the identity when values are distinct.
//  - reject leaves exactly the complement of filter.
use proptest::prelude::*;
use smap::{SameValueZero, SMap};

fn key_pool() -> [f64; 6] {
    [f64::NAN, 0.0, -0.0, 1.0, -2.5, f64::NEG_INFINITY]
}

fn arb_entries() -> impl Strategy<Value = Vec<(usize, i32)>> {
    proptest::collection::vec((0usize..6, -50i32..50), 0..30)
}

fn build(entries: &[(usize, i32)]) -> SMap<f64, i32> {
    let pool = key_pool();
    entries.iter().map(|&(i, v)| (pool[i], v)).collect()
}

proptest! {
    #[test]
    fn prop_matches_ordered_model(ops in proptest::collection::vec((0u8..=3u8, 0usize..6, any::<i32>()), 1..80)) {
        let pool = key_pool();
        let mut m: SMap<f64, i32> = SMap::new();
        let mut model: Vec<(f64, i32)> = Vec::new();

        for (op, i, v) in ops {
            let k = pool[i];
            let pos = model.iter().position(|(mk, _)| mk.same_value_zero(&k));
            match op {
                // set (weighted double)
                0 | 1 => {
                    let prev = m.set(k, v);
                    match pos {
                        Some(p) => {
                            prop_assert_eq!(prev, Some(model[p].1));
                            model[p].1 = v;
                        }
                        None => {
                            prop_assert_eq!(prev, None);
                            model.push((k, v));
                        }
                    }
                    prop_assert_eq!(m.get(&k), Some(&v));
                }
                // delete
                2 => {
                    prop_assert_eq!(m.delete(&k), pos.is_some());
                    if let Some(p) = pos {
                        model.remove(p);
                    }
                    prop_assert!(!m.has(&k));
                }
                // clear
                3 => {
                    m.clear();
                    model.clear();
                }
                _ => unreachable!(),
            }

            prop_assert_eq!(m.len(), model.len());
            let keys: Vec<u64> = m.keys().iter().map(|k| k.to_bits()).collect();
            let model_keys: Vec<u64> = model.iter().map(|(k, _)| k.to_bits()).collect();
            prop_assert_eq!(keys, model_keys);
            prop_assert_eq!(m.values(), model.iter().map(|(_, v)| *v).collect::<Vec<_>>());
        }
    }

    #[test]
    fn prop_filter_preserves_source(entries in arb_entries(), threshold in -50i32..50) {
        let m = build(&entries);
        let before = m.items();
        let kept = m.filter(|_, v| *v >= threshold);
        prop_assert_eq!(m.len(), before.len());
        let expected: Vec<i32> = before.iter().map(|(_, v)| *v).filter(|v| *v >= threshold).collect();
        prop_assert_eq!(kept.values(), expected);
    }

    #[test]
    fn prop_reject_is_complement_of_filter(entries in arb_entries(), threshold in -50i32..50) {
        let mut m = build(&entries);
        let dropped = m.filter(|_, v| *v < threshold);
        let kept = m.filter(|_, v| *v >= threshold);
        m.reject(|_, v| *v < threshold);
        prop_assert_eq!(&m, &kept);
        for (k, _) in dropped.iter() {
            prop_assert!(!m.has(k));
        }
    }

    #[test]
    fn prop_merge_other_wins(left in arb_entries(), right in arb_entries()) {
        let a = build(&left);
        let b = build(&right);
        let merged = a.merge(&b);
        for (k, v) in b.iter() {
            prop_assert_eq!(merged.get(k), Some(v));
        }
        for (k, v) in a.iter() {
            if !b.has(k) {
                prop_assert_eq!(merged.get(k), Some(v));
            }
        }
        let mut in_place = a.clone();
        in_place.merge_in_place(&b);
        prop_assert_eq!(&in_place, &merged);
    }

    #[test]
    fn prop_invert_round_trip(n in 0usize..20) {
        let m: SMap<String, i64> = (0..n).map(|i| (format!("k{i}"), i as i64 * 3)).collect();
        prop_assert_eq!(m.invert().invert(), m);
    }
}

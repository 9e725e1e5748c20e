#![cfg(test)]

// Property tests for RobinTable kept inside the crate so they can check the
// slot-level Robin Hood invariant after every operation.

use crate::hashing::{KeyHasher, RapidHash, SipHash, Xxh64};
use crate::robin_table::{Put, RobinTable};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Del(usize),
    Get(usize),
    Bump(usize, i32),
    Clear(bool),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<Vec<u8>>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{1,6}", 1..=64).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            8 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
            4 => idx.clone().prop_map(Op::Del),
            4 => idx.clone().prop_map(Op::Get),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Bump(i, d)),
            1 => any::<bool>().prop_map(Op::Clear),
            1 => Just(Op::Iterate),
        ];
        let pool: Vec<Vec<u8>> = pool.into_iter().map(String::into_bytes).collect();
        proptest::collection::vec(op, 1..200).prop_map(move |ops| (pool.clone(), ops))
    })
}

// State-machine equivalence against std::collections::HashMap.
// Checked after every operation:
// - Slot-level invariant: PSL equals distance from home, Robin Hood ordering
//   holds, `len` equals the number of occupied slots.
// - Every key in the model is retrievable with the model's value.
// - Bucket count stays a power of two and never drops below the initial size.
fn run<H: KeyHasher>(hasher: H, pool: &[Vec<u8>], ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut sut = RobinTable::with_hasher(hasher, 0x5eed);
    let mut model: HashMap<&[u8], i32> = HashMap::new();

    for op in ops {
        match op {
            Op::Put(i, v) => {
                let k = pool[i].as_slice();
                let before = model.get(k).copied();
                match sut.put(k, v) {
                    Ok(Put::Inserted(stored)) => {
                        prop_assert!(before.is_none(), "fresh insert of a present key");
                        prop_assert_eq!(*stored, v);
                        model.insert(k, v);
                    }
                    Ok(Put::Existing { current, rejected }) => {
                        prop_assert_eq!(Some(*current), before, "first writer must persist");
                        prop_assert_eq!(rejected, v);
                    }
                    Err(e) => return Err(TestCaseError::fail(format!("put failed: {e}"))),
                }
            }
            Op::Del(i) => {
                let k = pool[i].as_slice();
                prop_assert_eq!(sut.del(k), model.remove(k));
                prop_assert!(sut.get(k).is_none());
            }
            Op::Get(i) => {
                let k = pool[i].as_slice();
                prop_assert_eq!(sut.get(k).copied(), model.get(k).copied());
                prop_assert_eq!(sut.contains_key(k), model.contains_key(k));
            }
            Op::Bump(i, d) => {
                let k = pool[i].as_slice();
                if let Some(v) = sut.get_mut(k) {
                    *v = v.wrapping_add(d);
                }
                if let Some(v) = model.get_mut(k) {
                    *v = v.wrapping_add(d);
                }
            }
            Op::Clear(shrink) => {
                if let Err(e) = sut.clear(shrink) {
                    return Err(TestCaseError::fail(format!("clear failed: {e}")));
                }
                model.clear();
                if shrink {
                    prop_assert_eq!(sut.bucket_count(), sut.initial_bucket_count());
                }
            }
            Op::Iterate => {
                let seen: Vec<(&[u8], i32)> = sut.iter().map(|(k, v)| (k, *v)).collect();
                let s_set: BTreeSet<_> = seen.iter().copied().collect();
                let m_set: BTreeSet<_> = model.iter().map(|(k, v)| (*k, *v)).collect();
                prop_assert_eq!(seen.len(), s_set.len(), "iteration repeated an entry");
                prop_assert_eq!(s_set, m_set);
            }
        }

        sut.assert_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.bucket_count().is_power_of_two());
        prop_assert!(sut.bucket_count() >= sut.initial_bucket_count());
        for (k, v) in &model {
            prop_assert_eq!(sut.get(k), Some(v));
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run(RapidHash, &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_siphash((pool, ops) in arb_scenario()) {
        run(SipHash, &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_xxh64((pool, ops) in arb_scenario()) {
        run(Xxh64, &pool, ops)?;
    }

    // Worst case: every key shares one home slot, so the whole table is a
    // single probe chain.
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run(|_: &[u8], _: u64| 0u64, &pool, ops)?;
    }

    // Homes are the first letter, so chains for neighbouring letters overlap
    // and displacement across chains is exercised.
    #[test]
    fn prop_state_machine_clustered((pool, ops) in arb_scenario()) {
        run(|k: &[u8], _: u64| k[0] as u64, &pool, ops)?;
    }
}

use super::*;
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Keys over a tiny alphabet so that prefixes, shared paths and the empty
/// key show up constantly.
fn dense_key() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(0u8..4, 0..6)
}

fn binary_key() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..20)
}

fn distinct_pairs(max: usize) -> impl Strategy<Value = Vec<(Vec<u8>, i32)>> {
    proptest::collection::btree_map(binary_key(), any::<i32>(), 0..max)
        .prop_map(|map| map.into_iter().collect())
}

#[derive(Debug, Clone)]
enum Operation {
    Insert(Vec<u8>, i32),
    Remove(Vec<u8>),
}

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => (dense_key(), any::<i32>()).prop_map(|(k, v)| Operation::Insert(k, v)),
        2 => dense_key().prop_map(Operation::Remove),
    ]
}

fn has_single_child_branch<V>(trie: &Trie<V>) -> bool {
    breadth_first(trie.root(), |visit| {
        if visit.depth > 0 && visit.node.children().len() == 1 {
            Err(())
        } else {
            Ok(())
        }
    })
    .is_err()
}

proptest! {
    #[test]
    fn test_round_trip(key in binary_key(), value in any::<i32>()) {
        let mut trie = Trie::new();
        prop_assert!(!trie.set(&key, value));
        prop_assert_eq!(trie.get(&key), Some(&value));
    }

    #[test]
    fn test_update_semantics(pairs in distinct_pairs(50), key in binary_key(), v1 in any::<i32>(), v2 in any::<i32>()) {
        let mut trie: Trie<i32> = pairs.into_iter().collect();
        let existed = trie.contains_key(&key);
        prop_assert_eq!(trie.set(&key, v1), existed);
        prop_assert!(trie.set(&key, v2));
        prop_assert_eq!(trie.get(&key), Some(&v2));
    }

    #[test]
    fn test_delete_idempotence(pairs in distinct_pairs(50), pick in any::<prop::sample::Index>()) {
        prop_assume!(!pairs.is_empty());
        let mut trie: Trie<i32> = pairs.iter().cloned().collect();
        let (key, _) = &pairs[pick.index(pairs.len())];

        prop_assert!(trie.delete(key));
        prop_assert_eq!(trie.get(key), None);
        let shape = format!("{:?}", trie);
        prop_assert!(!trie.delete(key));
        prop_assert_eq!(format!("{:?}", trie), shape);
        prop_assert_eq!(trie.len(), pairs.len() - 1);
    }

    #[test]
    fn test_order_independence(
        (pairs, shuffled) in distinct_pairs(60).prop_flat_map(|pairs| {
            let shuffled = Just(pairs.clone()).prop_shuffle();
            (Just(pairs), shuffled)
        })
    ) {
        let sorted: Trie<i32> = pairs.iter().cloned().collect();
        let mixed: Trie<i32> = shuffled.into_iter().collect();
        prop_assert_eq!(&sorted, &mixed);
        for (key, value) in &pairs {
            prop_assert_eq!(mixed.get(key), Some(value));
        }
        mixed.check_invariants().unwrap();
    }

    #[test]
    fn test_operations_match_model(ops in proptest::collection::vec(operation(), 1..200)) {
        let mut trie = Trie::new();
        let mut model = BTreeMap::new();

        for op in ops {
            match op {
                Operation::Insert(key, value) => {
                    prop_assert_eq!(trie.insert(&key, value), model.insert(key, value));
                }
                Operation::Remove(key) => {
                    prop_assert_eq!(trie.remove(&key), model.remove(&key));
                }
            }
            prop_assert_eq!(trie.check_invariants(), Ok(()));
            prop_assert!(!has_single_child_branch(&trie));
            prop_assert_eq!(trie.len(), model.len());
        }

        for (key, value) in &model {
            prop_assert_eq!(trie.get(key), Some(value));
        }
        let entries: Vec<(Vec<u8>, i32)> = trie.into_iter().collect();
        let expected: Vec<(Vec<u8>, i32)> = model.into_iter().collect();
        prop_assert_eq!(entries, expected);
    }

    #[test]
    fn test_inserted_keys_stay_reachable(keys in proptest::collection::vec(dense_key(), 0..60)) {
        let mut trie = Trie::new();
        for (i, key) in keys.iter().enumerate() {
            trie.set(key, i);
            prop_assert_eq!(trie.check_invariants(), Ok(()));
        }
        let model: BTreeMap<&[u8], usize> = keys.iter().enumerate().map(|(i, k)| (&k[..], i)).collect();
        for (key, value) in &model {
            prop_assert_eq!(trie.get(key), Some(value));
        }
        prop_assert!(trie.keys().eq(model.keys().copied()));
    }

    #[test]
    fn test_missing_keys_are_absent(pairs in distinct_pairs(40), probe in binary_key()) {
        let trie: Trie<i32> = pairs.iter().cloned().collect();
        let expected = pairs.iter().find(|(k, _)| *k == probe).map(|(_, v)| v);
        prop_assert_eq!(trie.get(&probe), expected);
    }

    #[test]
    fn test_traversal_coverage(pairs in distinct_pairs(40)) {
        let trie: Trie<i32> = pairs.into_iter().collect();

        let mut pre = 0usize;
        let mut post = 0usize;
        depth_first(trie.root(), |visit| {
            match visit.order {
                Visit::Preorder => pre += 1,
                Visit::Postorder => post += 1,
            }
            Ok::<_, ()>(())
        })
        .unwrap();

        let mut depths = Vec::new();
        let mut leaves = 0;
        breadth_first(trie.root(), |visit| {
            depths.push(visit.depth);
            if visit.node.is_leaf() {
                leaves += 1;
            }
            Ok::<_, ()>(())
        })
        .unwrap();

        prop_assert_eq!(pre, post);
        prop_assert_eq!(pre, depths.len());
        prop_assert!(depths.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(leaves, trie.len());
    }
}

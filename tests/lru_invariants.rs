// ==============================================
// LRU MAP INVARIANT TESTS (integration)
// ==============================================
//
// Capacity enforcement, eviction order and touch semantics of the bounded map,
// checked through the public API and the cache traits.

use proptest::prelude::*;
use seqcache::builder::MapBuilder;
use seqcache::policy::lru::LruMap;
use seqcache::traits::{CoreCache, LruCacheTrait, MutableCache};

// ==============================================
// Capacity-0 Behavior
// ==============================================

mod zero_maximum_size {
    use super::*;

    #[test]
    fn maximum_size_zero_is_honored() {
        let lru: LruMap<&str, i32> = LruMap::new(0);
        assert_eq!(lru.maximum_size(), 0);
        assert_eq!(CoreCache::capacity(&lru), 0);
    }

    #[test]
    fn maximum_size_zero_rejects_inserts() {
        let mut lru: LruMap<&str, i32> = LruMap::new(0);
        lru.set("key", 42);
        assert_eq!(lru.len(), 0, "LruMap::new(0) should reject all inserts");
        assert!(!lru.contains_key(&"key"));
    }
}

// ==============================================
// Touch-on-read and eviction order
// ==============================================

mod eviction_order {
    use super::*;

    #[test]
    fn read_promotes_entry() {
        let mut lru = LruMap::new(2);
        lru.set("A", 1);
        lru.set("B", 2);
        lru.get(&"A");
        lru.set("C", 3);
        let mut keys: Vec<_> = lru.keys().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["A", "C"]);
    }

    #[test]
    fn shrink_keeps_newest_entries_in_order() {
        let mut lru = LruMap::new(5);
        for k in ["a", "b", "c", "d", "e"] {
            lru.set(k, k.len());
        }
        lru.set_maximum_size(2);
        assert_eq!(lru.keys().copied().collect::<Vec<_>>(), vec!["d", "e"]);
        assert_eq!(lru.len(), 2);
    }

    #[test]
    fn missed_read_leaves_order_alone() {
        let mut lru = LruMap::new(2);
        lru.set(1, 1);
        lru.set(2, 2);
        assert_eq!(lru.get(&3), None);
        lru.set(4, 4);
        assert_eq!(lru.keys().copied().collect::<Vec<_>>(), vec![2, 4]);
    }

    #[test]
    fn stored_empty_value_is_a_hit() {
        let mut lru = LruMap::new(2);
        lru.set("k", None::<u8>);
        assert_eq!(lru.get(&"k"), Some(&None));
        assert_eq!(lru.get(&"missing"), None);
    }
}

// ==============================================
// Trait-generic usage
// ==============================================

mod trait_usage {
    use super::*;

    fn fill<C: CoreCache<u32, u32>>(cache: &mut C, n: u32) {
        for i in 0..n {
            cache.insert(i, i * 2);
        }
    }

    fn drain_lru<C: LruCacheTrait<u32, u32>>(cache: &mut C) -> Vec<u32> {
        let mut out = Vec::new();
        while let Some((k, _)) = cache.pop_lru() {
            out.push(k);
        }
        out
    }

    #[test]
    fn generic_fill_respects_capacity() {
        let mut lru: LruMap<u32, u32> = MapBuilder::new().maximum_size(4).build_lru();
        fill(&mut lru, 10);
        assert_eq!(CoreCache::len(&lru), 4);
        assert_eq!(drain_lru(&mut lru), vec![6, 7, 8, 9]);
    }

    #[test]
    fn generic_remove_batch() {
        let mut lru = LruMap::new(8);
        fill(&mut lru, 4);
        let removed = MutableCache::remove_batch(&mut lru, &[0, 9, 2]);
        assert_eq!(removed, vec![Some(0), None, Some(4)]);
        assert_eq!(drain_lru(&mut lru), vec![1, 3]);
    }
}

proptest! {
    /// Property: len <= maximum_size after every call, including shrinks
    #[test]
    fn prop_capacity_enforced(
        initial in 0usize..12,
        ops in prop::collection::vec((0u8..5, 0u32..40), 0..200)
    ) {
        let mut lru = LruMap::new(initial);
        for (op, arg) in ops {
            match op {
                0 | 1 => { lru.set(arg, arg); }
                2 => { lru.get(&arg); }
                3 => { lru.remove(&arg); }
                _ => lru.set_maximum_size((arg % 12) as usize),
            }
            prop_assert!(lru.len() <= lru.maximum_size());
            prop_assert!(lru.check_invariants().is_ok());
        }
    }

    /// Property: the LRU map agrees with a Vec model of recency
    #[test]
    fn prop_matches_recency_model(
        maximum_size in 1usize..8,
        ops in prop::collection::vec((any::<bool>(), 0u8..16), 0..200)
    ) {
        let mut lru = LruMap::new(maximum_size);
        let mut model: Vec<u8> = Vec::new();
        for (is_set, key) in ops {
            let pos = model.iter().position(|&k| k == key);
            if is_set {
                match pos {
                    Some(p) => { model.remove(p); }
                    None if model.len() >= maximum_size => { model.remove(0); }
                    None => {}
                }
                model.push(key);
                lru.set(key, ());
            } else {
                if let Some(p) = pos {
                    model.remove(p);
                    model.push(key);
                }
                prop_assert_eq!(lru.get(&key).is_some(), pos.is_some());
            }
            prop_assert_eq!(lru.keys().copied().collect::<Vec<_>>(), model.clone());
        }
    }
}

//! Fast hash map and hash set type aliases.
//!
//! The catalog's dedup index, the brand alias lookup and the watcher's
//! session set are all keyed by short strings, where the Fx hash from
//! `rustc-hash` is noticeably cheaper than SipHash. None of these tables
//! are exposed to untrusted key sets large enough for hash flooding to matter.
//!
//! # Examples
//!
//! ```
//! use brg_core::{FxHashMap, FxHashSet, fx_hash_map, fx_hash_set};
//!
//! let mut map: FxHashMap<String, i32> = fx_hash_map();
//! map.insert("6205".to_owned(), 1);
//!
//! let set: FxHashSet<&str> = fx_hash_set();
//! assert!(set.is_empty());
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// Creates a new empty [`FxHashMap`].
#[inline]
#[must_use]
pub fn fx_hash_map<K, V>() -> FxHashMap<K, V> {
    FxHashMap::default()
}

/// Creates a new empty [`FxHashSet`].
#[inline]
#[must_use]
pub fn fx_hash_set<V>() -> FxHashSet<V> {
    FxHashSet::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fx_hash_map_operations() {
        let mut map: FxHashMap<&str, i32> = fx_hash_map();
        map.insert("skf", 1);
        map.insert("fag", 2);
        assert_eq!(map.get("skf"), Some(&1));
        assert_eq!(map.get("nsk"), None);
    }

    #[test]
    fn test_fx_hash_set_operations() {
        let mut set: FxHashSet<&str> = fx_hash_set();
        assert!(set.insert("/inbox/a.csv"));
        assert!(!set.insert("/inbox/a.csv"));
        assert!(set.contains("/inbox/a.csv"));
    }
}

use std::{fmt, hash::Hash};

use fxhash::FxBuildHasher;
use indexmap::IndexMap;
use itertools::Itertools;

/// Maps each key to the values inserted for it, in insertion order.
///
/// There is no removal: a key that has been inserted once stays present.
/// Keys are kept in the order of their first insertion.
#[derive(Clone, Debug)]
pub struct MultiMap<K, V> {
    map: IndexMap<K, Vec<V>, FxBuildHasher>,
}

impl<K, V> Default for MultiMap<K, V> {
    fn default() -> Self {
        Self {
            map: IndexMap::default(),
        }
    }
}

impl<K: Hash + Eq, V> MultiMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to the values of `key`. Duplicates are kept.
    pub fn insert(&mut self, key: K, value: V) {
        self.map.entry(key).or_default().push(value);
    }

    /// The values inserted for `key`, oldest first; empty for unknown keys
    pub fn values(&self, key: &K) -> &[V] {
        self.map.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    #[inline]
    pub fn has_values(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.map.keys()
    }

    /// Number of distinct keys
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K: Hash + Eq, V> Extend<(K, V)> for MultiMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for MultiMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for MultiMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.map
                .iter()
                .map(|(key, values)| format!("{key} → [{}]", values.iter().join(", ")))
                .join(", ")
        )
    }
}

//! `Collection` - insertion-ordered key-value storage with list-style appends.

use std::cmp::Ordering;
use std::ops::{Index, IndexMut};

use indexmap::IndexMap;
use wgapi_config::CollectionConfig;

use crate::{CollectionError, CollectionResult, Key, KeyRef};

pub type Iter<'a, V> = indexmap::map::Iter<'a, Key, V>;
pub type IterMut<'a, V> = indexmap::map::IterMut<'a, Key, V>;
pub type IntoIter<V> = indexmap::map::IntoIter<Key, V>;
pub type Keys<'a, V> = indexmap::map::Keys<'a, Key, V>;
pub type Values<'a, V> = indexmap::map::Values<'a, Key, V>;

/// Ordered mapping from [`Key`] to `V`.
///
/// Entries iterate in insertion order until [`sort`](Self::sort) or
/// [`sort_keys`](Self::sort_keys) reorders them. Overwriting a key keeps its
/// position. Appends use an auto-increment index that only moves forward:
/// it is one past the largest integer key stored since the last
/// [`clear`](Self::clear), even if that entry has since been removed. Once
/// `u64::MAX` has been stored there is no next index and appends fail with
/// [`CollectionError::IndexExhausted`].
#[derive(Debug, Clone)]
pub struct Collection<V> {
    pub(crate) storage: IndexMap<Key, V>,
    /// `None` once the index space is used up.
    pub(crate) next_index: Option<u64>,
}

impl<V> Collection<V> {
    /// Creates a new empty collection
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: IndexMap::new(),
            next_index: Some(0),
        }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: IndexMap::with_capacity(capacity),
            next_index: Some(0),
        }
    }

    #[must_use]
    pub fn with_config(config: &CollectionConfig) -> Self {
        Self::with_capacity(config.initial_capacity)
    }

    /// Builds an auto-indexed collection (`0..n`) from a sequence of values.
    pub fn from_values<I: IntoIterator<Item = V>>(values: I) -> Self {
        let mut collection = Self::new();
        collection.merge(
            values
                .into_iter()
                .enumerate()
                .map(|(index, value)| (Key::from(index), value)),
        );
        collection
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// The key the next [`push`](Self::push) will use, `None` when exhausted.
    #[must_use]
    pub fn next_index(&self) -> Option<u64> {
        self.next_index
    }

    fn track_index(&mut self, key: &Key) {
        if let (Key::Index(index), Some(next)) = (key, self.next_index) {
            if *index >= next {
                self.next_index = index.checked_add(1);
            }
        }
    }

    /// Checks that `count` consecutive indexes are free from `next_index` on.
    fn reserve_indexes(&self, count: usize) -> CollectionResult<()> {
        let fits = match (count, self.next_index) {
            (0, _) => true,
            (count, Some(next)) => count as u64 - 1 <= u64::MAX - next,
            (_, None) => false,
        };
        if fits {
            Ok(())
        } else {
            Err(exhausted(count))
        }
    }

    /// Inserts or overwrites `key`, returning the previous value.
    pub fn insert<K: Into<Key>>(&mut self, key: K, value: V) -> Option<V> {
        let key = key.into();
        self.track_index(&key);
        self.storage.insert(key, value)
    }

    /// Appends `value` under the next auto-increment index and returns that key.
    ///
    /// # Errors
    /// Returns [`CollectionError::IndexExhausted`] once `u64::MAX` has been
    /// used; nothing is written.
    pub fn push(&mut self, value: V) -> CollectionResult<Key> {
        let Some(index) = self.next_index else {
            return Err(exhausted(1));
        };
        self.next_index = index.checked_add(1);
        let key = Key::Index(index);
        self.storage.insert(key.clone(), value);
        Ok(key)
    }

    /// Writes `value` at `key`, or appends it when `key` is `None`.
    ///
    /// # Errors
    /// Only the append form can fail, as [`push`](Self::push) does.
    pub fn set<K: Into<Key>>(&mut self, key: Option<K>, value: V) -> CollectionResult<Key> {
        match key {
            Some(key) => {
                let key = key.into();
                self.insert(key.clone(), value);
                Ok(key)
            }
            None => self.push(value),
        }
    }

    /// Inserts every pair from `data`; later values win.
    pub fn merge<I, K>(&mut self, data: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
    {
        let before = self.storage.len();
        for (key, value) in data {
            self.insert(key, value);
        }
        tracing::trace!(before, after = self.storage.len(), "collection merged");
        self
    }

    /// Pushes every value from `data` under fresh auto-increment indexes.
    ///
    /// # Errors
    /// Returns [`CollectionError::IndexExhausted`] when the values do not
    /// all fit in the remaining index space; the collection is left untouched.
    pub fn append<I: IntoIterator<Item = V>>(&mut self, data: I) -> CollectionResult<&mut Self> {
        let values: Vec<V> = data.into_iter().collect();
        self.reserve_indexes(values.len())?;
        let first = self.next_index;
        self.storage.reserve(values.len());
        for value in values {
            self.push(value)?;
        }
        tracing::trace!(?first, next = ?self.next_index, "values appended");
        Ok(self)
    }

    /// Stable reorder by `compare`; keys stay bound to their values.
    pub fn sort<F>(&mut self, mut compare: F) -> &mut Self
    where
        F: FnMut(&V, &V) -> Ordering,
    {
        self.storage.sort_by(|_, a, _, b| compare(a, b));
        tracing::trace!(len = self.storage.len(), "collection sorted by value");
        self
    }

    /// Reorders entries by key: indexes ascending, then names.
    pub fn sort_keys(&mut self) -> &mut Self {
        self.storage.sort_keys();
        self
    }

    /// Value at the first position in iteration order.
    #[must_use]
    pub fn first_value(&self) -> Option<&V> {
        self.storage.first().map(|(_, value)| value)
    }

    #[must_use]
    pub fn first(&self) -> Option<(&Key, &V)> {
        self.storage.first()
    }

    /// Removes every entry and resets the auto-increment index.
    pub fn clear(&mut self) -> &mut Self {
        tracing::trace!(len = self.storage.len(), "collection cleared");
        self.storage.clear();
        self.next_index = Some(0);
        self
    }

    /// Gets the value at `key`.
    ///
    /// # Errors
    /// Returns [`CollectionError::KeyNotFound`] when `key` is absent.
    pub fn get<'k, K: Into<KeyRef<'k>>>(&self, key: K) -> CollectionResult<&V> {
        let key = key.into();
        self.storage
            .get(&key)
            .ok_or_else(|| CollectionError::KeyNotFound(key.to_key()))
    }

    pub fn get_mut<'k, K: Into<KeyRef<'k>>>(&mut self, key: K) -> CollectionResult<&mut V> {
        let key = key.into();
        self.storage
            .get_mut(&key)
            .ok_or_else(|| CollectionError::KeyNotFound(key.to_key()))
    }

    #[must_use]
    pub fn has<'k, K: Into<KeyRef<'k>>>(&self, key: K) -> bool {
        self.storage.contains_key(&key.into())
    }

    /// Removes the entry at `key`, keeping the order of the rest.
    pub fn unset<'k, K: Into<KeyRef<'k>>>(&mut self, key: K) -> Option<V> {
        self.storage.shift_remove(&key.into())
    }

    /// Position of `key` in the current iteration order.
    #[must_use]
    pub fn position<'k, K: Into<KeyRef<'k>>>(&self, key: K) -> Option<usize> {
        self.storage.get_index_of(&key.into())
    }

    pub fn iter(&self) -> Iter<'_, V> {
        self.storage.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        self.storage.iter_mut()
    }

    pub fn keys(&self) -> Keys<'_, V> {
        self.storage.keys()
    }

    pub fn values(&self) -> Values<'_, V> {
        self.storage.values()
    }
}

fn exhausted(requested: usize) -> CollectionError {
    tracing::debug!(requested, "auto-increment index exhausted");
    CollectionError::IndexExhausted { requested }
}

impl<V> Default for Collection<V> {
    fn default() -> Self {
        Self::new()
    }
}

// Entries in order, unlike IndexMap's own equality. The auto-increment
// index is not compared.
impl<V: PartialEq> PartialEq for Collection<V> {
    fn eq(&self, other: &Self) -> bool {
        self.storage.len() == other.storage.len() && self.storage.iter().eq(other.storage.iter())
    }
}

impl<V: Eq> Eq for Collection<V> {}

impl<V> From<Vec<V>> for Collection<V> {
    fn from(values: Vec<V>) -> Self {
        Self::from_values(values)
    }
}

impl<K: Into<Key>, V> FromIterator<(K, V)> for Collection<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut collection = Self::new();
        collection.merge(iter);
        collection
    }
}

impl<K: Into<Key>, V> Extend<(K, V)> for Collection<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.merge(iter);
    }
}

impl<V> IntoIterator for Collection<V> {
    type Item = (Key, V);
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        self.storage.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a Collection<V> {
    type Item = (&'a Key, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.storage.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut Collection<V> {
    type Item = (&'a Key, &'a mut V);
    type IntoIter = IterMut<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.storage.iter_mut()
    }
}

impl<'k, K: Into<KeyRef<'k>>, V> Index<K> for Collection<V> {
    type Output = V;

    fn index(&self, key: K) -> &Self::Output {
        let key = key.into();
        match self.storage.get(&key) {
            Some(value) => value,
            None => panic!("key not found: {}", key),
        }
    }
}

impl<'k, K: Into<KeyRef<'k>>, V> IndexMut<K> for Collection<V> {
    fn index_mut(&mut self, key: K) -> &mut Self::Output {
        let key = key.into();
        match self.storage.get_mut(&key) {
            Some(value) => value,
            None => panic!("key not found: {}", key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries<V: Clone>(collection: &Collection<V>) -> Vec<(Key, V)> {
        collection
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    #[test]
    fn test_insertion_order() {
        let mut collection = Collection::new();
        collection.insert("first", 1);
        collection.insert("second", 2);
        collection.insert("third", 3);

        assert_eq!(collection.len(), 3);
        let keys: Vec<_> = collection.keys().cloned().collect();
        assert_eq!(keys, vec![Key::from("first"), Key::from("second"), Key::from("third")]);
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut collection = Collection::new();
        collection.insert("a", 1);
        collection.insert("b", 2);
        assert_eq!(collection.insert("a", 10), Some(1));
        assert_eq!(
            entries(&collection),
            vec![(Key::from("a"), 10), (Key::from("b"), 2)]
        );
    }

    #[test]
    fn test_push_follows_largest_index() {
        let mut collection = Collection::new();
        collection.insert(5u64, "five");
        collection.insert("name", "named");
        assert_eq!(collection.push("six"), Ok(Key::Index(6)));
        collection.insert(2u64, "two");
        assert_eq!(collection.push("seven"), Ok(Key::Index(7)));
    }

    #[test]
    fn test_unset_does_not_rewind_index() {
        let mut collection = Collection::from(vec!['a', 'b', 'c']);
        assert_eq!(collection.unset(2u64), Some('c'));
        assert_eq!(collection.push('d'), Ok(Key::Index(3)));
        assert_eq!(collection.unset(42u64), None);
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn test_clear_resets_index() {
        let mut collection = Collection::from(vec![1, 2, 3]);
        assert_eq!(collection.clear().len(), 0);
        assert!(collection.is_empty());
        assert_eq!(collection.push(4), Ok(Key::Index(0)));
    }

    #[test]
    fn test_push_after_max_index_fails() {
        let mut collection = Collection::new();
        collection.insert(u64::MAX, "original");
        assert_eq!(collection.next_index(), None);

        assert_eq!(
            collection.push("appended"),
            Err(CollectionError::IndexExhausted { requested: 1 })
        );
        assert!(collection.set(None::<Key>, "appended").is_err());
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get(u64::MAX), Ok(&"original"));

        // removing the entry does not give the index back
        collection.unset(u64::MAX);
        assert!(collection.push("appended").is_err());
        collection.clear();
        assert_eq!(collection.push("appended"), Ok(Key::Index(0)));
    }

    #[test]
    fn test_append_near_max_index_is_atomic() {
        let mut collection = Collection::new();
        collection.insert(u64::MAX - 2, 'a');

        assert!(matches!(
            collection.append(['b', 'c', 'd']),
            Err(CollectionError::IndexExhausted { requested: 3 })
        ));
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.next_index(), Some(u64::MAX - 1));

        collection.append(['b', 'c']).unwrap();
        let keys: Vec<_> = collection.keys().filter_map(Key::as_index).collect();
        assert_eq!(keys, vec![u64::MAX - 2, u64::MAX - 1, u64::MAX]);
        assert_eq!(collection.next_index(), None);
        assert!(collection.append(Vec::new()).is_ok());
    }

    #[test]
    fn test_set_sentinel() {
        let mut collection = Collection::new();
        assert_eq!(collection.set(None::<Key>, "x"), Ok(Key::Index(0)));
        assert_eq!(collection.set(Some("k"), "y"), Ok(Key::from("k")));
        assert_eq!(collection.set(None::<Key>, "z"), Ok(Key::Index(1)));
        assert_eq!(collection[KeyRef::Name("k")], "y");
    }

    #[test]
    fn test_get_missing_key() {
        let collection: Collection<i32> = Collection::new();
        assert_eq!(
            collection.get("missing"),
            Err(CollectionError::KeyNotFound(Key::from("missing")))
        );
        assert!(!collection.has(0u64));
    }

    #[test]
    fn test_get_mut_and_index_mut() {
        let mut collection = Collection::from(vec![1, 2]);
        *collection.get_mut(0u64).unwrap() += 10;
        collection[1u64] *= 5;
        assert_eq!(collection.values().copied().collect::<Vec<_>>(), vec![11, 10]);
    }

    #[test]
    #[should_panic(expected = "key not found")]
    fn test_index_missing_panics() {
        let collection: Collection<u8> = Collection::new();
        let _value = collection["nope"];
    }

    #[test]
    fn test_sort_is_stable_and_keeps_keys() {
        let mut collection: Collection<(u8, char)> =
            Collection::from(vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')]);
        collection.sort(|a, b| a.0.cmp(&b.0));
        let keys: Vec<_> = collection.keys().filter_map(Key::as_index).collect();
        assert_eq!(keys, vec![1, 3, 0, 2]);
        assert_eq!(collection.first_value(), Some(&(1, 'b')));
    }

    #[test]
    fn test_sort_keys() {
        let mut collection = Collection::new();
        collection.insert("b", 1);
        collection.insert(3u64, 2);
        collection.insert("a", 3);
        collection.insert(1u64, 4);
        collection.sort_keys();
        assert_eq!(collection.values().copied().collect::<Vec<_>>(), vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_first_value() {
        let mut collection = Collection::new();
        assert_eq!(collection.first_value(), None);
        collection.insert("x", 1);
        collection.insert("y", 2);
        assert_eq!(collection.first_value(), Some(&1));
        assert_eq!(collection.first(), Some((&Key::from("x"), &1)));
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let ab: Collection<i32> = [("a", 1), ("b", 2)].into_iter().collect();
        let ba: Collection<i32> = [("b", 2), ("a", 1)].into_iter().collect();
        assert_ne!(ab, ba);
        assert_eq!(ab, ab.clone());
    }

    #[test]
    fn test_equality_ignores_append_index() {
        let mut trimmed = Collection::from(vec![1, 2, 3]);
        trimmed.unset(2u64);
        let fresh = Collection::from(vec![1, 2]);
        assert_ne!(trimmed.next_index(), fresh.next_index());
        assert_eq!(trimmed, fresh);
    }

    #[test]
    fn test_iteration_restarts() {
        let collection = Collection::from(vec![1, 2, 3]);
        let first: Vec<_> = collection.iter().map(|(_, v)| *v).collect();
        let second: Vec<_> = (&collection).into_iter().map(|(_, v)| *v).collect();
        assert_eq!(first, second);
        assert_eq!(collection.position(2u64), Some(2));
    }

    #[test]
    fn test_iter_mut_and_into_iter() {
        let mut collection = Collection::from(vec![1, 2]);
        collection.insert("name", 3);
        for (_, value) in collection.iter_mut() {
            *value *= 10;
        }
        for (key, value) in &mut collection {
            if key.as_name().is_some() {
                *value += 1;
            }
        }
        let owned: Vec<(Key, i32)> = collection.into_iter().collect();
        assert_eq!(
            owned,
            vec![(Key::Index(0), 10), (Key::Index(1), 20), (Key::from("name"), 31)]
        );
    }

    #[test]
    fn test_with_config_capacity() {
        let config = CollectionConfig {
            initial_capacity: 16,
            ..CollectionConfig::default()
        };
        let collection: Collection<u8> = Collection::with_config(&config);
        assert!(collection.is_empty());
        assert!(collection.storage.capacity() >= 16);
    }
}

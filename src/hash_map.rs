use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::hash_state::SipState;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;

/// A hash map implemented on the Robin Hood [`HashTable`].
///
/// `HashMap<K, V>` stores key-value pairs where keys implement `Hash + Eq`.
/// Keys supply their own hash through their `Hash` implementation, fed to a
/// fixed SipHash-1-3 state; there is deliberately no hasher type parameter.
///
/// # Performance Characteristics
///
/// - **Memory**: 9 bytes per slot overhead, plus the size of `(K, V)`.
/// - Iteration order is arbitrary and not preserved across mutations.
///
/// # Examples
///
/// ```rust
/// use rh_hash::HashMap;
///
/// let mut map = HashMap::new();
/// map.insert("one", 1);
/// map.insert("two", 2);
///
/// assert_eq!(map.get(&"one"), Some(&1));
/// assert_eq!(map.len(), 2);
/// ```
#[derive(Clone)]
pub struct HashMap<K, V> {
    table: HashTable<(K, V)>,
    hash_state: SipState,
}

impl<K, V> Debug for HashMap<K, V>
where
    K: Debug + Hash + Eq,
    V: Debug,
{
    /// Renders as a map literal: `{k1: v1, k2: v2}`, or `{}` when empty.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(k, v);
        }
        map.finish()
    }
}

impl<K, V> HashMap<K, V>
where
    K: Hash + Eq,
{
    /// Creates an empty map with the minimum capacity of 8 slots.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty map with at least the requested number of slots.
    ///
    /// The capacity is rounded up to the next power of two, with a minimum
    /// of 8.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rh_hash::HashMap;
    ///
    /// let map: HashMap<i32, i32> = HashMap::with_capacity(20);
    /// assert_eq!(map.capacity(), 32);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            hash_state: SipState,
        }
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of slots in the map.
    ///
    /// Always a power of two of at least 8; the map grows before entries
    /// reach 7/8 of it.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Removes all entries from the map, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the key was already present its value is replaced in place and
    /// the old value is returned; the map's length is unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rh_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hash_state.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(mut entry) => {
                let old_value = core::mem::replace(&mut entry.get_mut().1, value);
                Some(old_value)
            }
            TableEntry::Vacant(entry) => {
                entry.insert((key, value));
                None
            }
        }
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rh_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = self.hash_state.hash_one(key);
        self.table.find(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rh_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// if let Some(x) = map.get_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(map.get(&1), Some(&"b"));
    /// ```
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = self.hash_state.hash_one(key);
        self.table.find_mut(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns a clone of the value for `key`, or `default` when the key is
    /// absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rh_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert("four", 4);
    /// assert_eq!(map.get_or(&"four", 100), 4);
    /// assert_eq!(map.get_or(&"five", 100), 100);
    /// ```
    pub fn get_or(&self, key: &K, default: V) -> V
    where
        V: Clone,
    {
        self.get(key).cloned().unwrap_or(default)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes a key from the map, returning its value if the key was
    /// present.
    ///
    /// Removing an absent key is a no-op.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rh_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let hash = self.hash_state.hash_one(key);
        self.table.remove(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if
    /// the key was present.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let hash = self.hash_state.hash_one(key);
        self.table.remove(hash, |(k, _)| k == key)
    }

    /// Gets the given key's corresponding entry in the map for in-place
    /// manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rh_hash::HashMap;
    ///
    /// let mut counts: HashMap<&str, i32> = HashMap::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.entry(word).or_insert(0) += 1;
    /// }
    ///
    /// assert_eq!(counts.get(&"a"), Some(&2));
    /// assert_eq!(counts.get(&"b"), Some(&1));
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        let hash = self.hash_state.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        }
    }

    /// Returns an iterator over the key-value pairs of the map.
    ///
    /// Pairs are yielded in arbitrary order, each live pair exactly once.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the keys of the map.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator that removes and yields all key-value pairs.
    ///
    /// After the iterator is dropped the map is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rh_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// let pairs: Vec<_> = map.drain().collect();
    /// assert!(map.is_empty());
    /// assert_eq!(pairs.len(), 2);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.table.drain(),
        }
    }
}

impl<K, V> Default for HashMap<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Structural equality: same length and every pair of one map present in
/// the other. Capacity and slot layout never participate.
impl<K, V> PartialEq for HashMap<K, V>
where
    K: Hash + Eq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K, V> Eq for HashMap<K, V>
where
    K: Hash + Eq,
    V: Eq,
{
}

/// Builds a map from a sequence of pairs; later pairs overwrite earlier
/// ones with the same key.
impl<K, V> FromIterator<(K, V)> for HashMap<K, V>
where
    K: Hash + Eq,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V> Extend<(K, V)> for HashMap<K, V>
where
    K: Hash + Eq,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V> {
    /// Inserts a default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V> Entry<'a, K, V>
where
    V: Default,
{
    /// Inserts the default value if the entry is vacant and returns a
    /// mutable reference.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V> {
    entry: crate::hash_table::VacantEntry<'a, (K, V)>,
    key: K,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// Gets a reference to the key that would be used when inserting a
    /// value.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Takes ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value into the map and returns a mutable reference to
    /// it.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self.entry.insert((self.key, value)).1
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V> {
    entry: crate::hash_table::OccupiedEntry<'a, (K, V)>,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.entry.get().0
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.entry.get().1
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.entry.get_mut().1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.entry.into_mut().1
    }

    /// Inserts a value into the entry and returns the old value.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(&mut self.entry.get_mut().1, value)
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.entry.remove().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.entry.remove()
    }
}

/// An iterator over the key-value pairs of a `HashMap`.
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }
}

/// An iterator over the keys of a `HashMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

/// An iterator over the values of a `HashMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

/// A draining iterator over the key-value pairs of a `HashMap`.
pub struct Drain<'a, K, V> {
    inner: crate::hash_table::Drain<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Drain<'a, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<'a, K, V> Drop for Drain<'a, K, V> {
    fn drop(&mut self) {
        for _ in self {}
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn fresh_map_observers() {
        let map: HashMap<String, i32> = HashMap::new();
        assert_eq!(map.capacity(), 8);
        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
        assert_eq!(map.get(&"x".to_string()), None);
        assert_eq!(format!("{map:?}"), "{}");
    }

    #[test]
    fn with_capacity_rounds_up() {
        let map: HashMap<i32, i32> = HashMap::with_capacity(20);
        assert_eq!(map.capacity(), 32);

        let map: HashMap<i32, i32> = HashMap::with_capacity(1000);
        assert_eq!(map.capacity(), 1024);

        let map: HashMap<i32, i32> = HashMap::with_capacity(0);
        assert_eq!(map.capacity(), 8);
    }

    #[test]
    fn basic_crud() {
        let mut map = HashMap::new();
        map.insert("one".to_string(), 1);
        map.insert("two".to_string(), 2);
        map.insert("three".to_string(), 3);

        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&"one".to_string()), Some(&1));
        assert_eq!(map.get(&"two".to_string()), Some(&2));
        assert_eq!(map.get(&"three".to_string()), Some(&3));
        assert_eq!(map.get(&"four".to_string()), None);
        assert_eq!(map.get_or(&"four".to_string(), 100), 100);
        assert!(map.contains_key(&"one".to_string()));
        assert!(!map.contains_key(&"four".to_string()));

        assert_eq!(map.insert("one".to_string(), 11), Some(1));
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&"one".to_string()), Some(&11));

        assert_eq!(map.remove(&"one".to_string()), Some(11));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&"one".to_string()), None);

        assert_eq!(map.remove(&"nope".to_string()), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn get_mut_modifies_in_place() {
        let mut map = HashMap::new();
        map.insert(1, "hello".to_string());

        if let Some(value) = map.get_mut(&1) {
            value.push_str(" world");
        }

        assert_eq!(map.get(&1), Some(&"hello world".to_string()));
        assert_eq!(map.get_mut(&2), None);
    }

    #[test]
    fn remove_entry_returns_pair() {
        let mut map = HashMap::new();
        map.insert(1, "hello".to_string());

        assert_eq!(map.remove_entry(&1), Some((1, "hello".to_string())));
        assert_eq!(map.len(), 0);
        assert_eq!(map.remove_entry(&1), None);
    }

    #[test]
    fn clear_empties_but_keeps_capacity() {
        let mut map = HashMap::new();
        for i in 0..20 {
            map.insert(i, i);
        }
        let capacity = map.capacity();

        map.clear();
        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
        assert_eq!(map.capacity(), capacity);
        assert!(!map.contains_key(&1));

        map.insert(1, 1);
        assert_eq!(map.get(&1), Some(&1));
    }

    #[test]
    fn grows_under_sequential_inserts() {
        let mut map = HashMap::with_capacity(8);
        for i in 0..20 {
            map.insert(i, i * 10);
        }

        assert!(map.capacity() >= 32);
        assert_eq!(map.len(), 20);
        for i in 0..20 {
            assert_eq!(map.get(&i), Some(&(i * 10)));
        }

        for i in [0, 5, 10] {
            assert_eq!(map.remove(&i), Some(i * 10));
        }
        assert_eq!(map.len(), 17);
        for i in [0, 5, 10] {
            assert_eq!(map.get(&i), None);
        }
        for i in (0..20).filter(|i| ![0, 5, 10].contains(i)) {
            assert_eq!(map.get(&i), Some(&(i * 10)));
        }
    }

    #[test]
    fn entry_api() {
        let mut map = HashMap::new();

        let value = map.entry(1).or_insert("hello".to_string());
        assert_eq!(value, &"hello".to_string());
        assert_eq!(map.len(), 1);

        let value = map.entry(1).or_insert("world".to_string());
        assert_eq!(value, &"hello".to_string());
        assert_eq!(map.len(), 1);

        map.entry(2).or_insert_with(|| "computed".to_string());
        assert_eq!(map.get(&2), Some(&"computed".to_string()));

        map.entry(1)
            .and_modify(|v| v.push_str(" world"))
            .or_insert("default".to_string());
        assert_eq!(map.get(&1), Some(&"hello world".to_string()));

        assert_eq!(map.entry(3).key(), &3);
    }

    #[test]
    fn entry_or_default() {
        let mut map: HashMap<i32, Vec<i32>> = HashMap::new();

        map.entry(1).or_default().push(42);
        assert_eq!(map.get(&1), Some(&vec![42]));

        map.entry(1).or_default().push(24);
        assert_eq!(map.get(&1), Some(&vec![42, 24]));
    }

    #[test]
    fn occupied_entry_operations() {
        let mut map = HashMap::new();
        map.insert(1, "hello".to_string());

        match map.entry(1) {
            Entry::Occupied(mut entry) => {
                assert_eq!(entry.key(), &1);
                assert_eq!(entry.get(), &"hello".to_string());

                *entry.get_mut() = "world".to_string();
                assert_eq!(entry.get(), &"world".to_string());

                let old_value = entry.insert("new".to_string());
                assert_eq!(old_value, "world".to_string());

                let (key, value) = entry.remove_entry();
                assert_eq!(key, 1);
                assert_eq!(value, "new".to_string());
            }
            Entry::Vacant(_) => panic!("Expected occupied entry"),
        }

        assert!(map.is_empty());
    }

    #[test]
    fn vacant_entry_operations() {
        let mut map = HashMap::new();

        match map.entry(1) {
            Entry::Vacant(entry) => {
                assert_eq!(entry.key(), &1);

                let value = entry.insert("hello".to_string());
                assert_eq!(value, &"hello".to_string());
            }
            Entry::Occupied(_) => panic!("Expected vacant entry"),
        }

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&"hello".to_string()));
    }

    #[test]
    fn iterators_visit_every_pair_once() {
        let mut map = HashMap::new();
        map.insert(1, "one".to_string());
        map.insert(2, "two".to_string());
        map.insert(3, "three".to_string());

        let pairs: std::collections::HashMap<i32, String> =
            map.iter().map(|(k, v)| (*k, v.clone())).collect();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs.get(&1), Some(&"one".to_string()));
        assert_eq!(pairs.get(&2), Some(&"two".to_string()));
        assert_eq!(pairs.get(&3), Some(&"three".to_string()));

        let keys: std::collections::HashSet<i32> = map.keys().copied().collect();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&1));
        assert!(keys.contains(&2));
        assert!(keys.contains(&3));

        let values: std::collections::HashSet<String> = map.values().cloned().collect();
        assert_eq!(values.len(), 3);
        assert!(values.contains("one"));
        assert!(values.contains("two"));
        assert!(values.contains("three"));
    }

    #[test]
    fn drain_empties_the_map() {
        let mut map = HashMap::new();
        map.insert(1, "one".to_string());
        map.insert(2, "two".to_string());
        map.insert(3, "three".to_string());

        let drained: std::collections::HashMap<i32, String> = map.drain().collect();
        assert_eq!(drained.len(), 3);
        assert!(map.is_empty());

        assert_eq!(drained.get(&1), Some(&"one".to_string()));
        assert_eq!(drained.get(&2), Some(&"two".to_string()));
        assert_eq!(drained.get(&3), Some(&"three".to_string()));
    }

    #[test]
    fn from_iterator_later_pairs_win() {
        let map: HashMap<&str, i32> = [("a", 1), ("b", 2), ("a", 3)].into_iter().collect();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&"a"), Some(&3));
        assert_eq!(map.get(&"b"), Some(&2));
    }

    #[test]
    fn round_trips_every_surviving_pair() {
        let pairs = [(1, 10), (2, 20), (1, 11), (3, 30), (2, 21)];
        let map: HashMap<i32, i32> = pairs.into_iter().collect();

        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&1), Some(&11));
        assert_eq!(map.get(&2), Some(&21));
        assert_eq!(map.get(&3), Some(&30));

        let mut seen: Vec<(i32, i32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![(1, 11), (2, 21), (3, 30)]);
    }

    #[test]
    fn equality_ignores_insertion_order_and_capacity() {
        let mut t1 = HashMap::with_capacity(8);
        t1.insert("one".to_string(), 1);
        t1.insert("two".to_string(), 2);

        let mut t2 = HashMap::with_capacity(64);
        t2.insert("two".to_string(), 2);
        t2.insert("one".to_string(), 1);

        assert_eq!(t1, t2);
        assert_eq!(t2, t1);
        assert_eq!(t1, t1.clone());

        t2.insert("three".to_string(), 3);
        assert_ne!(t1, t2);
        assert_ne!(t2, t1);

        let e1: HashMap<String, i32> = HashMap::with_capacity(8);
        let e2: HashMap<String, i32> = HashMap::with_capacity(256);
        assert_eq!(e1, e2);
    }

    #[test]
    fn equality_spots_differing_values() {
        let mut t1 = HashMap::new();
        t1.insert(1, "a");
        let mut t2 = HashMap::new();
        t2.insert(1, "b");
        assert_ne!(t1, t2);
    }

    #[test]
    fn debug_renders_like_a_map_literal() {
        let mut map: HashMap<i32, i32> = HashMap::new();
        assert_eq!(format!("{map:?}"), "{}");

        map.insert(1, 10);
        assert_eq!(format!("{map:?}"), "{1: 10}");
    }

    #[test]
    fn churn_with_many_collisions() {
        let mut map = HashMap::new();

        for i in 0..1000 {
            map.insert(i, i * 2);
        }
        assert_eq!(map.len(), 1000);
        for i in 0..1000 {
            assert_eq!(map.get(&i), Some(&(i * 2)));
        }

        for i in (0..1000).step_by(2) {
            assert_eq!(map.remove(&i), Some(i * 2));
        }
        assert_eq!(map.len(), 500);

        for i in (1..1000).step_by(2) {
            assert_eq!(map.get(&i), Some(&(i * 2)));
        }
        for i in (0..1000).step_by(2) {
            assert_eq!(map.get(&i), None);
        }

        // Deleted keys reinsert cleanly after the churn above.
        for i in (0..1000).step_by(2) {
            map.insert(i, i * 3);
        }
        assert_eq!(map.len(), 1000);
        for i in (0..1000).step_by(2) {
            assert_eq!(map.get(&i), Some(&(i * 3)));
        }
    }

    #[test]
    fn default_trait() {
        let map: HashMap<i32, String> = HashMap::default();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn complex_values() {
        let mut map = HashMap::new();

        let vec1 = vec![1, 2, 3];
        let vec2 = vec![4, 5, 6];

        map.insert("first".to_string(), vec1.clone());
        map.insert("second".to_string(), vec2.clone());

        assert_eq!(map.get(&"first".to_string()), Some(&vec1));
        assert_eq!(map.get(&"second".to_string()), Some(&vec2));

        if let Some(v) = map.get_mut(&"first".to_string()) {
            v.push(4);
        }

        assert_eq!(map.get(&"first".to_string()), Some(&vec![1, 2, 3, 4]));
    }

    #[test]
    fn clone_is_independent() {
        let mut map = HashMap::new();
        map.insert(1, "one".to_string());
        map.insert(2, "two".to_string());

        let mut cloned = map.clone();
        cloned.insert(3, "three".to_string());

        assert_eq!(map.len(), 2);
        assert_eq!(cloned.len(), 3);
        assert_eq!(map.get(&1), cloned.get(&1));
        assert_eq!(cloned.get(&3), Some(&"three".to_string()));
        assert!(map.get(&3).is_none());
    }
}

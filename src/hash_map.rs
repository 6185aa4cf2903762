use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt::Debug;
use core::ops::Index;

use crate::error::Error;
use crate::iter::Cursor;
use crate::iter::Drain;
use crate::iter::IntoIter;
use crate::iter::Iter;
use crate::iter::IterMut;
use crate::iter::Keys;
use crate::iter::Values;
use crate::iter::ValuesMut;
use crate::policy;
use crate::slot::Slot;
use crate::slot::slot_array;
use crate::slot::try_slot_array;
use crate::strategy::Fnv1a;
use crate::strategy::HashStrategy;

#[cold]
#[inline(never)]
fn capacity_overflow() -> ! {
    panic!("capacity overflow")
}

#[inline]
fn policy_size(requested: usize) -> usize {
    policy::next_size(requested).unwrap_or_else(|| capacity_overflow())
}

/// Debug statistics for probe-distance analysis.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of entries currently in the map
    pub populated: usize,
    /// Power-of-two bucket count
    pub capacity: usize,
    /// Current maximum probe distance
    pub probe_window: usize,
    /// Physical slot-array length, including overflow slack and the terminal
    pub total_slots: usize,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
    /// Largest distance of any entry from its home bucket
    pub max_probe_distance: usize,
    /// Mean distance of the entries from their home buckets
    pub mean_probe_distance: f64,
    /// Total memory in bytes held by the slot array
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Probe Map Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Slots: {} physical, probe window {}",
            self.total_slots, self.probe_window
        );
        println!(
            "Probe distance: max {}, mean {:.3}",
            self.max_probe_distance, self.mean_probe_distance
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// An open-addressing hash map with bounded linear probing.
///
/// Entries live directly in one contiguous slot array. A key is stored within
/// [`probe_window`](Self::probe_window) slots of its bucket, so every lookup
/// inspects at most that many slots. When an insert finds neither its key nor
/// a free slot in that window, the map grows and retries.
///
/// Keys are hashed and compared through a [`HashStrategy`]; the default is
/// [`Fnv1a`].
///
/// ## Example
///
/// ```rust
/// use probe_map::HashMap;
///
/// let mut scores = HashMap::new();
/// scores.insert("alice".to_string(), 10);
/// scores.insert("bob".to_string(), 7);
///
/// // Upserts replace the value and keep the stored key.
/// scores.insert("alice".to_string(), 12);
///
/// assert_eq!(scores.len(), 2);
/// assert_eq!(scores.get("alice"), Some(&12));
/// assert!(scores.capacity().is_power_of_two());
/// ```
#[derive(Clone)]
pub struct HashMap<K, V, S = Fnv1a> {
    slots: Vec<Slot<K, V>>,
    capacity: usize,
    len: usize,
    probe_window: usize,
    strategy: S,
}

impl<K, V> HashMap<K, V> {
    /// Creates an empty map with the default capacity request of 16 buckets
    /// and the [`Fnv1a`] strategy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_map::HashMap;
    ///
    /// let map: HashMap<u64, String> = HashMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 32);
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(policy::DEFAULT_CAPACITY)
    }

    /// Creates an empty map sized for at least `capacity` buckets.
    ///
    /// The request is snapped to the next prime of the policy table and then
    /// to a power of two. A request of zero is treated as four.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_map::HashMap;
    ///
    /// let map: HashMap<u32, u32> = HashMap::with_capacity(100);
    /// // 100 snaps to the prime 127, then to 128.
    /// assert_eq!(map.capacity(), 128);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_strategy(capacity, Fnv1a)
    }
}

impl<K, V, S> HashMap<K, V, S> {
    /// Creates an empty map with the default capacity request that hashes
    /// keys with `strategy`.
    pub fn with_strategy(strategy: S) -> Self {
        Self::with_capacity_and_strategy(policy::DEFAULT_CAPACITY, strategy)
    }

    /// Creates an empty map sized for at least `capacity` buckets that hashes
    /// keys with `strategy`.
    pub fn with_capacity_and_strategy(capacity: usize, strategy: S) -> Self {
        let capacity = policy_size(if capacity == 0 {
            policy::ZERO_CAPACITY_REQUEST
        } else {
            capacity
        });
        let probe_window = policy::probe_window(capacity);

        Self {
            slots: slot_array(capacity, probe_window),
            capacity,
            len: 0,
            probe_window,
            strategy,
        }
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the power-of-two bucket count.
    ///
    /// This is not a hard limit on the number of entries: entries whose home
    /// bucket is near the end of the table may spill into a few slack slots
    /// past it. Zero after [`clear`](Self::clear).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the maximum distance, in slots, between an entry and its
    /// home bucket. Always at least four.
    pub fn probe_window(&self) -> usize {
        self.probe_window
    }

    /// Advisory load signal: `true` once the map holds at least 90% of
    /// [`capacity`](Self::capacity) entries.
    ///
    /// The map grows on its own when a probe window overflows; callers that
    /// want to grow ahead of time can check this and call
    /// [`reserve`](Self::reserve).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_map::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1u32, "one");
    /// assert!(!map.is_full());
    /// ```
    pub fn is_full(&self) -> bool {
        self.len.saturating_mul(10) >= self.capacity.saturating_mul(9)
    }

    /// Returns the map's hash strategy.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Drops every entry and releases the slot array.
    ///
    /// Capacity and length both become zero; the next insert allocates an
    /// array of the default size, as [`new`](HashMap::new) does.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_map::HashMap;
    ///
    /// let mut map = HashMap::from([(1u8, 'a'), (2, 'b')]);
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 0);
    ///
    /// map.insert(3, 'c');
    /// assert_eq!(map.get(&3), Some(&'c'));
    /// ```
    pub fn clear(&mut self) {
        self.slots = Vec::new();
        self.capacity = 0;
        self.len = 0;
        self.probe_window = policy::MIN_PROBE_WINDOW;
    }

    /// Returns a cursor at the first entry, or [`end`](Self::end) if the map
    /// is empty.
    ///
    /// Cursors walk the slot array in physical order and support erasing
    /// while traversing:
    ///
    /// ```rust
    /// use probe_map::HashMap;
    ///
    /// let mut map: HashMap<u32, u32> = (0..100).map(|i| (i, i * 2)).collect();
    ///
    /// let mut cursor = map.begin();
    /// while cursor != map.end() {
    ///     let (&key, _) = map.entry_at(cursor).unwrap();
    ///     cursor = if key % 2 == 0 {
    ///         map.erase_at(cursor)
    ///     } else {
    ///         map.advance(cursor)
    ///     };
    /// }
    ///
    /// assert_eq!(map.len(), 50);
    /// assert!(map.keys().all(|k| k % 2 == 1));
    /// ```
    pub fn begin(&self) -> Cursor {
        self.seek(0)
    }

    /// Returns the past-the-end cursor. Equal to [`Cursor::default`].
    pub fn end(&self) -> Cursor {
        Cursor::end()
    }

    /// Returns the cursor of the next entry after `cursor`.
    pub fn advance(&self, cursor: Cursor) -> Cursor {
        match cursor.index() {
            Some(index) => self.seek(index + 1),
            None => Cursor::end(),
        }
    }

    /// Returns the entry under `cursor`, or `None` for [`end`](Self::end).
    pub fn entry_at(&self, cursor: Cursor) -> Option<(&K, &V)> {
        cursor
            .index()
            .and_then(|index| self.slots.get(index))
            .and_then(Slot::pair)
    }

    /// Returns the entry under `cursor` with a mutable value.
    pub fn entry_at_mut(&mut self, cursor: Cursor) -> Option<(&K, &mut V)> {
        cursor
            .index()
            .and_then(|index| self.slots.get_mut(index))
            .and_then(Slot::pair_mut)
    }

    /// Erases the entry under `cursor` and returns the cursor of the entry
    /// that follows it.
    ///
    /// Erasing [`end`](Self::end) (or a cursor whose entry is already gone)
    /// does nothing and returns `end`.
    pub fn erase_at(&mut self, cursor: Cursor) -> Cursor {
        match cursor.index() {
            Some(index) if self.slots.get(index).is_some_and(|s| s.pair().is_some()) => {
                self.erase_index(index)
            }
            _ => Cursor::end(),
        }
    }

    /// Returns an iterator over the entries in slot-array order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_map::HashMap;
    ///
    /// let map = HashMap::from([("a", 1), ("b", 2), ("c", 3)]);
    /// let total: i32 = map.iter().map(|(_, v)| v).sum();
    /// assert_eq!(total, 6);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.slots, self.len)
    }

    /// Returns an iterator over the entries with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.slots, self.len)
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    /// Returns an iterator over mutable values.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(self.iter_mut())
    }

    /// Removes and yields every entry. The slot array and capacity are kept.
    ///
    /// Entries not consumed before the iterator is dropped are dropped with
    /// it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_map::HashMap;
    ///
    /// let mut map = HashMap::from([(1u16, "one"), (2, "two")]);
    /// let capacity = map.capacity();
    ///
    /// let mut drained: Vec<_> = map.drain().collect();
    /// drained.sort();
    /// assert_eq!(drained, [(1, "one"), (2, "two")]);
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), capacity);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain::new(&mut self.slots, &mut self.len)
    }

    /// Keeps only the entries for which `f` returns `true`.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        for slot in self.slots.iter_mut() {
            if let Slot::Active(key, value) = slot
                && !f(key, value)
            {
                slot.take();
                self.len -= 1;
            }
        }
    }

    /// Finds the next live slot at or after `from`.
    fn seek(&self, from: usize) -> Cursor {
        let mut index = from;
        while let Some(slot) = self.slots.get(index) {
            match slot {
                Slot::Empty => index += 1,
                Slot::Active(..) => return Cursor::at(index),
                Slot::Terminal => break,
            }
        }
        Cursor::end()
    }

    fn erase_index(&mut self, index: usize) -> Cursor {
        let erased = self.slots[index].take();
        debug_assert!(erased.is_some());
        self.len -= 1;
        drop(erased);
        self.seek(index + 1)
    }

    fn remove_index(&mut self, index: usize) -> Option<(K, V)> {
        let removed = self.slots[index].take();
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Scans the bounded probe window of `hash` for `key`.
    #[inline]
    fn find_hashed<Q>(&self, hash: u64, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: HashStrategy<Q>,
    {
        if self.len == 0 {
            return None;
        }

        let bucket = policy::bucket_index(hash, self.capacity);
        debug_assert!(bucket + self.probe_window < self.slots.len());
        for index in bucket..bucket + self.probe_window {
            if let Slot::Active(candidate, _) = &self.slots[index]
                && self.strategy.equal(candidate.borrow(), key)
            {
                return Some(index);
            }
        }

        None
    }

    #[inline]
    fn find_index<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: HashStrategy<Q>,
    {
        if self.len == 0 {
            return None;
        }
        self.find_hashed(self.strategy.hash(key), key)
    }

    /// Returns a cursor at the entry for `key`, or [`end`](Self::end).
    ///
    /// Only the key's probe window is inspected.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_map::HashMap;
    ///
    /// let map = HashMap::from([("k".to_string(), 1)]);
    /// let cursor = map.find("k");
    /// assert_eq!(map.entry_at(cursor), Some((&"k".to_string(), &1)));
    /// assert_eq!(map.find("missing"), map.end());
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Cursor
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: HashStrategy<Q>,
    {
        self.find_index(key).map(Cursor::at).unwrap_or_default()
    }

    /// Returns `true` if the map holds an entry for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: HashStrategy<Q>,
    {
        self.find_index(key).is_some()
    }

    /// Returns a reference to the value for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_map::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(37u64, "a");
    /// assert_eq!(map.get(&37), Some(&"a"));
    /// assert_eq!(map.get(&42), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: HashStrategy<Q>,
    {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Returns the stored key and its value.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: HashStrategy<Q>,
    {
        let index = self.find_index(key)?;
        self.slots[index].pair()
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: HashStrategy<Q>,
    {
        let index = self.find_index(key)?;
        self.slots[index].pair_mut().map(|(_, value)| value)
    }

    /// Returns the value for `key`, failing with [`Error::NotFound`] if the
    /// key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_map::Error;
    /// use probe_map::HashMap;
    ///
    /// let map = HashMap::from([(1u32, "one")]);
    /// assert_eq!(map.at(&1), Ok(&"one"));
    /// assert_eq!(map.at(&2), Err(Error::NotFound));
    /// ```
    pub fn at<Q>(&self, key: &Q) -> Result<&V, Error>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: HashStrategy<Q>,
    {
        self.get(key).ok_or(Error::NotFound)
    }

    /// Mutable form of [`at`](Self::at).
    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V, Error>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: HashStrategy<Q>,
    {
        self.get_mut(key).ok_or(Error::NotFound)
    }

    /// Erases the entry for `key` and returns the cursor of the entry that
    /// follows it in slot order, or [`end`](Self::end).
    ///
    /// The freed slot becomes reusable. Erasing an absent key is a no-op
    /// that returns `end`.
    pub fn erase<Q>(&mut self, key: &Q) -> Cursor
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: HashStrategy<Q>,
    {
        match self.find_index(key) {
            Some(index) => self.erase_index(index),
            None => Cursor::end(),
        }
    }

    /// Removes `key` and returns its value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_map::HashMap;
    ///
    /// let mut map = HashMap::from([("a", 1)]);
    /// assert_eq!(map.remove("a"), Some(1));
    /// assert_eq!(map.remove("a"), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: HashStrategy<Q>,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes `key` and returns the stored key with its value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: HashStrategy<Q>,
    {
        let index = self.find_index(key)?;
        self.remove_index(index)
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    S: HashStrategy<K>,
{
    /// Inserts or updates `key` and returns a cursor at its slot.
    ///
    /// If the key is already present only its value is replaced; the stored
    /// key is kept.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_map::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// let cursor = map.emplace("key", 1);
    /// assert_eq!(map.entry_at(cursor), Some((&"key", &1)));
    ///
    /// map.emplace("key", 2);
    /// assert_eq!(map.len(), 1);
    /// assert_eq!(map["key"], 2);
    /// ```
    pub fn emplace(&mut self, key: K, value: V) -> Cursor {
        let hash = self.strategy.hash(&key);
        let (index, _) = self.insert_hashed(hash, key, value);
        Cursor::at(index)
    }

    /// Inserts or updates `key`, returning the value it replaced.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_map::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// assert_eq!(map.insert(37u32, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.strategy.hash(&key);
        self.insert_hashed(hash, key, value).1
    }

    /// Gets the entry for `key` for in-place manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_map::HashMap;
    ///
    /// let mut counts: HashMap<&str, u32> = HashMap::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.entry(word).or_insert(0) += 1;
    /// }
    /// assert_eq!(counts["a"], 2);
    /// assert_eq!(counts["b"], 1);
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, S> {
        let hash = self.strategy.hash(&key);
        match self.find_hashed(hash, &key) {
            Some(index) => Entry::Occupied(OccupiedEntry { map: self, index }),
            None => Entry::Vacant(VacantEntry {
                map: self,
                hash,
                key,
            }),
        }
    }

    /// Indexing accessor: returns the value for `key`, inserting
    /// `V::default()` first if the key is absent.
    ///
    /// On a hit the existing value is returned unchanged and `key` is
    /// dropped, so keys should be cheap to construct and move.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_map::HashMap;
    ///
    /// let mut map: HashMap<String, Vec<u32>> = HashMap::new();
    /// map.get_or_default("ids".to_string()).push(7);
    /// map.get_or_default("ids".to_string()).push(9);
    /// assert_eq!(map["ids"], [7, 9]);
    /// ```
    pub fn get_or_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.entry(key).or_default()
    }

    /// Grows the map to at least `capacity` buckets.
    ///
    /// Unlike `std`, the argument is a total bucket count, not an additional
    /// element count. Does nothing if the policy size for `capacity` is not
    /// larger than the current capacity; never shrinks.
    ///
    /// # Panics
    ///
    /// Panics if the new bucket count overflows `usize`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_map::HashMap;
    ///
    /// let mut map: HashMap<u32, u32> = HashMap::new();
    /// map.reserve(1000);
    /// assert_eq!(map.capacity(), 1024);
    ///
    /// map.reserve(10);
    /// assert_eq!(map.capacity(), 1024);
    /// ```
    pub fn reserve(&mut self, capacity: usize) {
        let requested = if capacity == 0 {
            policy::ZERO_CAPACITY_REQUEST
        } else {
            capacity
        };
        self.grow(requested);
    }

    /// Fallible form of [`reserve`](Self::reserve).
    ///
    /// On error the map is left exactly as it was: the new slot array is
    /// allocated in full before any entry moves.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_map::Error;
    /// use probe_map::HashMap;
    ///
    /// let mut map: HashMap<u32, u32> = HashMap::new();
    /// assert_eq!(map.try_reserve(usize::MAX), Err(Error::CapacityOverflow));
    /// assert!(map.try_reserve(400).is_ok());
    /// assert_eq!(map.capacity(), 512);
    /// ```
    pub fn try_reserve(&mut self, capacity: usize) -> Result<(), Error> {
        let requested = if capacity == 0 {
            policy::ZERO_CAPACITY_REQUEST
        } else {
            capacity
        };
        let capacity = policy::next_size(requested).ok_or(Error::CapacityOverflow)?;
        if capacity <= self.capacity {
            return Ok(());
        }

        let probe_window = policy::probe_window(capacity);
        let slots = try_slot_array(capacity, probe_window)?;
        self.rehash_into(slots, capacity, probe_window);
        Ok(())
    }

    /// Inserts with a precomputed hash, growing until the key fits.
    ///
    /// Returns the slot index that holds the key and the replaced value, if
    /// any.
    fn insert_hashed(&mut self, hash: u64, key: K, value: V) -> (usize, Option<V>) {
        let mut pending = (key, value);
        loop {
            match self.try_place(hash, pending.0, pending.1) {
                Ok(placed) => return placed,
                Err(returned) => {
                    trace_log!(
                        "probe window of {} exhausted at capacity {} with {} entries",
                        self.probe_window,
                        self.capacity,
                        self.len
                    );
                    pending = returned;
                    let requested = if self.capacity == 0 {
                        policy::DEFAULT_CAPACITY
                    } else {
                        policy::grow_request(self.capacity)
                    };
                    self.grow(requested);
                }
            }
        }
    }

    /// One bounded probe: update an equal key anywhere in the window, or fill
    /// the first empty slot of the window. Hands the pair back if the window
    /// has neither, or if a new key would push `len` past `capacity`.
    #[inline]
    fn try_place(&mut self, hash: u64, key: K, value: V) -> Result<(usize, Option<V>), (K, V)> {
        if self.capacity == 0 {
            return Err((key, value));
        }

        let bucket = policy::bucket_index(hash, self.capacity);
        debug_assert!(bucket + self.probe_window < self.slots.len());

        let mut vacant = None;
        for index in bucket..bucket + self.probe_window {
            match &mut self.slots[index] {
                Slot::Active(existing, current) if self.strategy.equal(&*existing, &key) => {
                    return Ok((index, Some(core::mem::replace(current, value))));
                }
                Slot::Empty if vacant.is_none() => vacant = Some(index),
                _ => {}
            }
        }

        match vacant {
            Some(_) if self.len >= self.capacity => Err((key, value)),
            Some(index) => {
                self.slots[index].fill(key, value);
                self.len += 1;
                Ok((index, None))
            }
            None => Err((key, value)),
        }
    }

    fn grow(&mut self, requested: usize) {
        let capacity = policy_size(requested);
        if capacity <= self.capacity {
            return;
        }

        let probe_window = policy::probe_window(capacity);
        self.rehash_into(slot_array(capacity, probe_window), capacity, probe_window);
    }

    /// Moves every entry into `slots`, which must be a fresh array for
    /// `capacity` buckets.
    ///
    /// Entries are placed with the bounded probe only. If one does not fit,
    /// everything placed so far is gathered back and the move restarts on an
    /// array sized for `grow_request(capacity)`, until every entry fits.
    fn rehash_into(&mut self, slots: Vec<Slot<K, V>>, capacity: usize, probe_window: usize) {
        debug_log!(
            "growing table from {} to {} buckets (probe window {}, {} entries)",
            self.capacity,
            capacity,
            probe_window,
            self.len
        );

        let mut pending = core::mem::replace(&mut self.slots, slots);
        self.capacity = capacity;
        self.probe_window = probe_window;
        self.len = 0;

        loop {
            let mut entries = pending.into_iter().filter_map(Slot::into_pair);
            let mut overflow = None;
            for (key, value) in entries.by_ref() {
                let hash = self.strategy.hash(&key);
                if let Err(pair) = self.try_place(hash, key, value) {
                    overflow = Some(pair);
                    break;
                }
            }

            let Some((key, value)) = overflow else {
                return;
            };

            let mut unplaced: Vec<Slot<K, V>> = Vec::new();
            unplaced.push(Slot::Active(key, value));
            unplaced.extend(entries.map(|(key, value)| Slot::Active(key, value)));

            let capacity = policy_size(policy::grow_request(self.capacity));
            let probe_window = policy::probe_window(capacity);
            debug_log!(
                "entry did not fit during resize, restarting at {} buckets (probe window {})",
                capacity,
                probe_window
            );

            pending = core::mem::replace(&mut self.slots, slot_array(capacity, probe_window));
            pending.extend(unplaced);
            self.capacity = capacity;
            self.probe_window = probe_window;
            self.len = 0;
        }
    }

    /// Computes a histogram of probe distances for the current map state.
    ///
    /// Bin `d` counts the entries stored `d` slots past their home bucket;
    /// the result has `probe_window` bins.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> Vec<usize> {
        let mut hist = alloc::vec![0usize; self.probe_window];
        for (index, slot) in self.slots.iter().enumerate() {
            if let Slot::Active(key, _) = slot {
                let bucket = policy::bucket_index(self.strategy.hash(key), self.capacity);
                hist[index - bucket] += 1;
            }
        }
        hist
    }

    /// Returns occupancy and probe-distance statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let hist = self.probe_histogram();
        let max_probe_distance = hist.iter().rposition(|&count| count > 0).unwrap_or(0);
        let total_distance: usize = hist
            .iter()
            .enumerate()
            .map(|(distance, &count)| distance * count)
            .sum();

        DebugStats {
            populated: self.len,
            capacity: self.capacity,
            probe_window: self.probe_window,
            total_slots: self.slots.len(),
            load_factor: if self.capacity == 0 {
                0.0
            } else {
                self.len as f64 / self.capacity as f64
            },
            max_probe_distance,
            mean_probe_distance: if self.len == 0 {
                0.0
            } else {
                total_distance as f64 / self.len as f64
            },
            total_bytes: self.slots.capacity() * core::mem::size_of::<Slot<K, V>>(),
        }
    }
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Creates an unallocated map with capacity zero, the same state
/// [`clear`](HashMap::clear) leaves behind. The first insert allocates the
/// default-sized array.
impl<K, V, S> Default for HashMap<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            capacity: 0,
            len: 0,
            probe_window: policy::MIN_PROBE_WINDOW,
            strategy: S::default(),
        }
    }
}

/// Two maps are equal when they have the same capacity and length and hold
/// equal entries at parallel positions of their slot arrays.
///
/// This is a layout comparison: a map and its clone are equal, but two maps
/// holding the same entries after different insert/erase histories may not
/// be.
impl<K, V, S> PartialEq for HashMap<K, V, S>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        if self.capacity != other.capacity || self.len != other.len {
            return false;
        }
        self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K, V, S> Eq for HashMap<K, V, S>
where
    K: Eq,
    V: Eq,
{
}

impl<K, Q, V, S> Index<&Q> for HashMap<K, V, S>
where
    K: Borrow<Q>,
    Q: ?Sized,
    S: HashStrategy<Q>,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present. Use [`HashMap::at`] for a fallible
    /// lookup.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("no entry found for key"),
        }
    }
}

impl<K, V, S> Extend<(K, V)> for HashMap<K, V, S>
where
    S: HashStrategy<K>,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashMap<K, V, S>
where
    S: HashStrategy<K> + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let mut map = Self::with_capacity_and_strategy(iter.size_hint().0, S::default());
        map.extend(iter);
        map
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for HashMap<K, V>
where
    Fnv1a: HashStrategy<K>,
{
    /// Builds a map from a list of pairs. Later duplicates overwrite earlier
    /// values.
    fn from(pairs: [(K, V); N]) -> Self {
        let mut map = Self::with_capacity(N);
        map.extend(pairs);
        map
    }
}

impl<K, V, S> IntoIterator for HashMap<K, V, S> {
    type IntoIter = IntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.slots, self.len)
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut HashMap<K, V, S> {
    type IntoIter = IterMut<'a, K, V>;
    type Item = (&'a K, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A view into a single entry of a [`HashMap`], which may be vacant or
/// occupied.
///
/// Constructed by [`HashMap::entry`].
pub enum Entry<'a, K, V, S> {
    /// The key is present.
    Occupied(OccupiedEntry<'a, K, V, S>),
    /// The key is absent.
    Vacant(VacantEntry<'a, K, V, S>),
}

impl<'a, K, V, S> Entry<'a, K, V, S>
where
    S: HashStrategy<K>,
{
    /// Inserts `default` if the entry is vacant and returns the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns
    /// the value.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Inserts `V::default()` if the entry is vacant and returns the value.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(V::default)
    }
}

impl<'a, K, V, S> Entry<'a, K, V, S> {
    /// Runs `f` on the value if the entry is occupied.
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

    /// Returns the entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

/// An entry whose key is present in the map.
pub struct OccupiedEntry<'a, K, V, S> {
    map: &'a mut HashMap<K, V, S>,
    index: usize,
}

impl<'a, K, V, S> OccupiedEntry<'a, K, V, S> {
    fn pair(&self) -> (&K, &V) {
        match &self.map.slots[self.index] {
            Slot::Active(key, value) => (key, value),
            _ => unreachable!("occupied entry points at a live slot"),
        }
    }

    /// Returns the stored key.
    pub fn key(&self) -> &K {
        self.pair().0
    }

    /// Returns the value.
    pub fn get(&self) -> &V {
        self.pair().1
    }

    /// Returns the value mutably.
    pub fn get_mut(&mut self) -> &mut V {
        match &mut self.map.slots[self.index] {
            Slot::Active(_, value) => value,
            _ => unreachable!("occupied entry points at a live slot"),
        }
    }

    /// Converts the entry into a mutable reference bound to the map.
    pub fn into_mut(self) -> &'a mut V {
        match &mut self.map.slots[self.index] {
            Slot::Active(_, value) => value,
            _ => unreachable!("occupied entry points at a live slot"),
        }
    }

    /// Replaces the value, returning the old one.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Returns a cursor at this entry's slot.
    pub fn cursor(&self) -> Cursor {
        Cursor::at(self.index)
    }

    /// Removes the entry, returning its value.
    pub fn remove(self) -> V {
        self.remove_entry().1
    }

    /// Removes the entry, returning the stored key and value.
    pub fn remove_entry(self) -> (K, V) {
        match self.map.remove_index(self.index) {
            Some(pair) => pair,
            None => unreachable!("occupied entry points at a live slot"),
        }
    }
}

/// An entry whose key is absent from the map.
pub struct VacantEntry<'a, K, V, S> {
    map: &'a mut HashMap<K, V, S>,
    hash: u64,
    key: K,
}

impl<'a, K, V, S> VacantEntry<'a, K, V, S> {
    /// Returns the key that would be inserted.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Takes back the key.
    pub fn into_key(self) -> K {
        self.key
    }
}

impl<'a, K, V, S> VacantEntry<'a, K, V, S>
where
    S: HashStrategy<K>,
{
    /// Inserts `value` under the entry's key, growing the map if the key's
    /// probe window is full.
    pub fn insert(self, value: V) -> &'a mut V {
        let map = self.map;
        let (index, _) = map.insert_hashed(self.hash, self.key, value);
        match &mut map.slots[index] {
            Slot::Active(_, value) => value,
            _ => unreachable!("insert returns the index of a live slot"),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use core::hash::BuildHasher;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use rand::rngs::SmallRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::strategy::BuildHasherStrategy;
    use crate::strategy::FnvKey;
    use crate::strategy::FnvState;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    type SipStrategy = BuildHasherStrategy<SipHashBuilder>;

    /// Sends every key to bucket zero.
    #[derive(Clone, Copy, Default)]
    struct Colliding;

    impl HashStrategy<u64> for Colliding {
        fn hash(&self, _key: &u64) -> u64 {
            0
        }

        fn equal(&self, a: &u64, b: &u64) -> bool {
            a == b
        }
    }

    /// Uses the key itself as its hash, so key `k` lands in bucket
    /// `k % capacity`.
    #[derive(Clone, Copy, Default)]
    struct Identity;

    impl HashStrategy<u64> for Identity {
        fn hash(&self, key: &u64) -> u64 {
            *key
        }

        fn equal(&self, a: &u64, b: &u64) -> bool {
            a == b
        }
    }

    fn assert_invariants<K, V, S: HashStrategy<K>>(map: &HashMap<K, V, S>) {
        let live = map.slots.iter().filter(|s| s.pair().is_some()).count();
        assert_eq!(live, map.len());
        assert!(
            map.len() <= map.capacity(),
            "len {} > capacity {}",
            map.len(),
            map.capacity()
        );
        assert_eq!(map.iter().count(), map.len());
        if map.capacity() == 0 {
            assert!(map.slots.is_empty());
            return;
        }

        assert!(map.capacity().is_power_of_two());
        assert!(map.probe_window() >= policy::MIN_PROBE_WINDOW);
        assert_eq!(
            map.slots.len(),
            map.capacity() + map.probe_window() + 1
        );
        assert_eq!(map.slots.iter().filter(|s| s.is_terminal()).count(), 1);
        assert!(map.slots.last().is_some_and(Slot::is_terminal));
        let histogram = map.probe_histogram();
        assert_eq!(histogram.iter().sum::<usize>(), map.len());
    }

    #[test]
    fn insert_and_find() {
        let mut map: HashMap<u64, i32, SipStrategy> = HashMap::with_capacity_and_strategy(
            0,
            BuildHasherStrategy(SipHashBuilder::default()),
        );
        for k in 0..32u64 {
            assert_eq!(map.insert(k, (k as i32) * 2), None, "{:#?}", map);
            assert_eq!(map.get(&k), Some(&((k as i32) * 2)), "{:#?}", map);
        }
        assert_eq!(map.len(), 32);
        for k in 0..32u64 {
            assert_eq!(map.get(&k), Some(&((k as i32) * 2)), "{:#?}", map);
        }

        assert!(map.get(&999).is_none());
        assert_invariants(&map);
    }

    #[test]
    fn upsert_keeps_stored_key_and_len() {
        #[derive(Debug, Clone)]
        struct Tagged(&'static str, u32);

        impl PartialEq for Tagged {
            fn eq(&self, other: &Self) -> bool {
                self.1 == other.1
            }
        }

        impl FnvKey for Tagged {
            fn write_key(&self, state: &mut FnvState) {
                self.1.write_key(state);
            }
        }

        let mut map = HashMap::new();
        map.emplace(Tagged("first", 1), "a");
        map.emplace(Tagged("second", 1), "b");

        assert_eq!(map.len(), 1);
        let (key, value) = map.iter().next().unwrap();
        assert_eq!(key.0, "first");
        assert_eq!(*value, "b");
    }

    #[test]
    fn upsert_after_erase_hole_does_not_duplicate() {
        let mut map: HashMap<u64, u64, Colliding> = HashMap::with_strategy(Colliding);
        map.insert(1, 10);
        map.insert(2, 20);
        map.insert(3, 30);

        // Opens a hole at the start of the shared window.
        assert_eq!(map.remove(&1), Some(10));
        assert_eq!(map.insert(3, 31), Some(30));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&3), Some(&31));
        assert_eq!(map.keys().filter(|&&k| k == 3).count(), 1);

        // The hole is reused by a new key.
        map.insert(4, 40);
        assert_eq!(map.entry_at(map.begin()), Some((&4, &40)));
        assert_invariants(&map);
    }

    #[test]
    fn full_window_grows() {
        let mut map: HashMap<u64, u64, Colliding> = HashMap::with_capacity_and_strategy(0, Colliding);
        assert_eq!(map.capacity(), 8);
        assert_eq!(map.probe_window(), 4);

        for k in 0..4 {
            map.insert(k, k);
        }
        assert_eq!(map.capacity(), 8);

        map.insert(4, 4);
        assert!(map.capacity() > 8);
        assert!(map.probe_window() >= 5);
        for k in 0..5 {
            assert_eq!(map.get(&k), Some(&k));
        }
        assert_invariants(&map);
    }

    #[test]
    fn len_never_exceeds_capacity() {
        let mut map: HashMap<u64, u64> = HashMap::with_capacity(0);
        assert_eq!(map.capacity(), 8);
        for k in 0..300u64 {
            map.insert(k, k);
            assert!(
                map.len() <= map.capacity(),
                "len {} > capacity {} after inserting {}",
                map.len(),
                map.capacity(),
                k
            );
        }
        for k in 0..300u64 {
            assert_eq!(map.get(&k), Some(&k));
        }
        assert_invariants(&map);
    }

    #[test]
    fn new_key_at_full_length_grows_but_update_does_not() {
        let mut map: HashMap<u64, u64, Identity> = HashMap::with_capacity_and_strategy(0, Identity);
        for k in 0..8 {
            map.insert(k, k);
        }
        assert_eq!(map.len(), 8);
        assert_eq!(map.capacity(), 8);

        assert_eq!(map.insert(3, 30), Some(3));
        *map.entry(5).or_insert(0) += 100;
        *map.get_or_default(6) += 1;
        assert_eq!(map.capacity(), 8);
        assert_eq!(map[&5], 105);
        assert_eq!(map[&6], 7);

        // Bucket 7 still has an empty slot in its window.
        assert_eq!(map.insert(15, 15), None);
        assert!(map.capacity() > 8);
        assert_eq!(map.len(), 9);
        for k in 0..8 {
            assert!(map.contains_key(&k));
        }
        assert_eq!(map.get(&15), Some(&15));
        assert_invariants(&map);
    }

    #[test]
    fn resize_restarts_until_entries_fit() {
        let mut map: HashMap<u64, u64, Colliding> = HashMap::with_capacity_and_strategy(0, Colliding);
        for k in 0..6 {
            map.insert(k, k * 10);
        }
        assert_eq!(map.capacity(), 128);
        assert_eq!(map.probe_window(), 7);

        // Six keys sharing one bucket overflow the 4-slot window at 8 buckets
        // and the 5-slot window at 32 before fitting at 128.
        map.rehash_into(slot_array(8, 4), 8, 4);
        assert_eq!(map.capacity(), 128);
        assert_eq!(map.probe_window(), 7);
        assert_eq!(map.len(), 6);
        for k in 0..6 {
            assert_eq!(map.get(&k), Some(&(k * 10)));
        }
        assert_invariants(&map);
    }

    #[test]
    fn growth_terminates_from_capacity_four() {
        let mut map: HashMap<u64, u64> = HashMap::with_capacity(4);
        for k in 0..50_000u64 {
            map.insert(k, k ^ 0xabcd);
        }
        assert_eq!(map.len(), 50_000);
        for k in 0..50_000u64 {
            assert_eq!(map.get(&k), Some(&(k ^ 0xabcd)));
        }
        assert_invariants(&map);
    }

    #[test]
    fn find_contains_at() {
        let mut map = HashMap::new();
        map.insert("hello".to_string(), 1);

        assert!(map.contains_key("hello"));
        assert!(!map.contains_key("world"));
        assert_ne!(map.find("hello"), map.end());
        assert_eq!(map.find("world"), map.end());
        assert_eq!(map.at("hello"), Ok(&1));
        assert_eq!(map.at("world"), Err(Error::NotFound));

        *map.at_mut("hello").unwrap() += 1;
        assert_eq!(map["hello"], 2);
        assert_eq!(map.at_mut("world"), Err(Error::NotFound));
    }

    #[test]
    #[should_panic(expected = "no entry found for key")]
    fn index_panics_on_miss() {
        let map: HashMap<String, u32> = HashMap::new();
        let _value: u32 = map["missing"];
    }

    #[test]
    fn get_or_default_upserts_default_on_miss_only() {
        let mut map: HashMap<&str, u32> = HashMap::new();
        *map.get_or_default("a") += 5;
        *map.get_or_default("a") += 1;
        assert_eq!(map["a"], 6);
        assert_eq!(*map.get_or_default("b"), 0);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn erase_returns_next_live_slot() {
        let mut map: HashMap<u64, u64, Colliding> = HashMap::with_strategy(Colliding);
        map.insert(1, 1);
        map.insert(2, 2);
        map.insert(3, 3);

        let after = map.erase(&1);
        assert_eq!(map.entry_at(after), Some((&2, &2)));
        let after = map.erase(&3);
        assert_eq!(after, map.end());
        assert_eq!(map.erase(&42), map.end());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn erase_at_end_is_noop() {
        let mut map = HashMap::from([(1u32, 1u32)]);
        assert_eq!(map.erase_at(map.end()), map.end());
        assert_eq!(map.len(), 1);

        let cursor = map.begin();
        map.erase_at(cursor);
        assert_eq!(map.erase_at(cursor), map.end());
        assert!(map.is_empty());
    }

    #[test]
    fn erase_all_while_iterating() {
        let mut map = HashMap::new();
        for i in 0..4096 {
            map.insert(i.to_string(), i.to_string());
        }
        assert_eq!(map.len(), 4096);
        assert_eq!(map.get("2048"), Some(&"2048".to_string()));

        let mut cursor = map.begin();
        let mut erased = 0;
        while cursor != map.end() {
            cursor = map.erase_at(cursor);
            erased += 1;
        }

        assert_eq!(erased, 4096);
        assert_eq!(map.len(), 0);
        assert_eq!(map.begin(), map.end());
        assert_invariants(&map);
    }

    #[test]
    fn cursor_traversal_visits_every_entry_once() {
        let map: HashMap<u64, u64> = (0..1000).map(|k| (k, k)).collect();
        let mut seen = vec![false; 1000];
        let mut cursor = map.begin();
        while cursor != map.end() {
            let (&k, _) = map.entry_at(cursor).unwrap();
            assert!(!seen[k as usize]);
            seen[k as usize] = true;
            cursor = map.advance(cursor);
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(map.advance(map.end()), map.end());
        assert_eq!(map.entry_at(map.end()), None);
    }

    #[test]
    fn entry_at_mut_updates_value() {
        let mut map = HashMap::from([(7u8, 1u8)]);
        let cursor = map.begin();
        if let Some((_, value)) = map.entry_at_mut(cursor) {
            *value = 9;
        }
        assert_eq!(map[&7], 9);
    }

    #[test]
    fn remove_items() {
        let mut map = HashMap::with_strategy(BuildHasherStrategy(SipHashBuilder::default()));
        for k in 0..100u64 {
            map.insert(k, k * 3);
        }
        for k in (0..100u64).step_by(2) {
            assert_eq!(map.remove_entry(&k), Some((k, k * 3)));
        }
        assert_eq!(map.len(), 50);
        for k in 0..100u64 {
            assert_eq!(map.contains_key(&k), k % 2 == 1);
        }
        assert_invariants(&map);
    }

    #[test]
    fn clear_releases_and_reallocates() {
        let tracker = Rc::new(());
        let mut map = HashMap::new();
        for k in 0..10u32 {
            map.insert(k, Rc::clone(&tracker));
        }
        assert_eq!(Rc::strong_count(&tracker), 11);

        map.clear();
        assert_eq!(Rc::strong_count(&tracker), 1);
        assert_eq!(map.capacity(), 0);
        assert!(map.is_full());
        assert_eq!(map.begin(), map.end());
        assert!(map.get(&1).is_none());
        assert_invariants(&map);

        map.insert(1, Rc::clone(&tracker));
        assert!(map.capacity().is_power_of_two());
        assert!(map.contains_key(&1));
        assert_invariants(&map);
    }

    #[test]
    fn drop_releases_every_payload() {
        let tracker = Rc::new(());
        {
            let mut map = HashMap::with_capacity(4);
            for k in 0..500u32 {
                map.insert(k, Rc::clone(&tracker));
            }
            // Overwrites drop the old value.
            map.insert(0, Rc::clone(&tracker));
            assert_eq!(Rc::strong_count(&tracker), 501);
            map.remove(&1);
            assert_eq!(Rc::strong_count(&tracker), 500);
        }
        assert_eq!(Rc::strong_count(&tracker), 1);
    }

    #[test]
    fn reserve_grows_only() {
        let mut map: HashMap<u32, u32> = HashMap::new();
        assert_eq!(map.capacity(), 32);
        map.reserve(0);
        assert_eq!(map.capacity(), 32);
        map.reserve(4096);
        assert_eq!(map.capacity(), 8192);
        assert_eq!(map.probe_window(), 13);
        map.reserve(100);
        assert_eq!(map.capacity(), 8192);
    }

    #[test]
    fn reserve_preserves_entries() {
        let mut map: HashMap<String, usize> = HashMap::with_capacity(0);
        for i in 0..100 {
            map.insert(format!("key_{i}"), i);
        }
        map.reserve(10_000);
        for i in 0..100 {
            assert_eq!(map.get(format!("key_{i}").as_str()), Some(&i));
        }
        assert_invariants(&map);
    }

    #[test]
    fn try_reserve_failure_leaves_map_intact() {
        let mut map = HashMap::from([(1u64, 1u64), (2, 2)]);
        let before = map.clone();

        assert_eq!(map.try_reserve(usize::MAX), Err(Error::CapacityOverflow));
        #[cfg(target_pointer_width = "64")]
        assert!(matches!(map.try_reserve(1 << 62), Err(Error::Alloc(_))));

        assert_eq!(map, before);
        assert_eq!(map.get(&2), Some(&2));
    }

    #[test]
    fn full_is_advisory() {
        let mut map: HashMap<u64, u64> = HashMap::with_capacity(0);
        assert_eq!(map.capacity(), 8);
        assert!(!map.is_full());
        let mut k = 0;
        while !map.is_full() {
            map.insert(k, k);
            k += 1;
        }
        assert!(map.len() * 10 >= map.capacity() * 9);
    }

    #[test]
    fn default_construction_scenario() {
        let mut map: HashMap<String, String> = HashMap::default();
        map.insert("k".to_string(), "v".to_string());
        assert!(map.capacity().is_power_of_two());
        assert!(map.capacity() >= 4);
        assert!(!map.is_full());
    }

    #[test]
    fn clone_is_independent_and_equal() {
        let mut original: HashMap<String, i32> = HashMap::new();
        for (key, value) in [("hello", 1), ("world", 2), ("rust", 3)] {
            original.insert(key.to_string(), value);
        }

        let mut cloned = original.clone();
        assert_eq!(cloned, original);

        cloned.erase("hello");
        *cloned.get_mut("world").unwrap() = 99;
        assert_ne!(cloned, original);
        assert_eq!(original.len(), 3);
        assert_eq!(original["hello"], 1);
        assert_eq!(original["world"], 2);
    }

    #[test]
    fn equality_checks_capacity_and_values() {
        let a = HashMap::from([(1u32, 1u32)]);
        let mut b = HashMap::with_capacity(1000);
        b.insert(1u32, 1u32);
        assert_ne!(a, b);

        let mut c = a.clone();
        c.insert(1, 2);
        assert_ne!(a, c);
    }

    #[test]
    fn take_leaves_empty_source() {
        let mut source = HashMap::from([(1u8, 2u8)]);
        let moved = core::mem::take(&mut source);
        assert_eq!(moved.len(), 1);
        assert!(source.is_empty());
        assert_eq!(source.capacity(), 0);
        assert!(source.slots.is_empty());
        assert_eq!(source.begin(), source.end());
        assert_invariants(&source);
    }

    #[test]
    fn default_is_unallocated_until_first_insert() {
        let mut map: HashMap<u32, u32> = HashMap::default();
        assert_eq!(map.capacity(), 0);
        assert_eq!(map.slots.capacity(), 0);
        assert_eq!(map.probe_window(), policy::MIN_PROBE_WINDOW);
        assert_eq!(map.iter().count(), 0);
        assert_eq!(map.get(&1), None);
        assert_invariants(&map);

        map.insert(1, 1);
        assert_eq!(map.capacity(), policy::next_size(policy::DEFAULT_CAPACITY).unwrap());
        assert_eq!(map.get(&1), Some(&1));
        assert_invariants(&map);
    }

    #[test]
    fn iterators_agree() {
        let mut map: HashMap<u64, u64> = (0..200).map(|k| (k, k * 2)).collect();
        assert_eq!(map.iter().len(), 200);
        assert_eq!(map.keys().sum::<u64>(), (0..200).sum::<u64>());
        assert_eq!(map.values().sum::<u64>(), (0..200).map(|k| k * 2).sum::<u64>());

        for value in map.values_mut() {
            *value += 1;
        }
        for (k, v) in &mut map {
            assert_eq!(*v, k * 2 + 1);
        }

        let mut owned: Vec<(u64, u64)> = map.into_iter().collect();
        owned.sort();
        assert_eq!(owned.len(), 200);
        assert_eq!(owned[10], (10, 21));
    }

    #[test]
    fn drain_keeps_capacity() {
        let mut map: HashMap<u64, String> = (0..64).map(|k| (k, k.to_string())).collect();
        let capacity = map.capacity();
        {
            let mut drain = map.drain();
            assert_eq!(drain.len(), 64);
            drain.next();
        }
        assert!(map.is_empty());
        assert_eq!(map.capacity(), capacity);
        assert_invariants(&map);
    }

    #[test]
    fn retain_filters() {
        let mut map: HashMap<u64, u64> = (0..100).map(|k| (k, k)).collect();
        map.retain(|k, v| {
            *v += 1;
            k % 3 == 0
        });
        assert_eq!(map.len(), 34);
        assert!(map.iter().all(|(k, v)| k % 3 == 0 && *v == k + 1));
        assert_invariants(&map);
    }

    #[test]
    fn entry_api() {
        let mut map: HashMap<i32, String> = HashMap::new();

        let value = map.entry(1).or_insert("hello".to_string());
        assert_eq!(value, "hello");

        let value = map.entry(1).or_insert("world".to_string());
        assert_eq!(value, "hello");
        assert_eq!(map.len(), 1);

        map.entry(2).or_insert_with(|| "computed".to_string());
        assert_eq!(map[&2], "computed");

        map.entry(1)
            .and_modify(|v| v.push_str(" world"))
            .or_insert("default".to_string());
        assert_eq!(map[&1], "hello world");
        assert_eq!(map.entry(3).key(), &3);

        match map.entry(1) {
            Entry::Occupied(mut entry) => {
                assert_eq!(entry.key(), &1);
                assert_eq!(entry.insert("new".to_string()), "hello world");
                let cursor = entry.cursor();
                assert_eq!(entry.remove_entry(), (1, "new".to_string()));
                assert_ne!(cursor, Cursor::end());
            }
            Entry::Vacant(_) => panic!("expected occupied entry"),
        }

        match map.entry(5) {
            Entry::Vacant(entry) => {
                assert_eq!(entry.key(), &5);
                *entry.insert("five".to_string()) += "!";
            }
            Entry::Occupied(_) => panic!("expected vacant entry"),
        }
        assert_eq!(map[&5], "five!");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn vacant_insert_can_grow() {
        let mut map: HashMap<u64, u64, Colliding> = HashMap::with_capacity_and_strategy(0, Colliding);
        for k in 0..4 {
            map.insert(k, k);
        }
        match map.entry(100) {
            Entry::Vacant(entry) => assert_eq!(*entry.insert(7), 7),
            Entry::Occupied(_) => panic!("expected vacant entry"),
        }
        assert_eq!(map.get(&100), Some(&7));
        assert_eq!(map.len(), 5);
        assert_invariants(&map);
    }

    #[test]
    fn randomized_against_std() {
        let mut rng = SmallRng::seed_from_u64(0xdead_beef);
        let mut map: HashMap<u32, u32> = HashMap::with_capacity(4);
        let mut model = std::collections::HashMap::new();

        for _ in 0..20_000 {
            let key = rng.random_range(0..2_000u32);
            match rng.random_range(0..4u8) {
                0 | 1 => {
                    let value = rng.random();
                    assert_eq!(map.insert(key, value), model.insert(key, value));
                }
                2 => assert_eq!(map.remove(&key), model.remove(&key)),
                _ => assert_eq!(map.get(&key), model.get(&key)),
            }
            assert_eq!(map.len(), model.len());
        }
        assert_invariants(&map);
    }

    #[test]
    fn histogram_output() {
        let map: HashMap<u64, u64> = (0..10_000).map(|k| (k, k)).collect();
        let stats = map.debug_stats();
        assert_eq!(stats.populated, 10_000);
        assert!(stats.max_probe_distance < map.probe_window());
        assert_eq!(stats.total_slots, map.capacity() + map.probe_window() + 1);

        #[cfg(feature = "std")]
        stats.print();
    }
}

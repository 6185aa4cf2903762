use core::borrow::Borrow;
use core::fmt::Debug;
use core::iter::FusedIterator;

use crate::hash_map::HashMap;
use crate::iter;
use crate::strategy::Fnv1a;
use crate::strategy::HashStrategy;

/// A hash set built on [`HashMap`] with unit values.
///
/// Storage, growth and probing behave exactly as in the map.
///
/// # Examples
///
/// ```rust
/// use probe_map::HashSet;
///
/// let mut seen = HashSet::new();
/// assert!(seen.insert("apple"));
/// assert!(!seen.insert("apple"));
/// assert!(seen.contains("apple"));
/// assert_eq!(seen.len(), 1);
/// ```
#[derive(Clone)]
pub struct HashSet<T, S = Fnv1a> {
    map: HashMap<T, (), S>,
}

impl<T> HashSet<T> {
    /// Creates an empty set with the default capacity request and the
    /// [`Fnv1a`] strategy.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Creates an empty set sized for at least `capacity` buckets.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
        }
    }
}

impl<T, S> HashSet<T, S> {
    /// Creates an empty set that hashes values with `strategy`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::collections::hash_map::RandomState;
    ///
    /// use probe_map::BuildHasherStrategy;
    /// use probe_map::HashSet;
    ///
    /// let mut set = HashSet::with_strategy(BuildHasherStrategy(RandomState::new()));
    /// set.insert((1, 2));
    /// assert!(set.contains(&(1, 2)));
    /// ```
    pub fn with_strategy(strategy: S) -> Self {
        Self {
            map: HashMap::with_strategy(strategy),
        }
    }

    /// Creates an empty set sized for at least `capacity` buckets that hashes
    /// values with `strategy`.
    pub fn with_capacity_and_strategy(capacity: usize, strategy: S) -> Self {
        Self {
            map: HashMap::with_capacity_and_strategy(capacity, strategy),
        }
    }

    /// Returns the number of values in the set.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set holds no values.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the power-of-two bucket count of the underlying map.
    pub fn capacity(&self) -> usize {
        self.map.capacity()
    }

    /// Drops every value and releases the slot array.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns an iterator over the values in slot-array order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.map.keys(),
        }
    }

    /// Removes and yields every value, keeping the capacity.
    pub fn drain(&mut self) -> Drain<'_, T> {
        Drain {
            inner: self.map.drain(),
        }
    }

    /// Keeps only the values for which `f` returns `true`.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.map.retain(|value, _| f(value));
    }

    /// Returns `true` if the set contains `value`.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized,
        S: HashStrategy<Q>,
    {
        self.map.contains_key(value)
    }

    /// Returns the stored value equal to `value`.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized,
        S: HashStrategy<Q>,
    {
        self.map.get_key_value(value).map(|(stored, _)| stored)
    }

    /// Removes `value`, returning whether it was present.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized,
        S: HashStrategy<Q>,
    {
        self.map.remove(value).is_some()
    }

    /// Removes and returns the stored value equal to `value`.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized,
        S: HashStrategy<Q>,
    {
        self.map.remove_entry(value).map(|(stored, _)| stored)
    }
}

impl<T, S> HashSet<T, S>
where
    S: HashStrategy<T>,
{
    /// Adds `value`, returning `true` if it was not already present.
    ///
    /// An equal value already in the set is kept, and `value` is dropped.
    pub fn insert(&mut self, value: T) -> bool {
        self.map.insert(value, ()).is_none()
    }

    /// Adds `value`, replacing and returning an equal stored value.
    pub fn replace(&mut self, value: T) -> Option<T> {
        let previous = self.map.remove_entry(&value).map(|(stored, _)| stored);
        self.map.insert(value, ());
        previous
    }

    /// Grows the set to at least `capacity` buckets.
    pub fn reserve(&mut self, capacity: usize) {
        self.map.reserve(capacity);
    }
}

impl<T, S> Default for HashSet<T, S>
where
    S: Default,
{
    fn default() -> Self {
        Self {
            map: HashMap::default(),
        }
    }
}

/// Set equality: same length, and every value of one set is in the other.
/// Unlike [`HashMap`] equality, this does not depend on slot layout.
impl<T, S> PartialEq for HashSet<T, S>
where
    S: HashStrategy<T>,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|value| other.contains(value))
    }
}

impl<T, S> Eq for HashSet<T, S> where S: HashStrategy<T> {}

impl<T, S> Debug for HashSet<T, S>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S> Extend<T> for HashSet<T, S>
where
    S: HashStrategy<T>,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T, S> FromIterator<T> for HashSet<T, S>
where
    S: HashStrategy<T> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut set = Self::with_capacity_and_strategy(iter.size_hint().0, S::default());
        set.extend(iter);
        set
    }
}

impl<T, const N: usize> From<[T; N]> for HashSet<T>
where
    Fnv1a: HashStrategy<T>,
{
    fn from(values: [T; N]) -> Self {
        let mut set = Self::with_capacity(N);
        set.extend(values);
        set
    }
}

impl<'a, T, S> IntoIterator for &'a HashSet<T, S> {
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, S> IntoIterator for HashSet<T, S> {
    type IntoIter = IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.map.into_iter(),
        }
    }
}

/// An iterator over the values of a [`HashSet`].
pub struct Iter<'a, T> {
    inner: iter::Keys<'a, T, ()>,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// An owning iterator over the values of a [`HashSet`].
pub struct IntoIter<T> {
    inner: iter::IntoIter<T, ()>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(value, ())| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

/// A draining iterator over the values of a [`HashSet`].
pub struct Drain<'a, T> {
    inner: iter::Drain<'a, T, ()>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(value, ())| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Drain<'_, T> {}
impl<T> FusedIterator for Drain<'_, T> {}

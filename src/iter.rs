//! Cursors and iterators over a [`HashMap`](crate::HashMap).
//!
//! Every traversal walks the slot array in physical order, skips empty slots,
//! and stops at the terminal slot that closes the array.

use alloc::vec::Vec;
use core::iter::FusedIterator;
use core::slice;

use crate::slot::Slot;

/// A position in a map's slot array.
///
/// A cursor is a plain index: it does not borrow the map, and any mutation
/// that grows the map invalidates it. Cursors returned by
/// [`HashMap::erase`](crate::HashMap::erase) and
/// [`HashMap::erase_at`](crate::HashMap::erase_at) stay valid because erasing
/// never moves other entries.
///
/// The default cursor is the past-the-end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    index: usize,
}

impl Cursor {
    const END: usize = usize::MAX;

    #[inline]
    pub(crate) const fn at(index: usize) -> Self {
        Self { index }
    }

    /// The past-the-end cursor.
    #[inline]
    pub const fn end() -> Self {
        Self { index: Self::END }
    }

    /// Returns `true` for the past-the-end cursor.
    #[inline]
    pub const fn is_end(self) -> bool {
        self.index == Self::END
    }

    #[inline]
    pub(crate) fn index(self) -> Option<usize> {
        (!self.is_end()).then_some(self.index)
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::end()
    }
}

/// An iterator over the entries of a map.
///
/// Created by [`HashMap::iter`](crate::HashMap::iter).
pub struct Iter<'a, K, V> {
    slots: slice::Iter<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(slots: &'a [Slot<K, V>], len: usize) -> Self {
        Self {
            slots: slots.iter(),
            remaining: len,
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            match slot {
                Slot::Active(key, value) => {
                    self.remaining -= 1;
                    return Some((key, value));
                }
                Slot::Empty => {}
                Slot::Terminal => break,
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// An iterator over the entries of a map with mutable values.
///
/// Created by [`HashMap::iter_mut`](crate::HashMap::iter_mut).
pub struct IterMut<'a, K, V> {
    slots: slice::IterMut<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(slots: &'a mut [Slot<K, V>], len: usize) -> Self {
        Self {
            slots: slots.iter_mut(),
            remaining: len,
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            match slot {
                Slot::Active(key, value) => {
                    self.remaining -= 1;
                    return Some((&*key, value));
                }
                Slot::Empty => {}
                Slot::Terminal => break,
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// An owning iterator over the entries of a map.
///
/// Created by the map's [`IntoIterator`] implementation. Entries that are not
/// consumed are dropped with the iterator.
pub struct IntoIter<K, V> {
    slots: alloc::vec::IntoIter<Slot<K, V>>,
    remaining: usize,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(slots: Vec<Slot<K, V>>, len: usize) -> Self {
        Self {
            slots: slots.into_iter(),
            remaining: len,
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            match slot {
                Slot::Active(key, value) => {
                    self.remaining -= 1;
                    return Some((key, value));
                }
                Slot::Empty => {}
                Slot::Terminal => break,
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

/// A draining iterator over the entries of a map.
///
/// Created by [`HashMap::drain`](crate::HashMap::drain). Every entry is removed
/// from the map, whether or not it is yielded.
pub struct Drain<'a, K, V> {
    slots: slice::IterMut<'a, Slot<K, V>>,
    len: &'a mut usize,
}

impl<'a, K, V> Drain<'a, K, V> {
    pub(crate) fn new(slots: &'a mut [Slot<K, V>], len: &'a mut usize) -> Self {
        Self {
            slots: slots.iter_mut(),
            len,
        }
    }
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if slot.is_terminal() {
                break;
            }
            if let Some(pair) = slot.take() {
                *self.len -= 1;
                return Some(pair);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (*self.len, Some(*self.len))
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}
impl<K, V> FusedIterator for Drain<'_, K, V> {}

impl<K, V> Drop for Drain<'_, K, V> {
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

/// An iterator over the keys of a map.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of a map.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

/// An iterator over mutable values of a map.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> ValuesMut<'a, K, V> {
    pub(crate) fn new(inner: IterMut<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

use alloc::vec::Vec;

use crate::error::Error;
use crate::policy::slot_array_len;

/// One cell of the slot array.
///
/// The pair exists only in the `Active` state, so a payload can never be read
/// before it is constructed or after it is dropped. Erasing turns an `Active`
/// slot back into `Empty`, which makes it reusable by later inserts. Each
/// table has exactly one `Terminal` slot, at the end of its array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot<K, V> {
    Empty,
    Active(K, V),
    Terminal,
}

impl<K, V> Slot<K, V> {
    #[inline(always)]
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    #[inline(always)]
    pub(crate) fn is_terminal(&self) -> bool {
        matches!(self, Slot::Terminal)
    }

    /// Constructs a pair in an empty slot.
    #[inline]
    pub(crate) fn fill(&mut self, key: K, value: V) {
        debug_assert!(self.is_empty());
        *self = Slot::Active(key, value);
    }

    /// Moves the pair out and leaves the slot empty. Returns `None` (and
    /// leaves the slot untouched) unless the slot is active.
    #[inline]
    pub(crate) fn take(&mut self) -> Option<(K, V)> {
        if !matches!(self, Slot::Active(..)) {
            return None;
        }
        match core::mem::replace(self, Slot::Empty) {
            Slot::Active(key, value) => Some((key, value)),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn pair(&self) -> Option<(&K, &V)> {
        match self {
            Slot::Active(key, value) => Some((key, value)),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn pair_mut(&mut self) -> Option<(&K, &mut V)> {
        match self {
            Slot::Active(key, value) => Some((&*key, value)),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn into_pair(self) -> Option<(K, V)> {
        match self {
            Slot::Active(key, value) => Some((key, value)),
            _ => None,
        }
    }
}

/// Builds a fresh slot array for `capacity` buckets: every probe-able slot
/// empty, the terminal last.
pub(crate) fn slot_array<K, V>(capacity: usize, probe_window: usize) -> Vec<Slot<K, V>> {
    let len = slot_array_len(capacity, probe_window);
    let mut slots = Vec::with_capacity(len);
    fill_slot_array(&mut slots, len);
    slots
}

/// Like [`slot_array`], but reports allocation failure instead of aborting.
pub(crate) fn try_slot_array<K, V>(
    capacity: usize,
    probe_window: usize,
) -> Result<Vec<Slot<K, V>>, Error> {
    let len = slot_array_len(capacity, probe_window);
    let mut slots = Vec::new();
    slots.try_reserve_exact(len)?;
    fill_slot_array(&mut slots, len);
    Ok(slots)
}

#[inline]
fn fill_slot_array<K, V>(slots: &mut Vec<Slot<K, V>>, len: usize) {
    debug_assert!(slots.is_empty() && slots.capacity() >= len);
    slots.resize_with(len - 1, || Slot::Empty);
    slots.push(Slot::Terminal);
}

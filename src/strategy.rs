//! Pluggable hash and equality strategies.
//!
//! The map never hashes keys through [`core::hash::Hash`] directly. It asks a
//! [`HashStrategy`] for a 64-bit hash and for key equality, so the same table
//! can run on the default FNV-1a byte hash, on any std-style
//! [`BuildHasher`], or on a caller-written strategy.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::hash::BuildHasher;
use core::hash::Hash;

/// Computes hashes and compares keys of type `K` for a
/// [`HashMap`](crate::HashMap).
///
/// Implementations must be consistent: keys that compare equal must hash
/// equal. When a map is queried through a borrowed form `Q` of its key type
/// `K`, the strategy's `HashStrategy<Q>` must agree with its
/// `HashStrategy<K>` on every pair of corresponding values.
pub trait HashStrategy<K: ?Sized> {
    /// Hashes `key`.
    fn hash(&self, key: &K) -> u64;

    /// Returns `true` if the two keys are the same key.
    fn equal(&self, a: &K, b: &K) -> bool;
}

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x00000100000001B3;

/// Running FNV-1a state fed by [`FnvKey::write_key`].
#[derive(Debug, Clone, Copy)]
pub struct FnvState {
    hash: u64,
}

impl FnvState {
    /// Starts a fresh hash at the FNV offset basis.
    #[inline]
    pub const fn new() -> Self {
        Self {
            hash: FNV_OFFSET_BASIS,
        }
    }

    /// Folds `bytes` into the hash.
    #[inline]
    pub fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.hash ^= byte as u64;
            self.hash = self.hash.wrapping_mul(FNV_PRIME);
        }
    }

    /// Returns the hash of everything written so far.
    #[inline]
    pub const fn finish(&self) -> u64 {
        self.hash
    }
}

impl Default for FnvState {
    fn default() -> Self {
        Self::new()
    }
}

/// A key that can describe itself as a byte span for [`Fnv1a`].
///
/// Text and byte sequences feed their content, integers feed their native
/// in-memory bytes, and sequences feed the concatenation of their elements.
/// A `Vec<String>` therefore hashes exactly like the concatenated string.
///
/// No length or separator is fed, so distinct sequences with the same
/// concatenation share one hash. `vec![]`, `vec![""]`, `vec!["", ""]` and so
/// on all hash to the FNV offset basis. Colliding keys must fit in a single
/// probe window, and the window only widens by one slot each time capacity
/// doubles, so every extra colliding key roughly doubles the table. For
/// sequence keys that come from untrusted input, or that may contain empty
/// elements, use [`BuildHasherStrategy`], whose `Hash`-based feed prefixes
/// lengths.
///
/// Application types pick whichever field identifies them:
///
/// ```rust
/// use probe_map::FnvKey;
/// use probe_map::FnvState;
///
/// #[derive(PartialEq)]
/// struct Member {
///     id: u64,
///     nickname: String,
/// }
///
/// impl FnvKey for Member {
///     fn write_key(&self, state: &mut FnvState) {
///         self.id.write_key(state);
///     }
/// }
/// ```
pub trait FnvKey {
    /// Feeds the key's bytes into `state`.
    fn write_key(&self, state: &mut FnvState);
}

macro_rules! fnv_key_native_bytes {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FnvKey for $ty {
                #[inline]
                fn write_key(&self, state: &mut FnvState) {
                    state.write(&self.to_ne_bytes());
                }
            }
        )*
    };
}

fnv_key_native_bytes!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize
);

impl FnvKey for bool {
    #[inline]
    fn write_key(&self, state: &mut FnvState) {
        state.write(&[*self as u8]);
    }
}

impl FnvKey for char {
    #[inline]
    fn write_key(&self, state: &mut FnvState) {
        (*self as u32).write_key(state);
    }
}

impl FnvKey for str {
    #[inline]
    fn write_key(&self, state: &mut FnvState) {
        state.write(self.as_bytes());
    }
}

impl FnvKey for String {
    #[inline]
    fn write_key(&self, state: &mut FnvState) {
        self.as_str().write_key(state);
    }
}

/// Feeds the elements back to back. See [`FnvKey`] for the collisions this
/// allows.
impl<T: FnvKey> FnvKey for [T] {
    #[inline]
    fn write_key(&self, state: &mut FnvState) {
        for item in self {
            item.write_key(state);
        }
    }
}

impl<T: FnvKey, const N: usize> FnvKey for [T; N] {
    #[inline]
    fn write_key(&self, state: &mut FnvState) {
        self.as_slice().write_key(state);
    }
}

impl<T: FnvKey> FnvKey for Vec<T> {
    #[inline]
    fn write_key(&self, state: &mut FnvState) {
        self.as_slice().write_key(state);
    }
}

impl<T: FnvKey + ?Sized> FnvKey for &T {
    #[inline]
    fn write_key(&self, state: &mut FnvState) {
        (**self).write_key(state);
    }
}

impl<T: FnvKey + ?Sized> FnvKey for Box<T> {
    #[inline]
    fn write_key(&self, state: &mut FnvState) {
        (**self).write_key(state);
    }
}

/// The default strategy: FNV-1a over the key's [`FnvKey`] bytes, with the
/// key's own `PartialEq` as equality.
///
/// # Examples
///
/// ```rust
/// use probe_map::Fnv1a;
/// use probe_map::HashStrategy;
///
/// let words = vec!["ab".to_string(), "cd".to_string()];
/// assert_eq!(Fnv1a.hash(&words), Fnv1a.hash("abcd"));
/// assert_eq!(Fnv1a.hash("abcd"), Fnv1a::hash_bytes(b"abcd"));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fnv1a;

impl Fnv1a {
    /// Hashes a raw byte span.
    #[inline]
    pub fn hash_bytes(bytes: &[u8]) -> u64 {
        let mut state = FnvState::new();
        state.write(bytes);
        state.finish()
    }
}

impl<K> HashStrategy<K> for Fnv1a
where
    K: FnvKey + PartialEq + ?Sized,
{
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        let mut state = FnvState::new();
        key.write_key(&mut state);
        state.finish()
    }

    #[inline]
    fn equal(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Adapts a std-style [`BuildHasher`] into a [`HashStrategy`] for any
/// `Hash + Eq` key.
///
/// # Examples
///
/// ```rust
/// use std::collections::hash_map::RandomState;
///
/// use probe_map::BuildHasherStrategy;
/// use probe_map::HashMap;
///
/// let mut map = HashMap::with_strategy(BuildHasherStrategy(RandomState::new()));
/// map.insert((1u8, 'a'), "tuple keys need Hash, not FnvKey");
/// assert!(map.contains_key(&(1u8, 'a')));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildHasherStrategy<B>(pub B);

impl<K, B> HashStrategy<K> for BuildHasherStrategy<B>
where
    K: Hash + Eq + ?Sized,
    B: BuildHasher,
{
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        self.0.hash_one(key)
    }

    #[inline]
    fn equal(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// A [`BuildHasherStrategy`] backed by foldhash's fast, randomly seeded
/// hasher.
#[cfg(feature = "foldhash")]
pub type FoldHashStrategy = BuildHasherStrategy<foldhash::fast::RandomState>;

#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(all(test, not(feature = "std")))]
extern crate std;

cfg_if::cfg_if! {
    if #[cfg(feature = "logging")] {
        macro_rules! debug_log {
            ($($arg:tt)*) => { log::debug!($($arg)*) };
        }
        macro_rules! trace_log {
            ($($arg:tt)*) => { log::trace!($($arg)*) };
        }
    } else {
        macro_rules! debug_log {
            ($($arg:tt)*) => {};
        }
        macro_rules! trace_log {
            ($($arg:tt)*) => {};
        }
    }
}

mod error;
/// The open-addressing map and its entry API.
pub mod hash_map;
/// A set facade over [`HashMap`].
pub mod hash_set;
pub mod iter;
pub mod policy;
mod slot;
pub mod strategy;

pub use error::Error;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_set::HashSet;
pub use iter::Cursor;
pub use strategy::BuildHasherStrategy;
pub use strategy::Fnv1a;
#[cfg(feature = "foldhash")]
pub use strategy::FoldHashStrategy;
pub use strategy::FnvKey;
pub use strategy::FnvState;
pub use strategy::HashStrategy;

use alloc::collections::TryReserveError;

/// The error type for fallible [`HashMap`](crate::HashMap) operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The requested key is not present in the map.
    #[error("no entry exists for the requested key")]
    NotFound,

    /// The bucket count required for a reservation does not fit in `usize`.
    #[error("capacity overflow")]
    CapacityOverflow,

    /// The allocator could not supply a new slot array. The map is left as
    /// it was before the call.
    #[error("failed to allocate a new slot array")]
    Alloc(#[from] TryReserveError),
}

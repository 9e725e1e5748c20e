//! Error definitions.

use std::collections::TryReserveError;
use thiserror::Error;

/// Failure to obtain a bucket array.
///
/// Returned by construction, by a `put` that needed to grow the table and by
/// `clear(true)`. Whenever an operation returns this error the table is left
/// exactly as it was before the call.
#[derive(Error, Debug)]
pub enum AllocationError {
    /// The allocator refused the request.
    #[error("unable to allocate a bucket array of {buckets} slots")]
    OutOfMemory {
        buckets: usize,
        #[source]
        source: TryReserveError,
    },
    /// The requested size does not fit a power-of-two bucket count.
    #[error("bucket count for {requested} entries overflows usize")]
    CapacityOverflow { requested: usize },
}

//! robin-table: an open-addressing hash table with Robin Hood displacement,
//! backward-shift deletion and probe-length diagnostics.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: predictable, low-variance lookup cost under arbitrary key
//!   distributions, with enough introspection to judge a hash function.
//! - Layers:
//!   - BucketStore: flat power-of-two slot array; each slot is empty or holds
//!     one entry (borrowed key, value, cached hash, PSL). Owns sizing policy.
//!   - RobinTable<'k, V, H>: probing, insert/lookup/delete, and the capacity
//!     manager that grows at 75% load and shrinks at 25%.
//!   - Iter/IterMut: cursors over occupied slots in physical order.
//!   - PSL statistics: max/mean/variance over occupied slots.
//!   - KeyHasher: pluggable `hash(bytes, seed) -> u64`, with three reference
//!     mixers.
//!
//! Robin Hood invariant
//! - Every entry's PSL equals its distance from `hash & mask`.
//! - Walking forward along a probe chain, a slot's PSL is at most one more
//!   than its predecessor's, and a displaced entry never follows an empty
//!   slot. Lookup stops at the first occupant whose PSL is smaller than the
//!   distance probed so far; the invariant makes that stop sound.
//! - Insert swaps the carried entry into any slot whose occupant has a
//!   smaller PSL. Delete shifts the rest of the chain back by one. Resize
//!   re-inserts every entry into a fresh array. Each path restores the
//!   invariant in one forward pass.
//!
//! Constraints
//! - Keys are borrowed (`&'k [u8]`) and never copied. The table owns only its
//!   bucket array and the values placed in it.
//! - Existing keys are never overwritten: `put` on a present key returns the
//!   stored value and hands back the offered one.
//! - Single owner: no internal locking. Readers may share `&RobinTable` while
//!   no `&mut` exists, which the borrow checker enforces.
//!
//! Failure model
//! - Bucket arrays are reserved fallibly. Construction, growth and
//!   `clear(true)` report `AllocationError` and leave the table as it was.
//! - A failed shrink after `del` is logged and ignored.
//! - Contract violations (empty key, statistics of an empty table) panic in
//!   debug builds; the `no-assert` feature or a release build removes the
//!   checks.
//!
//! Hasher invariant
//! - Each entry caches its 64-bit hash. Resize places entries by the cached
//!   hash, so the hasher only runs when a key is presented to the table.

mod buckets;
mod contract;
mod error;
pub mod hashing;
mod iter;
mod rapidhash;
mod robin_table;
mod robin_table_proptest;
mod stats;

// Public surface
pub use buckets::{MAX_LOAD_PERCENT, MIN_BUCKETS, MIN_LOAD_PERCENT};
pub use error::AllocationError;
pub use hashing::{KeyHasher, RapidHash, SipHash, Xxh64};
pub use iter::{Iter, IterMut};
pub use robin_table::{Put, RobinTable, DEFAULT_SEED};
pub use stats::PslStats;

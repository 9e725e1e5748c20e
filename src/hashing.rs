//! Pluggable key hashing.
//!
//! The table hashes raw key bytes together with a per-table seed. Anything
//! implementing [`KeyHasher`] can be used, including plain functions and
//! closures of shape `Fn(&[u8], u64) -> u64`. Three stateless reference mixers
//! are provided:
//!
//! - [`RapidHash`]: fast general-purpose mixer, the default.
//! - [`SipHash`]: keyed SipHash-2-4, resistant to hash flooding when the seed
//!   is secret.
//! - [`Xxh64`]: XXH64 streaming mixer.

use core::hash::Hasher;
use siphasher::sip::SipHasher24;

pub use crate::rapidhash::rapidhash;

/// A hash function over key bytes, parameterised by a seed.
///
/// Implementations must be deterministic for a given `(key, seed)` pair.
pub trait KeyHasher {
    fn hash(&self, key: &[u8], seed: u64) -> u64;
}

impl<F> KeyHasher for F
where
    F: Fn(&[u8], u64) -> u64,
{
    #[inline]
    fn hash(&self, key: &[u8], seed: u64) -> u64 {
        self(key, seed)
    }
}

/// Keyed SipHash-2-4 of `key`.
///
/// The 64-bit seed keys both halves of the state: `k0 = seed`,
/// `k1 = seed >> 32`.
pub fn siphash(key: &[u8], seed: u64) -> u64 {
    let mut h = SipHasher24::new_with_keys(seed, seed >> 32);
    // `write`, not `Hash::hash`: slices would get a length prefix.
    h.write(key);
    h.finish()
}

/// XXH64 of `key`.
#[inline]
pub fn xxh64(key: &[u8], seed: u64) -> u64 {
    xxhash_rust::xxh64::xxh64(key, seed)
}

/// Default hasher; see [`rapidhash`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RapidHash;

impl KeyHasher for RapidHash {
    #[inline]
    fn hash(&self, key: &[u8], seed: u64) -> u64 {
        rapidhash(key, seed)
    }
}

/// See [`siphash`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SipHash;

impl KeyHasher for SipHash {
    #[inline]
    fn hash(&self, key: &[u8], seed: u64) -> u64 {
        siphash(key, seed)
    }
}

/// See [`xxh64`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Xxh64;

impl KeyHasher for Xxh64 {
    #[inline]
    fn hash(&self, key: &[u8], seed: u64) -> u64 {
        xxh64(key, seed)
    }
}

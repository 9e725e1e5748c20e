//! Bucket store: the flat, power-of-two array of slots and its sizing policy.

use crate::error::AllocationError;

/// Smallest bucket array a table will ever use. Must be a power of two.
pub const MIN_BUCKETS: usize = 32;
/// Grow once `len` reaches this share of the bucket count.
pub const MAX_LOAD_PERCENT: usize = 75;
/// Shrink once `len` falls to this share of the bucket count.
pub const MIN_LOAD_PERCENT: usize = 25;

/// One occupied slot.
#[derive(Debug)]
pub(crate) struct Entry<'k, V> {
    pub(crate) key: &'k [u8],
    pub(crate) value: V,
    pub(crate) hash: u64,
    /// Distance from the slot `hash & mask` points at.
    pub(crate) psl: usize,
}

impl<'k, V> Entry<'k, V> {
    #[inline]
    pub(crate) fn matches(&self, hash: u64, key: &[u8]) -> bool {
        self.hash == hash && self.key == key
    }
}

/// `None` is the empty slot; there are no tombstones.
pub(crate) type Slot<'k, V> = Option<Entry<'k, V>>;

/// The slot array together with the values derived from its length.
#[derive(Debug)]
pub(crate) struct BucketStore<'k, V> {
    slots: Vec<Slot<'k, V>>,
    mask: usize,
    expand_at: usize,
    shrink_at: usize,
}

impl<'k, V> BucketStore<'k, V> {
    /// Allocate `bucket_count` empty slots, aborting on allocator failure
    /// like any other `Vec`.
    pub(crate) fn new(bucket_count: usize) -> Self {
        let mut slots = Vec::with_capacity(bucket_count);
        slots.resize_with(bucket_count, || None);
        Self::from_slots(slots)
    }

    /// Allocate `bucket_count` empty slots.
    ///
    /// The reservation is fallible so allocator refusal comes back as an error
    /// rather than an abort.
    pub(crate) fn try_new(bucket_count: usize) -> Result<Self, AllocationError> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(bucket_count)
            .map_err(|source| AllocationError::OutOfMemory {
                buckets: bucket_count,
                source,
            })?;
        slots.resize_with(bucket_count, || None);
        Ok(Self::from_slots(slots))
    }

    fn from_slots(slots: Vec<Slot<'k, V>>) -> Self {
        let bucket_count = slots.len();
        debug_assert!(bucket_count.is_power_of_two());
        Self {
            slots,
            mask: bucket_count - 1,
            expand_at: percent_of(bucket_count, MAX_LOAD_PERCENT),
            shrink_at: percent_of(bucket_count, MIN_LOAD_PERCENT),
        }
    }

    #[inline]
    pub(crate) fn bucket_count(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn mask(&self) -> usize {
        self.mask
    }

    #[inline]
    pub(crate) fn expand_at(&self) -> usize {
        self.expand_at
    }

    #[inline]
    pub(crate) fn shrink_at(&self) -> usize {
        self.shrink_at
    }

    #[inline]
    pub(crate) fn home(&self, hash: u64) -> usize {
        hash as usize & self.mask
    }

    #[inline]
    pub(crate) fn next(&self, idx: usize) -> usize {
        (idx + 1) & self.mask
    }

    #[inline]
    pub(crate) fn slot(&self, idx: usize) -> &Slot<'k, V> {
        &self.slots[idx]
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, idx: usize) -> &mut Slot<'k, V> {
        &mut self.slots[idx]
    }

    #[inline]
    pub(crate) fn slots(&self) -> &[Slot<'k, V>] {
        &self.slots
    }

    #[inline]
    pub(crate) fn slots_mut(&mut self) -> &mut [Slot<'k, V>] {
        &mut self.slots
    }

    /// Empty every slot, dropping the values they held.
    pub(crate) fn wipe(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    /// Consume the store, yielding its entries in physical slot order.
    pub(crate) fn into_entries(self) -> impl Iterator<Item = Entry<'k, V>> {
        self.slots.into_iter().flatten()
    }
}

/// `n * pct / 100` without overflowing for large `n`.
#[inline]
fn percent_of(n: usize, pct: usize) -> usize {
    n / 100 * pct + n % 100 * pct / 100
}

/// Bucket count for a table expected to hold `count` entries.
///
/// Applies the maximum load factor, then rounds up to a power of two with a
/// floor of [`MIN_BUCKETS`].
pub(crate) fn bucket_count_for(count: usize) -> Result<usize, AllocationError> {
    let overflow = || AllocationError::CapacityOverflow { requested: count };
    let scaled = count.checked_mul(100).ok_or_else(overflow)? / MAX_LOAD_PERCENT;
    if scaled < MIN_BUCKETS {
        return Ok(MIN_BUCKETS);
    }
    scaled.checked_next_power_of_two().ok_or_else(overflow)
}

//! RobinTable: open addressing with Robin Hood displacement and backward-shift
//! deletion.
//!
//! Every occupied slot records its probe sequence length (PSL), the distance
//! from the slot its hash maps to. Walking forward from any home slot, PSLs
//! never drop by more than one between neighbours and an entry with a nonzero
//! PSL is never preceded by an empty slot. Insertion, deletion and resize each
//! restore this in a single forward pass, and lookup relies on it to stop early.

use crate::buckets::{bucket_count_for, BucketStore, Entry, MIN_BUCKETS};
use crate::contract::contract;
use crate::error::AllocationError;
use crate::hashing::{KeyHasher, RapidHash};
use crate::iter::{Iter, IterMut};
use core::fmt;
use core::mem;

/// Seed used by constructors that do not take one.
pub const DEFAULT_SEED: u64 = 0xbdd8_9aa9_8270_4029;

/// Hash table keyed by borrowed byte strings.
///
/// Keys are held as `&'k [u8]` and never copied; the caller keeps the bytes
/// alive for `'k`. Values are stored in the slots. To keep values owned
/// elsewhere, use a reference or an id as `V`.
pub struct RobinTable<'k, V, H = RapidHash> {
    buckets: BucketStore<'k, V>,
    len: usize,
    initial_buckets: usize,
    hasher: H,
    seed: u64,
}

/// Outcome of [`RobinTable::put`].
#[derive(Debug, PartialEq, Eq)]
pub enum Put<'a, V> {
    /// The key was absent and now maps to the given value.
    Inserted(&'a V),
    /// The key was already present. The stored value is unchanged and the
    /// offered one is handed back.
    Existing { current: &'a V, rejected: V },
}

impl<'a, V> Put<'a, V> {
    /// The value the key maps to after the call.
    pub fn value(&self) -> &'a V {
        match self {
            Put::Inserted(v) => v,
            Put::Existing { current, .. } => current,
        }
    }

    pub fn is_inserted(&self) -> bool {
        matches!(self, Put::Inserted(_))
    }

    /// The offered value, if the table declined it.
    pub fn rejected(self) -> Option<V> {
        match self {
            Put::Inserted(_) => None,
            Put::Existing { rejected, .. } => Some(rejected),
        }
    }
}

/// Where a probing insert ended up; carries no borrows so the caller can
/// re-borrow the table afterward.
enum Placement<V> {
    Inserted(usize),
    Existing(usize, V),
}

impl<'k, V> RobinTable<'k, V> {
    /// Empty table of [`MIN_BUCKETS`] buckets using [`RapidHash`] and
    /// [`DEFAULT_SEED`].
    pub fn new() -> Self {
        Self::with_hasher(RapidHash, DEFAULT_SEED)
    }

    /// Empty table sized to hold `count` entries without growing.
    pub fn with_capacity(count: usize) -> Result<Self, AllocationError> {
        Self::with_capacity_and_hasher(count, RapidHash, DEFAULT_SEED)
    }
}

impl<'k, V> Default for RobinTable<'k, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'k, V, H> RobinTable<'k, V, H>
where
    H: KeyHasher,
{
    /// Empty table of [`MIN_BUCKETS`] buckets using `hasher` and `seed`.
    pub fn with_hasher(hasher: H, seed: u64) -> Self {
        Self {
            buckets: BucketStore::new(MIN_BUCKETS),
            len: 0,
            initial_buckets: MIN_BUCKETS,
            hasher,
            seed,
        }
    }

    /// Empty table sized to hold `count` entries without growing.
    ///
    /// The bucket count is the smallest power of two that keeps `count`
    /// entries under the 75% load limit, and never below [`MIN_BUCKETS`]. It
    /// is also the floor the table will not shrink beneath.
    pub fn with_capacity_and_hasher(
        count: usize,
        hasher: H,
        seed: u64,
    ) -> Result<Self, AllocationError> {
        let bucket_count = bucket_count_for(count)?;
        Ok(Self {
            buckets: BucketStore::try_new(bucket_count)?,
            len: 0,
            initial_buckets: bucket_count,
            hasher,
            seed,
        })
    }

    #[inline]
    fn make_hash(&self, key: &[u8]) -> u64 {
        self.hasher.hash(key, self.seed)
    }

    /// Insert `key -> value` unless `key` is already present.
    ///
    /// An existing mapping is never overwritten: the first value stored for a
    /// key persists and later offers are returned in [`Put::Existing`]. May
    /// double the bucket count first; if that allocation fails the table is
    /// left untouched.
    pub fn put(&mut self, key: &'k [u8], value: V) -> Result<Put<'_, V>, AllocationError> {
        contract!(!key.is_empty(), "keys must not be empty");

        if self.len >= self.buckets.expand_at() {
            let target = self.buckets.bucket_count().checked_mul(2).ok_or(
                AllocationError::CapacityOverflow {
                    requested: self.len + 1,
                },
            )?;
            self.resize(target)?;
        }

        let hash = self.make_hash(key);
        Ok(match self.insert_hashed(key, hash, value) {
            Placement::Inserted(idx) => Put::Inserted(&self.occupied(idx).value),
            Placement::Existing(idx, rejected) => Put::Existing {
                current: &self.occupied(idx).value,
                rejected,
            },
        })
    }

    /// Robin Hood insert without any resize check.
    ///
    /// Walks forward from the home slot carrying an entry. A poorer carried
    /// entry (larger PSL) takes the slot of a richer occupant, which is then
    /// carried on in its place. Once the new entry has been placed, the keys
    /// carried afterward are existing ones, so the duplicate check is skipped.
    fn insert_hashed(&mut self, key: &'k [u8], hash: u64, value: V) -> Placement<V> {
        let mut idx = self.buckets.home(hash);
        let mut carried = Entry {
            key,
            value,
            hash,
            psl: 0,
        };
        let mut placed: Option<usize> = None;

        loop {
            let slot = self.buckets.slot_mut(idx);
            match slot {
                None => {
                    *slot = Some(carried);
                    self.len += 1;
                    return Placement::Inserted(placed.unwrap_or(idx));
                }
                Some(occupant) => {
                    if placed.is_none() && occupant.matches(hash, key) {
                        return Placement::Existing(idx, carried.value);
                    }
                    if occupant.psl < carried.psl {
                        mem::swap(occupant, &mut carried);
                        placed.get_or_insert(idx);
                    }
                }
            }
            idx = self.buckets.next(idx);
            carried.psl += 1;
        }
    }

    /// Slot index holding `key`, if any.
    ///
    /// Stops at the first empty slot or at an occupant richer than the key
    /// would be there: the Robin Hood ordering guarantees the key cannot sit
    /// further along.
    fn find_index(&self, key: &[u8]) -> Option<usize> {
        contract!(!key.is_empty(), "keys must not be empty");

        let hash = self.make_hash(key);
        let mut idx = self.buckets.home(hash);
        let mut psl = 0usize;
        loop {
            match self.buckets.slot(idx) {
                Some(e) if e.matches(hash, key) => return Some(idx),
                Some(e) if e.psl >= psl => {}
                _ => return None,
            }
            idx = self.buckets.next(idx);
            psl += 1;
        }
    }

    pub fn get(&self, key: &[u8]) -> Option<&V> {
        self.find_index(key).map(|idx| &self.occupied(idx).value)
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        let idx = self.find_index(key)?;
        self.buckets
            .slot_mut(idx)
            .as_mut()
            .map(|e| &mut e.value)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.find_index(key).is_some()
    }

    /// Remove `key`, returning its value.
    ///
    /// The hole left behind is closed by shifting the following entries back
    /// one slot each until an empty slot or an entry already at its home is
    /// reached. May halve the bucket count afterward; a failed shrink is
    /// ignored.
    pub fn del(&mut self, key: &[u8]) -> Option<V> {
        let mut hole = self.find_index(key)?;
        let removed = self.buckets.slot_mut(hole).take()?;

        loop {
            let next = self.buckets.next(hole);
            if !matches!(self.buckets.slot(next), Some(e) if e.psl > 0) {
                break;
            }
            let mut shifted = self.buckets.slot_mut(next).take();
            if let Some(e) = shifted.as_mut() {
                e.psl -= 1;
            }
            *self.buckets.slot_mut(hole) = shifted;
            hole = next;
        }
        self.len -= 1;

        if self.buckets.bucket_count() > self.initial_buckets
            && self.len <= self.buckets.shrink_at()
        {
            let target = self.buckets.bucket_count() / 2;
            if let Err(err) = self.resize(target) {
                log::debug!("robin table: shrink to {target} buckets skipped: {err}");
            }
        }
        Some(removed.value)
    }

    /// Rehash every entry into a fresh store of `bucket_count` slots.
    ///
    /// The new store is allocated before anything is touched, so on error the
    /// table is unchanged. Entries are re-placed in the old store's physical
    /// order using their cached hashes.
    fn resize(&mut self, bucket_count: usize) -> Result<(), AllocationError> {
        debug_assert!(bucket_count.is_power_of_two());
        debug_assert!(bucket_count > self.len);

        let fresh = BucketStore::try_new(bucket_count)?;
        let old = mem::replace(&mut self.buckets, fresh);
        log::debug!(
            "robin table: {} {} -> {} buckets with {} entries",
            if bucket_count > old.bucket_count() {
                "grow"
            } else {
                "shrink"
            },
            old.bucket_count(),
            bucket_count,
            self.len
        );

        self.len = 0;
        for e in old.into_entries() {
            let _ = self.insert_hashed(e.key, e.hash, e.value);
        }
        Ok(())
    }

    /// Remove every entry.
    ///
    /// With `shrink_to_initial`, the bucket array is also reallocated at the
    /// size the table was created with. If that allocation fails the table is
    /// left as it was, entries included.
    pub fn clear(&mut self, shrink_to_initial: bool) -> Result<(), AllocationError> {
        if shrink_to_initial && self.buckets.bucket_count() != self.initial_buckets {
            self.buckets = BucketStore::try_new(self.initial_buckets)?;
        } else {
            self.buckets.wipe();
        }
        log::trace!(
            "robin table: cleared {} entries, {} buckets",
            self.len,
            self.buckets.bucket_count()
        );
        self.len = 0;
        Ok(())
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }
}

impl<'k, V, H> RobinTable<'k, V, H> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.bucket_count()
    }

    /// Bucket count at construction; shrinking stops here.
    pub fn initial_bucket_count(&self) -> usize {
        self.initial_buckets
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Occupied share of the bucket array. Requires a non-empty table.
    pub fn load_factor(&self) -> f64 {
        contract!(self.len != 0, "load factor of an empty table");
        self.len as f64 / self.buckets.bucket_count() as f64
    }

    /// Entries in physical slot order. The order is arbitrary but stable
    /// until the table is next mutated.
    pub fn iter(&self) -> Iter<'_, 'k, V> {
        Iter::new(self.buckets.slots(), self.len)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, 'k, V> {
        let len = self.len;
        IterMut::new(self.buckets.slots_mut(), len)
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = &Entry<'k, V>> {
        self.buckets.slots().iter().flatten()
    }

    fn occupied(&self, idx: usize) -> &Entry<'k, V> {
        self.buckets
            .slot(idx)
            .as_ref()
            .expect("probe must end on an occupied slot")
    }
}

impl<'a, 'k, V, H> IntoIterator for &'a RobinTable<'k, V, H> {
    type Item = (&'k [u8], &'a V);
    type IntoIter = Iter<'a, 'k, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, 'k, V, H> IntoIterator for &'a mut RobinTable<'k, V, H> {
    type Item = (&'k [u8], &'a mut V);
    type IntoIter = IterMut<'a, 'k, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<'k, V: fmt::Debug, H> fmt::Debug for RobinTable<'k, V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
impl<'k, V, H: KeyHasher> RobinTable<'k, V, H> {
    /// Panics unless every slot agrees with its cached hash, every PSL equals
    /// the distance from home, and the Robin Hood ordering holds.
    pub(crate) fn assert_invariants(&self) {
        let n = self.buckets.bucket_count();
        let mask = self.buckets.mask();
        let mut occupied = 0;
        for (i, slot) in self.buckets.slots().iter().enumerate() {
            let Some(e) = slot else { continue };
            occupied += 1;
            assert_eq!(e.hash, self.make_hash(e.key), "slot {i}: stale hash");
            let home = self.buckets.home(e.hash);
            assert_eq!(e.psl, (i + n - home) & mask, "slot {i}: psl is not distance from home");
            if e.psl > 0 {
                let prev = (i + n - 1) & mask;
                match self.buckets.slot(prev) {
                    Some(p) => assert!(
                        p.psl + 1 >= e.psl,
                        "slot {i}: psl {} follows psl {}",
                        e.psl,
                        p.psl
                    ),
                    None => panic!("slot {i}: displaced entry follows an empty slot"),
                }
            }
        }
        assert_eq!(occupied, self.len, "len disagrees with occupied slots");
    }

    pub(crate) fn psl_of(&self, key: &[u8]) -> Option<usize> {
        self.find_index(key).map(|idx| self.occupied(idx).psl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn zero(_: &[u8], _: u64) -> u64 {
        0
    }

    /// Hash is the first key byte, so tests can place keys at chosen homes.
    fn first_byte(key: &[u8], _: u64) -> u64 {
        key[0] as u64
    }

    fn keys(n: usize) -> Vec<[u8; 8]> {
        (0..n as u64).map(|i| i.to_le_bytes()).collect()
    }

    /// Invariant: a fresh key maps to the value it was put with.
    #[test]
    fn put_then_get() {
        let mut t = RobinTable::new();
        let put = t.put(b"alpha", 1).unwrap();
        assert!(put.is_inserted());
        assert_eq!(put.value(), &1);
        assert_eq!(t.get(b"alpha"), Some(&1));
        assert_eq!(t.get(b"beta"), None);
        assert_eq!(t.len(), 1);
    }

    /// Invariant: the first writer wins; the second put reports the stored
    /// value and returns the offered one.
    #[test]
    fn existing_key_is_not_overwritten() {
        let mut t = RobinTable::new();
        t.put(b"k", "first").unwrap();
        match t.put(b"k", "second").unwrap() {
            Put::Existing { current, rejected } => {
                assert_eq!(*current, "first");
                assert_eq!(rejected, "second");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(t.get(b"k"), Some(&"first"));
        assert_eq!(t.len(), 1);
    }

    /// Keys with equal hashes and equal lengths are told apart by their bytes.
    #[test]
    fn colliding_keys_stay_distinct() {
        let mut t = RobinTable::with_hasher(zero, 0);
        for k in [&b"aa"[..], b"ab", b"ba", b"a"] {
            t.put(k, k.len()).unwrap();
        }
        assert_eq!(t.len(), 4);
        assert_eq!(t.psl_of(b"aa"), Some(0));
        assert_eq!(t.psl_of(b"a"), Some(3));
        assert_eq!(t.get(b"bb"), None);
        t.assert_invariants();
    }

    /// A newcomer with a larger PSL takes the slot of a richer occupant, and
    /// `put` still reports the newcomer's value.
    #[test]
    fn insert_displaces_richer_occupant() {
        let mut t = RobinTable::with_hasher(first_byte, 0);
        // Homes 0, 0, 1, 1 fill slots 0..=3 with psl 0, 1, 1, 2. Equal PSLs
        // never swap.
        t.put(&[0, 1], 'a').unwrap();
        t.put(&[0, 2], 'b').unwrap();
        t.put(&[1, 1], 'c').unwrap();
        t.put(&[1, 2], 'd').unwrap();
        assert_eq!(t.psl_of(&[1, 1]), Some(1));
        assert_eq!(t.psl_of(&[1, 2]), Some(2));
        // Home 0 reaches slot 2 with psl 2 and evicts 'c' (psl 1), which then
        // passes 'd' and settles in slot 4.
        let put = t.put(&[0, 3], 'e').unwrap();
        assert_eq!(put.value(), &'e');
        assert_eq!(t.psl_of(&[0, 3]), Some(2));
        assert_eq!(t.psl_of(&[1, 2]), Some(2));
        assert_eq!(t.psl_of(&[1, 1]), Some(3));
        t.assert_invariants();
    }

    /// Invariant: backward shift closes the hole and decrements the PSL of
    /// every shifted entry.
    #[test]
    fn delete_shifts_chain_back() {
        let mut t = RobinTable::with_hasher(zero, 0);
        for k in [&b"a"[..], b"b", b"c", b"d"] {
            t.put(k, ()).unwrap();
        }
        assert_eq!(t.del(b"b"), Some(()));
        assert_eq!(t.psl_of(b"a"), Some(0));
        assert_eq!(t.psl_of(b"c"), Some(1));
        assert_eq!(t.psl_of(b"d"), Some(2));
        assert_eq!(t.len(), 3);
        t.assert_invariants();
    }

    /// Backward shift stops at an entry that already sits at its home.
    #[test]
    fn delete_stops_at_home_entry() {
        let mut t = RobinTable::with_hasher(first_byte, 0);
        t.put(&[0, 0], 0).unwrap();
        t.put(&[0, 1], 1).unwrap();
        t.put(&[2, 0], 2).unwrap();
        assert_eq!(t.psl_of(&[2, 0]), Some(0));
        assert_eq!(t.del(&[0, 0]), Some(0));
        assert_eq!(t.psl_of(&[0, 1]), Some(0));
        assert_eq!(t.psl_of(&[2, 0]), Some(0));
        t.assert_invariants();
    }

    /// Invariant: probing wraps from the last slot to the first.
    #[test]
    fn chains_wrap_around() {
        let mut t = RobinTable::with_hasher(|_: &[u8], _: u64| 31u64, 0);
        for k in [&b"x"[..], b"y", b"z"] {
            t.put(k, ()).unwrap();
        }
        assert_eq!(t.psl_of(b"z"), Some(2));
        t.assert_invariants();
        t.del(b"x");
        assert_eq!(t.psl_of(b"z"), Some(1));
        t.assert_invariants();
    }

    #[test]
    fn delete_missing_key_is_a_no_op() {
        let mut t = RobinTable::new();
        t.put(b"present", 1).unwrap();
        assert_eq!(t.del(b"absent"), None);
        assert_eq!(t.len(), 1);
    }

    /// Invariant: crossing 75% load doubles the bucket count, crossing 25% on
    /// delete halves it, and lookups are unaffected either way.
    #[test]
    fn grows_and_shrinks_transparently() {
        let ks = keys(200);
        let mut t = RobinTable::new();
        for (i, k) in ks.iter().enumerate() {
            t.put(k, i).unwrap();
        }
        assert_eq!(t.bucket_count(), 512);
        t.assert_invariants();

        for k in &ks[..190] {
            t.del(k);
        }
        assert_eq!(t.bucket_count(), MIN_BUCKETS);
        for (i, k) in ks.iter().enumerate().skip(190) {
            assert_eq!(t.get(k), Some(&i));
        }
        t.assert_invariants();
    }

    /// Grow triggers exactly when `len` reaches the expand threshold.
    #[test]
    fn grow_happens_at_threshold() {
        let ks = keys(25);
        let mut t = RobinTable::new();
        for k in &ks[..24] {
            t.put(k, ()).unwrap();
        }
        assert_eq!(t.bucket_count(), 32);
        t.put(&ks[24], ()).unwrap();
        assert_eq!(t.bucket_count(), 64);
    }

    /// Shrinking never goes below the size chosen at construction.
    #[test]
    fn shrink_respects_initial_size() {
        let ks = keys(100);
        let mut t = RobinTable::with_capacity(100).unwrap();
        assert_eq!(t.initial_bucket_count(), 256);
        for k in &ks {
            t.put(k, ()).unwrap();
        }
        for k in &ks {
            t.del(k);
        }
        assert!(t.is_empty());
        assert_eq!(t.bucket_count(), 256);
    }

    #[test]
    fn clear_keeps_or_resets_buckets() {
        let ks = keys(100);
        let mut t = RobinTable::new();
        for k in &ks {
            t.put(k, ()).unwrap();
        }
        let grown = t.bucket_count();

        t.clear(false).unwrap();
        assert!(t.is_empty());
        assert_eq!(t.bucket_count(), grown);
        assert!(t.get(&ks[0]).is_none());
        assert_eq!(t.iter().count(), 0);

        for k in &ks {
            t.put(k, ()).unwrap();
        }
        t.clear(true).unwrap();
        assert!(t.is_empty());
        assert_eq!(t.bucket_count(), MIN_BUCKETS);
        t.put(&ks[0], ()).unwrap();
        t.assert_invariants();
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut t = RobinTable::new();
        t.put(b"n", 1).unwrap();
        *t.get_mut(b"n").unwrap() += 41;
        assert_eq!(t.get(b"n"), Some(&42));
        assert!(t.get_mut(b"m").is_none());
    }

    /// Invariant: iteration visits each live entry once, and `iter_mut`
    /// writes are visible to later lookups.
    #[test]
    fn iteration_and_mutation() {
        let mut t = RobinTable::new();
        let names = [&b"k1"[..], b"k2", b"k3"];
        for (i, k) in names.iter().enumerate() {
            t.put(*k, i as i32).unwrap();
        }
        let seen: BTreeSet<&[u8]> = t.iter().map(|(k, _)| k).collect();
        assert_eq!(seen, names.iter().copied().collect());

        for (_, v) in t.iter_mut() {
            *v += 10;
        }
        assert_eq!(t.get(b"k1"), Some(&10));
        assert_eq!(t.get(b"k3"), Some(&12));
    }

    #[test]
    fn load_factor_is_share_of_buckets() {
        let mut t = RobinTable::new();
        t.put(b"a", ()).unwrap();
        t.put(b"b", ()).unwrap();
        assert_eq!(t.load_factor(), 2.0 / 32.0);
    }

    #[cfg(all(debug_assertions, not(feature = "no-assert")))]
    #[test]
    #[should_panic(expected = "keys must not be empty")]
    fn empty_key_is_a_contract_violation() {
        let mut t = RobinTable::new();
        let _ = t.put(b"", ());
    }

    #[cfg(all(debug_assertions, not(feature = "no-assert")))]
    #[test]
    #[should_panic(expected = "empty table")]
    fn load_factor_of_empty_table_panics() {
        let t: RobinTable<'_, ()> = RobinTable::new();
        let _ = t.load_factor();
    }

    #[test]
    fn debug_lists_entries() {
        let mut t = RobinTable::new();
        t.put(b"k", 7).unwrap();
        assert_eq!(format!("{t:?}"), "{[107]: 7}");
    }
}

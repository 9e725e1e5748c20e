//! Cursors over a table's slots in physical order.
//!
//! Both iterators borrow the table, so the table cannot be mutated while a
//! cursor is alive.

use crate::buckets::Slot;
use core::iter::FusedIterator;
use core::slice;

/// Iterator over `(key, &value)` pairs of a `RobinTable`.
pub struct Iter<'a, 'k, V> {
    slots: slice::Iter<'a, Slot<'k, V>>,
    remaining: usize,
}

impl<'a, 'k, V> Iter<'a, 'k, V> {
    pub(crate) fn new(slots: &'a [Slot<'k, V>], len: usize) -> Self {
        Self {
            slots: slots.iter(),
            remaining: len,
        }
    }
}

impl<'a, 'k, V> Iterator for Iter<'a, 'k, V> {
    type Item = (&'k [u8], &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let e = self.slots.by_ref().flatten().next()?;
        self.remaining -= 1;
        Some((e.key, &e.value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, '_, V> {}
impl<V> FusedIterator for Iter<'_, '_, V> {}

impl<V> Clone for Iter<'_, '_, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

/// Iterator over `(key, &mut value)` pairs of a `RobinTable`.
pub struct IterMut<'a, 'k, V> {
    slots: slice::IterMut<'a, Slot<'k, V>>,
    remaining: usize,
}

impl<'a, 'k, V> IterMut<'a, 'k, V> {
    pub(crate) fn new(slots: &'a mut [Slot<'k, V>], len: usize) -> Self {
        Self {
            slots: slots.iter_mut(),
            remaining: len,
        }
    }
}

impl<'a, 'k, V> Iterator for IterMut<'a, 'k, V> {
    type Item = (&'k [u8], &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let e = self.slots.by_ref().flatten().next()?;
        self.remaining -= 1;
        Some((e.key, &mut e.value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, '_, V> {}
impl<V> FusedIterator for IterMut<'_, '_, V> {}

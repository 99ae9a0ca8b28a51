//! Mutable cursor over the occupied entries of a [`SparseVector`](crate::SparseVector).

use std::collections::HashMap;

use crate::index::Sweep;
use crate::scalar::Scalar;

/// How the entry under a cursor came to be stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Origin {
    /// Not stored; reads see the shared zero.
    Absent,
    /// Stored before the cursor reached it.
    Stored,
    /// Allocated by the cursor itself.
    Vivified,
}

/// The self side of every mutable cursor: the entry map plus a compacting
/// sweep over its index.
pub(crate) struct Slots<'a, S> {
    entries: &'a mut HashMap<usize, S>,
    sweep: Sweep<'a>,
    zero: &'a S,
}

impl<'a, S: Scalar> Slots<'a, S> {
    pub(crate) fn new(entries: &'a mut HashMap<usize, S>, sweep: Sweep<'a>, zero: &'a S) -> Self {
        Slots {
            entries,
            sweep,
            zero,
        }
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<usize> {
        self.sweep.peek()
    }

    #[inline]
    pub(crate) fn get(&self, k: usize) -> &S {
        self.entries.get(&k).unwrap_or(self.zero)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, k: usize) -> &mut S {
        self.entries.entry(k).or_default()
    }

    #[inline]
    pub(crate) fn is_zero(&self, k: usize) -> bool {
        self.entries.get(&k).map_or(true, |s| s.is_structural_zero())
    }

    /// Allocate a zero entry at `k`, which must lie before the next stored index.
    pub(crate) fn vivify(&mut self, k: usize) {
        self.sweep.insert(k);
        self.entries.entry(k).or_default();
    }

    /// Move past `k`, deleting its entry if it decayed to a structural zero.
    pub(crate) fn leave(&mut self, k: usize, origin: Origin) {
        match origin {
            Origin::Absent => {}
            Origin::Stored => {
                if self.is_zero(k) {
                    self.entries.remove(&k);
                    self.sweep.discard();
                } else {
                    self.sweep.keep();
                }
            }
            Origin::Vivified => {
                if self.is_zero(k) {
                    self.entries.remove(&k);
                    self.sweep.retract();
                }
            }
        }
    }
}

/// Cursor over the occupied entries of a sparse vector, in ascending index
/// order.
///
/// ```
/// use spardiff::{ConstVector, Scalar, SparseVector};
///
/// let mut v = SparseVector::<f64>::from_triplets(&[1, 4], &[2.0, 3.0], 6).unwrap();
/// let mut it = v.iter_mut();
/// while it.ok() {
///     let x = *it.get();
///     it.get_mut().set_value(x * 10.0);
///     it.next();
/// }
/// drop(it);
/// assert_eq!(v.values(), vec![0.0, 20.0, 0.0, 0.0, 30.0, 0.0]);
/// ```
///
/// An entry left as a structural zero is deleted when the cursor moves past
/// it, so a full sweep leaves no stored zeros behind.
pub struct IterMut<'a, S: Scalar> {
    slots: Slots<'a, S>,
}

impl<'a, S: Scalar> IterMut<'a, S> {
    pub(crate) fn new(slots: Slots<'a, S>) -> Self {
        IterMut { slots }
    }

    /// Whether the cursor points at an entry.
    #[inline]
    pub fn ok(&self) -> bool {
        self.slots.peek().is_some()
    }

    /// Index of the current entry.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is exhausted.
    #[inline]
    pub fn index(&self) -> usize {
        match self.slots.peek() {
            Some(k) => k,
            None => panic!("sparse cursor is exhausted"),
        }
    }

    #[inline]
    pub fn get(&self) -> &S {
        self.slots.get(self.index())
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut S {
        let k = self.index();
        self.slots.get_mut(k)
    }

    /// Advance to the next entry, pruning the current one if it is zero.
    pub fn next(&mut self) {
        if let Some(k) = self.slots.peek() {
            self.slots.leave(k, Origin::Stored);
        }
    }
}

//! Lazily sorted set of active indices backing [`SparseVector`](crate::SparseVector).
//!
//! Inserts append in O(1) and mark the set unsorted; the first iteration
//! after a batch of inserts sorts once in O(k log k). This favours the usual
//! forward-mode pattern of many single-index writes followed by one sweep.
//!
//! The list is never exposed directly: callers get sorted iteration only.
//! Sorting happens behind interior mutability so that iterating through a
//! shared reference can still sort on demand.

use std::cell::{Cell, Ref, RefCell};

/// Ordered set of active indices, sorted on demand.
#[derive(Clone, Debug)]
pub struct SparseIndex {
    values: RefCell<Vec<usize>>,
    sorted: Cell<bool>,
}

impl Default for SparseIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SparseIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        SparseIndex {
            values: RefCell::new(Vec::new()),
            sorted: Cell::new(true),
        }
    }

    /// Number of active indices.
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the next iteration can start without sorting.
    pub fn is_sorted(&self) -> bool {
        self.sorted.get()
    }

    /// Append `i`. The caller guarantees `i` is not already present.
    pub fn insert(&mut self, i: usize) {
        let values = self.values.get_mut();
        if let Some(&last) = values.last() {
            if last > i {
                self.sorted.set(false);
            }
        }
        values.push(i);
    }

    /// Remove `i`, preserving the order of the remaining indices.
    ///
    /// Returns `false` if `i` was not present.
    pub fn remove(&mut self, i: usize) -> bool {
        let sorted = self.sorted.get();
        let values = self.values.get_mut();
        let pos = if sorted {
            values.binary_search(&i).ok()
        } else {
            values.iter().position(|&x| x == i)
        };
        match pos {
            Some(p) => {
                values.remove(p);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.values.get_mut().clear();
        self.sorted.set(true);
    }

    /// Sort the index if inserts left it unsorted.
    pub fn ensure_sorted(&self) {
        // An outstanding `Ref` from `iter_from` implies the list is already
        // sorted, so the mutable borrow below never overlaps one.
        if !self.sorted.get() {
            self.values.borrow_mut().sort_unstable();
            self.sorted.set(true);
        }
    }

    /// Ascending iteration over all active indices.
    pub fn iter(&self) -> IndexIter<'_> {
        self.iter_from(0)
    }

    /// Ascending iteration over active indices `>= start`.
    pub fn iter_from(&self, start: usize) -> IndexIter<'_> {
        self.ensure_sorted();
        let values = self.values.borrow();
        let pos = values.partition_point(|&x| x < start);
        IndexIter { values, pos }
    }

    /// Begin a compacting sweep over indices `>= start`.
    pub(crate) fn sweep(&mut self, start: usize) -> Sweep<'_> {
        self.ensure_sorted();
        let values = self.values.get_mut();
        let pos = values.partition_point(|&x| x < start);
        Sweep {
            values,
            read: pos,
            write: pos,
            inserted: Vec::new(),
        }
    }
}

/// Ascending iterator over a [`SparseIndex`].
pub struct IndexIter<'a> {
    values: Ref<'a, Vec<usize>>,
    pos: usize,
}

impl Iterator for IndexIter<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        let i = self.values.get(self.pos).copied()?;
        self.pos += 1;
        Some(i)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.values.len() - self.pos;
        (n, Some(n))
    }
}

/// In-place sweep over a sorted index.
///
/// Each visited index is either kept or discarded; new indices may be
/// recorded along the way in ascending order. Discarded slots are compacted
/// and recorded indices merged in a single pass when the sweep is dropped,
/// so the index stays sorted throughout.
pub(crate) struct Sweep<'a> {
    values: &'a mut Vec<usize>,
    read: usize,
    write: usize,
    inserted: Vec<usize>,
}

impl Sweep<'_> {
    /// Next unvisited index.
    #[inline]
    pub(crate) fn peek(&self) -> Option<usize> {
        self.values.get(self.read).copied()
    }

    /// Keep the index returned by `peek` and move past it.
    #[inline]
    pub(crate) fn keep(&mut self) {
        if self.read < self.values.len() {
            self.values[self.write] = self.values[self.read];
            self.write += 1;
            self.read += 1;
        }
    }

    /// Drop the index returned by `peek` and move past it.
    #[inline]
    pub(crate) fn discard(&mut self) {
        if self.read < self.values.len() {
            self.read += 1;
        }
    }

    /// Record a new index. Successive calls must be ascending.
    #[inline]
    pub(crate) fn insert(&mut self, i: usize) {
        self.inserted.push(i);
    }

    /// Forget the most recently recorded index.
    #[inline]
    pub(crate) fn retract(&mut self) {
        self.inserted.pop();
    }

    fn finish(&mut self) {
        self.values.drain(self.write..self.read);
        self.read = self.write;
        if self.inserted.is_empty() {
            return;
        }
        let inserted = std::mem::take(&mut self.inserted);
        let old = std::mem::take(self.values);
        let mut merged = Vec::with_capacity(old.len() + inserted.len());
        let mut a = old.into_iter().peekable();
        let mut b = inserted.into_iter().peekable();
        loop {
            match (a.peek(), b.peek()) {
                (Some(&x), Some(&y)) => {
                    if x <= y {
                        merged.push(x);
                        a.next();
                    } else {
                        merged.push(y);
                        b.next();
                    }
                }
                (Some(_), None) => {
                    merged.extend(a);
                    break;
                }
                (None, Some(_)) => {
                    merged.extend(b);
                    break;
                }
                (None, None) => break,
            }
        }
        *self.values = merged;
    }
}

impl Drop for Sweep<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(index: &SparseIndex) -> Vec<usize> {
        index.iter().collect()
    }

    #[test]
    fn sorts_on_first_iteration() {
        let mut index = SparseIndex::new();
        for i in [7, 2, 9, 0, 4] {
            index.insert(i);
        }
        assert!(!index.is_sorted());
        assert_eq!(collect(&index), vec![0, 2, 4, 7, 9]);
        assert!(index.is_sorted());
    }

    #[test]
    fn ascending_inserts_stay_sorted() {
        let mut index = SparseIndex::new();
        for i in [1, 3, 8] {
            index.insert(i);
        }
        assert!(index.is_sorted());
    }

    #[test]
    fn iter_from_skips_smaller_indices() {
        let mut index = SparseIndex::new();
        for i in [5, 1, 3, 10] {
            index.insert(i);
        }
        assert_eq!(index.iter_from(3).collect::<Vec<_>>(), vec![3, 5, 10]);
        assert_eq!(index.iter_from(4).collect::<Vec<_>>(), vec![5, 10]);
        assert_eq!(index.iter_from(11).count(), 0);
    }

    #[test]
    fn nested_iteration_through_shared_reference() {
        let mut index = SparseIndex::new();
        for i in [4, 2, 6] {
            index.insert(i);
        }
        let mut pairs = Vec::new();
        for i in index.iter() {
            for j in index.iter_from(i) {
                pairs.push((i, j));
            }
        }
        assert_eq!(pairs.len(), 6);
    }

    #[test]
    fn remove_preserves_order() {
        let mut index = SparseIndex::new();
        for i in [9, 1, 5] {
            index.insert(i);
        }
        assert!(index.remove(1));
        assert!(!index.is_sorted());
        assert!(!index.remove(1));
        assert_eq!(collect(&index), vec![5, 9]);
        assert!(index.remove(9));
        assert!(index.is_sorted());
        assert_eq!(collect(&index), vec![5]);
    }

    #[test]
    fn sweep_compacts_and_merges() {
        let mut index = SparseIndex::new();
        for i in [2, 4, 6, 8] {
            index.insert(i);
        }
        {
            let mut sweep = index.sweep(0);
            sweep.insert(1);
            assert_eq!(sweep.peek(), Some(2));
            sweep.keep();
            assert_eq!(sweep.peek(), Some(4));
            sweep.discard();
            sweep.insert(5);
            sweep.keep();
            sweep.insert(7);
            sweep.retract();
        }
        assert_eq!(collect(&index), vec![1, 2, 5, 6, 8]);
    }

    #[test]
    fn sweep_from_leaves_prefix_untouched() {
        let mut index = SparseIndex::new();
        for i in [1, 3, 5, 7] {
            index.insert(i);
        }
        {
            let mut sweep = index.sweep(4);
            assert_eq!(sweep.peek(), Some(5));
            sweep.discard();
        }
        assert_eq!(collect(&index), vec![1, 3, 7]);
    }
}

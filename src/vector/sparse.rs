use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use crate::error::{check_dim, check_index, Error, Result};
use crate::index::{IndexIter, SparseIndex};
use crate::scalar::Scalar;
use crate::vector::iter::{IterMut, Slots};
use crate::vector::joint::{JointIter3Mut, JointIterMut};
use crate::vector::{check_range, ConstVector, Vector};

/// Sparse vector of fixed dimension: a map from occupied index to scalar.
///
/// Absent positions read as zero; mutable access through [`at`](Self::at)
/// allocates a zero entry first. Entries that decay to a structural zero stay
/// stored until a mutable cursor sweeps past them.
///
/// ```
/// use spardiff::{ConstVector, SparseVector};
///
/// let v = SparseVector::<f64>::from_triplets(&[2, 5], &[3.0, -1.0], 8).unwrap();
/// assert_eq!(v.dim(), 8);
/// assert_eq!(v.nnz(), 2);
/// assert_eq!(v.value_at(5), -1.0);
/// assert_eq!(v.value_at(0), 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct SparseVector<S: Scalar> {
    n: usize,
    entries: HashMap<usize, S>,
    index: SparseIndex,
    zero: S,
}

impl<S: Scalar> SparseVector<S> {
    /// Empty vector of dimension `n`.
    pub fn nil(n: usize) -> Self {
        SparseVector {
            n,
            entries: HashMap::new(),
            index: SparseIndex::new(),
            zero: S::default(),
        }
    }

    /// Zero vector of dimension `n`. No entries are stored.
    pub fn null(n: usize) -> Self {
        Self::nil(n)
    }

    /// Build from parallel index and value lists. A repeated index keeps the
    /// last value.
    pub fn from_triplets(indices: &[usize], values: &[f64], n: usize) -> Result<Self> {
        check_dim(indices.len(), values.len())?;
        let mut v = Self::nil(n);
        for (&i, &x) in indices.iter().zip(values) {
            v.try_at(i)?.set_value(x);
        }
        Ok(v)
    }

    /// Build from `(index, scalar)` pairs.
    pub fn from_entries<I: IntoIterator<Item = (usize, S)>>(n: usize, entries: I) -> Result<Self> {
        let mut v = Self::nil(n);
        for (i, s) in entries {
            *v.try_at(i)? = s;
        }
        Ok(v)
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Number of stored entries, structural zeros awaiting pruning included.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Occupied indices in ascending order.
    pub fn indices(&self) -> Vec<usize> {
        self.index.iter().collect()
    }

    /// The index set backing this vector.
    pub fn sparse_index(&self) -> &SparseIndex {
        &self.index
    }

    /// Element `i`; absent entries read as the shared zero.
    ///
    /// # Panics
    ///
    /// Panics if `i >= dim()`.
    #[inline]
    pub fn const_at(&self, i: usize) -> &S {
        if i >= self.n {
            panic!("{}", Error::IndexOutOfRange { index: i, dim: self.n });
        }
        self.entries.get(&i).unwrap_or(&self.zero)
    }

    /// Mutable element `i`, allocating a zero entry if absent.
    ///
    /// # Panics
    ///
    /// Panics if `i >= dim()`.
    pub fn at(&mut self, i: usize) -> &mut S {
        if i >= self.n {
            panic!("{}", Error::IndexOutOfRange { index: i, dim: self.n });
        }
        match self.entries.entry(i) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                self.index.insert(i);
                e.insert(S::default())
            }
        }
    }

    pub fn try_at(&mut self, i: usize) -> Result<&mut S> {
        check_index(i, self.n)?;
        Ok(self.at(i))
    }

    /// Whether index `i` has a stored entry.
    #[inline]
    pub fn contains(&self, i: usize) -> bool {
        self.entries.contains_key(&i)
    }

    /// Mutable cursor over occupied entries.
    pub fn iter_mut(&mut self) -> IterMut<'_, S> {
        self.iter_mut_from(0)
    }

    /// Mutable cursor over occupied entries with index `>= i`.
    pub fn iter_mut_from(&mut self, i: usize) -> IterMut<'_, S> {
        IterMut::new(self.slots(i))
    }

    /// Joint cursor over `self ∪ other`.
    pub fn joint_iter_mut<'a, V: ConstVector>(
        &'a mut self,
        other: &'a V,
    ) -> JointIterMut<'a, S, V> {
        JointIterMut::new(self.slots(0), other)
    }

    /// Joint cursor over `self ∪ a ∪ b`.
    pub fn joint3_iter_mut<'a, A: ConstVector, B: ConstVector>(
        &'a mut self,
        a: &'a A,
        b: &'a B,
    ) -> JointIter3Mut<'a, S, A, B> {
        JointIter3Mut::new(self.slots(0), a, b)
    }

    fn slots(&mut self, from: usize) -> Slots<'_, S> {
        let SparseVector {
            entries,
            index,
            zero,
            ..
        } = self;
        Slots::new(entries, index.sweep(from), zero)
    }

    /// Delete every stored structural zero.
    pub fn prune(&mut self) {
        let mut it = self.iter_mut();
        while it.ok() {
            it.next();
        }
    }

    /// Sort all `dim()` logical positions by value, absent entries counting as 0.
    ///
    /// Ascending order puts the negative entries first, followed by the
    /// stored zeros, the unstored zeros and finally the positive entries.
    /// `reverse` produces the mirror image. Zeros are never materialized.
    pub fn sort(&mut self, reverse: bool) {
        let n = self.n;
        let mut neg = Vec::new();
        let mut zero = Vec::new();
        let mut pos = Vec::new();
        for (_, s) in self.entries.drain() {
            let x = s.value();
            if x < 0.0 {
                neg.push(s);
            } else if x == 0.0 {
                zero.push(s);
            } else {
                pos.push(s);
            }
        }
        self.index.clear();
        neg.sort_by(|a, b| a.value().total_cmp(&b.value()));
        pos.sort_by(|a, b| a.value().total_cmp(&b.value()));

        let (head, tail) = if reverse {
            pos.reverse();
            neg.reverse();
            (pos, neg)
        } else {
            (neg, pos)
        };
        let head_len = head.len();
        let tail_start = n - tail.len();
        let placed = head
            .into_iter()
            .enumerate()
            .chain(zero.into_iter().enumerate().map(|(k, s)| (head_len + k, s)))
            .chain(tail.into_iter().enumerate().map(|(k, s)| (tail_start + k, s)));
        for (i, s) in placed {
            self.entries.insert(i, s);
            self.index.insert(i);
        }
    }
}

impl<S: Scalar> Index<usize> for SparseVector<S> {
    type Output = S;

    #[inline]
    fn index(&self, i: usize) -> &S {
        self.const_at(i)
    }
}

impl<S: Scalar> IndexMut<usize> for SparseVector<S> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut S {
        self.at(i)
    }
}

/// Ascending iterator over the stored entries of a [`SparseVector`].
pub struct SparseIter<'a, S> {
    indices: IndexIter<'a>,
    entries: &'a HashMap<usize, S>,
}

impl<'a, S> Iterator for SparseIter<'a, S> {
    type Item = (usize, &'a S);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let entries = self.entries;
        self.indices
            .by_ref()
            .find_map(|i| entries.get(&i).map(|s| (i, s)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl<S: Scalar> ConstVector for SparseVector<S> {
    type Elem = S;
    type Iter<'a> = SparseIter<'a, S>;

    #[inline]
    fn dim(&self) -> usize {
        self.n
    }

    #[inline]
    fn const_at(&self, i: usize) -> &S {
        SparseVector::const_at(self, i)
    }

    fn const_iter_from(&self, i: usize) -> SparseIter<'_, S> {
        SparseIter {
            indices: self.index.iter_from(i),
            entries: &self.entries,
        }
    }

    fn nnz(&self) -> usize {
        self.entries.len()
    }
}

impl<S: Scalar> Vector for SparseVector<S> {
    fn null(n: usize) -> Self {
        SparseVector::nil(n)
    }

    #[inline]
    fn at(&mut self, i: usize) -> &mut S {
        SparseVector::at(self, i)
    }

    fn reset(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Delete entry `i` if stored.
    fn unset(&mut self, i: usize) {
        if self.entries.remove(&i).is_some() {
            self.index.remove(i);
        }
    }

    fn swap(&mut self, i: usize, j: usize) {
        if i >= self.n || j >= self.n {
            panic!(
                "{}",
                Error::IndexOutOfRange {
                    index: i.max(j),
                    dim: self.n
                }
            );
        }
        if i == j {
            return;
        }
        match (self.entries.remove(&i), self.entries.remove(&j)) {
            (Some(a), Some(b)) => {
                self.entries.insert(i, b);
                self.entries.insert(j, a);
            }
            (Some(a), None) => {
                self.entries.insert(j, a);
                self.index.remove(i);
                self.index.insert(j);
            }
            (None, Some(b)) => {
                self.entries.insert(i, b);
                self.index.remove(j);
                self.index.insert(i);
            }
            (None, None) => {}
        }
    }

    /// Copy `other`: entries only in `self` are zeroed and pruned, entries
    /// only in `other` are allocated.
    fn set<V: ConstVector>(&mut self, other: &V) -> Result<()> {
        check_dim(self.n, other.dim())?;
        let mut it = self.joint_iter_mut(other);
        while it.ok() {
            let (s, x) = it.at();
            s.set(x);
            it.next();
        }
        Ok(())
    }

    /// Rekey the stored entries only.
    fn remap<F: Fn(usize) -> usize>(&mut self, dest: F) {
        let entries = std::mem::take(&mut self.entries);
        self.index.clear();
        for (k, s) in entries {
            let d = dest(k);
            self.entries.insert(d, s);
            self.index.insert(d);
        }
    }

    fn slice(&self, from: usize, to: usize) -> Result<Self> {
        check_range(from, to, self.n)?;
        let mut r = SparseVector::nil(to - from);
        for (i, s) in self.const_iter_from(from) {
            if i >= to {
                break;
            }
            r.entries.insert(i - from, s.clone());
            r.index.insert(i - from);
        }
        Ok(r)
    }
}

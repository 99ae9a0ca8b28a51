//! Joint iteration over the union of occupied indices of two or three vectors.
//!
//! Positions are visited in ascending order. A side that has no entry at the
//! current position reports its zero, and positions where every side is a
//! structural zero are skipped altogether. The mutable cursors write only to
//! their own vector; the other sides are read through [`ConstVector`].

use std::iter::Peekable;

use crate::scalar::ConstScalar;
use crate::scalar::Scalar;
use crate::vector::iter::{Origin, Slots};
use crate::vector::ConstVector;

#[inline]
fn min_index(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

#[inline]
fn peek_index<'a, T: 'a, I: Iterator<Item = (usize, &'a T)>>(
    it: &mut Peekable<I>,
) -> Option<usize> {
    it.peek().map(|&(i, _)| i)
}

/// Take the head of `it` if it sits at `k`.
#[inline]
fn take_at<'a, T: 'a, I: Iterator<Item = (usize, &'a T)>>(
    it: &mut Peekable<I>,
    k: usize,
) -> Option<&'a T> {
    match it.peek() {
        Some(&(i, _)) if i == k => it.next().map(|(_, t)| t),
        _ => None,
    }
}

#[inline]
fn absent_or_zero<T: ConstScalar>(t: Option<&T>) -> bool {
    t.map_or(true, |t| t.is_structural_zero())
}

// ──────────────────────────────────────────────
//  Read-only joint iterators
// ──────────────────────────────────────────────

/// Joint iterator over two vectors yielding `(index, &a_i, &b_i)`.
pub struct JointIter<'a, A: ConstVector + 'a, B: ConstVector + 'a> {
    a: &'a A,
    b: &'a B,
    ia: Peekable<A::Iter<'a>>,
    ib: Peekable<B::Iter<'a>>,
}

impl<'a, A: ConstVector, B: ConstVector> JointIter<'a, A, B> {
    pub fn new(a: &'a A, b: &'a B) -> Self {
        Self::starting_at(a, b, 0)
    }

    /// Start at the first position `>= i`.
    pub fn starting_at(a: &'a A, b: &'a B, i: usize) -> Self {
        JointIter {
            a,
            b,
            ia: a.const_iter_from(i).peekable(),
            ib: b.const_iter_from(i).peekable(),
        }
    }
}

impl<'a, A: ConstVector, B: ConstVector> Iterator for JointIter<'a, A, B> {
    type Item = (usize, &'a A::Elem, &'a B::Elem);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let k = min_index(peek_index(&mut self.ia), peek_index(&mut self.ib))?;
            let x = take_at(&mut self.ia, k);
            let y = take_at(&mut self.ib, k);
            if absent_or_zero(x) && absent_or_zero(y) {
                continue;
            }
            let x = x.unwrap_or_else(|| self.a.const_at(k));
            let y = y.unwrap_or_else(|| self.b.const_at(k));
            return Some((k, x, y));
        }
    }
}

/// Joint iterator over three vectors yielding `(index, &a_i, &b_i, &c_i)`.
pub struct JointIter3<'a, A: ConstVector + 'a, B: ConstVector + 'a, C: ConstVector + 'a> {
    a: &'a A,
    b: &'a B,
    c: &'a C,
    ia: Peekable<A::Iter<'a>>,
    ib: Peekable<B::Iter<'a>>,
    ic: Peekable<C::Iter<'a>>,
}

impl<'a, A: ConstVector, B: ConstVector, C: ConstVector> JointIter3<'a, A, B, C> {
    pub fn new(a: &'a A, b: &'a B, c: &'a C) -> Self {
        JointIter3 {
            a,
            b,
            c,
            ia: a.const_iter().peekable(),
            ib: b.const_iter().peekable(),
            ic: c.const_iter().peekable(),
        }
    }
}

impl<'a, A: ConstVector, B: ConstVector, C: ConstVector> Iterator for JointIter3<'a, A, B, C> {
    type Item = (usize, &'a A::Elem, &'a B::Elem, &'a C::Elem);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let k = min_index(
                min_index(peek_index(&mut self.ia), peek_index(&mut self.ib)),
                peek_index(&mut self.ic),
            )?;
            let x = take_at(&mut self.ia, k);
            let y = take_at(&mut self.ib, k);
            let z = take_at(&mut self.ic, k);
            if absent_or_zero(x) && absent_or_zero(y) && absent_or_zero(z) {
                continue;
            }
            let x = x.unwrap_or_else(|| self.a.const_at(k));
            let y = y.unwrap_or_else(|| self.b.const_at(k));
            let z = z.unwrap_or_else(|| self.c.const_at(k));
            return Some((k, x, y, z));
        }
    }
}

// ──────────────────────────────────────────────
//  Mutable joint cursors
// ──────────────────────────────────────────────

struct Position<'a, T, U> {
    index: usize,
    origin: Origin,
    a: Option<&'a T>,
    b: Option<&'a U>,
}

/// Joint cursor over a sparse vector and a read-only operand.
///
/// Obtained from [`SparseVector::joint_iter_mut`](crate::SparseVector::joint_iter_mut).
/// [`get`](Self::get) reads both sides, [`at`](Self::at) additionally
/// allocates the self entry when absent. A self entry that is a structural
/// zero when the cursor moves on is deleted.
pub struct JointIterMut<'a, S: Scalar, V: ConstVector + 'a> {
    slots: Slots<'a, S>,
    other: &'a V,
    others: Peekable<V::Iter<'a>>,
    state: Option<Position<'a, V::Elem, V::Elem>>,
}

impl<'a, S: Scalar, V: ConstVector> JointIterMut<'a, S, V> {
    pub(crate) fn new(slots: Slots<'a, S>, other: &'a V) -> Self {
        let mut it = JointIterMut {
            slots,
            other,
            others: other.const_iter().peekable(),
            state: None,
        };
        it.settle();
        it
    }

    fn settle(&mut self) {
        loop {
            let stored = self.slots.peek();
            let Some(k) = min_index(stored, peek_index(&mut self.others)) else {
                self.state = None;
                return;
            };
            let stored = stored == Some(k);
            let other = take_at(&mut self.others, k);
            if self.slots.is_zero(k) && absent_or_zero(other) {
                if stored {
                    self.slots.leave(k, Origin::Stored);
                }
                continue;
            }
            let origin = if stored { Origin::Stored } else { Origin::Absent };
            self.state = Some(Position {
                index: k,
                origin,
                a: other,
                b: None,
            });
            return;
        }
    }

    fn position(&self) -> &Position<'a, V::Elem, V::Elem> {
        match &self.state {
            Some(p) => p,
            None => panic!("joint cursor is exhausted"),
        }
    }

    #[inline]
    pub fn ok(&self) -> bool {
        self.state.is_some()
    }

    /// Current position.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is exhausted.
    #[inline]
    pub fn index(&self) -> usize {
        self.position().index
    }

    /// Both sides at the current position; absent sides read as zero.
    pub fn get(&self) -> (&S, &V::Elem) {
        let p = self.position();
        let t = p.a.unwrap_or_else(|| self.other.const_at(p.index));
        (self.slots.get(p.index), t)
    }

    /// Like [`get`](Self::get), allocating the self entry if absent.
    pub fn at(&mut self) -> (&mut S, &V::Elem) {
        let p = match self.state.as_mut() {
            Some(p) => p,
            None => panic!("joint cursor is exhausted"),
        };
        if p.origin == Origin::Absent {
            self.slots.vivify(p.index);
            p.origin = Origin::Vivified;
        }
        let k = p.index;
        let other = self.other;
        let t = p.a.unwrap_or_else(|| other.const_at(k));
        (self.slots.get_mut(k), t)
    }

    /// Advance to the next position of the union.
    pub fn next(&mut self) {
        if let Some(p) = self.state.take() {
            self.slots.leave(p.index, p.origin);
        }
        self.settle();
    }
}

/// Joint cursor over a sparse vector and two read-only operands.
///
/// Obtained from [`SparseVector::joint3_iter_mut`](crate::SparseVector::joint3_iter_mut).
pub struct JointIter3Mut<'a, S: Scalar, A: ConstVector + 'a, B: ConstVector + 'a> {
    slots: Slots<'a, S>,
    a: &'a A,
    b: &'a B,
    ia: Peekable<A::Iter<'a>>,
    ib: Peekable<B::Iter<'a>>,
    state: Option<Position<'a, A::Elem, B::Elem>>,
}

impl<'a, S: Scalar, A: ConstVector, B: ConstVector> JointIter3Mut<'a, S, A, B> {
    pub(crate) fn new(slots: Slots<'a, S>, a: &'a A, b: &'a B) -> Self {
        let mut it = JointIter3Mut {
            slots,
            a,
            b,
            ia: a.const_iter().peekable(),
            ib: b.const_iter().peekable(),
            state: None,
        };
        it.settle();
        it
    }

    fn settle(&mut self) {
        loop {
            let stored = self.slots.peek();
            let head = min_index(peek_index(&mut self.ia), peek_index(&mut self.ib));
            let Some(k) = min_index(stored, head) else {
                self.state = None;
                return;
            };
            let stored = stored == Some(k);
            let x = take_at(&mut self.ia, k);
            let y = take_at(&mut self.ib, k);
            if self.slots.is_zero(k) && absent_or_zero(x) && absent_or_zero(y) {
                if stored {
                    self.slots.leave(k, Origin::Stored);
                }
                continue;
            }
            let origin = if stored { Origin::Stored } else { Origin::Absent };
            self.state = Some(Position {
                index: k,
                origin,
                a: x,
                b: y,
            });
            return;
        }
    }

    fn position(&self) -> &Position<'a, A::Elem, B::Elem> {
        match &self.state {
            Some(p) => p,
            None => panic!("joint cursor is exhausted"),
        }
    }

    #[inline]
    pub fn ok(&self) -> bool {
        self.state.is_some()
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.position().index
    }

    pub fn get(&self) -> (&S, &A::Elem, &B::Elem) {
        let p = self.position();
        let x = p.a.unwrap_or_else(|| self.a.const_at(p.index));
        let y = p.b.unwrap_or_else(|| self.b.const_at(p.index));
        (self.slots.get(p.index), x, y)
    }

    pub fn at(&mut self) -> (&mut S, &A::Elem, &B::Elem) {
        let p = match self.state.as_mut() {
            Some(p) => p,
            None => panic!("joint cursor is exhausted"),
        };
        if p.origin == Origin::Absent {
            self.slots.vivify(p.index);
            p.origin = Origin::Vivified;
        }
        let k = p.index;
        let (a, b) = (self.a, self.b);
        let x = p.a.unwrap_or_else(|| a.const_at(k));
        let y = p.b.unwrap_or_else(|| b.const_at(k));
        (self.slots.get_mut(k), x, y)
    }

    pub fn next(&mut self) {
        if let Some(p) = self.state.take() {
            self.slots.leave(p.index, p.origin);
        }
        self.settle();
    }
}

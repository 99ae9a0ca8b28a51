use std::cell::Ref;

use crate::error::Error;
use crate::scalar::ConstScalar;
use crate::vector::{ConstVector, Vector};

/// Zero-copy view of one row or column of a [`Matrix`](crate::Matrix).
///
/// Holds a shared borrow of the backing vector for as long as it lives, so
/// the matrix cannot be written through any view in the meantime.
pub struct MatrixLine<'a, V: Vector> {
    values: Ref<'a, V>,
    start: usize,
    stride: usize,
    len: usize,
}

impl<'a, V: Vector> MatrixLine<'a, V> {
    pub(crate) fn new(values: Ref<'a, V>, start: usize, stride: usize, len: usize) -> Self {
        MatrixLine {
            values,
            start,
            stride,
            len,
        }
    }

    /// Whether the line occupies consecutive backing positions.
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.stride == 1
    }
}

enum Mode<I> {
    Contiguous(I),
    Strided,
    Done,
}

/// Iterator over a [`MatrixLine`].
///
/// Contiguous lines reuse the backing iterator and inherit its sparsity;
/// strided lines probe every position and skip structural zeros.
pub struct LineIter<'b, V: Vector + 'b> {
    values: &'b V,
    mode: Mode<V::Iter<'b>>,
    start: usize,
    stride: usize,
    len: usize,
    pos: usize,
}

impl<'b, V: Vector + 'b> Iterator for LineIter<'b, V> {
    type Item = (usize, &'b V::Elem);

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.mode {
            Mode::Contiguous(inner) => match inner.next() {
                Some((k, s)) if k < self.start + self.len => Some((k - self.start, s)),
                _ => {
                    self.mode = Mode::Done;
                    None
                }
            },
            Mode::Strided => {
                while self.pos < self.len {
                    let p = self.pos;
                    self.pos += 1;
                    let s = self.values.const_at(self.start + p * self.stride);
                    if !s.is_structural_zero() {
                        return Some((p, s));
                    }
                }
                self.mode = Mode::Done;
                None
            }
            Mode::Done => None,
        }
    }
}

impl<'a, V: Vector> ConstVector for MatrixLine<'a, V> {
    type Elem = V::Elem;
    type Iter<'b> = LineIter<'b, V> where Self: 'b;

    #[inline]
    fn dim(&self) -> usize {
        self.len
    }

    fn const_at(&self, i: usize) -> &V::Elem {
        if i >= self.len {
            panic!("{}", Error::IndexOutOfRange { index: i, dim: self.len });
        }
        self.values.const_at(self.start + i * self.stride)
    }

    fn const_iter_from(&self, i: usize) -> LineIter<'_, V> {
        let values: &V = &self.values;
        let mode = if i >= self.len {
            Mode::Done
        } else if self.stride == 1 {
            Mode::Contiguous(values.const_iter_from(self.start + i))
        } else {
            Mode::Strided
        };
        LineIter {
            values,
            mode,
            start: self.start,
            stride: self.stride,
            len: self.len,
            pos: i,
        }
    }
}

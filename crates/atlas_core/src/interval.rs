//! Outward-rounded interval arithmetic.
//!
//! Every arithmetic operation widens its result by one ulp in each direction
//! (`f64::next_down` / `f64::next_up`), so an `Interval` produced by this
//! module always encloses the exact real-valued result. The empty set is a
//! first-class value (canonically `lo > hi`) and propagates through all
//! operations.

use nalgebra::{DMatrix, DVector};
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Index, IndexMut, Mul, Neg, Sub};

/// A closed real interval `[lo, hi]`, or the empty set when `lo > hi`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
}

impl Interval {
    pub const EMPTY: Self = Interval {
        lo: f64::INFINITY,
        hi: f64::NEG_INFINITY,
    };

    pub const ALL: Self = Interval {
        lo: f64::NEG_INFINITY,
        hi: f64::INFINITY,
    };

    pub fn new(lo: f64, hi: f64) -> Self {
        debug_assert!(lo <= hi, "malformed interval [{lo}, {hi}]");
        Self { lo, hi }
    }

    /// Degenerate interval `[v, v]`.
    pub fn point(v: f64) -> Self {
        Self { lo: v, hi: v }
    }

    pub fn is_empty(self) -> bool {
        self.lo > self.hi
    }

    pub fn is_degenerate(self) -> bool {
        self.lo == self.hi
    }

    pub fn mid(self) -> f64 {
        debug_assert!(!self.is_empty(), "midpoint of an empty interval");
        let m = 0.5 * (self.lo + self.hi);
        if m.is_finite() {
            m
        } else {
            0.5 * self.lo + 0.5 * self.hi
        }
    }

    /// Width `hi - lo`; zero for the empty set.
    pub fn diam(self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.hi - self.lo
        }
    }

    pub fn contains(self, v: f64) -> bool {
        self.lo <= v && v <= self.hi
    }

    pub fn intersect(self, other: Self) -> Self {
        let lo = self.lo.max(other.lo);
        let hi = self.hi.min(other.hi);
        if lo <= hi {
            Self { lo, hi }
        } else {
            Self::EMPTY
        }
    }

    /// Smallest interval containing both operands.
    pub fn hull(self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Self {
            lo: self.lo.min(other.lo),
            hi: self.hi.max(other.hi),
        }
    }

    pub fn is_subset(self, other: Self) -> bool {
        self.is_empty() || (!other.is_empty() && self.lo >= other.lo && self.hi <= other.hi)
    }

    /// Strict containment in the topological interior of `other`.
    pub fn is_interior_subset(self, other: Self) -> bool {
        self.is_empty() || (!other.is_empty() && self.lo > other.lo && self.hi < other.hi)
    }
}

impl Neg for Interval {
    type Output = Interval;

    fn neg(self) -> Interval {
        Interval {
            lo: -self.hi,
            hi: -self.lo,
        }
    }
}

impl Add for Interval {
    type Output = Interval;

    fn add(self, rhs: Interval) -> Interval {
        if self.is_empty() || rhs.is_empty() {
            return Interval::EMPTY;
        }
        Interval {
            lo: (self.lo + rhs.lo).next_down(),
            hi: (self.hi + rhs.hi).next_up(),
        }
    }
}

impl Sub for Interval {
    type Output = Interval;

    fn sub(self, rhs: Interval) -> Interval {
        if self.is_empty() || rhs.is_empty() {
            return Interval::EMPTY;
        }
        Interval {
            lo: (self.lo - rhs.hi).next_down(),
            hi: (self.hi - rhs.lo).next_up(),
        }
    }
}

impl Mul for Interval {
    type Output = Interval;

    fn mul(self, rhs: Interval) -> Interval {
        if self.is_empty() || rhs.is_empty() {
            return Interval::EMPTY;
        }
        let candidates = [
            self.lo * rhs.lo,
            self.lo * rhs.hi,
            self.hi * rhs.lo,
            self.hi * rhs.hi,
        ];
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for c in candidates {
            if !c.is_nan() {
                lo = lo.min(c);
                hi = hi.max(c);
            }
        }
        if lo > hi {
            // only reachable through 0 * inf endpoint products
            return Interval::ALL;
        }
        Interval {
            lo: lo.next_down(),
            hi: hi.next_up(),
        }
    }
}

impl Div for Interval {
    type Output = Interval;

    /// Division by an interval containing zero yields the whole line; callers
    /// that need a sharper result must test the denominator first.
    fn div(self, rhs: Interval) -> Interval {
        if self.is_empty() || rhs.is_empty() {
            return Interval::EMPTY;
        }
        if rhs.contains(0.0) {
            return Interval::ALL;
        }
        let candidates = [
            self.lo / rhs.lo,
            self.lo / rhs.hi,
            self.hi / rhs.lo,
            self.hi / rhs.hi,
        ];
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for c in candidates {
            if !c.is_nan() {
                lo = lo.min(c);
                hi = hi.max(c);
            }
        }
        Interval {
            lo: lo.next_down(),
            hi: hi.next_up(),
        }
    }
}

impl Mul<f64> for Interval {
    type Output = Interval;

    fn mul(self, rhs: f64) -> Interval {
        self * Interval::point(rhs)
    }
}

impl Zero for Interval {
    fn zero() -> Self {
        Interval::point(0.0)
    }

    fn is_zero(&self) -> bool {
        self.lo == 0.0 && self.hi == 0.0
    }
}

/// An axis-aligned box: a product of closed intervals over n coordinates.
///
/// The box is empty as soon as any component is empty; `set_empty` collapses
/// every component so the state is unambiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalVector {
    comps: Vec<Interval>,
}

impl IntervalVector {
    pub fn new(comps: Vec<Interval>) -> Self {
        Self { comps }
    }

    /// n copies of the same interval.
    pub fn full(n: usize, itv: Interval) -> Self {
        Self {
            comps: vec![itv; n],
        }
    }

    pub fn empty(n: usize) -> Self {
        Self {
            comps: vec![Interval::EMPTY; n],
        }
    }

    /// Degenerate box around a point.
    pub fn from_point(pt: &DVector<f64>) -> Self {
        Self {
            comps: pt.iter().map(|&v| Interval::point(v)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.comps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comps.iter().any(|c| c.is_empty())
    }

    pub fn set_empty(&mut self) {
        for c in &mut self.comps {
            *c = Interval::EMPTY;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interval> {
        self.comps.iter()
    }

    pub fn mid(&self) -> DVector<f64> {
        DVector::from_iterator(self.comps.len(), self.comps.iter().map(|c| c.mid()))
    }

    pub fn lb(&self) -> DVector<f64> {
        DVector::from_iterator(self.comps.len(), self.comps.iter().map(|c| c.lo))
    }

    pub fn ub(&self) -> DVector<f64> {
        DVector::from_iterator(self.comps.len(), self.comps.iter().map(|c| c.hi))
    }

    pub fn max_diam(&self) -> f64 {
        self.comps.iter().map(|c| c.diam()).fold(0.0, f64::max)
    }

    /// Index of the widest component (first on ties).
    pub fn max_diam_index(&self) -> usize {
        let mut best = 0;
        let mut best_diam = f64::NEG_INFINITY;
        for (i, c) in self.comps.iter().enumerate() {
            let d = c.diam();
            if d > best_diam {
                best = i;
                best_diam = d;
            }
        }
        best
    }

    /// Split along coordinate `i` at its midpoint; the two halves cover the
    /// original box.
    pub fn bisect(&self, i: usize) -> (Self, Self) {
        debug_assert!(!self.is_empty(), "bisecting an empty box");
        let m = self.comps[i].mid();
        let mut left = self.clone();
        let mut right = self.clone();
        left.comps[i] = Interval::new(self.comps[i].lo, m);
        right.comps[i] = Interval::new(m, self.comps[i].hi);
        (left, right)
    }

    /// Componentwise intersection; an empty result empties the whole box.
    pub fn meet(&mut self, other: &Self) {
        debug_assert_eq!(self.len(), other.len());
        for (c, o) in self.comps.iter_mut().zip(other.comps.iter()) {
            *c = c.intersect(*o);
        }
        if self.is_empty() {
            self.set_empty();
        }
    }

    pub fn is_subset(&self, other: &Self) -> bool {
        debug_assert_eq!(self.len(), other.len());
        if self.is_empty() {
            return true;
        }
        self.comps
            .iter()
            .zip(other.comps.iter())
            .all(|(c, o)| c.is_subset(*o))
    }

    pub fn is_interior_subset(&self, other: &Self) -> bool {
        debug_assert_eq!(self.len(), other.len());
        if self.is_empty() {
            return true;
        }
        self.comps
            .iter()
            .zip(other.comps.iter())
            .all(|(c, o)| c.is_interior_subset(*o))
    }

    pub fn hull(&self, other: &Self) -> Self {
        debug_assert_eq!(self.len(), other.len());
        Self {
            comps: self
                .comps
                .iter()
                .zip(other.comps.iter())
                .map(|(c, o)| c.hull(*o))
                .collect(),
        }
    }
}

impl Index<usize> for IntervalVector {
    type Output = Interval;

    fn index(&self, i: usize) -> &Interval {
        &self.comps[i]
    }
}

impl IndexMut<usize> for IntervalVector {
    fn index_mut(&mut self, i: usize) -> &mut Interval {
        &mut self.comps[i]
    }
}

/// A dense matrix of intervals, enclosing every realization of a real matrix
/// over a box (e.g. a Jacobian bound).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalMatrix {
    nrows: usize,
    ncols: usize,
    data: Vec<Interval>,
}

impl IntervalMatrix {
    pub fn from_fn(nrows: usize, ncols: usize, mut f: impl FnMut(usize, usize) -> Interval) -> Self {
        let mut data = Vec::with_capacity(nrows * ncols);
        for i in 0..nrows {
            for j in 0..ncols {
                data.push(f(i, j));
            }
        }
        Self { nrows, ncols, data }
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Restriction to a subset of columns, in the given order.
    pub fn columns(&self, idx: &[usize]) -> IntervalMatrix {
        IntervalMatrix::from_fn(self.nrows, idx.len(), |i, j| self[(i, idx[j])])
    }

    pub fn lb(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.nrows, self.ncols, |i, j| self[(i, j)].lo)
    }

    pub fn ub(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.nrows, self.ncols, |i, j| self[(i, j)].hi)
    }

    pub fn mid(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.nrows, self.ncols, |i, j| self[(i, j)].mid())
    }
}

impl Index<(usize, usize)> for IntervalMatrix {
    type Output = Interval;

    fn index(&self, (i, j): (usize, usize)) -> &Interval {
        debug_assert!(i < self.nrows && j < self.ncols);
        &self.data[i * self.ncols + j]
    }
}

impl IndexMut<(usize, usize)> for IntervalMatrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Interval {
        debug_assert!(i < self.nrows && j < self.ncols);
        &mut self.data[i * self.ncols + j]
    }
}

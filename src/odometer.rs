//! Row-major multi-index generator with incremental offset tracking.
//!
//! The [`Odometer`] enumerates every multi-index of a shape with the last
//! axis varying fastest. Instead of recomputing `sum(idx[d] * stride[d])` at
//! each step it keeps one running linear offset per view and patches it as
//! counters tick over: bump the innermost counter and add its stride; when a
//! counter reaches its extent, reset it, subtract `extent * stride`, and carry
//! into the next axis outward. The walk ends when axis 0 carries.
//!
//! All state lives in fixed `[_; MAX_RANK]` arrays on the stack.

use crate::MAX_RANK;

/// Returns `true` if a traversal of `dims` visits nothing.
///
/// Any zero extent empties the domain, and a rank-0 shape is treated as
/// empty as well.
#[inline]
pub fn is_empty_domain(dims: &[usize]) -> bool {
    dims.is_empty() || dims.iter().any(|&d| d == 0)
}

/// Stack-resident index generator over one shape and `N` strided views.
///
/// Yields `[isize; N]`: the linear offset of the current multi-index in each
/// view, starting from the given base offsets. Offsets are in whatever unit
/// the strides are in (elements, or bytes when built with
/// [`Odometer::with_scale`]).
///
/// # Panics
/// Construction panics if `dims.len() > MAX_RANK`.
#[derive(Debug, Clone)]
pub struct Odometer<const N: usize> {
    rank: usize,
    dims: [usize; MAX_RANK],
    coords: [usize; MAX_RANK],
    steps: [[isize; MAX_RANK]; N],
    offsets: [isize; N],
    done: bool,
}

impl<const N: usize> Odometer<N> {
    /// Create an odometer with strides used as-is.
    #[inline]
    pub fn new(dims: &[usize], strides: [&[isize]; N], bases: [isize; N]) -> Self {
        Self::with_scale(dims, strides, bases, 1)
    }

    /// Create an odometer whose per-axis steps are `strides[d] * scale`.
    ///
    /// Used by the width-generic kernels to turn element strides into byte
    /// steps once, up front. `bases` are taken unscaled.
    pub fn with_scale(
        dims: &[usize],
        strides: [&[isize]; N],
        bases: [isize; N],
        scale: isize,
    ) -> Self {
        let rank = dims.len();
        assert!(
            rank <= MAX_RANK,
            "rank {} exceeds maximum supported rank {}",
            rank,
            MAX_RANK
        );

        let mut extents = [0usize; MAX_RANK];
        extents[..rank].copy_from_slice(dims);

        let mut steps = [[0isize; MAX_RANK]; N];
        for (step, view_strides) in steps.iter_mut().zip(strides.iter()) {
            debug_assert_eq!(view_strides.len(), rank, "stride and dims length mismatch");
            for (s, &stride) in step[..rank].iter_mut().zip(view_strides.iter()) {
                *s = stride * scale;
            }
        }

        Self {
            rank,
            dims: extents,
            coords: [0; MAX_RANK],
            steps,
            offsets: bases,
            done: is_empty_domain(dims),
        }
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Current multi-index.
    #[inline]
    pub fn coords(&self) -> &[usize] {
        &self.coords[..self.rank]
    }

    /// Current offsets. Once the walk has finished every axis has been
    /// rewound, so these equal the base offsets again.
    #[inline]
    pub fn offsets(&self) -> [isize; N] {
        self.offsets
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Step to the next multi-index, propagating carries outward.
    ///
    /// Returns `false` (and marks the walk finished) when axis 0 wraps.
    #[inline]
    pub fn advance(&mut self) -> bool {
        if self.done {
            return false;
        }
        let mut axis = self.rank;
        while axis > 0 {
            axis -= 1;
            self.coords[axis] += 1;
            for (offset, step) in self.offsets.iter_mut().zip(self.steps.iter()) {
                *offset += step[axis];
            }
            if self.coords[axis] < self.dims[axis] {
                return true;
            }

            // Axis exhausted: undo its full sweep and carry.
            self.coords[axis] = 0;
            let extent = self.dims[axis] as isize;
            for (offset, step) in self.offsets.iter_mut().zip(self.steps.iter()) {
                *offset -= extent * step[axis];
            }
        }
        self.done = true;
        false
    }
}

impl<const N: usize> Iterator for Odometer<N> {
    type Item = [isize; N];

    #[inline]
    fn next(&mut self) -> Option<[isize; N]> {
        if self.done {
            return None;
        }
        let current = self.offsets;
        self.advance();
        Some(current)
    }
}

impl<const N: usize> std::iter::FusedIterator for Odometer<N> {}

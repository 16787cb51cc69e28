//! Shape/stride/offset metadata and its validation.

use smallvec::SmallVec;

use crate::{Result, StridedError, MAX_RANK};

/// Inline storage for per-axis extents; never spills for supported ranks.
pub type Dims = SmallVec<[usize; MAX_RANK]>;

/// Inline storage for per-axis strides.
pub type Strides = SmallVec<[isize; MAX_RANK]>;

#[inline]
fn check_rank(rank: usize) -> Result<()> {
    if rank > MAX_RANK {
        return Err(StridedError::RankTooLarge {
            rank,
            max: MAX_RANK,
        });
    }
    Ok(())
}

/// Number of `elem_size`-byte elements in a byte buffer of `len` bytes.
pub(crate) fn element_count(len: usize, elem_size: usize) -> Result<usize> {
    if elem_size == 0 {
        return Err(StridedError::ZeroElementSize);
    }
    if len % elem_size != 0 {
        return Err(StridedError::BufferLength { len, elem_size });
    }
    Ok(len / elem_size)
}

/// Compute row-major strides (last index varies fastest).
pub fn row_major_strides(dims: &[usize]) -> Strides {
    let rank = dims.len();
    let mut strides: Strides = SmallVec::from_elem(1, rank);
    for i in (0..rank.saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * dims[i + 1] as isize;
    }
    strides
}

/// Compute column-major strides (first index varies fastest).
pub fn col_major_strides(dims: &[usize]) -> Strides {
    let rank = dims.len();
    let mut strides: Strides = SmallVec::from_elem(1, rank);
    for i in 1..rank {
        strides[i] = strides[i - 1] * dims[i - 1] as isize;
    }
    strides
}

/// Check that `strides` describe a dense layout of `dims` in the given axis
/// order. Axes of extent 1 are ignored.
fn is_dense<'a>(axes: impl Iterator<Item = (&'a usize, &'a isize)>) -> bool {
    let mut expected = 1isize;
    for (&d, &s) in axes {
        if d <= 1 {
            continue;
        }
        if s != expected {
            return false;
        }
        expected = expected.saturating_mul(d as isize);
    }
    true
}

/// Check if both stride sets are the same dense row-major or column-major
/// layout of `dims`, so that a linear memcpy reproduces the strided copy.
pub(crate) fn is_both_contiguous(dims: &[usize], a: &[isize], b: &[isize]) -> bool {
    if dims.is_empty() {
        return true;
    }
    let col = is_dense(dims.iter().zip(a.iter())) && is_dense(dims.iter().zip(b.iter()));
    if col {
        return true;
    }
    is_dense(dims.iter().rev().zip(a.iter().rev()))
        && is_dense(dims.iter().rev().zip(b.iter().rev()))
}

/// Dims, strides (in elements) and base offset describing one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    dims: Dims,
    strides: Strides,
    offset: isize,
}

impl Layout {
    /// Create a layout. Rank and stride length are checked; bounds are not
    /// (see [`Layout::validate_bounds`]).
    pub fn new(dims: &[usize], strides: &[isize], offset: isize) -> Result<Self> {
        check_rank(dims.len())?;
        if dims.len() != strides.len() {
            return Err(StridedError::StrideLengthMismatch);
        }
        Ok(Self {
            dims: SmallVec::from_slice(dims),
            strides: SmallVec::from_slice(strides),
            offset,
        })
    }

    /// Dense row-major layout at offset 0.
    pub fn row_major(dims: &[usize]) -> Result<Self> {
        check_rank(dims.len())?;
        Ok(Self {
            dims: SmallVec::from_slice(dims),
            strides: row_major_strides(dims),
            offset: 0,
        })
    }

    /// Dense column-major layout at offset 0.
    pub fn col_major(dims: &[usize]) -> Result<Self> {
        check_rank(dims.len())?;
        Ok(Self {
            dims: SmallVec::from_slice(dims),
            strides: col_major_strides(dims),
            offset: 0,
        })
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    pub fn offset(&self) -> isize {
        self.offset
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Number of addressed elements.
    ///
    /// A rank-0 layout reports 1 here (the empty product) and is not
    /// [`is_empty`](Self::is_empty), but [`is_empty_domain`] treats rank 0 as
    /// empty and every copy and flip kernel is a no-op on it. Kernels never
    /// consult `len()` at rank 0.
    ///
    /// [`is_empty_domain`]: crate::is_empty_domain
    #[inline]
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.iter().any(|&d| d == 0)
    }

    /// Reorder axes: axis `i` of the result is axis `perm[i]` of `self`.
    pub fn permute(&self, perm: &[usize]) -> Result<Self> {
        let rank = self.dims.len();
        if perm.len() != rank {
            return Err(StridedError::RankMismatch(perm.len(), rank));
        }
        let mut seen = [false; MAX_RANK];
        for &p in perm {
            if p >= rank || seen[p] {
                return Err(StridedError::InvalidAxis { axis: p, rank });
            }
            seen[p] = true;
        }
        Ok(Self {
            dims: perm.iter().map(|&p| self.dims[p]).collect(),
            strides: perm.iter().map(|&p| self.strides[p]).collect(),
            offset: self.offset,
        })
    }

    /// Validate that every addressed element lies within `[0, len)`.
    pub fn validate_bounds(&self, len: usize) -> Result<()> {
        // Empty layout - no access needed
        if self.is_empty() {
            return Ok(());
        }
        let mut min_offset = self.offset;
        let mut max_offset = self.offset;
        for (&dim, &stride) in self.dims.iter().zip(self.strides.iter()) {
            if dim > 1 {
                let end = stride
                    .checked_mul(dim as isize - 1)
                    .ok_or(StridedError::OffsetOverflow)?;
                if end >= 0 {
                    max_offset = max_offset
                        .checked_add(end)
                        .ok_or(StridedError::OffsetOverflow)?;
                } else {
                    min_offset = min_offset
                        .checked_add(end)
                        .ok_or(StridedError::OffsetOverflow)?;
                }
            }
        }
        if min_offset < 0 || max_offset < 0 || max_offset as usize >= len {
            return Err(StridedError::OffsetOverflow);
        }
        Ok(())
    }

    /// Linear element offset of a multi-index.
    ///
    /// # Panics
    /// Panics if the index has the wrong rank or is out of range.
    pub fn index_offset(&self, indices: &[usize]) -> isize {
        assert_eq!(indices.len(), self.dims.len(), "wrong number of indices");
        let mut idx = self.offset;
        let axes = self.dims.iter().zip(self.strides.iter());
        for (&index, (&dim, &stride)) in indices.iter().zip(axes) {
            assert!(index < dim, "index {} out of bounds for dim {}", index, dim);
            idx += index as isize * stride;
        }
        idx
    }

    /// True if this layout is dense row-major or column-major.
    pub fn is_contiguous(&self) -> bool {
        is_dense(self.dims.iter().rev().zip(self.strides.iter().rev()))
            || is_dense(self.dims.iter().zip(self.strides.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_and_col_major_strides() {
        assert_eq!(row_major_strides(&[2, 3, 4]).as_slice(), &[12, 4, 1]);
        assert_eq!(col_major_strides(&[2, 3, 4]).as_slice(), &[1, 2, 6]);
        assert!(row_major_strides(&[]).is_empty());
        assert!(col_major_strides(&[]).is_empty());
    }

    #[test]
    fn test_new_rejects_bad_metadata() {
        assert!(matches!(
            Layout::new(&[2, 3], &[1], 0),
            Err(StridedError::StrideLengthMismatch)
        ));
        let dims = [1usize; MAX_RANK + 1];
        let strides = [1isize; MAX_RANK + 1];
        assert!(matches!(
            Layout::new(&dims, &strides, 0),
            Err(StridedError::RankTooLarge { rank: 17, max: 16 })
        ));
        assert!(Layout::row_major(&dims).is_err());
    }

    #[test]
    fn test_permute() {
        let l = Layout::row_major(&[2, 3, 4]).unwrap();
        let p = l.permute(&[2, 0, 1]).unwrap();
        assert_eq!(p.dims(), &[4, 2, 3]);
        assert_eq!(p.strides(), &[1, 12, 4]);
        assert!(matches!(
            l.permute(&[0, 0, 1]),
            Err(StridedError::InvalidAxis { axis: 0, rank: 3 })
        ));
        assert!(matches!(l.permute(&[0, 1]), Err(StridedError::RankMismatch(2, 3))));
    }

    #[test]
    fn test_validate_bounds() {
        let l = Layout::row_major(&[2, 3]).unwrap();
        assert!(l.validate_bounds(6).is_ok());
        assert!(l.validate_bounds(5).is_err());

        // Reversed view: starts at the end, walks backward.
        let rev = Layout::new(&[4], &[-1], 3).unwrap();
        assert!(rev.validate_bounds(4).is_ok());
        let bad = Layout::new(&[4], &[-1], 2).unwrap();
        assert!(bad.validate_bounds(4).is_err());

        // Empty layouts never touch memory.
        let empty = Layout::new(&[0, 5], &[100, 1], 1000).unwrap();
        assert!(empty.validate_bounds(0).is_ok());

        let huge = Layout::new(&[3], &[isize::MAX], 0).unwrap();
        assert!(matches!(
            huge.validate_bounds(10),
            Err(StridedError::OffsetOverflow)
        ));
    }

    #[test]
    fn test_contiguity() {
        assert!(Layout::row_major(&[3, 4]).unwrap().is_contiguous());
        assert!(Layout::col_major(&[3, 4]).unwrap().is_contiguous());
        assert!(!Layout::new(&[3, 4], &[8, 1], 0).unwrap().is_contiguous());
        assert!(is_both_contiguous(&[3, 4], &[4, 1], &[4, 1]));
        assert!(is_both_contiguous(&[3, 4], &[1, 3], &[1, 3]));
        assert!(!is_both_contiguous(&[3, 4], &[4, 1], &[1, 3]));
        // Singleton axes carry arbitrary strides.
        assert!(is_both_contiguous(&[1, 4], &[99, 1], &[7, 1]));
    }

    #[test]
    fn test_index_offset() {
        let l = Layout::new(&[2, 3], &[1, 2], 5).unwrap();
        assert_eq!(l.index_offset(&[1, 2]), 10);
    }

    #[test]
    fn test_rank0_len_vs_empty_domain() {
        let l = Layout::new(&[], &[], 0).unwrap();
        assert_eq!(l.len(), 1);
        assert!(!l.is_empty());
        assert!(crate::is_empty_domain(l.dims()));
        assert!(l.validate_bounds(1).is_ok());
    }
}

//! N-dimensional strided copy and in-place axis reversal.
//!
//! This crate provides the data-movement kernels that sit underneath a
//! strided array type: element-wise copy between two arbitrarily strided
//! views of the same shape, and in-place reversal of a buffer along a set of
//! axes. Both are built on one allocation-free index generator, the
//! [`Odometer`], which walks a shape in row-major order (last axis fastest)
//! while keeping linear offsets into one or two buffers up to date.
//!
//! # API tiers
//!
//! - **Raw kernels** ([`copy_strided_raw`], [`copy_strided_bytes_raw`],
//!   [`flip_strided_raw`], [`flip_strided_bytes_raw`]): `unsafe` functions
//!   over raw pointers. They only assert `rank <= MAX_RANK`; strides, shape
//!   and buffer extents are the caller's responsibility.
//! - **Checked operations** ([`copy_into`], [`copy_into_pod`],
//!   [`copy_bytes_into`], [`flip_axes`], [`flip_axes_list`], [`flip_bytes`]):
//!   safe functions over borrowed slices that validate layouts and return
//!   [`StridedError`] instead of invoking undefined behavior.
//!
//! # Example
//!
//! ```rust
//! use strided_walk::{copy_into, flip_axes, StridedArray};
//!
//! // Row-major 2x3 array: [[1, 2, 3], [4, 5, 6]]
//! let mut a = StridedArray::from_parts(vec![1, 2, 3, 4, 5, 6], &[2, 3], &[3, 1], 0).unwrap();
//! flip_axes(&mut a.view_mut(), &[true, true]).unwrap();
//! assert_eq!(a.data(), &[6, 5, 4, 3, 2, 1]);
//!
//! // Transposed copy into a fresh row-major 3x2 array.
//! let t = a.view().permute(&[1, 0]).unwrap();
//! let mut b = StridedArray::<i32>::row_major(&[3, 2]);
//! copy_into(&mut b.view_mut(), &t).unwrap();
//! assert_eq!(b.data(), &[6, 3, 5, 2, 4, 1]);
//! ```

pub mod copy;
pub mod flip;
pub mod layout;
pub mod odometer;
mod trace;
pub mod view;

// ============================================================================
// Re-exports
// ============================================================================
pub use copy::{
    copy_bytes_into, copy_into, copy_into_pod, copy_strided_bytes_raw, copy_strided_raw,
};
pub use flip::{
    flip_axes, flip_axes_list, flip_bytes, flip_strided_bytes_raw, flip_strided_raw,
};
pub use layout::{col_major_strides, row_major_strides, Layout};
pub use odometer::{is_empty_domain, Odometer};
pub use view::{StridedArray, StridedView, StridedViewMut};

// ============================================================================
// Constants
// ============================================================================

/// Maximum supported rank.
///
/// Per-axis iteration state is kept in fixed-size arrays of this length, so
/// no traversal ever allocates.
pub const MAX_RANK: usize = 16;

// ============================================================================
// Error types
// ============================================================================

/// Errors reported by the checked operations.
#[derive(Debug, thiserror::Error)]
pub enum StridedError {
    /// Ranks (or mask/dims lengths) do not match.
    #[error("rank mismatch: {0} vs {1}")]
    RankMismatch(usize, usize),

    /// Array shapes are incompatible for the operation.
    #[error("shape mismatch: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// Invalid (out of range or repeated) axis index for the given rank.
    #[error("invalid axis {axis} for rank {rank}")]
    InvalidAxis { axis: usize, rank: usize },

    /// Rank exceeds [`MAX_RANK`].
    #[error("rank {rank} exceeds maximum supported rank {max}")]
    RankTooLarge { rank: usize, max: usize },

    /// Stride array length doesn't match dimensions.
    #[error("stride and dims length mismatch")]
    StrideLengthMismatch,

    /// Integer overflow while computing an offset, or an offset outside the buffer.
    #[error("offset overflow while computing pointer")]
    OffsetOverflow,

    /// Width-generic operations need a non-zero element width.
    #[error("element width must be non-zero")]
    ZeroElementSize,

    /// Byte buffer length is not a whole number of elements.
    #[error("buffer of {len} bytes is not a multiple of element width {elem_size}")]
    BufferLength { len: usize, elem_size: usize },
}

/// Result type for strided operations.
pub type Result<T> = std::result::Result<T, StridedError>;

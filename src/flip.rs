//! In-place reversal along a set of axes.
//!
//! Reversal is done by swapping each element with its mirror image: a
//! forward cursor and a backward cursor walk the same odometer, the backward
//! one starting at the far end of every flipped axis and stepping with the
//! negated stride there.
//!
//! Every unordered pair must be swapped exactly once. The pairs are split by
//! the outermost flipped axis `k` of extent `e`:
//!
//! 1. `idx[k] < e / 2`: one pass with axis `k` cut to `e / 2` and every other
//!    axis at full extent.
//! 2. `idx[k] == e / 2` (only when `e` is odd): the middle slice is its own
//!    mirror along `k`, so pin both cursors there and repeat with the next
//!    flipped axis inside that slice.
//!
//! Once every flipped axis is pinned, the one remaining point is its own
//! mirror and is left alone. No cursor comparison is involved, so strides
//! may have any sign.

use crate::layout::{element_count, Layout};
use crate::odometer::{is_empty_domain, Odometer};
use crate::trace::trace_path;
use crate::view::StridedViewMut;
use crate::{Result, StridedError, MAX_RANK};

/// Call `swap(forward, backward)` once for every mirror pair of a reversal
/// of `dims` along `axes`. Offsets are `stride * scale` units from the base.
#[inline]
fn for_each_mirror_pair<F>(
    dims: &[usize],
    strides: &[isize],
    axes: &[bool],
    scale: isize,
    mut swap: F,
) where
    F: FnMut(isize, isize),
{
    let rank = dims.len();
    assert!(
        rank <= MAX_RANK,
        "rank {} exceeds maximum supported rank {}",
        rank,
        MAX_RANK
    );
    debug_assert_eq!(strides.len(), rank, "stride and dims length mismatch");
    debug_assert_eq!(axes.len(), rank, "axis mask and dims length mismatch");

    if is_empty_domain(dims) || !axes.iter().any(|&a| a) {
        return;
    }

    let mut extents = [0usize; MAX_RANK];
    extents[..rank].copy_from_slice(dims);
    let mut backward = [0isize; MAX_RANK];
    let mut forward_base = 0isize;
    let mut backward_base = 0isize;
    for d in 0..rank {
        if axes[d] {
            backward_base += (dims[d] as isize - 1) * strides[d] * scale;
            backward[d] = -strides[d];
        } else {
            backward[d] = strides[d];
        }
    }

    for k in 0..rank {
        if !axes[k] {
            continue;
        }
        let extent = extents[k];
        let half = extent / 2;
        if half > 0 {
            extents[k] = half;
            let odo = Odometer::with_scale(
                &extents[..rank],
                [strides, &backward[..rank]],
                [forward_base, backward_base],
                scale,
            );
            for [f, b] in odo {
                swap(f, b);
            }
        }
        if extent % 2 == 0 {
            return;
        }
        let middle = half as isize * strides[k] * scale;
        forward_base += middle;
        backward_base -= middle;
        extents[k] = 1;
    }
}

// ============================================================================
// Raw kernels
// ============================================================================

/// Reverse the elements of a strided buffer along every axis with
/// `axes[d] == true`, in place.
///
/// An all-false mask, a rank-0 shape or any zero extent is a no-op. Strides
/// are in elements and may be negative.
///
/// # Panics
/// Panics if `dims.len() > MAX_RANK`.
///
/// # Safety
/// - `strides` and `axes` have `dims.len()` entries.
/// - For every multi-index `i` of `dims`, `data + sum(i[d] * strides[d])` is
///   valid for reads and writes.
pub unsafe fn flip_strided_raw<T>(dims: &[usize], data: *mut T, strides: &[isize], axes: &[bool]) {
    for_each_mirror_pair(dims, strides, axes, 1, |f, b| {
        std::ptr::swap(data.offset(f), data.offset(b));
    });
}

#[inline]
unsafe fn flip_fixed_width<const W: usize>(
    dims: &[usize],
    data: *mut u8,
    strides: &[isize],
    axes: &[bool],
) {
    flip_strided_raw(dims, data.cast::<[u8; W]>(), strides, axes);
}

/// Width-generic form of [`flip_strided_raw`] for `elem_size`-byte elements.
///
/// Widths 1, 2, 4, 8 and 16 run the typed kernel over `[u8; W]`; any other
/// width swaps byte by byte.
///
/// # Panics
/// Panics if `dims.len() > MAX_RANK`.
///
/// # Safety
/// Same contract as [`flip_strided_raw`], with every element spanning
/// `elem_size` bytes.
pub unsafe fn flip_strided_bytes_raw(
    dims: &[usize],
    elem_size: usize,
    data: *mut u8,
    strides: &[isize],
    axes: &[bool],
) {
    match elem_size {
        1 => flip_fixed_width::<1>(dims, data, strides, axes),
        2 => flip_fixed_width::<2>(dims, data, strides, axes),
        4 => flip_fixed_width::<4>(dims, data, strides, axes),
        8 => flip_fixed_width::<8>(dims, data, strides, axes),
        16 => flip_fixed_width::<16>(dims, data, strides, axes),
        _ => for_each_mirror_pair(dims, strides, axes, elem_size as isize, |f, b| {
            let fwd = data.offset(f);
            let bwd = data.offset(b);
            for i in 0..elem_size {
                std::ptr::swap(fwd.add(i), bwd.add(i));
            }
        }),
    }
}

// ============================================================================
// Checked operations
// ============================================================================

fn check_mask(rank: usize, axes: &[bool]) -> Result<()> {
    if axes.len() != rank {
        return Err(StridedError::RankMismatch(axes.len(), rank));
    }
    Ok(())
}

/// Reverse a view in place along every axis with `axes[d] == true`.
pub fn flip_axes<T>(view: &mut StridedViewMut<T>, axes: &[bool]) -> Result<()> {
    check_mask(view.ndim(), axes)?;
    let layout = view.layout().clone();
    if is_empty_domain(layout.dims()) || !axes.contains(&true) {
        trace_path!("flip_axes: no-op dims={:?} axes={:?}", layout.dims(), axes);
        return Ok(());
    }

    trace_path!(
        "flip_axes: dims={:?} strides={:?} axes={:?}",
        layout.dims(),
        layout.strides(),
        axes
    );
    // The view is bounds-checked and non-empty, so its base is in range.
    unsafe {
        let base = view.as_mut_ptr().offset(layout.offset());
        flip_strided_raw(layout.dims(), base, layout.strides(), axes);
    }
    Ok(())
}

/// Reverse a view in place along the listed axes.
///
/// Axes must be in range and distinct.
pub fn flip_axes_list<T>(view: &mut StridedViewMut<T>, axes: &[usize]) -> Result<()> {
    let rank = view.ndim();
    let mut mask = [false; MAX_RANK];
    for &axis in axes {
        if axis >= rank || mask[axis] {
            return Err(StridedError::InvalidAxis { axis, rank });
        }
        mask[axis] = true;
    }
    flip_axes(view, &mask[..rank])
}

/// Reverse `elem_size`-byte elements of a byte buffer in place.
///
/// Layout strides and offset are in elements.
pub fn flip_bytes(data: &mut [u8], layout: &Layout, elem_size: usize, axes: &[bool]) -> Result<()> {
    let len = element_count(data.len(), elem_size)?;
    check_mask(layout.ndim(), axes)?;
    layout.validate_bounds(len)?;
    if is_empty_domain(layout.dims()) || !axes.contains(&true) {
        trace_path!("flip_bytes: no-op dims={:?} axes={:?}", layout.dims(), axes);
        return Ok(());
    }

    trace_path!(
        "flip_bytes: dims={:?} strides={:?} elem_size={} axes={:?}",
        layout.dims(),
        layout.strides(),
        elem_size,
        axes
    );
    unsafe {
        let base = data.as_mut_ptr().offset(layout.offset() * elem_size as isize);
        flip_strided_bytes_raw(layout.dims(), elem_size, base, layout.strides(), axes);
    }
    Ok(())
}

//! Strided copy: `dest[idx] = src[idx]` for every multi-index of a shared shape.

use bytemuck::Pod;

use crate::layout::{element_count, is_both_contiguous, Layout};
use crate::odometer::{is_empty_domain, Odometer};
use crate::trace::trace_path;
use crate::view::{StridedView, StridedViewMut};
use crate::{Result, StridedError};

// ============================================================================
// Raw kernels
// ============================================================================

/// Copy one `T` per multi-index from `src` to `dst`.
///
/// Strides are in elements. The walk is row-major (last axis fastest); a
/// rank-0 shape or any zero extent is a no-op.
///
/// # Panics
/// Panics if `dims.len() > MAX_RANK`.
///
/// # Safety
/// - `dst_strides` and `src_strides` have `dims.len()` entries.
/// - For every multi-index `i` of `dims`, `dst + sum(i[d] * dst_strides[d])`
///   is valid for writes and `src + sum(i[d] * src_strides[d])` is valid for
///   reads.
/// - No element written through `dst` is read through `src` later in the
///   walk. Overlap is not detected.
pub unsafe fn copy_strided_raw<T: Copy>(
    dims: &[usize],
    dst: *mut T,
    dst_strides: &[isize],
    src: *const T,
    src_strides: &[isize],
) {
    for [d, s] in Odometer::new(dims, [dst_strides, src_strides], [0, 0]) {
        *dst.offset(d) = *src.offset(s);
    }
}

#[inline]
unsafe fn copy_fixed_width<const W: usize>(
    dims: &[usize],
    dst: *mut u8,
    dst_strides: &[isize],
    src: *const u8,
    src_strides: &[isize],
) {
    copy_strided_raw(
        dims,
        dst.cast::<[u8; W]>(),
        dst_strides,
        src.cast::<[u8; W]>(),
        src_strides,
    );
}

/// Width-generic form of [`copy_strided_raw`]: each element is `elem_size`
/// bytes and strides are in elements.
///
/// Widths 1, 2, 4, 8 and 16 run the typed kernel over `[u8; W]`; any other
/// width walks byte-scaled strides and copies `elem_size` bytes per step.
///
/// # Panics
/// Panics if `dims.len() > MAX_RANK`.
///
/// # Safety
/// Same contract as [`copy_strided_raw`], with every element spanning
/// `elem_size` bytes.
pub unsafe fn copy_strided_bytes_raw(
    dims: &[usize],
    elem_size: usize,
    dst: *mut u8,
    dst_strides: &[isize],
    src: *const u8,
    src_strides: &[isize],
) {
    match elem_size {
        1 => copy_fixed_width::<1>(dims, dst, dst_strides, src, src_strides),
        2 => copy_fixed_width::<2>(dims, dst, dst_strides, src, src_strides),
        4 => copy_fixed_width::<4>(dims, dst, dst_strides, src, src_strides),
        8 => copy_fixed_width::<8>(dims, dst, dst_strides, src, src_strides),
        16 => copy_fixed_width::<16>(dims, dst, dst_strides, src, src_strides),
        _ => {
            let odo = Odometer::with_scale(
                dims,
                [dst_strides, src_strides],
                [0, 0],
                elem_size as isize,
            );
            for [d, s] in odo {
                std::ptr::copy_nonoverlapping(src.offset(s), dst.offset(d), elem_size);
            }
        }
    }
}

// ============================================================================
// Checked operations
// ============================================================================

fn ensure_same_shape(dst_dims: &[usize], src_dims: &[usize]) -> Result<()> {
    if dst_dims.len() != src_dims.len() {
        return Err(StridedError::RankMismatch(dst_dims.len(), src_dims.len()));
    }
    if dst_dims != src_dims {
        return Err(StridedError::ShapeMismatch(
            dst_dims.to_vec(),
            src_dims.to_vec(),
        ));
    }
    Ok(())
}

/// Copy elements from source to destination: `dest[i] = src[i]`.
///
/// Views of identical dense row-major (or column-major) layout are copied
/// with a single memcpy; everything else goes through the odometer.
pub fn copy_into<T: Copy>(dest: &mut StridedViewMut<T>, src: &StridedView<T>) -> Result<()> {
    ensure_same_shape(dest.dims(), src.dims())?;
    let dst_layout = dest.layout().clone();
    let dims = dst_layout.dims();
    if is_empty_domain(dims) {
        trace_path!("copy_into: empty domain dims={:?}", dims);
        return Ok(());
    }

    // Both views were bounds-checked at construction and are non-empty, so
    // their base offsets address valid elements.
    let dst_ptr = unsafe { dest.as_mut_ptr().offset(dst_layout.offset()) };
    let src_ptr = unsafe { src.data().as_ptr().offset(src.offset()) };

    if is_both_contiguous(dims, dst_layout.strides(), src.strides()) {
        trace_path!("copy_into: contiguous fast path dims={:?}", dims);
        unsafe { std::ptr::copy_nonoverlapping(src_ptr, dst_ptr, dst_layout.len()) };
        return Ok(());
    }

    trace_path!(
        "copy_into: strided path dims={:?} dst_strides={:?} src_strides={:?}",
        dims,
        dst_layout.strides(),
        src.strides()
    );
    unsafe { copy_strided_raw(dims, dst_ptr, dst_layout.strides(), src_ptr, src.strides()) };
    Ok(())
}

/// POD-specialized copy routed through the width-generic kernel.
///
/// Produces the same result as [`copy_into`], but the element type is only
/// seen as `size_of::<T>()` bytes.
pub fn copy_into_pod<T: Pod>(dest: &mut StridedViewMut<T>, src: &StridedView<T>) -> Result<()> {
    let elem_size = std::mem::size_of::<T>();
    if elem_size == 0 {
        return Err(StridedError::ZeroElementSize);
    }
    let (dst_data, dst_layout) = dest.parts_mut();
    let dst_bytes: &mut [u8] = bytemuck::cast_slice_mut(dst_data);
    let src_bytes: &[u8] = bytemuck::cast_slice(src.data());
    copy_bytes_into(dst_bytes, dst_layout, src_bytes, src.layout(), elem_size)
}

/// Copy `elem_size`-byte elements between two byte buffers.
///
/// Layout strides and offsets are in elements. Both buffers must hold a
/// whole number of elements and both layouts must stay inside them.
pub fn copy_bytes_into(
    dst: &mut [u8],
    dst_layout: &Layout,
    src: &[u8],
    src_layout: &Layout,
    elem_size: usize,
) -> Result<()> {
    let dst_len = element_count(dst.len(), elem_size)?;
    let src_len = element_count(src.len(), elem_size)?;
    ensure_same_shape(dst_layout.dims(), src_layout.dims())?;
    dst_layout.validate_bounds(dst_len)?;
    src_layout.validate_bounds(src_len)?;

    let dims = dst_layout.dims();
    if is_empty_domain(dims) {
        trace_path!("copy_bytes_into: empty domain dims={:?}", dims);
        return Ok(());
    }

    let width = elem_size as isize;
    let dst_ptr = unsafe { dst.as_mut_ptr().offset(dst_layout.offset() * width) };
    let src_ptr = unsafe { src.as_ptr().offset(src_layout.offset() * width) };

    if is_both_contiguous(dims, dst_layout.strides(), src_layout.strides()) {
        trace_path!(
            "copy_bytes_into: contiguous fast path dims={:?} elem_size={}",
            dims,
            elem_size
        );
        unsafe { std::ptr::copy_nonoverlapping(src_ptr, dst_ptr, dst_layout.len() * elem_size) };
        return Ok(());
    }

    trace_path!(
        "copy_bytes_into: strided path dims={:?} elem_size={} dst_strides={:?} src_strides={:?}",
        dims,
        elem_size,
        dst_layout.strides(),
        src_layout.strides()
    );
    unsafe {
        copy_strided_bytes_raw(
            dims,
            elem_size,
            dst_ptr,
            dst_layout.strides(),
            src_ptr,
            src_layout.strides(),
        )
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::StridedArray;
    use crate::MAX_RANK;

    #[test]
    fn test_copy_1d() {
        let src = StridedArray::from_parts(vec![10, 20, 30], &[3], &[1], 0).unwrap();
        let mut dst = StridedArray::<i32>::row_major(&[3]);
        copy_into(&mut dst.view_mut(), &src.view()).unwrap();
        assert_eq!(dst.data(), &[10, 20, 30]);
    }

    #[test]
    fn test_copy_into_contiguous() {
        let src =
            StridedArray::<f64>::from_fn_row_major(&[2, 3], |idx| (idx[0] * 10 + idx[1]) as f64);
        let mut dst = StridedArray::<f64>::row_major(&[2, 3]);
        copy_into(&mut dst.view_mut(), &src.view()).unwrap();
        assert_eq!(dst.get(&[0, 0]), 0.0);
        assert_eq!(dst.get(&[1, 2]), 12.0);
    }

    #[test]
    fn test_copy_into_transposed() {
        // src is row-major [3,2], dst is col-major [3,2]
        let src = StridedArray::<f64>::from_parts(
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            &[3, 2],
            &[2, 1],
            0,
        )
        .unwrap();
        let mut dst = StridedArray::<f64>::col_major(&[3, 2]);
        copy_into(&mut dst.view_mut(), &src.view()).unwrap();
        assert_eq!(dst.get(&[0, 0]), 0.0);
        assert_eq!(dst.get(&[0, 1]), 1.0);
        assert_eq!(dst.get(&[1, 0]), 2.0);
        assert_eq!(dst.get(&[2, 1]), 5.0);
        assert_eq!(dst.data(), &[0.0, 2.0, 4.0, 1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_copy_sub_view_with_offset() {
        // Interior 2x2 block of a 4x4 row-major buffer into a dense 2x2.
        let data: Vec<u16> = (0..16).collect();
        let src = StridedView::new(&data, &[2, 2], &[4, 1], 5).unwrap();
        let mut out = [0u16; 2 * 2];
        let mut dst = StridedViewMut::new(&mut out, &[2, 2], &[2, 1], 0).unwrap();
        copy_into(&mut dst, &src).unwrap();
        assert_eq!(out, [5, 6, 9, 10]);
    }

    #[test]
    fn test_copy_zero_extent_is_noop() {
        let src = StridedArray::<i32>::from_parts(vec![1, 2, 3], &[3, 0], &[1, 1], 0).unwrap();
        let mut dst = StridedArray::from_parts(vec![9, 9, 9], &[3, 0], &[1, 1], 0).unwrap();
        copy_into(&mut dst.view_mut(), &src.view()).unwrap();
        assert_eq!(dst.data(), &[9, 9, 9]);
    }

    #[test]
    fn test_copy_rank0_is_noop() {
        let src = StridedArray::from_parts(vec![1], &[], &[], 0).unwrap();
        let mut dst = StridedArray::from_parts(vec![0], &[], &[], 0).unwrap();
        copy_into(&mut dst.view_mut(), &src.view()).unwrap();
        assert_eq!(dst.data(), &[0]);
    }

    #[test]
    fn test_copy_shape_mismatch() {
        let src = StridedArray::<f64>::col_major(&[2, 3]);
        let mut dst = StridedArray::<f64>::col_major(&[3, 2]);
        let result = copy_into(&mut dst.view_mut(), &src.view());
        assert!(matches!(result, Err(StridedError::ShapeMismatch(_, _))));

        let mut dst3 = StridedArray::<f64>::col_major(&[2, 3, 1]);
        let result = copy_into(&mut dst3.view_mut(), &src.view());
        assert!(matches!(result, Err(StridedError::RankMismatch(3, 2))));
    }

    #[test]
    fn test_raw_negative_source_strides() {
        let src = [1i64, 2, 3, 4, 5, 6];
        let mut dst = [0i64; 6];
        // Read the 2x3 source with both axes reversed.
        unsafe {
            copy_strided_raw(
                &[2, 3],
                dst.as_mut_ptr(),
                &[3, 1],
                src.as_ptr().add(5),
                &[-3, -1],
            )
        };
        assert_eq!(dst, [6, 5, 4, 3, 2, 1]);
    }

    #[test]
    #[should_panic(expected = "exceeds maximum supported rank")]
    fn test_raw_rank_limit() {
        let dims = [1usize; MAX_RANK + 1];
        let strides = [1isize; MAX_RANK + 1];
        let src = [0u8; 1];
        let mut dst = [0u8; 1];
        unsafe {
            copy_strided_bytes_raw(&dims, 3, dst.as_mut_ptr(), &strides, src.as_ptr(), &strides)
        };
    }

    #[test]
    fn test_bytes_all_widths_transposed() {
        let dims = [3usize, 4];
        for width in 1..=17usize {
            let n = dims[0] * dims[1];
            let src: Vec<u8> = (0..n * width).map(|b| (b * 7 + width) as u8).collect();
            let mut dst = vec![0u8; n * width];
            let src_layout = Layout::col_major(&dims).unwrap();
            let dst_layout = Layout::row_major(&dims).unwrap();
            copy_bytes_into(&mut dst, &dst_layout, &src, &src_layout, width).unwrap();
            for i in 0..dims[0] {
                for j in 0..dims[1] {
                    let d = dst_layout.index_offset(&[i, j]) as usize * width;
                    let s = src_layout.index_offset(&[i, j]) as usize * width;
                    assert_eq!(
                        &dst[d..d + width],
                        &src[s..s + width],
                        "width {width} at [{i},{j}]"
                    );
                }
            }
        }
    }

    #[test]
    fn test_bytes_rejects_bad_buffers() {
        let layout = Layout::row_major(&[2]).unwrap();
        let mut dst = [0u8; 6];
        let src = [0u8; 6];
        assert!(matches!(
            copy_bytes_into(&mut dst, &layout, &src, &layout, 0),
            Err(StridedError::ZeroElementSize)
        ));
        assert!(matches!(
            copy_bytes_into(&mut dst, &layout, &src, &layout, 4),
            Err(StridedError::BufferLength { len: 6, elem_size: 4 })
        ));
        let too_big = Layout::row_major(&[3]).unwrap();
        assert!(matches!(
            copy_bytes_into(&mut dst, &too_big, &src, &too_big, 3),
            Err(StridedError::OffsetOverflow)
        ));
    }

    #[test]
    fn test_copy_into_pod_matches_typed() {
        let src =
            StridedArray::<f32>::from_fn_row_major(&[4, 5], |idx| (idx[0] * 5 + idx[1]) as f32);
        let t = src.view().permute(&[1, 0]).unwrap();

        let mut typed = StridedArray::<f32>::row_major(&[5, 4]);
        copy_into(&mut typed.view_mut(), &t).unwrap();
        let mut pod = StridedArray::<f32>::row_major(&[5, 4]);
        copy_into_pod(&mut pod.view_mut(), &t).unwrap();

        assert_eq!(typed.data(), pod.data());
        assert_eq!(pod.get(&[3, 2]), 13.0);
    }
}

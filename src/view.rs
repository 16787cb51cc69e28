//! Typed strided views over borrowed slices, and an owned strided array.
//!
//! - [`StridedView`]: immutable view (slice + [`Layout`])
//! - [`StridedViewMut`]: mutable view
//! - [`StridedArray`]: owned buffer + layout, mostly for building test data
//!
//! Every view is bounds-checked on construction, so the kernels can walk it
//! without further checks.

use crate::layout::Layout;
use crate::odometer::Odometer;
use crate::Result;

// ============================================================================
// StridedView
// ============================================================================

/// Immutable strided view.
#[derive(Debug, Clone)]
pub struct StridedView<'a, T> {
    data: &'a [T],
    layout: Layout,
}

impl<'a, T> StridedView<'a, T> {
    /// Create a view, validating that all addressed elements are in `data`.
    pub fn new(data: &'a [T], dims: &[usize], strides: &[isize], offset: isize) -> Result<Self> {
        Self::from_layout(data, Layout::new(dims, strides, offset)?)
    }

    pub fn from_layout(data: &'a [T], layout: Layout) -> Result<Self> {
        layout.validate_bounds(data.len())?;
        Ok(Self { data, layout })
    }

    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        self.layout.dims()
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        self.layout.strides()
    }

    #[inline]
    pub fn offset(&self) -> isize {
        self.layout.offset()
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &'a [T] {
        self.data
    }

    /// Permute dimensions (zero-copy).
    pub fn permute(&self, perm: &[usize]) -> Result<StridedView<'a, T>> {
        Ok(StridedView {
            data: self.data,
            layout: self.layout.permute(perm)?,
        })
    }
}

impl<T: Copy> StridedView<'_, T> {
    /// Get an element by multi-index.
    pub fn get(&self, indices: &[usize]) -> T {
        self.data[self.layout.index_offset(indices) as usize]
    }
}

// ============================================================================
// StridedViewMut
// ============================================================================

/// Mutable strided view.
#[derive(Debug)]
pub struct StridedViewMut<'a, T> {
    data: &'a mut [T],
    layout: Layout,
}

impl<'a, T> StridedViewMut<'a, T> {
    pub fn new(
        data: &'a mut [T],
        dims: &[usize],
        strides: &[isize],
        offset: isize,
    ) -> Result<Self> {
        Self::from_layout(data, Layout::new(dims, strides, offset)?)
    }

    pub fn from_layout(data: &'a mut [T], layout: Layout) -> Result<Self> {
        layout.validate_bounds(data.len())?;
        Ok(Self { data, layout })
    }

    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        self.layout.dims()
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        self.layout.strides()
    }

    #[inline]
    pub fn offset(&self) -> isize {
        self.layout.offset()
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// Reborrow as an immutable view.
    pub fn as_view(&self) -> StridedView<'_, T> {
        StridedView {
            data: &*self.data,
            layout: self.layout.clone(),
        }
    }

    /// Permute dimensions (zero-copy), consuming the mutable view.
    pub fn permute(self, perm: &[usize]) -> Result<StridedViewMut<'a, T>> {
        let layout = self.layout.permute(perm)?;
        Ok(StridedViewMut {
            data: self.data,
            layout,
        })
    }

    #[inline]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut T {
        self.data.as_mut_ptr()
    }

    /// Split into the whole underlying slice and the layout over it.
    #[inline]
    pub(crate) fn parts_mut(&mut self) -> (&mut [T], &Layout) {
        (&mut *self.data, &self.layout)
    }
}

impl<T: Copy> StridedViewMut<'_, T> {
    pub fn get(&self, indices: &[usize]) -> T {
        self.data[self.layout.index_offset(indices) as usize]
    }

    pub fn set(&mut self, indices: &[usize], value: T) {
        let idx = self.layout.index_offset(indices) as usize;
        self.data[idx] = value;
    }
}

// ============================================================================
// StridedArray
// ============================================================================

/// Owned strided multidimensional array.
#[derive(Debug, Clone, PartialEq)]
pub struct StridedArray<T> {
    data: Vec<T>,
    layout: Layout,
}

/// Dense layout for the owned constructors, which panic on rank overflow.
fn dense_layout(dims: &[usize], row_major: bool) -> Layout {
    let layout = if row_major {
        Layout::row_major(dims)
    } else {
        Layout::col_major(dims)
    };
    match layout {
        Ok(layout) => layout,
        Err(e) => panic!("{e}"),
    }
}

impl<T> StridedArray<T> {
    /// Wrap an existing buffer. The layout must stay within `data`.
    pub fn from_parts(
        data: Vec<T>,
        dims: &[usize],
        strides: &[isize],
        offset: isize,
    ) -> Result<Self> {
        let layout = Layout::new(dims, strides, offset)?;
        layout.validate_bounds(data.len())?;
        Ok(Self { data, layout })
    }

    /// Row-major array with `f(index)` at each multi-index.
    ///
    /// # Panics
    /// Panics if `dims.len() > MAX_RANK`.
    pub fn from_fn_row_major(dims: &[usize], mut f: impl FnMut(&[usize]) -> T) -> Self {
        let layout = dense_layout(dims, true);
        let mut data = Vec::with_capacity(layout.len());
        if dims.is_empty() {
            data.push(f(&[]));
        } else {
            let mut odo = Odometer::new(dims, [layout.strides()], [0]);
            if !odo.is_done() {
                loop {
                    data.push(f(odo.coords()));
                    if !odo.advance() {
                        break;
                    }
                }
            }
        }
        Self { data, layout }
    }

    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        self.layout.dims()
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        self.layout.strides()
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    pub fn view(&self) -> StridedView<'_, T> {
        StridedView {
            data: &self.data,
            layout: self.layout.clone(),
        }
    }

    pub fn view_mut(&mut self) -> StridedViewMut<'_, T> {
        StridedViewMut {
            data: &mut self.data,
            layout: self.layout.clone(),
        }
    }
}

impl<T: Clone + Default> StridedArray<T> {
    /// Default-filled row-major array.
    ///
    /// # Panics
    /// Panics if `dims.len() > MAX_RANK`.
    pub fn row_major(dims: &[usize]) -> Self {
        let layout = dense_layout(dims, true);
        Self {
            data: vec![T::default(); layout.len()],
            layout,
        }
    }

    /// Default-filled column-major array.
    ///
    /// # Panics
    /// Panics if `dims.len() > MAX_RANK`.
    pub fn col_major(dims: &[usize]) -> Self {
        let layout = dense_layout(dims, false);
        Self {
            data: vec![T::default(); layout.len()],
            layout,
        }
    }
}

impl<T: Copy> StridedArray<T> {
    pub fn get(&self, indices: &[usize]) -> T {
        self.data[self.layout.index_offset(indices) as usize]
    }
}

//! Unchecked flat views.
//!
//! A `UView<'a, T>` is a base pointer and a shape. Elements are laid out in
//! row-major order with unit stride starting at the base pointer:
//!
//! ```text
//! UView { ptr, shape: [2, 3] }
//!
//!   ptr ──▶ [a00 a01 a02 a10 a11 a12]
//!           └──── 2 * 3 elements ───┘
//! ```
//!
//! The view never owns, copies or reference-counts the memory it points
//! into. Dropping it leaves the buffer untouched. The lifetime `'a` is the
//! exclusive borrow of the source when the view comes from the safe
//! constructors; [`UView::from_raw_parts`] lets the caller pick it.

use core::fmt;
use core::marker::PhantomData;
use core::ops::{Index, IndexMut};
use core::ptr::NonNull;
use core::slice;

use smallvec::SmallVec;

use crate::element::Element;
use crate::error::ViewError;
use crate::index::Region;
use crate::layout::{self, LayoutClass, Shape, Strides};
use crate::source::{NdAccess, ViewSource};
use crate::strided::StridedViewMut;

pub struct UView<'a, T> {
    ptr: NonNull<T>,
    shape: Shape,
    life: PhantomData<&'a mut T>,
}

// Same rules as `&'a mut [T]`.
unsafe impl<T: Send> Send for UView<'_, T> {}
unsafe impl<T: Sync> Sync for UView<'_, T> {}

static_assertions::assert_impl_all!(UView<'static, f64>: Send, Sync);
static_assertions::assert_not_impl_any!(UView<'static, core::cell::Cell<u8>>: Sync);

impl<'a, T> UView<'a, T> {
    /// Build a view from a pointer and a shape.
    ///
    /// # Safety
    ///
    /// - `ptr` must be non-null, aligned, and valid for reads and writes of
    ///   `product(shape)` consecutive elements of `T`.
    /// - The memory must stay valid and unmoved for `'a`: the owner must not
    ///   be resized, reallocated or freed while the view is in use.
    /// - Nothing else may access the memory while the view is in use.
    pub unsafe fn from_raw_parts(ptr: *mut T, shape: &[usize]) -> UView<'a, T> {
        debug_assert!(!ptr.is_null());
        UView {
            // SAFETY: the caller guarantees `ptr` is non-null.
            ptr: unsafe { NonNull::new_unchecked(ptr) },
            shape: SmallVec::from_slice(shape),
            life: PhantomData,
        }
    }

    /// View a mutable slice with the given shape.
    pub fn from_slice_mut(data: &'a mut [T], shape: &[usize]) -> Result<UView<'a, T>, ViewError> {
        let expected = layout::size_checked(shape).unwrap_or(usize::MAX);
        if expected != data.len() {
            return Err(ViewError::ShapeMismatch {
                len: data.len(),
                expected,
            });
        }
        // SAFETY: the slice covers exactly `product(shape)` elements and is
        // exclusively borrowed for `'a`.
        Ok(unsafe { UView::from_raw_parts(data.as_mut_ptr(), shape) })
    }

    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> &[T] {
        // SAFETY: construction guarantees `len()` valid elements at `ptr`.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len()) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as above, and `&mut self` makes the access exclusive.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len()) }
    }

    /// Consume the view, keeping its lifetime.
    pub fn into_slice(self) -> &'a mut [T] {
        let len = self.len();
        // SAFETY: the view is consumed, so the slice is the only access path
        // left for `'a`.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), len) }
    }

    /// Row-major position of `index`, if every coordinate is in range.
    fn flat_index(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0usize;
        for (&i, &dim) in index.iter().zip(&self.shape) {
            if i >= dim {
                return None;
            }
            flat = flat * dim + i;
        }
        Some(flat)
    }

    pub fn get(&self, index: &[usize]) -> Option<&T> {
        let flat = self.flat_index(index)?;
        // SAFETY: `flat < len()`.
        Some(unsafe { &*self.ptr.as_ptr().add(flat) })
    }

    pub fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        let flat = self.flat_index(index)?;
        // SAFETY: `flat < len()` and `&mut self` is exclusive.
        Some(unsafe { &mut *self.ptr.as_ptr().add(flat) })
    }

    /// Element at a row-major position without checking bounds.
    ///
    /// # Safety
    ///
    /// `flat` must be less than [`len`](Self::len).
    pub unsafe fn get_unchecked(&self, flat: usize) -> &T {
        debug_assert!(flat < self.len());
        unsafe { &*self.ptr.as_ptr().add(flat) }
    }

    /// # Safety
    ///
    /// `flat` must be less than [`len`](Self::len).
    pub unsafe fn get_unchecked_mut(&mut self, flat: usize) -> &mut T {
        debug_assert!(flat < self.len());
        unsafe { &mut *self.ptr.as_ptr().add(flat) }
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// A shorter-lived view of the same memory.
    pub fn reborrow(&mut self) -> UView<'_, T> {
        UView {
            ptr: self.ptr,
            shape: self.shape.clone(),
            life: PhantomData,
        }
    }

    /// Reinterpret the same elements under another shape.
    pub fn into_shape(self, shape: &[usize]) -> Result<UView<'a, T>, ViewError> {
        let expected = layout::size_checked(shape).unwrap_or(usize::MAX);
        if expected != self.len() {
            return Err(ViewError::ShapeMismatch {
                len: self.len(),
                expected,
            });
        }
        Ok(UView {
            ptr: self.ptr,
            shape: SmallVec::from_slice(shape),
            life: PhantomData,
        })
    }

    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        self.as_mut_slice().fill(value);
    }
}

impl<T: fmt::Debug> fmt::Debug for UView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UView")
            .field("ptr", &self.ptr)
            .field("shape", &self.shape.as_slice())
            .field("data", &self.as_slice())
            .finish()
    }
}

impl<T, const N: usize> Index<[usize; N]> for UView<'_, T> {
    type Output = T;

    fn index(&self, index: [usize; N]) -> &T {
        match self.flat_index(&index) {
            // SAFETY: `flat_index` checked every coordinate.
            Some(flat) => unsafe { self.get_unchecked(flat) },
            None => panic!("index {index:?} out of bounds for shape {:?}", self.shape()),
        }
    }
}

impl<T, const N: usize> IndexMut<[usize; N]> for UView<'_, T> {
    fn index_mut(&mut self, index: [usize; N]) -> &mut T {
        match self.flat_index(&index) {
            // SAFETY: `flat_index` checked every coordinate.
            Some(flat) => unsafe { self.get_unchecked_mut(flat) },
            None => panic!("index {index:?} out of bounds for shape {:?}", self.shape()),
        }
    }
}

impl<'v, T> IntoIterator for &'v UView<'_, T> {
    type Item = &'v T;
    type IntoIter = slice::Iter<'v, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'v, T> IntoIterator for &'v mut UView<'_, T> {
    type Item = &'v mut T;
    type IntoIter = slice::IterMut<'v, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> NdAccess for UView<'_, T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn get(&self, index: &[usize]) -> Option<&T> {
        UView::get(self, index)
    }

    fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        UView::get_mut(self, index)
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        UView::iter(self)
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        UView::iter_mut(self)
    }
}

/// A view is its own source: viewing it whole yields the same pointer and
/// shape. Strided regions of it fall back to a checked strided view.
// SAFETY: a `UView` covers `product(shape)` contiguous elements from its
// pointer for `'a`, and its strides are the row-major defaults.
unsafe impl<'a, T: Element> ViewSource for UView<'a, T> {
    type Elem = T;
    type Fallback<'b>
        = StridedViewMut<'b, T>
    where
        Self: 'b;

    fn layout_class(&self) -> LayoutClass {
        LayoutClass::ContiguousView
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn strides(&self) -> Strides {
        layout::default_strides(&self.shape)
    }

    fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    fn fallback(&mut self, region: Option<&Region>) -> StridedViewMut<'_, T> {
        let whole;
        let region = match region {
            Some(region) => region,
            None => {
                whole = Region::whole(&self.shape, &layout::default_strides(&self.shape));
                &whole
            }
        };
        // SAFETY: the constructor resolves regions against our own shape with
        // bounds checking, and the whole region is trivially in bounds.
        unsafe {
            StridedViewMut::from_raw_parts(
                self.ptr.as_ptr().offset(region.offset),
                &region.shape,
                &region.strides,
            )
        }
    }
}

//! Checked strided views.
//!
//! `StridedViewMut` is the general-purpose borrowed view: any element type,
//! any non-overlapping strides, every access bounds-checked. It is the
//! fallback of [`UView`](crate::UView) itself and the building block host
//! array libraries can reuse for their own checked views.

use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ops::{Index, IndexMut};
use core::ptr::NonNull;

use smallvec::SmallVec;

use crate::element::Element;
use crate::index::Region;
use crate::layout::{self, LayoutClass, Shape, Strides};
use crate::source::{NdAccess, ViewSource};

pub struct StridedViewMut<'a, T> {
    ptr: NonNull<T>,
    shape: Shape,
    strides: Strides,
    life: PhantomData<&'a mut T>,
}

unsafe impl<T: Send> Send for StridedViewMut<'_, T> {}
unsafe impl<T: Sync> Sync for StridedViewMut<'_, T> {}

impl<'a, T> StridedViewMut<'a, T> {
    /// # Safety
    ///
    /// - For every in-bounds index, `ptr` offset by the index's stride offset
    ///   must point to a valid, aligned `T` inside one allocation.
    /// - No two in-bounds indices may address the same element.
    /// - The memory must stay valid, unmoved and otherwise unaccessed for `'a`.
    pub unsafe fn from_raw_parts(ptr: *mut T, shape: &[usize], strides: &[isize]) -> StridedViewMut<'a, T> {
        debug_assert!(!ptr.is_null());
        debug_assert_eq!(shape.len(), strides.len());
        StridedViewMut {
            // SAFETY: the caller guarantees `ptr` is non-null.
            ptr: unsafe { NonNull::new_unchecked(ptr) },
            shape: SmallVec::from_slice(shape),
            strides: SmallVec::from_slice(strides),
            life: PhantomData,
        }
    }

    /// A view of `region`, relative to this view's first element.
    ///
    /// # Safety
    ///
    /// `region` must have been resolved against this view's shape and
    /// strides with bounds checking.
    pub unsafe fn region(&mut self, region: &Region) -> StridedViewMut<'_, T> {
        // SAFETY: an in-bounds region of a valid view is a valid view.
        unsafe {
            StridedViewMut::from_raw_parts(
                self.ptr.as_ptr().offset(region.offset),
                &region.shape,
                &region.strides,
            )
        }
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

    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: &[usize]) -> Option<&T> {
        let offset = layout::offset_of(&self.shape, &self.strides, index)?;
        // SAFETY: `offset_of` only returns offsets of in-bounds indices.
        Some(unsafe { &*self.ptr.as_ptr().offset(offset) })
    }

    pub fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        let offset = layout::offset_of(&self.shape, &self.strides, index)?;
        // SAFETY: as above, and `&mut self` is exclusive.
        Some(unsafe { &mut *self.ptr.as_ptr().offset(offset) })
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            ptr: self.ptr,
            offsets: Offsets::new(&self.shape, &self.strides),
            life: PhantomData,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            ptr: self.ptr,
            offsets: Offsets::new(&self.shape, &self.strides),
            life: PhantomData,
        }
    }

    pub fn reborrow(&mut self) -> StridedViewMut<'_, T> {
        StridedViewMut {
            ptr: self.ptr,
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            life: PhantomData,
        }
    }

    /// Reverse the order of the axes.
    pub fn reverse_axes(&mut self) {
        self.shape.reverse();
        self.strides.reverse();
    }

    /// Walk `axis` backwards.
    ///
    /// **Panics** if `axis` is out of range.
    pub fn invert_axis(&mut self, axis: usize) {
        let (dim, stride) = (self.shape[axis], self.strides[axis]);
        if dim > 0 {
            // SAFETY: the last element along `axis` is in bounds.
            self.ptr = unsafe { self.ptr.offset((dim as isize - 1) * stride) };
        }
        self.strides[axis] = -stride;
    }
}

impl<T: fmt::Debug> fmt::Debug for StridedViewMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StridedViewMut")
            .field("shape", &self.shape.as_slice())
            .field("strides", &self.strides.as_slice())
            .field("data", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<T, const N: usize> Index<[usize; N]> for StridedViewMut<'_, T> {
    type Output = T;

    fn index(&self, index: [usize; N]) -> &T {
        match self.get(&index) {
            Some(elem) => elem,
            None => panic!("index {index:?} out of bounds for shape {:?}", self.shape()),
        }
    }
}

impl<T, const N: usize> IndexMut<[usize; N]> for StridedViewMut<'_, T> {
    fn index_mut(&mut self, index: [usize; N]) -> &mut T {
        let Some(offset) = layout::offset_of(&self.shape, &self.strides, &index) else {
            panic!("index {index:?} out of bounds for shape {:?}", self.shape());
        };
        // SAFETY: `offset_of` only returns offsets of in-bounds indices.
        unsafe { &mut *self.ptr.as_ptr().offset(offset) }
    }
}

impl<T> NdAccess for StridedViewMut<'_, T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn get(&self, index: &[usize]) -> Option<&T> {
        StridedViewMut::get(self, index)
    }

    fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        StridedViewMut::get_mut(self, index)
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        StridedViewMut::iter(self)
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        StridedViewMut::iter_mut(self)
    }
}

// SAFETY: shape, strides and pointer are the ones `from_raw_parts` was
// promised to be valid, and `fallback` reborrows the same elements.
unsafe impl<T: Element> ViewSource for StridedViewMut<'_, T> {
    type Elem = T;
    type Fallback<'b>
        = StridedViewMut<'b, T>
    where
        Self: 'b;

    fn layout_class(&self) -> LayoutClass {
        LayoutClass::for_view(&self.shape, &self.strides)
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn strides(&self) -> Strides {
        self.strides.clone()
    }

    fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    fn fallback(&mut self, region: Option<&Region>) -> StridedViewMut<'_, T> {
        match region {
            None => self.reborrow(),
            // SAFETY: the constructor resolves regions against our own shape
            // and strides before asking for a fallback.
            Some(region) => unsafe { self.region(region) },
        }
    }
}

/// Element offsets of a strided layout in row-major order.
#[derive(Debug, Clone)]
struct Offsets {
    shape: Shape,
    strides: Strides,
    index: Shape,
    remaining: usize,
}

impl Offsets {
    fn new(shape: &[usize], strides: &[isize]) -> Offsets {
        Offsets {
            shape: SmallVec::from_slice(shape),
            strides: SmallVec::from_slice(strides),
            index: SmallVec::from_elem(0, shape.len()),
            remaining: shape.iter().product(),
        }
    }
}

impl Iterator for Offsets {
    type Item = isize;

    fn next(&mut self) -> Option<isize> {
        if self.remaining == 0 {
            return None;
        }
        let offset = self
            .index
            .iter()
            .zip(&self.strides)
            .map(|(&i, &s)| i as isize * s)
            .sum();
        self.remaining -= 1;
        layout::next_index(&self.shape, &mut self.index);
        Some(offset)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

pub struct Iter<'v, T> {
    ptr: NonNull<T>,
    offsets: Offsets,
    life: PhantomData<&'v T>,
}

impl<'v, T> Iterator for Iter<'v, T> {
    type Item = &'v T;

    fn next(&mut self) -> Option<&'v T> {
        let offset = self.offsets.next()?;
        // SAFETY: offsets come from the view's in-bounds positions.
        Some(unsafe { &*self.ptr.as_ptr().offset(offset) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.offsets.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

pub struct IterMut<'v, T> {
    ptr: NonNull<T>,
    offsets: Offsets,
    life: PhantomData<&'v mut T>,
}

impl<'v, T> Iterator for IterMut<'v, T> {
    type Item = &'v mut T;

    fn next(&mut self) -> Option<&'v mut T> {
        let offset = self.offsets.next()?;
        // SAFETY: in-bounds positions never alias, so each element is
        // handed out once.
        Some(unsafe { &mut *self.ptr.as_ptr().offset(offset) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.offsets.size_hint()
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

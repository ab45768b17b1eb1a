//! Checked strided views with an optional index origin.
//!
//! `ArrayViewMut` is what the host hands out for ordinary safe access and
//! for the fallback path of the unchecked constructor. It accepts any
//! element type and any strides, including negative ones, and checks every
//! access against its shape.

use core::fmt;
use core::ops::{Index, IndexMut};

use smallvec::SmallVec;
use unview_core::strided::{Iter, IterMut};
use unview_core::{
    BoundsCheck, Element, Idx, LayoutClass, NdAccess, Region, StridedViewMut, Strides, ViewSource,
    index,
};

use crate::error::ArrayError;

pub struct ArrayViewMut<'a, T> {
    inner: StridedViewMut<'a, T>,
    /// Logical index of the first element along each axis.
    origin: Option<Strides>,
}

impl<'a, T> ArrayViewMut<'a, T> {
    pub(crate) fn new(inner: StridedViewMut<'a, T>) -> ArrayViewMut<'a, T> {
        ArrayViewMut { inner, origin: None }
    }

    pub fn shape(&self) -> &[usize] {
        self.inner.shape()
    }

    pub fn strides(&self) -> &[isize] {
        self.inner.strides()
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn origin(&self) -> Option<&[isize]> {
        self.origin.as_deref()
    }

    pub fn as_ptr(&self) -> *const T {
        self.inner.as_ptr()
    }

    /// Index the view from `origin` instead of zero.
    ///
    /// ```
    /// use unview_array::Array;
    ///
    /// let mut a = Array::from_shape_vec(&[3], vec![10, 20, 30]).unwrap();
    /// let v = a.view_mut().with_origin(&[-1]).unwrap();
    /// assert_eq!(v.get_at(&[-1]), Some(&10));
    /// assert_eq!(v.get_at(&[1]), Some(&30));
    /// ```
    pub fn with_origin(self, origin: &[isize]) -> Result<ArrayViewMut<'a, T>, ArrayError> {
        if origin.len() != self.ndim() {
            return Err(ArrayError::OriginArity {
                expected: self.ndim(),
                got: origin.len(),
            });
        }
        let origin = origin.iter().any(|&o| o != 0).then(|| SmallVec::from_slice(origin));
        Ok(ArrayViewMut { origin, ..self })
    }

    /// Element at a zero-based position.
    pub fn get(&self, index: &[usize]) -> Option<&T> {
        self.inner.get(index)
    }

    pub fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        self.inner.get_mut(index)
    }

    /// Element at a logical position, counted from the origin.
    pub fn get_at(&self, index: &[isize]) -> Option<&T> {
        let position = self.position(index)?;
        self.inner.get(&position)
    }

    pub fn get_at_mut(&mut self, index: &[isize]) -> Option<&mut T> {
        let position = self.position(index)?;
        self.inner.get_mut(&position)
    }

    fn position(&self, index: &[isize]) -> Option<SmallVec<[usize; 4]>> {
        if index.len() != self.ndim() {
            return None;
        }
        index
            .iter()
            .enumerate()
            .map(|(axis, &i)| {
                let origin = self.origin.as_ref().map_or(0, |o| o[axis]);
                usize::try_from(i.checked_sub(origin)?).ok()
            })
            .collect()
    }

    /// A view of the region selected by `index`, in logical coordinates.
    ///
    /// The result is indexed from zero.
    pub fn slice_mut(&mut self, index: &[Idx]) -> Result<ArrayViewMut<'_, T>, ArrayError> {
        let region = index::resolve(
            index,
            self.shape(),
            self.strides(),
            self.origin(),
            BoundsCheck::Checked,
        )?;
        // SAFETY: the region was resolved against our shape and strides with
        // bounds checking.
        Ok(ArrayViewMut::new(unsafe { self.inner.region(&region) }))
    }

    /// The same elements with the axis order reversed.
    pub fn reversed_axes(mut self) -> ArrayViewMut<'a, T> {
        self.inner.reverse_axes();
        if let Some(origin) = &mut self.origin {
            origin.reverse();
        }
        self
    }

    /// Walk `axis` backwards.
    ///
    /// **Panics** if `axis` is out of range.
    pub fn invert_axis(&mut self, axis: usize) {
        self.inner.invert_axis(axis);
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.inner.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        self.inner.iter_mut()
    }

    pub fn reborrow(&mut self) -> ArrayViewMut<'_, T> {
        ArrayViewMut {
            inner: self.inner.reborrow(),
            origin: self.origin.clone(),
        }
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<T: fmt::Debug> fmt::Debug for ArrayViewMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayViewMut")
            .field("shape", &self.shape())
            .field("strides", &self.strides())
            .field("origin", &self.origin())
            .field("data", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<T, const N: usize> Index<[usize; N]> for ArrayViewMut<'_, T> {
    type Output = T;

    fn index(&self, index: [usize; N]) -> &T {
        &self.inner[index]
    }
}

impl<T, const N: usize> IndexMut<[usize; N]> for ArrayViewMut<'_, T> {
    fn index_mut(&mut self, index: [usize; N]) -> &mut T {
        &mut self.inner[index]
    }
}

impl<'v, T> IntoIterator for &'v ArrayViewMut<'_, T> {
    type Item = &'v T;
    type IntoIter = Iter<'v, T>;

    fn into_iter(self) -> Iter<'v, T> {
        self.iter()
    }
}

impl<'v, T> IntoIterator for &'v mut ArrayViewMut<'_, T> {
    type Item = &'v mut T;
    type IntoIter = IterMut<'v, T>;

    fn into_iter(self) -> IterMut<'v, T> {
        self.iter_mut()
    }
}

impl<T> NdAccess for ArrayViewMut<'_, T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        self.inner.shape()
    }

    fn get(&self, index: &[usize]) -> Option<&T> {
        self.inner.get(index)
    }

    fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        self.inner.get_mut(index)
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        self.inner.iter()
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.inner.iter_mut()
    }
}

// SAFETY: forwards the inner strided view, which is valid for its whole
// shape and strides.
unsafe impl<T: Element> ViewSource for ArrayViewMut<'_, T> {
    type Elem = T;
    type Fallback<'b>
        = ArrayViewMut<'b, T>
    where
        Self: 'b;

    fn layout_class(&self) -> LayoutClass {
        LayoutClass::for_view(self.shape(), self.strides())
    }

    fn shape(&self) -> &[usize] {
        self.inner.shape()
    }

    fn strides(&self) -> Strides {
        SmallVec::from_slice(self.inner.strides())
    }

    fn origin(&self) -> Option<&[isize]> {
        self.origin.as_deref()
    }

    fn as_mut_ptr(&mut self) -> *mut T {
        self.inner.as_mut_ptr()
    }

    fn fallback(&mut self, region: Option<&Region>) -> ArrayViewMut<'_, T> {
        match region {
            None => self.reborrow(),
            // SAFETY: the constructor resolves regions against our own shape,
            // strides and origin before asking for a fallback.
            Some(region) => ArrayViewMut::new(unsafe { self.inner.region(region) }),
        }
    }
}

use core::ops::{Index, IndexMut};

use smallvec::SmallVec;
use unview_core::{
    BoundsCheck, Element, Idx, LayoutClass, NdAccess, Region, Shape, StridedViewMut, Strides,
    ViewSource, index, layout,
};

use crate::error::ArrayError;
use crate::view::ArrayViewMut;

/// An owning, row-major n-dimensional array.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Array<T> {
    data: Vec<T>,
    shape: Shape,
    strides: Strides,
}

fn checked_len(shape: &[usize]) -> Result<usize, ArrayError> {
    layout::size_checked(shape).ok_or_else(|| ArrayError::Overflow {
        shape: shape.to_vec(),
    })
}

impl<T> Array<T> {
    pub fn from_shape_vec(shape: &[usize], data: Vec<T>) -> Result<Array<T>, ArrayError> {
        let expected = checked_len(shape)?;
        if data.len() != expected {
            return Err(ArrayError::ShapeMismatch {
                len: data.len(),
                shape: shape.to_vec(),
                expected,
            });
        }
        Ok(Array {
            data,
            shape: SmallVec::from_slice(shape),
            strides: layout::default_strides(shape),
        })
    }

    pub fn from_elem(shape: &[usize], elem: T) -> Result<Array<T>, ArrayError>
    where
        T: Clone,
    {
        let len = checked_len(shape)?;
        Array::from_shape_vec(shape, vec![elem; len])
    }

    /// Build an array by calling `f` with each index in row-major order.
    ///
    /// **Panics** if the shape overflows `usize`.
    pub fn from_shape_fn(shape: &[usize], mut f: impl FnMut(&[usize]) -> T) -> Array<T> {
        let len = match layout::size_checked(shape) {
            Some(len) => len,
            None => panic!("shape {shape:?} overflows usize"),
        };
        let mut data = Vec::with_capacity(len);
        let mut ix: Shape = SmallVec::from_elem(0, shape.len());
        for _ in 0..len {
            data.push(f(&ix));
            layout::next_index(shape, &mut ix);
        }
        Array {
            data,
            shape: SmallVec::from_slice(shape),
            strides: layout::default_strides(shape),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn get(&self, index: &[usize]) -> Option<&T> {
        let offset = layout::offset_of(&self.shape, &self.strides, index)?;
        self.data.get(offset as usize)
    }

    pub fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        let offset = layout::offset_of(&self.shape, &self.strides, index)?;
        self.data.get_mut(offset as usize)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    pub fn view_mut(&mut self) -> ArrayViewMut<'_, T> {
        // SAFETY: `data` holds exactly `product(shape)` elements laid out by
        // `strides`, and `&mut self` keeps it exclusive and unmoved.
        ArrayViewMut::new(unsafe {
            StridedViewMut::from_raw_parts(self.data.as_mut_ptr(), &self.shape, &self.strides)
        })
    }

    /// A view of the region selected by `index`.
    ///
    /// ```
    /// use unview_array::Array;
    /// use unview_core::idx;
    ///
    /// let mut a = Array::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
    /// let col = a.slice_mut(&idx![.., 2]).unwrap();
    /// assert_eq!(col.to_vec(), vec![3, 6]);
    /// ```
    pub fn slice_mut(&mut self, index: &[Idx]) -> Result<ArrayViewMut<'_, T>, ArrayError> {
        let region = index::resolve(index, &self.shape, &self.strides, None, BoundsCheck::Checked)?;
        Ok(self.region_view(&region))
    }

    fn region_view(&mut self, region: &Region) -> ArrayViewMut<'_, T> {
        // SAFETY: regions handed here are resolved against our own shape and
        // strides with bounds checking.
        ArrayViewMut::new(unsafe {
            StridedViewMut::from_raw_parts(
                self.data.as_mut_ptr().offset(region.offset),
                &region.shape,
                &region.strides,
            )
        })
    }

    /// Append a row along the outermost axis.
    ///
    /// This may reallocate, so it cannot happen while a view of the array
    /// is alive.
    pub fn push_row(&mut self, row: impl IntoIterator<Item = T>) -> Result<(), ArrayError> {
        let Some((_, inner)) = self.shape.split_first() else {
            return Err(ArrayError::ZeroDimensional);
        };
        let expected = checked_len(inner)?;
        let before = self.data.len();
        self.data.extend(row);
        let got = self.data.len() - before;
        if got != expected {
            self.data.truncate(before);
            return Err(ArrayError::RowLength { expected, got });
        }
        self.shape[0] += 1;
        self.strides = layout::default_strides(&self.shape);
        Ok(())
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Array")
            .field("shape", &self.shape.as_slice())
            .field("data", &self.data)
            .finish()
    }
}

impl<T, const N: usize> Index<[usize; N]> for Array<T> {
    type Output = T;

    fn index(&self, index: [usize; N]) -> &T {
        match self.get(&index) {
            Some(elem) => elem,
            None => panic!("index {index:?} out of bounds for shape {:?}", self.shape()),
        }
    }
}

impl<T, const N: usize> IndexMut<[usize; N]> for Array<T> {
    fn index_mut(&mut self, index: [usize; N]) -> &mut T {
        let Some(offset) = layout::offset_of(&self.shape, &self.strides, &index) else {
            panic!("index {index:?} out of bounds for shape {:?}", self.shape());
        };
        &mut self.data[offset as usize]
    }
}

impl<T> NdAccess for Array<T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn get(&self, index: &[usize]) -> Option<&T> {
        Array::get(self, index)
    }

    fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        Array::get_mut(self, index)
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.data.iter_mut()
    }
}

// SAFETY: `data` holds exactly `product(shape)` elements in row-major order,
// and nothing reallocates it while `&mut self` is borrowed.
unsafe impl<T: Element> ViewSource for Array<T> {
    type Elem = T;
    type Fallback<'a>
        = ArrayViewMut<'a, T>
    where
        Self: 'a;

    fn layout_class(&self) -> LayoutClass {
        LayoutClass::Owning
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn strides(&self) -> Strides {
        self.strides.clone()
    }

    fn as_mut_ptr(&mut self) -> *mut T {
        self.data.as_mut_ptr()
    }

    fn fallback(&mut self, region: Option<&Region>) -> ArrayViewMut<'_, T> {
        match region {
            None => self.view_mut(),
            Some(region) => self.region_view(region),
        }
    }
}

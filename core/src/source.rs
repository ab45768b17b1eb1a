//! Capability traits between the view core and host array types.
//!
//! The core never names a concrete array type. A host array opts into
//! unchecked viewing by implementing [`ViewSource`], which exposes exactly
//! what the constructor needs: layout introspection, the base pointer, and
//! the host's own checked view for the fallback path.

use crate::element::Element;
use crate::index::Region;
use crate::layout::{LayoutClass, Strides};

/// Read and write access shared by unchecked views and host fallback views.
///
/// Indices are zero-based positions, one per axis.
pub trait NdAccess {
    type Elem;

    fn shape(&self) -> &[usize];

    fn get(&self, index: &[usize]) -> Option<&Self::Elem>;

    fn get_mut(&mut self, index: &[usize]) -> Option<&mut Self::Elem>;

    /// Elements in row-major order.
    fn iter(&self) -> impl Iterator<Item = &Self::Elem>;

    /// Elements in row-major order.
    fn iter_mut(&mut self) -> impl Iterator<Item = &mut Self::Elem>;

    fn ndim(&self) -> usize {
        self.shape().len()
    }

    fn len(&self) -> usize {
        self.shape().iter().product()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn to_vec(&self) -> Vec<Self::Elem>
    where
        Self::Elem: Clone,
    {
        self.iter().cloned().collect()
    }
}

/// An array that can be viewed without its usual bookkeeping.
///
/// # Safety
///
/// The constructor turns what this trait reports into raw pointer arithmetic
/// and references without checking it again. Implementors must uphold:
///
/// - [`shape`](Self::shape) and [`strides`](Self::strides) have the same
///   length and describe, relative to [`as_mut_ptr`](Self::as_mut_ptr),
///   initialized elements that all live in one allocation.
/// - The answers do not change while the source is exclusively borrowed.
/// - The pointer stays valid and unmoved for as long as the exclusive borrow
///   handed to the constructor lasts.
/// - [`fallback`](Self::fallback) returns a view over exactly the elements
///   selected by `region` (or the whole array for `None`), in the same
///   logical order.
///
/// Implementing the trait without `unsafe` is rejected:
///
/// ```compile_fail,E0200
/// use unview_core::{LayoutClass, Region, StridedViewMut, Strides, ViewSource, layout};
///
/// struct Claims {
///     data: Vec<u8>,
///     shape: [usize; 1],
/// }
///
/// impl ViewSource for Claims {
///     type Elem = u8;
///     type Fallback<'a> = StridedViewMut<'a, u8>;
///
///     fn layout_class(&self) -> LayoutClass {
///         LayoutClass::Owning
///     }
///
///     fn shape(&self) -> &[usize] {
///         &self.shape
///     }
///
///     fn strides(&self) -> Strides {
///         layout::default_strides(&self.shape)
///     }
///
///     fn as_mut_ptr(&mut self) -> *mut u8 {
///         self.data.as_mut_ptr()
///     }
///
///     fn fallback(&mut self, _region: Option<&Region>) -> StridedViewMut<'_, u8> {
///         unimplemented!()
///     }
/// }
/// ```
pub unsafe trait ViewSource {
    type Elem: Element;

    /// The host's ordinary checked view, used when an unchecked view is not
    /// legal.
    type Fallback<'a>: NdAccess<Elem = Self::Elem>
    where
        Self: 'a;

    fn layout_class(&self) -> LayoutClass;

    fn shape(&self) -> &[usize];

    fn strides(&self) -> Strides;

    /// Logical index of the first element along each axis, when it is not
    /// zero.
    fn origin(&self) -> Option<&[isize]> {
        None
    }

    fn as_mut_ptr(&mut self) -> *mut Self::Elem;

    fn fallback(&mut self, region: Option<&Region>) -> Self::Fallback<'_>;
}

// SAFETY: every answer comes from `S`, which upholds the contract itself.
unsafe impl<S: ViewSource + ?Sized> ViewSource for &mut S {
    type Elem = S::Elem;
    type Fallback<'a>
        = S::Fallback<'a>
    where
        Self: 'a;

    fn layout_class(&self) -> LayoutClass {
        (**self).layout_class()
    }

    fn shape(&self) -> &[usize] {
        (**self).shape()
    }

    fn strides(&self) -> Strides {
        (**self).strides()
    }

    fn origin(&self) -> Option<&[isize]> {
        (**self).origin()
    }

    fn as_mut_ptr(&mut self) -> *mut S::Elem {
        (**self).as_mut_ptr()
    }

    fn fallback(&mut self, region: Option<&Region>) -> S::Fallback<'_> {
        (**self).fallback(region)
    }
}

//! View constructor.
//!
//! [`construct`] resolves an optional index expression against a source,
//! asks the classifier whether the selected region can be served by a bare
//! pointer and shape, and returns either an unchecked [`UView`] or the
//! source's own checked view over the same elements.
//!
//! ```
//! use unview_core::{NdAccess, UView, Viewed, idx, uview_region};
//!
//! let mut data = [1, 2, 3, 4, 5, 6];
//! let mut a = UView::from_slice_mut(&mut data, &[2, 3]).unwrap();
//!
//! let mut row = uview_region(&mut a, &idx![0..1, 1..3]).unwrap();
//! assert!(row.is_unchecked());
//! assert_eq!(row.shape(), &[1, 2]);
//! row[[0, 0]] = 20;
//! assert_eq!(data, [1, 20, 3, 4, 5, 6]);
//! ```

use core::ops::{Index, IndexMut};

use crate::classify::{Ineligible, Verdict, classify};
use crate::element::element_kind;
use crate::error::ViewError;
use crate::index::{self, BoundsCheck, Idx, Region};
use crate::layout;
use crate::source::{NdAccess, ViewSource};
use crate::view::UView;

/// Options for [`construct`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewOptions {
    bounds: BoundsCheck,
}

impl ViewOptions {
    pub fn new() -> ViewOptions {
        ViewOptions::default()
    }

    /// Skip bounds validation of index expressions.
    ///
    /// # Safety
    ///
    /// Every index expression constructed with these options must lie inside
    /// the source's extents. An out-of-range request produces a view over
    /// memory outside the source, which is undefined behaviour to use.
    pub unsafe fn trust_bounds(self) -> ViewOptions {
        ViewOptions {
            bounds: BoundsCheck::Trusted,
        }
    }

    pub fn bounds(&self) -> BoundsCheck {
        self.bounds
    }
}

/// Outcome of a view request.
pub enum Viewed<'a, T, F> {
    /// Pointer and shape over the source's memory.
    Unchecked(UView<'a, T>),
    /// The source's checked view, and why the unchecked path was refused.
    Fallback { view: F, reason: Ineligible },
}

/// The result of viewing `S` for `'a`.
pub type ViewOf<'a, S> = Viewed<'a, <S as ViewSource>::Elem, <S as ViewSource>::Fallback<'a>>;

impl<'a, T, F> Viewed<'a, T, F> {
    pub fn is_unchecked(&self) -> bool {
        matches!(self, Viewed::Unchecked(_))
    }

    /// Why the fallback was taken, if it was.
    pub fn reason(&self) -> Option<Ineligible> {
        match self {
            Viewed::Unchecked(_) => None,
            Viewed::Fallback { reason, .. } => Some(*reason),
        }
    }

    pub fn as_unchecked(&self) -> Option<&UView<'a, T>> {
        match self {
            Viewed::Unchecked(view) => Some(view),
            Viewed::Fallback { .. } => None,
        }
    }

    pub fn as_unchecked_mut(&mut self) -> Option<&mut UView<'a, T>> {
        match self {
            Viewed::Unchecked(view) => Some(view),
            Viewed::Fallback { .. } => None,
        }
    }

    /// The unchecked view, or the reason it could not be built as an error.
    pub fn into_unchecked(self) -> Result<UView<'a, T>, ViewError> {
        match self {
            Viewed::Unchecked(view) => Ok(view),
            Viewed::Fallback { reason, .. } => Err(reason.into_error(core::any::type_name::<T>())),
        }
    }

    pub fn into_fallback(self) -> Option<F> {
        match self {
            Viewed::Unchecked(_) => None,
            Viewed::Fallback { view, .. } => Some(view),
        }
    }
}

impl<T: core::fmt::Debug, F> core::fmt::Debug for Viewed<'_, T, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Viewed::Unchecked(view) => f.debug_tuple("Unchecked").field(view).finish(),
            Viewed::Fallback { reason, .. } => f
                .debug_struct("Fallback")
                .field("reason", reason)
                .finish_non_exhaustive(),
        }
    }
}

/// Iterator over either side of a [`Viewed`].
pub enum ViewedIter<A, B> {
    Unchecked(A),
    Fallback(B),
}

impl<A, B> Iterator for ViewedIter<A, B>
where
    A: Iterator,
    B: Iterator<Item = A::Item>,
{
    type Item = A::Item;

    fn next(&mut self) -> Option<A::Item> {
        match self {
            ViewedIter::Unchecked(it) => it.next(),
            ViewedIter::Fallback(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            ViewedIter::Unchecked(it) => it.size_hint(),
            ViewedIter::Fallback(it) => it.size_hint(),
        }
    }
}

impl<T, F: NdAccess<Elem = T>> NdAccess for Viewed<'_, T, F> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        match self {
            Viewed::Unchecked(view) => view.shape(),
            Viewed::Fallback { view, .. } => view.shape(),
        }
    }

    fn get(&self, index: &[usize]) -> Option<&T> {
        match self {
            Viewed::Unchecked(view) => view.get(index),
            Viewed::Fallback { view, .. } => view.get(index),
        }
    }

    fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        match self {
            Viewed::Unchecked(view) => view.get_mut(index),
            Viewed::Fallback { view, .. } => view.get_mut(index),
        }
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        match self {
            Viewed::Unchecked(view) => ViewedIter::Unchecked(view.iter()),
            Viewed::Fallback { view, .. } => ViewedIter::Fallback(view.iter()),
        }
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        match self {
            Viewed::Unchecked(view) => ViewedIter::Unchecked(view.iter_mut()),
            Viewed::Fallback { view, .. } => ViewedIter::Fallback(view.iter_mut()),
        }
    }
}

impl<T, F: NdAccess<Elem = T>, const N: usize> Index<[usize; N]> for Viewed<'_, T, F> {
    type Output = T;

    fn index(&self, index: [usize; N]) -> &T {
        match NdAccess::get(self, &index) {
            Some(elem) => elem,
            None => panic!("index {index:?} out of bounds for shape {:?}", NdAccess::shape(self)),
        }
    }
}

impl<T, F: NdAccess<Elem = T>, const N: usize> IndexMut<[usize; N]> for Viewed<'_, T, F> {
    fn index_mut(&mut self, index: [usize; N]) -> &mut T {
        if NdAccess::get(self, &index).is_none() {
            panic!("index {index:?} out of bounds for shape {:?}", NdAccess::shape(self));
        }
        match NdAccess::get_mut(self, &index) {
            Some(elem) => elem,
            None => unreachable!(),
        }
    }
}

/// View the whole of `src`.
///
/// Never fails: an ineligible source yields its own checked view.
pub fn uview<S: ViewSource + ?Sized>(src: &mut S) -> ViewOf<'_, S> {
    match construct(src, None, ViewOptions::default()) {
        Ok(view) => view,
        Err(err) => unreachable!("whole-array view cannot fail: {err}"),
    }
}

/// View the region of `src` selected by `index`, checking bounds first.
pub fn uview_region<'a, S: ViewSource + ?Sized>(
    src: &'a mut S,
    index: &[Idx],
) -> Result<ViewOf<'a, S>, ViewError> {
    construct(src, Some(index), ViewOptions::default())
}

/// Build a view of `src`, or of the region selected by `index`.
///
/// Bounds and index-shape errors are returned before any pointer arithmetic.
/// Element-type and layout mismatches are not errors: they produce
/// [`Viewed::Fallback`].
pub fn construct<'a, S: ViewSource + ?Sized>(
    src: &'a mut S,
    index: Option<&[Idx]>,
    options: ViewOptions,
) -> Result<ViewOf<'a, S>, ViewError> {
    let strides = src.strides();
    let region = match index {
        Some(index) => Some(index::resolve(
            index,
            src.shape(),
            &strides,
            src.origin(),
            options.bounds,
        )?),
        None => None,
    };

    let verdict = if has_offset_origin(src.origin()) {
        Verdict::Ineligible(Ineligible::OffsetOrigin)
    } else {
        let contiguous = match &region {
            Some(region) => layout::is_standard_layout(&region.shape, &region.strides),
            None => layout::is_standard_layout(src.shape(), &strides),
        };
        classify(element_kind::<S::Elem>(), src.layout_class(), contiguous)
    };

    match verdict {
        Verdict::Eligible => {
            let (offset, shape) = match &region {
                Some(region) => (region.offset, region.shape.clone()),
                None => (0, src.shape().into()),
            };
            let base = src.as_mut_ptr();
            // SAFETY: the region was resolved against the source's shape and
            // strides (bounds-checked unless the caller opted out), and it is
            // one row-major run, so `offset .. offset + product(shape)` lies
            // inside the source's allocation. The exclusive borrow keeps the
            // source from moving or resizing for `'a`.
            let view = unsafe { UView::from_raw_parts(base.offset(offset), &shape) };
            tracing::trace!(ptr = ?view.as_ptr(), shape = ?view.shape(), "built unchecked view");
            Ok(Viewed::Unchecked(view))
        }
        Verdict::Ineligible(reason) => {
            tracing::debug!(
                %reason,
                elem = core::any::type_name::<S::Elem>(),
                "falling back to checked view"
            );
            let view = src.fallback(region.as_ref());
            Ok(Viewed::Fallback { view, reason })
        }
    }
}

fn has_offset_origin(origin: Option<&[isize]>) -> bool {
    origin.is_some_and(|o| o.iter().any(|&i| i != 0))
}

/// Resolve `index` the same way [`construct`] does, without building a view.
pub fn resolve_region<S: ViewSource + ?Sized>(
    src: &S,
    index: &[Idx],
    options: ViewOptions,
) -> Result<Region, ViewError> {
    index::resolve(index, src.shape(), &src.strides(), src.origin(), options.bounds)
}

//! unview - unchecked views over contiguous arrays
//!
//! # Overview
//!
//! Hot loops over n-dimensional arrays pay for bounds checks, stride
//! arithmetic and layout dispatch on every access. When an array's elements
//! are plain values laid out as one row-major run, all of that can be
//! replaced by a base pointer and a shape. This crate decides when that is
//! legal, builds such views, and ties them to a scope:
//!
//! - [`classify`] says whether an element type and layout are eligible.
//! - [`uview`], [`uview_region`] and [`construct`] build a [`UView`] when
//!   eligible and otherwise hand back the source's own checked view, wrapped
//!   in [`Viewed`].
//! - [`with_views`], [`bind_views!`] and [`ScopeGuard`] bind several sources
//!   at once and release them on every exit path, panics included.
//!
//! # Quick Start
//!
//! ```
//! use unview::prelude::*;
//!
//! let mut a = Array::from_shape_vec(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
//! let base = a.as_slice().as_ptr();
//!
//! // Rows 0..1, columns 1..3: one contiguous run starting at element 1.
//! let mut row = uview_region(&mut a, &idx![0..1, 1..3])?;
//! assert!(row.is_unchecked());
//! assert_eq!(row.shape(), &[1, 2]);
//! assert_eq!(row.as_unchecked().map(|v| v.as_ptr()), Some(base.wrapping_add(1)));
//! row[[0, 1]] = 30.0;
//!
//! assert_eq!(a.as_slice(), &[1.0, 2.0, 30.0, 4.0, 5.0, 6.0]);
//! # Ok::<(), unview::Error>(())
//! ```
//!
//! # Fallback
//!
//! Elements that own or point at other memory never get an unchecked view:
//!
//! ```
//! use unview::prelude::*;
//!
//! let mut a = Array::from_elem(&[2], vec![1.0f64])?;
//! let view = uview(&mut a);
//! assert_eq!(view.reason(), Some(Ineligible::ElementType));
//! assert_eq!(view.to_vec(), vec![vec![1.0], vec![1.0]]);
//! # Ok::<(), unview::Error>(())
//! ```
//!
//! # Scopes
//!
//! ```
//! use unview::prelude::*;
//!
//! let mut x = Array::from_shape_fn(&[4], |ix| ix[0] as f32);
//! let mut y = Array::from_elem(&[4], 1.0f32)?;
//!
//! with_views((&mut x, &mut y), |(x, mut y)| {
//!     for (y, x) in y.iter_mut().zip(x.iter()) {
//!         *y += 2.0 * x;
//!     }
//! });
//! assert_eq!(y.as_slice(), &[1.0, 3.0, 5.0, 7.0]);
//! assert_eq!(active_pins(), 0);
//! # Ok::<(), unview::Error>(())
//! ```

mod error;

pub use error::{ArrayError, Error, Result, ViewError};

pub use unview_array::{Array, ArrayViewMut};
pub use unview_core::{
    Bound, BoundsCheck, ElemKind, Element, Idx, Ineligible, LayoutClass, NdAccess, Pinned, Region,
    ScopeGuard, Shape, StridedViewMut, Strides, UView, Verdict, ViewOf, ViewOptions, ViewSource,
    ViewSources, Viewed, ViewedIter, active_pins, bind_views, classify, construct, element_kind,
    idx, is_pinned, pinned, resolve_region, uview, uview_region, with_views,
};

/// Lower-level building blocks, for host array libraries.
pub use unview_core::{index, layout, strided};

/// Everything needed to build and use views.
pub mod prelude {
    pub use crate::{
        Array, ArrayViewMut, Idx, Ineligible, NdAccess, ScopeGuard, UView, ViewOptions,
        ViewSource, Viewed, active_pins, bind_views, construct, idx, resolve_region, uview,
        uview_region, with_views,
    };
}

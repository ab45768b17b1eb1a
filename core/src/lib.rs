//! Unchecked views over contiguous arrays.
//!
//! An unchecked view is a base pointer plus a shape, with none of the
//! bookkeeping a host array carries for safe general-purpose access. The
//! crate decides when such a view is legal ([`classify`]), builds it or
//! falls back to the host's checked view ([`construct`]), and keeps the
//! views of a code region tied to a scope ([`ScopeGuard`], [`with_views`]).
//!
//! Host array types plug in by implementing [`ViewSource`].

pub mod classify;
pub mod construct;
pub mod element;
pub mod error;
pub mod index;
pub mod layout;
pub mod scope;
pub mod source;
pub mod strided;
pub mod view;

pub use classify::{Ineligible, Verdict, classify};
pub use construct::{ViewOf, ViewOptions, Viewed, ViewedIter, construct, resolve_region, uview, uview_region};
pub use element::{ElemKind, Element, element_kind};
pub use error::ViewError;
pub use index::{BoundsCheck, Idx, Region};
pub use layout::{LayoutClass, Shape, Strides};
pub use scope::{Bound, Pinned, ScopeGuard, ViewSources, active_pins, is_pinned, pinned, with_views};
pub use source::{NdAccess, ViewSource};
pub use strided::StridedViewMut;
pub use view::UView;

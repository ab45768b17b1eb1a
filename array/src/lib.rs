//! A small n-dimensional array library that hosts unchecked views.
//!
//! [`Array`] owns its elements in row-major order. [`ArrayViewMut`] is a
//! checked strided view that supports slicing, transposition, reversed axes
//! and an index origin. Both implement [`ViewSource`](unview_core::ViewSource),
//! so either can be handed to the unchecked view constructor, and
//! `ArrayViewMut` is what it falls back to.

mod array;
mod error;
mod view;

pub use array::Array;
pub use error::ArrayError;
pub use view::ArrayViewMut;

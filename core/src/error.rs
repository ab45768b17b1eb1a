use thiserror::Error;

/// Errors raised while building a view.
///
/// Only bounds and index-shape problems reach callers of the constructor.
/// `LayoutUnsupported` and `IneligibleElementType` describe why a fallback
/// was taken and surface only through [`Viewed::into_unchecked`].
///
/// [`Viewed::into_unchecked`]: crate::Viewed::into_unchecked
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("index {index} is out of bounds for axis {axis} with extent {extent}")]
    OutOfBounds {
        axis: usize,
        index: isize,
        extent: usize,
    },

    #[error("expected {expected} indices, got {got}")]
    IndexArity { expected: usize, got: usize },

    #[error("step along axis {axis} must be non-zero")]
    ZeroStep { axis: usize },

    #[error("region cannot be described by a base pointer and shape")]
    LayoutUnsupported,

    #[error("element type `{type_name}` carries ownership or indirection")]
    IneligibleElementType { type_name: &'static str },

    #[error("buffer of {len} elements does not match shape of {expected} elements")]
    ShapeMismatch { len: usize, expected: usize },
}

use thiserror::Error;
use unview_core::ViewError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArrayError {
    #[error("data of length {len} does not fit shape {shape:?} ({expected} elements)")]
    ShapeMismatch {
        len: usize,
        shape: Vec<usize>,
        expected: usize,
    },

    #[error("shape {shape:?} has more elements than fit in memory")]
    Overflow { shape: Vec<usize> },

    #[error("row has {got} elements, expected {expected}")]
    RowLength { expected: usize, got: usize },

    #[error("cannot push rows onto a zero-dimensional array")]
    ZeroDimensional,

    #[error("origin has {got} axes, array has {expected}")]
    OriginArity { expected: usize, got: usize },

    #[error(transparent)]
    View(#[from] ViewError),
}

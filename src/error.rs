use thiserror::Error;

pub use unview_array::ArrayError;
pub use unview_core::ViewError;

/// Any error raised by this crate, so host and view code can share `?`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    View(#[from] ViewError),

    #[error(transparent)]
    Array(ArrayError),
}

impl From<ArrayError> for Error {
    fn from(err: ArrayError) -> Error {
        match err {
            // Keep view errors in one place no matter which layer raised them.
            ArrayError::View(err) => Error::View(err),
            err => Error::Array(err),
        }
    }
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

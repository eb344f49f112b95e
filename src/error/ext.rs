//! `Result` helpers for wrapping errors in place.

use crate::error::fields::Fields;
use crate::error::wrapped::{wrap, wrap_with_context, BoxError, WrappedError};

/// Extension methods wrapping the error side of a `Result`.
///
/// The recorded frame is the line calling `wrap_err`, not this module.
pub trait ResultExt<T> {
    fn wrap_err(self, message: impl Into<String>) -> Result<T, WrappedError>;

    fn wrap_err_with_context(self, message: impl Into<String>, context: Fields) -> Result<T, WrappedError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<BoxError>,
{
    #[track_caller]
    fn wrap_err(self, message: impl Into<String>) -> Result<T, WrappedError> {
        match self {
            Ok(value) => Ok(value),
            Err(e) => Err(wrap(Some(e.into()), message)),
        }
    }

    #[track_caller]
    fn wrap_err_with_context(self, message: impl Into<String>, context: Fields) -> Result<T, WrappedError> {
        match self {
            Ok(value) => Ok(value),
            Err(e) => Err(wrap_with_context(Some(e.into()), message, context)),
        }
    }
}

//! @ai:module:intent Attach the calling layer's context to a lower-layer error before propagating it
//! @ai:module:layer domain
//! @ai:module:public_api Wrap, ResultExt
//! @ai:module:stateless true
//!
//! `?` re-raises an error unchanged. When a layer knows something the layer
//! below did not (which row, which file), it converts the error explicitly:
//!
//! ```
//! use strata::{FieldReadError, IoFailure, ResultExt};
//! use std::io;
//! use std::path::PathBuf;
//!
//! fn read_row(row: usize) -> Result<u8, FieldReadError> {
//!     let byte: io::Result<u8> = Err(io::Error::new(io::ErrorKind::Other, "disk gone"));
//!     let byte = byte
//!         .within_with::<IoFailure, _>(|| PathBuf::from("table.csv"))
//!         .within::<FieldReadError>(row)?;
//!     Ok(byte)
//! }
//!
//! assert_eq!(read_row(3).unwrap_err().row, 3);
//! ```
//!
//! None of the layered errors convert into each other through `From`, so an
//! error of the wrong layer is rejected instead of being silently coerced:
//!
//! ```compile_fail
//! use strata::{FieldReadError, FileParseError};
//!
//! fn lift(r: Result<(), FieldReadError>) -> Result<(), FileParseError> {
//!     r?;
//!     Ok(())
//! }
//! ```

/// @ai:intent An error layer that can be built from the error below it plus local context
pub trait Wrap<Inner>: Sized {
    /// What this layer adds on top of `Inner`.
    type Context;

    /// @ai:intent Build this layer's error around the lower one
    /// @ai:effects pure
    fn wrap(inner: Inner, context: Self::Context) -> Self;
}

/// @ai:intent Context attachment for any `Result`
pub trait ResultExt<T, E> {
    /// @ai:intent Wrap the error into layer `W` with eagerly supplied context
    /// @ai:post Ok values pass through untouched
    /// @ai:effects pure
    fn within<W: Wrap<E>>(self, context: W::Context) -> Result<T, W>;

    /// @ai:intent Wrap the error into layer `W`, computing the context only on failure
    /// @ai:post `context` is never called for Ok values
    /// @ai:effects pure
    fn within_with<W, F>(self, context: F) -> Result<T, W>
    where
        W: Wrap<E>,
        F: FnOnce() -> W::Context;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn within<W: Wrap<E>>(self, context: W::Context) -> Result<T, W> {
        self.map_err(|inner| W::wrap(inner, context))
    }

    fn within_with<W, F>(self, context: F) -> Result<T, W>
    where
        W: Wrap<E>,
        F: FnOnce() -> W::Context,
    {
        self.map_err(|inner| W::wrap(inner, context()))
    }
}

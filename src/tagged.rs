//! @ai:module:intent Expose the discriminant of closed sum types as plain values
//! @ai:module:layer domain
//! @ai:module:public_api Tagged, ResultTag
//! @ai:module:stateless true
//!
//! Every union in this crate is a native `enum`, so the compiler already
//! refuses a `match` that forgets a variant:
//!
//! ```compile_fail
//! use strata::FileParseError;
//!
//! fn describe(e: &FileParseError) -> &'static str {
//!     match e {
//!         FileParseError::CannotOpen { .. } => "open",
//!     }
//! }
//! ```
//!
//! or names one that was never declared:
//!
//! ```compile_fail
//! use strata::FileParseError;
//!
//! fn describe(e: &FileParseError) -> &'static str {
//!     match e {
//!         FileParseError::CannotOpen { .. } => "open",
//!         FileParseError::RecordFailed(_) => "record",
//!         FileParseError::TimedOut => "timeout",
//!     }
//! }
//! ```
//!
//! The same holds for every other union, including the field-level one:
//!
//! ```compile_fail
//! use strata::FieldErrorKind;
//!
//! fn describe(k: &FieldErrorKind) -> &'static str {
//!     match k {
//!         FieldErrorKind::Read(_) => "read",
//!     }
//! }
//! ```
//!
//! ```compile_fail
//! use strata::FieldErrorKind;
//!
//! fn describe(k: &FieldErrorKind) -> &'static str {
//!     match k {
//!         FieldErrorKind::Read(_) => "read",
//!         FieldErrorKind::ValueTooLong { .. } => "too long",
//!         FieldErrorKind::Decode => "decode",
//!     }
//! }
//! ```
//!
//! while a match over every declared variant compiles:
//!
//! ```
//! use strata::{FieldErrorKind, FileParseError};
//!
//! fn describe(e: &FileParseError) -> &'static str {
//!     match e {
//!         FileParseError::CannotOpen { .. } => "open",
//!         FileParseError::RecordFailed(inner) => match &inner.kind {
//!             FieldErrorKind::Read(_) => "read",
//!             FieldErrorKind::ValueTooLong { .. } => "too long",
//!         },
//!     }
//! }
//! # let _ = describe;
//! ```
//!
//! [`Tagged`] adds what `match` does not give you: the active variant as a
//! value that can be logged, serialised and compared.

use serde::Serialize;
use std::fmt::Debug;

/// @ai:intent A closed union whose active variant can be observed without touching its fields
pub trait Tagged {
    /// Fieldless mirror of the union's variants.
    type Tag: Copy + Eq + Debug + Serialize + 'static;

    /// Every declared variant, in declaration order.
    const TAGS: &'static [Self::Tag];

    /// @ai:intent Return the variant this value was constructed as
    /// @ai:effects pure
    fn tag(&self) -> Self::Tag;

    /// @ai:intent Check whether this value is the given variant
    /// @ai:effects pure
    fn is(&self, tag: Self::Tag) -> bool {
        self.tag() == tag
    }
}

/// @ai:intent Discriminant of a `Result`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResultTag {
    Ok,
    Err,
}

impl<T, E> Tagged for Result<T, E> {
    type Tag = ResultTag;

    const TAGS: &'static [ResultTag] = &[ResultTag::Ok, ResultTag::Err];

    fn tag(&self) -> ResultTag {
        match self {
            Ok(_) => ResultTag::Ok,
            Err(_) => ResultTag::Err,
        }
    }
}

//! @ai:module:intent Define the per-layer error values of a CSV parse and how they render
//! @ai:module:layer domain
//! @ai:module:public_api IoFailure, FieldErrorKind, FieldReadError, FileParseError, ErrorReport, render_chain, hint
//! @ai:module:depends_on tagged, result
//! @ai:module:stateless true

use crate::result::Wrap;
use crate::tagged::Tagged;
use serde::Serialize;
use std::error::Error as StdError;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Status recorded when the platform reports no error number.
pub const UNKNOWN_STATUS: i32 = -1;

fn status_of(err: &io::Error) -> i32 {
    err.raw_os_error().unwrap_or(UNKNOWN_STATUS)
}

/// @ai:intent Leaf cause: a platform read failure on a named resource
#[derive(Error, Debug)]
#[error("Cannot read from {}", .path.display())]
pub struct IoFailure {
    pub status: i32,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl IoFailure {
    /// @ai:intent Capture an I/O error together with the resource it happened on
    pub fn new(source: io::Error, path: impl Into<PathBuf>) -> Self {
        Self {
            status: status_of(&source),
            path: path.into(),
            source,
        }
    }
}

impl Wrap<io::Error> for IoFailure {
    type Context = PathBuf;

    fn wrap(inner: io::Error, path: PathBuf) -> Self {
        Self::new(inner, path)
    }
}

/// @ai:intent What went wrong while reading a single field
#[derive(Error, Debug)]
pub enum FieldErrorKind {
    #[error(transparent)]
    Read(IoFailure),

    #[error("Value in column {column} exceeds {limit} bytes")]
    ValueTooLong { column: usize, limit: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldErrorTag {
    Read,
    ValueTooLong,
}

impl Tagged for FieldErrorKind {
    type Tag = FieldErrorTag;

    const TAGS: &'static [FieldErrorTag] = &[FieldErrorTag::Read, FieldErrorTag::ValueTooLong];

    fn tag(&self) -> FieldErrorTag {
        match self {
            FieldErrorKind::Read(_) => FieldErrorTag::Read,
            FieldErrorKind::ValueTooLong { .. } => FieldErrorTag::ValueTooLong,
        }
    }
}

/// @ai:intent A field failure, tagged with the zero-based row it happened on
#[derive(Error, Debug)]
#[error("{kind}")]
pub struct FieldReadError {
    pub row: usize,
    #[source]
    pub kind: FieldErrorKind,
}

impl Wrap<IoFailure> for FieldReadError {
    type Context = usize;

    fn wrap(inner: IoFailure, row: usize) -> Self {
        Self {
            row,
            kind: FieldErrorKind::Read(inner),
        }
    }
}

/// @ai:intent Terminal error of a whole-file parse
#[derive(Error, Debug)]
pub enum FileParseError {
    /// Raised before any record is read.
    #[error("Cannot open file {}", .path.display())]
    CannotOpen {
        status: i32,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Raised once streaming has begun.
    #[error("Cannot parse record #{}", .0.row)]
    RecordFailed(#[source] FieldReadError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileParseTag {
    CannotOpen,
    RecordFailed,
}

impl FileParseError {
    /// @ai:intent Build a CannotOpen error from the failed open call
    pub fn cannot_open(source: io::Error, path: impl Into<PathBuf>) -> Self {
        FileParseError::CannotOpen {
            status: status_of(&source),
            path: path.into(),
            source,
        }
    }

    /// @ai:intent Row at which streaming failed, if it had started
    /// @ai:effects pure
    pub fn row(&self) -> Option<usize> {
        match self {
            FileParseError::CannotOpen { .. } => None,
            FileParseError::RecordFailed(inner) => Some(inner.row),
        }
    }

    /// @ai:intent Platform status code carried anywhere in the chain
    /// @ai:effects pure
    pub fn status(&self) -> Option<i32> {
        match self {
            FileParseError::CannotOpen { status, .. } => Some(*status),
            FileParseError::RecordFailed(FieldReadError {
                kind: FieldErrorKind::Read(io),
                ..
            }) => Some(io.status),
            FileParseError::RecordFailed(FieldReadError {
                kind: FieldErrorKind::ValueTooLong { .. },
                ..
            }) => None,
        }
    }

    /// @ai:intent Resource path carried anywhere in the chain
    /// @ai:effects pure
    pub fn path(&self) -> Option<&Path> {
        match self {
            FileParseError::CannotOpen { path, .. } => Some(path),
            FileParseError::RecordFailed(FieldReadError {
                kind: FieldErrorKind::Read(io),
                ..
            }) => Some(&io.path),
            FileParseError::RecordFailed(FieldReadError {
                kind: FieldErrorKind::ValueTooLong { .. },
                ..
            }) => None,
        }
    }
}

impl Tagged for FileParseError {
    type Tag = FileParseTag;

    const TAGS: &'static [FileParseTag] = &[FileParseTag::CannotOpen, FileParseTag::RecordFailed];

    fn tag(&self) -> FileParseTag {
        match self {
            FileParseError::CannotOpen { .. } => FileParseTag::CannotOpen,
            FileParseError::RecordFailed(_) => FileParseTag::RecordFailed,
        }
    }
}

impl Wrap<FieldReadError> for FileParseError {
    type Context = ();

    fn wrap(inner: FieldReadError, _: ()) -> Self {
        FileParseError::RecordFailed(inner)
    }
}

/// @ai:intent Render a parse failure and every cause below it on one line
/// @ai:example (RecordFailed at row 1) -> "Cannot parse record #1: Cannot read from t.csv: disk gone"
/// @ai:effects pure
pub fn render_chain(err: &FileParseError) -> String {
    let mut rendered = err.to_string();

    // FieldReadError and FieldErrorKind::Read display the IoFailure below them, so
    // each layer is rendered once from the variant that owns its text.
    match err {
        FileParseError::CannotOpen { source, .. } => push_causes(&mut rendered, source),
        FileParseError::RecordFailed(FieldReadError {
            kind: FieldErrorKind::Read(io),
            ..
        }) => {
            rendered.push_str(": ");
            rendered.push_str(&io.to_string());
            push_causes(&mut rendered, &io.source);
        }
        FileParseError::RecordFailed(FieldReadError {
            kind: kind @ FieldErrorKind::ValueTooLong { .. },
            ..
        }) => {
            rendered.push_str(": ");
            rendered.push_str(&kind.to_string());
        }
    }

    rendered
}

fn push_causes(rendered: &mut String, cause: &(dyn StdError + 'static)) {
    let mut current = Some(cause);
    while let Some(cause) = current {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        current = cause.source();
    }
}

/// @ai:intent Suggest a fix for the causes a user can act on
/// @ai:effects pure
pub fn hint(err: &FileParseError) -> Option<&'static str> {
    match err {
        FileParseError::CannotOpen { source, .. } if source.kind() == io::ErrorKind::NotFound => {
            Some("check that the path exists")
        }
        FileParseError::CannotOpen { source, .. }
            if source.kind() == io::ErrorKind::PermissionDenied =>
        {
            Some("check the file permissions")
        }
        FileParseError::CannotOpen { .. } => None,
        FileParseError::RecordFailed(FieldReadError {
            kind: FieldErrorKind::ValueTooLong { .. },
            ..
        }) => Some("raise max_value_len or set overflow = \"truncate\""),
        FileParseError::RecordFailed(_) => None,
    }
}

/// @ai:intent Serialisable snapshot of a FileParseError
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub tag: FileParseTag,
    pub message: String,
    pub chain: String,
    pub path: Option<PathBuf>,
    pub row: Option<usize>,
    pub status: Option<i32>,
}

impl From<&FileParseError> for ErrorReport {
    fn from(err: &FileParseError) -> Self {
        Self {
            tag: err.tag(),
            message: err.to_string(),
            chain: render_chain(err),
            path: err.path().map(Path::to_path_buf),
            row: err.row(),
            status: err.status(),
        }
    }
}

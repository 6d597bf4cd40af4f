//! @ai:module:intent Layered, exhaustively matched error values for a naive CSV reader
//! @ai:module:layer infrastructure
//! @ai:module:public_api tagged, result, layers, source, parser, config, output, error
//! @ai:module:stateless true
//!
//! # Strata
//!
//! Every layer of a parse owns its own error type. A failure starts as an
//! [`IoFailure`], gains the row it happened on as a [`FieldReadError`], and
//! reaches the caller as a [`FileParseError`], with nothing dropped on the
//! way up.
//!
//! ## Example
//!
//! ```rust,no_run
//! use strata::{parse_file, FileParseError};
//!
//! let result = parse_file("data/table.csv", |i: usize, j: usize, value: &str| {
//!     println!("[{}][{}]: {}", i, j, value);
//! });
//!
//! if let Err(e) = result {
//!     match &e {
//!         FileParseError::CannotOpen { status, .. } => eprintln!("{} (errno {})", e, status),
//!         FileParseError::RecordFailed(inner) => eprintln!("{} at row {}", e, inner.row),
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod layers;
pub mod output;
pub mod parser;
pub mod result;
pub mod source;
pub mod tagged;

pub use config::{OverflowPolicy, ParserConfig, Separator};
pub use error::{Error, Result};
pub use layers::{
    hint, render_chain, ErrorReport, FieldErrorKind, FieldErrorTag, FieldReadError,
    FileParseError, FileParseTag, IoFailure, UNKNOWN_STATUS,
};
pub use output::{format_error, format_fields, Field, OutputFormat};
pub use parser::{parse, parse_file, parse_reader, FieldSink, ParseSummary};
pub use result::{ResultExt, Wrap};
pub use source::{FileSource, Source};
pub use tagged::{ResultTag, Tagged};

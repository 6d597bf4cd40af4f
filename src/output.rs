//! @ai:module:intent Format parsed fields and parse failures for the console
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, Field, format_fields, format_error
//! @ai:module:depends_on layers
//! @ai:module:stateless true

use crate::error::Result;
use crate::layers::{hint, render_chain, ErrorReport, FileParseError};
use colored::Colorize;
use serde::Serialize;

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// @ai:intent One field delivered by the parser
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Field {
    pub row: usize,
    pub column: usize,
    pub value: String,
}

/// @ai:intent Format collected fields as a string
/// @ai:effects pure
pub fn format_fields(fields: &[Field], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(&fields, false),
        OutputFormat::JsonPretty => to_json(&fields, true),
        OutputFormat::Text => Ok(fields
            .iter()
            .map(|f| format!("[{}][{}]: {}\n", f.row, f.column, f.value))
            .collect()),
    }
}

/// @ai:intent Format a parse failure; `verbose` adds the full cause chain to text output
/// @ai:effects pure
pub fn format_error(
    err: &FileParseError,
    format: OutputFormat,
    verbose: bool,
) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(&ErrorReport::from(err), false),
        OutputFormat::JsonPretty => to_json(&ErrorReport::from(err), true),
        OutputFormat::Text => {
            let message = if verbose {
                render_chain(err)
            } else {
                err.to_string()
            };
            let mut output = format!("{} {}", "Failed to parse CSV:".red().bold(), message);

            if let Some(hint) = hint(err) {
                output.push_str(&format!("\n  {} {}", "hint:".cyan(), hint));
            }

            Ok(output)
        }
    }
}

/// @ai:intent Format any serializable value as JSON
/// @ai:effects pure
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

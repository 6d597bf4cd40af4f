//! @ai:module:intent Configuration for the CSV field scanner
//! @ai:module:layer infrastructure
//! @ai:module:public_api ParserConfig, OverflowPolicy
//! @ai:module:stateless true

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;

/// @ai:intent What to do with bytes beyond `max_value_len`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Drop the extra bytes and keep scanning.
    #[default]
    Truncate,
    /// Fail the field with `ValueTooLong`.
    Error,
}

/// @ai:intent A field separator the byte scanner can compare against
/// @ai:invariant always a single ASCII byte that is neither a newline nor a blank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Separator(u8);

impl Separator {
    pub const COMMA: Separator = Separator(b',');

    /// @ai:intent Accept a separator only if the scanner can honour it
    /// @ai:example (';') -> Ok
    /// @ai:example ('é') -> Err(InvalidConfig)
    /// @ai:effects pure
    pub fn new(c: char) -> Result<Self> {
        if !c.is_ascii() {
            return Err(Error::InvalidConfig(format!(
                "separator {:?} is not a single-byte character",
                c
            )));
        }
        if matches!(c, '\n' | ' ' | '\t' | '\r') {
            return Err(Error::InvalidConfig(format!(
                "separator {:?} collides with the record terminator or blanks",
                c
            )));
        }
        Ok(Self(c as u8))
    }

    pub fn as_byte(self) -> u8 {
        self.0
    }

    pub fn as_char(self) -> char {
        char::from(self.0)
    }
}

impl Default for Separator {
    fn default() -> Self {
        Self::COMMA
    }
}

impl TryFrom<char> for Separator {
    type Error = Error;

    fn try_from(c: char) -> Result<Self> {
        Self::new(c)
    }
}

impl From<Separator> for char {
    fn from(separator: Separator) -> Self {
        separator.as_char()
    }
}

/// @ai:intent Scanner settings, loadable from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParserConfig {
    #[serde(default)]
    pub separator: Separator,
    /// `None` lets field values grow without bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value_len: Option<NonZeroUsize>,
    #[serde(default)]
    pub overflow: OverflowPolicy,
}

impl ParserConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

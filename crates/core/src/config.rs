//! Parser configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tokenize::QuoteStyle;

/// Errors that can occur when loading or validating [`ParseOptions`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON deserialization failed.
    #[error("invalid options JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field value is outside its valid range.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// The name of the field that failed validation.
        field: String,
        /// A human-readable explanation of why the field value is invalid.
        reason: String,
    },
}

/// Tokenizer, resolver, and mapper settings shared by one schema.
///
/// Every field has a default, so a JSON document only needs to name the
/// fields it changes:
///
/// ```json
/// { "prefixes": ["--"], "max_depth": 8 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParseOptions {
    /// Characters that open and close quoted regions.
    pub quote_chars: Vec<char>,
    /// Character that makes an immediately following quote literal.
    pub escape_char: char,
    /// Whether `escape_char` is honored at all.
    pub allow_escaping: bool,
    /// Setting-name prefixes, tried in order. The first is the main prefix.
    pub prefixes: Vec<String>,
    /// Fail the parse when quote depth is non-zero at the end of input.
    /// When false the accumulated text is emitted as-is.
    pub throw_on_unbalanced_quotes: bool,
    /// Maximum nesting depth for recursive (nested schema) parses.
    pub max_depth: usize,
    /// Register the `help`/`h` setting on new schemas.
    pub add_help: bool,
}

/// Default setting-name prefixes.
pub const DEFAULT_PREFIXES: [&str; 3] = ["-", "--", "/"];

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            quote_chars: vec!['"'],
            escape_char: '\\',
            allow_escaping: true,
            prefixes: DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect(),
            throw_on_unbalanced_quotes: true,
            max_depth: 64,
            add_help: true,
        }
    }
}

impl ParseOptions {
    /// Parse and validate options from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let options: ParseOptions = serde_json::from_str(s)?;
        options.validate()?;
        Ok(options)
    }

    /// Check the invariants the tokenizer relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quote_chars.is_empty() {
            return Err(invalid("quote_chars", "must contain at least one character"));
        }
        if let Some(c) = self.quote_chars.iter().find(|c| c.is_whitespace()) {
            return Err(invalid(
                "quote_chars",
                format!("{c:?} is whitespace and cannot delimit quotes"),
            ));
        }
        if self.quote_chars.contains(&self.escape_char) {
            return Err(invalid(
                "escape_char",
                format!("{:?} is also a quote character", self.escape_char),
            ));
        }
        if self.prefixes.is_empty() {
            return Err(invalid("prefixes", "must contain at least one prefix"));
        }
        if self.prefixes.iter().any(|p| p.is_empty()) {
            return Err(invalid("prefixes", "must not contain an empty prefix"));
        }
        if self.max_depth == 0 {
            return Err(invalid("max_depth", "must be >= 1"));
        }
        Ok(())
    }

    /// The prefix shown in help output.
    pub fn main_prefix(&self) -> &str {
        self.prefixes.first().map_or("", String::as_str)
    }

    /// Primary quote character, used when re-quoting nested regions.
    pub fn primary_quote(&self) -> char {
        self.quote_chars.first().copied().unwrap_or('"')
    }

    /// Quote/escape view used by the tokenizer.
    pub fn quote_style(&self) -> QuoteStyle<'_> {
        QuoteStyle {
            quotes: &self.quote_chars,
            escape: self.allow_escaping.then_some(self.escape_char),
        }
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidField {
        field: field.into(),
        reason: reason.into(),
    }
}

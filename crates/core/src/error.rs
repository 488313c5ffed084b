//! Error types for tokenizing, mapping, and schema construction.

use std::collections::BTreeMap;

use argmap_diagnostics::{Diagnostic, codes};
use thiserror::Error;

/// Failures that abort a parse.
///
/// Everything else (unknown setting names, unconvertible values) is reported
/// as data in the parse result so one bad token never hides the rest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Start and end quote counts differ, or a quote could not be paired.
    #[error("quote mismatch: {starts} opening and {ends} closing quotes")]
    QuoteMismatch {
        /// Number of quote characters accepted as region starts.
        starts: usize,
        /// Number of quote characters accepted as region ends.
        ends: usize,
    },

    /// Quote depth was non-zero once every argument had been consumed.
    #[error("unbalanced quotes: depth {depth} at end of input")]
    UnbalancedQuotes {
        /// Depth at end of input (negative when closes outnumber opens).
        depth: isize,
    },

    /// A nested argument string was parsed deeper than the configured limit.
    #[error("nesting depth exceeded: limit is {limit}")]
    NestingDepthExceeded {
        /// The configured maximum depth.
        limit: usize,
    },
}

impl ParseError {
    /// Whether this is one of the two quote-mismatch forms.
    pub fn is_quote_mismatch(&self) -> bool {
        matches!(
            self,
            ParseError::QuoteMismatch { .. } | ParseError::UnbalancedQuotes { .. }
        )
    }

    /// Stable diagnostic code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::QuoteMismatch { .. } => codes::QUOTE_MISMATCH,
            ParseError::UnbalancedQuotes { .. } => codes::UNBALANCED_QUOTES,
            ParseError::NestingDepthExceeded { .. } => codes::NESTING_DEPTH_EXCEEDED,
        }
    }

    /// Convert into an error [`Diagnostic`] (no span: these concern the whole input).
    pub fn to_diagnostic(&self) -> Diagnostic {
        let ctx = match self {
            ParseError::QuoteMismatch { starts, ends } => BTreeMap::from([
                ("starts".to_string(), starts.to_string()),
                ("ends".to_string(), ends.to_string()),
            ]),
            ParseError::UnbalancedQuotes { depth } => {
                BTreeMap::from([("depth".to_string(), depth.to_string())])
            }
            ParseError::NestingDepthExceeded { limit } => {
                BTreeMap::from([("limit".to_string(), limit.to_string())])
            }
        };
        Diagnostic::error(self.code(), self.to_string(), None).with_context(ctx)
    }
}

/// Errors raised while building a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A name or alias is already taken by another setting.
    #[error("the name '{name}' is already registered")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },

    /// A schema may hold only one help setting.
    #[error("a schema cannot contain more than one help setting")]
    DuplicateHelp,

    /// Settings need at least one name.
    #[error("a setting must have at least one name")]
    NoNames,
}

/// Errors from [`SchemaRegistry`](crate::SchemaRegistry) lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No schema was registered for the requested type.
    #[error("no schema is registered for {type_name}")]
    NotRegistered {
        /// Name of the requested type.
        type_name: &'static str,
    },

    /// The registered schema failed to parse the input.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

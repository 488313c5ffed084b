//! Diagnostic ID constants.
//!
//! Use these instead of string literals to get compile-time typo detection
//! and IDE autocomplete. `ARG1xxx` codes are tokenizer failures that abort a
//! parse, `ARG2xxx` codes describe per-entry binding outcomes, and `ARG3xxx`
//! codes are informational.

/// Start and end quote counts differ, or a start quote has no matching end.
pub const QUOTE_MISMATCH: &str = "ARG1001";
/// Quote depth did not return to zero by the end of the input.
pub const UNBALANCED_QUOTES: &str = "ARG1002";
/// A recursive (nested schema) parse exceeded the configured depth limit.
pub const NESTING_DEPTH_EXCEEDED: &str = "ARG1003";
/// Text that no registered setting claimed.
pub const UNUSED_PART: &str = "ARG2001";
/// Argument text could not be converted to the setting's value type.
pub const CONVERSION_FAILED: &str = "ARG2002";
/// A converted value was rejected by the setting's validation.
pub const VALIDATION_FAILED: &str = "ARG2003";
/// A collection modification was malformed or had no effect.
pub const COLLECTION_ACTION_FAILED: &str = "ARG2004";
/// A required setting has not been set.
pub const SETTING_NOT_SET: &str = "ARG2005";
/// Output produced by the help setting.
pub const HELP: &str = "ARG3001";

/// Every known code, in numeric order.
pub const ALL: &[&str] = &[
    QUOTE_MISMATCH,
    UNBALANCED_QUOTES,
    NESTING_DEPTH_EXCEEDED,
    UNUSED_PART,
    CONVERSION_FAILED,
    VALIDATION_FAILED,
    COLLECTION_ACTION_FAILED,
    SETTING_NOT_SET,
    HELP,
];

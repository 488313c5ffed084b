//! argmap core library.
//!
//! Splits shell-like argument strings into quote-aware spans, groups the
//! spans into `(setting, argument)` entries, and binds those entries onto a
//! target value through a [`Schema`]. The main entry points are
//! [`split_like_command_line`] for tokenizing, [`map_args`] for grouping,
//! and [`Schema::parse`] for binding.
//!
//! Quoted arguments may themselves be complete argument strings, which lets
//! a setting build a nested value from its own schema:
//!
//! ```text
//! -Child "-Name "-Name \"Test Value\"" -Text TestText"
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod mapper;
pub mod registry;
pub mod resolve;
pub mod schema;
pub mod tokenize;
pub mod tracker;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Configuration & errors
pub use config::{ConfigError, ParseOptions};
pub use error::{ParseError, RegistryError, SchemaError};

// Tokenizer
pub use tokenize::{ArgSpan, spans_from_args, split_like_command_line, unescape};

// Mapper & resolver
pub use mapper::{MappingEntry, SettingHandle, map_args};
pub use resolve::{NameIndex, PrefixState};

// Binder
pub use registry::SchemaRegistry;
pub use schema::{
    CollectionAction, CollectionSetting, ParseReport, ParseValue, Schema, Setting, SettingBits,
    SettingMeta,
};
pub use tracker::{InstanceId, InstanceTable};

// Diagnostics (re-exported from the diagnostics crate)
pub use argmap_diagnostics::{Diagnostic, Severity, Span, codes};

//! Converting argument text into typed values.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::error::ParseError;
use crate::tokenize::QuoteStyle;

/// State passed to value parsers.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    /// Nesting depth of the parse that produced the text (0 at top level).
    pub depth: usize,
    /// Quote and escape characters of the schema doing the parse.
    pub style: QuoteStyle<'a>,
}

/// Failure to turn argument text into a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The text is not a valid value; reported against the setting.
    #[error("{0}")]
    Invalid(String),
    /// The text parsed, but the value it describes lacks required settings.
    #[error("{0}")]
    Unset(String),
    /// A failure that must abort the entire parse.
    #[error(transparent)]
    Abort(#[from] ParseError),
}

/// Boxed conversion function used by settings.
pub type ValueParser<V> =
    Arc<dyn for<'c> Fn(&str, &ParseContext<'c>) -> Result<V, ConvertError> + Send + Sync>;

/// Types that can be parsed from a single argument.
pub trait ParseValue: Sized {
    /// Replace escaped quotes with bare quotes before parsing.
    const UNESCAPE: bool = false;

    /// Parse `text`, returning a human-readable reason on failure.
    fn parse_value(text: &str) -> Result<Self, String>;

    /// Short type name shown in help and diagnostics.
    fn type_name() -> &'static str;

    /// Complete list of accepted spellings, for closed sets such as enums.
    fn acceptable_values() -> Option<&'static [&'static str]> {
        None
    }
}

/// Parser that defers to [`ParseValue::parse_value`].
pub fn default_parser<V: ParseValue + 'static>() -> ValueParser<V> {
    Arc::new(|text: &str, _: &ParseContext<'_>| {
        V::parse_value(text).map_err(ConvertError::Invalid)
    })
}

impl ParseValue for bool {
    fn parse_value(text: &str) -> Result<Self, String> {
        if text.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if text.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(format!("'{text}' is not true or false"))
        }
    }

    fn type_name() -> &'static str {
        "bool"
    }

    fn acceptable_values() -> Option<&'static [&'static str]> {
        Some(&["true", "false"])
    }
}

impl ParseValue for String {
    const UNESCAPE: bool = true;

    fn parse_value(text: &str) -> Result<Self, String> {
        Ok(text.to_string())
    }

    fn type_name() -> &'static str {
        "string"
    }
}

impl ParseValue for PathBuf {
    const UNESCAPE: bool = true;

    fn parse_value(text: &str) -> Result<Self, String> {
        Ok(PathBuf::from(text))
    }

    fn type_name() -> &'static str {
        "path"
    }
}

impl ParseValue for char {
    fn parse_value(text: &str) -> Result<Self, String> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(format!("'{text}' is not a single character")),
        }
    }

    fn type_name() -> &'static str {
        "char"
    }
}

macro_rules! parse_value_from_str {
    ($($t:ty),+ $(,)?) => {
        $(
            impl ParseValue for $t {
                fn parse_value(text: &str) -> Result<Self, String> {
                    text.trim().parse::<$t>().map_err(|e| e.to_string())
                }

                fn type_name() -> &'static str {
                    stringify!($t)
                }
            }
        )+
    };
}

parse_value_from_str!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_is_case_insensitive() {
        assert_eq!(bool::parse_value("TRUE"), Ok(true));
        assert_eq!(bool::parse_value("False"), Ok(false));
        assert!(bool::parse_value("yes").is_err());
    }

    #[test]
    fn integers_report_the_std_reason() {
        assert_eq!(u64::parse_value("18446744073709551615"), Ok(u64::MAX));
        let err = u64::parse_value("asdf").unwrap_err();
        assert!(err.contains("invalid digit"), "{err}");
        assert!(u8::parse_value("256").is_err());
    }

    #[test]
    fn char_needs_exactly_one() {
        assert_eq!(char::parse_value("é"), Ok('é'));
        assert!(char::parse_value("ab").is_err());
        assert!(char::parse_value("").is_err());
    }

    #[test]
    fn only_text_types_unescape() {
        const { assert!(String::UNESCAPE) };
        const { assert!(PathBuf::UNESCAPE) };
        const { assert!(!i32::UNESCAPE) };
        assert_eq!(i32::type_name(), "i32");
    }

    #[test]
    fn default_parser_wraps_reason() {
        let p = default_parser::<i32>();
        let cx = ParseContext {
            depth: 0,
            style: QuoteStyle {
                quotes: &['"'],
                escape: None,
            },
        };
        assert_eq!(p("42", &cx), Ok(42));
        assert!(matches!(p("x", &cx), Err(ConvertError::Invalid(_))));
    }
}

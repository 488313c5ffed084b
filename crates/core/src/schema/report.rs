//! Results of binding one argument string.

use std::collections::BTreeMap;
use std::fmt;

use argmap_diagnostics::{Diagnostic, Severity, Span, codes};
use serde::Serialize;

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

/// What happened when one setting was given one argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingOutcome {
    /// Main name of the setting.
    pub setting: String,
    /// The argument text the setting received.
    pub value: String,
    /// Short description, e.g. `Successfully set.`.
    pub message: String,
    /// Diagnostic code; `None` for successes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    /// Source range of the argument, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl SettingOutcome {
    pub(crate) fn success(setting: &str, value: &str, message: impl Into<String>) -> Self {
        Self {
            setting: setting.to_string(),
            value: value.to_string(),
            message: message.into(),
            code: None,
            span: None,
        }
    }

    pub(crate) fn failure(
        setting: &str,
        value: &str,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: Some(code),
            ..Self::success(setting, value, message)
        }
    }

    pub(crate) fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Render a failure as a diagnostic. Successes have no code and yield `None`.
    pub fn to_diagnostic(&self, severity: Severity) -> Option<Diagnostic> {
        let code = self.code?;
        Some(
            Diagnostic::new(code, severity, self.to_string(), self.span).with_context(ctx!(
                "setting" => self.setting.as_str(),
                "value" => self.value.as_str(),
            )),
        )
    }
}

impl fmt::Display for SettingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.message, self.setting, self.value)
    }
}

/// Text that no setting claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnusedPart {
    /// The unclaimed text.
    pub text: String,
    /// Where it came from.
    pub span: Span,
}

/// Set of setting indices within one schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingBits {
    words: Vec<u64>,
}

impl SettingBits {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `index`; returns whether it was newly inserted.
    pub fn insert(&mut self, index: usize) -> bool {
        let (word, bit) = (index / 64, index % 64);
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        let fresh = self.words[word] & (1 << bit) == 0;
        self.words[word] |= 1 << bit;
        fresh
    }

    /// Whether `index` is in the set.
    pub fn contains(&self, index: usize) -> bool {
        self.words
            .get(index / 64)
            .is_some_and(|w| w & (1 << (index % 64)) != 0)
    }

    /// Add every index of `other`.
    pub fn union_with(&mut self, other: &SettingBits) {
        if self.words.len() < other.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            *mine |= theirs;
        }
    }

    /// Indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &word)| {
            (0..64).filter(move |b| word & (1 << b) != 0).map(move |b| w * 64 + b)
        })
    }

    /// Number of indices in the set.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }
}

/// Everything one parse produced.
///
/// Per-setting failures live here as data; only tokenizer-level problems
/// abort a parse (see [`ParseError`](crate::ParseError)).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Text no setting claimed.
    pub unused: Vec<UnusedPart>,
    /// Settings that accepted their argument.
    pub successes: Vec<SettingOutcome>,
    /// Settings that rejected their argument.
    pub errors: Vec<SettingOutcome>,
    /// Output of the help setting.
    pub help: Vec<String>,
    /// Settings that were successfully set during this parse.
    pub set: SettingBits,
}

impl ParseReport {
    /// No unused parts and no errors.
    pub fn is_success(&self) -> bool {
        self.unused.is_empty() && self.errors.is_empty()
    }

    /// Unused parts, errors, and help as diagnostics, in that order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let unused = self.unused.iter().map(|part| {
            Diagnostic::error(
                codes::UNUSED_PART,
                format!("'{}' was not used by any setting", part.text),
                Some(part.span),
            )
            .with_context(ctx!("text" => part.text.as_str()))
        });
        let errors = self
            .errors
            .iter()
            .filter_map(|e| e.to_diagnostic(Severity::Error));
        let help = self
            .help
            .iter()
            .map(|h| Diagnostic::info(codes::HELP, h.as_str(), None));
        unused.chain(errors).chain(help).collect()
    }
}

impl fmt::Display for ParseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn section<D: fmt::Display>(
            f: &mut fmt::Formatter<'_>,
            title: &str,
            items: &[D],
        ) -> fmt::Result {
            if items.is_empty() {
                return Ok(());
            }
            writeln!(f, "{title}:")?;
            for item in items {
                writeln!(f, "\t{item}")?;
            }
            Ok(())
        }

        section(f, "Help", &self.help)?;
        section(f, "Successes", &self.successes)?;
        section(f, "Errors", &self.errors)?;
        if !self.unused.is_empty() {
            let parts: Vec<&str> = self.unused.iter().map(|p| p.text.as_str()).collect();
            writeln!(
                f,
                "The following parts were extra; was an argument mistyped? '{}'",
                parts.join("', '")
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_grow_and_iterate_in_order() {
        let mut bits = SettingBits::new();
        assert!(bits.insert(70));
        assert!(bits.insert(3));
        assert!(!bits.insert(3));
        assert!(bits.contains(70));
        assert!(!bits.contains(4));
        assert!(!bits.contains(500));
        assert_eq!(bits.iter().collect::<Vec<_>>(), vec![3, 70]);
        assert_eq!(bits.len(), 2);
    }

    #[test]
    fn bits_union() {
        let mut a = SettingBits::new();
        a.insert(1);
        let mut b = SettingBits::new();
        b.insert(130);
        a.union_with(&b);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![1, 130]);
        assert!(SettingBits::new().is_empty());
    }

    #[test]
    fn outcome_display_names_setting_and_value() {
        let o = SettingOutcome::failure("IntValue", "asdf", codes::CONVERSION_FAILED, "Unable to convert.");
        assert_eq!(o.to_string(), "Unable to convert. (IntValue, asdf)");
        assert!(o.to_diagnostic(Severity::Error).is_some());
        assert!(SettingOutcome::success("IntValue", "1", "Successfully set.")
            .to_diagnostic(Severity::Info)
            .is_none());
    }

    #[test]
    fn report_display_lists_sections() {
        let report = ParseReport {
            unused: vec![
                UnusedPart {
                    text: "a".into(),
                    span: Span::new(0, 1),
                },
                UnusedPart {
                    text: "b".into(),
                    span: Span::new(2, 3),
                },
            ],
            errors: vec![SettingOutcome::failure(
                "X",
                "1",
                codes::VALIDATION_FAILED,
                "Too small.",
            )],
            ..ParseReport::default()
        };
        let text = report.to_string();
        assert!(text.contains("Errors:\n\tToo small. (X, 1)\n"), "{text}");
        assert!(text.ends_with("was an argument mistyped? 'a', 'b'\n"), "{text}");
        assert!(!text.contains("Successes:"));
        assert!(!report.is_success());
    }

    #[test]
    fn diagnostics_keep_spans_and_codes() {
        let report = ParseReport {
            unused: vec![UnusedPart {
                text: "extra".into(),
                span: Span::new(4, 9),
            }],
            help: vec!["All Settings:".into()],
            ..ParseReport::default()
        };
        let diags = report.diagnostics();
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].id, codes::UNUSED_PART);
        assert_eq!(diags[0].span, Some(Span::new(4, 9)));
        assert_eq!(diags[1].severity, Severity::Info);
    }
}

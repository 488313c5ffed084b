//! Binding mapped arguments onto a target value.
//!
//! A [`Schema<T>`] owns the settings that can write into a `T`. Parsing runs
//! the tokenizer and mapper, then hands each mapping entry to its setting:
//!
//! ```text
//! input ──▶ split_like_command_line ──▶ map_args ──▶ BoundSetting::try_set ──▶ ParseReport
//! ```

pub mod collection;
pub mod report;
pub mod setting;
pub mod value;

pub use collection::{CollectionAction, CollectionSetting};
pub use report::{ParseReport, SettingBits, SettingOutcome, UnusedPart};
pub use setting::{BoundSetting, SetError, Setting, SettingMeta};
pub use value::{ConvertError, ParseContext, ParseValue, ValueParser, default_parser};

use std::collections::BTreeMap;
use std::sync::Arc;

use argmap_diagnostics::{Diagnostic, codes};
use tracing::debug;

use crate::config::ParseOptions;
use crate::error::{ParseError, SchemaError};
use crate::mapper::{MappingEntry, SettingHandle, map_args};
use crate::resolve::{NameIndex, PrefixState, resolve};
use crate::tokenize::{ArgSpan, spans_from_args, split_like_command_line};

/// Handle the mapper uses for settings of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SettingRef {
    index: usize,
    flag: bool,
    max_args: usize,
}

impl SettingRef {
    /// Position of the setting in its schema.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl SettingHandle for SettingRef {
    fn is_flag(&self) -> bool {
        self.flag
    }

    fn max_args(&self) -> usize {
        self.max_args
    }
}

enum Slot<T> {
    Help(SettingMeta),
    Bound(Box<dyn BoundSetting<T>>),
}

impl<T> Slot<T> {
    fn meta(&self) -> &SettingMeta {
        match self {
            Slot::Help(meta) => meta,
            Slot::Bound(setting) => setting.meta(),
        }
    }
}

/// The settings that can be parsed into a `T`.
pub struct Schema<T> {
    options: ParseOptions,
    slots: Vec<Slot<T>>,
    index: NameIndex<SettingRef>,
    help: Option<usize>,
}

impl<T> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Schema<T> {
    /// A schema with default options.
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    /// A schema with the given options. Adds the help setting when
    /// `options.add_help` is set.
    pub fn with_options(options: ParseOptions) -> Self {
        let add_help = options.add_help;
        let mut schema = Self {
            options,
            slots: Vec::new(),
            index: NameIndex::new(),
            help: None,
        };
        if add_help {
            let mut meta = SettingMeta::new(["help", "h"], "string");
            meta.description = "Lists every setting, or describes the named one.".to_string();
            meta.optional = true;
            schema.help = Some(schema.push(Slot::Help(meta)).index);
        }
        schema
    }

    /// Options shared by every parse.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Register a setting.
    pub fn add<S>(&mut self, setting: S) -> Result<SettingRef, SchemaError>
    where
        S: BoundSetting<T> + 'static,
    {
        self.insert(Slot::Bound(Box::new(setting)))
    }

    /// Register a setting, builder style.
    pub fn with<S>(mut self, setting: S) -> Result<Self, SchemaError>
    where
        S: BoundSetting<T> + 'static,
    {
        self.add(setting)?;
        Ok(self)
    }

    fn insert(&mut self, slot: Slot<T>) -> Result<SettingRef, SchemaError> {
        let meta = slot.meta();
        if meta.names.is_empty() {
            return Err(SchemaError::NoNames);
        }
        let is_help = meta
            .names
            .iter()
            .any(|n| n.eq_ignore_ascii_case("help") || n.eq_ignore_ascii_case("h"));
        if is_help && self.help.is_some() {
            return Err(SchemaError::DuplicateHelp);
        }
        if let Some(taken) = self.index.first_taken(&meta.names) {
            return Err(SchemaError::DuplicateName {
                name: taken.to_string(),
            });
        }
        let handle = self.push(slot);
        if is_help {
            self.help = Some(handle.index);
        }
        Ok(handle)
    }

    /// Append a slot whose names are known to be free.
    fn push(&mut self, slot: Slot<T>) -> SettingRef {
        let meta = slot.meta();
        let handle = SettingRef {
            index: self.slots.len(),
            flag: meta.flag,
            max_args: meta.max_args,
        };
        self.index.insert_unchecked(&meta.names, handle);
        self.slots.push(slot);
        handle
    }

    /// Number of settings, help included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the schema has no settings.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Metadata of every setting, in registration order.
    pub fn settings(&self) -> impl Iterator<Item = &SettingMeta> + '_ {
        self.slots.iter().map(Slot::meta)
    }

    /// Find a setting's handle by name or alias.
    pub fn lookup(&self, name: &str, state: PrefixState) -> Option<SettingRef> {
        resolve(name, &self.options.prefixes, state, &self.index).copied()
    }

    /// Find a setting's metadata by name or alias.
    pub fn get(&self, name: &str, state: PrefixState) -> Option<&SettingMeta> {
        self.lookup(name, state).and_then(|r| self.meta(r))
    }

    /// Metadata for a handle, or `None` if the handle is out of range for this schema.
    pub fn meta(&self, setting: SettingRef) -> Option<&SettingMeta> {
        self.slots.get(setting.index).map(Slot::meta)
    }

    // ── Parsing ─────────────────────────────────────────────────────────

    /// Tokenize `input` and group it into entries without binding anything.
    pub fn map(&self, input: &str) -> Result<Vec<MappingEntry<SettingRef>>, ParseError> {
        let spans = split_like_command_line(input, &self.options)?;
        self.map_spans(&spans)
    }

    fn map_spans(&self, spans: &[ArgSpan<'_>]) -> Result<Vec<MappingEntry<SettingRef>>, ParseError> {
        map_args(
            spans,
            |token| self.lookup(token, PrefixState::Required),
            &self.options,
        )
    }

    /// Parse a raw argument string into `target`.
    ///
    /// Only tokenizer failures and nesting overflow are errors; everything a
    /// setting rejects is recorded in the returned report.
    pub fn parse(&self, target: &mut T, input: &str) -> Result<ParseReport, ParseError> {
        self.parse_at_depth(target, input, 0)
    }

    /// Parse arguments a shell already split.
    pub fn parse_args<S: AsRef<str>>(
        &self,
        target: &mut T,
        args: &[S],
    ) -> Result<ParseReport, ParseError> {
        let spans = spans_from_args(args, &self.options);
        let entries = self.map_spans(&spans)?;
        self.bind(target, entries, 0)
    }

    pub(crate) fn parse_at_depth(
        &self,
        target: &mut T,
        input: &str,
        depth: usize,
    ) -> Result<ParseReport, ParseError> {
        if depth > self.options.max_depth {
            return Err(ParseError::NestingDepthExceeded {
                limit: self.options.max_depth,
            });
        }
        let entries = self.map(input)?;
        self.bind(target, entries, depth)
    }

    fn bind(
        &self,
        target: &mut T,
        entries: Vec<MappingEntry<SettingRef>>,
        depth: usize,
    ) -> Result<ParseReport, ParseError> {
        let cx = ParseContext {
            depth,
            style: self.options.quote_style(),
        };
        let mut report = ParseReport::default();

        for entry in entries {
            let Some(handle) = entry.setting else {
                report.unused.push(UnusedPart {
                    text: entry.text.unwrap_or_default(),
                    span: entry.span,
                });
                continue;
            };
            let text = match entry.text.as_deref() {
                None if handle.flag => Some("true"),
                text => text,
            };
            match self.slots.get(handle.index) {
                None => continue,
                Some(Slot::Help(_)) => report.help.push(self.help(text)),
                Some(Slot::Bound(setting)) => match setting.try_set(target, text, &cx) {
                    Ok(outcome) => {
                        report.set.insert(handle.index);
                        report.successes.push(outcome.at(entry.span));
                    }
                    Err(SetError::Rejected(outcome)) => report.errors.push(outcome.at(entry.span)),
                    Err(SetError::Abort(err)) => return Err(err),
                },
            }
        }

        debug!(
            depth,
            successes = report.successes.len(),
            errors = report.errors.len(),
            unused = report.unused.len(),
            "bound arguments"
        );
        Ok(report)
    }

    // ── Help & needed settings ──────────────────────────────────────────

    /// Help text: every setting when `name` is empty, else the named one.
    pub fn help(&self, name: Option<&str>) -> String {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            None => {
                let lines: Vec<String> = self.settings().map(SettingMeta::names_line).collect();
                format!("All Settings:\n\t{}", lines.join("\n\t"))
            }
            Some(name) => match self.get(name, PrefixState::Optional) {
                Some(meta) => meta.information(),
                None => format!("'{name}' is not a valid setting."),
            },
        }
    }

    /// Required settings not in `set` whose group (if any) has no member in `set`.
    ///
    /// Indices in `set` that this schema does not have are ignored.
    pub fn needed_settings(&self, set: &SettingBits) -> Vec<&SettingMeta> {
        let group_is_set = |group: u32| {
            set.iter()
                .any(|i| self.slots.get(i).is_some_and(|s| s.meta().group == Some(group)))
        };
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (i, slot.meta()))
            .filter(|(i, meta)| {
                !meta.optional && !set.contains(*i) && !meta.group.is_some_and(group_is_set)
            })
            .map(|(_, meta)| meta)
            .collect()
    }

    /// Human-readable summary of [`needed_settings`](Self::needed_settings).
    pub fn format_needed_settings(&self, set: &SettingBits) -> String {
        let needed = self.needed_settings(set);
        if needed.is_empty() {
            return "Every setting which is necessary has been set.".to_string();
        }
        let lines: Vec<String> = needed.iter().map(ToString::to_string).collect();
        format!("The following settings need to be set:\n\t{}", lines.join("\n\t"))
    }

    /// One warning per [`needed_settings`](Self::needed_settings) entry.
    pub fn needed_diagnostics(&self, set: &SettingBits) -> Vec<Diagnostic> {
        self.needed_settings(set)
            .into_iter()
            .map(|meta| {
                Diagnostic::warn(
                    codes::SETTING_NOT_SET,
                    format!("'{}' has not been set", meta.main_name()),
                    None,
                )
                .with_context(BTreeMap::from([(
                    "setting".to_string(),
                    meta.main_name().to_string(),
                )]))
            })
            .collect()
    }

    /// Write every configured default into `target`. Returns the settings touched.
    pub fn apply_defaults(&self, target: &mut T) -> SettingBits {
        let mut applied = SettingBits::new();
        for (i, slot) in self.slots.iter().enumerate() {
            if let Slot::Bound(setting) = slot
                && setting.apply_default(target)
            {
                applied.insert(i);
            }
        }
        applied
    }

    /// Reset every setting of `target`.
    pub fn reset(&self, target: &mut T) {
        for slot in &self.slots {
            if let Slot::Bound(setting) = slot {
                setting.reset(target);
            }
        }
    }
}

impl<T: Default + 'static> Schema<T> {
    /// Value parser that builds a `T` by parsing the argument text with `schema`.
    ///
    /// The nested parse runs one level deeper than the caller. It succeeds
    /// only when the nested report is clean and no required setting of `T`
    /// is left unset. Exceeding the depth limit aborts the outermost parse.
    pub fn nested_parser(schema: &Arc<Self>) -> ValueParser<T> {
        let schema = Arc::clone(schema);
        Arc::new(move |text: &str, cx: &ParseContext<'_>| {
            let mut value = T::default();
            let report = schema
                .parse_at_depth(&mut value, text, cx.depth + 1)
                .map_err(|err| match err {
                    ParseError::NestingDepthExceeded { .. } => ConvertError::Abort(err),
                    other => ConvertError::Invalid(other.to_string()),
                })?;
            if !report.is_success() {
                return Err(ConvertError::Invalid(summarize(&report)));
            }
            if !schema.needed_settings(&report.set).is_empty() {
                return Err(ConvertError::Unset(schema.format_needed_settings(&report.set)));
            }
            Ok(value)
        })
    }
}

fn summarize(report: &ParseReport) -> String {
    let mut problems: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
    problems.extend(report.unused.iter().map(|p| format!("unused '{}'", p.text)));
    format!("nested arguments failed: {}", problems.join("; "))
}

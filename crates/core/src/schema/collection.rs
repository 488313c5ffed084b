//! Settings that modify a `Vec` instead of replacing a value.
//!
//! The argument may begin with an action keyword:
//!
//! ```text
//! -Tags "Add dog"          always append
//! -Tags "AddIfMissing dog" append unless an equal item exists
//! -Tags "Remove dog"       remove equal items, error if none
//! -Tags dog                toggle: remove equal items, or append if none
//! ```

use std::fmt;
use std::str::FromStr;

use argmap_diagnostics::codes;

use super::report::SettingOutcome;
use super::setting::{BoundSetting, SetError, SettingMeta, check, convert, rejected};
use super::value::{ParseContext, ParseValue, ValueParser, default_parser};
use crate::tokenize::unescape;

/// How a collection setting changes its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionAction {
    /// Remove equal items, or add the value if nothing was removed.
    #[default]
    Toggle,
    /// Always add.
    Add,
    /// Add only when no equal item exists.
    AddIfMissing,
    /// Remove equal items; fails when there are none.
    Remove,
}

impl CollectionAction {
    /// Every action, in keyword order.
    pub const ALL: [CollectionAction; 4] = [
        CollectionAction::Toggle,
        CollectionAction::Add,
        CollectionAction::AddIfMissing,
        CollectionAction::Remove,
    ];

    /// Keyword as written in arguments.
    pub fn keyword(self) -> &'static str {
        match self {
            CollectionAction::Toggle => "Toggle",
            CollectionAction::Add => "Add",
            CollectionAction::AddIfMissing => "AddIfMissing",
            CollectionAction::Remove => "Remove",
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            CollectionAction::Toggle => "toggled",
            CollectionAction::Add | CollectionAction::AddIfMissing => "added",
            CollectionAction::Remove => "removed",
        }
    }

    /// Split a leading action keyword off `text`.
    ///
    /// Text without a keyword toggles. A keyword with nothing after it is an
    /// error so that a misplaced quote cannot turn `Add` into a value.
    pub fn split(text: &str) -> Result<(CollectionAction, &str), String> {
        match text.split_once(' ') {
            Some((head, rest)) => match head.parse() {
                Ok(action) => Ok((action, rest)),
                Err(_) => Ok((CollectionAction::Toggle, text)),
            },
            None if text.parse::<CollectionAction>().is_ok() => {
                Err("Cannot provide only an action.".to_string())
            }
            None => Ok((CollectionAction::Toggle, text)),
        }
    }
}

impl FromStr for CollectionAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CollectionAction::ALL
            .into_iter()
            .find(|a| a.keyword().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("'{s}' is not a collection action"))
    }
}

impl fmt::Display for CollectionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

type Accessor<T, V> = Box<dyn Fn(&mut T) -> &mut Vec<V> + Send + Sync>;
type Comparer<V> = Box<dyn Fn(&V, &V) -> bool + Send + Sync>;
type Validation<V> = Box<dyn Fn(&V) -> Result<(), String> + Send + Sync>;
type ResetFactory<V> = Box<dyn Fn(&mut Vec<V>) + Send + Sync>;

/// A setting that adds to or removes from a `Vec<V>` inside a `T`.
pub struct CollectionSetting<T, V> {
    meta: SettingMeta,
    access: Accessor<T, V>,
    parser: ValueParser<V>,
    unescape: bool,
    equals: Comparer<V>,
    validation: Option<Validation<V>>,
    max_removal_count: usize,
    default: Option<Vec<V>>,
    reset: Option<ResetFactory<V>>,
}

impl<T, V> CollectionSetting<T, V>
where
    V: ParseValue + PartialEq + 'static,
{
    /// A collection setting parsed with `V`'s [`ParseValue`] implementation.
    pub fn new<I, S>(
        names: I,
        access: impl Fn(&mut T) -> &mut Vec<V> + Send + Sync + 'static,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut meta = SettingMeta::new(names, V::type_name());
        meta.acceptable_values = V::acceptable_values();
        Self {
            meta,
            access: Box::new(access),
            parser: default_parser::<V>(),
            unescape: V::UNESCAPE,
            equals: Box::new(|a: &V, b: &V| a == b),
            validation: None,
            max_removal_count: usize::MAX,
            default: None,
            reset: None,
        }
    }
}

impl<T, V> CollectionSetting<T, V> {
    /// Help text.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.meta.description = description.into();
        self
    }

    /// Do not require this setting to be set.
    pub fn optional(mut self) -> Self {
        self.meta.optional = true;
        self
    }

    /// Join a mutual-exclusion group.
    pub fn group(mut self, group: u32) -> Self {
        self.meta.group = Some(group);
        self
    }

    /// Replace the element parser. Text is no longer unescaped.
    pub fn parser(mut self, parser: ValueParser<V>) -> Self {
        self.parser = parser;
        self.unescape = false;
        self
    }

    /// Equality used by Toggle, AddIfMissing, and Remove.
    pub fn comparer(mut self, equals: impl Fn(&V, &V) -> bool + Send + Sync + 'static) -> Self {
        self.equals = Box::new(equals);
        self
    }

    /// Reject elements for which `check` returns an error message.
    pub fn validate(
        mut self,
        check: impl Fn(&V) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validation = Some(Box::new(check));
        self
    }

    /// Remove at most `count` equal items per Toggle or Remove.
    pub fn max_removal_count(mut self, count: usize) -> Self {
        self.max_removal_count = count;
        self
    }

    /// Contents written by `apply_defaults` and the `default` keyword.
    pub fn default_value(mut self, items: Vec<V>) -> Self {
        self.default = Some(items);
        self
    }

    /// Custom reset; the default reset clears the collection.
    pub fn reset_with(mut self, factory: impl Fn(&mut Vec<V>) + Send + Sync + 'static) -> Self {
        self.reset = Some(Box::new(factory));
        self
    }

    /// Remove up to `max_removal_count` items equal to `value`, newest first.
    fn remove_matching(&self, items: &mut Vec<V>, value: &V) -> usize {
        let mut removed = 0;
        let mut i = items.len();
        while i > 0 && removed < self.max_removal_count {
            i -= 1;
            if (self.equals)(&items[i], value) {
                items.remove(i);
                removed += 1;
            }
        }
        removed
    }

    fn modify(&self, items: &mut Vec<V>, value: V, action: CollectionAction) -> bool {
        match action {
            CollectionAction::Toggle => {
                if self.remove_matching(items, &value) == 0 {
                    items.push(value);
                }
                true
            }
            CollectionAction::Add => {
                items.push(value);
                true
            }
            CollectionAction::AddIfMissing => {
                let present = items.iter().any(|item| (self.equals)(item, &value));
                if !present {
                    items.push(value);
                }
                !present
            }
            CollectionAction::Remove => self.remove_matching(items, &value) > 0,
        }
    }
}

impl<T, V> BoundSetting<T> for CollectionSetting<T, V>
where
    V: Clone + Send + Sync + 'static,
{
    fn meta(&self) -> &SettingMeta {
        &self.meta
    }

    fn try_set(
        &self,
        target: &mut T,
        text: Option<&str>,
        cx: &ParseContext<'_>,
    ) -> Result<SettingOutcome, SetError> {
        let name = self.meta.main_name();
        let Some(text) = text else {
            return Err(rejected(name, "", codes::CONVERSION_FAILED, "No argument provided."));
        };

        if text.eq_ignore_ascii_case("default") {
            let Some(default) = &self.default else {
                return Err(rejected(name, text, codes::CONVERSION_FAILED, "No default value is set."));
            };
            *(self.access)(target) = default.clone();
            return Ok(SettingOutcome::success(name, text, "Successfully set to default."));
        }

        let (action, rest) = CollectionAction::split(text)
            .map_err(|msg| rejected(name, text, codes::COLLECTION_ACTION_FAILED, &msg))?;

        let unescaped;
        let rest = if self.unescape {
            unescaped = unescape(rest, &cx.style);
            unescaped.as_str()
        } else {
            rest
        };

        let value = convert(&self.parser, rest, cx, name)?;
        check(self.validation.as_ref(), &value, rest, name)?;

        let past = action.past_tense();
        if self.modify((self.access)(target), value, action) {
            Ok(SettingOutcome::success(name, rest, format!("Successfully {past}.")))
        } else {
            Err(rejected(
                name,
                rest,
                codes::COLLECTION_ACTION_FAILED,
                &format!("Already {past}."),
            ))
        }
    }

    fn apply_default(&self, target: &mut T) -> bool {
        match &self.default {
            Some(default) => {
                *(self.access)(target) = default.clone();
                true
            }
            None => false,
        }
    }

    fn reset(&self, target: &mut T) {
        let items = (self.access)(target);
        match &self.reset {
            Some(factory) => factory(items),
            None => items.clear(),
        }
    }
}

//! Single-valued settings bound through accessor closures.

use argmap_diagnostics::codes;

use super::report::SettingOutcome;
use super::value::{ConvertError, ParseContext, ParseValue, ValueParser, default_parser};
use crate::error::ParseError;
use crate::tokenize::unescape;

/// Descriptive data shared by every kind of setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingMeta {
    /// Main name first, then aliases. Never empty.
    pub names: Vec<String>,
    /// Shown by the help setting.
    pub description: String,
    /// Boolean toggle that may be given without a value.
    pub flag: bool,
    /// Not reported by `needed_settings` when unset.
    pub optional: bool,
    /// Mutual-exclusion group; setting any member satisfies all of them.
    pub group: Option<u32>,
    /// Argument units claimed per occurrence.
    pub max_args: usize,
    /// Value type shown in help.
    pub value_type: &'static str,
    /// Closed set of accepted values, if any.
    pub acceptable_values: Option<&'static [&'static str]>,
}

impl SettingMeta {
    pub(crate) fn new<I, S>(names: I, value_type: &'static str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Self {
            names: unique,
            description: String::new(),
            flag: false,
            optional: false,
            group: None,
            max_args: 1,
            value_type,
            acceptable_values: None,
        }
    }

    /// The first name.
    pub fn main_name(&self) -> &str {
        self.names.first().map_or("", String::as_str)
    }

    /// Aliases after the main name.
    pub fn aliases(&self) -> &[String] {
        self.names.get(1..).unwrap_or_default()
    }

    /// `Main: description`, plus the accepted values when the set is closed.
    pub fn information(&self) -> String {
        let mut info = format!("{}: {}", self.main_name(), self.description);
        if let Some(values) = self.acceptable_values {
            info.push_str("\nAcceptable values: ");
            info.push_str(&values.join(", "));
        }
        info
    }

    /// `Main (alias, alias)`, or just `Main`.
    pub fn names_line(&self) -> String {
        match self.aliases() {
            [] => self.main_name().to_string(),
            aliases => format!("{} ({})", self.main_name(), aliases.join(", ")),
        }
    }
}

impl std::fmt::Display for SettingMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.main_name(), self.value_type)
    }
}

/// Why a setting did not take its argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetError {
    /// Reported in the parse result; parsing continues.
    Rejected(SettingOutcome),
    /// Stops the whole parse.
    Abort(ParseError),
}

/// A setting that can write into a `T`.
///
/// Implemented by [`Setting`] and
/// [`CollectionSetting`](super::collection::CollectionSetting); the schema
/// stores them as trait objects.
pub trait BoundSetting<T>: Send + Sync {
    /// Names, flags, and help data.
    fn meta(&self) -> &SettingMeta;

    /// Convert `text` and store it in `target`.
    fn try_set(
        &self,
        target: &mut T,
        text: Option<&str>,
        cx: &ParseContext<'_>,
    ) -> Result<SettingOutcome, SetError>;

    /// Write the default value, if one is configured. Returns whether it did.
    fn apply_default(&self, target: &mut T) -> bool;

    /// Restore the field to its reset state.
    fn reset(&self, target: &mut T);
}

type Accessor<T, V> = Box<dyn Fn(&mut T) -> &mut V + Send + Sync>;
type Validation<V> = Box<dyn Fn(&V) -> Result<(), String> + Send + Sync>;
type ResetFactory<V> = Box<dyn Fn(&V) -> V + Send + Sync>;

/// A setting holding one value of type `V` inside a `T`.
///
/// ```
/// use argmap_core::schema::{Schema, Setting};
///
/// #[derive(Default)]
/// struct Opts { count: u32 }
///
/// let mut schema = Schema::<Opts>::new();
/// schema.add(Setting::new(["Count", "c"], |o: &mut Opts| &mut o.count))?;
///
/// let mut opts = Opts::default();
/// let report = schema.parse(&mut opts, "-c 3")?;
/// assert!(report.is_success());
/// assert_eq!(opts.count, 3);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Setting<T, V> {
    meta: SettingMeta,
    access: Accessor<T, V>,
    parser: ValueParser<V>,
    unescape: bool,
    validation: Option<Validation<V>>,
    default: Option<V>,
    reset: Option<ResetFactory<V>>,
}

impl<T, V: ParseValue + 'static> Setting<T, V> {
    /// A setting parsed with `V`'s [`ParseValue`] implementation.
    pub fn new<I, S>(names: I, access: impl Fn(&mut T) -> &mut V + Send + Sync + 'static) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut setting = Self::with_parser(names, access, default_parser::<V>());
        setting.meta.value_type = V::type_name();
        setting.meta.acceptable_values = V::acceptable_values();
        setting.unescape = V::UNESCAPE;
        setting
    }
}

impl<T> Setting<T, bool> {
    /// Allow the setting without a value, meaning `true`.
    pub fn flag(mut self) -> Self {
        self.meta.flag = true;
        self
    }
}

impl<T, V> Setting<T, V> {
    /// A setting with an explicit conversion function.
    ///
    /// Text is passed to `parser` without unescaping.
    pub fn with_parser<I, S>(
        names: I,
        access: impl Fn(&mut T) -> &mut V + Send + Sync + 'static,
        parser: ValueParser<V>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            meta: SettingMeta::new(names, short_type_name::<V>()),
            access: Box::new(access),
            parser,
            unescape: false,
            validation: None,
            default: None,
            reset: None,
        }
    }

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

    /// Number of argument units to claim per occurrence.
    pub fn max_args(mut self, max_args: usize) -> Self {
        self.meta.max_args = max_args;
        self
    }

    /// Value used by `apply_defaults`, `reset`, and the `default` keyword.
    pub fn default_value(mut self, value: V) -> Self {
        self.default = Some(value);
        self
    }

    /// Reject converted values for which `check` returns an error message.
    pub fn validate(
        mut self,
        check: impl Fn(&V) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validation = Some(Box::new(check));
        self
    }

    /// Compute the reset value from the current one.
    pub fn reset_with(mut self, factory: impl Fn(&V) -> V + Send + Sync + 'static) -> Self {
        self.reset = Some(Box::new(factory));
        self
    }
}

impl<T, V> BoundSetting<T> for Setting<T, V>
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

        let unescaped;
        let text = if self.unescape {
            unescaped = unescape(text, &cx.style);
            unescaped.as_str()
        } else {
            text
        };

        let value = convert(&self.parser, text, cx, name)?;
        check(self.validation.as_ref(), &value, text, name)?;
        *(self.access)(target) = value;
        Ok(SettingOutcome::success(name, text, "Successfully set."))
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
        let slot = (self.access)(target);
        if let Some(factory) = &self.reset {
            *slot = factory(slot);
        } else if let Some(default) = &self.default {
            *slot = default.clone();
        }
    }
}

pub(crate) fn rejected(setting: &str, value: &str, code: &'static str, message: &str) -> SetError {
    SetError::Rejected(SettingOutcome::failure(setting, value, code, message))
}

/// Run `parser`, mapping failures onto the setting.
pub(crate) fn convert<V>(
    parser: &ValueParser<V>,
    text: &str,
    cx: &ParseContext<'_>,
    name: &str,
) -> Result<V, SetError> {
    parser(text, cx).map_err(|e| match e {
        ConvertError::Invalid(reason) => rejected(
            name,
            text,
            codes::CONVERSION_FAILED,
            &format!("Unable to convert: {reason}."),
        ),
        ConvertError::Unset(needed) => rejected(name, text, codes::SETTING_NOT_SET, &needed),
        ConvertError::Abort(err) => SetError::Abort(err),
    })
}

pub(crate) fn check<V>(
    validation: Option<&Validation<V>>,
    value: &V,
    text: &str,
    name: &str,
) -> Result<(), SetError> {
    match validation.map(|f| f(value)) {
        Some(Err(reason)) => Err(rejected(name, text, codes::VALIDATION_FAILED, &reason)),
        _ => Ok(()),
    }
}

pub(crate) fn short_type_name<V>() -> &'static str {
    let full = std::any::type_name::<V>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::QuoteStyle;

    #[derive(Default)]
    struct Target {
        name: String,
        count: i32,
        on: bool,
    }

    fn cx() -> ParseContext<'static> {
        ParseContext {
            depth: 0,
            style: QuoteStyle {
                quotes: &['"'],
                escape: Some('\\'),
            },
        }
    }

    #[test]
    fn names_are_deduplicated_in_order() {
        let s = Setting::new(["Name", "n", "Name", "nm"], |t: &mut Target| &mut t.name);
        assert_eq!(s.meta().names, vec!["Name", "n", "nm"]);
        assert_eq!(s.meta().names_line(), "Name (n, nm)");
        assert_eq!(s.meta().to_string(), "Name (string)");
    }

    #[test]
    fn strings_are_unescaped() {
        let s = Setting::new(["Name"], |t: &mut Target| &mut t.name);
        let mut t = Target::default();
        s.try_set(&mut t, Some(r#"-Name \"Test Value\""#), &cx()).unwrap();
        assert_eq!(t.name, r#"-Name "Test Value""#);
    }

    #[test]
    fn conversion_and_validation_failures_are_rejections() {
        let s = Setting::new(["Count"], |t: &mut Target| &mut t.count)
            .validate(|v| if *v > 0 { Ok(()) } else { Err("Must be positive.".into()) });
        let mut t = Target::default();

        let Err(SetError::Rejected(o)) = s.try_set(&mut t, Some("x"), &cx()) else {
            panic!("expected rejection");
        };
        assert_eq!(o.code, Some(codes::CONVERSION_FAILED));

        let Err(SetError::Rejected(o)) = s.try_set(&mut t, Some("-1"), &cx()) else {
            panic!("expected rejection");
        };
        assert_eq!(o.code, Some(codes::VALIDATION_FAILED));
        assert_eq!(o.to_string(), "Must be positive. (Count, -1)");
        assert_eq!(t.count, 0);

        assert!(s.try_set(&mut t, None, &cx()).is_err());
    }

    #[test]
    fn default_keyword_uses_configured_default() {
        let s = Setting::new(["Count"], |t: &mut Target| &mut t.count).default_value(7);
        let mut t = Target { count: 1, ..Target::default() };
        s.try_set(&mut t, Some("DEFAULT"), &cx()).unwrap();
        assert_eq!(t.count, 7);

        let bare = Setting::new(["Count"], |t: &mut Target| &mut t.count);
        assert!(bare.try_set(&mut t, Some("default"), &cx()).is_err());
    }

    #[test]
    fn reset_prefers_factory_then_default() {
        let mut t = Target { count: 5, ..Target::default() };
        Setting::new(["Count"], |t: &mut Target| &mut t.count)
            .reset_with(|v| v * 2)
            .reset(&mut t);
        assert_eq!(t.count, 10);
        Setting::new(["Count"], |t: &mut Target| &mut t.count)
            .default_value(3)
            .reset(&mut t);
        assert_eq!(t.count, 3);
    }

    #[test]
    fn flags_are_bool_only_and_list_values() {
        let s = Setting::new(["On"], |t: &mut Target| &mut t.on).flag();
        assert!(s.meta().flag);
        assert_eq!(s.meta().information(), "On: \nAcceptable values: true, false");
    }

    #[test]
    fn custom_parser_names_the_type() {
        let s: Setting<Target, i32> = Setting::with_parser(
            ["Count"],
            |t: &mut Target| &mut t.count,
            std::sync::Arc::new(|text: &str, _: &ParseContext<'_>| {
                Ok(i32::try_from(text.len()).unwrap_or(i32::MAX))
            }),
        );
        let mut t = Target::default();
        s.try_set(&mut t, Some("abcd"), &cx()).unwrap();
        assert_eq!(t.count, 4);
        assert_eq!(s.meta().value_type, "i32");
    }
}

//! Setting-name lookup and prefix stripping.

use std::collections::HashMap;

use crate::error::SchemaError;

/// How a token's prefix is treated when resolving it to a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrefixState {
    /// The token must start with one of the prefixes; it is stripped before lookup.
    #[default]
    Required,
    /// A prefix is stripped when present; otherwise the token is used as is.
    Optional,
    /// The token is used as is.
    NotPrefixed,
}

/// Strip the first matching prefix from `token`, comparing case-insensitively.
///
/// Prefixes are tried in order, so with `["-", "--"]` the token `--a`
/// yields `-a`. Callers that want the longest match should order the list
/// accordingly; the resolver instead retries lookup for every prefix.
pub fn deprefix<'t>(token: &'t str, prefixes: &[String]) -> Option<&'t str> {
    prefixes
        .iter()
        .find_map(|p| strip_prefix_ignore_case(token, p))
}

fn strip_prefix_ignore_case<'t>(token: &'t str, prefix: &str) -> Option<&'t str> {
    let head = token.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &token[prefix.len()..])
}

/// Case-insensitive map from every name and alias to a setting handle.
#[derive(Debug, Clone)]
pub struct NameIndex<H> {
    names: HashMap<String, H>,
}

impl<H> Default for NameIndex<H> {
    fn default() -> Self {
        Self {
            names: HashMap::new(),
        }
    }
}

impl<H: Clone> NameIndex<H> {
    /// Empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` under every name in `names`.
    ///
    /// Fails without modifying the index if any name (ignoring case) is
    /// already taken.
    pub fn insert<S: AsRef<str>>(&mut self, names: &[S], handle: H) -> Result<(), SchemaError> {
        if names.is_empty() {
            return Err(SchemaError::NoNames);
        }
        if let Some(taken) = self.first_taken(names) {
            return Err(SchemaError::DuplicateName {
                name: taken.to_string(),
            });
        }
        self.insert_unchecked(names, handle);
        Ok(())
    }

    /// The first of `names` (ignoring case) that is already registered.
    pub fn first_taken<'n, S: AsRef<str>>(&self, names: &'n [S]) -> Option<&'n str> {
        names
            .iter()
            .map(AsRef::as_ref)
            .find(|n| self.names.contains_key(&n.to_lowercase()))
    }

    /// Register `handle` without checking for taken names.
    pub(crate) fn insert_unchecked<S: AsRef<str>>(&mut self, names: &[S], handle: H) {
        for name in names {
            self.names.insert(name.as_ref().to_lowercase(), handle.clone());
        }
    }

    /// Exact (case-insensitive) lookup, no prefix handling.
    pub fn get(&self, name: &str) -> Option<&H> {
        self.names.get(&name.to_lowercase())
    }

    /// Number of registered names, aliases included.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no names are registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Resolve `token` to a setting handle under the given prefix rule.
///
/// In [`PrefixState::Required`] mode each prefix that matches is stripped in
/// turn and the remainder looked up, so `--name` resolves under
/// `["-", "--"]` even though `-` matches first.
pub fn resolve<'i, H: Clone>(
    token: &str,
    prefixes: &[String],
    state: PrefixState,
    index: &'i NameIndex<H>,
) -> Option<&'i H> {
    let stripped = || {
        prefixes
            .iter()
            .filter_map(|p| strip_prefix_ignore_case(token, p))
            .find_map(|rest| index.get(rest))
    };
    match state {
        PrefixState::Required => stripped(),
        PrefixState::Optional => stripped().or_else(|| index.get(token)),
        PrefixState::NotPrefixed => index.get(token),
    }
}

//! Grouping argument spans into `(setting, text)` entries.
//!
//! The mapper walks the span stream once. At depth zero each unquoted span
//! is offered to a resolver; a hit starts a new setting, a miss becomes
//! argument text for the current setting or, with no setting active, an
//! unused entry. Inside a quoted region everything is argument text.

use argmap_diagnostics::Span;
use tracing::{debug, trace};

use crate::config::ParseOptions;
use crate::error::ParseError;
use crate::tokenize::ArgSpan;

/// Capabilities the mapper needs from a setting handle.
pub trait SettingHandle: Clone {
    /// Boolean toggle that may appear without a value.
    fn is_flag(&self) -> bool;

    /// Maximum number of argument units the setting claims.
    fn max_args(&self) -> usize {
        1
    }
}

/// One `(setting, argument text)` pairing, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry<H> {
    /// The setting that claimed the text; `None` for unused text.
    pub setting: Option<H>,
    /// Accumulated argument text; `None` when the setting took no argument.
    pub text: Option<String>,
    /// Source range of the text, or of the setting token when there is no text.
    pub span: Span,
}

impl<H> MappingEntry<H> {
    /// Whether no setting claimed this entry.
    pub fn is_unused(&self) -> bool {
        self.setting.is_none()
    }
}

// ─── Mapper Mode State Machine ──────────────────────────────────────────────

enum Mode<H> {
    /// No setting active; text that arrives is unused.
    Idle,
    /// A setting was named and is collecting up to `max_args` units.
    Accumulating {
        setting: H,
        /// Units claimed so far.
        taken: usize,
    },
}

// ─── Public API ─────────────────────────────────────────────────────────────

/// Group `spans` into mapping entries using `resolve` to recognise setting names.
///
/// Only unquoted spans at depth zero are offered to `resolve`. Returns
/// [`ParseError::UnbalancedQuotes`] when depth is non-zero at the end and
/// `options.throw_on_unbalanced_quotes` is set.
pub fn map_args<H, F>(
    spans: &[ArgSpan<'_>],
    resolve: F,
    options: &ParseOptions,
) -> Result<Vec<MappingEntry<H>>, ParseError>
where
    H: SettingHandle,
    F: FnMut(&str) -> Option<H>,
{
    Mapper::new(options.primary_quote()).run(spans, resolve, options.throw_on_unbalanced_quotes)
}

// ─── Mapper Implementation ─────────────────────────────────────────────────

struct Mapper<H> {
    mode: Mode<H>,
    text: Option<String>,
    text_range: Option<Span>,
    token_range: Option<Span>,
    depth: isize,
    quote: char,
    out: Vec<MappingEntry<H>>,
}

impl<H: SettingHandle> Mapper<H> {
    fn new(quote: char) -> Self {
        Self {
            mode: Mode::Idle,
            text: None,
            text_range: None,
            token_range: None,
            depth: 0,
            quote,
            out: Vec::new(),
        }
    }

    fn run<F>(
        mut self,
        spans: &[ArgSpan<'_>],
        mut resolve: F,
        throw_on_unbalanced: bool,
    ) -> Result<Vec<MappingEntry<H>>, ParseError>
    where
        F: FnMut(&str) -> Option<H>,
    {
        for span in spans {
            self.step(span, &mut resolve);
        }

        if self.depth != 0 {
            if throw_on_unbalanced {
                return Err(ParseError::UnbalancedQuotes { depth: self.depth });
            }
            trace!(depth = self.depth, "unbalanced quotes ignored");
        }
        self.flush();

        debug!(spans = spans.len(), entries = self.out.len(), "mapped arguments");
        Ok(self.out)
    }

    fn step<F>(&mut self, span: &ArgSpan<'_>, resolve: &mut F)
    where
        F: FnMut(&str) -> Option<H>,
    {
        let before = self.depth;
        self.depth += span.depth_delta();

        // ── Inside a quoted region ──────────────────────────────────────
        if before != 0 {
            self.append(span, before);
            if self.depth == 0 {
                trace!(text = span.text, "quoted region closed");
                self.finish_argument();
            }
            return;
        }

        // ── Boundary point ──────────────────────────────────────────────
        if !span.is_quoted()
            && let Some(setting) = resolve(span.text)
        {
            trace!(token = span.text, "setting recognised");
            self.flush();
            self.start(setting, span.range);
            return;
        }

        if let Mode::Accumulating { setting, taken: 0 } = &self.mode
            && setting.is_flag()
            && !(self.depth == 0 && is_bool_literal(span.text))
        {
            trace!(text = span.text, "flag takes no value");
            self.flush();
        }

        self.append(span, before);
        if self.depth == 0 {
            self.finish_argument();
        } else {
            trace!(depth = self.depth, "quoted region opened");
        }
    }

    fn start(&mut self, setting: H, range: Span) {
        let immediate = setting.max_args() == 0;
        self.mode = Mode::Accumulating { setting, taken: 0 };
        self.token_range = Some(range);
        if immediate {
            self.flush();
        }
    }

    /// Append a unit to the pending text.
    ///
    /// Quote markers of the outermost region are dropped; markers of deeper
    /// levels are written back so a nested parse still sees them.
    fn append(&mut self, span: &ArgSpan<'_>, before: isize) {
        let lead = span.opens - usize::from(before == 0 && span.opens > 0);
        let trail = span.closes - usize::from(self.depth == 0 && span.closes > 0);

        let text = self.text.get_or_insert_with(String::new);
        if !text.is_empty() {
            text.push(' ');
        }
        text.extend(std::iter::repeat_n(self.quote, lead));
        text.push_str(span.text);
        text.extend(std::iter::repeat_n(self.quote, trail));
        self.text_range = Some(self.text_range.map_or(span.range, |r| r.cover(span.range)));
    }

    /// One argument unit is complete.
    fn finish_argument(&mut self) {
        let complete = match &mut self.mode {
            Mode::Idle => true,
            Mode::Accumulating { setting, taken } => {
                *taken += 1;
                *taken >= setting.max_args()
            }
        };
        if complete {
            self.flush();
        }
    }

    /// Emit whatever is pending and return to idle.
    fn flush(&mut self) {
        match std::mem::replace(&mut self.mode, Mode::Idle) {
            Mode::Accumulating { setting, .. } => self.emit(Some(setting)),
            Mode::Idle if self.text.is_some() => self.emit(None),
            Mode::Idle => {}
        }
    }

    fn emit(&mut self, setting: Option<H>) {
        let span = self
            .text_range
            .take()
            .or(self.token_range)
            .unwrap_or(Span::empty(0));
        self.token_range = None;
        self.out.push(MappingEntry {
            setting,
            text: self.text.take(),
            span,
        });
    }
}

fn is_bool_literal(text: &str) -> bool {
    text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false")
}

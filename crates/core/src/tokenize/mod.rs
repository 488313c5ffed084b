//! Quote-aware splitting of argument strings.
//!
//! Two entry points produce the same [`ArgSpan`] stream:
//!
//! - [`split_like_command_line`] takes one raw string and locates quoted
//!   regions itself, so `-Name "a b"` yields two spans.
//! - [`spans_from_args`] takes arguments a shell already split and only
//!   records which of them open or close a quote level.
//!
//! The mapper consumes either stream identically.

mod assemble;
mod quotes;

pub use assemble::assemble;
pub(crate) use quotes::ends_with_unescaped_quote;
pub use quotes::{Boundary, QuoteStyle, quote_indices, unescape};

use argmap_diagnostics::Span;
use tracing::trace;

use crate::config::ParseOptions;
use crate::error::ParseError;

/// One argument unit, borrowed from the input it was cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgSpan<'a> {
    /// Argument text, without the outer quote characters.
    pub text: &'a str,
    /// Quote levels opened by the unit's leading quotes.
    pub opens: usize,
    /// Quote levels closed by the unit's trailing quotes.
    pub closes: usize,
    /// Byte range in the input, including any outer quotes.
    pub range: Span,
}

impl<'a> ArgSpan<'a> {
    /// An unquoted unit.
    pub fn bare(text: &'a str, range: Span) -> Self {
        Self {
            text,
            opens: 0,
            closes: 0,
            range,
        }
    }

    /// A unit enclosed in a matched pair of quotes.
    pub fn quoted(text: &'a str, range: Span) -> Self {
        Self {
            text,
            opens: 1,
            closes: 1,
            range,
        }
    }

    /// The unit began with an opening quote.
    pub fn opened_quote(&self) -> bool {
        self.opens > 0
    }

    /// The unit ended with a closing quote.
    pub fn closed_quote(&self) -> bool {
        self.closes > 0
    }

    /// Whether either side of the unit touched a quote.
    pub fn is_quoted(&self) -> bool {
        self.opened_quote() || self.closed_quote()
    }

    /// Change in quote depth contributed by this unit.
    ///
    /// Units quoted equally on both sides are self-contained and contribute
    /// nothing.
    pub fn depth_delta(&self) -> isize {
        self.opens as isize - self.closes as isize
    }
}

/// Split a raw string the way a command line would be split.
///
/// Leading and trailing whitespace is ignored. Ranges on the returned spans
/// are byte offsets into `input` itself.
///
/// ```
/// use argmap_core::{ParseOptions, tokenize::split_like_command_line};
///
/// let spans = split_like_command_line(r#"-Name "Test Value" -Count 3"#, &ParseOptions::default())?;
/// let texts: Vec<&str> = spans.iter().map(|s| s.text).collect();
/// assert_eq!(texts, ["-Name", "Test Value", "-Count", "3"]);
/// # Ok::<(), argmap_core::ParseError>(())
/// ```
pub fn split_like_command_line<'a>(
    input: &'a str,
    options: &ParseOptions,
) -> Result<Vec<ArgSpan<'a>>, ParseError> {
    let lead = input.len() - input.trim_start().len();
    let trimmed = input.trim();
    let style = options.quote_style();

    let starts = quote_indices(trimmed, &style, Boundary::Start);
    let ends = quote_indices(trimmed, &style, Boundary::End);
    trace!(?starts, ?ends, "quote indices");

    let mut spans = assemble(trimmed, &starts, &ends)?;
    if lead > 0 {
        for span in &mut spans {
            span.range = Span::new(span.range.start + lead, span.range.end + lead);
        }
    }
    Ok(spans)
}

/// Wrap arguments a shell already split.
///
/// Every leading quote opens a quote level and every unescaped trailing
/// quote closes one, so `y""` closes two levels; the quote characters are
/// stripped. An argument made only of quotes opens one level and closes the
/// rest. Ranges assume the arguments were joined with single spaces. Empty
/// units are dropped unless they still move depth.
pub fn spans_from_args<'a, S: AsRef<str>>(args: &'a [S], options: &ParseOptions) -> Vec<ArgSpan<'a>> {
    let style = options.quote_style();
    let mut out = Vec::with_capacity(args.len());
    let mut offset = 0usize;

    for arg in args {
        let raw = arg.as_ref();
        let range = Span::new(offset, offset + raw.len());
        offset += raw.len() + 1;

        let (text, opens, closes) = strip_quote_runs(raw, &style);
        if text.trim().is_empty() && opens == closes {
            continue;
        }
        out.push(ArgSpan {
            text,
            opens,
            closes,
            range,
        });
    }
    out
}

/// Strip the leading quote run and the unescaped trailing quote run.
fn strip_quote_runs<'a>(raw: &'a str, style: &QuoteStyle<'_>) -> (&'a str, usize, usize) {
    let body = raw.trim_start_matches(|c: char| style.is_quote(c));
    if body.is_empty() {
        let n = raw.chars().count();
        return (body, n.min(1), n.saturating_sub(1));
    }
    let opens = raw[..raw.len() - body.len()].chars().count();

    let mut text = body;
    let mut closes = 0;
    loop {
        match text.chars().next_back() {
            Some(last) if ends_with_unescaped_quote(text, style) => {
                text = &text[..text.len() - last.len_utf8()];
                closes += 1;
            }
            _ => break,
        }
    }
    (text, opens, closes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(spans: &[ArgSpan<'a>]) -> Vec<&'a str> {
        spans.iter().map(|s| s.text).collect()
    }

    #[test]
    fn ranges_are_relative_to_untrimmed_input() {
        let input = "   -a \"b c\"";
        let spans = split_like_command_line(input, &ParseOptions::default()).unwrap();
        assert_eq!(texts(&spans), vec!["-a", "b c"]);
        assert_eq!(&input[spans[0].range.start..spans[0].range.end], "-a");
        assert_eq!(&input[spans[1].range.start..spans[1].range.end], "\"b c\"");
    }

    #[test]
    fn empty_and_blank_input_yield_nothing() {
        let o = ParseOptions::default();
        assert!(split_like_command_line("", &o).unwrap().is_empty());
        assert!(split_like_command_line("  \t ", &o).unwrap().is_empty());
    }

    #[test]
    fn mismatch_propagates() {
        let err = split_like_command_line("-a \"b", &ParseOptions::default()).unwrap_err();
        assert!(err.is_quote_mismatch());
    }

    #[test]
    fn pre_split_args_track_quote_levels() {
        let args = ["-Name", "\"first", "middle", "last\"", "\"whole\""];
        let spans = spans_from_args(&args, &ParseOptions::default());
        assert_eq!(texts(&spans), vec!["-Name", "first", "middle", "last", "whole"]);
        let deltas: Vec<isize> = spans.iter().map(ArgSpan::depth_delta).collect();
        assert_eq!(deltas, vec![0, 1, 0, -1, 0]);
        assert!(spans[4].opened_quote() && spans[4].closed_quote());
    }

    #[test]
    fn pre_split_escaped_trailing_quote_does_not_close() {
        let args = [r#"say\""#];
        let spans = spans_from_args(&args, &ParseOptions::default());
        assert!(!spans[0].closed_quote());
        assert_eq!(spans[0].text, r#"say\""#);
    }

    #[test]
    fn pre_split_drops_empty_but_keeps_lone_quote() {
        let args = ["", "\"\"", "\""];
        let spans = spans_from_args(&args, &ParseOptions::default());
        assert_eq!(spans.len(), 1);
        assert!(spans[0].opened_quote());
        assert!(!spans[0].closed_quote());
    }

    #[test]
    fn pre_split_quote_runs_count_every_level() {
        let args = [r#"""-a"#, r#"b"""#, r#"c\"""#, r#"""""#];
        let spans = spans_from_args(&args, &ParseOptions::default());
        assert_eq!(texts(&spans), vec!["-a", "b", r#"c\""#, ""]);
        let levels: Vec<(usize, usize)> = spans.iter().map(|s| (s.opens, s.closes)).collect();
        assert_eq!(levels, vec![(2, 0), (0, 2), (0, 1), (1, 2)]);
    }
}

/// Quote and escape characters in effect for one tokenization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteStyle<'a> {
    /// Characters that open and close quoted regions.
    pub quotes: &'a [char],
    /// Escape character, or `None` when escaping is disabled.
    pub escape: Option<char>,
}

impl QuoteStyle<'_> {
    /// Whether `c` is one of the quote characters.
    pub fn is_quote(&self, c: char) -> bool {
        self.quotes.contains(&c)
    }
}

/// Which side of a quoted region a quote character may delimit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Opens a region: preceded by whitespace or the start of input.
    Start,
    /// Closes a region: followed by whitespace, another quote, or the end of input.
    End,
}

impl Boundary {
    /// Placement rule for a quote character with the given neighbours.
    pub fn accepts(self, style: &QuoteStyle<'_>, prev: Option<char>, next: Option<char>) -> bool {
        match self {
            Boundary::Start => prev.is_none_or(char::is_whitespace),
            Boundary::End => next.is_none_or(|n| n.is_whitespace() || style.is_quote(n)),
        }
    }
}

/// Byte offsets of every quote character in `input` that may act as `boundary`.
///
/// Single left-to-right pass. Quotes immediately preceded by the escape
/// character are literal and never recorded. Offsets are ascending; no
/// pairing happens here, so the start and end lists may overlap (see
/// [`assemble`](fn@super::assemble) for how shared offsets are split).
pub fn quote_indices(input: &str, style: &QuoteStyle<'_>, boundary: Boundary) -> Vec<usize> {
    let mut out = Vec::new();
    let mut prev: Option<char> = None;
    let mut chars = input.char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);
        let escaped = style.escape.is_some_and(|e| prev == Some(e));
        if style.is_quote(c) && !escaped && boundary.accepts(style, prev, next) {
            out.push(offset);
        }
        prev = Some(c);
    }
    out
}

/// Replace every escaped quote (`\"`) with the bare quote character.
pub fn unescape(text: &str, style: &QuoteStyle<'_>) -> String {
    let Some(escape) = style.escape else {
        return text.to_string();
    };
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == escape
            && let Some(&q) = chars.peek()
            && style.is_quote(q)
        {
            continue;
        }
        out.push(c);
    }
    out
}

/// Whether the last character of `text` is a quote not preceded by the escape.
pub(crate) fn ends_with_unescaped_quote(text: &str, style: &QuoteStyle<'_>) -> bool {
    let mut rev = text.chars().rev();
    match (rev.next(), rev.next()) {
        (Some(last), before) if style.is_quote(last) => {
            !(style.escape.is_some() && before == style.escape)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DQ: &[char] = &['"'];

    fn style() -> QuoteStyle<'static> {
        QuoteStyle {
            quotes: DQ,
            escape: Some('\\'),
        }
    }

    #[test]
    fn start_quotes_need_leading_whitespace() {
        let input = r#""a b" x"y "z""#;
        assert_eq!(quote_indices(input, &style(), Boundary::Start), vec![0, 10]);
    }

    #[test]
    fn end_quotes_need_trailing_whitespace_quote_or_eof() {
        let input = r#""a b" x"y "z""#;
        assert_eq!(quote_indices(input, &style(), Boundary::End), vec![4, 12]);
    }

    #[test]
    fn adjacent_closing_quotes_both_count_as_ends() {
        // `x""` closes two levels at once.
        let input = r#""a "x"""#;
        assert_eq!(quote_indices(input, &style(), Boundary::End), vec![5, 6]);
        assert_eq!(quote_indices(input, &style(), Boundary::Start), vec![0, 3]);
    }

    #[test]
    fn escaped_quotes_are_never_boundaries() {
        let input = r#""a \"b\" c""#;
        assert_eq!(quote_indices(input, &style(), Boundary::Start), vec![0]);
        assert_eq!(quote_indices(input, &style(), Boundary::End), vec![10]);
    }

    #[test]
    fn escaping_can_be_disabled() {
        let s = QuoteStyle {
            quotes: DQ,
            escape: None,
        };
        // `\"` at the end now closes.
        assert_eq!(quote_indices(r#""a\""#, &s, Boundary::End), vec![3]);
        assert!(quote_indices(r#""a\""#, &style(), Boundary::End).is_empty());
    }

    #[test]
    fn multibyte_text_reports_byte_offsets() {
        let input = "é \"ü\"";
        assert_eq!(quote_indices(input, &style(), Boundary::Start), vec![3]);
        assert_eq!(quote_indices(input, &style(), Boundary::End), vec![6]);
    }

    #[test]
    fn extra_quote_chars_are_honored() {
        let s = QuoteStyle {
            quotes: &['"', '\''],
            escape: Some('\\'),
        };
        assert_eq!(quote_indices("'a' \"b\"", &s, Boundary::Start), vec![0, 4]);
    }

    #[test]
    fn unescape_only_touches_escaped_quotes() {
        assert_eq!(unescape(r#"-Name \"Test Value\""#, &style()), r#"-Name "Test Value""#);
        assert_eq!(unescape(r"C:\dir\file", &style()), r"C:\dir\file");
    }

    #[test]
    fn trailing_quote_detection_respects_escape() {
        assert!(ends_with_unescaped_quote("abc\"", &style()));
        assert!(!ends_with_unescaped_quote("abc\\\"", &style()));
        assert!(!ends_with_unescaped_quote("abc", &style()));
        assert!(ends_with_unescaped_quote("\"", &style()));
    }
}

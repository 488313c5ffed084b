use argmap_diagnostics::Span;

use super::ArgSpan;
use crate::error::ParseError;

/// A quote offset after start/end roles have been settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Open(usize),
    Close(usize),
}

/// Pair quote offsets and cut `input` into spans.
///
/// `starts` and `ends` come from [`quote_indices`](super::quote_indices) and
/// must be ascending. Unquoted text is split on whitespace; each quoted
/// region, including any quotes nested inside it, becomes a single span
/// whose text excludes the outer quote characters. A region that covers the
/// whole input is additionally trimmed. Regions with only whitespace inside
/// are dropped.
///
/// Pairing is outermost-first: an opening quote is matched with the first
/// closing quote at which the number of closes seen equals the number of
/// opens seen, so `"-Name "Test Value""` pairs the first quote with the last.
pub fn assemble<'a>(
    input: &'a str,
    starts: &[usize],
    ends: &[usize],
) -> Result<Vec<ArgSpan<'a>>, ParseError> {
    let quotes = settle_roles(starts, ends)?;
    let mut spans = Vec::new();
    let mut cursor = 0usize;
    let mut i = 0usize;

    while i < quotes.len() {
        let Quote::Open(open) = quotes[i] else {
            // A close with nothing open.
            return Err(mismatch(starts, ends));
        };
        let j = matching_close(&quotes, i).ok_or_else(|| mismatch(starts, ends))?;
        let Quote::Close(close) = quotes[j] else {
            return Err(mismatch(starts, ends));
        };

        push_words(&mut spans, input, cursor, open);

        let after_close = close + char_len(input, close);
        let inner = &input[open + char_len(input, open)..close];
        let whole_input = open == 0 && after_close == input.len();
        let text = if whole_input { inner.trim() } else { inner };
        if !text.trim().is_empty() {
            spans.push(ArgSpan::quoted(text, Span::new(open, after_close)));
        }

        cursor = after_close;
        i = j + 1;
    }

    push_words(&mut spans, input, cursor, input.len());
    Ok(spans)
}

/// Merge the start and end lists, deciding the role of offsets present in both.
///
/// An offset in both lists (e.g. the first quote of `""` after a space) can
/// open or close. Exactly enough of them become opens to make the counts
/// equal; the earliest ones are chosen so depth rises before it falls.
fn settle_roles(starts: &[usize], ends: &[usize]) -> Result<Vec<Quote>, ParseError> {
    #[derive(Clone, Copy)]
    enum Role {
        Start,
        End,
        Either,
    }

    let mut merged: Vec<(usize, Role)> = Vec::with_capacity(starts.len() + ends.len());
    let (mut s, mut e) = (0, 0);
    while s < starts.len() || e < ends.len() {
        match (starts.get(s), ends.get(e)) {
            (Some(&a), Some(&b)) if a == b => {
                merged.push((a, Role::Either));
                s += 1;
                e += 1;
            }
            (Some(&a), Some(&b)) if a < b => {
                merged.push((a, Role::Start));
                s += 1;
            }
            (Some(&a), None) => {
                merged.push((a, Role::Start));
                s += 1;
            }
            (_, Some(&b)) => {
                merged.push((b, Role::End));
                e += 1;
            }
            (None, None) => break,
        }
    }

    let count = |want: fn(Role) -> bool| merged.iter().filter(|(_, r)| want(*r)).count();
    let pure_starts = count(|r| matches!(r, Role::Start));
    let pure_ends = count(|r| matches!(r, Role::End));
    let either = count(|r| matches!(r, Role::Either));

    // pure_starts + opens == pure_ends + (either - opens)
    let surplus = pure_ends + either;
    if surplus < pure_starts || (surplus - pure_starts) % 2 != 0 {
        return Err(mismatch(starts, ends));
    }
    let mut opens = (surplus - pure_starts) / 2;
    if opens > either {
        return Err(mismatch(starts, ends));
    }

    Ok(merged
        .into_iter()
        .map(|(at, role)| match role {
            Role::Start => Quote::Open(at),
            Role::End => Quote::Close(at),
            Role::Either if opens > 0 => {
                opens -= 1;
                Quote::Open(at)
            }
            Role::Either => Quote::Close(at),
        })
        .collect())
}

/// Index of the close that balances the open at `open_idx`.
fn matching_close(quotes: &[Quote], open_idx: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (j, q) in quotes.iter().enumerate().skip(open_idx) {
        match q {
            Quote::Open(_) => depth += 1,
            Quote::Close(_) => {
                depth -= 1;
                if depth == 0 {
                    return Some(j);
                }
            }
        }
    }
    None
}

/// Push each whitespace-delimited word of `input[from..to]` as a bare span.
fn push_words<'a>(out: &mut Vec<ArgSpan<'a>>, input: &'a str, from: usize, to: usize) {
    if from >= to {
        return;
    }
    let mut word_start: Option<usize> = None;
    for (i, c) in input[from..to].char_indices() {
        let at = from + i;
        match (c.is_whitespace(), word_start) {
            (true, Some(s)) => {
                out.push(ArgSpan::bare(&input[s..at], Span::new(s, at)));
                word_start = None;
            }
            (false, None) => word_start = Some(at),
            _ => {}
        }
    }
    if let Some(s) = word_start {
        out.push(ArgSpan::bare(&input[s..to], Span::new(s, to)));
    }
}

fn char_len(input: &str, at: usize) -> usize {
    input[at..].chars().next().map_or(1, char::len_utf8)
}

fn mismatch(starts: &[usize], ends: &[usize]) -> ParseError {
    ParseError::QuoteMismatch {
        starts: starts.len(),
        ends: ends.len(),
    }
}

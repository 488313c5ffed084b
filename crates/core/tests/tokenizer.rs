//! Tokenizer tests: quote indexing, span assembly, and pre-split arguments.

mod common;

use argmap_core::tokenize::{Boundary, quote_indices};
use argmap_core::{ParseError, ParseOptions, Span, spans_from_args, split_like_command_line, unescape};
use common::texts;

fn split(input: &str) -> Vec<&str> {
    let spans = split_like_command_line(input, &ParseOptions::default()).unwrap();
    texts(&spans)
}

// ─── Quote indices ───────────────────────────────────────────────────────────

#[test]
fn start_and_end_positions_follow_neighbours() {
    let o = ParseOptions::default();
    let style = o.quote_style();
    let input = r#"-Name "a b" c"#;
    assert_eq!(quote_indices(input, &style, Boundary::Start), vec![6]);
    assert_eq!(quote_indices(input, &style, Boundary::End), vec![10]);
}

#[test]
fn escaped_quotes_are_never_boundaries() {
    let o = ParseOptions::default();
    let style = o.quote_style();
    let input = r#"say \"hi\" now"#;
    assert!(quote_indices(input, &style, Boundary::Start).is_empty());
    assert!(quote_indices(input, &style, Boundary::End).is_empty());
}

#[test]
fn disabling_escapes_makes_backslash_quotes_real() {
    let o = ParseOptions {
        allow_escaping: false,
        ..ParseOptions::default()
    };
    let style = o.quote_style();
    assert_eq!(quote_indices(r#"a \" b"#, &style, Boundary::End), vec![3]);
}

// ─── Assembly ────────────────────────────────────────────────────────────────

#[test]
fn flat_input_is_a_whitespace_split() {
    assert_eq!(split("  -Name   value\t-Flag  "), vec!["-Name", "value", "-Flag"]);
    assert!(split("   ").is_empty());
}

#[test]
fn quoted_region_is_one_span_without_its_quotes() {
    let input = r#"-Name "Test Value" -Count 3"#;
    let spans = split_like_command_line(input, &ParseOptions::default()).unwrap();
    assert_eq!(texts(&spans), vec!["-Name", "Test Value", "-Count", "3"]);

    let quoted = spans[1];
    assert!(quoted.opened_quote() && quoted.closed_quote());
    assert_eq!(quoted.depth_delta(), 0);
    assert_eq!(&input[quoted.range.start..quoted.range.end], "\"Test Value\"");
    assert!(!spans[0].is_quoted());
}

#[test]
fn nested_quotes_stay_inside_the_outer_span() {
    assert_eq!(
        split(&common::first_str()),
        vec!["-Child", r#"-Name "-Name \"Test Value\"" -Text TestText"#]
    );
}

#[test]
fn two_levels_of_nesting_pair_outermost_first() {
    let second = common::second_str();
    let spans = split(&second);
    assert_eq!(spans.len(), 4);
    assert_eq!(spans[0], "-Parent");
    assert_eq!(spans[1], common::first_str());
    assert_eq!(&spans[2..], ["-Text", "Dog"]);
}

#[test]
fn whole_input_quote_is_one_trimmed_span() {
    let spans = split_like_command_line(r#""  a b c ""#, &ParseOptions::default()).unwrap();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].text, "a b c");
    assert!(spans[0].opened_quote() && spans[0].closed_quote());
}

#[test]
fn separately_paired_outer_quotes_stay_separate_spans() {
    let spans = split_like_command_line(r#""a" "b""#, &ParseOptions::default()).unwrap();
    assert_eq!(texts(&spans), vec!["a", "b"]);
    assert!(spans.iter().all(|s| s.opened_quote() && s.closed_quote()));
    assert_eq!(spans[0].range, Span::new(0, 3));
    assert_eq!(spans[1].range, Span::new(4, 7));
}

#[test]
fn blank_quoted_region_is_dropped() {
    assert_eq!(split(r#"-Name "  " x"#), vec!["-Name", "x"]);
}

#[test]
fn adjacent_empty_quotes_balance() {
    assert_eq!(split(r#"a "" b"#), vec!["a", "b"]);
}

#[test]
fn ranges_point_into_the_untrimmed_input() {
    let input = "   -Name  value";
    let spans = split_like_command_line(input, &ParseOptions::default()).unwrap();
    assert_eq!(spans[0].range, Span::new(3, 8));
    assert_eq!(&input[spans[1].range.start..spans[1].range.end], "value");
}

#[test]
fn unmatched_quote_is_a_mismatch() {
    let err = split_like_command_line(r#"-Name "a b"#, &ParseOptions::default()).unwrap_err();
    assert!(matches!(err, ParseError::QuoteMismatch { .. }), "{err}");
    assert!(err.is_quote_mismatch());

    let err = split_like_command_line(r#"-Name a" b"#, &ParseOptions::default()).unwrap_err();
    assert!(matches!(err, ParseError::QuoteMismatch { .. }), "{err}");
}

#[test]
fn custom_quote_characters() {
    let o = ParseOptions {
        quote_chars: vec!['\'', '"'],
        ..ParseOptions::default()
    };
    let spans = split_like_command_line("-Name 'a b' -Other \"c d\"", &o).unwrap();
    assert_eq!(texts(&spans), vec!["-Name", "a b", "-Other", "c d"]);
}

#[test]
fn multibyte_text_keeps_char_boundaries() {
    assert_eq!(split("-Name \"héllo wörld\" ünïcode"), vec!["-Name", "héllo wörld", "ünïcode"]);
}

// ─── Pre-split arguments ─────────────────────────────────────────────────────

#[test]
fn pre_split_args_record_open_and_close() {
    let args = ["-Name", "\"Test", "Value\"", "\"whole\""];
    let spans = spans_from_args(&args, &ParseOptions::default());
    assert_eq!(texts(&spans), vec!["-Name", "Test", "Value", "whole"]);
    assert_eq!(spans[1].depth_delta(), 1);
    assert_eq!(spans[2].depth_delta(), -1);
    assert_eq!(spans[3].depth_delta(), 0);
    assert!(spans[3].is_quoted());
    assert_eq!(spans[2].range, Span::new(12, 18));
}

#[test]
fn pre_split_escaped_trailing_quote_does_not_close() {
    let args = [r#"say\""#];
    let spans = spans_from_args(&args, &ParseOptions::default());
    assert_eq!(spans[0].text, r#"say\""#);
    assert!(!spans[0].closed_quote());
}

#[test]
fn pre_split_blank_args_are_dropped_but_lone_quotes_kept() {
    let args = ["", "  ", "\""];
    let spans = spans_from_args(&args, &ParseOptions::default());
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].depth_delta(), 1);
}

// ─── Unescape ────────────────────────────────────────────────────────────────

#[test]
fn unescape_strips_escapes_before_quotes_only() {
    let o = ParseOptions::default();
    assert_eq!(unescape(r#"-Name \"Test Value\""#, &o.quote_style()), r#"-Name "Test Value""#);
    assert_eq!(unescape(r"C:\dir\file", &o.quote_style()), r"C:\dir\file");
}

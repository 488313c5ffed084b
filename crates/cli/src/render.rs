//! Pretty diagnostic rendering using ariadne.
//!
//! Diagnostics point at byte ranges of the argument string, so each report
//! is drawn against that string as a one-line source.

use std::io::{self, IsTerminal};

use argmap_diagnostics::{Diagnostic, Severity};
use ariadne::{Color, Config, Fmt, Label, Report, ReportKind, Source};

/// Name shown for the argument string in rendered reports.
pub(crate) const SOURCE_NAME: &str = "<input>";

// ── Output format ───────────────────────────────────────────────────────

/// Output format for command results and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, source-annotated output (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit choice, else pretty on a TTY and JSON when piped.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Severity mapping ────────────────────────────────────────────────────

fn report_kind(severity: &Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Warn => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
        _ => ReportKind::Warning,
    }
}

fn severity_color(severity: &Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warn => Color::Yellow,
        Severity::Info => Color::Blue,
        _ => Color::White,
    }
}

fn severity_word(severity: &Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warn => "warning",
        Severity::Info => "info",
        _ => "diagnostic",
    }
}

// ── Pretty rendering ────────────────────────────────────────────────────

/// Render diagnostics to stderr against `source`.
///
/// Spanned diagnostics get an underlined excerpt; the rest are printed as
/// plain `severity[ID]: message` lines.
pub(crate) fn render_diagnostics(source: &str, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    let config = Config::default().with_compact(false);
    let mut cache = (SOURCE_NAME, Source::from(source));

    for diag in diagnostics {
        let note = context_note(diag);

        let Some(span) = &diag.span else {
            eprintln!("{}[{}]: {}", severity_word(&diag.severity), diag.id, diag.message);
            if let Some(note) = &note {
                eprintln!("  = note: {note}");
            }
            if let Some(explanation) = diag.explain() {
                eprintln!("  = help: {explanation}");
            }
            continue;
        };

        // Spans from pre-split input may run past the joined string.
        let start = span.start.min(source.len());
        let end = span.end.min(source.len()).max(start);

        let mut builder = Report::build(report_kind(&diag.severity), (SOURCE_NAME, start..end))
            .with_code(diag.id.as_ref())
            .with_message(&diag.message)
            .with_config(config)
            .with_label(
                Label::new((SOURCE_NAME, start..end))
                    .with_message(note.clone().unwrap_or_else(|| diag.message.clone()))
                    .with_color(severity_color(&diag.severity)),
            );
        if let Some(explanation) = diag.explain() {
            builder = builder.with_help(explanation);
        }
        builder.finish().eprint(&mut cache).ok();
    }
}

/// `key=value, ...` from the diagnostic context, if it has any entries.
fn context_note(diag: &Diagnostic) -> Option<String> {
    let ctx = diag.context.as_ref().filter(|c| !c.is_empty())?;
    Some(
        ctx.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

// ── Summary line ────────────────────────────────────────────────────────

/// Print a coloured `2 errors, 1 info` line to stderr.
pub(crate) fn print_summary(diagnostics: &[Diagnostic]) {
    let (mut errors, mut warnings, mut infos) = (0usize, 0usize, 0usize);
    for d in diagnostics {
        match d.severity {
            Severity::Error => errors += 1,
            Severity::Info => infos += 1,
            _ => warnings += 1,
        }
    }
    if errors + warnings + infos == 0 {
        return;
    }

    let plural = |n: usize| if n == 1 { "" } else { "s" };
    let mut parts = Vec::new();
    if errors > 0 {
        parts.push(format!("{errors} error{}", plural(errors)).fg(Color::Red).to_string());
    }
    if warnings > 0 {
        parts.push(
            format!("{warnings} warning{}", plural(warnings))
                .fg(Color::Yellow)
                .to_string(),
        );
    }
    if infos > 0 {
        parts.push(format!("{infos} info").fg(Color::Blue).to_string());
    }
    eprintln!("{}", parts.join(", "));
}

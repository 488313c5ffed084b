mod render;

use std::fs;
use std::io::{self, Read};
use std::process;

use anyhow::{Context, Result, bail};
use argmap_core::resolve::resolve;
use argmap_core::{
    ArgSpan, MappingEntry, NameIndex, ParseOptions, PrefixState, SettingHandle, map_args,
    split_like_command_line,
};
use argmap_diagnostics::{self as diag, Diagnostic, Severity, Span, codes};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::render::{Format, print_summary, render_diagnostics};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "argmap",
    version,
    about = "Inspect quote-aware splitting of argument strings and their mapping onto settings"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Path to a JSON file of parse options (quote characters, prefixes, ...).
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Split an argument string into spans. Reads stdin when INPUT is omitted.
    Split {
        #[arg(allow_hyphen_values = true)]
        input: Option<String>,
    },

    /// Group an argument string into (setting, argument) entries.
    Map {
        #[arg(allow_hyphen_values = true)]
        input: Option<String>,
        /// A setting to recognise: `NAME[,ALIAS..][:flag]`. Repeatable.
        #[arg(long = "setting", short = 's', value_name = "SPEC")]
        settings: Vec<String>,
    },

    /// Explain a diagnostic ID (e.g. ARG1001).
    Explain { id: String },
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "argmap=warn".into()))
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output.as_deref());

    if let Err(err) = run(cli.cmd, cli.config.as_deref(), format) {
        match format {
            Format::Json => {
                let out = serde_json::json!({
                    "success": false,
                    "error": "command_failed",
                    "message": format!("{err:#}"),
                });
                println!("{out:#}");
            }
            Format::Pretty => eprintln!("error: {err:#}"),
        }
        process::exit(1);
    }
}

fn run(cmd: Cmd, config: Option<&str>, format: Format) -> Result<()> {
    match cmd {
        Cmd::Split { input } => cmd_split(&read_input(input)?, &load_options(config)?, format),
        Cmd::Map { input, settings } => {
            cmd_map(&read_input(input)?, &settings, &load_options(config)?, format)
        }
        Cmd::Explain { id } => cmd_explain(&id, format),
    }
}

// ── Commands ────────────────────────────────────────────────────────────

/// One span as printed by `split`.
#[derive(Debug, Serialize)]
struct SpanOut<'a> {
    text: &'a str,
    opened_quote: bool,
    closed_quote: bool,
    span: Span,
}

impl<'a> From<&ArgSpan<'a>> for SpanOut<'a> {
    fn from(s: &ArgSpan<'a>) -> Self {
        Self {
            text: s.text,
            opened_quote: s.opened_quote(),
            closed_quote: s.closed_quote(),
            span: s.range,
        }
    }
}

fn cmd_split(input: &str, options: &ParseOptions, format: Format) -> Result<()> {
    let (spans, diagnostics) = match split_like_command_line(input, options) {
        Ok(spans) => (spans, Vec::new()),
        Err(err) => (Vec::new(), vec![err.to_diagnostic()]),
    };
    let spans: Vec<SpanOut<'_>> = spans.iter().map(SpanOut::from).collect();

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "spans": spans,
                "diagnostics": diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            for s in &spans {
                let marker = match (s.opened_quote, s.closed_quote) {
                    (true, true) => " (quoted)",
                    (true, false) => " (opens quote)",
                    (false, true) => " (closes quote)",
                    (false, false) => "",
                };
                println!("{:>4}..{:<4} {}{marker}", s.span.start, s.span.end, s.text);
            }
            render_diagnostics(input, &diagnostics);
            print_summary(&diagnostics);
        }
    }

    exit_on_errors(&diagnostics);
    Ok(())
}

/// A setting declared on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CliSetting {
    name: String,
    flag: bool,
}

impl SettingHandle for CliSetting {
    fn is_flag(&self) -> bool {
        self.flag
    }
}

/// One entry as printed by `map`.
#[derive(Debug, Serialize)]
struct EntryOut<'a> {
    setting: Option<&'a str>,
    text: Option<&'a str>,
    span: Span,
}

impl<'a> From<&'a MappingEntry<CliSetting>> for EntryOut<'a> {
    fn from(e: &'a MappingEntry<CliSetting>) -> Self {
        Self {
            setting: e.setting.as_ref().map(|s| s.name.as_str()),
            text: e.text.as_deref(),
            span: e.span,
        }
    }
}

fn cmd_map(input: &str, specs: &[String], options: &ParseOptions, format: Format) -> Result<()> {
    let mut index = NameIndex::new();
    for spec in specs {
        let (names, setting) = parse_setting_spec(spec)?;
        index
            .insert(&names, setting)
            .with_context(|| format!("invalid --setting '{spec}'"))?;
    }
    debug!(names = index.len(), "settings declared");

    let mapped = split_like_command_line(input, options).and_then(|spans| {
        map_args(
            &spans,
            |token| resolve(token, &options.prefixes, PrefixState::Required, &index).cloned(),
            options,
        )
    });
    let (entries, diagnostics) = match mapped {
        Ok(entries) => {
            let unused = entries
                .iter()
                .filter(|e| e.is_unused())
                .map(unused_diagnostic)
                .collect();
            (entries, unused)
        }
        Err(err) => (Vec::new(), vec![err.to_diagnostic()]),
    };
    let out_entries: Vec<EntryOut<'_>> = entries.iter().map(EntryOut::from).collect();

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "entries": out_entries,
                "diagnostics": diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            for e in &out_entries {
                let setting = e.setting.unwrap_or("(unused)");
                match e.text {
                    Some(text) => println!("{setting} = {text}"),
                    None => println!("{setting}"),
                }
            }
            render_diagnostics(input, &diagnostics);
            print_summary(&diagnostics);
        }
    }

    exit_on_errors(&diagnostics);
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": id,
                "explanation": diag::explain(id),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            use ariadne::Fmt;
            match diag::explain(id) {
                Some(text) => println!("{}: {}", id.fg(ariadne::Color::Cyan), text),
                None => println!("{id}: (no explanation available)"),
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Parse `NAME[,ALIAS..][:flag]` into the names and the handle to register.
fn parse_setting_spec(spec: &str) -> Result<(Vec<String>, CliSetting)> {
    let (names, option) = match spec.split_once(':') {
        Some((names, option)) => (names, Some(option)),
        None => (spec, None),
    };
    let flag = match option {
        None => false,
        Some(o) if o.eq_ignore_ascii_case("flag") => true,
        Some(o) => bail!("unknown option '{o}' in --setting '{spec}' (expected 'flag')"),
    };
    let names: Vec<String> = names
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect();
    let Some(main) = names.first() else {
        bail!("--setting '{spec}' has no name");
    };
    let setting = CliSetting {
        name: main.clone(),
        flag,
    };
    Ok((names, setting))
}

fn unused_diagnostic(entry: &MappingEntry<CliSetting>) -> Diagnostic {
    let text = entry.text.as_deref().unwrap_or_default();
    Diagnostic::error(
        codes::UNUSED_PART,
        format!("'{text}' was not used by any setting"),
        Some(entry.span),
    )
    .with_context([("text".to_string(), text.to_string())].into())
}

/// The INPUT argument, or all of stdin without its trailing newline.
fn read_input(input: Option<String>) -> Result<String> {
    if let Some(input) = input {
        return Ok(input);
    }
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read input from stdin")?;
    Ok(buf.trim_end_matches(['\n', '\r']).to_string())
}

fn load_options(path: Option<&str>) -> Result<ParseOptions> {
    let Some(path) = path else {
        return Ok(ParseOptions::default());
    };
    let json = fs::read_to_string(path).with_context(|| format!("failed to read config file '{path}'"))?;
    ParseOptions::from_json_str(&json).with_context(|| format!("invalid config file '{path}'"))
}

/// Exit with code 1 if any diagnostic is an error.
fn exit_on_errors(diagnostics: &[Diagnostic]) {
    if diagnostics
        .iter()
        .any(|d| matches!(d.severity, Severity::Error))
    {
        process::exit(1);
    }
}

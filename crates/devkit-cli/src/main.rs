//! Command-line front end for `devkit-core`.
//!
//! Every subcommand reads its document from a file or STDIN and writes the
//! result to STDOUT (or `-o FILE`). `devkit diff` exits with status 1 when
//! the inputs differ, like `diff(1)`.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use devkit_core::assist::{
    self, AssistClient, AssistConfig, Provider, SampleKind, DEFAULT_OLLAMA_MODEL,
    DEFAULT_OLLAMA_URL,
};
use devkit_core::format::{self, FormatOptions};
use devkit_core::{
    analyze_json, analyze_xml, compare_json, compare_xml_with, format_bytes, format_json,
    json_stats, json_text_to_xml, json_to_yaml, minify_json, validate_xml, xml_text_to_json,
    yaml_to_json, JsonSizeReport, RenderConfig, XmlSizeReport,
};
use serde_json::{json, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "devkit",
    version,
    about = "Convert, format, and compare XML and JSON documents.",
    propagate_version = true
)]
struct Cli {
    /// Log debug events to STDERR (RUST_LOG takes precedence).
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue, global = true)]
    verbose: bool,

    /// Write output to FILE instead of STDOUT.
    #[arg(short = 'o', long = "output", global = true, value_name = "FILE")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Format, minify, validate, or convert XML.
    Xml {
        #[command(subcommand)]
        action: XmlAction,
    },
    /// Format, minify, or convert JSON.
    Json {
        #[command(subcommand)]
        action: JsonAction,
    },
    /// Show a side-by-side line diff of two documents.
    Diff(DiffArgs),
    /// Repair documents or generate samples with a language model.
    Assist(AssistArgs),
}

#[derive(Debug, Args)]
struct InputArg {
    /// Input file; STDIN when omitted.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum XmlAction {
    /// Pretty-print with one tag per line.
    Format {
        /// Spaces per nesting level (at most 16).
        #[arg(long, default_value_t = 2)]
        indent: usize,
        #[command(flatten)]
        input: InputArg,
    },
    /// Strip whitespace between tags.
    Minify {
        #[command(flatten)]
        input: InputArg,
    },
    /// Check that the input is well-formed.
    Validate {
        #[command(flatten)]
        input: InputArg,
    },
    /// Convert to JSON using the `@attribute` / `#text` convention.
    ToJson {
        #[command(flatten)]
        input: InputArg,
    },
    /// Break the document size down by tags, attributes, content, and comments.
    Stats {
        /// Print the report as JSON.
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
        #[command(flatten)]
        input: InputArg,
    },
}

#[derive(Debug, Subcommand)]
enum JsonAction {
    /// Pretty-print with two-space indentation.
    Format {
        #[command(flatten)]
        input: InputArg,
    },
    /// Remove insignificant whitespace.
    Minify {
        #[command(flatten)]
        input: InputArg,
    },
    /// Convert to XML; a single top-level key becomes the root tag.
    ToXml {
        /// Emit the XML on one line instead of pretty-printing it.
        #[arg(long, action = ArgAction::SetTrue)]
        compact: bool,
        #[command(flatten)]
        input: InputArg,
    },
    /// Count values by kind and break the minified size down.
    Stats {
        /// Print the report as JSON.
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
        #[command(flatten)]
        input: InputArg,
    },
    /// Convert JSON to YAML.
    ToYaml {
        #[command(flatten)]
        input: InputArg,
    },
    /// Convert YAML to JSON.
    FromYaml {
        #[command(flatten)]
        input: InputArg,
    },
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
enum DiffMode {
    /// Compare the raw text.
    #[default]
    Text,
    /// Validate and pretty-print both sides as XML first.
    Xml,
    /// Pretty-print both sides as JSON first.
    Json,
}

#[derive(Debug, Args)]
struct DiffArgs {
    /// Original document.
    original: PathBuf,
    /// Modified document.
    modified: PathBuf,

    /// How to normalize the inputs before diffing.
    #[arg(short = 'm', long = "mode", value_enum, default_value_t = DiffMode::Text)]
    mode: DiffMode,

    /// Shorthand for `--mode xml`.
    #[arg(long, action = ArgAction::SetTrue, conflicts_with_all = ["mode", "json"])]
    xml: bool,

    /// Shorthand for `--mode json`.
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "mode")]
    json: bool,

    /// Render changed lines using ANSI colors.
    #[arg(long, action = ArgAction::SetTrue)]
    color: bool,

    /// Text width of each column.
    #[arg(long, default_value_t = 40)]
    width: usize,

    /// Indentation used when normalizing XML (at most 16).
    #[arg(long, default_value_t = 2)]
    indent: usize,
}

impl DiffArgs {
    fn effective_mode(&self) -> DiffMode {
        if self.xml {
            DiffMode::Xml
        } else if self.json {
            DiffMode::Json
        } else {
            self.mode
        }
    }
}

#[derive(Debug, Args)]
struct AssistArgs {
    /// Backend answering requests (`gemini` or `ollama`).
    #[arg(long, env = "DEVKIT_PROVIDER", default_value = "gemini")]
    provider: Provider,

    /// Base URL of the Ollama server.
    #[arg(long, env = "DEVKIT_OLLAMA_URL", default_value = DEFAULT_OLLAMA_URL)]
    ollama_url: String,

    /// Model requested from Ollama.
    #[arg(long, env = "DEVKIT_OLLAMA_MODEL", default_value = DEFAULT_OLLAMA_MODEL)]
    ollama_model: String,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    action: AssistAction,
}

impl AssistArgs {
    fn config(&self) -> AssistConfig {
        AssistConfig::default()
            .with_provider(self.provider)
            .with_ollama_url(self.ollama_url.as_str())
            .with_ollama_model(self.ollama_model.as_str())
            .with_api_key(self.api_key.as_deref())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum SampleFormat {
    Json,
    Xml,
}

impl From<SampleFormat> for SampleKind {
    fn from(format: SampleFormat) -> Self {
        match format {
            SampleFormat::Json => SampleKind::Json,
            SampleFormat::Xml => SampleKind::Xml,
        }
    }
}

#[derive(Debug, Subcommand)]
enum AssistAction {
    /// Ask the model to repair malformed XML.
    FixXml {
        #[command(flatten)]
        input: InputArg,
    },
    /// Ask the model to repair malformed JSON.
    FixJson {
        #[command(flatten)]
        input: InputArg,
    },
    /// Generate a sample document described by CONTEXT.
    Sample {
        /// Document kind to generate.
        #[arg(long, value_enum, default_value = "json")]
        kind: SampleFormat,
        /// What the sample should describe.
        context: String,
    },
    /// Check that the Ollama server is reachable.
    Ping,
}

fn main() {
    match try_main() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let _ = writeln!(io::stderr(), "error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn try_main() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(command = ?cli.command, "starting devkit");

    let Outcome { text, code } = match &cli.command {
        Command::Xml { action } => run_xml(action)?,
        Command::Json { action } => run_json(action)?,
        Command::Diff(args) => run_diff(args)?,
        Command::Assist(args) => run_assist(args)?,
    };
    emit(cli.output.as_deref(), &text)?;
    Ok(code)
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    // A subscriber may already be installed when running under a test harness.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

/// Text to print and the process exit status.
#[derive(Debug, PartialEq, Eq)]
struct Outcome {
    text: String,
    code: i32,
}

impl Outcome {
    fn ok(text: String) -> Self {
        Self { text, code: 0 }
    }
}

fn run_xml(action: &XmlAction) -> Result<Outcome> {
    let text = match action {
        XmlAction::Format { indent, input } => {
            let source = read_input(input)?;
            format::format_with(&source, &FormatOptions::default().with_indent(*indent))
        }
        XmlAction::Minify { input } => format::minify(&read_input(input)?),
        XmlAction::Validate { input } => {
            validate_xml(&read_input(input)?).context("document is not well-formed")?;
            "valid".to_string()
        }
        XmlAction::ToJson { input } => {
            xml_text_to_json(&read_input(input)?).context("failed to convert XML to JSON")?
        }
        XmlAction::Stats { json, input } => {
            let report = analyze_xml(&read_input(input)?);
            if *json {
                serde_json::to_string_pretty(&report)?
            } else {
                xml_report_table(&report)
            }
        }
    };
    Ok(Outcome::ok(text))
}

fn run_json(action: &JsonAction) -> Result<Outcome> {
    let text = match action {
        JsonAction::Format { input } => format_json(&read_input(input)?)?,
        JsonAction::Minify { input } => minify_json(&read_input(input)?)?,
        JsonAction::ToXml { compact, input } => {
            let xml =
                json_text_to_xml(&read_input(input)?).context("failed to convert JSON to XML")?;
            if *compact {
                xml
            } else {
                format::format(&xml)
            }
        }
        JsonAction::Stats { json, input } => {
            let source = read_input(input)?;
            let value: Value = serde_json::from_str(&source).context("invalid JSON")?;
            let stats = json_stats(&value);
            let size = analyze_json(&source)?;
            if *json {
                serde_json::to_string_pretty(&json!({ "values": stats, "size": size }))?
            } else {
                let counts = [
                    ("objects", stats.objects),
                    ("arrays", stats.arrays),
                    ("strings", stats.strings),
                    ("numbers", stats.numbers),
                    ("booleans", stats.booleans),
                    ("nulls", stats.nulls),
                ];
                let mut table: String = counts
                    .iter()
                    .map(|(label, count)| format!("{label:<11} {count:>10}\n"))
                    .collect();
                table.push('\n');
                table.push_str(&json_report_table(&size));
                table
            }
        }
        JsonAction::ToYaml { input } => json_to_yaml(&read_input(input)?)?,
        JsonAction::FromYaml { input } => yaml_to_json(&read_input(input)?)?,
    };
    Ok(Outcome::ok(text))
}

fn run_diff(args: &DiffArgs) -> Result<Outcome> {
    let original = read_path(&args.original)?;
    let modified = read_path(&args.modified)?;

    let view = match args.effective_mode() {
        DiffMode::Text => devkit_core::compute_side_by_side(&original, &modified),
        DiffMode::Xml => {
            let options = FormatOptions::default().with_indent(args.indent);
            compare_xml_with(&original, &modified, &options)?
        }
        DiffMode::Json => compare_json(&original, &modified)?,
    };

    let config = RenderConfig::default().with_color(args.color).with_width(args.width);
    let code = i32::from(!view.is_identical());
    debug!(
        additions = view.additions(),
        deletions = view.deletions(),
        "diff finished"
    );
    Ok(Outcome { text: view.render(&config), code })
}

fn run_assist(args: &AssistArgs) -> Result<Outcome> {
    let client = AssistClient::new(args.config()).context("failed to build HTTP client")?;
    let text = match &args.action {
        AssistAction::FixXml { input } => assist::fix_xml(&client, &read_input(input)?)?,
        AssistAction::FixJson { input } => assist::fix_json(&client, &read_input(input)?)?,
        AssistAction::Sample { kind, context } => {
            assist::generate_sample(&client, (*kind).into(), context)?
        }
        AssistAction::Ping => {
            let url = client.config().ollama_url().to_string();
            return Ok(if client.test_connection() {
                Outcome::ok(format!("ollama reachable at {url}"))
            } else {
                Outcome { text: format!("ollama unreachable at {url}"), code: 1 }
            });
        }
    };
    Ok(Outcome::ok(text))
}

fn xml_report_table(report: &XmlSizeReport) -> String {
    [
        ("total", report.total),
        ("tags", report.tags),
        ("attributes", report.attributes),
        ("content", report.content),
        ("comments", report.comments),
    ]
    .iter()
    .map(|(label, bytes)| size_row(label, *bytes, report.total))
    .collect()
}

fn json_report_table(report: &JsonSizeReport) -> String {
    [
        ("total", report.total),
        ("keys", report.keys),
        ("strings", report.strings),
        ("numbers", report.numbers),
        ("booleans", report.booleans),
        ("nulls", report.nulls),
        ("syntax", report.syntax),
    ]
    .iter()
    .map(|(label, bytes)| size_row(label, *bytes, report.total))
    .collect()
}

fn size_row(label: &str, bytes: usize, total: usize) -> String {
    let share = if total == 0 { 0.0 } else { bytes as f64 * 100.0 / total as f64 };
    format!("{label:<11} {:>10}  {share:>5.1}%\n", format_bytes(bytes))
}

fn read_input(input: &InputArg) -> Result<String> {
    match &input.file {
        Some(path) => read_path(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("failed to read STDIN")?;
            Ok(buffer)
        }
    }
}

fn read_path(path: &Path) -> Result<String> {
    if path.as_os_str().is_empty() {
        bail!("expected file path; got empty string");
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn emit(output: Option<&Path>, text: &str) -> Result<()> {
    let mut text = text.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    match output {
        Some(path) => fs::write(path, text.as_bytes())
            .with_context(|| format!("failed to write output to {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush().ok();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn diff_shorthand_flags_select_mode() {
        let cli = Cli::try_parse_from(["devkit", "diff", "a", "b", "--xml"]).unwrap();
        let Command::Diff(args) = cli.command else { panic!("expected diff") };
        assert_eq!(args.effective_mode(), DiffMode::Xml);

        let cli = Cli::try_parse_from(["devkit", "diff", "a", "b"]).unwrap();
        let Command::Diff(args) = cli.command else { panic!("expected diff") };
        assert_eq!(args.effective_mode(), DiffMode::Text);
        assert_eq!(args.width, 40);
    }

    #[test]
    fn diff_mode_flags_conflict() {
        assert!(Cli::try_parse_from(["devkit", "diff", "a", "b", "--xml", "--json"]).is_err());
    }

    #[test]
    fn assist_flags_build_config() {
        let cli = Cli::try_parse_from([
            "devkit",
            "assist",
            "--provider",
            "ollama",
            "--ollama-url",
            "http://box:11434/",
            "ping",
        ])
        .unwrap();
        let Command::Assist(args) = cli.command else { panic!("expected assist") };
        let config = args.config();
        assert_eq!(config.provider(), Provider::Ollama);
        assert_eq!(config.ollama_url(), "http://box:11434");
        assert_eq!(config.ollama_model(), DEFAULT_OLLAMA_MODEL);
    }

    #[test]
    fn unknown_provider_is_a_usage_error() {
        assert!(Cli::try_parse_from(["devkit", "assist", "--provider", "x", "ping"]).is_err());
    }

    #[test]
    fn size_rows_report_share() {
        assert_eq!(size_row("tags", 512, 1024), "tags             512 B   50.0%\n");
        assert_eq!(size_row("total", 0, 0), "total              0 B    0.0%\n");
    }
}

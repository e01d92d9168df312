//! Command-line interface for sax-fragments.

use std::collections::HashMap;
use std::io::Write;

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use serde::Serialize;

use crate::config::Settings;
use crate::converters::{
    BooleanConverter, DateConverter, DateTimeConverter, DecimalConverter, IntegerConverter,
    TextConverter,
};
use crate::error::Result;
use crate::extract::{extract_many, Source};
use crate::fragment::handlers::{TreeFragmentHandler, ValueFragmentHandler};
use crate::fragment::{FragmentHandler, MatchPolicy};
use crate::path::{PathCensus, PathSpec};

/// sax-fragments - Extract typed values from streaming XML by element path.
#[derive(Parser)]
#[command(name = "sax-fragments")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the values of every subtree matching one or more paths.
    Extract {
        /// XML file path or http(s) URL
        source: String,

        /// Path to match (e.g., /invoice/date, //item, /{urn:x}a/p:b)
        #[arg(short, long = "path", required = true)]
        paths: Vec<String>,

        /// How matched fragments are converted
        #[arg(short = 't', long = "type", value_enum, default_value_t = ValueType::Text)]
        value_type: ValueType,

        /// strftime format for --type date (default: %Y-%m-%d)
        #[arg(long)]
        date_format: Option<String>,

        /// What happens when an element matches several paths
        #[arg(long, value_enum, default_value_t = PolicyArg::First)]
        policy: PolicyArg,

        /// Namespace prefix binding used in paths (PREFIX=URI)
        #[arg(long = "ns", value_parser = parse_namespace)]
        namespaces: Vec<(String, String)>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },

    /// List every distinct element path in a document with its count.
    Paths {
        /// XML file path or http(s) URL
        source: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValueType {
    Text,
    Date,
    Datetime,
    Integer,
    Decimal,
    Boolean,
    Tree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    First,
    All,
    Reject,
}

impl From<PolicyArg> for MatchPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::First => Self::FirstMatch,
            PolicyArg::All => Self::AllMatches,
            PolicyArg::Reject => Self::RejectAmbiguous,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

/// Values extracted for one path.
#[derive(Serialize)]
struct PathValues<V> {
    path: String,
    values: Vec<V>,
}

fn parse_namespace(arg: &str) -> std::result::Result<(String, String), String> {
    match arg.split_once('=') {
        Some((prefix, uri)) if !prefix.is_empty() && !uri.is_empty() => {
            Ok((prefix.to_string(), uri.to_string()))
        }
        _ => Err(format!("expected PREFIX=URI, got '{arg}'")),
    }
}

/// Run the CLI.
pub fn run(settings: &Settings) -> Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    execute(cli, settings, &mut stdout.lock())
}

/// Execute a parsed command, writing results to `out`.
pub fn execute(cli: Cli, settings: &Settings, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Commands::Extract {
            source,
            paths,
            value_type,
            date_format,
            policy,
            namespaces,
            format,
        } => {
            let request = ExtractRequest {
                source: Source::parse(&source),
                specs: parse_specs(&paths, namespaces)?,
                policy: policy.into(),
                format,
            };
            extract_command(&request, settings, value_type, date_format.as_deref(), out)
        }
        Commands::Paths { source } => paths_command(&Source::parse(&source), settings, out),
    }
}

struct ExtractRequest {
    source: Source,
    specs: Vec<PathSpec>,
    policy: MatchPolicy,
    format: OutputFormat,
}

fn parse_specs(paths: &[String], namespaces: Vec<(String, String)>) -> Result<Vec<PathSpec>> {
    let bindings: HashMap<String, String> = namespaces.into_iter().collect();
    paths
        .iter()
        .map(|p| PathSpec::parse_with_namespaces(p, &bindings))
        .collect()
}

/// Execute the extract command.
fn extract_command(
    request: &ExtractRequest,
    settings: &Settings,
    value_type: ValueType,
    date_format: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    match value_type {
        ValueType::Text => emit(request, settings, out, || {
            ValueFragmentHandler::new(TextConverter)
        }),
        ValueType::Date => {
            let converter = match date_format {
                Some(format) => DateConverter::with_format(format)?,
                None => DateConverter::default(),
            };
            emit(request, settings, out, || {
                ValueFragmentHandler::new(converter.clone())
            })
        }
        ValueType::Datetime => emit(request, settings, out, || {
            ValueFragmentHandler::new(DateTimeConverter)
        }),
        ValueType::Integer => emit(request, settings, out, || {
            ValueFragmentHandler::new(IntegerConverter)
        }),
        ValueType::Decimal => emit(request, settings, out, || {
            ValueFragmentHandler::new(DecimalConverter)
        }),
        ValueType::Boolean => emit(request, settings, out, || {
            ValueFragmentHandler::new(BooleanConverter)
        }),
        ValueType::Tree => emit(request, settings, out, TreeFragmentHandler::new),
    }
}

fn emit<H, F>(
    request: &ExtractRequest,
    settings: &Settings,
    out: &mut impl Write,
    make_handler: F,
) -> Result<()>
where
    H: FragmentHandler,
    H::Value: Serialize,
    F: Fn() -> H,
{
    let results = extract_many(
        &request.source,
        settings,
        request.specs.clone(),
        request.policy,
        make_handler,
    )?;

    for (spec, values) in &results {
        if values.is_empty() {
            eprintln!(
                "{} no elements matched {}",
                style("Warning:").for_stderr().yellow().bold(),
                style(spec).for_stderr().cyan()
            );
        }
    }

    let report: Vec<PathValues<H::Value>> = results
        .into_iter()
        .map(|(spec, values)| PathValues {
            path: spec.to_string(),
            values,
        })
        .collect();

    let rendered = match request.format {
        OutputFormat::Yaml => serde_yaml_ng::to_string(&report)?,
        OutputFormat::Json => serde_json::to_string_pretty(&report)? + "\n",
    };
    out.write_all(rendered.as_bytes())?;
    Ok(())
}

/// Execute the paths command.
fn paths_command(source: &Source, settings: &Settings, out: &mut impl Write) -> Result<()> {
    let mut census = PathCensus::new();
    source.parse_into(settings, &mut census)?;

    let paths = census.into_paths();
    let width = paths
        .iter()
        .map(|(_, count)| count.to_string().len())
        .max()
        .unwrap_or(1);
    for (path, count) in &paths {
        writeln!(out, "{count:>width$}  {path}")?;
    }
    eprintln!(
        "{} {} distinct paths in {}",
        style("Found").for_stderr().bold(),
        style(paths.len()).for_stderr().green(),
        style(source).for_stderr().cyan()
    );
    Ok(())
}

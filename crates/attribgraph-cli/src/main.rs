//! Attribgraph CLI
//!
//! Command-line front end for:
//! - normalizing raw attribution graphs (`nodes` + `links` JSON) into
//!   role-consistent graphs,
//! - asking the fixed set of analytic questions against a normalized graph,
//! - inspecting datasets, graph summaries and per-entity details.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use attribgraph_core::{AmbiguousRoute, NormalizeOptions, SplitRule};
use attribgraph_query::{CountryTable, QueryEvaluator};

mod config;
mod datasets;
mod details;
mod render;

use config::AppConfig;
use datasets::GraphLocation;
use details::DetailsDocument;

#[derive(Parser)]
#[command(name = "attribgraph")]
#[command(
    author,
    version,
    about = "Attribution graph normalization and analytic questions"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Log verbosity: -v info, -vv debug, -vvv trace. `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON config file (defaults to `attribgraph.json` in the working directory, if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the named datasets and the details document.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct GraphSource {
    /// Graph document (`{"nodes": [...], "links": [...]}`).
    #[arg(short, long, conflicts_with = "dataset")]
    input: Option<PathBuf>,

    /// Named dataset resolved under the data directory (e.g. `sector`, `geo`).
    #[arg(short, long)]
    dataset: Option<String>,
}

impl GraphSource {
    fn location(&self) -> Result<GraphLocation> {
        match (&self.input, &self.dataset) {
            (Some(path), _) => Ok(GraphLocation::Path(path.clone())),
            (None, Some(name)) => Ok(GraphLocation::Named(name.clone())),
            (None, None) => Err(anyhow!("expected `--input <FILE>` or `--dataset <NAME>`")),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a raw graph and write `{nodes, links}` JSON.
    Normalize {
        #[command(flatten)]
        source: GraphSource,

        /// Output path (defaults to stdout).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Route for plain-actor endpoints on split nodes: sponsor|victim|both
        #[arg(long)]
        ambiguous_route: Option<String>,

        /// Which role sets split a node: exact|ignore-actor
        #[arg(long)]
        split_rule: Option<String>,

        /// Also print the normalization report (JSON) to stderr.
        #[arg(long)]
        report: bool,
    },

    /// Ask an analytic question, e.g. `ask -d geo what does China target most?`
    Ask {
        #[command(flatten)]
        source: GraphSource,

        /// The question (free text).
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,

        /// Output format: text|json
        #[arg(long, default_value = "text")]
        format: String,

        /// Extra country table entries (`{"token": "Canonical Name"}`).
        #[arg(long)]
        countries: Option<PathBuf>,
    },

    /// Node counts per type, split nodes and the highest-degree nodes.
    Summary {
        #[command(flatten)]
        source: GraphSource,

        /// How many nodes to list by degree.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Print the details record for a node id (split variants resolve to their origin).
    Details {
        node_id: String,

        /// Details document (defaults to the configured one under the data directory).
        #[arg(long)]
        details: Option<PathBuf>,
    },

    /// List configured datasets.
    Datasets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("unknown format `{other}` (expected text|json)")),
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let mut config = AppConfig::load(cli.global.config.as_deref())?;
    if let Some(dir) = cli.global.data_dir {
        config.data_dir = dir;
    }

    match cli.command {
        Commands::Normalize {
            source,
            out,
            ambiguous_route,
            split_rule,
            report,
        } => {
            let options = normalize_options(
                &config,
                ambiguous_route.as_deref(),
                split_rule.as_deref(),
            )?;
            cmd_normalize(&config, &source, &options, out.as_ref(), report)?;
        }
        Commands::Ask {
            source,
            question,
            format,
            countries,
        } => {
            let format = OutputFormat::parse(&format)?;
            cmd_ask(&config, &source, &question.join(" "), format, countries.as_ref())?;
        }
        Commands::Summary { source, top } => {
            cmd_summary(&config, &source, top)?;
        }
        Commands::Details { node_id, details } => {
            cmd_details(&config, &node_id, details.as_ref())?;
        }
        Commands::Datasets => {
            cmd_datasets(&config);
        }
    }

    Ok(())
}

fn normalize_options(
    config: &AppConfig,
    ambiguous_route: Option<&str>,
    split_rule: Option<&str>,
) -> Result<NormalizeOptions> {
    let mut options = config.normalize.clone();
    if let Some(route) = ambiguous_route {
        options.split.ambiguous_route = AmbiguousRoute::parse(route).ok_or_else(|| {
            anyhow!("unknown ambiguous route `{route}` (expected sponsor|victim|both)")
        })?;
    }
    if let Some(rule) = split_rule {
        options.split.split_rule = SplitRule::parse(rule)
            .ok_or_else(|| anyhow!("unknown split rule `{rule}` (expected exact|ignore-actor)"))?;
    }
    Ok(options)
}

fn cmd_normalize(
    config: &AppConfig,
    source: &GraphSource,
    options: &NormalizeOptions,
    out: Option<&PathBuf>,
    report: bool,
) -> Result<()> {
    let path = datasets::resolve(config, &source.location()?)?;
    let normalized = datasets::load_graph(&path, options)?;
    let json = serde_json::to_string_pretty(&normalized.graph)?;

    match out {
        Some(out) => {
            fs::write(out, json).with_context(|| format!("failed to write {}", out.display()))?;
            eprintln!(
                "{} {} → {}",
                "Normalized".green().bold(),
                path.display(),
                out.display()
            );
        }
        None => println!("{json}"),
    }

    eprintln!("  {}", normalized.report.summary_line());
    if report {
        eprintln!("{}", serde_json::to_string_pretty(&normalized.report)?);
    }
    Ok(())
}

fn cmd_ask(
    config: &AppConfig,
    source: &GraphSource,
    question: &str,
    format: OutputFormat,
    countries: Option<&PathBuf>,
) -> Result<()> {
    let path = datasets::resolve(config, &source.location()?)?;
    let normalized = datasets::load_graph(&path, &config.normalize)?;

    let mut table = config.country_table();
    if let Some(countries) = countries {
        let text = fs::read_to_string(countries)
            .with_context(|| format!("failed to read country table {}", countries.display()))?;
        let extra: CountryTable = serde_json::from_str(&text)
            .with_context(|| format!("invalid country table {}", countries.display()))?;
        table.extend(&extra);
    }

    let evaluator = QueryEvaluator::new(table);
    let result = evaluator.evaluate(&normalized.graph, question);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print!("{}", render::query_text(&result)),
    }
    Ok(())
}

fn cmd_summary(config: &AppConfig, source: &GraphSource, top: usize) -> Result<()> {
    let path = datasets::resolve(config, &source.location()?)?;
    let normalized = datasets::load_graph(&path, &config.normalize)?;
    print!(
        "{}",
        render::summary_text(&normalized.graph, &normalized.report, top)
    );
    Ok(())
}

fn cmd_details(config: &AppConfig, node_id: &str, details: Option<&PathBuf>) -> Result<()> {
    let path = details.cloned().unwrap_or_else(|| config.details_path());
    let doc = DetailsDocument::load(&path)?;
    if doc.is_empty() {
        return Err(anyhow!("details document {} has no entries", path.display()));
    }
    match doc.lookup(node_id, &config.normalize.split) {
        Some((key, record)) => {
            if key != node_id {
                eprintln!("{} {node_id} → {key}", "resolved".dimmed());
            }
            println!("{}", serde_json::to_string_pretty(record)?);
            Ok(())
        }
        None => Err(anyhow!(
            "no details for `{node_id}` in {} ({} entries)",
            path.display(),
            doc.len()
        )),
    }
}

fn cmd_datasets(config: &AppConfig) {
    println!(
        "{} {}",
        "Datasets in".green().bold(),
        config.data_dir.display()
    );
    for entry in datasets::entries(config) {
        let status = if entry.exists {
            "ok".green()
        } else {
            "missing".red()
        };
        println!("  {:<12} {:<8} {}", entry.name, status, entry.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ask_collects_trailing_question_words() {
        let cli = Cli::try_parse_from([
            "attribgraph",
            "ask",
            "--dataset",
            "geo",
            "what",
            "does",
            "China",
            "target",
            "most?",
        ])
        .unwrap();
        let Commands::Ask {
            source, question, ..
        } = cli.command
        else {
            panic!("expected ask");
        };
        assert_eq!(source.location().unwrap(), GraphLocation::Named("geo".into()));
        assert_eq!(question.join(" "), "what does China target most?");
    }

    #[test]
    fn input_and_dataset_conflict() {
        let parsed = Cli::try_parse_from([
            "attribgraph",
            "summary",
            "--input",
            "g.json",
            "--dataset",
            "sector",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn flags_override_config_options() {
        let config = AppConfig::default();
        let options = normalize_options(&config, Some("both"), Some("ignore-actor")).unwrap();
        assert_eq!(options.split.ambiguous_route, AmbiguousRoute::Both);
        assert_eq!(options.split.split_rule, SplitRule::IgnoreActor);
        assert!(normalize_options(&config, Some("sideways"), None).is_err());
        assert_eq!(
            normalize_options(&config, None, None).unwrap(),
            NormalizeOptions::default()
        );
    }

    #[test]
    fn output_format_parse() {
        assert_eq!(OutputFormat::parse("JSON").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::parse("yaml").is_err());
    }

    #[test]
    fn details_reports_empty_documents() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("details.json");
        fs::write(&path, "{}")?;
        let config = AppConfig::default();

        let err = cmd_details(&config, "APT28", Some(&path)).unwrap_err();
        assert!(err.to_string().contains("has no entries"));

        fs::write(&path, r#"{"APT28": {"country": "Russian Federation"}}"#)?;
        cmd_details(&config, "APT28", Some(&path))?;
        let err = cmd_details(&config, "Nobody", Some(&path)).unwrap_err();
        assert!(err.to_string().contains("1 entries"));
        Ok(())
    }
}

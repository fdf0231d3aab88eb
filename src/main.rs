// SPDX-License-Identifier: PMPL-1.0-or-later
//! actbot CLI - run ACT heading rules over HTML files

use actbot::config::{load_config, Config};
use actbot::registry::RuleRegistry;
use actbot::report::{generate_report, OutputFormat};
use actbot::rule::Rule;
use actbot::runner::{RunFilter, Runner};
use actbot::scanner;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Accessibility Conformance Testing rule engine
#[derive(Parser)]
#[command(name = "actbot")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML or YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run rules against a single HTML file
    Analyze {
        /// File to analyze
        file: PathBuf,

        /// Test id: `all`, a category such as `headings`, or a rule id
        #[arg(long)]
        test: Option<String>,

        /// Output format
        #[arg(long)]
        format: Option<FormatArg>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run rules against every HTML file in a directory
    Check {
        /// Directory to scan
        dir: PathBuf,

        /// Test id: `all`, a category such as `headings`, or a rule id
        #[arg(long)]
        test: Option<String>,

        /// Output format
        #[arg(long)]
        format: Option<FormatArg>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List registered rules
    Rules,
}

/// Output format CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI
    Sarif,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Sarif => OutputFormat::Sarif,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("actbot=debug")
    } else {
        EnvFilter::new("actbot=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    let registry = RuleRegistry::with_default_rules()?;

    match cli.command {
        Commands::Analyze { file, test, format, output } => {
            let filter = resolve_filter(test.as_deref(), &config);
            let format = resolve_format(format, &config);
            let mut runner = Runner::with_config(registry, config);

            let report = scanner::scan_file(&file, &mut runner, &filter).await?;
            write_output(&generate_report(&report, format), output.as_deref())?;

            if report.blocks_release() {
                std::process::exit(1);
            }
        }

        Commands::Check { dir, test, format, output } => {
            let filter = resolve_filter(test.as_deref(), &config);
            let format = resolve_format(format, &config);
            let mut runner = Runner::with_config(registry, config);

            let reports = scanner::scan_directory(&dir, &mut runner, &filter).await?;
            let rendered = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&reports)?,
                _ => reports
                    .iter()
                    .map(|r| format!("# {}\n{}", r.path.display(), generate_report(&r.report, format)))
                    .collect::<Vec<_>>()
                    .join("\n"),
            };
            write_output(&rendered, output.as_deref())?;

            if reports.iter().any(|r| r.blocks_release()) {
                std::process::exit(1);
            }
        }

        Commands::Rules => {
            for rule in registry.all() {
                print_rule(rule, config.is_disabled(rule.id()));
            }
        }
    }

    Ok(())
}

fn resolve_filter(test: Option<&str>, config: &Config) -> RunFilter {
    RunFilter::from_test_id(test.unwrap_or(&config.default_test))
}

fn resolve_format(format: Option<FormatArg>, config: &Config) -> OutputFormat {
    format.map(OutputFormat::from).unwrap_or(config.output)
}

fn print_rule(rule: &dyn Rule, disabled: bool) {
    let meta = rule.metadata();
    let categories: Vec<&str> = meta.categories.iter().map(|c| c.as_str()).collect();
    let criteria: Vec<&str> = meta
        .accessibility_requirements
        .iter()
        .map(|r| r.num.as_str())
        .collect();

    println!(
        "{}{}\n  {}\n  categories: {}\n  wcag: {}\n  help: {}",
        meta.id,
        if disabled { " (disabled)" } else { "" },
        meta.name,
        categories.join(", "),
        criteria.join(", "),
        meta.help_url
    );
}

/// Write output to file or stdout
fn write_output(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(p) => {
            std::fs::write(p, content)?;
            eprintln!("Report written to {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

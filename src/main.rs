// SPDX-License-Identifier: PMPL-1.0-or-later
//! crobot CLI - Conversion-Rate Audit Bot
//!
//! Part of the gitbot-fleet ecosystem.

use crobot::config::{self, Config, FetchMode};
use crobot::fetch::{self, FileFetcher};
use crobot::report::{generate_report, AuditReport, OutputFormat};
use crobot::Auditor;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

/// crobot: audit product landing pages for conversion essentials
#[derive(Parser)]
#[command(name = "crobot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a page and audit it
    Audit {
        /// Product page URL
        url: String,

        /// Seconds before the fetch is abandoned
        #[arg(long)]
        timeout: Option<u64>,

        /// How to fetch the page
        #[arg(long)]
        mode: Option<ModeArg>,

        /// Similarity threshold for semantic gaps
        #[arg(long)]
        threshold: Option<f64>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: FormatArg,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Audit a local HTML file
    Analyze {
        /// HTML file to audit
        file: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: FormatArg,
    },

    /// List the active rule catalog
    Rules,

    /// Initialize configuration file
    Init {
        /// Output format (yaml, toml)
        #[arg(long, default_value = "yaml")]
        format: String,
    },

    /// Show current configuration
    Show,
}

/// Fetch mode CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Headless browser render
    Headless,
    /// Plain HTTP request, scripts not executed
    Http,
}

impl From<ModeArg> for FetchMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Http => FetchMode::Http,
            ModeArg::Headless => FetchMode::Headless,
        }
    }
}

/// Output format CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Human-readable text
    Text,
    /// Markdown lines
    Markdown,
    /// Structured JSON
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Markdown => OutputFormat::Markdown,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.verbose);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(config::default_config_path);

    let config = match config::load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Audit {
            url,
            timeout,
            mode,
            threshold,
            format,
            output,
        } => {
            let mut config = config;
            if let Some(secs) = timeout {
                config.fetch.timeout_secs = secs;
            }
            if let Some(mode) = mode {
                config.fetch.mode = mode.into();
            }
            if let Some(threshold) = threshold {
                config.semantic.threshold = threshold;
            }
            handle_audit(&config, &url, format.into(), output.as_deref())
        }
        Command::Analyze { file, format } => handle_analyze(&config, &file, format.into()),
        Command::Rules => handle_rules(&config),
        Command::Init { format } => handle_init(&config_path, &format),
        Command::Show => handle_show(&config),
    }
}

fn init_logging(level: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("crobot=debug")
    } else {
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_audit(config: &Config, url: &str, format: OutputFormat, output: Option<&Path>) -> ExitCode {
    if url.trim().is_empty() {
        eprintln!("Please enter a valid URL.");
        return ExitCode::FAILURE;
    }

    let fetcher = match fetch::fetcher_for(config) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error creating fetcher: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let auditor = match Auditor::from_config(config, fetcher) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = AuditReport::new(url.trim(), auditor.audit(url.trim()));
    let failed = report.findings.is_failure();

    if let Err(e) = write_output(&generate_report(&report, format), output) {
        eprintln!("Error writing report: {}", e);
        return ExitCode::FAILURE;
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn handle_analyze(config: &Config, file: &Path, format: OutputFormat) -> ExitCode {
    let auditor = match Auditor::from_config(config, Box::new(FileFetcher)) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let source = file.display().to_string();
    let report = AuditReport::new(&source, auditor.audit(&source));
    println!("{}", generate_report(&report, format));

    if report.findings.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn handle_rules(config: &Config) -> ExitCode {
    let catalog = match config.catalog() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("\nRule catalog ({} rules):\n", catalog.len());
    for (idx, rule) in catalog.rules().iter().enumerate() {
        println!(
            "{:2}. {:<28} {:<14} {}",
            idx + 1,
            rule.spec.name,
            rule.spec.kind.label(),
            rule.spec.kind.parameters()
        );
    }
    println!();

    ExitCode::SUCCESS
}

fn handle_init(config_path: &Path, format: &str) -> ExitCode {
    let path = if format == "toml" {
        config_path.with_extension("toml")
    } else {
        config_path.to_path_buf()
    };

    match config::write_default_config(&path) {
        Ok(()) => {
            println!("Created configuration file: {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error creating config: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn handle_show(config: &Config) -> ExitCode {
    println!("\nCurrent Configuration:");
    println!("======================\n");

    println!("Fetch:");
    println!("  Mode: {}", config.fetch.mode);
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  User agent: {}", config.fetch.user_agent);
    println!("  Browser: {}", config.fetch.browser);
    println!();

    println!("Semantic:");
    println!("  Threshold: {}", config.semantic.threshold);
    for section in &config.semantic.ideal_sections {
        println!("  - {}", section);
    }
    println!();

    println!("Rules:");
    println!(
        "  Catalog: {}",
        if config.rules.catalog.is_some() { "custom" } else { "standard" }
    );
    println!(
        "  Case-insensitive patterns: {}",
        config.rules.case_insensitive_patterns
    );

    ExitCode::SUCCESS
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

//! RF sweep analyzer command-line interface
//!
//! - `analyze`: characterize every timestamped sweep in one or more tables
//! - `frequencies`: list the distinct frequency bins across tables
//! - `timestamps`: list the timestamp columns of each table

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use rf_sweep_analyzer::analysis::pipeline;
use rf_sweep_analyzer::data::loader;
use rf_sweep_analyzer::data::model::distinct_frequencies;
use rf_sweep_analyzer::report;
use rf_sweep_analyzer::{AnalysisConfig, AnalysisRequest, FilterSpec, FrequencyFilter, SweepTable};

#[derive(Parser)]
#[command(name = "rf-sweep-analyzer")]
#[command(author, version, about = "Offline RF spectrum-sweep analyzer", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Smooth and characterize every sweep in the given files
    Analyze {
        /// Input tables (.csv or .parquet)
        files: Vec<PathBuf>,

        /// Frequency in Hz to restrict the analysis to
        #[arg(short, long)]
        frequency: Option<String>,

        /// Treat --frequency as the center of a ± tolerance window
        #[arg(short, long)]
        window: bool,

        /// Window half-width in Hz (overrides the configuration)
        #[arg(long)]
        tolerance: Option<f64>,

        /// Only analyze timestamp columns containing this text
        #[arg(short, long)]
        date: Option<String>,

        /// JSON file overriding the analysis constants
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of files analyzed in parallel
        #[arg(short, long, default_value = "1")]
        jobs: usize,

        /// Export the report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format
        #[arg(long, value_enum, default_value = "text")]
        format: ExportFormat,
    },

    /// List the distinct frequencies found in the given files
    Frequencies {
        /// Input tables (.csv or .parquet)
        files: Vec<PathBuf>,
    },

    /// List the timestamp columns of each file
    Timestamps {
        /// Input tables (.csv or .parquet)
        files: Vec<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Text,
    Json,
}

struct AnalyzeArgs {
    files: Vec<PathBuf>,
    frequency: Option<String>,
    window: bool,
    tolerance: Option<f64>,
    date: Option<String>,
    config: Option<PathBuf>,
    jobs: usize,
    output: Option<PathBuf>,
    format: ExportFormat,
}

fn load_config(path: Option<&Path>, tolerance: Option<f64>) -> Result<AnalysisConfig> {
    let mut config = match path {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(tolerance) = tolerance {
        config.tolerance_hz = tolerance;
        config.validate()?;
    }
    log::debug!("Analysis configuration: {config:?}");
    Ok(config)
}

fn cmd_analyze(args: AnalyzeArgs) -> Result<()> {
    let config = load_config(args.config.as_deref(), args.tolerance)?;
    let filter = FilterSpec {
        frequency: FrequencyFilter::parse(args.frequency.as_deref(), args.window, &config),
        date: args.date.filter(|d| !d.is_empty()),
    };
    log::info!("Filters: {filter:?}");

    let request = AnalysisRequest {
        files: args.files,
        filter,
        config,
    };
    let result = pipeline::analyze_parallel(&request, args.jobs)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if result.lines.is_empty() {
        writeln!(out, "No results to show.")?;
    } else {
        for line in &result.lines {
            writeln!(out, "{line}")?;
        }
    }

    let failures: Vec<_> = result.failures().collect();
    for (path, err) in &failures {
        eprintln!("Error processing {}: {err}", path.display());
    }

    if let Some(output) = &args.output {
        if result.lines.is_empty() {
            log::warn!("Nothing to export to {}", output.display());
        } else {
            match args.format {
                ExportFormat::Text => report::export_text(output, &result.lines)?,
                ExportFormat::Json => report::export_json(output, &result)?,
            }
            log::info!("Report written to {}", output.display());
        }
    }

    if !failures.is_empty() {
        eprintln!(
            "{} of {} files could not be processed",
            failures.len(),
            result.files.len()
        );
    }
    Ok(())
}

fn cmd_frequencies(files: Vec<PathBuf>) -> Result<()> {
    anyhow::ensure!(!files.is_empty(), "no input files were supplied");

    let tables: Vec<SweepTable> = files
        .iter()
        .filter_map(|path| match loader::load_file(path) {
            Ok(table) => Some(table),
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                None
            }
        })
        .collect();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for f in distinct_frequencies(&tables) {
        writeln!(out, "{f}")?;
    }
    Ok(())
}

fn cmd_timestamps(files: Vec<PathBuf>) -> Result<()> {
    anyhow::ensure!(!files.is_empty(), "no input files were supplied");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for path in &files {
        let table = match loader::load_file(path)
            .with_context(|| format!("loading {}", path.display()))
        {
            Ok(table) => table,
            Err(e) => {
                log::error!("{e:#}");
                continue;
            }
        };
        writeln!(out, "{}:", path.display())?;
        for label in table.labels() {
            writeln!(out, "  {label}")?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Analyze {
            files,
            frequency,
            window,
            tolerance,
            date,
            config,
            jobs,
            output,
            format,
        } => cmd_analyze(AnalyzeArgs {
            files,
            frequency,
            window,
            tolerance,
            date,
            config,
            jobs,
            output,
            format,
        }),
        Commands::Frequencies { files } => cmd_frequencies(files),
        Commands::Timestamps { files } => cmd_timestamps(files),
    }
}

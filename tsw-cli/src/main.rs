use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tsw_core::{ExclusionAxis, TimeEncoding, TimeWeightMethod};

mod commands;
mod config;
mod error;

use config::{Config, OutputFormat};
use error::{print_error_and_exit, CliError};

#[derive(Parser)]
#[command(name = "tsw")]
#[command(about = "TSW - time-weighted local alignment of event sequences")]
#[command(version)]
#[command(long_about = "
TSW aligns timestamped event records (e.g. drug administrations) against
templates (e.g. treatment regimens), scoring matched events by category
similarity scaled by how closely their elapsed times agree.

Examples:
  tsw align --records patients.tsv --templates regimens.tsv --out hits.tsv
  tsw align --records patients.tsv --templates regimens.tsv --similarity drugs.csv --mem 3
  tsw config --example > tsw.toml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Process pairs one at a time in input order
    #[arg(long, global = true)]
    pub deterministic: bool,

    /// Number of threads to use
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Align every template against every record
    Align(AlignArgs),

    /// Show configuration
    Config {
        /// Print the default configuration as TOML
        #[arg(long)]
        example: bool,

        /// Write the configuration to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct AlignArgs {
    /// Records file: one '<id><TAB><time>.<label>;...' row per line
    #[arg(long, required = true)]
    pub records: PathBuf,

    /// Templates file: one '<name><TAB><time>.<label>;...' row per line
    #[arg(long, required = true)]
    pub templates: PathBuf,

    /// Symmetric label similarity matrix (defaults to 1.0 / -1.1)
    #[arg(long)]
    pub similarity: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Output format
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Gap penalty
    #[arg(short = 'g', long)]
    pub gap_penalty: Option<f64>,

    /// Time-penalty parameter
    #[arg(short = 'T', long)]
    pub time_param: Option<f64>,

    /// Time-weight method (PropDiff, AbsDiff, Uniform)
    #[arg(long)]
    pub method: Option<TimeWeightMethod>,

    /// Maximum alignments per pair, -1 for unbounded
    #[arg(long, allow_negative_numbers = true)]
    pub mem: Option<i64>,

    /// Allow later alignments to overlap earlier ones
    #[arg(long)]
    pub no_remove_overlap: bool,

    /// Axis claimed by accepted alignments (s1, s2, both). The default s2
    /// reports a template again for each separate occurrence in a record;
    /// s1 keeps at most one alignment per template position
    #[arg(long)]
    pub exclusion: Option<ExclusionAxis>,

    /// How event times are read (elapsed, absolute)
    #[arg(long)]
    pub time_encoding: Option<TimeEncoding>,
}

fn setup_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose, cli.quiet)?;

    // Load configuration
    let config = Config::load(cli.config.as_deref())?;

    let threads = cli.threads.unwrap_or(config.general.threads);
    if threads == 0 {
        return Err(CliError::validation("--threads must be at least 1").into());
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("Failed to set thread count")?;
    log::debug!("Using {} worker threads", threads);

    match cli.command {
        Commands::Align(args) => {
            commands::align::execute(&config, cli.deterministic, cli.verbose, args)?;
        }

        Commands::Config { example, out } => {
            let shown = if example { Config::default() } else { config };
            match out {
                Some(path) => {
                    shown.save_to_file(&path)?;
                    log::info!("Wrote configuration to {}", path.display());
                }
                None => print!("{}", shown.to_toml()?),
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        if let Some(cli_err) = err.downcast_ref::<CliError>() {
            print_error_and_exit(cli_err);
        }
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

//! CLI for perfsuite.
//!
//! This crate provides the `perfsuite` command-line interface: running the
//! built-in suites under a runtime configuration, checking a configuration,
//! listing the resolved run plan and rendering existing result logs.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod commands;
pub mod logging;
pub mod operator;
pub mod platform;

use clap::{Args, Parser, Subcommand};
use logging::LogFormat;
use std::ffi::OsString;
use std::path::PathBuf;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "perfsuite_config.json";

/// perfsuite CLI.
#[derive(Parser, Debug)]
#[command(name = "perfsuite")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log line format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Runtime configuration lookup.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Config file. Repeat to give fallbacks; the first that loads wins.
    #[arg(short, long = "config", env = "PERFSUITE_CONFIG", value_name = "PATH")]
    pub config: Vec<PathBuf>,
}

impl ConfigArgs {
    /// Candidate paths in lookup order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        if self.config.is_empty() {
            vec![PathBuf::from(DEFAULT_CONFIG_FILE)]
        } else {
            self.config.clone()
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every enabled case and write the result log.
    ///
    /// Results are written to `<output>/results.json` with a markdown
    /// summary in `<output>/summary.md`.
    Run {
        /// Configuration lookup.
        #[command(flatten)]
        config: ConfigArgs,

        /// Output directory override.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only run this suite.
        #[arg(long)]
        suite: Option<String>,

        /// Only run this case of `--suite`.
        #[arg(long, requires = "suite")]
        case: Option<String>,

        /// Seconds to wait before an automatic start.
        #[arg(long, default_value_t = operator::DEFAULT_COUNTDOWN.as_secs())]
        countdown: u64,

        /// Skip the delay before the completion action.
        #[arg(long)]
        no_delay: bool,
    },

    /// Validate a configuration file.
    Check {
        /// Configuration lookup.
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Show which cases would run, and why.
    List {
        /// Configuration lookup.
        #[command(flatten)]
        config: ConfigArgs,

        /// Print the plan as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Render a markdown summary of an existing result log.
    Report {
        /// Result log to read.
        log: PathBuf,

        /// Write the summary into this directory instead of printing it.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Run the CLI with the current process arguments.
pub fn run() -> anyhow::Result<()> {
    run_with_args(std::env::args_os())
}

/// Run the CLI with the given arguments.
pub fn run_with_args<I, T>(args: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    logging::init(cli.verbose, cli.log_format)?;

    match cli.command {
        Commands::Run {
            config,
            output,
            suite,
            case,
            countdown,
            no_delay,
        } => commands::run(commands::RunOptions {
            config,
            output,
            suite,
            case,
            countdown: std::time::Duration::from_secs(countdown),
            no_delay,
        }),
        Commands::Check { config } => commands::check(&config),
        Commands::List { config, json } => commands::list(&config, json),
        Commands::Report { log, output } => commands::report(&log, output.as_deref()),
    }
}

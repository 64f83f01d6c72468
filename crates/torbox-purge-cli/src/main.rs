use clap::{ArgAction, Parser, Subcommand};
use commands::{config, daemon, once, scan};
use purge_config::PathManager;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "torbox-purge")]
#[command(about = "Remove stalled and slow downloads from a TorBox account")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the cleanup task on a fixed interval until stopped
    #[command(long_about = "Run the cleanup task immediately, then again every check interval, until SIGINT or SIGTERM is received. A run in progress is always allowed to finish.")]
    Daemon {
        /// Seconds between the end of one run and the start of the next (overrides config)
        #[arg(long, value_name = "SECONDS")]
        interval: Option<u64>,

        /// Skip the initial run on startup
        #[arg(long, action = ArgAction::SetTrue)]
        no_startup_run: bool,

        /// Classify and log, but do not delete anything
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,

        /// Log to stderr only, without the rotating log file
        #[arg(long, action = ArgAction::SetTrue)]
        no_log_file: bool,
    },
    /// Run the cleanup task once and exit
    Once {
        /// Classify and log, but do not delete anything
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,
    },
    /// List the items the next run would delete
    Scan,
    /// Inspect or edit configuration and credentials
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration (token masked)
    Show,
    /// Write a default config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
    /// Store the API token in credentials.toml
    Token {
        /// API token (if not provided, will prompt)
        #[arg(long)]
        token: Option<String>,
    },
    /// Print the config, credentials and log file locations
    Path,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // Loaded before logging so RUST_LOG may come from .env
    let dotenv = dotenvy::dotenv();

    let path_manager = PathManager::default();
    let log_file = match &cli.command {
        Commands::Daemon { no_log_file: false, .. } => Some(path_manager.daemon_log_file()),
        _ => None,
    };
    logging::init_logging(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Failed to read .env file"),
    }

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Daemon {
            interval,
            no_startup_run,
            dry_run,
            no_log_file: _,
        } => daemon::run_daemon(&path_manager, interval, no_startup_run, dry_run, &output).await,
        Commands::Once { dry_run } => once::run_once(&path_manager, dry_run, &output).await,
        Commands::Scan => scan::run_scan(&path_manager, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &path_manager, &output),
    }
}

//! `reelhound` CLI - Browse the site and inspect stream candidates

mod cmd;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use reelhound::{load_config, Config};

#[derive(Parser)]
#[command(name = "reelhound")]
#[command(about = "Resolve listings, episodes and video servers from a movie/series site")]
#[command(version)]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the homepage grid with its featured item
    Home,

    /// List the entries of a category or listing page
    List {
        /// Listing page URL
        url: String,
    },

    /// Search the site
    Search {
        /// Search terms
        query: String,
    },

    /// Show the seasons and episodes of a series page
    Episodes {
        /// Series or movie page URL
        url: String,
    },

    /// Show the ordered video server candidates of an episode page
    Servers {
        /// Episode or movie page URL
        url: String,
    },

    /// Show the genre and release-year categories
    Menu,

    /// Classify a URL against the content filter and media sniffer
    Check {
        /// URL or hostname to classify
        url: String,
    },
}

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => reelhound::config::load_config_from(path)?,
        None => load_config().context("failed to load configuration")?,
    };
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    run(cli.command, config, format).await
}

async fn run(command: Commands, config: Config, format: OutputFormat) -> Result<()> {
    match command {
        Commands::Home => cmd::listing::cmd_home(config, format).await,
        Commands::List { url } => cmd::listing::cmd_list(config, &url, format).await,
        Commands::Search { query } => cmd::listing::cmd_search(config, &query, format).await,
        Commands::Episodes { url } => cmd::episodes::cmd_episodes(config, &url, format).await,
        Commands::Servers { url } => cmd::servers::cmd_servers(config, &url, format).await,
        Commands::Menu => cmd::menu::cmd_menu(config, format).await,
        Commands::Check { url } => cmd::check::cmd_check(&config, &url, format),
    }
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "reelhound=debug",
        _ => "reelhound=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

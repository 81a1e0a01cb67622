//! Sumi-Sift main entry point
//!
//! This is the command-line interface for the Sumi-Sift contact and tracker sifter.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sumi_sift::config::{apply_env_overrides, load_config_with_hash, Config};
use sumi_sift::crawler::{crawl_site_report, CrawlOptions};
use sumi_sift::output;
use sumi_sift::render::ChromiumLauncher;
use sumi_sift::storage::{open_storage, CrawlStore};
use tracing_subscriber::EnvFilter;

/// Sumi-Sift: a contact and tracker sifter
///
/// Sumi-Sift renders a handful of pages of one site in headless Chromium,
/// collecting the email addresses shown on them and the tracking requests
/// they make while loading.
#[derive(Parser, Debug)]
#[command(name = "sumi-sift")]
#[command(version = "1.0.0")]
#[command(about = "A contact and tracker sifter", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Listen address, overriding the config and PORT
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Crawl one site and print what was found
    Crawl {
        /// Seed URL; only links starting with it are followed
        url: String,

        /// Maximum number of pages to render
        #[arg(long, value_name = "N")]
        max_pages: Option<usize>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Do not store the result in the history database
        #[arg(long)]
        no_save: bool,
    },

    /// Show stored crawls, newest first
    History {
        /// Print the history as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration and print it
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_configuration(cli.config.as_deref())?;
    apply_env_overrides(&mut config);

    match cli.command {
        Command::Serve { bind } => handle_serve(config, bind).await,
        Command::Crawl {
            url,
            max_pages,
            json,
            no_save,
        } => handle_crawl(&config, &url, max_pages, json, no_save).await,
        Command::History { json } => handle_history(&config, json),
        Command::CheckConfig => handle_check_config(&config, cli.config.as_deref()),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_sift=info,warn"),
            1 => EnvFilter::new("sumi_sift=debug,info"),
            2 => EnvFilter::new("sumi_sift=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the config file when one is given, defaults otherwise
fn load_configuration(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Runs the HTTP API until interrupted
async fn handle_serve(mut config: Config, bind: Option<String>) -> anyhow::Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }

    let store = open_storage(Path::new(&config.output.database_path)).with_context(|| {
        format!("failed to open database {}", config.output.database_path)
    })?;
    let launcher = Arc::new(ChromiumLauncher::new(config.renderer.clone()));

    sumi_sift::server::serve(&config, launcher, Box::new(store)).await
}

/// Runs one crawl from the command line
async fn handle_crawl(
    config: &Config,
    url: &str,
    max_pages: Option<usize>,
    json: bool,
    no_save: bool,
) -> anyhow::Result<()> {
    let budget = max_pages.unwrap_or(config.crawler.max_pages);
    let launcher = ChromiumLauncher::new(config.renderer.clone());
    let options = CrawlOptions::from_config(config);

    let report = crawl_site_report(&launcher, url, budget, &options)
        .await
        .with_context(|| format!("crawl of {} failed", url))?;

    if !no_save {
        let mut store = open_storage(Path::new(&config.output.database_path))?;
        let id = store.record_crawl(url, &report.result)?;
        tracing::info!("Stored crawl #{} in {}", id, config.output.database_path);
    }

    if json {
        println!("{}", output::to_json(&report.result)?);
    } else {
        output::print_crawl_report(url, &report);
    }

    Ok(())
}

/// Prints the stored crawl history
fn handle_history(config: &Config, json: bool) -> anyhow::Result<()> {
    let store = open_storage(Path::new(&config.output.database_path)).with_context(|| {
        format!("failed to open database {}", config.output.database_path)
    })?;
    let crawls = store.list_crawls()?;

    if json {
        println!("{}", output::to_json(&crawls)?);
    } else {
        println!("Database: {}\n", config.output.database_path);
        output::print_history(&crawls);
    }

    Ok(())
}

/// Prints the effective configuration
fn handle_check_config(config: &Config, path: Option<&Path>) -> anyhow::Result<()> {
    println!("=== Sumi-Sift Configuration ===\n");
    match path {
        Some(path) => println!("Source: {}", path.display()),
        None => println!("Source: built-in defaults"),
    }

    println!("\nCrawler:");
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Render timeout: {}ms", config.crawler.render_timeout_ms);
    println!(
        "  Max concurrent sessions: {}",
        config.crawler.max_concurrent_sessions
    );
    println!("  Scope: {:?}", config.crawler.scope);

    println!("\nRenderer:");
    println!(
        "  Chrome: {}",
        config.renderer.chrome_path.as_deref().unwrap_or("auto-detect")
    );
    println!(
        "  Idle: <= {} connections for {}ms",
        config.renderer.idle_connections, config.renderer.idle_window_ms
    );
    println!("  Sandbox: {}", config.renderer.sandbox);

    println!("\nTracker patterns ({}):", config.trackers.patterns.len());
    for pattern in &config.trackers.patterns {
        println!("  - {}", pattern);
    }

    println!("\nServer:");
    println!("  Bind: {}", config.server.bind);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");
    Ok(())
}

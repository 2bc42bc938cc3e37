//! Page-Lens main entry point
//!
//! This is the command-line interface for the Page-Lens SEO analyzer.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use page_lens::config::{load_config_or_default, Config};
use page_lens::output::{
    generate_markdown_report, load_statistics, print_record, print_result, print_statistics,
};
use page_lens::scheduler::SharedStorage;
use page_lens::storage::{SqliteStorage, Storage, UrlFilter};
use page_lens::{parse_target, AnalysisPool, JobState};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Page-Lens: on-demand SEO analysis of web pages
///
/// Page-Lens fetches pages, derives SEO metrics from their HTML (title,
/// description, headings, links, forms, HTML version), samples links for
/// liveness and optionally stores the results in a local database.
#[derive(Parser, Debug)]
#[command(name = "page-lens")]
#[command(version)]
#[command(about = "On-demand SEO analysis of web pages", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "FILE")]
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
    /// Analyze one or more URLs and print the results
    Analyze {
        /// URLs to analyze
        #[arg(required = true, value_name = "URL")]
        urls: Vec<String>,

        /// Also store the results in the database
        #[arg(long)]
        store: bool,
    },

    /// Store a URL for later analysis
    Add {
        url: String,

        /// Label shown next to the URL
        #[arg(long, default_value = "")]
        title: String,
    },

    /// List stored URLs
    List {
        /// Only URLs in this status (pending, analyzing, completed, failed)
        #[arg(long, value_parser = parse_status)]
        status: Option<JobState>,

        /// Case-insensitive substring of the URL or label
        #[arg(long)]
        search: Option<String>,
    },

    /// Show the stored analysis of a URL
    Show { id: i64 },

    /// Delete a stored URL
    Delete { id: i64 },

    /// Analyze stored URLs again (all of them when no ID is given)
    Reanalyze {
        #[arg(value_name = "ID")]
        ids: Vec<i64>,
    },

    /// Write a markdown report of all stored analyses
    Report,

    /// Show statistics from the database
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_config_or_default(cli.config.as_deref()).with_context(|| {
        match &cli.config {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Invalid default configuration".to_string(),
        }
    })?;

    match cli.command {
        Command::Analyze { urls, store } => handle_analyze(&config, &urls, store).await,
        Command::Add { url, title } => handle_add(&config, &url, &title),
        Command::List { status, search } => handle_list(&config, status, search),
        Command::Show { id } => handle_show(&config, id),
        Command::Delete { id } => handle_delete(&config, id),
        Command::Reanalyze { ids } => handle_reanalyze(&config, &ids).await,
        Command::Report => handle_report(&config),
        Command::Stats => handle_stats(&config),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("page_lens=info,warn"),
            1 => EnvFilter::new("page_lens=debug,info"),
            2 => EnvFilter::new("page_lens=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn parse_status(value: &str) -> Result<JobState, String> {
    JobState::from_db_string(&value.to_ascii_lowercase())
        .ok_or_else(|| format!("unknown status '{}'", value))
}

fn open_database(config: &Config) -> anyhow::Result<SqliteStorage> {
    let path = Path::new(&config.output.database_path);
    SqliteStorage::new(path).with_context(|| format!("Failed to open database {}", path.display()))
}

/// Cancels the pool on Ctrl-C so in-flight analyses finish with what they have
fn cancel_on_interrupt(pool: &Arc<AnalysisPool>) {
    let pool = Arc::clone(pool);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling outstanding analyses");
            pool.cancel_all();
        }
    });
}

/// Runs every target through the pool and prints the results in order
async fn run_pool(pool: AnalysisPool, targets: &[String]) -> anyhow::Result<()> {
    let pool = Arc::new(pool);
    cancel_on_interrupt(&pool);

    let mut submitted = HashMap::new();
    for target in targets {
        match pool.submit(target) {
            Ok(id) => {
                let url = pool.target(id).map(|url| url.to_string());
                submitted.insert(id, url.unwrap_or_else(|| target.clone()));
            }
            Err(e) => tracing::error!("Skipping {}: {}", target, e),
        }
    }

    if submitted.is_empty() {
        bail!("No valid URLs to analyze");
    }

    tracing::info!("Analyzing {} URLs", submitted.len());

    for (id, result) in pool.wait_all().await {
        match submitted.get(&id) {
            Some(target) => print_result(target, &result),
            None => print_result(&id.to_string(), &result),
        }
    }

    Ok(())
}

async fn handle_analyze(config: &Config, urls: &[String], store: bool) -> anyhow::Result<()> {
    let mut pool = AnalysisPool::from_config(config)?;

    if store {
        let storage: SharedStorage = Arc::new(Mutex::new(open_database(config)?));
        pool = pool.with_storage(storage);
    }

    run_pool(pool, urls).await
}

fn handle_add(config: &Config, url: &str, title: &str) -> anyhow::Result<()> {
    let target = parse_target(url).with_context(|| format!("Invalid URL '{}'", url))?;

    let mut storage = open_database(config)?;
    let id = storage.insert_url(target.as_str(), title)?;

    println!("Added #{} {}", id, target);
    Ok(())
}

fn handle_list(
    config: &Config,
    status: Option<JobState>,
    search: Option<String>,
) -> anyhow::Result<()> {
    let storage = open_database(config)?;
    let filter = UrlFilter { status, search };
    let records = storage.list_urls(&filter)?;

    if records.is_empty() {
        println!("No stored URLs");
        return Ok(());
    }

    println!(
        "{:>5}  {:<10}  {:>4}  {:<22}  URL",
        "ID", "STATUS", "HTTP", "HTML"
    );
    for record in &records {
        println!(
            "{:>5}  {:<10}  {:>4}  {:<22}  {}",
            record.id,
            record.status.to_string(),
            record.status_code,
            record.html_version,
            record.url
        );
    }
    println!("\n{} URLs", records.len());

    Ok(())
}

fn handle_show(config: &Config, id: i64) -> anyhow::Result<()> {
    let storage = open_database(config)?;
    let record = storage.get_url(id)?;
    print_record(&record);
    Ok(())
}

fn handle_delete(config: &Config, id: i64) -> anyhow::Result<()> {
    let mut storage = open_database(config)?;
    storage.delete_url(id)?;
    println!("Deleted #{}", id);
    Ok(())
}

async fn handle_reanalyze(config: &Config, ids: &[i64]) -> anyhow::Result<()> {
    let storage = open_database(config)?;

    let targets: Vec<String> = if ids.is_empty() {
        storage
            .list_urls(&UrlFilter::default())?
            .into_iter()
            .map(|record| record.url)
            .collect()
    } else {
        ids.iter()
            .map(|id| storage.get_url(*id).map(|record| record.url))
            .collect::<Result<_, _>>()?
    };

    if targets.is_empty() {
        println!("No stored URLs");
        return Ok(());
    }

    let storage: SharedStorage = Arc::new(Mutex::new(storage));
    let pool = AnalysisPool::from_config(config)?.with_storage(storage);
    run_pool(pool, &targets).await
}

fn handle_report(config: &Config) -> anyhow::Result<()> {
    let storage = open_database(config)?;
    let records = storage.list_urls(&UrlFilter::default())?;

    let path = Path::new(&config.output.report_path);
    tracing::info!("Writing report for {} URLs", records.len());
    generate_markdown_report(&records, path)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    println!("Report written to {}", path.display());
    Ok(())
}

fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let storage = open_database(config)?;

    println!("Database: {}\n", config.output.database_path);
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

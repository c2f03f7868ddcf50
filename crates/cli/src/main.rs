//! listenup command line entry point.
//!
//! Searches the public-domain catalogs and manages favorites and the local
//! search cache. Logging goes to stderr so stdout carries only results.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use listenup_client::Aggregator;
use listenup_core::{AggregatedRecord, AppConfig, CacheDb, ReaderTarget};
use tracing_subscriber::EnvFilter;

mod service;
mod status;

use service::SearchService;
use status::SearchStatus;

/// listenup - public-domain books and audiobooks in one search
#[derive(Parser, Debug)]
#[command(name = "listenup", version, about = "Search free e-books and audiobooks across catalogs")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search all catalogs
    Search {
        query: String,

        /// Ignore cached results
        #[arg(long)]
        refresh: bool,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a book to favorites, or remove it if already there
    Favorite {
        title: String,

        #[arg(long, default_value = "")]
        author: String,
    },

    /// List favorites, newest first
    Favorites {
        #[arg(long)]
        json: bool,
    },

    /// Manage the search cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Delete every cached search
    Clear,
    /// Delete cached searches older than the configured max age
    Purge,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let config = AppConfig::load().context("loading configuration")?;
    let cache = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache at {}", config.db_path.display()))?;
    let aggregator = Aggregator::from_config(&config).context("building catalog clients")?;
    let service = SearchService::from_config(aggregator, cache.clone(), &config);

    tracing::debug!(db = %config.db_path.display(), "listenup starting");

    let result = run(cli.command, &service, &config).await;
    cache.close().await.context("closing cache")?;
    result
}

async fn run(command: Command, service: &SearchService, config: &AppConfig) -> Result<()> {
    match command {
        Command::Search { query, refresh, json } => {
            if !json {
                eprintln!("{}", SearchStatus::Searching);
            }
            let outcome = if refresh { service.refresh(&query).await } else { service.search(&query).await };
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}", outcome.status);
                print_records(&outcome.records);
            }
            if outcome.status.is_failure() {
                bail!("search failed: {}", outcome.status);
            }
        }
        Command::Favorite { title, author } => {
            let probe = AggregatedRecord::new(title.trim(), author.trim());
            if service.cache().remove_favorite(&probe).await? {
                println!("Removed from favorites: {}", probe.title);
                return Ok(());
            }

            let outcome = service.search(&probe.title).await;
            let Some(record) = outcome.records.iter().find(|r| r.key() == probe.key()) else {
                bail!("no result matches {:?} ({})", probe.title, outcome.status);
            };
            service.toggle_favorite(record).await?;
            println!("Added to favorites: {}", describe(record));
        }
        Command::Favorites { json } => {
            let favorites = service.list_favorites().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&favorites)?);
            } else if favorites.is_empty() {
                println!("No favorites");
            } else {
                print_records(&favorites);
            }
        }
        Command::Cache { action: CacheAction::Clear } => {
            let removed = service.cache().clear_search_cache().await?;
            println!("Removed {removed} cached searches");
        }
        Command::Cache { action: CacheAction::Purge } => {
            let removed = service.cache().purge_stale_searches(config.cache_max_age()).await?;
            println!("Removed {removed} stale searches");
        }
    }
    Ok(())
}

fn print_records(records: &[AggregatedRecord]) {
    for (i, record) in records.iter().enumerate() {
        println!("{:>3}. {}", i + 1, describe(record));
    }
}

fn describe(record: &AggregatedRecord) -> String {
    let mut line = record.title.clone();
    if !record.author.is_empty() {
        line.push_str(" by ");
        line.push_str(&record.author);
    }

    let mut tags = Vec::new();
    if record.has_text() {
        tags.push("text");
    }
    if record.has_audio() {
        tags.push("audio");
    }
    if let Some(year) = record.first_publish_year {
        line.push_str(&format!(" ({year})"));
    }
    if !tags.is_empty() {
        line.push_str(&format!(" [{}]", tags.join(", ")));
    }
    match record.reader_target() {
        Some(ReaderTarget::InApp(url)) => line.push_str(&format!(" read: {url}")),
        Some(ReaderTarget::External(url)) => line.push_str(&format!(" open: {url}")),
        None => {}
    }
    line
}

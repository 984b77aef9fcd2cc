use std::num::NonZeroU32;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use vacancy_stats::config::DEFAULT_REGION;
use vacancy_stats::{CacheStore, Config, ExperienceFilter, Fetcher, HhClient, Pipeline, SearchQuery};

/// Salary, experience and skill statistics for an hh.ru vacancy search.
#[derive(Debug, Parser)]
#[command(name = "vacancy-stats", version)]
struct Cli {
    /// Search text
    text: String,

    /// Upstream area id (113 = Russia, 1 = Moscow)
    #[arg(long, default_value = DEFAULT_REGION)]
    region: String,

    /// Number of vacancies to fetch
    #[arg(long, default_value = "20")]
    max_results: NonZeroU32,

    /// entry, 1-3, 3-6, 6+ or none
    #[arg(long)]
    experience: Option<String>,

    /// Ignore any cached result and fetch again
    #[arg(long)]
    refresh: bool,

    /// Concurrent detail requests
    #[arg(long)]
    workers: Option<usize>,

    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber (handles both tracing and log crate)
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::from_env().context("failed to read configuration")?;
    if let Some(workers) = cli.workers {
        config.detail_workers = workers.max(1);
    }
    if let Some(cache_dir) = cli.cache_dir {
        config.cache_dir = cache_dir;
    }

    let client = HhClient::from_config(&config).context("failed to build http client")?;
    let cache = CacheStore::new(config.cache_dir.clone());
    cache
        .ensure_root()
        .await
        .with_context(|| format!("failed to create cache dir {}", config.cache_dir.display()))?;
    let pipeline = Pipeline::new(Fetcher::from_config(client, &config), cache);

    let experience = match cli.experience.as_deref() {
        Some(value) => ExperienceFilter::parse_optional(value).map_err(anyhow::Error::msg)?,
        None => None,
    };
    let query = SearchQuery::new(cli.text, cli.region, cli.max_results).with_experience(experience);
    let result = if cli.refresh {
        pipeline.refresh(&query).await
    } else {
        pipeline.search(&query).await
    };
    let bundle = result.context("search failed")?;

    let out = if cli.pretty {
        serde_json::to_string_pretty(&bundle)?
    } else {
        serde_json::to_string(&bundle)?
    };
    println!("{out}");
    Ok(())
}

//! mapharvest is a CLI tool that finds the sitemaps of websites and extracts
//! every page URL they list, along with keywords derived from the URL paths.
//!
//! The tool has three commands:
//! 1. `harvest` - Walks the sitemaps of one or more domains and writes keywords and URLs to files
//! 2. `locate` - Prints the sitemaps discovered for each domain
//! 3. `keywords` - Prints the keywords extracted from the given URLs

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Builder;
use log::{LevelFilter, info, warn};

use mapharvest::{
    AggregateMode, HarvestConfig, HarvestEvent, Harvester, KeywordMode,
    constants::USER_AGENT_ENV_NAME, export::write_aggregate, keywords::extract_keywords,
    normalize::normalize_domain, sitemap::SitemapClient,
};

/// A CLI tool to harvest page URLs and keywords from website sitemaps
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The command to execute (harvest, locate or keywords)
    #[command(subcommand)]
    command: Command,

    #[arg(long, short, action = clap::ArgAction::Count, help = "Output v(v...)erbosity: error (0), warn (1), info (2), debug (3), trace (4)", global = true, default_value_t = 2)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Walk the sitemaps of the given domains and write keywords and URLs to files
    Harvest {
        /// Domains to analyse, e.g. www.example.com
        domains: Vec<String>,
        /// File with one domain per line
        #[arg(long, short)]
        file: Option<PathBuf>,
        /// Keep a separate keyword and URL list for each domain
        #[arg(long)]
        per_domain: bool,
        /// Keyword extraction method: "slug" (default) or "token"
        #[arg(long, short, default_value = "slug")]
        keywords: KeywordMode,
        /// Number of sitemaps downloaded concurrently
        #[arg(long, short, default_value_t = mapharvest::constants::DEFAULT_CONCURRENCY)]
        concurrency: usize,
        /// Directory the result files are written to
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
    },
    /// Print the sitemaps discovered for the given domains
    Locate {
        /// Domains to inspect
        domains: Vec<String>,
    },
    /// Print the keywords extracted from the given page URLs
    Keywords {
        /// Page URLs
        urls: Vec<String>,
        /// Keyword extraction method: "slug" (default) or "token"
        #[arg(long, short, default_value = "slug")]
        keywords: KeywordMode,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .init();

    let mut config = HarvestConfig::default();
    if let Ok(user_agent) = std::env::var(USER_AGENT_ENV_NAME) {
        info!("Using user agent from {USER_AGENT_ENV_NAME}: {user_agent}");
        config.user_agent = user_agent;
    }

    match cli.command {
        Command::Harvest {
            domains,
            file,
            per_domain,
            keywords,
            concurrency,
            output,
        } => {
            config.keyword_mode = keywords;
            config.concurrency = concurrency;
            let mode = if per_domain {
                AggregateMode::PerDomain
            } else {
                AggregateMode::Global
            };
            handle_harvest_command(config, domains, file, mode, output).await
        }
        Command::Locate { domains } => handle_locate_command(config, domains).await,
        Command::Keywords { urls, keywords } => {
            for url in urls {
                for keyword in extract_keywords(&url, &keywords) {
                    println!("{keyword}");
                }
            }
            Ok(())
        }
    }
}

async fn handle_harvest_command(
    config: HarvestConfig,
    mut domains: Vec<String>,
    file: Option<PathBuf>,
    mode: AggregateMode,
    output: PathBuf,
) -> Result<()> {
    if let Some(file) = file {
        let content = fs::read_to_string(&file)
            .context(format!("Failed to read domains file: {}", file.display()))?;
        domains.extend(content.lines().map(str::to_string));
    }
    domains.retain(|domain| !domain.trim().is_empty());

    if domains.is_empty() {
        anyhow::bail!("Please provide at least one domain.");
    }

    let harvester = Harvester::new(config)?.with_event_sink(Arc::new(report_progress));

    let aggregate = harvester.run(&domains, mode).await;
    if aggregate.is_empty() {
        return Ok(());
    }

    for path in write_aggregate(&aggregate, &output)? {
        println!("{}", path.display());
    }

    Ok(())
}

async fn handle_locate_command(config: HarvestConfig, domains: Vec<String>) -> Result<()> {
    let client = SitemapClient::new(&config)?;

    for domain in domains {
        let sitemaps = client.locate_sitemaps(&normalize_domain(&domain)).await;
        if sitemaps.is_empty() {
            warn!("No sitemap found for {domain}");
        }
        for sitemap in sitemaps {
            println!("{domain}\t{sitemap}");
        }
    }

    Ok(())
}

fn report_progress(event: &HarvestEvent) {
    match event {
        HarvestEvent::DomainStarted {
            index,
            total,
            domain,
        } => info!("[{}/{total}] Starting {domain}", index + 1),
        HarvestEvent::SitemapsFound { domain, count } => {
            info!("{domain}: walking {count} sitemap(s)")
        }
        HarvestEvent::NoSitemapFound { domain } => warn!("{domain}: skipped, no sitemap"),
        HarvestEvent::DomainFinished { .. } | HarvestEvent::RunFinished { .. } => {}
    }
}

//! The mapharvest library discovers website sitemaps, walks sitemap indexes down to
//! their URL sets and collects the page URLs and keywords derived from their paths.

use std::time::Duration;

pub mod constants;
pub mod export;
pub mod harvest;
pub mod keywords;
pub mod locate;
pub mod normalize;
pub mod parse;
pub mod sitemap;
pub mod traverse;

use constants::{
    DEFAULT_CONCURRENCY, DEFAULT_USER_AGENT, PROBE_TIMEOUT_SECS, ROBOTS_TIMEOUT_SECS,
    SITEMAP_TIMEOUT_SECS,
};

/// Enum representing the keyword extraction strategy.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum KeywordMode {
    /// The final path segment as one multi-word phrase
    #[default]
    Slug,
    /// Every path token as its own keyword, minus stop words
    Token,
}

impl std::str::FromStr for KeywordMode {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "slug" => Ok(KeywordMode::Slug),
            "token" => Ok(KeywordMode::Token),
            _ => Err(format!("Invalid keyword mode: {}", input)),
        }
    }
}

/// Enum representing how results of a multi-domain run are grouped.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum AggregateMode {
    /// One keyword set and one URL set for the whole run.
    #[default]
    Global,
    /// A keyword set and a URL set per domain.
    PerDomain,
}

/// Settings shared by every request of a run.
#[derive(Clone, Debug)]
pub struct HarvestConfig {
    pub user_agent: String,
    pub robots_timeout: Duration,
    pub probe_timeout: Duration,
    pub sitemap_timeout: Duration,
    /// Maximum number of sitemap downloads in flight at once.
    pub concurrency: usize,
    pub keyword_mode: KeywordMode,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            robots_timeout: Duration::from_secs(ROBOTS_TIMEOUT_SECS),
            probe_timeout: Duration::from_secs(PROBE_TIMEOUT_SECS),
            sitemap_timeout: Duration::from_secs(SITEMAP_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            keyword_mode: KeywordMode::default(),
        }
    }
}

pub use export::write_aggregate;
pub use harvest::{DomainHarvest, EventSink, HarvestEvent, Harvester, ResultAggregate};
pub use keywords::extract_keywords;
pub use normalize::normalize_domain;
pub use traverse::{Harvest, VisitedSitemaps};

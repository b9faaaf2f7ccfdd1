//! The harvest module drives sitemap discovery and traversal across a list of domains.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use log::{debug, error, info};

use crate::normalize::normalize_domain;
use crate::sitemap::SitemapClient;
use crate::traverse::{Harvest, Traverser, VisitedSitemaps};
use crate::{AggregateMode, HarvestConfig};

/// Progress notifications emitted during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestEvent {
    DomainStarted {
        index: usize,
        total: usize,
        domain: String,
    },
    SitemapsFound {
        domain: String,
        count: usize,
    },
    /// No sitemap could be located; the run carries on with the next domain.
    NoSitemapFound {
        domain: String,
    },
    DomainFinished {
        domain: String,
        new_keywords: usize,
        new_urls: usize,
    },
    RunFinished {
        keywords: usize,
        urls: usize,
    },
}

/// Receives progress events.
pub type EventSink = Arc<dyn Fn(&HarvestEvent) + Send + Sync>;

/// Results collected for one domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainHarvest {
    pub domain: String,
    pub harvest: Harvest,
}

/// Final result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultAggregate {
    Global(Harvest),
    /// One entry per distinct domain, in input order.
    PerDomain(Vec<DomainHarvest>),
}

impl ResultAggregate {
    /// Returns true when the run collected nothing at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Global(harvest) => harvest.is_empty(),
            Self::PerDomain(domains) => domains.iter().all(|entry| entry.harvest.is_empty()),
        }
    }

    /// All keywords and URLs of the run, regardless of grouping.
    pub fn totals(&self) -> Harvest {
        match self {
            Self::Global(harvest) => harvest.clone(),
            Self::PerDomain(domains) => {
                let mut totals = Harvest::default();
                for entry in domains {
                    totals.merge(entry.harvest.clone());
                }
                totals
            }
        }
    }
}

/// Runs sitemap harvests over lists of domains.
pub struct Harvester {
    client: SitemapClient,
    config: HarvestConfig,
    events: Option<EventSink>,
}

impl Harvester {
    /// Creates a harvester with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: HarvestConfig) -> Result<Self> {
        Ok(Self {
            client: SitemapClient::new(&config)?,
            config,
            events: None,
        })
    }

    pub fn with_event_sink(mut self, events: EventSink) -> Self {
        self.events = Some(events);
        self
    }

    /// Harvests every domain in order.
    ///
    /// One visited set is shared by all domains, so a sitemap referenced from several
    /// domains is downloaded once. Blank entries are skipped, and a domain that
    /// normalizes to one already listed is processed only under its first spelling.
    /// Failures never abort the run; a domain without sitemaps is reported through
    /// [`HarvestEvent::NoSitemapFound`].
    pub async fn run<S: AsRef<str>>(&self, domains: &[S], mode: AggregateMode) -> ResultAggregate {
        let visited = VisitedSitemaps::new();
        self.run_with_visited(domains, mode, &visited).await
    }

    /// Same as [`Harvester::run`] with a caller supplied visited set.
    pub async fn run_with_visited<S: AsRef<str>>(
        &self,
        domains: &[S],
        mode: AggregateMode,
        visited: &VisitedSitemaps,
    ) -> ResultAggregate {
        let mut distinct = HashSet::new();
        let domains: Vec<&str> = domains
            .iter()
            .map(|domain| domain.as_ref().trim())
            .filter(|domain| !domain.is_empty() && distinct.insert(normalize_domain(domain)))
            .collect();
        let total = domains.len();

        let mut global = Harvest::default();
        let mut per_domain: Vec<DomainHarvest> = Vec::new();

        for (index, domain) in domains.into_iter().enumerate() {
            self.emit(HarvestEvent::DomainStarted {
                index,
                total,
                domain: domain.to_string(),
            });
            debug!("Analysing {domain} ({}/{total})", index + 1);

            let harvest = self.harvest_domain(domain, mode, visited).await;

            let (new_keywords, new_urls) = match mode {
                AggregateMode::Global => {
                    let (keywords_before, urls_before) = (global.keywords.len(), global.urls.len());
                    global.merge(harvest);
                    (
                        global.keywords.len() - keywords_before,
                        global.urls.len() - urls_before,
                    )
                }
                AggregateMode::PerDomain => {
                    let counts = (harvest.keywords.len(), harvest.urls.len());
                    per_domain.push(DomainHarvest {
                        domain: domain.to_string(),
                        harvest,
                    });
                    counts
                }
            };

            info!("{domain}: {new_keywords} keywords and {new_urls} URLs added");
            self.emit(HarvestEvent::DomainFinished {
                domain: domain.to_string(),
                new_keywords,
                new_urls,
            });
        }

        let aggregate = match mode {
            AggregateMode::Global => ResultAggregate::Global(global),
            AggregateMode::PerDomain => ResultAggregate::PerDomain(per_domain),
        };

        let totals = aggregate.totals();
        if totals.is_empty() {
            error!("Analysis finished, but no keyword or URL could be extracted");
        } else {
            info!(
                "Analysis finished: {} unique keywords and {} unique URLs",
                totals.keywords.len(),
                totals.urls.len()
            );
        }
        self.emit(HarvestEvent::RunFinished {
            keywords: totals.keywords.len(),
            urls: totals.urls.len(),
        });

        aggregate
    }

    async fn harvest_domain(
        &self,
        domain: &str,
        mode: AggregateMode,
        visited: &VisitedSitemaps,
    ) -> Harvest {
        let base_url = normalize_domain(domain);
        let sitemaps = self.client.locate_sitemaps(&base_url).await;

        if sitemaps.is_empty() {
            error!("No sitemap could be found for {domain}");
            self.emit(HarvestEvent::NoSitemapFound {
                domain: domain.to_string(),
            });
            return Harvest::default();
        }

        info!("Processing {} sitemap(s) found for {domain}", sitemaps.len());
        self.emit(HarvestEvent::SitemapsFound {
            domain: domain.to_string(),
            count: sitemaps.len(),
        });

        Traverser::new(
            &self.client,
            visited,
            &self.config.keyword_mode,
            self.config.concurrency,
        )
        .keep_documents(mode == AggregateMode::PerDomain)
        .traverse(sitemaps)
        .await
    }

    fn emit(&self, event: HarvestEvent) {
        if let Some(events) = &self.events {
            events(&event);
        }
    }
}

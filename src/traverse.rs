//! The traverse module expands sitemap references into page URLs and keywords.
//!
//! A single [`VisitedSitemaps`] is shared by every traversal of a run. Claiming a
//! reference in it happens before any request is sent, which makes it the one point
//! where concurrent branches synchronize: whoever claims first fetches, everybody
//! else reuses what that fetch recorded.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use log::{debug, error, warn};
use tokio::task::JoinSet;

use crate::KeywordMode;
use crate::keywords::extract_keywords;
use crate::parse::SitemapDocument;
use crate::sitemap::{FetchError, SitemapClient};

/// Keywords and page URLs collected by a traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Harvest {
    pub keywords: BTreeSet<String>,
    pub urls: BTreeSet<String>,
}

impl Harvest {
    /// Returns true when neither keywords nor URLs were collected.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.urls.is_empty()
    }

    /// Moves everything from `other` into `self`.
    pub fn merge(&mut self, other: Harvest) {
        self.keywords.extend(other.keywords);
        self.urls.extend(other.urls);
    }

    fn add_page(&mut self, page_url: &str, mode: &KeywordMode) {
        if self.urls.insert(page_url.to_string()) {
            self.keywords.extend(extract_keywords(page_url, mode));
        }
    }
}

/// Sitemap references already claimed for fetching during a run.
///
/// A claimed reference maps to the document its fetch produced, or to nothing while
/// the fetch is in flight, after it failed, or when the traversal did not keep
/// documents. Kept documents stay in memory until the set is dropped, so a
/// per-domain run over very large sitemaps holds every parsed URL list for its
/// whole duration. Global runs keep only the claimed references.
#[derive(Debug, Default)]
pub struct VisitedSitemaps {
    claimed: Mutex<HashMap<String, Option<Arc<SitemapDocument>>>>,
}

impl VisitedSitemaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `reference` as visited. Returns true only for the first caller.
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned
    pub fn claim(&self, reference: &str) -> bool {
        let mut claimed = self.claimed.lock().expect("Visited set mutex poisoned");
        if claimed.contains_key(reference) {
            return false;
        }
        claimed.insert(reference.to_string(), None);
        true
    }

    /// Returns true if `reference` has been claimed.
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned
    pub fn contains(&self, reference: &str) -> bool {
        self.claimed
            .lock()
            .expect("Visited set mutex poisoned")
            .contains_key(reference)
    }

    /// Number of claimed references.
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned
    pub fn len(&self) -> usize {
        self.claimed.lock().expect("Visited set mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&self, reference: &str, document: Arc<SitemapDocument>) {
        self.claimed
            .lock()
            .expect("Visited set mutex poisoned")
            .insert(reference.to_string(), Some(document));
    }

    /// Returns true if a fetched document is recorded for `reference`.
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned
    pub fn has_document(&self, reference: &str) -> bool {
        self.recorded(reference).is_some()
    }

    fn recorded(&self, reference: &str) -> Option<Arc<SitemapDocument>> {
        self.claimed
            .lock()
            .expect("Visited set mutex poisoned")
            .get(reference)
            .cloned()
            .flatten()
    }
}

/// Walks sitemap references with a bounded number of concurrent fetches.
pub struct Traverser<'a> {
    client: &'a SitemapClient,
    visited: &'a VisitedSitemaps,
    keyword_mode: &'a KeywordMode,
    concurrency: usize,
    keep_documents: bool,
}

type FetchOutcome = (String, Result<SitemapDocument, FetchError>);

impl<'a> Traverser<'a> {
    pub fn new(
        client: &'a SitemapClient,
        visited: &'a VisitedSitemaps,
        keyword_mode: &'a KeywordMode,
        concurrency: usize,
    ) -> Self {
        Self {
            client,
            visited,
            keyword_mode,
            concurrency: concurrency.max(1),
            keep_documents: true,
        }
    }

    /// Whether fetched documents are recorded in the visited set for later
    /// traversals to replay. Defaults to true.
    pub fn keep_documents(mut self, keep: bool) -> Self {
        self.keep_documents = keep;
        self
    }

    /// Resolves `roots` into page URLs and keywords.
    ///
    /// Index documents are expanded in document order. References claimed by an
    /// earlier traversal of the same run are not fetched again; their recorded
    /// content is credited to this traversal instead. Fetch failures are logged and
    /// contribute nothing.
    pub async fn traverse<I>(&self, roots: I) -> Harvest
    where
        I: IntoIterator<Item = String>,
    {
        let mut pending: VecDeque<String> = roots.into_iter().collect();
        let mut seen: HashSet<String> = HashSet::new();
        let mut in_flight: JoinSet<FetchOutcome> = JoinSet::new();
        let mut harvest = Harvest::default();

        loop {
            while in_flight.len() < self.concurrency {
                let Some(reference) = pending.pop_front() else {
                    break;
                };
                if !seen.insert(reference.clone()) {
                    continue;
                }

                if self.visited.claim(&reference) {
                    let client = self.client.clone();
                    in_flight.spawn(async move {
                        let document = client.fetch_sitemap(&reference).await;
                        (reference, document)
                    });
                } else if let Some(document) = self.visited.recorded(&reference) {
                    debug!("Reusing already visited sitemap {reference}");
                    self.collect(&document, &mut pending, &mut harvest);
                } else {
                    debug!("Skipping already visited sitemap {reference}");
                }
            }

            match in_flight.join_next().await {
                Some(Ok((reference, Ok(document)))) => {
                    let document = Arc::new(document);
                    if self.keep_documents {
                        self.visited.record(&reference, Arc::clone(&document));
                    }
                    self.collect(&document, &mut pending, &mut harvest);
                }
                Some(Ok((reference, Err(fetch_error)))) => {
                    warn!("Unable to download {reference}: {fetch_error}");
                }
                Some(Err(join_error)) => error!("Sitemap fetch task failed: {join_error}"),
                None => break,
            }
        }

        harvest
    }

    fn collect(
        &self,
        document: &SitemapDocument,
        pending: &mut VecDeque<String>,
        harvest: &mut Harvest,
    ) {
        match document {
            SitemapDocument::Index(references) => {
                debug!("Index detected with {} nested sitemaps", references.len());
                pending.extend(references.iter().cloned());
            }
            SitemapDocument::UrlSet(urls) => {
                for url in urls {
                    harvest.add_page(url, self.keyword_mode);
                }
            }
            SitemapDocument::Empty => debug!("Sitemap document without entries"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_concurrent_claim_wins() {
        let visited = VisitedSitemaps::new();

        let winners = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| visited.claim("https://example.com/sitemap.xml")))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or(false))
                .filter(|won| *won)
                .count()
        });

        assert_eq!(winners, 1);
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn recorded_document_is_returned_after_claim() {
        let visited = VisitedSitemaps::new();
        let reference = "https://example.com/pages.xml";

        assert!(visited.claim(reference));
        assert_eq!(visited.recorded(reference), None);

        let document = Arc::new(SitemapDocument::UrlSet(vec!["https://example.com/a".to_string()]));
        visited.record(reference, Arc::clone(&document));

        assert!(!visited.claim(reference));
        assert!(visited.has_document(reference));
        assert_eq!(visited.recorded(reference), Some(document));
    }
}

//! The locate module discovers the sitemaps a site declares or serves at well-known paths.

use std::collections::HashSet;

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use url::Url;

use crate::constants::{ROBOTS_SITEMAP_DIRECTIVE, WELL_KNOWN_SITEMAP_PATHS};
use crate::sitemap::SitemapClient;

static ROBOTS_SITEMAP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(ROBOTS_SITEMAP_DIRECTIVE).expect("Failed to compile ROBOTS_SITEMAP_DIRECTIVE regex")
});

/// Collects `Sitemap:` directives from a `robots.txt` body in declaration order.
pub fn robots_sitemaps(robots: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    ROBOTS_SITEMAP_REGEX
        .captures_iter(robots)
        .filter_map(|captures| captures.get(1))
        .map(|found| found.as_str().trim().to_string())
        .filter(|reference| seen.insert(reference.clone()))
        .collect()
}

impl SitemapClient {
    /// Finds candidate sitemap references for a normalized base URL.
    ///
    /// `robots.txt` directives are used when present; otherwise the well-known paths are
    /// probed in order and the first one answering 200 wins, recorded by its final
    /// post-redirect URL. Every failure along the way is logged and skipped, so an empty
    /// result means no sitemap could be found.
    pub async fn locate_sitemaps(&self, base_url: &str) -> Vec<String> {
        let base = match Url::parse(base_url) {
            Ok(base) => base,
            Err(parse_error) => {
                warn!("Invalid base URL {base_url}: {parse_error}");
                return Vec::new();
            }
        };

        let declared = self.robots_declared_sitemaps(&base).await;
        if !declared.is_empty() {
            info!("Found {} sitemap(s) in robots.txt of {base_url}", declared.len());
            return declared;
        }

        self.probe_well_known_paths(&base).await.into_iter().collect()
    }

    async fn robots_declared_sitemaps(&self, base: &Url) -> Vec<String> {
        let robots_url = match base.join("/robots.txt") {
            Ok(robots_url) => robots_url,
            Err(join_error) => {
                warn!("Unable to build robots.txt URL for {base}: {join_error}");
                return Vec::new();
            }
        };

        let response = match self
            .client
            .get(robots_url.clone())
            .timeout(self.robots_timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                warn!("Error fetching {robots_url}: {error}");
                return Vec::new();
            }
        };

        if response.status() != StatusCode::OK {
            warn!("Skipping {robots_url} as {}", response.status());
            return Vec::new();
        }

        match response.text().await {
            Ok(robots) => robots_sitemaps(&robots),
            Err(error) => {
                warn!("Error reading {robots_url}: {error}");
                Vec::new()
            }
        }
    }

    async fn probe_well_known_paths(&self, base: &Url) -> Option<String> {
        for path in WELL_KNOWN_SITEMAP_PATHS {
            let candidate = match base.join(path) {
                Ok(candidate) => candidate,
                Err(join_error) => {
                    warn!("Unable to build {path} URL for {base}: {join_error}");
                    continue;
                }
            };

            match self
                .client
                .head(candidate.clone())
                .timeout(self.probe_timeout)
                .send()
                .await
            {
                Ok(response) if response.status() == StatusCode::OK => {
                    info!("Potential sitemap found at {}", response.url());
                    return Some(response.url().to_string());
                }
                Ok(response) => debug!("Probe of {candidate} answered {}", response.status()),
                Err(error) => debug!("Probe of {candidate} failed: {error}"),
            }
        }

        None
    }
}

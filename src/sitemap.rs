//! The sitemap module downloads single sitemap documents.

use std::io::Read;
use std::time::Duration;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use log::debug;
use reqwest::{Client, StatusCode};

use crate::HarvestConfig;
use crate::parse::{SitemapDocument, parse_sitemap};

/// Why a single fetch yielded nothing.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),
    #[error("gzip decompression failed: {0}")]
    Decompress(#[from] std::io::Error),
}

/// HTTP client shared by the locator and the traverser.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Clone, Debug)]
pub struct SitemapClient {
    pub(crate) client: Client,
    pub(crate) robots_timeout: Duration,
    pub(crate) probe_timeout: Duration,
    sitemap_timeout: Duration,
}

impl SitemapClient {
    /// Creates a client sending the configured user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &HarvestConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Unable to build HTTP client.")?;

        Ok(Self {
            client,
            robots_timeout: config.robots_timeout,
            probe_timeout: config.probe_timeout,
            sitemap_timeout: config.sitemap_timeout,
        })
    }

    /// Downloads and parses one sitemap document.
    ///
    /// References ending in `.gz` are decompressed before parsing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers with a non-success
    /// status, or a `.gz` payload cannot be decompressed. Malformed XML is not an
    /// error and yields [`SitemapDocument::Empty`].
    pub async fn fetch_sitemap(&self, reference: &str) -> Result<SitemapDocument, FetchError> {
        debug!("Downloading {reference}");

        let response = self
            .client
            .get(reference)
            .timeout(self.sitemap_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let content = response.bytes().await?;

        if reference.ends_with(".gz") {
            Ok(parse_sitemap(&gunzip(&content)?))
        } else {
            Ok(parse_sitemap(&content))
        }
    }
}

fn gunzip(content: &[u8]) -> Result<Vec<u8>, std::io::Error> {
    let mut decompressed = Vec::new();
    GzDecoder::new(content).read_to_end(&mut decompressed)?;
    Ok(decompressed)
}

#![allow(dead_code)]

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use flate2::{Compression, write::GzEncoder};
use mapharvest::{HarvestConfig, HarvestEvent, Harvester, KeywordMode};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub(crate) fn urlset(urls: &[&str]) -> String {
    let entries: String = urls
        .iter()
        .map(|url| format!("  <url><loc>{url}</loc><changefreq>weekly</changefreq></url>\n"))
        .collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{entries}</urlset>"
    )
}

pub(crate) fn sitemap_index(references: &[String]) -> String {
    let entries: String = references
        .iter()
        .map(|reference| format!("  <sitemap>\n    <loc>\n      {reference}\n    </loc>\n  </sitemap>\n"))
        .collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<sitemapindex xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{entries}</sitemapindex>"
    )
}

pub(crate) fn robots(sitemaps: &[String]) -> String {
    let directives: String = sitemaps
        .iter()
        .map(|sitemap| format!("Sitemap: {sitemap}\n"))
        .collect();

    format!("User-agent: *\nDisallow: /admin\n\n{directives}")
}

pub(crate) fn gzip(content: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(content)
        .expect("Expected gzip encoding to succeed.");
    encoder.finish().expect("Expected gzip encoding to finish.")
}

/// Serves `body` for GET requests to `route`, expecting exactly `calls` requests.
pub(crate) async fn serve(server: &MockServer, route: &str, body: impl Into<Vec<u8>>, calls: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.into()))
        .expect(calls)
        .mount(server)
        .await;
}

/// Answers GET requests to `route` with `status`, expecting exactly `calls` requests.
pub(crate) async fn fail(server: &MockServer, route: &str, status: u16, calls: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .expect(calls)
        .mount(server)
        .await;
}

/// Answers HEAD requests to `route` with `status`, expecting exactly `calls` requests.
pub(crate) async fn head(server: &MockServer, route: &str, status: u16, calls: u64) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .expect(calls)
        .mount(server)
        .await;
}

/// Answers `verb` requests to `route` with a 200 and `body` only after `delay`.
pub(crate) async fn delayed(
    server: &MockServer,
    verb: &str,
    route: &str,
    body: impl Into<Vec<u8>>,
    delay: Duration,
    calls: u64,
) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body.into())
                .set_delay(delay),
        )
        .expect(calls)
        .mount(server)
        .await;
}

pub(crate) fn harvester(keyword_mode: KeywordMode, concurrency: usize) -> Harvester {
    configured_harvester(HarvestConfig {
        keyword_mode,
        concurrency,
        ..HarvestConfig::default()
    })
}

pub(crate) fn configured_harvester(config: HarvestConfig) -> Harvester {
    Harvester::new(config).expect("Expected harvester to build.")
}

/// A harvester recording every event it emits.
pub(crate) fn recording_harvester(concurrency: usize) -> (Harvester, Arc<Mutex<Vec<HarvestEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let harvester = harvester(KeywordMode::Slug, concurrency).with_event_sink(Arc::new(
        move |event: &HarvestEvent| {
            sink.lock()
                .expect("Expected event mutex to be available.")
                .push(event.clone());
        },
    ));

    (harvester, events)
}

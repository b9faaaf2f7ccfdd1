//! The parse module classifies sitemap documents and pulls out their `loc` entries.

use log::debug;
use quick_xml::Reader;
use quick_xml::events::{BytesText, Event};

/// Content of one sitemap document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SitemapDocument {
    /// A `<sitemapindex>` listing nested sitemap references.
    Index(Vec<String>),
    /// A `<urlset>` listing page URLs.
    UrlSet(Vec<String>),
    /// Anything else, including malformed or empty input.
    #[default]
    Empty,
}

impl SitemapDocument {
    /// Returns true when the document yielded neither references nor URLs.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Index(references) => references.is_empty(),
            Self::UrlSet(urls) => urls.is_empty(),
            Self::Empty => true,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Entry {
    Page,
    Nested,
}

/// Parses raw sitemap bytes.
///
/// Index entries take priority: a document holding any `<sitemap>` element is an
/// index and its `<url>` entries are ignored. Each entry contributes the trimmed text
/// of its first `<loc>`, exactly as written. Entries that fail to read are skipped and
/// reading carries on with the rest of the document.
pub fn parse_sitemap(content: &[u8]) -> SitemapDocument {
    let mut reader = Reader::from_reader(content);
    reader.config_mut().trim_text(true);
    reader.config_mut().check_end_names = false;

    let mut buf = Vec::new();
    let mut references = Vec::new();
    let mut urls = Vec::new();
    let mut has_index_entries = false;

    let mut entry: Option<Entry> = None;
    let mut entry_has_loc = false;
    let mut in_loc = false;
    let mut loc = String::new();

    loop {
        let position = reader.buffer_position();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"url" => {
                    entry = Some(Entry::Page);
                    entry_has_loc = false;
                }
                b"sitemap" => {
                    has_index_entries = true;
                    entry = Some(Entry::Nested);
                    entry_has_loc = false;
                }
                b"loc" if entry.is_some() && !entry_has_loc => {
                    in_loc = true;
                    loc.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"sitemap" => {
                has_index_entries = true;
            }
            Ok(Event::Text(e)) if in_loc => loc.push_str(&text_of(&e)),
            Ok(Event::CData(e)) if in_loc => loc.push_str(&String::from_utf8_lossy(&e)),
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"loc" if in_loc => {
                    in_loc = false;
                    entry_has_loc = true;
                    let value = loc.trim();
                    if !value.is_empty() {
                        match entry {
                            Some(Entry::Page) => urls.push(value.to_string()),
                            Some(Entry::Nested) => references.push(value.to_string()),
                            None => {}
                        }
                    }
                }
                b"url" | b"sitemap" => {
                    entry = None;
                    in_loc = false;
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(error) => {
                debug!("Skipping unreadable sitemap content: {error}");
                if reader.buffer_position() == position {
                    break;
                }
            }
            _ => {}
        }
        buf.clear();
    }

    if has_index_entries {
        SitemapDocument::Index(references)
    } else if !urls.is_empty() {
        SitemapDocument::UrlSet(urls)
    } else {
        SitemapDocument::Empty
    }
}

/// Unescaped text, or the raw text when it holds a bare `&` or an unknown entity.
fn text_of(text: &BytesText) -> String {
    match text.unescape() {
        Ok(unescaped) => unescaped.into_owned(),
        Err(_) => String::from_utf8_lossy(text).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(values: &[&str]) -> SitemapDocument {
        SitemapDocument::UrlSet(values.iter().map(|value| value.to_string()).collect())
    }

    #[test]
    fn index_entries_take_priority_over_urls() {
        let document = br#"<?xml version="1.0" encoding="UTF-8"?>
            <sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <sitemap><loc>https://example.com/a.xml</loc></sitemap>
              <url><loc>https://example.com/page</loc></url>
            </sitemapindex>"#;

        assert_eq!(
            parse_sitemap(document),
            SitemapDocument::Index(vec!["https://example.com/a.xml".to_string()])
        );
    }

    #[test]
    fn sitemap_element_inside_a_urlset_makes_it_an_index() {
        let document = br#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>https://example.com/page</loc></url>
              <sitemap><loc>https://example.com/nested.xml</loc></sitemap>
            </urlset>"#;

        assert_eq!(
            parse_sitemap(document),
            SitemapDocument::Index(vec!["https://example.com/nested.xml".to_string()])
        );
    }

    #[test]
    fn bare_ampersand_keeps_the_entry_and_the_ones_after_it() {
        let document = br#"<urlset>
              <url><loc>https://example.com/one</loc></url>
              <url><loc>https://example.com/search?a=1&b=2</loc></url>
              <url><loc>https://example.com/three</loc></url>
            </urlset>"#;

        assert_eq!(
            parse_sitemap(document),
            urls(&[
                "https://example.com/one",
                "https://example.com/search?a=1&b=2",
                "https://example.com/three",
            ])
        );
    }

    #[test]
    fn escaped_entities_are_unescaped() {
        let document = b"<urlset><url><loc>https://example.com/?a=1&amp;b=2</loc></url></urlset>";

        assert_eq!(parse_sitemap(document), urls(&["https://example.com/?a=1&b=2"]));
    }

    #[test]
    fn loc_text_is_kept_as_written() {
        let document = "<urlset>
              <url><loc>  https://Example.com  </loc></url>
              <url><loc>/relative/page</loc></url>
              <url><loc>https://example.com/café-crème</loc></url>
            </urlset>";

        assert_eq!(
            parse_sitemap(document.as_bytes()),
            urls(&[
                "https://Example.com",
                "/relative/page",
                "https://example.com/café-crème",
            ])
        );
    }

    #[test]
    fn only_the_first_loc_of_an_entry_counts() {
        let document = br#"<urlset xmlns:image="http://www.google.com/schemas/sitemap-image/1.1">
              <url>
                <loc>https://example.com/gallery</loc>
                <image:image><image:loc>https://example.com/photo.jpg</image:loc></image:image>
              </url>
            </urlset>"#;

        assert_eq!(parse_sitemap(document), urls(&["https://example.com/gallery"]));
    }

    #[test]
    fn namespaced_and_cdata_locs_are_read() {
        let document = br#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
              <sm:url><sm:loc><![CDATA[https://example.com/wrapped]]></sm:loc></sm:url>
            </sm:urlset>"#;

        assert_eq!(parse_sitemap(document), urls(&["https://example.com/wrapped"]));
    }

    #[test]
    fn empty_input_is_an_empty_document() {
        assert_eq!(parse_sitemap(b""), SitemapDocument::Empty);
        assert!(parse_sitemap(b"").is_empty());
    }

    #[test]
    fn html_is_an_empty_document() {
        assert_eq!(
            parse_sitemap(b"<html><body><p>Not a sitemap</p></body></html>"),
            SitemapDocument::Empty
        );
    }
}

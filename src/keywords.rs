//! The keywords module derives keyword phrases from page URL paths.

use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use url::Url;

use crate::KeywordMode;
use crate::constants::{FILE_EXTENSION_SUFFIX, KEYWORD_SEPARATORS, STOP_WORDS, TOKEN_SEPARATORS};

static FILE_EXTENSION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(FILE_EXTENSION_SUFFIX).expect("Failed to compile FILE_EXTENSION_SUFFIX regex")
});

static KEYWORD_SEPARATORS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(KEYWORD_SEPARATORS).expect("Failed to compile KEYWORD_SEPARATORS regex")
});

static TOKEN_SEPARATORS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(TOKEN_SEPARATORS).expect("Failed to compile TOKEN_SEPARATORS regex")
});

/// Extracts keywords from the path of a page URL.
///
/// The path is percent-decoded first, so accented slugs yield accented keywords.
/// Returns nothing for URLs that cannot be parsed.
///
/// # Arguments
///
/// * `page_url` - The page URL as found in a sitemap
/// * `mode` - Whether to keep the final slug as one phrase or split the whole path into tokens
pub fn extract_keywords(page_url: &str, mode: &KeywordMode) -> Vec<String> {
    let url = match Url::parse(page_url) {
        Ok(url) => url,
        Err(_) => return Vec::new(),
    };

    let path = percent_decode_str(url.path()).decode_utf8_lossy();

    match mode {
        KeywordMode::Slug => slug_phrase(&path).into_iter().collect(),
        KeywordMode::Token => path_tokens(&path),
    }
}

/// The final path segment as a single space separated phrase.
fn slug_phrase(path: &str) -> Option<String> {
    let slug = path.trim_matches('/').rsplit('/').next()?;
    let slug = FILE_EXTENSION_REGEX.replace(slug, "");
    let phrase = KEYWORD_SEPARATORS_REGEX
        .replace_all(&slug, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    keep_phrase(&phrase).then_some(phrase)
}

fn path_tokens(path: &str) -> Vec<String> {
    TOKEN_SEPARATORS_REGEX
        .split(path)
        .map(|token| FILE_EXTENSION_REGEX.replace(token, "").trim().to_lowercase())
        .filter(|token| keep_phrase(token) && !STOP_WORDS.contains(&token.as_str()))
        .collect()
}

fn keep_phrase(phrase: &str) -> bool {
    !phrase.is_empty() && !phrase.chars().all(|c| c.is_ascii_digit())
}

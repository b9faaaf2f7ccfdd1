//! Turns user supplied domain strings into base URLs.

/// Normalizes a raw domain into a base URL with an explicit scheme and no trailing slash.
///
/// Strings without a scheme get `https://`.
///
/// ```
/// use mapharvest::normalize::normalize_domain;
///
/// assert_eq!(normalize_domain("example.com"), "https://example.com");
/// assert_eq!(normalize_domain("http://example.com/"), "http://example.com");
/// ```
pub fn normalize_domain(raw: &str) -> String {
    let domain = raw.trim();

    if domain.contains("://") {
        domain.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", domain.trim_matches('/'))
    }
}

pub const USER_AGENT_ENV_NAME: &str = "MAPHARVEST_USER_AGENT";

pub const DEFAULT_USER_AGENT: &str = "MapHarvest Bot";

pub const ROBOTS_TIMEOUT_SECS: u64 = 10;
pub const PROBE_TIMEOUT_SECS: u64 = 5;
pub const SITEMAP_TIMEOUT_SECS: u64 = 20;

pub const DEFAULT_CONCURRENCY: usize = 4;

/// Probed in this order when `robots.txt` declares no sitemap.
pub const WELL_KNOWN_SITEMAP_PATHS: [&str; 3] =
    ["/sitemap.xml", "/sitemap_index.xml", "/sitemap.xml.gz"];

pub(crate) const ROBOTS_SITEMAP_DIRECTIVE: &str = r"(?im)^[ \t]*sitemap:[ \t]*(\S+)";

pub(crate) const FILE_EXTENSION_SUFFIX: &str = r"\.\w+$";

pub(crate) const KEYWORD_SEPARATORS: &str = r"[-_]";

pub(crate) const TOKEN_SEPARATORS: &str = r"[/_-]";

/// Tokens dropped in token mode: locale and TLD fragments, structural path
/// words and common French stop words.
pub(crate) const STOP_WORDS: &[&str] = &[
    "fr", "en", "de", "es", "it", "com", "net", "org", "www", "http", "https", "html", "htm",
    "php", "asp", "aspx", "index", "page", "pages", "amp", "tag", "tags", "category",
    "categorie", "categories", "produit", "produits", "product", "products", "post", "posts",
    "le", "la", "les", "un", "une", "des", "du", "et", "ou", "au", "aux", "pour", "par",
    "sur", "avec", "dans", "a", "l", "d",
];

pub const GLOBAL_KEYWORDS_FILE_NAME: &str = "sitemap_keywords.txt";
pub const GLOBAL_URLS_FILE_NAME: &str = "sitemap_urls.txt";

//! The export module renders harvest results as plain-text files.

use std::collections::{BTreeSet, HashSet};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use crate::constants::{GLOBAL_KEYWORDS_FILE_NAME, GLOBAL_URLS_FILE_NAME};
use crate::harvest::ResultAggregate;

/// Which half of a harvest a file holds.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExportKind {
    Keywords,
    Urls,
}

impl ExportKind {
    fn suffix(self) -> &'static str {
        match self {
            Self::Keywords => "keywords",
            Self::Urls => "urls",
        }
    }
}

/// Joins the set with newlines in lexicographic order.
pub fn render_lines(values: &BTreeSet<String>) -> String {
    values.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
}

/// File name for one domain's export: non-alphanumeric characters become `_`.
///
/// ```
/// use mapharvest::export::{ExportKind, file_name};
///
/// assert_eq!(file_name("www.example.com", ExportKind::Urls), "www_example_com_urls.txt");
/// ```
pub fn file_name(domain: &str, kind: ExportKind) -> String {
    stem_file_name(&sanitize(domain), kind)
}

fn sanitize(domain: &str) -> String {
    domain
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn stem_file_name(stem: &str, kind: ExportKind) -> String {
    format!("{stem}_{}.txt", kind.suffix())
}

/// Claims `stem`, or `stem_2`, `stem_3` and so on when it is already taken.
fn unique_stem(stem: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(stem.clone()) {
        return stem;
    }

    let mut counter = 2;
    loop {
        let candidate = format!("{stem}_{counter}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Writes the aggregate into `output_dir`, creating the directory if needed.
///
/// Global results land in `sitemap_keywords.txt` and `sitemap_urls.txt`; per-domain
/// results get one pair of files per domain. Domains whose names sanitize to the same
/// stem get `_2`, `_3` and so on appended in input order. Empty sets produce no file.
///
/// # Returns
///
/// The paths of the written files.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or a file cannot be written.
pub fn write_aggregate(aggregate: &ResultAggregate, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .context(format!("Failed to create output directory: {}", output_dir.display()))?;

    let mut written = Vec::new();

    let files: Vec<(String, &BTreeSet<String>)> = match aggregate {
        ResultAggregate::Global(harvest) => vec![
            (GLOBAL_KEYWORDS_FILE_NAME.to_string(), &harvest.keywords),
            (GLOBAL_URLS_FILE_NAME.to_string(), &harvest.urls),
        ],
        ResultAggregate::PerDomain(domains) => {
            let mut taken = HashSet::new();
            domains
                .iter()
                .flat_map(|entry| {
                    let stem = unique_stem(sanitize(&entry.domain), &mut taken);
                    [
                        (
                            stem_file_name(&stem, ExportKind::Keywords),
                            &entry.harvest.keywords,
                        ),
                        (stem_file_name(&stem, ExportKind::Urls), &entry.harvest.urls),
                    ]
                })
                .collect()
        }
    };

    for (name, values) in files {
        if values.is_empty() {
            continue;
        }

        let path = output_dir.join(name);
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&path)
            .context(format!("Failed to open output file: {}", path.display()))?;
        file.write_all(render_lines(values).as_bytes())?;

        info!("Wrote {} lines to {}", values.len(), path.display());
        written.push(path);
    }

    Ok(written)
}

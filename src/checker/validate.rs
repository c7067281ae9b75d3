// src/checker/validate.rs
// =============================================================================
// Walks a generated site and checks that every link in it answers.
//
// How it works:
// 1. Find every .htm/.html file under the site root
// 2. Extract the href values from each page
// 3. Turn each href into an absolute URL for the chosen host:
//      "https://..."   -> used as is
//      "/api/Foo.html" -> base URL + "api/Foo.html"
//      "Bar.html"      -> base URL + page's directory + "Bar.html"
// 4. Probe each distinct URL once; later occurrences reuse the first answer
// 5. Classify: 2xx is good, a failed github.com link is flagged (GitHub
//    routinely answers scrapers with 404), anything else is bad
//
// Nothing on disk is modified. The cache lives only as long as one pass.
// =============================================================================

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tracing::{error, info, warn};
use url::Url;

use super::extract::extract_links;
use super::probe::{is_success, Probe};
use crate::platform;

/// How long a single probe may take.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Pages that are scanned for links.
const PAGE_EXTENSIONS: &[&str] = &["htm", "html"];

/// Outcome of probing one distinct URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Good,
    GithubFalsePositive,
    Bad,
}

/// One href found in one page, plus what it needs to be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    /// The href exactly as extracted (fragment and query already removed).
    pub href: String,
    /// The page the href was found in.
    pub file: PathBuf,
    /// The page's directory relative to the site root, "" or ending in '/'.
    pub relative_dir: String,
}

impl LinkRecord {
    // Resolves the href into an absolute URL
    //
    // Example with base "http://localhost:8080/" and relative_dir "guide/":
    //   "/api/Foo.html" -> "http://localhost:8080/api/Foo.html"
    //   "Bar.html"      -> "http://localhost:8080/guide/Bar.html"
    pub fn resolve(&self, base_url: &str) -> String {
        if self.href.starts_with("http://") || self.href.starts_with("https://") {
            self.href.clone()
        } else if let Some(rooted) = self.href.strip_prefix('/') {
            format!("{}{}", base_url, rooted)
        } else {
            format!("{}{}{}", base_url, self.relative_dir, self.href)
        }
    }
}

/// A place a URL was referenced from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub file: PathBuf,
    pub href: String,
}

/// Verdict for one distinct absolute URL.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub url: String,
    pub status: LinkStatus,
    pub status_code: u16,
    /// Every page/href that resolved to this URL, first one first.
    pub occurrences: Vec<Occurrence>,
}

/// Totals for a validation pass, plus the per-URL detail.
#[derive(Debug, Default, Serialize)]
pub struct ValidationSummary {
    pub good: usize,
    pub github: usize,
    pub bad: usize,
    pub results: Vec<ValidationResult>,
}

impl ValidationSummary {
    /// Results that were not reachable, in the order they were found.
    pub fn failures(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| r.status != LinkStatus::Good)
    }
}

/// Probes links with a per-pass cache keyed by the absolute URL.
pub struct LinkValidator<'a> {
    probe: &'a dyn Probe,
    base_url: String,
    timeout: Duration,
    // url -> index into summary.results
    cache: HashMap<String, usize>,
    summary: ValidationSummary,
}

impl<'a> LinkValidator<'a> {
    pub fn new(probe: &'a dyn Probe, base_url: impl Into<String>) -> Self {
        Self {
            probe,
            base_url: base_url.into(),
            timeout: PROBE_TIMEOUT,
            cache: HashMap::new(),
            summary: ValidationSummary::default(),
        }
    }

    /// Checks every page under `root`. Returns the totals for the pass.
    pub fn validate_tree(mut self, root: &Path) -> ValidationSummary {
        let pages = platform::files_with_extensions(root, PAGE_EXTENSIONS);
        info!("Checking links in {} files; this will take a while ...", pages.len());

        for page in pages {
            let content = match fs::read(&page) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    warn!("Unable to read {}: {}", page.display(), e);
                    continue;
                }
            };
            let relative_dir = page
                .parent()
                .map(|dir| platform::relative_dir(root, dir))
                .unwrap_or_default();

            for href in extract_links(&content) {
                self.check(LinkRecord {
                    href,
                    file: page.clone(),
                    relative_dir: relative_dir.clone(),
                });
            }
        }

        self.summary
    }

    // Checks a single link, probing only if its URL hasn't been seen yet
    pub fn check(&mut self, record: LinkRecord) -> LinkStatus {
        let url = record.resolve(&self.base_url);
        let occurrence = Occurrence {
            file: record.file,
            href: record.href,
        };

        if let Some(&index) = self.cache.get(&url) {
            let cached = &mut self.summary.results[index];
            cached.occurrences.push(occurrence);
            return cached.status;
        }

        let status_code = self.probe.get(&url, self.timeout);
        let status = classify(&url, status_code);
        match status {
            LinkStatus::Good => self.summary.good += 1,
            LinkStatus::GithubFalsePositive => {
                info!(
                    "Unable to access {} first found in {} ({}).",
                    url,
                    occurrence.file.display(),
                    status_code
                );
                info!("\tThis usually is a false positive due to GitHub fighting scraping and returning 404.");
                self.summary.github += 1;
            }
            LinkStatus::Bad => {
                error!(
                    "Unable to access {} first found in {} ({}).",
                    url,
                    occurrence.file.display(),
                    status_code
                );
                self.summary.bad += 1;
            }
        }

        self.cache.insert(url.clone(), self.summary.results.len());
        self.summary.results.push(ValidationResult {
            url,
            status,
            status_code,
            occurrences: vec![occurrence],
        });
        status
    }

    #[cfg(test)]
    pub fn into_summary(self) -> ValidationSummary {
        self.summary
    }
}

/// Decides what a status code means for a given URL.
pub fn classify(url: &str, status_code: u16) -> LinkStatus {
    if is_success(status_code) {
        LinkStatus::Good
    } else if is_github(url) {
        LinkStatus::GithubFalsePositive
    } else {
        LinkStatus::Bad
    }
}

fn is_github(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_lowercase))
        .is_some_and(|host| host == "github.com" || host == "www.github.com")
}

// Validates a whole tree and returns the summary
//
// Convenience wrapper used by the validate-links step.
pub fn validate_links(root: &Path, base_url: &str, probe: &dyn Probe) -> Result<ValidationSummary> {
    if !root.is_dir() {
        anyhow::bail!("site directory {} does not exist", root.display());
    }
    Ok(LinkValidator::new(probe, base_url).validate_tree(root))
}

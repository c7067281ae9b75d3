// src/checker/host.rs
// =============================================================================
// Deployment targets and the text substitutions that retarget a built site.
//
// The same generated tree is served from three places:
// - Local: the doc builder's own web server on http://localhost:8080/
// - Dev:   the development domain (published from the `dev` branch)
// - Main:  the production domain (published from the `main` branch)
//
// Absolute links inside the tree carry one of those hosts. Before publishing
// we rewrite them to the target host with plain, ordered string replacements.
// Within a single host's rule set no replacement produces text that another
// replacement looks for, so applying the rules twice changes nothing.
// =============================================================================

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Authority of the doc builder's local web server.
pub const LOCAL_AUTHORITY: &str = "localhost:8080";

/// Base URL of the doc builder's local web server.
pub const LOCAL_BASE_URL: &str = "http://localhost:8080/";

/// One of the three places a built site can be served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HostProfile {
    Local,
    Dev,
    Main,
}

/// Domains and repositories a site is published under, read from dox.toml.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SiteDomains {
    /// Domain serving the `dev` branch, without scheme (docs-dev.example.com).
    pub dev_domain: String,
    /// Domain serving the `main` branch, without scheme.
    pub main_domain: String,
    /// Repository that "view source" links point into, without trailing slash.
    pub source_repository: String,
}

impl Default for SiteDomains {
    fn default() -> Self {
        Self {
            dev_domain: "docs-dev.example.com".to_string(),
            main_domain: "docs.example.com".to_string(),
            source_repository: "https://github.com/example/project".to_string(),
        }
    }
}

impl SiteDomains {
    // Rejects domains the substitution table can't keep apart
    //
    // A domain that is a prefix of another ("docs.example.com" and
    // "docs.example.com.dev") would be rewritten inside the longer one, and
    // every pass would grow the link again.
    pub fn check(&self) -> Result<(), String> {
        let domains = [
            ("dev_domain", self.dev_domain.as_str()),
            ("main_domain", self.main_domain.as_str()),
            ("local server", LOCAL_AUTHORITY),
        ];
        for (i, (name, domain)) in domains.iter().enumerate() {
            if domain.is_empty() {
                return Err(format!("[site] {} must not be empty", name));
            }
            for (other_name, other) in &domains[i + 1..] {
                if domain.starts_with(other) || other.starts_with(domain) {
                    return Err(format!(
                        "[site] {} '{}' and {} '{}' overlap; neither may be a prefix of the other",
                        name, domain, other_name, other
                    ));
                }
            }
        }
        Ok(())
    }
}

impl HostProfile {
    /// Maps a deployment branch name onto its host, `None` for any other branch.
    pub fn from_branch(branch: &str) -> Option<Self> {
        match branch.trim().to_lowercase().as_str() {
            "dev" => Some(HostProfile::Dev),
            "main" => Some(HostProfile::Main),
            _ => None,
        }
    }

    /// Base URL (with trailing slash) that host-relative links resolve against.
    pub fn base_url(&self, site: &SiteDomains) -> String {
        match self {
            HostProfile::Local => LOCAL_BASE_URL.to_string(),
            HostProfile::Dev => format!("https://{}/", site.dev_domain),
            HostProfile::Main => format!("https://{}/", site.main_domain),
        }
    }

    // The ordered (from, to) replacements for this host
    //
    // Domains are matched with their leading slash ("//domain" in a URL) so
    // that one domain being a suffix of another can't cause a partial match.
    pub fn substitutions(&self, site: &SiteDomains) -> Vec<(String, String)> {
        let dev = format!("/{}", site.dev_domain);
        let main = format!("/{}", site.main_domain);
        let local = format!("/{}", LOCAL_AUTHORITY);
        let blob_main = format!("{}/blob/main/", site.source_repository);
        let blob_dev = format!("{}/blob/dev/", site.source_repository);

        match self {
            HostProfile::Local => vec![
                (dev, local.clone()),
                (main, local),
                // The local server has no TLS
                (
                    format!("https://{}", LOCAL_AUTHORITY),
                    format!("http://{}", LOCAL_AUTHORITY),
                ),
                (blob_main, blob_dev),
            ],
            HostProfile::Dev => vec![(main, dev.clone()), (local, dev), (blob_main, blob_dev)],
            HostProfile::Main => vec![(dev, main.clone()), (local, main), (blob_dev, blob_main)],
        }
    }

    /// Applies this host's substitutions to a document, in order.
    pub fn retarget(&self, content: &str, site: &SiteDomains) -> String {
        self.substitutions(site)
            .iter()
            .fold(content.to_string(), |text, (from, to)| text.replace(from.as_str(), to))
    }
}

impl std::fmt::Display for HostProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostProfile::Local => write!(f, "local"),
            HostProfile::Dev => write!(f, "dev"),
            HostProfile::Main => write!(f, "main"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <a href="https://docs-dev.example.com/api/Foo.html">dev</a>
        <a href="https://docs.example.com/manual/">main</a>
        <a href="https://localhost:8080/index.html">local</a>
        <a href="https://github.com/example/project/blob/main/src/Foo.cs">src</a>
    "#;

    #[test]
    fn test_local_retarget() {
        let out = HostProfile::Local.retarget(PAGE, &SiteDomains::default());
        assert!(out.contains("http://localhost:8080/api/Foo.html"));
        assert!(out.contains("http://localhost:8080/manual/"));
        assert!(out.contains("http://localhost:8080/index.html"));
        assert!(!out.contains("https://localhost:8080"));
        assert!(out.contains("/blob/dev/src/Foo.cs"));
    }

    #[test]
    fn test_main_retarget() {
        let out = HostProfile::Main.retarget(PAGE, &SiteDomains::default());
        assert!(out.contains("https://docs.example.com/api/Foo.html"));
        assert!(out.contains("https://docs.example.com/index.html"));
        assert!(!out.contains("docs-dev.example.com"));
        assert!(out.contains("/blob/main/src/Foo.cs"));
    }

    #[test]
    fn test_dev_retarget() {
        let out = HostProfile::Dev.retarget(PAGE, &SiteDomains::default());
        assert!(out.contains("https://docs-dev.example.com/manual/"));
        assert!(!out.contains("localhost"));
        assert!(out.contains("/blob/dev/src/Foo.cs"));
    }

    #[test]
    fn test_retarget_is_idempotent() {
        let site = SiteDomains::default();
        for host in [HostProfile::Local, HostProfile::Dev, HostProfile::Main] {
            let once = host.retarget(PAGE, &site);
            assert_eq!(host.retarget(&once, &site), once, "host {host}");
        }
    }

    #[test]
    fn test_suffix_domain_is_not_partially_rewritten() {
        // main_domain is a suffix of dev_domain here
        let site = SiteDomains {
            dev_domain: "dev.docs.example.com".to_string(),
            main_domain: "docs.example.com".to_string(),
            ..SiteDomains::default()
        };
        let out = HostProfile::Dev.retarget("https://dev.docs.example.com/a.html", &site);
        assert_eq!(out, "https://dev.docs.example.com/a.html");
    }

    #[test]
    fn test_base_urls() {
        let site = SiteDomains::default();
        assert_eq!(HostProfile::Local.base_url(&site), "http://localhost:8080/");
        assert_eq!(HostProfile::Dev.base_url(&site), "https://docs-dev.example.com/");
        assert_eq!(HostProfile::Main.base_url(&site), "https://docs.example.com/");
    }

    #[test]
    fn test_from_branch() {
        assert_eq!(HostProfile::from_branch("main"), Some(HostProfile::Main));
        assert_eq!(HostProfile::from_branch(" Dev "), Some(HostProfile::Dev));
        assert_eq!(HostProfile::from_branch("feature/x"), None);
    }

    #[test]
    fn test_overlapping_domains_are_rejected() {
        assert!(SiteDomains::default().check().is_ok());

        let prefixed = SiteDomains {
            dev_domain: "docs.example.com.dev".to_string(),
            ..SiteDomains::default()
        };
        assert!(prefixed.check().unwrap_err().contains("overlap"));

        let empty = SiteDomains {
            main_domain: String::new(),
            ..SiteDomains::default()
        };
        assert!(empty.check().is_err());
    }
}

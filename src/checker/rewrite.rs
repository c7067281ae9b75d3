// src/checker/rewrite.rs
// =============================================================================
// Rewrites host-relative links across a generated tree, in place.
//
// Only text formats the doc builder emits links into are touched. A small
// set of pages is never rewritten because they intentionally reference every
// host (the automation landing page lists all of them).
// =============================================================================

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::host::{HostProfile, SiteDomains};
use crate::platform;

/// Extensions of files that may carry links.
pub const REWRITE_EXTENSIONS: &[&str] = &["html", "htm", "xml", "json", "yml"];

/// File names that are never rewritten.
pub const PROTECTED_FILES: &[&str] = &["automation.html"];

// Retargets every link under `root` for `host`
//
// Parameters:
//   root: the directory holding the generated site
//   host: which deployment the links should point at
//   site: the domains configured for this site
//
// Returns: how many files actually changed on disk
pub fn rewrite_links(root: &Path, host: HostProfile, site: &SiteDomains) -> Result<usize> {
    let files = platform::files_with_extensions(root, REWRITE_EXTENSIONS);
    info!("Altering {} files in {} mode ...", files.len(), host);

    let mut modified = 0;
    for path in files {
        if is_protected(&path) {
            continue;
        }

        // Generated assets are not guaranteed to be UTF-8; leave those alone
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        let updated = host.retarget(&content, site);
        if updated != content {
            fs::write(&path, updated)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Updated {}.", path.display());
            modified += 1;
        }
    }

    Ok(modified)
}

fn is_protected(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| PROTECTED_FILES.contains(&name))
}

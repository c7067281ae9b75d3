// src/checker/mod.rs
// =============================================================================
// This module contains all link handling for a generated site.
//
// Submodules:
// - extract: Pulls href values out of a document
// - host: The three deployment targets and their rewrite rules
// - rewrite: Retargets links across a tree of files, in place
// - probe: Asks a URL for its HTTP status, one request at a time
// - validate: Resolves, probes, caches and classifies every link in a tree
// =============================================================================

mod extract;
mod host;
mod probe;
mod rewrite;
mod validate;

pub use host::{HostProfile, SiteDomains, LOCAL_BASE_URL};
pub use probe::{is_success, HttpProbe, Probe};
pub use rewrite::rewrite_links;
pub use validate::{validate_links, LinkStatus, ValidationResult, ValidationSummary};

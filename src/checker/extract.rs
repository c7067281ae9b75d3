// src/checker/extract.rs
// =============================================================================
// This module pulls hyperlink references out of generated documents.
//
// The generated site is produced by a single tool, so every link we care
// about is written as href="...". A plain left-to-right scan for that marker
// is all we need. It is linear in the size of the document and cannot loop
// on broken markup: an unterminated quote simply ends the scan.
//
// What gets skipped:
// - Pure fragments (#top)
// - Inline data (data:...)
// - Email links (mailto:...)
//
// What gets cleaned:
// - Trailing #fragment and ?query are cut off before deduplication
// =============================================================================

use std::collections::HashSet;

/// The attribute marker that opens every link value we extract.
const HREF_MARKER: &str = "href=\"";

// Extracts every distinct href value from a document
//
// Parameters:
//   content: the full text of one document
//
// Returns: Vec<String> in order of first appearance, without duplicates
//
// Example:
//   r#"<a href="./x.html?y=1#z">X</a><a href="#top">Top</a>"#
//   -> vec!["./x.html"]
pub fn extract_links(content: &str) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();
    let mut offset = 0;

    while let Some(found) = content[offset..].find(HREF_MARKER) {
        let value_start = offset + found + HREF_MARKER.len();

        // No closing quote means the rest of the document is malformed
        let Some(value_len) = content[value_start..].find('"') else {
            break;
        };

        let raw = &content[value_start..value_start + value_len];
        offset = value_start + value_len + 1;

        if is_skipped(raw) {
            continue;
        }

        let cleaned = strip_fragment_and_query(raw);
        if cleaned.is_empty() {
            continue;
        }

        if seen.insert(cleaned) {
            links.push(cleaned.to_string());
        }
    }

    links
}

// Values that never point at another document
fn is_skipped(raw: &str) -> bool {
    raw.starts_with('#') || raw.starts_with("data:") || raw.starts_with("mailto:")
}

// Cuts a link at its fragment first, then at its query string
//
// "./x.html?y=1#z" -> "./x.html?y=1" -> "./x.html"
fn strip_fragment_and_query(raw: &str) -> &str {
    let without_fragment = raw.split_once('#').map_or(raw, |(head, _)| head);
    without_fragment
        .split_once('?')
        .map_or(without_fragment, |(head, _)| head)
}

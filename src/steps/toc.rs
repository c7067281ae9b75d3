// src/steps/toc.rs
// =============================================================================
// Tidies the API table of contents produced by metadata extraction.
//
// The raw .docfx/api/toc.yml lists every uid with its fully qualified name,
// can carry the same namespace more than once (one entry per project that
// contributes to it), and keeps source order. After this step:
// - entries sharing a uid are merged, children appended to the first one
// - names are trimmed to their last segment ("GDX.Collections" -> "Collections")
// - namespaces come first, then types, each sorted by name
// - entries whose uid has no generated page are dropped
//
// The kind of an entry (namespace, class, struct, ...) is read from the first
// `type:` line of its generated <uid>.yml page.
// =============================================================================

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::docs::MetadataStep;
use crate::pipeline::{Step, StepContext};

const TOC_HEADER: &str = "### YamlMime:TableOfContent";

/// One node of the API table of contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TocEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "name.vb", skip_serializing_if = "Option::is_none")]
    pub name_vb: Option<String>,
    #[serde(default, rename = "customType", skip_serializing_if = "Option::is_none")]
    pub custom_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<TocEntry>>,
    // Anything else docfx wrote (href, topicUid, ...) passes through untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

// Merges, renames and orders one level of entries, recursing into the kept ones
pub fn tidy_entries(entries: Vec<TocEntry>, api_dir: &Path) -> Vec<TocEntry> {
    let mut namespaces = Vec::new();
    let mut types = Vec::new();

    for mut entry in merge_duplicates(entries) {
        let Some(kind) = entry.uid.as_deref().and_then(|uid| entry_kind(api_dir, uid)) else {
            info!(
                "Unable to find YML for {} in {}, this isn't always a bad thing.",
                entry.uid.as_deref().unwrap_or("<no uid>"),
                api_dir.display()
            );
            continue;
        };

        if let Some(name) = entry.name.take() {
            entry.name = Some(short_name(&name).to_string());
        }
        if let Some(children) = entry.items.take() {
            entry.items = Some(tidy_entries(children, api_dir));
        }

        let is_namespace = kind == "namespace";
        entry.custom_type = Some(kind);
        if is_namespace {
            namespaces.push(entry);
        } else {
            types.push(entry);
        }
    }

    namespaces.sort_by(|a, b| a.name.cmp(&b.name));
    types.sort_by(|a, b| a.name.cmp(&b.name));
    namespaces.extend(types);
    namespaces
}

fn merge_duplicates(entries: Vec<TocEntry>) -> Vec<TocEntry> {
    let mut merged: Vec<TocEntry> = Vec::with_capacity(entries.len());
    let mut first_by_uid: HashMap<Option<String>, usize> = HashMap::new();

    for entry in entries {
        match first_by_uid.get(&entry.uid) {
            Some(&index) => {
                if let Some(children) = entry.items {
                    merged[index].items.get_or_insert_with(Vec::new).extend(children);
                }
            }
            None => {
                first_by_uid.insert(entry.uid.clone(), merged.len());
                merged.push(entry);
            }
        }
    }
    merged
}

fn short_name(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(_, last)| last)
}

// The generated page for a uid; generic arity backticks become dashes
fn entry_page(api_dir: &Path, uid: &str) -> PathBuf {
    api_dir.join(format!("{}.yml", uid.replace('`', "-")))
}

fn entry_kind(api_dir: &Path, uid: &str) -> Option<String> {
    let page = entry_page(api_dir, uid);
    if !page.is_file() {
        return None;
    }
    let content = match fs::read_to_string(&page) {
        Ok(content) => content,
        Err(e) => {
            warn!("Unable to read {}: {}", page.display(), e);
            return None;
        }
    };

    let kind = content
        .lines()
        .find(|line| line.contains("type:"))
        .map(|line| line.replace("type:", "").trim().to_lowercase())
        .unwrap_or_else(|| "class".to_string());
    Some(kind)
}

pub struct TableOfContentsStep;

impl TableOfContentsStep {
    pub const KEY: &'static str = "toc";

    fn api_dir(ctx: &StepContext<'_>) -> PathBuf {
        ctx.config.docfx_dir().join("api")
    }
}

impl Step for TableOfContentsStep {
    fn identifier(&self) -> &'static str {
        Self::KEY
    }

    fn header(&self) -> &'static str {
        "Table Of Contents"
    }

    fn required_steps(&self) -> &'static [&'static str] {
        &[MetadataStep::KEY]
    }

    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<()> {
        let api_dir = Self::api_dir(ctx);
        let toc_path = api_dir.join("toc.yml");
        if !toc_path.is_file() {
            warn!("Unable to find {}, skipping.", toc_path.display());
            return Ok(());
        }

        let content = fs::read_to_string(&toc_path)
            .with_context(|| format!("failed to read {}", toc_path.display()))?;
        let entries: Vec<TocEntry> = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse {}", toc_path.display()))?;
        let before = entries.len();

        let tidied = tidy_entries(entries, &api_dir);
        info!("Tidied table of contents: {} top-level entries, was {}.", tidied.len(), before);

        let yaml = serde_yaml::to_string(&tidied)?;
        fs::write(&toc_path, format!("{}\n{}", TOC_HEADER, yaml))
            .with_context(|| format!("failed to write {}", toc_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::testing::{FakeDocBuilder, ScriptedProbe};

    const RAW_TOC: &str = "### YamlMime:TableOfContent
- uid: GDX.Collections.Pair
  name: GDX.Collections.Pair
- uid: GDX
  name: GDX
  items:
  - uid: GDX.Bits
    name: GDX.Bits
- uid: GDX
  name: GDX
  items:
  - uid: GDX.Array2D`1
    name: GDX.Array2D<T>
    href: GDX.Array2D-1.html
- uid: GDX.Ghost
  name: GDX.Ghost
";

    fn api_project() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path());
        let api = config.docfx_dir().join("api");
        fs::create_dir_all(&api).unwrap();
        fs::write(api.join("toc.yml"), RAW_TOC).unwrap();
        for (file, kind) in [
            ("GDX.yml", "Namespace"),
            ("GDX.Collections.Pair.yml", "Struct"),
            ("GDX.Bits.yml", "Class"),
            ("GDX.Array2D-1.yml", "Class"),
        ] {
            let page = format!("### YamlMime:ManagedReference\nitems:\n- uid: x\n  commentId: T:x\n  type: {kind}\n");
            fs::write(api.join(file), page).unwrap();
        }
        (dir, config)
    }

    fn names(entries: &[TocEntry]) -> Vec<&str> {
        entries.iter().filter_map(|e| e.name.as_deref()).collect()
    }

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("GDX.Collections.Pair"), "Pair");
        assert_eq!(short_name("GDX"), "GDX");
    }

    #[test]
    fn test_merge_keeps_first_and_appends_children() {
        let entry = |uid: &str, child: &str| TocEntry {
            uid: Some(uid.to_string()),
            items: Some(vec![TocEntry {
                uid: Some(child.to_string()),
                ..TocEntry::default()
            }]),
            ..TocEntry::default()
        };
        let merged = merge_duplicates(vec![entry("A", "A.x"), entry("B", "B.x"), entry("A", "A.y")]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].items.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_step_rewrites_toc() {
        let (_dir, config) = api_project();
        let (docs, probe) = (FakeDocBuilder::succeeding(), ScriptedProbe::new(200));
        let mut ctx = StepContext::new(&config, &docs, &probe);

        TableOfContentsStep.execute(&mut ctx).unwrap();

        let written = fs::read_to_string(config.docfx_dir().join("api/toc.yml")).unwrap();
        assert!(written.starts_with(TOC_HEADER));
        let entries: Vec<TocEntry> = serde_yaml::from_str(&written).unwrap();

        // Namespace first, then the struct; the entry without a page is gone
        assert_eq!(names(&entries), vec!["GDX", "Pair"]);
        assert_eq!(entries[0].custom_type.as_deref(), Some("namespace"));
        assert_eq!(entries[1].custom_type.as_deref(), Some("struct"));

        let children = entries[0].items.as_deref().unwrap();
        assert_eq!(names(children), vec!["Array2D<T>", "Bits"]);
        assert_eq!(
            children[0].extra.get("href"),
            Some(&serde_yaml::Value::String("GDX.Array2D-1.html".to_string()))
        );
    }

    #[test]
    fn test_missing_toc_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path());
        let (docs, probe) = (FakeDocBuilder::succeeding(), ScriptedProbe::new(200));
        let mut ctx = StepContext::new(&config, &docs, &probe);

        TableOfContentsStep.execute(&mut ctx).unwrap();
    }
}

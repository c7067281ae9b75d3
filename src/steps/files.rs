// src/steps/files.rs
// =============================================================================
// Steps that turn repository files into documentation pages.
//
// The changelog, security policy, code of conduct and license live at the
// root of the input directory. The site wants them as markdown pages inside .docfx/ with a front-matter block
// that hides the "improve this doc" link, since editing the generated copy
// would be pointless.
// =============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::error::DoxError;
use crate::pipeline::{Step, StepContext};
use crate::platform;

const FRONT_MATTER: &str = "---\n_disableContribution: true\n---\n";

// Copies `source` to `target` behind the front matter, with an optional heading
fn write_page(source: &Path, target: &Path, heading: Option<&str>) -> Result<()> {
    if !source.is_file() {
        return Err(DoxError::MissingInput {
            what: "source file",
            path: source.to_path_buf(),
        }
        .into());
    }

    info!("Reading existing content from {}.", source.display());
    let content = fs::read_to_string(source)
        .with_context(|| format!("failed to read {}", source.display()))?;

    let mut page = String::from(FRONT_MATTER);
    if let Some(heading) = heading {
        page.push_str(heading);
        page.push('\n');
    }
    page.push_str(&content);
    if !page.ends_with('\n') {
        page.push('\n');
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    info!("Writing updated page to {}.", target.display());
    fs::write(target, page).with_context(|| format!("failed to write {}", target.display()))
}

fn remove_page(target: &Path, what: &str) -> Result<()> {
    if platform::remove_file_if_exists(target)? {
        info!("Cleaning up previous {}.", what);
    }
    Ok(())
}

pub struct ChangelogStep;

impl ChangelogStep {
    pub const KEY: &'static str = "files-changelog";

    fn target(ctx: &StepContext<'_>) -> PathBuf {
        ctx.config.docfx_dir().join("changelog.md")
    }
}

impl Step for ChangelogStep {
    fn identifier(&self) -> &'static str {
        Self::KEY
    }

    fn header(&self) -> &'static str {
        "Create Changelog"
    }

    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<()> {
        let source = ctx.config.input_dir.join("CHANGELOG.md");
        write_page(&source, &Self::target(ctx), None)
    }

    fn clean(&self, ctx: &StepContext<'_>) -> Result<()> {
        remove_page(&Self::target(ctx), "Changelog")
    }
}

pub struct LicenseStep;

impl LicenseStep {
    pub const KEY: &'static str = "files-license";

    fn target(ctx: &StepContext<'_>) -> PathBuf {
        ctx.config.docfx_dir().join("license.md")
    }
}

impl Step for LicenseStep {
    fn identifier(&self) -> &'static str {
        Self::KEY
    }

    fn header(&self) -> &'static str {
        "License"
    }

    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<()> {
        let source = ctx.config.input_dir.join("LICENSE");
        write_page(&source, &Self::target(ctx), Some("# License"))
    }

    fn clean(&self, ctx: &StepContext<'_>) -> Result<()> {
        remove_page(&Self::target(ctx), "License")
    }
}

pub struct SecurityPolicyStep;

impl SecurityPolicyStep {
    pub const KEY: &'static str = "files-security";

    fn target(ctx: &StepContext<'_>) -> PathBuf {
        ctx.config.docfx_dir().join("security.md")
    }
}

impl Step for SecurityPolicyStep {
    fn identifier(&self) -> &'static str {
        Self::KEY
    }

    fn header(&self) -> &'static str {
        "Create Security Policy"
    }

    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<()> {
        let source = ctx.config.input_dir.join("SECURITY.md");
        write_page(&source, &Self::target(ctx), None)
    }

    fn clean(&self, ctx: &StepContext<'_>) -> Result<()> {
        remove_page(&Self::target(ctx), "Security Policy")
    }
}

pub struct CodeOfConductStep;

impl CodeOfConductStep {
    pub const KEY: &'static str = "files-conduct";

    fn target(ctx: &StepContext<'_>) -> PathBuf {
        ctx.config.docfx_dir().join("conduct.md")
    }
}

impl Step for CodeOfConductStep {
    fn identifier(&self) -> &'static str {
        Self::KEY
    }

    fn header(&self) -> &'static str {
        "Create Code Of Conduct"
    }

    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<()> {
        let source = ctx.config.input_dir.join("CODE_OF_CONDUCT.md");
        write_page(&source, &Self::target(ctx), None)
    }

    fn clean(&self, ctx: &StepContext<'_>) -> Result<()> {
        remove_page(&Self::target(ctx), "Code Of Conduct")
    }
}

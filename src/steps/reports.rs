// src/steps/reports.rs
// =============================================================================
// Report steps fed by CI artifacts.
//
// The CI build runs code inspection, duplicate detection and coverage before
// the documentation job and leaves the results in a staging directory. These
// steps copy them under .docfx/reports/ so the site can link to them.
//
// On a developer machine none of those artifacts exist. Inspection and
// duplication just skip; coverage writes a stub page so the site's links
// to it still resolve.
// =============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::error::DoxError;
use crate::pipeline::{Step, StepContext};
use crate::platform;

// A report that is one XML file copied from staging
//
// Missing artifacts are only a warning: the reports are optional.
fn copy_artifact_report(
    ctx: &StepContext<'_>,
    artifact: &str,
    report_dir: &Path,
    report_name: &str,
) -> Result<()> {
    if !ctx.config.is_ci {
        info!("Skipping. Not running inside of CI/CD.");
        return Ok(());
    }

    let source = ctx.config.staging_dir.join(artifact);
    if !source.is_file() {
        warn!("Unable to find artifacts at {}.", source.display());
        return Ok(());
    }

    fs::create_dir_all(report_dir)?;
    let target = report_dir.join(report_name);
    fs::copy(&source, &target)
        .with_context(|| format!("failed to copy {} to {}", source.display(), target.display()))?;
    info!("Copied {} to {}.", source.display(), target.display());
    Ok(())
}

fn remove_report(dir: &Path) -> Result<()> {
    if platform::remove_dir_if_exists(dir)? {
        info!("Removed previous report at {}.", dir.display());
    }
    Ok(())
}

pub struct CodeInspectionStep;

impl CodeInspectionStep {
    pub const KEY: &'static str = "code-inspection";

    fn report_dir(ctx: &StepContext<'_>) -> PathBuf {
        ctx.config.reports_dir().join("inspection")
    }
}

impl Step for CodeInspectionStep {
    fn identifier(&self) -> &'static str {
        Self::KEY
    }

    fn header(&self) -> &'static str {
        "Code Inspection"
    }

    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<()> {
        copy_artifact_report(ctx, "ResharperInspection.xml", &Self::report_dir(ctx), "inspection.xml")
    }

    fn clean(&self, ctx: &StepContext<'_>) -> Result<()> {
        remove_report(&Self::report_dir(ctx))
    }
}

pub struct CodeDuplicationStep;

impl CodeDuplicationStep {
    pub const KEY: &'static str = "code-duplication";

    fn report_dir(ctx: &StepContext<'_>) -> PathBuf {
        ctx.config.reports_dir().join("duplicates")
    }
}

impl Step for CodeDuplicationStep {
    fn identifier(&self) -> &'static str {
        Self::KEY
    }

    fn header(&self) -> &'static str {
        "Code Duplication"
    }

    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<()> {
        copy_artifact_report(ctx, "ResharperDuplicates.xml", &Self::report_dir(ctx), "duplicates.xml")
    }

    fn clean(&self, ctx: &StepContext<'_>) -> Result<()> {
        remove_report(&Self::report_dir(ctx))
    }
}

/// Page written when coverage is not available outside CI.
const COVERAGE_STUB: &str = "This is a stub for actual content generated by CI/CD";

pub struct CodeCoverageStep;

impl CodeCoverageStep {
    pub const KEY: &'static str = "code-coverage";

    fn report_dir(ctx: &StepContext<'_>) -> PathBuf {
        ctx.config.reports_dir().join("coverage")
    }
}

impl Step for CodeCoverageStep {
    fn identifier(&self) -> &'static str {
        Self::KEY
    }

    fn header(&self) -> &'static str {
        "Code Coverage"
    }

    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<()> {
        let report_dir = Self::report_dir(ctx);

        if !ctx.config.is_ci {
            let stub_dir = report_dir.join("Report");
            fs::create_dir_all(&stub_dir)?;
            fs::write(stub_dir.join("index.html"), COVERAGE_STUB)?;
            info!("Skipping w/ stub created. Not running inside of CI/CD.");
            return Ok(());
        }

        let artifacts = ctx.config.staging_dir.join("CodeCoverage");
        if !artifacts.is_dir() {
            return Err(DoxError::MissingInput {
                what: "code coverage artifacts",
                path: artifacts,
            }
            .into());
        }

        let copied = platform::copy_dir_recursive(&artifacts, &report_dir)?;
        info!("Copied {} coverage files.", copied);
        Ok(())
    }

    fn clean(&self, ctx: &StepContext<'_>) -> Result<()> {
        remove_report(&Self::report_dir(ctx))
    }
}

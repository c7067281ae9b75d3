// src/steps/docs.rs
// =============================================================================
// Steps that drive the documentation builder itself.
//
// - metadata: extract API metadata from the sources
// - build:    generate the static site, retarget its links for the chosen
//             host, and optionally copy it somewhere else
// - host:     serve the site locally and wait until it answers
//
// All three need .docfx/docfx.json and treat a builder failure as fatal.
// =============================================================================

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::checker::{self, LOCAL_BASE_URL};
use crate::error::DoxError;
use crate::pipeline::{Step, StepContext};
use crate::platform;
use crate::tools::DocBuildMode;

pub struct MetadataStep;

impl MetadataStep {
    pub const KEY: &'static str = "metadata";
}

impl Step for MetadataStep {
    fn identifier(&self) -> &'static str {
        Self::KEY
    }

    fn header(&self) -> &'static str {
        "Metadata Extraction"
    }

    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<()> {
        let docfx_json = ctx.config.require_docfx_json()?;
        if !ctx.docs.execute(&docfx_json, DocBuildMode::Metadata) {
            return Err(DoxError::collaborator("docfx", "run the metadata extraction").into());
        }
        Ok(())
    }
}

pub struct BuildStep;

impl BuildStep {
    pub const KEY: &'static str = "build";
}

impl Step for BuildStep {
    fn identifier(&self) -> &'static str {
        Self::KEY
    }

    fn header(&self) -> &'static str {
        "Build Documentation"
    }

    fn required_steps(&self) -> &'static [&'static str] {
        &[MetadataStep::KEY]
    }

    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<()> {
        let config = ctx.config;
        let docfx_json = config.require_docfx_json()?;
        if !ctx.docs.execute(&docfx_json, DocBuildMode::Build) {
            return Err(DoxError::collaborator("docfx", "build the documentation").into());
        }

        let site_dir = config.site_dir();
        if !site_dir.is_dir() {
            return Err(DoxError::MissingInput {
                what: "generated site",
                path: site_dir,
            }
            .into());
        }

        let changed = checker::rewrite_links(&site_dir, config.host, &config.site)?;
        info!("Retargeted {} files for {}.", changed, config.host);

        if let Some(output) = &config.output_dir {
            let copied = platform::copy_dir_recursive(&site_dir, output)
                .with_context(|| format!("failed to copy site to {}", output.display()))?;
            info!("Copied {} files to {}.", copied, output.display());
        }

        Ok(())
    }

    fn clean(&self, ctx: &StepContext<'_>) -> Result<()> {
        if platform::remove_dir_if_exists(&ctx.config.site_dir())? {
            info!("Deleted previous output folder.");
        }
        Ok(())
    }
}

/// How long a single readiness probe of the local server may take.
const READY_TIMEOUT: Duration = Duration::from_secs(2);

pub struct HostStep {
    attempts: u32,
    interval: Duration,
}

impl HostStep {
    pub const KEY: &'static str = "host";

    pub fn new() -> Self {
        Self {
            attempts: 10,
            interval: Duration::from_secs(1),
        }
    }

    #[cfg(test)]
    fn with_polling(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }

    // Polls the local server until it answers with a 2xx or we give up
    fn wait_until_ready(&self, ctx: &StepContext<'_>) -> bool {
        for attempt in 1..=self.attempts {
            let status = ctx.probe.get(LOCAL_BASE_URL, READY_TIMEOUT);
            if checker::is_success(status) {
                return true;
            }
            info!("Waiting for documentation server (attempt {}/{}, {}).", attempt, self.attempts, status);
            if attempt < self.attempts {
                thread::sleep(self.interval);
            }
        }
        false
    }
}

impl Default for HostStep {
    fn default() -> Self {
        Self::new()
    }
}

impl Step for HostStep {
    fn identifier(&self) -> &'static str {
        Self::KEY
    }

    fn header(&self) -> &'static str {
        "Host"
    }

    fn required_steps(&self) -> &'static [&'static str] {
        &[BuildStep::KEY]
    }

    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<()> {
        if ctx.config.is_ci {
            info!("Hosting was skipped due to running in CI.");
            return Ok(());
        }

        let docfx_json = ctx.config.require_docfx_json()?;
        if !ctx.docs.execute(&docfx_json, DocBuildMode::Serve) {
            return Err(DoxError::collaborator("docfx", "serve the documentation").into());
        }

        if self.wait_until_ready(ctx) {
            println!("\n🌐 Documentation is available at:\n\n   {}\n", LOCAL_BASE_URL);
        } else {
            warn!("The documentation server did not answer yet; it may still be starting.");
            println!("\n🌐 Documentation should become available at:\n\n   {}\n", LOCAL_BASE_URL);
        }

        ctx.start_hosting();
        Ok(())
    }
}

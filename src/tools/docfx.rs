// src/tools/docfx.rs
// =============================================================================
// The external documentation builder.
//
// The pipeline only ever asks one question of it: "run this project in this
// mode, did it work?". How the builder is found and invoked stays in here.
// =============================================================================

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::{error, info};
use xshell::Shell;

/// What the doc builder is asked to do with a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocBuildMode {
    /// Extract API metadata from sources.
    Metadata,
    /// Generate the static site.
    Build,
    /// Build and serve the site on localhost:8080, detached from us.
    Serve,
}

impl DocBuildMode {
    pub fn flag(&self) -> &'static str {
        match self {
            DocBuildMode::Metadata => "--metadata",
            DocBuildMode::Build => "--build",
            DocBuildMode::Serve => "--serve",
        }
    }
}

/// Runs the documentation toolchain against a JSON project file.
pub trait DocBuilder {
    /// Returns whether the builder reported success. For [`DocBuildMode::Serve`]
    /// success means the server process was started.
    fn execute(&self, config_path: &Path, mode: DocBuildMode) -> bool;
}

/// [`DocBuilder`] invoking the docfx executable.
pub struct DocFx {
    sh: Shell,
    executable: PathBuf,
}

impl DocFx {
    pub fn new(executable: impl Into<PathBuf>) -> Result<Self> {
        let sh = Shell::new().context("failed to create shell for docfx")?;
        Ok(Self {
            sh,
            executable: executable.into(),
        })
    }
}

impl DocBuilder for DocFx {
    fn execute(&self, config_path: &Path, mode: DocBuildMode) -> bool {
        if mode == DocBuildMode::Serve {
            return spawn_server(&self.executable, config_path);
        }

        let result = self
            .sh
            .cmd(&self.executable)
            .arg(config_path)
            .arg(mode.flag())
            .run();

        match result {
            Ok(()) => true,
            Err(e) => {
                error!("{}", e);
                false
            }
        }
    }
}

// Starts the builder's web server and leaves it running after we exit
fn spawn_server(executable: &Path, config_path: &Path) -> bool {
    let working_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let spawned = Command::new(executable)
        .arg(config_path)
        .arg(DocBuildMode::Serve.flag())
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    match spawned {
        Ok(child) => {
            info!("Started documentation server (PID:{}).", child.id());
            true
        }
        Err(e) => {
            error!("Unable to start {}: {}", executable.display(), e);
            false
        }
    }
}

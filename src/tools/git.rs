// src/tools/git.rs
// =============================================================================
// Source control, as deploy sees it: a handful of git operations that each
// either worked or didn't.
//
// All commands run as `git -C <dir> ...` so we never change the process'
// working directory.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, error};
use xshell::{cmd, Shell};

/// The git operations deploy relies on. Every call reports plain success.
pub trait SourceControl {
    fn clone_repo(&self, uri: &str, dest: &Path, depth: Option<u32>) -> bool;
    fn fetch(&self, dir: &Path) -> bool;
    /// `None` when the status could not be read.
    fn is_behind(&self, dir: &Path) -> Option<bool>;
    fn reset_hard(&self, dir: &Path) -> bool;
    fn pull(&self, dir: &Path) -> bool;
    fn checkout(&self, dir: &Path, branch: &str) -> bool;
    /// `None` when the status could not be read.
    fn has_changes(&self, dir: &Path) -> Option<bool>;
    fn head_commit(&self, dir: &Path) -> Option<String>;
    fn add_all(&self, dir: &Path) -> bool;
    fn commit(&self, dir: &Path, message: &str) -> bool;
    fn push(&self, dir: &Path) -> bool;
}

/// [`SourceControl`] backed by the git command line.
pub struct Git {
    sh: Shell,
}

impl Git {
    pub fn new() -> Result<Self> {
        let sh = Shell::new().context("failed to create shell for git")?;
        Ok(Self { sh })
    }
}

// Logs a failed command and turns the outcome into a bool
fn succeeded(result: xshell::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            error!("{}", e);
            false
        }
    }
}

impl SourceControl for Git {
    fn clone_repo(&self, uri: &str, dest: &Path, depth: Option<u32>) -> bool {
        let sh = &self.sh;
        let result = match depth {
            Some(depth) => {
                let depth = format!("--depth={depth}");
                cmd!(sh, "git clone {depth} {uri} {dest}").run()
            }
            None => cmd!(sh, "git clone {uri} {dest}").run(),
        };
        succeeded(result)
    }

    fn fetch(&self, dir: &Path) -> bool {
        let sh = &self.sh;
        succeeded(cmd!(sh, "git -C {dir} fetch origin").run())
    }

    fn is_behind(&self, dir: &Path) -> Option<bool> {
        let sh = &self.sh;
        match cmd!(sh, "git -C {dir} status -sb").quiet().read() {
            Ok(output) => Some(status_is_behind(&output)),
            Err(e) => {
                error!("{}", e);
                None
            }
        }
    }

    fn reset_hard(&self, dir: &Path) -> bool {
        let sh = &self.sh;
        succeeded(cmd!(sh, "git -C {dir} reset --hard").run())
    }

    fn pull(&self, dir: &Path) -> bool {
        let sh = &self.sh;
        succeeded(cmd!(sh, "git -C {dir} pull").run())
    }

    fn checkout(&self, dir: &Path, branch: &str) -> bool {
        let sh = &self.sh;
        succeeded(cmd!(sh, "git -C {dir} checkout {branch}").run())
    }

    fn has_changes(&self, dir: &Path) -> Option<bool> {
        let sh = &self.sh;
        match cmd!(sh, "git -C {dir} status --porcelain").quiet().read() {
            Ok(output) => Some(porcelain_has_changes(&output)),
            Err(e) => {
                error!("{}", e);
                None
            }
        }
    }

    fn head_commit(&self, dir: &Path) -> Option<String> {
        let sh = &self.sh;
        let output = cmd!(sh, "git -C {dir} rev-parse HEAD").quiet().read().ok()?;
        let commit = output.trim().to_string();
        debug!("HEAD of {} is {}", dir.display(), commit);
        (!commit.is_empty()).then_some(commit)
    }

    fn add_all(&self, dir: &Path) -> bool {
        let sh = &self.sh;
        succeeded(cmd!(sh, "git -C {dir} add --all").run())
    }

    fn commit(&self, dir: &Path, message: &str) -> bool {
        let sh = &self.sh;
        succeeded(cmd!(sh, "git -C {dir} commit -m {message}").run())
    }

    fn push(&self, dir: &Path) -> bool {
        let sh = &self.sh;
        succeeded(cmd!(sh, "git -C {dir} push").run())
    }
}

// Reads `git status -sb` output: "## dev...origin/dev [behind 3]"
pub fn status_is_behind(output: &str) -> bool {
    output.lines().any(|line| line.contains("behind"))
}

// Reads `git status --porcelain` output: "XY path", X for the index and Y
// for the work tree. Any code in either column is a change (M, A, D, R, C,
// T, U); untracked ("??") and ignored ("!!") entries are not.
pub fn porcelain_has_changes(output: &str) -> bool {
    output.lines().any(|line| {
        let mut columns = line.chars();
        let (Some(index), Some(worktree)) = (columns.next(), columns.next()) else {
            return false;
        };
        [index, worktree]
            .into_iter()
            .any(|code| !matches!(code, ' ' | '?' | '!'))
    })
}

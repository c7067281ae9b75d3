// src/deploy.rs
// =============================================================================
// Publishes the built site to the static site repository.
//
// How it works:
// 1. Clone the deployment repository, or bring an existing checkout up to
//    date (fetch, and reset + pull when it's behind)
// 2. Check out the target branch (dev or main)
// 3. Replace everything except .git with the freshly built site
// 4. Retarget the site's links for the branch's host
// 5. Commit and push if anything changed
//
// The checkout folder belongs to one run at a time. Two deploys sharing it
// will trample each other.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{info, warn};

use crate::checker::{self, HostProfile};
use crate::config::Config;
use crate::error::DoxError;
use crate::platform;
use crate::tools::SourceControl;

/// Variable the deployed commit hash is exported under.
pub const DEPLOY_COMMIT_VAR: &str = "DOX_DEPLOY_COMMIT";

/// What a deploy ended up doing.
#[derive(Debug, PartialEq, Eq)]
pub enum DeployOutcome {
    /// A commit was pushed; holds its hash when git reported one.
    Published(Option<String>),
    /// The rebuilt site was identical to what is already deployed.
    NothingToDeploy,
}

// Runs the deploy command
//
// Parameters:
//   config: the run configuration (branch, site dir, deploy settings)
//   git: the source control collaborator
pub fn run(config: &Config, git: &dyn SourceControl) -> Result<DeployOutcome> {
    info!("Deploying ...");

    let branch = config.branch.as_deref().ok_or(DoxError::MissingBranch)?;
    let host = HostProfile::from_branch(branch)
        .ok_or_else(|| DoxError::UnknownBranch(branch.to_string()))?;
    let repository = config
        .deploy
        .repository
        .as_deref()
        .ok_or_else(|| DoxError::Config("[deploy] repository is not set in dox.toml".to_string()))?;

    let site_dir = config.site_dir();
    if !site_dir.is_dir() {
        return Err(DoxError::MissingInput {
            what: "generated site",
            path: site_dir,
        }
        .into());
    }

    let checkout = config.deploy_dir();
    get_or_update(git, repository, &checkout, config.deploy.depth)?;

    if !git.checkout(&checkout, branch) {
        return Err(DoxError::collaborator("git", format!("check out branch '{branch}'")).into());
    }

    platform::clear_dir_except(&checkout, &[".git"])
        .with_context(|| format!("failed to clear {}", checkout.display()))?;
    let copied = platform::copy_dir_recursive(&site_dir, &checkout)
        .with_context(|| format!("failed to copy site into {}", checkout.display()))?;
    info!("Staged {} files for deployment.", copied);

    let changed = checker::rewrite_links(&checkout, host, &config.site)?;
    info!("Retargeted {} files for {}.", changed, host);

    // Untracked files don't count as changes until they are staged
    if !git.add_all(&checkout) {
        return Err(DoxError::collaborator("git", "stage the deployment").into());
    }
    match git.has_changes(&checkout) {
        None => {
            return Err(
                DoxError::collaborator("git", "read the deployment repository changes").into(),
            )
        }
        Some(false) => {
            info!("Nothing to deploy.");
            return Ok(DeployOutcome::NothingToDeploy);
        }
        Some(true) => {}
    }

    let message = commit_message(config, git);
    if !git.commit(&checkout, &message) {
        return Err(DoxError::collaborator("git", "commit the deployment").into());
    }
    if !git.push(&checkout) {
        return Err(DoxError::collaborator("git", "push the deployment").into());
    }

    let commit = git.head_commit(&checkout);
    if let Some(commit) = &commit {
        config.export(DEPLOY_COMMIT_VAR, commit);
    }
    info!("Deployed to {}.", host.base_url(&config.site));
    Ok(DeployOutcome::Published(commit))
}

// Clones the repository, or refreshes an existing checkout
//
// A failed clone or fetch is fatal. Failing to reset or pull a checkout
// that's behind only warns: the push will be rejected later if it matters.
fn get_or_update(
    git: &dyn SourceControl,
    repository: &str,
    checkout: &Path,
    depth: Option<u32>,
) -> Result<()> {
    if !checkout.is_dir() {
        info!("Getting latest deployment repository ...");
        if !git.clone_repo(repository, checkout, depth) {
            return Err(DoxError::collaborator("git", format!("clone {repository}")).into());
        }
        return Ok(());
    }

    info!("Fetching repository updates ...");
    if !git.fetch(checkout) {
        return Err(DoxError::collaborator("git", "fetch deployment repository updates").into());
    }

    info!("Checking repository status ...");
    match git.is_behind(checkout) {
        None => {
            return Err(
                DoxError::collaborator("git", "read the deployment repository status").into(),
            )
        }
        Some(true) => {
            info!("Resetting local deployment repository ...");
            if !git.reset_hard(checkout) {
                warn!("Unable to reset deployment repository.");
            }
            if !git.pull(checkout) {
                warn!("Unable to pull updates for deployment repository.");
            }
        }
        Some(false) => info!("Deployment repository is up-to-date."),
    }
    Ok(())
}

fn commit_message(config: &Config, git: &dyn SourceControl) -> String {
    let date = Local::now().format("%Y-%m-%d");
    match git.head_commit(&config.input_dir) {
        Some(source) => format!("Documentation update {} @ {}", date, source),
        None => format!("Documentation update {}", date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeGit;
    use std::fs;

    fn deploy_config(dir: &Path) -> Config {
        let mut config = Config::new(dir);
        config.branch = Some("main".to_string());
        config.deploy.repository = Some("https://example.com/site.git".to_string());
        config.deploy.depth = Some(1);
        let site = config.site_dir();
        fs::create_dir_all(site.join("api")).unwrap();
        fs::write(site.join("index.html"), r#"<a href="http://localhost:8080/api/">api</a>"#).unwrap();
        fs::write(site.join("api/Foo.html"), "foo").unwrap();
        config
    }

    #[test]
    fn test_fresh_clone_and_publish() {
        let dir = tempfile::tempdir().unwrap();
        let config = deploy_config(dir.path());
        let git = FakeGit {
            changes: true,
            ..FakeGit::default()
        };

        let outcome = run(&config, &git).unwrap();
        assert_eq!(outcome, DeployOutcome::Published(Some("abc1234".to_string())));

        let ops = git.operations();
        assert_eq!(ops[0], "clone https://example.com/site.git depth=Some(1)");
        assert_eq!(ops[1], "checkout main");
        assert!(ops.iter().any(|op| op.starts_with("commit Documentation update") && op.ends_with("@ abc1234")));
        assert_eq!(ops.last().unwrap(), "push");

        let staged = fs::read_to_string(config.deploy_dir().join("index.html")).unwrap();
        assert!(staged.contains("http://docs.example.com/api/"));
        assert!(config.deploy_dir().join(".git").is_dir());
    }

    #[test]
    fn test_existing_checkout_behind_is_refreshed() {
        let dir = tempfile::tempdir().unwrap();
        let config = deploy_config(dir.path());
        fs::create_dir_all(config.deploy_dir().join(".git")).unwrap();
        fs::write(config.deploy_dir().join("stale.html"), "old").unwrap();
        let git = FakeGit {
            behind: true,
            ..FakeGit::default()
        };

        let outcome = run(&config, &git).unwrap();
        assert_eq!(outcome, DeployOutcome::NothingToDeploy);
        assert_eq!(&git.operations()[..4], &["fetch", "status", "reset", "pull"]);
        assert!(!config.deploy_dir().join("stale.html").exists());
    }

    #[test]
    fn test_failed_clone_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = deploy_config(dir.path());
        let git = FakeGit {
            fail_clone: true,
            ..FakeGit::default()
        };
        let err = run(&config, &git).unwrap_err();
        assert!(matches!(err.downcast_ref::<DoxError>(), Some(DoxError::Collaborator { .. })));
    }

    #[test]
    fn test_failed_push_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = deploy_config(dir.path());
        let git = FakeGit {
            changes: true,
            fail_push: true,
            ..FakeGit::default()
        };
        assert!(run(&config, &git).is_err());
    }

    #[test]
    fn test_unreadable_status_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = deploy_config(dir.path());
        let git = FakeGit {
            changes: true,
            fail_status: true,
            ..FakeGit::default()
        };

        let err = run(&config, &git).unwrap_err();
        assert!(matches!(err.downcast_ref::<DoxError>(), Some(DoxError::Collaborator { .. })));
        assert!(!git.operations().iter().any(|op| op == "push"));
    }

    #[test]
    fn test_branch_is_required() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = deploy_config(dir.path());
        config.branch = None;
        let err = run(&config, &FakeGit::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<DoxError>(), Some(DoxError::MissingBranch)));
    }
}

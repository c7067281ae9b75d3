// src/config.rs
// =============================================================================
// The run configuration: built once in main, then lent to every step.
//
// Sources, lowest priority first:
// 1. Built-in defaults
// 2. <input>/.docfx/dox.toml (optional)
// 3. Command-line flags and their environment variables
//
// Example dox.toml:
//
//   [site]
//   dev_domain = "docs-dev.example.com"
//   main_domain = "docs.example.com"
//   source_repository = "https://github.com/example/project"
//
//   [deploy]
//   repository = "https://github.com/example/project-docs.git"
//   depth = 1
//
//   [docfx]
//   executable = "/opt/docfx/docfx"
// =============================================================================

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::checker::{HostProfile, SiteDomains};
use crate::cli::Cli;
use crate::error::DoxError;

/// Folder inside the input directory holding the doc builder's project.
pub const DOCFX_DIR: &str = ".docfx";

/// Configuration file name, looked up inside [`DOCFX_DIR`].
pub const CONFIG_FILE_NAME: &str = "dox.toml";

/// Set by TeamCity on its build agents.
pub const TEAMCITY_ENV_VAR: &str = "TEAMCITY_VERSION";

/// Settings read from dox.toml.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub site: SiteDomains,
    pub deploy: DeploySettings,
    pub docfx: DocFxSettings,
    pub ci: CiSettings,
}

/// Where the built site gets published.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeploySettings {
    /// Git URI of the static site repository.
    pub repository: Option<String>,
    /// Local checkout; defaults to <input>/.docfx/_deploy.
    pub directory: Option<PathBuf>,
    /// Shallow clone depth.
    pub depth: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocFxSettings {
    pub executable: String,
}

impl Default for DocFxSettings {
    fn default() -> Self {
        Self {
            executable: "docfx".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CiSettings {
    /// Directory the CI build drops inspection/coverage artifacts into.
    pub staging_directory: Option<PathBuf>,
}

impl FileConfig {
    // Loads dox.toml from the docfx folder; a missing file means defaults
    pub fn load(docfx_dir: &Path) -> Result<Self, DoxError> {
        let path = docfx_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            debug!("No {} found, using defaults.", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            DoxError::Config(format!("unable to read {}: {}", path.display(), e))
        })?;
        let config: Self =
            toml::from_str(&contents).map_err(|source| DoxError::ConfigFile { path, source })?;
        config.site.check().map_err(DoxError::Config)?;
        Ok(config)
    }
}

/// Which channels exported values are published on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportTargets {
    pub teamcity: bool,
    pub environment: bool,
}

/// Everything a run needs to know, resolved up front.
#[derive(Debug, Clone)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: Option<PathBuf>,
    /// Requested step identifiers; `None` means the default sequence.
    pub steps: Option<Vec<String>>,
    pub host: HostProfile,
    pub branch: Option<String>,
    pub is_ci: bool,
    pub clean: bool,
    pub json: bool,
    pub staging_dir: PathBuf,
    pub export: ExportTargets,
    pub site: SiteDomains,
    pub deploy: DeploySettings,
    pub docfx: DocFxSettings,
}

impl Config {
    /// A configuration with every default, rooted at `input_dir`.
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        let input_dir = input_dir.into();
        Self {
            staging_dir: input_dir.join("Staging"),
            input_dir,
            output_dir: None,
            steps: None,
            host: HostProfile::Local,
            branch: None,
            is_ci: false,
            clean: false,
            json: false,
            export: ExportTargets::default(),
            site: SiteDomains::default(),
            deploy: DeploySettings::default(),
            docfx: DocFxSettings::default(),
        }
    }

    // Builds the run configuration from the command line
    //
    // Fails when the branch is unknown or dox.toml can't be parsed.
    pub fn from_cli(cli: &Cli) -> Result<Self, DoxError> {
        let mut config = Config::new(&cli.input);
        let file = FileConfig::load(&config.docfx_dir())?;

        config.site = file.site;
        config.deploy = file.deploy;
        config.docfx = file.docfx;
        if let Some(staging) = file.ci.staging_directory {
            config.staging_dir = config.input_dir.join(staging);
        }

        let branch_host = match cli.branch.as_deref() {
            Some(branch) => Some(
                HostProfile::from_branch(branch)
                    .ok_or_else(|| DoxError::UnknownBranch(branch.to_string()))?,
            ),
            None => None,
        };

        config.branch = cli.branch.as_ref().map(|b| b.trim().to_lowercase());
        config.host = cli.host.or(branch_host).unwrap_or(HostProfile::Local);
        config.output_dir = cli.output.clone();
        config.steps = cli.steps.as_deref().map(crate::pipeline::parse_step_list);
        config.is_ci = env::var_os(TEAMCITY_ENV_VAR).is_some();
        config.clean = cli.clean;
        config.json = cli.json;
        config.export = ExportTargets {
            teamcity: cli.set_teamcity,
            environment: cli.set_user_env,
        };
        if let Some(staging) = &cli.staging {
            config.staging_dir = staging.clone();
        }

        debug!("Resolved configuration: {:?}", config);
        Ok(config)
    }

    pub fn docfx_dir(&self) -> PathBuf {
        self.input_dir.join(DOCFX_DIR)
    }

    pub fn docfx_json(&self) -> PathBuf {
        self.docfx_dir().join("docfx.json")
    }

    /// The docfx.json path, or a fatal error if it is missing.
    pub fn require_docfx_json(&self) -> Result<PathBuf, DoxError> {
        let path = self.docfx_json();
        if path.is_file() {
            Ok(path)
        } else {
            Err(DoxError::MissingInput {
                what: "docfx.json",
                path,
            })
        }
    }

    /// Where the doc builder writes the generated site.
    pub fn site_dir(&self) -> PathBuf {
        self.docfx_dir().join("_site")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.docfx_dir().join("reports")
    }

    pub fn deploy_dir(&self) -> PathBuf {
        self.deploy
            .directory
            .as_ref()
            .map(|dir| self.input_dir.join(dir))
            .unwrap_or_else(|| self.docfx_dir().join("_deploy"))
    }

    // Publishes a value for whatever runs after us
    //
    // TeamCity picks up service messages from stdout; the environment
    // variable is visible to anything this process starts.
    pub fn export(&self, name: &str, value: &str) {
        if self.export.teamcity {
            println!("{}", teamcity_parameter(name, value));
        }
        if self.export.environment {
            info!("Setting {}={}", name, value);
            env::set_var(name, value);
        }
    }
}

// Formats a TeamCity setParameter service message
//
// Values are escaped with TeamCity's | escapes.
pub fn teamcity_parameter(name: &str, value: &str) -> String {
    fn escape(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '|' => out.push_str("||"),
                '\'' => out.push_str("|'"),
                '[' => out.push_str("|["),
                ']' => out.push_str("|]"),
                '\n' => out.push_str("|n"),
                '\r' => out.push_str("|r"),
                _ => out.push(c),
            }
        }
        out
    }
    format!(
        "##teamcity[setParameter name='{}' value='{}']",
        escape(name),
        escape(value)
    )
}

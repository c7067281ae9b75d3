// src/error.rs
// =============================================================================
// The failures the pipeline reports by name.
//
// Everything here is fatal: main prints it on one line and exits. Problems
// that are expected to be recoverable (an optional report missing, a link
// that doesn't answer) are logged as warnings where they happen and never
// become a `DoxError`.
// =============================================================================

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DoxError {
    /// The requested step list resolved to nothing.
    #[error("No steps defined.")]
    NoSteps,

    /// Deployment needs a branch that maps onto a host.
    #[error("Unknown deployment branch '{0}', expected 'dev' or 'main'.")]
    UnknownBranch(String),

    #[error("Deployment requires --branch <dev|main>.")]
    MissingBranch,

    /// A file or directory the run cannot continue without.
    #[error("Unable to find required {what} at {}.", path.display())]
    MissingInput { what: &'static str, path: PathBuf },

    /// An external tool reported failure.
    #[error("{tool} was unable to {action}.")]
    Collaborator { tool: &'static str, action: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unable to parse {}: {source}", path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl DoxError {
    pub fn collaborator(tool: &'static str, action: impl Into<String>) -> Self {
        DoxError::Collaborator {
            tool,
            action: action.into(),
        }
    }
}

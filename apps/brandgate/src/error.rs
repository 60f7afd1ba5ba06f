//! Error types.
//!
//! Each layer recovers locally where it can: check failures become
//! zero-score `CheckResult`s and a missing gate becomes an errored
//! `GateResult`. Only `PipelineError` escapes to the binary.

use std::path::PathBuf;

/// Errors while loading reference documents.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// Document does not exist under the context directory
    #[error("context document not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Any other read failure
    #[error("io error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document content could not be parsed
    #[error("failed to parse {name}: {message}")]
    Parse { name: String, message: String },
}

impl ContextError {
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }
}

/// Errors raised by a check. Never propagated past the gate runner.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// Artifact could not be read or parsed
    #[error("unreadable artifact {file}: {message}")]
    Unreadable { file: String, message: String },

    /// Required input (sources, page snapshot) was not supplied
    #[error("missing input: {0}")]
    MissingInput(&'static str),

    /// Run was cancelled cooperatively
    #[error("cancelled")]
    Cancelled,

    /// Browser collaborator failed
    #[error("browser collaborator failed: {0}")]
    Collaborator(String),
}

/// Top-level pipeline failures.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("no gate configured for stage '{0}'")]
    MissingGate(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("background task failed: {0}")]
    Task(String),

    #[error("io error writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

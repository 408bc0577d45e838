//! Domain-specific errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RevsightError {
    #[error("no file selected")]
    NoFileSelected,
    #[error("{} is not inside a workspace", .0.display())]
    NotInWorkspace(PathBuf),
    #[error("no revisions found")]
    NoRevisionsFound,
    #[error("`{command}` failed: {detail}")]
    ExternalToolFailure { command: String, detail: String },
    #[error("unable to load {path} at {revision}: {detail}")]
    ContentFetchFailure {
        path: String,
        revision: String,
        detail: String,
    },
}

impl RevsightError {
    /// Informational conditions are reported to the user but are not failures.
    pub fn is_informational(&self) -> bool {
        matches!(self, RevsightError::NoRevisionsFound)
    }
}

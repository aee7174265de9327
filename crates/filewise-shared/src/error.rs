//! Error types for the file-state core.

use std::io;
use thiserror::Error;

/// The enumerator could not produce a usable listing
#[derive(Error, Debug)]
pub enum EnumerationError {
    #[error("failed to start lister `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("lister `{command}` exited with {status}: {stderr}")]
    ExitStatus {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("lister output is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("lister reported {declared} entries but listed {actual}")]
    Inconsistent { declared: usize, actual: usize },

    #[error("lister reported '{0}' more than once")]
    DuplicateName(String),

    #[error("failed to read directory: {0}")]
    Io(#[from] io::Error),
}

/// A file could not be created
#[derive(Error, Debug)]
pub enum CreateError {
    #[error("'{0}' is not a usable file name")]
    InvalidName(String),

    #[error("Cannot overwrite protected system files")]
    Protected(String),

    #[error("could not write '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// A file could not be deleted
#[derive(Error, Debug)]
pub enum DeleteError {
    #[error("Cannot delete protected system files")]
    Protected(String),

    #[error("File not found")]
    NotFound(String),

    #[error("'{0}' is a directory, only files can be deleted")]
    NotAFile(String),

    #[error("could not delete '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Short machine-readable code, used in logs and JSON output
    pub fn code(&self) -> &'static str {
        match self {
            DeleteError::Protected(_) => "protected",
            DeleteError::NotFound(_) => "not_found",
            DeleteError::NotAFile(_) => "not_a_file",
            DeleteError::Io { .. } => "io",
        }
    }
}

impl CreateError {
    pub fn code(&self) -> &'static str {
        match self {
            CreateError::InvalidName(_) => "invalid_name",
            CreateError::Protected(_) => "protected",
            CreateError::Io { .. } => "io",
        }
    }
}

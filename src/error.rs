//! Error type for the [`RawFileParser`](crate::RawFileParser) facade.

use std::path::PathBuf;

use crate::command::BuildError;
use crate::normalize::Failure;
use crate::version::{ToolVersion, VersionError, VersionRequirement};

/// Everything that can go wrong in one call through the facade.
#[derive(Debug, thiserror::Error)]
pub enum TrfpError {
    /// The request could not be turned into a command
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The tool ran but did not produce a usable result
    #[error(transparent)]
    Failure(#[from] Failure),

    /// The program could not be started (not installed, not on PATH, not executable)
    #[error("Could not start '{program}': {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Scratch directory or staged file handling failed
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being created, written or read
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Version string or requirement could not be parsed
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Installed tool does not satisfy the configured requirement
    #[error("Installed ThermoRawFileParser {installed} does not match requirement {required}")]
    VersionMismatch {
        /// Version reported by the tool
        installed: ToolVersion,
        /// Requirement it failed
        required: VersionRequirement,
    },
}

impl TrfpError {
    /// Exit code of the tool, when the failure came from a finished process
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            TrfpError::Failure(Failure::Execution { exit_code, .. }) => Some(*exit_code),
            _ => None,
        }
    }
}

/// Result alias for facade calls
pub type Result<T> = std::result::Result<T, TrfpError>;

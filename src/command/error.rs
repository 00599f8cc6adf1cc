use std::path::PathBuf;

/// Errors raised while turning a request into an invocation.
///
/// These are caller mistakes or target limitations; no process is ever
/// started when one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The request carried an empty input path
    #[error("Input path is empty")]
    EmptyInput,

    /// The direct executable (or the container's in-image command) has no tokens
    #[error("Tool executable is empty")]
    EmptyExecutable,

    /// A metadata or chromatogram request was built without a scratch directory
    #[error("Operation '{0}' needs a scratch directory for its staged files")]
    MissingScratchDir(&'static str),

    /// A host path cannot be expressed inside the container
    #[error("Cannot map '{}' into the container: {reason}", path.display())]
    UnsupportedTarget {
        /// Offending host path
        path: PathBuf,
        /// Why the mapping failed
        reason: String,
    },

    /// A path cannot be passed as a UTF-8 argument token
    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// A chromatogram descriptor holds NaN or an infinite value
    #[error("Chromatogram descriptor {index} has a non-finite {field}")]
    NonFiniteDescriptor {
        /// Position in the descriptor list
        index: usize,
        /// Offending field name
        field: &'static str,
    },

    /// Chromatogram descriptors could not be written as a query document
    #[error("Failed to serialize chromatogram query: {0}")]
    QuerySerialization(#[from] serde_json::Error),
}

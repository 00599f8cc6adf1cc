use std::path::PathBuf;

/// Why a finished process did not yield a structured result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Failure {
    /// The tool ran and exited non-zero
    #[error("Tool exited with code {exit_code}: {stderr}")]
    Execution {
        /// Process exit code (-1 when killed by a signal)
        exit_code: i32,
        /// Captured standard error, verbatim
        stderr: String,
    },

    /// The tool succeeded but its output is not in the expected shape
    #[error("Could not decode tool output: {reason}")]
    Decode {
        /// Output text exactly as captured
        raw: String,
        /// Decoder message
        reason: String,
    },

    /// The tool succeeded but the declared output file is absent
    #[error("Declared output was not written: {}", path.display())]
    MissingOutput {
        /// Expected host path
        path: PathBuf,
    },
}

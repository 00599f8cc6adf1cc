use std::fmt;
use std::path::PathBuf;

use crate::normalize::ResultShape;

/// A file that must exist on the host before the command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Host path to write
    pub path: PathBuf,
    /// Full file contents
    pub contents: String,
}

/// Where the structured payload appears once the tool exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSource {
    /// Captured standard output
    Stdout,
    /// A file the tool writes on the host side
    File(PathBuf),
}

/// Fully resolved command, ready for a [`ProcessRunner`](crate::runner::ProcessRunner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSpec {
    /// Program to execute (the tool, a launcher, or the container runtime)
    pub program: String,
    /// Arguments in order
    pub args: Vec<String>,
    /// Working directory for the child process
    pub working_dir: Option<PathBuf>,
    /// Files to write before running
    pub staged: Vec<StagedFile>,
    /// Where to read the payload from
    pub payload: PayloadSource,
    /// Shape the normalizer should expect
    pub shape: ResultShape,
}

impl InvocationSpec {
    /// Program followed by arguments
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for InvocationSpec {
    /// Shell-like rendering for logs; tokens with whitespace are quoted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .argv()
            .into_iter()
            .map(|token| {
                if token.is_empty() || token.chars().any(char::is_whitespace) {
                    format!("'{}'", token.replace('\'', r"'\''"))
                } else {
                    token.to_string()
                }
            })
            .collect();
        write!(f, "{}", rendered.join(" "))
    }
}

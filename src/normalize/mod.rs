//! Turning captured process output into structured values.
//!
//! [`normalize`] is the only decision point between "the process finished"
//! and "the caller gets a value":
//!
//! 1. A non-zero exit is always [`Failure::Execution`]; stdout is not read.
//! 2. JSON-shaped results are decoded with `serde_json` (float round-trip
//!    enabled, so numeric leaves keep their exact value).
//! 3. Record-shaped results are split into trimmed, non-empty lines.
//! 4. Conversions only check the exit code and, when declared, the output file.
//!
//! Empty or malformed payloads are errors, never empty defaults.

mod error;


use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use error::Failure;

/// Output of one synchronous process execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResult {
    /// Exit code; -1 when the process was terminated by a signal
    pub exit_code: i32,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl RawResult {
    /// Bundle captured output
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// True on exit code zero
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    /// Replace the payload text with the contents of a tool-written file.
    pub fn with_payload(mut self, payload: String) -> Self {
        self.stdout = payload;
        self
    }
}

/// What the caller expects the tool to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultShape {
    /// A single JSON value
    Json,
    /// One scalar record per line
    Records,
    /// No payload; optionally a file that must exist afterwards
    Convert {
        /// Declared output file
        output: Option<PathBuf>,
    },
}

/// Decoded tool output.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredResult {
    /// Generic JSON tree
    Tree(Value),
    /// Line-oriented records
    Records(Vec<String>),
    /// The operation finished and produced no payload
    Completed,
}

impl StructuredResult {
    /// Borrow the JSON tree, if this is one
    pub fn as_tree(&self) -> Option<&Value> {
        match self {
            StructuredResult::Tree(value) => Some(value),
            _ => None,
        }
    }

    /// Take the JSON tree, if this is one
    pub fn into_tree(self) -> Option<Value> {
        match self {
            StructuredResult::Tree(value) => Some(value),
            _ => None,
        }
    }

    /// Take the records, if this is a listing
    pub fn into_records(self) -> Option<Vec<String>> {
        match self {
            StructuredResult::Records(records) => Some(records),
            _ => None,
        }
    }
}

/// Map one [`RawResult`] to a [`StructuredResult`] or a [`Failure`].
pub fn normalize(raw: &RawResult, expected: &ResultShape) -> Result<StructuredResult, Failure> {
    if !raw.succeeded() {
        return Err(Failure::Execution {
            exit_code: raw.exit_code,
            stderr: raw.stderr.clone(),
        });
    }

    match expected {
        ResultShape::Json => decode_tree(&raw.stdout).map(StructuredResult::Tree),
        ResultShape::Records => decode_records(&raw.stdout).map(StructuredResult::Records),
        ResultShape::Convert { output } => {
            if let Some(path) = output {
                if !path.exists() {
                    return Err(Failure::MissingOutput { path: path.clone() });
                }
            }
            Ok(StructuredResult::Completed)
        }
    }
}

fn decode_tree(text: &str) -> Result<Value, Failure> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Failure::Decode {
            raw: text.to_string(),
            reason: "empty output".to_string(),
        });
    }

    serde_json::from_str(trimmed).map_err(|e| Failure::Decode {
        raw: text.to_string(),
        reason: e.to_string(),
    })
}

fn decode_records(text: &str) -> Result<Vec<String>, Failure> {
    let records: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if records.is_empty() {
        return Err(Failure::Decode {
            raw: text.to_string(),
            reason: "empty output".to_string(),
        });
    }

    Ok(records)
}

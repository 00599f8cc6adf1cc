use std::path::Path;

use serde::{Deserialize, Serialize};

use super::paths::{path_token, MountTable, PathRole};
use super::PathResolver;
use crate::command::BuildError;

/// Executable name used when nothing else is configured
pub const DEFAULT_EXECUTABLE: &str = "thermorawfileparser";

/// Runs the tool straight from the host.
///
/// The executable is kept as a token list so launchers such as
/// `mono ThermoRawFileParser.exe` survive intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectTarget {
    executable: Vec<String>,
}

impl DirectTarget {
    /// Split a shell-style command string on whitespace.
    pub fn new(executable: &str) -> Self {
        Self {
            executable: executable.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Tokens making up the tool command
    pub fn executable(&self) -> &[String] {
        &self.executable
    }
}

impl Default for DirectTarget {
    fn default() -> Self {
        Self::new(DEFAULT_EXECUTABLE)
    }
}

impl PathResolver for DirectTarget {
    fn resolve_file(
        &self,
        path: &Path,
        _role: PathRole,
        _mounts: &mut MountTable,
    ) -> Result<String, BuildError> {
        path_token(path)
    }

    fn resolve_dir(
        &self,
        path: &Path,
        _role: PathRole,
        _mounts: &mut MountTable,
    ) -> Result<String, BuildError> {
        path_token(path)
    }

    fn wrap(
        &self,
        tool_args: Vec<String>,
        _mounts: &MountTable,
    ) -> Result<(String, Vec<String>), BuildError> {
        let (program, launcher_args) = self
            .executable
            .split_first()
            .ok_or(BuildError::EmptyExecutable)?;

        let mut args = launcher_args.to_vec();
        args.extend(tool_args);
        Ok((program.clone(), args))
    }
}

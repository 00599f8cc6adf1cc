use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::direct::DEFAULT_EXECUTABLE;
use super::paths::{normalize_lexically, path_token, MountTable, PathRole};
use super::PathResolver;
use crate::command::BuildError;

/// Container runtime used when none is configured
pub const DEFAULT_RUNTIME: &str = "docker";

/// In-container directory under which host directories are mounted
pub const DEFAULT_MOUNT_ROOT: &str = "/data";

/// Runs the tool inside a container image.
///
/// Every host path handed to the tool is bind-mounted below `mount_root` and
/// rewritten to its in-container location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerTarget {
    image: String,
    runtime: String,
    executable: Vec<String>,
    mount_root: PathBuf,
    host_workdir: Option<PathBuf>,
}

impl ContainerTarget {
    /// Target `image` with the default runtime, executable and mount root.
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            runtime: DEFAULT_RUNTIME.to_string(),
            executable: vec![DEFAULT_EXECUTABLE.to_string()],
            mount_root: PathBuf::from(DEFAULT_MOUNT_ROOT),
            host_workdir: None,
        }
    }

    /// Use another runtime binary (e.g. `podman`)
    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }

    /// Command to run inside the image, split on whitespace
    pub fn with_executable(mut self, executable: &str) -> Self {
        self.executable = executable.split_whitespace().map(str::to_string).collect();
        self
    }

    /// Mount host directories below this in-container directory
    pub fn with_mount_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.mount_root = root.into();
        self
    }

    /// Resolve relative host paths against this directory.
    ///
    /// Without it, relative paths cannot be mounted and building fails.
    pub fn with_host_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.host_workdir = Some(dir.into());
        self
    }

    /// Image reference
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Runtime binary
    pub fn runtime(&self) -> &str {
        &self.runtime
    }

    /// In-container mount root
    pub fn mount_root(&self) -> &Path {
        &self.mount_root
    }

    fn absolute_host_path(&self, path: &Path) -> Result<PathBuf, BuildError> {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            match &self.host_workdir {
                Some(workdir) => workdir.join(path),
                None => {
                    return Err(BuildError::UnsupportedTarget {
                        path: path.to_path_buf(),
                        reason: "relative path and no host working directory configured"
                            .to_string(),
                    })
                }
            }
        };
        normalize_lexically(&joined)
    }
}

impl PathResolver for ContainerTarget {
    fn resolve_file(
        &self,
        path: &Path,
        role: PathRole,
        mounts: &mut MountTable,
    ) -> Result<String, BuildError> {
        let host = self.absolute_host_path(path)?;
        let (parent, file_name) = match (host.parent(), host.file_name()) {
            (Some(parent), Some(name)) => (parent, name),
            _ => {
                return Err(BuildError::UnsupportedTarget {
                    path: path.to_path_buf(),
                    reason: "path does not name a file".to_string(),
                })
            }
        };

        let container_dir = mounts.mount(parent, role, &self.mount_root);
        path_token(&container_dir.join(file_name))
    }

    fn resolve_dir(
        &self,
        path: &Path,
        role: PathRole,
        mounts: &mut MountTable,
    ) -> Result<String, BuildError> {
        let host = self.absolute_host_path(path)?;
        let container_dir = mounts.mount(&host, role, &self.mount_root);
        path_token(&container_dir)
    }

    fn wrap(
        &self,
        tool_args: Vec<String>,
        mounts: &MountTable,
    ) -> Result<(String, Vec<String>), BuildError> {
        if self.executable.is_empty() {
            return Err(BuildError::EmptyExecutable);
        }

        let mut args = vec!["run".to_string(), "--rm".to_string()];
        for mount in mounts.mounts() {
            args.push("-v".to_string());
            args.push(format!(
                "{}:{}",
                path_token(&mount.host)?,
                path_token(&mount.container)?
            ));
        }
        args.push(self.image.clone());
        args.extend(self.executable.iter().cloned());
        args.extend(tool_args);

        Ok((self.runtime.clone(), args))
    }
}

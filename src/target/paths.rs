use std::path::{Component, Path, PathBuf};

use crate::command::BuildError;

/// The part a host path plays in an invocation.
///
/// Container targets use the role to pick a stable mount point, so the same
/// request always produces the same volume flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathRole {
    /// The RAW file being read
    Input,
    /// Conversion output (directory or explicit file)
    Output,
    /// Staged query files and tool-written metadata
    Scratch,
}

impl PathRole {
    /// Directory name used below the container mount root.
    pub fn mount_name(&self) -> &'static str {
        match self {
            PathRole::Input => "input",
            PathRole::Output => "output",
            PathRole::Scratch => "scratch",
        }
    }
}

/// One `-v host:container` volume mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMount {
    /// Absolute, normalized host directory
    pub host: PathBuf,
    /// Directory the host path appears at inside the container
    pub container: PathBuf,
}

/// Volume mappings collected while resolving the paths of one request.
///
/// Mounts keep insertion order. A host directory that is already mounted is
/// reused rather than mounted twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountTable {
    mounts: Vec<VolumeMount>,
}

impl MountTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `host_dir` for `role` below `root`, returning the in-container directory.
    pub fn mount(&mut self, host_dir: &Path, role: PathRole, root: &Path) -> PathBuf {
        if let Some(existing) = self.mounts.iter().find(|m| m.host == host_dir) {
            return existing.container.clone();
        }

        let mut container = root.join(role.mount_name());
        let mut suffix = 2;
        while self.mounts.iter().any(|m| m.container == container) {
            container = root.join(format!("{}-{}", role.mount_name(), suffix));
            suffix += 1;
        }

        self.mounts.push(VolumeMount {
            host: host_dir.to_path_buf(),
            container: container.clone(),
        });
        container
    }

    /// Mappings in the order they were added
    pub fn mounts(&self) -> &[VolumeMount] {
        &self.mounts
    }

    /// True when nothing has been mounted
    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }
}

/// Collapse `.` and `..` components without touching the filesystem.
///
/// Fails when the path is relative, or when `..` would climb above the root.
pub fn normalize_lexically(path: &Path) -> Result<PathBuf, BuildError> {
    if !path.is_absolute() {
        return Err(BuildError::UnsupportedTarget {
            path: path.to_path_buf(),
            reason: "path is not absolute".to_string(),
        });
    }

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(BuildError::UnsupportedTarget {
                        path: path.to_path_buf(),
                        reason: "path escapes the filesystem root".to_string(),
                    });
                }
            }
            Component::Normal(part) => normalized.push(part),
        }
    }

    Ok(normalized)
}

/// Borrow a path as an argument token.
pub(crate) fn path_token(path: &Path) -> Result<String, BuildError> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| BuildError::NonUtf8Path(path.to_path_buf()))
}

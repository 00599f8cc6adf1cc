//! Invocation targets: how the external tool is reached.
//!
//! A target is chosen once per binding and never changes. There are two:
//!
//! - [`DirectTarget`]: the tool is on the host (`thermorawfileparser`,
//!   `mono ThermoRawFileParser.exe`, ...). Paths are passed through as given.
//! - [`ContainerTarget`]: the tool lives in an image. Host directories are
//!   bind-mounted under a fixed root and every path argument is rewritten.
//!
//! Both implement [`PathResolver`], so the command builder never branches on
//! the kind of target.
//!
//! ```
//! use trfp::target::{ContainerTarget, InvocationTarget};
//!
//! let local = InvocationTarget::direct("/usr/bin/thermorawfileparser");
//! let boxed = InvocationTarget::Container(
//!     ContainerTarget::new("quay.io/biocontainers/thermorawfileparser:1.3.3--ha8f3691_1")
//!         .with_host_workdir("/home/lab"),
//! );
//! assert_ne!(local, boxed);
//! ```

mod container;
mod direct;
mod paths;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::command::BuildError;

pub use container::{ContainerTarget, DEFAULT_MOUNT_ROOT, DEFAULT_RUNTIME};
pub use direct::{DirectTarget, DEFAULT_EXECUTABLE};
pub use paths::{normalize_lexically, MountTable, PathRole, VolumeMount};

/// Maps host paths to argument tokens and wraps the final command.
pub trait PathResolver {
    /// Token for a file path. Container targets mount its parent directory.
    fn resolve_file(
        &self,
        path: &Path,
        role: PathRole,
        mounts: &mut MountTable,
    ) -> Result<String, BuildError>;

    /// Token for a directory path. Container targets mount the directory itself.
    fn resolve_dir(
        &self,
        path: &Path,
        role: PathRole,
        mounts: &mut MountTable,
    ) -> Result<String, BuildError>;

    /// Turn the tool's own arguments into `(program, args)`.
    fn wrap(
        &self,
        tool_args: Vec<String>,
        mounts: &MountTable,
    ) -> Result<(String, Vec<String>), BuildError>;
}

/// How the external tool is executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationTarget {
    /// Local executable
    Direct(DirectTarget),
    /// Container image
    Container(ContainerTarget),
}

impl InvocationTarget {
    /// Direct target from a command string
    pub fn direct(executable: &str) -> Self {
        InvocationTarget::Direct(DirectTarget::new(executable))
    }

    /// Container target with default runtime and mount root
    pub fn container(image: impl Into<String>) -> Self {
        InvocationTarget::Container(ContainerTarget::new(image))
    }

    /// The resolver backing this target.
    pub fn resolver(&self) -> &dyn PathResolver {
        match self {
            InvocationTarget::Direct(target) => target as &dyn PathResolver,
            InvocationTarget::Container(target) => target as &dyn PathResolver,
        }
    }

    /// True for container targets
    pub fn is_container(&self) -> bool {
        matches!(self, InvocationTarget::Container(_))
    }
}

impl Default for InvocationTarget {
    fn default() -> Self {
        InvocationTarget::Direct(DirectTarget::default())
    }
}

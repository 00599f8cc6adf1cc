//! TOML configuration file support.
//!
//! Instead of repeating flags, the tool location and container settings can
//! live in a config file:
//!
//! ```toml
//! # trfp.toml
//! [tool]
//! executable = "mono /opt/ThermoRawFileParser/ThermoRawFileParser.exe"
//! version_requirement = ">=1.4"
//!
//! [container]
//! image = "quay.io/biocontainers/thermorawfileparser:1.3.3--ha8f3691_1"
//! runtime = "podman"
//! mount_root = "/data"
//! ```
//!
//! Command-line flags override file values, which override built-in defaults.
//! A configured `container.image` selects the container target.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use trfp::target::{ContainerTarget, DirectTarget, InvocationTarget};
use trfp::version::VersionRequirement;
use trfp::RawFileParser;

/// Root configuration structure for trfp.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Tool settings shared by both targets.
    #[serde(default)]
    pub tool: ToolConfig,

    /// Container settings; only used when `image` is set.
    #[serde(default)]
    pub container: ContainerConfig,
}

/// The `[tool]` table.
#[derive(Debug, Default, Deserialize)]
pub struct ToolConfig {
    /// Command that starts ThermoRawFileParser, split on whitespace.
    pub executable: Option<String>,

    /// Requirement checked by `trfp check` (e.g. `>=1.3.3`).
    pub version_requirement: Option<String>,
}

/// The `[container]` table.
#[derive(Debug, Default, Deserialize)]
pub struct ContainerConfig {
    /// Image reference; enables the container target.
    pub image: Option<String>,

    /// Runtime binary (`docker`, `podman`).
    pub runtime: Option<String>,

    /// In-container directory host paths are mounted under.
    pub mount_root: Option<PathBuf>,

    /// Directory relative host paths are resolved against.
    pub host_workdir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Apply command-line flags on top of the file values.
    pub fn apply_overrides(
        &mut self,
        executable: Option<&str>,
        image: Option<&str>,
        runtime: Option<&str>,
    ) {
        if let Some(executable) = executable {
            self.tool.executable = Some(executable.to_string());
        }
        if let Some(image) = image {
            self.container.image = Some(image.to_string());
        }
        if let Some(runtime) = runtime {
            self.container.runtime = Some(runtime.to_string());
        }
    }

    /// Invocation target described by this configuration.
    pub fn target(&self) -> InvocationTarget {
        match &self.container.image {
            Some(image) => {
                let mut target = ContainerTarget::new(image.as_str());
                if let Some(runtime) = &self.container.runtime {
                    target = target.with_runtime(runtime.as_str());
                }
                if let Some(executable) = &self.tool.executable {
                    target = target.with_executable(executable);
                }
                if let Some(root) = &self.container.mount_root {
                    target = target.with_mount_root(root);
                }
                if let Some(workdir) = &self.container.host_workdir {
                    target = target.with_host_workdir(workdir);
                }
                InvocationTarget::Container(target)
            }
            None => match &self.tool.executable {
                Some(executable) => InvocationTarget::Direct(DirectTarget::new(executable)),
                None => InvocationTarget::default(),
            },
        }
    }

    /// Version requirement, defaulting to the library's.
    pub fn requirement(&self) -> Result<VersionRequirement> {
        match &self.tool.version_requirement {
            Some(text) => text
                .parse()
                .with_context(|| format!("Invalid version_requirement '{}'", text)),
            None => Ok(VersionRequirement::default()),
        }
    }

    /// Facade for the configured target and requirement.
    pub fn parser(&self) -> Result<RawFileParser> {
        Ok(RawFileParser::new(self.target()).with_requirement(self.requirement()?))
    }
}

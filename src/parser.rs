//! The [`RawFileParser`] facade.
//!
//! One value per configured target. Every call is independent:
//!
//! 1. relative input paths are optionally made absolute,
//! 2. a scratch directory is created when the operation needs one,
//! 3. the command is built and staged files are written,
//! 4. the runner executes it once,
//! 5. a file-backed payload is read and the result normalized.
//!
//! The scratch directory is a [`tempfile::TempDir`] owned by the call, so it
//! is removed on every return path, including spawn and tool failures.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde_json::Value;
use tempfile::TempDir;

use crate::command::{CommandBuilder, InvocationSpec, PayloadSource};
use crate::error::{Result, TrfpError};
use crate::normalize::{normalize, Failure, RawResult, StructuredResult};
use crate::request::{
    ChromatogramQuery, ConvertRequest, MetadataFormat, MetadataRequest, OperationRequest,
    OutputFormat, SpectrumQuery,
};
use crate::runner::{ProcessRunner, SystemRunner};
use crate::target::InvocationTarget;
use crate::version::{ToolVersion, VersionRequirement};
use crate::xic::XicDescriptor;

/// Typed access to the ThermoRawFileParser command line.
///
/// ```no_run
/// use trfp::{InvocationTarget, RawFileParser};
/// use trfp::xic::XicDescriptor;
///
/// let trfp = RawFileParser::new(InvocationTarget::direct("thermorawfileparser"));
/// trfp.validate_install()?;
///
/// let metadata = trfp.metadata("OR4_110719_OB_PAR14_sSCX_fr10.raw")?;
/// let spectra = trfp.query("OR4_110719_OB_PAR14_sSCX_fr10.raw", "508,680", &[])?;
/// let xic = trfp.xic(
///     "OR4_110719_OB_PAR14_sSCX_fr10.raw",
///     vec![XicDescriptor::ppm(488.5384, 10.0)],
///     false,
/// )?;
/// # Ok::<(), trfp::TrfpError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RawFileParser<R: ProcessRunner = SystemRunner> {
    target: InvocationTarget,
    runner: R,
    requirement: VersionRequirement,
    absolute_inputs: bool,
}

impl RawFileParser<SystemRunner> {
    /// Facade running real processes against `target`
    pub fn new(target: InvocationTarget) -> Self {
        Self::with_runner(target, SystemRunner)
    }
}

impl<R: ProcessRunner> RawFileParser<R> {
    /// Facade using a custom runner
    pub fn with_runner(target: InvocationTarget, runner: R) -> Self {
        Self {
            target,
            runner,
            requirement: VersionRequirement::default(),
            absolute_inputs: true,
        }
    }

    /// Requirement checked by [`validate_install`](Self::validate_install)
    pub fn with_requirement(mut self, requirement: VersionRequirement) -> Self {
        self.requirement = requirement;
        self
    }

    /// Whether relative paths are joined onto the current directory first (default: on).
    pub fn with_absolute_inputs(mut self, enabled: bool) -> Self {
        self.absolute_inputs = enabled;
        self
    }

    /// Configured target
    pub fn target(&self) -> &InvocationTarget {
        &self.target
    }

    /// Configured version requirement
    pub fn requirement(&self) -> &VersionRequirement {
        &self.requirement
    }

    /// Run one request and normalize its output.
    pub fn execute(&self, request: &OperationRequest) -> Result<StructuredResult> {
        let request = if self.absolute_inputs {
            let cwd = std::env::current_dir().map_err(|source| TrfpError::Io {
                path: PathBuf::from("."),
                source,
            })?;
            request.rebased(&cwd)
        } else {
            request.clone()
        };

        // Lives until the end of this call; dropping it removes staged files.
        let scratch = if request.needs_scratch() {
            Some(create_scratch_dir()?)
        } else {
            None
        };

        let mut builder = CommandBuilder::new(&self.target);
        if let Some(dir) = &scratch {
            builder = builder.with_scratch_dir(dir.path());
        }
        let spec = builder.build(&request)?;

        stage_files(&spec)?;

        debug!("{}: {}", request.name(), spec);
        let raw = self
            .runner
            .run(&spec)
            .map_err(|source| TrfpError::Spawn {
                program: spec.program.clone(),
                source,
            })?;

        if !raw.succeeded() {
            warn!(
                "{} exited with code {}: {}",
                spec.program,
                raw.exit_code,
                raw.stderr.trim()
            );
        }

        let raw = collect_payload(&spec, raw)?;
        Ok(normalize(&raw, &spec.shape)?)
    }

    /// Convert `input`, optionally selecting the output format and passing extra options.
    pub fn parse(
        &self,
        input: impl Into<PathBuf>,
        format: Option<OutputFormat>,
        options: &[String],
    ) -> Result<()> {
        let mut request = ConvertRequest::new(input).options(options.iter().cloned());
        request.format = format;
        self.convert(request)
    }

    /// Run a fully specified conversion
    pub fn convert(&self, request: ConvertRequest) -> Result<()> {
        self.execute(&OperationRequest::Convert(request))?;
        Ok(())
    }

    /// File metadata as a JSON tree.
    pub fn metadata(&self, input: impl Into<PathBuf>) -> Result<Value> {
        let result = self.execute(&OperationRequest::GetMetadata(MetadataRequest::new(input)))?;
        expect_tree(result)
    }

    /// File metadata as the tool's plain text listing
    pub fn metadata_text(&self, input: impl Into<PathBuf>) -> Result<Vec<String>> {
        let request = MetadataRequest {
            input: input.into(),
            format: MetadataFormat::Text,
        };
        let result = self.execute(&OperationRequest::GetMetadata(request))?;
        expect_records(result)
    }

    /// Spectra matching `scans` (e.g. `1-5, 20, 25-30`) in ProXI format.
    pub fn query(
        &self,
        input: impl Into<PathBuf>,
        scans: &str,
        options: &[String],
    ) -> Result<Value> {
        let mut request = SpectrumQuery::new(input, scans);
        request.options = options.to_vec();
        let result = self.execute(&OperationRequest::QuerySpectrum(request))?;
        expect_tree(result)
    }

    /// Extracted-ion chromatograms for `descriptors`.
    pub fn xic(
        &self,
        input: impl Into<PathBuf>,
        descriptors: Vec<XicDescriptor>,
        base64: bool,
    ) -> Result<Value> {
        let mut request = ChromatogramQuery::new(input, descriptors);
        request.base64 = base64;
        let result = self.execute(&OperationRequest::QueryChromatogramSet(request))?;
        expect_tree(result)
    }

    /// Version string reported by `--version`
    pub fn version(&self) -> Result<String> {
        let records = expect_records(self.execute(&OperationRequest::Version)?)?;
        // Records are never empty after normalization.
        Ok(records.into_iter().next().unwrap_or_default())
    }

    /// Check that the tool starts and satisfies the version requirement.
    pub fn validate_install(&self) -> Result<ToolVersion> {
        let installed: ToolVersion = self.version()?.parse()?;
        if !self.requirement.matches(&installed) {
            return Err(TrfpError::VersionMismatch {
                installed,
                required: self.requirement.clone(),
            });
        }
        debug!("ThermoRawFileParser {} satisfies {}", installed, self.requirement);
        Ok(installed)
    }
}

fn create_scratch_dir() -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix("trfp-")
        .tempdir()
        .map_err(|source| TrfpError::Io {
            path: std::env::temp_dir(),
            source,
        })
}

fn stage_files(spec: &InvocationSpec) -> Result<()> {
    for staged in &spec.staged {
        fs::write(&staged.path, &staged.contents).map_err(|source| TrfpError::Io {
            path: staged.path.clone(),
            source,
        })?;
    }
    Ok(())
}

/// Lift a tool-written payload file into the raw result.
///
/// Failed runs are passed through untouched so the normalizer reports the
/// exit code rather than a missing file.
fn collect_payload(spec: &InvocationSpec, raw: RawResult) -> Result<RawResult> {
    match &spec.payload {
        PayloadSource::File(path) if raw.succeeded() => {
            let payload = read_payload(path)?;
            Ok(raw.with_payload(payload))
        }
        _ => Ok(raw),
    }
}

fn read_payload(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(Failure::MissingOutput {
            path: path.to_path_buf(),
        }
        .into());
    }
    fs::read_to_string(path).map_err(|source| TrfpError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn expect_tree(result: StructuredResult) -> Result<Value> {
    match result {
        StructuredResult::Tree(value) => Ok(value),
        other => Err(unexpected_shape(other)),
    }
}

fn expect_records(result: StructuredResult) -> Result<Vec<String>> {
    match result {
        StructuredResult::Records(records) => Ok(records),
        other => Err(unexpected_shape(other)),
    }
}

fn unexpected_shape(result: StructuredResult) -> TrfpError {
    Failure::Decode {
        raw: format!("{:?}", result),
        reason: "result has an unexpected shape".to_string(),
    }
    .into()
}

use std::path::{Path, PathBuf};

use super::error::BuildError;
use super::spec::{InvocationSpec, PayloadSource, StagedFile};
use crate::normalize::ResultShape;
use crate::request::{
    ChromatogramQuery, ConvertRequest, MetadataRequest, OperationRequest, OutputFormat,
    SpectrumQuery,
};
use crate::target::{InvocationTarget, MountTable, PathResolver, PathRole};
use crate::xic::serialize_query;

/// File name of the staged chromatogram query
pub const QUERY_FILE_NAME: &str = "query.json";

/// Builds [`InvocationSpec`]s for one target.
///
/// Building is pure: the same target, scratch directory and request always
/// give the same spec, and nothing is read or written.
#[derive(Debug, Clone)]
pub struct CommandBuilder<'a> {
    target: &'a InvocationTarget,
    scratch_dir: Option<PathBuf>,
    working_dir: Option<PathBuf>,
}

impl<'a> CommandBuilder<'a> {
    /// Builder for `target`
    pub fn new(target: &'a InvocationTarget) -> Self {
        Self {
            target,
            scratch_dir: None,
            working_dir: None,
        }
    }

    /// Directory for staged query files and tool-written metadata.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Working directory for the child process
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Resolve `request` into an invocation.
    pub fn build(&self, request: &OperationRequest) -> Result<InvocationSpec, BuildError> {
        if let Some(input) = request.input() {
            if input.as_os_str().is_empty() {
                return Err(BuildError::EmptyInput);
            }
        }

        let resolver = self.target.resolver();
        let mut mounts = MountTable::new();
        let mut staged = Vec::new();
        let mut payload = PayloadSource::Stdout;

        let tool_args = match request {
            OperationRequest::Convert(r) => convert_args(resolver, &mut mounts, r)?,
            OperationRequest::GetMetadata(r) => {
                let scratch = self.scratch(request)?;
                let metadata_path = scratch.join(r.format.file_name());
                let args = metadata_args(resolver, &mut mounts, r, &metadata_path)?;
                payload = PayloadSource::File(metadata_path);
                args
            }
            OperationRequest::QuerySpectrum(r) => spectrum_args(resolver, &mut mounts, r)?,
            OperationRequest::QueryChromatogramSet(r) => {
                let scratch = self.scratch(request)?;
                for (index, descriptor) in r.descriptors.iter().enumerate() {
                    if let Some(field) = descriptor.non_finite_field() {
                        return Err(BuildError::NonFiniteDescriptor { index, field });
                    }
                }
                let query_path = scratch.join(QUERY_FILE_NAME);
                staged.push(StagedFile {
                    path: query_path.clone(),
                    contents: serialize_query(&r.descriptors)?,
                });
                xic_args(resolver, &mut mounts, r, &query_path)?
            }
            OperationRequest::Version => vec!["--version".to_string()],
        };

        let (program, args) = resolver.wrap(tool_args, &mounts)?;

        // The existence check runs in the caller's process, so a relative
        // declared output is looked up from the child's working directory.
        let mut shape = request.result_shape();
        if let (ResultShape::Convert { output: Some(path) }, Some(dir)) =
            (&mut shape, &self.working_dir)
        {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }

        Ok(InvocationSpec {
            program,
            args,
            working_dir: self.working_dir.clone(),
            staged,
            payload,
            shape,
        })
    }

    fn scratch(&self, request: &OperationRequest) -> Result<&Path, BuildError> {
        self.scratch_dir
            .as_deref()
            .ok_or(BuildError::MissingScratchDir(request.name()))
    }
}

fn convert_args(
    resolver: &dyn PathResolver,
    mounts: &mut MountTable,
    request: &ConvertRequest,
) -> Result<Vec<String>, BuildError> {
    let mut args = vec![
        "-i".to_string(),
        resolver.resolve_file(&request.input, PathRole::Input, mounts)?,
    ];

    match &request.output_file {
        Some(file) => {
            args.push("-b".to_string());
            args.push(resolver.resolve_file(file, PathRole::Output, mounts)?);
        }
        None => {
            let dir = request
                .output_dir
                .clone()
                .unwrap_or_else(|| request.derived_output_dir());
            args.push("-o".to_string());
            args.push(resolver.resolve_dir(&dir, PathRole::Output, mounts)?);
        }
    }

    if let Some(format) = request.format {
        args.push("-f".to_string());
        args.push(format.tool_id().to_string());
    }
    if request.gzip {
        args.push("-g".to_string());
    }
    if request.no_peak_picking {
        args.push("-p".to_string());
    }
    if let Some(levels) = &request.ms_levels {
        args.push("-L".to_string());
        args.push(levels.clone());
    }
    if request.ignore_instrument_errors {
        args.push("-e".to_string());
    }
    if let Some(level) = request.log_level {
        args.push("-l".to_string());
        args.push(level.to_string());
    }
    args.extend(request.options.iter().cloned());

    Ok(args)
}

fn metadata_args(
    resolver: &dyn PathResolver,
    mounts: &mut MountTable,
    request: &MetadataRequest,
    metadata_path: &Path,
) -> Result<Vec<String>, BuildError> {
    Ok(vec![
        "-i".to_string(),
        resolver.resolve_file(&request.input, PathRole::Input, mounts)?,
        "-c".to_string(),
        resolver.resolve_file(metadata_path, PathRole::Scratch, mounts)?,
        "-m".to_string(),
        request.format.tool_id().to_string(),
        "-f".to_string(),
        OutputFormat::NoOutput.tool_id().to_string(),
    ])
}

fn spectrum_args(
    resolver: &dyn PathResolver,
    mounts: &mut MountTable,
    request: &SpectrumQuery,
) -> Result<Vec<String>, BuildError> {
    let mut args = vec![
        "query".to_string(),
        "-i".to_string(),
        resolver.resolve_file(&request.input, PathRole::Input, mounts)?,
        "-n".to_string(),
        request.selector.clone(),
        "-s".to_string(),
    ];
    if request.no_peak_picking {
        args.push("-p".to_string());
    }
    args.extend(request.options.iter().cloned());

    Ok(args)
}

fn xic_args(
    resolver: &dyn PathResolver,
    mounts: &mut MountTable,
    request: &ChromatogramQuery,
    query_path: &Path,
) -> Result<Vec<String>, BuildError> {
    let mut args = vec![
        "xic".to_string(),
        "-i".to_string(),
        resolver.resolve_file(&request.input, PathRole::Input, mounts)?,
        "-j".to_string(),
        resolver.resolve_file(query_path, PathRole::Scratch, mounts)?,
        "-s".to_string(),
    ];
    if request.base64 {
        args.push("--base64".to_string());
    }

    Ok(args)
}

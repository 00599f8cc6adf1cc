//! Typed operation requests.
//!
//! Each variant of [`OperationRequest`] maps to one ThermoRawFileParser mode.
//! Requests are plain data. They never look at the filesystem.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::normalize::ResultShape;
use crate::xic::XicDescriptor;

/// Conversion output formats, numbered as the tool's `-f` flag expects.
///
/// Serialized names match [`Display`](fmt::Display) and [`FromStr`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Mascot generic format
    #[serde(rename = "mgf")]
    Mgf,
    /// mzML
    #[serde(rename = "mzml")]
    MzML,
    /// mzML with an offset index
    #[default]
    #[serde(rename = "indexed_mzml")]
    IndexedMzML,
    /// Apache Parquet
    #[serde(rename = "parquet")]
    Parquet,
    /// No spectra written (metadata only)
    #[serde(rename = "none", alias = "scan_info")]
    NoOutput,
}

impl OutputFormat {
    /// Identifier passed to `-f`
    pub fn tool_id(&self) -> &'static str {
        match self {
            OutputFormat::Mgf => "0",
            OutputFormat::MzML => "1",
            OutputFormat::IndexedMzML => "2",
            OutputFormat::Parquet => "3",
            OutputFormat::NoOutput => "4",
        }
    }

    /// Extension the tool gives output files, `None` when nothing is written
    pub fn file_extension(&self) -> Option<&'static str> {
        match self {
            OutputFormat::Mgf => Some(".mgf"),
            OutputFormat::MzML | OutputFormat::IndexedMzML => Some(".mzML"),
            OutputFormat::Parquet => Some(".parquet"),
            OutputFormat::NoOutput => None,
        }
    }

    /// Returns all accepted format names.
    pub fn variants() -> &'static [&'static str] {
        &["mgf", "mzml", "indexed_mzml", "parquet", "none"]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Mgf => write!(f, "mgf"),
            OutputFormat::MzML => write!(f, "mzml"),
            OutputFormat::IndexedMzML => write!(f, "indexed_mzml"),
            OutputFormat::Parquet => write!(f, "parquet"),
            OutputFormat::NoOutput => write!(f, "none"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mgf" | "0" => Ok(OutputFormat::Mgf),
            "mzml" | "1" => Ok(OutputFormat::MzML),
            "indexed_mzml" | "indexed-mzml" | "2" => Ok(OutputFormat::IndexedMzML),
            "parquet" | "3" => Ok(OutputFormat::Parquet),
            "none" | "scan_info" | "4" => Ok(OutputFormat::NoOutput),
            _ => Err(format!(
                "Unknown output format '{}'. Valid options: {}",
                s,
                OutputFormat::variants().join(", ")
            )),
        }
    }
}

/// Metadata dump formats, numbered as the tool's `-m` flag expects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataFormat {
    /// Nested JSON objects per metadata category
    #[default]
    Json,
    /// Plain text listing, one record per line
    Text,
}

impl MetadataFormat {
    /// Identifier passed to `-m`
    pub fn tool_id(&self) -> &'static str {
        match self {
            MetadataFormat::Json => "0",
            MetadataFormat::Text => "1",
        }
    }

    /// Name of the file the tool writes into the scratch directory
    pub fn file_name(&self) -> &'static str {
        match self {
            MetadataFormat::Json => "metadata.json",
            MetadataFormat::Text => "metadata.txt",
        }
    }

    /// How the dumped metadata is decoded
    pub fn shape(&self) -> ResultShape {
        match self {
            MetadataFormat::Json => ResultShape::Json,
            MetadataFormat::Text => ResultShape::Records,
        }
    }
}

/// Convert a RAW file to spectra files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvertRequest {
    /// RAW file to convert
    pub input: PathBuf,
    /// Output format; the tool's default when `None`
    pub format: Option<OutputFormat>,
    /// Output directory; defaults to the input's directory
    pub output_dir: Option<PathBuf>,
    /// Explicit output file; takes precedence over `output_dir`
    pub output_file: Option<PathBuf>,
    /// Gzip the output
    pub gzip: bool,
    /// Disable the tool's native peak picking
    pub no_peak_picking: bool,
    /// MS levels to keep, in the tool's selector syntax (`1,2` or `1-3`)
    pub ms_levels: Option<String>,
    /// Keep going on instrument errors
    pub ignore_instrument_errors: bool,
    /// Tool log level (0 silent .. 4 error)
    pub log_level: Option<u8>,
    /// Extra arguments appended verbatim
    pub options: Vec<String>,
}

impl ConvertRequest {
    /// Convert `input` with the tool's defaults
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }

    /// Set the output format
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Write into `dir` instead of the input's directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Write exactly this file
    pub fn output_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.output_file = Some(file.into());
        self
    }

    /// Append passthrough arguments
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.extend(options.into_iter().map(Into::into));
        self
    }

    /// File the tool actually writes for an explicit `output_file`.
    ///
    /// The tool appends the format extension when the name lacks it
    /// (case-insensitively) and `.gz` when gzip is on. `None` without an
    /// explicit file or when the format writes nothing.
    pub fn expected_output(&self) -> Option<PathBuf> {
        let file = self.output_file.as_ref()?;
        let extension = self.format.unwrap_or_default().file_extension()?;

        let mut name = file.as_os_str().to_os_string();
        if !has_suffix(file, extension) {
            name.push(extension);
        }
        let mut path = PathBuf::from(name);
        if self.gzip && !has_suffix(&path, ".gz") {
            let mut name = path.into_os_string();
            name.push(".gz");
            path = PathBuf::from(name);
        }
        Some(path)
    }

    /// Directory the output lands in when no override is given.
    pub fn derived_output_dir(&self) -> PathBuf {
        match self.input.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.to_string_lossy()
        .to_lowercase()
        .ends_with(&suffix.to_lowercase())
}

/// Dump the RAW file's metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataRequest {
    /// RAW file to inspect
    pub input: PathBuf,
    /// Dump format
    pub format: MetadataFormat,
}

impl MetadataRequest {
    /// JSON metadata for `input`
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            format: MetadataFormat::Json,
        }
    }
}

/// Fetch spectra by scan selector, in ProXI format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpectrumQuery {
    /// RAW file to query
    pub input: PathBuf,
    /// Scan selector, e.g. `1-5, 20, 25-30`, forwarded unmodified
    pub selector: String,
    /// Disable native peak picking
    pub no_peak_picking: bool,
    /// Extra arguments appended verbatim
    pub options: Vec<String>,
}

impl SpectrumQuery {
    /// Query `selector` scans of `input`
    pub fn new(input: impl Into<PathBuf>, selector: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            selector: selector.into(),
            ..Default::default()
        }
    }
}

/// Extract a set of chromatograms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChromatogramQuery {
    /// RAW file to query
    pub input: PathBuf,
    /// Traces to extract, in tool order
    pub descriptors: Vec<XicDescriptor>,
    /// Ask for base64 encoded vectors
    pub base64: bool,
}

impl ChromatogramQuery {
    /// Extract `descriptors` from `input`
    pub fn new(input: impl Into<PathBuf>, descriptors: Vec<XicDescriptor>) -> Self {
        Self {
            input: input.into(),
            descriptors,
            base64: false,
        }
    }
}

/// A single call into the tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationRequest {
    /// Convert spectra to another format
    Convert(ConvertRequest),
    /// Dump file metadata
    GetMetadata(MetadataRequest),
    /// Query spectra by scan selector
    QuerySpectrum(SpectrumQuery),
    /// Extract chromatograms
    QueryChromatogramSet(ChromatogramQuery),
    /// Print the tool's version banner
    Version,
}

impl OperationRequest {
    /// Short name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            OperationRequest::Convert(_) => "convert",
            OperationRequest::GetMetadata(_) => "metadata",
            OperationRequest::QuerySpectrum(_) => "query",
            OperationRequest::QueryChromatogramSet(_) => "xic",
            OperationRequest::Version => "version",
        }
    }

    /// RAW file the request reads, if any
    pub fn input(&self) -> Option<&Path> {
        match self {
            OperationRequest::Convert(r) => Some(&r.input),
            OperationRequest::GetMetadata(r) => Some(&r.input),
            OperationRequest::QuerySpectrum(r) => Some(&r.input),
            OperationRequest::QueryChromatogramSet(r) => Some(&r.input),
            OperationRequest::Version => None,
        }
    }

    /// Whether building this request needs a scratch directory.
    pub fn needs_scratch(&self) -> bool {
        matches!(
            self,
            OperationRequest::GetMetadata(_) | OperationRequest::QueryChromatogramSet(_)
        )
    }

    /// The result shape the normalizer should expect
    pub fn result_shape(&self) -> ResultShape {
        match self {
            OperationRequest::Convert(r) => ResultShape::Convert {
                output: r.expected_output(),
            },
            OperationRequest::GetMetadata(r) => r.format.shape(),
            OperationRequest::QuerySpectrum(_) | OperationRequest::QueryChromatogramSet(_) => {
                ResultShape::Json
            }
            OperationRequest::Version => ResultShape::Records,
        }
    }

    /// Copy of the request with relative host paths joined onto `base`.
    pub fn rebased(&self, base: &Path) -> OperationRequest {
        let join = |path: &Path| {
            if path.is_relative() {
                base.join(path)
            } else {
                path.to_path_buf()
            }
        };

        match self {
            OperationRequest::Convert(r) => {
                let mut r = r.clone();
                r.input = join(&r.input);
                r.output_dir = r.output_dir.as_deref().map(join);
                r.output_file = r.output_file.as_deref().map(join);
                OperationRequest::Convert(r)
            }
            OperationRequest::GetMetadata(r) => {
                let mut r = r.clone();
                r.input = join(&r.input);
                OperationRequest::GetMetadata(r)
            }
            OperationRequest::QuerySpectrum(r) => {
                let mut r = r.clone();
                r.input = join(&r.input);
                OperationRequest::QuerySpectrum(r)
            }
            OperationRequest::QueryChromatogramSet(r) => {
                let mut r = r.clone();
                r.input = join(&r.input);
                OperationRequest::QueryChromatogramSet(r)
            }
            OperationRequest::Version => OperationRequest::Version,
        }
    }
}

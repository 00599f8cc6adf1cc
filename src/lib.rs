//! # trfp - typed bindings for ThermoRawFileParser
//!
//! `trfp` drives the [ThermoRawFileParser](https://github.com/compomics/ThermoRawFileParser)
//! command line tool to convert and query Thermo RAW files, and hands its
//! output back as native values. Reading RAW files is entirely the tool's job.
//! This crate owns two things:
//!
//! - **Command building**: a typed [`OperationRequest`] plus an
//!   [`InvocationTarget`] becomes an exact argument vector, either for a local
//!   executable or wrapped in `docker run` with bind-mounted, rewritten paths.
//! - **Result normalization**: the exit code, stdout and stderr of one run
//!   become a [`StructuredResult`] (a JSON tree, a list of records, or plain
//!   completion) or a [`Failure`] that says exactly what went wrong.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trfp::{InvocationTarget, RawFileParser};
//! use trfp::request::OutputFormat;
//!
//! let trfp = RawFileParser::new(InvocationTarget::direct("thermorawfileparser"));
//! let version = trfp.validate_install()?;
//! println!("using ThermoRawFileParser {}", version);
//!
//! trfp.parse("sample.raw", Some(OutputFormat::IndexedMzML), &[])?;
//! let metadata = trfp.metadata("sample.raw")?;
//! println!("{}", metadata["FileProperties"]);
//! # Ok::<(), trfp::TrfpError>(())
//! ```
//!
//! ## Containers
//!
//! ```rust,no_run
//! use trfp::{InvocationTarget, RawFileParser};
//! use trfp::target::ContainerTarget;
//!
//! let image = "quay.io/biocontainers/thermorawfileparser:1.3.3--ha8f3691_1";
//! let trfp = RawFileParser::new(InvocationTarget::Container(ContainerTarget::new(image)));
//! let spectra = trfp.query("/runs/sample.raw", "1-5", &[])?;
//! # Ok::<(), trfp::TrfpError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`target`]: direct and container targets, path resolution and mounts
//! - [`request`]: typed operation requests and the tool's format identifiers
//! - [`command`]: the pure command builder and [`InvocationSpec`]
//! - [`runner`]: the process runner seam and the `std::process` implementation
//! - [`normalize`]: raw output to structured results
//! - [`xic`]: chromatogram query documents and base64 trace decoding
//! - [`version`]: tool version parsing and requirement matching
//!
//! Building and normalizing never retry and never fall back to another
//! target. Every failure reaches the caller as a distinct error value.

#![warn(missing_docs)]

pub mod command;
pub mod error;
pub mod normalize;
pub mod parser;
pub mod request;
pub mod runner;
pub mod target;
pub mod version;
pub mod xic;

pub use command::{BuildError, CommandBuilder, InvocationSpec};
pub use error::TrfpError;
pub use normalize::{normalize, Failure, RawResult, ResultShape, StructuredResult};
pub use parser::RawFileParser;
pub use request::OperationRequest;
pub use target::InvocationTarget;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::command::{BuildError, CommandBuilder, InvocationSpec, PayloadSource};
    pub use crate::error::TrfpError;
    pub use crate::normalize::{normalize, Failure, RawResult, ResultShape, StructuredResult};
    pub use crate::parser::RawFileParser;
    pub use crate::request::{
        ChromatogramQuery, ConvertRequest, MetadataFormat, MetadataRequest, OperationRequest,
        OutputFormat, SpectrumQuery,
    };
    pub use crate::runner::{ProcessRunner, SystemRunner};
    pub use crate::target::{ContainerTarget, DirectTarget, InvocationTarget};
    pub use crate::xic::XicDescriptor;
}

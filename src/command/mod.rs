//! Command building: typed requests in, argument vectors out.
//!
//! [`CommandBuilder::build`] is a pure function of the target, the scratch
//! directory and the request. Argument order is fixed per operation:
//!
//! | Operation | Tool arguments |
//! |-----------|----------------|
//! | Convert | `-i IN (-o DIR \| -b FILE) [-f ID] [-g] [-p] [-L LEVELS] [-e] [-l N] [options..]` |
//! | Metadata | `-i IN -c SCRATCH/metadata.json -m ID -f 4` |
//! | Spectrum query | `query -i IN -n SELECTOR -s [-p] [options..]` |
//! | Chromatogram query | `xic -i IN -j SCRATCH/query.json -s [--base64]` |
//! | Version | `--version` |
//!
//! Container targets prepend `RUNTIME run --rm -v HOST:CONTAINER.. IMAGE EXE`
//! and rewrite every path to its mounted location.
//!
//! ```
//! use trfp::command::CommandBuilder;
//! use trfp::request::{ConvertRequest, OperationRequest, OutputFormat};
//! use trfp::target::InvocationTarget;
//!
//! let target = InvocationTarget::direct("/usr/bin/thermorawfileparser");
//! let request = OperationRequest::Convert(ConvertRequest::new("sample.raw").format(OutputFormat::MzML));
//! let spec = CommandBuilder::new(&target).build(&request)?;
//!
//! assert_eq!(spec.program, "/usr/bin/thermorawfileparser");
//! assert_eq!(spec.args, ["-i", "sample.raw", "-o", ".", "-f", "1"]);
//! # Ok::<(), trfp::command::BuildError>(())
//! ```

mod builder;
mod error;
mod spec;


pub use builder::{CommandBuilder, QUERY_FILE_NAME};
pub use error::BuildError;
pub use spec::{InvocationSpec, PayloadSource, StagedFile};

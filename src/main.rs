//! # trfp
//!
//! Command-line front end for ThermoRawFileParser. Runs the tool directly or
//! inside a container and prints its results as JSON.
//!
//! ## Usage
//!
//! ```bash
//! # Convert to indexed mzML next to the input
//! trfp convert sample.raw
//!
//! # Metadata and spectra as JSON
//! trfp metadata sample.raw
//! trfp query sample.raw --scans "1-5, 20"
//!
//! # Same, through a container image
//! trfp --docker-image quay.io/biocontainers/thermorawfileparser:1.3.3--ha8f3691_1 \
//!     xic sample.raw --mz 488.5384 --tolerance 10
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}

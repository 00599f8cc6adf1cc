use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use trfp::request::{MetadataFormat, OutputFormat};

mod check;
mod config;
mod convert;
mod query;

pub use config::Config;

/// trfp - ThermoRawFileParser from the command line, with JSON results
#[derive(Parser)]
#[command(name = "trfp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Load tool and container settings from a TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// ThermoRawFileParser command (e.g. 'mono ThermoRawFileParser.exe')
    #[arg(long, value_name = "CMD", global = true)]
    executable: Option<String>,

    /// Run the tool inside this container image
    #[arg(long, value_name = "IMAGE", global = true)]
    docker_image: Option<String>,

    /// Container runtime binary (docker, podman)
    #[arg(long, value_name = "BIN", global = true)]
    runtime: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Output formats accepted by `convert`.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    /// Mascot generic format
    Mgf,
    /// mzML
    Mzml,
    /// Indexed mzML
    IndexedMzml,
    /// Apache Parquet
    Parquet,
    /// Write no spectra
    None,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Mgf => OutputFormat::Mgf,
            FormatArg::Mzml => OutputFormat::MzML,
            FormatArg::IndexedMzml => OutputFormat::IndexedMzML,
            FormatArg::Parquet => OutputFormat::Parquet,
            FormatArg::None => OutputFormat::NoOutput,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one or more RAW files
    Convert {
        /// Input RAW file paths
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Output format
        #[arg(short = 'f', long, value_enum)]
        format: Option<FormatArg>,

        /// Output directory (defaults to each input's directory)
        #[arg(short = 'o', long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Output file (single input only)
        #[arg(short = 'b', long, value_name = "FILE", conflicts_with = "output_dir")]
        output_file: Option<PathBuf>,

        /// Gzip the output
        #[arg(short = 'g', long)]
        gzip: bool,

        /// Disable native peak picking
        #[arg(short = 'p', long)]
        no_peak_picking: bool,

        /// MS levels to keep (e.g. '1,2' or '1-3')
        #[arg(short = 'L', long, value_name = "LEVELS")]
        ms_level: Option<String>,

        /// Continue on instrument errors
        #[arg(short = 'e', long)]
        ignore_instrument_errors: bool,

        /// Number of files converted concurrently (requires the parallel feature)
        #[arg(short = 'j', long, default_value_t = 1)]
        jobs: usize,

        /// Extra ThermoRawFileParser arguments, after '--'
        #[arg(last = true, value_name = "OPTIONS")]
        options: Vec<String>,
    },

    /// Print file metadata
    Metadata {
        /// Input RAW file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Use the tool's plain text listing instead of JSON
        #[arg(long)]
        text: bool,
    },

    /// Print spectra for a scan selection in ProXI format
    Query {
        /// Input RAW file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Scan numbers, e.g. '1-5, 20, 25-30'
        #[arg(short = 'n', long, value_name = "SCANS")]
        scans: String,

        /// Disable native peak picking
        #[arg(short = 'p', long)]
        no_peak_picking: bool,

        /// Extra ThermoRawFileParser arguments, after '--'
        #[arg(last = true, value_name = "OPTIONS")]
        options: Vec<String>,
    },

    /// Print extracted-ion chromatograms
    Xic {
        /// Input RAW file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// JSON query file with descriptors (mz, tolerance, tolerance_unit, ...)
        #[arg(short = 'j', long, value_name = "FILE")]
        queries: Option<PathBuf>,

        /// Target m/z (repeatable)
        #[arg(long, value_name = "MZ")]
        mz: Vec<f64>,

        /// Tolerance applied to every --mz
        #[arg(long, default_value_t = 10.0)]
        tolerance: f64,

        /// Tolerance unit applied to every --mz
        #[arg(long, default_value = "ppm")]
        unit: String,

        /// Retention time start (minutes) applied to every --mz
        #[arg(long)]
        rt_start: Option<f64>,

        /// Retention time end (minutes) applied to every --mz
        #[arg(long)]
        rt_end: Option<f64>,

        /// Return base64 encoded vectors
        #[arg(long)]
        base64: bool,
    },

    /// Print the installed tool version
    Version,

    /// Check that the tool is reachable and recent enough
    Check,
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    /// Merge config file and flags into one configuration.
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        config.apply_overrides(
            self.executable.as_deref(),
            self.docker_image.as_deref(),
            self.runtime.as_deref(),
        );
        Ok(config)
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let config = cli.load_config()?;
    let parser = config.parser().context("Invalid configuration")?;

    match cli.command {
        Commands::Convert {
            inputs,
            format,
            output_dir,
            output_file,
            gzip,
            no_peak_picking,
            ms_level,
            ignore_instrument_errors,
            jobs,
            options,
        } => convert::run(
            &parser,
            convert::ConvertArgs {
                inputs,
                format: format.map(OutputFormat::from),
                output_dir,
                output_file,
                gzip,
                no_peak_picking,
                ms_levels: ms_level,
                ignore_instrument_errors,
                options,
            },
            jobs,
        ),
        Commands::Metadata { input, text } => {
            let format = if text {
                MetadataFormat::Text
            } else {
                MetadataFormat::Json
            };
            query::run_metadata(&parser, input, format)
        }
        Commands::Query {
            input,
            scans,
            no_peak_picking,
            options,
        } => query::run_spectra(&parser, input, scans, no_peak_picking, options),
        Commands::Xic {
            input,
            queries,
            mz,
            tolerance,
            unit,
            rt_start,
            rt_end,
            base64,
        } => query::run_xic(
            &parser,
            input,
            query::XicArgs {
                queries,
                mz,
                tolerance,
                unit,
                rt_start,
                rt_end,
                base64,
            },
        ),
        Commands::Version => check::run_version(&parser),
        Commands::Check => check::run_check(&parser),
    }
}

use anyhow::{bail, Context, Result};
use log::info;
use serde_json::Value;
use std::path::PathBuf;

use trfp::request::{MetadataFormat, MetadataRequest, OperationRequest, SpectrumQuery};
use trfp::xic::{self, XicDescriptor};
use trfp::{RawFileParser, StructuredResult};

/// Chromatogram selection from flags or a query file.
pub struct XicArgs {
    pub queries: Option<PathBuf>,
    pub mz: Vec<f64>,
    pub tolerance: f64,
    pub unit: String,
    pub rt_start: Option<f64>,
    pub rt_end: Option<f64>,
    pub base64: bool,
}

impl XicArgs {
    /// File descriptors first, then one per `--mz`, in the order given.
    fn descriptors(&self) -> Result<Vec<XicDescriptor>> {
        let mut descriptors = match &self.queries {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read query file: {}", path.display()))?;
                xic::parse_query(&text)
                    .with_context(|| format!("Invalid query file: {}", path.display()))?
            }
            None => Vec::new(),
        };

        descriptors.extend(self.mz.iter().map(|&mz| {
            XicDescriptor::new(mz, self.tolerance, self.unit.as_str())
                .with_rt_window(self.rt_start, self.rt_end)
        }));

        if descriptors.is_empty() {
            bail!("No chromatograms requested: pass --mz or --queries");
        }
        Ok(descriptors)
    }
}

pub fn run_metadata(parser: &RawFileParser, input: PathBuf, format: MetadataFormat) -> Result<()> {
    info!("Reading metadata of {}", input.display());

    let request = OperationRequest::GetMetadata(MetadataRequest { input, format });
    print_result(parser.execute(&request)?)
}

pub fn run_spectra(
    parser: &RawFileParser,
    input: PathBuf,
    scans: String,
    no_peak_picking: bool,
    options: Vec<String>,
) -> Result<()> {
    info!("Querying scans '{}' of {}", scans, input.display());

    let request = OperationRequest::QuerySpectrum(SpectrumQuery {
        input,
        selector: scans,
        no_peak_picking,
        options,
    });
    print_result(parser.execute(&request)?)
}

pub fn run_xic(parser: &RawFileParser, input: PathBuf, args: XicArgs) -> Result<()> {
    let descriptors = args.descriptors()?;
    info!(
        "Extracting {} chromatogram(s) from {}",
        descriptors.len(),
        input.display()
    );

    let value = parser.xic(input, descriptors, args.base64)?;
    print_json(&value)
}

fn print_result(result: StructuredResult) -> Result<()> {
    match result {
        StructuredResult::Tree(value) => print_json(&value),
        StructuredResult::Records(records) => {
            for record in records {
                println!("{}", record);
            }
            Ok(())
        }
        StructuredResult::Completed => Ok(()),
    }
}

fn print_json(value: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to render JSON")?;
    println!("{}", text);
    Ok(())
}

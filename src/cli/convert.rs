use anyhow::{bail, Result};
use log::info;
use std::path::PathBuf;
use std::time::Instant;

#[cfg(feature = "parallel")]
use anyhow::Context;
#[cfg(not(feature = "parallel"))]
use log::warn;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use trfp::request::{ConvertRequest, OutputFormat};
use trfp::RawFileParser;

/// Flags shared by every input of one `convert` call.
pub struct ConvertArgs {
    pub inputs: Vec<PathBuf>,
    pub format: Option<OutputFormat>,
    pub output_dir: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub gzip: bool,
    pub no_peak_picking: bool,
    pub ms_levels: Option<String>,
    pub ignore_instrument_errors: bool,
    pub options: Vec<String>,
}

impl ConvertArgs {
    fn requests(&self) -> Result<Vec<ConvertRequest>> {
        if self.output_file.is_some() && self.inputs.len() > 1 {
            bail!("--output-file can only be used with a single input");
        }

        Ok(self
            .inputs
            .iter()
            .map(|input| ConvertRequest {
                input: input.clone(),
                format: self.format,
                output_dir: self.output_dir.clone(),
                output_file: self.output_file.clone(),
                gzip: self.gzip,
                no_peak_picking: self.no_peak_picking,
                ms_levels: self.ms_levels.clone(),
                ignore_instrument_errors: self.ignore_instrument_errors,
                log_level: None,
                options: self.options.clone(),
            })
            .collect())
    }
}

/// Convert every input, `jobs` at a time.
pub fn run(parser: &RawFileParser, args: ConvertArgs, jobs: usize) -> Result<()> {
    let requests = args.requests()?;
    let start = Instant::now();

    info!("Converting {} file(s)", requests.len());
    if let Some(format) = args.format {
        info!("Format: {}", format);
    }

    let results = convert_all(parser, requests, jobs)?;

    let mut failed = 0;
    for (input, result) in results {
        match result {
            Ok(()) => info!("  {} ... done", input.display()),
            Err(e) => {
                failed += 1;
                eprintln!("{}: {}", input.display(), e);
            }
        }
    }

    info!(
        "Conversion finished in {:.1}s",
        start.elapsed().as_secs_f64()
    );

    if failed > 0 {
        bail!("{} of {} conversion(s) failed", failed, args.inputs.len());
    }
    Ok(())
}

type Outcome = (PathBuf, trfp::error::Result<()>);

#[cfg(feature = "parallel")]
fn convert_all(
    parser: &RawFileParser,
    requests: Vec<ConvertRequest>,
    jobs: usize,
) -> Result<Vec<Outcome>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .context("Failed to start conversion workers")?;

    Ok(pool.install(|| {
        requests
            .into_par_iter()
            .map(|request| {
                let input = request.input.clone();
                (input, parser.convert(request))
            })
            .collect()
    }))
}

#[cfg(not(feature = "parallel"))]
fn convert_all(
    parser: &RawFileParser,
    requests: Vec<ConvertRequest>,
    jobs: usize,
) -> Result<Vec<Outcome>> {
    if jobs > 1 {
        warn!("--jobs {} ignored: built without the parallel feature", jobs);
    }

    Ok(requests
        .into_iter()
        .map(|request| {
            let input = request.input.clone();
            (input, parser.convert(request))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(inputs: &[&str]) -> ConvertArgs {
        ConvertArgs {
            inputs: inputs.iter().map(PathBuf::from).collect(),
            format: Some(OutputFormat::MzML),
            output_dir: Some(PathBuf::from("/out")),
            output_file: None,
            gzip: true,
            no_peak_picking: false,
            ms_levels: Some("1-2".to_string()),
            ignore_instrument_errors: false,
            options: vec!["--noZlibCompression".to_string()],
        }
    }

    #[test]
    fn test_one_request_per_input() {
        let requests = args(&["/runs/a.raw", "/runs/b.raw"]).requests().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].input, PathBuf::from("/runs/b.raw"));
        assert!(requests.iter().all(|r| r.gzip));
        assert!(requests
            .iter()
            .all(|r| r.options == ["--noZlibCompression"]));
    }

    #[test]
    fn test_output_file_needs_single_input() {
        let mut multi = args(&["a.raw", "b.raw"]);
        multi.output_file = Some(PathBuf::from("out.mzML"));
        assert!(multi.requests().is_err());

        let mut single = args(&["a.raw"]);
        single.output_file = Some(PathBuf::from("out.mzML"));
        assert_eq!(single.requests().unwrap().len(), 1);
    }
}

//! Integration tests for the RawFileParser facade
//!
//! A scripted runner stands in for the tool so every call path (staging,
//! file payloads, failures, cleanup) can be checked without ThermoRawFileParser.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::json;
use tempfile::tempdir;

use trfp::prelude::*;
use trfp::xic;

/// Runner that answers with a closure and records every spec it saw.
struct ScriptedRunner<F> {
    respond: F,
    seen: Mutex<Vec<InvocationSpec>>,
}

impl<F> ScriptedRunner<F>
where
    F: Fn(&InvocationSpec) -> io::Result<RawResult> + Send + Sync,
{
    fn new(respond: F) -> Self {
        Self {
            respond,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn last(&self) -> InvocationSpec {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }
}

impl<F> ProcessRunner for ScriptedRunner<F>
where
    F: Fn(&InvocationSpec) -> io::Result<RawResult> + Send + Sync,
{
    fn run(&self, spec: &InvocationSpec) -> io::Result<RawResult> {
        self.seen.lock().unwrap().push(spec.clone());
        (self.respond)(spec)
    }
}

/// Value following `flag` in the argument list
fn arg_after(spec: &InvocationSpec, flag: &str) -> PathBuf {
    let index = spec.args.iter().position(|a| a == flag).unwrap();
    PathBuf::from(&spec.args[index + 1])
}

fn direct() -> InvocationTarget {
    InvocationTarget::direct("thermorawfileparser")
}

fn stdout(text: &str) -> io::Result<RawResult> {
    Ok(RawResult::new(0, text, ""))
}

#[test]
fn test_metadata_is_read_from_tool_written_file() {
    let runner = ScriptedRunner::new(|spec: &InvocationSpec| {
        let path = arg_after(spec, "-c");
        std::fs::write(path, r#"{"FileProperties": [{"key": "Instrument model", "value": "Orbitrap"}]}"#)?;
        stdout("")
    });
    let parser = RawFileParser::with_runner(direct(), &runner);

    let metadata = parser.metadata("/runs/sample.raw").unwrap();
    assert_eq!(metadata["FileProperties"][0]["value"], "Orbitrap");

    let spec = runner.last();
    assert_eq!(spec.args[..2], ["-i", "/runs/sample.raw"]);
    let scratch = arg_after(&spec, "-c");
    assert!(!scratch.parent().unwrap().exists(), "scratch dir left behind");
}

#[test]
fn test_metadata_text_records() {
    let runner = ScriptedRunner::new(|spec: &InvocationSpec| {
        let path = arg_after(spec, "-c");
        assert!(path.ends_with("metadata.txt"));
        std::fs::write(path, "Instrument model=Orbitrap\n\nScan range=1-36000\n")?;
        stdout("")
    });
    let parser = RawFileParser::with_runner(direct(), &runner);

    let records = parser.metadata_text("/runs/sample.raw").unwrap();
    assert_eq!(records, ["Instrument model=Orbitrap", "Scan range=1-36000"]);
}

#[test]
fn test_metadata_file_missing() {
    let runner = ScriptedRunner::new(|_: &InvocationSpec| stdout(""));
    let parser = RawFileParser::with_runner(direct(), &runner);

    let err = parser.metadata("/runs/sample.raw").unwrap_err();
    assert!(matches!(
        err,
        TrfpError::Failure(Failure::MissingOutput { .. })
    ));
}

#[test]
fn test_xic_query_file_is_staged_in_order() {
    let descriptors = vec![
        XicDescriptor::ppm(488.5384, 10.0),
        XicDescriptor::new(575.2, 0.01, "amu").with_rt_window(Some(10.0), Some(20.0)),
        XicDescriptor::ppm(300.0, 5.0).with_scan_filter("FTMS + p NSI Full ms"),
    ];
    let expected = descriptors.clone();

    let runner = ScriptedRunner::new(move |spec: &InvocationSpec| {
        let query = std::fs::read_to_string(arg_after(spec, "-j"))?;
        let staged = xic::parse_query(&query).unwrap();
        assert_eq!(staged, expected);
        stdout(r#"{"OutputMeta": {"base64": false}, "Content": [{"Meta": {}, "RetentionTimes": [0.5], "Intensities": [1024.0]}]}"#)
    });
    let parser = RawFileParser::with_runner(direct(), &runner);

    let result = parser.xic("/runs/sample.raw", descriptors, false).unwrap();
    assert_eq!(result["Content"][0]["Intensities"][0], 1024.0);

    let spec = runner.last();
    assert_eq!(spec.args[0], "xic");
    assert!(!spec.args.contains(&"--base64".to_string()));
    assert!(!arg_after(&spec, "-j").exists(), "query file left behind");
}

#[test]
fn test_xic_base64_flag() {
    let runner = ScriptedRunner::new(|_: &InvocationSpec| stdout(r#"{"Content": []}"#));
    let parser = RawFileParser::with_runner(direct(), &runner);

    parser
        .xic("/runs/sample.raw", vec![XicDescriptor::ppm(488.5, 10.0)], true)
        .unwrap();
    assert_eq!(runner.last().args.last().unwrap(), "--base64");
}

#[test]
fn test_tool_failure_cleans_scratch() {
    let runner = ScriptedRunner::new(|_: &InvocationSpec| {
        Ok(RawResult::new(1, "", "RAW file cannot be processed"))
    });
    let parser = RawFileParser::with_runner(direct(), &runner);

    let err = parser
        .xic("/runs/broken.raw", vec![XicDescriptor::ppm(488.5, 10.0)], false)
        .unwrap_err();
    assert_eq!(err.exit_code(), Some(1));
    match err {
        TrfpError::Failure(Failure::Execution { stderr, .. }) => {
            assert_eq!(stderr, "RAW file cannot be processed");
        }
        other => panic!("expected execution failure, got {:?}", other),
    }

    let query = arg_after(&runner.last(), "-j");
    assert!(!query.parent().unwrap().exists());
}

#[test]
fn test_spawn_failure() {
    let runner = ScriptedRunner::new(|_: &InvocationSpec| {
        Err(io::Error::new(io::ErrorKind::NotFound, "no such file"))
    });
    let parser = RawFileParser::with_runner(direct(), &runner);

    let err = parser.query("/runs/sample.raw", "1-5", &[]).unwrap_err();
    match err {
        TrfpError::Spawn { program, .. } => assert_eq!(program, "thermorawfileparser"),
        other => panic!("expected spawn error, got {:?}", other),
    }
}

#[test]
fn test_query_passes_selector_and_options() {
    let runner = ScriptedRunner::new(|_: &InvocationSpec| {
        stdout(r#"[{"attributes": [], "mzs": [445.120025634766], "intensities": [2e6]}]"#)
    });
    let parser = RawFileParser::with_runner(direct(), &runner);

    let spectra = parser
        .query("/runs/sample.raw", "1-5, 20", &["-p".to_string()])
        .unwrap();
    assert_eq!(spectra[0]["mzs"][0], json!(445.120025634766));
    assert_eq!(
        runner.last().args,
        ["query", "-i", "/runs/sample.raw", "-n", "1-5, 20", "-s", "-p"]
    );
}

#[test]
fn test_query_malformed_output() {
    let runner = ScriptedRunner::new(|_: &InvocationSpec| stdout("Processing 5 scans\n[{"));
    let parser = RawFileParser::with_runner(direct(), &runner);

    let err = parser.query("/runs/sample.raw", "1", &[]).unwrap_err();
    assert!(matches!(err, TrfpError::Failure(Failure::Decode { .. })));
}

#[test]
fn test_relative_inputs_are_made_absolute() {
    let runner = ScriptedRunner::new(|_: &InvocationSpec| stdout("[]"));
    let cwd = std::env::current_dir().unwrap();

    let parser = RawFileParser::with_runner(direct(), &runner);
    parser.query("sample.raw", "1", &[]).unwrap();
    assert_eq!(
        arg_after(&runner.last(), "-i"),
        cwd.join("sample.raw")
    );

    let parser = RawFileParser::with_runner(direct(), &runner).with_absolute_inputs(false);
    parser.query("sample.raw", "1", &[]).unwrap();
    assert_eq!(arg_after(&runner.last(), "-i"), Path::new("sample.raw"));
}

#[test]
fn test_convert_checks_declared_output() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("sample.mzML");

    let runner = ScriptedRunner::new(|spec: &InvocationSpec| {
        std::fs::write(arg_after(spec, "-b"), "<mzML/>")?;
        stdout("")
    });
    let parser = RawFileParser::with_runner(direct(), &runner);
    parser
        .convert(
            ConvertRequest::new("/runs/sample.raw")
                .format(OutputFormat::MzML)
                .output_file(&output),
        )
        .unwrap();
    assert!(output.exists());

    let silent = ScriptedRunner::new(|_: &InvocationSpec| stdout(""));
    let parser = RawFileParser::with_runner(direct(), &silent);
    let err = parser
        .convert(ConvertRequest::new("/runs/sample.raw").output_file(dir.path().join("none.mgf")))
        .unwrap_err();
    assert!(matches!(
        err,
        TrfpError::Failure(Failure::MissingOutput { .. })
    ));
}

#[test]
fn test_convert_gzip_expects_compressed_file() {
    let dir = tempdir().unwrap();

    // Writes the name the tool would: format extension, then ".gz".
    let runner = ScriptedRunner::new(|spec: &InvocationSpec| {
        let mut name = arg_after(spec, "-b").into_os_string();
        name.push(".mgf.gz");
        std::fs::write(&name, "BEGIN IONS")?;
        stdout("")
    });
    let parser = RawFileParser::with_runner(direct(), &runner);

    let mut request = ConvertRequest::new("/runs/sample.raw")
        .format(OutputFormat::Mgf)
        .output_file(dir.path().join("sample"));
    request.gzip = true;
    parser.convert(request).unwrap();
    assert!(dir.path().join("sample.mgf.gz").exists());
}

#[test]
fn test_xic_non_finite_never_runs() {
    let runner = ScriptedRunner::new(|_: &InvocationSpec| -> io::Result<RawResult> {
        panic!("tool must not run")
    });
    let parser = RawFileParser::with_runner(direct(), &runner);

    let err = parser
        .xic("/runs/sample.raw", vec![XicDescriptor::ppm(f64::NAN, 10.0)], false)
        .unwrap_err();
    assert!(matches!(
        err,
        TrfpError::Build(BuildError::NonFiniteDescriptor { index: 0, field: "mz" })
    ));
}

#[test]
fn test_parse_uses_input_directory() {
    let runner = ScriptedRunner::new(|_: &InvocationSpec| stdout("Processing completed\n"));
    let parser = RawFileParser::with_runner(direct(), &runner);

    parser
        .parse("/runs/sample.raw", Some(OutputFormat::IndexedMzML), &[])
        .unwrap();
    assert_eq!(
        runner.last().args,
        ["-i", "/runs/sample.raw", "-o", "/runs", "-f", "2"]
    );
}

#[test]
fn test_validate_install() {
    let runner = ScriptedRunner::new(|spec: &InvocationSpec| {
        assert_eq!(spec.args, ["--version"]);
        stdout("1.4.3\n")
    });
    let parser = RawFileParser::with_runner(direct(), &runner);
    assert_eq!(parser.version().unwrap(), "1.4.3");
    assert_eq!(parser.validate_install().unwrap().to_string(), "1.4.3");
}

#[test]
fn test_validate_install_too_old() {
    let runner = ScriptedRunner::new(|_: &InvocationSpec| stdout("1.2.0\n"));
    let parser = RawFileParser::with_runner(direct(), &runner);

    let err = parser.validate_install().unwrap_err();
    assert!(matches!(err, TrfpError::VersionMismatch { .. }));

    let parser = RawFileParser::with_runner(direct(), &runner)
        .with_requirement(">=1.0, <1.3".parse().unwrap());
    assert!(parser.validate_install().is_ok());
}

#[test]
fn test_validate_install_unparseable_version() {
    let runner = ScriptedRunner::new(|_: &InvocationSpec| stdout("ThermoRawFileParser\n"));
    let parser = RawFileParser::with_runner(direct(), &runner);

    let err = parser.validate_install().unwrap_err();
    assert!(matches!(err, TrfpError::Version(_)));
}

#[test]
fn test_container_query_mounts_input_directory() {
    let runner = ScriptedRunner::new(|_: &InvocationSpec| stdout("[]"));
    let target = InvocationTarget::Container(ContainerTarget::new("trfp:1.4.3").with_runtime("podman"));
    let parser = RawFileParser::with_runner(target, &runner);

    parser.query("/runs/day1/sample.raw", "1", &[]).unwrap();

    let spec = runner.last();
    assert_eq!(spec.program, "podman");
    assert_eq!(
        spec.args,
        [
            "run",
            "--rm",
            "-v",
            "/runs/day1:/data/input",
            "trfp:1.4.3",
            "thermorawfileparser",
            "query",
            "-i",
            "/data/input/sample.raw",
            "-n",
            "1",
            "-s",
        ]
    );
}

#[test]
fn test_container_metadata_payload_stays_on_host() {
    let runner = ScriptedRunner::new(|spec: &InvocationSpec| {
        // The tool sees the in-container path; the payload is on the host.
        assert!(arg_after(spec, "-c").starts_with("/data/scratch"));
        match &spec.payload {
            PayloadSource::File(path) => std::fs::write(path, r#"{"SampleData": []}"#)?,
            PayloadSource::Stdout => panic!("metadata should be file-backed"),
        }
        stdout("")
    });
    let parser = RawFileParser::with_runner(InvocationTarget::container("trfp:1.4.3"), &runner);

    let metadata = parser.metadata("/runs/sample.raw").unwrap();
    assert_eq!(metadata, json!({"SampleData": []}));
}

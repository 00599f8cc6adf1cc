//! Property-based tests for command building and normalization
//!
//! - Building is deterministic and never touches the filesystem
//! - Chromatogram descriptors reach the tool in order, none dropped
//! - Numeric JSON leaves survive normalization exactly
//! - Non-zero exits always fail, whatever stdout holds

use proptest::prelude::*;
use std::path::PathBuf;

use trfp::prelude::*;
use trfp::xic;

fn descriptor() -> impl Strategy<Value = XicDescriptor> {
    (
        50.0f64..2000.0,
        0.001f64..50.0,
        prop::sample::select(vec!["ppm", "amu", "mmu"]),
        prop::option::of(0.0f64..60.0),
    )
        .prop_map(|(mz, tolerance, unit, rt_start)| {
            XicDescriptor::new(mz, tolerance, unit).with_rt_window(rt_start, None)
        })
}

fn targets() -> Vec<InvocationTarget> {
    vec![
        InvocationTarget::direct("thermorawfileparser"),
        InvocationTarget::direct("mono /opt/ThermoRawFileParser.exe"),
        InvocationTarget::container("thermorawfileparser:1.4.3"),
    ]
}

proptest! {
    #[test]
    fn test_build_is_deterministic(
        selector in "[0-9]{1,4}(-[0-9]{1,4})?(, ?[0-9]{1,4})*",
        file in "[a-z][a-z0-9_]{0,12}\\.raw",
    ) {
        let input = PathBuf::from("/runs").join(&file);
        let request = OperationRequest::QuerySpectrum(SpectrumQuery::new(&input, selector.clone()));

        for target in targets() {
            let builder = CommandBuilder::new(&target);
            let first = builder.build(&request).unwrap();
            let second = builder.build(&request).unwrap();
            prop_assert_eq!(&first, &second);
            // The selector is forwarded as one token, unmodified.
            prop_assert!(first.args.contains(&selector));
        }
    }

    #[test]
    fn test_xic_descriptors_keep_order(descriptors in prop::collection::vec(descriptor(), 0..20)) {
        let request = OperationRequest::QueryChromatogramSet(
            ChromatogramQuery::new("/runs/sample.raw", descriptors.clone()),
        );

        for target in targets() {
            let spec = CommandBuilder::new(&target)
                .with_scratch_dir("/tmp/trfp-scratch")
                .build(&request)
                .unwrap();

            prop_assert_eq!(spec.staged.len(), 1);
            let staged = xic::parse_query(&spec.staged[0].contents).unwrap();
            prop_assert_eq!(&staged, &descriptors);
        }
    }

    #[test]
    fn test_float_leaves_are_exact(values in prop::collection::vec(any::<f64>().prop_filter("finite", |v| v.is_finite()), 1..64)) {
        let stdout = serde_json::to_string(&values).unwrap();
        let raw = RawResult::new(0, stdout, "");

        let tree = normalize(&raw, &ResultShape::Json).unwrap().into_tree().unwrap();
        let decoded: Vec<f64> = tree
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_f64().unwrap())
            .collect();
        prop_assert_eq!(decoded, values);
    }

    #[test]
    fn test_non_zero_exit_always_fails(
        exit_code in prop_oneof![i32::MIN..0, 1..i32::MAX],
        stdout in ".*",
        stderr in ".*",
    ) {
        let raw = RawResult::new(exit_code, stdout, stderr.clone());
        for shape in [ResultShape::Json, ResultShape::Records, ResultShape::Convert { output: None }] {
            let failure = normalize(&raw, &shape).unwrap_err();
            prop_assert_eq!(
                failure,
                Failure::Execution { exit_code, stderr: stderr.clone() }
            );
        }
    }
}

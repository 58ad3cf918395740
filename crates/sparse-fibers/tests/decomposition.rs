//! Integration tests for the decomposition engine.
//!
//! Tests cover:
//! - Frame and fiber totals matching the record count
//! - The three-record reference tensor
//! - Fiber statistics end to end
//! - Determinism and sequential/parallel parity
//! - File input, headers and one-based coordinates

use std::io::Write;

use approx::assert_abs_diff_eq;
use rstest::rstest;

use sparse_fibers::testing::{random_tensor_text, THREE_RECORDS};
use sparse_fibers::{
    AnalysisConfig, AnalysisError, AxisPair, BinKey, Density, IndexBase, ParseErrorKind,
    ReportDetail, StreamDriver, TensorDecomposition, decompose_file,
};

// =============================================================================
// Helpers
// =============================================================================

fn run(dim: usize, n_threads: usize, text: &str) -> TensorDecomposition {
    let config = AnalysisConfig::builder()
        .dim(dim)
        .n_threads(n_threads)
        .build()
        .unwrap();
    StreamDriver::new(config).unwrap().run_str(text).unwrap()
}

// =============================================================================
// Totals
// =============================================================================

#[rstest]
#[case(&[300, 300], 500, 1)]
#[case(&[300, 300, 200], 1_000, 7)]
#[case(&[50, 1_000, 20, 400], 2_000, 13)]
#[case(&[5, 5, 5, 5, 5], 300, 21)]
fn frame_counts_sum_to_total(#[case] widths: &[u64], #[case] nnz: usize, #[case] seed: u64) {
    let text = random_tensor_text(widths, nnz, seed, false, true);
    let d = run(widths.len(), 1, &text);

    assert_eq!(d.total_records(), nnz as u64);
    let n = widths.len();
    assert_eq!(d.frames().len(), n * (n - 1) / 2);
    for frame in d.frames().frames() {
        assert_eq!(frame.total(), nnz as u64, "frame {}", frame.axes());
    }
}

#[rstest]
#[case(&[300, 300], 500, 2)]
#[case(&[300, 300, 200], 1_000, 8)]
#[case(&[50, 1_000, 20, 400], 2_000, 14)]
fn fiber_counts_sum_to_total(#[case] widths: &[u64], #[case] nnz: usize, #[case] seed: u64) {
    let text = random_tensor_text(widths, nnz, seed, false, true);
    let d = run(widths.len(), 1, &text);

    assert_eq!(d.fibers().len(), widths.len());
    for group in d.fibers().groups() {
        let total: usize = group.iter().map(|(_, f)| f.count()).sum();
        assert_eq!(total, nnz, "grouping {}", group.axes());
        for (_, fiber) in group.iter() {
            let stats = fiber.stats().expect("finalized");
            assert_eq!(stats.count, fiber.values().len());
        }
    }
}

// =============================================================================
// Reference tensor
// =============================================================================

#[test]
fn three_records_frames() {
    let d = run(3, 1, THREE_RECORDS);

    let frame01 = d.frames().frame(AxisPair::new(0, 1).unwrap()).unwrap();
    assert_eq!(frame01.count(BinKey::new(0, 0)), 2);
    assert_eq!(frame01.count(BinKey::new(1, 1)), 1);
    assert_eq!(frame01.len(), 2);

    // axis 2 puts 0 and 50 in bin 0
    let frame12 = d.frames().frame(AxisPair::new(1, 2).unwrap()).unwrap();
    assert_eq!(frame12.count(BinKey::new(0, 0)), 2);
}

#[test]
fn three_records_fibers() {
    let d = run(3, 1, THREE_RECORDS);

    let along2 = d.fibers().group_by_free_axis(2).unwrap();
    assert_eq!(along2.axes().fixed(), &[0, 1]);
    let fiber = along2.fiber(&[0, 0]).unwrap();
    assert_eq!(fiber.values(), &[0, 50]);

    let stats = fiber.stats().unwrap();
    assert_eq!((stats.min, stats.max, stats.count), (0, 50, 2));
    assert_abs_diff_eq!(stats.density.unwrap().value(), 0.04, epsilon = 1e-12);
    assert_abs_diff_eq!(stats.variance.unwrap(), 625.0, epsilon = 1e-9);

    let lonely = along2.fiber(&[100, 100]).unwrap().stats().unwrap();
    assert!(lonely.is_degenerate());
    assert_eq!(lonely.variance, None);
    assert_eq!(lonely.density, None);
    assert_eq!((lonely.min, lonely.max), (100, 100));
}

#[test]
fn fiber_statistics_end_to_end() {
    // one fiber along axis 1 at fixed axis-0 coordinate 4
    let d = run(2, 1, "4 1\n4 5\n4 9\n");
    let stats = d
        .fibers()
        .group_by_free_axis(1)
        .unwrap()
        .fiber(&[4])
        .unwrap()
        .stats()
        .unwrap()
        .clone();

    assert_eq!((stats.count, stats.min, stats.max), (3, 1, 9));
    assert_abs_diff_eq!(stats.density.unwrap().value(), 0.375, epsilon = 1e-12);
    assert_abs_diff_eq!(stats.variance.unwrap(), 10.666_666_666_666_666, epsilon = 1e-9);
}

#[test]
fn repeated_coordinate_density_is_unbounded() {
    let d = run(2, 1, "3 8\n3 8\n");
    let stats = d.fibers().group_by_free_axis(1).unwrap().fiber(&[3]).unwrap().stats().unwrap();
    assert_eq!(stats.density, Some(Density::Unbounded));
    assert_eq!(stats.variance, Some(0.0));
}

#[test]
fn negative_coordinates_floor() {
    let d = run(2, 1, "-1 -100\n-101 99\n");
    let frame = d.frames().frame(AxisPair::new(0, 1).unwrap()).unwrap();
    assert_eq!(frame.count(BinKey::new(-1, -1)), 1);
    assert_eq!(frame.count(BinKey::new(-2, 0)), 1);
}

// =============================================================================
// Determinism & parallel parity
// =============================================================================

#[test]
fn repeated_runs_are_identical() {
    let text = random_tensor_text(&[400, 400, 400], 3_000, 99, false, true);
    let first = run(3, 1, &text).report(ReportDetail::Full).to_json_string().unwrap();
    let second = run(3, 1, &text).report(ReportDetail::Full).to_json_string().unwrap();
    assert_eq!(first, second);
}

#[rstest]
#[case(0)]
#[case(2)]
#[case(4)]
fn parallel_matches_sequential(#[case] n_threads: usize) {
    let text = random_tensor_text(&[120, 80, 300, 40], 2_500, 5, false, true);
    let sequential = run(4, 1, &text);
    let parallel = run(4, n_threads, &text);
    assert_eq!(parallel, sequential);
    assert_eq!(
        parallel.report(ReportDetail::Full),
        sequential.report(ReportDetail::Full)
    );
}

// =============================================================================
// Input handling
// =============================================================================

#[test]
fn one_based_matches_zero_based() {
    let zero = random_tensor_text(&[250, 250, 250], 800, 3, false, true);
    let one = random_tensor_text(&[250, 250, 250], 800, 3, true, true);

    let config = AnalysisConfig::builder()
        .dim(3)
        .index_base(IndexBase::One)
        .build()
        .unwrap();
    let from_one = StreamDriver::new(config).unwrap().run_str(&one).unwrap();
    let from_zero = run(3, 1, &zero);

    assert_eq!(from_one.frames(), from_zero.frames());
    assert_eq!(from_one.fibers(), from_zero.fibers());
}

#[test]
fn header_widths_are_reported() {
    let text = random_tensor_text(&[10, 20, 30], 10, 1, false, false);
    let d = run(3, 1, &text);
    assert_eq!(d.header().unwrap().widths, vec![10, 20, 30]);

    let report = d.report(ReportDetail::Summary);
    assert_eq!(report.header.unwrap().widths, vec![10, 20, 30]);
}

#[test]
fn decompose_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(THREE_RECORDS.as_bytes()).unwrap();
    file.flush().unwrap();

    let config = AnalysisConfig::builder().dim(3).build().unwrap();
    let d = decompose_file(config, file.path()).unwrap();
    assert_eq!(d.total_records(), 3);
}

#[test]
fn missing_file_is_io_error() {
    let config = AnalysisConfig::builder().dim(3).build().unwrap();
    let err = decompose_file(config, "/nonexistent/tensor.tns").unwrap_err();
    assert!(matches!(err, AnalysisError::Io(_)));
}

#[rstest]
#[case("0 0\n", 1, ParseErrorKind::TooFewTokens { expected: 3, found: 2 })]
#[case("0 0 0\n1 1 one\n", 2, ParseErrorKind::InvalidInteger { axis: 2, token: "one".into() })]
#[case("% a header\n\n0 0 0.5 1\n", 3, ParseErrorKind::InvalidInteger { axis: 2, token: "0.5".into() })]
fn malformed_input_aborts(#[case] text: &str, #[case] line: usize, #[case] kind: ParseErrorKind) {
    let config = AnalysisConfig::builder().dim(3).build().unwrap();
    match StreamDriver::new(config).unwrap().run_str(text) {
        Err(AnalysisError::Parse(e)) => {
            assert_eq!(e.line, line);
            assert_eq!(e.kind, kind);
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

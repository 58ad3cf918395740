//! Fixtures for tests and benchmarks.

use std::fmt::Write;

use rand::prelude::*;

/// Three records of a three-axis tensor with a trailing value column.
///
/// On axes (0, 1) with 100-wide bins, the first and last records share bin
/// `(0, 0)` and the middle record sits alone in `(1, 1)`.
pub const THREE_RECORDS: &str = "0 0 0 9.0\n100 100 100 2.0\n0 0 50 1.0\n";

/// Generate uniform random coordinates, zero-based, within `widths`.
///
/// Duplicate coordinates are possible, as in a raw nonzero dump.
pub fn random_coordinates(widths: &[u64], nnz: usize, seed: u64) -> Vec<Vec<i64>> {
    assert!(widths.iter().all(|&w| w > 0), "axis widths must be positive");
    let mut rng = StdRng::seed_from_u64(seed);
    (0..nnz)
        .map(|_| widths.iter().map(|&w| rng.gen_range(0..w) as i64).collect())
        .collect()
}

/// Render a random tensor in the coordinate text format.
///
/// The first line is a `%` header listing `widths`. Coordinates are
/// zero-based unless `one_based`; each line ends with a random value when
/// `with_values`.
pub fn random_tensor_text(widths: &[u64], nnz: usize, seed: u64, one_based: bool, with_values: bool) -> String {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    let offset = i64::from(one_based);
    let mut out = String::new();

    out.push('%');
    for w in widths {
        let _ = write!(out, " {w}");
    }
    out.push('\n');

    for record in random_coordinates(widths, nnz, seed) {
        let line: Vec<String> = record.iter().map(|c| (c + offset).to_string()).collect();
        out.push_str(&line.join(" "));
        if with_values {
            let _ = write!(out, " {}", rng.gen_range(0..200_000u32));
        }
        out.push('\n');
    }
    out
}

//! Decompose a sparse tensor file into frames and fiber statistics.
//!
//! Usage:
//!   sparse-fibers --dim 3 tensor.tns
//!   sparse-fibers --dim 4 --threads 0 --fibers --output report.json tensor.tns
//!
//! The JSON report goes to stdout unless `--output` is given. Logs go to
//! stderr; `-v` raises the level to debug, `-q` lowers it to warnings.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sparse_fibers::{AnalysisConfig, IndexBase, MalformedPolicy, ReportDetail, StreamDriver};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "sparse-fibers")]
#[command(about = "Frame histograms and fiber statistics of a sparse tensor")]
struct Args {
    /// Coordinate file: one nonzero per line, first `dim` tokens are coordinates.
    input: PathBuf,

    /// Number of tensor axes.
    #[arg(long)]
    dim: usize,

    /// Frame bin width.
    #[arg(long, default_value_t = sparse_fibers::config::DEFAULT_BUCKET_WIDTH)]
    bucket_width: i64,

    /// Coordinates in the file start at 1.
    #[arg(long)]
    one_based: bool,

    /// Skip malformed lines instead of aborting.
    #[arg(long)]
    skip_malformed: bool,

    /// Worker threads (0 = all cores, 1 = single streaming pass).
    #[arg(long, default_value_t = 1)]
    threads: usize,

    /// Include every fiber's statistics in the report.
    #[arg(long)]
    fibers: bool,

    /// Output JSON file (default: stdout).
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Debug logging.
    #[arg(long, short, conflicts_with = "quiet")]
    verbose: bool,

    /// Warnings only.
    #[arg(long, short)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match (args.verbose, args.quiet) {
        (true, _) => Level::DEBUG,
        (_, true) => Level::WARN,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = AnalysisConfig::builder()
        .dim(args.dim)
        .bucket_width(args.bucket_width)
        .index_base(if args.one_based { IndexBase::One } else { IndexBase::Zero })
        .malformed(if args.skip_malformed {
            MalformedPolicy::Skip
        } else {
            MalformedPolicy::Fail
        })
        .n_threads(args.threads)
        .build()?;

    info!(input = %args.input.display(), dim = config.dim, "decomposing tensor");
    let decomposition = StreamDriver::new(config)?.run_path(&args.input)?;

    let detail = if args.fibers {
        ReportDetail::Full
    } else {
        ReportDetail::Summary
    };
    let report = decomposition.report(detail);

    match &args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            report.to_json_writer(&mut writer)?;
            writer.flush()?;
            info!(output = %path.display(), "wrote report");
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            report.to_json_writer(&mut writer)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

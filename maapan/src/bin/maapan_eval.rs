//! maapan-eval: evaluate reconstructed maps against a ground-truth cloud.
//!
//! # Usage
//!
//! ```bash
//! # Single map, report written next to it
//! maapan-eval --config configs/eval.yaml --map runs/office.json
//!
//! # Batch: one map path per line, shared report in the output directory
//! maapan-eval --config configs/eval.yaml --batch runs/maps.txt --output results/
//!
//! # Service: map paths streamed on stdin, evaluated FIFO
//! find runs -name '*.json' | maapan-eval --config configs/eval.yaml --batch -
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};

use maapan::service::{BatchEvaluator, EvaluationQueue};
use maapan::{CancelToken, EvaluationRequest, EvaluationSession};

/// Evaluate reconstructed maps against a ground-truth point cloud
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Evaluation request (YAML)
    #[arg(short, long, default_value = "configs/eval.yaml")]
    config: PathBuf,

    /// Map to evaluate (overrides map_file from the request)
    #[arg(short, long, conflicts_with = "batch")]
    map: Option<PathBuf>,

    /// File listing one map per line, or "-" to read from stdin
    #[arg(short, long)]
    batch: Option<String>,

    /// Output directory for reports and artifacts
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every map evaluated successfully.
fn run(args: Args) -> Result<bool, Box<dyn std::error::Error>> {
    let mut request = EvaluationRequest::load(&args.config)?;
    if let Some(output) = args.output {
        request.output_directory = Some(output);
    }
    request.validate()?;

    info!("maapan-eval starting");
    info!("  Config: {}", args.config.display());
    info!("  Ground truth: {}", request.ground_truth_pointcloud_file.display());
    info!(
        "  Thresholds: max {:.3}m, inlier {:.3}m",
        request.maximum_distance, request.inlier_distance
    );

    let cancel = CancelToken::new();
    let token = cancel.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        token.cancel();
    })?;

    let session = EvaluationSession::load(&request.ground_truth_pointcloud_file)?;

    match args.batch {
        Some(list) => run_batch(session, request, cancel, &list),
        None => {
            let map = args
                .map
                .or_else(|| request.map_file.clone())
                .ok_or("no map given: pass --map, --batch or set map_file")?;
            let mut evaluator = BatchEvaluator::new(session, request).with_cancel(cancel);
            Ok(evaluator.process(&map).is_ok())
        }
    }
}

fn run_batch(
    session: EvaluationSession,
    request: EvaluationRequest,
    cancel: CancelToken,
    list: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let report_dir = request
        .output_directory
        .clone()
        .unwrap_or_else(|| list_directory(list));

    let mut evaluator = BatchEvaluator::new(session, request).with_cancel(cancel.clone());
    if evaluator.request().evaluate {
        evaluator.open_batch_report(&report_dir)?;
    }
    let queue = EvaluationQueue::spawn(evaluator)?;

    let reader: Box<dyn BufRead> = if list == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(list)?))
    };

    let mut pending = Vec::new();
    for line in reader.lines() {
        if cancel.is_cancelled() {
            warn!("Cancelled, no further maps accepted");
            break;
        }
        let line = line?;
        let path = line.trim();
        if path.is_empty() || path.starts_with('#') {
            continue;
        }
        pending.push(queue.submit(path)?);
    }

    // Results arrive in submission order; failures were already logged
    for response in pending {
        let _ = response.recv();
    }

    let summary = queue.shutdown()?;
    info!(
        "Batch finished: {} evaluated, {} failed",
        summary.processed, summary.failed
    );
    Ok(summary.failed == 0 && !cancel.is_cancelled())
}

/// Directory holding the map list, or the working directory for stdin.
fn list_directory(list: &str) -> PathBuf {
    if list == "-" {
        return PathBuf::from(".");
    }
    match Path::new(list).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

//! Batch evaluation driver.
//!
//! Evaluates maps one after another against a shared [`EvaluationSession`],
//! appending one report row per map and writing the artifacts the request
//! enables. A failed map is logged with its stage and skipped; the session
//! is never touched by a failure, so the next map starts clean.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, error, info, warn};

use super::loader::{JsonMapLoader, MapLoader};
use crate::config::EvaluationRequest;
use crate::core::CancelToken;
use crate::error::{EvalError, Stage};
use crate::evaluation::{EvaluationOutcome, EvaluationSession};
use crate::io::report::ReportWriter;
use crate::io::{FormatError, map_format, ply};
use crate::map::ReconstructedMap;

/// Counts of a batch run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Maps evaluated successfully
    pub processed: usize,
    /// Maps that failed at some stage
    pub failed: usize,
}

impl BatchSummary {
    /// Maps attempted.
    pub fn total(&self) -> usize {
        self.processed + self.failed
    }
}

/// Evaluates maps FIFO against one ground truth.
pub struct BatchEvaluator<L: MapLoader = JsonMapLoader> {
    session: EvaluationSession,
    request: EvaluationRequest,
    loader: L,
    /// Shared report in batch mode; per-map reports otherwise
    report: Option<ReportWriter<File>>,
    cancel: CancelToken,
    summary: BatchSummary,
}

impl BatchEvaluator<JsonMapLoader> {
    /// Driver loading JSON map documents.
    pub fn new(session: EvaluationSession, request: EvaluationRequest) -> Self {
        Self::with_loader(session, request, JsonMapLoader)
    }
}

impl<L: MapLoader> BatchEvaluator<L> {
    /// Driver with a custom map loader.
    pub fn with_loader(session: EvaluationSession, request: EvaluationRequest, loader: L) -> Self {
        Self {
            session,
            request,
            loader,
            report: None,
            cancel: CancelToken::new(),
            summary: BatchSummary::default(),
        }
    }

    /// Use `cancel` for every pass this driver runs.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Request every map is evaluated with.
    pub fn request(&self) -> &EvaluationRequest {
        &self.request
    }

    /// Counts so far.
    pub fn summary(&self) -> BatchSummary {
        self.summary
    }

    /// Open the shared batch report `<output_suffix>.csv` in `directory`.
    ///
    /// Without a shared report, every map gets its own
    /// `<map>_<output_suffix>.csv` next to its artifacts.
    pub fn open_batch_report(&mut self, directory: &Path) -> Result<PathBuf, EvalError> {
        create_dir(directory, Stage::Report)?;
        let path = directory.join(format!("{}.csv", self.request.output_suffix));
        self.report = Some(ReportWriter::create(&path)?);
        info!("[Batch] Writing report to {}", path.display());
        Ok(path)
    }

    /// Evaluate every map in order, continuing past failures.
    ///
    /// Stops early only when the cancel token fires.
    pub fn run<I, P>(&mut self, maps: I) -> BatchSummary
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let start = Instant::now();
        for path in maps {
            if self.cancel.is_cancelled() {
                warn!("[Batch] Cancelled, skipping remaining maps");
                break;
            }
            // Failures are logged and counted by process()
            let _ = self.process(path.as_ref());
        }
        info!(
            "[Batch] {} maps evaluated, {} failed in {:.1}s",
            self.summary.processed,
            self.summary.failed,
            start.elapsed().as_secs_f64()
        );
        self.summary
    }

    /// Load, evaluate and export one map.
    pub fn process(&mut self, map_path: &Path) -> Result<EvaluationOutcome, EvalError> {
        info!("[Batch] Evaluating {} ({} loader)", map_path.display(), self.loader.name());
        match self.process_map(map_path) {
            Ok(outcome) => {
                self.summary.processed += 1;
                Ok(outcome)
            }
            Err(e) => {
                self.summary.failed += 1;
                error!("[Batch] {} failed at {}: {}", map_path.display(), e.stage(), e);
                Err(e)
            }
        }
    }

    fn process_map(&mut self, map_path: &Path) -> Result<EvaluationOutcome, EvalError> {
        let mut map = self.loader.load(map_path)?;
        let outcome = self.session.evaluate(&mut map, &self.request, &self.cancel)?;

        let directory = self.output_directory(map_path);
        let name = map_name(map_path);

        if let (Some(reconstruction), Some(mesh)) = (&outcome.reconstruction, &outcome.mesh) {
            match self.report.as_mut() {
                Some(report) => report.append(reconstruction, mesh)?,
                None => {
                    create_dir(&directory, Stage::Report)?;
                    let path = directory.join(format!("{name}_{}.csv", self.request.output_suffix));
                    let mut report = ReportWriter::create(&path)?;
                    report.append(reconstruction, mesh)?;
                    debug!("[Batch] Wrote report {}", path.display());
                }
            }
        }

        self.export(&map, &outcome, &directory, &name)?;
        Ok(outcome)
    }

    fn export(
        &self,
        map: &ReconstructedMap,
        outcome: &EvaluationOutcome,
        directory: &Path,
        name: &str,
    ) -> Result<(), EvalError> {
        let wants_export = outcome.coloring.is_some()
            || self.request.export_mesh
            || outcome.labeled.is_some()
            || outcome.coverage.is_some();
        if !wants_export {
            return Ok(());
        }
        create_dir(directory, Stage::Export)?;

        if outcome.coloring.is_some() {
            let tag = self.request.color_mode().file_tag();
            let path = directory.join(format!("{name}_{tag}.json"));
            map_format::save_map(&path, map).map_err(|e| export_error(&path, e))?;
            info!("[Export] Saved colored map to {}", path.display());
        }

        if self.request.export_mesh {
            let mesh = map.world_mesh();
            let path = directory.join(format!("{name}.mesh.ply"));
            ply::write_colored_points(&path, &mesh.vertices, &mesh.colors)
                .map_err(|e| export_error(&path, e))?;
            info!("[Export] Saved {} mesh vertices to {}", mesh.len(), path.display());
        }

        if let Some(labeled) = &outcome.labeled {
            let path = directory.join(format!("{name}.pointcloud.ply"));
            ply::write_labeled_points(&path, labeled).map_err(|e| export_error(&path, e))?;
            info!("[Export] Saved {} labeled points to {}", labeled.len(), path.display());
        }

        if let Some(coverage) = &outcome.coverage {
            let path = directory.join(format!("{name}.coverage.ply"));
            ply::write_points(&path, &coverage.points).map_err(|e| export_error(&path, e))?;
            info!(
                "[Export] Saved {} coverage points to {}",
                coverage.points.len(),
                path.display()
            );
        }

        Ok(())
    }

    fn output_directory(&self, map_path: &Path) -> PathBuf {
        if let Some(directory) = &self.request.output_directory {
            return directory.clone();
        }
        match map_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// File stem used to name a map's artifacts.
fn map_name(map_path: &Path) -> String {
    map_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "map".to_string())
}

fn create_dir(directory: &Path, stage: Stage) -> Result<(), EvalError> {
    fs::create_dir_all(directory).map_err(|source| EvalError::Io {
        stage,
        path: directory.to_path_buf(),
        source,
    })
}

fn export_error(path: &Path, error: FormatError) -> EvalError {
    let source = match error {
        FormatError::Io(e) => e,
        other => std::io::Error::other(other.to_string()),
    };
    EvalError::Io {
        stage: Stage::Export,
        path: path.to_path_buf(),
        source,
    }
}

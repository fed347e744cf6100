//! Evaluation errors.
//!
//! Every error names the [`Stage`] it came from, so a failed request in batch
//! mode can be reported precisely without aborting the batch.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::evaluation::{ColorizeSummary, CoverageReport, MeshReport, ReconstructionReport};

/// Pipeline stage that produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Request validation and configuration loading.
    Configuration,
    /// Loading the ground-truth cloud or the reconstructed map.
    Load,
    /// Building the spatial index over the ground-truth cloud.
    IndexBuild,
    /// Ground-truth points through the distance field.
    Reconstruction,
    /// Surface vertices through the spatial index.
    Mesh,
    /// Error color write-back.
    Colorization,
    /// Coverage voxelization.
    Coverage,
    /// Writing artifacts (maps, point clouds).
    Export,
    /// Appending rows to the tabular report.
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Configuration => "configuration",
            Stage::Load => "load",
            Stage::IndexBuild => "index build",
            Stage::Reconstruction => "reconstruction pass",
            Stage::Mesh => "mesh pass",
            Stage::Colorization => "colorization",
            Stage::Coverage => "coverage",
            Stage::Export => "export",
            Stage::Report => "report",
        };
        f.write_str(name)
    }
}

/// Partial output of a pass that observed cancellation.
#[derive(Clone, Debug)]
pub enum PartialResult {
    /// Reconstruction statistics accumulated before cancellation.
    Reconstruction(ReconstructionReport),
    /// Mesh statistics accumulated before cancellation.
    Mesh(MeshReport),
    /// Coloring summary before cancellation (colors are not written back).
    Colorization(ColorizeSummary),
    /// Coverage points found before cancellation.
    Coverage(CoverageReport),
}

/// Evaluation error.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Invalid thresholds or request fields; raised before any pass starts.
    #[error("{stage} error: {message}")]
    Configuration {
        /// Failing stage (usually [`Stage::Configuration`]).
        stage: Stage,
        /// What is wrong.
        message: String,
    },

    /// Ground truth or map could not be loaded.
    #[error("{stage} failed for '{}': {reason}", path.display())]
    Load {
        /// Failing stage.
        stage: Stage,
        /// File being loaded.
        path: PathBuf,
        /// Why it failed.
        reason: String,
    },

    /// The ground-truth cloud has no points.
    #[error("{stage} failed: ground-truth cloud is empty")]
    EmptyInput {
        /// Failing stage.
        stage: Stage,
    },

    /// Cooperative cancellation observed mid-pass.
    #[error("{stage} cancelled; partial results are incomplete")]
    Cancelled {
        /// Stage that was interrupted.
        stage: Stage,
        /// Whatever had accumulated before the pass stopped.
        partial: Box<PartialResult>,
    },

    /// I/O failure while writing artifacts or reports.
    #[error("{stage} failed for '{}': {source}", path.display())]
    Io {
        /// Failing stage.
        stage: Stage,
        /// File being written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl EvalError {
    /// Configuration error raised during request validation.
    pub fn config(message: impl Into<String>) -> Self {
        EvalError::Configuration {
            stage: Stage::Configuration,
            message: message.into(),
        }
    }

    /// Load failure for `path`.
    pub fn load(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        EvalError::Load {
            stage: Stage::Load,
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Stage that produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            EvalError::Configuration { stage, .. }
            | EvalError::Load { stage, .. }
            | EvalError::EmptyInput { stage }
            | EvalError::Cancelled { stage, .. }
            | EvalError::Io { stage, .. } => *stage,
        }
    }

    /// Was this a cancellation?
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EvalError::Cancelled { .. })
    }

    /// Partial results carried by a cancellation error.
    pub fn partial(&self) -> Option<&PartialResult> {
        match self {
            EvalError::Cancelled { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

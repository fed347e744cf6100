//! Map accuracy evaluation.
//!
//! ## Passes
//!
//! | Pass | Input | Output |
//! |------|-------|--------|
//! | Reconstruction | ground-truth points → distance field | [`ReconstructionReport`] |
//! | Mesh | surface vertices → spatial index | [`MeshReport`] |
//! | Colorization | either error, written onto the map | [`ColorizeSummary`] |
//! | Coverage | ground-truth cells → observed flag | [`CoverageReport`] |
//! | Labeled export | surface vertices + class voxels | [`LabeledPoint`]s |
//!
//! [`EvaluationSession`] holds the ground truth and runs the passes a request
//! enables.
//!
//! ## Determinism
//!
//! Inner loops run on rayon over fixed blocks of [`BLOCK_SIZE`] elements.
//! Block results are collected in block order and reduced sequentially, so
//! every report is bit-identical regardless of thread count. Cancellation is
//! checked once per block.

mod colorize;
mod coverage;
mod labeled;
mod mesh;
mod reconstruction;
mod session;
mod stats;

pub use colorize::{ColorMode, ColorizeSummary, ErrorColorizer, error_color};
pub use coverage::{CoverageAnalyzer, CoverageReport};
pub use labeled::{LabeledPoint, MAX_EXPORTED_LABEL, labeled_points};
pub use mesh::compute_mesh_error;
pub use reconstruction::compute_reconstruction_error;
pub use session::{EvaluationOutcome, EvaluationSession};
pub use stats::{ErrorStatistics, MeshReport, ReconstructionReport};

/// Elements per parallel work unit and cancellation check.
pub const BLOCK_SIZE: usize = 4096;

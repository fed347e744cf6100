//! # Maapan
//!
//! Accuracy and coverage evaluation of volumetric reconstructions against a
//! ground-truth point cloud.
//!
//! ## Overview
//!
//! Given a reconstructed map (one global signed-distance grid or a collection
//! of overlapping submaps) and a dense ground-truth cloud, Maapan measures:
//!
//! - **Reconstruction error**: how far each ground-truth point is from the
//!   reconstructed surface, read from the map's distance field
//! - **Mesh error**: how far each extracted surface vertex is from the
//!   nearest ground-truth point
//! - **Coverage**: which ground-truth cells the map observed at all
//!
//! and can paint per-voxel or per-vertex error colors back onto the map,
//! export labeled surface clouds and append CSV report rows.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use maapan::{CancelToken, EvaluationRequest, EvaluationSession};
//! use maapan::service::{JsonMapLoader, MapLoader};
//!
//! let request = EvaluationRequest::load("configs/eval.yaml".as_ref())?;
//! let session = EvaluationSession::load(&request.ground_truth_pointcloud_file)?;
//!
//! let mut map = JsonMapLoader.load("maps/office.json".as_ref())?;
//! let outcome = session.evaluate(&mut map, &request, &CancelToken::new())?;
//!
//! if let Some(report) = outcome.reconstruction {
//!     println!("{}", report.summary());
//! }
//! ```
//!
//! ## Coordinate System
//!
//! All positions are meters in a right-handed world frame. Submap grids live
//! in their own frame; each submap's transform maps submap to world.

#![warn(missing_docs)]

// Core types
pub mod core;

// Ground-truth cloud and coverage voxelization
pub mod cloud;

// KD-tree over the ground truth
pub mod spatial;

// Reconstructed map model
pub mod map;

// Distance field queries over maps
pub mod field;

// Evaluation passes and session
pub mod evaluation;

// Request configuration
pub mod config;

// File formats
pub mod io;

// Batch and service drivers
pub mod service;

pub mod error;

// Re-export commonly used types
pub use core::{Bounds3, CancelToken, Color, Point, Transform, VoxelIndex};

pub use cloud::{CoverageGrid, GroundTruthCloud};
pub use config::{ConfigLoadError, EvaluationRequest};
pub use error::{EvalError, PartialResult, Stage};
pub use evaluation::{
    ColorMode, ColorizeSummary, CoverageReport, ErrorStatistics, EvaluationOutcome,
    EvaluationSession, LabeledPoint, MeshReport, ReconstructionReport,
};
pub use field::{DistanceField, DistanceSample, QueryPolicy};
pub use map::{GlobalMap, ReconstructedMap, Submap, SubmapCollection, SubmapId, TsdfGrid};
pub use spatial::SpatialIndex;

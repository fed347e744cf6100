//! Evaluation request loaded from YAML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::defaults;
use super::error::ConfigLoadError;
use crate::error::EvalError;
use crate::evaluation::ColorMode;
use crate::field::QueryPolicy;

/// Everything one evaluation needs to know besides the map itself.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// Map evaluated in single-map mode
    #[serde(default)]
    pub map_file: Option<PathBuf>,

    /// Ground-truth point cloud (ASCII PLY or XYZ)
    #[serde(default)]
    pub ground_truth_pointcloud_file: PathBuf,

    /// Directory for reports and artifacts; defaults to the map's directory
    #[serde(default)]
    pub output_directory: Option<PathBuf>,

    /// Report file name suffix
    #[serde(default = "defaults::output_suffix")]
    pub output_suffix: String,

    /// Errors above this bound are truncated (meters)
    #[serde(default = "defaults::maximum_distance")]
    pub maximum_distance: f32,

    /// Errors at or below this bound are inliers (meters)
    #[serde(default = "defaults::inlier_distance")]
    pub inlier_distance: f32,

    /// Run the reconstruction and mesh passes
    #[serde(default = "defaults::enabled")]
    pub evaluate: bool,

    /// Paint error colors onto the map and save it
    #[serde(default)]
    pub compute_coloring: bool,

    /// Drop truncated points from the statistics instead of clamping them
    #[serde(default)]
    pub ignore_truncated_points: bool,

    /// Voxel coloring uses the max instead of the mean neighbor error
    #[serde(default)]
    pub color_by_max_error: bool,

    /// Color surface vertices by their distance to the ground truth
    #[serde(default = "defaults::enabled")]
    pub color_by_mesh_distance: bool,

    /// Treat a submap map as one flat volume (no submap filtering)
    #[serde(default)]
    pub is_single_tsdf: bool,

    /// Write the merged surface mesh
    #[serde(default)]
    pub export_mesh: bool,

    /// Write the labeled surface point cloud
    #[serde(default)]
    pub export_labeled_pointcloud: bool,

    /// Write the coverage point cloud
    #[serde(default)]
    pub export_coverage_pointcloud: bool,

    /// Coverage cell size (meters), independent of the map's voxel size
    #[serde(default = "defaults::coverage_voxel_size")]
    pub coverage_voxel_size: f32,

    /// Neighbor cap per square meter of voxel face for voxel coloring
    #[serde(default = "defaults::max_neighbors_factor")]
    pub max_neighbors_factor: f32,

    /// Overlap policy for submap maps; required for them
    #[serde(default)]
    pub query_policy: Option<QueryPolicy>,
}

impl Default for EvaluationRequest {
    fn default() -> Self {
        Self {
            map_file: None,
            ground_truth_pointcloud_file: PathBuf::new(),
            output_directory: None,
            output_suffix: defaults::output_suffix(),
            maximum_distance: defaults::maximum_distance(),
            inlier_distance: defaults::inlier_distance(),
            evaluate: true,
            compute_coloring: false,
            ignore_truncated_points: false,
            color_by_max_error: false,
            color_by_mesh_distance: true,
            is_single_tsdf: false,
            export_mesh: false,
            export_labeled_pointcloud: false,
            export_coverage_pointcloud: false,
            coverage_voxel_size: defaults::coverage_voxel_size(),
            max_neighbors_factor: defaults::max_neighbors_factor(),
            query_policy: None,
        }
    }
}

impl EvaluationRequest {
    /// Load a request from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigLoadError::Parse(e.to_string()))
    }

    /// Reject thresholds no pass can run with.
    pub fn validate(&self) -> Result<(), EvalError> {
        let positive = [
            ("maximum_distance", self.maximum_distance),
            ("inlier_distance", self.inlier_distance),
            ("coverage_voxel_size", self.coverage_voxel_size),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(EvalError::config(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }
        if !self.max_neighbors_factor.is_finite() || self.max_neighbors_factor < 0.0 {
            return Err(EvalError::config(format!(
                "max_neighbors_factor must be non-negative, got {}",
                self.max_neighbors_factor
            )));
        }
        Ok(())
    }

    /// Colorization mode selected by the coloring flags.
    pub fn color_mode(&self) -> ColorMode {
        if self.color_by_mesh_distance {
            ColorMode::MeshDistance
        } else if self.color_by_max_error {
            ColorMode::VoxelMax
        } else {
            ColorMode::VoxelMean
        }
    }
}

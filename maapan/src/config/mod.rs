//! Evaluation request configuration.
//!
//! A request is a flat YAML document; every field has a default except the
//! submap query policy, which must be chosen explicitly for submap maps.
//!
//! ## Example YAML
//!
//! ```yaml
//! ground_truth_pointcloud_file: data/ground_truth.ply
//! maximum_distance: 0.2     # truncate errors above 20cm
//! inlier_distance: 0.1      # inliers within 10cm
//! compute_coloring: true
//! export_coverage_pointcloud: true
//! query_policy: free_space_aware
//! ```

mod defaults;
mod error;
mod request;

pub use error::ConfigLoadError;
pub use request::EvaluationRequest;

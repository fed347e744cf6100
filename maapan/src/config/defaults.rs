//! Default value functions for serde deserialization.

pub fn output_suffix() -> String {
    "evaluation_data".to_string()
}

pub fn maximum_distance() -> f32 {
    0.2
}

pub fn inlier_distance() -> f32 {
    0.1
}

pub fn enabled() -> bool {
    true
}

pub fn coverage_voxel_size() -> f32 {
    0.05
}

pub fn max_neighbors_factor() -> f32 {
    25000.0
}

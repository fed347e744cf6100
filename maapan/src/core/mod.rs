//! Core types shared by every evaluation stage.
//!
//! ## Type Categories
//!
//! ### Coordinates
//! - [`Point`]: Floating-point world coordinates in meters (`glam::Vec3`)
//! - [`VoxelIndex`]: Integer voxel indices for grid access
//! - [`Bounds3`]: Axis-aligned bounding box
//!
//! ### Geometry
//! - [`Transform`]: Rigid transform from a local volume frame to the world frame
//!
//! ### Visualization
//! - [`Color`]: 8-bit RGB color stored on voxels and mesh vertices
//!
//! ### Control
//! - [`CancelToken`]: Cooperative cancellation flag checked by long passes

mod cancel;
mod color;
mod point;
mod transform;

pub use cancel::CancelToken;
pub use color::Color;
pub use point::{Bounds3, Point, VoxelIndex};
pub use transform::Transform;

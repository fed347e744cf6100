//! Nearest-neighbor search over the ground-truth cloud.

mod index;

pub use index::{Neighbor, SpatialIndex};

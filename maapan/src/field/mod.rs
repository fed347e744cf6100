//! Signed-distance queries against a reconstruction.
//!
//! Both reconstruction shapes answer the same question through
//! [`DistanceField`]: what is the signed distance at a world point, and is
//! that point inside observed space?
//!
//! - [`GridField`]: trilinear interpolation over one global grid
//! - [`SubmapField`]: dispatch over overlapping submaps under a [`QueryPolicy`]

mod global;
mod multi;
mod traits;

pub use global::GridField;
pub use multi::{QueryPolicy, SubmapField};
pub use traits::{DistanceField, DistanceSample};

use crate::error::EvalError;
use crate::map::ReconstructedMap;

/// Build the distance field answering queries for `map`.
///
/// Submap maps require an explicit policy, since it decides which points
/// count as observed.
pub fn field_for<'a>(
    map: &'a ReconstructedMap,
    policy: Option<QueryPolicy>,
) -> Result<Box<dyn DistanceField + 'a>, EvalError> {
    match map {
        ReconstructedMap::Grid(global) => Ok(Box::new(GridField::new(&global.grid))),
        ReconstructedMap::Submaps(collection) => {
            let policy = policy.ok_or_else(|| {
                EvalError::config("query_policy must be set when evaluating a submap map")
            })?;
            Ok(Box::new(SubmapField::new(collection, policy)))
        }
    }
}

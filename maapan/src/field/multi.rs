//! Multi-volume distance field.
//!
//! Each query is transformed into every candidate submap's frame and
//! interpolated there. Absent submaps never answer.

use serde::{Deserialize, Serialize};

use super::traits::{DistanceField, DistanceSample};
use crate::core::Point;
use crate::map::{Submap, SubmapCollection, trilinear};

/// Which submaps may answer a query when several overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryPolicy {
    /// Answer from the free-space submap when it observes the point,
    /// otherwise fall back to object submaps.
    FreeSpaceAware,
    /// Ignore free space; only object submaps answer.
    ObjectOnly,
}

/// Queries over a [`SubmapCollection`].
#[derive(Clone, Copy, Debug)]
pub struct SubmapField<'a> {
    submaps: &'a SubmapCollection,
    policy: QueryPolicy,
}

impl<'a> SubmapField<'a> {
    /// Query `submaps` under `policy`.
    pub fn new(submaps: &'a SubmapCollection, policy: QueryPolicy) -> Self {
        Self { submaps, policy }
    }

    /// Policy in effect.
    pub fn policy(&self) -> QueryPolicy {
        self.policy
    }

    fn sample(submap: &Submap, point: Point) -> Option<f32> {
        if !submap.change_state.is_queryable() {
            return None;
        }
        let local = submap.transform.to_local(point);
        if !submap.grid.bounds().contains(local) {
            return None;
        }
        trilinear(&submap.grid, local)
    }
}

impl DistanceField for SubmapField<'_> {
    fn query(&self, point: Point) -> DistanceSample {
        if self.policy == QueryPolicy::FreeSpaceAware
            && let Some(free) = self.submaps.free_space_submap()
            && let Some(distance) = Self::sample(free, point)
        {
            return DistanceSample::observed(distance);
        }

        // Overlapping object surfaces combine as a union.
        self.submaps
            .iter()
            .filter(|s| !s.is_free_space())
            .filter_map(|s| Self::sample(s, point))
            .reduce(f32::min)
            .into()
    }

    fn name(&self) -> &'static str {
        match self.policy {
            QueryPolicy::FreeSpaceAware => "submaps (free-space aware)",
            QueryPolicy::ObjectOnly => "submaps (object only)",
        }
    }
}

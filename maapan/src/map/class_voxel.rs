//! Per-voxel classification data.
//!
//! Several voxel kinds share one interface: which class a voxel belongs to.
//! What that id means depends on the kind and is resolved by the caller.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::core::VoxelIndex;

/// Discriminant of a [`ClassVoxel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassVoxelKind {
    /// Counts of "belongs to this submap" vs "belongs elsewhere"
    BinaryCount,
    /// Binary counts saturating at 255
    MovingBinaryCount,
    /// Counts over a fixed set of class ids
    FixedCount,
    /// Counts over class ids seen so far
    VariableCount,
    /// Accumulated panoptic weights per id
    PanopticWeight,
}

/// Classification voxel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassVoxel {
    /// Two-way vote counts.
    BinaryCount {
        /// Votes for the owning submap
        belongs: u32,
        /// Votes for any other submap
        foreign: u32,
    },
    /// Two-way vote counts, saturating.
    MovingBinaryCount {
        /// Votes for the owning submap
        belongs: u8,
        /// Votes for any other submap
        foreign: u8,
    },
    /// Votes indexed by class id `0..counts.len()`.
    FixedCount {
        /// Vote count per class id
        counts: Vec<u32>,
    },
    /// Votes keyed by arbitrary class id.
    VariableCount {
        /// Vote count per class id
        counts: BTreeMap<i32, u32>,
    },
    /// Weights keyed by panoptic id.
    PanopticWeight {
        /// Accumulated weight per id
        weights: BTreeMap<i32, f32>,
    },
}

impl ClassVoxel {
    /// Kind of this voxel.
    pub fn kind(&self) -> ClassVoxelKind {
        match self {
            ClassVoxel::BinaryCount { .. } => ClassVoxelKind::BinaryCount,
            ClassVoxel::MovingBinaryCount { .. } => ClassVoxelKind::MovingBinaryCount,
            ClassVoxel::FixedCount { .. } => ClassVoxelKind::FixedCount,
            ClassVoxel::VariableCount { .. } => ClassVoxelKind::VariableCount,
            ClassVoxel::PanopticWeight { .. } => ClassVoxelKind::PanopticWeight,
        }
    }

    /// Id this voxel belongs to, `None` without any votes.
    ///
    /// Binary kinds answer 1 (owning submap) or 0 (elsewhere). Count and
    /// weight kinds answer the arg-max id; the lowest id wins ties.
    pub fn belonging_id(&self) -> Option<i32> {
        match self {
            ClassVoxel::BinaryCount { belongs, foreign } => {
                binary_belonging(*belongs as u64, *foreign as u64)
            }
            ClassVoxel::MovingBinaryCount { belongs, foreign } => {
                binary_belonging(*belongs as u64, *foreign as u64)
            }
            ClassVoxel::FixedCount { counts } => arg_max(
                counts
                    .iter()
                    .enumerate()
                    .map(|(id, &c)| (id as i32, c as f64)),
            ),
            ClassVoxel::VariableCount { counts } => {
                arg_max(counts.iter().map(|(&id, &c)| (id, c as f64)))
            }
            ClassVoxel::PanopticWeight { weights } => {
                arg_max(weights.iter().map(|(&id, &w)| (id, w as f64)))
            }
        }
    }
}

fn binary_belonging(belongs: u64, foreign: u64) -> Option<i32> {
    if belongs + foreign == 0 {
        return None;
    }
    Some(if belongs > foreign { 1 } else { 0 })
}

/// Highest positive score; ids arrive in ascending order so the first wins ties.
fn arg_max(scores: impl Iterator<Item = (i32, f64)>) -> Option<i32> {
    let mut best: Option<(i32, f64)> = None;
    for (id, score) in scores {
        if score <= 0.0 {
            continue;
        }
        if best.is_none_or(|(_, b)| score > b) {
            best = Some((id, score));
        }
    }
    best.map(|(id, _)| id)
}

/// Sparse class voxels aligned with a submap's distance grid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassLayer {
    voxels: HashMap<VoxelIndex, ClassVoxel>,
}

impl ClassLayer {
    /// Empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the class voxel at `index`.
    pub fn insert(&mut self, index: VoxelIndex, voxel: ClassVoxel) {
        self.voxels.insert(index, voxel);
    }

    /// Class voxel at `index`.
    #[inline]
    pub fn get(&self, index: VoxelIndex) -> Option<&ClassVoxel> {
        self.voxels.get(&index)
    }

    /// Number of allocated voxels.
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Check whether no voxel is allocated.
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// All allocated voxels in index order.
    pub fn sorted_entries(&self) -> Vec<(VoxelIndex, &ClassVoxel)> {
        let mut entries: Vec<_> = self.voxels.iter().map(|(&k, v)| (k, v)).collect();
        entries.sort_by_key(|(k, _)| *k);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_belonging() {
        let voxel = ClassVoxel::BinaryCount {
            belongs: 3,
            foreign: 1,
        };
        assert_eq!(voxel.belonging_id(), Some(1));
        let voxel = ClassVoxel::MovingBinaryCount {
            belongs: 2,
            foreign: 2,
        };
        assert_eq!(voxel.belonging_id(), Some(0));
        let voxel = ClassVoxel::BinaryCount {
            belongs: 0,
            foreign: 0,
        };
        assert_eq!(voxel.belonging_id(), None);
    }

    #[test]
    fn test_count_arg_max_ties_lowest() {
        let voxel = ClassVoxel::FixedCount {
            counts: vec![0, 4, 2, 4],
        };
        assert_eq!(voxel.belonging_id(), Some(1));
        assert_eq!(voxel.kind(), ClassVoxelKind::FixedCount);

        let voxel = ClassVoxel::VariableCount {
            counts: BTreeMap::from([(12, 5), (7, 5), (30, 1)]),
        };
        assert_eq!(voxel.belonging_id(), Some(7));

        let voxel = ClassVoxel::PanopticWeight {
            weights: BTreeMap::new(),
        };
        assert_eq!(voxel.belonging_id(), None);
    }

    #[test]
    fn test_layer_lookup() {
        let mut layer = ClassLayer::new();
        layer.insert(
            VoxelIndex::new(1, 0, 0),
            ClassVoxel::BinaryCount {
                belongs: 1,
                foreign: 0,
            },
        );
        assert_eq!(layer.len(), 1);
        assert!(layer.get(VoxelIndex::new(1, 0, 0)).is_some());
        assert!(layer.get(VoxelIndex::new(0, 0, 0)).is_none());
    }
}

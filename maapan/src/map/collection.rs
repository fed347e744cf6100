//! Ordered set of submaps.

use super::submap::{Submap, SubmapId};

/// Submaps of a multi-volume reconstruction, in load order.
#[derive(Clone, Debug, Default)]
pub struct SubmapCollection {
    submaps: Vec<Submap>,
    free_space_id: Option<SubmapId>,
}

impl SubmapCollection {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a submap.
    pub fn push(&mut self, submap: Submap) {
        self.submaps.push(submap);
    }

    /// Designate the free-space submap answering free-space-aware queries.
    pub fn set_free_space_id(&mut self, id: Option<SubmapId>) {
        self.free_space_id = id;
    }

    /// Designated free-space submap id, if any.
    pub fn free_space_id(&self) -> Option<SubmapId> {
        self.free_space_id
    }

    /// The free-space submap: the designated one, else the first labeled free space.
    pub fn free_space_submap(&self) -> Option<&Submap> {
        match self.free_space_id {
            Some(id) => self.get(id),
            None => self.submaps.iter().find(|s| s.is_free_space()),
        }
    }

    /// Submap by id.
    pub fn get(&self, id: SubmapId) -> Option<&Submap> {
        self.submaps.iter().find(|s| s.id == id)
    }

    /// Mutable submap by id.
    pub fn get_mut(&mut self, id: SubmapId) -> Option<&mut Submap> {
        self.submaps.iter_mut().find(|s| s.id == id)
    }

    /// Iterate submaps in load order.
    pub fn iter(&self) -> std::slice::Iter<'_, Submap> {
        self.submaps.iter()
    }

    /// Iterate submaps mutably in load order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Submap> {
        self.submaps.iter_mut()
    }

    /// Number of submaps.
    pub fn len(&self) -> usize {
        self.submaps.len()
    }

    /// Check whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.submaps.is_empty()
    }
}

impl FromIterator<Submap> for SubmapCollection {
    fn from_iter<I: IntoIterator<Item = Submap>>(iter: I) -> Self {
        Self {
            submaps: iter.into_iter().collect(),
            free_space_id: None,
        }
    }
}

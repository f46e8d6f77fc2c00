//! Ordered list of creatures under forced movement.

use serde::{Deserialize, Serialize};

/// Creature indices subject to forced movement, in processing order.
///
/// Chip is always inserted at the front, every other creature at the back,
/// and no index is ever stored twice.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlipList {
    entries: Vec<usize>,
}

impl SlipList {
    /// Reports whether the creature is slipping.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains(&index)
    }

    /// Slipping creatures in processing order.
    #[must_use]
    pub fn entries(&self) -> &[usize] {
        &self.entries
    }

    /// Number of slipping creatures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether nothing is slipping.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds a creature unless it is already present.
    pub(crate) fn insert(&mut self, index: usize, is_chip: bool) {
        if self.contains(index) {
            return;
        }
        if is_chip {
            self.entries.insert(0, index);
        } else {
            self.entries.push(index);
        }
    }

    pub(crate) fn remove(&mut self, index: usize) {
        self.entries.retain(|&entry| entry != index);
    }

    /// Rewrites indices after the creature list was compacted.
    ///
    /// `remap[old]` holds the new index of every surviving creature; entries
    /// whose creature was removed are dropped.
    pub(crate) fn remap(&mut self, remap: &[Option<usize>]) {
        self.entries = self
            .entries
            .iter()
            .filter_map(|&old| remap.get(old).copied().flatten())
            .collect();
    }
}

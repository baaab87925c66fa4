//! Expansion state with cascading expand/collapse.
//!
//! # Invariants
//! - Expanded ids are always a subset of the folders in the last forest
//!   passed to [`ExpansionSet::initialize`] or [`ExpansionSet::reconcile`].
//! - A toggle applies the same state to the toggled folder and every
//!   descendant in one step.

use crate::model::folder::FolderId;
use crate::tree::forest::Forest;
use std::collections::HashSet;

/// Set of folder ids currently shown expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionSet {
    expanded: HashSet<FolderId>,
    known: HashSet<FolderId>,
}

impl ExpansionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expands every folder in `forest` and forgets earlier state.
    pub fn initialize(&mut self, forest: &Forest) {
        self.known = forest.folder_ids().collect();
        self.expanded = self.known.clone();
    }

    /// Carries state across a rebuild by id.
    ///
    /// Folders seen before keep their state, new folders open, and folders
    /// missing from `forest` are dropped.
    pub fn reconcile(&mut self, forest: &Forest) {
        let current: HashSet<FolderId> = forest.folder_ids().collect();
        for id in &current {
            if !self.known.contains(id) {
                self.expanded.insert(*id);
            }
        }
        self.expanded.retain(|id| current.contains(id));
        self.known = current;
    }

    /// Flips `id` and applies the new state to all of its descendants.
    ///
    /// Returns the new state, or `None` when `id` is not in `forest`.
    pub fn toggle(&mut self, forest: &Forest, id: FolderId) -> Option<bool> {
        let subtree = forest.subtree_ids(id);
        if subtree.is_empty() {
            return None;
        }
        if self.expanded.contains(&id) {
            for folder in &subtree {
                self.expanded.remove(folder);
            }
            Some(false)
        } else {
            self.expanded.extend(subtree);
            Some(true)
        }
    }

    pub fn is_expanded(&self, id: FolderId) -> bool {
        self.expanded.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = FolderId> + '_ {
        self.expanded.iter().copied()
    }
}

//! Hierarchy builder: flat folders and notes into an id-indexed forest.
//!
//! # Responsibility
//! - Attach notes to their owning folder and nest folders under parents.
//! - Answer structural queries (subtree, ancestry, containing folder).
//!
//! # Invariants
//! - Every input note appears exactly once: in one folder's note list or
//!   in the unfiled list.
//! - The result is acyclic. A folder whose parent id does not resolve, or
//!   whose ancestor chain loops back to itself, is a root.
//! - Sibling order follows input iteration order; nothing is sorted.
//! - Links are stored as ids; nodes never reference each other directly.

use crate::model::folder::{Folder, FolderId};
use crate::model::note::{Note, NoteId};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

/// One folder in the forest with its derived children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    pub folder: Folder,
    /// Child folder ids in input order.
    pub child_ids: Vec<FolderId>,
    /// Directly contained note ids in input order.
    pub note_ids: Vec<NoteId>,
}

impl FolderNode {
    pub fn id(&self) -> FolderId {
        self.folder.id
    }

    pub fn has_children(&self) -> bool {
        !self.child_ids.is_empty()
    }
}

/// Derived folder/note hierarchy. Rebuilt wholesale after every fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    folders: HashMap<FolderId, FolderNode>,
    notes: HashMap<NoteId, Note>,
    roots: Vec<FolderId>,
    unfiled: Vec<NoteId>,
    /// Effective parent after dangling/cyclic links were cut.
    parents: HashMap<FolderId, FolderId>,
}

/// One paintable line produced by [`Forest::visible_rows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeRow {
    Folder {
        id: FolderId,
        depth: usize,
        expanded: bool,
        has_children: bool,
    },
    Note {
        id: NoteId,
        depth: usize,
    },
}

impl Forest {
    /// Builds the forest from unordered folder and note listings.
    ///
    /// Malformed references degrade instead of failing: unknown parents make
    /// roots, unknown folders make unfiled notes, duplicate ids keep the
    /// first occurrence.
    pub fn build(folders: Vec<Folder>, notes: Vec<Note>) -> Self {
        let mut order = Vec::with_capacity(folders.len());
        let mut nodes: HashMap<FolderId, FolderNode> = HashMap::with_capacity(folders.len());
        for folder in folders {
            if nodes.contains_key(&folder.id) {
                warn!(
                    "event=forest_build module=tree status=degraded reason=duplicate_folder folder_id={}",
                    folder.id
                );
                continue;
            }
            order.push(folder.id);
            nodes.insert(
                folder.id,
                FolderNode {
                    folder,
                    child_ids: Vec::new(),
                    note_ids: Vec::new(),
                },
            );
        }

        let mut note_map = HashMap::with_capacity(notes.len());
        let mut unfiled = Vec::new();
        for note in notes {
            if note_map.contains_key(&note.id) {
                warn!(
                    "event=forest_build module=tree status=degraded reason=duplicate_note note_id={}",
                    note.id
                );
                continue;
            }
            match note.folder_id.and_then(|id| nodes.get_mut(&id)) {
                Some(node) => node.note_ids.push(note.id),
                None => unfiled.push(note.id),
            }
            note_map.insert(note.id, note);
        }

        let declared: HashMap<FolderId, FolderId> = order
            .iter()
            .filter_map(|id| {
                let parent = nodes.get(id)?.folder.parent_id?;
                nodes.contains_key(&parent).then_some((*id, parent))
            })
            .collect();

        let mut roots = Vec::new();
        let mut parents = HashMap::with_capacity(declared.len());
        for id in &order {
            match declared.get(id) {
                Some(parent) if !loops_back(*id, &declared) => {
                    parents.insert(*id, *parent);
                    if let Some(parent_node) = nodes.get_mut(parent) {
                        parent_node.child_ids.push(*id);
                    }
                }
                Some(_) => {
                    warn!(
                        "event=forest_build module=tree status=degraded reason=parent_cycle folder_id={id}"
                    );
                    roots.push(*id);
                }
                None => roots.push(*id),
            }
        }

        debug!(
            "event=forest_build module=tree status=ok folders={} notes={} roots={} unfiled={}",
            nodes.len(),
            note_map.len(),
            roots.len(),
            unfiled.len()
        );

        Self {
            folders: nodes,
            notes: note_map,
            roots,
            unfiled,
            parents,
        }
    }

    /// Root folder ids in input order.
    pub fn roots(&self) -> &[FolderId] {
        &self.roots
    }

    /// Unfiled note ids in input order.
    pub fn unfiled(&self) -> &[NoteId] {
        &self.unfiled
    }

    pub fn unfiled_notes(&self) -> impl Iterator<Item = &Note> + '_ {
        self.unfiled.iter().filter_map(|id| self.notes.get(id))
    }

    pub fn folder(&self, id: FolderId) -> Option<&FolderNode> {
        self.folders.get(&id)
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.get(&id)
    }

    pub fn contains_folder(&self, id: FolderId) -> bool {
        self.folders.contains_key(&id)
    }

    pub fn contains_note(&self, id: NoteId) -> bool {
        self.notes.contains_key(&id)
    }

    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.notes.is_empty()
    }

    /// All folder ids, in no particular order.
    pub fn folder_ids(&self) -> impl Iterator<Item = FolderId> + '_ {
        self.folders.keys().copied()
    }

    /// Child folders of `id` in input order.
    pub fn children(&self, id: FolderId) -> impl Iterator<Item = &FolderNode> + '_ {
        self.folders
            .get(&id)
            .into_iter()
            .flat_map(|node| node.child_ids.iter())
            .filter_map(|child| self.folders.get(child))
    }

    /// Notes directly inside folder `id` in input order.
    pub fn notes_in(&self, id: FolderId) -> impl Iterator<Item = &Note> + '_ {
        self.folders
            .get(&id)
            .into_iter()
            .flat_map(|node| node.note_ids.iter())
            .filter_map(|note| self.notes.get(note))
    }

    /// Effective parent of folder `id` in this forest.
    pub fn parent_of(&self, id: FolderId) -> Option<FolderId> {
        self.parents.get(&id).copied()
    }

    /// Folder that lists note `id`, if the note is filed.
    pub fn containing_folder(&self, id: NoteId) -> Option<FolderId> {
        let folder_id = self.notes.get(&id)?.folder_id?;
        self.folders.contains_key(&folder_id).then_some(folder_id)
    }

    /// `id` followed by every folder beneath it, depth-first.
    ///
    /// Returns an empty list for unknown ids.
    pub fn subtree_ids(&self, id: FolderId) -> Vec<FolderId> {
        if !self.folders.contains_key(&id) {
            return Vec::new();
        }
        let mut ids = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            ids.push(current);
            if let Some(node) = self.folders.get(&current) {
                stack.extend(node.child_ids.iter().rev().copied());
            }
        }
        ids
    }

    /// Returns true when `ancestor` is `id` itself or lies on its parent chain.
    pub fn is_self_or_ancestor(&self, ancestor: FolderId, id: FolderId) -> bool {
        let mut visited = HashSet::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            if !visited.insert(current) {
                return false;
            }
            cursor = self.parents.get(&current).copied();
        }
        false
    }

    /// Depth-first rows for painting: a folder, then (when expanded) its
    /// notes, then its child folders. Unfiled notes are not included.
    pub fn visible_rows(&self, is_expanded: impl Fn(FolderId) -> bool) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        let mut stack: Vec<(FolderId, usize)> =
            self.roots.iter().rev().map(|id| (*id, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.folders.get(&id) else {
                continue;
            };
            let expanded = is_expanded(id);
            rows.push(TreeRow::Folder {
                id,
                depth,
                expanded,
                has_children: node.has_children(),
            });
            if !expanded {
                continue;
            }
            rows.extend(node.note_ids.iter().map(|note| TreeRow::Note {
                id: *note,
                depth: depth + 1,
            }));
            stack.extend(node.child_ids.iter().rev().map(|child| (*child, depth + 1)));
        }
        rows
    }
}

fn loops_back(id: FolderId, declared: &HashMap<FolderId, FolderId>) -> bool {
    let mut visited = HashSet::new();
    let mut cursor = declared.get(&id).copied();
    while let Some(current) = cursor {
        if current == id {
            return true;
        }
        if !visited.insert(current) {
            return false;
        }
        cursor = declared.get(&current).copied();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::{Forest, TreeRow};
    use crate::model::folder::Folder;
    use crate::model::note::Note;

    #[test]
    fn subtree_is_depth_first_in_input_order() {
        let forest = Forest::build(
            vec![
                Folder::new(1, "a", None),
                Folder::new(2, "b", Some(1)),
                Folder::new(3, "c", Some(2)),
                Folder::new(4, "d", Some(1)),
            ],
            Vec::new(),
        );
        assert_eq!(forest.subtree_ids(1), vec![1, 2, 3, 4]);
        assert_eq!(forest.subtree_ids(2), vec![2, 3]);
        assert!(forest.subtree_ids(99).is_empty());
    }

    #[test]
    fn collapsed_folder_hides_contents_in_rows() {
        let forest = Forest::build(
            vec![Folder::new(1, "a", None), Folder::new(2, "b", Some(1))],
            vec![Note::new(10, "n", Some(1))],
        );
        let open = forest.visible_rows(|_| true);
        assert_eq!(open.len(), 3);
        assert_eq!(open[1], TreeRow::Note { id: 10, depth: 1 });

        let closed = forest.visible_rows(|id| id != 1);
        assert_eq!(
            closed,
            vec![TreeRow::Folder {
                id: 1,
                depth: 0,
                expanded: false,
                has_children: true,
            }]
        );
    }

    #[test]
    fn ancestry_walk_handles_unknown_ids() {
        let forest = Forest::build(vec![Folder::new(1, "a", None)], Vec::new());
        assert!(forest.is_self_or_ancestor(1, 1));
        assert!(!forest.is_self_or_ancestor(1, 42));
    }
}

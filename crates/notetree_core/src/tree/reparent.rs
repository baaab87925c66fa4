//! Drag-and-drop move validation.
//!
//! # Responsibility
//! - Decide synchronously whether a dragged folder or note may be dropped
//!   on a target, before any network call.
//! - Translate an accepted drop into the reparent mutation to send.
//!
//! # Invariants
//! - A folder is never moved into itself or any of its descendants.
//! - A note dropped on the folder it already belongs to is rejected.
//! - Validation never mutates the forest.

use crate::model::folder::FolderId;
use crate::model::note::NoteId;
use crate::tree::forest::Forest;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Entity being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragItem {
    Folder(FolderId),
    Note(NoteId),
}

/// Where a drag is dropped: onto a folder or onto the root/unfiled area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Folder(FolderId),
    Root,
}

impl DropTarget {
    /// Folder id sent to the service; `None` means root/unfiled.
    pub fn folder_id(self) -> Option<FolderId> {
        match self {
            Self::Folder(id) => Some(id),
            Self::Root => None,
        }
    }
}

impl From<Option<FolderId>> for DropTarget {
    fn from(value: Option<FolderId>) -> Self {
        value.map_or(Self::Root, Self::Folder)
    }
}

/// Reparent mutation produced by an accepted drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedMove {
    Folder {
        id: FolderId,
        new_parent: Option<FolderId>,
    },
    Note {
        id: NoteId,
        new_folder: Option<FolderId>,
    },
}

/// Reasons a drop is refused before reaching the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRejection {
    /// Folder dropped onto itself.
    IntoItself(FolderId),
    /// Folder dropped onto one of its descendants.
    IntoOwnHierarchy {
        folder_id: FolderId,
        target_id: FolderId,
    },
    /// Note dropped where it already lives.
    AlreadyThere {
        note_id: NoteId,
        folder_id: Option<FolderId>,
    },
    /// Dragged entity is not in the current forest.
    UnknownItem(DragItem),
    /// Target folder is not in the current forest.
    UnknownTarget(FolderId),
}

impl Display for MoveRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IntoItself(_) => write!(f, "cannot move a folder into itself"),
            Self::IntoOwnHierarchy { .. } => {
                write!(f, "cannot move a folder into its own hierarchy")
            }
            Self::AlreadyThere { .. } => write!(f, "note is already in that folder"),
            Self::UnknownItem(DragItem::Folder(id)) => write!(f, "folder no longer exists: {id}"),
            Self::UnknownItem(DragItem::Note(id)) => write!(f, "note no longer exists: {id}"),
            Self::UnknownTarget(id) => write!(f, "target folder no longer exists: {id}"),
        }
    }
}

impl Error for MoveRejection {}

/// Checks a drop against the forest and returns the mutation to send.
///
/// Rules, first failure wins:
/// 1. folder onto itself;
/// 2. folder onto a descendant (ancestor walk from the target);
/// 3. note onto its current folder, or unfiled note onto root.
///
/// Stale items and targets are rejected after the structural rules.
pub fn plan_move(
    forest: &Forest,
    item: DragItem,
    target: DropTarget,
) -> Result<PlannedMove, MoveRejection> {
    let planned = match item {
        DragItem::Folder(folder_id) => {
            if let DropTarget::Folder(target_id) = target {
                if target_id == folder_id {
                    return Err(MoveRejection::IntoItself(folder_id));
                }
                if forest.is_self_or_ancestor(folder_id, target_id) {
                    return Err(MoveRejection::IntoOwnHierarchy {
                        folder_id,
                        target_id,
                    });
                }
            }
            if !forest.contains_folder(folder_id) {
                return Err(MoveRejection::UnknownItem(item));
            }
            PlannedMove::Folder {
                id: folder_id,
                new_parent: target.folder_id(),
            }
        }
        DragItem::Note(note_id) => {
            let note = forest
                .note(note_id)
                .ok_or(MoveRejection::UnknownItem(item))?;
            if note.folder_id == target.folder_id() {
                return Err(MoveRejection::AlreadyThere {
                    note_id,
                    folder_id: note.folder_id,
                });
            }
            PlannedMove::Note {
                id: note_id,
                new_folder: target.folder_id(),
            }
        }
    };

    if let DropTarget::Folder(target_id) = target {
        if !forest.contains_folder(target_id) {
            return Err(MoveRejection::UnknownTarget(target_id));
        }
    }
    Ok(planned)
}

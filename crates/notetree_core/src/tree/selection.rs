//! Single selection: nothing, one folder, or one note.

use crate::model::folder::FolderId;
use crate::model::note::NoteId;
use crate::tree::forest::Forest;

/// Current tree selection. A folder and a note are never selected together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Folder(FolderId),
    Note(NoteId),
}

impl Selection {
    pub fn select_folder(&mut self, id: FolderId) {
        *self = Self::Folder(id);
    }

    pub fn select_note(&mut self, id: NoteId) {
        *self = Self::Note(id);
    }

    pub fn clear(&mut self) {
        *self = Self::None;
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn folder(&self) -> Option<FolderId> {
        match self {
            Self::Folder(id) => Some(*id),
            _ => None,
        }
    }

    pub fn note(&self) -> Option<NoteId> {
        match self {
            Self::Note(id) => Some(*id),
            _ => None,
        }
    }

    /// Parent used by create actions: the selected folder, the folder that
    /// holds the selected note, or root.
    pub fn default_parent(&self, forest: &Forest) -> Option<FolderId> {
        match self {
            Self::None => None,
            Self::Folder(id) => forest.contains_folder(*id).then_some(*id),
            Self::Note(id) => forest.containing_folder(*id),
        }
    }

    /// Clears the selection when its entity is absent from `forest`.
    pub fn reconcile(&mut self, forest: &Forest) {
        let present = match self {
            Self::None => true,
            Self::Folder(id) => forest.contains_folder(*id),
            Self::Note(id) => forest.contains_note(*id),
        };
        if !present {
            self.clear();
        }
    }
}

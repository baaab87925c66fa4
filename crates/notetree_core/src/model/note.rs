//! Note record as seen by the folder tree.

use crate::model::folder::FolderId;
use serde::{Deserialize, Serialize};

/// Stable note identifier assigned by the content service.
pub type NoteId = i64;

/// Flat note record. Body content is not part of the tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Heading text shown in the tree.
    pub heading: String,
    /// Owning folder. `None` means the note is unfiled.
    #[serde(rename = "folderId", default)]
    pub folder_id: Option<FolderId>,
    /// Privacy flag; serialized as `private`.
    #[serde(rename = "private", default)]
    pub is_private: bool,
}

impl Note {
    /// Creates a public note record.
    pub fn new(id: NoteId, heading: impl Into<String>, folder_id: Option<FolderId>) -> Self {
        Self {
            id,
            heading: heading.into(),
            folder_id,
            is_private: false,
        }
    }
}

//! Folder record.

use serde::{Deserialize, Serialize};

/// Stable folder identifier assigned by the content service.
pub type FolderId = i64;

/// Flat folder record as listed by the content service.
///
/// Child folders and contained notes are not stored here; they are derived
/// by [`crate::tree::forest::Forest::build`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Serialized as `folderId` to match the API payload.
    #[serde(rename = "folderId")]
    pub id: FolderId,
    /// User-facing folder name.
    pub name: String,
    /// Parent folder. `None` means root-level folder.
    #[serde(rename = "parentFolderId", default)]
    pub parent_id: Option<FolderId>,
}

impl Folder {
    /// Creates a folder record.
    pub fn new(id: FolderId, name: impl Into<String>, parent_id: Option<FolderId>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id,
        }
    }
}

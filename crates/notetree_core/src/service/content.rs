//! Content-service trait and its error type.

use crate::auth::Credential;
use crate::db::DbError;
use crate::model::folder::{Folder, FolderId};
use crate::model::note::{Note, NoteId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by content-service calls.
pub type ContentResult<T> = Result<T, ContentError>;

/// Failures reported by a content-service implementation.
#[derive(Debug)]
pub enum ContentError {
    /// Credential missing, expired, or not allowed (401/403).
    Unauthorized,
    /// Addressed resource does not exist.
    NotFound(String),
    /// Request conflicts with current state, e.g. a folder cycle.
    Conflict(String),
    /// Any other non-success status.
    Status { code: u16, message: String },
    /// Connection-level failure; the request may not have arrived.
    Transport(String),
    /// Response body could not be decoded.
    Decode(String),
    /// Local store failure.
    Storage(DbError),
}

impl ContentError {
    /// True when the caller should be treated as unauthenticated.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

impl Display for ContentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "not authorized"),
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::Status { code, message } if message.is_empty() => {
                write!(f, "service responded with status {code}")
            }
            Self::Status { code, message } => {
                write!(f, "service responded with status {code}: {message}")
            }
            Self::Transport(message) => write!(f, "transport error: {message}"),
            Self::Decode(message) => write!(f, "invalid response: {message}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ContentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for ContentError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for ContentError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}

/// Folder/note operations consumed by the tree.
///
/// Implementations own persistence and authorization; callers never patch
/// local state from these results beyond re-listing.
pub trait ContentService {
    /// Lists every folder visible to the caller.
    fn list_folders(&self, credential: &Credential) -> ContentResult<Vec<Folder>>;
    /// Lists every note visible to the caller.
    fn list_notes(&self, credential: &Credential) -> ContentResult<Vec<Note>>;
    /// Creates a folder under optional parent.
    fn create_folder(
        &self,
        credential: &Credential,
        name: &str,
        parent_id: Option<FolderId>,
    ) -> ContentResult<()>;
    /// Creates an empty note under optional folder.
    fn create_note(
        &self,
        credential: &Credential,
        heading: &str,
        folder_id: Option<FolderId>,
    ) -> ContentResult<()>;
    /// Deletes a folder; cascade policy belongs to the implementation.
    fn delete_folder(&self, credential: &Credential, id: FolderId) -> ContentResult<()>;
    /// Deletes a note.
    fn delete_note(&self, credential: &Credential, id: NoteId) -> ContentResult<()>;
    /// Reparents a folder. `None` moves it to root.
    fn set_folder_parent(
        &self,
        credential: &Credential,
        id: FolderId,
        parent_id: Option<FolderId>,
    ) -> ContentResult<()>;
    /// Moves a note to another folder. `None` makes it unfiled.
    fn set_note_folder(
        &self,
        credential: &Credential,
        id: NoteId,
        folder_id: Option<FolderId>,
    ) -> ContentResult<()>;
    /// Flips note privacy and returns the new flag.
    fn toggle_note_privacy(&self, credential: &Credential, id: NoteId) -> ContentResult<bool>;
}

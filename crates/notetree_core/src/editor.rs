//! Note document load/save flow for the rich-text editor.
//!
//! The body is an opaque rich-text JSON document; only the heading is
//! inspected here.

use crate::auth::Credential;
use crate::model::note::NoteId;
use crate::service::content::ContentError;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Heading plus rich-text body of one note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteDocument {
    pub heading: String,
    #[serde(default)]
    pub body: Value,
}

impl NoteDocument {
    pub fn new(heading: impl Into<String>, body: Value) -> Self {
        Self {
            heading: heading.into(),
            body,
        }
    }
}

/// Document endpoints of the remote service.
pub trait DocumentApi {
    fn get_document(&self, credential: &Credential, id: NoteId)
        -> Result<NoteDocument, ContentError>;
    /// True when the caller owns note `id`.
    fn owns_note(&self, credential: &Credential, id: NoteId) -> Result<bool, ContentError>;
    fn create_document(
        &self,
        credential: &Credential,
        document: &NoteDocument,
    ) -> Result<(), ContentError>;
    fn update_document(
        &self,
        credential: &Credential,
        id: NoteId,
        document: &NoteDocument,
    ) -> Result<(), ContentError>;
}

/// What a save did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Updated(NoteId),
}

#[derive(Debug)]
pub enum EditorError {
    EmptyHeading,
    Api(ContentError),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyHeading => write!(f, "heading must not be blank"),
            Self::Api(err) => write!(f, "failed to save: {err}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Api(err) => Some(err),
            Self::EmptyHeading => None,
        }
    }
}

impl From<ContentError> for EditorError {
    fn from(value: ContentError) -> Self {
        Self::Api(value)
    }
}

/// Saves a document: updates `note_id` when the caller owns it, otherwise
/// creates a new note (editing someone else's note forks a copy).
pub fn save_document<A: DocumentApi + ?Sized>(
    api: &A,
    credential: &Credential,
    note_id: Option<NoteId>,
    document: &NoteDocument,
) -> Result<SaveOutcome, EditorError> {
    if document.heading.trim().is_empty() {
        return Err(EditorError::EmptyHeading);
    }

    let owned = match note_id {
        Some(id) => api.owns_note(credential, id)?.then_some(id),
        None => None,
    };

    match owned {
        Some(id) => {
            api.update_document(credential, id, document)?;
            info!("event=note_save module=editor status=ok mode=update note_id={id}");
            Ok(SaveOutcome::Updated(id))
        }
        None => {
            api.create_document(credential, document)?;
            info!("event=note_save module=editor status=ok mode=create");
            Ok(SaveOutcome::Created)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{save_document, DocumentApi, EditorError, NoteDocument, SaveOutcome};
    use crate::auth::Credential;
    use crate::model::note::NoteId;
    use crate::service::content::ContentError;
    use serde_json::json;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeDocs {
        owned: Vec<NoteId>,
        calls: RefCell<Vec<String>>,
    }

    impl DocumentApi for FakeDocs {
        fn get_document(&self, _c: &Credential, id: NoteId) -> Result<NoteDocument, ContentError> {
            Err(ContentError::NotFound(format!("note {id}")))
        }

        fn owns_note(&self, _c: &Credential, id: NoteId) -> Result<bool, ContentError> {
            self.calls.borrow_mut().push(format!("owns {id}"));
            Ok(self.owned.contains(&id))
        }

        fn create_document(&self, _c: &Credential, _d: &NoteDocument) -> Result<(), ContentError> {
            self.calls.borrow_mut().push("create".to_string());
            Ok(())
        }

        fn update_document(
            &self,
            _c: &Credential,
            id: NoteId,
            _d: &NoteDocument,
        ) -> Result<(), ContentError> {
            self.calls.borrow_mut().push(format!("update {id}"));
            Ok(())
        }
    }

    fn credential() -> Credential {
        Credential::new("t").unwrap()
    }

    #[test]
    fn owned_note_is_updated() {
        let api = FakeDocs {
            owned: vec![5],
            ..FakeDocs::default()
        };
        let doc = NoteDocument::new("Plan", json!({"type": "doc"}));
        let outcome = save_document(&api, &credential(), Some(5), &doc).unwrap();
        assert_eq!(outcome, SaveOutcome::Updated(5));
        assert_eq!(*api.calls.borrow(), vec!["owns 5", "update 5"]);
    }

    #[test]
    fn foreign_or_new_note_is_created() {
        let api = FakeDocs::default();
        let doc = NoteDocument::new("Copy", json!({}));
        assert_eq!(
            save_document(&api, &credential(), Some(9), &doc).unwrap(),
            SaveOutcome::Created
        );
        assert_eq!(
            save_document(&api, &credential(), None, &doc).unwrap(),
            SaveOutcome::Created
        );
        assert_eq!(*api.calls.borrow(), vec!["owns 9", "create", "create"]);
    }

    #[test]
    fn blank_heading_makes_no_call() {
        let api = FakeDocs::default();
        let doc = NoteDocument::new("  ", json!({}));
        assert!(matches!(
            save_document(&api, &credential(), Some(1), &doc),
            Err(EditorError::EmptyHeading)
        ));
        assert!(api.calls.borrow().is_empty());
    }
}

#![allow(dead_code)]

use notetree_core::{
    ContentError, ContentResult, ContentService, Credential, Folder, FolderId, Note, NoteId,
};
use std::cell::{Cell, RefCell};

/// In-memory content service that records calls and can be told to fail.
#[derive(Default)]
pub struct FakeService {
    pub folders: RefCell<Vec<Folder>>,
    pub notes: RefCell<Vec<Note>>,
    pub calls: RefCell<Vec<String>>,
    pub fail_mutations: Cell<bool>,
    pub fail_listing: Cell<bool>,
    pub reject_credential: Cell<bool>,
    next_id: Cell<i64>,
}

impl FakeService {
    pub fn with(folders: Vec<Folder>, notes: Vec<Note>) -> Self {
        Self {
            folders: RefCell::new(folders),
            notes: RefCell::new(notes),
            next_id: Cell::new(100),
            ..Self::default()
        }
    }

    /// Work(1) > Sub(2) > note 10, plus unfiled note 11.
    pub fn work_sub() -> Self {
        Self::with(
            vec![Folder::new(1, "Work", None), Folder::new(2, "Sub", Some(1))],
            vec![Note::new(10, "Plan", Some(2)), Note::new(11, "Loose", None)],
        )
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn gate(&self) -> ContentResult<()> {
        if self.reject_credential.get() {
            return Err(ContentError::Unauthorized);
        }
        if self.fail_mutations.get() {
            return Err(ContentError::Transport("connection reset".to_string()));
        }
        Ok(())
    }

    fn allocate_id(&self) -> i64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

impl ContentService for FakeService {
    fn list_folders(&self, _credential: &Credential) -> ContentResult<Vec<Folder>> {
        self.record("list_folders".to_string());
        if self.reject_credential.get() {
            return Err(ContentError::Unauthorized);
        }
        if self.fail_listing.get() {
            return Err(ContentError::Status {
                code: 500,
                message: "boom".to_string(),
            });
        }
        Ok(self.folders.borrow().clone())
    }

    fn list_notes(&self, _credential: &Credential) -> ContentResult<Vec<Note>> {
        self.record("list_notes".to_string());
        Ok(self.notes.borrow().clone())
    }

    fn create_folder(
        &self,
        _credential: &Credential,
        name: &str,
        parent_id: Option<FolderId>,
    ) -> ContentResult<()> {
        self.record(format!("create_folder {name} {parent_id:?}"));
        self.gate()?;
        let id = self.allocate_id();
        self.folders
            .borrow_mut()
            .push(Folder::new(id, name, parent_id));
        Ok(())
    }

    fn create_note(
        &self,
        _credential: &Credential,
        heading: &str,
        folder_id: Option<FolderId>,
    ) -> ContentResult<()> {
        self.record(format!("create_note {heading} {folder_id:?}"));
        self.gate()?;
        let id = self.allocate_id();
        self.notes
            .borrow_mut()
            .push(Note::new(id, heading, folder_id));
        Ok(())
    }

    fn delete_folder(&self, _credential: &Credential, id: FolderId) -> ContentResult<()> {
        self.record(format!("delete_folder {id}"));
        self.gate()?;
        self.folders.borrow_mut().retain(|folder| folder.id != id);
        Ok(())
    }

    fn delete_note(&self, _credential: &Credential, id: NoteId) -> ContentResult<()> {
        self.record(format!("delete_note {id}"));
        self.gate()?;
        self.notes.borrow_mut().retain(|note| note.id != id);
        Ok(())
    }

    fn set_folder_parent(
        &self,
        _credential: &Credential,
        id: FolderId,
        parent_id: Option<FolderId>,
    ) -> ContentResult<()> {
        self.record(format!("set_folder_parent {id} {parent_id:?}"));
        self.gate()?;
        for folder in self.folders.borrow_mut().iter_mut() {
            if folder.id == id {
                folder.parent_id = parent_id;
            }
        }
        Ok(())
    }

    fn set_note_folder(
        &self,
        _credential: &Credential,
        id: NoteId,
        folder_id: Option<FolderId>,
    ) -> ContentResult<()> {
        self.record(format!("set_note_folder {id} {folder_id:?}"));
        self.gate()?;
        for note in self.notes.borrow_mut().iter_mut() {
            if note.id == id {
                note.folder_id = folder_id;
            }
        }
        Ok(())
    }

    fn toggle_note_privacy(&self, _credential: &Credential, id: NoteId) -> ContentResult<bool> {
        self.record(format!("toggle_note_privacy {id}"));
        self.gate()?;
        let mut notes = self.notes.borrow_mut();
        let note = notes
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or_else(|| ContentError::NotFound(format!("note {id}")))?;
        note.is_private = !note.is_private;
        Ok(note.is_private)
    }
}

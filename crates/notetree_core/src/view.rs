//! Folder tree controller consumed by the renderer.
//!
//! # Responsibility
//! - Own the forest, expansion, selection, drag state and current notice.
//! - Run every tree action against the content service and rebuild the
//!   forest from a fresh read after each successful mutation.
//!
//! # Invariants
//! - Without a credential no service call is made; a blocking notice is shown.
//! - A failed fetch keeps the previous forest; a failed mutation changes
//!   no local state.
//! - Drop validation happens before any network call.
//! - The forest is only ever replaced, never patched.

use crate::auth::{Credential, CredentialProvider};
use crate::model::folder::FolderId;
use crate::model::note::NoteId;
use crate::service::content::{ContentError, ContentService};
use crate::tree::expansion::ExpansionSet;
use crate::tree::forest::{Forest, TreeRow};
use crate::tree::reparent::{plan_move, DragItem, DropTarget, MoveRejection, PlannedMove};
use crate::tree::selection::Selection;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const NOT_AUTHENTICATED_MESSAGE: &str = "User not authenticated. Please log in.";
const INVALID_NAME_MESSAGE: &str = "Name must not be blank.";
const NOTHING_SELECTED_MESSAGE: &str = "Select a folder or note first.";

/// Mutation kinds, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeAction {
    CreateFolder,
    CreateNote,
    DeleteFolder,
    DeleteNote,
    MoveFolder,
    MoveNote,
    TogglePrivacy,
}

impl TreeAction {
    fn failure_message(self) -> &'static str {
        match self {
            Self::CreateFolder => "Failed to create the folder.",
            Self::CreateNote => "Failed to create the note.",
            Self::DeleteFolder => "Failed to delete the folder.",
            Self::DeleteNote => "Failed to delete the note.",
            Self::MoveFolder => "Failed to move the folder.",
            Self::MoveNote => "Failed to move the note.",
            Self::TogglePrivacy => "Failed to update the note privacy.",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::CreateFolder => "create_folder",
            Self::CreateNote => "create_note",
            Self::DeleteFolder => "delete_folder",
            Self::DeleteNote => "delete_note",
            Self::MoveFolder => "move_folder",
            Self::MoveNote => "move_note",
            Self::TogglePrivacy => "toggle_privacy",
        }
    }
}

/// Errors returned by tree actions. Each is also recorded as a [`Notice`].
#[derive(Debug)]
pub enum TreeError {
    /// No valid credential; the view is blocked.
    NotAuthenticated,
    /// Listing folders or notes failed.
    Fetch(ContentError),
    /// A create/delete/move/privacy call failed.
    Mutation {
        action: TreeAction,
        source: ContentError,
    },
    /// Drop refused before any call.
    Rejected(MoveRejection),
    /// Name or heading is blank after trim.
    InvalidName,
    /// Action needs a selected folder or note.
    NothingSelected,
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "not authenticated"),
            Self::Fetch(err) => write!(f, "failed to load folders and notes: {err}"),
            Self::Mutation { action, source } => write!(f, "{} failed: {source}", action.as_str()),
            Self::Rejected(rejection) => write!(f, "{rejection}"),
            Self::InvalidName => write!(f, "name must not be blank"),
            Self::NothingSelected => write!(f, "nothing is selected"),
        }
    }
}

impl Error for TreeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Fetch(err) => Some(err),
            Self::Mutation { source, .. } => Some(source),
            Self::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

impl From<MoveRejection> for TreeError {
    fn from(value: MoveRejection) -> Self {
        Self::Rejected(value)
    }
}

/// How a notice may be dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Cannot be dismissed; the view is unusable.
    Blocking,
    /// Error the user can dismiss and retry.
    Error,
}

/// Single user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn blocking(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Blocking,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// State and action handlers behind the folder tree.
pub struct TreeView<S, P> {
    service: S,
    credentials: P,
    forest: Forest,
    expansion: ExpansionSet,
    selection: Selection,
    dragging: Option<DragItem>,
    notice: Option<Notice>,
    loaded: bool,
    authenticated: bool,
}

impl<S: ContentService, P: CredentialProvider> TreeView<S, P> {
    /// Creates an empty view. Call [`TreeView::refresh`] to load.
    pub fn new(service: S, credentials: P) -> Self {
        Self {
            service,
            credentials,
            forest: Forest::default(),
            expansion: ExpansionSet::new(),
            selection: Selection::None,
            dragging: None,
            notice: None,
            loaded: false,
            authenticated: true,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn expansion(&self) -> &ExpansionSet {
        &self.expansion
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn dragging(&self) -> Option<DragItem> {
        self.dragging
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Folder rows to paint, honoring the expansion set.
    pub fn visible_rows(&self) -> Vec<TreeRow> {
        self.forest
            .visible_rows(|id| self.expansion.is_expanded(id))
    }

    /// Clears a dismissible notice. Blocking notices stay.
    pub fn dismiss_notice(&mut self) {
        if matches!(&self.notice, Some(notice) if notice.kind == NoticeKind::Error) {
            self.notice = None;
        }
    }

    /// Re-lists folders and notes and rebuilds the forest.
    ///
    /// On failure the previous forest, expansion and selection stay as-is.
    pub fn refresh(&mut self) -> Result<(), TreeError> {
        let credential = self.require_credential()?;
        let listing = self
            .service
            .list_folders(&credential)
            .and_then(|folders| Ok((folders, self.service.list_notes(&credential)?)));
        let (folders, notes) = match listing {
            Ok(listing) => listing,
            Err(err) => return Err(self.fail_fetch(err)),
        };

        let forest = Forest::build(folders, notes);
        if self.loaded {
            self.expansion.reconcile(&forest);
        } else {
            self.expansion.initialize(&forest);
            self.loaded = true;
        }
        self.selection.reconcile(&forest);
        self.forest = forest;
        if matches!(&self.notice, Some(notice) if notice.kind == NoticeKind::Error) {
            self.notice = None;
        }
        info!(
            "event=tree_refresh module=view status=ok folders={} notes={}",
            self.forest.folder_count(),
            self.forest.note_count()
        );
        Ok(())
    }

    /// Cascading expand/collapse. Returns the new state of `id`.
    pub fn toggle(&mut self, id: FolderId) -> Option<bool> {
        self.expansion.toggle(&self.forest, id)
    }

    /// Selects a folder present in the forest.
    pub fn select_folder(&mut self, id: FolderId) -> bool {
        if !self.forest.contains_folder(id) {
            return false;
        }
        self.selection.select_folder(id);
        true
    }

    /// Selects a note present in the forest.
    pub fn select_note(&mut self, id: NoteId) -> bool {
        if !self.forest.contains_note(id) {
            return false;
        }
        self.selection.select_note(id);
        true
    }

    /// Pointer interaction outside the tree bounds.
    pub fn click_outside(&mut self) {
        self.selection.clear();
    }

    pub fn drag_start(&mut self, item: DragItem) {
        self.dragging = Some(item);
    }

    /// Whether dropping the current drag on `target` would be accepted.
    pub fn drag_over(&self, target: DropTarget) -> bool {
        self.dragging
            .is_some_and(|item| plan_move(&self.forest, item, target).is_ok())
    }

    /// Drops the current drag on `target`. No-op when nothing is dragged.
    pub fn drop(&mut self, target: DropTarget) -> Result<(), TreeError> {
        match self.dragging.take() {
            Some(item) => self.attempt_move(item, target),
            None => Ok(()),
        }
    }

    /// Validates and executes a move, then rebuilds from a fresh read.
    pub fn attempt_move(&mut self, item: DragItem, target: DropTarget) -> Result<(), TreeError> {
        let credential = self.require_credential()?;
        let planned = match plan_move(&self.forest, item, target) {
            Ok(planned) => planned,
            Err(rejection) => {
                warn!(
                    "event=tree_move module=view status=rejected item={item:?} target={target:?} reason={rejection}"
                );
                self.notice = Some(Notice::error(capitalize(&rejection.to_string())));
                return Err(rejection.into());
            }
        };

        let (action, result) = match planned {
            PlannedMove::Folder { id, new_parent } => (
                TreeAction::MoveFolder,
                self.service.set_folder_parent(&credential, id, new_parent),
            ),
            PlannedMove::Note { id, new_folder } => (
                TreeAction::MoveNote,
                self.service.set_note_folder(&credential, id, new_folder),
            ),
        };
        self.finish_mutation(action, result)?;
        self.refresh()
    }

    /// Creates a folder under the selection's default parent.
    pub fn create_folder(&mut self, name: &str) -> Result<(), TreeError> {
        let name = normalize_name(name).map_err(|err| self.reject_input(err))?;
        let credential = self.require_credential()?;
        let parent = self.selection.default_parent(&self.forest);
        let result = self.service.create_folder(&credential, &name, parent);
        self.finish_mutation(TreeAction::CreateFolder, result)?;
        self.refresh()
    }

    /// Creates an empty note under the selection's default parent.
    pub fn create_note(&mut self, heading: &str) -> Result<(), TreeError> {
        let heading = normalize_name(heading).map_err(|err| self.reject_input(err))?;
        let credential = self.require_credential()?;
        let folder = self.selection.default_parent(&self.forest);
        let result = self.service.create_note(&credential, &heading, folder);
        self.finish_mutation(TreeAction::CreateNote, result)?;
        self.refresh()
    }

    /// Deletes the selected folder or note and clears the selection.
    pub fn delete_selected(&mut self) -> Result<(), TreeError> {
        let credential = self.require_credential()?;
        let (action, result) = match self.selection {
            Selection::None => return Err(self.reject_input(TreeError::NothingSelected)),
            Selection::Folder(id) => (
                TreeAction::DeleteFolder,
                self.service.delete_folder(&credential, id),
            ),
            Selection::Note(id) => (
                TreeAction::DeleteNote,
                self.service.delete_note(&credential, id),
            ),
        };
        self.finish_mutation(action, result)?;
        self.selection.clear();
        self.refresh()
    }

    /// Flips privacy of the selected note and returns the new flag.
    pub fn toggle_privacy(&mut self) -> Result<bool, TreeError> {
        let credential = self.require_credential()?;
        let Some(note_id) = self.selection.note() else {
            return Err(self.reject_input(TreeError::NothingSelected));
        };
        let result = self.service.toggle_note_privacy(&credential, note_id);
        let is_private = self.finish_mutation(TreeAction::TogglePrivacy, result)?;
        self.refresh()?;
        Ok(is_private)
    }

    fn require_credential(&mut self) -> Result<Credential, TreeError> {
        if !self.authenticated {
            return Err(TreeError::NotAuthenticated);
        }
        match self.credentials.credential() {
            Some(credential) => Ok(credential),
            None => Err(self.block_unauthenticated()),
        }
    }

    fn block_unauthenticated(&mut self) -> TreeError {
        warn!("event=tree_auth module=view status=error reason=no_credential");
        self.authenticated = false;
        self.dragging = None;
        self.notice = Some(Notice::blocking(NOT_AUTHENTICATED_MESSAGE));
        TreeError::NotAuthenticated
    }

    fn reject_input(&mut self, err: TreeError) -> TreeError {
        let message = match err {
            TreeError::InvalidName => INVALID_NAME_MESSAGE,
            TreeError::NothingSelected => NOTHING_SELECTED_MESSAGE,
            _ => return err,
        };
        warn!("event=tree_input module=view status=rejected error={err}");
        self.notice = Some(Notice::error(message));
        err
    }

    fn fail_fetch(&mut self, err: ContentError) -> TreeError {
        if err.is_unauthorized() {
            return self.block_unauthenticated();
        }
        warn!("event=tree_refresh module=view status=error error={err}");
        self.notice = Some(Notice::error("Failed to load folders and notes."));
        TreeError::Fetch(err)
    }

    fn finish_mutation<T>(
        &mut self,
        action: TreeAction,
        result: Result<T, ContentError>,
    ) -> Result<T, TreeError> {
        match result {
            Ok(value) => {
                info!(
                    "event=tree_mutation module=view status=ok action={}",
                    action.as_str()
                );
                Ok(value)
            }
            Err(err) if err.is_unauthorized() => Err(self.block_unauthenticated()),
            Err(err) => {
                warn!(
                    "event=tree_mutation module=view status=error action={} error={err}",
                    action.as_str()
                );
                self.notice = Some(Notice::error(action.failure_message()));
                Err(TreeError::Mutation {
                    action,
                    source: err,
                })
            }
        }
    }
}

fn normalize_name(value: &str) -> Result<String, TreeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TreeError::InvalidName);
    }
    Ok(trimmed.to_string())
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>() + ".",
        None => String::new(),
    }
}

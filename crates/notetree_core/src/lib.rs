//! Core logic for the NoteTree client.
//! Folder/note hierarchy, tree interaction state, and the service contracts
//! it talks to.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod editor;
pub mod feed;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;
pub mod tree;
pub mod view;

pub use api::HttpClient;
pub use auth::{
    login, register, AuthError, Credential, CredentialProvider, Role, Session, SessionApi,
    StaticCredential,
};
pub use config::{ClientConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use editor::{save_document, DocumentApi, EditorError, NoteDocument, SaveOutcome};
pub use feed::{Feed, FeedApi, FeedError, FeedNote, FeedSort, Reaction};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::folder::{Folder, FolderId};
pub use model::note::{Note, NoteId};
pub use service::content::{ContentError, ContentResult, ContentService};
pub use store::sqlite_store::SqliteContentStore;
pub use tree::expansion::ExpansionSet;
pub use tree::forest::{FolderNode, Forest, TreeRow};
pub use tree::reparent::{plan_move, DragItem, DropTarget, MoveRejection, PlannedMove};
pub use tree::selection::Selection;
pub use view::{Notice, NoticeKind, TreeAction, TreeError, TreeView};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Local SQLite implementation of the content service.
//!
//! # Responsibility
//! - Serve the folder/note contract from a local database for offline use
//!   and end-to-end tests.
//! - Enforce the structural rules a remote service would enforce.
//!
//! # Invariants
//! - A folder parent must exist and must not be the folder or a descendant.
//! - Deleting a folder removes its subfolders and every note inside them.
//! - Single-user store: any credential is accepted.

pub mod sqlite_store;

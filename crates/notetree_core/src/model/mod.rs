//! Folder and note records exchanged with the content service.
//!
//! # Responsibility
//! - Define the flat folder/note shapes the tree is derived from.
//! - Keep serde field names aligned with the remote API payloads.
//!
//! # Invariants
//! - Parent/child and note/folder links are id references only.
//! - `None` parent/folder means root-level folder or unfiled note.

pub mod folder;
pub mod note;

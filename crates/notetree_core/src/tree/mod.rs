//! Client-side folder tree state.
//!
//! # Responsibility
//! - Derive the folder/note forest from flat listings.
//! - Track expansion and selection by id across rebuilds.
//! - Validate drag-and-drop moves before any mutation is sent.
//!
//! # Invariants
//! - The forest is never patched in place; it is rebuilt from a fresh read.

pub mod expansion;
pub mod forest;
pub mod reparent;
pub mod selection;

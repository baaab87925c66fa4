//! Remote content-service contract.
//!
//! # Responsibility
//! - Define the operations the tree consumes from the content service.
//! - Keep transport and storage details behind one trait boundary.
//!
//! # Invariants
//! - Every call carries the caller credential.
//! - The service is the single source of truth for folders and notes.

pub mod content;

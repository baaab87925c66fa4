//! Remote API access over HTTP.
//!
//! # Responsibility
//! - Implement the content, feed, document and session contracts against
//!   the note server's REST endpoints.
//! - Map HTTP statuses onto `ContentError` so callers never see transport
//!   details.
//!
//! # Invariants
//! - Every authenticated call carries the credential as a bearer token.
//! - 401 and 403 both surface as `ContentError::Unauthorized`.

pub mod client;
pub(crate) mod wire;

pub use client::HttpClient;

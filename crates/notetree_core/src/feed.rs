//! Public note feed with like/dislike reactions.
//!
//! # Responsibility
//! - Load the feed, resolve author names, and keep reaction counters in
//!   step with acknowledged like/dislike calls.
//! - Order feed notes and derive plain-text previews from rich-text bodies.
//!
//! # Invariants
//! - A note is never liked and disliked by the caller at the same time.
//! - Counters change only after the service acknowledged the reaction.
//! - Sorting is stable; unparseable timestamps sort last.

use crate::auth::{Credential, CredentialProvider};
use crate::model::note::NoteId;
use crate::service::content::ContentError;
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Author shown when the username lookup fails.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Stable user identifier assigned by the service.
pub type UserId = i64;

/// Note as listed by the public feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedNote {
    pub id: NoteId,
    pub heading: String,
    /// Rich-text document; opaque to this crate apart from previews.
    #[serde(default)]
    pub body: Value,
    #[serde(default)]
    pub likes_count: i64,
    #[serde(default)]
    pub dislikes_count: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub is_disliked: bool,
    #[serde(default)]
    pub user_id: UserId,
    /// Resolved after listing; not part of the feed payload.
    #[serde(skip)]
    pub username: Option<String>,
}

/// Caller reaction to a feed note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Like,
    Dislike,
}

impl Reaction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
        }
    }
}

impl FeedNote {
    /// Likes minus dislikes.
    pub fn net_likes(&self) -> i64 {
        self.likes_count - self.dislikes_count
    }

    /// Parsed `created_at`. Naive timestamps are taken as UTC.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.created_at.trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|value| value.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|value| value.and_utc())
            })
    }

    /// Applies an acknowledged reaction toggle.
    ///
    /// Reacting again removes the reaction; reacting the other way moves it.
    pub fn apply_reaction(&mut self, reaction: Reaction) {
        match reaction {
            Reaction::Like => {
                if self.is_liked {
                    self.likes_count -= 1;
                } else {
                    self.likes_count += 1;
                    if self.is_disliked {
                        self.dislikes_count -= 1;
                        self.is_disliked = false;
                    }
                }
                self.is_liked = !self.is_liked;
            }
            Reaction::Dislike => {
                if self.is_disliked {
                    self.dislikes_count -= 1;
                } else {
                    self.dislikes_count += 1;
                    if self.is_liked {
                        self.likes_count -= 1;
                        self.is_liked = false;
                    }
                }
                self.is_disliked = !self.is_disliked;
            }
        }
    }

    /// Plain-text preview of the body.
    pub fn preview(&self, max_chars: usize) -> Option<String> {
        preview_text(&self.body, max_chars)
    }
}

/// Feed ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedSort {
    #[default]
    MostRecent,
    LeastRecent,
    MostLikes,
    LeastLikes,
}

impl FeedSort {
    /// Parses `most-recent|least-recent|most-likes|least-likes`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "most-recent" | "mostrecent" => Some(Self::MostRecent),
            "least-recent" | "leastrecent" => Some(Self::LeastRecent),
            "most-likes" | "mostlikes" => Some(Self::MostLikes),
            "least-likes" | "leastlikes" => Some(Self::LeastLikes),
            _ => None,
        }
    }
}

/// Sorts feed notes in place.
pub fn sort_feed(notes: &mut [FeedNote], sort: FeedSort) {
    match sort {
        FeedSort::MostLikes => notes.sort_by(|a, b| {
            b.net_likes()
                .cmp(&a.net_likes())
                .then_with(|| b.likes_count.cmp(&a.likes_count))
        }),
        FeedSort::LeastLikes => notes.sort_by(|a, b| {
            a.net_likes()
                .cmp(&b.net_likes())
                .then_with(|| a.likes_count.cmp(&b.likes_count))
        }),
        FeedSort::MostRecent => notes.sort_by(|a, b| {
            compare_known_first(a.created_at_utc(), b.created_at_utc(), |x, y| y.cmp(x))
        }),
        FeedSort::LeastRecent => notes.sort_by(|a, b| {
            compare_known_first(a.created_at_utc(), b.created_at_utc(), |x, y| x.cmp(y))
        }),
    }
}

fn compare_known_first<T>(
    a: Option<T>,
    b: Option<T>,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(&a, &b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Collects the `text` leaves of a rich-text JSON document in order,
/// collapses whitespace and truncates to `max_chars` (with `...`).
///
/// Returns `None` when the document has no visible text.
pub fn preview_text(body: &Value, max_chars: usize) -> Option<String> {
    let mut parts = Vec::new();
    collect_text(body, &mut parts);
    let joined = parts.join(" ");
    let normalized = WHITESPACE_RE.replace_all(&joined, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut preview: String = trimmed.chars().take(max_chars).collect();
    if trimmed.chars().count() > max_chars {
        preview.push_str("...");
    }
    Some(preview)
}

fn collect_text<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("text") {
                out.push(text);
            }
            if let Some(content) = map.get("content") {
                collect_text(content, out);
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_text(item, out)),
        Value::String(text) => out.push(text),
        _ => {}
    }
}

/// Feed endpoints of the remote service.
pub trait FeedApi {
    /// Lists feed notes matching `search` (empty means all).
    fn feed(&self, credential: &Credential, search: &str) -> Result<Vec<FeedNote>, ContentError>;
    /// Resolves an author's display name.
    fn username(&self, credential: &Credential, user_id: UserId) -> Result<String, ContentError>;
    /// Toggles the caller's reaction on a note.
    fn react(
        &self,
        credential: &Credential,
        note_id: NoteId,
        reaction: Reaction,
    ) -> Result<(), ContentError>;
}

#[derive(Debug)]
pub enum FeedError {
    NotAuthenticated,
    Load(ContentError),
    React {
        reaction: Reaction,
        source: ContentError,
    },
    NoteNotLoaded(NoteId),
}

impl Display for FeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "not authenticated"),
            Self::Load(err) => write!(f, "error fetching notes: {err}"),
            Self::React { reaction, source } => {
                write!(f, "error updating the {} status: {source}", reaction.as_str())
            }
            Self::NoteNotLoaded(id) => write!(f, "note is not in the feed: {id}"),
        }
    }
}

impl Error for FeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            Self::React { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Feed state: loaded notes, chosen ordering, last error message.
pub struct Feed<A, P> {
    api: A,
    credentials: P,
    notes: Vec<FeedNote>,
    sort: FeedSort,
    error: Option<String>,
}

impl<A: FeedApi, P: CredentialProvider> Feed<A, P> {
    pub fn new(api: A, credentials: P) -> Self {
        Self {
            api,
            credentials,
            notes: Vec::new(),
            sort: FeedSort::default(),
            error: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn sort(&self) -> FeedSort {
        self.sort
    }

    pub fn set_sort(&mut self, sort: FeedSort) {
        self.sort = sort;
    }

    /// Notes in the current ordering.
    pub fn notes(&self) -> Vec<FeedNote> {
        let mut notes = self.notes.clone();
        sort_feed(&mut notes, self.sort);
        notes
    }

    /// Loads the feed and resolves usernames. Keeps old notes on failure.
    pub fn load(&mut self, search: &str) -> Result<(), FeedError> {
        let credential = self.require_credential()?;
        let mut notes = match self.api.feed(&credential, search.trim()) {
            Ok(notes) => notes,
            Err(err) => {
                warn!("event=feed_load module=feed status=error error={err}");
                self.error = Some("Error fetching notes.".to_string());
                return Err(FeedError::Load(err));
            }
        };
        for note in &mut notes {
            let name = self
                .api
                .username(&credential, note.user_id)
                .unwrap_or_else(|err| {
                    warn!(
                        "event=feed_username module=feed status=error user_id={} error={err}",
                        note.user_id
                    );
                    UNKNOWN_AUTHOR.to_string()
                });
            note.username = Some(name);
        }
        info!("event=feed_load module=feed status=ok notes={}", notes.len());
        self.notes = notes;
        self.error = None;
        Ok(())
    }

    pub fn like(&mut self, note_id: NoteId) -> Result<(), FeedError> {
        self.react(note_id, Reaction::Like)
    }

    pub fn dislike(&mut self, note_id: NoteId) -> Result<(), FeedError> {
        self.react(note_id, Reaction::Dislike)
    }

    fn react(&mut self, note_id: NoteId, reaction: Reaction) -> Result<(), FeedError> {
        let credential = self.require_credential()?;
        if !self.notes.iter().any(|note| note.id == note_id) {
            return Err(FeedError::NoteNotLoaded(note_id));
        }
        if let Err(err) = self.api.react(&credential, note_id, reaction) {
            warn!(
                "event=feed_react module=feed status=error reaction={} note_id={note_id} error={err}",
                reaction.as_str()
            );
            self.error = Some(format!("Error updating the {} status.", reaction.as_str()));
            return Err(FeedError::React {
                reaction,
                source: err,
            });
        }
        if let Some(note) = self.notes.iter_mut().find(|note| note.id == note_id) {
            note.apply_reaction(reaction);
        }
        Ok(())
    }

    fn require_credential(&mut self) -> Result<Credential, FeedError> {
        self.credentials.credential().ok_or_else(|| {
            self.error = Some("User not authenticated. Please log in.".to_string());
            FeedError::NotAuthenticated
        })
    }
}

//! Blocking HTTP client for the remote note API.

use crate::api::wire::{
    CreateFolderRequest, CreateNoteRequest, DocumentRequest, FolderParentRequest, FoldersEnvelope,
    LoginRequest, NoteFolderRequest, NotesEnvelope, PrivacyResponse, RegisterRequest,
};
use crate::auth::{Credential, LoginReply, SessionApi};
use crate::config::ClientConfig;
use crate::editor::{DocumentApi, NoteDocument};
use crate::feed::{FeedApi, FeedNote, Reaction, UserId};
use crate::logging::sanitize_message;
use crate::model::folder::{Folder, FolderId};
use crate::model::note::{Note, NoteId};
use crate::service::content::{ContentError, ContentResult, ContentService};
use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;

const ERROR_BODY_LIMIT: usize = 200;

/// HTTP implementation of the content, feed, document and session APIs.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    http: Client,
}

impl HttpClient {
    /// Builds a client for `config.base_url`; applies `config.timeout` if set.
    pub fn new(config: &ClientConfig) -> ContentResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| ContentError::Transport(err.to_string()))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, credential: Option<&Credential>) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match credential {
            Some(credential) => builder.bearer_auth(credential.token()),
            None => builder,
        }
    }

    fn send(&self, method: Method, path: &str, builder: RequestBuilder) -> ContentResult<Response> {
        let started_at = Instant::now();
        let response = builder.send().map_err(|err| {
            warn!(
                "event=http_request module=api status=error method={method} path={path} error={err}"
            );
            ContentError::Transport(err.to_string())
        })?;
        let status = response.status();
        debug!(
            "event=http_request module=api status=ok method={method} path={path} http_status={} duration_ms={}",
            status.as_u16(),
            started_at.elapsed().as_millis()
        );
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(status_error(status, path, &body))
    }

    fn call(
        &self,
        method: Method,
        path: &str,
        credential: Option<&Credential>,
        body: Option<&(impl Serialize + ?Sized)>,
    ) -> ContentResult<Response> {
        let mut builder = self.request(method.clone(), path, credential);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send(method, path, builder)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, credential: &Credential) -> ContentResult<T> {
        let response = self.call(Method::GET, path, Some(credential), None::<&Value>)?;
        decode(response)
    }

    fn execute(
        &self,
        method: Method,
        path: &str,
        credential: &Credential,
        body: &(impl Serialize + ?Sized),
    ) -> ContentResult<()> {
        self.call(method, path, Some(credential), Some(body))
            .map(|_| ())
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> ContentResult<T> {
    response
        .json::<T>()
        .map_err(|err| ContentError::Decode(err.to_string()))
}

fn status_error(status: StatusCode, path: &str, body: &str) -> ContentError {
    let message = sanitize_message(body.trim(), ERROR_BODY_LIMIT);
    warn!(
        "event=http_request module=api status=error path={path} http_status={} message={message}",
        status.as_u16()
    );
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ContentError::Unauthorized,
        StatusCode::NOT_FOUND => ContentError::NotFound(path.to_string()),
        StatusCode::CONFLICT => ContentError::Conflict(message),
        other => ContentError::Status {
            code: other.as_u16(),
            message,
        },
    }
}

/// Username endpoint may answer with a JSON string or plain text.
fn parse_username(raw: &str) -> String {
    serde_json::from_str::<String>(raw).unwrap_or_else(|_| raw.trim().to_string())
}

impl ContentService for HttpClient {
    fn list_folders(&self, credential: &Credential) -> ContentResult<Vec<Folder>> {
        let envelope: FoldersEnvelope = self.get_json("/api/folders", credential)?;
        Ok(envelope.folders)
    }

    fn list_notes(&self, credential: &Credential) -> ContentResult<Vec<Note>> {
        let envelope: NotesEnvelope = self.get_json("/api/notes", credential)?;
        Ok(envelope.notes)
    }

    fn create_folder(
        &self,
        credential: &Credential,
        name: &str,
        parent_id: Option<FolderId>,
    ) -> ContentResult<()> {
        let body = CreateFolderRequest {
            name,
            parent_folder_id: parent_id,
        };
        self.execute(Method::POST, "/api/folders", credential, &body)
    }

    fn create_note(
        &self,
        credential: &Credential,
        heading: &str,
        folder_id: Option<FolderId>,
    ) -> ContentResult<()> {
        let body = CreateNoteRequest {
            heading,
            body: json!({}),
            folder_id,
        };
        self.execute(Method::POST, "/api/notes", credential, &body)
    }

    fn delete_folder(&self, credential: &Credential, id: FolderId) -> ContentResult<()> {
        let path = format!("/api/folders/{id}");
        self.call(Method::DELETE, &path, Some(credential), None::<&Value>)
            .map(|_| ())
    }

    fn delete_note(&self, credential: &Credential, id: NoteId) -> ContentResult<()> {
        let path = format!("/api/notes/{id}");
        self.call(Method::DELETE, &path, Some(credential), None::<&Value>)
            .map(|_| ())
    }

    fn set_folder_parent(
        &self,
        credential: &Credential,
        id: FolderId,
        parent_id: Option<FolderId>,
    ) -> ContentResult<()> {
        let body = FolderParentRequest {
            parent_folder_id: parent_id,
        };
        self.execute(Method::PUT, &format!("/api/folders/{id}"), credential, &body)
    }

    fn set_note_folder(
        &self,
        credential: &Credential,
        id: NoteId,
        folder_id: Option<FolderId>,
    ) -> ContentResult<()> {
        let body = NoteFolderRequest { folder_id };
        self.execute(Method::PUT, &format!("/api/notes/f{id}"), credential, &body)
    }

    fn toggle_note_privacy(&self, credential: &Credential, id: NoteId) -> ContentResult<bool> {
        let path = format!("/api/notes/{id}/privacy");
        let response = self.call(Method::PUT, &path, Some(credential), Some(&json!({})))?;
        let reply: PrivacyResponse = decode(response)?;
        Ok(reply.is_private)
    }
}

impl FeedApi for HttpClient {
    fn feed(&self, credential: &Credential, search: &str) -> ContentResult<Vec<FeedNote>> {
        let builder = self
            .request(Method::GET, "/api/notes/feed", Some(credential))
            .query(&[("search", search)]);
        let response = self.send(Method::GET, "/api/notes/feed", builder)?;
        let raw = response
            .text()
            .map_err(|err| ContentError::Decode(err.to_string()))?;
        // Empty or null body when nothing matches.
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let notes: Option<Vec<FeedNote>> =
            serde_json::from_str(&raw).map_err(|err| ContentError::Decode(err.to_string()))?;
        Ok(notes.unwrap_or_default())
    }

    fn username(&self, credential: &Credential, user_id: UserId) -> ContentResult<String> {
        let path = format!("/api/users/{user_id}/username");
        let response = self.call(Method::GET, &path, Some(credential), None::<&Value>)?;
        let raw = response
            .text()
            .map_err(|err| ContentError::Decode(err.to_string()))?;
        Ok(parse_username(&raw))
    }

    fn react(&self, credential: &Credential, note_id: NoteId, reaction: Reaction) -> ContentResult<()> {
        let path = format!("/api/notes/{note_id}/{}", reaction.as_str());
        self.execute(Method::POST, &path, credential, &json!({}))
    }
}

impl DocumentApi for HttpClient {
    fn get_document(&self, credential: &Credential, id: NoteId) -> ContentResult<NoteDocument> {
        self.get_json(&format!("/api/notes/{id}"), credential)
    }

    fn owns_note(&self, credential: &Credential, id: NoteId) -> ContentResult<bool> {
        let path = format!("/api/notes/checkOwnership/{id}");
        match self.call(Method::GET, &path, Some(credential), None::<&Value>) {
            Ok(_) => Ok(true),
            Err(
                ContentError::Unauthorized
                | ContentError::NotFound(_)
                | ContentError::Conflict(_)
                | ContentError::Status {
                    code: 400..=499, ..
                },
            ) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn create_document(&self, credential: &Credential, document: &NoteDocument) -> ContentResult<()> {
        let body = DocumentRequest {
            id: None,
            heading: &document.heading,
            body: &document.body,
        };
        self.execute(Method::POST, "/api/notes", credential, &body)
    }

    fn update_document(
        &self,
        credential: &Credential,
        id: NoteId,
        document: &NoteDocument,
    ) -> ContentResult<()> {
        let body = DocumentRequest {
            id: Some(id),
            heading: &document.heading,
            body: &document.body,
        };
        self.execute(Method::PUT, &format!("/api/notes/n{id}"), credential, &body)
    }
}

impl SessionApi for HttpClient {
    fn login(&self, username: &str, password: &str) -> ContentResult<LoginReply> {
        let body = LoginRequest { username, password };
        let response = self.call(Method::POST, "/api/users/login", None, Some(&body))?;
        decode(response)
    }

    fn register(&self, username: &str, email: &str, password: &str) -> ContentResult<()> {
        let body = RegisterRequest {
            username,
            password,
            email,
            bio: "",
            full_name: "",
            profile_picture_data: "",
        };
        self.call(Method::POST, "/api/users", None, Some(&body))
            .map(|_| ())
    }
}
